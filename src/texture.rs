use std::path::Path;

use image::{DynamicImage, imageops::FilterType};

use crate::error::{Result, ViewerError};
use crate::gpu::GpuContext;

/// Texel format picked from the decoded image's channel count.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TexelFormat {
    /// Single-channel images, sampled as red.
    R8,
    /// Everything else, expanded to four channels.
    Rgba8,
}

impl TexelFormat {
    /// Picks a format for an image with `channels` channels.
    ///
    /// wgpu has no three-channel format, so RGB goes to RGBA like two-channel
    /// images do.
    pub fn for_channels(channels: u8) -> Self {
        if channels == 1 { Self::R8 } else { Self::Rgba8 }
    }

    /// Both formats are linear; texel values reach the shader unconverted.
    pub fn wgpu_format(self) -> wgpu::TextureFormat {
        match self {
            Self::R8 => wgpu::TextureFormat::R8Unorm,
            Self::Rgba8 => wgpu::TextureFormat::Rgba8Unorm,
        }
    }
}

/// Number of levels in a full mip chain down to 1x1.
pub fn mip_level_count(width: u32, height: u32) -> u32 {
    32 - width.max(height).max(1).leading_zeros()
}

/// Size of a `width`×`height` image scaled down so neither side exceeds
/// `max_dimension`, keeping the aspect ratio. `None` if it already fits.
pub fn fit_within(width: u32, height: u32, max_dimension: u32) -> Option<(u32, u32)> {
    let max_dimension = max_dimension.max(1);
    let longest = width.max(height);
    if longest <= max_dimension {
        return None;
    }
    let scale = |side: u32| ((side as u64 * max_dimension as u64) / longest as u64).max(1) as u32;
    Some((scale(width), scale(height)))
}

/// Decoded pixels with a full mip chain, ready for upload.
#[derive(Clone, Debug)]
pub struct TextureImage {
    pub width: u32,
    pub height: u32,
    /// Channel count of the source file.
    pub channels: u8,
    pub format: TexelFormat,
    /// Level 0 first, each level half the size of the previous one.
    pub levels: Vec<Vec<u8>>,
}

impl TextureImage {
    /// Decodes an image file, flipped vertically so row 0 is the bottom.
    pub fn open(path: &Path) -> Result<Self> {
        Self::open_within(path, u32::MAX)
    }

    /// Like [`TextureImage::open`], but images larger than `max_dimension`
    /// on either side are scaled down to fit first.
    pub fn open_within(path: &Path, max_dimension: u32) -> Result<Self> {
        let img = image::open(path).map_err(|source| ViewerError::Texture {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::from_image_within(img.flipv(), max_dimension))
    }

    /// Scales `img` down to `max_dimension` if needed, then builds the chain.
    pub fn from_image_within(img: DynamicImage, max_dimension: u32) -> Self {
        match fit_within(img.width(), img.height(), max_dimension) {
            Some((w, h)) => {
                log::warn!(
                    "Texture is {}x{}, above the device limit of {max_dimension}; scaling to {w}x{h}",
                    img.width(),
                    img.height()
                );
                Self::from_image(img.resize_exact(w, h, FilterType::Triangle))
            }
            None => Self::from_image(img),
        }
    }

    /// Builds the mip chain for an already-oriented image.
    pub fn from_image(img: DynamicImage) -> Self {
        let channels = img.color().channel_count();
        let format = TexelFormat::for_channels(channels);
        let img = match format {
            TexelFormat::R8 => DynamicImage::ImageLuma8(img.to_luma8()),
            TexelFormat::Rgba8 => DynamicImage::ImageRgba8(img.to_rgba8()),
        };
        let (width, height) = (img.width(), img.height());

        let mut levels = Vec::with_capacity(mip_level_count(width, height) as usize);
        let mut level = img;
        loop {
            let (w, h) = (level.width(), level.height());
            let next = (w > 1 || h > 1)
                .then(|| level.resize_exact((w / 2).max(1), (h / 2).max(1), FilterType::Triangle));
            levels.push(level.into_bytes());
            match next {
                Some(next) => level = next,
                None => break,
            }
        }

        Self {
            width,
            height,
            channels,
            format,
            levels,
        }
    }

    /// All levels back to back, the order wgpu expects for a single layer.
    fn concatenated(&self) -> Vec<u8> {
        self.levels.concat()
    }
}

/// A GPU texture that can be bound to shaders.
#[derive(Debug)]
pub struct Texture {
    pub(crate) texture: wgpu::Texture,
    pub(crate) view: wgpu::TextureView,
    pub(crate) sampler: wgpu::Sampler,
    pub width: u32,
    pub height: u32,
}

impl Texture {
    /// Create a single-level texture from raw RGBA data.
    pub fn from_rgba(gpu: &GpuContext, data: &[u8], width: u32, height: u32, label: &str) -> Self {
        let image = TextureImage {
            width,
            height,
            channels: 4,
            format: TexelFormat::Rgba8,
            levels: vec![data.to_vec()],
        };
        Self::from_image(gpu, &image, label)
    }

    /// Uploads every level of `image`.
    pub fn from_image(gpu: &GpuContext, image: &TextureImage, label: &str) -> Self {
        use wgpu::util::DeviceExt;

        let texture = gpu.device.create_texture_with_data(
            &gpu.queue,
            &wgpu::TextureDescriptor {
                label: Some(label),
                size: wgpu::Extent3d {
                    width: image.width,
                    height: image.height,
                    depth_or_array_layers: 1,
                },
                mip_level_count: image.levels.len() as u32,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: image.format.wgpu_format(),
                usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                view_formats: &[],
            },
            wgpu::util::TextureDataOrder::LayerMajor,
            &image.concatenated(),
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        // Trilinear minification, linear magnification, tiled.
        let sampler = gpu.device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some(&format!("{label} Sampler")),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        Self {
            texture,
            view,
            sampler,
            width: image.width,
            height: image.height,
        }
    }

    /// Load a texture from an image file.
    ///
    /// Images larger than the device's 2D texture limit are scaled down.
    pub fn from_file(gpu: &GpuContext, path: &Path) -> Result<Self> {
        let max_dimension = gpu.device.limits().max_texture_dimension_2d;
        let image = TextureImage::open_within(path, max_dimension)?;
        log::info!(
            "Texture loaded successfully: {}x{} ({} channels, {} mip levels)",
            image.width,
            image.height,
            image.channels,
            image.levels.len()
        );
        Ok(Self::from_image(gpu, &image, &path.display().to_string()))
    }

    /// Frees the texture memory immediately.
    pub fn destroy(&self) {
        self.texture.destroy();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma, Rgb, RgbImage};

    #[test]
    fn mip_counts() {
        assert_eq!(mip_level_count(1, 1), 1);
        assert_eq!(mip_level_count(2, 2), 2);
        assert_eq!(mip_level_count(256, 64), 9);
        assert_eq!(mip_level_count(300, 5), 9);
        assert_eq!(mip_level_count(4096, 4096), 13);
    }

    #[test]
    fn channel_count_picks_format() {
        assert_eq!(TexelFormat::for_channels(1), TexelFormat::R8);
        assert_eq!(TexelFormat::for_channels(3), TexelFormat::Rgba8);
        assert_eq!(TexelFormat::for_channels(4), TexelFormat::Rgba8);
        assert_eq!(
            TexelFormat::R8.wgpu_format(),
            wgpu::TextureFormat::R8Unorm
        );
        assert!(!TexelFormat::Rgba8.wgpu_format().is_srgb());
    }

    #[test]
    fn fitting_keeps_aspect_and_skips_small_images() {
        assert_eq!(fit_within(8192, 8192, 8192), None);
        assert_eq!(fit_within(100, 30, 8192), None);
        assert_eq!(fit_within(16384, 16384, 8192), Some((8192, 8192)));
        assert_eq!(fit_within(16384, 4096, 8192), Some((8192, 2048)));
        assert_eq!(fit_within(3, 40000, 8192), Some((1, 8192)));
    }

    #[test]
    fn oversized_image_is_scaled_to_the_limit() {
        let img = RgbImage::from_pixel(20, 10, Rgb([200, 100, 50]));
        let tex = TextureImage::from_image_within(DynamicImage::ImageRgb8(img), 8);

        assert_eq!((tex.width, tex.height), (8, 4));
        assert_eq!(tex.levels.len(), mip_level_count(8, 4) as usize);
        assert_eq!(tex.levels[0].len(), 8 * 4 * 4);
        assert_eq!(&tex.levels[0][..4], &[200, 100, 50, 255]);
    }

    #[test]
    fn image_within_limit_is_untouched() {
        let img = GrayImage::from_pixel(6, 3, Luma([9]));
        let tex = TextureImage::from_image_within(DynamicImage::ImageLuma8(img), 8);
        assert_eq!((tex.width, tex.height), (6, 3));
    }

    #[test]
    fn rgb_is_expanded_with_full_chain() {
        let img = RgbImage::from_pixel(8, 4, Rgb([10, 20, 30]));
        let tex = TextureImage::from_image(DynamicImage::ImageRgb8(img));

        assert_eq!(tex.channels, 3);
        assert_eq!(tex.format, TexelFormat::Rgba8);
        assert_eq!(tex.levels.len(), 4);
        assert_eq!(tex.levels[0].len(), 8 * 4 * 4);
        assert_eq!(tex.levels[1].len(), 4 * 2 * 4);
        assert_eq!(tex.levels[3].len(), 4);
        assert_eq!(&tex.levels[3][..], &[10, 20, 30, 255]);
    }

    #[test]
    fn grayscale_stays_single_channel() {
        let img = GrayImage::from_pixel(4, 4, Luma([77]));
        let tex = TextureImage::from_image(DynamicImage::ImageLuma8(img));

        assert_eq!(tex.format, TexelFormat::R8);
        assert_eq!(tex.levels.len(), 3);
        assert_eq!(tex.levels[2], vec![77]);
    }

    #[test]
    fn flip_moves_top_row_to_bottom() {
        let mut img = GrayImage::new(1, 2);
        img.put_pixel(0, 0, Luma([255]));
        let tex = TextureImage::from_image(DynamicImage::ImageLuma8(img).flipv());
        assert_eq!(&tex.levels[0][..], &[0, 255]);
    }

    #[test]
    fn missing_file_is_a_texture_error() {
        let err = TextureImage::open(Path::new("does/not/exist.png")).unwrap_err();
        assert!(matches!(err, ViewerError::Texture { .. }));
    }
}
