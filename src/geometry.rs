//! CPU-side geometry staged before GPU upload.
//!
//! [`MeshData`] is the common currency between the procedural builder, the OBJ
//! ingestor and [`Mesh`](crate::Mesh): an interleaved vertex list plus `u32`
//! triangle indices. Nothing here touches the GPU, so every producer can be
//! tested headless.

use crate::mesh::Vertex3d;
use glam::Vec3;

/// Interleaved vertices and triangle indices awaiting upload.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeshData {
    /// Vertex records, eight floats each.
    pub vertices: Vec<Vertex3d>,
    /// Triangle list indices into `vertices`.
    pub indices: Vec<u32>,
}

impl MeshData {
    /// Creates mesh data from vertices and indices.
    pub fn new(vertices: Vec<Vertex3d>, indices: Vec<u32>) -> Self {
        Self { vertices, indices }
    }

    /// Number of vertices emitted so far.
    ///
    /// This is also the base index for the next appended primitive.
    pub fn vertex_count(&self) -> u32 {
        self.vertices.len() as u32
    }

    /// Number of indices (three per triangle).
    pub fn index_count(&self) -> u32 {
        self.indices.len() as u32
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Appends one vertex.
    pub fn push_vertex(&mut self, position: Vec3, normal: Vec3, uv: [f32; 2]) {
        self.vertices
            .push(Vertex3d::new(position.to_array(), normal.to_array(), uv));
    }

    /// Appends one triangle by absolute vertex indices.
    pub fn push_triangle(&mut self, a: u32, b: u32, c: u32) {
        self.indices.extend_from_slice(&[a, b, c]);
    }

    /// The vertex buffer as a flat float slice (stride 8).
    pub fn as_floats(&self) -> &[f32] {
        bytemuck::cast_slice(&self.vertices)
    }

    /// Axis-aligned bounds of every vertex position, or `None` when empty.
    pub fn bounds(&self) -> Option<Bounds> {
        Bounds::from_points(self.vertices.iter().map(|v| Vec3::from(v.position)))
    }
}

/// An axis-aligned bounding box.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    pub min: Vec3,
    pub max: Vec3,
}

impl Bounds {
    /// Computes the bounds of a point set, or `None` when it is empty.
    pub fn from_points(points: impl IntoIterator<Item = Vec3>) -> Option<Self> {
        let mut points = points.into_iter();
        let first = points.next()?;
        let (min, max) = points.fold((first, first), |(min, max), p| (min.min(p), max.max(p)));
        Some(Self { min, max })
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// Largest of the three side lengths.
    pub fn max_extent(&self) -> f32 {
        self.size().max_element()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vertex(p: [f32; 3]) -> Vertex3d {
        Vertex3d::new(p, [0.0, 1.0, 0.0], [0.0, 0.0])
    }

    #[test]
    fn mesh_data_bounds() {
        let data = MeshData::new(
            vec![
                vertex([0.0, 0.0, 0.0]),
                vertex([1.0, 2.0, 3.0]),
                vertex([-1.0, -1.0, -1.0]),
            ],
            vec![0, 1, 2],
        );

        let bounds = data.bounds().unwrap();
        assert_eq!(bounds.min, Vec3::new(-1.0, -1.0, -1.0));
        assert_eq!(bounds.max, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(bounds.size(), Vec3::new(2.0, 3.0, 4.0));
        assert_eq!(bounds.max_extent(), 4.0);
    }

    #[test]
    fn bounds_center() {
        let bounds =
            Bounds::from_points([Vec3::new(0.0, 0.0, 0.0), Vec3::new(2.0, 4.0, 6.0)]).unwrap();
        assert_eq!(bounds.center(), Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn empty_mesh_has_no_bounds() {
        assert!(MeshData::default().bounds().is_none());
    }

    #[test]
    fn floats_use_an_eight_wide_stride() {
        let data = MeshData::new(
            vec![Vertex3d::new([1.0, 2.0, 3.0], [4.0, 5.0, 6.0], [7.0, 8.0])],
            vec![],
        );
        assert_eq!(data.as_floats(), &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0]);
    }
}
