use glam::Vec3;

use crate::math::Mat44;

/// Pitch stays this far away from straight up or down.
pub const PITCH_MARGIN: f32 = 0.1;

/// Largest pitch magnitude the camera accepts.
pub const MAX_PITCH: f32 = std::f32::consts::FRAC_PI_2 - PITCH_MARGIN;

/// A yaw/pitch camera in a right-handed, Y-up world.
///
/// At `yaw = 0, pitch = 0` it looks down -Z with +X to the right.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    /// Horizontal angle in radians, about +Y.
    pub yaw: f32,
    /// Vertical angle in radians, positive looks up.
    pub pitch: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            yaw: 0.0,
            pitch: 0.0,
        }
    }
}

impl Camera {
    pub fn new(position: Vec3, yaw: f32, pitch: f32) -> Self {
        Self {
            position,
            yaw,
            pitch: clamp_pitch(pitch),
        }
    }

    /// View direction: -Z rotated by pitch about X, then by yaw about Y.
    pub fn forward(&self) -> Vec3 {
        let (sy, cy) = self.yaw.sin_cos();
        let (sp, cp) = self.pitch.sin_cos();
        Vec3::new(-sy * cp, sp, -cy * cp)
    }

    /// Horizontal strafe direction.
    pub fn right(&self) -> Vec3 {
        let (sy, cy) = self.yaw.sin_cos();
        Vec3::new(cy, 0.0, -sy)
    }

    /// Always world up; E/Q move straight up and down.
    pub fn up(&self) -> Vec3 {
        Vec3::Y
    }

    /// World-to-view matrix built straight from the basis, no inversion.
    #[rustfmt::skip]
    pub fn view_matrix(&self) -> Mat44 {
        let (r, u, f, p) = (self.right(), self.up(), self.forward(), self.position);
        Mat44::from_rows([
            [ r.x,  r.y,  r.z, -r.dot(p)],
            [ u.x,  u.y,  u.z, -u.dot(p)],
            [-f.x, -f.y, -f.z,  f.dot(p)],
            [ 0.0,  0.0,  0.0,  1.0     ],
        ])
    }

    /// View-to-world matrix with the basis vectors as columns.
    #[rustfmt::skip]
    pub fn camera_to_world(&self) -> Mat44 {
        let (r, u, f, p) = (self.right(), self.up(), self.forward(), self.position);
        Mat44::from_rows([
            [r.x, u.x, -f.x, p.x],
            [r.y, u.y, -f.y, p.y],
            [r.z, u.z, -f.z, p.z],
            [0.0, 0.0,  0.0, 1.0],
        ])
    }
}

/// Clamps a pitch angle to `[-MAX_PITCH, MAX_PITCH]`.
pub fn clamp_pitch(pitch: f32) -> f32 {
    pitch.clamp(-MAX_PITCH, MAX_PITCH)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn assert_identity(m: &Mat44) {
        for i in 0..4 {
            for j in 0..4 {
                let expected = if i == j { 1.0 } else { 0.0 };
                assert!(
                    (m[(i, j)] - expected).abs() < 1e-6,
                    "element ({i}, {j}) = {}",
                    m[(i, j)]
                );
            }
        }
    }

    #[test]
    fn rest_pose_looks_down_negative_z() {
        let camera = Camera::default();
        assert_relative_eq!(camera.forward().x, 0.0);
        assert_relative_eq!(camera.forward().y, 0.0);
        assert_relative_eq!(camera.forward().z, -1.0);
        assert_eq!(camera.right(), Vec3::X);
    }

    #[test]
    fn level_basis_is_orthonormal_and_right_handed() {
        for yaw in [0.0_f32, 0.7, 2.0, -1.3, 5.5] {
            let camera = Camera::new(Vec3::ZERO, yaw, 0.0);
            let (r, u, f) = (camera.right(), camera.up(), camera.forward());
            assert!((f.length() - 1.0).abs() < 1e-6);
            assert!(r.dot(f).abs() < 1e-6);
            assert!(u.dot(f).abs() < 1e-6);
            assert!((f.cross(u) - r).length() < 1e-6);
        }
    }

    #[test]
    fn view_inverts_camera_to_world() {
        for (yaw, pos) in [
            (0.0, Vec3::ZERO),
            (0.9, Vec3::new(3.0, -2.0, 10.0)),
            (-2.4, Vec3::new(-120.0, 40.0, 7.5)),
        ] {
            let camera = Camera::new(pos, yaw, 0.0);
            let product = camera.view_matrix() * camera.camera_to_world();
            for i in 0..4 {
                for j in 0..4 {
                    let expected = if i == j { 1.0 } else { 0.0 };
                    assert!((product[(i, j)] - expected).abs() < 1e-4);
                }
            }
        }
    }

    #[test]
    fn view_at_origin_is_identity() {
        assert_identity(&Camera::default().view_matrix());
    }

    #[test]
    fn view_moves_camera_to_origin() {
        let camera = Camera::new(Vec3::new(5.0, 6.0, 7.0), 1.1, -0.3);
        let p = camera.view_matrix().transform_point(camera.position);
        assert!(p.length() < 1e-5);
    }

    #[test]
    fn point_ahead_has_negative_view_z() {
        let camera = Camera::new(Vec3::new(1.0, 2.0, 3.0), 0.4, 0.0);
        let ahead = camera.position + camera.forward() * 10.0;
        let p = camera.view_matrix().transform_point(ahead);
        assert_relative_eq!(p.z, -10.0, epsilon = 1e-4);
    }

    #[test]
    fn constructor_clamps_pitch() {
        assert_eq!(Camera::new(Vec3::ZERO, 0.0, 3.0).pitch, MAX_PITCH);
        assert_eq!(Camera::new(Vec3::ZERO, 0.0, -3.0).pitch, -MAX_PITCH);
    }
}
