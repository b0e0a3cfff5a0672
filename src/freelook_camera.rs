//! Fly-through controls for [`Camera`].
//!
//! # Controls
//!
//! - **W/S**: Move along the view direction
//! - **A/D**: Strafe left/right
//! - **E/Q**: Move up/down
//! - **Shift**: ×5 speed, **Control**: ×0.2 speed (both together compose)
//! - **Mouse** (while captured): Look around
//!
//! # Example
//!
//! ```ignore
//! let controller = FreelookController::new().speed(10.0).sensitivity(0.002);
//!
//! // In frame loop:
//! controller.update(&mut camera, &input, dt);
//!
//! // In the cursor callback:
//! if let Some(delta) = input.cursor_delta(x, y) {
//!     controller.mouse_look(&mut camera, delta);
//! }
//! ```

use glam::{DVec2, Vec3};
use winit::keyboard::KeyCode;

use crate::camera::{Camera, clamp_pitch};
use crate::input::InputState;

/// Speed factor while Shift is held.
pub const FAST_MULTIPLIER: f32 = 5.0;
/// Speed factor while Control is held.
pub const SLOW_MULTIPLIER: f32 = 0.2;

/// Accumulated directions shorter than this do not move the camera.
const MIN_MOVE_LENGTH: f32 = 1e-3;

/// Drives a [`Camera`] from keyboard and mouselook input.
#[derive(Clone, Debug)]
pub struct FreelookController {
    /// Base movement speed in units per second.
    pub speed: f32,
    /// Radians of rotation per pixel of cursor movement.
    pub sensitivity: f32,
}

impl Default for FreelookController {
    fn default() -> Self {
        Self {
            speed: 10.0,
            sensitivity: 0.002,
        }
    }
}

impl FreelookController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set movement speed.
    pub fn speed(mut self, speed: f32) -> Self {
        self.speed = speed;
        self
    }

    /// Set mouse sensitivity.
    pub fn sensitivity(mut self, sensitivity: f32) -> Self {
        self.sensitivity = sensitivity;
        self
    }

    /// Speed factor from the held modifiers.
    pub fn speed_multiplier(input: &InputState) -> f32 {
        let mut multiplier = 1.0;
        if input.shift_down() {
            multiplier *= FAST_MULTIPLIER;
        }
        if input.control_down() {
            multiplier *= SLOW_MULTIPLIER;
        }
        multiplier
    }

    /// Sum of the basis directions selected by the movement keys.
    pub fn move_direction(camera: &Camera, input: &InputState) -> Vec3 {
        let bindings = [
            (KeyCode::KeyW, camera.forward()),
            (KeyCode::KeyS, -camera.forward()),
            (KeyCode::KeyD, camera.right()),
            (KeyCode::KeyA, -camera.right()),
            (KeyCode::KeyE, camera.up()),
            (KeyCode::KeyQ, -camera.up()),
        ];
        bindings
            .into_iter()
            .filter(|(key, _)| input.key_down(*key))
            .map(|(_, dir)| dir)
            .sum()
    }

    /// Moves the camera for one frame of `dt` seconds.
    pub fn update(&self, camera: &mut Camera, input: &InputState, dt: f32) {
        let direction = Self::move_direction(camera, input);
        if direction.length() > MIN_MOVE_LENGTH {
            let distance = self.speed * Self::speed_multiplier(input) * dt;
            camera.position += direction.normalize() * distance;
        }
    }

    /// Applies a mouselook delta (`y` already points up).
    pub fn mouse_look(&self, camera: &mut Camera, delta: DVec2) {
        camera.yaw += (delta.x * self.sensitivity as f64) as f32;
        camera.pitch = clamp_pitch(camera.pitch + (delta.y * self.sensitivity as f64) as f32);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::MAX_PITCH;
    use winit::event::ElementState;

    fn pressed(keys: &[KeyCode]) -> InputState {
        let mut input = InputState::new();
        for &key in keys {
            input.set_key(key, ElementState::Pressed);
        }
        input
    }

    #[test]
    fn no_input_leaves_position_unchanged() {
        let controller = FreelookController::new();
        let mut camera = Camera::new(Vec3::new(1.0, 2.0, 3.0), 0.5, -0.3);
        let before = camera;
        controller.update(&mut camera, &InputState::new(), 0.016);
        assert_eq!(camera, before);
    }

    #[test]
    fn opposing_keys_cancel() {
        let controller = FreelookController::new();
        let mut camera = Camera::new(Vec3::ZERO, 1.0, 0.2);
        let input = pressed(&[KeyCode::KeyW, KeyCode::KeyS, KeyCode::KeyA, KeyCode::KeyD]);
        controller.update(&mut camera, &input, 1.0);
        assert_eq!(camera.position, Vec3::ZERO);
    }

    #[test]
    fn forward_moves_speed_times_dt() {
        let controller = FreelookController::new().speed(10.0);
        let mut camera = Camera::default();
        controller.update(&mut camera, &pressed(&[KeyCode::KeyW]), 0.5);
        assert!((camera.position - Vec3::new(0.0, 0.0, -5.0)).length() < 1e-5);
    }

    #[test]
    fn diagonal_movement_is_normalized() {
        let controller = FreelookController::new().speed(1.0);
        let mut camera = Camera::default();
        controller.update(&mut camera, &pressed(&[KeyCode::KeyD, KeyCode::KeyE]), 1.0);
        assert!((camera.position.length() - 1.0).abs() < 1e-5);
        assert!(camera.position.x > 0.0 && camera.position.y > 0.0);
    }

    #[test]
    fn modifiers_compose() {
        assert_eq!(FreelookController::speed_multiplier(&InputState::new()), 1.0);
        assert_eq!(
            FreelookController::speed_multiplier(&pressed(&[KeyCode::ShiftLeft])),
            5.0
        );
        assert_eq!(
            FreelookController::speed_multiplier(&pressed(&[KeyCode::ControlRight])),
            0.2
        );
        let both = FreelookController::speed_multiplier(&pressed(&[
            KeyCode::ShiftRight,
            KeyCode::ControlLeft,
        ]));
        assert!((both - 1.0).abs() < 1e-6);
    }

    #[test]
    fn pitch_stays_clamped() {
        let controller = FreelookController::new();
        let mut camera = Camera::default();
        for _ in 0..1000 {
            controller.mouse_look(&mut camera, DVec2::new(3.0, 500.0));
            assert!(camera.pitch <= MAX_PITCH);
        }
        assert_eq!(camera.pitch, MAX_PITCH);
        for _ in 0..1000 {
            controller.mouse_look(&mut camera, DVec2::new(-3.0, -500.0));
            assert!(camera.pitch >= -MAX_PITCH);
        }
        assert_eq!(camera.pitch, -MAX_PITCH);
    }

    #[test]
    fn yaw_follows_horizontal_delta() {
        let controller = FreelookController::new().sensitivity(0.01);
        let mut camera = Camera::default();
        controller.mouse_look(&mut camera, DVec2::new(100.0, 0.0));
        assert!((camera.yaw - 1.0).abs() < 1e-6);
        assert_eq!(camera.pitch, 0.0);
    }
}
