use std::collections::HashSet;

use glam::DVec2;
use winit::event::ElementState;
use winit::keyboard::KeyCode;

/// Keyboard and mouselook state shared by the event adapter and the camera
/// controller.
#[derive(Debug, Default)]
pub struct InputState {
    keys_down: HashSet<KeyCode>,
    /// Whether mouselook is engaged.
    pub mouse_active: bool,
    /// Cursor position seen by the previous mouselook event.
    pub last_cursor: DVec2,
    /// Set when capture is enabled; the next cursor event only seeds
    /// `last_cursor`.
    pub first_mouse: bool,
    virtual_cursor: DVec2,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a key press or release.
    pub fn set_key(&mut self, key: KeyCode, state: ElementState) {
        match state {
            ElementState::Pressed => {
                self.keys_down.insert(key);
            }
            ElementState::Released => {
                self.keys_down.remove(&key);
            }
        }
    }

    /// Returns true if the key is currently held down.
    pub fn key_down(&self, key: KeyCode) -> bool {
        self.keys_down.contains(&key)
    }

    pub fn shift_down(&self) -> bool {
        self.key_down(KeyCode::ShiftLeft) || self.key_down(KeyCode::ShiftRight)
    }

    pub fn control_down(&self) -> bool {
        self.key_down(KeyCode::ControlLeft) || self.key_down(KeyCode::ControlRight)
    }

    /// Releases every key, e.g. when the window loses focus.
    pub fn clear_keys(&mut self) {
        self.keys_down.clear();
    }

    /// Flips mouse capture and returns the new state.
    ///
    /// Enabling capture arms `first_mouse` so the first cursor event after the
    /// toggle does not make the view jump.
    pub fn toggle_mouse_capture(&mut self) -> bool {
        self.mouse_active = !self.mouse_active;
        if self.mouse_active {
            self.first_mouse = true;
        }
        self.mouse_active
    }

    /// Turns a cursor position into a look delta.
    ///
    /// Returns `None` while capture is off and for the seeding event right
    /// after it is enabled. The Y component is `last - current` because screen
    /// Y grows downward.
    pub fn cursor_delta(&mut self, x: f64, y: f64) -> Option<DVec2> {
        if !self.mouse_active {
            return None;
        }
        let cursor = DVec2::new(x, y);
        if self.first_mouse {
            self.last_cursor = cursor;
            self.first_mouse = false;
            return None;
        }
        let delta = DVec2::new(cursor.x - self.last_cursor.x, self.last_cursor.y - cursor.y);
        self.last_cursor = cursor;
        Some(delta)
    }

    /// Advances the virtual cursor by a raw pointer motion and returns its
    /// new position.
    ///
    /// A grabbed cursor stops producing position events on some platforms, so
    /// raw motion is integrated here instead.
    pub fn accumulate_motion(&mut self, dx: f64, dy: f64) -> DVec2 {
        self.virtual_cursor += DVec2::new(dx, dy);
        self.virtual_cursor
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_track_press_and_release() {
        let mut input = InputState::new();
        input.set_key(KeyCode::KeyW, ElementState::Pressed);
        assert!(input.key_down(KeyCode::KeyW));
        assert!(!input.key_down(KeyCode::KeyS));

        input.set_key(KeyCode::KeyW, ElementState::Released);
        assert!(!input.key_down(KeyCode::KeyW));
    }

    #[test]
    fn either_modifier_side_counts() {
        let mut input = InputState::new();
        input.set_key(KeyCode::ShiftRight, ElementState::Pressed);
        input.set_key(KeyCode::ControlLeft, ElementState::Pressed);
        assert!(input.shift_down());
        assert!(input.control_down());

        input.clear_keys();
        assert!(!input.shift_down());
    }

    #[test]
    fn cursor_ignored_without_capture() {
        let mut input = InputState::new();
        assert_eq!(input.cursor_delta(10.0, 10.0), None);
    }

    #[test]
    fn first_event_after_capture_only_seeds() {
        let mut input = InputState::new();
        assert!(input.toggle_mouse_capture());
        assert!(input.first_mouse);

        assert_eq!(input.cursor_delta(100.0, 50.0), None);
        assert!(!input.first_mouse);
        assert_eq!(
            input.cursor_delta(110.0, 40.0),
            Some(DVec2::new(10.0, 10.0))
        );
    }

    #[test]
    fn re_enabling_capture_reseeds() {
        let mut input = InputState::new();
        input.toggle_mouse_capture();
        input.cursor_delta(0.0, 0.0);
        assert!(!input.toggle_mouse_capture());
        assert!(input.toggle_mouse_capture());
        assert_eq!(input.cursor_delta(500.0, 500.0), None);
    }

    #[test]
    fn motion_accumulates() {
        let mut input = InputState::new();
        input.accumulate_motion(3.0, -1.0);
        assert_eq!(input.accumulate_motion(2.0, 4.0), DVec2::new(5.0, 3.0));
    }
}
