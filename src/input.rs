//! Control input
//!
//! Keyboard, drag gestures and on-screen buttons all collapse into four
//! independent booleans. The update step only ever sees `ControlInput`.

use glam::Vec2;

use crate::consts::DRAG_THRESHOLD;

/// One of the four movement axes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Map a `KeyboardEvent.key` value to a direction (arrows and WASD)
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "ArrowUp" | "w" | "W" => Some(Direction::Up),
            "ArrowDown" | "s" | "S" => Some(Direction::Down),
            "ArrowLeft" | "a" | "A" => Some(Direction::Left),
            "ArrowRight" | "d" | "D" => Some(Direction::Right),
            _ => None,
        }
    }
}

/// Current movement intent
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ControlInput {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
}

impl ControlInput {
    /// Set or clear one axis
    pub fn set(&mut self, dir: Direction, pressed: bool) {
        match dir {
            Direction::Up => self.up = pressed,
            Direction::Down => self.down = pressed,
            Direction::Left => self.left = pressed,
            Direction::Right => self.right = pressed,
        }
    }

    /// Apply a key press/release. Returns true if the key was a movement key.
    pub fn apply_key(&mut self, key: &str, pressed: bool) -> bool {
        match Direction::from_key(key) {
            Some(dir) => {
                self.set(dir, pressed);
                true
            }
            None => false,
        }
    }

    /// Clear all four axes (control released, gesture ended)
    pub fn release_all(&mut self) {
        *self = Self::default();
    }

    /// Unit direction vector, or zero when nothing (or only opposites) is held
    ///
    /// Screen space: +x is right, +y is down.
    pub fn direction(&self) -> Vec2 {
        let axis = |neg: bool, pos: bool| (pos as i8 - neg as i8) as f32;
        Vec2::new(axis(self.left, self.right), axis(self.up, self.down)).normalize_or_zero()
    }
}

/// Drag-to-move touch gesture
#[derive(Debug, Clone, Copy, Default)]
pub struct DragGesture {
    origin: Option<Vec2>,
}

impl DragGesture {
    /// Touch went down at `(x, y)`
    pub fn begin(&mut self, x: f32, y: f32) {
        self.origin = Some(Vec2::new(x, y));
    }

    /// Touch moved; rewrites all four axes from the displacement
    pub fn update(&mut self, x: f32, y: f32, input: &mut ControlInput) {
        let Some(origin) = self.origin else { return };
        let delta = Vec2::new(x, y) - origin;
        input.left = delta.x < -DRAG_THRESHOLD;
        input.right = delta.x > DRAG_THRESHOLD;
        input.up = delta.y < -DRAG_THRESHOLD;
        input.down = delta.y > DRAG_THRESHOLD;
    }

    /// Touch lifted
    pub fn end(&mut self, input: &mut ControlInput) {
        self.origin = None;
        input.release_all();
    }

    pub fn is_active(&self) -> bool {
        self.origin.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_mapping() {
        let mut input = ControlInput::default();
        assert!(input.apply_key("ArrowUp", true));
        assert!(input.apply_key("d", true));
        assert!(!input.apply_key("Enter", true));
        assert!(input.up && input.right);
        assert!(!input.down && !input.left);

        input.apply_key("ArrowUp", false);
        assert!(!input.up);
        assert!(input.right);
    }

    #[test]
    fn test_direction_normalized() {
        let input = ControlInput {
            up: true,
            left: true,
            ..Default::default()
        };
        let dir = input.direction();
        assert!((dir.length() - 1.0).abs() < 1e-6);
        assert!(dir.x < 0.0 && dir.y < 0.0);
    }

    #[test]
    fn test_opposites_cancel() {
        let input = ControlInput {
            left: true,
            right: true,
            ..Default::default()
        };
        assert_eq!(input.direction(), Vec2::ZERO);
        assert_eq!(ControlInput::default().direction(), Vec2::ZERO);
    }

    #[test]
    fn test_drag_threshold() {
        let mut input = ControlInput::default();
        let mut drag = DragGesture::default();

        // Moving without a touch origin does nothing
        drag.update(100.0, 100.0, &mut input);
        assert_eq!(input, ControlInput::default());

        drag.begin(50.0, 50.0);
        drag.update(57.0, 40.0, &mut input);
        assert!(!input.right, "7px is under the threshold");
        assert!(input.up);

        drag.update(70.0, 50.0, &mut input);
        assert!(input.right);
        assert!(!input.up);
    }

    #[test]
    fn test_drag_end_clears_everything() {
        let mut input = ControlInput {
            up: true,
            down: false,
            left: true,
            right: false,
        };
        let mut drag = DragGesture::default();
        drag.begin(0.0, 0.0);
        drag.end(&mut input);
        assert!(!drag.is_active());
        assert_eq!(input, ControlInput::default());
    }

    #[test]
    fn test_interrupted_input_releases_held_keys() {
        let mut input = ControlInput::default();
        let mut drag = DragGesture::default();
        input.apply_key("ArrowLeft", true);
        input.apply_key("s", true);
        assert!(input.left && input.down);
        drag.begin(10.0, 10.0);
        drag.update(40.0, 10.0, &mut input);
        assert!(input.right && !input.left);

        // Cancelled touch or lost focus: no release events will follow
        drag.end(&mut input);
        assert!(!drag.is_active());
        assert_eq!(input, ControlInput::default());
        assert_eq!(input.direction(), Vec2::ZERO);
    }
}
