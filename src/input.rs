//! Logical input state
//!
//! The host maps physical keys to logical keys and hands the core one
//! `InputState` per frame. Boards, screens and entities only read it.

/// Logical keys the game reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Left,
    Right,
    Up,
    Down,
    Fire,
    SpeedUp,
    SpeedDown,
}

impl Key {
    /// Map a browser `KeyboardEvent.key` value to a logical key
    pub fn from_key_name(name: &str) -> Option<Self> {
        match name {
            "ArrowLeft" | "Left" => Some(Key::Left),
            "ArrowRight" | "Right" => Some(Key::Right),
            "ArrowUp" | "Up" => Some(Key::Up),
            "ArrowDown" | "Down" => Some(Key::Down),
            " " | "Spacebar" => Some(Key::Fire),
            "=" | "+" => Some(Key::SpeedUp),
            "-" | "_" => Some(Key::SpeedDown),
            _ => None,
        }
    }
}

/// Held-state of every logical key for one frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputState {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
    pub fire: bool,
    /// One-shot: cleared by the driver after the frame that consumed it
    pub speed_up: bool,
    /// One-shot: cleared by the driver after the frame that consumed it
    pub speed_down: bool,
}

impl InputState {
    /// Record a key press or release
    pub fn set(&mut self, key: Key, down: bool) {
        match key {
            Key::Left => self.left = down,
            Key::Right => self.right = down,
            Key::Up => self.up = down,
            Key::Down => self.down = down,
            Key::Fire => self.fire = down,
            // Speed keys only latch on press
            Key::SpeedUp => self.speed_up |= down,
            Key::SpeedDown => self.speed_down |= down,
        }
    }

    pub fn is_held(&self, key: Key) -> bool {
        match key {
            Key::Left => self.left,
            Key::Right => self.right,
            Key::Up => self.up,
            Key::Down => self.down,
            Key::Fire => self.fire,
            Key::SpeedUp => self.speed_up,
            Key::SpeedDown => self.speed_down,
        }
    }

    /// Clear one-shot inputs after a frame processed them
    pub fn clear_one_shots(&mut self) {
        self.speed_up = false;
        self.speed_down = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_names() {
        assert_eq!(Key::from_key_name("ArrowLeft"), Some(Key::Left));
        assert_eq!(Key::from_key_name(" "), Some(Key::Fire));
        assert_eq!(Key::from_key_name("+"), Some(Key::SpeedUp));
        assert_eq!(Key::from_key_name("q"), None);
    }

    #[test]
    fn test_held_keys_follow_press_and_release() {
        let mut input = InputState::default();
        input.set(Key::Left, true);
        assert!(input.is_held(Key::Left));
        input.set(Key::Left, false);
        assert!(!input.is_held(Key::Left));
    }

    #[test]
    fn test_speed_keys_latch_until_cleared() {
        let mut input = InputState::default();
        input.set(Key::SpeedUp, true);
        input.set(Key::SpeedUp, false);
        assert!(input.speed_up);
        input.clear_one_shots();
        assert!(!input.speed_up);
    }
}
