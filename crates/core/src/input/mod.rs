use std::{fmt, str::FromStr};

use crate::PlayerError;

/// Physical keys the frame loop watches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Escape,
    F2,
    Minus,
    Equal,
}

impl Key {
    pub const ALL: [Key; 4] = [Key::Escape, Key::F2, Key::Minus, Key::Equal];

    pub fn name(self) -> &'static str {
        match self {
            Key::Escape => "escape",
            Key::F2 => "f2",
            Key::Minus => "minus",
            Key::Equal => "equal",
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Key {
    type Err = PlayerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        Key::ALL
            .into_iter()
            .find(|key| key.name() == lowered)
            .ok_or_else(|| PlayerError::msg(format!("unknown key `{s}`")))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ButtonState {
    #[default]
    Released,
    Pressed,
}

/// Two-state debouncer: reports a press once per physical press, no matter
/// how many frames the key stays down.
#[derive(Debug, Clone, Copy, Default)]
pub struct EdgeTrigger {
    state: ButtonState,
}

impl EdgeTrigger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> ButtonState {
        self.state
    }

    /// Feeds this frame's polled state; true only on `Released -> Pressed`.
    pub fn update(&mut self, pressed: bool) -> bool {
        let next = if pressed {
            ButtonState::Pressed
        } else {
            ButtonState::Released
        };
        let fired = self.state == ButtonState::Released && next == ButtonState::Pressed;
        self.state = next;
        fired
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn holding_fires_once() {
        let mut trigger = EdgeTrigger::new();
        let fired = (0..10).filter(|_| trigger.update(true)).count();
        assert_eq!(fired, 1);
        assert_eq!(trigger.state(), ButtonState::Pressed);
    }

    #[test]
    fn release_rearms_the_trigger() {
        let mut trigger = EdgeTrigger::new();
        let polls = [true, true, false, false, true, false, true, true];
        let fired: Vec<bool> = polls.iter().map(|&p| trigger.update(p)).collect();
        assert_eq!(
            fired,
            [true, false, false, false, true, false, true, false]
        );
    }

    #[test]
    fn parses_key_names() {
        assert_eq!("F2".parse::<Key>().unwrap(), Key::F2);
        assert_eq!(" equal ".parse::<Key>().unwrap(), Key::Equal);
        assert!("space".parse::<Key>().is_err());
    }
}
