use strum_macros::{Display, EnumIter};

/// Represents the action state of a key event.
///
/// The discriminants are the evdev `value` field of an EV_KEY event:
///   0 == released
///   1 == pressed
///   2 == repeated (autorepeat while held)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
#[strum(serialize_all = "lowercase")]
#[repr(i32)]
pub enum Action {
    Release = 0,
    Press = 1,
    Repeat = 2,
}

impl Action {
    /// Create Action from an evdev key event value
    pub fn from_value(value: i32) -> Option<Self> {
        match value {
            0 => Some(Action::Release),
            1 => Some(Action::Press),
            2 => Some(Action::Repeat),
            _ => None,
        }
    }

    /// Convert Action to its evdev value
    pub fn value(self) -> i32 {
        self as i32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_action_from_value() {
        assert_eq!(Action::from_value(0), Some(Action::Release));
        assert_eq!(Action::from_value(1), Some(Action::Press));
        assert_eq!(Action::from_value(2), Some(Action::Repeat));
        assert_eq!(Action::from_value(3), None);
        assert_eq!(Action::from_value(-1), None);
    }

    #[test]
    fn test_action_value_round_trip() {
        for action in Action::iter() {
            assert_eq!(Action::from_value(action.value()), Some(action));
        }
    }

    #[test]
    fn test_action_display() {
        assert_eq!(Action::Press.to_string(), "press");
        assert_eq!(Action::Release.to_string(), "release");
        assert_eq!(Action::Repeat.to_string(), "repeat");
    }
}
