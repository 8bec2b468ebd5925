// Mirrorboard Input Layer - Raw Event Model
// Device-independent representation of an evdev input_event

use std::time::Duration;

use crate::{Action, Key};

/// EV_SYN event type code from input-event-codes.h
pub const EV_SYN: u16 = 0x00;
/// EV_KEY event type code from input-event-codes.h
pub const EV_KEY: u16 = 0x01;
/// SYN_REPORT code, the marker that closes a group of events
pub const SYN_REPORT: u16 = 0x00;

/// Check if an event type is a key event.
pub fn is_key_event(event_type: u16) -> bool {
    event_type == EV_KEY
}

/// The `type` field of an input event, with the two kinds the translator
/// cares about pulled out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// EV_SYN (synchronization markers)
    Sync,
    /// EV_KEY
    Key,
    /// Any other event type, kept verbatim
    Other(u16),
}

impl EventKind {
    pub fn from_type(event_type: u16) -> Self {
        match event_type {
            EV_SYN => EventKind::Sync,
            EV_KEY => EventKind::Key,
            other => EventKind::Other(other),
        }
    }

    pub fn event_type(self) -> u16 {
        match self {
            EventKind::Sync => EV_SYN,
            EventKind::Key => EV_KEY,
            EventKind::Other(t) => t,
        }
    }
}

/// A single raw input event as read from (or written to) a device.
///
/// `time` is the kernel timestamp as a duration since the UNIX epoch. Only
/// differences between timestamps are ever used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MirrorEvent {
    pub kind: EventKind,
    pub code: u16,
    pub value: i32,
    pub time: Duration,
}

impl MirrorEvent {
    /// Build an event from its raw evdev fields
    pub fn new(event_type: u16, code: u16, value: i32, time: Duration) -> Self {
        Self {
            kind: EventKind::from_type(event_type),
            code,
            value,
            time,
        }
    }

    /// A key event for `key` with the given action
    pub fn key(key: Key, action: Action, time: Duration) -> Self {
        Self {
            kind: EventKind::Key,
            code: key.code(),
            value: action.value(),
            time,
        }
    }

    /// A SYN_REPORT marker
    pub fn sync(time: Duration) -> Self {
        Self {
            kind: EventKind::Sync,
            code: SYN_REPORT,
            value: 0,
            time,
        }
    }

    pub fn is_key(&self) -> bool {
        is_key_event(self.kind.event_type())
    }

    /// The key code, meaningful only for key events
    pub fn key_code(&self) -> Key {
        Key(self.code)
    }

    /// The key action, `None` for non-key events and out-of-range values
    pub fn action(&self) -> Option<Action> {
        if self.is_key() {
            Action::from_value(self.value)
        } else {
            None
        }
    }

    /// Same event with its key code replaced
    pub fn with_key(self, key: Key) -> Self {
        Self {
            code: key.code(),
            ..self
        }
    }
}

#[cfg(feature = "device")]
mod evdev_conv {
    use super::MirrorEvent;
    use std::time::UNIX_EPOCH;

    impl From<&evdev::InputEvent> for MirrorEvent {
        fn from(event: &evdev::InputEvent) -> Self {
            let time = event
                .timestamp()
                .duration_since(UNIX_EPOCH)
                .unwrap_or_default();
            MirrorEvent::new(event.event_type().0, event.code(), event.value(), time)
        }
    }

    impl From<&MirrorEvent> for evdev::InputEvent {
        fn from(event: &MirrorEvent) -> Self {
            // The kernel stamps uinput events on write
            evdev::InputEvent::new(
                evdev::EventType(event.kind.event_type()),
                event.code,
                event.value,
            )
        }
    }
}
