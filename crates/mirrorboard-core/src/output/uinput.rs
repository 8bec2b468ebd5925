// Mirrorboard uinput Output Layer
// Virtual device creation and event injection

use evdev::uinput::VirtualDeviceBuilder;
use evdev::AttributeSet;

use crate::input::MirrorEvent;
use crate::{Action, Key};

/// Name of the virtual keyboard, also used to recognize it in device lists
pub const VIRTUAL_DEVICE_NAME: &str = "Mirrorboard (virtual) Keyboard";

/// Error types for uinput operations
#[derive(Debug, thiserror::Error)]
pub enum UInputError {
    #[error("Failed to create virtual device: {0}")]
    DeviceCreation(#[source] std::io::Error),

    #[error("Failed to write event: {0}")]
    WriteError(#[source] std::io::Error),
}

/// Virtual uinput keyboard that receives the translated stream
pub struct VirtualDevice {
    device: evdev::uinput::VirtualDevice,
    /// Keys this device currently holds down
    pressed: Vec<Key>,
}

impl VirtualDevice {
    /// Create a virtual keyboard exposing all standard key codes
    pub fn new() -> Result<Self, UInputError> {
        Self::with_name(VIRTUAL_DEVICE_NAME)
    }

    /// Create a virtual keyboard with a custom name
    pub fn with_name(name: &str) -> Result<Self, UInputError> {
        let mut keys = AttributeSet::new();
        for code in 0..256u16 {
            keys.insert(evdev::Key::new(code));
        }

        let device = VirtualDeviceBuilder::new()
            .map_err(UInputError::DeviceCreation)?
            .name(name)
            .with_keys(&keys)
            .map_err(UInputError::DeviceCreation)?
            .build()
            .map_err(UInputError::DeviceCreation)?;

        log::info!("created virtual device '{}'", name);
        Ok(Self {
            device,
            pressed: Vec::new(),
        })
    }

    /// Inject a batch of events, preserving their order.
    ///
    /// Empty batches are a no-op.
    pub fn emit(&mut self, events: &[MirrorEvent]) -> Result<(), UInputError> {
        if events.is_empty() {
            return Ok(());
        }

        let raw: Vec<evdev::InputEvent> = events.iter().map(evdev::InputEvent::from).collect();
        self.device.emit(&raw).map_err(UInputError::WriteError)?;

        for event in events {
            self.track(event);
        }
        Ok(())
    }

    fn track(&mut self, event: &MirrorEvent) {
        let key = event.key_code();
        match event.action() {
            Some(Action::Press) => {
                if !self.pressed.contains(&key) {
                    self.pressed.push(key);
                }
            }
            Some(Action::Release) => self.pressed.retain(|k| *k != key),
            Some(Action::Repeat) | None => {}
        }
    }

    /// Release every key this device still holds down, e.g. on shutdown
    pub fn release_all(&mut self) -> Result<(), UInputError> {
        if self.pressed.is_empty() {
            return Ok(());
        }
        let mut events: Vec<MirrorEvent> = self
            .pressed
            .iter()
            .map(|key| MirrorEvent::key(*key, Action::Release, Default::default()))
            .collect();
        events.push(MirrorEvent::sync(Default::default()));

        log::debug!("releasing {} held key(s)", self.pressed.len());
        self.emit(&events)
    }
}
