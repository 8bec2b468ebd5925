// Mirrorboard Event Loop
// Physical device discovery, exclusive grab and timed reads

use std::os::unix::io::AsRawFd;
use std::path::{Path, PathBuf};

use evdev::{Device, EventType};

use crate::input::MirrorEvent;
use crate::Key;

/// Result type for event loop operations
pub type EventLoopResult<T> = Result<T, EventLoopError>;

/// Errors that can occur in event loop
#[derive(Debug, thiserror::Error)]
pub enum EventLoopError {
    #[error("Device not found: {0}")]
    DeviceNotFound(String),

    #[error("No input devices found")]
    NoDevices,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Device information for listing devices
#[derive(Debug, Clone)]
pub struct DeviceInfo {
    /// Position in the sorted device list
    pub index: usize,
    pub path: PathBuf,
    pub name: String,
    /// Physical path reported by the driver
    pub phys: Option<String>,
    /// Whether the device looks like a full keyboard
    pub is_keyboard: bool,
}

/// Reader for a single physical input device.
///
/// Ungrabs the device on drop, so a panic or early return never leaves the
/// keyboard captured.
pub struct EventLoop {
    device: Device,
    path: PathBuf,
    poll_fd: libc::pollfd,
    grabbed: bool,
}

impl EventLoop {
    /// List every input device, sorted by event node number so indices are
    /// stable between runs. Having no devices is not an error here; only
    /// opening one is.
    pub fn list_devices() -> EventLoopResult<Vec<DeviceInfo>> {
        let devices: Vec<DeviceInfo> = Self::enumerate_sorted()
            .into_iter()
            .enumerate()
            .map(|(index, (path, device))| DeviceInfo {
                index,
                name: device.name().unwrap_or("Unknown").to_string(),
                phys: device.physical_path().map(str::to_string),
                is_keyboard: Self::is_keyboard_device(&device),
                path,
            })
            .collect();

        if devices.is_empty() {
            log::info!("no input devices found");
        }
        Ok(devices)
    }

    /// Open the device at `index` in [`EventLoop::list_devices`] order
    pub fn open(index: usize) -> EventLoopResult<Self> {
        let mut devices = Self::enumerate_sorted();
        if devices.is_empty() {
            return Err(EventLoopError::NoDevices);
        }
        if index >= devices.len() {
            return Err(EventLoopError::DeviceNotFound(format!(
                "index {} (have {} devices)",
                index,
                devices.len()
            )));
        }
        let (path, device) = devices.swap_remove(index);
        Ok(Self::from_device(device, path))
    }

    /// Open the device node at `path`
    pub fn open_path<P: AsRef<Path>>(path: P) -> EventLoopResult<Self> {
        let path = path.as_ref();
        let device = Device::open(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => {
                EventLoopError::DeviceNotFound(path.display().to_string())
            }
            _ => EventLoopError::Io(e),
        })?;
        Ok(Self::from_device(device, path.to_path_buf()))
    }

    fn from_device(device: Device, path: PathBuf) -> Self {
        let poll_fd = libc::pollfd {
            fd: device.as_raw_fd(),
            events: libc::POLLIN,
            revents: 0,
        };
        Self {
            device,
            path,
            poll_fd,
            grabbed: false,
        }
    }

    fn enumerate_sorted() -> Vec<(PathBuf, Device)> {
        let mut devices: Vec<(PathBuf, Device)> = evdev::enumerate().collect();
        devices.sort_by_key(|(path, _)| event_node_number(path));
        devices
    }

    /// A device is a keyboard if it reports EV_KEY with the QWERTY row,
    /// A, Z and SPACE.
    fn is_keyboard_device(device: &Device) -> bool {
        if !device.supported_events().contains(EventType::KEY) {
            return false;
        }
        let Some(keys) = device.supported_keys() else {
            return false;
        };
        [
            Key::Q,
            Key::W,
            Key::E,
            Key::R,
            Key::T,
            Key::Y,
            Key::A,
            Key::Z,
            Key::SPACE,
        ]
        .iter()
        .all(|key| keys.contains(evdev::Key::new(key.code())))
    }

    /// Take exclusive access so the original events stop reaching the system
    pub fn grab(&mut self) -> EventLoopResult<()> {
        if !self.grabbed {
            self.device.grab()?;
            self.grabbed = true;
            log::info!("grabbed {}", self.name());
        }
        Ok(())
    }

    /// Release exclusive access
    pub fn ungrab(&mut self) {
        if self.grabbed {
            if let Err(e) = self.device.ungrab() {
                log::warn!("failed to ungrab {}: {}", self.name(), e);
            }
            self.grabbed = false;
            log::info!("released {}", self.name());
        }
    }

    pub fn name(&self) -> &str {
        self.device.name().unwrap_or("Unknown")
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Wait up to `timeout_ms` for events and return them in arrival order.
    ///
    /// A timeout or an interrupted wait (EINTR, e.g. Ctrl+C) returns an empty
    /// vector so the caller can check its shutdown flag.
    pub fn poll_events(&mut self, timeout_ms: i32) -> EventLoopResult<Vec<MirrorEvent>> {
        self.poll_fd.revents = 0;
        // SAFETY: poll_fd points at one valid pollfd for the device we own
        let ready = unsafe { libc::poll(&mut self.poll_fd, 1, timeout_ms) };

        if ready < 0 {
            let err = std::io::Error::last_os_error();
            if err.kind() == std::io::ErrorKind::Interrupted {
                return Ok(Vec::new());
            }
            return Err(EventLoopError::Io(err));
        }
        if ready == 0 || self.poll_fd.revents & libc::POLLIN == 0 {
            return Ok(Vec::new());
        }

        let events = self
            .device
            .fetch_events()?
            .map(|event| MirrorEvent::from(&event))
            .collect();
        Ok(events)
    }
}

impl Drop for EventLoop {
    fn drop(&mut self) {
        self.ungrab();
    }
}

/// Trailing number of an event node path, `/dev/input/event12` -> 12
fn event_node_number(path: &Path) -> (u32, PathBuf) {
    let number = path
        .file_name()
        .and_then(|n| n.to_str())
        .and_then(|n| n.strip_prefix("event"))
        .and_then(|n| n.parse().ok())
        .unwrap_or(u32::MAX);
    (number, path.to_path_buf())
}
