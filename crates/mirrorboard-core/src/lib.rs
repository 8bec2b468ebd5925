// Mirrorboard Core Library
// Mirror layer translation and the evdev plumbing around it

pub mod action;
pub mod config;
pub mod input;
pub mod key;
pub mod mapping;
pub mod state;
pub mod transform;

#[cfg(feature = "device")]
pub mod event;

#[cfg(feature = "device")]
pub mod output;

pub use action::Action;
pub use config::{ConfigError, MirrorConfig, MIRROR_LAYOUT};
pub use input::{EventKind, MirrorEvent};
pub use key::Key;
pub use mapping::RemapTable;
pub use state::{MarkedSets, Mode};
pub use transform::{Anomaly, EventBatch, MirrorTranslator, Translation};

#[cfg(feature = "device")]
pub use event::{DeviceInfo, EventLoop, EventLoopError, EventLoopResult};

#[cfg(feature = "device")]
pub use output::{UInputError, VirtualDevice};
