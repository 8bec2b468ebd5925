// Mirrorboard Event Handling
// Physical input device access

pub mod r#loop;

pub use r#loop::{DeviceInfo, EventLoop, EventLoopError, EventLoopResult};
