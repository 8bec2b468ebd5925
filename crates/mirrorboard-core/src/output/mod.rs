// Mirrorboard Output Layer
// Virtual keyboard that injects translated events

mod uinput;

pub use uinput::{UInputError, VirtualDevice, VIRTUAL_DEVICE_NAME};
