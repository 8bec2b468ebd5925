// Mirrorboard Input Layer
// Raw event model shared by the device loop and the translator

mod event;

pub use event::{is_key_event, EventKind, MirrorEvent, EV_KEY, EV_SYN, SYN_REPORT};
