// Mirrorboard Transform Module
// Core translation logic for keyboard event processing

pub mod mirror;

pub use mirror::{Anomaly, EventBatch, MirrorTranslator, Translation};
