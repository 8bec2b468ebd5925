// Mirrorboard State
// Mode and per-mode key marks owned by the translator

mod marks;

pub use marks::{MarkConflict, MarkedSets, Mode};
