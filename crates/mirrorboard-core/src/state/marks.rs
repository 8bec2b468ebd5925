// Mirrorboard Mark Tracker
// Per-mode sets of keys whose press has not yet been matched by a release

use std::collections::HashSet;

use strum_macros::{Display, EnumIter};

use crate::Key;

/// Which layout is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumIter)]
pub enum Mode {
    /// Base layout
    #[default]
    Outside,
    /// Mirror layout, active while the trigger is held
    Inside,
}

/// Outcome of a mark/unmark request that did not change anything
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkConflict {
    /// The key was already marked under this mode
    AlreadyMarked,
    /// The key was not marked under this mode
    NotMarked,
}

/// Keys whose most recent press was handled under each mode.
///
/// A key is in at most one of the two sets. Marking it under one mode drops
/// any stale mark it still had under the other.
#[derive(Debug, Clone, Default)]
pub struct MarkedSets {
    outside: HashSet<Key>,
    inside: HashSet<Key>,
}

impl MarkedSets {
    pub fn new() -> Self {
        Self::default()
    }

    fn set(&self, mode: Mode) -> &HashSet<Key> {
        match mode {
            Mode::Outside => &self.outside,
            Mode::Inside => &self.inside,
        }
    }

    fn set_mut(&mut self, mode: Mode) -> &mut HashSet<Key> {
        match mode {
            Mode::Outside => &mut self.outside,
            Mode::Inside => &mut self.inside,
        }
    }

    fn other(mode: Mode) -> Mode {
        match mode {
            Mode::Outside => Mode::Inside,
            Mode::Inside => Mode::Outside,
        }
    }

    /// Check if `key` is marked under `mode`
    pub fn is_marked(&self, mode: Mode, key: Key) -> bool {
        self.set(mode).contains(&key)
    }

    /// Mark `key` under `mode`
    pub fn mark(&mut self, mode: Mode, key: Key) -> Result<(), MarkConflict> {
        if self.set_mut(Self::other(mode)).remove(&key) {
            log::debug!("dropped stale {} mark for {}", Self::other(mode), key);
        }
        if self.set_mut(mode).insert(key) {
            Ok(())
        } else {
            Err(MarkConflict::AlreadyMarked)
        }
    }

    /// Unmark `key` under `mode`
    pub fn unmark(&mut self, mode: Mode, key: Key) -> Result<(), MarkConflict> {
        if self.set_mut(mode).remove(&key) {
            Ok(())
        } else {
            Err(MarkConflict::NotMarked)
        }
    }

    /// Number of keys marked under `mode`
    pub fn len(&self, mode: Mode) -> usize {
        self.set(mode).len()
    }

    pub fn is_empty(&self) -> bool {
        self.outside.is_empty() && self.inside.is_empty()
    }
}
