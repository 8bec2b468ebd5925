// Mirrorboard Transform Engine
// Momentary mirror layer: hold the trigger for the mirrored layout, tap it
// to type the trigger key itself.

use std::fmt;
use std::time::Duration;

use smallvec::{smallvec, SmallVec};

use crate::config::{ConfigError, MirrorConfig};
use crate::input::MirrorEvent;
use crate::mapping::RemapTable;
use crate::state::{MarkConflict, MarkedSets, Mode};
use crate::{Action, Key};

/// Output of one `handle` call: at most a press, a release and a sync
pub type EventBatch = SmallVec<[MirrorEvent; 3]>;

/// Something unexpected in the input stream. Never fatal: the event is still
/// translated using the documented fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anomaly {
    /// Press of a key already marked under the active mode
    AlreadyMarked { key: Key, mode: Mode },
    /// Release of a key not marked under the active mode
    NotMarked { key: Key, mode: Mode },
    /// Key event whose value is not release/press/repeat
    UnhandledAction { key: Key, value: i32, mode: Mode },
}

impl fmt::Display for Anomaly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Anomaly::AlreadyMarked { key, mode } => {
                write!(f, "attempt to mark already marked key {} ({})", key, mode)
            }
            Anomaly::NotMarked { key, mode } => {
                write!(f, "attempt to unmark already unmarked key {} ({})", key, mode)
            }
            Anomaly::UnhandledAction { key, value, mode } => {
                write!(f, "unhandled value {} for key {} ({})", value, key, mode)
            }
        }
    }
}

fn conflict_anomaly(conflict: MarkConflict, key: Key, mode: Mode) -> Anomaly {
    match conflict {
        MarkConflict::AlreadyMarked => Anomaly::AlreadyMarked { key, mode },
        MarkConflict::NotMarked => Anomaly::NotMarked { key, mode },
    }
}

/// Result of translating a single input event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Translation {
    /// Events to inject, in order
    pub events: EventBatch,
    /// Set when the input event was unexpected in the current state
    pub anomaly: Option<Anomaly>,
}

impl Translation {
    fn swallow() -> Self {
        Self {
            events: SmallVec::new(),
            anomaly: None,
        }
    }

    fn single(event: MirrorEvent) -> Self {
        Self {
            events: smallvec![event],
            anomaly: None,
        }
    }

    fn with_anomaly(mut self, anomaly: Option<Anomaly>) -> Self {
        if let Some(a) = anomaly {
            log::warn!("{}", a);
        }
        self.anomaly = anomaly;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

/// The mirror layer state machine.
///
/// Feed every raw event through [`MirrorTranslator::handle`] in arrival
/// order and inject the returned events in order.
#[derive(Debug, Clone)]
pub struct MirrorTranslator {
    table: RemapTable,
    trigger: Key,
    burst_threshold: Duration,
    mode: Mode,
    marks: MarkedSets,
    entered_at: Duration,
}

impl MirrorTranslator {
    /// Validate `config` and build a translator in the Outside mode.
    pub fn new(config: MirrorConfig) -> Result<Self, ConfigError> {
        if config.burst_threshold.is_zero() {
            return Err(ConfigError::ZeroThreshold);
        }
        let table = RemapTable::from_pairs(config.pairs)?;
        if table.contains(config.trigger) {
            return Err(ConfigError::TriggerRemapped(config.trigger));
        }

        log::debug!(
            "mirror translator ready: trigger={} burst={:?} pairs={}",
            config.trigger,
            config.burst_threshold,
            table.len()
        );

        Ok(Self {
            table,
            trigger: config.trigger,
            burst_threshold: config.burst_threshold,
            mode: Mode::Outside,
            marks: MarkedSets::new(),
            entered_at: Duration::ZERO,
        })
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn trigger(&self) -> Key {
        self.trigger
    }

    pub fn burst_threshold(&self) -> Duration {
        self.burst_threshold
    }

    pub fn table(&self) -> &RemapTable {
        &self.table
    }

    pub fn marks(&self) -> &MarkedSets {
        &self.marks
    }

    pub fn is_marked(&self, mode: Mode, key: Key) -> bool {
        self.marks.is_marked(mode, key)
    }

    /// Translate one input event.
    pub fn handle(&mut self, event: MirrorEvent) -> Translation {
        if !event.is_key() {
            return Translation::single(event);
        }

        let key = event.key_code();
        let Some(action) = event.action() else {
            let anomaly = Anomaly::UnhandledAction {
                key,
                value: event.value,
                mode: self.mode,
            };
            return Translation::single(event).with_anomaly(Some(anomaly));
        };

        match self.mode {
            Mode::Outside => self.handle_outside(event, key, action),
            Mode::Inside => self.handle_inside(event, key, action),
        }
    }

    fn handle_outside(&mut self, event: MirrorEvent, key: Key, action: Action) -> Translation {
        match action {
            Action::Press if key == self.trigger => {
                self.go_inside(event.time);
                Translation::swallow()
            }
            Action::Press => {
                let anomaly = self.mark(key);
                Translation::single(event).with_anomaly(anomaly)
            }
            Action::Release => {
                if self.marks.is_marked(self.mode, key) {
                    let anomaly = self.unmark(key);
                    Translation::single(event).with_anomaly(anomaly)
                } else {
                    // Pressed while inside, released after the trigger went up
                    let anomaly = self.unmark(key);
                    Translation::single(self.remap(event)).with_anomaly(anomaly)
                }
            }
            Action::Repeat => {
                if self.marks.is_marked(self.mode, key) {
                    Translation::single(event)
                } else {
                    Translation::single(self.remap(event))
                }
            }
        }
    }

    fn handle_inside(&mut self, event: MirrorEvent, key: Key, action: Action) -> Translation {
        match action {
            Action::Press => {
                let anomaly = self.mark(key);
                Translation::single(self.remap(event)).with_anomaly(anomaly)
            }
            Action::Release if key == self.trigger => {
                self.go_outside();
                let dwell = event.time.saturating_sub(self.entered_at);
                if dwell < self.burst_threshold {
                    log::debug!("burst: {} held for {:?}", self.trigger, dwell);
                    self.burst(event.time)
                } else {
                    Translation::swallow()
                }
            }
            Action::Release => {
                if self.marks.is_marked(self.mode, key) {
                    let anomaly = self.unmark(key);
                    Translation::single(self.remap(event)).with_anomaly(anomaly)
                } else {
                    Translation::single(event)
                }
            }
            Action::Repeat if key == self.trigger => Translation::swallow(),
            Action::Repeat => {
                if self.marks.is_marked(self.mode, key) {
                    Translation::single(self.remap(event))
                } else {
                    Translation::single(event)
                }
            }
        }
    }

    fn go_inside(&mut self, time: Duration) {
        log::debug!("{} -> {}", self.mode, Mode::Inside);
        self.mode = Mode::Inside;
        self.entered_at = time;
    }

    fn go_outside(&mut self) {
        log::debug!("{} -> {}", self.mode, Mode::Outside);
        self.mode = Mode::Outside;
    }

    fn mark(&mut self, key: Key) -> Option<Anomaly> {
        let mode = self.mode;
        self.marks
            .mark(mode, key)
            .err()
            .map(|conflict| conflict_anomaly(conflict, key, mode))
    }

    fn unmark(&mut self, key: Key) -> Option<Anomaly> {
        let mode = self.mode;
        self.marks
            .unmark(mode, key)
            .err()
            .map(|conflict| conflict_anomaly(conflict, key, mode))
    }

    fn remap(&self, event: MirrorEvent) -> MirrorEvent {
        let key = event.key_code();
        match self.table.substitute(key) {
            Some(to) => {
                log::trace!("remap {} -> {}", key, to);
                event.with_key(to)
            }
            None => event,
        }
    }

    /// Press, release and sync of the trigger key
    fn burst(&self, time: Duration) -> Translation {
        Translation {
            events: smallvec![
                MirrorEvent::key(self.trigger, Action::Press, time),
                MirrorEvent::key(self.trigger, Action::Release, time),
                MirrorEvent::sync(time),
            ],
            anomaly: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::EV_KEY;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn translator() -> MirrorTranslator {
        MirrorTranslator::new(MirrorConfig::default()).unwrap()
    }

    fn press(key: Key, t: u64) -> MirrorEvent {
        MirrorEvent::key(key, Action::Press, ms(t))
    }

    fn release(key: Key, t: u64) -> MirrorEvent {
        MirrorEvent::key(key, Action::Release, ms(t))
    }

    fn repeat(key: Key, t: u64) -> MirrorEvent {
        MirrorEvent::key(key, Action::Repeat, ms(t))
    }

    fn keys(tr: &Translation) -> Vec<(Key, Option<Action>)> {
        tr.events.iter().map(|e| (e.key_code(), e.action())).collect()
    }

    #[test]
    fn test_rejects_trigger_in_table() {
        let config = MirrorConfig::default().with_trigger(Key::Q);
        let err = MirrorTranslator::new(config).unwrap_err();
        assert!(matches!(err, ConfigError::TriggerRemapped(Key::Q)));
    }

    #[test]
    fn test_rejects_zero_threshold() {
        let config = MirrorConfig::default().with_burst_threshold(Duration::ZERO);
        assert!(matches!(
            MirrorTranslator::new(config),
            Err(ConfigError::ZeroThreshold)
        ));
    }

    #[test]
    fn test_rejects_duplicate_pair() {
        let config = MirrorConfig::default().with_pairs(vec![(Key::Q, Key::P), (Key::W, Key::P)]);
        assert!(matches!(
            MirrorTranslator::new(config),
            Err(ConfigError::DuplicateKey(Key::P))
        ));
    }

    #[test]
    fn test_outside_press_passes_and_marks() {
        let mut tr = translator();
        let out = tr.handle(press(Key::Q, 0));
        assert_eq!(keys(&out), vec![(Key::Q, Some(Action::Press))]);
        assert!(tr.is_marked(Mode::Outside, Key::Q));
        assert!(out.anomaly.is_none());
    }

    #[test]
    fn test_outside_double_press_is_anomaly() {
        let mut tr = translator();
        tr.handle(press(Key::Q, 0));
        let out = tr.handle(press(Key::Q, 1));
        assert_eq!(keys(&out), vec![(Key::Q, Some(Action::Press))]);
        assert_eq!(
            out.anomaly,
            Some(Anomaly::AlreadyMarked {
                key: Key::Q,
                mode: Mode::Outside
            })
        );
    }

    #[test]
    fn test_outside_repeat_of_marked_key_passes() {
        let mut tr = translator();
        tr.handle(press(Key::W, 0));
        let out = tr.handle(repeat(Key::W, 300));
        assert_eq!(keys(&out), vec![(Key::W, Some(Action::Repeat))]);
    }

    #[test]
    fn test_outside_repeat_of_unmarked_key_remaps() {
        let mut tr = translator();
        let out = tr.handle(repeat(Key::W, 0));
        assert_eq!(keys(&out), vec![(Key::O, Some(Action::Repeat))]);
        assert!(out.anomaly.is_none());
    }

    #[test]
    fn test_trigger_press_outside_swallows() {
        let mut tr = translator();
        let out = tr.handle(press(Key::SPACE, 10));
        assert!(out.is_empty());
        assert_eq!(tr.mode(), Mode::Inside);
    }

    #[test]
    fn test_inside_press_remaps_and_marks() {
        let mut tr = translator();
        tr.handle(press(Key::SPACE, 0));
        let out = tr.handle(press(Key::F, 20));
        assert_eq!(keys(&out), vec![(Key::J, Some(Action::Press))]);
        assert!(tr.is_marked(Mode::Inside, Key::F));
    }

    #[test]
    fn test_inside_press_unmapped_key_unchanged() {
        let mut tr = translator();
        tr.handle(press(Key::SPACE, 0));
        let out = tr.handle(press(Key::LEFT_SHIFT, 20));
        assert_eq!(keys(&out), vec![(Key::LEFT_SHIFT, Some(Action::Press))]);
        assert!(tr.is_marked(Mode::Inside, Key::LEFT_SHIFT));
    }

    #[test]
    fn test_inside_release_marked_remaps() {
        let mut tr = translator();
        tr.handle(press(Key::SPACE, 0));
        tr.handle(press(Key::C, 10));
        let out = tr.handle(release(Key::C, 20));
        assert_eq!(keys(&out), vec![(Key::COMMA, Some(Action::Release))]);
        assert!(!tr.is_marked(Mode::Inside, Key::C));
    }

    #[test]
    fn test_inside_release_unmarked_passes() {
        let mut tr = translator();
        tr.handle(press(Key::C, 0));
        tr.handle(press(Key::SPACE, 10));
        let out = tr.handle(release(Key::C, 20));
        assert_eq!(keys(&out), vec![(Key::C, Some(Action::Release))]);
        assert!(out.anomaly.is_none());
    }

    #[test]
    fn test_inside_trigger_repeat_swallowed() {
        let mut tr = translator();
        tr.handle(press(Key::SPACE, 0));
        assert!(tr.handle(repeat(Key::SPACE, 500)).is_empty());
        assert_eq!(tr.mode(), Mode::Inside);
    }

    #[test]
    fn test_inside_repeat_follows_mark() {
        let mut tr = translator();
        tr.handle(press(Key::TAB, 0));
        tr.handle(press(Key::SPACE, 10));
        tr.handle(press(Key::A, 20));

        let marked = tr.handle(repeat(Key::A, 300));
        assert_eq!(keys(&marked), vec![(Key::SEMICOLON, Some(Action::Repeat))]);

        // TAB was pressed outside, so it is not marked inside
        let unmarked = tr.handle(repeat(Key::TAB, 310));
        assert_eq!(keys(&unmarked), vec![(Key::TAB, Some(Action::Repeat))]);
    }

    #[test]
    fn test_burst_emits_trigger_tap() {
        let mut tr = translator();
        tr.handle(press(Key::SPACE, 1000));
        let out = tr.handle(release(Key::SPACE, 1100));
        assert_eq!(
            out.events.as_slice(),
            &[
                MirrorEvent::key(Key::SPACE, Action::Press, ms(1100)),
                MirrorEvent::key(Key::SPACE, Action::Release, ms(1100)),
                MirrorEvent::sync(ms(1100)),
            ]
        );
        assert_eq!(tr.mode(), Mode::Outside);
    }

    #[test]
    fn test_hold_at_threshold_is_not_burst() {
        let mut tr = translator();
        tr.handle(press(Key::SPACE, 0));
        let out = tr.handle(release(Key::SPACE, 250));
        assert!(out.is_empty());
        assert_eq!(tr.mode(), Mode::Outside);
    }

    #[test]
    fn test_clock_going_backwards_counts_as_burst() {
        let mut tr = translator();
        tr.handle(press(Key::SPACE, 500));
        let out = tr.handle(release(Key::SPACE, 400));
        assert_eq!(out.events.len(), 3);
    }

    #[test]
    fn test_non_key_events_pass_in_both_modes() {
        let mut tr = translator();
        let msc = MirrorEvent::new(0x04, 0x04, 57, ms(0));
        let syn = MirrorEvent::sync(ms(0));

        assert_eq!(tr.handle(msc).events.as_slice(), &[msc]);
        assert_eq!(tr.handle(syn).events.as_slice(), &[syn]);

        tr.handle(press(Key::SPACE, 0));
        assert_eq!(tr.handle(msc).events.as_slice(), &[msc]);
        assert_eq!(tr.handle(syn).events.as_slice(), &[syn]);
        assert_eq!(tr.mode(), Mode::Inside);
    }

    #[test]
    fn test_unknown_key_value_passes_with_anomaly() {
        let mut tr = translator();
        tr.handle(press(Key::SPACE, 0));
        let odd = MirrorEvent::new(EV_KEY, Key::Q.code(), 5, ms(10));
        let out = tr.handle(odd);
        assert_eq!(out.events.as_slice(), &[odd]);
        assert_eq!(
            out.anomaly,
            Some(Anomaly::UnhandledAction {
                key: Key::Q,
                value: 5,
                mode: Mode::Inside
            })
        );
        assert!(tr.marks().is_empty());
    }

    #[test]
    fn test_custom_trigger() {
        let config = MirrorConfig::default().with_trigger(Key::RIGHT_ALT);
        let mut tr = MirrorTranslator::new(config).unwrap();

        assert_eq!(
            keys(&tr.handle(press(Key::SPACE, 0))),
            vec![(Key::SPACE, Some(Action::Press))]
        );
        assert!(tr.handle(press(Key::RIGHT_ALT, 10)).is_empty());
        assert_eq!(
            keys(&tr.handle(press(Key::KEY_2, 20))),
            vec![(Key::KEY_9, Some(Action::Press))]
        );
    }

    #[test]
    fn test_anomaly_display() {
        let a = Anomaly::NotMarked {
            key: Key::Q,
            mode: Mode::Outside,
        };
        assert_eq!(
            a.to_string(),
            "attempt to unmark already unmarked key Q (Outside)"
        );
    }
}
