//! Deterministic tick scheduler
//!
//! Each controller owns one of these instead of wall-clock timers. Time only
//! moves when the owner calls [`TickScheduler::next_due`] with a target
//! instant, which hands back due ticks one at a time in a fixed order. Tests
//! and the transport drive every cue from the same clock.

use std::time::Duration;

/// Periodic activities of a cue
///
/// The declaration order is the tie-break order: when both ticks fall due at
/// the same instant the fade tick runs first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TickKind {
    /// Envelope recompute while fading
    Fade,
    /// Position extrapolation for external sources
    Position,
}

#[derive(Debug, Clone, Copy)]
struct Timer {
    interval: Duration,
    started_at: Duration,
    next_due: Duration,
}

/// Virtual clock with one repeating timer per [`TickKind`]
#[derive(Debug, Clone, Default)]
pub struct TickScheduler {
    now: Duration,
    fade: Option<Timer>,
    position: Option<Timer>,
}

impl TickScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time
    pub fn now(&self) -> Duration {
        self.now
    }

    /// (Re)start a timer; the first tick is due one interval from now
    pub fn start(&mut self, kind: TickKind, interval: Duration) {
        let interval = interval.max(Duration::from_millis(1));
        *self.slot(kind) = Some(Timer {
            interval,
            started_at: self.now,
            next_due: self.now + interval,
        });
    }

    pub fn stop(&mut self, kind: TickKind) {
        *self.slot(kind) = None;
    }

    pub fn stop_all(&mut self) {
        self.fade = None;
        self.position = None;
    }

    pub fn is_running(&self, kind: TickKind) -> bool {
        self.timer(kind).is_some()
    }

    /// Time since the timer was started
    pub fn elapsed(&self, kind: TickKind) -> Option<Duration> {
        self.timer(kind)
            .map(|timer| self.now.saturating_sub(timer.started_at))
    }

    pub fn interval(&self, kind: TickKind) -> Option<Duration> {
        self.timer(kind).map(|timer| timer.interval)
    }

    /// Pop the earliest tick due at or before `until`
    ///
    /// Moves the clock to the tick's due time and schedules its next
    /// occurrence. Returns `None` once nothing else is due; call
    /// [`settle`](Self::settle) afterwards to move the clock to `until`.
    pub fn next_due(&mut self, until: Duration) -> Option<TickKind> {
        let kind = [TickKind::Fade, TickKind::Position]
            .into_iter()
            .filter_map(|kind| self.timer(kind).map(|timer| (timer.next_due, kind)))
            .filter(|(due, _)| *due <= until)
            .min()
            .map(|(_, kind)| kind)?;

        let timer = self.slot(kind).as_mut()?;
        let due = timer.next_due;
        timer.next_due += timer.interval;
        self.now = self.now.max(due);
        Some(kind)
    }

    /// Move the clock forward to `until` (never backwards)
    pub fn settle(&mut self, until: Duration) {
        self.now = self.now.max(until);
    }

    fn timer(&self, kind: TickKind) -> Option<&Timer> {
        match kind {
            TickKind::Fade => self.fade.as_ref(),
            TickKind::Position => self.position.as_ref(),
        }
    }

    fn slot(&mut self, kind: TickKind) -> &mut Option<Timer> {
        match kind {
            TickKind::Fade => &mut self.fade,
            TickKind::Position => &mut self.position,
        }
    }
}
