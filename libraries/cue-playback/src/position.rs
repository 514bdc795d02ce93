//! Position estimate for externally played tracks
//!
//! The provider only tells us where it is every now and then, so between
//! reports the position is extrapolated on a fixed tick. Any authoritative
//! report overwrites the estimate and extrapolation continues from there.

/// Extrapolated playback position
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PositionEstimator {
    position_ms: u64,
    duration_ms: Option<u64>,
    provider_playing: bool,
}

impl PositionEstimator {
    pub fn new(duration_ms: Option<u64>) -> Self {
        Self {
            duration_ms: duration_ms.filter(|d| *d > 0),
            ..Self::default()
        }
    }

    pub fn position_ms(&self) -> u64 {
        self.position_ms
    }

    pub fn duration_ms(&self) -> Option<u64> {
        self.duration_ms
    }

    /// Whether the provider is believed to be playing
    pub fn is_playing(&self) -> bool {
        self.provider_playing
    }

    /// A play request was sent: assume playback from `position_ms`
    pub fn start_at(&mut self, position_ms: u64) {
        self.position_ms = self.clamp(position_ms);
        self.provider_playing = true;
    }

    /// Stop extrapolating and rest at `position_ms`
    pub fn reset(&mut self, position_ms: u64) {
        self.position_ms = self.clamp(position_ms);
        self.provider_playing = false;
    }

    pub fn set_playing(&mut self, playing: bool) {
        self.provider_playing = playing;
    }

    /// Overwrite the position (a seek or an authoritative report)
    pub fn set_position(&mut self, position_ms: u64) {
        self.position_ms = self.clamp(position_ms);
    }

    /// Record the media duration; zero means "unknown" and is ignored
    pub fn set_duration(&mut self, duration_ms: u64) {
        if duration_ms > 0 {
            self.duration_ms = Some(duration_ms);
            self.position_ms = self.clamp(self.position_ms);
        }
    }

    /// One tick: advance by `interval_ms` if the provider is playing
    ///
    /// Returns true when the estimate moved.
    pub fn advance(&mut self, interval_ms: u64) -> bool {
        if !self.provider_playing {
            return false;
        }
        let before = self.position_ms;
        self.position_ms = self.clamp(self.position_ms.saturating_add(interval_ms));
        self.position_ms != before
    }

    /// Reconcile with a provider report
    ///
    /// A known duration is recorded first so the reported position is
    /// clamped against it.
    pub fn reconcile(&mut self, position_ms: Option<u64>, duration_ms: Option<u64>, playing: bool) {
        if let Some(duration) = duration_ms {
            self.set_duration(duration);
        }
        if let Some(position) = position_ms {
            self.set_position(position);
        }
        self.provider_playing = playing;
    }

    fn clamp(&self, position_ms: u64) -> u64 {
        match self.duration_ms {
            Some(duration) => position_ms.min(duration),
            None => position_ms,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extrapolates_while_playing() {
        let mut estimate = PositionEstimator::new(None);
        estimate.start_at(0);
        for _ in 0..10 {
            estimate.advance(50);
        }
        assert_eq!(estimate.position_ms(), 500);
    }

    #[test]
    fn holds_still_when_not_playing() {
        let mut estimate = PositionEstimator::new(None);
        estimate.reset(1_000);
        assert!(!estimate.advance(50));
        assert_eq!(estimate.position_ms(), 1_000);
    }

    #[test]
    fn clamps_to_duration() {
        let mut estimate = PositionEstimator::new(Some(120));
        estimate.start_at(0);
        estimate.advance(50);
        estimate.advance(50);
        estimate.advance(50);
        assert_eq!(estimate.position_ms(), 120);
        assert!(!estimate.advance(50));
    }

    #[test]
    fn report_overwrites_estimate() {
        let mut estimate = PositionEstimator::new(None);
        estimate.start_at(0);
        estimate.advance(50);
        estimate.advance(50);

        estimate.reconcile(Some(2_000), Some(180_000), true);
        assert_eq!(estimate.position_ms(), 2_000);
        assert_eq!(estimate.duration_ms(), Some(180_000));

        estimate.advance(50);
        assert_eq!(estimate.position_ms(), 2_050);

        estimate.reconcile(None, None, false);
        assert!(!estimate.is_playing());
        assert_eq!(estimate.position_ms(), 2_050);
    }

    #[test]
    fn zero_duration_is_unknown() {
        let mut estimate = PositionEstimator::new(Some(0));
        assert_eq!(estimate.duration_ms(), None);
        estimate.set_duration(0);
        assert_eq!(estimate.duration_ms(), None);
    }
}
