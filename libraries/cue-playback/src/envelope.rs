//! Fade envelope for cue transitions
//!
//! Two shapes, both starting from whatever envelope value was in effect when
//! the fade began so back-to-back fades never pop:
//! - Fade-in: cubic ease-in, `start + (1 - start) * t^3`
//! - Fade-out: linear decay, `start * (1 - t)`

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Direction of a fade
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FadeKind {
    In,
    Out,
}

impl FadeKind {
    /// Calculate the envelope at a given position
    ///
    /// # Arguments
    /// * `start_envelope` - Envelope value when the fade began (0.0 to 1.0)
    /// * `t` - Normalized position in the fade (0.0 to 1.0)
    ///
    /// # Returns
    /// Envelope value (0.0 to 1.0). A completed fade-in is exactly 1.0 and a
    /// completed fade-out exactly 0.0.
    #[inline]
    pub fn envelope_at(self, start_envelope: f64, t: f64) -> f64 {
        let start = clamp_unit(start_envelope);
        let t = clamp_unit(t);

        match self {
            FadeKind::In => {
                if t >= 1.0 {
                    1.0
                } else {
                    start + (1.0 - start) * t * t * t
                }
            }
            FadeKind::Out => {
                if t >= 1.0 {
                    0.0
                } else {
                    start * (1.0 - t)
                }
            }
        }
    }
}

/// One in-flight fade
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FadeEnvelope {
    kind: FadeKind,
    start_envelope: f64,
    duration: Duration,
}

impl FadeEnvelope {
    pub fn new(kind: FadeKind, start_envelope: f64, duration: Duration) -> Self {
        Self {
            kind,
            start_envelope: clamp_unit(start_envelope),
            duration,
        }
    }

    /// Fade of `secs` seconds (negative or non-finite values mean "instant")
    pub fn from_secs(kind: FadeKind, start_envelope: f64, secs: f64) -> Self {
        let secs = if secs.is_finite() { secs.max(0.0) } else { 0.0 };
        Self::new(kind, start_envelope, Duration::from_secs_f64(secs))
    }

    pub fn kind(&self) -> FadeKind {
        self.kind
    }

    pub fn start_envelope(&self) -> f64 {
        self.start_envelope
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Elapsed fraction `t = clamp(elapsed / duration, 0, 1)`
    ///
    /// A zero-length fade is complete immediately.
    pub fn fraction(&self, elapsed: Duration) -> f64 {
        if self.duration.is_zero() {
            return 1.0;
        }
        clamp_unit(elapsed.as_secs_f64() / self.duration.as_secs_f64())
    }

    /// Envelope value after `elapsed`
    pub fn value_at(&self, elapsed: Duration) -> f64 {
        self.kind
            .envelope_at(self.start_envelope, self.fraction(elapsed))
    }

    pub fn is_complete(&self, elapsed: Duration) -> bool {
        self.fraction(elapsed) >= 1.0
    }
}

/// Clamp to `[0, 1]`, mapping NaN to 0
pub(crate) fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fade_in_is_cubic() {
        assert_eq!(FadeKind::In.envelope_at(0.0, 0.0), 0.0);
        assert!((FadeKind::In.envelope_at(0.0, 0.5) - 0.125).abs() < 1e-12);
        assert_eq!(FadeKind::In.envelope_at(0.0, 1.0), 1.0);
    }

    #[test]
    fn fade_in_starts_from_current_envelope() {
        // Half-way through from 0.5: 0.5 + 0.5 * 0.125
        assert!((FadeKind::In.envelope_at(0.5, 0.5) - 0.5625).abs() < 1e-12);
        assert_eq!(FadeKind::In.envelope_at(0.3, 1.0), 1.0);
    }

    #[test]
    fn fade_out_is_linear_from_start() {
        assert_eq!(FadeKind::Out.envelope_at(0.8, 0.0), 0.8);
        assert!((FadeKind::Out.envelope_at(0.8, 0.25) - 0.6).abs() < 1e-12);
        assert_eq!(FadeKind::Out.envelope_at(0.8, 1.0), 0.0);
    }

    #[test]
    fn position_is_clamped() {
        assert_eq!(FadeKind::In.envelope_at(0.0, -1.0), 0.0);
        assert_eq!(FadeKind::In.envelope_at(0.0, 2.0), 1.0);
        assert_eq!(FadeKind::Out.envelope_at(1.0, f64::NAN), 1.0);
    }

    #[test]
    fn fraction_over_duration() {
        let fade = FadeEnvelope::new(FadeKind::Out, 1.0, Duration::from_secs(2));
        assert_eq!(fade.fraction(Duration::ZERO), 0.0);
        assert_eq!(fade.fraction(Duration::from_secs(1)), 0.5);
        assert_eq!(fade.fraction(Duration::from_secs(5)), 1.0);
        assert!(!fade.is_complete(Duration::from_millis(1999)));
        assert!(fade.is_complete(Duration::from_secs(2)));
    }

    #[test]
    fn zero_length_fade_completes_immediately() {
        let fade = FadeEnvelope::from_secs(FadeKind::In, 0.0, 0.0);
        assert!(fade.is_complete(Duration::ZERO));
        assert_eq!(fade.value_at(Duration::ZERO), 1.0);

        let bogus = FadeEnvelope::from_secs(FadeKind::Out, 1.0, f64::NAN);
        assert_eq!(bogus.duration(), Duration::ZERO);
    }
}
