//! Region timing shown next to each cue (total / remaining)

use crate::types::Region;

/// Shown instead of a time when the region is undefined
pub const PLACEHOLDER_CLOCK: &str = "--:--.---";

/// Total and remaining time of a cue's region at a given position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegionTiming {
    pub total_ms: u64,
    pub played_ms: u64,
    pub remaining_ms: u64,
}

impl RegionTiming {
    /// Timing for `position_ms` inside `region`
    ///
    /// Returns `None` for an undefined region (`end <= start` or no end yet);
    /// callers show the placeholder in that case rather than failing.
    pub fn compute(region: Region, position_ms: u64) -> Option<Self> {
        let total_ms = region.length_ms()?;
        let played_ms = position_ms.saturating_sub(region.start_ms).min(total_ms);
        Some(Self {
            total_ms,
            played_ms,
            remaining_ms: total_ms - played_ms,
        })
    }

    pub fn total_label(timing: Option<Self>) -> String {
        timing.map_or_else(|| PLACEHOLDER_CLOCK.to_string(), |t| format_clock(t.total_ms))
    }

    pub fn remaining_label(timing: Option<Self>) -> String {
        timing.map_or_else(
            || PLACEHOLDER_CLOCK.to_string(),
            |t| format_clock(t.remaining_ms),
        )
    }
}

/// Format milliseconds as `MM:SS.mmm`
pub fn format_clock(ms: u64) -> String {
    format!(
        "{:02}:{:02}.{:03}",
        ms / 60_000,
        (ms / 1000) % 60,
        ms % 1000
    )
}
