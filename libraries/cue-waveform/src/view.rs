//! Time ↔ pixel mapping under a zoom window

use std::ops::Range;

/// The span of the media currently mapped onto the view
///
/// At zoom 1 this is the whole duration. Above 1 it is `duration / zoom`
/// long, centered on the playhead and pushed back inside `[0, duration]`
/// near either end.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomWindow {
    start_ms: f64,
    end_ms: f64,
}

impl ZoomWindow {
    /// Window for `zoom` around `playhead_ms`; `None` while the duration is
    /// unknown
    pub fn around(duration_ms: u64, zoom: f64, playhead_ms: u64) -> Option<Self> {
        if duration_ms == 0 {
            return None;
        }
        let duration = duration_ms as f64;

        if zoom.is_nan() || zoom <= 1.0 {
            return Some(Self {
                start_ms: 0.0,
                end_ms: duration,
            });
        }

        let half = duration / zoom / 2.0;
        let center = (playhead_ms as f64).clamp(half, duration - half);
        Some(Self {
            start_ms: center - half,
            end_ms: center + half,
        })
    }

    pub fn start_ms(&self) -> f64 {
        self.start_ms
    }

    pub fn end_ms(&self) -> f64 {
        self.end_ms
    }

    pub fn length_ms(&self) -> f64 {
        self.end_ms - self.start_ms
    }

    /// Pixel column for `ms`; times outside the window pin to its edges
    pub fn ms_to_x(&self, ms: u64, width: u32) -> i32 {
        let length = self.length_ms();
        if length <= 0.0 {
            return 0;
        }
        let ms = (ms as f64).clamp(self.start_ms, self.end_ms);
        ((ms - self.start_ms) / length * f64::from(width)).round() as i32
    }

    /// Time under pixel column `x`; columns outside the view pin to its edges
    pub fn x_to_ms(&self, x: i32, width: u32) -> u64 {
        if width == 0 {
            return self.start_ms.floor() as u64;
        }
        let ratio = (f64::from(x) / f64::from(width)).clamp(0.0, 1.0);
        (self.start_ms + ratio * self.length_ms()).floor() as u64
    }

    /// Indices of the samples inside the window, for `sample_count` samples
    /// spread over `duration_ms`
    pub fn sample_range(&self, sample_count: usize, duration_ms: u64) -> Range<usize> {
        if duration_ms == 0 || sample_count == 0 {
            return 0..0;
        }
        let per_ms = sample_count as f64 / duration_ms as f64;
        let to_index = |ms: f64| ((ms * per_ms).floor() as usize).min(sample_count);
        to_index(self.start_ms)..to_index(self.end_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unzoomed_window_spans_everything() {
        let window = ZoomWindow::around(60_000, 1.0, 30_000).unwrap();
        assert_eq!(window.start_ms(), 0.0);
        assert_eq!(window.end_ms(), 60_000.0);
        assert_eq!(window.ms_to_x(30_000, 600), 300);
        assert_eq!(window.ms_to_x(60_000, 600), 600);
    }

    #[test]
    fn mapping_rounds_to_the_nearest_column() {
        // 3ms per pixel
        let window = ZoomWindow::around(3_000, 1.0, 0).unwrap();
        assert_eq!(window.ms_to_x(1, 1_000), 0);
        assert_eq!(window.ms_to_x(2, 1_000), 1);
        assert_eq!(window.x_to_ms(1, 1_000), 3);
    }

    #[test]
    fn zoomed_window_is_centered_and_clamped() {
        let centered = ZoomWindow::around(100_000, 4.0, 50_000).unwrap();
        assert_eq!(centered.length_ms(), 25_000.0);
        assert_eq!(centered.start_ms(), 37_500.0);

        let head = ZoomWindow::around(100_000, 4.0, 1_000).unwrap();
        assert_eq!(head.start_ms(), 0.0);
        assert_eq!(head.end_ms(), 25_000.0);

        let tail = ZoomWindow::around(100_000, 4.0, 99_000).unwrap();
        assert_eq!(tail.start_ms(), 75_000.0);
        assert_eq!(tail.end_ms(), 100_000.0);
    }

    #[test]
    fn times_outside_the_window_pin_to_edges() {
        let window = ZoomWindow::around(100_000, 4.0, 50_000).unwrap();
        assert_eq!(window.ms_to_x(0, 800), 0);
        assert_eq!(window.ms_to_x(100_000, 800), 800);
        assert_eq!(window.x_to_ms(-50, 800), 37_500);
        assert_eq!(window.x_to_ms(900, 800), 62_500);
    }

    #[test]
    fn unknown_duration_has_no_window() {
        assert!(ZoomWindow::around(0, 2.0, 0).is_none());
    }

    #[test]
    fn sample_range_follows_the_window() {
        let window = ZoomWindow::around(10_000, 2.0, 5_000).unwrap();
        assert_eq!(window.sample_range(1_000, 10_000), 250..750);
    }
}
