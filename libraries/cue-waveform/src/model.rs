//! Waveform model for one cue
//!
//! Owns the decoded mono samples (the source of truth) and a per-pixel peak
//! cache derived from them. The cache is rebuilt when decoding finishes and
//! whenever the pixel width changes.

use cue_core::Region;
use tracing::{debug, trace};

use crate::config::WaveformConfig;
use crate::events::WaveformEvent;
use crate::markers::{DragMode, Overlay};
use crate::pcm::PcmBuffer;
use crate::peaks::decimate_peaks;
use crate::view::ZoomWindow;

/// Samples, peaks, markers and zoom for one cue's waveform
#[derive(Debug, Clone)]
pub struct WaveformModel {
    config: WaveformConfig,

    // Mono samples (first channel of the decoded audio)
    samples: Vec<f32>,

    // Peak cache, one value per pixel
    peaks: Vec<f32>,

    width: u32,

    duration_ms: u64,

    // Sample rate of the last decoded buffer
    sample_rate: Option<u32>,

    decoding: bool,

    zoom: f64,

    start_ms: u64,
    end_ms: u64,
    playhead_ms: u64,

    drag: DragMode,

    pending_events: Vec<WaveformEvent>,
}

impl WaveformModel {
    pub fn new(config: WaveformConfig) -> Self {
        Self {
            config,
            samples: Vec::new(),
            peaks: Vec::new(),
            width: 0,
            duration_ms: 0,
            sample_rate: None,
            decoding: false,
            zoom: config.clamp_zoom(1.0),
            start_ms: 0,
            end_ms: 0,
            playhead_ms: 0,
            drag: DragMode::None,
            pending_events: Vec::new(),
        }
    }

    // ===== Decoding =====

    /// Drop any previous audio and start collecting buffers
    pub fn begin_decoding(&mut self) {
        self.samples.clear();
        self.peaks.clear();
        self.sample_rate = None;
        self.decoding = true;
    }

    /// Append one decoded buffer
    ///
    /// `reported_duration_ms` is the decoder's idea of the total duration,
    /// when it has one; it replaces the current duration.
    pub fn append_buffer(&mut self, buffer: &PcmBuffer<'_>, reported_duration_ms: Option<u64>) {
        if buffer.frames() == 0 {
            return;
        }

        self.samples.reserve(buffer.frames());
        self.samples.extend(buffer.first_channel());
        if buffer.sample_rate > 0 {
            self.sample_rate = Some(buffer.sample_rate);
        }

        if let Some(duration) = reported_duration_ms.filter(|d| *d > 0) {
            self.duration_ms = duration;
        }
        trace!(
            "Appended {} frames ({} total)",
            buffer.frames(),
            self.samples.len()
        );
    }

    /// Decoding is done: settle the duration and build the peak cache
    pub fn finish_decoding(&mut self) {
        self.decoding = false;

        if self.duration_ms == 0 {
            if let Some(rate) = self.sample_rate {
                self.duration_ms = self.samples.len() as u64 * 1000 / u64::from(rate);
            }
        }

        self.rebuild_peaks();
        debug!(
            "Decoded {} samples, {}ms",
            self.samples.len(),
            self.duration_ms
        );
        self.pending_events.push(WaveformEvent::PeaksReady {
            duration_ms: self.duration_ms,
        });
    }

    pub fn is_decoding(&self) -> bool {
        self.decoding
    }

    pub fn set_duration(&mut self, duration_ms: u64) {
        self.duration_ms = duration_ms;
    }

    pub fn duration_ms(&self) -> u64 {
        self.duration_ms
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    // ===== Layout =====

    /// The view is `width` pixels wide; rebuilds peaks when that changes
    pub fn resize(&mut self, width: u32) {
        if width == self.width {
            return;
        }
        self.width = width;
        self.rebuild_peaks();
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    /// Peaks across the whole file, one per pixel
    pub fn peaks(&self) -> &[f32] {
        &self.peaks
    }

    /// Peaks across just the zoom window, one per pixel
    pub fn visible_peaks(&self) -> Vec<f32> {
        if self.zoom <= 1.0 {
            return self.peaks.clone();
        }
        match self.window() {
            Some(window) => {
                let range = window.sample_range(self.samples.len(), self.duration_ms);
                decimate_peaks(&self.samples[range], self.width as usize)
            }
            None => Vec::new(),
        }
    }

    // ===== Markers and playhead =====

    pub fn set_playhead(&mut self, ms: u64) {
        self.playhead_ms = ms;
    }

    pub fn playhead_ms(&self) -> u64 {
        self.playhead_ms
    }

    pub fn set_start(&mut self, ms: u64) {
        self.start_ms = ms;
    }

    pub fn start_ms(&self) -> u64 {
        self.start_ms
    }

    /// Set the end marker; extends an unknown or shorter duration
    pub fn set_end(&mut self, ms: u64) {
        self.end_ms = ms;
        if self.duration_ms == 0 || ms > self.duration_ms {
            self.duration_ms = ms;
        }
    }

    pub fn end_ms(&self) -> u64 {
        self.end_ms
    }

    /// Take both markers from a cue's region (an unset end is left alone)
    pub fn set_region(&mut self, region: Region) {
        self.set_start(region.start_ms);
        if let Some(end) = region.end_ms {
            self.set_end(end);
        }
    }

    // ===== Zoom =====

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn set_zoom(&mut self, zoom: f64) {
        let zoom = self.config.clamp_zoom(zoom);
        if zoom != self.zoom {
            trace!("Zoom {:.2} -> {:.2}", self.zoom, zoom);
            self.zoom = zoom;
        }
    }

    pub fn zoom_in(&mut self) {
        self.set_zoom(self.zoom * self.config.step());
    }

    pub fn zoom_out(&mut self) {
        self.set_zoom(self.zoom / self.config.step());
    }

    pub fn reset_zoom(&mut self) {
        self.set_zoom(1.0);
    }

    /// Wheel gesture; zooms only with the zoom modifier held
    ///
    /// Returns whether the gesture was consumed.
    pub fn wheel(&mut self, delta_y: i32, zoom_modifier: bool) -> bool {
        if !zoom_modifier {
            return false;
        }
        match delta_y.signum() {
            1 => self.zoom_in(),
            -1 => self.zoom_out(),
            _ => {}
        }
        true
    }

    /// The span currently mapped onto the view
    pub fn window(&self) -> Option<ZoomWindow> {
        ZoomWindow::around(self.duration_ms, self.zoom, self.playhead_ms)
    }

    pub fn ms_to_x(&self, ms: u64) -> i32 {
        self.window()
            .map_or(0, |window| window.ms_to_x(ms, self.width))
    }

    pub fn x_to_ms(&self, x: i32) -> u64 {
        self.window()
            .map_or(0, |window| window.x_to_ms(x, self.width))
    }

    /// Pixel geometry of markers, playhead and the played span
    pub fn overlay(&self) -> Overlay {
        let width = self.width as i32;
        let start_x = self.ms_to_x(self.start_ms).max(0);
        let end_x = self.ms_to_x(self.end_ms).min(width);
        let playhead_x = self.ms_to_x(self.playhead_ms).clamp(0, width.max(0));

        Overlay {
            start_x,
            end_x,
            playhead_x,
            played_end_x: playhead_x.min(end_x),
        }
    }

    // ===== Dragging =====

    /// Pointer pressed at `x`: grab a marker or start scrubbing
    pub fn press(&mut self, x: i32) {
        self.drag = DragMode::for_press(
            x,
            self.ms_to_x(self.start_ms),
            self.ms_to_x(self.end_ms),
            self.config.marker_tolerance_px,
        );
        trace!("Press at {} -> {:?}", x, self.drag);
    }

    /// Pointer moved to `x` with the button held
    ///
    /// Markers never cross: the start stays in `[0, end]` and the end in
    /// `[start, duration]`. Scrubbing moves the playhead, so a zoomed
    /// window re-centres on every step of the drag.
    pub fn drag(&mut self, x: i32) {
        let ms = self.x_to_ms(x);

        match self.drag {
            DragMode::None => {}
            DragMode::Start => {
                self.start_ms = ms.min(self.end_ms);
                self.pending_events.push(WaveformEvent::StartChanged {
                    start_ms: self.start_ms,
                });
            }
            DragMode::End => {
                self.end_ms = ms.clamp(self.start_ms, self.duration_ms.max(self.start_ms));
                self.pending_events.push(WaveformEvent::EndChanged {
                    end_ms: self.end_ms,
                });
            }
            DragMode::Scrub => {
                self.playhead_ms = ms;
                self.pending_events
                    .push(WaveformEvent::SeekRequested { position_ms: ms });
            }
        }
    }

    pub fn release(&mut self) {
        self.drag = DragMode::None;
    }

    pub fn drag_mode(&self) -> DragMode {
        self.drag
    }

    // ===== Events =====

    pub fn drain_events(&mut self) -> Vec<WaveformEvent> {
        std::mem::take(&mut self.pending_events)
    }

    pub fn has_pending_events(&self) -> bool {
        !self.pending_events.is_empty()
    }

    // ===== Internals =====

    fn rebuild_peaks(&mut self) {
        if self.decoding || self.samples.is_empty() || self.width == 0 {
            self.peaks.clear();
            return;
        }
        self.peaks = decimate_peaks(&self.samples, self.width as usize);
    }
}

impl Default for WaveformModel {
    fn default() -> Self {
        Self::new(WaveformConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pcm::PcmSamples;

    fn decoded(samples: &[f32], sample_rate: u32) -> WaveformModel {
        let mut model = WaveformModel::default();
        model.begin_decoding();
        model.append_buffer(&PcmBuffer::new(PcmSamples::F32(samples), 1, sample_rate), None);
        model.finish_decoding();
        model
    }

    #[test]
    fn duration_falls_back_to_frame_count() {
        let model = decoded(&[0.0; 4_410], 44_100);
        assert_eq!(model.duration_ms(), 100);
    }

    #[test]
    fn reported_duration_wins() {
        let mut model = WaveformModel::default();
        model.begin_decoding();
        let data = [0.0f32; 100];
        model.append_buffer(&PcmBuffer::new(PcmSamples::F32(&data), 1, 1_000), Some(5_000));
        model.finish_decoding();
        assert_eq!(model.duration_ms(), 5_000);
    }

    #[test]
    fn no_peaks_until_decoding_finishes() {
        let mut model = WaveformModel::default();
        model.resize(10);
        model.begin_decoding();
        let data = [0.5f32; 100];
        model.append_buffer(&PcmBuffer::new(PcmSamples::F32(&data), 1, 1_000), None);
        assert!(model.peaks().is_empty());

        model.finish_decoding();
        assert_eq!(model.peaks().len(), 10);
        assert_eq!(
            model.drain_events(),
            vec![WaveformEvent::PeaksReady { duration_ms: 100 }]
        );
    }

    #[test]
    fn resize_rebuilds_peaks() {
        let mut model = decoded(&[0.25; 1_000], 1_000);
        model.resize(50);
        assert_eq!(model.peaks().len(), 50);
        model.resize(20);
        assert_eq!(model.peaks().len(), 20);
    }

    #[test]
    fn set_end_extends_duration() {
        let mut model = WaveformModel::default();
        model.set_end(30_000);
        assert_eq!(model.duration_ms(), 30_000);

        model.set_end(10_000);
        assert_eq!(model.duration_ms(), 30_000);
        assert_eq!(model.end_ms(), 10_000);
    }

    #[test]
    fn wheel_needs_the_modifier() {
        let mut model = WaveformModel::default();
        assert!(!model.wheel(120, false));
        assert_eq!(model.zoom(), 1.0);

        assert!(model.wheel(120, true));
        assert_eq!(model.zoom(), 1.5);
        assert!(model.wheel(-120, true));
        assert_eq!(model.zoom(), 1.0);
    }

    #[test]
    fn mapping_without_duration_is_zero() {
        let mut model = WaveformModel::default();
        model.resize(100);
        assert_eq!(model.ms_to_x(5_000), 0);
        assert_eq!(model.x_to_ms(50), 0);
    }
}
