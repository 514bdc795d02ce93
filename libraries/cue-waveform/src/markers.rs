//! Marker hit-testing

use serde::{Deserialize, Serialize};

/// What a press-and-drag gesture is moving
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DragMode {
    #[default]
    None,
    /// Moving the start marker
    Start,
    /// Moving the end marker
    End,
    /// Moving the playhead (seek)
    Scrub,
}

impl DragMode {
    /// Pick the drag mode for a press at `x`
    ///
    /// The start marker wins when both markers are within `tolerance`.
    pub fn for_press(x: i32, start_x: i32, end_x: i32, tolerance: u32) -> Self {
        let near = |marker_x: i32| (x - marker_x).unsigned_abs() < tolerance;

        if near(start_x) {
            Self::Start
        } else if near(end_x) {
            Self::End
        } else {
            Self::Scrub
        }
    }

    pub fn is_active(self) -> bool {
        self != Self::None
    }
}

/// Pixel geometry of everything drawn over the peaks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Overlay {
    pub start_x: i32,
    pub end_x: i32,
    pub playhead_x: i32,

    /// Already-played span `[start_x, played_end_x)`; empty when
    /// `played_end_x <= start_x`
    pub played_end_x: i32,
}

impl Overlay {
    /// Whether any of the region has been played
    pub fn has_played(&self) -> bool {
        self.played_end_x > self.start_x
    }

    /// Whether the region between the markers is visible
    pub fn has_selection(&self) -> bool {
        self.end_x > self.start_x
    }
}
