/// Arena handles for cues
use serde::{Deserialize, Serialize};
use std::fmt;

/// Cue identifier
///
/// An opaque handle into a [`CueStore`](crate::CueStore). The generation
/// counter makes handles to removed cues resolve to nothing instead of
/// aliasing whichever cue reuses the slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CueId {
    index: u32,
    generation: u32,
}

impl CueId {
    pub(crate) fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    /// Slot index inside the arena
    pub fn index(self) -> u32 {
        self.index
    }

    /// Generation of the slot when this handle was issued
    pub fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Display for CueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cue#{}.{}", self.index, self.generation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cue_id_display() {
        let id = CueId::new(3, 1);
        assert_eq!(format!("{}", id), "cue#3.1");
    }

    #[test]
    fn cue_ids_differ_by_generation() {
        assert_ne!(CueId::new(0, 0), CueId::new(0, 1));
    }
}
