//! Arena of cues addressed by [`CueId`] handles

use crate::error::{CueError, Result};
use crate::types::{Cue, CueId};

struct Slot {
    generation: u32,
    cue: Option<Cue>,
}

/// Stable arena of cues
///
/// Handles stay valid for the lifetime of the cue they were issued for;
/// once a cue is removed its handle resolves to `None`, even after the slot
/// is reused.
#[derive(Default)]
pub struct CueStore {
    slots: Vec<Slot>,
    free: Vec<u32>,
    len: usize,
}

impl CueStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a cue and return its handle
    pub fn insert(&mut self, cue: Cue) -> CueId {
        self.len += 1;
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.cue = Some(cue);
            return CueId::new(index, slot.generation);
        }

        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 0,
            cue: Some(cue),
        });
        CueId::new(index, 0)
    }

    /// Remove a cue, returning it if the handle was live
    pub fn remove(&mut self, id: CueId) -> Option<Cue> {
        let slot = self.slots.get_mut(id.index() as usize)?;
        if slot.generation != id.generation() || slot.cue.is_none() {
            return None;
        }
        let cue = slot.cue.take();
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index());
        self.len -= 1;
        cue
    }

    pub fn get(&self, id: CueId) -> Option<&Cue> {
        self.slots
            .get(id.index() as usize)
            .filter(|slot| slot.generation == id.generation())
            .and_then(|slot| slot.cue.as_ref())
    }

    pub fn get_mut(&mut self, id: CueId) -> Option<&mut Cue> {
        self.slots
            .get_mut(id.index() as usize)
            .filter(|slot| slot.generation == id.generation())
            .and_then(|slot| slot.cue.as_mut())
    }

    /// Like [`get`](Self::get) but reports a missing cue as an error
    pub fn require(&self, id: CueId) -> Result<&Cue> {
        self.get(id).ok_or(CueError::CueNotFound(id))
    }

    pub fn contains(&self, id: CueId) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Live cues in slot order
    pub fn iter(&self) -> impl Iterator<Item = (CueId, &Cue)> {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            slot.cue
                .as_ref()
                .map(|cue| (CueId::new(index as u32, slot.generation), cue))
        })
    }

    /// Handles of all live cues in slot order
    pub fn ids(&self) -> Vec<CueId> {
        self.iter().map(|(id, _)| id).collect()
    }

    /// First cue bound to `key` (case-insensitive)
    pub fn find_by_hotkey(&self, key: char) -> Option<CueId> {
        self.iter()
            .find(|(_, cue)| {
                cue.hotkey
                    .is_some_and(|hotkey| hotkey.to_lowercase().eq(key.to_lowercase()))
            })
            .map(|(id, _)| id)
    }
}
