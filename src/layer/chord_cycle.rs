//! Round-robin harmony layer.
//!
//! A [`ChordCycle`] holds alternate notes and an `elapsed` counter of exact
//! melodic time. The sounding note is `notes[floor(elapsed) mod len]`: the
//! cycle has no clock of its own and only moves when a melody note drives it.

use crate::event::{Note, Time};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChordCycle {
    notes: Vec<Note>,
    elapsed: Time,
}

impl ChordCycle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an alternate note to the end of the cycle.
    pub fn push(&mut self, note: Note) {
        self.notes.push(note);
    }

    /// Index of the note currently selected.
    pub fn index(&self) -> Option<usize> {
        if self.notes.is_empty() {
            return None;
        }
        let len = self.notes.len() as u64;
        Some((self.elapsed.floor_units() % len) as usize)
    }

    /// The note currently selected, or `None` while the cycle is empty.
    pub fn current_note(&self) -> Option<&Note> {
        self.index().map(|i| &self.notes[i])
    }

    /// Move forward by the duration of the driving melody note. Returns the new
    /// `elapsed`, or `None` (leaving the cycle untouched) if it would overflow.
    pub fn advance(&mut self, amount: Time) -> Option<Time> {
        self.elapsed = self.elapsed.checked_add(amount)?;
        Some(self.elapsed)
    }

    pub fn elapsed(&self) -> Time {
        self.elapsed
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }
}
