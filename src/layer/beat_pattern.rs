//! Periodic percussion layer.
//!
//! A [`BeatPattern`] is a fixed-length cycle of slots, some of them active. It
//! keeps its own tick counter: the interpreter calls [`BeatPattern::tick`] once
//! per unit of melodic time, whether or not the pattern fires on that tick.

use std::collections::BTreeSet;

use crate::dsl::ast::Slot;

/// General MIDI acoustic bass drum.
pub const BASS_DRUM: u8 = 35;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BeatPattern {
    cycle_length: u32,
    active_positions: BTreeSet<u32>,
    pitch: u8,
    position: u64,
}

impl BeatPattern {
    /// Build a pattern from explicit positions. Positions outside the cycle are
    /// dropped. Returns `None` for an empty cycle.
    pub fn new(
        cycle_length: u32,
        active_positions: impl IntoIterator<Item = u32>,
        pitch: u8,
    ) -> Option<Self> {
        if cycle_length == 0 {
            return None;
        }
        Some(Self {
            cycle_length,
            active_positions: active_positions
                .into_iter()
                .filter(|&p| p < cycle_length)
                .collect(),
            pitch,
            position: 0,
        })
    }

    /// Build a pattern from parsed slots: the cycle is as long as the slot list.
    pub fn from_slots(slots: &[Slot], pitch: u8) -> Option<Self> {
        let cycle_length = u32::try_from(slots.len()).ok()?;
        let active = slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| **slot == Slot::Active)
            .map(|(i, _)| i as u32);
        Self::new(cycle_length, active, pitch)
    }

    /// Whether the current tick falls on an active slot.
    pub fn should_play(&self) -> bool {
        let slot = (self.position % u64::from(self.cycle_length)) as u32;
        self.active_positions.contains(&slot)
    }

    /// Advance by exactly one tick.
    pub fn tick(&mut self) {
        self.position += 1;
    }

    pub fn position(&self) -> u64 {
        self.position
    }

    pub fn cycle_length(&self) -> u32 {
        self.cycle_length
    }

    pub fn active_positions(&self) -> &BTreeSet<u32> {
        &self.active_positions
    }

    /// Percussion note number this pattern plays.
    pub fn pitch(&self) -> u8 {
        self.pitch
    }
}
