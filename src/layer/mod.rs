//! Accompaniment layers driven by the melody: percussion cycles and chord cycles.

pub mod beat_pattern;
pub mod chord_cycle;

pub use beat_pattern::{BeatPattern, BASS_DRUM};
pub use chord_cycle::ChordCycle;
