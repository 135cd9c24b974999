//! Swara — a Carnatic melodic notation interpreter that renders to MIDI.

pub mod config;
pub mod dsl;
pub mod event;
pub mod layer;
pub mod midi;
