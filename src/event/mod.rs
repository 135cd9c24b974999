//! Event stream model — exact musical time, event types, and the output sink.
//!
//! The interpreter appends [`Event`]s to an [`EventSink`] as it walks a
//! document; the MIDI layer reads them back in order and hands them to an
//! encoder.

pub mod sink;
pub mod time;
pub mod types;

pub use sink::EventSink;
pub use time::{Time, UNITS_PER_QUARTER};
pub use types::{
    Channel, Event, Layer, Note, TrackId, DEFAULT_VELOCITY, MELODY_CHANNEL, MELODY_TRACK,
    MIDDLE_C, PERCUSSION_CHANNEL, PERCUSSION_TRACK,
};
