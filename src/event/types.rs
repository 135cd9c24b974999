//! Event data model — the timed units handed to the encoder.
//!
//! An [`Event`] is one pitched note on one of the two output tracks. Melody and
//! chord events share the melody track; beat patterns write to the percussion
//! track on the General MIDI drum channel.

use super::time::Time;

/// Identifies an output track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TrackId(pub u32);

/// A MIDI channel (0–15).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Channel(pub u8);

pub const MELODY_TRACK: TrackId = TrackId(0);
pub const PERCUSSION_TRACK: TrackId = TrackId(1);
pub const MELODY_CHANNEL: Channel = Channel(0);
pub const PERCUSSION_CHANNEL: Channel = Channel(9);

/// MIDI note number of the tonic (S) before any pitch-reference shift.
pub const MIDDLE_C: i32 = 60;

/// Every event is emitted at this velocity.
pub const DEFAULT_VELOCITY: u8 = 100;

/// Which layer of the piece produced an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Layer {
    Melody,
    Chord,
    Percussion,
}

/// An interpreted note: where it sits relative to the tonic and how long it lasts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Note {
    /// Semitones above S within the octave.
    pub pitch_shift: i32,
    /// Net octave marks: raises minus lowers.
    pub octave_shift: i32,
    /// Length in units. Always positive.
    pub duration: Time,
}

impl Note {
    /// MIDI pitch of this note once the document's pitch reference is applied.
    pub fn midi_pitch(&self, reference_shift: i32) -> i32 {
        MIDDLE_C + self.pitch_shift + reference_shift + 12 * self.octave_shift
    }
}

/// A single event on the timeline.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Event {
    /// Absolute start, in units.
    pub time: Time,
    /// Length, in units.
    pub duration: Time,
    pub track: TrackId,
    pub channel: Channel,
    /// MIDI pitch. Range-checked at the encoder boundary.
    pub pitch: i32,
    pub velocity: u8,
    pub layer: Layer,
}

impl Event {
    /// A melody note on the melody track.
    pub fn melody(time: Time, duration: Time, pitch: i32) -> Self {
        Self {
            time,
            duration,
            track: MELODY_TRACK,
            channel: MELODY_CHANNEL,
            pitch,
            velocity: DEFAULT_VELOCITY,
            layer: Layer::Melody,
        }
    }

    /// A chord-cycle note, sounding alongside the melody.
    pub fn chord(time: Time, duration: Time, pitch: i32) -> Self {
        Self {
            layer: Layer::Chord,
            ..Self::melody(time, duration, pitch)
        }
    }

    /// A one-tick percussion hit.
    pub fn percussion(time: Time, pitch: u8) -> Self {
        Self {
            time,
            duration: Time::UNIT,
            track: PERCUSSION_TRACK,
            channel: PERCUSSION_CHANNEL,
            pitch: i32::from(pitch),
            velocity: DEFAULT_VELOCITY,
            layer: Layer::Percussion,
        }
    }
}
