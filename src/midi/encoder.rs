//! Encoder boundary: the trait an output format implements, and the driver
//! that feeds a compiled piece through it.

use tracing::debug;

use crate::config::ResolvedSettings;
use crate::dsl::{CompileError, CompiledPiece};
use crate::event::{
    Channel, Time, TrackId, MELODY_CHANNEL, MELODY_TRACK, PERCUSSION_CHANNEL, PERCUSSION_TRACK,
};

use super::MidiError;

/// General MIDI program selected on the percussion track.
pub const PERCUSSION_PROGRAM: u8 = 96;

/// A sink for timed MIDI directives.
///
/// Times and durations are in units. Converting them to the output's own
/// resolution is the encoder's job.
pub trait EventEncoder {
    fn add_tempo(&mut self, track: TrackId, time: Time, bpm: u32) -> Result<(), CompileError>;

    fn add_program_change(
        &mut self,
        track: TrackId,
        channel: Channel,
        time: Time,
        program: u8,
    ) -> Result<(), CompileError>;

    fn add_note(
        &mut self,
        track: TrackId,
        channel: Channel,
        pitch: u8,
        time: Time,
        duration: Time,
        velocity: u8,
    ) -> Result<(), CompileError>;

    /// Serialize everything added so far.
    fn to_bytes(&self) -> Result<Vec<u8>, MidiError>;
}

/// Emit the upfront track setup, then every event of the piece in order.
///
/// Fails with a range error on the first event whose pitch is outside 0..=127.
pub fn render_events(
    piece: &CompiledPiece,
    settings: &ResolvedSettings,
    encoder: &mut impl EventEncoder,
) -> Result<(), CompileError> {
    encoder.add_tempo(MELODY_TRACK, Time::ZERO, settings.tempo)?;
    encoder.add_program_change(MELODY_TRACK, MELODY_CHANNEL, Time::ZERO, settings.program)?;
    encoder.add_tempo(PERCUSSION_TRACK, Time::ZERO, settings.tempo)?;
    encoder.add_program_change(
        PERCUSSION_TRACK,
        PERCUSSION_CHANNEL,
        Time::ZERO,
        PERCUSSION_PROGRAM,
    )?;

    for event in piece.events.events() {
        let pitch = midi_key(event.pitch)?;
        encoder.add_note(
            event.track,
            event.channel,
            pitch,
            event.time,
            event.duration,
            event.velocity,
        )?;
    }

    debug!(
        "rendered {} events over {} units at {} bpm, program {}",
        piece.events.len(),
        piece.duration,
        settings.tempo,
        settings.program
    );
    Ok(())
}

fn midi_key(pitch: i32) -> Result<u8, CompileError> {
    u8::try_from(pitch)
        .ok()
        .filter(|p| *p <= 127)
        .ok_or_else(|| CompileError::range(format!("pitch {pitch} is outside 0..=127"), 0, 0))
}
