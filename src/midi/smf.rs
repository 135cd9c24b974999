//! Standard MIDI File encoder.
//!
//! Directives are collected per track with absolute tick positions, then sorted
//! and delta-encoded when the file is written. Output is format 1: one MTrk
//! chunk per track, tempo carried on every track.

use midly::num::{u15, u24, u28, u4, u7};
use midly::{Format, Header, MetaMessage, MidiMessage, Smf, Timing, TrackEvent, TrackEventKind};

use crate::dsl::CompileError;
use crate::event::{Channel, Time, TrackId};

use super::encoder::EventEncoder;
use super::MidiError;

/// Ticks per quarter note.
pub const DEFAULT_PPQN: u16 = 960;

const MAX_U24: u32 = (1 << 24) - 1;
const MAX_U28: u64 = (1 << 28) - 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Directive {
    Tempo { micros_per_quarter: u32 },
    Program { channel: u8, program: u8 },
    NoteOff { channel: u8, key: u8 },
    NoteOn { channel: u8, key: u8, velocity: u8 },
}

impl Directive {
    /// Sort rank among directives on the same tick: setup first, then
    /// releases, then attacks, so a repeated key retriggers cleanly.
    fn rank(self) -> u8 {
        match self {
            Directive::Tempo { .. } | Directive::Program { .. } => 0,
            Directive::NoteOff { .. } => 1,
            Directive::NoteOn { .. } => 2,
        }
    }

    fn kind(self) -> TrackEventKind<'static> {
        match self {
            Directive::Tempo { micros_per_quarter } => {
                TrackEventKind::Meta(MetaMessage::Tempo(u24::new(micros_per_quarter)))
            }
            Directive::Program { channel, program } => TrackEventKind::Midi {
                channel: u4::new(channel),
                message: MidiMessage::ProgramChange {
                    program: u7::new(program),
                },
            },
            Directive::NoteOff { channel, key } => TrackEventKind::Midi {
                channel: u4::new(channel),
                message: MidiMessage::NoteOff {
                    key: u7::new(key),
                    vel: u7::new(0),
                },
            },
            Directive::NoteOn {
                channel,
                key,
                velocity,
            } => TrackEventKind::Midi {
                channel: u4::new(channel),
                message: MidiMessage::NoteOn {
                    key: u7::new(key),
                    vel: u7::new(velocity),
                },
            },
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Scheduled {
    tick: u64,
    directive: Directive,
}

/// Collects directives and writes them as an in-memory `.mid` file.
#[derive(Debug, Clone)]
pub struct SmfEncoder {
    ppqn: u16,
    tracks: Vec<Vec<Scheduled>>,
}

impl Default for SmfEncoder {
    fn default() -> Self {
        Self::new(DEFAULT_PPQN)
    }
}

impl SmfEncoder {
    /// `ppqn` must fit in 15 bits; larger values are clamped.
    pub fn new(ppqn: u16) -> Self {
        Self {
            ppqn: ppqn.clamp(1, 0x7FFF),
            tracks: Vec::new(),
        }
    }

    fn ticks(&self, time: Time) -> Result<u64, CompileError> {
        time.to_ticks(u64::from(self.ppqn)).ok_or_else(|| {
            CompileError::range(format!("time {time} cannot be encoded as ticks"), 0, 0)
        })
    }

    fn schedule(&mut self, track: TrackId, tick: u64, directive: Directive) {
        let idx = track.0 as usize;
        if self.tracks.len() <= idx {
            self.tracks.resize_with(idx + 1, Vec::new);
        }
        self.tracks[idx].push(Scheduled { tick, directive });
    }

    /// Absolute schedule of one track in output order.
    fn sorted(track: &[Scheduled]) -> Vec<Scheduled> {
        let mut events = track.to_vec();
        events.sort_by_key(|s| (s.tick, s.directive.rank()));
        events
    }
}

fn check_u7(value: u8, what: &str) -> Result<u8, CompileError> {
    if value > 127 {
        return Err(CompileError::range(
            format!("{what} {value} is outside 0..=127"),
            0,
            0,
        ));
    }
    Ok(value)
}

fn check_channel(channel: Channel) -> Result<u8, CompileError> {
    if channel.0 > 15 {
        return Err(CompileError::range(
            format!("channel {} is outside 0..=15", channel.0),
            0,
            0,
        ));
    }
    Ok(channel.0)
}

impl EventEncoder for SmfEncoder {
    fn add_tempo(&mut self, track: TrackId, time: Time, bpm: u32) -> Result<(), CompileError> {
        let micros_per_quarter = match 60_000_000u32.checked_div(bpm) {
            Some(m) if (1..=MAX_U24).contains(&m) => m,
            _ => {
                return Err(CompileError::range(
                    format!("tempo {bpm} bpm cannot be encoded"),
                    0,
                    0,
                ))
            }
        };
        let tick = self.ticks(time)?;
        self.schedule(track, tick, Directive::Tempo { micros_per_quarter });
        Ok(())
    }

    fn add_program_change(
        &mut self,
        track: TrackId,
        channel: Channel,
        time: Time,
        program: u8,
    ) -> Result<(), CompileError> {
        let channel = check_channel(channel)?;
        let program = check_u7(program, "program")?;
        let tick = self.ticks(time)?;
        self.schedule(track, tick, Directive::Program { channel, program });
        Ok(())
    }

    fn add_note(
        &mut self,
        track: TrackId,
        channel: Channel,
        pitch: u8,
        time: Time,
        duration: Time,
        velocity: u8,
    ) -> Result<(), CompileError> {
        let channel = check_channel(channel)?;
        let key = check_u7(pitch, "pitch")?;
        let velocity = check_u7(velocity, "velocity")?;
        let start = self.ticks(time)?;
        let end = time.checked_add(duration).ok_or_else(|| {
            CompileError::range(format!("note at {time} runs past the encodable time"), 0, 0)
        })?;
        // Every note keeps at least one tick, however short.
        let end = self.ticks(end)?.max(start.saturating_add(1));
        self.schedule(
            track,
            start,
            Directive::NoteOn {
                channel,
                key,
                velocity,
            },
        );
        self.schedule(track, end, Directive::NoteOff { channel, key });
        Ok(())
    }

    fn to_bytes(&self) -> Result<Vec<u8>, MidiError> {
        let mut smf = Smf::new(Header::new(
            Format::Parallel,
            Timing::Metrical(u15::new(self.ppqn)),
        ));

        for track in &self.tracks {
            let mut out = Vec::with_capacity(track.len() + 1);
            let mut last = 0u64;
            for scheduled in Self::sorted(track) {
                let delta = scheduled.tick - last;
                if delta > MAX_U28 {
                    return Err(CompileError::range(
                        format!("gap of {delta} ticks cannot be encoded"),
                        0,
                        0,
                    )
                    .into());
                }
                out.push(TrackEvent {
                    delta: u28::new(delta as u32),
                    kind: scheduled.directive.kind(),
                });
                last = scheduled.tick;
            }
            out.push(TrackEvent {
                delta: u28::new(0),
                kind: TrackEventKind::Meta(MetaMessage::EndOfTrack),
            });
            smf.tracks.push(out);
        }

        let mut buf = Vec::new();
        smf.write_std(&mut buf)?;
        Ok(buf)
    }
}
