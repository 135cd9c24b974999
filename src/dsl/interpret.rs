//! Interpreter — walks a [`Document`] top-down and emits timed events.
//!
//! All mutable state lives in an [`InterpretationContext`] owned by a single
//! pass: the timeline, the named beat patterns, the named chord cycles and
//! the active-chord handle. Independent documents never share a context.
//!
//! Timing invariants:
//! - Every duration is `(1 + karve) / group divisors / 2^speed_level` units,
//!   computed exactly.
//! - Beat patterns tick once for every whole unit `k` with
//!   `start <= k < start + duration` of each melody note, so ticks stay on the
//!   absolute unit grid regardless of how notes subdivide it.
//! - A chord cycle sounds its current note at the start of each melody note,
//!   then advances by that melody note's duration.

use num_rational::Ratio;
use num_traits::{CheckedMul, One};
use tracing::{debug, trace};

use crate::event::{Event, EventSink, Note, Time};
use crate::layer::{BeatPattern, ChordCycle, BASS_DRUM};

use super::ast::*;
use super::error::CompileError;

/// Upper bound on beat ticks a single melody note may drive.
pub const MAX_BEAT_TICKS_PER_NOTE: u64 = 1 << 16;

/// The result of interpreting a document.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledPiece {
    pub events: EventSink,
    /// Total melodic time: the sum of every melody note's duration.
    pub duration: Time,
}

/// Current position and tempo multiplier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TimelineState {
    pub current_time: Time,
    /// Each step up halves note durations; each step down doubles them.
    pub speed_level: i32,
}

/// Mutable state of one interpretation pass.
#[derive(Debug, Default)]
pub struct InterpretationContext {
    timeline: TimelineState,
    beats: Vec<(String, BeatPattern)>,
    chords: Vec<(String, ChordCycle)>,
    /// Index into `chords` while a chord's own notes are being visited.
    active_chord: Option<usize>,
    pitch_shift: i32,
    sink: EventSink,
}

/// Interpret a parsed document with the given pitch-reference shift.
pub fn interpret(document: &Document, pitch_shift: i32) -> Result<CompiledPiece, CompileError> {
    let mut ctx = InterpretationContext::new(pitch_shift);
    ctx.visit_all(&document.nodes, Ratio::one())?;
    Ok(ctx.finish())
}

impl InterpretationContext {
    pub fn new(pitch_shift: i32) -> Self {
        Self {
            pitch_shift,
            ..Self::default()
        }
    }

    pub fn timeline(&self) -> TimelineState {
        self.timeline
    }

    pub fn beat(&self, name: &str) -> Option<&BeatPattern> {
        self.beats.iter().find(|(n, _)| n == name).map(|(_, b)| b)
    }

    pub fn chord(&self, name: &str) -> Option<&ChordCycle> {
        self.chords.iter().find(|(n, _)| n == name).map(|(_, c)| c)
    }

    pub fn events(&self) -> &EventSink {
        &self.sink
    }

    /// Hand the populated sink over, discarding all other state.
    pub fn finish(self) -> CompiledPiece {
        CompiledPiece {
            events: self.sink,
            duration: self.timeline.current_time,
        }
    }

    /// Visit nodes in order. `divisor` is the product of enclosing group divisors.
    pub fn visit_all(&mut self, nodes: &[Node], divisor: Ratio<u64>) -> Result<(), CompileError> {
        for node in nodes {
            self.visit(node, divisor)?;
        }
        Ok(())
    }

    /// Dispatch one node.
    pub fn visit(&mut self, node: &Node, divisor: Ratio<u64>) -> Result<(), CompileError> {
        match node {
            Node::Note(note) => self.visit_note(note, divisor),
            Node::Group(group) => {
                let inner = divisor.checked_mul(&group.kind.divisor()).ok_or_else(|| {
                    CompileError::range(
                        "groups are nested too deeply",
                        group.pos.line,
                        group.pos.col,
                    )
                })?;
                self.visit_all(&group.children, inner)
            }
            Node::Speedup(_) => {
                self.timeline.speed_level = self.timeline.speed_level.saturating_add(1);
                Ok(())
            }
            Node::Slowdown(_) => {
                self.timeline.speed_level = self.timeline.speed_level.saturating_sub(1);
                Ok(())
            }
            Node::BeatDefinition(def) => self.visit_beat(def),
            Node::ChordDefinition(def) => self.visit_chord(def),
            Node::Stop(stop) => self.visit_stop(stop),
        }
    }

    fn visit_beat(&mut self, def: &BeatDefinition) -> Result<(), CompileError> {
        if self.beat(&def.name).is_some() {
            return Err(CompileError::duplicate_name(
                format!("beat '{}' is already defined", def.name),
                def.pos.line,
                def.pos.col,
            ));
        }
        let pitch = def.pitch.unwrap_or(BASS_DRUM);
        let pattern = BeatPattern::from_slots(&def.slots, pitch).ok_or_else(|| {
            CompileError::syntax(
                format!("beat '{}' has no slots", def.name),
                def.pos.line,
                def.pos.col,
            )
        })?;
        debug!(
            "beat '{}' registered at {}: cycle {}, active {:?}, pitch {}",
            def.name,
            self.timeline.current_time,
            pattern.cycle_length(),
            pattern.active_positions(),
            pitch
        );
        self.beats.push((def.name.clone(), pattern));
        Ok(())
    }

    fn visit_chord(&mut self, def: &ChordDefinition) -> Result<(), CompileError> {
        if self.chord(&def.name).is_some() {
            return Err(CompileError::duplicate_name(
                format!("chord '{}' is already defined", def.name),
                def.pos.line,
                def.pos.col,
            ));
        }
        self.chords.push((def.name.clone(), ChordCycle::new()));
        self.active_chord = Some(self.chords.len() - 1);
        let result = self.visit_all(&def.notes, Ratio::one());
        self.active_chord = None;
        result?;
        debug!(
            "chord '{}' registered at {} with {} notes",
            def.name,
            self.timeline.current_time,
            def.notes.len()
        );
        Ok(())
    }

    fn visit_stop(&mut self, stop: &StopExpression) -> Result<(), CompileError> {
        let idx = self
            .beats
            .iter()
            .position(|(n, _)| *n == stop.name)
            .ok_or_else(|| {
                CompileError::unknown_name(
                    format!("no beat named '{}' is playing", stop.name),
                    stop.pos.line,
                    stop.pos.col,
                )
            })?;
        self.beats.remove(idx);
        debug!("beat '{}' stopped at {}", stop.name, self.timeline.current_time);
        Ok(())
    }

    fn visit_note(&mut self, node: &NoteNode, divisor: Ratio<u64>) -> Result<(), CompileError> {
        let duration = self.scaled_duration(node, divisor)?;
        let note = Note {
            pitch_shift: node.swara.semitones(),
            octave_shift: node.octave_shift(),
            duration,
        };

        if let Some(idx) = self.active_chord {
            self.chords[idx].1.push(note);
            return Ok(());
        }
        self.play(note, node.pos)
    }

    fn scaled_duration(&self, node: &NoteNode, divisor: Ratio<u64>) -> Result<Time, CompileError> {
        let level = self.timeline.speed_level;
        let factor = 2u64.checked_pow(level.unsigned_abs()).ok_or_else(|| {
            CompileError::range(
                format!("speed level {level} is out of range"),
                node.pos.line,
                node.pos.col,
            )
        })?;
        let duration = Time::from_units(node.base_units())
            .checked_div(divisor)
            .and_then(|base| {
                if level >= 0 {
                    base.checked_div(Ratio::from_integer(factor))
                } else {
                    base.checked_mul(Ratio::from_integer(factor))
                }
            });
        duration.ok_or_else(|| {
            CompileError::range(
                format!("note duration at speed level {level} cannot be represented"),
                node.pos.line,
                node.pos.col,
            )
        })
    }

    /// Emit a melody note and drive every active layer across its duration.
    fn play(&mut self, note: Note, pos: Position) -> Result<(), CompileError> {
        let start = self.timeline.current_time;
        let end = start.checked_add(note.duration).ok_or_else(|| {
            CompileError::range(
                format!(
                    "a note of {} units at {start} ends past the representable time",
                    note.duration
                ),
                pos.line,
                pos.col,
            )
        })?;

        // Whole units k with start <= k < end.
        let first_tick = start.ceil_units();
        let ticks = end.ceil_units() - first_tick;
        if !self.beats.is_empty() && ticks > MAX_BEAT_TICKS_PER_NOTE {
            return Err(CompileError::range(
                format!("a note of {} units drives too many beat ticks", note.duration),
                pos.line,
                pos.col,
            ));
        }

        let pitch = note.midi_pitch(self.pitch_shift);
        trace!("note {pitch} at {start} for {}", note.duration);
        self.sink.push(Event::melody(start, note.duration, pitch));

        if !self.beats.is_empty() {
            for tick in first_tick..first_tick + ticks {
                let at = Time::from_units(tick);
                for (_, beat) in &mut self.beats {
                    if beat.should_play() {
                        self.sink.push(Event::percussion(at, beat.pitch()));
                    }
                    beat.tick();
                }
            }
        }

        for (name, chord) in &mut self.chords {
            if let Some(chord_note) = chord.current_note().copied() {
                self.sink.push(Event::chord(
                    start,
                    chord_note.duration,
                    chord_note.midi_pitch(self.pitch_shift),
                ));
            }
            if chord.advance(note.duration).is_none() {
                return Err(CompileError::range(
                    format!("chord '{name}' has run past the representable time"),
                    pos.line,
                    pos.col,
                ));
            }
        }

        self.timeline.current_time = end;
        Ok(())
    }
}
