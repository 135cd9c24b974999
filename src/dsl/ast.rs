//! Parse tree for the notation.
//!
//! Nodes own their children and are never mutated after parsing. Every node
//! carries the source position of its first character.

use num_rational::Ratio;

use super::swara::Swara;

/// A parsed document: top-level instructions in source order.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub nodes: Vec<Node>,
}

/// A location in the original source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub line: usize,
    pub col: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Note(NoteNode),
    Group(Group),
    Speedup(Position),
    Slowdown(Position),
    BeatDefinition(BeatDefinition),
    ChordDefinition(ChordDefinition),
    Stop(StopExpression),
}

/// A swara with its attached marks.
#[derive(Debug, Clone, PartialEq)]
pub struct NoteNode {
    pub swara: Swara,
    pub raise: u32,
    pub lower: u32,
    pub karve: u32,
    pub pos: Position,
}

impl NoteNode {
    pub fn octave_shift(&self) -> i32 {
        self.raise as i32 - self.lower as i32
    }

    /// Duration in units before any group or speed scaling.
    pub fn base_units(&self) -> u64 {
        1 + u64::from(self.karve)
    }
}

/// A bracketed run of notes sharing a duration divisor.
#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    pub kind: GroupKind,
    pub children: Vec<Node>,
    pub pos: Position,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupKind {
    /// `( ... )`: two notes in the time of one.
    Round,
    /// `< ... >`: three notes in the time of two.
    Angle,
}

impl GroupKind {
    pub fn divisor(self) -> Ratio<u64> {
        match self {
            GroupKind::Round => Ratio::from_integer(2),
            GroupKind::Angle => Ratio::new(3, 2),
        }
    }
}

/// One slot of a beat definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    Active,
    Inactive,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BeatDefinition {
    pub name: String,
    pub slots: Vec<Slot>,
    /// Explicit percussion note; the bass drum when absent.
    pub pitch: Option<u8>,
    pub pos: Position,
}

/// A chord and its alternate notes. The notes are the chord's subtree: they
/// belong to the chord, not to the melody.
#[derive(Debug, Clone, PartialEq)]
pub struct ChordDefinition {
    pub name: String,
    pub notes: Vec<Node>,
    pub pos: Position,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StopExpression {
    pub name: String,
    pub pos: Position,
}
