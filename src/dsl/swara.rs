//! Swara letters and their semitone offsets from S.
//!
//! Twelve letters cover the octave. S and P are fixed; each of the other five
//! degrees has a lower-case (lower) and upper-case (higher) variant.

/// A notated pitch degree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Swara {
    Sa,
    Ri1,
    Ri2,
    Ga2,
    Ga3,
    Ma1,
    Ma2,
    Pa,
    Dha1,
    Dha2,
    Ni2,
    Ni3,
}

impl Swara {
    pub const ALL: [Swara; 12] = [
        Swara::Sa,
        Swara::Ri1,
        Swara::Ri2,
        Swara::Ga2,
        Swara::Ga3,
        Swara::Ma1,
        Swara::Ma2,
        Swara::Pa,
        Swara::Dha1,
        Swara::Dha2,
        Swara::Ni2,
        Swara::Ni3,
    ];

    /// Resolve a notation letter. Returns `None` outside the twelve known letters.
    pub fn from_letter(letter: char) -> Option<Self> {
        let swara = match letter {
            'S' => Swara::Sa,
            'r' => Swara::Ri1,
            'R' => Swara::Ri2,
            'g' => Swara::Ga2,
            'G' => Swara::Ga3,
            'm' => Swara::Ma1,
            'M' => Swara::Ma2,
            'P' => Swara::Pa,
            'd' => Swara::Dha1,
            'D' => Swara::Dha2,
            'n' => Swara::Ni2,
            'N' => Swara::Ni3,
            _ => return None,
        };
        Some(swara)
    }

    pub fn letter(self) -> char {
        match self {
            Swara::Sa => 'S',
            Swara::Ri1 => 'r',
            Swara::Ri2 => 'R',
            Swara::Ga2 => 'g',
            Swara::Ga3 => 'G',
            Swara::Ma1 => 'm',
            Swara::Ma2 => 'M',
            Swara::Pa => 'P',
            Swara::Dha1 => 'd',
            Swara::Dha2 => 'D',
            Swara::Ni2 => 'n',
            Swara::Ni3 => 'N',
        }
    }

    /// Semitones above S.
    pub fn semitones(self) -> i32 {
        self as i32
    }
}
