//! Token types for the notation lexer.

/// A token produced by the lexer. `line`/`col` refer to the original source.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub line: usize,
    pub col: usize,
}

/// The kind of token.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // Notes
    Letter(char),
    RaiseOctave, // *
    LowerOctave, // /
    Karve,       // ,

    // Groups
    LParen,
    RParen,
    LAngle,
    RAngle,

    // Speed
    Speedup,  // +
    Slowdown, // -

    // Directives
    LBracket,
    RBracket,
    Colon,
    Beat,
    Chord,
    Stop,
    Ident(String),
    Slots(Vec<SlotToken>),
    Integer(u64),

    Eof,
}

/// One slot of a beat pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotToken {
    Hit,  // X or x
    Rest, // .
}
