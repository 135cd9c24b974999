//! Error types for parsing and interpreting notation.

use thiserror::Error;

/// An error that aborted parsing or interpretation.
///
/// `line` and `col` point into the original source text. Errors with no
/// source location (configuration lookups, encoder range checks) use `0:0`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("[{line}:{col}] {kind:?}: {message}")]
pub struct CompileError {
    pub message: String,
    pub line: usize,
    pub col: usize,
    pub kind: ErrorKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The text does not match the grammar.
    Syntax,
    /// A beat or chord name was defined twice.
    DuplicateName,
    /// A stop referenced a beat that is not playing.
    UnknownName,
    /// A pitch letter, pitch reference or instrument outside the known set.
    UnknownToken,
    /// A value the output format cannot represent.
    Range,
}

impl CompileError {
    pub fn syntax(message: impl Into<String>, line: usize, col: usize) -> Self {
        Self::new(ErrorKind::Syntax, message, line, col)
    }

    pub fn duplicate_name(message: impl Into<String>, line: usize, col: usize) -> Self {
        Self::new(ErrorKind::DuplicateName, message, line, col)
    }

    pub fn unknown_name(message: impl Into<String>, line: usize, col: usize) -> Self {
        Self::new(ErrorKind::UnknownName, message, line, col)
    }

    pub fn unknown_token(message: impl Into<String>, line: usize, col: usize) -> Self {
        Self::new(ErrorKind::UnknownToken, message, line, col)
    }

    pub fn range(message: impl Into<String>, line: usize, col: usize) -> Self {
        Self::new(ErrorKind::Range, message, line, col)
    }

    fn new(kind: ErrorKind, message: impl Into<String>, line: usize, col: usize) -> Self {
        Self {
            message: message.into(),
            line,
            col,
            kind,
        }
    }
}
