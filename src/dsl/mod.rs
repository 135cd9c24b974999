//! Notation compiler — source text → tokens → parse tree → timed events.

pub mod ast;
pub mod error;
pub mod interpret;
pub mod lexer;
pub mod parser;
pub mod swara;
pub mod token;

pub use ast::*;
pub use error::{CompileError, ErrorKind};
pub use interpret::{CompiledPiece, InterpretationContext, TimelineState};
pub use swara::Swara;

use lexer::Lexer;
use parser::Parser;

/// The notation compiler.
///
/// Parses source text through lexer → parser → parse tree, then interprets the
/// tree into an event stream.
pub struct Compiler;

impl Compiler {
    /// Parse notation source into a [`Document`].
    pub fn parse(source: &str) -> Result<Document, CompileError> {
        let mut lexer = Lexer::new(source);
        let tokens = lexer.tokenize()?;
        let mut parser = Parser::new(tokens);
        parser.parse()
    }

    /// Parse and interpret notation source. `pitch_shift` is the reference
    /// pitch's offset from C in semitones.
    pub fn compile(source: &str, pitch_shift: i32) -> Result<CompiledPiece, CompileError> {
        let document = Self::parse(source)?;
        interpret::interpret(&document, pitch_shift)
    }
}
