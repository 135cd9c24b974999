//! Parser for the notation.
//!
//! Recursive descent over the token stream. Groups may nest and may contain
//! speed markers; chord bodies hold only notes and groups; directives appear
//! only at the top level.

use super::ast::*;
use super::error::CompileError;
use super::swara::Swara;
use super::token::{SlotToken, Token, TokenKind};

/// Where a run of items is being parsed. Decides what may appear and what
/// token closes the run.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Context {
    Document,
    /// `in_chord` is set for groups anywhere inside a chord body.
    Group { kind: GroupKind, in_chord: bool },
    ChordBody,
}

impl Context {
    fn in_chord(self) -> bool {
        matches!(
            self,
            Context::ChordBody | Context::Group { in_chord: true, .. }
        )
    }
}

pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, pos: 0 }
    }

    pub fn parse(&mut self) -> Result<Document, CompileError> {
        let nodes = self.parse_items(Context::Document)?;
        self.expect(TokenKind::Eof)?;
        Ok(Document { nodes })
    }

    /// Parse items until the token that closes `context`, leaving that token
    /// unconsumed.
    fn parse_items(&mut self, context: Context) -> Result<Vec<Node>, CompileError> {
        let mut nodes = Vec::new();
        loop {
            let t = self.peek();
            let pos = Position {
                line: t.line,
                col: t.col,
            };
            let node = match (&t.kind, context) {
                (TokenKind::Eof, Context::Document)
                | (TokenKind::RParen, Context::Group { kind: GroupKind::Round, .. })
                | (TokenKind::RAngle, Context::Group { kind: GroupKind::Angle, .. })
                | (TokenKind::RBracket, Context::ChordBody) => break,
                (TokenKind::Letter(_), _) => Node::Note(self.parse_note()?),
                (TokenKind::LParen, _) => {
                    Node::Group(self.parse_group(GroupKind::Round, context.in_chord())?)
                }
                (TokenKind::LAngle, _) => {
                    Node::Group(self.parse_group(GroupKind::Angle, context.in_chord())?)
                }
                (TokenKind::Speedup | TokenKind::Slowdown, _) if context.in_chord() => {
                    return Err(CompileError::syntax(
                        "speed markers are not allowed inside a chord",
                        t.line,
                        t.col,
                    ));
                }
                (TokenKind::Speedup, _) => {
                    self.advance();
                    Node::Speedup(pos)
                }
                (TokenKind::Slowdown, _) => {
                    self.advance();
                    Node::Slowdown(pos)
                }
                (TokenKind::LBracket, Context::Document) => self.parse_directive()?,
                (TokenKind::LBracket, _) => {
                    return Err(CompileError::syntax(
                        "directives are only allowed at the top level",
                        t.line,
                        t.col,
                    ));
                }
                (TokenKind::RaiseOctave | TokenKind::LowerOctave | TokenKind::Karve, _) => {
                    return Err(CompileError::syntax(
                        format!("{} must follow a swara", describe(&t.kind)),
                        t.line,
                        t.col,
                    ));
                }
                (other, _) => {
                    return Err(CompileError::syntax(
                        format!("unexpected {}", describe(other)),
                        t.line,
                        t.col,
                    ));
                }
            };
            nodes.push(node);
        }
        Ok(nodes)
    }

    fn parse_note(&mut self) -> Result<NoteNode, CompileError> {
        let t = self.advance();
        let pos = Position {
            line: t.line,
            col: t.col,
        };
        let letter = match t.kind {
            TokenKind::Letter(ch) => ch,
            ref other => {
                return Err(CompileError::syntax(
                    format!("expected a swara, got {}", describe(other)),
                    pos.line,
                    pos.col,
                ));
            }
        };
        let swara = Swara::from_letter(letter).ok_or_else(|| {
            CompileError::unknown_token(format!("unknown swara: '{letter}'"), pos.line, pos.col)
        })?;

        let mut note = NoteNode {
            swara,
            raise: 0,
            lower: 0,
            karve: 0,
            pos,
        };
        loop {
            match self.peek().kind {
                TokenKind::RaiseOctave => note.raise += 1,
                TokenKind::LowerOctave => note.lower += 1,
                TokenKind::Karve => note.karve += 1,
                _ => break,
            }
            self.advance();
        }
        Ok(note)
    }

    fn parse_group(&mut self, kind: GroupKind, in_chord: bool) -> Result<Group, CompileError> {
        let open = self.advance();
        let pos = Position {
            line: open.line,
            col: open.col,
        };
        let children = self.parse_items(Context::Group { kind, in_chord })?;
        match kind {
            GroupKind::Round => self.expect(TokenKind::RParen)?,
            GroupKind::Angle => self.expect(TokenKind::RAngle)?,
        };
        Ok(Group {
            kind,
            children,
            pos,
        })
    }

    fn parse_directive(&mut self) -> Result<Node, CompileError> {
        let open = self.expect(TokenKind::LBracket)?;
        let pos = Position {
            line: open.line,
            col: open.col,
        };
        let keyword = self.advance();
        match keyword.kind {
            TokenKind::Beat => {
                self.expect(TokenKind::Colon)?;
                let name = self.expect_ident()?;
                self.expect(TokenKind::Colon)?;
                let slots = self.expect_slots()?;
                let pitch = if self.check(TokenKind::Colon) {
                    self.advance();
                    Some(self.expect_pitch()?)
                } else {
                    None
                };
                self.expect(TokenKind::RBracket)?;
                Ok(Node::BeatDefinition(BeatDefinition {
                    name,
                    slots,
                    pitch,
                    pos,
                }))
            }
            TokenKind::Chord => {
                self.expect(TokenKind::Colon)?;
                let name = self.expect_ident()?;
                self.expect(TokenKind::Colon)?;
                let notes = self.parse_items(Context::ChordBody)?;
                let close = self.expect(TokenKind::RBracket)?;
                if notes.is_empty() {
                    return Err(CompileError::syntax(
                        format!("chord '{name}' has no notes"),
                        close.line,
                        close.col,
                    ));
                }
                Ok(Node::ChordDefinition(ChordDefinition { name, notes, pos }))
            }
            TokenKind::Stop => {
                self.expect(TokenKind::Colon)?;
                let name = self.expect_ident()?;
                self.expect(TokenKind::RBracket)?;
                Ok(Node::Stop(StopExpression { name, pos }))
            }
            ref other => Err(CompileError::syntax(
                format!("expected directive keyword, got {}", describe(other)),
                keyword.line,
                keyword.col,
            )),
        }
    }

    fn expect_ident(&mut self) -> Result<String, CompileError> {
        let t = self.advance();
        match t.kind {
            TokenKind::Ident(name) => Ok(name),
            ref other => Err(CompileError::syntax(
                format!("expected a name, got {}", describe(other)),
                t.line,
                t.col,
            )),
        }
    }

    fn expect_slots(&mut self) -> Result<Vec<Slot>, CompileError> {
        let t = self.advance();
        match t.kind {
            TokenKind::Slots(slots) => Ok(slots
                .into_iter()
                .map(|s| match s {
                    SlotToken::Hit => Slot::Active,
                    SlotToken::Rest => Slot::Inactive,
                })
                .collect()),
            ref other => Err(CompileError::syntax(
                format!("expected beat slots, got {}", describe(other)),
                t.line,
                t.col,
            )),
        }
    }

    fn expect_pitch(&mut self) -> Result<u8, CompileError> {
        let t = self.advance();
        match t.kind {
            TokenKind::Integer(v) => u8::try_from(v)
                .ok()
                .filter(|p| *p <= 127)
                .ok_or_else(|| {
                    CompileError::range(
                        format!("percussion pitch {v} is outside 0..=127"),
                        t.line,
                        t.col,
                    )
                }),
            ref other => Err(CompileError::syntax(
                format!("expected a percussion pitch, got {}", describe(other)),
                t.line,
                t.col,
            )),
        }
    }

    // --- Utility methods ---

    fn peek(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    /// Consume and return the current token. Stays on the final `Eof`.
    fn advance(&mut self) -> Token {
        let t = self.peek().clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        t
    }

    fn check(&self, kind: TokenKind) -> bool {
        std::mem::discriminant(&self.peek().kind) == std::mem::discriminant(&kind)
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token, CompileError> {
        if self.check(kind.clone()) {
            Ok(self.advance())
        } else {
            let t = self.peek();
            Err(CompileError::syntax(
                format!("expected {}, got {}", describe(&kind), describe(&t.kind)),
                t.line,
                t.col,
            ))
        }
    }
}

fn describe(kind: &TokenKind) -> String {
    match kind {
        TokenKind::Letter(c) => format!("'{c}'"),
        TokenKind::RaiseOctave => "'*'".to_string(),
        TokenKind::LowerOctave => "'/'".to_string(),
        TokenKind::Karve => "','".to_string(),
        TokenKind::LParen => "'('".to_string(),
        TokenKind::RParen => "')'".to_string(),
        TokenKind::LAngle => "'<'".to_string(),
        TokenKind::RAngle => "'>'".to_string(),
        TokenKind::Speedup => "'+'".to_string(),
        TokenKind::Slowdown => "'-'".to_string(),
        TokenKind::LBracket => "'['".to_string(),
        TokenKind::RBracket => "']'".to_string(),
        TokenKind::Colon => "':'".to_string(),
        TokenKind::Beat => "'beat'".to_string(),
        TokenKind::Chord => "'chord'".to_string(),
        TokenKind::Stop => "'stop'".to_string(),
        TokenKind::Ident(name) => format!("name '{name}'"),
        TokenKind::Slots(_) => "beat slots".to_string(),
        TokenKind::Integer(v) => format!("number {v}"),
        TokenKind::Eof => "end of input".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsl::error::ErrorKind;
    use crate::dsl::lexer::Lexer;

    fn parse(src: &str) -> Result<Document, CompileError> {
        let mut lexer = Lexer::new(src);
        let tokens = lexer.tokenize()?;
        let mut parser = Parser::new(tokens);
        parser.parse()
    }

    fn only_note(doc: &Document) -> &NoteNode {
        match &doc.nodes[..] {
            [Node::Note(n)] => n,
            other => panic!("expected a single note, got {other:?}"),
        }
    }

    #[test]
    fn parse_empty_document() {
        assert!(parse("").unwrap().nodes.is_empty());
        assert!(parse(" | \n ").unwrap().nodes.is_empty());
    }

    #[test]
    fn parse_plain_swaras() {
        let doc = parse("S R G M").unwrap();
        assert_eq!(doc.nodes.len(), 4);
    }

    #[test]
    fn parse_marks_in_any_order() {
        let doc = parse("P,*,/*").unwrap();
        let note = only_note(&doc);
        assert_eq!(note.swara, Swara::Pa);
        assert_eq!(note.raise, 2);
        assert_eq!(note.lower, 1);
        assert_eq!(note.karve, 2);
    }

    #[test]
    fn parse_nested_groups() {
        let doc = parse("(S <R G M> P)").unwrap();
        let Node::Group(outer) = &doc.nodes[0] else {
            panic!("expected group");
        };
        assert_eq!(outer.kind, GroupKind::Round);
        assert_eq!(outer.children.len(), 3);
        let Node::Group(inner) = &outer.children[1] else {
            panic!("expected inner group");
        };
        assert_eq!(inner.kind, GroupKind::Angle);
        assert_eq!(inner.children.len(), 3);
    }

    #[test]
    fn parse_speed_markers() {
        let doc = parse("+ S - S").unwrap();
        assert!(matches!(doc.nodes[0], Node::Speedup(_)));
        assert!(matches!(doc.nodes[2], Node::Slowdown(_)));
    }

    #[test]
    fn parse_beat_definition_default_pitch() {
        let doc = parse("[beat:adi:X...X...]").unwrap();
        let Node::BeatDefinition(beat) = &doc.nodes[0] else {
            panic!("expected beat");
        };
        assert_eq!(beat.name, "adi");
        assert_eq!(beat.slots.len(), 8);
        assert_eq!(beat.slots[0], Slot::Active);
        assert_eq!(beat.slots[1], Slot::Inactive);
        assert_eq!(beat.pitch, None);
    }

    #[test]
    fn parse_beat_definition_explicit_pitch() {
        let doc = parse("[beat:snare:.X:38]").unwrap();
        let Node::BeatDefinition(beat) = &doc.nodes[0] else {
            panic!("expected beat");
        };
        assert_eq!(beat.pitch, Some(38));
    }

    #[test]
    fn percussion_pitch_out_of_range() {
        let err = parse("[beat:a:X:200]").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Range);
    }

    #[test]
    fn parse_chord_subtree() {
        let doc = parse("[chord:tonic:S G (P S*)] R").unwrap();
        assert_eq!(doc.nodes.len(), 2);
        let Node::ChordDefinition(chord) = &doc.nodes[0] else {
            panic!("expected chord");
        };
        assert_eq!(chord.name, "tonic");
        assert_eq!(chord.notes.len(), 3);
        assert!(matches!(doc.nodes[1], Node::Note(_)));
    }

    #[test]
    fn empty_chord_is_rejected() {
        let err = parse("[chord:c:]").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Syntax);
    }

    #[test]
    fn speed_marker_in_chord_is_rejected() {
        let err = parse("[chord:c:S+G]").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Syntax);
    }

    #[test]
    fn speed_marker_in_group_inside_chord_is_rejected() {
        let err = parse("[chord:c:(+S)] S").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Syntax);
        assert_eq!((err.line, err.col), (1, 11));
        let err = parse("[chord:c:S <(R -G)>]").unwrap_err();
        assert_eq!((err.line, err.col), (1, 16));
        assert!(parse("(+S) [chord:c:(S)] -S").is_ok());
    }

    #[test]
    fn parse_stop() {
        let doc = parse("[stop:adi]").unwrap();
        let Node::Stop(stop) = &doc.nodes[0] else {
            panic!("expected stop");
        };
        assert_eq!(stop.name, "adi");
        assert_eq!(stop.pos, Position { line: 1, col: 1 });
    }

    #[test]
    fn unknown_swara_is_unknown_token() {
        let err = parse("S R x").unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnknownToken);
        assert_eq!((err.line, err.col), (1, 5));
    }

    #[test]
    fn dangling_mark_is_syntax_error() {
        let err = parse("*S").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Syntax);
        assert_eq!((err.line, err.col), (1, 1));
    }

    #[test]
    fn unbalanced_groups() {
        assert!(parse("(S R").is_err());
        assert!(parse("S R)").is_err());
        assert!(parse("(S R>").is_err());
        assert!(parse("<S R)").is_err());
    }

    #[test]
    fn directive_inside_group_is_rejected() {
        let err = parse("(S [stop:a])").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Syntax);
    }

    #[test]
    fn multi_line_document() {
        let src = "[beat:adi:X.X.]\nS R G M | P D N S*\n[stop:adi]\nS*,,";
        let doc = parse(src).unwrap();
        assert_eq!(doc.nodes.len(), 11);
        let Node::Note(last) = doc.nodes.last().unwrap() else {
            panic!("expected note");
        };
        assert_eq!(last.pos, Position { line: 4, col: 1 });
    }
}
