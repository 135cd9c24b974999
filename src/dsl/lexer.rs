//! Lexer for the notation.
//!
//! Whitespace and bar separators (`|`) are insignificant and removed before
//! lexing, but every remaining character remembers its original line and
//! column so errors still point into the source.

use super::error::CompileError;
use super::token::{SlotToken, Token, TokenKind};

/// Characters dropped from the source before lexing.
pub fn is_separator(ch: char) -> bool {
    ch.is_whitespace() || ch == '|'
}

#[derive(Debug, Clone, Copy)]
struct SourceChar {
    ch: char,
    line: usize,
    col: usize,
}

pub struct Lexer {
    chars: Vec<SourceChar>,
    pos: usize,
    /// Where the currently open chord directive started, if any.
    open_chord: Option<(usize, usize)>,
    end: (usize, usize),
}

impl Lexer {
    pub fn new(source: &str) -> Self {
        let mut chars = Vec::new();
        let mut line = 1;
        let mut col = 1;
        for ch in source.chars() {
            if ch == '\n' {
                line += 1;
                col = 1;
                continue;
            }
            if !is_separator(ch) {
                chars.push(SourceChar { ch, line, col });
            }
            col += 1;
        }
        Self {
            chars,
            pos: 0,
            open_chord: None,
            end: (line, col),
        }
    }

    pub fn tokenize(&mut self) -> Result<Vec<Token>, CompileError> {
        let mut tokens = Vec::new();

        while let Some(c) = self.peek() {
            let kind = match c.ch {
                '*' => TokenKind::RaiseOctave,
                '/' => TokenKind::LowerOctave,
                ',' => TokenKind::Karve,
                '(' => TokenKind::LParen,
                ')' => TokenKind::RParen,
                '<' => TokenKind::LAngle,
                '>' => TokenKind::RAngle,
                '+' => TokenKind::Speedup,
                '-' => TokenKind::Slowdown,
                '[' => {
                    if self.open_chord.is_some() {
                        return Err(CompileError::syntax(
                            "directives cannot appear inside a chord",
                            c.line,
                            c.col,
                        ));
                    }
                    self.lex_directive(&mut tokens)?;
                    continue;
                }
                ']' => {
                    if self.open_chord.take().is_none() {
                        return Err(CompileError::syntax("unexpected ']'", c.line, c.col));
                    }
                    TokenKind::RBracket
                }
                ch if ch.is_ascii_alphabetic() => TokenKind::Letter(ch),
                other => {
                    return Err(CompileError::syntax(
                        format!("unexpected character: '{other}'"),
                        c.line,
                        c.col,
                    ));
                }
            };
            tokens.push(Token {
                kind,
                line: c.line,
                col: c.col,
            });
            self.pos += 1;
        }

        if let Some((line, col)) = self.open_chord {
            return Err(CompileError::syntax("unclosed chord directive", line, col));
        }

        tokens.push(Token {
            kind: TokenKind::Eof,
            line: self.end.0,
            col: self.end.1,
        });
        Ok(tokens)
    }

    fn peek(&self) -> Option<SourceChar> {
        self.chars.get(self.pos).copied()
    }

    /// Position of the next character, or end of input.
    fn here(&self) -> (usize, usize) {
        self.peek().map(|c| (c.line, c.col)).unwrap_or(self.end)
    }

    fn take_while(&mut self, pred: impl Fn(char) -> bool) -> (String, usize, usize) {
        let (line, col) = self.here();
        let mut s = String::new();
        while let Some(c) = self.peek() {
            if !pred(c.ch) {
                break;
            }
            s.push(c.ch);
            self.pos += 1;
        }
        (s, line, col)
    }

    fn expect_char(
        &mut self,
        expected: char,
        kind: TokenKind,
        tokens: &mut Vec<Token>,
    ) -> Result<(), CompileError> {
        let (line, col) = self.here();
        match self.peek() {
            Some(c) if c.ch == expected => {
                self.pos += 1;
                tokens.push(Token { kind, line, col });
                Ok(())
            }
            Some(c) => Err(CompileError::syntax(
                format!("expected '{expected}', got '{}'", c.ch),
                line,
                col,
            )),
            None => Err(CompileError::syntax(
                format!("expected '{expected}', got end of input"),
                line,
                col,
            )),
        }
    }

    /// Lex a `[keyword:name...]` directive. Beat and stop directives are lexed
    /// through their closing bracket; a chord directive leaves the lexer inside
    /// the chord body, which is lexed as ordinary notes up to `]`.
    fn lex_directive(&mut self, tokens: &mut Vec<Token>) -> Result<(), CompileError> {
        let (open_line, open_col) = self.here();
        self.expect_char('[', TokenKind::LBracket, tokens)?;

        let (word, line, col) = self.take_while(|c| c.is_ascii_alphabetic());
        let keyword = match word.as_str() {
            "beat" => TokenKind::Beat,
            "chord" => TokenKind::Chord,
            "stop" => TokenKind::Stop,
            "" => {
                return Err(CompileError::syntax("expected directive keyword", line, col));
            }
            other => {
                return Err(CompileError::syntax(
                    format!("unknown directive: '{other}'"),
                    line,
                    col,
                ));
            }
        };
        tokens.push(Token {
            kind: keyword.clone(),
            line,
            col,
        });

        self.expect_char(':', TokenKind::Colon, tokens)?;
        let (name, line, col) = self.take_while(|c| c.is_ascii_alphanumeric() || c == '_');
        if name.is_empty() {
            return Err(CompileError::syntax("expected a name", line, col));
        }
        tokens.push(Token {
            kind: TokenKind::Ident(name),
            line,
            col,
        });

        match keyword {
            TokenKind::Beat => {
                self.expect_char(':', TokenKind::Colon, tokens)?;
                self.lex_slots(tokens)?;
                if self.peek().is_some_and(|c| c.ch == ':') {
                    self.expect_char(':', TokenKind::Colon, tokens)?;
                    self.lex_integer(tokens)?;
                }
                self.expect_char(']', TokenKind::RBracket, tokens)
            }
            TokenKind::Chord => {
                self.expect_char(':', TokenKind::Colon, tokens)?;
                self.open_chord = Some((open_line, open_col));
                Ok(())
            }
            _ => self.expect_char(']', TokenKind::RBracket, tokens),
        }
    }

    fn lex_slots(&mut self, tokens: &mut Vec<Token>) -> Result<(), CompileError> {
        let (raw, line, col) = self.take_while(|c| matches!(c, 'X' | 'x' | '.'));
        if raw.is_empty() {
            return Err(CompileError::syntax(
                "expected beat slots ('X' or '.')",
                line,
                col,
            ));
        }
        let slots = raw
            .chars()
            .map(|c| {
                if c == '.' {
                    SlotToken::Rest
                } else {
                    SlotToken::Hit
                }
            })
            .collect();
        tokens.push(Token {
            kind: TokenKind::Slots(slots),
            line,
            col,
        });
        Ok(())
    }

    fn lex_integer(&mut self, tokens: &mut Vec<Token>) -> Result<(), CompileError> {
        let (digits, line, col) = self.take_while(|c| c.is_ascii_digit());
        if digits.is_empty() {
            return Err(CompileError::syntax("expected a number", line, col));
        }
        let value: u64 = digits
            .parse()
            .map_err(|_| CompileError::range(format!("number too large: {digits}"), line, col))?;
        tokens.push(Token {
            kind: TokenKind::Integer(value),
            line,
            col,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsl::error::ErrorKind;

    fn kinds(src: &str) -> Vec<TokenKind> {
        Lexer::new(src)
            .tokenize()
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn lex_empty_input() {
        assert_eq!(kinds(""), vec![TokenKind::Eof]);
    }

    #[test]
    fn lex_note_with_marks() {
        assert_eq!(
            kinds("S*,,"),
            vec![
                TokenKind::Letter('S'),
                TokenKind::RaiseOctave,
                TokenKind::Karve,
                TokenKind::Karve,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn separators_are_stripped() {
        assert_eq!(kinds("S R | G\n M"), kinds("SRGM"));
    }

    #[test]
    fn positions_refer_to_original_text() {
        let tokens = Lexer::new("S R\n  | G").tokenize().unwrap();
        assert_eq!((tokens[0].line, tokens[0].col), (1, 1));
        assert_eq!((tokens[1].line, tokens[1].col), (1, 3));
        assert_eq!((tokens[2].line, tokens[2].col), (2, 5));
    }

    #[test]
    fn lex_groups_and_speed() {
        assert_eq!(
            kinds("+(SR)<GMP>-"),
            vec![
                TokenKind::Speedup,
                TokenKind::LParen,
                TokenKind::Letter('S'),
                TokenKind::Letter('R'),
                TokenKind::RParen,
                TokenKind::LAngle,
                TokenKind::Letter('G'),
                TokenKind::Letter('M'),
                TokenKind::Letter('P'),
                TokenKind::RAngle,
                TokenKind::Slowdown,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn lex_beat_directive() {
        assert_eq!(
            kinds("[beat:adi:X.x.:38]"),
            vec![
                TokenKind::LBracket,
                TokenKind::Beat,
                TokenKind::Colon,
                TokenKind::Ident("adi".to_string()),
                TokenKind::Colon,
                TokenKind::Slots(vec![
                    SlotToken::Hit,
                    SlotToken::Rest,
                    SlotToken::Hit,
                    SlotToken::Rest
                ]),
                TokenKind::Colon,
                TokenKind::Integer(38),
                TokenKind::RBracket,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn lex_beat_directive_with_spaces() {
        assert_eq!(kinds("[ beat : adi : X . X . ]"), kinds("[beat:adi:X.X.]"));
    }

    #[test]
    fn lex_chord_body_as_notes() {
        assert_eq!(
            kinds("[chord:tonic:SGP]S"),
            vec![
                TokenKind::LBracket,
                TokenKind::Chord,
                TokenKind::Colon,
                TokenKind::Ident("tonic".to_string()),
                TokenKind::Colon,
                TokenKind::Letter('S'),
                TokenKind::Letter('G'),
                TokenKind::Letter('P'),
                TokenKind::RBracket,
                TokenKind::Letter('S'),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn lex_stop_directive() {
        assert_eq!(
            kinds("[stop:adi]"),
            vec![
                TokenKind::LBracket,
                TokenKind::Stop,
                TokenKind::Colon,
                TokenKind::Ident("adi".to_string()),
                TokenKind::RBracket,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn unknown_directive_is_syntax_error() {
        let err = Lexer::new("[loop:x]").tokenize().unwrap_err();
        assert_eq!(err.kind, ErrorKind::Syntax);
        assert_eq!((err.line, err.col), (1, 2));
    }

    #[test]
    fn unexpected_character() {
        let err = Lexer::new("SR @").tokenize().unwrap_err();
        assert_eq!(err.kind, ErrorKind::Syntax);
        assert_eq!((err.line, err.col), (1, 4));
    }

    #[test]
    fn unclosed_chord() {
        let err = Lexer::new("S [chord:c:SG").tokenize().unwrap_err();
        assert_eq!(err.kind, ErrorKind::Syntax);
        assert_eq!((err.line, err.col), (1, 3));
    }

    #[test]
    fn nested_directive_in_chord() {
        let err = Lexer::new("[chord:c:S[stop:a]]").tokenize().unwrap_err();
        assert_eq!(err.kind, ErrorKind::Syntax);
    }

    #[test]
    fn stray_closing_bracket() {
        assert!(Lexer::new("S]").tokenize().is_err());
    }

    #[test]
    fn beat_without_slots() {
        assert!(Lexer::new("[beat:a:]").tokenize().is_err());
        assert!(Lexer::new("[beat:a:X.:]").tokenize().is_err());
    }

    #[test]
    fn missing_name() {
        let err = Lexer::new("[stop:]").tokenize().unwrap_err();
        assert_eq!(err.kind, ErrorKind::Syntax);
    }

    #[test]
    fn any_letter_lexes_as_candidate_swara() {
        assert_eq!(kinds("x"), vec![TokenKind::Letter('x'), TokenKind::Eof]);
    }
}
