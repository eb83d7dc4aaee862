//! Merges the raw pieces making up string literals and comments.

use std::borrow::Cow;

use crate::types::Position;

use super::error::{ParseError, Result};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LexemeKind {
    Piece,
    String,
    Comment,
}

/// Piece of source text with its starting position.
#[derive(Debug, Clone, PartialEq)]
pub struct Lexeme<'a> {
    pub kind: LexemeKind,
    pub text: Cow<'a, str>,
    pub position: Position,
}

#[derive(Clone, Copy, PartialEq)]
enum Mode {
    Code,
    String(&'static str),
    LineComment,
    BlockComment,
}

/// Folds quoted strings and comments into single lexemes.
///
/// Inside a string, a quote immediately followed by another quote of the
/// same kind is an escaped quote. Comments left open at the end of input
/// are accepted, strings are not.
pub fn coalesce<'a>(pieces: &[&'a str]) -> Result<Vec<Lexeme<'a>>> {
    let mut lexemes = Vec::with_capacity(pieces.len());
    let mut mode = Mode::Code;
    let mut buffer = String::new();
    let mut start = Position::start();
    let mut cursor = Position::start();
    let mut escaped = false;

    for (i, piece) in pieces.iter().enumerate() {
        let position = cursor;
        cursor = cursor.advance(piece);
        match mode {
            Mode::String(quote) => {
                buffer.push_str(piece);
                if *piece == quote {
                    if escaped {
                        escaped = false;
                    } else if pieces.get(i + 1) == Some(&quote) {
                        escaped = true;
                    } else {
                        lexemes.push(merged(LexemeKind::String, &mut buffer, start));
                        mode = Mode::Code;
                    }
                }
            }
            Mode::BlockComment => {
                buffer.push_str(piece);
                if *piece == "*/" {
                    lexemes.push(merged(LexemeKind::Comment, &mut buffer, start));
                    mode = Mode::Code;
                }
            }
            Mode::LineComment => {
                buffer.push_str(piece);
                if *piece == "\n" || *piece == "\r\n" {
                    lexemes.push(merged(LexemeKind::Comment, &mut buffer, start));
                    mode = Mode::Code;
                }
            }
            Mode::Code => {
                mode = match *piece {
                    "\"" => Mode::String("\""),
                    "'" => Mode::String("'"),
                    "/*" => Mode::BlockComment,
                    "//" => Mode::LineComment,
                    _ => {
                        lexemes.push(Lexeme {
                            kind: LexemeKind::Piece,
                            text: Cow::Borrowed(*piece),
                            position,
                        });
                        continue;
                    }
                };
                buffer.push_str(piece);
                start = position;
            }
        }
    }

    match mode {
        Mode::Code => Ok(lexemes),
        Mode::LineComment | Mode::BlockComment => {
            lexemes.push(merged(LexemeKind::Comment, &mut buffer, start));
            Ok(lexemes)
        }
        Mode::String(_) => Err(ParseError::syntax(start, "String is not closed")),
    }
}

fn merged<'a>(kind: LexemeKind, buffer: &mut String, position: Position) -> Lexeme<'a> {
    Lexeme {
        kind,
        text: Cow::Owned(std::mem::take(buffer)),
        position,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::lexer::tokenize;

    fn texts(source: &str) -> Vec<(LexemeKind, String)> {
        coalesce(&tokenize(source))
            .unwrap()
            .into_iter()
            .map(|l| (l.kind, l.text.into_owned()))
            .collect()
    }

    #[test]
    fn merges_strings() {
        assert_eq!(
            vec![
                (LexemeKind::Piece, "a".to_string()),
                (LexemeKind::Piece, "=".to_string()),
                (LexemeKind::String, "\"b c\"".to_string())
            ],
            texts("a=\"b c\"")
        );
    }

    #[test]
    fn doubled_quotes_are_escapes() {
        assert_eq!(
            vec![(LexemeKind::String, "\"a\"\"b\"".to_string())],
            texts("\"a\"\"b\"")
        );
        assert_eq!(
            vec![(LexemeKind::String, "''''".to_string())],
            texts("''''")
        );
        assert_eq!(
            vec![(LexemeKind::String, "'a\"b'".to_string())],
            texts("'a\"b'")
        );
    }

    #[test]
    fn comments_keep_their_line_end() {
        assert_eq!(
            vec![
                (LexemeKind::Comment, "// a\n".to_string()),
                (LexemeKind::Piece, "b".to_string()),
                (LexemeKind::Comment, "/* c */".to_string()),
                (LexemeKind::Comment, "//d".to_string()),
            ],
            texts("// a\nb/* c *///d")
        );
    }

    #[test]
    fn unclosed_string_fails_at_its_start() {
        let err = coalesce(&tokenize("a = \n 'bc")).unwrap_err();
        assert_eq!(Position::new(2, 2), err.position());
        assert_eq!("String is not closed", err.message());
    }

    #[test]
    fn positions() {
        let lexemes = coalesce(&tokenize("a\n  \"b\" c")).unwrap();
        let last = lexemes.last().unwrap();
        assert_eq!("c", last.text);
        assert_eq!(Position::new(2, 7), last.position);
    }
}
