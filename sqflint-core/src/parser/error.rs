use std::fmt;

use crate::types::Position;

pub type Result<T> = std::result::Result<T, ParseError>;

/// Failure to parse a script. Parsing stops at the first one.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    position: Position,
    kind: ParseErrorKind,
}

impl ParseError {
    pub fn new(position: Position, kind: ParseErrorKind) -> Self {
        Self { position, kind }
    }

    pub fn syntax(position: Position, message: &str) -> Self {
        Self::new(position, ParseErrorKind::Syntax(message.to_string()))
    }

    pub fn parenthesis(position: Position, message: &str) -> Self {
        Self::new(position, ParseErrorKind::Parenthesis(message.to_string()))
    }

    pub fn parser(position: Position, message: &str) -> Self {
        Self::new(position, ParseErrorKind::Parser(message.to_string()))
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn kind(&self) -> &ParseErrorKind {
        &self.kind
    }

    /// Message without position information.
    pub fn message(&self) -> &str {
        match &self.kind {
            ParseErrorKind::Syntax(msg)
            | ParseErrorKind::Parenthesis(msg)
            | ParseErrorKind::Parser(msg) => msg,
        }
    }
}

impl std::error::Error for ParseError {}

#[derive(Debug, Clone, PartialEq)]
pub enum ParseErrorKind {
    /// Malformed lexical element, e.g. an unterminated string.
    Syntax(String),
    /// Unbalanced brackets.
    Parenthesis(String),
    /// Malformed structure, e.g. an empty array element.
    Parser(String),
}

impl fmt::Display for ParseError {
    fn fmt(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        match self.kind {
            ParseErrorKind::Syntax(ref msg) => fmt_err_msg(formatter, &self.position, "syntax", msg),
            ParseErrorKind::Parenthesis(ref msg) => {
                fmt_err_msg(formatter, &self.position, "parenthesis", msg)
            }
            ParseErrorKind::Parser(ref msg) => fmt_err_msg(formatter, &self.position, "parser", msg),
        }
    }
}

fn fmt_err_msg(
    formatter: &mut fmt::Formatter,
    position: &Position,
    kind: &str,
    message: &str,
) -> fmt::Result {
    write!(
        formatter,
        "line: {}, column: {} - {} error: {}",
        position.line, position.column, kind, message
    )
}
