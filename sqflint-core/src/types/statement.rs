use std::fmt;

use super::{Position, Token, Value};

/// Delimiter terminating a statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ending {
    Semicolon,
    Comma,
}

impl Ending {
    pub fn as_char(&self) -> char {
        match self {
            Ending::Semicolon => ';',
            Ending::Comma => ',',
        }
    }
}

/// Ordered sequence of tokens, possibly wrapped in parenthesis and
/// terminated by an [`Ending`].
///
/// Statements keep every piece of source text they were parsed from,
/// trivia included, so printing one reproduces its source exactly.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Statement {
    tokens: Vec<Token>,
    parenthesis: bool,
    ending: Option<Ending>,
}

impl Statement {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            parenthesis: false,
            ending: None,
        }
    }

    pub fn parenthesized(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            parenthesis: true,
            ending: None,
        }
    }

    pub fn with_ending(mut self, ending: Option<Ending>) -> Self {
        self.ending = ending;
        self
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn is_parenthesized(&self) -> bool {
        self.parenthesis
    }

    pub fn ending(&self) -> Option<Ending> {
        self.ending
    }

    pub fn set_ending(&mut self, ending: Option<Ending>) {
        self.ending = ending;
    }

    /// Tokens taking part in evaluation: trivia and empty wrappers are
    /// left out.
    pub fn base_tokens(&self) -> Vec<&Token> {
        self.tokens.iter().filter(|t| t.is_base()).collect()
    }

    pub fn has_base_tokens(&self) -> bool {
        self.tokens.iter().any(|t| t.is_base())
    }

    /// Position of the first token, or of the statement itself when it is
    /// empty.
    pub fn position(&self) -> Option<Position> {
        self.tokens.first().map(|t| t.position)
    }

    /// Comments found directly in this statement or in any of its
    /// unparenthesized sub-statements, in source order.
    pub fn comments(&self) -> Vec<&Token> {
        let mut comments = Vec::new();
        for token in &self.tokens {
            match &token.value {
                Value::Trivia(trivia) if trivia.comment_body().is_some() => comments.push(token),
                Value::Statement(statement) if !statement.parenthesis => {
                    comments.extend(statement.comments())
                }
                _ => (),
            }
        }
        comments
    }

    pub(crate) fn place(&mut self, start: Position) -> Position {
        let mut cursor = start;
        if self.parenthesis {
            cursor = cursor.advance("(");
        }
        for token in &mut self.tokens {
            cursor = token.place(cursor);
        }
        if self.parenthesis {
            cursor = cursor.advance(")");
        }
        if self.ending.is_some() {
            cursor = cursor.advance(";");
        }
        cursor
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.parenthesis {
            write!(f, "(")?;
        }
        for token in &self.tokens {
            write!(f, "{}", token)?;
        }
        if self.parenthesis {
            write!(f, ")")?;
        }
        if let Some(ending) = self.ending {
            write!(f, "{}", ending.as_char())?;
        }
        Ok(())
    }
}
