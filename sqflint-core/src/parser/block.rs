//! Groups classified tokens into statements, code blocks and arrays.
//!
//! Nesting is tracked with an explicit stack of frames, one per open
//! bracket or preprocessor directive. The trees built here are walked
//! recursively afterwards (rendering, placement, analysis), so their depth
//! is capped at [`MAX_NESTING`] levels, counting brackets, directives and
//! operators alike.

use std::mem;

use crate::types::{Array, Code, Ending, Position, Statement, Token, Trivia, Value};

use super::classify::{Bracket, Item};
use super::error::{ParseError, Result};
use super::precedence::{parse_expression, Priorities, TOO_DEEP};

/// Deepest nesting accepted in a script.
pub const MAX_NESTING: usize = 128;

#[derive(Debug, Clone, Copy, PartialEq)]
enum FrameKind {
    Root,
    Bracket(Bracket),
    /// Preprocessor directive, running until the end of its line.
    Preprocessor,
}

#[derive(Debug)]
struct Frame {
    kind: FrameKind,
    open: Position,
    /// Finished statements, or finished elements inside square brackets.
    statements: Vec<Token>,
    /// Tokens of the statement being accumulated.
    pending: Vec<Token>,
    comma_seen: bool,
    /// Deepest of the finished statements.
    depth: usize,
    /// Deepest of the pending tokens.
    pending_depth: usize,
}

impl Frame {
    fn new(kind: FrameKind, open: Position) -> Self {
        Self {
            kind,
            open,
            statements: Vec::new(),
            pending: Vec::new(),
            comma_seen: false,
            depth: 0,
            pending_depth: 0,
        }
    }

    /// Takes the pending tokens as one statement.
    fn finish(&mut self, ending: Option<Ending>, priorities: &Priorities) -> Result<Token> {
        let pending = mem::take(&mut self.pending);
        let (statement, depth) = analyze(pending, ending, priorities, self.pending_depth)?;
        self.pending_depth = 0;
        self.depth = self.depth.max(depth);
        Ok(statement)
    }

    /// Turns the pending tokens into a statement without ending.
    fn flush(&mut self, priorities: &Priorities) -> Result<()> {
        if !self.pending.is_empty() {
            let statement = self.finish(None, priorities)?;
            self.statements.push(statement);
        }
        Ok(())
    }

    /// Accepts a closed bracket nested `depth` levels deep.
    fn push_nested(&mut self, token: Token, depth: usize) {
        self.pending_depth = self.pending_depth.max(depth);
        self.pending.push(token);
    }

    /// Accepts a finished preprocessor statement.
    fn push_directive(&mut self, directive: Token, depth: usize) {
        match self.kind {
            // inside arrays the directive is part of the current element
            FrameKind::Bracket(Bracket::Square) => self.push_nested(directive, depth),
            _ => {
                self.depth = self.depth.max(depth);
                self.statements.push(directive);
            }
        }
    }
}

/// Parses the classified tokens of a whole file into its statements.
pub fn parse_block(items: Vec<Item>, priorities: &Priorities) -> Result<Vec<Token>> {
    let mut stack = vec![Frame::new(FrameKind::Root, Position::start())];

    for item in items {
        match item {
            Item::Token(token) => {
                let frame = top(&mut stack)?;
                if frame.kind == FrameKind::Preprocessor {
                    let ends = ends_directive(&token);
                    frame.pending.push(token);
                    if ends {
                        close_directive(&mut stack)?;
                    }
                } else if let Value::Preprocessor(_) = token.value {
                    if frame.kind != FrameKind::Bracket(Bracket::Square) {
                        frame.flush(priorities)?;
                    }
                    check_nesting(&stack, token.position)?;
                    let mut directive = Frame::new(FrameKind::Preprocessor, token.position);
                    directive.pending.push(token);
                    stack.push(directive);
                } else {
                    frame.pending.push(token);
                }
            }
            Item::Open(bracket, position) => {
                check_nesting(&stack, position)?;
                stack.push(Frame::new(FrameKind::Bracket(bracket), position));
            }
            Item::Close(bracket, position) => {
                while top(&mut stack)?.kind == FrameKind::Preprocessor {
                    close_directive(&mut stack)?;
                }
                if top(&mut stack)?.kind != FrameKind::Bracket(bracket) {
                    return Err(ParseError::parenthesis(
                        position,
                        "Trying to close parenthesis without them opened.",
                    ));
                }
                let frame = pop(&mut stack)?;
                let (token, depth) = close_bracket(frame, bracket, position, priorities)?;
                top(&mut stack)?.push_nested(token, depth);
            }
            Item::Separator(ending, position) => {
                let frame = top(&mut stack)?;
                match frame.kind {
                    FrameKind::Preprocessor => frame.pending.push(Token::new(
                        Value::Trivia(Trivia::Delimiter(ending.as_char())),
                        position,
                    )),
                    FrameKind::Bracket(Bracket::Square) => match ending {
                        Ending::Comma => {
                            if !has_base_tokens(&frame.pending) {
                                return Err(ParseError::parser(
                                    position,
                                    "Array cannot have an empty element",
                                ));
                            }
                            let element = frame.finish(None, priorities)?;
                            frame.statements.push(element);
                            frame.comma_seen = true;
                        }
                        Ending::Semicolon => {
                            let statement = frame.finish(Some(ending), priorities)?;
                            return Err(ParseError::parser(
                                position,
                                &format!("A statement {} cannot be in an array", statement),
                            ));
                        }
                    },
                    _ => {
                        let statement = frame.finish(Some(ending), priorities)?;
                        frame.statements.push(statement);
                    }
                }
            }
        }
    }

    while top(&mut stack)?.kind == FrameKind::Preprocessor {
        close_directive(&mut stack)?;
    }
    if stack.len() > 1 {
        let frame = pop(&mut stack)?;
        let open = match frame.kind {
            FrameKind::Bracket(bracket) => bracket.open(),
            _ => '#',
        };
        return Err(ParseError::parenthesis(
            frame.open,
            &format!("Parenthesis \"{}\" not closed", open),
        ));
    }
    let mut root = pop(&mut stack)?;
    root.flush(priorities)?;
    trace!("parsed {} top level statements", root.statements.len());
    Ok(root.statements)
}

fn top(stack: &mut Vec<Frame>) -> Result<&mut Frame> {
    stack
        .last_mut()
        .ok_or_else(|| ParseError::parser(Position::start(), "parser stack is empty"))
}

fn pop(stack: &mut Vec<Frame>) -> Result<Frame> {
    stack
        .pop()
        .ok_or_else(|| ParseError::parser(Position::start(), "parser stack is empty"))
}

/// Line ends and line comments terminate a directive. Continued lines do
/// not.
fn ends_directive(token: &Token) -> bool {
    match &token.value {
        Value::Trivia(Trivia::EndOfLine(_)) => true,
        Value::Trivia(Trivia::Comment(text)) => text.starts_with("//"),
        _ => false,
    }
}

/// Frames already open are as deep as a new one may go.
fn check_nesting(stack: &[Frame], position: Position) -> Result<()> {
    // the root frame is not a nesting level
    if stack.len() > MAX_NESTING {
        return Err(ParseError::parser(position, TOO_DEEP));
    }
    Ok(())
}

/// Directive statements are kept flat.
fn close_directive(stack: &mut Vec<Frame>) -> Result<()> {
    let frame = pop(stack)?;
    let depth = frame.pending_depth + 1;
    let statement = Statement::new(frame.pending);
    top(stack)?.push_directive(Token::new(Value::Statement(statement), frame.open), depth);
    Ok(())
}

fn close_bracket(
    mut frame: Frame,
    bracket: Bracket,
    position: Position,
    priorities: &Priorities,
) -> Result<(Token, usize)> {
    let value = match bracket {
        Bracket::Parenthesis => {
            frame.flush(priorities)?;
            Value::Statement(Statement::parenthesized(frame.statements))
        }
        Bracket::Brace => {
            frame.flush(priorities)?;
            Value::Code(Code::new(frame.statements))
        }
        Bracket::Square => {
            if frame.comma_seen && !has_base_tokens(&frame.pending) {
                return Err(ParseError::parser(
                    position,
                    "Array cannot have an empty element",
                ));
            }
            frame.flush(priorities)?;
            Value::Array(Array::new(frame.statements))
        }
    };
    let depth = frame.depth + 1;
    if depth > MAX_NESTING {
        return Err(ParseError::parser(frame.open, TOO_DEEP));
    }
    Ok((Token::new(value, frame.open), depth))
}

fn has_base_tokens(tokens: &[Token]) -> bool {
    tokens.iter().any(|t| t.is_base())
}

/// Nests the tokens of one statement by operator precedence. `inner` is
/// the depth of the deepest bracket among `tokens`.
fn analyze(
    tokens: Vec<Token>,
    ending: Option<Ending>,
    priorities: &Priorities,
    inner: usize,
) -> Result<(Token, usize)> {
    let position = tokens.first().map(|t| t.position).unwrap_or_default();
    let limit = MAX_NESTING.saturating_sub(inner);
    let (statement, depth) = match parse_expression(tokens, priorities, limit)? {
        Some((
            Token {
                value: Value::Statement(statement),
                ..
            },
            depth,
        )) if !statement.is_parenthesized() => (statement, depth),
        Some((token, depth)) => (Statement::new(vec![token]), depth),
        None => (Statement::default(), 0),
    };
    let token = Token::new(Value::Statement(statement.with_ending(ending)), position);
    Ok((token, inner + depth))
}
