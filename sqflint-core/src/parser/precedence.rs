//! Operator precedence.
//!
//! A flat statement is split at the operator of the lowest precedence tier
//! present in it, and both sides are split again recursively. Tiers are
//! tried from the loosest binding to the tightest.

use fnv::FnvHashSet;

use crate::types::{Statement, Token, Value};

use super::error::{ParseError, Result};

/// Message of the error raised when input nests too deeply.
pub(crate) const TOO_DEEP: &str = "Nesting too deep";

/// Where a tier splits when an operator of it occurs more than once.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Associativity {
    /// Split at the first occurrence: `a = b = c` is `a = (b = c)`.
    Right,
    /// Split at the last occurrence: `a - b - c` is `(a - b) - c`.
    Left,
}

#[derive(Debug, Clone)]
pub struct Tier {
    operators: FnvHashSet<String>,
    associativity: Associativity,
    /// Only count occurrences that follow an operand, so that unary uses
    /// of binary operators (e.g. `-` in `a * -b`) are left to later tiers.
    binary: bool,
}

impl Tier {
    fn new<'a>(
        operators: impl IntoIterator<Item = &'a str>,
        associativity: Associativity,
        binary: bool,
    ) -> Self {
        Self {
            operators: operators.into_iter().map(|o| o.to_lowercase()).collect(),
            associativity,
            binary,
        }
    }

    pub fn contains(&self, operator: &str) -> bool {
        self.operators.contains(operator)
    }
}

static ASSIGNMENT: &[&str] = &["="];
static PRIVATE: &[&str] = &["private"];
static OR: &[&str] = &["||", "or"];
static AND: &[&str] = &["&&", "and"];
static COMPARISON: &[&str] = &["==", "!=", "<", ">", "<=", ">="];
static DO: &[&str] = &["do"];
static THEN: &[&str] = &["then", "catch", "exitwith", "throw", ":"];
static STEP: &[&str] = &["step", "else"];
static TO: &[&str] = &["to"];
static FROM: &[&str] = &["from"];
static CONTROL: &[&str] = &["if", "try", "case", "while", "switch", "for"];
static ADDITION: &[&str] = &["+", "-", "min", "max"];
static MULTIPLICATION: &[&str] = &["*", "/", "%", "mod", "atan2"];
static POWER: &[&str] = &["^", ">>"];

/// Ordered precedence tiers, loosest first.
#[derive(Debug, Clone)]
pub struct Priorities {
    tiers: Vec<Tier>,
    nullary: FnvHashSet<String>,
}

impl Priorities {
    /// Builds the tiers given the names of all binary, unary and nullary
    /// operators. Binary operators without a dedicated tier share one
    /// between the control keywords and arithmetic.
    pub fn new<'a>(
        binary: impl IntoIterator<Item = &'a str>,
        unary: impl IntoIterator<Item = &'a str>,
        nullary: impl IntoIterator<Item = &'a str>,
    ) -> Self {
        let fixed: Vec<&[&str]> = vec![
            ASSIGNMENT,
            PRIVATE,
            OR,
            AND,
            COMPARISON,
            DO,
            THEN,
            STEP,
            TO,
            FROM,
            CONTROL,
            ADDITION,
            MULTIPLICATION,
            POWER,
        ];
        let placed: FnvHashSet<String> = fixed
            .iter()
            .flat_map(|tier| tier.iter())
            .map(|o| o.to_string())
            .collect();
        let other_binary: Vec<String> = binary
            .into_iter()
            .map(|o| o.to_lowercase())
            .filter(|o| !placed.contains(o))
            .collect();
        let unary: Vec<String> = unary.into_iter().map(|o| o.to_lowercase()).collect();

        let tiers = vec![
            Tier::new(ASSIGNMENT.iter().copied(), Associativity::Right, false),
            Tier::new(PRIVATE.iter().copied(), Associativity::Right, false),
            Tier::new(OR.iter().copied(), Associativity::Left, true),
            Tier::new(AND.iter().copied(), Associativity::Left, true),
            Tier::new(COMPARISON.iter().copied(), Associativity::Left, true),
            Tier::new(DO.iter().copied(), Associativity::Left, true),
            Tier::new(THEN.iter().copied(), Associativity::Left, true),
            Tier::new(STEP.iter().copied(), Associativity::Left, true),
            Tier::new(TO.iter().copied(), Associativity::Left, true),
            Tier::new(FROM.iter().copied(), Associativity::Left, true),
            Tier::new(CONTROL.iter().copied(), Associativity::Right, false),
            Tier::new(other_binary.iter().map(|o| o.as_str()), Associativity::Left, true),
            Tier::new(ADDITION.iter().copied(), Associativity::Left, true),
            Tier::new(MULTIPLICATION.iter().copied(), Associativity::Left, true),
            Tier::new(POWER.iter().copied(), Associativity::Left, true),
            Tier::new(unary.iter().map(|o| o.as_str()), Associativity::Right, false),
        ];
        let nullary: FnvHashSet<String> = nullary.into_iter().map(|o| o.to_lowercase()).collect();
        let mut priorities = Self { tiers, nullary };
        let nullary_tier = Tier {
            operators: priorities.nullary.clone(),
            associativity: Associativity::Right,
            binary: false,
        };
        priorities.tiers.push(nullary_tier);
        priorities
    }

    pub fn tiers(&self) -> &[Tier] {
        &self.tiers
    }

    /// Index of the operator to split `tokens` at, if any.
    fn split_index(&self, tokens: &[Token], lowered: &[Option<String>]) -> Option<usize> {
        for tier in &self.tiers {
            let mut candidates = (0..tokens.len()).filter(|&i| {
                let in_tier = match &lowered[i] {
                    Some(keyword) => tier.contains(keyword),
                    None => false,
                };
                in_tier && (!tier.binary || self.follows_operand(tokens, lowered, i))
            });
            let found = match tier.associativity {
                Associativity::Right => candidates.next(),
                Associativity::Left => candidates.last(),
            };
            if found.is_some() {
                return found;
            }
        }
        None
    }

    /// Whether the closest non-trivia token before `index` is an operand.
    fn follows_operand(&self, tokens: &[Token], lowered: &[Option<String>], index: usize) -> bool {
        for i in (0..index).rev() {
            if tokens[i].value.is_trivia() {
                continue;
            }
            return match &lowered[i] {
                Some(keyword) => self.nullary.contains(keyword),
                None => true,
            };
        }
        false
    }
}

/// Nests a flat list of tokens into a tree of statements according to
/// `priorities`, along with the number of operator levels of the tree.
/// Returns a single token when there is nothing to nest, and nothing when
/// `tokens` is empty. Fails when nesting would take more than `limit`
/// levels.
pub fn parse_expression(
    tokens: Vec<Token>,
    priorities: &Priorities,
    limit: usize,
) -> Result<Option<(Token, usize)>> {
    if tokens.is_empty() {
        return Ok(None);
    }
    if tokens.len() > 1 {
        let lowered: Vec<Option<String>> = tokens
            .iter()
            .map(|t| t.value.as_keyword().map(|k| k.to_lowercase()))
            .collect();
        if let Some(index) = priorities.split_index(&tokens, &lowered) {
            let mut left = tokens;
            let right = left.split_off(index + 1);
            let operator = match left.pop() {
                Some(operator) => operator,
                None => return Ok(None),
            };
            if limit == 0 {
                return Err(ParseError::parser(operator.position, TOO_DEEP));
            }
            let left = parse_expression(left, priorities, limit - 1)?;
            let right = parse_expression(right, priorities, limit - 1)?;
            let mut depth = 0;
            let mut parts = Vec::with_capacity(3);
            if let Some((token, levels)) = left {
                depth = depth.max(levels);
                parts.push(token);
            }
            parts.push(operator);
            if let Some((token, levels)) = right {
                depth = depth.max(levels);
                parts.push(token);
            }
            return Ok(Some(wrap(parts, depth)));
        }
    }
    Ok(Some(wrap(tokens, 0)))
}

fn wrap(mut tokens: Vec<Token>, depth: usize) -> (Token, usize) {
    if tokens.len() == 1 {
        if let Some(token) = tokens.pop() {
            return (token, depth);
        }
    }
    (Token::from(Value::Statement(Statement::new(tokens))), depth + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn priorities() -> Priorities {
        Priorities::new(
            vec!["select", "foreach", "+", "-", "*", "then", "else", "==", "do"],
            vec!["-", "!", "hint", "str", "if", "private"],
            vec!["player"],
        )
    }

    fn tokens(source: &[&str]) -> Vec<Token> {
        let keywords = [
            "=", "select", "+", "-", "*", "!", "hint", "str", "if", "then", "else", "==", "private",
            "player",
        ];
        source
            .iter()
            .map(|s| {
                if keywords.contains(s) {
                    Token::from(Value::keyword(s))
                } else if *s == " " {
                    Token::from(Value::Trivia(crate::types::Trivia::Space))
                } else {
                    Token::from(Value::Variable(s.to_string()))
                }
            })
            .collect()
    }

    fn tree(source: &[&str]) -> String {
        fn show(token: &Token) -> String {
            match &token.value {
                Value::Statement(s) => format!(
                    "({})",
                    s.base_tokens().iter().map(|t| show(t)).collect::<Vec<_>>().join(" ")
                ),
                other => other.to_string(),
            }
        }
        let (token, _) = parse_expression(tokens(source), &priorities(), 64)
            .unwrap()
            .unwrap();
        show(&token)
    }

    #[test]
    fn chained_assignment_is_right_associative() {
        assert_eq!(
            "(a = (b = (e + (c * d))))",
            tree(&["a", "=", "b", "=", "e", "+", "c", "*", "d"])
        );
    }

    #[test]
    fn arithmetic_is_left_associative() {
        assert_eq!("((a - b) - c)", tree(&["a", "-", "b", "-", "c"]));
        assert_eq!("((a + b) - c)", tree(&["a", "+", "b", "-", "c"]));
    }

    #[test]
    fn unary_minus() {
        assert_eq!("(a * (- b))", tree(&["a", "*", "-", "b"]));
        assert_eq!("(- b)", tree(&["-", "b"]));
        assert_eq!("(player + b)", tree(&["player", "+", "b"]));
    }

    #[test]
    fn unary_keywords_nest_to_the_right() {
        assert_eq!("(hint (str x))", tree(&["hint", "str", "x"]));
        assert_eq!("((! a) == b)", tree(&["!", "a", "==", "b"]));
        assert_eq!("((private _x) = 1)", tree(&["private", "_x", "=", "1"]));
    }

    #[test]
    fn control_keywords() {
        assert_eq!(
            "((if c) then (x else y))",
            tree(&["if", "c", "then", "x", "else", "y"])
        );
    }

    #[test]
    fn keeps_trivia() {
        let (token, depth) = parse_expression(tokens(&["a", " ", "+", " ", "b"]), &priorities(), 64)
            .unwrap()
            .unwrap();
        assert_eq!("a + b", token.to_string());
        assert_eq!(2, depth);
        let (single, _) = parse_expression(tokens(&[" ", "a"]), &priorities(), 64)
            .unwrap()
            .unwrap();
        assert_eq!(" a", single.to_string());
        assert!(parse_expression(vec![], &priorities(), 64).unwrap().is_none());
    }

    #[test]
    fn long_chains_are_bounded() {
        let mut source = vec!["a"];
        for _ in 0..10 {
            source.extend_from_slice(&["+", "b"]);
        }
        assert!(parse_expression(tokens(&source), &priorities(), 10).is_ok());
        let err = parse_expression(tokens(&source), &priorities(), 9).unwrap_err();
        assert_eq!(TOO_DEEP, err.message());
    }
}
