//! Script parsing.
//!
//! Source text goes through four stages:
//!
//! 1. [`lexer`] splits it into raw pieces,
//! 2. [`coalesce`] folds strings and comments,
//! 3. [`classify`] types every piece,
//! 4. [`block`] nests the result into statements, code and arrays, using
//!    [`precedence`] to build the expression tree of each statement.
//!
//! Parsing is lossless: printing the resulting [`Code`] gives back the
//! source text.

use fnv::FnvHashSet;

use crate::database::Database;
use crate::types::{Code, Position};

pub mod block;
pub mod classify;
pub mod coalesce;
pub mod error;
pub mod lexer;
pub mod precedence;

pub use error::{ParseError, ParseErrorKind};
pub use precedence::Priorities;

/// Everything the parser needs to know about the language's operators.
#[derive(Debug, Clone)]
pub struct Grammar {
    keywords: FnvHashSet<String>,
    priorities: Priorities,
}

impl Grammar {
    /// `keywords` are expected lower-cased.
    pub fn new(keywords: FnvHashSet<String>, priorities: Priorities) -> Self {
        Self {
            keywords,
            priorities,
        }
    }

    pub fn keywords(&self) -> &FnvHashSet<String> {
        &self.keywords
    }

    pub fn is_keyword(&self, name: &str) -> bool {
        self.keywords.contains(&name.to_lowercase())
    }

    pub fn priorities(&self) -> &Priorities {
        &self.priorities
    }
}

/// Parses `source` with the grammar of the built-in database.
pub fn parse(source: &str) -> error::Result<Code> {
    parse_with(source, Database::builtin().grammar())
}

/// Parses `source` into a file-level [`Code`].
pub fn parse_with(source: &str, grammar: &Grammar) -> error::Result<Code> {
    let pieces = lexer::tokenize(source);
    let lexemes = coalesce::coalesce(&pieces)?;
    let items = classify::classify(lexemes, grammar.keywords());
    let statements = block::parse_block(items, grammar.priorities())?;
    let mut file = Code::file(statements);
    file.place(Position::start());
    Ok(file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Token, Value};

    fn first_base(code: &Code) -> Vec<Token> {
        let statement = code.statements()[0].value.as_statement().unwrap();
        statement.base_tokens().into_iter().cloned().collect()
    }

    #[test]
    fn round_trips() {
        let sources = [
            "",
            "a = 1;",
            "private _x = [1, 2,3 ]; hint str _x;\n",
            "if (_x > 2) then {\r\n\thint 'a''b'\r\n} else {/* none */};",
            "#define A(_x) (_x == 2) // check\nx = A(3);",
            "#include \"file.sqf\"\nx = 1",
            "{ _x call f } forEach [ ];;",
            "x = 1 \\\n+ 2",
        ];
        for source in sources.iter() {
            assert_eq!(*source, parse(source).unwrap().to_string());
        }
    }

    #[test]
    fn unclosed_parenthesis() {
        let err = parse("hint (_x").unwrap_err();
        assert_eq!("Parenthesis \"(\" not closed", err.message());
        assert_eq!(Position::new(1, 6), err.position());
        match err.kind() {
            ParseErrorKind::Parenthesis(_) => (),
            other => panic!("unexpected error kind {:?}", other),
        }
    }

    #[test]
    fn unopened_parenthesis() {
        let err = parse("a = 1;\n)").unwrap_err();
        assert_eq!("Trying to close parenthesis without them opened.", err.message());
        assert_eq!(Position::new(2, 1), err.position());
    }

    #[test]
    fn empty_array_elements() {
        assert!(parse("[]").is_ok());
        assert!(parse("[ ]").is_ok());
        for source in ["[1,,2]", "[1,]", "[,1]", "[1, ]"].iter() {
            let err = parse(source).unwrap_err();
            assert_eq!("Array cannot have an empty element", err.message());
        }
        let err = parse("[1; 2]").unwrap_err();
        assert!(err.message().starts_with("A statement"));
    }

    #[test]
    fn nesting_is_bounded() {
        let nested = |levels: usize| {
            format!("{}1{}", "(".repeat(levels), ")".repeat(levels))
        };
        assert!(parse(&nested(block::MAX_NESTING)).is_ok());

        let err = parse(&nested(block::MAX_NESTING + 1)).unwrap_err();
        assert_eq!("Nesting too deep", err.message());
        assert_eq!(Position::new(1, block::MAX_NESTING + 1), err.position());

        let braces = format!("{}{}", "{".repeat(20_000), "}".repeat(20_000));
        assert!(parse(&braces).is_err());
    }

    #[test]
    fn operator_chains_are_bounded() {
        assert!(parse(&format!("x = 1{}", " + 1".repeat(100))).is_ok());
        let err = parse(&format!("x = 1{}", " + 1".repeat(1_000))).unwrap_err();
        assert_eq!("Nesting too deep", err.message());
    }

    #[test]
    fn directives_are_statements_of_their_own() {
        let code = parse("x = 1\n#define A 2\ny").unwrap();
        assert_eq!(3, code.statements().len());
        let directive = code.statements()[1].value.as_statement().unwrap();
        let base: Vec<String> = directive.base_tokens().iter().map(|t| t.to_string()).collect();
        assert_eq!(vec!["#define", "A", "2"], base);
        assert!(!directive.is_parenthesized());
    }

    #[test]
    fn positions_follow_source() {
        let code = parse("private _y = _z;").unwrap();
        let base = first_base(&code);
        assert_eq!(3, base.len());
        assert_eq!(Position::new(1, 1), base[0].position);
        assert_eq!(Position::new(1, 12), base[1].position);
        // the right hand side keeps its leading space
        let rhs = base[2].value.as_statement().unwrap();
        assert_eq!(Position::new(1, 13), base[2].position);
        let variable = rhs.base_tokens()[0];
        assert_eq!(Value::Variable("_z".to_string()), variable.value);
        assert_eq!(Position::new(1, 14), variable.position);
    }
}
