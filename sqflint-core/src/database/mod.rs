//! Operator database.
//!
//! Every operator of the language is described by one or more
//! [`Expression`]s, each a single signature: operand types, return type and
//! optionally an action computing the result. The analyzer looks up the
//! expressions matching the values of a statement and either executes the
//! matching one or, when the values are only partially known, synthesizes a
//! placeholder of the right type.
//!
//! The built-in database combines the control-flow and common operator
//! tables defined in code with the bundled engine command table
//! (`commands.toml`). Additional tables can be merged on top with
//! [`Database::builder`].

use std::fmt;
use std::sync::OnceLock;

use fnv::{FnvHashMap, FnvHashSet};
use smallvec::{smallvec, SmallVec};

use crate::interpreter::Interpreter;
use crate::parser::{Grammar, Priorities};
use crate::types::{Token, Value, ValueType, MISSION_NAMESPACE};

mod common;
mod control;
pub mod table;

pub use table::ExpressionTable;

/// Engine command table shipped with the crate.
static COMMANDS: &str = include_str!("commands.toml");

static BUILTIN: OnceLock<Database> = OnceLock::new();

/// Computes the result of an expression from its fully defined operands.
pub type ComputeFn = fn(&[Token]) -> Option<Value>;
/// Computes the result of an expression with access to the interpreter.
pub type InterpretFn = fn(&[Token], &mut dyn Interpreter) -> Option<Value>;

/// What executing an expression does.
#[derive(Clone, Copy)]
pub enum Action {
    /// Result is a placeholder of the return type.
    Placeholder,
    /// Result is computed when every data operand is defined.
    Compute(ComputeFn),
    /// Result is computed regardless of undefined operands. Used to build
    /// the helper values of control constructs.
    Construct(ComputeFn),
    /// Result is computed by interacting with the interpreter.
    Interpret(InterpretFn),
}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            Action::Placeholder => "Placeholder",
            Action::Compute(_) => "Compute",
            Action::Construct(_) => "Construct",
            Action::Interpret(_) => "Interpret",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Arity {
    Nullary,
    Unary,
    Binary,
}

/// Single element of an expression signature.
#[derive(Debug, Clone)]
pub enum Operand {
    /// The operator keyword itself.
    Keyword(String),
    /// A value of the given type. `Anything` accepts values of every
    /// non-helper type.
    Type(ValueType),
}

impl Operand {
    /// Whether `value` fits this operand. Unless `exact` is set, values of
    /// unknown type fit every typed operand.
    fn accepts(&self, value: &Value, exact: bool) -> bool {
        match self {
            Operand::Keyword(keyword) => value.is_keyword(keyword),
            Operand::Type(ValueType::Anything) => match value.value_type() {
                Some(value_type) => !value_type.is_helper(),
                None => false,
            },
            Operand::Type(value_type) => {
                value.value_type() == Some(*value_type) || (!exact && value.is_unknown())
            }
        }
    }

    pub fn value_type(&self) -> Option<ValueType> {
        match self {
            Operand::Type(value_type) => Some(*value_type),
            Operand::Keyword(_) => None,
        }
    }
}

impl From<ValueType> for Operand {
    fn from(value_type: ValueType) -> Self {
        Operand::Type(value_type)
    }
}

impl PartialEq for Operand {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Operand::Keyword(a), Operand::Keyword(b)) => a.eq_ignore_ascii_case(b),
            (Operand::Type(a), Operand::Type(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Operand::Keyword(keyword) => write!(f, "{}", keyword),
            Operand::Type(value_type) => write!(f, "{}", value_type),
        }
    }
}

/// One signature of an operator.
#[derive(Debug, Clone)]
pub struct Expression {
    operands: SmallVec<[Operand; 3]>,
    return_type: Option<ValueType>,
    action: Action,
}

impl Expression {
    pub fn nullary(name: &str, returns: Option<ValueType>) -> Self {
        Self {
            operands: smallvec![Operand::Keyword(name.to_string())],
            return_type: returns,
            action: Action::Placeholder,
        }
    }

    pub fn unary(name: &str, rhs: ValueType, returns: Option<ValueType>) -> Self {
        Self {
            operands: smallvec![Operand::Keyword(name.to_string()), Operand::Type(rhs)],
            return_type: returns,
            action: Action::Placeholder,
        }
    }

    pub fn binary(lhs: ValueType, name: &str, rhs: ValueType, returns: Option<ValueType>) -> Self {
        Self {
            operands: smallvec![
                Operand::Type(lhs),
                Operand::Keyword(name.to_string()),
                Operand::Type(rhs)
            ],
            return_type: returns,
            action: Action::Placeholder,
        }
    }

    pub fn computing(mut self, compute: ComputeFn) -> Self {
        self.action = Action::Compute(compute);
        self
    }

    pub fn constructing(mut self, construct: ComputeFn) -> Self {
        self.action = Action::Construct(construct);
        self
    }

    pub fn interpreting(mut self, interpret: InterpretFn) -> Self {
        self.action = Action::Interpret(interpret);
        self
    }

    pub fn operands(&self) -> &[Operand] {
        &self.operands
    }

    pub fn return_type(&self) -> Option<ValueType> {
        self.return_type
    }

    pub fn action(&self) -> Action {
        self.action
    }

    pub fn arity(&self) -> Arity {
        match self.operands.len() {
            1 => Arity::Nullary,
            2 => Arity::Unary,
            _ => Arity::Binary,
        }
    }

    /// Name of the operator, as written in the table.
    pub fn keyword(&self) -> &str {
        let index = match self.arity() {
            Arity::Binary => 1,
            _ => 0,
        };
        match &self.operands[index] {
            Operand::Keyword(keyword) => keyword,
            Operand::Type(_) => "",
        }
    }

    /// Type of the left hand side of a binary expression.
    pub fn lhs_type(&self) -> Option<ValueType> {
        match self.arity() {
            Arity::Binary => self.operands[0].value_type(),
            _ => None,
        }
    }

    /// Type of the right hand side of a unary or binary expression.
    pub fn rhs_type(&self) -> Option<ValueType> {
        match self.arity() {
            Arity::Nullary => None,
            _ => self.operands.last().and_then(|o| o.value_type()),
        }
    }

    /// Whether `values` have the shape of this expression. Values of
    /// unknown type match any typed operand.
    pub fn is_signature_match(&self, values: &[Token]) -> bool {
        values.len() == self.operands.len()
            && self
                .operands
                .iter()
                .zip(values)
                .all(|(operand, token)| operand.accepts(&token.value, false))
    }

    /// Whether `values` have exactly the types of this expression.
    pub fn is_match(&self, values: &[Token]) -> bool {
        values.len() == self.operands.len()
            && self
                .operands
                .iter()
                .zip(values)
                .all(|(operand, token)| operand.accepts(&token.value, true))
    }

    pub fn has_same_signature(&self, other: &Expression) -> bool {
        self.operands == other.operands
    }

    /// Type-only result of this expression.
    pub fn placeholder(&self) -> Value {
        match self.return_type {
            None => Value::Nothing,
            Some(ValueType::Namespace) => Value::Namespace(Some(MISSION_NAMESPACE.to_string())),
            Some(value_type) => Value::placeholder(value_type),
        }
    }

    /// Executes the expression on values matching it.
    pub fn execute(&self, values: &[Token], interpreter: &mut dyn Interpreter) -> Value {
        let result = match self.action {
            Action::Placeholder => None,
            Action::Compute(compute) => {
                let defined = self
                    .operands
                    .iter()
                    .zip(values)
                    .filter(|(operand, _)| operand.value_type().is_some())
                    .all(|(_, token)| token.value.is_defined());
                if defined {
                    compute(values)
                } else {
                    None
                }
            }
            Action::Construct(construct) => construct(values),
            Action::Interpret(interpret) => interpret(values, interpreter),
        };
        result.unwrap_or_else(|| self.placeholder())
    }

    /// Same expression with plain data operands accepting anything.
    fn untyped(&self) -> Self {
        let operands = self
            .operands
            .iter()
            .map(|operand| match operand {
                Operand::Type(value_type)
                    if !value_type.is_helper() && *value_type != ValueType::Code =>
                {
                    Operand::Type(ValueType::Anything)
                }
                other => other.clone(),
            })
            .collect();
        Self {
            operands,
            return_type: self.return_type,
            action: self.action,
        }
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let operands: Vec<String> = self.operands.iter().map(|o| o.to_string()).collect();
        write!(f, "{}", operands.join(" "))
    }
}

/// Expressions found for a list of values.
#[derive(Debug)]
pub struct Lookup<'a> {
    /// Expressions with the operator name and arity of the values.
    pub candidates: Vec<&'a Expression>,
    /// Candidates the values have the shape of, in database order.
    pub signature_matches: Vec<&'a Expression>,
    /// First candidate the values match exactly.
    pub full_match: Option<&'a Expression>,
}

impl<'a> Lookup<'a> {
    /// Full match, or else the first signature match.
    pub fn found(&self) -> Option<&'a Expression> {
        self.full_match.or_else(|| self.signature_matches.first().copied())
    }

    pub fn is_full(&self) -> bool {
        self.full_match.is_some()
    }

    /// Return type shared by every signature match, if they agree.
    pub fn agreed_return_type(&self) -> Option<Option<ValueType>> {
        let first = self.signature_matches.first()?.return_type();
        if self
            .signature_matches
            .iter()
            .all(|e| e.return_type() == first)
        {
            Some(first)
        } else {
            None
        }
    }
}

/// Queryable collection of expressions.
#[derive(Debug, Clone)]
pub struct Database {
    expressions: Vec<Expression>,
    index: FnvHashMap<(Arity, String), Vec<usize>>,
    grammar: Grammar,
}

impl Database {
    pub fn new(expressions: Vec<Expression>) -> Self {
        let mut index: FnvHashMap<(Arity, String), Vec<usize>> = FnvHashMap::default();
        let mut keywords = FnvHashSet::default();
        let mut names: [Vec<String>; 3] = [Vec::new(), Vec::new(), Vec::new()];
        for (n, expression) in expressions.iter().enumerate() {
            let name = expression.keyword().to_lowercase();
            let arity = expression.arity();
            let slot = match arity {
                Arity::Binary => 0,
                Arity::Unary => 1,
                Arity::Nullary => 2,
            };
            if !names[slot].contains(&name) {
                names[slot].push(name.clone());
            }
            keywords.insert(name.clone());
            index.entry((arity, name)).or_default().push(n);
        }
        let priorities = Priorities::new(
            names[0].iter().map(|s| s.as_str()),
            names[1].iter().map(|s| s.as_str()),
            names[2].iter().map(|s| s.as_str()),
        );
        debug!(
            "database with {} expressions, {} keywords",
            expressions.len(),
            keywords.len()
        );
        Self {
            expressions,
            index,
            grammar: Grammar::new(keywords, priorities),
        }
    }

    /// Database of the built-in operators and engine commands.
    pub fn builtin() -> &'static Database {
        BUILTIN.get_or_init(|| {
            let commands = match ExpressionTable::from_toml_str(COMMANDS)
                .and_then(|table| table.expressions())
            {
                Ok(commands) => commands,
                Err(e) => {
                    error!("bundled command table is invalid: {}", e);
                    Vec::new()
                }
            };
            let mut language = control::expressions();
            language.extend(common::expressions());
            Database::builder(commands).with_overrides(language).build()
        })
    }

    pub fn builder(base: impl IntoIterator<Item = Expression>) -> DatabaseBuilder {
        DatabaseBuilder {
            expressions: base.into_iter().collect(),
        }
    }

    /// Derives a database where plain data operands accept values of any
    /// type. Only the shape of statements is then checked, code and helper
    /// operands staying typed so that control constructs still execute
    /// their bodies.
    pub fn untyped(&self) -> Database {
        let mut expressions: Vec<Expression> = Vec::with_capacity(self.expressions.len());
        for expression in &self.expressions {
            let untyped = expression.untyped();
            if !expressions.iter().any(|e| e.has_same_signature(&untyped)) {
                expressions.push(untyped);
            }
        }
        Database::new(expressions)
    }

    pub fn expressions(&self) -> &[Expression] {
        &self.expressions
    }

    pub fn len(&self) -> usize {
        self.expressions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.expressions.is_empty()
    }

    pub fn grammar(&self) -> &Grammar {
        &self.grammar
    }

    /// Expressions named and shaped like `values`: one value is a nullary
    /// operator, two a unary one and three a binary one.
    pub fn candidates(&self, values: &[Token]) -> Vec<&Expression> {
        let (arity, name) = match values {
            [name] => (Arity::Nullary, name),
            [name, _] => (Arity::Unary, name),
            [_, name, _] => (Arity::Binary, name),
            _ => return Vec::new(),
        };
        let name = match name.value.as_keyword() {
            Some(name) => name.to_lowercase(),
            None => return Vec::new(),
        };
        self.index
            .get(&(arity, name))
            .map(|indices| indices.iter().map(|&n| &self.expressions[n]).collect())
            .unwrap_or_default()
    }

    pub fn lookup(&self, values: &[Token]) -> Lookup<'_> {
        let candidates = self.candidates(values);
        let full_match = candidates.iter().copied().find(|e| e.is_match(values));
        let signature_matches = candidates
            .iter()
            .copied()
            .filter(|e| e.is_signature_match(values))
            .collect();
        Lookup {
            candidates,
            signature_matches,
            full_match,
        }
    }
}

/// Merges expressions into a base set.
#[derive(Debug, Clone)]
pub struct DatabaseBuilder {
    expressions: Vec<Expression>,
}

impl DatabaseBuilder {
    /// Entries with the signature of an existing expression replace it in
    /// place, the others are appended.
    pub fn with_overrides(mut self, overrides: impl IntoIterator<Item = Expression>) -> Self {
        for expression in overrides {
            match self
                .expressions
                .iter()
                .position(|e| e.has_same_signature(&expression))
            {
                Some(n) => self.expressions[n] = expression,
                None => self.expressions.push(expression),
            }
        }
        self
    }

    pub fn build(self) -> Database {
        Database::new(self.expressions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Array, Code};

    fn tokens(values: Vec<Value>) -> Vec<Token> {
        values.into_iter().map(Token::from).collect()
    }

    #[test]
    fn builtin_has_language_and_commands() {
        let database = Database::builtin();
        assert!(database.len() > 100);
        let grammar = database.grammar();
        for keyword in ["if", "then", "foreach", "hint", "player", ":", "setvariable"].iter() {
            assert!(grammar.is_keyword(keyword), "{} is not a keyword", keyword);
        }
    }

    #[test]
    fn full_and_signature_matches() {
        let database = Database::builtin();
        let plus = tokens(vec![
            Value::number(1.0),
            Value::keyword("+"),
            Value::number(2.0),
        ]);
        let lookup = database.lookup(&plus);
        assert!(lookup.is_full());

        let unknown = tokens(vec![Value::Nothing, Value::keyword("+"), Value::number(2.0)]);
        let lookup = database.lookup(&unknown);
        assert!(!lookup.is_full());
        assert_eq!(
            Some(ValueType::Number),
            lookup.found().and_then(|e| e.return_type())
        );

        let wrong = tokens(vec![
            Value::number(1.0),
            Value::keyword("+"),
            Value::Code(Code::new(vec![])),
        ]);
        let lookup = database.lookup(&wrong);
        assert!(lookup.found().is_none());
        assert!(!lookup.candidates.is_empty());
    }

    #[test]
    fn keywords_are_matched_case_insensitively() {
        let database = Database::builtin();
        let values = tokens(vec![
            Value::Code(Code::new(vec![])),
            Value::keyword("FOREACH"),
            Value::Array(Array::new(vec![])),
        ]);
        assert!(database.lookup(&values).is_full());
    }

    #[test]
    fn overrides_replace_in_place() {
        let base = vec![
            Expression::unary("foo", ValueType::Number, Some(ValueType::Number)),
            Expression::unary("foo", ValueType::String, Some(ValueType::String)),
        ];
        let database = Database::builder(base)
            .with_overrides(vec![
                Expression::unary("FOO", ValueType::Number, Some(ValueType::Boolean)),
                Expression::unary("foo", ValueType::Array, None),
            ])
            .build();
        assert_eq!(3, database.len());
        assert_eq!(
            Some(ValueType::Boolean),
            database.expressions()[0].return_type()
        );
        assert_eq!(Some(ValueType::Array), database.expressions()[2].rhs_type());
    }

    #[test]
    fn untyped_accepts_any_data() {
        let database = Database::builtin().untyped();
        let values = tokens(vec![
            Value::string("a"),
            Value::keyword("-"),
            Value::number(1.0),
        ]);
        assert!(database.lookup(&values).is_full());
        // bodies of control constructs stay typed
        let values = tokens(vec![
            Value::keyword("while"),
            Value::number(1.0),
        ]);
        assert!(database.lookup(&values).found().is_none());
    }

    #[test]
    fn namespace_placeholder_is_mission() {
        let expression = Expression::nullary("currentNamespace", Some(ValueType::Namespace));
        assert_eq!(
            Value::Namespace(Some(MISSION_NAMESPACE.to_string())),
            expression.placeholder()
        );
    }
}
