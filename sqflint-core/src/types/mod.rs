//! Values and tokens making up parsed scripts.
//!
//! Everything the parser produces and everything the analyzer computes is a
//! [`Value`]. Inside a parsed tree values are wrapped in [`Token`]s, which
//! add the source [`Position`] used for diagnostics.
//!
//! Values of concrete types may be *undefined*, meaning only their type is
//! known (e.g. the result of adding two numbers nobody knows the value of).
//! [`Value::Nothing`] stands for a value whose type is not known either.

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

mod helper;
mod statement;

pub use helper::HelperType;
pub use statement::{Ending, Statement};

pub const MISSION_NAMESPACE: &str = "missionnamespace";
pub const UI_NAMESPACE: &str = "uinamespace";
pub const PROFILE_NAMESPACE: &str = "profilenamespace";
pub const PARSING_NAMESPACE: &str = "parsingnamespace";

/// Names of the fixed namespaces, lower-cased.
pub static NAMESPACES: &[&str; 4] = &[
    MISSION_NAMESPACE,
    UI_NAMESPACE,
    PROFILE_NAMESPACE,
    PARSING_NAMESPACE,
];

/// Line and column of a token. Both are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }

    pub fn start() -> Self {
        Self::new(1, 1)
    }

    /// Returns the position reached after walking over `text`.
    pub fn advance(mut self, text: &str) -> Self {
        for c in text.chars() {
            if c == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
        self
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::start()
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "[{},{}]", self.line, self.column)
    }
}

// names used in messages
const NOTHING_TYPE_NAME: &str = "Nothing";
const ANYTHING_TYPE_NAME: &str = "Anything";
const NUMBER_TYPE_NAME: &str = "Number";
const BOOLEAN_TYPE_NAME: &str = "Boolean";
const STRING_TYPE_NAME: &str = "String";
const ARRAY_TYPE_NAME: &str = "Array";
const CODE_TYPE_NAME: &str = "Code";
const NAMESPACE_TYPE_NAME: &str = "Namespace";
const OBJECT_TYPE_NAME: &str = "Object";
const CONFIG_TYPE_NAME: &str = "Config";
const GROUP_TYPE_NAME: &str = "Group";
const CONTROL_TYPE_NAME: &str = "Control";
const DISPLAY_TYPE_NAME: &str = "Display";
const SIDE_TYPE_NAME: &str = "Side";
const TASK_TYPE_NAME: &str = "Task";
const SCRIPT_TYPE_NAME: &str = "Script";

/// Every type a value can have, including the helper types produced while
/// evaluating multi-part control constructs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ValueType {
    Nothing,
    Anything,
    Number,
    Boolean,
    String,
    Array,
    Code,
    Namespace,
    Object,
    Config,
    Group,
    Control,
    Display,
    Side,
    Task,
    Script,
    While,
    For,
    ForSpec,
    Switch,
    If,
    Else,
    Try,
    With,
    Private,
}

impl ValueType {
    pub fn name(&self) -> &'static str {
        match self {
            ValueType::Nothing => NOTHING_TYPE_NAME,
            ValueType::Anything => ANYTHING_TYPE_NAME,
            ValueType::Number => NUMBER_TYPE_NAME,
            ValueType::Boolean => BOOLEAN_TYPE_NAME,
            ValueType::String => STRING_TYPE_NAME,
            ValueType::Array => ARRAY_TYPE_NAME,
            ValueType::Code => CODE_TYPE_NAME,
            ValueType::Namespace => NAMESPACE_TYPE_NAME,
            ValueType::Object => OBJECT_TYPE_NAME,
            ValueType::Config => CONFIG_TYPE_NAME,
            ValueType::Group => GROUP_TYPE_NAME,
            ValueType::Control => CONTROL_TYPE_NAME,
            ValueType::Display => DISPLAY_TYPE_NAME,
            ValueType::Side => SIDE_TYPE_NAME,
            ValueType::Task => TASK_TYPE_NAME,
            ValueType::Script => SCRIPT_TYPE_NAME,
            ValueType::While => "WhileType",
            ValueType::For => "ForType",
            ValueType::ForSpec => "ForSpecType",
            ValueType::Switch => "SwitchType",
            ValueType::If => "IfType",
            ValueType::Else => "ElseType",
            ValueType::Try => "TryType",
            ValueType::With => "WithType",
            ValueType::Private => "PrivateType",
        }
    }

    /// Whether values of this type only exist while a control construct is
    /// being put together.
    pub fn is_helper(&self) -> bool {
        match self {
            ValueType::While
            | ValueType::For
            | ValueType::ForSpec
            | ValueType::Switch
            | ValueType::If
            | ValueType::Else
            | ValueType::Try
            | ValueType::With
            | ValueType::Private => true,
            _ => false,
        }
    }

    /// Names this type is known under, own names first and engine names
    /// after.
    fn aliases(&self) -> &'static [&'static str] {
        match self {
            ValueType::Nothing => &["nothing"],
            ValueType::Anything => &["anything", "any"],
            ValueType::Number => &["number", "scalar", "nan"],
            ValueType::Boolean => &["boolean", "bool"],
            ValueType::String => &["string", "text"],
            ValueType::Array => &["array"],
            ValueType::Code => &["code"],
            ValueType::Namespace => &["namespace"],
            ValueType::Object => &[
                "object",
                "location",
                "team_member",
                "netobject",
                "diary_record",
            ],
            ValueType::Config => &["config"],
            ValueType::Group => &["group"],
            ValueType::Control => &["control"],
            ValueType::Display => &["display"],
            ValueType::Side => &["side"],
            ValueType::Task => &["task"],
            ValueType::Script => &["script"],
            ValueType::While => &["whiletype", "while"],
            ValueType::For => &["fortype", "for"],
            ValueType::ForSpec => &["forspectype"],
            ValueType::Switch => &["switchtype", "switch"],
            ValueType::If => &["iftype", "if"],
            ValueType::Else => &["elsetype"],
            ValueType::Try => &["trytype", "exception"],
            ValueType::With => &["withtype", "with"],
            ValueType::Private => &["privatetype"],
        }
    }
}

/// List of all value types.
pub static VALUE_TYPES: &[ValueType; 25] = &[
    ValueType::Nothing,
    ValueType::Anything,
    ValueType::Number,
    ValueType::Boolean,
    ValueType::String,
    ValueType::Array,
    ValueType::Code,
    ValueType::Namespace,
    ValueType::Object,
    ValueType::Config,
    ValueType::Group,
    ValueType::Control,
    ValueType::Display,
    ValueType::Side,
    ValueType::Task,
    ValueType::Script,
    ValueType::While,
    ValueType::For,
    ValueType::ForSpec,
    ValueType::Switch,
    ValueType::If,
    ValueType::Else,
    ValueType::Try,
    ValueType::With,
    ValueType::Private,
];

impl FromStr for ValueType {
    type Err = Error;

    /// Accepts both the names used in messages and the names found in
    /// engine command dumps, case-insensitively.
    fn from_str(s: &str) -> Result<Self> {
        let lower = s.to_lowercase();
        for value_type in VALUE_TYPES.iter() {
            if value_type.aliases().contains(&lower.as_str()) {
                return Ok(*value_type);
            }
        }
        let suggestion = VALUE_TYPES
            .iter()
            .map(|t| (t.name(), strsim::jaro_winkler(&lower, &t.name().to_lowercase())))
            .filter(|(_, score)| *score > 0.8)
            .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
            .map(|(name, _)| name);
        Err(Error::InvalidValueType(match suggestion {
            Some(name) => format!("{} (did you mean `{}`?)", s, name),
            None => s.to_string(),
        }))
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Numeric value. Remembers the literal it was parsed from so that parsed
/// scripts print back exactly.
#[derive(Debug, Clone)]
pub struct Number {
    value: f64,
    integer: bool,
    literal: Option<String>,
}

impl Number {
    pub fn int(value: i64) -> Self {
        Self {
            value: value as f64,
            integer: true,
            literal: None,
        }
    }

    pub fn float(value: f64) -> Self {
        Self {
            value,
            integer: false,
            literal: None,
        }
    }

    pub(crate) fn with_literal(mut self, literal: &str) -> Self {
        self.literal = Some(literal.to_string());
        self
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn is_integer(&self) -> bool {
        self.integer
    }
}

impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.literal {
            Some(literal) => write!(f, "{}", literal),
            None if self.integer => write!(f, "{}", self.value as i64),
            None => write!(f, "{:.2}", self.value),
        }
    }
}

/// String value together with the quote character delimiting it.
///
/// `value` holds the text between the quotes as written, so doubled quotes
/// stay doubled.
#[derive(Debug, Clone)]
pub struct Text {
    pub value: String,
    pub quote: char,
}

impl Text {
    pub fn new(value: &str) -> Self {
        Self {
            value: value.to_string(),
            quote: '"',
        }
    }

    /// Builds a string from its quoted literal form.
    pub fn from_literal(literal: &str) -> Option<Self> {
        let quote = literal.chars().next()?;
        if (quote != '"' && quote != '\'') || literal.len() < 2 || !literal.ends_with(quote) {
            return None;
        }
        Some(Self {
            value: literal[1..literal.len() - 1].to_string(),
            quote,
        })
    }
}

impl PartialEq for Text {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl fmt::Display for Text {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}{}{}", self.quote, self.value, self.quote)
    }
}

/// Ordered collection of tokens. An undefined array is an array whose
/// contents are not known.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Array {
    items: Option<Vec<Token>>,
}

impl Array {
    pub fn new(items: Vec<Token>) -> Self {
        Self { items: Some(items) }
    }

    pub fn undefined() -> Self {
        Self { items: None }
    }

    pub fn is_undefined(&self) -> bool {
        self.items.is_none()
    }

    pub fn items(&self) -> Option<&[Token]> {
        self.items.as_deref()
    }

    pub fn len(&self) -> usize {
        self.items.as_ref().map(|i| i.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub(crate) fn place(&mut self, start: Position) -> Position {
        let mut cursor = start.advance("[");
        if let Some(items) = &mut self.items {
            for (n, item) in items.iter_mut().enumerate() {
                if n > 0 {
                    cursor = cursor.advance(",");
                }
                cursor = item.place(cursor);
            }
        }
        cursor.advance("]")
    }

    pub fn contains(&self, value: &Value) -> bool {
        self.items
            .as_ref()
            .map(|items| items.iter().any(|item| &item.value == value))
            .unwrap_or(false)
    }
}

impl fmt::Display for Array {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.items {
            None => write!(f, "[undefined]"),
            Some(items) => {
                write!(f, "[")?;
                for (n, item) in items.iter().enumerate() {
                    if n > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
        }
    }
}

/// Block of statements. A file is a block written without braces.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Code {
    statements: Option<Vec<Token>>,
    file: bool,
}

impl Code {
    pub fn new(statements: Vec<Token>) -> Self {
        Self {
            statements: Some(statements),
            file: false,
        }
    }

    pub fn file(statements: Vec<Token>) -> Self {
        Self {
            statements: Some(statements),
            file: true,
        }
    }

    pub fn undefined() -> Self {
        Self::default()
    }

    pub fn is_undefined(&self) -> bool {
        self.statements.is_none()
    }

    pub fn is_file(&self) -> bool {
        self.file
    }

    pub fn statements(&self) -> &[Token] {
        self.statements.as_deref().unwrap_or(&[])
    }

    /// Same statements, written as a file.
    pub fn as_file(&self) -> Self {
        Self {
            statements: self.statements.clone(),
            file: true,
        }
    }

    pub(crate) fn place(&mut self, start: Position) -> Position {
        let mut cursor = start;
        if !self.file {
            cursor = cursor.advance("{");
        }
        if let Some(statements) = &mut self.statements {
            for statement in statements {
                cursor = statement.place(cursor);
            }
        }
        if !self.file {
            cursor = cursor.advance("}");
        }
        cursor
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if !self.file {
            write!(f, "{{")?;
        }
        for statement in self.statements() {
            write!(f, "{}", statement)?;
        }
        if !self.file {
            write!(f, "}}")?;
        }
        Ok(())
    }
}

/// Opaque engine types. The analyzer only ever knows their type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EngineType {
    Object,
    Config,
    Group,
    Control,
    Display,
    Side,
    Task,
    Script,
}

impl EngineType {
    pub fn value_type(&self) -> ValueType {
        match self {
            EngineType::Object => ValueType::Object,
            EngineType::Config => ValueType::Config,
            EngineType::Group => ValueType::Group,
            EngineType::Control => ValueType::Control,
            EngineType::Display => ValueType::Display,
            EngineType::Side => ValueType::Side,
            EngineType::Task => ValueType::Task,
            EngineType::Script => ValueType::Script,
        }
    }
}

/// Source text that carries no meaning for evaluation.
#[derive(Debug, Clone, PartialEq)]
pub enum Trivia {
    Space,
    Tab,
    /// Line break, `true` when written as `\r\n`.
    EndOfLine(bool),
    /// Backslash continuing a line, `true` when followed by `\r\n`.
    BrokenEndOfLine(bool),
    /// Comment including its delimiters.
    Comment(String),
    /// Statement delimiter kept verbatim inside preprocessor lines.
    Delimiter(char),
}

impl Trivia {
    /// Text of a comment without its opening delimiter.
    pub fn comment_body(&self) -> Option<&str> {
        match self {
            Trivia::Comment(text) => Some(&text[2..]),
            _ => None,
        }
    }
}

impl fmt::Display for Trivia {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Trivia::Space => write!(f, " "),
            Trivia::Tab => write!(f, "\t"),
            Trivia::EndOfLine(false) => write!(f, "\n"),
            Trivia::EndOfLine(true) => write!(f, "\r\n"),
            Trivia::BrokenEndOfLine(false) => write!(f, "\\\n"),
            Trivia::BrokenEndOfLine(true) => write!(f, "\\\r\n"),
            Trivia::Comment(text) => write!(f, "{}", text),
            Trivia::Delimiter(c) => write!(f, "{}", c),
        }
    }
}

/// The value domain of the language, plus the syntactic elements a parsed
/// script is made of.
#[derive(Debug, Clone)]
pub enum Value {
    /// Value of unknown type.
    Nothing,
    /// Value of any type, returned by operators whose result varies.
    Anything,
    Number(Option<Number>),
    Boolean(Option<bool>),
    String(Option<Text>),
    Array(Array),
    Code(Code),
    Namespace(Option<String>),
    Engine(EngineType),
    Variable(String),
    Keyword(String),
    Preprocessor(String),
    Statement(Statement),
    Helper(Box<HelperType>),
    Trivia(Trivia),
}

impl Value {
    pub fn number(value: f64) -> Self {
        if value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
            Value::Number(Some(Number::int(value as i64)))
        } else {
            Value::Number(Some(Number::float(value)))
        }
    }

    pub fn string(value: &str) -> Self {
        Value::String(Some(Text::new(value)))
    }

    pub fn keyword(name: &str) -> Self {
        Value::Keyword(name.to_string())
    }

    pub fn helper(helper: HelperType) -> Self {
        Value::Helper(Box::new(helper))
    }

    /// Type-only value of the given type.
    pub fn placeholder(value_type: ValueType) -> Self {
        match value_type {
            ValueType::Nothing => Value::Nothing,
            ValueType::Anything => Value::Anything,
            ValueType::Number => Value::Number(None),
            ValueType::Boolean => Value::Boolean(None),
            ValueType::String => Value::String(None),
            ValueType::Array => Value::Array(Array::undefined()),
            ValueType::Code => Value::Code(Code::undefined()),
            ValueType::Namespace => Value::Namespace(None),
            ValueType::Object => Value::Engine(EngineType::Object),
            ValueType::Config => Value::Engine(EngineType::Config),
            ValueType::Group => Value::Engine(EngineType::Group),
            ValueType::Control => Value::Engine(EngineType::Control),
            ValueType::Display => Value::Engine(EngineType::Display),
            ValueType::Side => Value::Engine(EngineType::Side),
            ValueType::Task => Value::Engine(EngineType::Task),
            ValueType::Script => Value::Engine(EngineType::Script),
            helper => Value::helper(HelperType::placeholder(helper)),
        }
    }

    /// Type of the value. Syntactic elements (keywords, statements, ...)
    /// have none.
    pub fn value_type(&self) -> Option<ValueType> {
        let value_type = match self {
            Value::Nothing => ValueType::Nothing,
            Value::Anything => ValueType::Anything,
            Value::Number(_) => ValueType::Number,
            Value::Boolean(_) => ValueType::Boolean,
            Value::String(_) => ValueType::String,
            Value::Array(_) => ValueType::Array,
            Value::Code(_) => ValueType::Code,
            Value::Namespace(_) => ValueType::Namespace,
            Value::Engine(engine) => engine.value_type(),
            Value::Helper(helper) => helper.value_type(),
            _ => return None,
        };
        Some(value_type)
    }

    /// Name of the value's type as shown in messages.
    pub fn type_name(&self) -> &'static str {
        match self.value_type() {
            Some(value_type) => value_type.name(),
            None => match self {
                Value::Variable(_) => "Variable",
                Value::Keyword(_) => "Keyword",
                Value::Preprocessor(_) => "Preprocessor",
                Value::Statement(_) => "Statement",
                _ => "Trivia",
            },
        }
    }

    /// Whether this is a data value (as opposed to a keyword, a statement or
    /// a helper type). Variables count as data.
    pub fn is_data(&self) -> bool {
        match self {
            Value::Variable(_) => true,
            Value::Helper(_) => false,
            _ => self.value_type().is_some(),
        }
    }

    /// Whether the type of the value is unknown.
    pub fn is_unknown(&self) -> bool {
        match self {
            Value::Nothing | Value::Anything => true,
            _ => false,
        }
    }

    /// Whether the actual value, not just its type, is known.
    pub fn is_defined(&self) -> bool {
        match self {
            Value::Number(n) => n.is_some(),
            Value::Boolean(b) => b.is_some(),
            Value::String(s) => s.is_some(),
            Value::Namespace(n) => n.is_some(),
            Value::Code(code) => !code.is_undefined(),
            Value::Array(array) => match array.items() {
                Some(items) => items.iter().all(|item| item.value.is_defined()),
                None => false,
            },
            Value::Helper(_) => true,
            _ => false,
        }
    }

    /// Type-only copy of this value, what gets stored on assignment.
    pub fn type_only(&self) -> Value {
        match self.value_type() {
            Some(value_type) if !value_type.is_helper() => Value::placeholder(value_type),
            _ => Value::Nothing,
        }
    }

    pub fn is_keyword(&self, name: &str) -> bool {
        match self {
            Value::Keyword(keyword) => keyword.eq_ignore_ascii_case(name),
            _ => false,
        }
    }

    pub fn as_keyword(&self) -> Option<&str> {
        match self {
            Value::Keyword(keyword) => Some(keyword),
            _ => None,
        }
    }

    pub fn is_preprocessor(&self, name: &str) -> bool {
        match self {
            Value::Preprocessor(directive) => directive == name,
            _ => false,
        }
    }

    pub fn is_trivia(&self) -> bool {
        match self {
            Value::Trivia(_) => true,
            _ => false,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(Some(n)) => Some(n.value()),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => *b,
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(Some(text)) => Some(&text.value),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&Array> {
        match self {
            Value::Array(array) => Some(array),
            _ => None,
        }
    }

    pub fn as_code(&self) -> Option<&Code> {
        match self {
            Value::Code(code) => Some(code),
            _ => None,
        }
    }

    pub fn as_helper(&self) -> Option<&HelperType> {
        match self {
            Value::Helper(helper) => Some(helper),
            _ => None,
        }
    }

    pub fn as_statement(&self) -> Option<&Statement> {
        match self {
            Value::Statement(statement) => Some(statement),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Nothing, Value::Nothing) => true,
            (Value::Anything, Value::Anything) => true,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a == b,
            (Value::Code(a), Value::Code(b)) => a == b,
            (Value::Namespace(Some(a)), Value::Namespace(Some(b))) => a.eq_ignore_ascii_case(b),
            (Value::Namespace(None), Value::Namespace(None)) => true,
            (Value::Engine(a), Value::Engine(b)) => a == b,
            (Value::Variable(a), Value::Variable(b)) => a == b,
            (Value::Keyword(a), Value::Keyword(b)) => a.eq_ignore_ascii_case(b),
            (Value::Preprocessor(a), Value::Preprocessor(b)) => a == b,
            (Value::Statement(a), Value::Statement(b)) => a == b,
            (Value::Helper(a), Value::Helper(b)) => a == b,
            (Value::Trivia(a), Value::Trivia(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Value::Nothing => write!(f, "{}", NOTHING_TYPE_NAME),
            Value::Anything => write!(f, "{}", ANYTHING_TYPE_NAME),
            Value::Number(Some(n)) => write!(f, "{}", n),
            Value::Boolean(Some(b)) => write!(f, "{}", b),
            Value::String(Some(s)) => write!(f, "{}", s),
            Value::Number(None) | Value::Boolean(None) | Value::String(None) => {
                write!(f, "undefined")
            }
            Value::Array(array) => write!(f, "{}", array),
            Value::Code(code) => write!(f, "{}", code),
            Value::Namespace(Some(name)) => write!(f, "{}", name),
            Value::Namespace(None) => write!(f, "{}", NAMESPACE_TYPE_NAME),
            Value::Engine(engine) => write!(f, "{}", engine.value_type().name()),
            Value::Variable(name) | Value::Keyword(name) | Value::Preprocessor(name) => {
                write!(f, "{}", name)
            }
            Value::Statement(statement) => write!(f, "{}", statement),
            Value::Helper(helper) => write!(f, "{}", helper.name()),
            Value::Trivia(trivia) => write!(f, "{}", trivia),
        }
    }
}

/// A value tagged with where it comes from.
///
/// Equality only looks at the value.
#[derive(Debug, Clone)]
pub struct Token {
    pub value: Value,
    pub position: Position,
}

impl Token {
    pub fn new(value: Value, position: Position) -> Self {
        Self { value, position }
    }

    /// Same token with a different value.
    pub fn with_value(&self, value: Value) -> Self {
        Self::new(value, self.position)
    }

    /// Whether this token takes part in evaluation.
    pub fn is_base(&self) -> bool {
        match &self.value {
            Value::Trivia(_) => false,
            Value::Statement(statement) => {
                statement.is_parenthesized() || statement.has_base_tokens()
            }
            _ => true,
        }
    }

    /// Assigns positions to this token and everything nested in it,
    /// starting at `start`. Returns the position right after the token.
    pub(crate) fn place(&mut self, start: Position) -> Position {
        self.position = start;
        match &mut self.value {
            Value::Statement(statement) => statement.place(start),
            Value::Code(code) => code.place(start),
            Value::Array(array) if !array.is_undefined() => array.place(start),
            other => start.advance(&other.to_string()),
        }
    }
}

impl From<Value> for Token {
    fn from(value: Value) -> Self {
        Self::new(value, Position::start())
    }
}

impl PartialEq for Token {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn position_advances_over_lines() {
        let position = Position::start().advance("ab\ncd");
        assert_eq!(Position::new(2, 3), position);
        assert_eq!(Position::new(1, 4), Position::start().advance("a\tb"));
    }

    #[test]
    fn value_type_from_engine_names() {
        assert_eq!(ValueType::Number, "SCALAR".parse().unwrap());
        assert_eq!(ValueType::Object, "TEAM_MEMBER".parse().unwrap());
        assert_eq!(ValueType::Try, "EXCEPTION".parse().unwrap());
        assert_eq!(ValueType::Boolean, "boolean".parse().unwrap());
        let err = "Numbr".parse::<ValueType>().unwrap_err();
        assert!(err.to_string().contains("did you mean `Number`?"));
    }

    #[test]
    fn number_printing() {
        assert_eq!("2", Value::number(2.0).to_string());
        assert_eq!("0.50", Value::number(0.5).to_string());
        assert_eq!(
            "1.5e3",
            Number::float(1500.0).with_literal("1.5e3").to_string()
        );
        assert_eq!(Value::number(3.0), Value::Number(Some(Number::float(3.0))));
    }

    #[test]
    fn keywords_compare_case_insensitively() {
        assert_eq!(Value::keyword("forEach"), Value::keyword("FOREACH"));
        assert_eq!(
            Value::Namespace(Some("missionNamespace".to_string())),
            Value::Namespace(Some("MISSIONNAMESPACE".to_string()))
        );
        assert_ne!(
            Value::Variable("_x".to_string()),
            Value::keyword("_x")
        );
    }

    #[test]
    fn array_contents() {
        let array = Array::new(vec![
            Token::from(Value::number(1.0)),
            Token::from(Value::Nothing),
        ]);
        assert_eq!(2, array.len());
        assert!(array.contains(&Value::number(1.0)));
        assert!(!array.contains(&Value::number(2.0)));
        assert_eq!("[1,Nothing]", array.to_string());
        assert!(Array::undefined().is_empty());
        assert_eq!("[undefined]", Array::undefined().to_string());
    }

    #[test]
    fn defined_values() {
        assert!(Value::number(1.0).is_defined());
        assert!(!Value::Number(None).is_defined());
        let partial = Value::Array(Array::new(vec![
            Token::from(Value::number(1.0)),
            Token::from(Value::Nothing),
        ]));
        assert!(!partial.is_defined());
        assert_eq!(Value::Number(None), Value::number(7.0).type_only());
    }
}
