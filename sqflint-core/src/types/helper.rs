use super::{Array, Code, Token, Value, ValueType};

/// Intermediate values produced while a multi-keyword construct such as
/// `for "_i" from 0 to 10 do {...}` is evaluated one operator at a time.
///
/// Fields are optional so that type-only placeholders can be built when the
/// operands are not known.
#[derive(Debug, Clone, PartialEq)]
pub enum HelperType {
    /// Result of `private _x`, waiting to be assigned.
    Private(Option<Token>),
    While(Option<Code>),
    For {
        variable: Option<String>,
        from: Option<Value>,
        to: Option<Value>,
        step: Option<Value>,
    },
    ForSpec(Option<Array>),
    Switch(Option<Value>),
    If(Option<Value>),
    Else {
        then: Option<Code>,
        otherwise: Option<Code>,
    },
    Try(Option<Code>),
    /// Namespace name, lower-cased.
    With(Option<String>),
}

impl HelperType {
    pub fn placeholder(value_type: ValueType) -> Self {
        match value_type {
            ValueType::Private => HelperType::Private(None),
            ValueType::While => HelperType::While(None),
            ValueType::For => HelperType::For {
                variable: None,
                from: None,
                to: None,
                step: None,
            },
            ValueType::ForSpec => HelperType::ForSpec(None),
            ValueType::Switch => HelperType::Switch(None),
            ValueType::If => HelperType::If(None),
            ValueType::Else => HelperType::Else {
                then: None,
                otherwise: None,
            },
            ValueType::Try => HelperType::Try(None),
            _ => HelperType::With(None),
        }
    }

    pub fn value_type(&self) -> ValueType {
        match self {
            HelperType::Private(_) => ValueType::Private,
            HelperType::While(_) => ValueType::While,
            HelperType::For { .. } => ValueType::For,
            HelperType::ForSpec(_) => ValueType::ForSpec,
            HelperType::Switch(_) => ValueType::Switch,
            HelperType::If(_) => ValueType::If,
            HelperType::Else { .. } => ValueType::Else,
            HelperType::Try(_) => ValueType::Try,
            HelperType::With(_) => ValueType::With,
        }
    }

    /// Name shown in messages. `for` constructs are named after the stage
    /// they reached.
    pub fn name(&self) -> &'static str {
        match self {
            HelperType::For { to: Some(_), .. } => "ForFromToStepType",
            HelperType::For { from: Some(_), .. } => "ForFromType",
            other => other.value_type().name(),
        }
    }

    /// Loop variable of a `for` construct, if known.
    pub fn for_variable(&self) -> Option<&str> {
        match self {
            HelperType::For {
                variable: Some(variable),
                ..
            } => Some(variable),
            _ => None,
        }
    }
}
