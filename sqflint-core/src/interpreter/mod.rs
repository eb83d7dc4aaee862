//! Interpreter state and the protocol shared by interpreters.
//!
//! [`BaseInterpreter`] owns the four namespaces and their scope stacks.
//! The [`Interpreter`] trait is what operator actions see: it gives access
//! to the state, to value resolution and to code execution. The analyzer is
//! its implementation.

use fnv::FnvHashMap;

use crate::diagnostic::Diagnostic;
use crate::types::{Code, Position, Statement, Token, Value, MISSION_NAMESPACE, NAMESPACES};

mod namespace;

pub use namespace::{Namespace, Scope};

/// Namespaces and the name of the one code currently runs in.
#[derive(Debug, Clone, PartialEq)]
pub struct BaseInterpreter {
    namespaces: FnvHashMap<String, Namespace>,
    current: String,
}

impl Default for BaseInterpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl BaseInterpreter {
    pub fn new() -> Self {
        let namespaces = NAMESPACES
            .iter()
            .map(|name| (name.to_string(), Namespace::new(name)))
            .collect();
        Self {
            namespaces,
            current: MISSION_NAMESPACE.to_string(),
        }
    }

    pub fn namespace(&self, name: &str) -> Option<&Namespace> {
        self.namespaces.get(&name.to_lowercase())
    }

    fn namespace_mut(&mut self, name: &str) -> &mut Namespace {
        self.namespaces
            .entry(name.to_lowercase())
            .or_insert_with(|| Namespace::new(name))
    }

    pub fn current_namespace_name(&self) -> &str {
        &self.current
    }

    pub fn set_current_namespace(&mut self, name: &str) {
        let name = name.to_lowercase();
        self.namespace_mut(&name);
        self.current = name;
    }

    /// Level of the scope `name` resolves to and the value stored there.
    /// Resolution happens in `namespace`, or in the current namespace.
    pub fn lookup(&self, name: &str, namespace: Option<&str>) -> (usize, Value) {
        let namespace = namespace.unwrap_or(&self.current);
        match self.namespace(namespace) {
            Some(namespace) => {
                let scope = namespace.get_scope(name);
                (scope.level(), scope.get(name))
            }
            None => (0, Value::Nothing),
        }
    }

    /// Value of `name` in the current namespace.
    pub fn get(&self, name: &str) -> Value {
        self.lookup(name, None).1
    }

    pub fn get_scope_mut(&mut self, name: &str, namespace: Option<&str>) -> &mut Scope {
        let namespace = namespace
            .map(|n| n.to_string())
            .unwrap_or_else(|| self.current.clone());
        self.namespace_mut(&namespace).get_scope_mut(name)
    }

    pub fn current_scope_mut(&mut self) -> &mut Scope {
        let current = self.current.clone();
        self.namespace_mut(&current).current_scope_mut()
    }

    pub fn add_scope(&mut self, values: Vec<(String, Value)>) {
        let current = self.current.clone();
        self.namespace_mut(&current).add_scope(values);
    }

    pub fn del_scope(&mut self) {
        let current = self.current.clone();
        self.namespace_mut(&current).del_scope();
    }
}

/// How a piece of code gets executed.
#[derive(Debug, Clone, Default)]
pub struct Invocation {
    /// Value bound to `_this`.
    pub params: Option<Value>,
    /// Variables defined in the scope the code runs in.
    pub extra_scope: Vec<(String, Value)>,
    /// Namespace the code runs in, the current one if not set.
    pub namespace: Option<String>,
}

impl Invocation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_params(mut self, params: Value) -> Self {
        self.params = Some(params);
        self
    }

    pub fn bind(mut self, name: &str, value: Value) -> Self {
        self.extra_scope.push((name.to_string(), value));
        self
    }

    pub fn in_namespace(mut self, namespace: &str) -> Self {
        self.namespace = Some(namespace.to_lowercase());
        self
    }
}

/// Execution protocol used by operator actions.
pub trait Interpreter {
    fn base(&self) -> &BaseInterpreter;
    fn base_mut(&mut self) -> &mut BaseInterpreter;

    fn report(&mut self, diagnostic: Diagnostic);

    /// Resolves `token` to a value: variables are looked up (in
    /// `namespace` when given), statements evaluated and arrays resolved
    /// element-wise.
    fn value(&mut self, token: &Token, namespace: Option<&str>) -> Token;

    /// Executes statements, leaves everything else mostly as is.
    fn execute_token(&mut self, token: &Token) -> Token;

    fn execute_single(&mut self, statement: &Statement, position: Position) -> Token;

    fn execute_code(&mut self, code: &Code, position: Position, invocation: Invocation) -> Token;

    /// Records that `code` was taken care of without being executed as a
    /// whole.
    fn mark_executed(&mut self, _code: &Code, _position: Position) {}

    fn error(&mut self, position: Position, message: &str) {
        self.report(Diagnostic::error(position, message));
    }

    fn warning(&mut self, position: Position, message: &str) {
        self.report(Diagnostic::warning(position, message));
    }

    /// Runs every statement of `code` inside a new scope and returns the
    /// outcome of the last one. The scope of a file outlives the call.
    fn run_code(&mut self, code: &Code, position: Position, invocation: Invocation) -> Token {
        let previous = self.base().current_namespace_name().to_string();
        if let Some(namespace) = &invocation.namespace {
            self.base_mut().set_current_namespace(namespace);
        }

        let Invocation {
            params,
            mut extra_scope,
            ..
        } = invocation;
        let this = match params {
            Some(params) => params,
            None => extra_scope
                .iter()
                .find(|(name, _)| name.eq_ignore_ascii_case("_this"))
                .map(|(_, value)| value.clone())
                .unwrap_or(Value::Nothing),
        };
        extra_scope.retain(|(name, _)| !name.eq_ignore_ascii_case("_this"));
        extra_scope.push(("_this".to_string(), this));
        self.base_mut().add_scope(extra_scope);

        let mut outcome = Token::new(Value::Nothing, position);
        for token in code.statements() {
            if let Value::Statement(statement) = &token.value {
                let result = self.execute_single(statement, token.position);
                if token.is_base() {
                    outcome = result;
                }
            }
        }

        if !code.is_file() {
            self.base_mut().del_scope();
        }
        self.base_mut().set_current_namespace(&previous);
        outcome
    }

    /// Declares the given names private to the current scope.
    fn add_privates(&mut self, variables: &[Token]) {
        for token in variables {
            let name = match &token.value {
                Value::String(Some(text)) => text.value.clone(),
                Value::Variable(name) => name.clone(),
                value if value.is_unknown() || *value == Value::String(None) => continue,
                other => {
                    self.error(
                        token.position,
                        &format!("`private` argument must be a string (is {})", other.type_name()),
                    );
                    continue;
                }
            };
            if !name.starts_with('_') {
                self.error(
                    token.position,
                    &format!(
                        "Cannot make global variable \"{}\" private (underscore missing?)",
                        name
                    ),
                );
                continue;
            }
            self.base_mut().current_scope_mut().set(&name, Value::Nothing);
        }
    }

    /// Declares the parameters listed in a `params` array.
    fn add_params(&mut self, params: &Token) {
        let items = match params.value.as_array().and_then(|a| a.items()) {
            Some(items) => items.to_vec(),
            None => return,
        };
        for item in &items {
            match &item.value {
                Value::String(Some(text)) if text.value.is_empty() => (),
                Value::String(_) => self.add_privates(std::slice::from_ref(item)),
                Value::Array(array) => match array.items() {
                    Some(elements) if (2..=4).contains(&elements.len()) => {
                        self.add_privates(&elements[..1])
                    }
                    Some(_) => self.error(item.position, "`params` array element have 2-4 elements"),
                    None => (),
                },
                value if value.is_unknown() => (),
                _ => self.error(
                    item.position,
                    "`params` array element must be a string or array",
                ),
            }
        }
    }

    /// Variable a token designates, looking through the statement wrapping
    /// it if any.
    fn get_variable(&self, token: &Token) -> Option<Token> {
        match &token.value {
            Value::Variable(_) => Some(token.clone()),
            Value::Statement(statement) => statement
                .base_tokens()
                .first()
                .filter(|t| matches!(t.value, Value::Variable(_)))
                .map(|t| (*t).clone()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::UI_NAMESPACE;

    #[test]
    fn starts_in_mission_namespace() {
        let base = BaseInterpreter::new();
        assert_eq!(MISSION_NAMESPACE, base.current_namespace_name());
        for name in NAMESPACES.iter() {
            assert!(base.namespace(name).is_some());
        }
    }

    #[test]
    fn scopes_belong_to_the_current_namespace() {
        let mut base = BaseInterpreter::new();
        base.set_current_namespace("uiNamespace");
        base.add_scope(vec![("_a".to_string(), Value::number(1.0))]);
        assert_eq!((1, Value::number(1.0)), base.lookup("_a", None));
        assert_eq!((0, Value::Nothing), base.lookup("_a", Some(MISSION_NAMESPACE)));
        base.get_scope_mut("b", None).set("b", Value::Boolean(None));
        assert_eq!(Value::Boolean(None), base.namespace(UI_NAMESPACE).unwrap().base_scope().get("B"));
        base.del_scope();
        assert_eq!(Value::Nothing, base.get("_a"));
    }

    #[test]
    fn invocation_builder() {
        let invocation = Invocation::new()
            .with_params(Value::Nothing)
            .bind("_x", Value::number(1.0))
            .in_namespace("UINamespace");
        assert_eq!(Some(UI_NAMESPACE.to_string()), invocation.namespace);
        assert_eq!(1, invocation.extra_scope.len());
    }
}
