//! Static analysis of scripts.
//!
//! The [`Analyzer`] is an abstract interpreter: it walks a parsed script
//! statement by statement, tracking the *type* of every variable rather
//! than its value, and reports what it cannot make sense of as
//! [`Diagnostic`]s. Values are computed when every operand is known, which
//! keeps e.g. `select` bounds checks working on literal arrays.
//!
//! Every piece of code is analyzed exactly once, whether or not it would
//! run: all branches of an `if`, every `case` of a `switch`, loop bodies,
//! and code that is only stored in a variable to be called later. The
//! latter is analyzed at the end of the file, in a copy of the state the
//! analyzer was in when the code was first seen.
//!
//! # Example
//!
//! ```
//! use sqflint_core::analyzer::analyze;
//!
//! let diagnostics = analyze("private _y = _z;");
//! assert_eq!(1, diagnostics.len());
//! assert_eq!("[1,13]:warning:Local variable \"_z\" is not from this scope (not private)",
//!            diagnostics[0].to_line());
//! ```

use std::mem;

use fnv::{FnvHashMap, FnvHashSet};

use crate::database::{Database, Expression, Lookup};
use crate::diagnostic::Diagnostic;
use crate::interpreter::{BaseInterpreter, Interpreter, Invocation};
use crate::parser;
use crate::types::{
    Array, Code, EngineType, HelperType, Position, Statement, Token, Value, ValueType,
    MISSION_NAMESPACE,
};

/// Comment directives declaring variables as known to the code that
/// follows, e.g. `//USES_VARIABLES ["_unit"]`.
pub static DEFAULT_PRIVATE_DIRECTIVES: &[&str] = &["IGNORE_PRIVATE_WARNING", "USES_VARIABLES"];

/// Parses and analyzes `source` with the built-in database.
pub fn analyze(source: &str) -> Vec<Diagnostic> {
    let mut analyzer = Analyzer::new();
    analyzer.analyze(source);
    analyzer.into_diagnostics()
}

/// Identity of a piece of code: where it is, what it says and the
/// namespace it runs in.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CodeKey {
    position: Position,
    text: String,
    namespace: String,
}

impl CodeKey {
    fn new(position: Position, code: &Code, namespace: &str) -> Self {
        Self {
            position,
            text: code.to_string(),
            namespace: namespace.to_string(),
        }
    }
}

/// Code seen as a value but not executed yet, with the state it was seen
/// in.
#[derive(Debug, Clone)]
struct UnexecutedCode {
    key: CodeKey,
    code: Code,
    state: BaseInterpreter,
}

pub struct Analyzer<'a> {
    base: BaseInterpreter,
    database: &'a Database,
    private_directives: Vec<String>,
    diagnostics: Vec<Diagnostic>,
    /// `private _x` declarations waiting for their assignment.
    privates: Vec<Token>,
    /// Helper values not consumed by a later operator.
    unevaluated: Vec<Token>,
    unexecuted: Vec<UnexecutedCode>,
    executed: FnvHashSet<CodeKey>,
    defines: FnvHashMap<String, Token>,
    /// Macros being expanded, guarding against self-referencing defines.
    expanding: Vec<String>,
}

impl Default for Analyzer<'static> {
    fn default() -> Self {
        Self::new()
    }
}

impl Analyzer<'static> {
    pub fn new() -> Self {
        Analyzer::with_database(Database::builtin())
    }
}

impl<'a> Analyzer<'a> {
    pub fn with_database(database: &'a Database) -> Self {
        Self {
            base: BaseInterpreter::new(),
            database,
            private_directives: DEFAULT_PRIVATE_DIRECTIVES
                .iter()
                .map(|d| d.to_string())
                .collect(),
            diagnostics: Vec::new(),
            privates: Vec::new(),
            unevaluated: Vec::new(),
            unexecuted: Vec::new(),
            executed: FnvHashSet::default(),
            defines: FnvHashMap::default(),
            expanding: Vec::new(),
        }
    }

    pub fn with_private_directives(mut self, directives: Vec<String>) -> Self {
        self.private_directives = directives;
        self
    }

    /// Analyzer for code found by this one, sharing its database and
    /// settings but starting from `state`.
    fn child(&self, state: BaseInterpreter) -> Analyzer<'a> {
        let mut child = Analyzer::with_database(self.database)
            .with_private_directives(self.private_directives.clone());
        child.base = state;
        child
    }

    /// Parses and analyzes `source`. A parse failure is reported as a
    /// single error.
    pub fn analyze(&mut self, source: &str) {
        match parser::parse_with(source, self.database.grammar()) {
            Ok(code) => self.analyze_code(&code),
            Err(e) => {
                debug!("parsing failed: {}", e);
                self.report(Diagnostic::from(e));
            }
        }
    }

    /// Analyzes a parsed file.
    pub fn analyze_code(&mut self, code: &Code) {
        let invocation = Invocation::new()
            .bind("_this", Value::Nothing)
            .in_namespace(MISSION_NAMESPACE);
        self.execute_code(&code.as_file(), Position::start(), invocation);
        debug!(
            "analysis finished with {} diagnostics",
            self.diagnostics.len()
        );
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    /// Value of a variable as seen from where the analysis ended.
    pub fn variable(&self, name: &str) -> Value {
        self.base.get(name)
    }

    /// Value of a variable of the given namespace.
    pub fn namespace_variable(&self, namespace: &str, name: &str) -> Value {
        self.base.lookup(name, Some(namespace)).1
    }

    fn current_key(&self, position: Position, code: &Code) -> CodeKey {
        CodeKey::new(position, code, self.base.current_namespace_name())
    }

    fn register_unexecuted(&mut self, code: &Code, position: Position) {
        if code.is_undefined() {
            return;
        }
        let key = self.current_key(position, code);
        if self.executed.contains(&key) || self.unexecuted.iter().any(|u| u.key == key) {
            return;
        }
        self.unexecuted.push(UnexecutedCode {
            key,
            code: code.clone(),
            state: self.base.clone(),
        });
    }

    /// Runs what is left at the end of a file, then reports what was
    /// declared or built but never used.
    fn finish_file(&mut self) {
        let pending = mem::take(&mut self.unexecuted);
        if !pending.is_empty() {
            debug!("analyzing {} pieces of unexecuted code", pending.len());
        }
        for unexecuted in pending {
            if !self.executed.insert(unexecuted.key.clone()) {
                continue;
            }
            let mut child = self.child(unexecuted.state);
            child.defines = mem::take(&mut self.defines);
            let invocation = Invocation::new().in_namespace(&unexecuted.key.namespace);
            child.execute_code(
                &unexecuted.code.as_file(),
                unexecuted.key.position,
                invocation,
            );
            self.defines = mem::take(&mut child.defines);
            self.diagnostics.extend(child.diagnostics);
        }

        for private in mem::take(&mut self.privates) {
            self.warning(private.position, "private argument must be a string.");
        }
        for helper in mem::take(&mut self.unevaluated) {
            self.warning(
                helper.position,
                &format!("helper type \"{}\" not evaluated", helper.value),
            );
        }
    }

    fn remove_unevaluated(&mut self, token: &Token) {
        self.unevaluated
            .retain(|t| !(t.position == token.position && t.value == token.value));
    }

    /// Handles `IGNORE_PRIVATE_WARNING`-like comments.
    fn comment_directive(&mut self, comment: &str, position: Position) {
        let body = match comment.get(2..) {
            Some(body) => body,
            None => return,
        };
        let directive = match self
            .private_directives
            .iter()
            .find(|d| body.starts_with(d.as_str()))
        {
            Some(directive) => directive.clone(),
            None => return,
        };
        // the character following the directive name is a separator
        let rest: String = body[directive.len()..].chars().skip(1).collect();
        let array = parser::parse_with(&rest, self.database.grammar())
            .ok()
            .and_then(|code| {
                let statement = code.statements().first()?.value.as_statement()?.clone();
                let first = statement.base_tokens().first().map(|t| (*t).clone())?;
                match first.value {
                    Value::Array(_) => Some(first),
                    _ => None,
                }
            });
        match array {
            Some(array) => {
                let array = self.value(&array, None);
                let names: Vec<Token> = array
                    .value
                    .as_array()
                    .and_then(|a| a.items())
                    .unwrap_or(&[])
                    .iter()
                    .map(|t| Token::new(t.value.clone(), position))
                    .collect();
                self.add_privates(&names);
            }
            None => self.warning(
                position,
                &format!("{0} comment must be `//{0} [\"var1\",...]`", directive),
            ),
        }
    }

    fn define(&mut self, base: &[&Token]) {
        if base.len() < 2 {
            self.error(base[0].position, "#define must have at least one argument");
            return;
        }
        let name = base[1].to_string();
        let body = match base.len() {
            2 => Token::new(Value::Nothing, base[1].position),
            3 => base[2].clone(),
            _ => Token::new(
                Value::Statement(Statement::new(base[3..].iter().map(|t| (*t).clone()).collect())),
                base[3].position,
            ),
        };
        trace!("#define {}", name);
        self.defines.insert(name, body);
    }

    fn include(&mut self, base: &[&Token]) {
        if base.len() != 2 {
            self.error(base[0].position, "#include requires one argument");
        } else if base[1].value.value_type() != Some(ValueType::String) {
            self.error(base[0].position, "#include first argument must be a string");
        }
    }

    fn private(&mut self, base: &[&Token], position: Position) -> Token {
        let mut outcome = Token::new(Value::Nothing, position);
        let rhs = self.execute_token(base[1]);
        match &rhs.value {
            Value::String(_) => self.add_privates(&[rhs.clone()]),
            Value::Array(_) => {
                let array = self.value(&rhs, None);
                let items = array
                    .value
                    .as_array()
                    .and_then(|a| a.items())
                    .map(|items| items.to_vec())
                    .unwrap_or_default();
                self.add_privates(&items);
            }
            Value::Variable(_) => {
                self.add_privates(&[rhs.clone()]);
                outcome = Token::new(
                    Value::helper(HelperType::Private(Some(rhs.clone()))),
                    rhs.position,
                );
                self.privates.push(rhs);
            }
            _ => self.error(base[0].position, "`private` used incorrectly"),
        }
        outcome
    }

    fn assignment(&mut self, statement: &Statement, base: &[&Token], position: Position) -> Token {
        let outcome = Token::new(Value::Nothing, position);
        let lhs = self.execute_token(base[0]);
        let variable = match lhs.value.as_helper() {
            Some(HelperType::Private(Some(variable))) => {
                let variable = variable.clone();
                self.privates
                    .retain(|p| !(p.position == variable.position && p.value == variable.value));
                Some(variable)
            }
            _ => self.get_variable(base[0]),
        };
        let rhs = self.value(base[2], None);

        let variable = match variable {
            Some(variable) => variable,
            None => {
                self.error(
                    base[0].position,
                    "lhs of assignment operator must be a variable",
                );
                return outcome;
            }
        };
        let name = match &variable.value {
            Value::Variable(name) => name.clone(),
            _ => return outcome,
        };

        let scope = self.base.get_scope_mut(&name, None);
        let previous = scope.get(&name);
        let mut stored = rhs.value.type_only();
        // a variable taking different types is of unknown type
        if previous != Value::Nothing && previous.value_type() != stored.value_type() {
            stored = Value::Nothing;
        }
        scope.set(&name, stored);
        if scope.level() == 0 && name.starts_with('_') {
            self.warning(
                variable.position,
                &format!(
                    "Local variable \"{}\" assigned to an outer scope (not private)",
                    name
                ),
            );
        }

        match statement.ending() {
            None => rhs,
            Some(_) => outcome,
        }
    }

    /// Whether the statement looks like the invocation of a macro, e.g.
    /// `LOG("x")`.
    fn is_macro_call(&self, base: &[&Token]) -> bool {
        if base.len() != 2 {
            return false;
        }
        let called = match &base[0].value {
            Value::Variable(name) => {
                !name.starts_with('_') || is_upper(name) || self.defines.contains_key(name)
            }
            Value::Keyword(name) => is_upper(name) || self.defines.contains_key(name),
            _ => false,
        };
        let arguments = base[1]
            .value
            .as_statement()
            .map(|s| s.is_parenthesized())
            .unwrap_or(false);
        called && arguments
    }

    /// Variables injected into the code run by an operator, and the
    /// namespace it runs in.
    fn invocation_for(&self, expression: &Expression, values: &[Token]) -> Invocation {
        let invocation = Invocation::new();
        match expression.keyword().to_lowercase().as_str() {
            "select" | "apply" | "count" => invocation.bind("_x", Value::Nothing),
            "foreach" => invocation
                .bind("_foreachindex", Value::Number(None))
                .bind("_x", Value::Nothing),
            "catch" => invocation.bind("_exception", Value::Engine(EngineType::Object)),
            "spawn" => invocation.bind("_thisscript", Value::Engine(EngineType::Script)),
            "do" => match values[0].value.as_helper() {
                Some(HelperType::For {
                    variable: Some(variable),
                    ..
                }) => invocation.bind(variable, Value::Number(None)),
                Some(HelperType::With(Some(namespace))) => invocation.in_namespace(namespace),
                _ => invocation,
            },
            _ => invocation,
        }
    }

    /// Result of an expression the values only match the shape of.
    fn placeholder(&self, lookup: &Lookup, expression: &Expression, values: &[Token]) -> Value {
        if expression.return_type() == Some(ValueType::For) {
            if let Some(HelperType::For { .. }) = values[0].value.as_helper() {
                return values[0].value.clone();
            }
        }
        match lookup.agreed_return_type() {
            Some(_) => expression.placeholder(),
            None => Value::Nothing,
        }
    }

    fn mismatch_message(&self, lookup: &Lookup, values: &[Token]) -> String {
        let keyword = lookup
            .candidates
            .first()
            .map(|e| e.keyword().to_string())
            .unwrap_or_else(|| values[values.len() - 2].value.to_string());
        if values.len() == 2 {
            let types: Vec<&str> = lookup
                .candidates
                .iter()
                .filter_map(|e| e.rhs_type())
                .map(|t| t.name())
                .collect();
            format!(
                "Unary operator \"{}\" only accepts argument of types [{}] (rhs is {})",
                keyword,
                types.join(","),
                values[1].value.type_name()
            )
        } else {
            let types: Vec<String> = lookup
                .candidates
                .iter()
                .filter_map(|e| Some(format!("({},{})", e.lhs_type()?, e.rhs_type()?)))
                .collect();
            format!(
                "Binary operator \"{}\" arguments must be [{}] (lhs is {}, rhs is {})",
                keyword,
                types.join(","),
                values[0].value.type_name(),
                values[2].value.type_name()
            )
        }
    }

    /// Evaluates a statement that is not a special form.
    fn evaluate(&mut self, statement: &Statement, base: &[&Token]) -> Token {
        let position = base[0].position;
        let mut tokens = Vec::with_capacity(base.len());
        let mut values = Vec::with_capacity(base.len());
        for token in base {
            let executed = self.execute_token(token);
            values.push(self.value(&executed, None));
            tokens.push(executed);
        }

        let database = self.database;
        let lookup = database.lookup(&values);
        let mut outcome = Token::new(Value::Nothing, position);

        if let Some(expression) = lookup.found() {
            outcome.value = if lookup.is_full() {
                expression.execute(&values, self)
            } else {
                self.placeholder(&lookup, expression, &values)
            };

            let namespace = self.base.current_namespace_name().to_string();
            for (operand, value) in expression.operands().iter().zip(&values) {
                if operand.value_type() == Some(ValueType::Code) {
                    if let Value::Code(code) = &value.value {
                        let key = CodeKey::new(value.position, code, &namespace);
                        if !code.is_undefined() && !self.executed.contains(&key) {
                            let invocation = self.invocation_for(expression, &values);
                            self.execute_code(code, value.position, invocation);
                        }
                    }
                }
                if let Value::Helper(_) = value.value {
                    self.remove_unevaluated(value);
                }
            }
        } else if values.len() == 1 {
            if values[0].value.value_type().is_none() {
                self.error(
                    position,
                    &format!(
                        "\"{}\" is syntactically incorrect (missing ;?)",
                        values[0].value
                    ),
                );
            }
            outcome.value = values[0].value.clone();
        } else if let Value::Variable(name) = &base[0].value {
            if name.starts_with('_') {
                self.cannot_interpret(base, &tokens, &lookup, &values);
            }
        } else {
            self.cannot_interpret(base, &tokens, &lookup, &values);
        }

        if let Value::Helper(helper) = &outcome.value {
            let tracked = match **helper {
                HelperType::Switch(_) | HelperType::Private(_) => false,
                _ => true,
            };
            let known = self
                .unevaluated
                .iter()
                .any(|t| t.position == outcome.position && t.value == outcome.value);
            if tracked && !known {
                self.unevaluated.push(outcome.clone());
            }
        }
        if statement.ending().is_some() {
            outcome.value = Value::Nothing;
        }
        outcome
    }

    fn cannot_interpret(
        &mut self,
        base: &[&Token],
        tokens: &[Token],
        lookup: &Lookup,
        values: &[Token],
    ) {
        if !lookup.candidates.is_empty() {
            let message = self.mismatch_message(lookup, values);
            self.error(values[1].position, &message);
        } else {
            let described: Vec<String> = tokens
                .iter()
                .map(|t| format!("<{}({})>", t.value.type_name(), t.value))
                .collect();
            self.error(
                base[base.len() - 1].position,
                &format!(
                    "can't interpret statement (missing ;?): {}",
                    described.join(" ")
                ),
            );
        }
    }
}

impl<'a> Interpreter for Analyzer<'a> {
    fn base(&self) -> &BaseInterpreter {
        &self.base
    }

    fn base_mut(&mut self) -> &mut BaseInterpreter {
        &mut self.base
    }

    fn report(&mut self, diagnostic: Diagnostic) {
        trace!("{}", diagnostic);
        self.diagnostics.push(diagnostic);
    }

    fn value(&mut self, token: &Token, namespace: Option<&str>) -> Token {
        let result = match &token.value {
            Value::Statement(_) => {
                let executed = self.execute_token(token);
                match executed.value {
                    Value::Statement(_) => Token::new(Value::Nothing, token.position),
                    _ => self.value(&executed, namespace),
                }
            }
            Value::Variable(name) => {
                let (level, value) = self.base.lookup(name, namespace);
                if level == 0 && name.starts_with('_') {
                    self.warning(
                        token.position,
                        &format!(
                            "Local variable \"{}\" is not from this scope (not private)",
                            name
                        ),
                    );
                }
                Token::new(value, token.position)
            }
            Value::Array(array) if !array.is_undefined() => {
                let mut items = Vec::with_capacity(array.len());
                for item in array.items().unwrap_or(&[]) {
                    if item.is_base() {
                        items.push(self.value(item, namespace));
                    }
                }
                Token::new(Value::Array(Array::new(items)), token.position)
            }
            Value::Keyword(_) => {
                let values = [token.clone()];
                let database = self.database;
                match database.lookup(&values).full_match {
                    Some(expression) => {
                        Token::new(expression.execute(&values, self), token.position)
                    }
                    None => token.clone(),
                }
            }
            _ => token.clone(),
        };
        if let Value::Code(code) = &result.value {
            self.register_unexecuted(code, result.position);
        }
        result
    }

    fn execute_token(&mut self, token: &Token) -> Token {
        match &token.value {
            Value::Statement(statement) => self.execute_single(statement, token.position),
            Value::Array(array) if !array.is_undefined() => {
                let mut items = Vec::with_capacity(array.len());
                for item in array.items().unwrap_or(&[]) {
                    if item.is_base() {
                        items.push(self.execute_token(item));
                    }
                }
                Token::new(Value::Array(Array::new(items)), token.position)
            }
            Value::Variable(name) | Value::Keyword(name)
                if self.defines.contains_key(name) && !self.expanding.contains(name) =>
            {
                let define = match self.defines.get(name) {
                    Some(define) => define.clone(),
                    None => return token.clone(),
                };
                self.expanding.push(name.clone());
                let result = self.execute_token(&define);
                self.expanding.pop();
                Token::new(result.value, token.position)
            }
            _ => token.clone(),
        }
    }

    fn execute_single(&mut self, statement: &Statement, position: Position) -> Token {
        let outcome = Token::new(Value::Nothing, position);

        for token in statement.tokens() {
            if token.is_base() {
                continue;
            }
            match &token.value {
                Value::Trivia(trivia) => {
                    if trivia.comment_body().is_some() {
                        self.comment_directive(&trivia.to_string(), token.position);
                    }
                }
                Value::Statement(inner) => {
                    for comment in inner.comments() {
                        self.comment_directive(&comment.to_string(), comment.position);
                    }
                }
                _ => (),
            }
        }

        let base = statement.base_tokens();
        if base.is_empty() {
            return outcome;
        }
        let first = &base[0].value;

        if first.is_preprocessor("#define") {
            self.define(&base);
            return outcome;
        }
        if first.is_preprocessor("#include") {
            self.include(&base);
            return outcome;
        }
        if let Value::Preprocessor(_) = first {
            return outcome;
        }
        if base.len() == 2 && first.is_keyword("private") {
            return self.private(&base, position);
        }
        if base.len() == 3 && base[1].value.is_keyword("=") {
            return self.assignment(statement, &base, position);
        }
        if base.len() == 1 {
            match first {
                Value::Variable(_) => return self.execute_token(base[0]),
                Value::Array(array) if !array.is_undefined() => {
                    return self.execute_token(base[0])
                }
                // upper-case words that are not nullary operators are macros
                Value::Keyword(name)
                    if is_upper(name)
                        && self
                            .database
                            .lookup(&[base[0].clone()])
                            .full_match
                            .is_none() =>
                {
                    return base[0].with_value(Value::Variable(name.clone()))
                }
                _ => (),
            }
        }
        if self.is_macro_call(&base) {
            return outcome;
        }

        self.evaluate(statement, &base)
    }

    fn execute_code(&mut self, code: &Code, position: Position, invocation: Invocation) -> Token {
        let key = self.current_key(position, code);
        self.unexecuted.retain(|u| u.key != key);
        self.executed.insert(key);
        trace!("executing code at {}", position);

        let outcome = self.run_code(code, position, invocation);
        if code.is_file() {
            self.finish_file();
        }
        outcome
    }

    fn mark_executed(&mut self, code: &Code, position: Position) {
        let key = self.current_key(position, code);
        self.unexecuted.retain(|u| u.key != key);
        self.executed.insert(key);
    }
}

/// Whether `name` has letters, all of them upper-case.
fn is_upper(name: &str) -> bool {
    name.chars().any(|c| c.is_alphabetic()) && !name.chars().any(|c| c.is_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(source: &str) -> Vec<String> {
        analyze(source).iter().map(|d| d.to_line()).collect()
    }

    #[test]
    fn upper_case_names() {
        assert!(is_upper("LOG"));
        assert!(is_upper("GVAR_1"));
        assert!(!is_upper("Log"));
        assert!(!is_upper("_1"));
    }

    #[test]
    fn private_assignment_is_clean() {
        assert!(lines("private _x = 1; hint str _x;").is_empty());
    }

    #[test]
    fn reading_undeclared_local() {
        assert_eq!(
            vec!["[1,13]:warning:Local variable \"_z\" is not from this scope (not private)"],
            lines("private _y = _z;")
        );
    }

    #[test]
    fn assignment_to_non_variable() {
        let diagnostics = analyze("1 = 2;");
        assert_eq!(1, diagnostics.len());
        assert_eq!(Position::new(1, 1), diagnostics[0].position);
        assert!(diagnostics[0].is_error());
    }

    #[test]
    fn parse_errors_are_single_diagnostics() {
        assert_eq!(
            vec!["[1,5]:error:Parenthesis \"(\" not closed"],
            lines("hint (_x")
        );
    }

    #[test]
    fn defines_expand() {
        assert!(lines("#define ONE 1\nprivate _x = ONE + 1;\nhint str _x").is_empty());
        let diagnostics = analyze("#define\n");
        assert_eq!(1, diagnostics.len());
    }

    #[test]
    fn self_referencing_define_terminates() {
        let _ = analyze("#define A A\nx = A;");
    }

    #[test]
    fn unused_private_declaration() {
        let diagnostics = analyze("private _x;");
        assert_eq!(1, diagnostics.len());
        assert_eq!("private argument must be a string.", diagnostics[0].message);
    }

    #[test]
    fn stored_code_runs_in_its_own_scope() {
        let mut analyzer = Analyzer::new();
        analyzer.analyze("x = {hint str _y};");
        assert_eq!(1, analyzer.diagnostics().len());
        assert_eq!(Value::Code(Code::undefined()), analyzer.variable("x"));
    }

    #[test]
    fn spawn_defines_this_script() {
        let mut analyzer = Analyzer::new();
        analyzer.analyze("[] spawn {x = _thisScript}");
        assert!(analyzer.diagnostics().is_empty());
        assert_eq!(Value::Engine(EngineType::Script), analyzer.variable("x"));
    }

    #[test]
    fn with_changes_namespace() {
        let mut analyzer = Analyzer::new();
        analyzer.analyze("with uiNamespace do {x = 2}");
        assert!(analyzer.diagnostics().is_empty());
        assert_eq!(Value::Number(None), analyzer.namespace_variable("uinamespace", "x"));
        assert_eq!(Value::Nothing, analyzer.variable("x"));
    }
}
