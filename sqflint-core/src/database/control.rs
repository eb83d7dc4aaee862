//! Control constructs.
//!
//! Multi-keyword constructs are evaluated one operator at a time, each step
//! producing a helper value the next step matches on: `for "_i"` makes a
//! `ForType`, `from 1` refines it, and `do {...}` finally consumes it.

use crate::interpreter::{Interpreter, Invocation};
use crate::types::{Code, HelperType, Position, Token, Value};

use super::Expression;

pub(crate) fn expressions() -> Vec<Expression> {
    use crate::types::ValueType as T;
    vec![
        Expression::unary("while", T::Code, Some(T::While)).constructing(while_),
        Expression::binary(T::While, "do", T::Code, None),
        Expression::unary("for", T::String, Some(T::For)).constructing(for_),
        Expression::binary(T::For, "from", T::Number, Some(T::For)).constructing(for_from),
        Expression::binary(T::For, "to", T::Number, Some(T::For)).constructing(for_to),
        Expression::binary(T::For, "step", T::Number, Some(T::For)).constructing(for_step),
        Expression::binary(T::For, "do", T::Code, None),
        Expression::unary("for", T::Array, Some(T::ForSpec)).interpreting(for_spec),
        Expression::binary(T::ForSpec, "do", T::Code, None).interpreting(for_spec_do),
        Expression::binary(T::Code, "forEach", T::Array, None),
        Expression::unary("switch", T::Anything, Some(T::Switch)).constructing(switch),
        Expression::unary("case", T::Anything, Some(T::Switch)).constructing(switch),
        Expression::binary(T::Switch, "do", T::Code, None).interpreting(switch_do),
        Expression::binary(T::Switch, ":", T::Code, None),
        Expression::unary("default", T::Code, None),
        Expression::unary("if", T::Boolean, Some(T::If)).constructing(if_),
        Expression::binary(T::Code, "else", T::Code, Some(T::Else)).constructing(else_),
        Expression::binary(T::If, "then", T::Code, None),
        Expression::binary(T::If, "then", T::Else, None),
        Expression::binary(T::If, "then", T::Array, None).interpreting(if_then_array),
        Expression::binary(T::If, "exitWith", T::Code, None),
        Expression::binary(T::If, "throw", T::Anything, None),
        Expression::unary("try", T::Code, Some(T::Try)).constructing(try_),
        Expression::binary(T::Try, "catch", T::Code, None),
        Expression::unary("with", T::Namespace, Some(T::With)).constructing(with),
        Expression::binary(T::With, "do", T::Code, None),
        Expression::unary("call", T::Code, None).interpreting(call),
        Expression::binary(T::Anything, "call", T::Code, None).interpreting(call_with_params),
        Expression::unary("params", T::Array, Some(T::Boolean)).interpreting(params),
        Expression::binary(T::Anything, "params", T::Array, Some(T::Boolean))
            .interpreting(params_of),
    ]
}

fn defined_code(token: &Token) -> Option<&Code> {
    token.value.as_code().filter(|code| !code.is_undefined())
}

fn while_(values: &[Token]) -> Option<Value> {
    let condition = defined_code(&values[1]).cloned();
    Some(Value::helper(HelperType::While(condition)))
}

fn for_(values: &[Token]) -> Option<Value> {
    Some(Value::helper(HelperType::For {
        variable: values[1].value.as_str().map(|s| s.to_string()),
        from: None,
        to: None,
        step: None,
    }))
}

/// Copy of the `for` helper on the left with one more stage filled in.
fn for_stage(values: &[Token], set: fn(&mut HelperType, Value)) -> Option<Value> {
    let mut helper = values[0].value.as_helper()?.clone();
    set(&mut helper, values[2].value.clone());
    Some(Value::helper(helper))
}

fn for_from(values: &[Token]) -> Option<Value> {
    for_stage(values, |helper, value| {
        if let HelperType::For { from, .. } = helper {
            *from = Some(value);
        }
    })
}

fn for_to(values: &[Token]) -> Option<Value> {
    for_stage(values, |helper, value| {
        if let HelperType::For { to, .. } = helper {
            *to = Some(value);
        }
    })
}

fn for_step(values: &[Token]) -> Option<Value> {
    for_stage(values, |helper, value| {
        if let HelperType::For { step, .. } = helper {
            *step = Some(value);
        }
    })
}

fn for_spec(values: &[Token], interpreter: &mut dyn Interpreter) -> Option<Value> {
    let array = values[1].value.as_array()?;
    let items = array.items()?;
    if items.len() != 3 {
        interpreter.error(
            values[1].position,
            &format!(
                "for-then array must contain 3 elements (contains {})",
                items.len()
            ),
        );
        return None;
    }
    Some(Value::helper(HelperType::ForSpec(Some(array.clone()))))
}

fn for_spec_do(values: &[Token], interpreter: &mut dyn Interpreter) -> Option<Value> {
    if let Some(HelperType::ForSpec(Some(array))) = values[0].value.as_helper() {
        for item in array.items().unwrap_or(&[]) {
            if let Some(code) = defined_code(item) {
                interpreter.execute_code(code, item.position, Invocation::new());
            }
        }
    }
    None
}

fn switch(values: &[Token]) -> Option<Value> {
    Some(Value::helper(HelperType::Switch(Some(
        values[1].value.clone(),
    ))))
}

/// Whether `token` is a variable, possibly surrounded by trivia.
fn names_variable(token: &Token) -> bool {
    match &token.value {
        Value::Variable(_) => true,
        Value::Statement(statement) => match statement.base_tokens().as_slice() {
            [only] => names_variable(only),
            _ => false,
        },
        _ => false,
    }
}

/// Collects the bodies of the cases of a switch, reporting malformed
/// entries. Cases falling through to the next one have no body.
fn parse_switch(interpreter: &mut dyn Interpreter, code: &Code, position: Position) -> Vec<Token> {
    let mut bodies = Vec::new();
    let mut default_used = false;

    for token in code.statements() {
        let statement = match &token.value {
            Value::Statement(statement) if token.is_base() => statement,
            _ => continue,
        };
        let base_tokens = statement.base_tokens();
        if base_tokens.is_empty() {
            continue;
        }
        let mut values: Vec<Token> = base_tokens
            .iter()
            .map(|t| interpreter.value(t, None))
            .collect();

        if values.len() == 2 && values[0].value.is_keyword("case") {
            let helper = HelperType::Switch(Some(values[1].value.clone()));
            values = vec![values[0].with_value(Value::helper(helper))];
        }

        if values[0].value.is_keyword("default") {
            if default_used {
                interpreter.error(position, "Switch code contains more than 1 `default`");
            }
            default_used = true;
            if values.len() == 2 {
                let body = &values[1];
                let stored = body.value.is_unknown() && names_variable(base_tokens[1]);
                if body.value.as_code().is_some() || stored {
                    bodies.push(body.clone());
                } else {
                    interpreter.error(
                        base_tokens[1].position,
                        "\"default\" 2nd argument must be code",
                    );
                }
            } else {
                interpreter.error(token.position, "\"default\" must contain 2 clauses");
            }
        } else if let Some(HelperType::Switch(_)) = values[0].value.as_helper() {
            match values.len() {
                1 => (),
                3 if values[1].value.is_keyword(":") => bodies.push(values[2].clone()),
                3 => interpreter.error(
                    base_tokens[1].position,
                    "\"case\" second argument must be \":\"",
                ),
                _ => interpreter.error(token.position, "\"case\" must be a 2 or 4 statement"),
            }
        } else if values[0].value.is_keyword("case") {
            interpreter.error(
                token.position,
                "keyword \"case\" must be followed by an argument",
            );
        } else {
            interpreter.error(
                token.position,
                "Switch code can only start with \"case\" or \"default\"",
            );
        }
    }
    bodies
}

/// Every case body is analyzed, not only the one that would run.
fn switch_do(values: &[Token], interpreter: &mut dyn Interpreter) -> Option<Value> {
    let code = defined_code(&values[2])?;
    interpreter.mark_executed(code, values[2].position);
    let bodies = parse_switch(interpreter, code, values[2].position);
    for body in bodies {
        match defined_code(&body) {
            Some(code) => {
                interpreter.execute_code(code, body.position, Invocation::new());
            }
            None if body.value.as_code().is_none() && !body.value.is_unknown() => {
                interpreter.error(body.position, "\"case\" 3rd argument must be code")
            }
            None => (),
        }
    }
    None
}

fn if_(values: &[Token]) -> Option<Value> {
    Some(Value::helper(HelperType::If(Some(values[1].value.clone()))))
}

fn else_(values: &[Token]) -> Option<Value> {
    Some(Value::helper(HelperType::Else {
        then: defined_code(&values[0]).cloned(),
        otherwise: defined_code(&values[2]).cloned(),
    }))
}

fn if_then_array(values: &[Token], interpreter: &mut dyn Interpreter) -> Option<Value> {
    let items = values[2].value.as_array()?.items()?;
    for item in items {
        if let Some(code) = defined_code(item) {
            interpreter.execute_code(code, item.position, Invocation::new());
        }
    }
    None
}

fn try_(values: &[Token]) -> Option<Value> {
    Some(Value::helper(HelperType::Try(defined_code(&values[1]).cloned())))
}

fn with(values: &[Token]) -> Option<Value> {
    let namespace = match &values[1].value {
        Value::Namespace(name) => name.as_ref().map(|n| n.to_lowercase()),
        _ => None,
    };
    Some(Value::helper(HelperType::With(namespace)))
}

fn call(values: &[Token], interpreter: &mut dyn Interpreter) -> Option<Value> {
    let code = defined_code(&values[1])?;
    interpreter.execute_code(code, values[1].position, Invocation::new());
    None
}

fn call_with_params(values: &[Token], interpreter: &mut dyn Interpreter) -> Option<Value> {
    let code = defined_code(&values[2])?;
    let invocation = Invocation::new().with_params(values[0].value.clone());
    interpreter.execute_code(code, values[2].position, invocation);
    None
}

fn params(values: &[Token], interpreter: &mut dyn Interpreter) -> Option<Value> {
    interpreter.add_params(&values[1]);
    None
}

fn params_of(values: &[Token], interpreter: &mut dyn Interpreter) -> Option<Value> {
    interpreter.add_params(&values[2]);
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(value: Value) -> Token {
        Token::from(value)
    }

    #[test]
    fn for_stages_accumulate() {
        let start = for_(&[token(Value::keyword("for")), token(Value::string("_i"))]).unwrap();
        let from = for_from(&[
            token(start),
            token(Value::keyword("from")),
            token(Value::number(1.0)),
        ])
        .unwrap();
        let to = for_to(&[
            token(from),
            token(Value::keyword("to")),
            token(Value::Number(None)),
        ])
        .unwrap();
        let helper = to.as_helper().unwrap();
        assert_eq!(Some("_i"), helper.for_variable());
        assert_eq!("ForFromToStepType", helper.name());
    }

    #[test]
    fn else_keeps_both_branches() {
        let branch = Value::Code(crate::types::Code::new(vec![]));
        let value = else_(&[
            token(branch.clone()),
            token(Value::keyword("else")),
            token(Value::Code(crate::types::Code::undefined())),
        ])
        .unwrap();
        match value.as_helper() {
            Some(HelperType::Else { then, otherwise }) => {
                assert!(then.is_some());
                assert!(otherwise.is_none());
            }
            other => panic!("unexpected helper {:?}", other),
        }
    }

    #[test]
    fn with_lowercases_namespace() {
        let value = with(&[
            token(Value::keyword("with")),
            token(Value::Namespace(Some("uiNamespace".to_string()))),
        ])
        .unwrap();
        assert_eq!(
            Some(&HelperType::With(Some("uinamespace".to_string()))),
            value.as_helper()
        );
    }
}
