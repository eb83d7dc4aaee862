//! Operators on plain data: arithmetic, comparison and logic, array and
//! string handling, namespace variables.

use crate::interpreter::Interpreter;
use crate::types::{Array, Text, Token, Value};

use super::Expression;

pub(crate) fn expressions() -> Vec<Expression> {
    use crate::types::ValueType as T;

    let mut expressions = vec![
        Expression::unary("-", T::Number, Some(T::Number)).computing(negate),
        Expression::unary("+", T::Number, Some(T::Number)).computing(identity),
        Expression::unary("floor", T::Number, Some(T::Number)).computing(floor),
        Expression::unary("!", T::Boolean, Some(T::Boolean)).computing(not),
        Expression::unary("not", T::Boolean, Some(T::Boolean)).computing(not),
        // arrays
        Expression::unary("count", T::Array, Some(T::Number)).computing(count),
        Expression::binary(T::Code, "count", T::Array, Some(T::Number)),
        Expression::unary("reverse", T::Array, None),
        Expression::binary(T::Array, "set", T::Array, None),
        Expression::binary(T::Array, "resize", T::Number, None),
        Expression::binary(T::Array, "append", T::Array, None),
        Expression::binary(T::Array, "pushBack", T::Anything, Some(T::Number))
            .computing(push_back),
        Expression::binary(T::Array, "pushBackUnique", T::Anything, Some(T::Number))
            .computing(push_back_unique),
        Expression::binary(T::Anything, "in", T::Array, Some(T::Boolean)).computing(is_in),
        Expression::binary(T::Array, "find", T::Anything, Some(T::Number)).computing(find),
        Expression::binary(T::String, "find", T::String, Some(T::Number))
            .computing(find_string),
        Expression::binary(T::Array, "select", T::Number, None).interpreting(select),
        Expression::binary(T::Array, "select", T::Boolean, None).interpreting(select),
        Expression::binary(T::Array, "select", T::Array, Some(T::Array))
            .interpreting(select_range),
        Expression::binary(T::Array, "select", T::Code, Some(T::Array)),
        Expression::binary(T::Array, "apply", T::Code, Some(T::Array)),
        Expression::binary(T::Array, "+", T::Array, Some(T::Array)).computing(concat),
        Expression::binary(T::Array, "-", T::Array, Some(T::Array)).computing(difference),
        // strings
        Expression::binary(T::String, "+", T::String, Some(T::String))
            .computing(concat_strings),
        Expression::unary("toArray", T::String, Some(T::Array)).computing(to_array),
        Expression::unary("toString", T::Array, Some(T::String)).computing(to_string),
        // namespaces
        Expression::binary(T::Namespace, "setVariable", T::Array, None)
            .interpreting(set_variable),
        Expression::binary(T::Namespace, "getVariable", T::String, Some(T::Anything))
            .interpreting(get_variable),
        Expression::binary(T::Namespace, "getVariable", T::Array, Some(T::Anything))
            .interpreting(get_variable_or_default),
    ];

    let arithmetic = ["+", "-", "*", "/", "%", "mod", "^", "max", "min", "atan2"];
    for name in arithmetic.iter() {
        expressions.push(
            Expression::binary(T::Number, name, T::Number, Some(T::Number))
                .computing(arithmetic_action(name)),
        );
    }
    for name in ["==", "!=", "<", ">", "<=", ">="].iter() {
        expressions.push(
            Expression::binary(T::Number, name, T::Number, Some(T::Boolean))
                .computing(comparison_action(name)),
        );
    }
    for name in ["==", "!="].iter() {
        expressions.push(
            Expression::binary(T::String, name, T::String, Some(T::Boolean))
                .computing(comparison_action(name)),
        );
    }
    for name in ["&&", "and", "||", "or"].iter() {
        expressions.push(
            Expression::binary(T::Boolean, name, T::Boolean, Some(T::Boolean))
                .computing(logical_action(name)),
        );
        // lazy evaluation of the right hand side
        expressions.push(Expression::binary(T::Boolean, name, T::Code, Some(T::Boolean)));
    }
    expressions
}

fn number(token: &Token) -> Option<f64> {
    token.value.as_number()
}

fn numbers(values: &[Token]) -> Option<(f64, f64)> {
    Some((number(&values[0])?, number(&values[2])?))
}

fn arithmetic_action(name: &str) -> fn(&[Token]) -> Option<Value> {
    match name {
        "+" => |v| numbers(v).map(|(a, b)| Value::number(a + b)),
        "-" => |v| numbers(v).map(|(a, b)| Value::number(a - b)),
        "*" => |v| numbers(v).map(|(a, b)| Value::number(a * b)),
        "/" => |v| numbers(v).filter(|(_, b)| *b != 0.0).map(|(a, b)| Value::number(a / b)),
        "%" | "mod" => |v| {
            numbers(v)
                .filter(|(_, b)| *b != 0.0)
                .map(|(a, b)| Value::number(a % b))
        },
        "^" => |v| numbers(v).map(|(a, b)| Value::number(a.powf(b))),
        "max" => |v| numbers(v).map(|(a, b)| Value::number(a.max(b))),
        "min" => |v| numbers(v).map(|(a, b)| Value::number(a.min(b))),
        "atan2" => |v| numbers(v).map(|(a, b)| Value::number(a.atan2(b).to_degrees())),
        _ => |_| None,
    }
}

fn comparison_action(name: &str) -> fn(&[Token]) -> Option<Value> {
    match name {
        "==" => |v| equal(&v[0].value, &v[2].value).map(|e| Value::Boolean(Some(e))),
        "!=" => |v| equal(&v[0].value, &v[2].value).map(|e| Value::Boolean(Some(!e))),
        "<" => |v| numbers(v).map(|(a, b)| Value::Boolean(Some(a < b))),
        ">" => |v| numbers(v).map(|(a, b)| Value::Boolean(Some(a > b))),
        "<=" => |v| numbers(v).map(|(a, b)| Value::Boolean(Some(a <= b))),
        ">=" => |v| numbers(v).map(|(a, b)| Value::Boolean(Some(a >= b))),
        _ => |_| None,
    }
}

/// `==` on numbers, and on strings ignoring case.
fn equal(lhs: &Value, rhs: &Value) -> Option<bool> {
    match (lhs, rhs) {
        (Value::Number(Some(a)), Value::Number(Some(b))) => Some(a.value() == b.value()),
        (Value::String(Some(a)), Value::String(Some(b))) => {
            Some(a.value.to_lowercase() == b.value.to_lowercase())
        }
        _ => None,
    }
}

fn logical_action(name: &str) -> fn(&[Token]) -> Option<Value> {
    match name {
        "&&" | "and" => |v| {
            let (a, b) = (v[0].value.as_bool()?, v[2].value.as_bool()?);
            Some(Value::Boolean(Some(a && b)))
        },
        "||" | "or" => |v| {
            let (a, b) = (v[0].value.as_bool()?, v[2].value.as_bool()?);
            Some(Value::Boolean(Some(a || b)))
        },
        _ => |_| None,
    }
}

fn negate(values: &[Token]) -> Option<Value> {
    number(&values[1]).map(|n| Value::number(-n))
}

fn identity(values: &[Token]) -> Option<Value> {
    number(&values[1]).map(Value::number)
}

fn floor(values: &[Token]) -> Option<Value> {
    number(&values[1]).map(|n| Value::number(n.floor()))
}

fn not(values: &[Token]) -> Option<Value> {
    values[1].value.as_bool().map(|b| Value::Boolean(Some(!b)))
}

fn items(token: &Token) -> Option<&[Token]> {
    token.value.as_array()?.items()
}

fn count(values: &[Token]) -> Option<Value> {
    items(&values[1]).map(|items| Value::number(items.len() as f64))
}

/// Index the pushed element would get.
fn push_back(values: &[Token]) -> Option<Value> {
    items(&values[0]).map(|items| Value::number(items.len() as f64))
}

fn push_back_unique(values: &[Token]) -> Option<Value> {
    let items = items(&values[0])?;
    if items.iter().any(|item| item.value == values[2].value) {
        Some(Value::number(-1.0))
    } else {
        Some(Value::number(items.len() as f64))
    }
}

fn is_in(values: &[Token]) -> Option<Value> {
    let items = items(&values[2])?;
    Some(Value::Boolean(Some(
        items.iter().any(|item| item.value == values[0].value),
    )))
}

fn find(values: &[Token]) -> Option<Value> {
    let items = items(&values[0])?;
    let index = items
        .iter()
        .position(|item| item.value == values[2].value)
        .map(|n| n as f64)
        .unwrap_or(-1.0);
    Some(Value::number(index))
}

fn find_string(values: &[Token]) -> Option<Value> {
    let haystack = values[0].value.as_str()?;
    let needle = values[2].value.as_str()?;
    let index = haystack
        .find(needle)
        .map(|byte| haystack[..byte].chars().count() as f64)
        .unwrap_or(-1.0);
    Some(Value::number(index))
}

/// Numeric index of a `select`, booleans counting as 0 and 1.
fn index(token: &Token) -> Option<i64> {
    match &token.value {
        Value::Number(Some(n)) => Some(n.value().round() as i64),
        Value::Boolean(Some(b)) => Some(*b as i64),
        _ => None,
    }
}

fn select(values: &[Token], interpreter: &mut dyn Interpreter) -> Option<Value> {
    let items = items(&values[0])?;
    let index = index(&values[2])?;
    if index < 0 || index as usize >= items.len() {
        interpreter.error(
            values[0].position,
            &format!(
                "selecting element {} of array of size {}",
                index,
                items.len()
            ),
        );
        return None;
    }
    Some(items[index as usize].value.clone())
}

fn select_range(values: &[Token], interpreter: &mut dyn Interpreter) -> Option<Value> {
    let items = items(&values[0])?;
    let range = items_of_numbers(&values[2])?;
    let (start, count) = match range.as_slice() {
        [start] => (*start, items.len() as f64),
        [start, count, ..] => (*start, *count),
        _ => return None,
    };
    let start = start.round().max(0.0) as usize;
    if start > items.len() {
        interpreter.error(values[0].position, "Selecting element past size");
        return None;
    }
    // float to int casts saturate, NaN becomes 0
    let end = start
        .saturating_add(count.round().max(0.0) as usize)
        .min(items.len());
    Some(Value::Array(Array::new(items[start..end].to_vec())))
}

fn items_of_numbers(token: &Token) -> Option<Vec<f64>> {
    items(token)?.iter().map(number).collect()
}

fn concat(values: &[Token]) -> Option<Value> {
    let mut result = items(&values[0])?.to_vec();
    result.extend_from_slice(items(&values[2])?);
    Some(Value::Array(Array::new(result)))
}

fn difference(values: &[Token]) -> Option<Value> {
    let removed = items(&values[2])?;
    let result = items(&values[0])?
        .iter()
        .filter(|item| !removed.contains(item))
        .cloned()
        .collect();
    Some(Value::Array(Array::new(result)))
}

fn concat_strings(values: &[Token]) -> Option<Value> {
    match (&values[0].value, &values[2].value) {
        (Value::String(Some(a)), Value::String(Some(b))) => Some(Value::String(Some(Text {
            value: format!("{}{}", a.value, b.value),
            quote: a.quote,
        }))),
        _ => None,
    }
}

fn to_array(values: &[Token]) -> Option<Value> {
    let text = values[1].value.as_str()?;
    let codes = text
        .chars()
        .map(|c| Token::from(Value::number(c as u32 as f64)))
        .collect();
    Some(Value::Array(Array::new(codes)))
}

fn to_string(values: &[Token]) -> Option<Value> {
    let text = items_of_numbers(&values[1])?
        .into_iter()
        .map(|n| std::char::from_u32(n as u32))
        .collect::<Option<String>>()?;
    Some(Value::string(&text))
}

fn namespace_name(token: &Token) -> Option<&str> {
    match &token.value {
        Value::Namespace(Some(name)) => Some(name),
        _ => None,
    }
}

fn set_variable(values: &[Token], interpreter: &mut dyn Interpreter) -> Option<Value> {
    let namespace = namespace_name(&values[0])?.to_string();
    let items = items(&values[2])?;
    if items.len() < 2 || items.len() > 3 {
        interpreter.error(
            values[2].position,
            &format!(
                "setVariable requires array of 2-3 elements (has {})",
                items.len()
            ),
        );
        return None;
    }
    let name = match &items[0].value {
        Value::String(Some(text)) => text.value.clone(),
        value if value.is_unknown() || *value == Value::String(None) => return None,
        other => {
            interpreter.error(
                items[0].position,
                &format!(
                    "setVariable array first element must be a string (is {})",
                    other.type_name()
                ),
            );
            return None;
        }
    };
    interpreter
        .base_mut()
        .get_scope_mut(&name, Some(&namespace))
        .set(&name, items[1].value.type_only());
    None
}

fn get_variable(values: &[Token], interpreter: &mut dyn Interpreter) -> Option<Value> {
    let namespace = namespace_name(&values[0])?.to_string();
    let name = values[2].value.as_str()?.to_string();
    let variable = values[2].with_value(Value::Variable(name));
    Some(interpreter.value(&variable, Some(&namespace)).value)
}

fn get_variable_or_default(values: &[Token], interpreter: &mut dyn Interpreter) -> Option<Value> {
    let items = items(&values[2])?;
    if items.len() != 2 {
        interpreter.error(
            values[2].position,
            &format!(
                "getVariable requires array of 2 elements (has {})",
                items.len()
            ),
        );
        return None;
    }
    let name = match &items[0].value {
        Value::String(Some(text)) => text.value.clone(),
        value if value.is_unknown() || *value == Value::String(None) => return None,
        other => {
            interpreter.error(
                items[0].position,
                &format!(
                    "getVariable array first element must be a string (is {})",
                    other.type_name()
                ),
            );
            return None;
        }
    };
    let namespace = namespace_name(&values[0])?.to_string();
    let variable = items[0].with_value(Value::Variable(name));
    match interpreter.value(&variable, Some(&namespace)).value {
        Value::Nothing => Some(items[1].value.clone()),
        value => Some(value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn binary(lhs: Value, rhs: Value) -> Vec<Token> {
        vec![
            Token::from(lhs),
            Token::from(Value::keyword("op")),
            Token::from(rhs),
        ]
    }

    fn array(values: Vec<Value>) -> Value {
        Value::Array(Array::new(values.into_iter().map(Token::from).collect()))
    }

    #[test]
    fn arithmetic() {
        let values = binary(Value::number(7.0), Value::number(2.0));
        assert_eq!(Some(Value::number(9.0)), arithmetic_action("+")(&values));
        assert_eq!(Some(Value::number(3.5)), arithmetic_action("/")(&values));
        assert_eq!(Some(Value::number(1.0)), arithmetic_action("mod")(&values));
        assert_eq!(Some(Value::number(49.0)), arithmetic_action("^")(&values));
        let zero = binary(Value::number(7.0), Value::number(0.0));
        assert_eq!(None, arithmetic_action("/")(&zero));
    }

    #[test]
    fn greater_than_compares_properly() {
        let values = binary(Value::number(3.0), Value::number(2.0));
        assert_eq!(
            Some(Value::Boolean(Some(true))),
            comparison_action(">")(&values)
        );
        assert_eq!(
            Some(Value::Boolean(Some(false))),
            comparison_action("<")(&values)
        );
    }

    #[test]
    fn strings_compare_ignoring_case() {
        let values = binary(Value::string("Gunner"), Value::string("GUNNER"));
        assert_eq!(
            Some(Value::Boolean(Some(true))),
            comparison_action("==")(&values)
        );
    }

    #[test]
    fn array_operations() {
        let values = binary(
            array(vec![Value::number(1.0), Value::number(2.0)]),
            array(vec![Value::number(2.0)]),
        );
        assert_eq!(Some(array(vec![Value::number(1.0)])), difference(&values));
        assert_eq!(
            Some(array(vec![
                Value::number(1.0),
                Value::number(2.0),
                Value::number(2.0)
            ])),
            concat(&values)
        );
        let values = binary(
            array(vec![Value::number(1.0), Value::number(2.0)]),
            Value::number(2.0),
        );
        assert_eq!(Some(Value::number(1.0)), find(&values));
        assert_eq!(Some(Value::number(-1.0)), push_back_unique(&values));
        assert_eq!(Some(Value::number(2.0)), push_back(&values));
    }

    #[test]
    fn select_range_clamps_count() {
        let mut analyzer = crate::analyzer::Analyzer::new();
        let items = array(vec![Value::number(1.0), Value::number(2.0)]);
        let range = |start: f64, count: f64| {
            binary(
                items.clone(),
                array(vec![Value::number(start), Value::number(count)]),
            )
        };
        assert_eq!(
            Some(array(vec![Value::number(2.0)])),
            select_range(&range(1.0, 1e30), &mut analyzer)
        );
        assert_eq!(
            Some(array(vec![])),
            select_range(&range(0.0, -3.0), &mut analyzer)
        );
        assert_eq!(
            Some(array(vec![])),
            select_range(&range(1.0, f64::NAN), &mut analyzer)
        );
        assert_eq!(None, select_range(&range(1e30, 1.0), &mut analyzer));
        assert_eq!(1, analyzer.diagnostics().len());
    }

    #[test]
    fn string_conversions() {
        let values = vec![Token::from(Value::keyword("toArray")), Token::from(Value::string("ab"))];
        let codes = to_array(&values).unwrap();
        assert_eq!(array(vec![Value::number(97.0), Value::number(98.0)]), codes);
        let values = vec![Token::from(Value::keyword("toString")), Token::from(codes)];
        assert_eq!(Some(Value::string("ab")), to_string(&values));
    }
}
