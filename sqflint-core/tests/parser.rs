use sqflint_core::parser::{parse, ParseErrorKind};
use sqflint_core::{Position, Token, Value};

const MISSION_SCRIPT: &str = r#"// init.sqf
#include "macros.hpp"
#define TIMEOUT 30

private _units = allPlayers select {alive _x};
if (count _units > 0) then {
    {
        _x setVariable ["ready", true, true];
    } forEach _units;
} else {
    /* nobody there yet */
    [] spawn {sleep TIMEOUT; hint "waiting"};
};

switch (side player) do {
    case west: {hint 'blue'};
    default {hint "other"};
};
"#;

#[test]
fn round_trips_a_mission_script() {
    let code = parse(MISSION_SCRIPT).unwrap();
    assert_eq!(MISSION_SCRIPT, code.to_string());
    assert!(code.is_file());
}

/// Position of the first token carrying a value.
fn first_leaf(token: &Token) -> Option<Position> {
    match &token.value {
        Value::Statement(statement) => first_leaf(statement.base_tokens().first()?),
        _ => Some(token.position),
    }
}

#[test]
fn statements_are_positioned() {
    let code = parse("a = 1;\n  b = 2;").unwrap();
    let positions: Vec<Position> = code
        .statements()
        .iter()
        .filter(|t| t.is_base())
        .filter_map(first_leaf)
        .collect();
    assert_eq!(vec![Position::new(1, 1), Position::new(2, 3)], positions);
}

#[test]
fn keywords_and_variables() {
    let code = parse("hint str _x").unwrap();
    let statement = code.statements()[0].value.as_statement().unwrap();
    let base = statement.base_tokens();
    assert!(base[0].value.is_keyword("HINT"));
    match &base[1].value {
        Value::Statement(inner) => {
            let inner = inner.base_tokens();
            assert!(inner[0].value.is_keyword("str"));
            assert_eq!("_x", inner[1].to_string().trim());
            assert_eq!(Some(Position::new(1, 10)), first_leaf(inner[1]));
        }
        other => panic!("unexpected token {:?}", other),
    }
}

#[test]
fn unclosed_string() {
    let err = parse("hint \"abc").unwrap_err();
    assert_eq!("String is not closed", err.message());
    match err.kind() {
        ParseErrorKind::Syntax(_) => (),
        other => panic!("unexpected error kind {:?}", other),
    }
}

#[test]
fn unclosed_brackets() {
    for source in ["x = [1, 2", "x = {hint 1", "x = (1 + 2"].iter() {
        let err = parse(source).unwrap_err();
        match err.kind() {
            ParseErrorKind::Parenthesis(_) => (),
            other => panic!("unexpected error kind {:?} for {}", other, source),
        }
    }
}
