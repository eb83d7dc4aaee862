use criterion::{black_box, criterion_group, criterion_main, Criterion};
use sqflint_core::analyzer::Analyzer;
use sqflint_core::{parse, Database};

const SCRIPT: &str = r#"
#define TIMEOUT 30
private _units = allPlayers select {alive _x};
private _count = 0;
{
    private _unit = _x;
    if (_unit getVariable ["ready", false]) then {
        _count = _count + 1;
    } else {
        [_unit] spawn {params ["_unit"]; sleep TIMEOUT; hint str _unit};
    };
} forEach _units;
for "_i" from 0 to (_count - 1) do {
    switch (_i % 3) do {
        case 0: {diag_log format ["%1", _i]};
        default {hint "other"};
    };
};
"#;

criterion_group!(analyze, parse_script, analyze_script, builtin_database);
criterion_main!(analyze);

fn source() -> String {
    SCRIPT.repeat(20)
}

fn parse_script(c: &mut Criterion) {
    let source = source();
    c.bench_function("parse_script", |b| {
        b.iter(|| black_box(parse(&source).unwrap()))
    });
}

fn analyze_script(c: &mut Criterion) {
    let code = parse(&source()).unwrap();
    c.bench_function("analyze_script", |b| {
        b.iter(|| {
            let mut analyzer = Analyzer::new();
            analyzer.analyze_code(&code);
            black_box(analyzer.into_diagnostics())
        })
    });
}

fn builtin_database(c: &mut Criterion) {
    let expressions = Database::builtin().expressions().to_vec();
    c.bench_function("build_database", |b| {
        b.iter(|| black_box(Database::new(expressions.clone())))
    });
}
