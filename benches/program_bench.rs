use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use std::hint::black_box;

use chicken::{ops::Dialect, parser::parse_program, value::Value, vm::VMOptions};

fn run(program: &[u64], input: &Value, dialect: Dialect) {
    let options = VMOptions::new(dialect, 2097152, 10_000_000);
    black_box(chicken::vm::run(program, input.clone(), options).unwrap());
}

fn criterion_benchmark(c: &mut Criterion) {
    let hello_world = include_str!("programs/hello_world.chn");
    let echo_chars = include_str!("programs/echo_chars.chn");
    let ninety_nine = include_str!("programs/99_chickens.chn");
    let cat = include_str!("programs/cat.chn");

    let tests: Vec<(&str, Vec<u64>, Value, Dialect)> = vec![
        ("hello_world", parse_program(hello_world).unwrap(), Value::from(""), Dialect::Classic),
        ("echo_chars", parse_program(echo_chars).unwrap(), Value::from("Chicken chicken chicken"), Dialect::Compact),
        ("99_chickens", parse_program(ninety_nine).unwrap(), Value::Number(99), Dialect::Classic),
        ("cat", parse_program(cat).unwrap(), Value::from("chicken ".repeat(64)), Dialect::Classic),
    ];

    let mut group = c.benchmark_group("full_program");
    for (name, program, input, dialect) in tests.iter() {
        group.bench_function(BenchmarkId::from_parameter(name), |bencher| {
            bencher.iter(|| run(black_box(program), black_box(input), *dialect));
        });
    }
    group.finish();

    let mut parse_group = c.benchmark_group("parse");
    for (name, source) in [("hello_world", hello_world), ("echo_chars", echo_chars), ("99_chickens", ninety_nine)] {
        parse_group.bench_function(BenchmarkId::from_parameter(name), |bencher| {
            bencher.iter(|| parse_program(black_box(source)).unwrap());
        });
    }
    parse_group.finish();
}

criterion_group!(name = benches; config = Criterion::default(); targets = criterion_benchmark);
criterion_main!(benches);
