#![no_main]

use libfuzzer_sys::fuzz_target;
use chicken::{ops::Dialect, parser::parse_program, value::Value};
use chicken_fuzz::verify_repro;

// Raw source text: the parser must never panic, and whatever it accepts must run.
fuzz_target!(|data: (&str, &str)| {
    let (source, input) = data;
    if let Ok(program) = parse_program(source) {
        let _ = verify_repro(&program, Value::from_input(input), Dialect::Compact);
        let _ = verify_repro(&program, Value::from_input(input), Dialect::Classic);
    }
});
