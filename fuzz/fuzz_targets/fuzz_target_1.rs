#![no_main]

use libfuzzer_sys::fuzz_target;
use chicken_fuzz::{verify_repro, FuzzInput};

fuzz_target!(|data: FuzzInput| {
    let program = data.counts();
    let dialect = data.dialect();
    let _ = verify_repro(&program, data.input.into(), dialect);
});
