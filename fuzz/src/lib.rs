use arbitrary::Arbitrary;
use chicken::{ops::Dialect, value::Value, vm::{self, RunError, VMOptions}};

/// Repetition counts small enough that every operation shows up often,
/// with the occasional large classic push.
#[derive(Debug, Clone, Copy)]
pub struct ArbitraryCount(pub u64);

impl<'a> Arbitrary<'a> for ArbitraryCount {
    fn arbitrary(u: &mut arbitrary::Unstructured<'a>) -> arbitrary::Result<Self> {
        if u.ratio(1, 16)? {
            Ok(ArbitraryCount(u.int_in_range(10..=300)?))
        } else {
            Ok(ArbitraryCount(u.int_in_range(0..=12)?))
        }
    }
}

#[derive(Arbitrary, Debug, Clone)]
pub enum ArbitraryInput {
    Number(i64),
    Text(String),
}

impl From<ArbitraryInput> for Value {
    fn from(input: ArbitraryInput) -> Self {
        match input {
            ArbitraryInput::Number(n) => Value::Number(n),
            ArbitraryInput::Text(s) => Value::Text(s),
        }
    }
}

#[derive(Arbitrary, Debug)]
pub struct FuzzInput {
    pub program: Vec<ArbitraryCount>,
    pub input: ArbitraryInput,
    pub classic: bool,
}

impl FuzzInput {
    pub fn counts(&self) -> Vec<u64> {
        self.program.iter().map(|c| c.0).collect()
    }

    pub fn dialect(&self) -> Dialect {
        if self.classic { Dialect::Classic } else { Dialect::Compact }
    }
}

/// Run a program twice and check both runs agree.
pub fn verify_repro(program: &[u64], input: Value, dialect: Dialect) -> Result<String, RunError> {
    let options = VMOptions::new(dialect, 1 << 16, 100_000);
    let first = vm::run(program, input.clone(), options.clone());
    let second = vm::run(program, input, options);

    match (&first, &second) {
        (Ok(a), Ok(b)) => {
            assert_eq!(a.output, b.output, "Output mismatch. Program: {:?}", program);
            assert_eq!(a.instruction_counter, b.instruction_counter, "Instruction count mismatch");
            assert_eq!(a.stack_pointer, b.stack_pointer, "Stack pointer mismatch");
        }
        (Err(a), Err(b)) => assert_eq!(a, b, "Error mismatch. Program: {:?}", program),
        _ => panic!("Runs disagree: {:?} vs {:?}", first.as_ref().map(|r| &r.output), second.as_ref().map(|r| &r.output)),
    }
    first.map(|r| r.output)
}
