//! Functions for executing Chicken programs.
//!
//! A run owns one flat memory region. Cell 0 refers to the region itself,
//! cell 1 holds the input, the opcode slots follow from cell 2 and the stack
//! grows upwards from the cell after the last slot. Instructions may read and
//! overwrite any of it, code included.
use thiserror::Error;

use crate::{
    config::{get_config, ChickenConfig},
    format::{format_char, format_reference},
    ops::{Dialect, Op, KEYWORD},
    value::{Value, FALSE, NAN, UNDEFINED},
};


/// Memory cell holding the reference to memory itself.
pub const SELF_CELL: usize = 0;
/// Memory cell holding the program input.
pub const INPUT_CELL: usize = 1;
/// Memory cell of the first opcode slot.
pub const CODE_START: usize = 2;

/// Hooks called while a program runs.
///
/// Fragments reported through [`Tracer::emit`] arrive in emission order, so a
/// tracer can stream output or keep it around after a failed run.
pub trait Tracer {
    fn instruction(&mut self, ip: usize, op: Op, sp: usize);
    fn emit(&mut self, fragment: &str);
}

/// An implementation of `Tracer` that does not track anything.
#[derive(Default, Debug, Clone, Copy)]
pub struct NoStats {}

impl Tracer for NoStats {
    #[inline(always)]
    fn instruction(&mut self, _ip: usize, _op: Op, _sp: usize) {}
    #[inline(always)]
    fn emit(&mut self, _fragment: &str) {}
}

/// Records every emitted fragment.
///
/// Pass it as `&mut EmitLog` to keep the fragments when the run fails.
#[derive(Default, Debug, Clone)]
pub struct EmitLog {
    pub fragments: Vec<String>,
}

impl EmitLog {
    pub fn concat(&self) -> String {
        self.fragments.concat()
    }
}

impl Tracer for EmitLog {
    fn instruction(&mut self, _ip: usize, _op: Op, _sp: usize) {}

    fn emit(&mut self, fragment: &str) {
        self.fragments.push(fragment.to_string());
    }
}

impl<T: Tracer + ?Sized> Tracer for &mut T {
    #[inline]
    fn instruction(&mut self, ip: usize, op: Op, sp: usize) {
        (**self).instruction(ip, op, sp)
    }
    #[inline]
    fn emit(&mut self, fragment: &str) {
        (**self).emit(fragment)
    }
}

/// An error that can occur during the execution of a single instruction.
#[derive(Error, Debug, Clone, PartialEq, Eq, Hash)]
pub enum OperationError {
    #[error("Stack pointer moved below cell 0")]
    StackUnderflow,
    #[error("Reading from a position out of bounds (index {index})")]
    IndexFault { index: i64 },
    #[error("Expected {expected}, found {found}")]
    TypeMismatch { expected: &'static str, found: &'static str },
    #[error("Integer overflow")]
    IntegerOverflow,
    #[error("Value is not a valid opcode: {value}")]
    InvalidOpcode { value: Value },
    #[error("Memory limit reached (index {index})")]
    MemoryExhausted { index: usize },
}

/// Options for the Chicken virtual machine.
#[derive(Debug, Clone)]
pub struct VMOptions {
    dialect: Dialect,
    /// Memory cells available to the run, code and stack included.
    max_memory_size: usize,
    /// The maximum number of instructions to run, if this is reached,
    /// the program will stop with an error.
    ///
    /// Set to [`u64::MAX`] to disable this limit.
    max_op_count: u64,
}

impl VMOptions {
    pub fn new(dialect: Dialect, max_memory_size: usize, max_op_count: u64) -> Self {
        Self { dialect, max_memory_size, max_op_count }
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }
}

impl Default for VMOptions {
    /// Compact dialect, limits from the environment (see [`ChickenConfig`]).
    fn default() -> Self {
        let conf = get_config();
        Self {
            dialect: Dialect::Compact,
            max_memory_size: conf.max_memory_size,
            max_op_count: conf.max_op_count,
        }
    }
}

/// An error that happened while running a Chicken program.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RunError {
    /// The cell under the instruction pointer could not be decoded.
    #[error("Cannot fetch an instruction from cell {ip} (sp {sp}): {error}")]
    FetchFailed {
        ip: usize,
        sp: usize,
        error: OperationError,
    },
    /// A specific instruction failed.
    #[error("Instruction at cell {ip} ({instruction}) failed (sp {sp}, instruction counter {instruction_counter}): {error}")]
    InstructionFailed {
        instruction: Op,
        /// The memory cell the instruction was fetched from.
        ip: usize,
        /// The stack pointer when the failure happened.
        sp: usize,
        /// The number of instructions which have been run before this one.
        instruction_counter: u64,
        error: OperationError,
    },
    /// The program executed more instructions than allowed by [`VMOptions`].
    #[error("The program ran for too long ({instruction_counter} instructions had been run).")]
    RunTooLong { instruction_counter: u64 },
}

impl RunError {
    /// The fault behind this error, if the run did not merely time out.
    pub fn kind(&self) -> Option<&OperationError> {
        match self {
            RunError::FetchFailed { error, .. } | RunError::InstructionFailed { error, .. } => Some(error),
            RunError::RunTooLong { .. } => None,
        }
    }
}

/// The successful result of running a Chicken program.
#[derive(Debug, Clone)]
pub struct RunResult<T: Tracer> {
    /// The text left on top of the stack, empty if the top is not text.
    pub output: String,
    /// The top cell when the program stopped.
    pub top: Option<Value>,
    /// The number of instructions which have been run.
    pub instruction_counter: u64,
    pub instruction_pointer: usize,
    pub stack_pointer: usize,
    pub tracer: T,
}

impl<T: Tracer> From<Machine<T>> for RunResult<T> {
    fn from(m: Machine<T>) -> Self {
        RunResult {
            output: m.output(),
            top: m.top().cloned(),
            instruction_counter: m.instructions_run,
            instruction_pointer: m.ip,
            stack_pointer: m.sp,
            tracer: m.tracer,
        }
    }
}

/// The state of one run: memory, registers and limits.
#[derive(Clone, Debug)]
pub struct Machine<T: Tracer = NoStats> {
    memory: Vec<Option<Value>>,
    ip: usize,
    sp: usize,
    /// One past the last opcode slot; also the terminator cell.
    code_end: usize,
    dialect: Dialect,
    max_memory_size: usize,
    max_op_count: u64,
    instructions_run: u64,
    halted: bool,
    tracer: T,
    conf: &'static ChickenConfig,
}

impl Machine<NoStats> {
    pub fn new(program: &[u64], input: Value, options: &VMOptions) -> Self {
        Machine::with_tracer(program, input, options, NoStats::default())
    }
}

impl<T: Tracer> Machine<T> {
    pub fn with_tracer(program: &[u64], input: Value, options: &VMOptions, tracer: T) -> Self {
        let mut memory = Vec::with_capacity(program.len() + CODE_START + 1);
        memory.push(Some(Value::Index(SELF_CELL)));
        memory.push(Some(input));
        memory.extend(
            program
                .iter()
                .map(|&count| Some(Value::Number(i64::try_from(count).unwrap_or(i64::MAX)))),
        );
        let code_end = memory.len();
        memory.push(Some(Value::Number(0)));

        Machine {
            memory,
            ip: CODE_START,
            sp: code_end,
            code_end,
            dialect: options.dialect(),
            max_memory_size: options.max_memory_size,
            max_op_count: options.max_op_count,
            instructions_run: 0,
            halted: false,
            tracer,
            conf: get_config(),
        }
    }

    pub fn ip(&self) -> usize {
        self.ip
    }

    pub fn sp(&self) -> usize {
        self.sp
    }

    pub fn instruction_counter(&self) -> u64 {
        self.instructions_run
    }

    pub fn is_halted(&self) -> bool {
        self.halted
    }

    pub fn tracer(&self) -> &T {
        &self.tracer
    }

    /// The cell at `index`, `None` if it was never written.
    pub fn cell(&self, index: usize) -> Option<&Value> {
        self.memory.get(index).and_then(Option::as_ref)
    }

    pub fn top(&self) -> Option<&Value> {
        self.cell(self.sp)
    }

    /// The output of the program so far: the top cell if it holds text.
    pub fn output(&self) -> String {
        self.top().and_then(Value::as_text).unwrap_or_default().to_string()
    }

    /// Place a value on top of the stack, as a host preparing operands would.
    pub fn push(&mut self, value: Value) -> Result<(), OperationError> {
        self.bump()?;
        self.write(self.sp, value)
    }

    /// Run until the program stops or fails.
    pub fn run(&mut self) -> Result<(), RunError> {
        while self.step()? {}
        Ok(())
    }

    /// Execute a single instruction. Returns `false` once the program has stopped.
    pub fn step(&mut self) -> Result<bool, RunError> {
        if self.halted {
            return Ok(false);
        }
        let ip = self.ip;
        let op = match self.fetch() {
            Ok(Some(op)) => op,
            Ok(None) => {
                self.halted = true;
                return Ok(false);
            }
            Err(error) => return Err(RunError::FetchFailed { ip, sp: self.sp, error }),
        };
        if self.instructions_run >= self.max_op_count {
            return Err(RunError::RunTooLong { instruction_counter: self.instructions_run });
        }

        if self.conf.should_log(10) {
            eprintln!("ip {ip} sp {} {op}, top {:?}", self.sp, self.top());
        }
        self.tracer.instruction(ip, op, self.sp);
        self.ip += 1;

        let instruction_counter = self.instructions_run;
        self.apply(op).map_err(|error| RunError::InstructionFailed {
            instruction: op,
            ip,
            sp: self.sp,
            instruction_counter,
            error,
        })?;
        self.instructions_run += 1;

        if self.conf.should_log(20) {
            eprintln!("    stack: {}", self.render_stack());
        }
        Ok(true)
    }

    fn fetch(&self) -> Result<Option<Op>, OperationError> {
        if self.dialect == Dialect::Compact && self.ip >= self.code_end {
            return Ok(None);
        }
        let count = match self.cell(self.ip) {
            Some(Value::Number(n)) if *n >= 0 => *n as u64,
            Some(other) => return Err(OperationError::InvalidOpcode { value: other.clone() }),
            // Running off the written memory ends a classic program.
            None if self.dialect == Dialect::Classic => return Ok(None),
            None => return Err(OperationError::IndexFault { index: self.ip as i64 }),
        };
        match Op::from_count(count, self.dialect) {
            Op::Exit => Ok(None),
            op => Ok(Some(op)),
        }
    }

    fn apply(&mut self, op: Op) -> Result<(), OperationError> {
        let result = match op {
            Op::Exit => return Ok(()),
            Op::Chicken => {
                self.bump()?;
                Value::Text(KEYWORD.to_string())
            }
            Op::Add => {
                let b = self.pop()?;
                add(self.read(self.sp)?, &b)?
            }
            Op::Subtract if self.dialect == Dialect::Classic => {
                let b = self.pop()?;
                match (self.read(self.sp)?, &b) {
                    (Value::Number(a), Value::Number(b)) => {
                        Value::Number(a.checked_sub(*b).ok_or(OperationError::IntegerOverflow)?)
                    }
                    _ => Value::from(NAN),
                }
            }
            Op::Subtract => {
                let b = number(&self.pop()?)?;
                let a = number(self.read(self.sp)?)?;
                let difference = a.wrapping_sub(b);
                Value::Number((difference != 0 && self.sp == 1) as i64)
            }
            Op::Multiply => {
                let b = number(&self.pop()?)?;
                let a = number(self.read(self.sp)?)?;
                Value::Number(a.checked_mul(b).ok_or(OperationError::IntegerOverflow)?)
            }
            Op::Equal if self.dialect == Dialect::Classic => {
                let b = self.pop()?;
                if loose_equal(self.read(self.sp)?, &b) {
                    Value::Number(1)
                } else {
                    Value::from(FALSE)
                }
            }
            Op::Equal => {
                let b = self.pop()?;
                Value::Number((*self.read(self.sp)? == b) as i64)
            }
            Op::Load => {
                let source = self.operand()?;
                let key = index(self.read(self.sp)?)?;
                match self.read(source)? {
                    Value::Index(base) => {
                        let at = base.checked_add(key).ok_or(OperationError::IntegerOverflow)?;
                        self.read(at)?.clone()
                    }
                    Value::Text(s) => match s.chars().nth(key) {
                        Some(c) => Value::Text(c.to_string()),
                        None if self.dialect == Dialect::Classic => Value::from(UNDEFINED),
                        None => {
                            return Err(OperationError::IndexFault { index: i64::try_from(key).unwrap_or(i64::MAX) })
                        }
                    },
                    Value::Number(_) if self.dialect == Dialect::Classic => Value::from(UNDEFINED),
                    other => {
                        return Err(OperationError::TypeMismatch {
                            expected: "index or text",
                            found: other.kind(),
                        })
                    }
                }
            }
            Op::Store => {
                let address = index(&self.pop()?)?;
                let value = self.pop()?;
                return self.write(address, value);
            }
            Op::Jump => {
                let offset = number(&self.pop()?)?;
                let condition = self.pop()?;
                let taken = match (&condition, self.dialect) {
                    (Value::Text(s), Dialect::Classic) => {
                        !s.is_empty() && ![NAN, FALSE, UNDEFINED].contains(&s.as_str())
                    }
                    _ => condition.is_truthy(),
                };
                if taken {
                    let target = (self.ip as i64)
                        .checked_add(offset)
                        .ok_or(OperationError::IntegerOverflow)?;
                    if target < 0 {
                        return Err(OperationError::IndexFault { index: target });
                    }
                    self.ip = target as usize;
                }
                return Ok(());
            }
            Op::Char => {
                let fragment = match self.read(self.sp)? {
                    Value::Text(s) if self.dialect == Dialect::Classic => format_reference(s),
                    other => format_char(number(other)?),
                };
                self.tracer.emit(&fragment);
                Value::Text(fragment)
            }
            Op::Push => return self.bump(),
            Op::PushLiteral(n) => {
                self.bump()?;
                Value::Number(n)
            }
        };
        self.write(self.sp, result)
    }

    /// Read the operand slot under the instruction pointer and move past it.
    fn operand(&mut self) -> Result<usize, OperationError> {
        let source = index(self.read(self.ip)?)?;
        self.ip += 1;
        Ok(source)
    }

    fn read(&self, index: usize) -> Result<&Value, OperationError> {
        self.cell(index).ok_or(OperationError::IndexFault { index: i64::try_from(index).unwrap_or(i64::MAX) })
    }

    fn write(&mut self, index: usize, value: Value) -> Result<(), OperationError> {
        if index >= self.max_memory_size {
            return Err(OperationError::MemoryExhausted { index });
        }
        if index >= self.memory.len() {
            self.memory.resize(index + 1, None);
        }
        self.memory[index] = Some(value);
        Ok(())
    }

    fn pop(&mut self) -> Result<Value, OperationError> {
        let value = self.read(self.sp)?.clone();
        self.sp = self.sp.checked_sub(1).ok_or(OperationError::StackUnderflow)?;
        Ok(value)
    }

    fn bump(&mut self) -> Result<(), OperationError> {
        let next = self.sp + 1;
        if next >= self.max_memory_size {
            return Err(OperationError::MemoryExhausted { index: next });
        }
        self.sp = next;
        Ok(())
    }

    fn render_stack(&self) -> String {
        let start = self.code_end.min(self.sp);
        (start..=self.sp)
            .map(|i| self.cell(i).map_or_else(|| "_".to_string(), |v| format!("{v:?}")))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

fn number(value: &Value) -> Result<i64, OperationError> {
    value.as_number().ok_or(OperationError::TypeMismatch { expected: "number", found: value.kind() })
}

fn index(value: &Value) -> Result<usize, OperationError> {
    let n = number(value)?;
    usize::try_from(n).map_err(|_| OperationError::IndexFault { index: n })
}

/// Classic equality: same variant and value, or a zero against `""` or `"false"`.
fn loose_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(0), Value::Text(s)) | (Value::Text(s), Value::Number(0)) => s.is_empty() || s == FALSE,
        _ => a == b,
    }
}

fn add(a: &Value, b: &Value) -> Result<Value, OperationError> {
    match (a, b) {
        (Value::Number(a), Value::Number(b)) => {
            a.checked_add(*b).map(Value::Number).ok_or(OperationError::IntegerOverflow)
        }
        (Value::Index(_), _) | (_, Value::Index(_)) => {
            Err(OperationError::TypeMismatch { expected: "number or text", found: "index" })
        }
        (a, b) => Ok(Value::Text(format!("{a}{b}"))),
    }
}

/// Run a Chicken program with the given options.
///
/// # Example
/// ```
/// use chicken::ops::Dialect;
/// use chicken::value::Value;
/// use chicken::vm::{run, VMOptions};
///
/// // push 72, char, push 105, char, add
/// let program = vec![82, 9, 115, 9, 2];
/// let options = VMOptions::new(Dialect::Classic, 10_000, u64::MAX);
/// let result = run(&program, Value::from(""), options).unwrap();
/// assert_eq!(result.output, "&#72;&#105;");
/// ```
pub fn run(program: &[u64], input: Value, options: VMOptions) -> Result<RunResult<NoStats>, RunError> {
    run_with_stats(program, input, options, NoStats::default())
}

/// Run a Chicken program and report every instruction and emitted fragment
/// to `tracer`. If you do not need that, use the [`run`] function instead.
pub fn run_with_stats<T: Tracer>(
    program: &[u64],
    input: Value,
    options: VMOptions,
    tracer: T,
) -> Result<RunResult<T>, RunError> {
    let mut machine = Machine::with_tracer(program, input, &options, tracer);
    machine.run()?;
    Ok(machine.into())
}
