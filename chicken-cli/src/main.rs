use chicken::format::decode_references;
use chicken::ops::Dialect;
use chicken::parser;
use chicken::value::Value;
use chicken::vm::{RunResult, Tracer, VMOptions};
use clap::Parser;
use std::time::Duration;

/// Run a Chicken program.
#[derive(Parser, Debug)]
#[command()]
struct Args {
    /// File containing a Chicken program.
    #[arg()]
    file: String,
    /// Program input. Non-negative integers are passed as numbers, anything else as text.
    #[arg(default_value = "")]
    input: String,
    /// Use the classic opcode table (0 exits, counts from 10 push literals) and its loose values.
    #[arg(long, short = 'c')]
    classic: bool,
    /// Print characters instead of numeric character references.
    #[arg(long, short = 'd')]
    decode: bool,
    /// Maximum number of memory cells.
    #[arg(long, short = 'm', default_value_t = 2097152)]
    max_memory: usize,
    /// A limit for the number of executed operations.
    /// If the limit is reached, the program will be stopped with an error.
    #[arg(long, short = 'l')]
    op_limit: Option<u64>,
    /// Print statistics after running the program.
    #[arg(long, short = 's')]
    stats: bool,
}

fn read_program_from_file(file: &str) -> Result<Vec<u64>, anyhow::Error> {
    let source = std::fs::read_to_string(file)?;
    Ok(parser::parse_program(&source)?)
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let program = read_program_from_file(&args.file)?;
    let dialect = if args.classic { Dialect::Classic } else { Dialect::Compact };
    let options = VMOptions::new(dialect, args.max_memory, args.op_limit.unwrap_or(u64::MAX));

    let start_time = std::time::Instant::now();
    let result = chicken::vm::run(&program, Value::from_input(&args.input), options)?;
    let elapsed = start_time.elapsed();

    if args.stats {
        print_stats(&result, elapsed);
    }

    if args.decode {
        println!("{}", decode_references(&result.output));
    } else {
        println!("{}", result.output);
    }

    Ok(())
}

fn print_stats<T: Tracer>(result: &RunResult<T>, elapsed: Duration) {
    let rate = result.instruction_counter as f64 / elapsed.as_secs_f64();
    let rate = if rate >= 1_000_000.0 {
        format!("{:.1}M", rate / 1_000_000.0)
    } else if rate >= 1_000.0 {
        format!("{:.1}k", rate / 1_000.0)
    } else {
        format!("{rate:.1}")
    };
    eprintln!("Execution time: {elapsed:?}");
    eprintln!("Instructions executed: {} ({rate}/s)", result.instruction_counter);
    eprintln!("Stopped at ip {}, sp {}", result.instruction_pointer, result.stack_pointer);
}
