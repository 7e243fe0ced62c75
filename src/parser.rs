use thiserror::Error;

use crate::config::get_config;
use crate::ops::KEYWORD;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParserError {
    /// A line held something other than whitespace and keywords.
    /// Lines are counted from 1.
    #[error("Error on line {line}: expected 'chicken', found `{found}`.")]
    ExpectedKeyword { line: usize, found: char },
}

/// Count the keywords on a single line.
///
/// Keywords may be separated by any amount of whitespace or by none at all.
pub fn parse_line(line: &str, line_number: usize) -> Result<u64, ParserError> {
    let mut rest = line;
    let mut count = 0;
    loop {
        rest = rest.trim_start();
        if rest.is_empty() {
            return Ok(count);
        }
        match rest.strip_prefix(KEYWORD) {
            Some(tail) => {
                count += 1;
                rest = tail;
            }
            None => {
                // `rest` is not empty here
                let found = rest.chars().next().unwrap_or_default();
                return Err(ParserError::ExpectedKeyword { line: line_number, found });
            }
        }
    }
}

/// Assemble a whole program into its opcode slots, one per line.
///
/// A trailing newline produces a final blank slot, the same as any other
/// empty line.
///
/// # Example
/// ```
/// use chicken::parser::parse_program;
///
/// assert_eq!(parse_program("chicken chicken\n\nchicken").unwrap(), vec![2, 0, 1]);
/// assert!(parse_program("chicken\nchickem").is_err());
/// ```
pub fn parse_program(source: &str) -> Result<Vec<u64>, ParserError> {
    let slots = source
        .split('\n')
        .enumerate()
        .map(|(i, line)| parse_line(line, i + 1))
        .collect::<Result<Vec<_>, _>>()?;

    if get_config().should_log(5) {
        eprintln!("Assembled {} lines, {} keywords", slots.len(), slots.iter().sum::<u64>());
    }
    Ok(slots)
}
