//! Stack cells.
//!
//! Memory cells carry no declared type: a number written by one instruction
//! may be read back as an address by `load`, `store` or `jump`. The variants
//! below only describe what a cell currently holds.
use std::fmt;

/// Text a classic subtraction leaves when either side is not a number.
pub const NAN: &str = "NaN";
/// Text a classic comparison leaves when the sides differ.
pub const FALSE: &str = "false";
/// Text a classic load leaves when it reads past the end of its source.
pub const UNDEFINED: &str = "undefined";

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Value {
    Number(i64),
    Text(String),
    /// A reference into memory. Cell 0 holds `Index(0)`, the memory region
    /// itself, so loading through it reads `memory[key]`.
    Index(usize),
}

impl Value {
    /// Interpret a raw input string the way the command line does:
    /// non-negative integers are numbers, anything else is text.
    pub fn from_input(input: &str) -> Value {
        match input.parse::<i64>() {
            Ok(n) if n >= 0 => Value::Number(n),
            _ => Value::Text(input.to_string()),
        }
    }

    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Number(n) => *n != 0,
            Value::Text(s) => !s.is_empty(),
            Value::Index(_) => true,
        }
    }

    pub fn as_number(&self) -> Option<i64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub(crate) fn kind(&self) -> &'static str {
        match self {
            Value::Number(_) => "number",
            Value::Text(_) => "text",
            Value::Index(_) => "index",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => write!(f, "{n}"),
            Value::Text(s) => write!(f, "{s}"),
            Value::Index(i) => write!(f, "@{i}"),
        }
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_input() {
        assert_eq!(Value::from_input("42"), Value::Number(42));
        assert_eq!(Value::from_input("0"), Value::Number(0));
        assert_eq!(Value::from_input("-3"), Value::Text("-3".to_string()));
        assert_eq!(Value::from_input("asdf"), Value::Text("asdf".to_string()));
        assert_eq!(Value::from_input(""), Value::Text(String::new()));
    }

    #[test]
    fn test_truthiness() {
        assert!(Value::Number(-1).is_truthy());
        assert!(!Value::Number(0).is_truthy());
        assert!(Value::from("0").is_truthy());
        assert!(!Value::from("").is_truthy());
        assert!(Value::Index(0).is_truthy());
    }

    #[test]
    fn test_display() {
        assert_eq!(Value::Number(-7).to_string(), "-7");
        assert_eq!(Value::from("&#65;").to_string(), "&#65;");
        assert_eq!(Value::Index(3).to_string(), "@3");
    }
}
