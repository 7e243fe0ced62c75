use std::{str::FromStr, sync::LazyLock};

/// Process-wide settings read from the environment on first use.
#[derive(Debug, Clone, PartialEq)]
pub struct ChickenConfig {
    /// 0 is silent; 5 reports assembly, 10 every instruction, 20 the live stack.
    pub verbosity: u8,
    /// Default for [`crate::vm::VMOptions`]: memory cells a run may use.
    pub max_memory_size: usize,
    /// Default for [`crate::vm::VMOptions`]: instructions a run may execute.
    pub max_op_count: u64,
}

impl ChickenConfig {
    #[inline]
    pub fn should_log(&self, level: u8) -> bool {
        self.verbosity >= level
    }
}

impl Default for ChickenConfig {
    fn default() -> Self {
        ChickenConfig {
            verbosity: 0,
            max_memory_size: 2_097_152,
            max_op_count: u64::MAX,
        }
    }
}

fn parse_env_opt<T>(key: &str) -> Option<T>
where
    T: FromStr, <T as FromStr>::Err: std::fmt::Display
{
    let val = std::env::var(key).ok()?;
    if val.is_empty() {
        return None;
    }
    match val.parse::<T>() {
        Ok(v) => Some(v),
        Err(err) => {
            eprintln!("Ignoring env var {key} with value {val}: {err}");
            None
        }
    }
}

fn parse_env<T>(key: &str, default: T) -> T
where
    T: FromStr, <T as FromStr>::Err: std::fmt::Display
{
    parse_env_opt(key).unwrap_or(default)
}

fn create_config() -> ChickenConfig {
    let defaults = ChickenConfig::default();
    ChickenConfig {
        verbosity: parse_env("CHICKEN_VERBOSITY", defaults.verbosity),
        max_memory_size: parse_env("CHICKEN_MAX_MEMORY", defaults.max_memory_size),
        max_op_count: parse_env("CHICKEN_OP_LIMIT", defaults.max_op_count),
    }
}

static CELL: LazyLock<ChickenConfig> = LazyLock::new(create_config);

pub fn get_config() -> &'static ChickenConfig {
    &CELL
}
