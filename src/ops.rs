use std::fmt;

/// The keyword every Chicken program is written in.
pub const KEYWORD: &str = "chicken";

/// How repetition counts map onto operations.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub enum Dialect {
    /// Count 0 pushes the keyword, counts 1..=8 are the arithmetic, memory and
    /// output operations and every count of 9 or more bumps the stack pointer.
    /// Execution ends after the last line.
    #[default]
    Compact,
    /// The historical encoding: count 0 stops the program, the nine operations
    /// sit one count higher and a count `c >= 10` pushes the number `c - 10`.
    /// Values are loose: failed subtractions, comparisons and loads leave
    /// the texts `NaN`, `false` and `undefined`, which jumps treat as false.
    Classic,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Op {
    /// Stop the program. Only produced by [`Dialect::Classic`].
    Exit,
    /// Push the keyword itself as text.
    Chicken,
    Add,
    /// Subtraction which only yields a truthy value when the stack pointer
    /// ends on cell 1.
    Subtract,
    Multiply,
    Equal,
    /// Double indirect load, the operand comes from the next opcode slot.
    Load,
    Store,
    /// Conditional relative jump.
    Jump,
    /// Turn the top of the stack into a numeric character reference.
    Char,
    /// Move the stack pointer up, keeping whatever the new top cell holds.
    Push,
    /// Push a literal number. Only produced by [`Dialect::Classic`].
    PushLiteral(i64),
}

/// Operations shared by both dialects, in count order.
const CORE: [Op; 9] = [
    Op::Chicken,
    Op::Add,
    Op::Subtract,
    Op::Multiply,
    Op::Equal,
    Op::Load,
    Op::Store,
    Op::Jump,
    Op::Char,
];

impl Op {
    /// Decode a repetition count. Counts above the table never fail, they all
    /// resolve to a push.
    pub fn from_count(count: u64, dialect: Dialect) -> Op {
        match dialect {
            Dialect::Compact => usize::try_from(count)
                .ok()
                .and_then(|i| CORE.get(i).copied())
                .unwrap_or(Op::Push),
            Dialect::Classic => match count {
                0 => Op::Exit,
                1..=9 => CORE[count as usize - 1],
                // Counts come from line lengths, anything past i64 is not a real program.
                c => Op::PushLiteral(i64::try_from(c - 10).unwrap_or(i64::MAX)),
            },
        }
    }

    /// The smallest repetition count that decodes to this operation.
    pub fn count(&self, dialect: Dialect) -> Option<u64> {
        let core = CORE.iter().position(|op| op == self).map(|i| i as u64);
        match (dialect, self) {
            (Dialect::Compact, Op::Push) => Some(CORE.len() as u64),
            (Dialect::Compact, _) => core,
            (Dialect::Classic, Op::Exit) => Some(0),
            (Dialect::Classic, Op::PushLiteral(n)) => u64::try_from(*n).ok().map(|n| n + 10),
            (Dialect::Classic, _) => core.map(|c| c + 1),
        }
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Op::Exit => write!(f, "exit"),
            Op::Chicken => write!(f, "chicken"),
            Op::Add => write!(f, "add"),
            Op::Subtract => write!(f, "sub"),
            Op::Multiply => write!(f, "mul"),
            Op::Equal => write!(f, "cmp"),
            Op::Load => write!(f, "load"),
            Op::Store => write!(f, "store"),
            Op::Jump => write!(f, "jump"),
            Op::Char => write!(f, "char"),
            Op::Push => write!(f, "push"),
            Op::PushLiteral(n) => write!(f, "push {n}"),
        }
    }
}
