use serde::{Deserialize, Serialize};

// =============================================================================
// OP - Program operations
// =============================================================================

/// A single operation of a cinder program.
///
/// The set is closed: every backend dispatches with an exhaustive `match`, so
/// adding a variant is a compile-checked, all-call-sites change.
///
/// `If` and `Else` carry their jump target as an index into the owning
/// program. The parser leaves the target `None`; cross-referencing fills it
/// in exactly once, and both backends treat it as immutable afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Op {
    /// Push a literal. ( -- n )
    Push(i64),

    /// ( a b -- a+b )
    Plus,

    /// Pops a then b, pushes `b - a`. ( b a -- b-a )
    Minus,

    /// ( a -- a a )
    Dup,

    /// Pop one value and print it in decimal. ( a -- )
    Dump,

    /// ( a b -- a==b )
    Equal,

    /// Pops b then a, pushes `a > b`. ( a b -- a>b )
    Gt,

    /// Pop a flag; jump to `target` when it is zero. ( a -- )
    If { target: Option<usize> },

    /// Unconditional jump to `target`; also the boundary between the two
    /// branches of an `if`.
    Else { target: Option<usize> },

    /// Block closer. No stack effect; exists to anchor jump targets.
    End,
}

impl Op {
    /// The surface word this operation was parsed from.
    pub fn word(&self) -> &'static str {
        match self {
            Op::Push(_) => "push",
            Op::Plus => "+",
            Op::Minus => "-",
            Op::Dup => "dup",
            Op::Dump => ".",
            Op::Equal => "=",
            Op::Gt => ">",
            Op::If { .. } => "if",
            Op::Else { .. } => "else",
            Op::End => "end",
        }
    }
}

impl std::fmt::Display for Op {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Op::Push(n) => write!(f, "{}", n),
            other => write!(f, "{}", other.word()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_uses_surface_syntax() {
        assert_eq!(Op::Push(-42).to_string(), "-42");
        assert_eq!(Op::Plus.to_string(), "+");
        assert_eq!(Op::Dump.to_string(), ".");
        assert_eq!(Op::If { target: Some(7) }.to_string(), "if");
    }
}
