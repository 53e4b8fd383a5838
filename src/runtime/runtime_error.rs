use std::io;

/// A failure during simulation.
///
/// Underflow depends on the values a program computes, not on its shape, so
/// it is a runtime error rather than a structural one. An unresolved jump
/// target, by contrast, can never occur in a `ResolvedProgram` and is a
/// panic, not a variant here.
#[derive(Debug)]
pub enum RuntimeError {
    /// An opcode needed more operands than the stack holds.
    StackUnderflow { word: &'static str, ip: usize },
    /// The dump output stream failed.
    Io(io::Error),
}

impl std::fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RuntimeError::StackUnderflow { word, ip } => {
                write!(f, "stack underflow: `{}` at address {}", word, ip)
            }
            RuntimeError::Io(e) => write!(f, "cannot write dump output: {}", e),
        }
    }
}

impl std::error::Error for RuntimeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RuntimeError::StackUnderflow { .. } => None,
            RuntimeError::Io(e) => Some(e),
        }
    }
}

impl From<io::Error> for RuntimeError {
    fn from(e: io::Error) -> Self {
        RuntimeError::Io(e)
    }
}
