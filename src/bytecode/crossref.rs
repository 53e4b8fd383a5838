use crate::bytecode::{Op, Program, ResolvedProgram};

/// Resolves every `if`/`else`/`end` block into concrete jump targets.
///
/// Single left-to-right pass over the program, driven by an explicit LIFO of
/// pending block-opener addresses:
/// - `if` pushes its own address.
/// - `else` closes the `if` on top of the stack (pointing it just past the
///   `else`, where the false branch begins) and becomes pending itself.
/// - `end` closes whatever is on top of the stack, pointing it at the `end`'s
///   own address, where both branches converge.
///
/// Consumes the program: the input must come straight from the parser, and a
/// parsed value can pass through here at most once.
pub fn resolve(program: Program) -> Result<ResolvedProgram, StructuralError> {
    let mut ops = program.ops;
    let mut blocks: Vec<usize> = Vec::new();

    for ip in 0..ops.len() {
        match ops[ip] {
            Op::If { .. } => blocks.push(ip),
            Op::Else { .. } => {
                let opener = blocks
                    .pop()
                    .ok_or(StructuralError::DanglingElse { addr: ip })?;
                match &mut ops[opener] {
                    Op::If { target } => *target = Some(ip + 1),
                    _ => return Err(StructuralError::ElseWithoutIf { addr: ip, opener }),
                }
                blocks.push(ip);
            }
            Op::End => {
                let opener = blocks
                    .pop()
                    .ok_or(StructuralError::DanglingEnd { addr: ip })?;
                match &mut ops[opener] {
                    Op::If { target } | Op::Else { target } => *target = Some(ip),
                    _ => return Err(StructuralError::UnsupportedBlock { addr: ip, opener }),
                }
            }
            Op::Push(_) | Op::Plus | Op::Minus | Op::Dup | Op::Dump | Op::Equal | Op::Gt => {}
        }
    }

    if let Some(opener) = blocks.pop() {
        return Err(StructuralError::UnclosedBlock { addr: opener });
    }

    Ok(ResolvedProgram::from_resolved(ops))
}

/// A malformed block structure, caught before either backend runs.
#[derive(Debug, Clone, PartialEq)]
pub enum StructuralError {
    /// An `else` with no open block to attach to.
    DanglingElse { addr: usize },
    /// An `end` with no open block to close.
    DanglingEnd { addr: usize },
    /// An `else` trying to close something that is not an `if`.
    ElseWithoutIf { addr: usize, opener: usize },
    /// An `end` closing an operation that cannot open a block.
    UnsupportedBlock { addr: usize, opener: usize },
    /// A block opener that never gets closed.
    UnclosedBlock { addr: usize },
}

impl std::fmt::Display for StructuralError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StructuralError::DanglingElse { addr } => {
                write!(f, "`else` at address {} has no matching `if`", addr)
            }
            StructuralError::DanglingEnd { addr } => {
                write!(f, "`end` at address {} has no matching block", addr)
            }
            StructuralError::ElseWithoutIf { addr, opener } => {
                write!(
                    f,
                    "`else` at address {} can only close an `if`, not the operation at address {}",
                    addr, opener
                )
            }
            StructuralError::UnsupportedBlock { addr, opener } => {
                write!(
                    f,
                    "only `if`/`else` blocks are supported: `end` at address {} closes the operation at address {}",
                    addr, opener
                )
            }
            StructuralError::UnclosedBlock { addr } => {
                write!(f, "unclosed block opened at address {}", addr)
            }
        }
    }
}

impl std::error::Error for StructuralError {}
