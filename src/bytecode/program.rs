use crate::bytecode::op::Op;
use serde::{Deserialize, Serialize};

/// A freshly parsed program: an ordered sequence of operations whose index
/// doubles as the instruction address. Jump targets are still unresolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Program {
    pub ops: Vec<Op>,
}

impl Program {
    pub fn new(ops: Vec<Op>) -> Self {
        Program { ops }
    }
}

/// A program whose every `if` and `else` carries a valid jump target.
///
/// This is the only form the simulator and the code generator accept. The
/// field is private: outside this module a `ResolvedProgram` exists only by
/// passing cross-referencing, or by loading a serialized artifact, which
/// re-validates every target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedProgram {
    ops: Vec<Op>,
}

impl ResolvedProgram {
    pub(in crate::bytecode) fn from_resolved(ops: Vec<Op>) -> Self {
        ResolvedProgram { ops }
    }

    pub fn ops(&self) -> &[Op] {
        &self.ops
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Serializes the program for a `.cbc` artifact file.
    pub fn to_bytes(&self) -> Result<Vec<u8>, ArtifactError> {
        postcard::to_allocvec(self).map_err(ArtifactError::Encode)
    }

    /// Deserializes a `.cbc` artifact.
    ///
    /// The bytes come from outside the type system, so the resolved-program
    /// invariant is checked again before the value is handed out.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ArtifactError> {
        let program: ResolvedProgram = postcard::from_bytes(bytes).map_err(ArtifactError::Decode)?;
        validate(&program.ops)?;
        Ok(program)
    }
}

fn validate(ops: &[Op]) -> Result<(), ArtifactError> {
    for (addr, op) in ops.iter().enumerate() {
        if let Op::If { target } | Op::Else { target } = op {
            match target {
                None => return Err(ArtifactError::UnresolvedTarget { addr }),
                Some(target) if *target > ops.len() => {
                    return Err(ArtifactError::TargetOutOfRange {
                        addr,
                        target: *target,
                        len: ops.len(),
                    });
                }
                Some(_) => {}
            }
        }
    }
    Ok(())
}

/// Failure to encode or decode a serialized program artifact.
#[derive(Debug)]
pub enum ArtifactError {
    Encode(postcard::Error),
    Decode(postcard::Error),
    /// The decoded program contains a jump with no resolved target.
    UnresolvedTarget { addr: usize },
    /// The decoded program contains a jump past the end of the program.
    TargetOutOfRange {
        addr: usize,
        target: usize,
        len: usize,
    },
}

impl std::fmt::Display for ArtifactError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ArtifactError::Encode(e) => write!(f, "cannot encode program: {}", e),
            ArtifactError::Decode(e) => write!(f, "cannot decode program: {}", e),
            ArtifactError::UnresolvedTarget { addr } => {
                write!(f, "unresolved jump target at address {}", addr)
            }
            ArtifactError::TargetOutOfRange { addr, target, len } => {
                write!(
                    f,
                    "jump at address {} targets {}, past the end of a {}-op program",
                    addr, target, len
                )
            }
        }
    }
}

impl std::error::Error for ArtifactError {}
