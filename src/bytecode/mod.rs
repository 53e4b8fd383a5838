pub mod crossref;
pub mod disasm;
pub mod op;
pub mod program;

pub use op::Op;
pub use program::{Program, ResolvedProgram};
