use std::ffi::OsStr;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};

/// External build steps: assemble the emitted listing with `nasm`, link the
/// object with `ld`, optionally run the produced binary. Each step is an
/// opaque subprocess; a non-zero exit aborts the pipeline with a
/// stage-specific error and nothing is retried.

/// Failure of one stage of the external build pipeline.
#[derive(Debug)]
pub enum ToolchainError {
    /// The stage's command could not be started at all.
    Spawn {
        stage: &'static str,
        program: &'static str,
        source: io::Error,
    },
    /// The stage ran and reported failure.
    Failed {
        stage: &'static str,
        status: ExitStatus,
    },
}

impl std::fmt::Display for ToolchainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ToolchainError::Spawn { stage, program, source } => {
                write!(f, "{}: cannot run `{}`: {}", stage, program, source)
            }
            ToolchainError::Failed { stage, status } => {
                write!(f, "{} failed: {}", stage, status)
            }
        }
    }
}

impl std::error::Error for ToolchainError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ToolchainError::Spawn { source, .. } => Some(source),
            ToolchainError::Failed { .. } => None,
        }
    }
}

/// `nasm -felf64 <asm> -o <obj>`
pub fn assemble(asm: &Path, obj: &Path, quiet: bool) -> Result<(), ToolchainError> {
    call(
        "assemble",
        "nasm",
        &["-felf64".as_ref(), asm.as_os_str(), "-o".as_ref(), obj.as_os_str()],
        quiet,
    )
}

/// `ld -o <exe> <obj>`
pub fn link(obj: &Path, exe: &Path, quiet: bool) -> Result<(), ToolchainError> {
    call(
        "link",
        "ld",
        &["-o".as_ref(), exe.as_os_str(), obj.as_os_str()],
        quiet,
    )
}

/// Execute the freshly linked binary and report its exit code.
pub fn run_binary(exe: &Path, quiet: bool) -> Result<i32, ToolchainError> {
    // a bare file name would be looked up on PATH instead of in the
    // working directory
    let exe: PathBuf = if exe.components().count() == 1 {
        Path::new(".").join(exe)
    } else {
        exe.to_path_buf()
    };

    if !quiet {
        println!("[CMD] {}", exe.display());
    }

    let status = Command::new(&exe)
        .status()
        .map_err(|source| ToolchainError::Spawn {
            stage: "run",
            program: "the produced binary",
            source,
        })?;
    Ok(status.code().unwrap_or(1))
}

fn call(
    stage: &'static str,
    program: &'static str,
    args: &[&OsStr],
    quiet: bool,
) -> Result<(), ToolchainError> {
    if !quiet {
        let rendered: Vec<String> = args
            .iter()
            .map(|arg| arg.to_string_lossy().into_owned())
            .collect();
        println!("[CMD] {} {}", program, rendered.join(" "));
    }

    let status = Command::new(program)
        .args(args)
        .status()
        .map_err(|source| ToolchainError::Spawn { stage, program, source })?;

    if status.success() {
        Ok(())
    } else {
        Err(ToolchainError::Failed { stage, status })
    }
}
