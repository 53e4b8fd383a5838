mod bytecode;
mod codegen;
mod frontend;
mod runtime;

use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use crate::bytecode::crossref;
use crate::bytecode::disasm;
use crate::bytecode::{Op, Program, ResolvedProgram};
use crate::codegen::toolchain;
use crate::codegen::x86_64::Generator;
use crate::frontend::lexer::Lexer;
use crate::frontend::parser::parse_program;
use crate::frontend::token_dumper::TokenDumper;
use crate::runtime::vm::Vm;

const EXIT_FAILURE: i32 = 1;
const EXIT_ASSEMBLE: i32 = 2;
const EXIT_LINK: i32 = 3;
const EXIT_NO_PROGRAM: i32 = 4;

fn main() {
    let args: Vec<String> = std::env::args().collect();
    let program_name = args.first().map(String::as_str).unwrap_or("cinder");

    let Some(subcommand) = args.get(1) else {
        usage(program_name);
        eprintln!("ERROR: no subcommand is provided");
        process::exit(EXIT_FAILURE);
    };

    match subcommand.as_str() {
        "sim" => cmd_sim(program_name, &args[2..]),
        "com" => cmd_com(program_name, &args[2..]),
        "bc" => cmd_bc(program_name, &args[2..]),
        "-h" | "--help" => usage(program_name),
        other => {
            usage(program_name);
            eprintln!("ERROR: unknown subcommand `{}`", other);
            process::exit(EXIT_FAILURE);
        }
    }
}

fn usage(program_name: &str) {
    println!("Usage: {} <SUBCOMMAND> [ARGS]", program_name);
    println!("SUBCOMMANDS:");
    println!("    sim [--tokens|--ops] [--no-color] <file>    Simulate the program (.cin source or .cbc artifact)");
    println!("    com [-r] [-q] [-o <path>] <file.cin>        Compile the program to a native executable");
    println!("    bc <file.cin> <out.cbc>                     Cross-reference the program and save it");
}

fn cmd_sim(program_name: &str, args: &[String]) {
    let mut tokens_only = false;
    let mut ops_only = false;
    let mut no_color = false;
    let mut input: Option<&str> = None;

    for arg in args {
        match arg.as_str() {
            "--tokens" => tokens_only = true,
            "--ops" => ops_only = true,
            "--no-color" => no_color = true,
            other if !other.starts_with('-') && input.is_none() => input = Some(other),
            other => {
                usage(program_name);
                eprintln!("ERROR: unexpected argument `{}`", other);
                process::exit(EXIT_FAILURE);
            }
        }
    }

    let Some(input) = input else {
        usage(program_name);
        eprintln!("ERROR: no input file");
        process::exit(EXIT_FAILURE);
    };

    // precompiled artifact: skip the front end entirely
    if extension(input) == Some("cbc") {
        if tokens_only {
            eprintln!("ERROR: --tokens needs a .cin source file");
            process::exit(EXIT_FAILURE);
        }

        let resolved = load_artifact(input);
        ensure_not_empty(resolved.ops());
        if ops_only {
            disasm::print_ops(&resolved);
            return;
        }
        run_simulation(&resolved);
        return;
    }

    ensure_extension(input, "cin");
    let source = read_source(input);

    if tokens_only {
        let mut dumper = TokenDumper::new();
        if no_color {
            dumper = dumper.no_color();
        }
        dumper.dump(Lexer::new(input, &source));
        return;
    }

    let program = parse_source(input, &source);
    ensure_not_empty(&program.ops);
    let resolved = resolve_or_exit(program);

    if ops_only {
        disasm::print_ops(&resolved);
        return;
    }

    run_simulation(&resolved);
}

fn cmd_com(program_name: &str, args: &[String]) {
    let mut run_after = false;
    let mut quiet = false;
    let mut output: Option<PathBuf> = None;
    let mut input: Option<&str> = None;

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "-r" | "--run" => run_after = true,
            "-q" | "--quiet" => quiet = true,
            "-o" | "--output" => {
                let Some(path) = iter.next() else {
                    eprintln!("ERROR: `-o` expects a path");
                    process::exit(EXIT_FAILURE);
                };
                output = Some(PathBuf::from(path));
            }
            other if !other.starts_with('-') && input.is_none() => input = Some(other),
            other => {
                usage(program_name);
                eprintln!("ERROR: unexpected argument `{}`", other);
                process::exit(EXIT_FAILURE);
            }
        }
    }

    let Some(input) = input else {
        usage(program_name);
        eprintln!("ERROR: no input file");
        process::exit(EXIT_FAILURE);
    };
    ensure_extension(input, "cin");

    let source = read_source(input);
    let program = parse_source(input, &source);
    ensure_not_empty(&program.ops);
    let resolved = resolve_or_exit(program);

    // foo/bar.cin builds bar.asm / bar.o / bar here, unless -o says otherwise
    let exe = output.unwrap_or_else(|| {
        let stem = Path::new(input)
            .file_stem()
            .unwrap_or_else(|| OsStr::new("out"));
        PathBuf::from(stem)
    });
    let asm = exe.with_extension("asm");
    let obj = exe.with_extension("o");

    let listing = Generator::generate(&resolved);
    if !quiet {
        println!("[PROC] writing to file {}", asm.display());
    }
    if let Err(e) = fs::write(&asm, listing) {
        eprintln!("ERROR: cannot write '{}': {}", asm.display(), e);
        process::exit(EXIT_FAILURE);
    }

    if let Err(e) = toolchain::assemble(&asm, &obj, quiet) {
        eprintln!("ERROR: {}", e);
        process::exit(EXIT_ASSEMBLE);
    }
    if let Err(e) = toolchain::link(&obj, &exe, quiet) {
        eprintln!("ERROR: {}", e);
        process::exit(EXIT_LINK);
    }

    if run_after {
        match toolchain::run_binary(&exe, quiet) {
            Ok(code) => process::exit(code),
            Err(e) => {
                eprintln!("ERROR: {}", e);
                process::exit(EXIT_FAILURE);
            }
        }
    }
}

fn cmd_bc(program_name: &str, args: &[String]) {
    let mut positional: Vec<&str> = Vec::new();
    for arg in args {
        if arg.starts_with('-') {
            usage(program_name);
            eprintln!("ERROR: unexpected argument `{}`", arg);
            process::exit(EXIT_FAILURE);
        }
        positional.push(arg);
    }

    let &[input, out_path] = positional.as_slice() else {
        usage(program_name);
        eprintln!("ERROR: `bc` expects an input file and an output path");
        process::exit(EXIT_FAILURE);
    };

    ensure_extension(input, "cin");
    let source = read_source(input);
    let program = parse_source(input, &source);
    ensure_not_empty(&program.ops);
    let resolved = resolve_or_exit(program);

    let bytes = match resolved.to_bytes() {
        Ok(bytes) => bytes,
        Err(e) => {
            eprintln!("ERROR: {}", e);
            process::exit(EXIT_FAILURE);
        }
    };

    println!("[PROC] writing to file {}", out_path);
    if let Err(e) = fs::write(out_path, bytes) {
        eprintln!("ERROR: cannot write '{}': {}", out_path, e);
        process::exit(EXIT_FAILURE);
    }
}

fn ensure_extension(path: &str, expected: &str) {
    if extension(path) != Some(expected) {
        eprintln!("ERROR: expected a .{} file, got {}", expected, path);
        process::exit(EXIT_FAILURE);
    }
}

fn extension(path: &str) -> Option<&str> {
    Path::new(path).extension().and_then(|e| e.to_str())
}

fn read_source(path: &str) -> String {
    fs::read_to_string(path).unwrap_or_else(|e| {
        eprintln!("ERROR: cannot read '{}': {}", path, e);
        process::exit(EXIT_FAILURE);
    })
}

fn load_artifact(path: &str) -> ResolvedProgram {
    let bytes = fs::read(path).unwrap_or_else(|e| {
        eprintln!("ERROR: cannot read '{}': {}", path, e);
        process::exit(EXIT_FAILURE);
    });
    match ResolvedProgram::from_bytes(&bytes) {
        Ok(resolved) => resolved,
        Err(e) => {
            eprintln!("ERROR: {}", e);
            process::exit(EXIT_FAILURE);
        }
    }
}

fn parse_source(path: &str, source: &str) -> Program {
    match parse_program(Lexer::new(path, source)) {
        Ok(program) => program,
        Err(e) => {
            eprintln!("{}", e);
            process::exit(EXIT_FAILURE);
        }
    }
}

fn ensure_not_empty(ops: &[Op]) {
    if ops.is_empty() {
        eprintln!("ERROR: no program");
        process::exit(EXIT_NO_PROGRAM);
    }
}

fn resolve_or_exit(program: Program) -> ResolvedProgram {
    match crossref::resolve(program) {
        Ok(resolved) => resolved,
        Err(e) => {
            eprintln!("ERROR: {}", e);
            process::exit(EXIT_FAILURE);
        }
    }
}

fn run_simulation(program: &ResolvedProgram) {
    let mut vm = Vm::new();
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    if let Err(e) = vm.run(program, &mut out) {
        eprintln!("ERROR: {}", e);
        process::exit(EXIT_FAILURE);
    }
}
