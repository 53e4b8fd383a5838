use std::io::Write;

use crate::bytecode::{Op, ResolvedProgram};
use crate::runtime::runtime_error::RuntimeError;

/// Direct interpreter over a resolved program.
///
/// An explicit instruction pointer walks the operation sequence; the operand
/// stack holds signed machine words and nothing else. Each `dump` writes one
/// decimal line to `out`, so a compiled build of the same program produces
/// byte-identical output.
pub struct Vm {
    stack: Vec<i64>,
}

impl Vm {
    pub fn new() -> Self {
        Vm { stack: Vec::new() }
    }

    /// The operand stack, bottom first. Useful after `run` in tests.
    #[allow(dead_code)]
    pub fn stack(&self) -> &[i64] {
        &self.stack
    }

    pub fn run(
        &mut self,
        program: &ResolvedProgram,
        out: &mut impl Write,
    ) -> Result<(), RuntimeError> {
        let ops = program.ops();
        let mut ip: usize = 0;

        while ip < ops.len() {
            match &ops[ip] {
                Op::Push(value) => self.stack.push(*value),

                Op::Plus => {
                    let a = self.pop("+", ip)?;
                    let b = self.pop("+", ip)?;
                    self.stack.push(a.wrapping_add(b));
                }
                Op::Minus => {
                    let a = self.pop("-", ip)?;
                    let b = self.pop("-", ip)?;
                    self.stack.push(b.wrapping_sub(a));
                }
                Op::Dup => {
                    let a = self.pop("dup", ip)?;
                    self.stack.push(a);
                    self.stack.push(a);
                }
                Op::Dump => {
                    let a = self.pop(".", ip)?;
                    writeln!(out, "{}", a)?;
                }
                Op::Equal => {
                    let a = self.pop("=", ip)?;
                    let b = self.pop("=", ip)?;
                    self.stack.push((a == b) as i64);
                }
                Op::Gt => {
                    let b = self.pop(">", ip)?;
                    let a = self.pop(">", ip)?;
                    self.stack.push((a > b) as i64);
                }

                Op::If { target } => {
                    let a = self.pop("if", ip)?;
                    if a == 0 {
                        ip = resolved_target(*target, ip);
                        continue;
                    }
                }
                Op::Else { target } => {
                    ip = resolved_target(*target, ip);
                    continue;
                }
                Op::End => {}
            }

            ip += 1;
        }

        Ok(())
    }

    fn pop(&mut self, word: &'static str, ip: usize) -> Result<i64, RuntimeError> {
        self.stack
            .pop()
            .ok_or(RuntimeError::StackUnderflow { word, ip })
    }
}

/// A missing target inside a `ResolvedProgram` is a broken invariant of this
/// crate, never a property of the user's program.
fn resolved_target(target: Option<usize>, ip: usize) -> usize {
    match target {
        Some(target) => target,
        None => panic!("unresolved jump target at address {} in a resolved program", ip),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bytecode::crossref::resolve;
    use crate::frontend::lexer::Lexer;
    use crate::frontend::parser::parse_program;

    // ============================================================
    // Test helpers
    // ============================================================

    /// Run a source program and return (final stack, dump output).
    fn run_source(source: &str) -> (Vec<i64>, String) {
        let program = parse_program(Lexer::new("<test>", source)).unwrap();
        let resolved = resolve(program).unwrap();

        let mut vm = Vm::new();
        let mut out = Vec::new();
        vm.run(&resolved, &mut out).expect("execution should succeed");
        (vm.stack().to_vec(), String::from_utf8(out).unwrap())
    }

    /// Run a source program and return its dump output.
    fn dumps(source: &str) -> String {
        run_source(source).1
    }

    /// Run a source program expecting a runtime error.
    fn run_err(source: &str) -> RuntimeError {
        let program = parse_program(Lexer::new("<test>", source)).unwrap();
        let resolved = resolve(program).unwrap();

        let mut vm = Vm::new();
        let mut out = Vec::new();
        vm.run(&resolved, &mut out).unwrap_err()
    }

    #[test]
    fn test_plus() {
        assert_eq!(dumps("34 35 + ."), "69\n");
    }

    #[test]
    fn test_minus_is_order_sensitive() {
        // pops a then b, computes b - a
        assert_eq!(dumps("10 3 - ."), "7\n");
        assert_eq!(dumps("3 10 - ."), "-7\n");
    }

    #[test]
    fn test_equal() {
        assert_eq!(dumps("1 1 = ."), "1\n");
        assert_eq!(dumps("1 2 = ."), "0\n");
    }

    #[test]
    fn test_gt_compares_in_program_order() {
        assert_eq!(dumps("1 2 > ."), "0\n");
        assert_eq!(dumps("2 1 > ."), "1\n");
        assert_eq!(dumps("2 2 > ."), "0\n");
    }

    #[test]
    fn test_dup() {
        assert_eq!(dumps("5 dup + ."), "10\n");
    }

    #[test]
    fn test_dump_order_and_newlines() {
        assert_eq!(dumps("1 . 2 . 3 ."), "1\n2\n3\n");
    }

    #[test]
    fn test_if_takes_true_branch_on_nonzero() {
        assert_eq!(dumps("1 if 2 . else 3 . end"), "2\n");
    }

    #[test]
    fn test_if_takes_false_branch_on_zero() {
        assert_eq!(dumps("0 if 2 . else 3 . end"), "3\n");
    }

    #[test]
    fn test_if_without_else() {
        assert_eq!(dumps("1 if 7 . end"), "7\n");
        assert_eq!(dumps("0 if 7 . end 5 ."), "5\n");
    }

    #[test]
    fn test_nested_if() {
        assert_eq!(dumps("1 if 0 if 1 . else 2 . end else 3 . end"), "2\n");
        assert_eq!(dumps("0 if 0 if 1 . else 2 . end else 3 . end"), "3\n");
    }

    #[test]
    fn test_comparison_feeds_branch() {
        assert_eq!(dumps("2 1 > if 10 . else 20 . end"), "10\n");
        assert_eq!(dumps("1 2 > if 10 . else 20 . end"), "20\n");
    }

    #[test]
    fn test_end_is_a_pure_marker() {
        let (stack, output) = run_source("1 if 42 end");
        assert_eq!(stack, vec![42]);
        assert_eq!(output, "");
    }

    #[test]
    fn test_values_may_stay_on_the_stack() {
        let (stack, output) = run_source("1 2 3");
        assert_eq!(stack, vec![1, 2, 3]);
        assert_eq!(output, "");
    }

    #[test]
    fn test_addition_wraps() {
        assert_eq!(dumps("9223372036854775807 1 + ."), "-9223372036854775808\n");
    }

    #[test]
    fn test_underflow_on_empty_stack() {
        let err = run_err("+");
        assert!(
            matches!(err, RuntimeError::StackUnderflow { word: "+", ip: 0 }),
            "got: {:?}",
            err
        );
    }

    #[test]
    fn test_underflow_with_one_operand() {
        let err = run_err("1 -");
        assert!(matches!(err, RuntimeError::StackUnderflow { word: "-", ip: 1 }));
    }

    #[test]
    fn test_underflow_on_dump() {
        let err = run_err(".");
        assert!(matches!(err, RuntimeError::StackUnderflow { word: ".", ip: 0 }));
    }

    #[test]
    fn test_underflow_on_if() {
        let err = run_err("if 1 . end");
        assert!(matches!(err, RuntimeError::StackUnderflow { word: "if", ip: 0 }));
    }

    #[test]
    fn test_underflow_message_names_word_and_address() {
        let msg = run_err("1 +").to_string();
        assert!(msg.contains("stack underflow"), "msg was: {}", msg);
        assert!(msg.contains('+'), "msg was: {}", msg);
    }
}
