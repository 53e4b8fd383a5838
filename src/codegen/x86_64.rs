use crate::bytecode::{Op, ResolvedProgram};

/// The decimal-print routine inlined into every listing.
///
/// Fixed template asset: takes the value in `rdi`, writes its decimal digits
/// and a newline to fd 1, clobbers caller-saved registers only.
const DUMP_ROUTINE: &str = include_str!("dump.asm");

/// Emits a NASM x86-64 listing for a resolved program.
///
/// One line-group per operation, addressed by its program index. Jumps land
/// on `addr_N:` labels, emitted by the `end` case (at its own index) and the
/// `else` case (at the index right after the `else`, where the true branch
/// falls through from). Cross-referencing guarantees those are exactly the
/// indices jumps can reference.
pub struct Generator {
    out: String,
}

impl Generator {
    pub fn generate(program: &ResolvedProgram) -> String {
        let mut generator = Generator { out: String::new() };

        generator.emit_header();
        for (ip, op) in program.ops().iter().enumerate() {
            generator.emit_op(ip, op);
        }
        generator.emit_trailer();

        generator.out
    }

    fn line(&mut self, line: &str) {
        self.out.push_str(line);
        self.out.push('\n');
    }

    fn comment(&mut self, op: &Op) {
        match op {
            Op::Push(value) => self.line(&format!("\t;; -- push {} --", value)),
            other => self.line(&format!("\t;; -- {} --", other.word())),
        }
    }

    fn label(&mut self, ip: usize) {
        self.line(&format!("addr_{}:", ip));
    }

    fn emit_header(&mut self) {
        self.line("segment .text");
        self.line("global _start");
        self.out.push_str(DUMP_ROUTINE);
        self.line("_start:");
    }

    fn emit_op(&mut self, ip: usize, op: &Op) {
        self.comment(op);
        match op {
            Op::Push(value) => {
                self.line(&format!("\tpush {}", value));
            }
            Op::Plus => {
                self.line("\tpop rax");
                self.line("\tpop rbx");
                self.line("\tadd rax, rbx");
                self.line("\tpush rax");
            }
            Op::Minus => {
                self.line("\tpop rax");
                self.line("\tpop rbx");
                self.line("\tsub rbx, rax");
                self.line("\tpush rbx");
            }
            Op::Dup => {
                self.line("\tpop rax");
                self.line("\tpush rax");
                self.line("\tpush rax");
            }
            Op::Dump => {
                self.line("\tpop rdi");
                self.line("\tcall dump");
            }
            // comparisons materialize 0/1 with a conditional move so the
            // generated code stays branch-free, like the simulator's
            Op::Equal => {
                self.line("\tmov rcx, 0");
                self.line("\tmov rdx, 1");
                self.line("\tpop rax");
                self.line("\tpop rbx");
                self.line("\tcmp rax, rbx");
                self.line("\tcmove rcx, rdx");
                self.line("\tpush rcx");
            }
            Op::Gt => {
                self.line("\tmov rcx, 0");
                self.line("\tmov rdx, 1");
                self.line("\tpop rbx");
                self.line("\tpop rax");
                self.line("\tcmp rax, rbx");
                self.line("\tcmovg rcx, rdx");
                self.line("\tpush rcx");
            }
            Op::If { target } => {
                self.line("\tpop rax");
                self.line("\ttest rax, rax");
                self.line(&format!("\tjz addr_{}", resolved_target(*target, ip)));
            }
            Op::Else { target } => {
                self.line(&format!("\tjmp addr_{}", resolved_target(*target, ip)));
                self.label(ip + 1);
            }
            Op::End => {
                self.label(ip);
            }
        }
    }

    fn emit_trailer(&mut self) {
        self.line("\t;; -- exit --");
        self.line("\tmov rax, 0x3c");
        self.line("\tmov rdi, 0x0");
        self.line("\tsyscall");
    }
}

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

    fn generate(source: &str) -> String {
        let program = parse_program(Lexer::new("<test>", source)).unwrap();
        Generator::generate(&resolve(program).unwrap())
    }

    #[test]
    fn test_header_and_trailer() {
        let asm = generate("34 .");
        assert!(asm.starts_with("segment .text\nglobal _start\n"));
        assert!(asm.contains("\ndump:\n"));
        assert!(asm.contains("\n_start:\n"));
        assert!(asm.ends_with("\tmov rax, 0x3c\n\tmov rdi, 0x0\n\tsyscall\n"));
    }

    #[test]
    fn test_push_and_dump() {
        let asm = generate("34 .");
        assert!(asm.contains("\t;; -- push 34 --\n\tpush 34\n"));
        assert!(asm.contains("\t;; -- . --\n\tpop rdi\n\tcall dump\n"));
    }

    #[test]
    fn test_minus_preserves_operand_order() {
        let asm = generate("10 3 -");
        assert!(asm.contains("\tpop rax\n\tpop rbx\n\tsub rbx, rax\n\tpush rbx\n"));
    }

    #[test]
    fn test_comparisons_use_conditional_moves() {
        let asm = generate("1 2 > 1 1 =");
        assert!(asm.contains(
            "\tmov rcx, 0\n\tmov rdx, 1\n\tpop rbx\n\tpop rax\n\tcmp rax, rbx\n\tcmovg rcx, rdx\n\tpush rcx\n"
        ));
        assert!(asm.contains(
            "\tmov rcx, 0\n\tmov rdx, 1\n\tpop rax\n\tpop rbx\n\tcmp rax, rbx\n\tcmove rcx, rdx\n\tpush rcx\n"
        ));
        assert!(!asm.contains("cmovl"));
    }

    #[test]
    fn test_if_else_end_jumps_and_labels() {
        // 0:1  1:if  2:2  3:.  4:else  5:3  6:.  7:end
        let asm = generate("1 if 2 . else 3 . end");
        assert!(asm.contains("\ttest rax, rax\n\tjz addr_5\n"));
        assert!(asm.contains("\tjmp addr_7\naddr_5:\n"));
        assert!(asm.contains("\naddr_7:\n"));
    }

    #[test]
    fn test_if_without_else_targets_end_label() {
        // 0:1  1:if  2:2  3:.  4:end
        let asm = generate("1 if 2 . end");
        assert!(asm.contains("\tjz addr_4\n"));
        assert!(asm.contains("\naddr_4:\n"));
    }

    /// Every `addr_N` a jump references must be defined as a label.
    #[test]
    fn test_jump_targets_and_labels_agree() {
        let asm = generate("1 if 0 if 1 . else 2 . end else 3 . end 2 1 > if 10 . end");

        let mut referenced = Vec::new();
        let mut defined = Vec::new();
        for line in asm.lines() {
            let trimmed = line.trim();
            if let Some(target) = trimmed
                .strip_prefix("jz addr_")
                .or_else(|| trimmed.strip_prefix("jmp addr_"))
            {
                referenced.push(target.to_string());
            }
            if let Some(label) = trimmed.strip_prefix("addr_").and_then(|l| l.strip_suffix(':')) {
                defined.push(label.to_string());
            }
        }

        assert!(!referenced.is_empty());
        for target in &referenced {
            assert!(
                defined.contains(target),
                "jump to addr_{} has no matching label; listing:\n{}",
                target,
                asm
            );
        }
    }
}
