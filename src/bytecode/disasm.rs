use crate::bytecode::{Op, ResolvedProgram};

/// Print a resolved program as an address-prefixed listing.
pub fn print_ops(program: &ResolvedProgram) {
    print!("{}", disassemble_to_string(program.ops()));
}

/// Return the listing as a String.
///
/// Rows that are jump targets are marked so block structure can be read off
/// the listing at a glance.
pub fn disassemble_to_string(ops: &[Op]) -> String {
    let targets = collect_jump_targets(ops);
    let mut output = String::new();

    for (ip, op) in ops.iter().enumerate() {
        output.push_str(&format!("{:04} ", ip));

        if targets.contains(&ip) {
            output.push_str("► ");
        } else {
            output.push_str("  ");
        }

        output.push_str(&format_op(op));
        output.push('\n');
    }

    output
}

fn collect_jump_targets(ops: &[Op]) -> Vec<usize> {
    let mut targets = Vec::new();

    for op in ops {
        if let Op::If { target: Some(t) } | Op::Else { target: Some(t) } = op {
            if !targets.contains(t) {
                targets.push(*t);
            }
        }
    }

    targets
}

fn format_op(op: &Op) -> String {
    match op {
        Op::Push(n) => format!("PUSH   {}", n),
        Op::Plus => "PLUS".to_string(),
        Op::Minus => "MINUS".to_string(),
        Op::Dup => "DUP".to_string(),
        Op::Dump => "DUMP".to_string(),
        Op::Equal => "EQUAL".to_string(),
        Op::Gt => "GT".to_string(),
        Op::If { target } => format!("IF     (→ {})", format_target(target)),
        Op::Else { target } => format!("ELSE   (→ {})", format_target(target)),
        Op::End => "END".to_string(),
    }
}

fn format_target(target: &Option<usize>) -> String {
    match target {
        Some(t) => format!("{:04}", t),
        None => "????".to_string(),
    }
}
