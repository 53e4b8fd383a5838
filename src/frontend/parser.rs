use crate::bytecode::{Op, Program};
use crate::frontend::lexer::{Lexer, Token};

/// A word that is neither a keyword nor a signed integer literal.
///
/// This is the only way parsing can fail, and it is fatal: the driver prints
/// the diagnostic and terminates without producing a partial program.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub path: String,
    pub row: usize,
    pub col: usize,
    pub word: String,
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}:{}:{}: invalid integer literal `{}`",
            self.path, self.row, self.col, self.word
        )
    }
}

impl std::error::Error for ParseError {}

/// Maps one token to its operation.
///
/// Exact-match keyword table; any other word must parse as an `i64` and
/// becomes a push. `if` and `else` come out with unresolved targets.
pub fn parse_op(token: &Token) -> Result<Op, ParseError> {
    let op = match token.text {
        "+" => Op::Plus,
        "-" => Op::Minus,
        "." => Op::Dump,
        "=" => Op::Equal,
        ">" => Op::Gt,
        "dup" => Op::Dup,
        "if" => Op::If { target: None },
        "else" => Op::Else { target: None },
        "end" => Op::End,
        text => match text.parse::<i64>() {
            Ok(value) => Op::Push(value),
            Err(_) => {
                return Err(ParseError {
                    path: token.path.to_string(),
                    row: token.row,
                    col: token.col,
                    word: text.to_string(),
                });
            }
        },
    };
    Ok(op)
}

/// Drains a lexer into a freshly parsed, unresolved program.
pub fn parse_program(lexer: Lexer) -> Result<Program, ParseError> {
    let ops = lexer
        .map(|token| parse_op(&token))
        .collect::<Result<Vec<Op>, ParseError>>()?;
    Ok(Program::new(ops))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> Vec<Op> {
        parse_program(Lexer::new("<test>", source)).unwrap().ops
    }

    fn parse_err(source: &str) -> ParseError {
        parse_program(Lexer::new("<test>", source)).unwrap_err()
    }

    #[test]
    fn test_keyword_table() {
        assert_eq!(
            parse("+ - . = > dup if else end"),
            vec![
                Op::Plus,
                Op::Minus,
                Op::Dump,
                Op::Equal,
                Op::Gt,
                Op::Dup,
                Op::If { target: None },
                Op::Else { target: None },
                Op::End,
            ]
        );
    }

    #[test]
    fn test_integer_literals() {
        assert_eq!(
            parse("34 -35 0 9223372036854775807"),
            vec![
                Op::Push(34),
                Op::Push(-35),
                Op::Push(0),
                Op::Push(i64::MAX),
            ]
        );
    }

    #[test]
    fn test_unknown_word_fails_with_location() {
        // `*` is not an opcode
        let err = parse_err("5 dup * .");
        assert_eq!(err.word, "*");
        assert_eq!((err.row, err.col), (0, 6));
        assert_eq!(err.path, "<test>");

        let msg = err.to_string();
        assert!(msg.starts_with("<test>:0:6: invalid integer literal"), "msg was: {}", msg);
    }

    #[test]
    fn test_error_location_on_later_line() {
        let err = parse_err("1 2 +\n  banana");
        assert_eq!((err.row, err.col), (1, 2));
    }

    #[test]
    fn test_integer_out_of_range_fails() {
        // one past i64::MAX
        let err = parse_err("9223372036854775808");
        assert_eq!(err.word, "9223372036854775808");
    }

    #[test]
    fn test_empty_source_is_empty_program() {
        assert!(parse("").is_empty());
    }
}
