use crate::bytecode::Op;
use crate::frontend::lexer::Token;
use crate::frontend::parser::parse_op;

/// Prints the raw token stream, one token per line, for `sim --tokens`.
pub struct TokenDumper {
    pub color: bool,
}

impl TokenDumper {
    // ANSI colors
    const RESET: &'static str = "\x1b[0m";
    const CYN: &'static str = "\x1b[36m";
    const YEL: &'static str = "\x1b[33m";
    const MAG: &'static str = "\x1b[35m";

    pub fn new() -> Self {
        TokenDumper { color: true }
    }

    pub fn no_color(mut self) -> Self {
        self.color = false;
        self
    }

    pub fn dump<'a>(&self, tokens: impl Iterator<Item = Token<'a>>) {
        for token in tokens {
            self.print_one(&token);
        }
    }

    fn print_one(&self, token: &Token) {
        let kind = kind(token);
        let colr = if self.color { self.color_for(kind) } else { "" };
        let reset = if self.color { Self::RESET } else { "" };

        println!(
            "[{:02}:{:02}] {}{:<8} {}{}",
            token.row, token.col, colr, kind, token.text, reset
        );
    }

    fn color_for(&self, kind: &'static str) -> &'static str {
        match kind {
            "INT" => Self::CYN,
            "KEYWORD" => Self::YEL,
            _ => Self::MAG,
        }
    }
}

fn kind(token: &Token) -> &'static str {
    match parse_op(token) {
        Ok(Op::Push(_)) => "INT",
        Ok(_) => "KEYWORD",
        Err(_) => "UNKNOWN",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::lexer::Lexer;

    fn kinds(source: &str) -> Vec<&'static str> {
        Lexer::new("<test>", source).map(|t| kind(&t)).collect()
    }

    #[test]
    fn test_token_kinds() {
        assert_eq!(
            kinds("34 dup + banana"),
            vec!["INT", "KEYWORD", "KEYWORD", "UNKNOWN"]
        );
    }
}
