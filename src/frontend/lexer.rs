/// A positioned word of source text.
///
/// Row and column are zero-based; the column is a byte offset into the line.
/// Tokens borrow from the source buffer and are consumed once by the parser.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Token<'a> {
    pub path: &'a str,
    pub row: usize,
    pub col: usize,
    pub text: &'a str,
}

/// Splits source text into whitespace-delimited words, lazily.
///
/// A word starting with `#` discards the rest of its line. Lexing cannot
/// fail: any other non-whitespace run is a valid token, and an empty file
/// yields an empty sequence. Re-lexing a file means constructing a fresh
/// `Lexer` over the same buffer.
pub struct Lexer<'a> {
    path: &'a str,
    lines: std::iter::Enumerate<std::str::Lines<'a>>,
    row: usize,
    line: &'a str,
    col: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(path: &'a str, source: &'a str) -> Self {
        Lexer {
            path,
            lines: source.lines().enumerate(),
            row: 0,
            line: "",
            col: 0,
        }
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Token<'a>> {
        loop {
            let rest = &self.line[self.col..];
            let trimmed = rest.trim_start();
            self.col += rest.len() - trimmed.len();

            if trimmed.is_empty() || trimmed.starts_with('#') {
                let (row, line) = self.lines.next()?;
                self.row = row;
                self.line = line;
                self.col = 0;
                continue;
            }

            let len = trimmed
                .find(char::is_whitespace)
                .unwrap_or(trimmed.len());
            let token = Token {
                path: self.path,
                row: self.row,
                col: self.col,
                text: &trimmed[..len],
            };
            self.col += len;
            return Some(token);
        }
    }
}
