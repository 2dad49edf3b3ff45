//! Comment and whitespace minifier
//!
//! First pass of preprocessing, also applied to struct bodies before their
//! fields are split:
//!
//! - `//` and `/* */` comments are removed
//! - `\r` is dropped, tabs become spaces
//! - runs of spaces and runs of newlines collapse to one
//! - string and character literals are copied verbatim
//!
//! Collapsing looks at what was last written, so minifying minified text
//! is a no-op.

/// Minify `code` into a fresh string
pub fn minify(code: &str) -> String {
    minify_mapped(code).text
}

/// Minified text plus the source line each of its lines starts on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Minified {
    pub text: String,
    /// `lines[n]` is the 1-based source line of minified line `n + 1`
    pub lines: Vec<usize>,
}

pub fn minify_mapped(code: &str) -> Minified {
    let input: Vec<char> = code.chars().collect();
    let mut out = Output::new(code.len());
    let mut i = 0;

    while i < input.len() {
        let c = input[i];
        let next = input.get(i + 1).copied();

        match c {
            '/' if next == Some('/') => {
                while i < input.len() && input[i] != '\n' {
                    i += 1;
                }
            }
            '/' if next == Some('*') => {
                i += 2;
                while i < input.len() && !(input[i] == '*' && input.get(i + 1) == Some(&'/')) {
                    if input[i] == '\n' {
                        out.source_line += 1;
                    }
                    i += 1;
                }
                if i >= input.len() {
                    log::warn!("unterminated block comment");
                }
                i += 2;
            }
            '"' => {
                i = out.copy_string(&input, i);
            }
            '\'' if is_char_literal(&input, i) => {
                let len = if input[i + 1] == '\\' { 4 } else { 3 };
                for &ch in &input[i..i + len] {
                    out.emit(ch);
                }
                i += len;
            }
            '\r' => i += 1,
            ' ' | '\t' => {
                if !out.text.ends_with(' ') {
                    out.emit(' ');
                }
                i += 1;
            }
            '\n' => {
                if !out.text.ends_with('\n') {
                    out.emit('\n');
                }
                out.source_line += 1;
                i += 1;
            }
            _ => {
                out.emit(c);
                i += 1;
            }
        }
    }

    Minified {
        text: out.text,
        lines: out.lines,
    }
}

struct Output {
    text: String,
    lines: Vec<usize>,
    source_line: usize,
    line_open: bool,
}

impl Output {
    fn new(capacity: usize) -> Self {
        Output {
            text: String::with_capacity(capacity),
            lines: Vec::new(),
            source_line: 1,
            line_open: false,
        }
    }

    fn emit(&mut self, c: char) {
        if !self.line_open {
            self.lines.push(self.source_line);
            self.line_open = true;
        }
        self.text.push(c);
        if c == '\n' {
            self.line_open = false;
        }
    }

    /// Copy the string literal opening at `start`; returns the index after it
    fn copy_string(&mut self, input: &[char], start: usize) -> usize {
        self.emit('"');
        let mut i = start + 1;
        let mut escaped = false;

        while i < input.len() {
            let c = input[i];
            self.emit(c);
            if c == '\n' {
                self.source_line += 1;
            }
            i += 1;
            if c == '"' && !escaped {
                break;
            }
            escaped = c == '\\' && !escaped;
        }
        i
    }
}

/// `'x'` or `'\\x'` starting at `i`
pub(crate) fn is_char_literal(input: &[char], i: usize) -> bool {
    match (input.get(i + 1), input.get(i + 2), input.get(i + 3)) {
        (Some('\\'), Some(_), Some('\'')) => true,
        (Some(c), Some('\''), _) => *c != '\\',
        _ => false,
    }
}
