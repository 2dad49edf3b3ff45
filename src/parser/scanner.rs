//! Scanner primitives
//!
//! A [`Cursor`] walks a borrowed character slice and tracks line and column
//! as it goes. Everything else in the crate (the preprocessor as well as
//! the declaration parser) is built from the readers defined here:
//!
//! - [`Cursor::skip_spaces`]: spaces and newlines
//! - [`Cursor::read_name`]: identifier, `::`-scoped names allowed
//! - [`Cursor::read_digit`]: decimal, float or hex literal
//! - [`Cursor::read_token`]: run of name characters, or of a symbol set
//! - [`Cursor::read_block`]: delimited span, quote and paren aware
//! - [`Cursor::expect_symbol`] / [`Cursor::get_symbol`]: one symbol after spaces
//!
//! Tabs are not whitespace here; the minifier has already turned them into
//! spaces.

use crate::errors::{ErrorKind, IdlError};
use crate::parser::ast::SourceLocation;

pub(crate) fn is_name_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || c == ':'
}

pub(crate) fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == ':'
}

/// Text captured by [`Cursor::read_block`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    /// Captured text, without opener and terminator
    pub text: String,
    /// Source characters consumed, including opener and terminator
    pub consumed: usize,
    /// Whether the terminator was found before end of input
    pub terminated: bool,
}

/// Position-tracking reader over a character slice
#[derive(Debug, Clone)]
pub struct Cursor<'a> {
    input: &'a [char],
    file: &'a str,
    position: usize,
    line: usize,
    column: usize,
    /// Source line of each input line, when the input was minified
    line_map: &'a [usize],
}

impl<'a> Cursor<'a> {
    pub fn new(input: &'a [char], file: &'a str) -> Self {
        Self::with_origin(input, file, SourceLocation::new(1, 1))
    }

    /// Cursor over a slice that starts at `origin` in `file`
    pub fn with_origin(
        input: &'a [char],
        file: &'a str,
        origin: SourceLocation,
    ) -> Self {
        Cursor {
            input,
            file,
            position: 0,
            line: origin.line,
            column: origin.column,
            line_map: &[],
        }
    }

    /// Report lines through `line_map` (see `minify_mapped`)
    pub fn with_line_map(mut self, line_map: &'a [usize]) -> Self {
        self.line_map = line_map;
        self
    }

    pub fn file(&self) -> &'a str {
        self.file
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn current_location(&self) -> SourceLocation {
        let line = self
            .line
            .checked_sub(1)
            .and_then(|i| self.line_map.get(i))
            .copied()
            .unwrap_or(self.line);
        SourceLocation::new(line, self.column)
    }

    /// Build an error located at the cursor
    pub fn error(&self, kind: ErrorKind) -> IdlError {
        IdlError::new(kind, self.file, self.current_location())
    }

    pub fn peek(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    pub fn peek_ahead(&self, n: usize) -> Option<char> {
        self.input.get(self.position + n).copied()
    }

    pub fn advance(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.position += 1;

        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }

        Some(ch)
    }

    /// Unread part of the input
    pub fn rest(&self) -> &'a [char] {
        &self.input[self.position..]
    }

    pub fn is_at_end(&self) -> bool {
        self.position >= self.input.len()
    }

    /// Only spaces between the previous newline (or start) and the cursor
    pub fn at_line_start(&self) -> bool {
        self.input[..self.position]
            .iter()
            .rev()
            .find(|&&c| c != ' ')
            .map_or(true, |&c| c == '\n')
    }

    /// Skip spaces and newlines, returning how many were skipped
    pub fn skip_spaces(&mut self) -> usize {
        let start = self.position;
        while matches!(self.peek(), Some(' ') | Some('\n')) {
            self.advance();
        }
        self.position - start
    }

    fn peek_past_spaces(&self) -> Option<char> {
        self.input[self.position..]
            .iter()
            .copied()
            .find(|&c| c != ' ' && c != '\n')
    }

    /// Read an identifier made of alphanumerics, `_` and `:`
    pub fn read_name(&mut self) -> Result<String, IdlError> {
        self.skip_spaces();

        match self.peek() {
            Some(c) if is_name_start(c) => {}
            other => {
                return Err(self.error(ErrorKind::InvalidName {
                    found: other.map_or_else(
                        || "end of input".to_string(),
                        |c| format!("'{}'", c),
                    ),
                }));
            }
        }

        let mut name = String::new();
        while let Some(c) = self.peek() {
            if !is_name_char(c) {
                break;
            }
            name.push(c);
            self.advance();
        }
        Ok(name)
    }

    /// Read a numeric literal: `0x1F`, `42`, `3.5`, `1e-3`, `2.5f`
    pub fn read_digit(&mut self) -> Result<String, IdlError> {
        self.skip_spaces();
        let mut digits = String::new();

        if self.peek() == Some('0') && matches!(self.peek_ahead(1), Some('x' | 'X')) {
            digits.push('0');
            self.advance();
            digits.extend(self.advance());
            while let Some(c) = self.peek() {
                if !c.is_ascii_hexdigit() {
                    break;
                }
                digits.push(c);
                self.advance();
            }
            if digits.len() == 2 {
                return Err(self.error(ErrorKind::InvalidNumber(digits)));
            }
            return Ok(digits);
        }

        let mut seen_dot = false;
        let mut seen_exponent = false;
        while let Some(c) = self.peek() {
            let prev = digits.chars().last();
            let after_digit = prev.is_some_and(|p| p.is_ascii_digit());

            if c.is_ascii_digit() {
                digits.push(c);
            } else if c == '.' && after_digit && !seen_dot && !seen_exponent {
                seen_dot = true;
                digits.push(c);
            } else if matches!(c, 'e' | 'E') && after_digit && !seen_exponent {
                seen_exponent = true;
                digits.push(c);
            } else if matches!(c, '+' | '-') && matches!(prev, Some('e' | 'E')) {
                digits.push(c);
            } else if matches!(c, 'f' | 'F') && after_digit {
                digits.push(c);
                self.advance();
                break;
            } else {
                break;
            }
            self.advance();
        }

        if digits.is_empty() {
            let found = self.peek().map(String::from).unwrap_or_default();
            return Err(self.error(ErrorKind::InvalidNumber(found)));
        }
        Ok(digits)
    }

    /// Read a run of name characters, or of characters from `symbols`.
    ///
    /// Stops at the first character that does not match; the result may be
    /// empty.
    pub fn read_token(&mut self, symbols: Option<&str>) -> String {
        self.skip_spaces();
        let mut token = String::new();

        while let Some(c) = self.peek() {
            let matched = match symbols {
                Some(set) => set.contains(c),
                None => is_name_char(c),
            };
            if !matched {
                break;
            }
            token.push(c);
            self.advance();
        }
        token
    }

    /// Read a delimited span ending at `to`.
    ///
    /// When the next character is `from` it is consumed as the opener, so
    /// callers leave it in place. An unmatched `)` is always an error.
    /// String literals are copied as-is, parentheses are balanced, and
    /// when `from` and `to` differ they are balanced too. The span ends at
    /// the first `to` seen with every counter at zero.
    pub fn read_block(
        &mut self,
        from: Option<char>,
        to: char,
    ) -> Result<Block, IdlError> {
        let start = self.position;
        while self.peek() == Some(' ') {
            self.advance();
        }

        let nested = from.is_some_and(|f| f != to);
        let mut text = String::new();
        let mut in_string = false;
        let mut escaped = false;
        let mut parens = 0usize;
        let mut depth = 0usize;
        let mut terminated = false;

        if let Some(f) = from {
            if self.peek() == Some(f) {
                self.advance();
                match f {
                    '"' => in_string = true,
                    '(' => parens += 1,
                    _ => {}
                }
                if nested {
                    depth += 1;
                }
            }
        }

        while let Some(c) = self.peek() {
            if in_string {
                if c == '"' && !escaped {
                    in_string = false;
                    if c == to {
                        self.advance();
                        terminated = true;
                        break;
                    }
                }
                escaped = c == '\\' && !escaped;
                text.push(c);
                self.advance();
                continue;
            }

            // Line continuation
            if c == '\\' && self.peek_ahead(1) == Some('\n') {
                self.advance();
                self.advance();
                continue;
            }

            if c == '"' {
                in_string = true;
                escaped = false;
            } else {
                if nested && Some(c) == from {
                    depth += 1;
                } else if nested && c == to {
                    if depth == 0 {
                        return Err(self.error(ErrorKind::UnbalancedDelimiter {
                            open: from.unwrap_or(to),
                            close: to,
                        }));
                    }
                    depth -= 1;
                }

                if c == '(' {
                    parens += 1;
                } else if c == ')' {
                    if parens == 0 {
                        return Err(self.error(ErrorKind::UnbalancedDelimiter {
                            open: '(',
                            close: ')',
                        }));
                    }
                    parens -= 1;
                }

                if c == to && parens == 0 && depth == 0 {
                    self.advance();
                    terminated = true;
                    break;
                }
            }

            text.push(c);
            self.advance();
        }

        if !terminated && (in_string || parens > 0 || depth > 0) {
            let close = if in_string {
                '"'
            } else if parens > 0 {
                ')'
            } else {
                to
            };
            return Err(self.error(ErrorKind::UnterminatedBlock { close }));
        }

        Ok(Block {
            text,
            consumed: self.position - start,
            terminated,
        })
    }

    /// Rest of the current line, trimmed; the newline is consumed
    pub fn read_line(&mut self) -> String {
        let mut line = String::new();
        while let Some(c) = self.advance() {
            if c == '\n' {
                break;
            }
            line.push(c);
        }
        line.trim().to_string()
    }

    /// Skip spaces, then consume `symbol` or fail
    pub fn expect_symbol(&mut self, symbol: char) -> Result<(), IdlError> {
        self.skip_spaces();
        match self.peek() {
            Some(c) if c == symbol => {
                self.advance();
                Ok(())
            }
            Some(c) => Err(self.error(ErrorKind::UnexpectedSymbol {
                expected: format!("'{}'", symbol),
                found: c,
            })),
            None => Err(self.error(ErrorKind::UnexpectedEof {
                expected: format!("'{}'", symbol),
            })),
        }
    }

    /// Next character after spaces, without consuming anything.
    ///
    /// With `allowed` set, anything outside the set is an error.
    pub fn get_symbol(&self, allowed: Option<&str>) -> Result<Option<char>, IdlError> {
        let next = self.peek_past_spaces();
        let Some(set) = allowed else {
            return Ok(next);
        };

        match next {
            Some(c) if set.contains(c) => Ok(Some(c)),
            Some(c) => Err(self.error(ErrorKind::UnexpectedSymbol {
                expected: format!("one of \"{}\"", set),
                found: c,
            })),
            None => Err(self.error(ErrorKind::UnexpectedEof {
                expected: format!("one of \"{}\"", set),
            })),
        }
    }
}
