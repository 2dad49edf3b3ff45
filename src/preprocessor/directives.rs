//! Directive handling and macro substitution
//!
//! The [`Preprocessor`] walks minified text once. A `#` that starts a line
//! begins a directive; everything else is copied to the output while the
//! conditional stack is enabled, with macro names replaced by their values.
//!
//! # Directives
//!
//! | Directive            | Effect                                          |
//! |----------------------|-------------------------------------------------|
//! | `#ifdef N`/`#ifndef N` | push whether `N` is (not) defined             |
//! | `#if ...`            | push an enabled frame, the condition is ignored |
//! | `#elif ...`          | ignored                                         |
//! | `#else`              | flip the innermost frame                        |
//! | `#endif`             | pop the innermost frame                         |
//! | `#define N V`        | bind `N` to the rest of the line                |
//! | `#undef N`           | remove `N`                                      |
//! | `#pragma ...`        | discarded                                       |
//! | `#include "f"`/`<f>` | splice the preprocessed text of `f`             |
//!
//! `define`, `undef` and `include` only act while enabled. Directive lines
//! never reach the output.
//!
//! # Substitution
//!
//! Runs of `[A-Za-z0-9_]` outside string and character literals are looked
//! up in the define table. A hit is replaced by its value, or deleted when
//! the value is empty or `0`. Replacement text is not rescanned.

use std::path::{Path, PathBuf};

use super::defines::DefineTable;
use super::loader::{parent_dir, SourceLoader};
use super::minify::{is_char_literal, minify_mapped};
use crate::config::Options;
use crate::constants::{FILE_MACRO, LINE_MACRO};
use crate::errors::{ErrorKind, IdlError};
use crate::parser::ast::SourceLocation;
use crate::parser::scanner::Cursor;

/// Expands one translation unit against a shared define table
pub struct Preprocessor<'s> {
    defines: &'s mut DefineTable,
    loader: &'s dyn SourceLoader,
    options: &'s Options,
    depth: usize,
}

impl<'s> Preprocessor<'s> {
    pub fn new(
        defines: &'s mut DefineTable,
        loader: &'s dyn SourceLoader,
        options: &'s Options,
    ) -> Self {
        Preprocessor {
            defines,
            loader,
            options,
            depth: 0,
        }
    }

    /// Preprocess `text`, read from `file_name`.
    ///
    /// Relative includes are looked up as given first, then under
    /// `base_dir`.
    pub fn run(
        &mut self,
        base_dir: &Path,
        file_name: &str,
        text: &str,
    ) -> Result<String, IdlError> {
        log::debug!("preprocessing {} (include depth {})", file_name, self.depth);

        let minified = minify_mapped(text);
        let input: Vec<char> = minified.text.chars().collect();
        let mut cursor = Cursor::new(&input, file_name).with_line_map(&minified.lines);
        let mut conditionals: Vec<bool> = Vec::new();
        let mut out = String::with_capacity(minified.text.len());
        let mut last_line = 0;

        while let Some(c) = cursor.peek() {
            let line = cursor.current_location().line;
            if line != last_line {
                self.set_position(file_name, line);
                last_line = line;
            }

            if c == '#' && cursor.at_line_start() {
                self.directive(&mut cursor, base_dir, &mut conditionals, &mut out)?;
                // An include may have moved __FILE__ elsewhere
                last_line = 0;
                continue;
            }

            if !conditionals.iter().all(|&enabled| enabled) {
                cursor.advance();
                continue;
            }

            self.copy_text(&mut cursor, &mut out);
        }

        if !conditionals.is_empty() {
            return Err(cursor.error(ErrorKind::UnterminatedConditional {
                depth: conditionals.len(),
            }));
        }
        Ok(out)
    }

    fn set_position(&mut self, file_name: &str, line: usize) {
        self.defines
            .define(FILE_MACRO, format!("\"{}:{}\"", file_name, line));
        self.defines.define(LINE_MACRO, line.to_string());
    }

    fn directive(
        &mut self,
        cursor: &mut Cursor,
        base_dir: &Path,
        conditionals: &mut Vec<bool>,
        out: &mut String,
    ) -> Result<(), IdlError> {
        let location = cursor.current_location();
        cursor.advance();
        skip_blanks(cursor);

        let mut name = String::new();
        while let Some(c) = cursor.peek() {
            if !(c.is_ascii_alphanumeric() || c == '_') {
                break;
            }
            name.push(c);
            cursor.advance();
        }

        let enabled = conditionals.iter().all(|&enabled| enabled);
        let file = cursor.file();
        let located = |kind| IdlError::new(kind, file, location);

        match name.as_str() {
            "ifdef" | "ifndef" => {
                let symbol = macro_name(cursor)?;
                cursor.read_line();
                let defined = self.defines.is_defined(&symbol);
                conditionals.push(if name == "ifdef" { defined } else { !defined });
            }
            "if" => {
                let condition = cursor.read_line();
                log::warn!(
                    "{}:{}: #if {} is not evaluated, treating it as true",
                    file,
                    location,
                    condition
                );
                conditionals.push(true);
            }
            "elif" => {
                let condition = cursor.read_line();
                log::warn!("{}:{}: ignoring #elif {}", file, location, condition);
            }
            "else" => {
                let top = conditionals
                    .last_mut()
                    .ok_or_else(|| located(ErrorKind::ElseWithoutIf))?;
                *top = !*top;
                cursor.read_line();
            }
            "endif" => {
                conditionals
                    .pop()
                    .ok_or_else(|| located(ErrorKind::EndifWithoutIf))?;
                cursor.read_line();
            }
            "define" => {
                let symbol = macro_name(cursor)?;
                let value = cursor.read_line();
                if enabled {
                    log::debug!("#define {} {}", symbol, value);
                    self.defines.define(symbol, value);
                }
            }
            "undef" => {
                let symbol = macro_name(cursor)?;
                cursor.read_line();
                if enabled {
                    log::debug!("#undef {}", symbol);
                    self.defines.undef(&symbol);
                }
            }
            "pragma" => {
                let rest = cursor.read_line();
                log::trace!("discarding #pragma {}", rest);
            }
            "include" => {
                skip_blanks(cursor);
                let (open, close) = match cursor.get_symbol(Some("\"<"))? {
                    Some('<') => ('<', '>'),
                    _ => ('"', '"'),
                };
                let block = cursor.read_block(Some(open), close)?;
                if !block.terminated {
                    return Err(cursor.error(ErrorKind::UnterminatedBlock { close }));
                }
                cursor.read_line();
                if enabled {
                    let included = self.include(&block.text, base_dir, file, location)?;
                    out.push_str(&included);
                }
            }
            _ => return Err(located(ErrorKind::UnknownDirective(name.clone()))),
        }
        Ok(())
    }

    fn include(
        &mut self,
        name: &str,
        base_dir: &Path,
        from: &str,
        location: SourceLocation,
    ) -> Result<String, IdlError> {
        if self.depth >= self.options.max_include_depth {
            return Err(IdlError::new(
                ErrorKind::IncludeTooDeep {
                    limit: self.options.max_include_depth,
                },
                from,
                location,
            ));
        }

        let candidates = [PathBuf::from(name), base_dir.join(name)];
        let found = candidates.iter().find_map(|path| match self.loader.load(path) {
            Ok(text) => Some((path, text)),
            Err(err) => {
                log::trace!("{}: {}", path.display(), err);
                None
            }
        });
        let Some((path, text)) = found else {
            return Err(IdlError::new(
                ErrorKind::IncludeNotFound(name.to_string()),
                from,
                location,
            ));
        };

        log::debug!("#include {}", path.display());
        let file_name = path.display().to_string();
        self.depth += 1;
        let result = self.run(&parent_dir(path), &file_name, &text);
        self.depth -= 1;
        result
    }

    /// Copy one literal, word or character of enabled text
    fn copy_text(&self, cursor: &mut Cursor, out: &mut String) {
        match cursor.peek() {
            Some('\'') if is_char_literal(cursor.rest(), 0) => {
                let len = if cursor.peek_ahead(1) == Some('\\') { 4 } else { 3 };
                for _ in 0..len {
                    out.extend(cursor.advance());
                }
            }
            Some('"') => {
                out.extend(cursor.advance());
                let mut escaped = false;
                while let Some(c) = cursor.advance() {
                    out.push(c);
                    if c == '"' && !escaped {
                        break;
                    }
                    escaped = c == '\\' && !escaped;
                }
            }
            Some(c) if is_word_char(c) => {
                let mut word = String::new();
                while let Some(c) = cursor.peek() {
                    if !is_word_char(c) {
                        break;
                    }
                    word.push(c);
                    cursor.advance();
                }
                match self.defines.get(&word) {
                    Some(value) if value.is_empty() || value == "0" => {}
                    Some(value) => out.push_str(value),
                    None => out.push_str(&word),
                }
            }
            Some(_) => out.extend(cursor.advance()),
            None => {}
        }
    }
}

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn skip_blanks(cursor: &mut Cursor) {
    while cursor.peek() == Some(' ') {
        cursor.advance();
    }
}

/// Name operand of a directive, which must be on the same line
fn macro_name(cursor: &mut Cursor) -> Result<String, IdlError> {
    skip_blanks(cursor);
    match cursor.peek() {
        None | Some('\n') => Err(cursor.error(ErrorKind::InvalidName {
            found: "end of line".to_string(),
        })),
        Some(_) => cursor.read_name(),
    }
}
