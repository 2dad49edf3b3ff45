//! Main parser coordinator
//!
//! This module provides the [`Parser`] struct and the block loop that drives
//! it over preprocessed text.
//!
//! # Parser Architecture
//!
//! The Parser is a recursive descent over `{ }` blocks:
//! - This module: Parser struct, the block loop and token dispatch
//! - `declarations`: struct bodies, typedefs, sequences and variables
//!
//! Each leading identifier is classified through the session's
//! [`TypeRegistry`](crate::registry::TypeRegistry):
//!
//! ```text
//! int32_t x;              type          -> global variable
//! sequence<T,N> S;        sequence      -> typedef
//! typedef T A;            typedef       -> typedef
//! struct S { ... };       struct        -> struct
//! module M { ... }        module        -> nested block in namespace M
//! MACRO(args);            defined macro -> user define line
//! ```
//!
//! # Implementation
//!
//! Parser methods are split across multiple files using `impl Parser` blocks,
//! each extending the Parser with related functionality while sharing the
//! cursor and the session.

use crate::config::NamespaceMode;
use crate::errors::{ErrorKind, IdlError};
use crate::parser::ast::{SourceLocation, UserDefine};
use crate::parser::scanner::{is_name_start, Cursor};
use crate::registry::types::{BaseKeyword, Builtin, TypeCode};
use crate::session::Session;

/// Recursive descent parser over preprocessed IDL
pub struct Parser<'a> {
    pub(crate) cursor: Cursor<'a>,
    pub(crate) session: &'a mut Session,
    pub(crate) depth: usize,
}

impl<'a> Parser<'a> {
    pub fn new(input: &'a [char], file: &'a str, session: &'a mut Session) -> Self {
        Parser {
            cursor: Cursor::new(input, file),
            session,
            depth: 0,
        }
    }

    /// Parse every declaration of the input into the session
    pub fn parse(&mut self) -> Result<(), IdlError> {
        log::debug!("parsing {}", self.cursor.file());
        self.parse_block()
    }

    pub(crate) fn error_at(&self, kind: ErrorKind, location: SourceLocation) -> IdlError {
        IdlError::new(kind, self.cursor.file(), location)
    }

    /// Parse declarations until the `}` closing the current block
    fn parse_block(&mut self) -> Result<(), IdlError> {
        loop {
            self.cursor.skip_spaces();

            let Some(c) = self.cursor.peek() else {
                if self.depth > 0 {
                    return Err(self.cursor.error(ErrorKind::UnexpectedEof {
                        expected: "'}'".to_string(),
                    }));
                }
                return Ok(());
            };

            match c {
                ';' => {
                    self.cursor.advance();
                }
                '{' => {
                    self.cursor.advance();
                    self.parse_nested_block()?;
                }
                '}' => {
                    if self.depth == 0 {
                        return Err(self.cursor.error(ErrorKind::UnbalancedDelimiter {
                            open: '{',
                            close: '}',
                        }));
                    }
                    self.cursor.advance();
                    return Ok(());
                }
                c if is_name_start(c) => self.parse_declaration()?,
                c => return Err(self.cursor.error(ErrorKind::UnknownSymbol(c))),
            }
        }
    }

    /// Parse the body of a block whose `{` was just consumed
    fn parse_nested_block(&mut self) -> Result<(), IdlError> {
        let limit = self.session.options.max_nesting_depth;
        if self.depth >= limit {
            return Err(self.cursor.error(ErrorKind::NestingTooDeep { limit }));
        }

        self.depth += 1;
        let result = self.parse_block();
        self.depth -= 1;
        result
    }

    fn parse_declaration(&mut self) -> Result<(), IdlError> {
        let location = self.cursor.current_location();
        let token = self.cursor.read_token(None);
        log::trace!("token '{}' at {}", token, location);

        let code = self
            .session
            .registry
            .lookup(&token)
            .map_err(|kind| self.error_at(kind, location))?;
        let next = self.cursor.get_symbol(None)?;

        match code {
            Some(TypeCode::Builtin(Builtin::Sequence)) if next == Some('<') => {
                let statement = self.read_statement()?;
                self.parse_typedef(&format!("{}{}", token, statement), location)
            }
            Some(TypeCode::Base(BaseKeyword::Typedef)) => {
                let statement = self.read_statement()?;
                self.parse_typedef(&statement, location)
            }
            Some(TypeCode::Base(BaseKeyword::Struct)) => self.parse_struct(),
            Some(TypeCode::Base(BaseKeyword::Module)) => self.parse_module(),
            Some(_) => {
                let declarator = self.read_statement()?;
                self.parse_variable(&token, "", declarator.trim(), "", false)?;
                Ok(())
            }
            None if self.session.defines.is_defined(&token) => {
                let args = self.cursor.read_block(None, ')')?;
                let line = format!("{}{});", token, args.text);
                log::debug!("storing user define '{}'", line);
                self.session.user_defines.push(UserDefine { line });
                Ok(())
            }
            None => Err(self.error_at(ErrorKind::UnknownToken(token), location)),
        }
    }

    /// Text up to the next `;`, which must be present
    fn read_statement(&mut self) -> Result<String, IdlError> {
        let block = self.cursor.read_block(None, ';')?;
        if !block.terminated {
            return Err(self.cursor.error(ErrorKind::UnterminatedBlock { close: ';' }));
        }
        Ok(block.text)
    }

    fn parse_module(&mut self) -> Result<(), IdlError> {
        let name = self.cursor.read_name()?;
        log::debug!("entering module '{}'", name);
        let outer = std::mem::replace(&mut self.session.namespace, name);

        self.cursor.expect_symbol('{')?;
        self.parse_nested_block()?;

        if self.session.options.namespace_mode == NamespaceMode::Scoped {
            self.session.namespace = outer;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Options;

    fn parse(session: &mut Session, source: &str) -> Result<(), IdlError> {
        let input: Vec<char> = source.chars().collect();
        Parser::new(&input, "test.idl", session).parse()
    }

    #[test]
    fn test_empty_statements_and_blocks() {
        let mut session = Session::new();
        parse(&mut session, " ; ;\n{ ; { } }\n").unwrap();
        assert!(session.structs().is_empty());
    }

    #[test]
    fn test_global_variable() {
        let mut session = Session::new();
        parse(&mut session, "double ratio;\n").unwrap();
        let v = &session.variables()[0];
        assert_eq!(v.name, "ratio");
        assert!(v.is_global());
        assert_eq!(v.type_name(), "double");
    }

    #[test]
    fn test_user_type_declares_global() {
        let mut session = Session::new();
        parse(&mut session, "typedef int64_t Stamp;\nStamp created;\n").unwrap();
        let v = &session.variables()[0];
        assert_eq!(v.name, "created");
        assert_eq!(v.type_name(), "int64_t");
    }

    #[test]
    fn test_scoped_modules_restore_namespace() {
        let mut session = Session::new();
        parse(
            &mut session,
            "module Outer { module Inner { struct A { int8_t x; }; }; struct B { int8_t y; }; };\nstruct C { int8_t z; };",
        )
        .unwrap();
        let namespaces: Vec<&str> = session.structs().iter().map(|s| s.namespace.as_str()).collect();
        assert_eq!(namespaces, ["Inner", "Outer", ""]);
        assert_eq!(session.namespace(), "");
    }

    #[test]
    fn test_overwrite_modules_keep_namespace() {
        let options = Options::default().with_namespace_mode(NamespaceMode::Overwrite);
        let mut session = Session::with_options(options);
        parse(
            &mut session,
            "module Outer { module Inner { }; struct B { int8_t y; }; };\nstruct C { int8_t z; };",
        )
        .unwrap();
        let namespaces: Vec<&str> = session.structs().iter().map(|s| s.namespace.as_str()).collect();
        assert_eq!(namespaces, ["Inner", "Inner"]);
        assert_eq!(session.namespace(), "Inner");
    }

    #[test]
    fn test_user_define_line() {
        let mut session = Session::new();
        session.define("DDS_TOPIC", "");
        parse(&mut session, "DDS_TOPIC(Sensor, \"a)b\");\n").unwrap();
        assert_eq!(session.user_defines()[0].line, "DDS_TOPIC(Sensor, \"a)b\");");
    }

    #[test]
    fn test_user_define_rejects_stray_paren() {
        let mut session = Session::new();
        session.define("DDS_TOPIC", "");
        let err = parse(&mut session, "DDS_TOPIC a, b);\n").unwrap_err();
        assert!(matches!(err.kind, ErrorKind::UnbalancedDelimiter { open: '(', .. }));
        assert!(session.user_defines().is_empty());
    }

    #[test]
    fn test_unknown_token() {
        let mut session = Session::new();
        let err = parse(&mut session, "\n  interface Foo {};").unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnknownToken("interface".to_string()));
        assert_eq!(err.location, SourceLocation::new(2, 3));
        assert_eq!(err.file, "test.idl");
    }

    #[test]
    fn test_unknown_symbol() {
        let mut session = Session::new();
        let err = parse(&mut session, "int32_t a;\n@key").unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnknownSymbol('@'));
        // Declarations before the failure are kept
        assert_eq!(session.variables().len(), 1);
    }

    #[test]
    fn test_unbalanced_braces() {
        let mut session = Session::new();
        let err = parse(&mut session, "struct A { int8_t x; }; }").unwrap_err();
        assert!(matches!(err.kind, ErrorKind::UnbalancedDelimiter { .. }));

        let err = parse(&mut Session::new(), "module M { struct A { int8_t x; };").unwrap_err();
        assert!(matches!(err.kind, ErrorKind::UnexpectedEof { .. }));
    }

    #[test]
    fn test_nesting_limit() {
        let options = Options::default().with_max_nesting_depth(3);
        let mut session = Session::with_options(options);
        assert!(parse(&mut session, "{{{}}}").is_ok());
        let err = parse(&mut session, "{{{{}}}}").unwrap_err();
        assert_eq!(err.kind, ErrorKind::NestingTooDeep { limit: 3 });
    }

    #[test]
    fn test_missing_semicolon() {
        let mut session = Session::new();
        let err = parse(&mut session, "int32_t x").unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnterminatedBlock { close: ';' });
    }
}
