//! Declaration parsing implementation
//!
//! This module handles the declarations that register something in the
//! session:
//!
//! - Struct definitions: `struct Name { ... }`
//! - Typedefs: `typedef BASE NAME`, `typedef sequence<T[,N]> NAME`
//! - Variables: struct fields and top-level declarations
//!
//! # Grammar
//!
//! ```text
//! struct_def ::= "struct" identifier "{" field* "}" ";"?
//! field      ::= "@key"? type identifier ";"
//! typedef    ::= "typedef" (type | sequence) identifier ";"
//! sequence   ::= "sequence" "<" type ("," number)? ">"
//! type       ::= ("::"? identifier "::")* identifier
//! ```
//!
//! Field statements that do not fit the grammar are dropped with a log
//! message rather than failing the parse, and so are typedefs of unknown
//! types.
//!
//! All parsing methods are implemented as `pub(crate)` methods on the [`Parser`] struct.

use crate::constants::KEY_ANNOTATION;
use crate::errors::{ErrorKind, IdlError};
use crate::parser::ast::{SourceLocation, StructEntry, TypedefEntry, Variable};
use crate::parser::parse::Parser;
use crate::parser::scanner::Cursor;
use crate::preprocessor::minify::minify;
use crate::registry::types::{Builtin, NameHash, TypeCode};

impl Parser<'_> {
    /// Parse `NAME { fields }` after the `struct` keyword
    pub(crate) fn parse_struct(&mut self) -> Result<(), IdlError> {
        let name = self.cursor.read_name()?;
        self.cursor.get_symbol(Some("{"))?;
        self.cursor.skip_spaces();

        // read_block consumes the opener so its brace count starts at one
        let brace = self.cursor.current_location();
        let origin = SourceLocation::new(brace.line, brace.column + 1);
        let body = self.cursor.read_block(Some('{'), '}')?;
        if !body.terminated {
            return Err(self.cursor.error(ErrorKind::UnterminatedBlock { close: '}' }));
        }

        let fields = self.parse_fields(&name, &body.text, origin)?;
        let entry = StructEntry {
            hash: NameHash::of(&name),
            name,
            namespace: self.session.namespace.clone(),
            fields,
        };
        self.session
            .registry
            .add_struct(entry)
            .map_err(|kind| self.error_at(kind, origin))?;

        if self.cursor.get_symbol(None)? == Some(';') {
            self.cursor.expect_symbol(';')?;
        }
        Ok(())
    }

    fn parse_fields(
        &mut self,
        struct_name: &str,
        body: &str,
        origin: SourceLocation,
    ) -> Result<Vec<Variable>, IdlError> {
        let body = minify(body);
        let input: Vec<char> = body.chars().collect();
        let mut cursor = Cursor::with_origin(&input, self.cursor.file(), origin);
        let mut fields = Vec::new();

        loop {
            cursor.skip_spaces();
            if cursor.is_at_end() {
                break;
            }

            let statement = cursor.read_block(None, ';')?;
            let tokens: Vec<&str> = statement.text.split_whitespace().collect();

            match tokens.as_slice() {
                [ty, name] => fields.push(self.parse_field(struct_name, ty, name, false)?),
                [annotation, ty, name] if *annotation == KEY_ANNOTATION => {
                    fields.push(self.parse_field(struct_name, ty, name, true)?)
                }
                [annotation, _, _] => log::warn!(
                    "unrecognized annotation '{}' in struct '{}', dropping '{}'",
                    annotation,
                    struct_name,
                    statement.text.trim()
                ),
                [] => {}
                _ => log::trace!(
                    "dropping statement '{}' in struct '{}'",
                    statement.text.trim(),
                    struct_name
                ),
            }
        }
        Ok(fields)
    }

    fn parse_field(
        &mut self,
        struct_name: &str,
        ty: &str,
        name: &str,
        is_key: bool,
    ) -> Result<Variable, IdlError> {
        let (type_name, from_namespace) = remove_namespace(ty);
        self.parse_variable(&type_name, struct_name, name, &from_namespace, is_key)
    }

    /// Parse `BASE NAME` (the text of a typedef without `typedef` and `;`)
    pub(crate) fn parse_typedef(
        &mut self,
        statement: &str,
        location: SourceLocation,
    ) -> Result<(), IdlError> {
        let normalized = normalize_typedef(statement);
        let tokens: Vec<&str> = normalized.split_whitespace().collect();
        let [base, name] = tokens.as_slice() else {
            return Err(self.error_at(
                ErrorKind::MalformedTypedef(statement.trim().to_string()),
                location,
            ));
        };

        if let Some(args) = base.strip_prefix("sequence<") {
            return self.parse_sequence(args, name, statement, location);
        }

        let (base, _) = remove_namespace(base);
        let registry = &self.session.registry;
        let code = registry
            .lookup(&base)
            .map_err(|kind| self.error_at(kind, location))?;

        let Some(code) = code.filter(TypeCode::is_type) else {
            log::error!(
                "{}:{}: unknown type '{}' in typedef of '{}'",
                self.cursor.file(),
                location,
                base,
                name
            );
            return Ok(());
        };

        let entry = TypedefEntry {
            hash: NameHash::of(name),
            type_code: code,
            name: name.to_string(),
            base_name: registry.type_name(code).to_string(),
            namespace: self.session.namespace.clone(),
            bound: None,
        };
        self.session
            .registry
            .add_typedef(entry)
            .map_err(|kind| self.error_at(kind, location))?;
        Ok(())
    }

    /// Parse `T>` or `T,N>` following `sequence<`
    fn parse_sequence(
        &mut self,
        args: &str,
        name: &str,
        statement: &str,
        location: SourceLocation,
    ) -> Result<(), IdlError> {
        let malformed = || {
            self.error_at(
                ErrorKind::MalformedSequence(statement.trim().to_string()),
                location,
            )
        };

        let args = args.strip_suffix('>').ok_or_else(malformed)?;
        let (element, bound) = match args.split_once(',') {
            Some((element, bound)) => (element, Some(bound)),
            None => (args, None),
        };
        if element.is_empty() || element.contains(|c: char| c == '<' || c == '>') {
            return Err(malformed());
        }

        let bound = match bound {
            Some(text) => self.parse_bound(text, statement, location)?,
            None => 0,
        };

        let (element, _) = remove_namespace(element);
        let base_name = match self.session.registry.resolve_name(&element) {
            Some(resolved) => resolved.name,
            None => {
                log::warn!(
                    "{}:{}: sequence '{}' has unknown element type '{}'",
                    self.cursor.file(),
                    location,
                    name,
                    element
                );
                element
            }
        };

        let entry = TypedefEntry {
            hash: NameHash::of(name),
            type_code: TypeCode::Builtin(Builtin::Sequence),
            name: name.to_string(),
            base_name,
            namespace: self.session.namespace.clone(),
            bound: Some(bound),
        };
        self.session
            .registry
            .add_typedef(entry)
            .map_err(|kind| self.error_at(kind, location))?;
        Ok(())
    }

    fn parse_bound(
        &self,
        text: &str,
        statement: &str,
        location: SourceLocation,
    ) -> Result<u32, IdlError> {
        let input: Vec<char> = text.chars().collect();
        let mut cursor = Cursor::with_origin(&input, self.cursor.file(), location);
        let digits = cursor.read_digit()?;
        if !cursor.is_at_end() {
            return Err(self.error_at(
                ErrorKind::MalformedSequence(statement.trim().to_string()),
                location,
            ));
        }

        let value = match digits
            .strip_prefix("0x")
            .or_else(|| digits.strip_prefix("0X"))
        {
            Some(hex) => u32::from_str_radix(hex, 16),
            None => digits.parse::<u32>(),
        };
        value.map_err(|_| self.error_at(ErrorKind::InvalidNumber(digits.clone()), location))
    }

    /// Resolve `type_name` and record a variable of that type.
    ///
    /// The variable always lands in the session's flat variable list; the
    /// caller attaches it to its struct when there is one.
    pub(crate) fn parse_variable(
        &mut self,
        type_name: &str,
        struct_name: &str,
        name: &str,
        from_namespace: &str,
        is_key: bool,
    ) -> Result<Variable, IdlError> {
        let registry = &self.session.registry;
        let type_hash = registry
            .hash_of(type_name)
            .map_err(|kind| self.cursor.error(kind))?;

        let ty = registry.resolve(type_hash);
        if ty.is_none() {
            log::warn!(
                "{}: '{}' has unresolved type '{}'",
                self.cursor.file(),
                name,
                type_name
            );
        }

        let variable = Variable {
            hash: NameHash::of(name),
            ty,
            is_key,
            name: name.to_string(),
            struct_name: struct_name.to_string(),
            from_namespace: from_namespace.to_string(),
        };

        if variable.is_global() {
            log::debug!(
                "storing global variable '{}' of type '{}'",
                name,
                variable.type_name()
            );
        } else {
            log::debug!(
                "storing field '{}.{}' of type '{}' (key: {}, namespace: '{}')",
                struct_name,
                name,
                variable.type_name(),
                is_key,
                from_namespace
            );
        }

        self.session.variables.push(variable.clone());
        Ok(variable)
    }
}

/// Split a qualified name into its last segment and its scope.
///
/// `::Core::Id` gives `("Id", "Core")`, `Id` gives `("Id", "")`.
pub(crate) fn remove_namespace(name: &str) -> (String, String) {
    let segments: Vec<&str> = name.split("::").filter(|s| !s.is_empty()).collect();
    match segments.split_last() {
        Some((last, scope)) if !scope.is_empty() => (last.to_string(), scope.join("::")),
        _ => (name.trim_start_matches(':').to_string(), String::new()),
    }
}

/// Drop the spaces around `<`, `>` and `,` and collapse the rest
fn normalize_typedef(statement: &str) -> String {
    let mut out = String::with_capacity(statement.len());
    for c in statement.trim().chars() {
        match c {
            '<' | '>' | ',' => {
                while out.ends_with(' ') {
                    out.pop();
                }
                out.push(c);
            }
            c if c.is_whitespace() => {
                if !out.ends_with(|p: char| matches!(p, ' ' | '<' | ',')) {
                    out.push(' ');
                }
            }
            c => out.push(c),
        }
    }
    out
}
