//! Error types for the IDL front end
//!
//! Every malformed input is fatal: the operation that hit it returns an
//! [`IdlError`] immediately and nothing after that point is processed.
//! The error carries the [`ErrorKind`], the file being processed and the
//! 1-based position inside that file.
//!
//! The only anomalies that are *not* errors are the lenient cases of the
//! declaration parser (dropped field statements, unknown typedef bases,
//! unresolved field types). Those are logged and skipped.

use crate::parser::ast::SourceLocation;
use thiserror::Error;

/// What went wrong.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ErrorKind {
    /// A name was required but the input does not start with `[A-Za-z_:]`
    #[error("bad name: expected an identifier, found {found}")]
    InvalidName { found: String },

    #[error("unexpected end of input, expected {expected}")]
    UnexpectedEof { expected: String },

    #[error("bad '{found}' symbol, expecting {expected}")]
    UnexpectedSymbol { expected: String, found: char },

    /// A closing delimiter without its opener
    #[error("unbalanced counts of '{open}' and '{close}' symbols")]
    UnbalancedDelimiter { open: char, close: char },

    /// End of input while a delimited block was still open
    #[error("unterminated block, missing '{close}'")]
    UnterminatedBlock { close: char },

    #[error("unknown preprocessor directive \"#{0}\"")]
    UnknownDirective(String),

    #[error("#else without a matching #ifdef, #ifndef or #if")]
    ElseWithoutIf,

    #[error("#endif without a matching #ifdef, #ifndef or #if")]
    EndifWithoutIf,

    #[error("{depth} conditional block(s) left open at end of input")]
    UnterminatedConditional { depth: usize },

    #[error("can't find \"{0}\" file")]
    IncludeNotFound(String),

    /// The file handed to the session could not be read; the error has no
    /// position inside it and is reported at `0:0`
    #[error("can't read \"{path}\": {reason}")]
    FileNotFound { path: String, reason: String },

    #[error("#include nested deeper than {limit} levels")]
    IncludeTooDeep { limit: usize },

    #[error("blocks nested deeper than {limit} levels")]
    NestingTooDeep { limit: usize },

    #[error("unknown symbol '{0}'")]
    UnknownSymbol(char),

    #[error("unknown token \"{0}\"")]
    UnknownToken(String),

    #[error("malformed typedef \"{0}\"")]
    MalformedTypedef(String),

    #[error("malformed sequence \"{0}\"")]
    MalformedSequence(String),

    #[error("invalid numeric literal \"{0}\"")]
    InvalidNumber(String),

    /// Two distinct names hash to the same key
    #[error("name \"{incoming}\" collides with \"{existing}\"")]
    HashCollision { existing: String, incoming: String },
}

/// A fatal error, located in a source file.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{file}:{location}: {kind}")]
pub struct IdlError {
    pub kind: ErrorKind,
    pub file: String,
    pub location: SourceLocation,
}

impl IdlError {
    pub fn new(
        kind: ErrorKind,
        file: impl Into<String>,
        location: SourceLocation,
    ) -> Self {
        IdlError {
            kind,
            file: file.into(),
            location,
        }
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_file_and_position() {
        let err = IdlError::new(
            ErrorKind::UnknownDirective("iff".to_string()),
            "types.idl",
            SourceLocation::new(3, 1),
        );
        assert_eq!(
            err.to_string(),
            "types.idl:3:1: unknown preprocessor directive \"#iff\""
        );
    }

    #[test]
    fn test_unexpected_symbol_message() {
        let kind = ErrorKind::UnexpectedSymbol {
            expected: "'{'".to_string(),
            found: ';',
        };
        assert_eq!(kind.to_string(), "bad ';' symbol, expecting '{'");
    }
}
