// Schema entries produced by the declaration parser

use crate::registry::types::{NameHash, TypeCode};
use std::fmt;

/// Source location information for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SourceLocation {
    pub line: usize,
    pub column: usize,
}

impl SourceLocation {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A named type: a typedef, a sequence, or the resolved view of any type.
///
/// ```text
/// typedef uint32_t Counter;
///         ^        ^
///         |        name
///         base_name (type_code = Builtin(UInt32))
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypedefEntry {
    pub hash: NameHash,
    /// The type code this entry advertises
    pub type_code: TypeCode,
    pub name: String,
    /// Name of the aliased type; for a struct, the struct's own name
    pub base_name: String,
    pub namespace: String,
    /// `None` when not a sequence, `Some(0)` for an unbounded sequence
    pub bound: Option<u32>,
}

impl TypedefEntry {
    pub fn is_sequence(&self) -> bool {
        self.bound.is_some()
    }

    pub fn is_bounded(&self) -> bool {
        matches!(self.bound, Some(n) if n > 0)
    }
}

/// A struct field, or a free variable declared at top level
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variable {
    pub hash: NameHash,
    /// Resolved underlying type, `None` when the type is unknown
    pub ty: Option<TypedefEntry>,
    pub is_key: bool,
    pub name: String,
    /// Owning struct, empty for a global declaration
    pub struct_name: String,
    /// Namespace the type name was qualified with, if any
    pub from_namespace: String,
}

impl Variable {
    /// Name of the resolved type, empty when unresolved
    pub fn type_name(&self) -> &str {
        self.ty.as_ref().map(|t| t.name.as_str()).unwrap_or("")
    }

    pub fn is_global(&self) -> bool {
        self.struct_name.is_empty()
    }

    /// Render the field back as an IDL declaration line
    pub fn declaration(&self) -> String {
        if self.from_namespace.is_empty() {
            format!("{} {};\n", self.type_name(), self.name)
        } else {
            format!(
                "::{}::{} {};\n",
                self.from_namespace,
                self.type_name(),
                self.name
            )
        }
    }
}

/// Struct definition; fields are kept in declaration order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructEntry {
    pub hash: NameHash,
    pub name: String,
    pub namespace: String,
    pub fields: Vec<Variable>,
}

impl StructEntry {
    pub fn field(&self, name: &str) -> Option<&Variable> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn keys(&self) -> impl Iterator<Item = &Variable> {
        self.fields.iter().filter(|f| f.is_key)
    }
}

/// A macro invocation the parser could not classify, kept verbatim
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserDefine {
    pub line: String,
}
