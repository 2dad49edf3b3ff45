//! Type identities
//!
//! Every name the parser meets is classified into one [`TypeCode`]:
//!
//! ```text
//! Builtin(id)   int32_t, string, sequence, ...
//! Base(id)      struct, module, typedef
//! Typedef(i)    i-th user typedef
//! Struct(i)     i-th user struct
//! ```
//!
//! Names are compared through their [`NameHash`]. The registry checks that
//! no two distinct names share a hash, so a hash identifies a name.

use rustc_hash::FxHasher;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Hash of a declared name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NameHash(pub u64);

impl NameHash {
    pub fn of(name: &str) -> Self {
        let mut hasher = FxHasher::default();
        name.hash(&mut hasher);
        NameHash(hasher.finish())
    }
}

impl fmt::Display for NameHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#018x}", self.0)
    }
}

/// Builtin type keywords
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Builtin {
    Void,
    Octet,
    Int8,
    Int16,
    Short,
    Int32,
    Int,
    Long,
    Int64,
    LongLong,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    Bool,
    Boolean,
    Char,
    Float,
    String,
    Double,
    Sequence,
    Const,
}

impl Builtin {
    pub const ALL: [Builtin; 22] = [
        Builtin::Void,
        Builtin::Octet,
        Builtin::Int8,
        Builtin::Int16,
        Builtin::Short,
        Builtin::Int32,
        Builtin::Int,
        Builtin::Long,
        Builtin::Int64,
        Builtin::LongLong,
        Builtin::UInt8,
        Builtin::UInt16,
        Builtin::UInt32,
        Builtin::UInt64,
        Builtin::Bool,
        Builtin::Boolean,
        Builtin::Char,
        Builtin::Float,
        Builtin::String,
        Builtin::Double,
        Builtin::Sequence,
        Builtin::Const,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Builtin::Void => "void",
            Builtin::Octet => "octet",
            Builtin::Int8 => "int8_t",
            Builtin::Int16 => "int16_t",
            Builtin::Short => "short",
            Builtin::Int32 => "int32_t",
            Builtin::Int => "int",
            Builtin::Long => "long",
            Builtin::Int64 => "int64_t",
            // Never produced by the token reader, which stops at the space
            Builtin::LongLong => "long long",
            Builtin::UInt8 => "uint8_t",
            Builtin::UInt16 => "uint16_t",
            Builtin::UInt32 => "uint32_t",
            Builtin::UInt64 => "uint64_t",
            Builtin::Bool => "bool",
            Builtin::Boolean => "boolean",
            Builtin::Char => "char",
            Builtin::Float => "float",
            Builtin::String => "string",
            Builtin::Double => "double",
            Builtin::Sequence => "sequence",
            Builtin::Const => "const",
        }
    }

    /// Stable numeric id, the position in [`Builtin::ALL`]
    pub fn id(self) -> usize {
        self as usize
    }
}

/// Declaration keywords
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BaseKeyword {
    Struct,
    Module,
    Typedef,
}

impl BaseKeyword {
    pub const ALL: [BaseKeyword; 3] =
        [BaseKeyword::Struct, BaseKeyword::Module, BaseKeyword::Typedef];

    pub fn name(self) -> &'static str {
        match self {
            BaseKeyword::Struct => "struct",
            BaseKeyword::Module => "module",
            BaseKeyword::Typedef => "typedef",
        }
    }
}

/// Identity of any type reference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeCode {
    Builtin(Builtin),
    Base(BaseKeyword),
    /// Index into the registry's typedef list
    Typedef(usize),
    /// Index into the registry's struct list
    Struct(usize),
}

impl TypeCode {
    pub fn is_builtin(&self) -> bool {
        matches!(self, TypeCode::Builtin(_))
    }

    pub fn is_user(&self) -> bool {
        matches!(self, TypeCode::Typedef(_) | TypeCode::Struct(_))
    }

    /// Whether a name with this code can start a variable declaration
    pub fn is_type(&self) -> bool {
        !matches!(self, TypeCode::Base(_))
    }
}
