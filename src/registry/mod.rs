//! Type registry
//!
//! The registry owns the three symbol tables of a parsing session:
//!
//! - the keyword table (builtin types and base keywords), fixed at creation
//! - the user typedef list
//! - the user struct list
//!
//! Each table is indexed by [`NameHash`]. A side table maps every hash
//! handed out back to its name; registering a second, different name with
//! the same hash fails with [`ErrorKind::HashCollision`] instead of
//! silently aliasing the two declarations.
//!
//! Resolution of a name to its final representation lives in
//! [`resolve`](self::resolve).

pub mod resolve;
pub mod types;

use crate::constants::MAX_RESOLVE_DEPTH;
use crate::errors::ErrorKind;
use crate::parser::ast::{StructEntry, TypedefEntry};
use rustc_hash::FxHashMap;
use types::{BaseKeyword, Builtin, NameHash, TypeCode};

/// Symbol tables of one parsing session
#[derive(Debug, Clone)]
pub struct TypeRegistry {
    keywords: FxHashMap<NameHash, TypeCode>,
    typedefs: Vec<TypedefEntry>,
    structs: Vec<StructEntry>,
    /// First registration wins when a name is declared twice
    typedef_index: FxHashMap<NameHash, usize>,
    struct_index: FxHashMap<NameHash, usize>,
    names: FxHashMap<NameHash, String>,
    max_resolve_depth: usize,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::with_resolve_depth(MAX_RESOLVE_DEPTH)
    }

    pub fn with_resolve_depth(max_resolve_depth: usize) -> Self {
        let mut keywords = FxHashMap::default();
        let mut names = FxHashMap::default();

        for builtin in Builtin::ALL {
            let hash = NameHash::of(builtin.name());
            keywords.insert(hash, TypeCode::Builtin(builtin));
            names.insert(hash, builtin.name().to_string());
        }
        for base in BaseKeyword::ALL {
            let hash = NameHash::of(base.name());
            keywords.insert(hash, TypeCode::Base(base));
            names.insert(hash, base.name().to_string());
        }

        TypeRegistry {
            keywords,
            typedefs: Vec::new(),
            structs: Vec::new(),
            typedef_index: FxHashMap::default(),
            struct_index: FxHashMap::default(),
            names,
            max_resolve_depth,
        }
    }

    /// Hash `name`, recording it so later collisions are caught
    pub fn intern(&mut self, name: &str) -> Result<NameHash, ErrorKind> {
        let hash = NameHash::of(name);
        match self.names.get(&hash) {
            Some(existing) if existing != name => Err(ErrorKind::HashCollision {
                existing: existing.clone(),
                incoming: name.to_string(),
            }),
            Some(_) => Ok(hash),
            None => {
                self.names.insert(hash, name.to_string());
                Ok(hash)
            }
        }
    }

    /// Hash `name` for a lookup, failing if the hash belongs to another name
    pub fn hash_of(&self, name: &str) -> Result<NameHash, ErrorKind> {
        let hash = NameHash::of(name);
        match self.names.get(&hash) {
            Some(existing) if existing != name => Err(ErrorKind::HashCollision {
                existing: existing.clone(),
                incoming: name.to_string(),
            }),
            _ => Ok(hash),
        }
    }

    /// Classify a hashed name.
    ///
    /// Tables are searched in order: builtin types, base keywords,
    /// typedefs, structs. The first hit wins.
    pub fn classify(&self, hash: NameHash) -> Option<TypeCode> {
        if let Some(builtin) = self.is_builtin_type(hash) {
            return Some(TypeCode::Builtin(builtin));
        }
        if let Some(base) = self.is_builtin_base(hash) {
            return Some(TypeCode::Base(base));
        }
        if let Some(i) = self.is_typedef(hash) {
            return Some(TypeCode::Typedef(i));
        }
        self.is_struct(hash).map(TypeCode::Struct)
    }

    /// [`classify`](Self::classify) by name, with collision checking
    pub fn lookup(&self, name: &str) -> Result<Option<TypeCode>, ErrorKind> {
        Ok(self.classify(self.hash_of(name)?))
    }

    pub fn is_builtin_type(&self, hash: NameHash) -> Option<Builtin> {
        match self.keywords.get(&hash) {
            Some(TypeCode::Builtin(builtin)) => Some(*builtin),
            _ => None,
        }
    }

    pub fn is_builtin_base(&self, hash: NameHash) -> Option<BaseKeyword> {
        match self.keywords.get(&hash) {
            Some(TypeCode::Base(base)) => Some(*base),
            _ => None,
        }
    }

    pub fn is_typedef(&self, hash: NameHash) -> Option<usize> {
        self.typedef_index.get(&hash).copied()
    }

    pub fn is_struct(&self, hash: NameHash) -> Option<usize> {
        self.struct_index.get(&hash).copied()
    }

    /// Typedef or struct declared by the user
    pub fn is_user_base(&self, hash: NameHash) -> Option<TypeCode> {
        self.is_typedef(hash)
            .map(TypeCode::Typedef)
            .or_else(|| self.is_struct(hash).map(TypeCode::Struct))
    }

    pub fn add_typedef(
        &mut self,
        entry: TypedefEntry,
    ) -> Result<TypeCode, ErrorKind> {
        let hash = self.intern(&entry.name)?;
        let index = self.typedefs.len();
        log::debug!(
            "storing typedef '{}' -> '{}' (bound {:?}, namespace '{}')",
            entry.name,
            entry.base_name,
            entry.bound,
            entry.namespace
        );
        self.typedefs.push(entry);
        self.typedef_index.entry(hash).or_insert(index);
        Ok(TypeCode::Typedef(index))
    }

    pub fn add_struct(&mut self, entry: StructEntry) -> Result<TypeCode, ErrorKind> {
        let hash = self.intern(&entry.name)?;
        let index = self.structs.len();
        log::debug!(
            "storing struct '{}' with {} field(s) (namespace '{}')",
            entry.name,
            entry.fields.len(),
            entry.namespace
        );
        self.structs.push(entry);
        self.struct_index.entry(hash).or_insert(index);
        Ok(TypeCode::Struct(index))
    }

    pub fn typedefs(&self) -> &[TypedefEntry] {
        &self.typedefs
    }

    pub fn structs(&self) -> &[StructEntry] {
        &self.structs
    }

    pub fn find_typedef(&self, name: &str) -> Option<&TypedefEntry> {
        self.is_typedef(NameHash::of(name))
            .and_then(|i| self.typedefs.get(i))
    }

    pub fn find_struct(&self, name: &str) -> Option<&StructEntry> {
        self.is_struct(NameHash::of(name))
            .and_then(|i| self.structs.get(i))
    }

    /// Drop every user registration, keeping the keyword table
    pub fn clear(&mut self) {
        self.typedefs.clear();
        self.structs.clear();
        self.typedef_index.clear();
        self.struct_index.clear();
        let keywords = &self.keywords;
        self.names.retain(|hash, _| keywords.contains_key(hash));
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}
