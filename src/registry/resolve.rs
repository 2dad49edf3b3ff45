//! Type resolution
//!
//! [`TypeRegistry::resolve`] turns a hashed type name into the
//! [`TypedefEntry`] describing its final representation.
//!
//! # Resolution Rules
//!
//! - Typedefs are searched first, then structs, then builtin types, so a
//!   user declaration shadows a builtin of the same name.
//! - A typedef is followed through its base name. The identity fields
//!   (hash, name, base name, namespace) come from the end of the chain,
//!   while the type code and the sequence bound stay those of the typedef
//!   that was asked for:
//!
//! ```text
//! typedef uint32_t A;          A -> Builtin(UInt32)
//! typedef A B;                 B -> Typedef(0)
//! resolve(B) = { name: "uint32_t", base_name: "uint32_t", type_code: Typedef(0) }
//! ```
//!
//! - A struct resolves to an entry whose base name is the struct's own
//!   name, marking a nested struct field.
//! - A builtin resolves to an entry whose name and base name are the
//!   keyword itself.

use super::types::{NameHash, TypeCode};
use super::TypeRegistry;
use crate::parser::ast::TypedefEntry;

struct ChainTooDeep(String);

impl TypeRegistry {
    /// Resolve a hashed type name, `None` when nothing matches
    pub fn resolve(&self, hash: NameHash) -> Option<TypedefEntry> {
        match self.resolve_at(hash, 0) {
            Ok(Some(resolved)) => Some(resolved),
            Ok(None) => {
                log::error!("unknown type: {}", hash);
                None
            }
            Err(ChainTooDeep(name)) => {
                log::error!(
                    "typedef chain through '{}' is deeper than {} levels",
                    name,
                    self.max_resolve_depth
                );
                None
            }
        }
    }

    pub fn resolve_name(&self, name: &str) -> Option<TypedefEntry> {
        self.resolve(NameHash::of(name))
    }

    fn resolve_at(
        &self,
        hash: NameHash,
        depth: usize,
    ) -> Result<Option<TypedefEntry>, ChainTooDeep> {
        let Some(index) = self.is_typedef(hash) else {
            return Ok(self.resolve_declared(hash));
        };
        let entry = &self.typedefs[index];
        if entry.base_name.is_empty() {
            return Ok(Some(entry.clone()));
        }

        let base = NameHash::of(&entry.base_name);
        let inner = if base == hash {
            // `typedef string string;` aliases the builtin, not itself
            self.resolve_declared(base)
        } else if depth >= self.max_resolve_depth {
            return Err(ChainTooDeep(entry.name.clone()));
        } else {
            self.resolve_at(base, depth + 1)?
        };

        Ok(Some(match inner {
            Some(inner) => TypedefEntry {
                type_code: entry.type_code,
                bound: entry.bound,
                ..inner
            },
            // Element of a sequence over an unknown type
            None => entry.clone(),
        }))
    }

    /// Struct or builtin, skipping typedefs
    fn resolve_declared(&self, hash: NameHash) -> Option<TypedefEntry> {
        if let Some(index) = self.is_struct(hash) {
            let s = &self.structs[index];
            return Some(TypedefEntry {
                hash,
                type_code: TypeCode::Struct(index),
                name: s.name.clone(),
                base_name: s.name.clone(),
                namespace: s.namespace.clone(),
                bound: None,
            });
        }

        self.is_builtin_type(hash).map(|builtin| TypedefEntry {
            hash,
            type_code: TypeCode::Builtin(builtin),
            name: builtin.name().to_string(),
            base_name: builtin.name().to_string(),
            namespace: String::new(),
            bound: None,
        })
    }

    /// Printable name of a type code
    pub fn type_name(&self, code: TypeCode) -> &str {
        match code {
            TypeCode::Builtin(builtin) => builtin.name(),
            TypeCode::Base(base) => base.name(),
            TypeCode::Typedef(i) => {
                self.typedefs.get(i).map(|t| t.name.as_str()).unwrap_or("")
            }
            TypeCode::Struct(i) => {
                self.structs.get(i).map(|s| s.name.as_str()).unwrap_or("")
            }
        }
    }

    /// Name registered under `hash` in any table
    pub fn name_of(&self, hash: NameHash) -> Option<&str> {
        self.names.get(&hash).map(String::as_str)
    }
}
