// Default limits and fixed names for the IDL front end

/// Deepest `#include` chain accepted before giving up
pub const MAX_INCLUDE_DEPTH: usize = 32;

/// Deepest `{ }` nesting accepted by the declaration parser
pub const MAX_NESTING_DEPTH: usize = 64;

/// Longest typedef chain followed when resolving a type
pub const MAX_RESOLVE_DEPTH: usize = 64;

/// Dynamic macro holding `"file:line"` of the current position
pub const FILE_MACRO: &str = "__FILE__";

/// Dynamic macro holding the current line number
pub const LINE_MACRO: &str = "__LINE__";

/// Annotation marking a struct field as part of the key
pub const KEY_ANNOTATION: &str = "@key";
