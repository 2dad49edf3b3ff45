//! Parsing-session configuration
//!
//! [`Options`] bounds the recursion of the preprocessor and the declaration
//! parser, and picks how `module` blocks affect the current namespace.

use crate::constants::{MAX_INCLUDE_DEPTH, MAX_NESTING_DEPTH, MAX_RESOLVE_DEPTH};

/// How the current namespace behaves when a `module` block closes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NamespaceMode {
    /// The enclosing namespace is restored when the block closes
    #[default]
    Scoped,
    /// Entering a module overwrites the namespace for the rest of the parse
    Overwrite,
}

/// Limits and behavior switches for one [`Session`](crate::session::Session)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    pub max_include_depth: usize,
    pub max_nesting_depth: usize,
    pub max_resolve_depth: usize,
    pub namespace_mode: NamespaceMode,
}

impl Options {
    pub fn new() -> Self {
        Options {
            max_include_depth: MAX_INCLUDE_DEPTH,
            max_nesting_depth: MAX_NESTING_DEPTH,
            max_resolve_depth: MAX_RESOLVE_DEPTH,
            namespace_mode: NamespaceMode::Scoped,
        }
    }

    pub fn with_max_include_depth(mut self, depth: usize) -> Self {
        self.max_include_depth = depth;
        self
    }

    pub fn with_max_nesting_depth(mut self, depth: usize) -> Self {
        self.max_nesting_depth = depth;
        self
    }

    pub fn with_max_resolve_depth(mut self, depth: usize) -> Self {
        self.max_resolve_depth = depth;
        self
    }

    pub fn with_namespace_mode(mut self, mode: NamespaceMode) -> Self {
        self.namespace_mode = mode;
        self
    }
}

impl Default for Options {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = Options::default();
        assert_eq!(options.max_include_depth, MAX_INCLUDE_DEPTH);
        assert_eq!(options.max_nesting_depth, MAX_NESTING_DEPTH);
        assert_eq!(options.namespace_mode, NamespaceMode::Scoped);
    }

    #[test]
    fn test_builder() {
        let options = Options::new()
            .with_max_include_depth(2)
            .with_namespace_mode(NamespaceMode::Overwrite);
        assert_eq!(options.max_include_depth, 2);
        assert_eq!(options.namespace_mode, NamespaceMode::Overwrite);
    }
}
