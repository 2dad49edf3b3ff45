//! Preprocessor
//!
//! Turns raw IDL text into the text the declaration parser sees:
//!
//! ```text
//! source ──► minify ──► directives + macro substitution ──► expanded text
//!               │                 │
//!               │                 └── #include ──► SourceLoader ──► (recurse)
//!               └── comments and redundant whitespace dropped
//! ```
//!
//! Macro definitions live in a [`DefineTable`] owned by the session, so they
//! persist across includes and across later calls.

pub mod defines;
pub mod directives;
pub mod loader;
pub mod minify;

pub use defines::DefineTable;
pub use directives::Preprocessor;
pub use loader::{FsLoader, MemoryLoader, SourceLoader};
pub use minify::minify;
