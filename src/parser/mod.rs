//! IDL declaration parser
//!
//! This module turns preprocessed IDL text into entries of the session's
//! type registry:
//! - [`scanner`]: cursor and reading primitives (names, numbers, blocks)
//! - [`parse`]: the block loop dispatching on each leading keyword
//! - [`ast`]: schema entry definitions
//!
//! # Supported IDL subset
//!
//! - Blocks: `module NAME { ... }`, bare `{ ... }`
//! - Declarations: `struct`, `typedef`, `sequence<T[,N]>`, variables of any
//!   known type, and invocations of defined macros kept verbatim
//! - Struct fields: `TYPE NAME;` and `@key TYPE NAME;`
//!
//! # Parser Implementation
//!
//! Hand-written recursive descent over a character cursor.
//! No external parser generator dependencies.

pub mod ast;
mod declarations;
pub mod parse;
pub mod scanner;
