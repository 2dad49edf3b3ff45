//! # Introduction
//!
//! idlkit is a front end for a subset of OMG IDL. It preprocesses IDL
//! source, parses the declarations and resolves every type, leaving a
//! schema of modules, structs, typedefs, fields and key annotations for a
//! code generator to consume.
//!
//! ## Pipeline
//!
//! ```text
//! Source → Preprocessor → Parser → TypeRegistry → Schema → Generator
//! ```
//!
//! 1. [`preprocessor`]: strips comments, applies `#ifdef`/`#define`/`#include`
//!    and macro substitution, producing directive-free text.
//! 2. [`parser`]: scanner primitives and the recursive-descent declaration
//!    parser.
//! 3. [`registry`]: builtin keywords, user typedefs and structs, and type
//!    resolution through typedef chains.
//! 4. [`session`]: the [`session::Session`] context tying the stages
//!    together, and the [`session::Generator`] hook run after parsing.
//!
//! ## Supported IDL subset
//!
//! Declarations: `module`, `struct` (with `@key` fields), `typedef`,
//! `sequence<T>` and `sequence<T,N>`, top-level variables.
//! Not supported: arrays, unions, enums, maps, bitsets, nested inline type
//! declarations, evaluation of `#if`/`#elif` expressions.
//!
//! ## Example
//!
//! ```
//! use idlkit::session::Session;
//!
//! let mut session = Session::new();
//! let text = session
//!     .preprocess("", "sensor.idl", "struct Sensor { @key int32_t id; double value; };")
//!     .unwrap();
//! session.parse(&text).unwrap();
//!
//! let sensor = &session.structs()[0];
//! assert_eq!(sensor.fields[0].name, "id");
//! assert!(sensor.fields[0].is_key);
//! ```

pub mod config;
pub mod constants;
pub mod errors;
pub mod parser;
pub mod preprocessor;
pub mod registry;
pub mod session;
