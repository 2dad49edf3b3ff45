//! Parsing session
//!
//! A [`Session`] is the single context value threaded through the whole
//! pipeline. It owns the type registry, the define table, the current
//! namespace and the schema lists, and nothing outside it is mutated:
//!
//! ```text
//! text ──► preprocess ──► parse ──► Schema (structs, typedefs, variables, user defines)
//!              │             │
//!              └─ defines ◄──┴─► registry
//! ```
//!
//! Declarations accumulate across calls until [`Session::clear`].

use std::path::Path;

use crate::config::Options;
use crate::errors::{ErrorKind, IdlError};
use crate::parser::ast::{SourceLocation, StructEntry, TypedefEntry, UserDefine, Variable};
use crate::parser::parse::Parser;
use crate::preprocessor::defines::DefineTable;
use crate::preprocessor::directives::Preprocessor;
use crate::preprocessor::loader::{parent_dir, FsLoader, SourceLoader};
use crate::registry::TypeRegistry;

/// Produces output from a parsed session
pub trait Generator {
    fn generate(&mut self, session: &Session) -> String;
}

/// Registry, define table, namespace and schema of one parse
pub struct Session {
    pub(crate) registry: TypeRegistry,
    pub(crate) variables: Vec<Variable>,
    pub(crate) user_defines: Vec<UserDefine>,
    pub(crate) defines: DefineTable,
    pub(crate) namespace: String,
    pub(crate) options: Options,
    loader: Box<dyn SourceLoader>,
}

impl Session {
    pub fn new() -> Self {
        Self::with_options(Options::default())
    }

    pub fn with_options(options: Options) -> Self {
        Session {
            registry: TypeRegistry::with_resolve_depth(options.max_resolve_depth),
            variables: Vec::new(),
            user_defines: Vec::new(),
            defines: DefineTable::new(),
            namespace: String::new(),
            options,
            loader: Box::new(FsLoader),
        }
    }

    /// Replace the loader used for `#include` and [`preprocess_file`](Self::preprocess_file)
    pub fn with_loader(mut self, loader: impl SourceLoader + 'static) -> Self {
        self.loader = Box::new(loader);
        self
    }

    pub fn define(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.defines.define(name, value);
    }

    pub fn undef(&mut self, name: &str) -> Option<String> {
        self.defines.undef(name)
    }

    pub fn is_defined(&self, name: &str) -> bool {
        self.defines.is_defined(name)
    }

    /// Expand directives and macros in `text`.
    ///
    /// `base_dir` is where relative includes are looked up after trying
    /// them as given; `file_name` names the text in errors and `__FILE__`.
    pub fn preprocess(
        &mut self,
        base_dir: impl AsRef<Path>,
        file_name: &str,
        text: &str,
    ) -> Result<String, IdlError> {
        Preprocessor::new(&mut self.defines, &*self.loader, &self.options).run(
            base_dir.as_ref(),
            file_name,
            text,
        )
    }

    /// Load `path` through the session's loader and preprocess it.
    ///
    /// A file that cannot be loaded fails with [`ErrorKind::FileNotFound`]
    /// at location `0:0`, since no position inside it exists.
    pub fn preprocess_file(&mut self, path: impl AsRef<Path>) -> Result<String, IdlError> {
        let path = path.as_ref();
        let file_name = path.display().to_string();
        let text = self.loader.load(path).map_err(|err| {
            log::error!("{}: {}", file_name, err);
            IdlError::new(
                ErrorKind::FileNotFound {
                    path: file_name.clone(),
                    reason: err.to_string(),
                },
                file_name.as_str(),
                SourceLocation::default(),
            )
        })?;
        self.preprocess(parent_dir(path), &file_name, &text)
    }

    /// Parse preprocessed text into the session
    pub fn parse(&mut self, text: &str) -> Result<(), IdlError> {
        self.parse_named("<input>", text)
    }

    /// [`parse`](Self::parse), naming the text `file_name` in errors
    pub fn parse_named(&mut self, file_name: &str, text: &str) -> Result<(), IdlError> {
        let input: Vec<char> = text.chars().collect();
        Parser::new(&input, file_name, self).parse()
    }

    /// Preprocess and parse the file at `path`
    pub fn parse_file(&mut self, path: impl AsRef<Path>) -> Result<(), IdlError> {
        let path = path.as_ref();
        let expanded = self.preprocess_file(path)?;
        self.parse_named(&path.display().to_string(), &expanded)
    }

    /// Preprocess and parse `text`, then hand the session to `generator`
    pub fn compile<G: Generator>(
        &mut self,
        file_name: &str,
        text: &str,
        generator: &mut G,
    ) -> Result<String, IdlError> {
        let expanded = self.preprocess(".", file_name, text)?;
        self.parse_named(file_name, &expanded)?;
        Ok(generator.generate(self))
    }

    pub fn structs(&self) -> &[StructEntry] {
        self.registry.structs()
    }

    pub fn typedefs(&self) -> &[TypedefEntry] {
        self.registry.typedefs()
    }

    /// Every variable parsed, struct fields included, in declaration order
    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    pub fn user_defines(&self) -> &[UserDefine] {
        &self.user_defines
    }

    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    pub fn defines(&self) -> &DefineTable {
        &self.defines
    }

    /// Namespace in effect at the point parsing stopped
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Forget everything parsed and defined; options and loader stay
    pub fn clear(&mut self) {
        self.registry.clear();
        self.variables.clear();
        self.user_defines.clear();
        self.defines.clear();
        self.namespace.clear();
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preprocessor::loader::MemoryLoader;

    struct StructNames;

    impl Generator for StructNames {
        fn generate(&mut self, session: &Session) -> String {
            session
                .structs()
                .iter()
                .map(|s| s.name.as_str())
                .collect::<Vec<_>>()
                .join(",")
        }
    }

    #[test]
    fn test_compile_runs_generator() {
        let mut session = Session::new();
        let out = session
            .compile(
                "shapes.idl",
                "#define SIDE int32_t\nstruct Square { SIDE side; };\nstruct Circle { float r; };",
                &mut StructNames,
            )
            .unwrap();
        assert_eq!(out, "Square,Circle");
        assert_eq!(session.structs()[0].fields[0].type_name(), "int32_t");
    }

    #[test]
    fn test_preprocess_file_uses_its_directory() {
        let loader = MemoryLoader::new()
            .with_file("idl/main.idl", "#include \"types.idl\"\nstruct A { Id id; };")
            .with_file("idl/types.idl", "typedef int64_t Id;\n");
        let mut session = Session::new().with_loader(loader);
        session.parse_file("idl/main.idl").unwrap();
        assert_eq!(session.typedefs()[0].name, "Id");
        assert_eq!(session.structs()[0].fields[0].type_name(), "int64_t");
    }

    #[test]
    fn test_missing_file() {
        let mut session = Session::new().with_loader(MemoryLoader::new());
        let err = session.preprocess_file("nope.idl").unwrap_err();
        assert!(matches!(
            &err.kind,
            ErrorKind::FileNotFound { path, .. } if path == "nope.idl"
        ));
        assert_eq!(err.location, SourceLocation::default());
        assert!(err.to_string().starts_with("nope.idl:0:0: can't read \"nope.idl\""));
    }

    #[test]
    fn test_defines_persist_between_calls() {
        let mut session = Session::new();
        session.define("WIDTH", "4");
        session.preprocess("", "a.idl", "#define HEIGHT 2\n").unwrap();
        let out = session.preprocess("", "b.idl", "WIDTH HEIGHT").unwrap();
        assert_eq!(out, "4 2");
        assert_eq!(session.undef("WIDTH"), Some("4".to_string()));
    }

    #[test]
    fn test_clear() {
        let mut session = Session::new();
        session.define("X", "1");
        session
            .parse("typedef int8_t Small; struct S { Small s; }; DDS_X(1);")
            .unwrap_err();
        assert_eq!(session.structs().len(), 1);

        session.clear();
        assert!(session.structs().is_empty());
        assert!(session.typedefs().is_empty());
        assert!(session.variables().is_empty());
        assert!(!session.is_defined("X"));
        assert!(session.registry().find_typedef("Small").is_none());
    }
}
