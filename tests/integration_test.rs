// Integration tests for the IDL front end

use idlkit::config::{NamespaceMode, Options};
use idlkit::errors::ErrorKind;
use idlkit::preprocessor::minify;
use idlkit::preprocessor::MemoryLoader;
use idlkit::registry::types::{Builtin, TypeCode};
use idlkit::session::{Generator, Session};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn compile(source: &str) -> Session {
    init_logger();
    let mut session = Session::new();
    let text = session
        .preprocess("", "test.idl", source)
        .expect("Preprocessing failed");
    session.parse_named("test.idl", &text).expect("Parsing failed");
    session
}

#[test]
fn test_struct_with_key_field() {
    let session = compile("struct S { @key int32_t id; int32_t value; };");

    let s = session.registry().find_struct("S").unwrap();
    assert_eq!(s.fields.len(), 2);
    assert_eq!(s.fields[0].name, "id");
    assert!(s.fields[0].is_key);
    assert_eq!(s.fields[1].name, "value");
    assert!(!s.fields[1].is_key);
}

#[test]
fn test_struct_layouts() {
    let session = compile(
        "struct A // first\n{\n    @key int32_t id; /* key */\n    { int8_t skipped; };\n    double value;\n};\nstruct B { A a; };",
    );

    let a = session.registry().find_struct("A").unwrap();
    let names: Vec<&str> = a.fields.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, ["id", "value"]);
    assert_eq!(a.keys().count(), 1);

    let b = session.registry().find_struct("B").unwrap();
    assert_eq!(b.fields[0].ty.as_ref().unwrap().type_code, TypeCode::Struct(0));
}

#[test]
fn test_typedef_chain_resolution() {
    let session = compile("typedef uint32_t A; typedef A B; struct S { B f; };");

    let f = session.structs()[0].field("f").unwrap();
    let ty = f.ty.as_ref().unwrap();
    assert_eq!(ty.base_name, "uint32_t");
    assert_eq!(ty.type_code, TypeCode::Typedef(0));
    assert!(!ty.type_code.is_builtin());
}

#[test]
fn test_sequence_bounds() {
    let session = compile(
        "typedef sequence<int32_t,10> Bounded;\nsequence<int32_t> Unbounded;",
    );

    let bounded = session.registry().find_typedef("Bounded").unwrap();
    assert_eq!(bounded.bound, Some(10));
    assert_eq!(bounded.base_name, "int32_t");
    assert_eq!(bounded.type_code, TypeCode::Builtin(Builtin::Sequence));

    let unbounded = session.registry().find_typedef("Unbounded").unwrap();
    assert_eq!(unbounded.bound, Some(0));
}

#[test]
fn test_macro_substitution_skips_strings() {
    init_logger();
    let mut session = Session::new();
    let out = session
        .preprocess("", "test.idl", "#define FOO 5\nint32_t FOO;\nconst string s = \"FOO\";")
        .unwrap();
    assert_eq!(out, "int32_t 5;\nconst string s = \"FOO\";");
}

#[test]
fn test_plain_text_is_only_minified() {
    init_logger();
    let samples = [
        "struct A {\n\n   int32_t x; // x\n};\n",
        "module M { /* block */ typedef double Real; };",
        "\t\tconst string s = \"a  // b\";\r\n",
    ];
    let mut session = Session::new();
    for sample in samples {
        let out = session.preprocess("", "plain.idl", sample).unwrap();
        assert_eq!(out, minify(sample), "{sample:?}");
        assert_eq!(minify(&out), out);
    }
}

#[test]
fn test_conditionals_follow_the_stack() {
    init_logger();
    let source = "\
#define LINUX
#ifdef LINUX
#ifndef LEGACY
struct Modern { int32_t v; };
#else
struct Legacy { int32_t v; };
#endif
#else
struct Other { int32_t v; };
#endif
";
    let session = compile(source);
    let names: Vec<&str> = session.structs().iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, ["Modern"]);
}

#[test]
fn test_mismatched_conditionals_are_fatal() {
    init_logger();
    let mut session = Session::new();
    let err = session.preprocess("", "bad.idl", "struct A {};\n#endif\n").unwrap_err();
    assert_eq!(err.kind, ErrorKind::EndifWithoutIf);
    assert_eq!(err.to_string(), "bad.idl:2:1: #endif without a matching #ifdef, #ifndef or #if");

    let err = session.preprocess("", "bad.idl", "#ifdef A\n").unwrap_err();
    assert_eq!(err.kind, ErrorKind::UnterminatedConditional { depth: 1 });
}

#[test]
fn test_includes_from_memory() {
    init_logger();
    let loader = MemoryLoader::new()
        .with_file("base.idl", "#define KEY @key\ntypedef int32_t Id;\n")
        .with_file("notes.idl", "// only a comment\n/* and another */\n");
    let mut session = Session::new().with_loader(loader);

    let text = session
        .preprocess(
            "",
            "main.idl",
            "#include \"base.idl\"\n#include <notes.idl>\nstruct S { KEY Id id; };\n",
        )
        .unwrap();
    // The comment-only file contributes a single newline
    assert_eq!(text, "typedef int32_t Id;\n\nstruct S { @key Id id; };\n");

    session.parse_named("main.idl", &text).unwrap();
    let field = &session.structs()[0].fields[0];
    assert!(field.is_key);
    assert_eq!(field.type_name(), "int32_t");
}

#[test]
fn test_missing_include_is_fatal() {
    init_logger();
    let mut session = Session::new().with_loader(MemoryLoader::new());
    let err = session
        .preprocess("idl", "main.idl", "#include \"gone.idl\"\n")
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::IncludeNotFound("gone.idl".to_string()));
}

#[test]
fn test_files_on_disk() {
    init_logger();
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/idl/main.idl");
    let mut session = Session::new();
    session.parse_file(path).unwrap();

    let readings = session.registry().find_typedef("Readings").unwrap();
    assert_eq!(readings.namespace, "Telemetry");
    assert_eq!(readings.bound, Some(16));
    assert_eq!(readings.base_name, "double");

    let sensor = session.registry().find_struct("Sensor").unwrap();
    assert_eq!(sensor.namespace, "Telemetry");
    let names: Vec<&str> = sensor.fields.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, ["id", "name", "history"]);
    assert_eq!(sensor.keys().count(), 1);
    assert_eq!(sensor.fields[0].type_name(), "uint64_t");
    assert_eq!(sensor.fields[2].ty.as_ref().unwrap().bound, Some(16));
    assert_eq!(session.namespace(), "");
}

#[test]
fn test_overwrite_namespace_mode() {
    init_logger();
    let options = Options::default().with_namespace_mode(NamespaceMode::Overwrite);
    let mut session = Session::with_options(options);
    session
        .parse("module A { module B { }; struct InA { int8_t x; }; };")
        .unwrap();
    assert_eq!(session.structs()[0].namespace, "B");
}

#[test]
fn test_errors_carry_position() {
    init_logger();
    let mut session = Session::new();
    let err = session
        .parse_named("pos.idl", "struct A { int8_t a; };\n\n  union U { };")
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::UnknownToken("union".to_string()));
    assert_eq!(err.to_string(), "pos.idl:3:3: unknown token \"union\"");
    // Everything before the failure is kept
    assert_eq!(session.structs().len(), 1);
}

struct Declarations;

impl Generator for Declarations {
    fn generate(&mut self, session: &Session) -> String {
        let mut out = String::new();
        for s in session.structs() {
            out.push_str(&format!("struct {} {{\n", s.name));
            for field in &s.fields {
                out.push_str("    ");
                out.push_str(&field.declaration());
            }
            out.push_str("};\n");
        }
        out
    }
}

#[test]
fn test_compile_with_generator() {
    init_logger();
    let mut session = Session::new();
    let out = session
        .compile(
            "gen.idl",
            "module Core { typedef int16_t Level; };\nstruct Probe { ::Core::Level level; boolean ok; };",
            &mut Declarations,
        )
        .unwrap();
    assert_eq!(
        out,
        "struct Probe {\n    ::Core::int16_t level;\n    boolean ok;\n};\n"
    );
}
