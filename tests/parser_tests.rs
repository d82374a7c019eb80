//! End-to-end tests: preprocess, tokenize and parse whole sources.

use rustc_hash::FxHashSet;
use sharplet::ast::*;
use sharplet::{parse_expression_text, parse_source, ParsedSource, MISSING_SEMICOLON};

fn parse(source: &str) -> ParsedSource {
    parse_source("test.src", source, FxHashSet::default()).expect("pipeline failed")
}

fn parse_with(source: &str, seed: &[&str]) -> ParsedSource {
    let symbols = seed.iter().map(|s| s.to_string()).collect();
    parse_source("test.src", source, symbols).expect("pipeline failed")
}

fn class_members(decl: &Declaration) -> &[Member] {
    match decl {
        Declaration::Class { members, .. } => members,
        other => panic!("expected class, got {:?}", other),
    }
}

#[test]
fn parses_a_full_source_file() {
    let source = r#"
using system.io;

package app.core {
    /// A counter with a guarded setter.
    public class Counter : Base, Trackable {
        int count = 0;
        public int Limit ^;

        public Counter(int limit) {
            this.Limit = limit;
        }

        /// Adds one, saturating at the limit.
        public int Increment() {
            if (count < Limit) {
                count++;
            }
            return count;
        }
    }
}
"#;
    let parsed = parse(source);
    assert!(parsed.diagnostics.is_empty());
    let unit = parsed.unit.expect("unit");
    assert_eq!(unit.usings.len(), 1);

    let Declaration::Package {
        name, declarations, ..
    } = &unit.declarations[0]
    else {
        panic!("expected package");
    };
    assert_eq!(name.join("."), "app.core");

    let class = &declarations[0];
    assert_eq!(class.doc(), Some("A counter with a guarded setter."));
    let members = class_members(class);
    assert_eq!(members.len(), 4);

    let Member::Property {
        name, set_accessor, ..
    } = &members[1]
    else {
        panic!("expected property, got {:?}", members[1]);
    };
    assert_eq!(name, "Limit");
    let set = set_accessor.as_ref().expect("setter");
    assert!(set.synthesized);
    assert!(set.modifiers.contains(&Modifier::Private));

    let Member::Method { name, doc, .. } = &members[3] else {
        panic!("expected method");
    };
    assert_eq!(name, "Increment");
    assert_eq!(doc.as_deref(), Some("Adds one, saturating at the limit."));
}

#[test]
fn node_positions_point_into_the_original_buffer() {
    let source = "#define UNUSED\nclass C {\n    int field;\n}\n";
    let parsed = parse(source);
    let unit = parsed.unit.expect("unit");
    let class = &unit.declarations[0];

    // The directive line is blanked, not removed, so the class keeps its
    // physical line and offset.
    assert_eq!(class.info().line, 2);
    assert_eq!(class.info().span.start, source.find("class").expect("class"));

    let members = class_members(class);
    let field_info = members[0].info();
    assert_eq!(field_info.line, 3);
    assert!(class.info().span.contains(&field_info.span));
    assert!(unit.info.span.contains(&class.info().span));
}

#[test]
fn conditional_compilation_selects_declarations() {
    let source = "\
#if TRACING
class Tracer { void Emit() {} }
#else
class Tracer { }
#endif
";
    let with = parse_with(source, &["TRACING"]);
    let unit = with.unit.expect("unit");
    let members = class_members(&unit.declarations[0]);
    assert_eq!(members.len(), 1);

    let without = parse(source);
    let unit = without.unit.expect("unit");
    assert_eq!(unit.declarations.len(), 1);
    assert!(class_members(&unit.declarations[0]).is_empty());
    // The surviving branch keeps its original line number.
    assert_eq!(unit.declarations[0].info().line, 4);
}

#[test]
fn pragma_suppresses_missing_semicolon_diagnostic() {
    let with_pragma = "\
class C {
    void M() {
#pragma warning disable 1001
        f()
        g();
#pragma warning restore 1001
    }
}
";
    let parsed = parse(with_pragma);
    assert!(parsed.diagnostics.is_empty(), "{:?}", parsed.diagnostics);

    let without_pragma = "\
class C {
    void M() {
        f()
        g();
    }
}
";
    let parsed = parse(without_pragma);
    assert_eq!(parsed.diagnostics.len(), 1);
    // Reported at the token that should have been preceded by the ';'.
    assert_eq!(parsed.diagnostics[0].code, MISSING_SEMICOLON);
    assert_eq!(parsed.diagnostics[0].line, 4);
}

#[test]
fn nodes_record_disabled_warnings_at_their_start() {
    let source = "\
#pragma warning disable 1002
class C { }
#pragma warning restore 1002
class D { }
";
    let parsed = parse(source);
    let unit = parsed.unit.expect("unit");
    assert_eq!(unit.declarations[0].info().disabled_warnings, vec![1002]);
    assert!(unit.declarations[1].info().disabled_warnings.is_empty());
}

#[test]
fn nested_generics_and_shifts_coexist() {
    let source = "\
class C {
    Map<string, List<int>> table;
    int M(int a, int b) {
        int c = a >> b;
        int d = a >>> 1;
        return c + d;
    }
}
";
    let parsed = parse(source);
    assert!(parsed.diagnostics.is_empty());
    let unit = parsed.unit.expect("unit");
    let members = class_members(&unit.declarations[0]);
    let Member::Field { field_type, .. } = &members[0] else {
        panic!("expected field");
    };
    let TypeRef::Named { segments, .. } = field_type else {
        panic!("expected named type");
    };
    assert_eq!(segments[0].type_args.len(), 2);
}

#[test]
fn empty_source_yields_no_unit() {
    let parsed = parse("");
    assert!(parsed.unit.is_none());
    let parsed = parse("#define ONLY_DIRECTIVES\n");
    assert!(parsed.unit.is_none());
}

#[test]
fn fatal_parse_error_carries_position() {
    let err = parse_source("bad.src", "class {\n", FxHashSet::default())
        .expect_err("expected failure");
    let message = err.to_string();
    assert!(message.contains("line 1"), "{}", message);
    assert!(message.contains("type name"), "{}", message);
}

#[test]
fn standalone_expression_entry_point() {
    let expr = parse_expression_text("expr.src", "xs.Where(x => x > 1).Count()")
        .expect("parse failed")
        .expect("expression");
    assert!(matches!(expr, Expr::Invocation { .. }));

    assert!(parse_expression_text("expr.src", "").expect("ok").is_none());
    assert!(parse_expression_text("expr.src", "a b").is_err());
}

#[test]
fn interfaces_enums_and_delegates_round_out_a_unit() {
    let source = "\
interface Shape {
    double Area();
    int Sides() = 4;
    int Tag { get; set; }
}

enum Direction { North, East = 90, South, West }

public delegate bool Filter<T>(T item);
";
    let parsed = parse(source);
    assert!(parsed.diagnostics.is_empty());
    let unit = parsed.unit.expect("unit");
    assert_eq!(unit.declarations.len(), 3);

    let Declaration::Interface { members, .. } = &unit.declarations[0] else {
        panic!("expected interface");
    };
    assert!(matches!(
        &members[1],
        Member::Method {
            default_value: Some(_),
            ..
        }
    ));
    let Member::Property {
        get_accessor,
        set_accessor,
        ..
    } = &members[2]
    else {
        panic!("expected property");
    };
    assert!(get_accessor.as_ref().is_some_and(|a| a.body.is_none()));
    assert!(set_accessor.as_ref().is_some_and(|a| !a.synthesized));

    let Declaration::Delegate {
        type_params, params, ..
    } = &unit.declarations[2]
    else {
        panic!("expected delegate");
    };
    assert_eq!(type_params.len(), 1);
    assert_eq!(params.len(), 1);
}

#[test]
fn statements_and_queries_parse_inside_methods() {
    let source = r#"
class Flow {
    void Run(List<int> xs) {
        foreach (var x in xs) {
            switch (x) {
                case 0:
                    continue;
                default:
                    break;
            }
        }
        try {
            using (var r = open()) {
                r.Write("data");
            }
        } catch (IoError e) {
            throw;
        } finally {
            close();
        }
        var q = from x in xs where x > 0 orderby x descending select x * x;
    }
}
"#;
    let parsed = parse(source);
    assert!(parsed.diagnostics.is_empty(), "{:?}", parsed.diagnostics);
    let unit = parsed.unit.expect("unit");
    let members = class_members(&unit.declarations[0]);
    let Member::Method { body: Some(body), .. } = &members[0] else {
        panic!("expected method with body");
    };
    assert_eq!(body.statements.len(), 3);
    assert!(matches!(body.statements[0], Stmt::Foreach { .. }));
    assert!(matches!(body.statements[1], Stmt::Try { .. }));
    let Stmt::LocalDecl { declarators, .. } = &body.statements[2] else {
        panic!("expected local declaration");
    };
    assert!(matches!(
        declarators[0].initializer,
        Some(Expr::Query { .. })
    ));
}
