//! Integration tests for the declaration pass

use ksharp_parse::tokenize;
use ksharp_types::{check, SemanticDiagnostic, Severity, VarType};

#[test]
fn duplicate_declaration_keeps_first_entry() {
    let report = check(&tokenize("int x; float x;"));

    assert_eq!(report.table.len(), 1);
    assert_eq!(report.table.get("x"), Some(VarType::Int));

    let errors: Vec<_> = report.errors().collect();
    assert_eq!(errors.len(), 1);
    let SemanticDiagnostic::DuplicateDeclaration { name, pos } = errors[0] else {
        panic!("expected duplicate declaration, got {:?}", errors[0]);
    };
    assert_eq!(name, "x");
    assert_eq!((pos.line, pos.column), (1, 14));
}

#[test]
fn duplicate_declaration_message() {
    let report = check(&tokenize("int x; int x;"));
    let msgs: Vec<String> = report.errors().map(|d| d.to_string()).collect();
    assert_eq!(msgs.len(), 1);
    assert!(
        msgs[0].starts_with("[Semantic Error] duplicate declaration of x"),
        "{}",
        msgs[0]
    );
}

#[test]
fn declarations_are_reported_in_order() {
    let report = check(&tokenize("int a; char c; bool b;"));
    let lines: Vec<String> = report.diagnostics.iter().map(|d| d.to_string()).collect();
    assert_eq!(lines, vec!["[Declare] int a", "[Declare] char c", "[Declare] bool b"]);
    let names: Vec<_> = report.table.iter().collect();
    assert_eq!(
        names,
        vec![("a", VarType::Int), ("c", VarType::Char), ("b", VarType::Bool)]
    );
}

#[test]
fn void_declares_an_unknown_type() {
    let report = check(&tokenize("void v; string s;"));
    assert_eq!(report.table.get("v"), Some(VarType::Unknown));
    // `string` is an ordinary identifier, not a type
    assert_eq!(report.table.get("s"), None);
    assert!(report
        .diagnostics
        .iter()
        .all(|d| d.severity() == Severity::Info));
}

#[test]
fn declarations_inside_blocks_are_file_wide() {
    let src = "if (c) { int inner; } inner = 4;";
    let report = check(&tokenize(src));
    assert_eq!(report.table.get("inner"), Some(VarType::Int));
    assert!(!report.has_errors());
}

#[test]
fn comments_between_type_and_name_are_skipped() {
    let report = check(&tokenize("int /* counter */ n;"));
    assert_eq!(report.table.get("n"), Some(VarType::Int));
}

#[test]
fn type_without_identifier_declares_nothing() {
    let report = check(&tokenize("int 5; float;"));
    assert!(report.table.is_empty());
    assert!(report.diagnostics.is_empty());
}

#[test]
fn token_count_includes_every_token() {
    let toks = tokenize("int x; // note");
    let report = check(&toks);
    assert_eq!(report.token_count, toks.len());
    assert_eq!(report.token_count, 5);
}

#[test]
fn capitalized_type_names_declare() {
    let report = check(&tokenize("Int n; Float f; n = 2; f = n;"));
    assert_eq!(report.table.get("n"), Some(VarType::Int));
    assert_eq!(report.table.get("f"), Some(VarType::Float));
    assert_eq!(report.error_count(), 1);
    // all-caps is an identifier, so no declaration happens
    assert!(check(&tokenize("INT m;")).table.is_empty());
}
