use ksharp_ast::event::{NodeKind, ParseEvent, TreeBuilder};
use ksharp_parse::{parse_str, ParseOutcome};

fn parse(src: &str) -> ParseOutcome {
    parse_str(src, Vec::<ParseEvent>::new())
}

fn messages(src: &str) -> Vec<String> {
    parse(src).errors.into_iter().map(|e| e.message).collect()
}

#[test]
fn missing_semicolon_is_error() {
    let out = parse("x = 5");
    assert_eq!(out.errors.len(), 1);
    assert_eq!(out.errors[0].message, "Missing ';' after assignment");
    assert_eq!(out.errors[0].near, "(end)");
    assert!(!out.is_ok());
}

#[test]
fn unexpected_token_at_statement_start() {
    assert_eq!(
        messages("42; int x;"),
        vec!["Unexpected token at start of statement"]
    );
}

#[test]
fn recovery_resumes_at_the_next_statement() {
    let mut b = TreeBuilder::new();
    let out = parse_str("int 5; int y; y = 2;", &mut b);
    assert_eq!(out.errors.len(), 1);
    assert_eq!(out.errors[0].message, "Expected identifier after type");
    let tree = b.finish().unwrap();
    assert_eq!(tree.find_all(NodeKind::DeclStatement).len(), 2);
    assert_eq!(tree.find_all(NodeKind::AssignStatement).len(), 1);
}

#[test]
fn recovery_stops_at_closing_brace() {
    let out = parse("while (x < 3) { x = 1 } print x;");
    assert_eq!(
        out.errors
            .iter()
            .map(|e| e.message.as_str())
            .collect::<Vec<_>>(),
        vec!["Missing ';' after assignment", "Missing '}' at end of block"]
    );
}

#[test]
fn each_statement_reports_its_own_error() {
    assert_eq!(
        messages("input ; print 1 int z;"),
        vec![
            "Expected identifier after 'input'",
            "Missing ';' after print statement",
        ]
    );
}

#[test]
fn missing_parens_in_control_flow() {
    assert_eq!(messages("if x > 1) print x;"), vec!["Expected '(' after 'if'"]);
    assert_eq!(
        messages("while (x print x;"),
        vec!["Expected ')' after while condition"]
    );
    assert_eq!(
        messages("print (1 + 2;"),
        vec!["Missing ')' after grouped expression"]
    );
}

#[test]
fn unbraced_body_reports_its_own_error_after_a_header_error() {
    assert_eq!(
        messages("if (a b = 1; c = ; d = 2;"),
        vec![
            "Expected ')' after condition",
            "Expected identifier, literal, or '(' in expression",
        ]
    );
    let out = parse("while (x print y; z = ; w = 1;");
    assert_eq!(out.errors.len(), 2);
    assert_eq!(out.errors[1].near, ";");
    assert_eq!(out.depth, 0);
}

#[test]
fn header_error_before_end_or_brace_reports_once() {
    assert_eq!(messages("if (a b;"), vec!["Expected ')' after condition"]);
    assert_eq!(
        messages("while (true) { while (x y; }"),
        vec!["Expected ')' after while condition"]
    );
}

#[test]
fn assignment_without_equals() {
    assert_eq!(messages("x 5;"), vec!["Expected '=' in assignment"]);
}

#[test]
fn for_header_errors() {
    assert_eq!(
        messages("for (i = 0; i < 3; i + 1) print i;"),
        vec!["Expected '=' in for-update"]
    );
    assert_eq!(
        messages("for (i = 0; i < 3 i = i + 1) print i;"),
        vec!["Missing ';' in for condition"]
    );
}

#[test]
fn errors_are_sticky_and_parsing_continues() {
    let out = parse("x = ; y = 1; z = ;");
    assert_eq!(out.errors.len(), 2);
    assert_eq!(out.depth, 0);
}

#[test]
fn unknown_tokens_are_syntax_errors_not_crashes() {
    let out = parse("x = \"unterminated\nprint x;");
    assert_eq!(
        out.errors[0].message,
        "Expected identifier, literal, or '(' in expression"
    );
    assert_eq!(out.errors[0].near, "\"unterminated");
}

#[test]
fn empty_input_is_a_valid_program() {
    let mut events: Vec<ParseEvent> = Vec::new();
    let out = parse_str("", &mut events);
    assert!(out.is_ok());
    assert_eq!(
        events,
        vec![
            ParseEvent::Open(NodeKind::Program),
            ParseEvent::Close(NodeKind::Program)
        ]
    );
}
