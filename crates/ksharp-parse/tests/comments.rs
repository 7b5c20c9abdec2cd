use ksharp_ast::event::{NodeKind, TreeBuilder};
use ksharp_ast::token::TokenKind;
use ksharp_parse::diag::UNTERMINATED_COMMENT;
use ksharp_parse::{parse_str, tokenize};

#[test]
fn line_comment_stops_before_newline() {
    let toks = tokenize("// leading comment\nx");
    assert_eq!(toks[0].kind, TokenKind::Comment);
    assert_eq!(toks[0].text, "// leading comment");
    assert_eq!(toks[1].kind, TokenKind::Identifier);
    assert_eq!(toks[1].pos.line, 2);
}

#[test]
fn block_comment_spans_lines() {
    let toks = tokenize("/* a\n * b */ y");
    assert_eq!(toks[0].kind, TokenKind::Comment);
    assert_eq!(toks[0].text, "/* a\n * b */");
    assert_eq!(toks[1].text, "y");
    assert_eq!(toks[1].pos.line, 2);
}

#[test]
fn unterminated_block_comment_is_unknown() {
    let toks = tokenize("/* never closed *");
    assert_eq!(toks.len(), 2);
    assert_eq!(toks[0].kind, TokenKind::Unknown);
    assert_eq!(toks[0].subtag.as_deref(), Some(UNTERMINATED_COMMENT));
    assert!(toks[1].is_eof());
}

#[test]
fn slash_star_slash_does_not_close_itself() {
    let toks = tokenize("/*/ x");
    assert_eq!(toks[0].kind, TokenKind::Unknown);
}

#[test]
fn lone_slash_is_division() {
    let toks = tokenize("a / b");
    assert_eq!(toks[1].kind, TokenKind::ArithOp);
    assert_eq!(toks[1].symbol(), "/");
}

#[test]
fn comments_and_noise_are_ignored_by_the_parser() {
    let src = r#"
// leading comment
int a; // inline
please a = ( /* split */
  2
) * 3;
// tail
"#;
    let mut b = TreeBuilder::new();
    let out = parse_str(src, &mut b);
    assert!(out.is_ok(), "{:?}", out.errors);
    let tree = b.finish().unwrap();
    assert_eq!(tree.find_all(NodeKind::DeclStatement).len(), 1);
    assert_eq!(tree.find_all(NodeKind::AssignStatement).len(), 1);
}
