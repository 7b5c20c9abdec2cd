use crate::lexer::tokenize;
use ksharp_ast::event::{EventSink, LeafKind, NodeKind, ParseEvent};
use ksharp_ast::span::Position;
use ksharp_ast::token::{Token, TokenKind};
use tracing::debug;

const REL_OPS: &[&str] = &["==", "!=", "<", "<=", ">", ">="];
const ADD_OPS: &[&str] = &["+", "-", "||"];
const MUL_OPS: &[&str] = &["*", "/", "%", "&&", "DIV", "MOD"];

#[derive(Debug, Clone, PartialEq)]
pub struct SyntaxError {
    pub message: String,
    /// Offending token text, or `(end)` at end of input.
    pub near: String,
    pub pos: Position,
}

impl std::fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "[Syntax Error] {}. Near: {} at {}",
            self.message, self.near, self.pos
        )
    }
}

impl std::error::Error for SyntaxError {}

#[derive(Debug, Clone, PartialEq)]
pub struct ParseOutcome {
    pub errors: Vec<SyntaxError>,
    /// Nesting depth after the run; 0 for every completed parse.
    pub depth: usize,
    /// Index into the token slice where parsing stopped.
    pub consumed: usize,
}

impl ParseOutcome {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Parse a token stream, delivering parse events to `sink`.
///
/// Never fails: syntax errors are collected in the outcome and parsing
/// resumes after panic-mode recovery.
pub fn parse_tokens<S: EventSink>(tokens: &[Token], sink: S) -> ParseOutcome {
    let mut p = Parser::new(tokens, sink);
    p.program();
    debug!(
        errors = p.errors.len(),
        consumed = p.idx,
        "parse finished"
    );
    ParseOutcome {
        errors: p.errors,
        depth: p.depth,
        consumed: p.idx,
    }
}

pub fn parse_str<S: EventSink>(src: &str, sink: S) -> ParseOutcome {
    parse_tokens(&tokenize(src), sink)
}

struct Parser<'t, S> {
    tokens: &'t [Token],
    idx: usize,
    /// Returned by `cur` when the slice has no trailing `Eof`.
    eof: Token,
    sink: S,
    depth: usize,
    /// Set after recovery; suppresses follow-on errors until the next
    /// statement starts.
    panicking: bool,
    errors: Vec<SyntaxError>,
}

impl<'t, S: EventSink> Parser<'t, S> {
    fn new(tokens: &'t [Token], sink: S) -> Self {
        let end = tokens.last().map(|t| t.pos).unwrap_or(Position::START);
        let mut p = Self {
            tokens,
            idx: 0,
            eof: Token::eof(end),
            sink,
            depth: 0,
            panicking: false,
            errors: Vec::new(),
        };
        p.skip_trivia();
        p
    }

    // ======= token access =======

    fn cur(&self) -> &Token {
        self.tokens.get(self.idx).unwrap_or(&self.eof)
    }

    fn at_end(&self) -> bool {
        self.cur().is_eof()
    }

    fn skip_trivia(&mut self) {
        while self.idx < self.tokens.len() && self.tokens[self.idx].kind.is_trivia() {
            self.idx += 1;
        }
    }

    fn bump(&mut self) {
        if !self.at_end() {
            self.idx += 1;
            self.skip_trivia();
        }
    }

    fn at_punct(&self, sym: &str) -> bool {
        let t = self.cur();
        t.kind.is_punctuation() && t.symbol() == sym
    }

    fn at_op_in(&self, ops: &[&str]) -> bool {
        let t = self.cur();
        t.kind.is_operator() && ops.contains(&t.symbol())
    }

    fn at_keyword(&self, kw: &str) -> bool {
        let t = self.cur();
        t.kind == TokenKind::Keyword && t.text == kw
    }

    // ======= events =======

    fn open(&mut self, kind: NodeKind) {
        self.sink.event(ParseEvent::Open(kind));
        self.depth += 1;
    }

    fn close(&mut self, kind: NodeKind) {
        self.depth -= 1;
        self.sink.event(ParseEvent::Close(kind));
    }

    /// Emit the current token as a leaf and consume it.
    fn leaf(&mut self, kind: LeafKind) {
        let text = self.cur().symbol().to_string();
        self.sink.event(ParseEvent::Leaf { kind, text });
        self.bump();
    }

    // ======= errors =======

    fn report(&mut self, message: &str) {
        let t = self.cur();
        let near = if t.is_eof() {
            "(end)".to_string()
        } else {
            t.text.clone()
        };
        let err = SyntaxError {
            message: message.to_string(),
            near,
            pos: t.pos,
        };
        debug!(%err, "syntax error");
        self.errors.push(err);
    }

    /// Report, then discard tokens through the next `;` or `}` (or up to
    /// end of input).
    fn error(&mut self, message: &str) {
        if self.panicking {
            return;
        }
        self.report(message);
        self.synchronize();
        self.panicking = true;
    }

    fn synchronize(&mut self) {
        let start = self.idx;
        while !self.at_end() {
            if self.at_punct(";") || self.at_punct("}") {
                self.bump();
                break;
            }
            self.bump();
        }
        debug!(skipped = self.idx - start, "recovered");
    }

    fn accept(&mut self, sym: &str) -> bool {
        if self.at_punct(sym) {
            self.leaf(LeafKind::Symbol);
            true
        } else {
            false
        }
    }

    fn expect(&mut self, sym: &str, message: &str) {
        if !self.accept(sym) {
            self.error(message);
        }
    }

    fn identifier(&mut self, message: &str) -> bool {
        if self.cur().kind == TokenKind::Identifier {
            self.leaf(LeafKind::Identifier);
            true
        } else {
            self.error(message);
            false
        }
    }

    fn assign_op(&mut self, message: &str) -> bool {
        if self.at_op_in(&["="]) {
            self.leaf(LeafKind::Symbol);
            true
        } else {
            self.error(message);
            false
        }
    }

    // ======= program / statements =======

    fn program(&mut self) {
        self.open(NodeKind::Program);
        while !self.at_end() {
            self.panicking = false;
            self.statement();
        }
        self.close(NodeKind::Program);
        // only reachable if the statement loop stops before end of input
        if !self.at_end() {
            self.report("Unexpected extra code after program");
        }
    }

    fn statement(&mut self) {
        let kind = self.cur().kind;
        if kind == TokenKind::ReservedType {
            self.decl_statement();
        } else if self.at_keyword("input") {
            self.input_statement();
        } else if self.at_keyword("print") || self.at_keyword("writeln") {
            self.print_statement();
        } else if self.at_keyword("if") {
            self.if_statement();
        } else if self.at_keyword("while") {
            self.while_statement();
        } else if self.at_keyword("for") {
            self.for_statement();
        } else if kind == TokenKind::Identifier {
            self.assign_statement();
        } else {
            self.error("Unexpected token at start of statement");
        }
    }

    /// `type identifier ;`
    fn decl_statement(&mut self) {
        self.open(NodeKind::DeclStatement);
        self.leaf(LeafKind::Type);
        self.identifier("Expected identifier after type");
        self.expect(";", "Missing ';' after declaration");
        self.close(NodeKind::DeclStatement);
    }

    /// `input identifier ;`
    fn input_statement(&mut self) {
        self.open(NodeKind::InputStatement);
        self.leaf(LeafKind::Keyword);
        self.identifier("Expected identifier after 'input'");
        self.expect(";", "Missing ';' after input statement");
        self.close(NodeKind::InputStatement);
    }

    /// `(print | writeln) expression ;`
    fn print_statement(&mut self) {
        self.open(NodeKind::PrintStatement);
        self.leaf(LeafKind::Keyword);
        self.expression();
        self.expect(";", "Missing ';' after print statement");
        self.close(NodeKind::PrintStatement);
    }

    /// `identifier = expression ;`
    fn assign_statement(&mut self) {
        self.open(NodeKind::AssignStatement);
        if self.identifier("Expected identifier at start of assignment")
            && self.assign_op("Expected '=' in assignment")
        {
            self.expression();
        }
        self.expect(";", "Missing ';' after assignment");
        self.close(NodeKind::AssignStatement);
    }

    /// `identifier = expression` (for-update, no `;`)
    fn assign_update(&mut self) {
        self.open(NodeKind::AssignUpdate);
        if self.identifier("Expected identifier in for-update")
            && self.assign_op("Expected '=' in for-update")
        {
            self.expression();
        }
        self.close(NodeKind::AssignUpdate);
    }

    /// `{ statement* }` or a single statement
    fn block(&mut self) {
        if !self.accept("{") {
            // a body statement ends a panic left over from the header; end of
            // input and `}` start no statement
            if !self.at_end() && !self.at_punct("}") {
                self.panicking = false;
            }
            self.statement();
            return;
        }
        self.open(NodeKind::Statements);
        while !self.at_end() && !self.at_punct("}") {
            self.panicking = false;
            self.statement();
        }
        self.close(NodeKind::Statements);
        self.expect("}", "Missing '}' at end of block");
    }

    /// `if ( expression ) block [else block]`
    fn if_statement(&mut self) {
        self.open(NodeKind::IfStatement);
        self.leaf(LeafKind::Keyword);
        self.expect("(", "Expected '(' after 'if'");
        self.expression();
        self.expect(")", "Expected ')' after condition");
        self.block();
        if self.at_keyword("else") {
            self.leaf(LeafKind::Keyword);
            self.block();
        }
        self.close(NodeKind::IfStatement);
    }

    /// `while ( expression ) block`
    fn while_statement(&mut self) {
        self.open(NodeKind::WhileStatement);
        self.leaf(LeafKind::Keyword);
        self.expect("(", "Expected '(' after 'while'");
        self.expression();
        self.expect(")", "Expected ')' after while condition");
        self.block();
        self.close(NodeKind::WhileStatement);
    }

    /// `for ( assignStatement expression ; assignUpdate ) block`
    fn for_statement(&mut self) {
        self.open(NodeKind::ForStatement);
        self.leaf(LeafKind::Keyword);
        self.expect("(", "Expected '(' after 'for'");

        self.open(NodeKind::ForInit);
        self.assign_statement();
        self.close(NodeKind::ForInit);

        self.open(NodeKind::ForCondition);
        self.rel_expression();
        self.close(NodeKind::ForCondition);
        self.expect(";", "Missing ';' in for condition");

        self.open(NodeKind::ForUpdate);
        self.assign_update();
        self.close(NodeKind::ForUpdate);
        self.expect(")", "Expected ')' after for header");

        self.block();
        self.close(NodeKind::ForStatement);
    }

    // ======= expressions =======
    //
    //   expression  -> simpleExpr [relop simpleExpr]
    //   simpleExpr  -> term { (+ | - | ||) term }
    //   term        -> factor { (* | / | % | && | DIV | MOD) factor }

    fn expression(&mut self) {
        self.open(NodeKind::Expression);
        self.rel_expression();
        self.close(NodeKind::Expression);
    }

    fn rel_expression(&mut self) {
        self.open(NodeKind::RelExpression);
        self.simple_expression();
        if self.at_op_in(REL_OPS) {
            self.leaf(LeafKind::Symbol);
            self.simple_expression();
        }
        self.close(NodeKind::RelExpression);
    }

    fn simple_expression(&mut self) {
        self.open(NodeKind::SimpleExpression);
        self.term();
        while self.at_op_in(ADD_OPS) {
            self.leaf(LeafKind::Symbol);
            self.term();
        }
        self.close(NodeKind::SimpleExpression);
    }

    fn term(&mut self) {
        self.open(NodeKind::Term);
        self.factor();
        while self.at_op_in(MUL_OPS) {
            self.leaf(LeafKind::Symbol);
            self.factor();
        }
        self.close(NodeKind::Term);
    }

    /// `identifier | literal | ( expression )`
    fn factor(&mut self) {
        let kind = self.cur().kind;
        if self.accept("(") {
            self.expression();
            if !self.accept(")") {
                self.error("Missing ')' after grouped expression");
            }
        } else if kind == TokenKind::Identifier {
            self.leaf(LeafKind::Identifier);
        } else if kind.is_constant() {
            self.leaf(LeafKind::Literal);
        } else {
            self.error("Expected identifier, literal, or '(' in expression");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn depth_returns_to_zero_exactly_once_at_the_end() {
        let mut events: Vec<ParseEvent> = Vec::new();
        let out = parse_str("int x; x = (1 + 2) * 3; if (x > 1) { print x; }", &mut events);
        assert!(out.is_ok(), "{:?}", out.errors);

        let mut depth = 0i64;
        let mut zero_returns = 0;
        for ev in &events {
            match ev {
                ParseEvent::Open(_) => depth += 1,
                ParseEvent::Close(_) => {
                    depth -= 1;
                    if depth == 0 {
                        zero_returns += 1;
                    }
                }
                ParseEvent::Leaf { .. } => {}
            }
            assert!(depth >= 0);
        }
        assert_eq!(zero_returns, 1);
        assert_eq!(events.last(), Some(&ParseEvent::Close(NodeKind::Program)));
        assert_eq!(out.depth, 0);
    }

    #[test]
    fn missing_eof_is_synthesized() {
        let toks = tokenize("int x;");
        let without_eof = &toks[..toks.len() - 1];
        let out = parse_tokens(without_eof, Vec::<ParseEvent>::new());
        assert!(out.is_ok());
        assert_eq!(out.consumed, 3);
    }

    #[test]
    fn errors_inside_a_statement_do_not_cascade() {
        // the factor error consumes the ';', and the missing-';' check that
        // follows stays silent
        let out = parse_str("x = ; y = 2;", Vec::<ParseEvent>::new());
        assert_eq!(out.errors.len(), 1);
        assert_eq!(
            out.errors[0].message,
            "Expected identifier, literal, or '(' in expression"
        );
    }
}
