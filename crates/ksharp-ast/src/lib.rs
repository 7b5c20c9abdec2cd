pub mod span {
    use serde::Serialize;

    /// 1-based line/column of the first character of a lexeme.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
    pub struct Position {
        pub line: u32,
        pub column: u32,
    }

    impl Position {
        pub const START: Position = Position { line: 1, column: 1 };

        pub fn new(line: u32, column: u32) -> Self {
            Self { line, column }
        }
    }

    impl std::fmt::Display for Position {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "{}:{}", self.line, self.column)
        }
    }
}

pub mod token {
    use super::span::Position;
    use serde::Serialize;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
    pub enum TokenKind {
        Identifier,
        Keyword,
        ReservedType,
        // constants
        IntConst,
        FloatConst,
        CharConst,
        BoolConst,
        StringConst,
        // operators
        ArithOp,
        RelOp,
        LogicOp,
        Assign,
        // punctuation
        Delimiter,
        Bracket,
        // trivia
        Comment,
        Noise,
        // error / eof
        Unknown,
        Eof,
    }

    impl TokenKind {
        pub fn is_constant(self) -> bool {
            matches!(
                self,
                TokenKind::IntConst
                    | TokenKind::FloatConst
                    | TokenKind::CharConst
                    | TokenKind::BoolConst
                    | TokenKind::StringConst
            )
        }

        pub fn is_operator(self) -> bool {
            matches!(
                self,
                TokenKind::ArithOp | TokenKind::RelOp | TokenKind::LogicOp | TokenKind::Assign
            )
        }

        pub fn is_punctuation(self) -> bool {
            matches!(self, TokenKind::Delimiter | TokenKind::Bracket)
        }

        /// Comments and noise words carry no grammatical meaning.
        pub fn is_trivia(self) -> bool {
            matches!(self, TokenKind::Comment | TokenKind::Noise)
        }

        pub fn name(self) -> &'static str {
            match self {
                TokenKind::Identifier => "identifier",
                TokenKind::Keyword => "keyword",
                TokenKind::ReservedType => "reserved-type",
                TokenKind::IntConst => "integer-constant",
                TokenKind::FloatConst => "float-constant",
                TokenKind::CharConst => "char-constant",
                TokenKind::BoolConst => "bool-constant",
                TokenKind::StringConst => "string-constant",
                TokenKind::ArithOp => "arithmetic-operator",
                TokenKind::RelOp => "relational-operator",
                TokenKind::LogicOp => "logical-operator",
                TokenKind::Assign => "assignment",
                TokenKind::Delimiter => "delimiter",
                TokenKind::Bracket => "bracket",
                TokenKind::Comment => "comment",
                TokenKind::Noise => "noise-word",
                TokenKind::Unknown => "unknown",
                TokenKind::Eof => "end-of-input",
            }
        }
    }

    impl std::fmt::Display for TokenKind {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_str(self.name())
        }
    }

    #[derive(Debug, Clone, PartialEq, Serialize)]
    pub struct Token {
        pub kind: TokenKind,
        /// Exact lexeme (string and char literals keep their quotes).
        pub text: String,
        pub pos: Position,
        /// Canonical operator/punctuation symbol, or the diagnostic of an
        /// `Unknown` token.
        pub subtag: Option<String>,
    }

    impl Token {
        pub fn new(kind: TokenKind, text: impl Into<String>, pos: Position) -> Self {
            Self {
                kind,
                text: text.into(),
                pos,
                subtag: None,
            }
        }

        pub fn with_subtag(mut self, subtag: impl Into<String>) -> Self {
            self.subtag = Some(subtag.into());
            self
        }

        pub fn eof(pos: Position) -> Self {
            Self::new(TokenKind::Eof, "", pos)
        }

        pub fn is_eof(&self) -> bool {
            self.kind == TokenKind::Eof
        }

        /// Text used for grammar matching: the subtag of operators and
        /// punctuation (`"DIV"` for `div`), the lexeme for everything else.
        pub fn symbol(&self) -> &str {
            match (&self.subtag, self.kind.is_operator() || self.kind.is_punctuation()) {
                (Some(tag), true) => tag,
                _ => &self.text,
            }
        }

        /// Text shown in the token table: subtag when present, else lexeme.
        pub fn shown(&self) -> &str {
            self.subtag.as_deref().unwrap_or(&self.text)
        }
    }

    impl std::fmt::Display for Token {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            if self.is_eof() {
                return write!(f, "{} at {}", self.kind, self.pos);
            }
            write!(f, "{} '{}' at {}", self.kind, self.text, self.pos)
        }
    }
}

pub mod event {
    use serde::Serialize;

    /// Compound grammar nodes, one per parsing routine.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
    pub enum NodeKind {
        Program,
        Statements,
        DeclStatement,
        InputStatement,
        PrintStatement,
        AssignStatement,
        AssignUpdate,
        IfStatement,
        WhileStatement,
        ForStatement,
        ForInit,
        ForCondition,
        ForUpdate,
        Expression,
        RelExpression,
        SimpleExpression,
        Term,
    }

    impl NodeKind {
        pub fn name(self) -> &'static str {
            match self {
                NodeKind::Program => "program",
                NodeKind::Statements => "statements",
                NodeKind::DeclStatement => "declStatement",
                NodeKind::InputStatement => "inputStatement",
                NodeKind::PrintStatement => "printStatement",
                NodeKind::AssignStatement => "assignStatement",
                NodeKind::AssignUpdate => "assignUpdate",
                NodeKind::IfStatement => "ifStatement",
                NodeKind::WhileStatement => "whileStatement",
                NodeKind::ForStatement => "forStatement",
                NodeKind::ForInit => "forInit",
                NodeKind::ForCondition => "forCondition",
                NodeKind::ForUpdate => "forUpdate",
                NodeKind::Expression => "expression",
                NodeKind::RelExpression => "relExpression",
                NodeKind::SimpleExpression => "simpleExpression",
                NodeKind::Term => "term",
            }
        }

        pub fn is_statement(self) -> bool {
            matches!(
                self,
                NodeKind::DeclStatement
                    | NodeKind::InputStatement
                    | NodeKind::PrintStatement
                    | NodeKind::AssignStatement
                    | NodeKind::IfStatement
                    | NodeKind::WhileStatement
                    | NodeKind::ForStatement
            )
        }
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
    pub enum LeafKind {
        Type,
        Identifier,
        Keyword,
        Symbol,
        Literal,
    }

    impl LeafKind {
        pub fn name(self) -> &'static str {
            match self {
                LeafKind::Type => "type",
                LeafKind::Identifier => "identifier",
                LeafKind::Keyword => "keyword",
                LeafKind::Symbol => "symbol",
                LeafKind::Literal => "literal",
            }
        }
    }

    #[derive(Clone, Debug, PartialEq, Serialize)]
    pub enum ParseEvent {
        Open(NodeKind),
        Close(NodeKind),
        Leaf { kind: LeafKind, text: String },
    }

    /// Receiver of the parser's event stream.
    pub trait EventSink {
        fn event(&mut self, event: ParseEvent);
    }

    impl EventSink for Vec<ParseEvent> {
        fn event(&mut self, event: ParseEvent) {
            self.push(event);
        }
    }

    impl<S: EventSink + ?Sized> EventSink for &mut S {
        fn event(&mut self, event: ParseEvent) {
            (**self).event(event);
        }
    }

    /// Tree folded from an event stream.
    #[derive(Clone, Debug, PartialEq, Serialize)]
    pub enum EventTree {
        Node {
            kind: NodeKind,
            children: Vec<EventTree>,
        },
        Leaf {
            kind: LeafKind,
            text: String,
        },
    }

    impl EventTree {
        pub fn children(&self) -> &[EventTree] {
            match self {
                EventTree::Node { children, .. } => children,
                EventTree::Leaf { .. } => &[],
            }
        }

        /// All nodes of `kind`, depth-first, in source order.
        pub fn find_all(&self, kind: NodeKind) -> Vec<&EventTree> {
            let mut out = Vec::new();
            self.collect_nodes(kind, &mut out);
            out
        }

        fn collect_nodes<'a>(&'a self, kind: NodeKind, out: &mut Vec<&'a EventTree>) {
            if let EventTree::Node { kind: k, children } = self {
                if *k == kind {
                    out.push(self);
                }
                for child in children {
                    child.collect_nodes(kind, out);
                }
            }
        }

        /// Leaves under this node, in source order.
        pub fn leaves(&self) -> Vec<(LeafKind, &str)> {
            let mut out = Vec::new();
            self.collect_leaves(&mut out);
            out
        }

        fn collect_leaves<'a>(&'a self, out: &mut Vec<(LeafKind, &'a str)>) {
            match self {
                EventTree::Leaf { kind, text } => out.push((*kind, text)),
                EventTree::Node { children, .. } => {
                    for child in children {
                        child.collect_leaves(out);
                    }
                }
            }
        }
    }

    #[derive(Clone, Debug, PartialEq)]
    pub enum TreeError {
        /// `Close` without a matching `Open`, or closing the wrong node.
        MismatchedClose {
            expected: Option<NodeKind>,
            found: NodeKind,
        },
        /// Stream ended with nodes still open.
        Unclosed(Vec<NodeKind>),
        /// Anything other than exactly one top-level node.
        RootCount(usize),
    }

    impl std::fmt::Display for TreeError {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            match self {
                TreeError::MismatchedClose { expected, found } => match expected {
                    Some(e) => write!(f, "closed <{}> while <{}> is open", found.name(), e.name()),
                    None => write!(f, "closed <{}> with no open node", found.name()),
                },
                TreeError::Unclosed(kinds) => {
                    let names: Vec<_> = kinds.iter().map(|k| k.name()).collect();
                    write!(f, "unclosed nodes: {}", names.join(", "))
                }
                TreeError::RootCount(n) => write!(f, "expected one root node, found {}", n),
            }
        }
    }

    impl std::error::Error for TreeError {}

    /// Sink that folds events into an [`EventTree`].
    #[derive(Debug, Default)]
    pub struct TreeBuilder {
        stack: Vec<(NodeKind, Vec<EventTree>)>,
        roots: Vec<EventTree>,
        error: Option<TreeError>,
    }

    impl TreeBuilder {
        pub fn new() -> Self {
            Self::default()
        }

        fn push(&mut self, tree: EventTree) {
            match self.stack.last_mut() {
                Some((_, children)) => children.push(tree),
                None => self.roots.push(tree),
            }
        }

        pub fn finish(mut self) -> Result<EventTree, TreeError> {
            if let Some(err) = self.error {
                return Err(err);
            }
            if !self.stack.is_empty() {
                return Err(TreeError::Unclosed(
                    self.stack.iter().map(|(k, _)| *k).collect(),
                ));
            }
            if self.roots.len() != 1 {
                return Err(TreeError::RootCount(self.roots.len()));
            }
            Ok(self.roots.remove(0))
        }
    }

    impl EventSink for TreeBuilder {
        fn event(&mut self, event: ParseEvent) {
            if self.error.is_some() {
                return;
            }
            match event {
                ParseEvent::Open(kind) => self.stack.push((kind, Vec::new())),
                ParseEvent::Close(kind) => match self.stack.pop() {
                    Some((open, children)) if open == kind => {
                        self.push(EventTree::Node { kind, children })
                    }
                    other => {
                        self.error = Some(TreeError::MismatchedClose {
                            expected: other.map(|(k, _)| k),
                            found: kind,
                        })
                    }
                },
                ParseEvent::Leaf { kind, text } => self.push(EventTree::Leaf { kind, text }),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::event::*;

    fn leaf(kind: LeafKind, text: &str) -> ParseEvent {
        ParseEvent::Leaf {
            kind,
            text: text.to_string(),
        }
    }

    #[test]
    fn tree_builder_folds_balanced_stream() {
        let mut b = TreeBuilder::new();
        b.event(ParseEvent::Open(NodeKind::Program));
        b.event(ParseEvent::Open(NodeKind::DeclStatement));
        b.event(leaf(LeafKind::Type, "int"));
        b.event(leaf(LeafKind::Identifier, "x"));
        b.event(ParseEvent::Close(NodeKind::DeclStatement));
        b.event(ParseEvent::Close(NodeKind::Program));

        let tree = b.finish().unwrap();
        let decls = tree.find_all(NodeKind::DeclStatement);
        assert_eq!(decls.len(), 1);
        assert_eq!(
            decls[0].leaves(),
            vec![(LeafKind::Type, "int"), (LeafKind::Identifier, "x")]
        );
    }

    #[test]
    fn tree_builder_rejects_mismatched_close() {
        let mut b = TreeBuilder::new();
        b.event(ParseEvent::Open(NodeKind::Program));
        b.event(ParseEvent::Close(NodeKind::Term));
        assert!(matches!(
            b.finish(),
            Err(TreeError::MismatchedClose {
                expected: Some(NodeKind::Program),
                found: NodeKind::Term
            })
        ));
    }

    #[test]
    fn tree_builder_reports_unclosed_nodes() {
        let mut b = TreeBuilder::new();
        b.event(ParseEvent::Open(NodeKind::Program));
        b.event(ParseEvent::Open(NodeKind::Statements));
        let err = b.finish().unwrap_err();
        assert_eq!(
            err,
            TreeError::Unclosed(vec![NodeKind::Program, NodeKind::Statements])
        );
        assert!(err.to_string().contains("program, statements"));
    }
}
