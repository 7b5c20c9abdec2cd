use crate::cursor::Cursor;
use crate::keywords::KeywordTrie;
use ksharp_ast::span::Position;
use ksharp_ast::token::{Token, TokenKind};
use tracing::trace;

pub const RESERVED_TYPES: &[&str] = &["int", "float", "char", "bool", "void"];

pub const NOISE_WORDS: &[&str] = &[
    "please", "then", "to", "do", "end", "begin", "of", "and", "from",
];

// diagnostics carried by `Unknown` tokens
pub const UNTERMINATED_STRING: &str = "unterminated string";
pub const UNTERMINATED_CHAR: &str = "unterminated char";
pub const UNTERMINATED_COMMENT: &str = "unterminated comment";
pub const BAD_FLOAT: &str = "bad float";

/// Kind of an operator symbol (`"=="`, `"DIV"`, ...), or `None` if `sym`
/// is not an operator of the language.
pub fn operator_kind(sym: &str) -> Option<TokenKind> {
    match sym {
        "=" => Some(TokenKind::Assign),
        "+" | "-" | "*" | "/" | "%" | "**" | "DIV" | "MOD" => Some(TokenKind::ArithOp),
        "==" | "!=" | "<" | "<=" | ">" | ">=" => Some(TokenKind::RelOp),
        "&&" | "||" | "!" => Some(TokenKind::LogicOp),
        _ => None,
    }
}

/// Reserved type check. Only the first letter is case-insensitive, so
/// `Int` is a type and `INT` is not.
pub fn is_reserved_type(word: &str) -> bool {
    let mut chars = word.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    RESERVED_TYPES.iter().any(|ty| {
        let mut t = ty.chars();
        t.next() == Some(first.to_ascii_lowercase()) && t.as_str() == chars.as_str()
    })
}

pub fn punctuation_kind(c: char) -> Option<TokenKind> {
    match c {
        ';' | ',' | ':' | '.' => Some(TokenKind::Delimiter),
        '(' | ')' | '{' | '}' | '[' | ']' => Some(TokenKind::Bracket),
        _ => None,
    }
}

/// Classify a scanned word. Precedence: boolean, word-operator, reserved
/// type, keyword, noise word, identifier.
pub fn classify_word(word: &str, keywords: &KeywordTrie) -> (TokenKind, Option<&'static str>) {
    if word.eq_ignore_ascii_case("true") || word.eq_ignore_ascii_case("false") {
        return (TokenKind::BoolConst, None);
    }
    if word.eq_ignore_ascii_case("div") {
        return (TokenKind::ArithOp, Some("DIV"));
    }
    if word.eq_ignore_ascii_case("mod") {
        return (TokenKind::ArithOp, Some("MOD"));
    }
    if is_reserved_type(word) {
        return (TokenKind::ReservedType, None);
    }
    if keywords.matches(word) {
        return (TokenKind::Keyword, None);
    }
    if NOISE_WORDS.iter().any(|n| n.eq_ignore_ascii_case(word)) {
        return (TokenKind::Noise, None);
    }
    (TokenKind::Identifier, None)
}

pub struct Lexer<'a> {
    cur: Cursor<'a>,
    keywords: &'a KeywordTrie,
    done: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(src: &'a str) -> Self {
        Self::with_keywords(src, KeywordTrie::shared())
    }

    pub fn with_keywords(src: &'a str, keywords: &'a KeywordTrie) -> Self {
        Self {
            cur: Cursor::new(src),
            keywords,
            done: false,
        }
    }

    fn skip_ws(&mut self) {
        self.cur.bump_while(|c| matches!(c, ' ' | '\t' | '\r' | '\n'));
    }

    fn tok(&self, kind: TokenKind, start: usize, pos: Position) -> Token {
        Token::new(kind, self.cur.slice_from(start), pos)
    }

    /// Next token. Never fails: malformed input yields `Unknown`, and once
    /// the input is exhausted every call yields `Eof`.
    pub fn next_tok(&mut self) -> Token {
        self.skip_ws();
        let start = self.cur.offset();
        let pos = self.cur.position();
        let Some(c) = self.cur.bump() else {
            return Token::eof(pos);
        };

        let tok = match c {
            c if punctuation_kind(c).is_some() => self.punctuation(c, start, pos),
            c if c.is_ascii_alphabetic() || c == '_' => self.word(start, pos),
            c if c.is_ascii_digit() => self.number(start, pos),
            '"' => self.string(start, pos),
            '\'' => self.char_lit(start, pos),
            '/' => self.slash(start, pos),
            '*' | '+' | '-' | '%' | '=' | '<' | '>' | '!' | '&' | '|' => {
                self.operator(c, start, pos)
            }
            // fallback
            _ => self.tok(TokenKind::Unknown, start, pos),
        };
        trace!(kind = %tok.kind, text = %tok.text, pos = %tok.pos, "token");
        tok
    }

    fn punctuation(&self, c: char, start: usize, pos: Position) -> Token {
        let kind = punctuation_kind(c).unwrap_or(TokenKind::Unknown);
        self.tok(kind, start, pos).with_subtag(c.to_string())
    }

    fn word(&mut self, start: usize, pos: Position) -> Token {
        self.cur
            .bump_while(|ch| ch.is_ascii_alphanumeric() || ch == '_');
        let (kind, subtag) = classify_word(self.cur.slice_from(start), self.keywords);
        let tok = self.tok(kind, start, pos);
        match subtag {
            Some(tag) => tok.with_subtag(tag),
            None => tok,
        }
    }

    fn number(&mut self, start: usize, pos: Position) -> Token {
        self.cur.bump_while(|ch| ch.is_ascii_digit());
        if !self.cur.eat('.') {
            return self.tok(TokenKind::IntConst, start, pos);
        }
        if !matches!(self.cur.peek(), Some(ch) if ch.is_ascii_digit()) {
            return self
                .tok(TokenKind::Unknown, start, pos)
                .with_subtag(BAD_FLOAT);
        }
        self.cur.bump_while(|ch| ch.is_ascii_digit());
        self.tok(TokenKind::FloatConst, start, pos)
    }

    fn string(&mut self, start: usize, pos: Position) -> Token {
        while let Some(ch) = self.cur.peek() {
            match ch {
                '"' => {
                    self.cur.bump();
                    return self.tok(TokenKind::StringConst, start, pos);
                }
                '\n' => break,
                '\\' => {
                    // escapes the next character, whatever it is
                    self.cur.bump();
                    self.cur.bump();
                }
                _ => {
                    self.cur.bump();
                }
            }
        }
        self.tok(TokenKind::Unknown, start, pos)
            .with_subtag(UNTERMINATED_STRING)
    }

    fn char_lit(&mut self, start: usize, pos: Position) -> Token {
        match self.cur.peek() {
            None | Some('\n') => {}
            Some('\\') => {
                self.cur.bump();
                if !matches!(self.cur.peek(), None | Some('\n')) {
                    self.cur.bump();
                }
            }
            Some(_) => {
                self.cur.bump();
            }
        }
        if self.cur.eat('\'') {
            return self.tok(TokenKind::CharConst, start, pos);
        }
        self.tok(TokenKind::Unknown, start, pos)
            .with_subtag(UNTERMINATED_CHAR)
    }

    fn slash(&mut self, start: usize, pos: Position) -> Token {
        // line comment: //
        if self.cur.eat('/') {
            self.cur.bump_while(|ch| ch != '\n');
            return self.tok(TokenKind::Comment, start, pos);
        }
        // block comment: /* ... */
        if self.cur.eat('*') {
            let mut prev = '\0';
            while let Some(ch) = self.cur.bump() {
                if prev == '*' && ch == '/' {
                    return self.tok(TokenKind::Comment, start, pos);
                }
                prev = ch;
            }
            return self
                .tok(TokenKind::Unknown, start, pos)
                .with_subtag(UNTERMINATED_COMMENT);
        }
        self.tok(TokenKind::ArithOp, start, pos).with_subtag("/")
    }

    fn operator(&mut self, c: char, start: usize, pos: Position) -> Token {
        // 2-char operators first
        let second = match c {
            '=' | '!' | '<' | '>' => Some('='),
            '&' => Some('&'),
            '|' => Some('|'),
            '*' => Some('*'),
            _ => None,
        };
        if let Some(s) = second {
            if self.cur.eat(s) {
                let sym = self.cur.slice_from(start);
                if let Some(kind) = operator_kind(sym) {
                    return self.tok(kind, start, pos).with_subtag(sym);
                }
            }
        }
        let sym = self.cur.slice_from(start);
        match operator_kind(sym) {
            Some(kind) => self.tok(kind, start, pos).with_subtag(sym),
            // lone '&' or '|'
            None => self.tok(TokenKind::Unknown, start, pos),
        }
    }
}

impl Iterator for Lexer<'_> {
    type Item = Token;

    /// Yields every token up to and including the first `Eof`.
    fn next(&mut self) -> Option<Token> {
        if self.done {
            return None;
        }
        let tok = self.next_tok();
        self.done = tok.is_eof();
        Some(tok)
    }
}

/// Whole token stream of `src`, ending with exactly one `Eof`.
pub fn tokenize(src: &str) -> Vec<Token> {
    Lexer::new(src).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<TokenKind> {
        tokenize(src).into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn word_precedence() {
        let trie = KeywordTrie::build();
        assert_eq!(classify_word("TRUE", &trie).0, TokenKind::BoolConst);
        assert_eq!(classify_word("Div", &trie), (TokenKind::ArithOp, Some("DIV")));
        assert_eq!(classify_word("mod", &trie), (TokenKind::ArithOp, Some("MOD")));
        assert_eq!(classify_word("void", &trie).0, TokenKind::ReservedType);
        assert_eq!(classify_word("Float", &trie).0, TokenKind::ReservedType);
        assert_eq!(classify_word("INT", &trie).0, TokenKind::Identifier);
        assert_eq!(classify_word("iNt", &trie).0, TokenKind::Identifier);
        assert_eq!(classify_word("writeln", &trie).0, TokenKind::Keyword);
        // keyword beats noise
        assert_eq!(classify_word("then", &trie).0, TokenKind::Keyword);
        assert_eq!(classify_word("please", &trie).0, TokenKind::Noise);
        assert_eq!(classify_word("From", &trie).0, TokenKind::Noise);
        assert_eq!(classify_word("total_1", &trie).0, TokenKind::Identifier);
    }

    #[test]
    fn operator_table() {
        assert_eq!(operator_kind("="), Some(TokenKind::Assign));
        assert_eq!(operator_kind("**"), Some(TokenKind::ArithOp));
        assert_eq!(operator_kind(">="), Some(TokenKind::RelOp));
        assert_eq!(operator_kind("!"), Some(TokenKind::LogicOp));
        assert_eq!(operator_kind("&"), None);
    }

    #[test]
    fn lone_ampersand_is_unknown() {
        assert_eq!(
            kinds("a & b"),
            vec![
                TokenKind::Identifier,
                TokenKind::Unknown,
                TokenKind::Identifier,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn iterator_stops_after_eof_but_next_tok_keeps_yielding_it() {
        let mut lx = Lexer::new("x");
        assert_eq!(lx.next().map(|t| t.kind), Some(TokenKind::Identifier));
        assert_eq!(lx.next().map(|t| t.kind), Some(TokenKind::Eof));
        assert_eq!(lx.next(), None);
        assert!(lx.next_tok().is_eof());
        assert!(lx.next_tok().is_eof());
    }
}
