use ksharp_ast::span::Position;

/// Forward-only character cursor with line/column tracking.
pub struct Cursor<'a> {
    src: &'a str,
    pos: usize,
    line: u32,
    column: u32,
}

impl<'a> Cursor<'a> {
    pub fn new(src: &'a str) -> Self {
        Self {
            src,
            pos: 0,
            line: 1,
            column: 1,
        }
    }

    pub fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    pub fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    /// Consume the next character only if it equals `expected`.
    pub fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.bump();
            true
        } else {
            false
        }
    }

    pub fn bump_while(&mut self, pred: impl Fn(char) -> bool) {
        while matches!(self.peek(), Some(c) if pred(c)) {
            self.bump();
        }
    }

    pub fn is_at_end(&self) -> bool {
        self.pos >= self.src.len()
    }

    /// Byte offset of the next character.
    pub fn offset(&self) -> usize {
        self.pos
    }

    pub fn position(&self) -> Position {
        Position::new(self.line, self.column)
    }

    /// Source text from `start` up to the current offset.
    pub fn slice_from(&self, start: usize) -> &'a str {
        &self.src[start..self.pos]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newline_resets_column_and_advances_line() {
        let mut c = Cursor::new("ab\ncd");
        assert_eq!(c.position(), Position::new(1, 1));
        c.bump();
        c.bump();
        assert_eq!(c.position(), Position::new(1, 3));
        assert_eq!(c.bump(), Some('\n'));
        assert_eq!(c.position(), Position::new(2, 1));
        c.bump();
        assert_eq!(c.position(), Position::new(2, 2));
    }

    #[test]
    fn eat_only_consumes_on_match() {
        let mut c = Cursor::new("=>");
        assert!(!c.eat('>'));
        assert!(c.eat('='));
        assert!(c.eat('>'));
        assert!(c.is_at_end());
        assert_eq!(c.bump(), None);
        assert_eq!(c.position(), Position::new(1, 3));
    }

    #[test]
    fn multibyte_characters_count_as_one_column() {
        let mut c = Cursor::new("é;");
        c.bump();
        assert_eq!(c.position(), Position::new(1, 2));
        assert_eq!(c.slice_from(0), "é");
        assert_eq!(c.peek(), Some(';'));
    }
}
