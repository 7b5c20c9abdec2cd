//! Token table: the row-oriented text form of a token stream.
//!
//! ```text
//! Source: demo.ksh
//! +----------------------+------------------+
//! | Lexeme               | Token            |
//! +----------------------+------------------+
//! | int                  | type             |
//! | x                    | identifier       |
//! | ;                    | punctuator       |
//! |                      | eof              |
//! +----------------------+------------------+
//! ```
//!
//! The kind column is coarser than [`TokenKind`]: every operator renders as
//! `operator` and both delimiters and brackets as `punctuator`. Reloaded rows
//! keep that coarse [`TableKind`]; [`TableRow::to_token`] re-derives the
//! precise kind from the row text.

use crate::lexer::{operator_kind, punctuation_kind};
use anyhow::{Context, Result};
use ksharp_ast::span::Position;
use ksharp_ast::token::{Token, TokenKind};
use std::fmt::Write as _;
use std::path::Path;
use tracing::debug;

pub const LEXEME_WIDTH: usize = 20;
pub const KIND_WIDTH: usize = 16;

const BORDER: &str = "+----------------------+------------------+";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TableKind {
    Identifier,
    Keyword,
    Type,
    ConstInt,
    ConstFloat,
    ConstChar,
    ConstBool,
    ConstString,
    Operator,
    Punctuator,
    Comment,
    Noise,
    Unknown,
    Eof,
}

impl TableKind {
    pub fn of(kind: TokenKind) -> Self {
        match kind {
            TokenKind::Identifier => TableKind::Identifier,
            TokenKind::Keyword => TableKind::Keyword,
            TokenKind::ReservedType => TableKind::Type,
            TokenKind::IntConst => TableKind::ConstInt,
            TokenKind::FloatConst => TableKind::ConstFloat,
            TokenKind::CharConst => TableKind::ConstChar,
            TokenKind::BoolConst => TableKind::ConstBool,
            TokenKind::StringConst => TableKind::ConstString,
            TokenKind::ArithOp | TokenKind::RelOp | TokenKind::LogicOp | TokenKind::Assign => {
                TableKind::Operator
            }
            TokenKind::Delimiter | TokenKind::Bracket => TableKind::Punctuator,
            TokenKind::Comment => TableKind::Comment,
            TokenKind::Noise => TableKind::Noise,
            TokenKind::Unknown => TableKind::Unknown,
            TokenKind::Eof => TableKind::Eof,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TableKind::Identifier => "identifier",
            TableKind::Keyword => "keyword",
            TableKind::Type => "type",
            TableKind::ConstInt => "const_int",
            TableKind::ConstFloat => "const_float",
            TableKind::ConstChar => "const_char",
            TableKind::ConstBool => "const_bool",
            TableKind::ConstString => "const_string",
            TableKind::Operator => "operator",
            TableKind::Punctuator => "punctuator",
            TableKind::Comment => "comment",
            TableKind::Noise => "noise",
            TableKind::Unknown => "unknown",
            TableKind::Eof => "eof",
        }
    }

    /// Unrecognised labels map to `Unknown`.
    pub fn from_label(label: &str) -> Self {
        match label {
            "identifier" => TableKind::Identifier,
            "keyword" => TableKind::Keyword,
            "type" => TableKind::Type,
            "const_int" => TableKind::ConstInt,
            "const_float" => TableKind::ConstFloat,
            "const_char" => TableKind::ConstChar,
            "const_bool" => TableKind::ConstBool,
            "const_string" => TableKind::ConstString,
            "operator" => TableKind::Operator,
            "punctuator" => TableKind::Punctuator,
            "comment" => TableKind::Comment,
            "noise" => TableKind::Noise,
            "eof" => TableKind::Eof,
            _ => TableKind::Unknown,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct TableRow {
    pub lexeme: String,
    pub kind: TableKind,
    /// 1-based line of the row in the table text.
    pub line: u32,
}

impl TableRow {
    /// Rebuild a token. Operator and punctuation kinds are recovered from
    /// the row text; anything unrecognised becomes `Unknown`.
    pub fn to_token(&self) -> Token {
        let pos = Position::new(self.line, 3);
        let text = self.lexeme.as_str();
        let kind = match self.kind {
            TableKind::Identifier => TokenKind::Identifier,
            TableKind::Keyword => TokenKind::Keyword,
            TableKind::Type => TokenKind::ReservedType,
            TableKind::ConstInt => TokenKind::IntConst,
            TableKind::ConstFloat => TokenKind::FloatConst,
            TableKind::ConstChar => TokenKind::CharConst,
            TableKind::ConstBool => TokenKind::BoolConst,
            TableKind::ConstString => TokenKind::StringConst,
            TableKind::Comment => TokenKind::Comment,
            TableKind::Noise => TokenKind::Noise,
            TableKind::Unknown => TokenKind::Unknown,
            TableKind::Eof => return Token::eof(pos),
            TableKind::Operator => match operator_kind(text) {
                Some(kind) => return Token::new(kind, text, pos).with_subtag(text),
                None => TokenKind::Unknown,
            },
            TableKind::Punctuator => {
                let mut chars = text.chars();
                match (chars.next().and_then(punctuation_kind), chars.next()) {
                    (Some(kind), None) => return Token::new(kind, text, pos).with_subtag(text),
                    _ => TokenKind::Unknown,
                }
            }
        };
        Token::new(kind, text, pos)
    }
}

/// Fit a lexeme into one cell: line breaks become spaces and anything wider
/// than the column is cut to `LEXEME_WIDTH - 1` chars plus `.`.
fn clip(text: &str) -> String {
    let flat = text.replace(['\r', '\n'], " ");
    if flat.chars().count() > LEXEME_WIDTH {
        let mut s: String = flat.chars().take(LEXEME_WIDTH - 1).collect();
        s.push('.');
        s
    } else {
        flat
    }
}

/// Render `tokens` as a table headed by `Source: <source>`.
pub fn render_table(source: &str, tokens: &[Token]) -> String {
    let mut out = String::new();
    // writing into a String cannot fail
    let _ = writeln!(out, "Source: {}", source);
    let _ = writeln!(out, "{}", BORDER);
    let _ = writeln!(
        out,
        "| {:<lw$} | {:<kw$} |",
        "Lexeme",
        "Token",
        lw = LEXEME_WIDTH,
        kw = KIND_WIDTH
    );
    let _ = writeln!(out, "{}", BORDER);
    for tok in tokens {
        let _ = writeln!(
            out,
            "| {:<lw$} | {:<kw$} |",
            clip(tok.shown()),
            TableKind::of(tok.kind).label(),
            lw = LEXEME_WIDTH,
            kw = KIND_WIDTH
        );
    }
    let _ = writeln!(out, "{}", BORDER);
    out
}

/// Parse table text. A trailing `eof` row is synthesized when missing.
pub fn read_table(text: &str) -> Vec<TableRow> {
    let mut rows = Vec::new();
    let mut last_line = 0;
    for (i, raw) in text.lines().enumerate() {
        let line_no = (i + 1) as u32;
        last_line = line_no;
        let line = raw.trim();
        if line.is_empty()
            || line.starts_with("Source:")
            || line.starts_with('+')
            || line.starts_with('-')
            || (line.contains("Lexeme") && line.contains("Token"))
            || !line.starts_with('|')
        {
            continue;
        }
        // | <lexeme> | <kind> |   (the kind is the last field, so a '|'
        // inside the lexeme survives)
        let inner = line[1..].strip_suffix('|').unwrap_or(&line[1..]);
        let Some((lexeme, kind)) = inner.rsplit_once('|') else {
            debug!(line = line_no, "skipping malformed table row");
            continue;
        };
        rows.push(TableRow {
            lexeme: lexeme.trim().to_string(),
            kind: TableKind::from_label(kind.trim()),
            line: line_no,
        });
    }
    if rows.last().map(|r| r.kind) != Some(TableKind::Eof) {
        rows.push(TableRow {
            lexeme: String::new(),
            kind: TableKind::Eof,
            line: last_line + 1,
        });
    }
    debug!(rows = rows.len(), "token table read");
    rows
}

pub fn rows_to_tokens(rows: &[TableRow]) -> Vec<Token> {
    rows.iter().map(TableRow::to_token).collect()
}

pub fn load_table(path: impl AsRef<Path>) -> Result<Vec<TableRow>> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("cannot open token table {}", path.display()))?;
    Ok(read_table(&text))
}

pub fn write_table(path: impl AsRef<Path>, source: &str, tokens: &[Token]) -> Result<()> {
    let path = path.as_ref();
    std::fs::write(path, render_table(source, tokens))
        .with_context(|| format!("cannot create {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn long_lexemes_are_clipped_to_column_width() {
        assert_eq!(clip("short"), "short");
        let clipped = clip("\"a fairly long string literal\"");
        assert_eq!(clipped.chars().count(), LEXEME_WIDTH);
        assert!(clipped.ends_with('.'));
        assert_eq!(clip("/* a\n b */"), "/* a  b */");
    }

    #[test]
    fn row_layout_matches_column_widths() {
        let toks = vec![Token::eof(Position::START)];
        let table = render_table("t.ksh", &toks);
        let lines: Vec<_> = table.lines().collect();
        assert_eq!(lines[0], "Source: t.ksh");
        assert_eq!(lines[1], BORDER);
        assert_eq!(lines[2].len(), BORDER.len());
        assert_eq!(lines[4], "|                      | eof              |");
        assert_eq!(lines[5], BORDER);
    }

    #[test]
    fn unknown_label_maps_to_unknown() {
        assert_eq!(TableKind::from_label("gizmo"), TableKind::Unknown);
        for kind in [TableKind::Operator, TableKind::Punctuator, TableKind::Eof] {
            assert_eq!(TableKind::from_label(kind.label()), kind);
        }
    }
}
