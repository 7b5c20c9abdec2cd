#![forbid(unsafe_code)]
#![deny(unused_must_use)]
#![warn(clippy::dbg_macro, clippy::todo, clippy::unimplemented)]

mod cursor;
pub mod keywords;
mod lexer;
mod parser;
pub mod table;

pub use cursor::Cursor;
pub use keywords::KeywordTrie;
pub use lexer::{classify_word, operator_kind, tokenize, Lexer};
pub use parser::{parse_str, parse_tokens, ParseOutcome, SyntaxError};

/// Diagnostics carried by `Unknown` tokens.
pub mod diag {
    pub use crate::lexer::{BAD_FLOAT, UNTERMINATED_CHAR, UNTERMINATED_COMMENT, UNTERMINATED_STRING};
}
