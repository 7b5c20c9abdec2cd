//! Loading inputs for the front-end stages.

use anyhow::{bail, Context, Result};
use ksharp_ast::token::Token;
use ksharp_parse::table::{load_table, rows_to_tokens};
use ksharp_parse::tokenize;
use std::path::Path;
use tracing::debug;

/// Maximum source file size in bytes (1MB)
pub const MAX_SOURCE_SIZE: usize = 1_000_000;

pub const SOURCE_EXTENSION: &str = "ksh";

/// Read a `.ksh` source file, enforcing the extension and size limit.
pub fn load_source(path: &Path) -> Result<String> {
    if path.extension().and_then(|e| e.to_str()) != Some(SOURCE_EXTENSION) {
        bail!("need a .{} source file (got: {})", SOURCE_EXTENSION, path.display());
    }
    let src = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read file: {}", path.display()))?;
    if src.len() > MAX_SOURCE_SIZE {
        bail!(
            "source file exceeds {}MB limit ({} bytes)",
            MAX_SOURCE_SIZE / 1_000_000,
            src.len()
        );
    }
    debug!(path = %path.display(), bytes = src.len(), "source loaded");
    Ok(src)
}

/// Tokens for `path`: scanned from source, or reloaded from a token table
/// when `from_table` is set.
pub fn load_tokens(path: &Path, from_table: bool) -> Result<Vec<Token>> {
    let tokens = if from_table {
        rows_to_tokens(&load_table(path)?)
    } else {
        tokenize(&load_source(path)?)
    };
    debug!(count = tokens.len(), from_table, "tokens ready");
    Ok(tokens)
}
