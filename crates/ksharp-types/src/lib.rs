#![deny(unused_must_use)]
#![warn(clippy::dbg_macro, clippy::todo, clippy::unimplemented)]
#![forbid(unsafe_code)]

mod checker;
mod types;

pub use checker::{check, Checker, DeclTable, SemanticDiagnostic, SemanticReport, Severity};
pub use types::VarType;
