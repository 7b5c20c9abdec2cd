//! Human-readable renderings of each stage's result.

use ksharp_ast::event::{EventSink, ParseEvent};
use ksharp_parse::ParseOutcome;
use ksharp_types::SemanticReport;
use std::fmt::Write as _;

/// Renders parse events as indented tags, two spaces per level. A blank
/// line follows each statement-level close.
#[derive(Debug, Default)]
pub struct TagWriter {
    out: String,
    depth: usize,
}

impl TagWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_string(self) -> String {
        self.out
    }

    fn indent(&mut self) {
        for _ in 0..self.depth {
            self.out.push_str("  ");
        }
    }
}

impl EventSink for TagWriter {
    fn event(&mut self, event: ParseEvent) {
        match event {
            ParseEvent::Open(kind) => {
                self.indent();
                let _ = writeln!(self.out, "<{}>", kind.name());
                self.depth += 1;
            }
            ParseEvent::Close(kind) => {
                self.depth = self.depth.saturating_sub(1);
                self.indent();
                let _ = writeln!(self.out, "</{}>", kind.name());
                if kind.is_statement() {
                    self.out.push('\n');
                }
            }
            ParseEvent::Leaf { kind, text } => {
                self.indent();
                let name = kind.name();
                let _ = writeln!(self.out, "<{}> {} </{}>", name, text, name);
            }
        }
    }
}

pub fn syntax_summary(outcome: &ParseOutcome) -> &'static str {
    if outcome.is_ok() {
        "[Syntax] Program is syntactically correct."
    } else {
        "[Syntax] Program has syntax errors."
    }
}

/// Full semantic report: token count, declaration pass, assignment pass,
/// then totals.
pub fn render_semantic(report: &SemanticReport, source: &str) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Loaded {} tokens from {}", report.token_count, source);
    let _ = writeln!(out);
    let _ = writeln!(out, "=== Building semantic symbol table ===");
    for d in report.diagnostics.iter().filter(|d| d.from_declaration_pass()) {
        let _ = writeln!(out, "{}", d);
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "=== Checking assignments ===");
    for d in report.diagnostics.iter().filter(|d| !d.from_declaration_pass()) {
        let _ = writeln!(out, "{}", d);
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "Done.");
    let _ = writeln!(
        out,
        "[Semantic] {} error(s), {} warning(s).",
        report.error_count(),
        report.warning_count()
    );
    out
}

pub fn overall_line(passed: bool) -> &'static str {
    if passed {
        "Overall: PASS"
    } else {
        "Overall: FAIL"
    }
}
