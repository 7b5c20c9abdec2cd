use crate::types::VarType;
use ksharp_ast::span::Position;
use ksharp_ast::token::{Token, TokenKind};
use std::collections::HashMap;
use tracing::{debug, trace};

/// Declared variables, in declaration order. The first declaration of a
/// name wins; later ones are rejected by [`DeclTable::insert`].
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct DeclTable {
    entries: Vec<(String, VarType)>,
    #[cfg_attr(feature = "serde", serde(skip))]
    index: HashMap<String, usize>,
}

impl DeclTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` (and leaves the table untouched) if `name` exists.
    pub fn insert(&mut self, name: &str, ty: VarType) -> bool {
        if self.index.contains_key(name) {
            return false;
        }
        self.index.insert(name.to_string(), self.entries.len());
        self.entries.push((name.to_string(), ty));
        true
    }

    pub fn get(&self, name: &str) -> Option<VarType> {
        self.index.get(name).map(|&i| self.entries[i].1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, VarType)> {
        self.entries.iter().map(|(n, t)| (n.as_str(), *t))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// One line of the semantic report.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", rename_all = "snake_case"))]
pub enum SemanticDiagnostic {
    /// A declaration entered the table. `type_name` is the lexeme as written.
    Declared {
        type_name: String,
        name: String,
        ty: VarType,
        pos: Position,
    },
    DuplicateDeclaration { name: String, pos: Position },
    UsedBeforeDeclaration { name: String, pos: Position },
    TypeMismatch {
        name: String,
        declared: VarType,
        found: VarType,
        pos: Position,
    },
    /// One side of an assignment has no determinable type.
    UndeterminedType {
        name: String,
        declared: VarType,
        found: VarType,
        pos: Position,
    },
    AssignmentOk { name: String, ty: VarType, pos: Position },
}

impl SemanticDiagnostic {
    pub fn severity(&self) -> Severity {
        match self {
            SemanticDiagnostic::Declared { .. } | SemanticDiagnostic::AssignmentOk { .. } => {
                Severity::Info
            }
            SemanticDiagnostic::UndeterminedType { .. } => Severity::Warning,
            SemanticDiagnostic::DuplicateDeclaration { .. }
            | SemanticDiagnostic::UsedBeforeDeclaration { .. }
            | SemanticDiagnostic::TypeMismatch { .. } => Severity::Error,
        }
    }

    pub fn from_declaration_pass(&self) -> bool {
        matches!(
            self,
            SemanticDiagnostic::Declared { .. } | SemanticDiagnostic::DuplicateDeclaration { .. }
        )
    }

    pub fn pos(&self) -> Position {
        match self {
            SemanticDiagnostic::Declared { pos, .. }
            | SemanticDiagnostic::DuplicateDeclaration { pos, .. }
            | SemanticDiagnostic::UsedBeforeDeclaration { pos, .. }
            | SemanticDiagnostic::TypeMismatch { pos, .. }
            | SemanticDiagnostic::UndeterminedType { pos, .. }
            | SemanticDiagnostic::AssignmentOk { pos, .. } => *pos,
        }
    }
}

impl std::fmt::Display for SemanticDiagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            SemanticDiagnostic::Declared {
                type_name, name, ..
            } => write!(f, "[Declare] {} {}", type_name, name),
            SemanticDiagnostic::DuplicateDeclaration { name, pos } => {
                write!(
                    f,
                    "[Semantic Error] duplicate declaration of {} at {}",
                    name, pos
                )
            }
            SemanticDiagnostic::UsedBeforeDeclaration { name, pos } => {
                write!(
                    f,
                    "[Semantic Error] variable {} used before declaration at {}",
                    name, pos
                )
            }
            SemanticDiagnostic::TypeMismatch {
                name,
                declared,
                found,
                pos,
            } => write!(
                f,
                "[Semantic Error] type mismatch in assignment to {}: declared {}, right-hand side {} at {}",
                name, declared, found, pos
            ),
            SemanticDiagnostic::UndeterminedType {
                name,
                declared,
                found,
                pos,
            } => write!(
                f,
                "[Semantic Warning] cannot determine type of assignment to {} (declared {}, right-hand side {}) at {}",
                name, declared, found, pos
            ),
            SemanticDiagnostic::AssignmentOk { name, ty, .. } => {
                write!(f, "[OK] assignment to {} is type-safe ({})", name, ty)
            }
        }
    }
}

impl std::error::Error for SemanticDiagnostic {}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SemanticReport {
    pub table: DeclTable,
    /// Declaration pass entries first, then assignment pass entries, each in
    /// token order.
    pub diagnostics: Vec<SemanticDiagnostic>,
    /// Tokens seen, including the end-of-input token and trivia.
    pub token_count: usize,
}

impl SemanticReport {
    fn with_severity(&self, sev: Severity) -> impl Iterator<Item = &SemanticDiagnostic> {
        self.diagnostics.iter().filter(move |d| d.severity() == sev)
    }

    pub fn errors(&self) -> impl Iterator<Item = &SemanticDiagnostic> {
        self.with_severity(Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &SemanticDiagnostic> {
        self.with_severity(Severity::Warning)
    }

    pub fn error_count(&self) -> usize {
        self.errors().count()
    }

    pub fn warning_count(&self) -> usize {
        self.warnings().count()
    }

    pub fn has_errors(&self) -> bool {
        self.errors().next().is_some()
    }
}

/// Flat two-pass checker. Blocks are not scopes: a declaration anywhere in
/// the token stream is visible to every later assignment check.
#[derive(Debug, Default)]
pub struct Checker {
    table: DeclTable,
    diagnostics: Vec<SemanticDiagnostic>,
}

impl Checker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record every adjacent `type identifier` pair.
    pub fn declaration_pass(&mut self, tokens: &[&Token]) {
        for pair in tokens.windows(2) {
            let (ty_tok, name_tok) = (pair[0], pair[1]);
            if ty_tok.kind != TokenKind::ReservedType || name_tok.kind != TokenKind::Identifier {
                continue;
            }
            let ty = VarType::from_type_lexeme(&ty_tok.text);
            let name = name_tok.text.as_str();
            if self.table.insert(name, ty) {
                trace!(name, %ty, "declared");
                self.diagnostics.push(SemanticDiagnostic::Declared {
                    type_name: ty_tok.text.clone(),
                    name: name.to_string(),
                    ty,
                    pos: name_tok.pos,
                });
            } else {
                self.diagnostics
                    .push(SemanticDiagnostic::DuplicateDeclaration {
                        name: name.to_string(),
                        pos: name_tok.pos,
                    });
            }
        }
    }

    /// Check every `identifier =` against the token right after the `=`.
    pub fn assignment_pass(&mut self, tokens: &[&Token]) {
        for (i, lhs) in tokens.iter().enumerate() {
            if lhs.kind != TokenKind::Identifier {
                continue;
            }
            if tokens.get(i + 1).map(|t| t.kind) != Some(TokenKind::Assign) {
                continue;
            }
            let name = lhs.text.clone();
            let pos = lhs.pos;
            let Some(declared) = self.table.get(&name) else {
                self.diagnostics
                    .push(SemanticDiagnostic::UsedBeforeDeclaration { name, pos });
                continue;
            };
            let found = tokens
                .get(i + 2)
                .map_or(VarType::Unknown, |rhs| self.rhs_type(rhs));

            let diag = if !declared.is_known() || !found.is_known() {
                SemanticDiagnostic::UndeterminedType {
                    name,
                    declared,
                    found,
                    pos,
                }
            } else if declared != found {
                SemanticDiagnostic::TypeMismatch {
                    name,
                    declared,
                    found,
                    pos,
                }
            } else {
                SemanticDiagnostic::AssignmentOk {
                    name,
                    ty: declared,
                    pos,
                }
            };
            self.diagnostics.push(diag);
        }
    }

    fn rhs_type(&self, tok: &Token) -> VarType {
        if let Some(ty) = VarType::of_constant(tok.kind) {
            return ty;
        }
        if tok.kind == TokenKind::Identifier {
            return self.table.get(&tok.text).unwrap_or(VarType::Unknown);
        }
        VarType::Unknown
    }

    pub fn finish(self, token_count: usize) -> SemanticReport {
        SemanticReport {
            table: self.table,
            diagnostics: self.diagnostics,
            token_count,
        }
    }
}

/// Run both passes over `tokens`. Comments and noise words are skipped
/// before any pairing.
pub fn check(tokens: &[Token]) -> SemanticReport {
    let significant: Vec<&Token> = tokens.iter().filter(|t| !t.kind.is_trivia()).collect();
    let mut checker = Checker::new();
    checker.declaration_pass(&significant);
    checker.assignment_pass(&significant);
    let report = checker.finish(tokens.len());
    debug!(
        declared = report.table.len(),
        errors = report.error_count(),
        warnings = report.warning_count(),
        "semantic check finished"
    );
    report
}
