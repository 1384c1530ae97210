use crate::ast::{Axiom, Term};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::rc::Rc;

/// Byte range in the original source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Span { start, end }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Severity {
    Error,
    Warning,
    Info,
    Hint,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Info => write!(f, "info"),
            Severity::Hint => write!(f, "hint"),
        }
    }
}

/// A single severity-tagged message. Only `Error` diagnostics make a
/// check result invalid; everything else is advisory.
#[derive(Debug, Clone, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    pub span: Option<Span>,
    /// The offending term, when one exists.
    pub term: Option<Rc<Term>>,
}

impl Diagnostic {
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Diagnostic {
            severity,
            message: message.into(),
            span: None,
            term: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Severity::Error, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, message)
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(Severity::Info, message)
    }

    pub fn hint(message: impl Into<String>) -> Self {
        Self::new(Severity::Hint, message)
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    pub fn with_term(mut self, term: Rc<Term>) -> Self {
        self.term = Some(term);
        self
    }
}

/// Everything recorded at a hole site: enough context for a consumer
/// to suggest completions.
#[derive(Debug, Clone, Serialize)]
pub struct HoleInfo {
    pub id: String,
    pub expected_type: Option<Rc<Term>>,
    /// Snapshot of the typing context at the hole site, outermost
    /// binding first.
    pub context: Vec<(String, Rc<Term>)>,
    pub suggestions: Vec<String>,
}

/// Aggregate outcome of checking a module or declaration set.
#[derive(Debug, Clone, Serialize)]
pub struct TypeCheckResult {
    pub valid: bool,
    pub diagnostics: Vec<Diagnostic>,
    /// Inferred types keyed by declaration name.
    pub inferred_types: BTreeMap<String, Rc<Term>>,
    pub holes: Vec<HoleInfo>,
    /// Axioms actually referenced while checking.
    pub axioms_used: BTreeSet<Axiom>,
}

impl TypeCheckResult {
    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Error)
    }

    pub fn has_errors(&self) -> bool {
        self.errors().next().is_some()
    }
}
