use frontend::parser::{parse_expression, ParseError};
use kernel::ast::Term;
use kernel::checker::{normalize, Checker};
use kernel::diagnostics::TypeCheckResult;
use kernel::module::{AxiomBundle, Declaration, Module};
use serde::Serialize;
use std::rc::Rc;

/// Everything the pipeline produces for one expression: the parsed
/// term (best-effort even on parse errors), the parse errors, and the
/// kernel's verdict.
pub struct CheckOutcome {
    pub term: Rc<Term>,
    pub parse_errors: Vec<ParseError>,
    pub result: TypeCheckResult,
}

impl CheckOutcome {
    pub fn succeeded(&self) -> bool {
        self.parse_errors.is_empty() && !self.result.has_errors()
    }
}

/// Parse a LaTeX expression and run it through the type checker as a
/// single-statement module under the given axiom bundle.
pub fn check_expression(source: &str, bundle: AxiomBundle) -> CheckOutcome {
    let (term, parse_errors) = parse_expression(source);
    let module = Module::new("cli", bundle).with_declaration(Declaration::Theorem {
        name: "goal".to_string(),
        statement: Rc::clone(&term),
        tactics: Vec::new(),
        bundle: None,
    });
    let result = Checker::check_module(&module);
    CheckOutcome {
        term,
        parse_errors,
        result,
    }
}

/// Parse only, plus the weak-head normal form of whatever came out.
pub fn parse_only(source: &str) -> (Rc<Term>, Rc<Term>, Vec<ParseError>) {
    let (term, errors) = parse_expression(source);
    let normal = normalize(&term);
    (term, normal, errors)
}

// -- machine-readable reports ------------------------------------------------

#[derive(Serialize)]
pub struct ParseErrorReport {
    pub message: String,
    pub start: usize,
    pub end: usize,
}

impl From<&ParseError> for ParseErrorReport {
    fn from(error: &ParseError) -> Self {
        let span = error.span();
        ParseErrorReport {
            message: error.to_string(),
            start: span.start,
            end: span.end,
        }
    }
}

#[derive(Serialize)]
pub struct CheckReport {
    pub input: String,
    pub term: String,
    pub ok: bool,
    pub parse_errors: Vec<ParseErrorReport>,
    pub result: TypeCheckResult,
}

impl CheckReport {
    pub fn new(input: &str, outcome: &CheckOutcome) -> Self {
        CheckReport {
            input: input.to_string(),
            term: outcome.term.to_string(),
            ok: outcome.succeeded(),
            parse_errors: outcome.parse_errors.iter().map(Into::into).collect(),
            result: outcome.result.clone(),
        }
    }
}

#[derive(Serialize)]
pub struct ParseReport {
    pub input: String,
    pub term: String,
    pub normal_form: String,
    pub parse_errors: Vec<ParseErrorReport>,
}
