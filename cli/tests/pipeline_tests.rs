use cli::driver::{check_expression, parse_only, CheckReport};
use cli::resolve_bundle;
use insta::assert_snapshot;
use kernel::diagnostics::Severity;
use kernel::module::AxiomBundle;

fn run_check(source: &str) -> String {
    let outcome = check_expression(source, AxiomBundle::classical_math());
    let mut out = String::new();
    out.push_str(&format!("term: {}\n", outcome.term));
    for error in &outcome.parse_errors {
        out.push_str(&format!("parse error: {}\n", error));
    }
    for diag in &outcome.result.diagnostics {
        out.push_str(&format!("{}: {}\n", diag.severity, diag.message));
    }
    out.push_str(&format!("valid: {}\n", outcome.result.valid));
    out
}

#[test]
fn quantified_statement_checks_clean() {
    assert_snapshot!(run_check(r"\forall x \in \mathbb{N}, x \geq 0"), @r###"
    term: ∀ x ∈ ℕ, (x ≥ 0)
    valid: true
    "###);
}

#[test]
fn arithmetic_expression_is_not_a_proposition() {
    let outcome = check_expression("1 + 2", AxiomBundle::classical_math());
    assert!(outcome.parse_errors.is_empty());
    assert!(outcome.result.valid);
    assert!(outcome
        .result
        .diagnostics
        .iter()
        .any(|d| d.severity == Severity::Warning));
}

#[test]
fn unbound_variable_in_checked_statement_is_an_error() {
    let outcome = check_expression(
        r"\forall x \in \mathbb{N}, P(x)",
        AxiomBundle::classical_math(),
    );
    assert!(!outcome.result.valid);
    assert!(outcome
        .result
        .errors()
        .any(|d| d.message.contains("unbound variable")));
}

#[test]
fn known_vocabulary_resolves_against_the_standard_context() {
    let outcome = check_expression(
        r"\forall n \in \mathbb{N}, \gcd(n, n) = n",
        AxiomBundle::classical_math(),
    );
    assert!(outcome.parse_errors.is_empty());
    assert!(outcome.result.valid, "{:?}", outcome.result.diagnostics);
}

#[test]
fn parse_errors_flow_through_without_aborting_the_check() {
    let outcome = check_expression("x + ", AxiomBundle::classical_math());
    assert_eq!(outcome.parse_errors.len(), 1);
    assert!(!outcome.succeeded());
}

#[test]
fn parse_only_reports_the_normal_form() {
    let (term, normal, errors) = parse_only("1 + 2");
    assert!(errors.is_empty());
    assert_eq!(term.to_string(), "(1 + 2)");
    assert_eq!(normal.to_string(), "(1 + 2)");
}

#[test]
fn check_report_serializes_to_json() {
    let outcome = check_expression(r"\forall x \in \mathbb{N}, x = x", AxiomBundle::minimal_core());
    let report = CheckReport::new(r"\forall x \in \mathbb{N}, x = x", &outcome);
    let json = serde_json::to_string(&report).expect("report should serialize");
    let value: serde_json::Value = serde_json::from_str(&json).expect("round trip");
    assert_eq!(value["ok"], serde_json::Value::Bool(true));
    assert_eq!(value["term"], "∀ x ∈ ℕ, (x = x)");
}

#[test]
fn minimal_bundle_flags_classical_axioms() {
    let outcome = check_expression("x = x", AxiomBundle::minimal_core());
    // No axiom references in the statement itself, so nothing flagged.
    assert!(outcome.result.axioms_used.is_empty());

    let classical = resolve_bundle("classical").expect("known bundle");
    assert!(classical.axioms().count() > 0);
}
