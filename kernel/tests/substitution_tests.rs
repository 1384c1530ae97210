//! Capture-avoiding substitution semantics: shadowing, renaming, and
//! fresh-name determinism.

use kernel::ast::Term;
use kernel::subst::{free_vars, substitute, NameSupply};

#[test]
fn substitution_renames_binder_to_avoid_capture() {
    // (λy : ℕ. x)[x := y] must NOT become λy. y
    let term = Term::lam("y", Term::var("ℕ"), Term::var("x"));
    let mut supply = NameSupply::new();
    let result = substitute(&term, "x", &Term::var("y"), &mut supply);

    match &*result {
        Term::Lam(bound, _, body) => {
            assert_ne!(bound, "y", "binder must be renamed away from the replacement");
            assert_eq!(**body, Term::Var("y".to_string()));
        }
        other => panic!("expected a lambda, got {:?}", other),
    }
}

#[test]
fn substitution_without_collision_keeps_binder_name() {
    // (λy : ℕ. x)[x := z] keeps the binder y
    let term = Term::lam("y", Term::var("ℕ"), Term::var("x"));
    let mut supply = NameSupply::new();
    let result = substitute(&term, "x", &Term::var("z"), &mut supply);
    assert_eq!(result, Term::lam("y", Term::var("ℕ"), Term::var("z")));
}

#[test]
fn shadowed_binder_leaves_body_untouched() {
    // (λx : ℕ. x)[x := 5] is unchanged: the inner x is the binder's
    let term = Term::lam("x", Term::var("ℕ"), Term::var("x"));
    let mut supply = NameSupply::new();
    let result = substitute(&term, "x", &Term::nat_lit("5"), &mut supply);
    assert_eq!(result, term);
}

#[test]
fn shadowed_binder_still_substitutes_into_parameter_type() {
    // (λx : T(x). x)[x := ℕ]: the type is in the outer scope
    let term = Term::lam(
        "x",
        Term::app(Term::var("T"), Term::var("x")),
        Term::var("x"),
    );
    let mut supply = NameSupply::new();
    let result = substitute(&term, "x", &Term::var("ℕ"), &mut supply);
    assert_eq!(
        result,
        Term::lam(
            "x",
            Term::app(Term::var("T"), Term::var("ℕ")),
            Term::var("x"),
        )
    );
}

#[test]
fn quantifier_domain_substituted_even_under_shadowing() {
    // (∀x ∈ S(x), x > 0)[x := 3]: domain substituted, body untouched
    let term = Term::forall(
        "x",
        Term::app(Term::var("S"), Term::var("x")),
        Term::binop(kernel::ast::BinOp::Gt, Term::var("x"), Term::nat_lit("0")),
    );
    let mut supply = NameSupply::new();
    let result = substitute(&term, "x", &Term::nat_lit("3"), &mut supply);
    match &*result {
        Term::ForAll(bound, domain, body) => {
            assert_eq!(bound, "x");
            assert_eq!(
                **domain,
                *Term::app(Term::var("S"), Term::nat_lit("3"))
            );
            assert_eq!(
                **body,
                *Term::binop(kernel::ast::BinOp::Gt, Term::var("x"), Term::nat_lit("0"))
            );
        }
        other => panic!("expected a quantifier, got {:?}", other),
    }
}

#[test]
fn no_free_variable_of_replacement_becomes_bound() {
    // General capture-freedom on a nested binder tower.
    let term = Term::lam(
        "a",
        Term::var("ℕ"),
        Term::lam(
            "b",
            Term::var("ℕ"),
            Term::app(Term::var("x"), Term::app(Term::var("a"), Term::var("b"))),
        ),
    );
    let replacement = Term::app(Term::var("a"), Term::var("b"));
    let mut supply = NameSupply::new();
    let result = substitute(&term, "x", &replacement, &mut supply);

    // After substitution, a and b from the replacement must remain
    // free in the whole result.
    let fvs = free_vars(&result);
    assert!(fvs.contains("a"));
    assert!(fvs.contains("b"));
}

#[test]
fn let_binding_shadows_but_substitutes_value() {
    // (let x := x + 1 in x)[x := 2]: value substituted, body untouched
    let term = Term::let_in(
        "x",
        Term::binop(kernel::ast::BinOp::Add, Term::var("x"), Term::nat_lit("1")),
        Term::var("x"),
    );
    let mut supply = NameSupply::new();
    let result = substitute(&term, "x", &Term::nat_lit("2"), &mut supply);
    assert_eq!(
        result,
        Term::let_in(
            "x",
            Term::binop(kernel::ast::BinOp::Add, Term::nat_lit("2"), Term::nat_lit("1")),
            Term::var("x"),
        )
    );
}

#[test]
fn fresh_names_are_deterministic() {
    let term = Term::lam("y", Term::var("ℕ"), Term::var("x"));
    let mut supply_one = NameSupply::new();
    let mut supply_two = NameSupply::new();
    let first = substitute(&term, "x", &Term::var("y"), &mut supply_one);
    let second = substitute(&term, "x", &Term::var("y"), &mut supply_two);
    assert_eq!(first, second);
}

#[test]
fn free_vars_survives_adversarially_deep_terms() {
    let mut term = Term::var("x");
    for _ in 0..10_000 {
        term = Term::unary(kernel::ast::UnaryOp::Not, term);
    }
    let fvs = free_vars(&term);
    assert_eq!(fvs.len(), 1);
    assert!(fvs.contains("x"));
}

#[test]
fn substitution_cuts_off_below_its_depth_limit() {
    let mut term = Term::var("x");
    for _ in 0..10_000 {
        term = Term::unary(kernel::ast::UnaryOp::Not, term);
    }
    let mut supply = NameSupply::new();
    let result = substitute(&term, "x", &Term::nat_lit("1"), &mut supply);
    // Returns instead of overflowing; the occurrence below the cutoff
    // stays in place.
    assert!(free_vars(&result).contains("x"));
}
