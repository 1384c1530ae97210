pub mod ast;
pub mod checker;
pub mod diagnostics;
pub mod module;
pub mod subst;

pub use ast::*;

#[cfg(test)]
mod tests {
    use crate::ast::Term;
    use crate::checker::{normalize, terms_equal, Checker, Context};
    use crate::module::AxiomBundle;

    #[test]
    fn test_beta_reduction_at_head() {
        // (λx : ℕ. x)(1) reduces to 1
        let id = Term::lam("x", Term::var("ℕ"), Term::var("x"));
        let applied = Term::app(id, Term::nat_lit("1"));
        let normal = normalize(&applied);
        assert_eq!(normal, Term::nat_lit("1"));
    }

    #[test]
    fn test_alpha_equivalent_identities() {
        let left = Term::lam("x", Term::var("ℕ"), Term::var("x"));
        let right = Term::lam("y", Term::var("ℕ"), Term::var("y"));
        assert!(terms_equal(&left, &right, None));
    }

    #[test]
    fn test_infer_literal_type() {
        let ctx = Context::standard(AxiomBundle::classical_math());
        let mut checker = Checker::new();
        let ty = checker.infer(&ctx, &Term::nat_lit("42")).expect("literal must infer");
        assert_eq!(ty, Term::var("ℕ"));
    }

    #[test]
    fn test_json_round_trip() {
        let term = Term::forall(
            "x",
            Term::var("ℕ"),
            Term::binop(crate::ast::BinOp::Ge, Term::var("x"), Term::nat_lit("0")),
        );
        let encoded = crate::ast::encode_term(&term);
        let decoded = crate::ast::decode_term(&encoded).expect("round trip must succeed");
        assert_eq!(term, decoded);
    }

    #[test]
    fn test_decode_malformed_payload_is_absent() {
        assert!(crate::ast::decode_term("{\"Var\": ").is_none());
    }
}
