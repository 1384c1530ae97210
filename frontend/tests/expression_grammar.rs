use frontend::parser::{parse_expression, ParseError};
use insta::assert_snapshot;
use kernel::ast::{BinOp, LiteralKind, Term, UnaryOp};

fn parse_clean(input: &str) -> String {
    let (term, errors) = parse_expression(input);
    assert!(errors.is_empty(), "unexpected errors for {input:?}: {errors:?}");
    term.to_string()
}

#[test]
fn bare_number_is_a_nat_literal() {
    let (term, errors) = parse_expression("42");
    assert!(errors.is_empty());
    assert!(matches!(&*term, Term::Literal(LiteralKind::Nat, v) if v == "42"));
}

#[test]
fn decimal_number_keeps_its_text() {
    let (term, errors) = parse_expression("4.5");
    assert!(errors.is_empty());
    assert!(matches!(&*term, Term::Literal(LiteralKind::Int, v) if v == "4.5"));
}

#[test]
fn multiplication_binds_tighter_than_addition() {
    assert_snapshot!(parse_clean(r"a + b \cdot c"), @"(a + (b * c))");
}

#[test]
fn addition_is_left_associative() {
    assert_snapshot!(parse_clean("a + b + c"), @"((a + b) + c)");
}

#[test]
fn implication_is_right_associative() {
    assert_snapshot!(parse_clean(r"p \to q \to r"), @"(p → (q → r))");
}

#[test]
fn power_is_right_associative_and_reads_braced_exponents() {
    assert_snapshot!(parse_clean("a^{n-1}"), @"(a ^ (n - 1))");
    assert_snapshot!(parse_clean("2^3^4"), @"(2 ^ (3 ^ 4))");
}

#[test]
fn universal_quantifier_with_domain() {
    let (term, errors) = parse_expression(r"\forall x \in \mathbb{N}, x \geq 0");
    assert!(errors.is_empty());
    let Term::ForAll(name, domain, body) = &*term else {
        panic!("expected a universal quantifier, got {term}");
    };
    assert_eq!(name, "x");
    assert!(matches!(&**domain, Term::Var(d) if d == "ℕ"));
    assert!(matches!(&**body, Term::BinOp(BinOp::Ge, _, _)));
}

#[test]
fn quantifier_without_domain_ranges_over_a_type() {
    let (term, errors) = parse_expression(r"\exists y, y = y");
    assert!(errors.is_empty());
    let Term::Exists(_, domain, _) = &*term else {
        panic!("expected an existential, got {term}");
    };
    assert!(matches!(&**domain, Term::Sort(_)));
}

#[test]
fn nested_quantifiers_render_as_written() {
    assert_snapshot!(
        parse_clean(r"\forall n \in \mathbb{N}, \exists m \in \mathbb{N}, m > n"),
        @"∀ n ∈ ℕ, ∃ m ∈ ℕ, (m > n)"
    );
}

#[test]
fn frac_becomes_division() {
    assert_snapshot!(parse_clean(r"\frac{a+b}{2}"), @"((a + b) / 2)");
}

#[test]
fn congruence_with_pmod_carries_the_modulus() {
    let (term, errors) = parse_expression(r"a \equiv b \pmod{n}");
    assert!(errors.is_empty());
    let Term::Equiv(_, _, modulus) = &*term else {
        panic!("expected a congruence, got {term}");
    };
    let modulus = modulus.as_ref().expect("modulus should be captured");
    assert!(matches!(&**modulus, Term::Var(n) if n == "n"));
}

#[test]
fn congruence_accepts_parenthesized_bmod() {
    let (term, errors) = parse_expression(r"a \equiv b (\bmod n)");
    assert!(errors.is_empty());
    assert!(matches!(&*term, Term::Equiv(_, _, Some(_))));
}

#[test]
fn bare_congruence_has_no_modulus() {
    let (term, errors) = parse_expression(r"a \equiv b");
    assert!(errors.is_empty());
    assert!(matches!(&*term, Term::Equiv(_, _, None)));
}

#[test]
fn function_application_curries_comma_arguments() {
    assert_snapshot!(parse_clean(r"\gcd(a, b)"), @"gcd(a)(b)");
}

#[test]
fn subscripts_fold_into_variable_names() {
    assert_snapshot!(parse_clean("x_1 + x_2"), @"(x_1 + x_2)");
    assert_snapshot!(parse_clean("a_{ij}"), @"a_ij");
}

#[test]
fn unary_minus_on_a_numeral_is_an_int_literal() {
    let (term, errors) = parse_expression("-5");
    assert!(errors.is_empty());
    assert!(matches!(&*term, Term::Literal(LiteralKind::Int, v) if v == "-5"));
}

#[test]
fn unary_minus_on_a_variable_stays_symbolic() {
    let (term, errors) = parse_expression("-x");
    assert!(errors.is_empty());
    assert!(matches!(&*term, Term::UnaryOp(UnaryOp::Neg, _)));
}

#[test]
fn negation_binds_tighter_than_conjunction() {
    assert_snapshot!(parse_clean(r"\neg p \land q"), @"((¬p) ∧ q)");
}

#[test]
fn tuples_build_right_nested_pairs() {
    assert_snapshot!(parse_clean("(a, b, c)"), @"(a, (b, c))");
}

#[test]
fn left_right_delimiters_are_transparent() {
    assert_snapshot!(parse_clean(r"\left( a + b \right) \cdot c"), @"((a + b) * c)");
}

#[test]
fn sum_with_bounds_applies_them_in_order() {
    assert_snapshot!(parse_clean(r"\sum_{k} k \cdot 2"), @"sum(k)((k * 2))");
}

#[test]
fn greek_letters_become_unicode_variables() {
    assert_snapshot!(parse_clean(r"\alpha + \pi"), @"(α + π)");
}

#[test]
fn sqrt_and_binom_use_their_named_heads() {
    assert_snapshot!(parse_clean(r"\sqrt{x}"), @"sqrt(x)");
    assert_snapshot!(parse_clean(r"\binom{n}{k}"), @"binom(n)(k)");
}

#[test]
fn unknown_command_falls_back_to_a_variable() {
    let (term, errors) = parse_expression(r"\mystery");
    assert!(errors.is_empty());
    assert!(matches!(&*term, Term::Var(n) if n == "mystery"));
}

#[test]
fn missing_operand_recovers_with_a_hole() {
    let (term, errors) = parse_expression("a +");
    assert_eq!(errors.len(), 1);
    assert!(matches!(errors[0], ParseError::UnexpectedEof(_)));
    let Term::BinOp(BinOp::Add, _, rhs) = &*term else {
        panic!("expected recovery inside the addition, got {term}");
    };
    assert!(matches!(&**rhs, Term::Hole(_, _)));
}

#[test]
fn unbalanced_paren_is_reported_with_a_span() {
    let (_, errors) = parse_expression("(a + b");
    assert_eq!(errors.len(), 1);
    assert!(matches!(errors[0], ParseError::Expected(_, _)));
}

#[test]
fn stray_trailing_token_is_one_error() {
    let (term, errors) = parse_expression("a + b )");
    assert_eq!(errors.len(), 1);
    assert!(matches!(&errors[0], ParseError::UnexpectedToken(t, _) if t == ")"));
    assert!(matches!(&*term, Term::BinOp(BinOp::Add, _, _)));
}

#[test]
fn deep_nesting_is_cut_off_instead_of_overflowing() {
    let depth = 400;
    let mut input = String::new();
    for _ in 0..depth {
        input.push('(');
    }
    input.push('x');
    for _ in 0..depth {
        input.push(')');
    }
    let (_, errors) = parse_expression(&input);
    assert!(errors
        .iter()
        .any(|e| matches!(e, ParseError::TooDeep(_))));
}

#[test]
fn flat_negation_chain_is_cut_off_instead_of_overflowing() {
    let mut input = "¬".repeat(10_000);
    input.push('x');
    let (_, errors) = parse_expression(&input);
    assert!(errors
        .iter()
        .any(|e| matches!(e, ParseError::TooDeep(_))));
}

#[test]
fn flat_implication_chain_is_cut_off_instead_of_overflowing() {
    let mut input = r"a \to ".repeat(10_000);
    input.push('a');
    let (_, errors) = parse_expression(&input);
    assert!(errors
        .iter()
        .any(|e| matches!(e, ParseError::TooDeep(_))));
}

#[test]
fn flat_power_chain_is_cut_off_instead_of_overflowing() {
    let mut input = "2^".repeat(10_000);
    input.push('2');
    let (_, errors) = parse_expression(&input);
    assert!(errors
        .iter()
        .any(|e| matches!(e, ParseError::TooDeep(_))));
}

#[test]
fn structured_subscripts_are_kept_as_applications() {
    assert_snapshot!(parse_clean("f(x)_2"), @"f(x)(2)");
    assert_snapshot!(parse_clean("a_{i+1}"), @"a((i + 1))");
}

#[test]
fn error_spans_point_at_the_offending_bytes() {
    let (_, errors) = parse_expression("a + b )");
    let span = errors[0].span();
    assert_eq!(&"a + b )"[span.start..span.end], ")");
}
