use crate::ast::{Axiom, ProjKind, Term, Universe, UnaryOp};
use crate::diagnostics::{Diagnostic, HoleInfo, Severity, TypeCheckResult};
use crate::module::{AxiomBundle, Declaration, Module, Tactic};
use crate::subst::{substitute, NameSupply};
use std::collections::{BTreeMap, BTreeSet};
use std::rc::Rc;

/// Reduction fuel for weak-head normalization. Exhausting it leaves
/// the term as-is rather than overflowing the stack; the relation
/// stays total.
pub const NORMALIZE_FUEL: u32 = 4096;

// =============================================================================
// Typing context
// =============================================================================

/// Maps names to their types and carries the active axiom bundle.
/// Extension produces a *new* context value; a context held by an
/// outer binder is never mutated, which is what makes nested binder
/// scoping correct.
#[derive(Debug, Clone)]
pub struct Context {
    bindings: Vec<(String, Rc<Term>)>,
    bundle: AxiomBundle,
}

impl Context {
    pub fn new(bundle: AxiomBundle) -> Self {
        Context {
            bindings: Vec::new(),
            bundle,
        }
    }

    /// A context pre-loaded with the standard mathematical vocabulary
    /// the parser emits: the numeric domains, common predicates, and
    /// the operator-shaped constants (`gcd`, `sqrt`, `sum`, ...).
    pub fn standard(bundle: AxiomBundle) -> Self {
        let nat = Term::var("ℕ");
        let int = Term::var("ℤ");
        let real = Term::var("ℝ");
        let mut ctx = Context::new(bundle);

        for domain in ["ℕ", "ℤ", "ℝ", "ℂ", "Bool", "String"] {
            ctx.bind(domain, Term::type_at(0));
        }
        for pred in ["Prime", "Even", "Odd", "Composite"] {
            ctx.bind(pred, Term::pi("n", nat.clone(), Term::prop()));
        }
        ctx.bind(
            "divides",
            Term::pi("m", nat.clone(), Term::pi("n", nat.clone(), Term::prop())),
        );
        for f in ["gcd", "lcm", "binom"] {
            ctx.bind(
                f,
                Term::pi("m", nat.clone(), Term::pi("n", nat.clone(), nat.clone())),
            );
        }
        ctx.bind("abs", Term::pi("z", int.clone(), nat.clone()));
        ctx.bind("sqrt", Term::pi("x", real.clone(), real.clone()));
        for agg in ["sum", "prod"] {
            ctx.bind(
                agg,
                Term::pi("f", Term::pi("n", nat.clone(), real.clone()), real.clone()),
            );
        }
        for agg in ["integral", "lim"] {
            ctx.bind(
                agg,
                Term::pi("f", Term::pi("x", real.clone(), real.clone()), real.clone()),
            );
        }
        ctx.bind("∞", real.clone());
        ctx
    }

    fn bind(&mut self, name: impl Into<String>, ty: Rc<Term>) {
        self.bindings.push((name.into(), ty));
    }

    /// Bind a new name, producing a fresh context. Later bindings
    /// shadow earlier ones.
    pub fn extend(&self, name: impl Into<String>, ty: Rc<Term>) -> Self {
        let mut next = self.clone();
        next.bindings.push((name.into(), ty));
        next
    }

    /// Swap the active bundle, keeping the bindings. Used for
    /// per-theorem bundle overrides.
    pub fn with_bundle(&self, bundle: AxiomBundle) -> Self {
        Context {
            bindings: self.bindings.clone(),
            bundle,
        }
    }

    pub fn lookup(&self, name: &str) -> Option<&Rc<Term>> {
        self.bindings
            .iter()
            .rev()
            .find(|(n, _)| n == name)
            .map(|(_, ty)| ty)
    }

    /// The most recently bound name, used by hole suggestions.
    pub fn last_bound(&self) -> Option<&str> {
        self.bindings.last().map(|(n, _)| n.as_str())
    }

    pub fn snapshot(&self) -> Vec<(String, Rc<Term>)> {
        self.bindings.clone()
    }

    pub fn bundle(&self) -> &AxiomBundle {
        &self.bundle
    }
}

// =============================================================================
// Weak-head normalization
// =============================================================================

/// Reduce a term at its head position only: beta for an applied
/// lambda, substitution for a let, projection out of a literal pair.
/// No reduction under binders, no recursion into non-head subterms.
pub fn normalize(term: &Rc<Term>) -> Rc<Term> {
    let mut supply = NameSupply::new();
    let mut fuel = NORMALIZE_FUEL;
    whnf(term, &mut supply, &mut fuel)
}

fn whnf(term: &Rc<Term>, supply: &mut NameSupply, fuel: &mut u32) -> Rc<Term> {
    if *fuel == 0 {
        return term.clone();
    }
    *fuel -= 1;
    match &**term {
        Term::App(f, a) => {
            let f_norm = whnf(f, supply, fuel);
            if let Term::Lam(name, _, body) = &*f_norm {
                let reduced = substitute(body, name, a, supply);
                whnf(&reduced, supply, fuel)
            } else if Rc::ptr_eq(&f_norm, f) {
                term.clone()
            } else {
                Term::app(f_norm, a.clone())
            }
        }
        Term::LetIn(name, value, body) => {
            let reduced = substitute(body, name, value, supply);
            whnf(&reduced, supply, fuel)
        }
        Term::Proj(kind, pair) => {
            let pair_norm = whnf(pair, supply, fuel);
            if let Term::Pair(first, second) = &*pair_norm {
                let component = match kind {
                    ProjKind::First => first,
                    ProjKind::Second => second,
                };
                whnf(component, supply, fuel)
            } else if Rc::ptr_eq(&pair_norm, pair) {
                term.clone()
            } else {
                Term::proj(*kind, pair_norm)
            }
        }
        _ => term.clone(),
    }
}

// =============================================================================
// Alpha-aware structural equality
// =============================================================================

/// Structural equality up to alpha-renaming of binders. When a context
/// is supplied, both sides are first reduced to weak-head form.
pub fn terms_equal(a: &Rc<Term>, b: &Rc<Term>, ctx: Option<&Context>) -> bool {
    let (a, b) = if ctx.is_some() {
        (normalize(a), normalize(b))
    } else {
        (a.clone(), b.clone())
    };

    match (&*a, &*b) {
        (Term::Var(n1), Term::Var(n2)) => n1 == n2,
        (Term::Sort(u1), Term::Sort(u2)) => u1 == u2,
        (Term::Lam(n1, t1, b1), Term::Lam(n2, t2, b2))
        | (Term::Pi(n1, t1, b1), Term::Pi(n2, t2, b2))
        | (Term::Sigma(n1, t1, b1), Term::Sigma(n2, t2, b2))
        | (Term::ForAll(n1, t1, b1), Term::ForAll(n2, t2, b2))
        | (Term::Exists(n1, t1, b1), Term::Exists(n2, t2, b2)) => {
            terms_equal(t1, t2, ctx) && binder_bodies_equal(n1, b1, n2, b2, ctx)
        }
        (Term::App(f1, a1), Term::App(f2, a2)) | (Term::Pair(f1, a1), Term::Pair(f2, a2)) => {
            terms_equal(f1, f2, ctx) && terms_equal(a1, a2, ctx)
        }
        (Term::Proj(k1, t1), Term::Proj(k2, t2)) => k1 == k2 && terms_equal(t1, t2, ctx),
        (Term::LetIn(n1, v1, b1), Term::LetIn(n2, v2, b2)) => {
            terms_equal(v1, v2, ctx) && binder_bodies_equal(n1, b1, n2, b2, ctx)
        }
        (Term::Hole(id1, note1), Term::Hole(id2, note2)) => id1 == id2 && note1 == note2,
        (Term::AxiomRef(a1), Term::AxiomRef(a2)) => a1 == a2,
        (Term::Literal(k1, v1), Term::Literal(k2, v2)) => k1 == k2 && v1 == v2,
        (Term::BinOp(op1, l1, r1), Term::BinOp(op2, l2, r2)) => {
            op1 == op2 && terms_equal(l1, l2, ctx) && terms_equal(r1, r2, ctx)
        }
        (Term::UnaryOp(op1, t1), Term::UnaryOp(op2, t2)) => op1 == op2 && terms_equal(t1, t2, ctx),
        (Term::Equiv(l1, r1, m1), Term::Equiv(l2, r2, m2)) => {
            terms_equal(l1, l2, ctx)
                && terms_equal(r1, r2, ctx)
                && match (m1, m2) {
                    (Some(m1), Some(m2)) => terms_equal(m1, m2, ctx),
                    (None, None) => true,
                    _ => false,
                }
        }
        (Term::Ind(n1, t1, c1), Term::Ind(n2, t2, c2)) => {
            n1 == n2
                && terms_equal(t1, t2, ctx)
                && c1.len() == c2.len()
                && c1
                    .iter()
                    .zip(c2.iter())
                    .all(|(x, y)| x.name == y.name && terms_equal(&x.ty, &y.ty, ctx))
        }
        (Term::Match(s1, c1), Term::Match(s2, c2)) => {
            terms_equal(s1, s2, ctx)
                && c1.len() == c2.len()
                && c1.iter().zip(c2.iter()).all(|(x, y)| {
                    x.ctor == y.ctor
                        && x.binders == y.binders
                        && terms_equal(&x.body, &y.body, ctx)
                })
        }
        _ => false,
    }
}

/// Alpha step: compare bodies after substituting the right binder's
/// name with a reference to the left binder's name in the right body.
fn binder_bodies_equal(
    left_name: &str,
    left_body: &Rc<Term>,
    right_name: &str,
    right_body: &Rc<Term>,
    ctx: Option<&Context>,
) -> bool {
    if left_name == right_name {
        return terms_equal(left_body, right_body, ctx);
    }
    let mut supply = NameSupply::new();
    let renamed = substitute(right_body, right_name, &Term::var(left_name), &mut supply);
    terms_equal(left_body, &renamed, ctx)
}

// =============================================================================
// Type inference (synthesis)
// =============================================================================

/// Position of a type name in the numeric widening hierarchy
/// ℕ ⊂ ℤ ⊂ ℝ ⊂ ℂ.
fn numeric_rank(ty: &Term) -> Option<usize> {
    match ty {
        Term::Var(name) => match name.as_str() {
            "ℕ" => Some(0),
            "ℤ" => Some(1),
            "ℝ" => Some(2),
            "ℂ" => Some(3),
            _ => None,
        },
        _ => None,
    }
}

const NUMERIC_NAMES: [&str; 4] = ["ℕ", "ℤ", "ℝ", "ℂ"];

const HOLE_FALLBACK_SUGGESTIONS: [&str; 3] = [
    "introduce the hypotheses and restate the goal",
    "apply a lemma from the surrounding context",
    "proceed by induction on the main variable",
];

/// Synthesis-style type inference. Always computes a type bottom-up;
/// declared types are compared post hoc as soft checks, never as hard
/// failures. Collects diagnostics, typed holes, and axiom usage as it
/// goes.
#[derive(Default)]
pub struct Checker {
    diagnostics: Vec<Diagnostic>,
    holes: Vec<HoleInfo>,
    axioms_used: BTreeSet<Axiom>,
    supply: NameSupply,
}

impl Checker {
    pub fn new() -> Self {
        Checker::default()
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn holes(&self) -> &[HoleInfo] {
        &self.holes
    }

    pub fn axioms_used(&self) -> &BTreeSet<Axiom> {
        &self.axioms_used
    }

    fn report(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// Infer the type of `term` under `ctx`, or `None` when no type
    /// can be synthesized. Never panics and never aborts early on
    /// advisory problems: warnings, hints, and hole records are
    /// accumulated as side effects.
    pub fn infer(&mut self, ctx: &Context, term: &Rc<Term>) -> Option<Rc<Term>> {
        match &**term {
            Term::Var(name) => match ctx.lookup(name) {
                Some(ty) => Some(ty.clone()),
                None => {
                    self.report(
                        Diagnostic::error(format!("unbound variable: {}", name))
                            .with_term(term.clone()),
                    );
                    None
                }
            },
            Term::Literal(kind, _) => Some(match kind {
                crate::ast::LiteralKind::Nat => Term::var("ℕ"),
                crate::ast::LiteralKind::Int => Term::var("ℤ"),
                crate::ast::LiteralKind::Bool => Term::var("Bool"),
                crate::ast::LiteralKind::String => Term::var("String"),
            }),
            Term::Sort(u) => Some(match u {
                Universe::Prop => Term::type_at(1),
                Universe::Type(n) => Term::type_at(n + 1),
            }),
            Term::Lam(name, ty, body) => {
                self.infer(ctx, ty);
                let inner = ctx.extend(name.clone(), ty.clone());
                let body_ty = self.infer(&inner, body)?;
                Some(Term::pi(name.clone(), ty.clone(), body_ty))
            }
            Term::App(f, a) => {
                let f_ty = self.infer(ctx, f)?;
                let f_ty = normalize(&f_ty);
                if let Term::Pi(param, param_ty, body_ty) = &*f_ty {
                    if let Some(arg_ty) = self.infer(ctx, a) {
                        if !terms_equal(&arg_ty, param_ty, Some(ctx)) {
                            // Deliberate typing laxity: informal math
                            // is frequently type-ambiguous, so a
                            // mismatched argument is only a hint.
                            self.report(
                                Diagnostic::hint(format!(
                                    "argument type {} does not match parameter type {}",
                                    arg_ty, param_ty
                                ))
                                .with_term(a.clone()),
                            );
                        }
                    }
                    Some(substitute(body_ty, param, a, &mut self.supply))
                } else {
                    // Not resolvable to a function type: still infer
                    // the argument for its diagnostics.
                    self.infer(ctx, a);
                    Some(Term::type_at(0))
                }
            }
            Term::Pi(name, ty, body) | Term::Sigma(name, ty, body) => {
                let param_sort = self.infer(ctx, ty);
                let inner = ctx.extend(name.clone(), ty.clone());
                let body_sort = self.infer(&inner, body);
                let u1 = sort_of(param_sort).unwrap_or(Universe::Type(0));
                let u2 = sort_of(body_sort).unwrap_or(Universe::Type(0));
                if u2 == Universe::Prop {
                    // Impredicativity: a Pi into Prop lives in Prop.
                    Some(Term::prop())
                } else {
                    Some(Term::type_at(u1.level().max(u2.level())))
                }
            }
            Term::ForAll(name, domain, body) | Term::Exists(name, domain, body) => {
                self.infer(ctx, domain);
                let inner = ctx.extend(name.clone(), domain.clone());
                self.infer(&inner, body);
                Some(Term::prop())
            }
            Term::BinOp(op, lhs, rhs) => {
                let lhs_ty = self.infer(ctx, lhs);
                let rhs_ty = self.infer(ctx, rhs);
                if op.is_prop_valued() {
                    return Some(Term::prop());
                }
                let lr = lhs_ty.as_deref().and_then(numeric_rank);
                let rr = rhs_ty.as_deref().and_then(numeric_rank);
                match (lr, rr) {
                    (Some(l), Some(r)) => Some(Term::var(NUMERIC_NAMES[l.max(r)])),
                    _ => Some(Term::var("ℕ")),
                }
            }
            Term::UnaryOp(UnaryOp::Not, operand) => {
                self.infer(ctx, operand);
                Some(Term::prop())
            }
            Term::UnaryOp(UnaryOp::Neg, operand) => {
                let operand_ty = self.infer(ctx, operand)?;
                // Negation takes ℕ out of the naturals.
                if matches!(&*operand_ty, Term::Var(n) if n == "ℕ") {
                    Some(Term::var("ℤ"))
                } else {
                    Some(operand_ty)
                }
            }
            Term::Equiv(lhs, rhs, modulus) => {
                self.infer(ctx, lhs);
                self.infer(ctx, rhs);
                if let Some(m) = modulus {
                    self.infer(ctx, m);
                }
                Some(Term::prop())
            }
            Term::Hole(id, _) => {
                let mut suggestions = Vec::new();
                if let Some(last) = ctx.last_bound() {
                    suggestions.push(format!("consider the most recently bound variable `{}`", last));
                }
                suggestions.extend(HOLE_FALLBACK_SUGGESTIONS.iter().map(|s| s.to_string()));
                self.holes.push(HoleInfo {
                    id: id.clone(),
                    expected_type: None,
                    context: ctx.snapshot(),
                    suggestions,
                });
                None
            }
            Term::AxiomRef(axiom) => {
                self.axioms_used.insert(*axiom);
                if !ctx.bundle().contains(*axiom) {
                    self.report(
                        Diagnostic::warning(format!(
                            "axiom {} is not declared in bundle {}",
                            axiom,
                            ctx.bundle()
                        ))
                        .with_term(term.clone()),
                    );
                }
                Some(Term::prop())
            }
            Term::Pair(first, second) => {
                let first_ty = self.infer(ctx, first)?;
                let second_ty = self.infer(ctx, second)?;
                Some(Term::sigma("_", first_ty, second_ty))
            }
            Term::Proj(kind, pair) => {
                let pair_ty = self.infer(ctx, pair)?;
                let pair_ty = normalize(&pair_ty);
                if let Term::Sigma(name, first_ty, second_ty) = &*pair_ty {
                    match kind {
                        ProjKind::First => Some(first_ty.clone()),
                        ProjKind::Second => Some(substitute(
                            second_ty,
                            name,
                            &Term::proj(ProjKind::First, pair.clone()),
                            &mut self.supply,
                        )),
                    }
                } else {
                    self.report(
                        Diagnostic::warning(format!(
                            "projection applied to non-pair type {}",
                            pair_ty
                        ))
                        .with_term(term.clone()),
                    );
                    None
                }
            }
            Term::LetIn(name, value, body) => {
                let value_ty = self.infer(ctx, value)?;
                let inner = ctx.extend(name.clone(), value_ty);
                self.infer(&inner, body)
            }
            Term::Ind(_, _, _) => Some(Term::type_at(1)),
            Term::Match(scrutinee, cases) => {
                self.infer(ctx, scrutinee);
                if cases.is_empty() {
                    self.report(
                        Diagnostic::error("match expression with no cases").with_term(term.clone()),
                    );
                    return None;
                }
                // Pattern binder types are unknown without an
                // inductive signature lookup; every case body is still
                // inferred for its diagnostics, and the first case's
                // type is the result.
                let mut first_ty = None;
                for (idx, case) in cases.iter().enumerate() {
                    let mut inner = ctx.clone();
                    for binder in &case.binders {
                        inner = inner.extend(binder.clone(), Term::type_at(0));
                    }
                    let case_ty = self.infer(&inner, &case.body);
                    if idx == 0 {
                        first_ty = case_ty;
                    }
                }
                first_ty
            }
        }
    }

    /// Check one top-level declaration, returning its inferred type
    /// when one exists.
    pub fn check_declaration(
        &mut self,
        ctx: &Context,
        module_bundle: &AxiomBundle,
        decl: &Declaration,
    ) -> Option<Rc<Term>> {
        match decl {
            Declaration::Definition {
                name,
                params,
                return_type,
                body,
            } => {
                let mut inner = ctx.clone();
                for param in params {
                    inner = inner.extend(param.name.clone(), param.ty.clone());
                }
                let body_ty = match self.infer(&inner, body) {
                    Some(ty) => ty,
                    None => {
                        self.report(Diagnostic::error(format!(
                            "could not infer a type for definition `{}`",
                            name
                        )));
                        return None;
                    }
                };
                if let Some(declared) = return_type {
                    if !terms_equal(&body_ty, declared, Some(ctx)) {
                        self.report(Diagnostic::warning(format!(
                            "definition `{}`: body type {} does not match declared return type {}",
                            name, body_ty, declared
                        )));
                    }
                }
                self.report(Diagnostic::info(format!("definition `{}` checked", name)));
                let full_ty = params.iter().rev().fold(body_ty, |acc, param| {
                    Term::pi(param.name.clone(), param.ty.clone(), acc)
                });
                Some(full_ty)
            }
            Declaration::Theorem {
                name,
                statement,
                tactics,
                bundle,
            }
            | Declaration::Lemma {
                name,
                statement,
                tactics,
                bundle,
            } => {
                let used_before = self.axioms_used.clone();
                let statement_ty = match self.infer(ctx, statement) {
                    Some(ty) => ty,
                    None => {
                        self.report(Diagnostic::error(format!(
                            "could not infer a type for the statement of `{}`",
                            name
                        )));
                        return None;
                    }
                };
                let head = normalize(&statement_ty);
                if !matches!(&*head, Term::Sort(_)) {
                    self.report(
                        Diagnostic::warning(format!(
                            "statement of `{}` does not resolve to a proposition (got {})",
                            name, statement_ty
                        ))
                        .with_term(statement.clone()),
                    );
                }
                if tactics.iter().any(Tactic::is_placeholder) {
                    self.report(Diagnostic::warning(format!(
                        "proof of `{}` contains unresolved proof obligations",
                        name
                    )));
                }
                let declared_bundle = bundle.as_ref().unwrap_or(module_bundle);
                let newly_used: Vec<Axiom> = self
                    .axioms_used
                    .difference(&used_before)
                    .copied()
                    .collect();
                for axiom in newly_used {
                    if !declared_bundle.contains(axiom) {
                        self.report(Diagnostic::warning(format!(
                            "`{}` uses axiom {} outside its declared bundle {}",
                            name, axiom, declared_bundle
                        )));
                    }
                }
                Some(statement_ty)
            }
        }
    }

    /// Check a whole module against its bundle, consuming the checker.
    pub fn check_module(module: &Module) -> TypeCheckResult {
        let mut checker = Checker::new();
        let ctx = Context::standard(module.bundle.clone());
        let mut inferred_types = BTreeMap::new();

        for decl in &module.declarations {
            let decl_ctx = match decl {
                Declaration::Theorem { bundle: Some(b), .. }
                | Declaration::Lemma { bundle: Some(b), .. } => ctx.with_bundle(b.clone()),
                _ => ctx.clone(),
            };
            if let Some(ty) = checker.check_declaration(&decl_ctx, &module.bundle, decl) {
                inferred_types.insert(decl.name().to_string(), ty);
            }
        }

        let valid = !checker
            .diagnostics
            .iter()
            .any(|d| d.severity == Severity::Error);
        TypeCheckResult {
            valid,
            diagnostics: checker.diagnostics,
            inferred_types,
            holes: checker.holes,
            axioms_used: checker.axioms_used,
        }
    }
}

fn sort_of(ty: Option<Rc<Term>>) -> Option<Universe> {
    let ty = ty?;
    match &*normalize(&ty) {
        Term::Sort(u) => Some(*u),
        _ => None,
    }
}
