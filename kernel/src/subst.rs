use crate::ast::{MatchCase, Term};
use std::collections::HashSet;
use std::rc::Rc;

/// Deterministic fresh-name generation for binder renaming. The
/// counter is an explicit value threaded by `&mut` through the
/// substitution call chain; independent invocations each own their
/// supply, so substitution stays callable from any thread.
#[derive(Debug, Default)]
pub struct NameSupply {
    counter: u64,
}

impl NameSupply {
    pub fn new() -> Self {
        NameSupply { counter: 0 }
    }

    /// Produce a name based on `base` that collides with nothing in
    /// `avoid`: first the primed name, then primed names with an
    /// increasing numeric suffix.
    pub fn fresh(&mut self, base: &str, avoid: &HashSet<String>) -> String {
        let primed = format!("{}'", base);
        if !avoid.contains(&primed) {
            return primed;
        }
        loop {
            self.counter += 1;
            let candidate = format!("{}'{}", base, self.counter);
            if !avoid.contains(&candidate) {
                return candidate;
            }
        }
    }
}

/// Compute the set of free variable names in a term. Each binder case
/// removes its own bound name from its body's contribution; the
/// binder's type or domain is in the enclosing scope and contributes
/// unfiltered. The walk is iterative, so term depth never translates
/// into call-stack depth.
pub fn free_vars(term: &Term) -> HashSet<String> {
    enum Walk<'a> {
        Visit(&'a Term),
        Bind(&'a str),
        Unbind,
    }

    let mut out = HashSet::new();
    let mut bound: Vec<&str> = Vec::new();
    let mut stack = vec![Walk::Visit(term)];

    while let Some(step) = stack.pop() {
        let term = match step {
            Walk::Visit(term) => term,
            Walk::Bind(name) => {
                bound.push(name);
                continue;
            }
            Walk::Unbind => {
                bound.pop();
                continue;
            }
        };
        match term {
            Term::Var(name) => {
                if !bound.iter().any(|b| *b == name) {
                    out.insert(name.clone());
                }
            }
            Term::Lam(name, ty, body)
            | Term::Pi(name, ty, body)
            | Term::Sigma(name, ty, body)
            | Term::ForAll(name, ty, body)
            | Term::Exists(name, ty, body)
            | Term::LetIn(name, ty, body) => {
                // Pushed in reverse: the type/domain/value is walked
                // in the outer scope, then the body under the binder.
                stack.push(Walk::Unbind);
                stack.push(Walk::Visit(body));
                stack.push(Walk::Bind(name));
                stack.push(Walk::Visit(ty));
            }
            Term::App(f, a) | Term::Pair(f, a) | Term::BinOp(_, f, a) => {
                stack.push(Walk::Visit(a));
                stack.push(Walk::Visit(f));
            }
            Term::Proj(_, t) | Term::UnaryOp(_, t) => stack.push(Walk::Visit(t)),
            Term::Equiv(l, r, modulus) => {
                if let Some(m) = modulus {
                    stack.push(Walk::Visit(m));
                }
                stack.push(Walk::Visit(r));
                stack.push(Walk::Visit(l));
            }
            Term::Ind(_, ty, ctors) => {
                for ctor in ctors.iter().rev() {
                    stack.push(Walk::Visit(&ctor.ty));
                }
                stack.push(Walk::Visit(ty));
            }
            Term::Match(scrutinee, cases) => {
                for case in cases.iter().rev() {
                    for _ in &case.binders {
                        stack.push(Walk::Unbind);
                    }
                    stack.push(Walk::Visit(&case.body));
                    for binder in &case.binders {
                        stack.push(Walk::Bind(binder));
                    }
                }
                stack.push(Walk::Visit(scrutinee));
            }
            Term::Sort(_) | Term::Hole(_, _) | Term::AxiomRef(_) | Term::Literal(_, _) => {}
        }
    }
    out
}

/// Structural recursion bound for substitution. Subterms deeper than
/// this come back unchanged, so the routine stays total on
/// adversarially deep terms instead of overflowing the call stack.
pub const SUBST_DEPTH: u32 = 2048;

/// Replace every free occurrence of `name` in `term` with
/// `replacement`, renaming binders as needed so no free variable of
/// `replacement` is captured.
///
/// A binder whose bound name equals `name` shadows it: the body is
/// left untouched, but the binder's type/domain is still substituted
/// into, since it is evaluated in the outer scope. A binder whose
/// bound name occurs free in `replacement` is renamed first.
///
/// Recursion is bounded by [`SUBST_DEPTH`]; anything below the cutoff
/// is returned as-is.
pub fn substitute(
    term: &Rc<Term>,
    name: &str,
    replacement: &Rc<Term>,
    supply: &mut NameSupply,
) -> Rc<Term> {
    subst_at(term, name, replacement, supply, SUBST_DEPTH)
}

fn subst_at(
    term: &Rc<Term>,
    name: &str,
    replacement: &Rc<Term>,
    supply: &mut NameSupply,
    depth: u32,
) -> Rc<Term> {
    let depth = match depth.checked_sub(1) {
        Some(d) => d,
        None => return term.clone(),
    };
    match &**term {
        Term::Var(n) => {
            if n == name {
                replacement.clone()
            } else {
                term.clone()
            }
        }
        Term::Lam(bound, ty, body) => {
            let (bound, ty, body) = subst_binder(bound, ty, body, name, replacement, supply, depth);
            Term::lam(bound, ty, body)
        }
        Term::Pi(bound, ty, body) => {
            let (bound, ty, body) = subst_binder(bound, ty, body, name, replacement, supply, depth);
            Term::pi(bound, ty, body)
        }
        Term::Sigma(bound, ty, body) => {
            let (bound, ty, body) = subst_binder(bound, ty, body, name, replacement, supply, depth);
            Term::sigma(bound, ty, body)
        }
        Term::ForAll(bound, domain, body) => {
            let (bound, domain, body) =
                subst_binder(bound, domain, body, name, replacement, supply, depth);
            Term::forall(bound, domain, body)
        }
        Term::Exists(bound, domain, body) => {
            let (bound, domain, body) =
                subst_binder(bound, domain, body, name, replacement, supply, depth);
            Term::exists(bound, domain, body)
        }
        Term::LetIn(bound, value, body) => {
            let (bound, value, body) =
                subst_binder(bound, value, body, name, replacement, supply, depth);
            Term::let_in(bound, value, body)
        }
        Term::App(f, a) => Term::app(
            subst_at(f, name, replacement, supply, depth),
            subst_at(a, name, replacement, supply, depth),
        ),
        Term::Pair(a, b) => Term::pair(
            subst_at(a, name, replacement, supply, depth),
            subst_at(b, name, replacement, supply, depth),
        ),
        Term::Proj(kind, t) => Term::proj(*kind, subst_at(t, name, replacement, supply, depth)),
        Term::BinOp(op, l, r) => Term::binop(
            *op,
            subst_at(l, name, replacement, supply, depth),
            subst_at(r, name, replacement, supply, depth),
        ),
        Term::UnaryOp(op, t) => Term::unary(*op, subst_at(t, name, replacement, supply, depth)),
        Term::Equiv(l, r, modulus) => Term::equiv(
            subst_at(l, name, replacement, supply, depth),
            subst_at(r, name, replacement, supply, depth),
            modulus
                .as_ref()
                .map(|m| subst_at(m, name, replacement, supply, depth)),
        ),
        Term::Ind(ind_name, ty, ctors) => {
            let ctors = ctors
                .iter()
                .map(|ctor| crate::ast::Constructor {
                    name: ctor.name.clone(),
                    ty: subst_at(&ctor.ty, name, replacement, supply, depth),
                })
                .collect();
            Rc::new(Term::Ind(
                ind_name.clone(),
                subst_at(ty, name, replacement, supply, depth),
                ctors,
            ))
        }
        Term::Match(scrutinee, cases) => {
            let scrutinee = subst_at(scrutinee, name, replacement, supply, depth);
            let cases = cases
                .iter()
                .map(|case| subst_case(case, name, replacement, supply, depth))
                .collect();
            Rc::new(Term::Match(scrutinee, cases))
        }
        Term::Sort(_) | Term::Hole(_, _) | Term::AxiomRef(_) | Term::Literal(_, _) => term.clone(),
    }
}

/// Shared binder logic for `Lam`/`Pi`/`Sigma`/`ForAll`/`Exists` and
/// `LetIn` (where the "type" slot is the bound value). Returns the
/// possibly-renamed bound name and the substituted type and body.
fn subst_binder(
    bound: &str,
    ty: &Rc<Term>,
    body: &Rc<Term>,
    name: &str,
    replacement: &Rc<Term>,
    supply: &mut NameSupply,
    depth: u32,
) -> (String, Rc<Term>, Rc<Term>) {
    // The type/domain lives in the outer scope: always substituted.
    let new_ty = subst_at(ty, name, replacement, supply, depth);

    if bound == name {
        // Shadowed: the body's occurrences refer to the binder.
        return (bound.to_string(), new_ty, body.clone());
    }

    let replacement_fvs = free_vars(replacement);
    if replacement_fvs.contains(bound) {
        // Rename the binder so the replacement's free variables are
        // not captured.
        let mut avoid = replacement_fvs;
        avoid.extend(free_vars(body));
        avoid.insert(name.to_string());
        let fresh = supply.fresh(bound, &avoid);
        let renamed = subst_at(body, bound, &Term::var(fresh.clone()), supply, depth);
        let new_body = subst_at(&renamed, name, replacement, supply, depth);
        (fresh, new_ty, new_body)
    } else {
        let new_body = subst_at(body, name, replacement, supply, depth);
        (bound.to_string(), new_ty, new_body)
    }
}

fn subst_case(
    case: &MatchCase,
    name: &str,
    replacement: &Rc<Term>,
    supply: &mut NameSupply,
    depth: u32,
) -> MatchCase {
    if case.binders.iter().any(|b| b == name) {
        // One of the pattern binders shadows the substituted name.
        return case.clone();
    }
    let replacement_fvs = free_vars(replacement);
    if case.binders.iter().any(|b| replacement_fvs.contains(b)) {
        let mut avoid = replacement_fvs;
        avoid.extend(free_vars(&case.body));
        avoid.insert(name.to_string());
        let mut binders = Vec::with_capacity(case.binders.len());
        let mut body = case.body.clone();
        for binder in &case.binders {
            if avoid.contains(binder) {
                let fresh = supply.fresh(binder, &avoid);
                body = subst_at(&body, binder, &Term::var(fresh.clone()), supply, depth);
                avoid.insert(fresh.clone());
                binders.push(fresh);
            } else {
                binders.push(binder.clone());
            }
        }
        MatchCase {
            ctor: case.ctor.clone(),
            binders,
            body: subst_at(&body, name, replacement, supply, depth),
        }
    } else {
        MatchCase {
            ctor: case.ctor.clone(),
            binders: case.binders.clone(),
            body: subst_at(&case.body, name, replacement, supply, depth),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_appends_prime_then_numeric_suffix() {
        let mut supply = NameSupply::new();
        let mut avoid = HashSet::new();
        assert_eq!(supply.fresh("x", &avoid), "x'");
        avoid.insert("x'".to_string());
        assert_eq!(supply.fresh("x", &avoid), "x'1");
    }

    #[test]
    fn free_vars_ignores_bound_names() {
        // λx : T. x(y) has free vars {T, y}
        let term = Term::lam(
            "x",
            Term::var("T"),
            Term::app(Term::var("x"), Term::var("y")),
        );
        let fvs = free_vars(&term);
        assert!(fvs.contains("T"));
        assert!(fvs.contains("y"));
        assert!(!fvs.contains("x"));
    }
}
