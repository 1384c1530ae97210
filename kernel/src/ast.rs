use serde::{Deserialize, Serialize};
use std::fmt;
use std::rc::Rc;

// =============================================================================
// Universes
// =============================================================================

/// Sorts of the calculus. `Prop` is the impredicative universe of
/// propositions; `Type(n)` is the predicative hierarchy with
/// `Type(0) : Type(1)` by convention. Levels are tracked but never
/// validated against paradox-avoidance rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Universe {
    Prop,
    Type(u32),
}

impl Universe {
    /// Level used when taking maxima across sorts; `Prop` counts as 0.
    pub fn level(self) -> u32 {
        match self {
            Universe::Prop => 0,
            Universe::Type(n) => n,
        }
    }
}

impl fmt::Display for Universe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Universe::Prop => write!(f, "Prop"),
            Universe::Type(n) => write!(f, "Type {}", n),
        }
    }
}

// =============================================================================
// Axioms
// =============================================================================

/// The closed set of non-constructive principles a proof may rely on.
/// Usage is tracked per declaration and cross-checked against the
/// active `AxiomBundle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Axiom {
    Lem,
    Choice,
    Univalence,
    Funext,
    Propext,
    Quotient,
    ClassicalLogic,
}

impl Axiom {
    pub fn name(self) -> &'static str {
        match self {
            Axiom::Lem => "LEM",
            Axiom::Choice => "Choice",
            Axiom::Univalence => "Univalence",
            Axiom::Funext => "Funext",
            Axiom::Propext => "Propext",
            Axiom::Quotient => "Quotient",
            Axiom::ClassicalLogic => "ClassicalLogic",
        }
    }

    pub const ALL: [Axiom; 7] = [
        Axiom::Lem,
        Axiom::Choice,
        Axiom::Univalence,
        Axiom::Funext,
        Axiom::Propext,
        Axiom::Quotient,
        Axiom::ClassicalLogic,
    ];
}

impl fmt::Display for Axiom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

// =============================================================================
// Operators and literals
// =============================================================================

/// Literal payload kinds. The textual value is kept verbatim; see the
/// parser's decimal-literal note for why `Int` may carry a decimal
/// value string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LiteralKind {
    Nat,
    Int,
    Bool,
    String,
}

/// Binary operators. The relational/logical subset always types as
/// `Prop`; the arithmetic subset widens across the numeric hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Pow,
    Eq,
    Lt,
    Gt,
    Le,
    Ge,
    And,
    Or,
    Implies,
    Iff,
    In,
    NotIn,
    Subset,
}

impl BinOp {
    /// Operators whose result is always a proposition.
    pub fn is_prop_valued(self) -> bool {
        matches!(
            self,
            BinOp::Eq
                | BinOp::Lt
                | BinOp::Gt
                | BinOp::Le
                | BinOp::Ge
                | BinOp::And
                | BinOp::Or
                | BinOp::Implies
                | BinOp::Iff
                | BinOp::In
                | BinOp::NotIn
                | BinOp::Subset
        )
    }

    pub fn symbol(self) -> &'static str {
        match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Mod => "mod",
            BinOp::Pow => "^",
            BinOp::Eq => "=",
            BinOp::Lt => "<",
            BinOp::Gt => ">",
            BinOp::Le => "≤",
            BinOp::Ge => "≥",
            BinOp::And => "∧",
            BinOp::Or => "∨",
            BinOp::Implies => "→",
            BinOp::Iff => "↔",
            BinOp::In => "∈",
            BinOp::NotIn => "∉",
            BinOp::Subset => "⊆",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnaryOp {
    Neg,
    Not,
}

impl UnaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            UnaryOp::Neg => "-",
            UnaryOp::Not => "¬",
        }
    }
}

/// Which component a projection extracts from a pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProjKind {
    First,
    Second,
}

// =============================================================================
// Terms
// =============================================================================

/// A single constructor of an inductive type declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Constructor {
    pub name: String,
    pub ty: Rc<Term>,
}

/// One arm of a pattern match: constructor tag, bound names, body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchCase {
    pub ctor: String,
    pub binders: Vec<String>,
    pub body: Rc<Term>,
}

/// The closed vocabulary of the λΠω-style IR. Every binder case owns
/// exactly one bound name whose scope is the body only; the type or
/// domain subterm of a binder lives in the enclosing scope. Terms are
/// immutable values shared through `Rc`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Term {
    /// Free or bound variable reference, by name.
    Var(String),
    /// Lambda abstraction: bound name, parameter type, body.
    Lam(String, Rc<Term>, Rc<Term>),
    /// Application.
    App(Rc<Term>, Rc<Term>),
    /// Dependent function type: bound name, parameter type, body type.
    Pi(String, Rc<Term>, Rc<Term>),
    /// Dependent pair type: bound name, first type, second type.
    Sigma(String, Rc<Term>, Rc<Term>),
    /// Pair value.
    Pair(Rc<Term>, Rc<Term>),
    /// Projection out of a pair.
    Proj(ProjKind, Rc<Term>),
    /// Let binding: bound name, value, body.
    LetIn(String, Rc<Term>, Rc<Term>),
    /// A sort: `Prop` or `Type n`.
    Sort(Universe),
    /// Inductive type declaration: name, arity, constructors.
    Ind(String, Rc<Term>, Vec<Constructor>),
    /// Pattern match: scrutinee, cases.
    Match(Rc<Term>, Vec<MatchCase>),
    /// Typed hole: identifier, optional free-text annotation.
    Hole(String, Option<String>),
    /// Reference to a named axiom.
    AxiomRef(Axiom),
    /// Literal: kind and verbatim textual value.
    Literal(LiteralKind, String),
    /// Binary operation.
    BinOp(BinOp, Rc<Term>, Rc<Term>),
    /// Unary operation (negation or logical not).
    UnaryOp(UnaryOp, Rc<Term>),
    /// Modular equivalence: left, right, optional modulus.
    Equiv(Rc<Term>, Rc<Term>, Option<Rc<Term>>),
    /// Domain-restricted universal quantifier: name, domain, body.
    /// Distinct from `Pi`: this is logical quantification, not a
    /// function type.
    ForAll(String, Rc<Term>, Rc<Term>),
    /// Domain-restricted existential quantifier: name, domain, body.
    Exists(String, Rc<Term>, Rc<Term>),
}

// Helper constructors for convenience
impl Term {
    pub fn var(name: impl Into<String>) -> Rc<Self> {
        Rc::new(Term::Var(name.into()))
    }

    pub fn lam(name: impl Into<String>, ty: Rc<Term>, body: Rc<Term>) -> Rc<Self> {
        Rc::new(Term::Lam(name.into(), ty, body))
    }

    pub fn app(f: Rc<Term>, a: Rc<Term>) -> Rc<Self> {
        Rc::new(Term::App(f, a))
    }

    pub fn pi(name: impl Into<String>, ty: Rc<Term>, body: Rc<Term>) -> Rc<Self> {
        Rc::new(Term::Pi(name.into(), ty, body))
    }

    pub fn sigma(name: impl Into<String>, ty: Rc<Term>, body: Rc<Term>) -> Rc<Self> {
        Rc::new(Term::Sigma(name.into(), ty, body))
    }

    pub fn pair(a: Rc<Term>, b: Rc<Term>) -> Rc<Self> {
        Rc::new(Term::Pair(a, b))
    }

    pub fn proj(kind: ProjKind, t: Rc<Term>) -> Rc<Self> {
        Rc::new(Term::Proj(kind, t))
    }

    pub fn let_in(name: impl Into<String>, value: Rc<Term>, body: Rc<Term>) -> Rc<Self> {
        Rc::new(Term::LetIn(name.into(), value, body))
    }

    pub fn sort(u: Universe) -> Rc<Self> {
        Rc::new(Term::Sort(u))
    }

    pub fn prop() -> Rc<Self> {
        Rc::new(Term::Sort(Universe::Prop))
    }

    pub fn type_at(level: u32) -> Rc<Self> {
        Rc::new(Term::Sort(Universe::Type(level)))
    }

    pub fn hole(id: impl Into<String>, annotation: Option<String>) -> Rc<Self> {
        Rc::new(Term::Hole(id.into(), annotation))
    }

    pub fn axiom(axiom: Axiom) -> Rc<Self> {
        Rc::new(Term::AxiomRef(axiom))
    }

    pub fn nat_lit(value: impl Into<String>) -> Rc<Self> {
        Rc::new(Term::Literal(LiteralKind::Nat, value.into()))
    }

    pub fn int_lit(value: impl Into<String>) -> Rc<Self> {
        Rc::new(Term::Literal(LiteralKind::Int, value.into()))
    }

    pub fn bool_lit(value: bool) -> Rc<Self> {
        Rc::new(Term::Literal(LiteralKind::Bool, value.to_string()))
    }

    pub fn binop(op: BinOp, lhs: Rc<Term>, rhs: Rc<Term>) -> Rc<Self> {
        Rc::new(Term::BinOp(op, lhs, rhs))
    }

    pub fn unary(op: UnaryOp, operand: Rc<Term>) -> Rc<Self> {
        Rc::new(Term::UnaryOp(op, operand))
    }

    pub fn equiv(lhs: Rc<Term>, rhs: Rc<Term>, modulus: Option<Rc<Term>>) -> Rc<Self> {
        Rc::new(Term::Equiv(lhs, rhs, modulus))
    }

    pub fn forall(name: impl Into<String>, domain: Rc<Term>, body: Rc<Term>) -> Rc<Self> {
        Rc::new(Term::ForAll(name.into(), domain, body))
    }

    pub fn exists(name: impl Into<String>, domain: Rc<Term>, body: Rc<Term>) -> Rc<Self> {
        Rc::new(Term::Exists(name.into(), domain, body))
    }
}

// =============================================================================
// JSON encoding
// =============================================================================

/// Encode a term as JSON. Deterministic for a given term.
pub fn encode_term(term: &Rc<Term>) -> String {
    serde_json::to_string(term).expect("term serialization cannot fail")
}

/// Decode a term from JSON. Malformed payloads yield `None`, never a
/// panic.
pub fn decode_term(input: &str) -> Option<Rc<Term>> {
    serde_json::from_str(input).ok()
}

// =============================================================================
// Pretty printing
// =============================================================================

impl fmt::Debug for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Var(n) => f.debug_tuple("Var").field(n).finish(),
            Term::Lam(n, ty, body) => f.debug_tuple("Lam").field(n).field(ty).field(body).finish(),
            Term::App(g, a) => f.debug_tuple("App").field(g).field(a).finish(),
            Term::Pi(n, ty, body) => f.debug_tuple("Pi").field(n).field(ty).field(body).finish(),
            Term::Sigma(n, ty, body) => {
                f.debug_tuple("Sigma").field(n).field(ty).field(body).finish()
            }
            Term::Pair(a, b) => f.debug_tuple("Pair").field(a).field(b).finish(),
            Term::Proj(k, t) => f.debug_tuple("Proj").field(k).field(t).finish(),
            Term::LetIn(n, v, b) => f.debug_tuple("LetIn").field(n).field(v).field(b).finish(),
            Term::Sort(u) => f.debug_tuple("Sort").field(u).finish(),
            Term::Ind(n, ty, ctors) => {
                f.debug_tuple("Ind").field(n).field(ty).field(ctors).finish()
            }
            Term::Match(s, cases) => f.debug_tuple("Match").field(s).field(cases).finish(),
            Term::Hole(id, note) => f.debug_tuple("Hole").field(id).field(note).finish(),
            Term::AxiomRef(a) => f.debug_tuple("AxiomRef").field(a).finish(),
            Term::Literal(k, v) => f.debug_tuple("Literal").field(k).field(v).finish(),
            Term::BinOp(op, l, r) => f.debug_tuple("BinOp").field(op).field(l).field(r).finish(),
            Term::UnaryOp(op, t) => f.debug_tuple("UnaryOp").field(op).field(t).finish(),
            Term::Equiv(l, r, m) => f.debug_tuple("Equiv").field(l).field(r).field(m).finish(),
            Term::ForAll(n, d, b) => f.debug_tuple("ForAll").field(n).field(d).field(b).finish(),
            Term::Exists(n, d, b) => f.debug_tuple("Exists").field(n).field(d).field(b).finish(),
        }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Var(n) => write!(f, "{}", n),
            Term::Lam(n, ty, body) => write!(f, "λ{} : {}. {}", n, ty, body),
            Term::App(g, a) => write!(f, "{}({})", g, a),
            Term::Pi(n, ty, body) => write!(f, "Π({} : {}). {}", n, ty, body),
            Term::Sigma(n, ty, body) => write!(f, "Σ({} : {}). {}", n, ty, body),
            Term::Pair(a, b) => write!(f, "({}, {})", a, b),
            Term::Proj(ProjKind::First, t) => write!(f, "fst({})", t),
            Term::Proj(ProjKind::Second, t) => write!(f, "snd({})", t),
            Term::LetIn(n, v, b) => write!(f, "let {} := {} in {}", n, v, b),
            Term::Sort(u) => write!(f, "{}", u),
            Term::Ind(n, ty, _) => write!(f, "inductive {} : {}", n, ty),
            Term::Match(s, cases) => {
                write!(f, "match {} {{", s)?;
                for (i, case) in cases.iter().enumerate() {
                    if i > 0 {
                        write!(f, " |")?;
                    }
                    write!(f, " {}", case.ctor)?;
                    for binder in &case.binders {
                        write!(f, " {}", binder)?;
                    }
                    write!(f, " => {}", case.body)?;
                }
                write!(f, " }}")
            }
            Term::Hole(id, _) => write!(f, "?{}", id),
            Term::AxiomRef(a) => write!(f, "{}", a),
            Term::Literal(LiteralKind::String, v) => write!(f, "\"{}\"", v),
            Term::Literal(_, v) => write!(f, "{}", v),
            Term::BinOp(op, l, r) => write!(f, "({} {} {})", l, op.symbol(), r),
            Term::UnaryOp(op, t) => write!(f, "({}{})", op.symbol(), t),
            Term::Equiv(l, r, Some(m)) => write!(f, "({} ≡ {} (mod {}))", l, r, m),
            Term::Equiv(l, r, None) => write!(f, "({} ≡ {})", l, r),
            Term::ForAll(n, d, b) => write!(f, "∀ {} ∈ {}, {}", n, d, b),
            Term::Exists(n, d, b) => write!(f, "∃ {} ∈ {}, {}", n, d, b),
        }
    }
}
