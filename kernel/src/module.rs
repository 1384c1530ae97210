use crate::ast::{Axiom, Term};
use std::collections::BTreeSet;
use std::fmt;
use std::rc::Rc;

// =============================================================================
// Axiom bundles
// =============================================================================

/// A named, immutable set of axioms attached to a module or an
/// individual theorem. Built once at configuration time and read-only
/// afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AxiomBundle {
    name: String,
    description: String,
    axioms: BTreeSet<Axiom>,
}

impl AxiomBundle {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        axioms: impl IntoIterator<Item = Axiom>,
    ) -> Self {
        AxiomBundle {
            name: name.into(),
            description: description.into(),
            axioms: axioms.into_iter().collect(),
        }
    }

    /// Everything classical mathematics routinely assumes.
    pub fn classical_math() -> Self {
        AxiomBundle::new(
            "ClassicalMath",
            "Classical mathematics: excluded middle, choice, and the usual extensionality principles",
            [
                Axiom::Lem,
                Axiom::Choice,
                Axiom::Funext,
                Axiom::Propext,
                Axiom::Quotient,
                Axiom::ClassicalLogic,
            ],
        )
    }

    /// No classical principles at all.
    pub fn minimal_core() -> Self {
        AxiomBundle::new("MinimalCore", "Constructive core with no classical axioms", [])
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn contains(&self, axiom: Axiom) -> bool {
        self.axioms.contains(&axiom)
    }

    pub fn axioms(&self) -> impl Iterator<Item = Axiom> + '_ {
        self.axioms.iter().copied()
    }
}

impl fmt::Display for AxiomBundle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

// =============================================================================
// Declarations
// =============================================================================

/// A named parameter of a definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    pub name: String,
    pub ty: Rc<Term>,
}

/// A proof step attached to a theorem. `Placeholder` marks an
/// obligation nobody has discharged yet; backends must surface it as
/// their native incomplete-proof marker instead of dropping it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Tactic {
    Intro(String),
    Apply(String),
    Exact(Rc<Term>),
    Rewrite(String),
    Induction(String),
    Reflexivity,
    Placeholder,
}

impl Tactic {
    pub fn is_placeholder(&self) -> bool {
        matches!(self, Tactic::Placeholder)
    }
}

/// Top-level declarations of a module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Declaration {
    Definition {
        name: String,
        params: Vec<Param>,
        return_type: Option<Rc<Term>>,
        body: Rc<Term>,
    },
    Theorem {
        name: String,
        statement: Rc<Term>,
        tactics: Vec<Tactic>,
        /// Per-theorem override of the module bundle.
        bundle: Option<AxiomBundle>,
    },
    Lemma {
        name: String,
        statement: Rc<Term>,
        tactics: Vec<Tactic>,
        bundle: Option<AxiomBundle>,
    },
}

impl Declaration {
    pub fn name(&self) -> &str {
        match self {
            Declaration::Definition { name, .. }
            | Declaration::Theorem { name, .. }
            | Declaration::Lemma { name, .. } => name,
        }
    }
}

/// A checked unit handed to the code-generation backends.
#[derive(Debug, Clone)]
pub struct Module {
    pub name: String,
    pub declarations: Vec<Declaration>,
    pub bundle: AxiomBundle,
    pub imports: Vec<String>,
}

impl Module {
    pub fn new(name: impl Into<String>, bundle: AxiomBundle) -> Self {
        Module {
            name: name.into(),
            declarations: Vec::new(),
            bundle,
            imports: Vec::new(),
        }
    }

    pub fn with_declaration(mut self, decl: Declaration) -> Self {
        self.declarations.push(decl);
        self
    }
}

// =============================================================================
// Backend seam
// =============================================================================

/// Output of a code-generation backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedCode {
    pub language: String,
    pub file_extension: String,
    pub code: String,
    pub warnings: Vec<String>,
}

/// Interface the external backends (Lean 4, Coq, Isabelle/HOL)
/// implement. Generation must be deterministic: the same module twice
/// yields byte-identical code.
pub trait Backend {
    fn name(&self) -> &str;
    fn generate(&self, module: &Module) -> GeneratedCode;
}
