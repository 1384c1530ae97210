//! Command-line front door: wires the LaTeX parser and the kernel
//! checker into a single pipeline and renders the results.

pub mod driver;

use kernel::module::AxiomBundle;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("unknown axiom bundle '{0}' (expected 'classical' or 'minimal')")]
    UnknownBundle(String),
}

/// Resolve a `--bundle` flag value to a concrete axiom bundle.
pub fn resolve_bundle(name: &str) -> Result<AxiomBundle, CliError> {
    match name {
        "classical" => Ok(AxiomBundle::classical_math()),
        "minimal" => Ok(AxiomBundle::minimal_core()),
        other => Err(CliError::UnknownBundle(other.to_string())),
    }
}
