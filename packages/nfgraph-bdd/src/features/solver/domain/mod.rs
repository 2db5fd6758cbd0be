//! Solver domain types

pub mod entailment;
pub mod error;

pub use entailment::Entailment;
pub use error::{SolverError, SolverResult};
