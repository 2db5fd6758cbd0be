//! Oracle feature
//!
//! Three-valued entailment, equality and constant extraction over symbolic
//! expressions.
//!
//! - `ports::SolverToolbox`: the query contract the builder depends on
//! - `infrastructure::EnumeratingSolver`: bundled model-enumeration oracle
//! - `infrastructure::CachedSolver`: LRU memoization in front of any oracle

pub mod domain;
pub mod infrastructure;
pub mod ports;

pub use domain::{Entailment, SolverError, SolverResult};
pub use infrastructure::{build_solver, CacheStats, CachedSolver, EnumeratingSolver};
pub use ports::SolverToolbox;
