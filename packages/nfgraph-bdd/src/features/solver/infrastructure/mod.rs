//! Bundled oracle implementations

pub mod cached;
pub mod enumerating;

pub use cached::{CacheStats, CachedSolver};
pub use enumerating::EnumeratingSolver;

use crate::config::SolverConfig;
use crate::features::solver::ports::SolverToolbox;

/// Oracle described by the configuration (cached unless capacity is 0)
pub fn build_solver(config: &SolverConfig) -> Box<dyn SolverToolbox> {
    let solver = EnumeratingSolver::from_config(config);
    if config.cache_capacity == 0 {
        Box::new(solver)
    } else {
        Box::new(CachedSolver::new(solver, config.cache_capacity))
    }
}
