//! Build use case: call paths to finished graph

use crate::config::BddConfig;
use crate::errors::BddResult;
use crate::features::bdd::domain::{Bdd, BddStats};
use crate::features::bdd::infrastructure::{
    rename_symbols, BddBuilder, ConfiguredSymbolHook, PhaseSplitter,
};
use crate::features::bdd::ports::SymbolHook;
use crate::features::solver::SolverToolbox;
use crate::shared::models::CallPath;
use crate::shared::utils::NodeIdGenerator;
use tracing::{debug, info};

/// Runs build, phase split and renaming in order
pub struct BuildBddUseCase<'a> {
    solver: &'a dyn SolverToolbox,
    config: &'a BddConfig,
    hook: Option<&'a dyn SymbolHook>,
}

impl<'a> BuildBddUseCase<'a> {
    pub fn new(solver: &'a dyn SolverToolbox, config: &'a BddConfig) -> Self {
        Self {
            solver,
            config,
            hook: None,
        }
    }

    /// Replace the configured generator table with a custom hook
    pub fn with_symbol_hook(mut self, hook: &'a dyn SymbolHook) -> Self {
        self.hook = Some(hook);
        self
    }

    pub fn execute(&self, paths: &[CallPath]) -> BddResult<Bdd> {
        self.config.validate()?;
        info!("Building BDD from {} call paths", paths.len());

        let mut ids = NodeIdGenerator::new();
        let (unified, root) = BddBuilder::new(self.solver, &mut ids).build(paths)?;
        debug!("Unified graph: {} nodes", unified.len());

        let (mut arena, init, process) =
            PhaseSplitter::new(&unified, &mut ids, self.config, self.solver).split(root)?;

        let configured = ConfiguredSymbolHook::new(&self.config.symbols);
        let hook = self.hook.unwrap_or(&configured);
        let renamed = rename_symbols(&mut arena, &[init, process], hook)?;

        let bdd = Bdd::from_parts(arena, init, process, ids, paths.len())?;
        info!("BDD built: {} ({} symbols renamed)", BddStats::collect(&bdd), renamed);
        Ok(bdd)
    }
}

impl Bdd {
    /// Build a graph from call paths
    pub fn from_call_paths(
        paths: &[CallPath],
        solver: &dyn SolverToolbox,
        config: &BddConfig,
    ) -> BddResult<Self> {
        BuildBddUseCase::new(solver, config).execute(paths)
    }
}
