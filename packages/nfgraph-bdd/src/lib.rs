/*
 * nfgraph-bdd - Call-path to branching-program compiler
 *
 * Feature-First Hexagonal Architecture:
 * - shared/      : Common models (Expr, ConstraintSet, Call, CallPath)
 * - features/    : Vertical slices (solver → bdd builder → phase split → renaming)
 * - config/      : Trace conventions and solver limits (YAML)
 *
 * Pipeline:
 *   call paths → unified graph (ReturnRaw leaves) → init/process views → symbol renaming
 */

// Crate-level lint configuration
#![allow(clippy::should_implement_trait)] // Expr::not/add/sub builder methods
#![allow(clippy::module_inception)] // Module naming intentional
#![allow(clippy::new_without_default)] // Default impl not always needed
#![allow(clippy::upper_case_acronyms)] // BDD naming

// ═══════════════════════════════════════════════════════════════════════════
// Module Exports - Feature-First Architecture
// ═══════════════════════════════════════════════════════════════════════════

/// Shared models and utilities
pub mod shared;

/// Feature modules (solver oracle, graph construction)
pub mod features;

/// Configuration system
pub mod config;

/// Error types
pub mod errors;

// ═══════════════════════════════════════════════════════════════════════════
// Re-exports for Public API
// ═══════════════════════════════════════════════════════════════════════════

pub use config::{BddConfig, ConfigError, Preset};
pub use errors::{BddError, BddResult};
pub use features::bdd::{
    Bdd, BddStats, BddVisitor, Branch, BuildBddUseCase, CallNode, InitOutcome, Node, NodeId,
    NodeKind, NodeType, ProcessOperation, ReturnInit, ReturnProcess, ReturnRaw, VisitAction,
};
pub use features::solver::{
    CachedSolver, Entailment, EnumeratingSolver, SolverError, SolverToolbox,
};
pub use shared::models::{Arg, Call, CallPath, ConstraintSet, Expr};
