//! Error types for nfgraph-bdd
//!
//! Provides unified error handling across the crate. Every variant except
//! [`BddError::NodeNotFound`] aborts graph construction: consumers assume a
//! structurally well-formed graph, so nothing is returned half-built.

use crate::config::ConfigError;
use crate::features::bdd::domain::NodeId;
use crate::features::solver::SolverError;
use crate::shared::models::ExprError;
use thiserror::Error;

/// Main error type for nfgraph-bdd operations
#[derive(Debug, Error)]
pub enum BddError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Graph file encoding/decoding error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Oracle failure or contradictory oracle answer
    #[error("Solver error: {0}")]
    Solver(#[from] SolverError),

    /// Malformed expression
    #[error("Expression error: {0}")]
    Expr(#[from] ExprError),

    /// Structural invariant violated (builder bug or corrupted input graph)
    #[error("Invariant violation: {0}")]
    Invariant(String),

    /// No discriminating constraint separates the call paths
    #[error("Call paths cannot be partitioned: {}", paths.join(", "))]
    UnpartitionableGroup { paths: Vec<String> },

    /// Nothing to build from
    #[error("No call paths to build from")]
    EmptyInput,

    /// Node id absent from the graph
    #[error("Node {0} not found")]
    NodeNotFound(NodeId),

    /// Graph file written by an incompatible version
    #[error("Unsupported graph file version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },
}

impl BddError {
    /// Create an invariant violation error
    pub fn invariant(msg: impl Into<String>) -> Self {
        BddError::Invariant(msg.into())
    }

    /// Whether the error must abort graph construction
    pub fn is_fatal(&self) -> bool {
        !matches!(self, BddError::NodeNotFound(_))
    }
}

/// Result type alias for graph operations
pub type BddResult<T> = std::result::Result<T, BddError>;
