//! Call-path to branching-program compiler
//!
//! Hexagonal layout:
//! - `domain`: nodes, arena, graph container, visitor protocol
//! - `ports`: symbol generation hook
//! - `infrastructure`: builder, phase splitter, renaming, persistence
//! - `application`: the end-to-end build use case

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod ports;

pub use application::BuildBddUseCase;
pub use domain::{
    Bdd, BddStats, BddVisitor, Branch, CallNode, ChainBuilder, InitOutcome, Node, NodeArena,
    NodeId, NodeKind, NodeType, ProcessOperation, RawPath, ReturnInit, ReturnProcess, ReturnRaw,
    VisitAction,
};
pub use infrastructure::{
    rename_symbols, BddBuilder, CallPathCursor, CallPathsGroup, ConfiguredSymbolHook,
    PhaseSplitter, SymbolFactory,
};
pub use ports::{GeneratedSymbol, NoGeneratedSymbols, SymbolHook};
