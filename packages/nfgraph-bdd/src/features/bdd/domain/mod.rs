//! Graph domain model

pub mod arena;
pub mod bdd;
pub mod node;
pub mod visitor;

pub use arena::{ChainBuilder, NodeArena};
pub use bdd::Bdd;
pub use node::{
    Branch, CallNode, InitOutcome, Node, NodeId, NodeKind, NodeType, ProcessOperation, RawPath,
    ReturnInit, ReturnProcess, ReturnRaw,
};
pub use visitor::{BddStats, BddVisitor, VisitAction};
