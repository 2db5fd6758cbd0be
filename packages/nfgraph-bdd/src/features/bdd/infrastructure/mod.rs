//! Graph construction infrastructure
//!
//! - `call_paths_group`: partition of call paths by next call
//! - `builder`: unified graph with raw terminals
//! - `phase_splitter`: init and process views
//! - `symbol_factory`: deterministic symbol renaming
//! - `persistence`: graph files

pub mod builder;
pub mod call_paths_group;
pub mod persistence;
pub mod phase_splitter;
pub mod symbol_factory;

pub use builder::BddBuilder;
pub use call_paths_group::{are_calls_equal, CallPathCursor, CallPathsGroup};
pub use persistence::GRAPH_FILE_VERSION;
pub use phase_splitter::PhaseSplitter;
pub use symbol_factory::{rename_symbols, ConfiguredSymbolHook, SymbolFactory};
