//! Utility modules

pub mod id_generator;
pub mod scope_stack;

pub use id_generator::NodeIdGenerator;
pub use scope_stack::ScopeStack;
