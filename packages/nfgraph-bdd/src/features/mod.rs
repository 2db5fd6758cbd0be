//! Feature modules

pub mod bdd;
pub mod solver;
