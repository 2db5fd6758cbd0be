//! Solver ports

pub mod toolbox;

pub use toolbox::SolverToolbox;
