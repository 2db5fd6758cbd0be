//! Build configuration
//!
//! Preset-based configuration with versioned YAML files.
//!
//! ```no_run
//! use nfgraph_bdd::config::{BddConfig, Preset};
//!
//! let config = BddConfig::preset(Preset::Vigor)
//!     .solver(|s| s.cache_capacity = 1024);
//! config.validate().unwrap();
//!
//! let from_file = BddConfig::from_yaml("nf.yaml").unwrap();
//! ```

pub mod bdd_config;
pub mod error;
pub mod io;
pub mod preset;

pub use bdd_config::{
    BddConfig, PhaseConfig, ReturnConvention, SolverConfig, SymbolConfig, SUPPORTED_VERSIONS,
};
pub use error::{ConfigError, ConfigResult};
pub use preset::Preset;
