//! YAML schema for build configuration files

use super::bdd_config::{PhaseConfig, ReturnConvention, SolverConfig, SymbolConfig};
use serde::{Deserialize, Serialize};

/// YAML Schema v1
///
/// A present section replaces the preset's section as a whole.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BddConfigFileV1 {
    /// Schema version (always 1 for v1)
    pub version: u32,

    /// Base preset
    pub preset: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phases: Option<PhaseConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub returns: Option<ReturnConvention>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbols: Option<SymbolConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub solver: Option<SolverConfig>,
}
