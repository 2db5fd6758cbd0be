//! Build configuration
//!
//! Everything the builder needs to know about the trace convention: where
//! initialization ends, which calls and condition symbols are noise, how a
//! path reports its forwarding decision, and which calls mint symbols.

use super::error::{ConfigError, ConfigResult};
use super::io::BddConfigFileV1;
use super::preset::Preset;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::warn;

/// Supported YAML schema versions
pub const SUPPORTED_VERSIONS: &[u32] = &[1];

/// Phase split settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PhaseConfig {
    /// Call marking the end of initialization
    pub init_marker: String,
    /// Calls irrelevant to the init view
    pub init_skip_functions: Vec<String>,
    /// Calls dropped from the process view
    pub process_skip_functions: Vec<String>,
    /// Condition symbols that never decide the processing outcome
    pub process_skip_condition_symbols: Vec<String>,
}

impl PhaseConfig {
    pub fn is_init_marker(&self, function_name: &str) -> bool {
        self.init_marker == function_name
    }

    pub fn is_init_skipped(&self, function_name: &str) -> bool {
        self.init_skip_functions.iter().any(|f| f == function_name)
    }

    pub fn is_process_skipped(&self, function_name: &str) -> bool {
        self.process_skip_functions.iter().any(|f| f == function_name)
    }
}

/// How a path reports its forwarding decision
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReturnConvention {
    pub forward_function: String,
    /// Argument of `forward_function` holding the output port
    pub forward_port_arg: String,
    pub drop_functions: Vec<String>,
    pub broadcast_functions: Vec<String>,
}

impl ReturnConvention {
    pub fn is_forward(&self, function_name: &str) -> bool {
        !self.forward_function.is_empty() && self.forward_function == function_name
    }

    pub fn is_drop(&self, function_name: &str) -> bool {
        self.drop_functions.iter().any(|f| f == function_name)
    }

    pub fn is_broadcast(&self, function_name: &str) -> bool {
        self.broadcast_functions.iter().any(|f| f == function_name)
    }

    pub fn is_decision(&self, function_name: &str) -> bool {
        self.is_forward(function_name)
            || self.is_drop(function_name)
            || self.is_broadcast(function_name)
    }
}

/// Symbol generator table: function name to the base names it mints
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SymbolConfig {
    pub generators: BTreeMap<String, Vec<String>>,
}

/// Bundled oracle settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SolverConfig {
    /// Symbols up to this many bits are enumerated exhaustively
    pub exhaustive_width: u32,
    /// Upper bound on assignments tried per query
    pub max_assignments: u64,
    /// Entailment cache entries, 0 disables caching
    pub cache_capacity: usize,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            exhaustive_width: 8,
            max_assignments: 1 << 22,
            cache_capacity: 4096,
        }
    }
}

/// Complete build configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BddConfig {
    preset: Preset,
    pub phases: PhaseConfig,
    pub returns: ReturnConvention,
    pub symbols: SymbolConfig,
    pub solver: SolverConfig,
}

impl Default for BddConfig {
    fn default() -> Self {
        Self::preset(Preset::default())
    }
}

fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

impl BddConfig {
    /// Start from a preset
    pub fn preset(preset: Preset) -> Self {
        match preset {
            Preset::Vigor => Self::vigor(),
            Preset::Custom => Self {
                preset,
                phases: PhaseConfig::default(),
                returns: ReturnConvention::default(),
                symbols: SymbolConfig::default(),
                solver: SolverConfig::default(),
            },
        }
    }

    fn vigor() -> Self {
        let phases = PhaseConfig {
            init_marker: "start_time".to_string(),
            init_skip_functions: names(&[
                "current_time",
                "loop_invariant_consume",
                "loop_invariant_produce",
                "packet_receive",
                "packet_borrow_next_chunk",
                "packet_return_chunk",
                "packet_get_unread_length",
                "packet_state_total_length",
                "packet_send",
                "packet_free",
                "nf_set_rte_ipv4_udptcp_checksum",
            ]),
            process_skip_functions: names(&["loop_invariant_consume", "loop_invariant_produce"]),
            process_skip_condition_symbols: names(&["received_a_packet", "loop_termination"]),
        };

        let returns = ReturnConvention {
            forward_function: "packet_send".to_string(),
            forward_port_arg: "dst_device".to_string(),
            drop_functions: names(&["packet_free"]),
            broadcast_functions: names(&["packet_broadcast"]),
        };

        let generators = [
            ("current_time", &["next_time"][..]),
            ("packet_receive", &["DEVICE", "received_a_packet"][..]),
            ("packet_borrow_next_chunk", &["packet_chunks"][..]),
            ("map_get", &["map_has_this_key", "allocated_index"][..]),
            ("dchain_allocate_new_index", &["out_of_space", "new_index"][..]),
            ("dchain_is_index_allocated", &["dchain_is_index_allocated"][..]),
            ("dchain_rejuvenate_index", &["dchain_rejuvenate_index"][..]),
            ("vector_borrow", &["vector_data_reset"][..]),
            ("expire_items_single_map", &["number_of_freed_flows"][..]),
            ("rte_ether_addr_hash", &["rte_ether_addr_hash"][..]),
            (
                "cht_find_preferred_available_backend",
                &["chosen_backend", "prefered_backend_found"][..],
            ),
        ]
        .into_iter()
        .map(|(function, bases)| (function.to_string(), names(bases)))
        .collect();

        Self {
            preset: Preset::Vigor,
            phases,
            returns,
            symbols: SymbolConfig { generators },
            solver: SolverConfig::default(),
        }
    }

    pub fn get_preset(&self) -> Preset {
        self.preset
    }

    pub fn phases(mut self, f: impl FnOnce(&mut PhaseConfig)) -> Self {
        f(&mut self.phases);
        self
    }

    pub fn returns(mut self, f: impl FnOnce(&mut ReturnConvention)) -> Self {
        f(&mut self.returns);
        self
    }

    pub fn symbols(mut self, f: impl FnOnce(&mut SymbolConfig)) -> Self {
        f(&mut self.symbols);
        self
    }

    pub fn solver(mut self, f: impl FnOnce(&mut SolverConfig)) -> Self {
        f(&mut self.solver);
        self
    }

    /// Range and consistency checks
    pub fn validate(&self) -> ConfigResult<()> {
        let width = self.solver.exhaustive_width;
        if !(1..=16).contains(&width) {
            return Err(ConfigError::range_with_hint(
                "solver.exhaustive_width",
                width,
                1,
                16,
                "Wider symbols fall back to boundary values",
            ));
        }

        let budget = self.solver.max_assignments;
        if !(1..=u32::MAX as u64).contains(&budget) {
            return Err(ConfigError::range_with_hint(
                "solver.max_assignments",
                budget,
                1,
                u32::MAX,
                "Budget bounds the models tried per query",
            ));
        }

        if self.phases.init_marker.is_empty() {
            return Err(ConfigError::Validation(
                "phases.init_marker must name the call that ends initialization".to_string(),
            ));
        }

        if self.phases.is_init_skipped(&self.phases.init_marker) {
            return Err(ConfigError::Conflict {
                issue: format!(
                    "init marker '{}' is also on the init skip-list",
                    self.phases.init_marker
                ),
                fix: "Remove it from phases.init_skip_functions".to_string(),
            });
        }

        let returns = &self.returns;
        if !returns.forward_function.is_empty() && returns.forward_port_arg.is_empty() {
            return Err(ConfigError::Validation(
                "returns.forward_port_arg is required when returns.forward_function is set"
                    .to_string(),
            ));
        }

        if let Some(name) = returns
            .drop_functions
            .iter()
            .find(|f| returns.is_forward(f) || returns.is_broadcast(f))
        {
            return Err(ConfigError::Conflict {
                issue: format!("'{}' is listed under more than one decision kind", name),
                fix: "List each decision function once".to_string(),
            });
        }
        if returns.is_broadcast(&returns.forward_function) {
            return Err(ConfigError::Conflict {
                issue: format!(
                    "'{}' is both the forward and a broadcast function",
                    returns.forward_function
                ),
                fix: "List each decision function once".to_string(),
            });
        }

        if returns.forward_function.is_empty() {
            warn!("No forward function configured; no path will be classified as FORWARD");
        }
        for (function, bases) in &self.symbols.generators {
            if bases.is_empty() {
                warn!(function = %function, "Symbol generator lists no base names");
            }
        }

        Ok(())
    }

    /// Load from a versioned YAML file
    pub fn from_yaml(path: &str) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    pub fn from_yaml_str(content: &str) -> ConfigResult<Self> {
        let raw: serde_yaml::Value = serde_yaml::from_str(content)?;
        if raw.get("version").is_none() {
            return Err(ConfigError::MissingVersion);
        }

        let file: BddConfigFileV1 = serde_yaml::from_value(raw)?;
        if !SUPPORTED_VERSIONS.contains(&file.version) {
            return Err(ConfigError::UnsupportedVersion {
                found: file.version,
                supported: SUPPORTED_VERSIONS.to_vec(),
            });
        }

        let preset = Preset::from_str(&file.preset)
            .map_err(|_| ConfigError::UnknownPreset(file.preset.clone()))?;

        let mut config = Self::preset(preset);
        if let Some(phases) = file.phases {
            config.phases = phases;
        }
        if let Some(returns) = file.returns {
            config.returns = returns;
        }
        if let Some(symbols) = file.symbols {
            config.symbols = symbols;
        }
        if let Some(solver) = file.solver {
            config.solver = solver;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn to_yaml(&self) -> ConfigResult<String> {
        let file = BddConfigFileV1 {
            version: 1,
            preset: self.preset.to_string(),
            phases: Some(self.phases.clone()),
            returns: Some(self.returns.clone()),
            symbols: Some(self.symbols.clone()),
            solver: Some(self.solver.clone()),
        };
        Ok(serde_yaml::to_string(&file)?)
    }
}
