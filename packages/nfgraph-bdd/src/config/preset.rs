//! Preset configurations
//!
//! A preset names the trace convention a set of call paths follows.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Configuration preset
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
    /// Vigor-style NF traces
    ///
    /// - Init ends at `start_time`
    /// - Forwarding decided by `packet_send` / `packet_free` / `packet_broadcast`
    /// - Map, vector and dchain calls generate symbols
    #[default]
    Vigor,

    /// Empty tables, everything supplied through YAML
    Custom,
}

impl Preset {
    /// Parse preset from string
    pub fn from_str(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "vigor" => Ok(Self::Vigor),
            "custom" => Ok(Self::Custom),
            _ => Err(format!("Unknown preset '{}'. Valid presets: vigor, custom", s)),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Vigor => "vigor",
            Self::Custom => "custom",
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preset_from_str() {
        assert_eq!(Preset::from_str("vigor").unwrap(), Preset::Vigor);
        assert_eq!(Preset::from_str("CUSTOM").unwrap(), Preset::Custom);
        assert!(Preset::from_str("click").is_err());
    }

    #[test]
    fn test_preset_as_str() {
        assert_eq!(Preset::Vigor.as_str(), "vigor");
        assert_eq!(Preset::Custom.to_string(), "custom");
    }
}
