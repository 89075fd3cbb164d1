//! Model configuration schema and loader.
//!
//! Site entries are deliberately permissive at the serde level: couplings
//! that only some orbital types need are optional here and are checked
//! when the bits are classified, so a missing `U` is reported against the
//! offending site instead of as a bare JSON error.

use crate::error::{ConfigError, Result};
use serde::{Deserialize, Serialize};

/// Top-level model configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Site/orbital declarations, in discovery order.
    pub sites: Vec<SiteEntry>,
    /// Explicit hopping amplitudes, keyed by bit-index pairs.
    #[serde(default)]
    pub hopping: Vec<HoppingEntry>,
    /// Explicit interaction terms of any order 2..=10.
    #[serde(default)]
    pub terms: Vec<TermEntry>,
}

/// One orbital shell on one site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteEntry {
    /// Site index.
    #[serde(default)]
    pub site: Option<usize>,
    /// Orbital type label (`s`, `p`, `d`, `f`).
    #[serde(rename = "type", default)]
    pub orbital: Option<String>,
    /// On-site Coulomb repulsion.
    #[serde(rename = "U", default, skip_serializing_if = "Option::is_none")]
    pub u: Option<f64>,
    /// Hund coupling.
    #[serde(rename = "J", default, skip_serializing_if = "Option::is_none")]
    pub j: Option<f64>,
    /// Orbital basis (`native` or `spherical`), p shells only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub basis: Option<String>,
    /// Spin components to declare (0 = up, 1 = down).
    #[serde(default = "default_spins")]
    pub spins: Vec<u8>,
    /// On-site level, added as an order-2 term on every bit of the shell.
    #[serde(default)]
    pub energy: f64,
}

fn default_spins() -> Vec<u8> {
    vec![0, 1]
}

impl SiteEntry {
    /// s shell with both spins.
    pub fn s(site: usize, u: f64) -> Self {
        Self {
            site: Some(site),
            orbital: Some("s".to_string()),
            u: Some(u),
            j: None,
            basis: None,
            spins: default_spins(),
            energy: 0.0,
        }
    }

    /// p shell with both spins.
    pub fn p(site: usize, u: f64, j: f64, basis: &str) -> Self {
        Self {
            site: Some(site),
            orbital: Some("p".to_string()),
            u: Some(u),
            j: Some(j),
            basis: Some(basis.to_string()),
            spins: default_spins(),
            energy: 0.0,
        }
    }

    /// Restrict the declared spin components.
    pub fn with_spins(mut self, spins: &[u8]) -> Self {
        self.spins = spins.to_vec();
        self
    }

    /// Set the on-site level.
    pub fn with_energy(mut self, energy: f64) -> Self {
        self.energy = energy;
        self
    }

    /// Human-readable name of the entry for error messages.
    pub fn describe(&self, position: usize) -> String {
        match (self.site, self.orbital.as_deref()) {
            (Some(site), Some(orbital)) => format!("site {site} ({orbital}, entry #{position})"),
            (Some(site), None) => format!("site {site} (entry #{position})"),
            _ => format!("entry #{position}"),
        }
    }
}

/// Hopping amplitude between two bits. Applies to both `[i,j]` and `[j,i]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HoppingEntry {
    pub bits: [usize; 2],
    pub value: f64,
}

/// Explicit normal-ordered term `value · c†_{c0} c†_{c1} … c_{a0} c_{a1} …`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TermEntry {
    pub creation: Vec<usize>,
    pub annihilation: Vec<usize>,
    pub value: f64,
}

impl ModelConfig {
    /// Parse a configuration from a JSON string.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: ModelConfig = serde_json::from_str(json)?;
        if config.sites.is_empty() {
            return Err(ConfigError::malformed("sites", "no site entries declared"));
        }
        Ok(config)
    }
}

/// Load a model configuration from file.
pub fn load_model(path: &str) -> Result<ModelConfig> {
    let json = std::fs::read_to_string(path)?;
    ModelConfig::from_json(&json)
}

/// Save a model configuration to file.
pub fn save_model(path: &str, config: &ModelConfig) -> Result<()> {
    let json = serde_json::to_string_pretty(config)?;
    std::fs::write(path, json)?;
    Ok(())
}

/// Export a model configuration to a JSON string.
pub fn export_model(config: &ModelConfig) -> Result<String> {
    Ok(serde_json::to_string_pretty(config)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_model() {
        let json = r#"{
            "sites": [
                { "site": 0, "type": "s", "U": 4.0 },
                { "site": 1, "type": "p", "U": 2.0, "J": 0.3, "basis": "spherical", "energy": -1.0 }
            ],
            "hopping": [ { "bits": [0, 2], "value": 1.0 } ],
            "terms": [ { "creation": [0, 1, 2], "annihilation": [2, 1, 0], "value": 0.1 } ]
        }"#;
        let config = ModelConfig::from_json(json).unwrap();

        assert_eq!(config.sites.len(), 2);
        assert_eq!(config.sites[0], SiteEntry::s(0, 4.0));
        assert_eq!(config.sites[1].j, Some(0.3));
        assert_eq!(config.sites[1].basis.as_deref(), Some("spherical"));
        assert_eq!(config.sites[1].spins, vec![0, 1]);
        assert_eq!(config.sites[1].energy, -1.0);
        assert_eq!(config.hopping[0].bits, [0, 2]);
        assert_eq!(config.terms[0].creation, vec![0, 1, 2]);
    }

    #[test]
    fn test_missing_coupling_is_not_a_json_error() {
        // Semantic checks happen during classification, not here.
        let config = ModelConfig::from_json(r#"{ "sites": [ { "site": 0, "type": "s" } ] }"#).unwrap();
        assert_eq!(config.sites[0].u, None);
        assert!(config.hopping.is_empty());
        assert!(config.terms.is_empty());
    }

    #[test]
    fn test_wrong_shape_is_json_error() {
        let err = ModelConfig::from_json(r#"{ "sites": [ { "site": "zero", "type": "s" } ] }"#)
            .unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
    }

    #[test]
    fn test_empty_sites_rejected() {
        let err = ModelConfig::from_json(r#"{ "sites": [] }"#).unwrap_err();
        assert!(matches!(err, ConfigError::MalformedEntry { .. }));
    }

    #[test]
    fn test_export_roundtrip() {
        let config = ModelConfig {
            sites: vec![
                SiteEntry::s(0, 1.0).with_spins(&[0]),
                SiteEntry::p(1, 2.0, 0.5, "native").with_energy(0.25),
            ],
            hopping: vec![HoppingEntry {
                bits: [0, 1],
                value: -1.0,
            }],
            terms: vec![],
        };

        let json = export_model(&config).unwrap();
        let parsed = ModelConfig::from_json(&json).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_save_and_load_model() {
        let path = std::env::temp_dir().join(format!("fermi-format-{}.json", std::process::id()));
        let path = path.to_string_lossy().into_owned();
        let config = ModelConfig {
            sites: vec![SiteEntry::s(0, 4.0)],
            ..ModelConfig::default()
        };

        save_model(&path, &config).unwrap();
        let loaded = load_model(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_model("/nonexistent/fermi/model.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn test_describe_entry() {
        assert_eq!(SiteEntry::s(2, 1.0).describe(5), "site 2 (s, entry #5)");
        let anonymous = SiteEntry {
            site: None,
            ..SiteEntry::s(0, 1.0)
        };
        assert_eq!(anonymous.describe(1), "entry #1");
    }
}
