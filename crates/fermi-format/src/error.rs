//! Error types for fermi-format.

use thiserror::Error;

/// Errors raised while loading a model configuration or classifying its bits.
///
/// All of them are fatal to basis construction: no partial basis is ever
/// published.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unknown orbital type {label:?}{}", .site.map(|s| format!(" at site {s}")).unwrap_or_default())]
    UnknownOrbitalType { site: Option<usize>, label: String },

    #[error("Malformed entry {entry}: {reason}")]
    MalformedEntry { entry: String, reason: String },

    #[error("Duplicate bit: site {site}, orbital {orbital}, spin {spin}")]
    DuplicateBit {
        site: usize,
        orbital: String,
        spin: u8,
    },
}

impl ConfigError {
    /// Shorthand for [`ConfigError::MalformedEntry`].
    pub fn malformed(entry: impl Into<String>, reason: impl Into<String>) -> Self {
        ConfigError::MalformedEntry {
            entry: entry.into(),
            reason: reason.into(),
        }
    }

    /// Attach a site index to an [`ConfigError::UnknownOrbitalType`] raised by
    /// the context-free parser. Other variants pass through unchanged.
    pub fn at_site(self, site: usize) -> Self {
        match self {
            ConfigError::UnknownOrbitalType { label, .. } => ConfigError::UnknownOrbitalType {
                site: Some(site),
                label,
            },
            other => other,
        }
    }
}

pub type Result<T> = std::result::Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_orbital_message_names_site() {
        let err = ConfigError::UnknownOrbitalType {
            site: None,
            label: "g".to_string(),
        }
        .at_site(3);
        assert_eq!(err.to_string(), "Unknown orbital type \"g\" at site 3");
    }

    #[test]
    fn test_at_site_keeps_other_variants() {
        let err = ConfigError::malformed("site 1", "missing field U").at_site(7);
        assert!(matches!(err, ConfigError::MalformedEntry { .. }));
        assert_eq!(err.to_string(), "Malformed entry site 1: missing field U");
    }
}
