//! Orbital labels of the configuration tree.

use crate::error::{ConfigError, Result};
use std::fmt;
use std::str::FromStr;

/// Physical character of an orbital shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrbitalType {
    S,
    P,
    D,
    F,
}

impl OrbitalType {
    /// Angular momentum quantum number l of the shell.
    pub fn angular_momentum(self) -> u32 {
        match self {
            OrbitalType::S => 0,
            OrbitalType::P => 1,
            OrbitalType::D => 2,
            OrbitalType::F => 3,
        }
    }

    /// Number of orbital components (2l + 1).
    pub fn components(self) -> usize {
        2 * self.angular_momentum() as usize + 1
    }

    pub fn label(self) -> &'static str {
        match self {
            OrbitalType::S => "s",
            OrbitalType::P => "p",
            OrbitalType::D => "d",
            OrbitalType::F => "f",
        }
    }
}

impl fmt::Display for OrbitalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for OrbitalType {
    type Err = ConfigError;

    fn from_str(label: &str) -> Result<Self> {
        parse_orbital_type(label)
    }
}

/// Parse an orbital-type label over the closed set `{s, p, d, f}`.
///
/// The returned error carries no site; callers attach it with
/// [`ConfigError::at_site`].
pub fn parse_orbital_type(label: &str) -> Result<OrbitalType> {
    match label {
        "s" => Ok(OrbitalType::S),
        "p" => Ok(OrbitalType::P),
        "d" => Ok(OrbitalType::D),
        "f" => Ok(OrbitalType::F),
        _ => Err(ConfigError::UnknownOrbitalType {
            site: None,
            label: label.to_string(),
        }),
    }
}

/// Basis in which the orbital components of a shell are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BasisKind {
    /// Cartesian components (p_x, p_y, p_z).
    Native,
    /// Spherical-harmonic components (m = -l..=l).
    Spherical,
}

impl fmt::Display for BasisKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BasisKind::Native => f.write_str("native"),
            BasisKind::Spherical => f.write_str("spherical"),
        }
    }
}

/// Parse a basis label. `entry` names the configuration entry for the error.
pub fn parse_basis_kind(entry: &str, label: &str) -> Result<BasisKind> {
    match label {
        "native" => Ok(BasisKind::Native),
        "spherical" => Ok(BasisKind::Spherical),
        _ => Err(ConfigError::malformed(
            entry,
            format!("unknown basis {label:?}, expected \"native\" or \"spherical\""),
        )),
    }
}
