//! Elementary single-particle degrees of freedom ("bits").

use crate::fock::ParticleIndex;
use fermi_format::{BasisKind, OrbitalType};
use std::fmt;

/// Orbital character of a bit together with its type-specific couplings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Orbital {
    /// s shell: on-site Coulomb repulsion only.
    S { u: f64 },
    /// p shell component.
    ///
    /// `index` is 0, 1, 2 (p_x, p_y, p_z) in the native basis and
    /// m = -1, 0, 1 in the spherical basis.
    P {
        u: f64,
        j: f64,
        basis: BasisKind,
        index: i8,
    },
}

impl Orbital {
    pub fn orbital_type(&self) -> OrbitalType {
        match self {
            Orbital::S { .. } => OrbitalType::S,
            Orbital::P { .. } => OrbitalType::P,
        }
    }

    /// Component label within the shell (0 for s).
    pub fn component(&self) -> i8 {
        match self {
            Orbital::S { .. } => 0,
            Orbital::P { index, .. } => *index,
        }
    }

    pub fn u(&self) -> f64 {
        match self {
            Orbital::S { u } | Orbital::P { u, .. } => *u,
        }
    }
}

/// Full description of one bit. Immutable once classified.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BitInfo {
    pub site: usize,
    /// 0 = up, 1 = down.
    pub spin: u8,
    pub orbital: Orbital,
    pub bit_number: ParticleIndex,
}

impl BitInfo {
    pub fn orbital_type(&self) -> OrbitalType {
        self.orbital.orbital_type()
    }
}

fn spin_label(spin: u8) -> &'static str {
    if spin == 0 {
        "up"
    } else {
        "down"
    }
}

impl fmt::Display for BitInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.orbital {
            Orbital::S { u } => write!(
                f,
                "bit {}: site {}, s, spin {}, U = {}",
                self.bit_number,
                self.site,
                spin_label(self.spin),
                u
            ),
            Orbital::P { u, j, basis, index } => write!(
                f,
                "bit {}: site {}, p[{index}] ({basis}), spin {}, U = {u}, J = {j}",
                self.bit_number,
                self.site,
                spin_label(self.spin),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_per_variant() {
        let s = BitInfo {
            site: 0,
            spin: 1,
            orbital: Orbital::S { u: 4.0 },
            bit_number: 1,
        };
        assert_eq!(s.to_string(), "bit 1: site 0, s, spin down, U = 4");

        let p = BitInfo {
            site: 2,
            spin: 0,
            orbital: Orbital::P {
                u: 2.0,
                j: 0.5,
                basis: BasisKind::Spherical,
                index: -1,
            },
            bit_number: 7,
        };
        assert_eq!(
            p.to_string(),
            "bit 7: site 2, p[-1] (spherical), spin up, U = 2, J = 0.5"
        );
    }

    #[test]
    fn test_orbital_accessors() {
        let p = Orbital::P {
            u: 3.0,
            j: 0.2,
            basis: BasisKind::Native,
            index: 2,
        };
        assert_eq!(p.orbital_type(), OrbitalType::P);
        assert_eq!(p.component(), 2);
        assert_eq!(p.u(), 3.0);
        assert_eq!(Orbital::S { u: 1.0 }.component(), 0);
    }
}
