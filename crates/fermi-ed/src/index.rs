//! Particle-index lookup over the classified bits.

use crate::bits::BitInfo;
use crate::classification::BitClassification;
use crate::error::Result;
use crate::fock::ParticleIndex;
use fermi_format::OrbitalType;

/// Maps particle indices to bit descriptors and back.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexClassification {
    infos: Vec<BitInfo>,
}

impl IndexClassification {
    /// Index `i` is the bit with `bit_number == i`.
    pub fn from_bits(bits: &[BitInfo]) -> Self {
        let mut infos = bits.to_vec();
        infos.sort_by_key(|b| b.bit_number);
        Self { infos }
    }

    pub fn from_classification(classification: &BitClassification) -> Result<Self> {
        Ok(Self::from_bits(classification.bit_info_list()?))
    }

    /// Number of particle indices.
    pub fn index_size(&self) -> usize {
        self.infos.len()
    }

    pub fn info(&self, index: ParticleIndex) -> Option<&BitInfo> {
        self.infos.get(index)
    }

    /// Particle index of a `(site, shell, component, spin)` combination.
    pub fn find(
        &self,
        site: usize,
        orbital_type: OrbitalType,
        component: i8,
        spin: u8,
    ) -> Option<ParticleIndex> {
        self.infos
            .iter()
            .find(|b| {
                b.site == site
                    && b.orbital_type() == orbital_type
                    && b.orbital.component() == component
                    && b.spin == spin
            })
            .map(|b| b.bit_number)
    }
}
