//! Fermionic occupation-number states.
//!
//! A many-body basis state is a bit string: bit `i` set means the
//! single-particle index `i` is occupied. Operators act with the sign
//! convention `c†_i |n⟩ = (-1)^{Σ_{j<i} n_j} |n + e_i⟩`.

use crate::term::Term;
use std::fmt;

/// Single-particle index; equal to the bit number assigned at classification.
pub type ParticleIndex = usize;

/// Direction of a field operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FieldKind {
    Creation,
    Annihilation,
}

impl FieldKind {
    /// The Hermitian-adjoint direction.
    pub fn dual(self) -> Self {
        match self {
            FieldKind::Creation => FieldKind::Annihilation,
            FieldKind::Annihilation => FieldKind::Creation,
        }
    }

    /// Operator symbol used in dumps (`c^+` or `c`).
    pub fn symbol(self) -> &'static str {
        match self {
            FieldKind::Creation => "c^+",
            FieldKind::Annihilation => "c",
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldKind::Creation => f.write_str("creation"),
            FieldKind::Annihilation => f.write_str("annihilation"),
        }
    }
}

/// Occupation-number basis state over at most 64 bits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FockState(pub u64);

impl FockState {
    /// Largest number of single-particle indices a state can hold.
    pub const MAX_BITS: usize = 64;

    pub fn vacuum() -> Self {
        FockState(0)
    }

    /// State with exactly the given bits occupied. Bits at or above
    /// [`Self::MAX_BITS`] are ignored.
    pub fn from_occupied(bits: &[ParticleIndex]) -> Self {
        FockState(
            bits.iter()
                .filter(|&&b| b < Self::MAX_BITS)
                .fold(0u64, |acc, &b| acc | (1u64 << b)),
        )
    }

    pub fn is_occupied(self, bit: ParticleIndex) -> bool {
        bit < Self::MAX_BITS && (self.0 >> bit) & 1 == 1
    }

    /// Total particle number.
    pub fn n_particles(self) -> u32 {
        self.0.count_ones()
    }

    /// Fermionic sign from the occupied bits strictly below `bit`.
    fn sign_below(self, bit: ParticleIndex) -> f64 {
        let below = self.0 & ((1u64 << bit) - 1);
        if below.count_ones() % 2 == 0 {
            1.0
        } else {
            -1.0
        }
    }

    /// Apply a single creation or annihilation operator.
    ///
    /// Returns the resulting state and the anticommutation sign, or `None`
    /// when the operator annihilates the state (or `bit` is out of range).
    pub fn apply(self, kind: FieldKind, bit: ParticleIndex) -> Option<(FockState, f64)> {
        if bit >= Self::MAX_BITS {
            return None;
        }
        let occupied = self.is_occupied(bit);
        let target = match (kind, occupied) {
            (FieldKind::Creation, false) | (FieldKind::Annihilation, true) => {
                FockState(self.0 ^ (1u64 << bit))
            }
            _ => return None,
        };
        Some((target, self.sign_below(bit)))
    }

    /// Apply a whole term, rightmost leg first.
    ///
    /// The returned amplitude includes the term's coefficient.
    pub fn apply_term(self, term: &Term) -> Option<(FockState, f64)> {
        let mut state = self;
        let mut amplitude = term.coefficient();
        for leg in term.legs().iter().rev() {
            let (next, sign) = state.apply(leg.kind, leg.bit)?;
            state = next;
            amplitude *= sign;
        }
        Some((state, amplitude))
    }

    /// Render the lowest `n_bits` occupations, bit 0 first.
    pub fn to_bit_string(self, n_bits: usize) -> String {
        (0..n_bits)
            .map(|b| if self.is_occupied(b) { '1' } else { '0' })
            .collect()
    }
}

impl fmt::Display for FockState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "|{:b}>", self.0)
    }
}
