//! Interaction terms: products of creation/annihilation operators.

use crate::fock::{FieldKind, ParticleIndex};
use std::collections::BTreeMap;
use std::fmt;

/// One operator factor of a term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Leg {
    pub kind: FieldKind,
    pub bit: ParticleIndex,
}

impl Leg {
    pub fn creation(bit: ParticleIndex) -> Self {
        Self {
            kind: FieldKind::Creation,
            bit,
        }
    }

    pub fn annihilation(bit: ParticleIndex) -> Self {
        Self {
            kind: FieldKind::Annihilation,
            bit,
        }
    }
}

/// `coefficient · O_1 O_2 … O_order`, applied right to left.
#[derive(Debug, Clone, PartialEq)]
pub struct Term {
    legs: Vec<Leg>,
    coefficient: f64,
}

impl Term {
    /// Allowed operator orders, one bucket each in [`TermsList`].
    pub const ORDERS: [usize; 5] = [2, 4, 6, 8, 10];

    /// Build `coefficient · c†_{c0} c†_{c1} … c_{a0} c_{a1} …`.
    ///
    /// Returns `None` unless both sides have the same length and the total
    /// order is one of [`Term::ORDERS`].
    pub fn normal_ordered(
        creation: &[ParticleIndex],
        annihilation: &[ParticleIndex],
        coefficient: f64,
    ) -> Option<Self> {
        let order = creation.len() + annihilation.len();
        if creation.len() != annihilation.len() || !Self::ORDERS.contains(&order) {
            return None;
        }
        let legs = creation
            .iter()
            .map(|&b| Leg::creation(b))
            .chain(annihilation.iter().map(|&b| Leg::annihilation(b)))
            .collect();
        Some(Self { legs, coefficient })
    }

    /// `coefficient · c†_{c0} c†_{c1} c_{a0} c_{a1}`.
    pub(crate) fn two_body(c0: usize, c1: usize, a0: usize, a1: usize, coefficient: f64) -> Self {
        Self {
            legs: vec![
                Leg::creation(c0),
                Leg::creation(c1),
                Leg::annihilation(a0),
                Leg::annihilation(a1),
            ],
            coefficient,
        }
    }

    /// `coefficient · c†_i c_j`.
    pub(crate) fn one_body(i: usize, j: usize, coefficient: f64) -> Self {
        Self {
            legs: vec![Leg::creation(i), Leg::annihilation(j)],
            coefficient,
        }
    }

    /// Number of operator legs.
    pub fn order(&self) -> usize {
        self.legs.len()
    }

    pub fn legs(&self) -> &[Leg] {
        &self.legs
    }

    pub fn coefficient(&self) -> f64 {
        self.coefficient
    }

    /// Bit indices in leg order.
    pub fn bits(&self) -> impl Iterator<Item = ParticleIndex> + '_ {
        self.legs.iter().map(|leg| leg.bit)
    }

    /// All creation legs precede all annihilation legs.
    pub fn is_normal_ordered(&self) -> bool {
        let first_annihilation = self
            .legs
            .iter()
            .position(|leg| leg.kind == FieldKind::Annihilation)
            .unwrap_or(self.legs.len());
        self.legs[first_annihilation..]
            .iter()
            .all(|leg| leg.kind == FieldKind::Annihilation)
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.coefficient)?;
        for leg in &self.legs {
            write!(f, " {}_{}", leg.kind.symbol(), leg.bit)?;
        }
        Ok(())
    }
}

/// Accumulates two-body terms in a canonical form so that equivalent
/// operator orderings merge into one term.
///
/// Canonical form: creation bits ascending, annihilation bits descending
/// (so `n_i n_j` reads `c†_i c†_j c_j c_i`), each swap flipping the sign.
#[derive(Debug, Default)]
pub(crate) struct TwoBodyAccumulator {
    terms: BTreeMap<(usize, usize, usize, usize), f64>,
}

impl TwoBodyAccumulator {
    /// Add `value · c†_{c0} c†_{c1} c_{a0} c_{a1}`. Vanishing operators
    /// (repeated creation or annihilation bit) are dropped.
    pub fn add(&mut self, c0: usize, c1: usize, a0: usize, a1: usize, value: f64) {
        if c0 == c1 || a0 == a1 {
            return;
        }
        let mut sign = 1.0;
        let (c0, c1) = if c0 < c1 {
            (c0, c1)
        } else {
            sign = -sign;
            (c1, c0)
        };
        let (a0, a1) = if a0 > a1 {
            (a0, a1)
        } else {
            sign = -sign;
            (a1, a0)
        };
        *self.terms.entry((c0, c1, a0, a1)).or_insert(0.0) += sign * value;
    }

    /// Emit the merged terms, dropping coefficients below `threshold`.
    pub fn into_terms(self, threshold: f64) -> Vec<Term> {
        self.terms
            .into_iter()
            .filter(|(_, value)| value.abs() >= threshold)
            .map(|((c0, c1, a0, a1), value)| Term::two_body(c0, c1, a0, a1, value))
            .collect()
    }
}

/// Terms grouped by operator order (2, 4, 6, 8, 10).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TermsList {
    buckets: [Vec<Term>; 5],
}

impl TermsList {
    pub fn new() -> Self {
        Self::default()
    }

    fn bucket_of(order: usize) -> Option<usize> {
        Term::ORDERS.iter().position(|&o| o == order)
    }

    /// Append a term to the bucket of its order.
    pub fn push(&mut self, term: Term) {
        // Terms can only be built with an allowed order.
        if let Some(bucket) = Self::bucket_of(term.order()) {
            self.buckets[bucket].push(term);
        }
    }

    /// Terms of the given order, in insertion order. Empty for orders
    /// outside [`Term::ORDERS`].
    pub fn of_order(&self, order: usize) -> &[Term] {
        match Self::bucket_of(order) {
            Some(bucket) => &self.buckets[bucket],
            None => &[],
        }
    }

    /// All terms, lowest order first.
    pub fn iter(&self) -> impl Iterator<Item = &Term> {
        self.buckets.iter().flatten()
    }

    pub fn len(&self) -> usize {
        self.buckets.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Extend<Term> for TermsList {
    fn extend<I: IntoIterator<Item = Term>>(&mut self, iter: I) {
        for term in iter {
            self.push(term);
        }
    }
}

impl fmt::Display for TermsList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (order, bucket) in Term::ORDERS.iter().zip(&self.buckets) {
            writeln!(f, "Terms of order {order} ({}):", bucket.len())?;
            for term in bucket {
                writeln!(f, "  {term}")?;
            }
        }
        Ok(())
    }
}
