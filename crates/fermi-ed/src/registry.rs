//! Collection of operator parts keyed by operator and block pair.
//!
//! The registry owns every part, computes them in parallel and resolves
//! Hermitian-adjoint pairs: the dual of a computed part is built from its
//! storage by [`FieldOperatorPart::transpose`] instead of being recomputed.

use crate::diag::EigenBlock;
use crate::error::{OpError, OpResult};
use crate::field_operator::{FieldOperatorPart, PartKey};
use crate::fock::FieldKind;
use crate::index::IndexClassification;
use crate::states::{BlockNumber, StatesClassification};
use log::debug;
use rayon::prelude::*;
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Default)]
pub struct OperatorPartRegistry<'a> {
    parts: BTreeMap<PartKey, FieldOperatorPart<'a>>,
}

impl<'a> OperatorPartRegistry<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// One part of `kind` for every particle index and every pair of
    /// eigenblocks the bare operator connects.
    pub fn connected(
        index_info: &'a IndexClassification,
        states: &'a StatesClassification,
        blocks: &'a [EigenBlock],
        kind: FieldKind,
    ) -> Self {
        let by_number: BTreeMap<BlockNumber, &'a EigenBlock> =
            blocks.iter().map(|b| (b.block(), b)).collect();
        let mut registry = Self::new();

        for from in blocks {
            let Ok(from_states) = states.block_states(from.block()) else {
                continue;
            };
            for index in 0..index_info.index_size() {
                let targets: BTreeSet<BlockNumber> = from_states
                    .iter()
                    .filter_map(|s| s.apply(kind, index))
                    .filter_map(|(target, _)| states.find(target))
                    .map(|(block, _)| block)
                    .collect();
                for to in targets.iter().filter_map(|b| by_number.get(b).copied()) {
                    registry.insert(FieldOperatorPart::new(
                        kind, index_info, states, from, to, index,
                    ));
                }
            }
        }
        debug!("{} {kind} parts connect {} eigenblocks", registry.len(), blocks.len());
        registry
    }

    /// Register a part, returning the one it replaces.
    pub fn insert(&mut self, part: FieldOperatorPart<'a>) -> Option<FieldOperatorPart<'a>> {
        self.parts.insert(part.key(), part)
    }

    pub fn get(&self, key: &PartKey) -> Option<&FieldOperatorPart<'a>> {
        self.parts.get(key)
    }

    pub fn contains(&self, key: &PartKey) -> bool {
        self.parts.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &PartKey> {
        self.parts.keys()
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Compute every part that is not computed yet, in parallel.
    ///
    /// Parts only read shared, immutable inputs, so they run independently.
    /// The first error is returned; parts finished before it stay computed.
    pub fn compute_all(&mut self) -> OpResult<()> {
        self.parts
            .par_iter_mut()
            .filter(|(_, part)| !part.is_computed())
            .try_for_each(|(_, part)| part.compute())
    }

    /// The Hermitian adjoint of a registered part.
    ///
    /// Returns the dual if it is already registered; otherwise builds it
    /// by transposing the computed part under `key` and registers it.
    pub fn get_or_build_dual(&mut self, key: &PartKey) -> OpResult<&FieldOperatorPart<'a>> {
        let dual = key.dual();
        if !self.parts.contains_key(&dual) {
            let part = self.parts.get(key).ok_or(OpError::NotRegistered(*key))?;
            let built = part.transpose()?;
            debug!("built {dual} as the adjoint of {key}");
            self.parts.insert(dual, built);
        }
        self.parts.get(&dual).ok_or(OpError::NotRegistered(dual))
    }
}
