//! Partition of the Fock space into symmetry blocks.
//!
//! Each block holds an ordered list of occupation states; the position of a
//! state inside its block is its inner index. Lookup from state to
//! `(block, inner index)` goes through a hash map.

use crate::error::{ClassificationError, Result};
use crate::fock::FockState;
use std::collections::HashMap;

/// Identifier of a symmetry block.
pub type BlockNumber = usize;
/// Position of an occupation state inside its block.
pub type InnerIndex = usize;

/// Occupation states grouped into blocks.
#[derive(Debug, Clone)]
pub struct StatesClassification {
    bit_size: usize,
    blocks: Vec<Vec<FockState>>,
    lookup: HashMap<FockState, (BlockNumber, InnerIndex)>,
}

impl StatesClassification {
    /// Largest bit count accepted by [`StatesClassification::by_particle_number`].
    /// The whole Fock space is enumerated, so this is a memory bound.
    pub const MAX_ENUMERATED_BITS: usize = 24;

    /// Blocks of fixed total particle number: block `N` holds every state
    /// with `N` occupied bits, in ascending numeric order.
    pub fn by_particle_number(bit_size: usize) -> Result<Self> {
        if bit_size > Self::MAX_ENUMERATED_BITS {
            return Err(ClassificationError::InvalidPartition(format!(
                "{bit_size} bits exceed the enumeration limit of {}",
                Self::MAX_ENUMERATED_BITS
            )));
        }
        let mut blocks = vec![Vec::new(); bit_size + 1];
        for raw in 0..(1u64 << bit_size) {
            let state = FockState(raw);
            blocks[state.n_particles() as usize].push(state);
        }
        Self::from_blocks(bit_size, blocks)
    }

    /// Use a caller-supplied partition. States must fit in `bit_size` bits
    /// and appear at most once.
    pub fn from_blocks(bit_size: usize, blocks: Vec<Vec<FockState>>) -> Result<Self> {
        if bit_size > FockState::MAX_BITS {
            return Err(ClassificationError::InvalidPartition(format!(
                "{bit_size} bits do not fit in a {}-bit state",
                FockState::MAX_BITS
            )));
        }
        let mut lookup = HashMap::new();
        for (block, states) in blocks.iter().enumerate() {
            for (inner, &state) in states.iter().enumerate() {
                if bit_size < FockState::MAX_BITS && state.0 >> bit_size != 0 {
                    return Err(ClassificationError::InvalidPartition(format!(
                        "state {state} in block {block} uses bits beyond {bit_size}"
                    )));
                }
                if let Some((previous, _)) = lookup.insert(state, (block, inner)) {
                    return Err(ClassificationError::InvalidPartition(format!(
                        "state {state} appears in blocks {previous} and {block}"
                    )));
                }
            }
        }
        Ok(Self {
            bit_size,
            blocks,
            lookup,
        })
    }

    pub fn bit_size(&self) -> usize {
        self.bit_size
    }

    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Ordered states of a block.
    pub fn block_states(&self, block: BlockNumber) -> Result<&[FockState]> {
        self.blocks
            .get(block)
            .map(Vec::as_slice)
            .ok_or(ClassificationError::UnknownBlock(block))
    }

    pub fn block_size(&self, block: BlockNumber) -> Result<usize> {
        self.block_states(block).map(<[FockState]>::len)
    }

    /// Block and inner index of a state, `None` if the partition does not
    /// contain it.
    pub fn find(&self, state: FockState) -> Option<(BlockNumber, InnerIndex)> {
        self.lookup.get(&state).copied()
    }
}
