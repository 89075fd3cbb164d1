//! fermi — exact diagonalization of fermionic lattice models.
//!
//! This is the umbrella crate that provides [`EdModel`] and re-exports the
//! configuration layer and the algebraic core.

pub use fermi_ed::{self, *};
pub use fermi_format::{self, load_model, ModelConfig, SiteEntry};

use log::info;
use rayon::prelude::*;

/// A classified model with the eigenbasis of every particle-number block.
#[derive(Debug)]
pub struct EdModel {
    classification: BitClassification,
    index: IndexClassification,
    states: StatesClassification,
    blocks: Vec<EigenBlock>,
}

impl EdModel {
    /// Classify the configuration, then build and diagonalize every block.
    pub fn from_config(config: ModelConfig) -> Result<Self> {
        let mut classification = BitClassification::new(config);
        classification.readin()?;
        let index = IndexClassification::from_classification(&classification)?;
        let states = StatesClassification::by_particle_number(classification.bit_size()?)?;

        let hopping = classification.hopping_matrix()?;
        let terms = classification.terms()?;
        let blocks = (0..states.block_count())
            .into_par_iter()
            .map(|block| {
                let h = build_block_hamiltonian(hopping, terms, &states, block)?;
                Ok(diagonalize_block(block, &h))
            })
            .collect::<Result<Vec<_>>>()?;

        info!(
            "{} bits, {} blocks, {} terms",
            index.index_size(),
            blocks.len(),
            terms.len()
        );
        Ok(Self {
            classification,
            index,
            states,
            blocks,
        })
    }

    /// Read a JSON configuration and build the model.
    pub fn load(path: &str) -> Result<Self> {
        Self::from_config(load_model(path)?)
    }

    pub fn classification(&self) -> &BitClassification {
        &self.classification
    }

    pub fn index(&self) -> &IndexClassification {
        &self.index
    }

    pub fn states(&self) -> &StatesClassification {
        &self.states
    }

    /// Eigenblocks ordered by block number (= particle number).
    pub fn blocks(&self) -> &[EigenBlock] {
        &self.blocks
    }

    /// Lowest energy over all blocks.
    pub fn ground_energy(&self) -> Option<f64> {
        self.blocks
            .iter()
            .filter_map(EigenBlock::ground_energy)
            .min_by(f64::total_cmp)
    }

    /// Every connected part of `kind`, not yet computed.
    pub fn parts(&self, kind: FieldKind) -> OperatorPartRegistry<'_> {
        OperatorPartRegistry::connected(&self.index, &self.states, &self.blocks, kind)
    }
}
