//! Dense block Hamiltonian of a fermionic lattice model.
//!
//! The Hamiltonian is
//!
//!   H = Σ_{ij} t_ij c†_i c_j + Σ_terms coefficient · O_1 … O_order
//!
//! restricted to one symmetry block. Matrix element `(l, k)` is
//! `<l|H|k>` over the block's ordered occupation states.

use crate::error::{ClassificationError, Result};
use crate::fock::{FieldKind, FockState};
use crate::states::{BlockNumber, StatesClassification};
use crate::term::TermsList;
use log::debug;
use nalgebra::DMatrix;

/// Relative tolerance of the symmetry check on the assembled block.
const SYMMETRY_TOLERANCE: f64 = 1e-10;

/// Build the Hamiltonian of one block as a dense matrix.
///
/// Fails with [`ClassificationError::UnknownBlock`] for an unknown block and
/// with [`ClassificationError::InvalidPartition`] when a term connects the
/// block to a state outside it. A block that is not symmetric, for example
/// from an explicit term given without its conjugate, is
/// [`ClassificationError::NotHermitian`].
pub fn build_block_hamiltonian(
    hopping: &DMatrix<f64>,
    terms: &TermsList,
    states: &StatesClassification,
    block: BlockNumber,
) -> Result<DMatrix<f64>> {
    let basis = states.block_states(block)?;
    let dim = basis.len();
    let mut h = DMatrix::zeros(dim, dim);

    add_hopping_term(&mut h, hopping, states, block, basis)?;
    add_interaction_terms(&mut h, terms, states, block, basis)?;

    let deviation = (&h - h.transpose()).amax();
    if deviation > SYMMETRY_TOLERANCE * h.amax().max(1.0) {
        return Err(ClassificationError::NotHermitian { block, deviation });
    }
    debug!("block {block}: {dim}x{dim} Hamiltonian");
    Ok(h)
}

/// Place `amplitude` at `<target|H|source>`, checking the target stays in
/// the block.
fn deposit(
    h: &mut DMatrix<f64>,
    states: &StatesClassification,
    block: BlockNumber,
    source: usize,
    target: FockState,
    amplitude: f64,
) -> Result<()> {
    match states.find(target) {
        Some((b, inner)) if b == block => {
            h[(inner, source)] += amplitude;
            Ok(())
        }
        _ => Err(ClassificationError::InvalidPartition(format!(
            "Hamiltonian connects block {block} to state {target} outside it"
        ))),
    }
}

/// Add Σ t_ij c†_i c_j.
fn add_hopping_term(
    h: &mut DMatrix<f64>,
    hopping: &DMatrix<f64>,
    states: &StatesClassification,
    block: BlockNumber,
    basis: &[FockState],
) -> Result<()> {
    for (k, &state) in basis.iter().enumerate() {
        for j in 0..hopping.ncols() {
            let Some((removed, sign_j)) = state.apply(FieldKind::Annihilation, j) else {
                continue;
            };
            for i in 0..hopping.nrows() {
                let t = hopping[(i, j)];
                if t == 0.0 {
                    continue;
                }
                if let Some((target, sign_i)) = removed.apply(FieldKind::Creation, i) {
                    deposit(h, states, block, k, target, t * sign_i * sign_j)?;
                }
            }
        }
    }
    Ok(())
}

/// Add every term of every order.
fn add_interaction_terms(
    h: &mut DMatrix<f64>,
    terms: &TermsList,
    states: &StatesClassification,
    block: BlockNumber,
    basis: &[FockState],
) -> Result<()> {
    for term in terms.iter() {
        for (k, &state) in basis.iter().enumerate() {
            if let Some((target, amplitude)) = state.apply_term(term) {
                deposit(h, states, block, k, target, amplitude)?;
            }
        }
    }
    Ok(())
}
