//! Dense eigendecomposition of block Hamiltonians.
//!
//! Uses nalgebra's `SymmetricEigen` for real symmetric matrices. The
//! eigenvectors are stored as complex columns so that the field-operator
//! rotation works on one matrix type.

use crate::states::BlockNumber;
use log::debug;
use nalgebra::DMatrix;
use num_complex::Complex64;

/// Eigenvalues and eigenvectors of one symmetry block.
#[derive(Debug, Clone)]
pub struct EigenBlock {
    block: BlockNumber,
    /// Eigenvalues in ascending order.
    pub energies: Vec<f64>,
    /// Column `n` is eigenvector `n` over the block's ordered occupation states.
    pub eigenvectors: DMatrix<Complex64>,
}

impl EigenBlock {
    /// Wrap an externally computed eigenbasis.
    pub fn new(block: BlockNumber, energies: Vec<f64>, eigenvectors: DMatrix<Complex64>) -> Self {
        Self {
            block,
            energies,
            eigenvectors,
        }
    }

    pub fn block(&self) -> BlockNumber {
        self.block
    }

    /// Number of eigenstates.
    pub fn dim(&self) -> usize {
        self.energies.len()
    }

    /// Lowest energy, `None` for an empty block.
    pub fn ground_energy(&self) -> Option<f64> {
        self.energies.first().copied()
    }
}

/// Diagonalize a real symmetric block Hamiltonian.
pub fn diagonalize_block(block: BlockNumber, h: &DMatrix<f64>) -> EigenBlock {
    if h.nrows() == 0 {
        return EigenBlock::new(block, Vec::new(), DMatrix::zeros(0, 0));
    }
    let eig = h.clone().symmetric_eigen();

    // Sort by eigenvalue.
    let mut order: Vec<usize> = (0..eig.eigenvalues.len()).collect();
    order.sort_by(|&a, &b| eig.eigenvalues[a].total_cmp(&eig.eigenvalues[b]));

    let energies: Vec<f64> = order.iter().map(|&i| eig.eigenvalues[i]).collect();
    let eigenvectors = DMatrix::from_fn(h.nrows(), order.len(), |row, col| {
        Complex64::new(eig.eigenvectors[(row, order[col])], 0.0)
    });
    debug!(
        "block {block}: {} eigenvalues, ground energy {:?}",
        energies.len(),
        energies.first()
    );

    EigenBlock::new(block, energies, eigenvectors)
}
