//! Block parts of creation and annihilation operators in the eigenbasis.
//!
//! A part is the matrix of `c†_i` or `c_i` between two symmetry blocks,
//! rotated into the eigenbases of both:
//!
//!   <n_to| O |m_from> = Σ_{l,k} conj(U_to[l, n]) · O_{lk} · U_from[k, m]
//!
//! The bare operator `O_{lk}` has at most one nonzero per column (a single
//! bit flip), so the sum runs over the `(l, k)` support only. Elements with
//! `|x| < MATRIX_ELEMENT_TOLERANCE` are not stored.
//!
//! Each part keeps its elements twice: row-major for `O |ψ>` products and
//! column-major for `<ψ| O`. The Hermitian adjoint of a computed part is
//! obtained from these arrays alone (see [`FieldOperatorPart::transpose`]).

use crate::diag::EigenBlock;
use crate::error::{OpError, OpResult};
use crate::fock::{FieldKind, ParticleIndex};
use crate::index::IndexClassification;
use crate::sparse::{CscMatrix, CsrMatrix};
use crate::states::{BlockNumber, StatesClassification};
use log::debug;
use nalgebra::DMatrix;
use num_complex::Complex64;
use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Elements below this magnitude are dropped from the sparse storage.
pub const MATRIX_ELEMENT_TOLERANCE: f64 = 1e-8;

/// Identity of a part: operator kind, particle index and block pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PartKey {
    pub kind: FieldKind,
    pub index: ParticleIndex,
    /// Right (ket) block.
    pub from: BlockNumber,
    /// Left (bra) block.
    pub to: BlockNumber,
}

impl PartKey {
    /// Key of the Hermitian adjoint: dual kind, swapped blocks.
    pub fn dual(self) -> Self {
        Self {
            kind: self.kind.dual(),
            index: self.index,
            from: self.to,
            to: self.from,
        }
    }
}

impl fmt::Display for PartKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}_{} [{} -> {}]",
            self.kind.symbol(),
            self.index,
            self.from,
            self.to
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Constructed,
    Computed,
}

#[derive(Debug, Clone, PartialEq)]
struct Elements {
    row_major: CsrMatrix,
    col_major: CscMatrix,
}

/// Matrix of one field operator between two eigenblocks.
#[derive(Debug, Clone)]
pub struct FieldOperatorPart<'a> {
    kind: FieldKind,
    index: ParticleIndex,
    index_info: &'a IndexClassification,
    states: &'a StatesClassification,
    from: &'a EigenBlock,
    to: &'a EigenBlock,
    elements: Option<Elements>,
}

impl<'a> FieldOperatorPart<'a> {
    pub fn new(
        kind: FieldKind,
        index_info: &'a IndexClassification,
        states: &'a StatesClassification,
        from: &'a EigenBlock,
        to: &'a EigenBlock,
        index: ParticleIndex,
    ) -> Self {
        Self {
            kind,
            index,
            index_info,
            states,
            from,
            to,
            elements: None,
        }
    }

    /// Part of `c†_index` taking `from` to `to`.
    pub fn creation(
        index_info: &'a IndexClassification,
        states: &'a StatesClassification,
        from: &'a EigenBlock,
        to: &'a EigenBlock,
        index: ParticleIndex,
    ) -> Self {
        Self::new(FieldKind::Creation, index_info, states, from, to, index)
    }

    /// Part of `c_index` taking `from` to `to`.
    pub fn annihilation(
        index_info: &'a IndexClassification,
        states: &'a StatesClassification,
        from: &'a EigenBlock,
        to: &'a EigenBlock,
        index: ParticleIndex,
    ) -> Self {
        Self::new(FieldKind::Annihilation, index_info, states, from, to, index)
    }

    pub fn key(&self) -> PartKey {
        PartKey {
            kind: self.kind,
            index: self.index,
            from: self.from.block(),
            to: self.to.block(),
        }
    }

    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    pub fn index(&self) -> ParticleIndex {
        self.index
    }

    pub fn status(&self) -> Status {
        if self.elements.is_some() {
            Status::Computed
        } else {
            Status::Constructed
        }
    }

    pub fn is_computed(&self) -> bool {
        self.elements.is_some()
    }

    /// Block of the bra side (rows).
    pub fn left_index(&self) -> BlockNumber {
        self.to.block()
    }

    /// Block of the ket side (columns).
    pub fn right_index(&self) -> BlockNumber {
        self.from.block()
    }

    /// Check that an eigenblock matches the state partition.
    fn check_block(&self, eigen: &EigenBlock, side: &str) -> OpResult<usize> {
        let block = eigen.block();
        let dim = self
            .states
            .block_size(block)
            .map_err(|_| OpError::BlockMismatch {
                key: self.key(),
                reason: format!("{side} block {block} is not in the state partition"),
            })?;
        let (rows, cols) = eigen.eigenvectors.shape();
        if rows != dim || cols != eigen.dim() {
            return Err(OpError::BlockMismatch {
                key: self.key(),
                reason: format!(
                    "{side} block {block} has {dim} states but a {rows}x{cols} eigenvector matrix for {} energies",
                    eigen.dim()
                ),
            });
        }
        Ok(dim)
    }

    /// Compute and store the matrix elements. Runs once per part.
    pub fn compute(&mut self) -> OpResult<()> {
        let key = self.key();
        if self.elements.is_some() {
            return Err(OpError::AlreadyComputed(key));
        }
        if self.index >= self.index_info.index_size() {
            return Err(OpError::OperatorUndefined {
                key,
                index_size: self.index_info.index_size(),
            });
        }
        self.check_block(self.from, "from")?;
        let to_dim = self.check_block(self.to, "to")?;

        let from_states = self
            .states
            .block_states(self.from.block())
            .map_err(|_| OpError::BlockMismatch {
                key,
                reason: "from block vanished from the state partition".to_string(),
            })?;

        // O · U_from, touching only the rows O maps onto.
        let u_from = &self.from.eigenvectors;
        let mut image = DMatrix::<Complex64>::zeros(to_dim, u_from.ncols());
        let mut support = 0usize;
        for (k, &state) in from_states.iter().enumerate() {
            let Some((target, sign)) = state.apply(self.kind, self.index) else {
                continue;
            };
            let Some((block, l)) = self.states.find(target) else {
                continue;
            };
            if block != self.to.block() {
                continue;
            }
            support += 1;
            for m in 0..u_from.ncols() {
                image[(l, m)] += u_from[(k, m)] * sign;
            }
        }

        let rotated = self.to.eigenvectors.adjoint() * image;
        let row_major = CsrMatrix::from_dense(&rotated, MATRIX_ELEMENT_TOLERANCE);
        let col_major = CscMatrix::from_csr(&row_major);

        if row_major.nnz() == 0 {
            debug!("{key}: no elements above tolerance");
        } else {
            debug!(
                "{key}: {} bare transitions, {} stored elements",
                support,
                row_major.nnz()
            );
        }
        self.elements = Some(Elements {
            row_major,
            col_major,
        });
        Ok(())
    }

    fn elements(&self) -> OpResult<&Elements> {
        self.elements
            .as_ref()
            .ok_or_else(|| OpError::NotComputed(self.key()))
    }

    /// Row-major storage: row `n` of the `to` block, column `m` of the `from` block.
    pub fn row_major_value(&self) -> OpResult<&CsrMatrix> {
        Ok(&self.elements()?.row_major)
    }

    /// Column-major storage of the same elements.
    pub fn col_major_value(&self) -> OpResult<&CscMatrix> {
        Ok(&self.elements()?.col_major)
    }

    /// `<n_to| O |m_from>`, zero where nothing is stored.
    pub fn element(&self, n: usize, m: usize) -> OpResult<Complex64> {
        Ok(self
            .elements()?
            .row_major
            .get(n, m)
            .unwrap_or_else(|| Complex64::new(0.0, 0.0)))
    }

    /// Hermitian adjoint as a computed part of the dual operator.
    ///
    /// The column-major arrays of this part are the row-major arrays of its
    /// adjoint and vice versa; only the values are conjugated. No matrix
    /// element is recomputed, so the result is exact.
    pub fn transpose(&self) -> OpResult<FieldOperatorPart<'a>> {
        let elements = self.elements()?;
        Ok(FieldOperatorPart {
            kind: self.kind.dual(),
            index: self.index,
            index_info: self.index_info,
            states: self.states,
            from: self.to,
            to: self.from,
            elements: Some(Elements {
                row_major: elements.col_major.adjoint(),
                col_major: elements.row_major.adjoint(),
            }),
        })
    }

    /// Write the stored elements as `n m re im` lines in row-major order.
    pub fn savetxt(&self, path: impl AsRef<Path>) -> OpResult<()> {
        let elements = self.elements()?;
        let mut out = BufWriter::new(File::create(path)?);
        for (n, m, x) in elements.row_major.iter() {
            writeln!(out, "{n} {m} {:e} {:e}", x.re, x.im)?;
        }
        out.flush()?;
        Ok(())
    }
}

impl fmt::Display for FieldOperatorPart<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.elements {
            None => write!(f, "{} (not computed)", self.key()),
            Some(elements) => {
                writeln!(f, "{} ({} elements)", self.key(), elements.row_major.nnz())?;
                for (n, m, x) in elements.row_major.iter() {
                    writeln!(f, "  {n} {m} : {x}")?;
                }
                Ok(())
            }
        }
    }
}
