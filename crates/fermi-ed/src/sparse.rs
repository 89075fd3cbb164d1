//! Compressed sparse row and column matrices with complex values.
//!
//! A [`CsrMatrix`] and a [`CscMatrix`] holding the same entries carry the
//! same three arrays up to reinterpretation: the CSC arrays of `A` are the
//! CSR arrays of `Aᵀ`. Hermitian adjoints are therefore an O(nnz) relabel
//! plus conjugation, with no arithmetic on the stored values.

use nalgebra::DMatrix;
use num_complex::Complex64;

/// Sparse matrix in Compressed Sparse Row format.
#[derive(Debug, Clone, PartialEq)]
pub struct CsrMatrix {
    pub nrows: usize,
    pub ncols: usize,
    pub row_ptr: Vec<usize>,
    pub col_indices: Vec<usize>,
    pub values: Vec<Complex64>,
}

/// Sparse matrix in Compressed Sparse Column format.
#[derive(Debug, Clone, PartialEq)]
pub struct CscMatrix {
    pub nrows: usize,
    pub ncols: usize,
    pub col_ptr: Vec<usize>,
    pub row_indices: Vec<usize>,
    pub values: Vec<Complex64>,
}

impl CsrMatrix {
    /// Compress a dense matrix, dropping entries with `|x| < tolerance`.
    pub fn from_dense(dense: &DMatrix<Complex64>, tolerance: f64) -> Self {
        let (nrows, ncols) = dense.shape();
        let mut row_ptr = Vec::with_capacity(nrows + 1);
        let mut col_indices = Vec::new();
        let mut values = Vec::new();

        row_ptr.push(0);
        for i in 0..nrows {
            for j in 0..ncols {
                let x = dense[(i, j)];
                if x.norm() >= tolerance {
                    col_indices.push(j);
                    values.push(x);
                }
            }
            row_ptr.push(col_indices.len());
        }

        Self {
            nrows,
            ncols,
            row_ptr,
            col_indices,
            values,
        }
    }

    /// Number of stored entries.
    pub fn nnz(&self) -> usize {
        self.values.len()
    }

    /// Stored value at `(row, col)`, `None` if the entry is structurally zero.
    pub fn get(&self, row: usize, col: usize) -> Option<Complex64> {
        if row >= self.nrows {
            return None;
        }
        let range = self.row_ptr[row]..self.row_ptr[row + 1];
        self.col_indices[range.clone()]
            .binary_search(&col)
            .ok()
            .map(|offset| self.values[range.start + offset])
    }

    /// Stored entries as `(row, col, value)` in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, Complex64)> + '_ {
        (0..self.nrows).flat_map(move |i| {
            (self.row_ptr[i]..self.row_ptr[i + 1])
                .map(move |idx| (i, self.col_indices[idx], self.values[idx]))
        })
    }

    /// y = A * x.
    pub fn matvec(&self, x: &[Complex64]) -> Vec<Complex64> {
        let mut y = vec![Complex64::new(0.0, 0.0); self.nrows];
        for (i, yi) in y.iter_mut().enumerate() {
            let start = self.row_ptr[i];
            let end = self.row_ptr[i + 1];
            for idx in start..end {
                *yi += self.values[idx] * x[self.col_indices[idx]];
            }
        }
        y
    }

    pub fn to_dense(&self) -> DMatrix<Complex64> {
        let mut dense = DMatrix::zeros(self.nrows, self.ncols);
        for (i, j, x) in self.iter() {
            dense[(i, j)] = x;
        }
        dense
    }

    /// A† in column-major form, read off the row-major arrays of A.
    pub fn adjoint(&self) -> CscMatrix {
        CscMatrix {
            nrows: self.ncols,
            ncols: self.nrows,
            col_ptr: self.row_ptr.clone(),
            row_indices: self.col_indices.clone(),
            values: self.values.iter().map(Complex64::conj).collect(),
        }
    }
}

impl CscMatrix {
    /// Column-major copy of a row-major matrix (counting sort on columns).
    pub fn from_csr(csr: &CsrMatrix) -> Self {
        let mut col_ptr = vec![0usize; csr.ncols + 1];
        for &j in &csr.col_indices {
            col_ptr[j + 1] += 1;
        }
        for j in 0..csr.ncols {
            col_ptr[j + 1] += col_ptr[j];
        }

        let mut next = col_ptr.clone();
        let mut row_indices = vec![0usize; csr.nnz()];
        let mut values = vec![Complex64::new(0.0, 0.0); csr.nnz()];
        // Rows are visited in order, so each column comes out sorted by row.
        for (i, j, x) in csr.iter() {
            let slot = next[j];
            row_indices[slot] = i;
            values[slot] = x;
            next[j] += 1;
        }

        Self {
            nrows: csr.nrows,
            ncols: csr.ncols,
            col_ptr,
            row_indices,
            values,
        }
    }

    pub fn nnz(&self) -> usize {
        self.values.len()
    }

    pub fn get(&self, row: usize, col: usize) -> Option<Complex64> {
        if col >= self.ncols {
            return None;
        }
        let range = self.col_ptr[col]..self.col_ptr[col + 1];
        self.row_indices[range.clone()]
            .binary_search(&row)
            .ok()
            .map(|offset| self.values[range.start + offset])
    }

    /// Stored entries as `(row, col, value)` in column-major order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, Complex64)> + '_ {
        (0..self.ncols).flat_map(move |j| {
            (self.col_ptr[j]..self.col_ptr[j + 1])
                .map(move |idx| (self.row_indices[idx], j, self.values[idx]))
        })
    }

    /// A† in row-major form, read off the column-major arrays of A.
    pub fn adjoint(&self) -> CsrMatrix {
        CsrMatrix {
            nrows: self.ncols,
            ncols: self.nrows,
            row_ptr: self.col_ptr.clone(),
            col_indices: self.row_indices.clone(),
            values: self.values.iter().map(Complex64::conj).collect(),
        }
    }
}
