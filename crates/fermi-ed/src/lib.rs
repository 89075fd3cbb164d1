//! Algebraic core of a fermionic exact-diagonalization solver.
//!
//! A lattice model is described by a configuration of sites and orbital
//! shells (see `fermi-format`). This crate turns it into the objects the
//! solver works with:
//!
//! # Modules
//!
//! - [`classification`]: bits, hopping matrix and interaction terms
//! - [`coulomb`]: s and p shell interactions, native and spherical bases
//! - [`fock`]: occupation-number states and operator signs
//! - [`index`]: particle-index lookup
//! - [`states`]: partition of the Fock space into symmetry blocks
//! - [`hamiltonian`]: dense block Hamiltonians
//! - [`diag`]: block eigendecomposition
//! - [`field_operator`]: creation/annihilation parts in the eigenbasis
//! - [`registry`]: part collection, parallel compute, adjoint pairs

pub mod bits;
pub mod classification;
pub mod coulomb;
pub mod diag;
pub mod error;
pub mod field_operator;
pub mod fock;
pub mod hamiltonian;
pub mod index;
pub mod registry;
pub mod sparse;
pub mod states;
pub mod term;

pub use bits::{BitInfo, Orbital};
pub use classification::BitClassification;
pub use diag::{diagonalize_block, EigenBlock};
pub use error::{ClassificationError, OpError, OpResult, Result};
pub use field_operator::{FieldOperatorPart, PartKey, Status, MATRIX_ELEMENT_TOLERANCE};
pub use fock::{FieldKind, FockState, ParticleIndex};
pub use hamiltonian::build_block_hamiltonian;
pub use index::IndexClassification;
pub use registry::OperatorPartRegistry;
pub use sparse::{CscMatrix, CsrMatrix};
pub use states::{BlockNumber, InnerIndex, StatesClassification};
pub use term::{Leg, Term, TermsList};
