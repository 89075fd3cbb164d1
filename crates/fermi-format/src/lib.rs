//! JSON configuration tree for lattice exact-diagonalization models.
//!
//! A model is a list of site entries (one orbital shell per entry, with its
//! couplings), optional hopping amplitudes keyed by bit-index pairs and
//! optional explicit interaction terms. This crate only parses; turning the
//! tree into bits, hopping and terms is done by `fermi-ed`.

pub mod error;
pub mod orbital;
pub mod schema;

pub use error::{ConfigError, Result};
pub use orbital::{parse_basis_kind, parse_orbital_type, BasisKind, OrbitalType};
pub use schema::{
    export_model, load_model, save_model, HoppingEntry, ModelConfig, SiteEntry, TermEntry,
};
