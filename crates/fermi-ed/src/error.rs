//! Error types for fermi-ed.

use crate::field_operator::PartKey;
use crate::states::BlockNumber;
use fermi_format::ConfigError;
use thiserror::Error;

/// Errors of the bit classification and of the state partition it feeds.
#[derive(Debug, Error)]
pub enum ClassificationError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Bit classification accessed before a successful readin()")]
    NotInitialized,

    #[error("Invalid state partition: {0}")]
    InvalidPartition(String),

    #[error("Unknown block {0}")]
    UnknownBlock(BlockNumber),

    #[error("Block {block} Hamiltonian is not Hermitian (max deviation {deviation:e})")]
    NotHermitian { block: BlockNumber, deviation: f64 },
}

/// Errors of field-operator parts. Every variant names the operator and
/// the block pair it was built for.
#[derive(Debug, Error)]
pub enum OpError {
    #[error("Block mismatch for {key}: {reason}")]
    BlockMismatch { key: PartKey, reason: String },

    #[error("Operator undefined for {key}: only {index_size} particle indices are known")]
    OperatorUndefined { key: PartKey, index_size: usize },

    #[error("{0} is already computed")]
    AlreadyComputed(PartKey),

    #[error("{0} is not computed")]
    NotComputed(PartKey),

    #[error("{0} is not registered")]
    NotRegistered(PartKey),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ClassificationError>;

pub type OpResult<T> = std::result::Result<T, OpError>;
