//! Error types for asset parsing, minting, storage, and piloting.

use thiserror::Error;

/// Errors raised while decoding STL/OBJ mesh files.
#[derive(Error, Debug)]
pub enum MeshParseError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("truncated file: expected {expected} bytes, found {found}")]
    Truncated { expected: usize, found: usize },

    #[error("line {line}: {reason}")]
    Malformed { line: usize, reason: String },

    #[error("mesh contains no triangles")]
    Empty,
}

/// Failures of a single value-transfer attempt. None of them are retried.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransactionError {
    #[error("invalid price {0:?}")]
    InvalidPrice(String),

    #[error("could not fetch recent blockhash: {0}")]
    Blockhash(String),

    #[error("signing failed: {0}")]
    Signing(String),

    #[error("submission failed: {0}")]
    Submission(String),

    #[error("confirmation failed: {0}")]
    Confirmation(String),

    #[error("transaction {0} reverted")]
    Reverted(String),

    #[error("cancelled")]
    Cancelled,
}

/// Outcome of asking to mint: either no wallet, or the transfer itself failed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MintError {
    #[error("Please connect your wallet first")]
    WalletNotConnected,

    #[error(transparent)]
    Transaction(#[from] TransactionError),
}

/// Errors reading or writing the persisted ownership record.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PilotError {
    #[error("{0} is not owned")]
    NotOwned(String),

    #[error("no model is being piloted")]
    NotPiloting,

    #[error("reward locked: {remaining:.1} more units to travel")]
    RewardLocked { remaining: f32 },

    #[error("reward already claimed")]
    AlreadyClaimed,
}
