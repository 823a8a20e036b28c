//! Shared error types

use thiserror::Error;

/// Core errors shared between the client and the browser bindings
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("invalid pick address: {0}")]
    InvalidAddress(String),

    #[error("expected between 1 and {max} valid picks, got {got}")]
    PickCount { got: usize, max: u32 },

    #[error("entry fee must be greater than zero")]
    ZeroEntryFee,

    #[error("invalid token amount: {0}")]
    InvalidAmount(String),

    #[error("unknown league status: {0}")]
    UnknownStatus(u8),

    #[error("inconsistent snapshot: {0}")]
    InconsistentSnapshot(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl CoreError {
    /// Validation errors are raised locally and never reach the escrow contract.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            CoreError::Validation(_)
                | CoreError::InvalidAddress(_)
                | CoreError::PickCount { .. }
                | CoreError::ZeroEntryFee
                | CoreError::InvalidAmount(_)
        )
    }
}
