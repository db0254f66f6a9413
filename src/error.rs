use rust_decimal::Decimal;
use thiserror::Error;

use crate::domain::WalletId;

/// Main error type for the agent mesh
#[derive(Error, Debug)]
pub enum MeshError {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // Serialization errors
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    // Settlement errors
    #[error("Settlement failed: {0}")]
    Settlement(String),

    #[error("Settlement task aborted: {0}")]
    TaskAborted(String),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for MeshError
pub type Result<T> = std::result::Result<T, MeshError>;

/// Reasons a wallet transfer is refused.
///
/// These never escape as hard failures: the transfer records them in the
/// event log and hands them back inside a [`TransferOutcome`](crate::domain::TransferOutcome).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransferError {
    #[error("Insufficient funds in {wallet}: available ${available}, requested ${requested}")]
    InsufficientFunds {
        wallet: WalletId,
        available: Decimal,
        requested: Decimal,
    },

    #[error("Invalid transfer amount: ${amount}")]
    InvalidAmount { amount: Decimal },

    #[error("Balance overflow crediting {wallet}")]
    Overflow { wallet: WalletId },
}
