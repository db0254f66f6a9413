pub mod covenant;
pub mod log;
pub mod market;
pub mod state;
pub mod wallet;

pub use covenant::compute_dscr;
pub use log::*;
pub use market::*;
pub use state::*;
pub use wallet::*;

use crate::error::TransferError;

/// Result of a single wallet transfer attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferOutcome {
    Settled,
    Rejected(TransferError),
}

impl TransferOutcome {
    pub fn is_settled(&self) -> bool {
        matches!(self, TransferOutcome::Settled)
    }
}
