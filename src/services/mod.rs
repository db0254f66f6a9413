pub mod server;
pub mod settlement;

pub use settlement::{SettlementStats, SettlementTask};
