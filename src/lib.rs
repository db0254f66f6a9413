pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod services;
pub mod simulation;

pub use config::AppConfig;
pub use domain::{
    CovenantMode, LogEntry, LogKind, MarketParameters, SafeModeTransition, StatusBlock,
    TransferOutcome, WalletId, WalletSet,
};
pub use error::{MeshError, Result, TransferError};
pub use services::{SettlementStats, SettlementTask};
pub use simulation::{MeshSnapshot, MeshState, Simulation, TickReport};
