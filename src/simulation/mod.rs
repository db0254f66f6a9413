//! The single owned simulation state and the operations that mutate it.
//!
//! Everything here is synchronous and takes `&mut self`; [`MeshState`]
//! puts one lock around it for the HTTP handlers and the settlement task.

pub mod handle;
pub mod settle;

pub use handle::MeshState;
pub use settle::TickReport;

use chrono::{Local, NaiveTime};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::{AppConfig, CovenantConfig, DefaultsConfig, SettlementConfig};
use crate::domain::{
    LogBuffer, LogEntry, LogKind, MarketParameters, StatusBlock, TransferOutcome, WalletId,
    WalletSet,
};
use crate::error::TransferError;

/// Point-in-time copy of the whole simulation, as served by `GET /state`
#[derive(Debug, Clone, Serialize)]
pub struct MeshSnapshot {
    pub market: MarketParameters,
    pub wallets: WalletSet,
    pub status: StatusBlock,
    /// Newest first
    pub logs: Vec<LogEntry>,
}

pub struct Simulation {
    market: MarketParameters,
    wallets: WalletSet,
    status: StatusBlock,
    logs: LogBuffer,
    settlement: SettlementConfig,
    covenant: CovenantConfig,
    defaults: DefaultsConfig,
    clock: fn() -> NaiveTime,
}

fn local_time() -> NaiveTime {
    Local::now().time()
}

impl Simulation {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            market: config.defaults.market(),
            wallets: config.defaults.wallets(),
            status: StatusBlock::new(config.defaults.dscr),
            logs: LogBuffer::new(config.log_capacity),
            settlement: config.settlement.clone(),
            covenant: config.covenant.clone(),
            defaults: config.defaults.clone(),
            clock: local_time,
        }
    }

    /// Simulation with the built-in configuration
    pub fn with_defaults() -> Self {
        Self::new(&AppConfig::default_config())
    }

    /// Replace the wall clock used for log and status timestamps
    pub fn with_clock(mut self, clock: fn() -> NaiveTime) -> Self {
        self.clock = clock;
        self
    }

    pub fn market(&self) -> &MarketParameters {
        &self.market
    }

    pub fn wallets(&self) -> &WalletSet {
        &self.wallets
    }

    pub fn status(&self) -> &StatusBlock {
        &self.status
    }

    pub fn logs(&self) -> &LogBuffer {
        &self.logs
    }

    pub fn snapshot(&self) -> MeshSnapshot {
        MeshSnapshot {
            market: self.market,
            wallets: self.wallets.clone(),
            status: self.status.clone(),
            logs: self.logs.to_vec(),
        }
    }

    pub(crate) fn now(&self) -> NaiveTime {
        (self.clock)()
    }

    /// Append an entry to the event log and mirror it to tracing
    pub fn log(&mut self, agent: &str, message: impl Into<String>, kind: LogKind) -> u64 {
        let at = self.now();
        let entry = self.logs.push(agent, message, kind, at);
        debug!(
            id = entry.id,
            agent = %entry.agent,
            kind = %entry.kind,
            "{}",
            entry.message
        );
        entry.id
    }

    /// Move `amount` from one wallet to another.
    ///
    /// Always appends exactly one log entry: `payment` when the funds
    /// moved, `danger` when the transfer was refused.
    pub fn process_payment(
        &mut self,
        from: WalletId,
        to: WalletId,
        amount: Decimal,
        purpose: &str,
    ) -> TransferOutcome {
        match self.wallets.transfer(from, to, amount) {
            Ok(()) => {
                self.log(
                    from.as_str(),
                    format!("Paid ${} to {} for {}", amount.normalize(), to, purpose),
                    LogKind::Payment,
                );
                TransferOutcome::Settled
            }
            Err(err) => {
                let message = match &err {
                    TransferError::InsufficientFunds { .. } => {
                        format!("PAYMENT FAILED: Insufficient funds to pay {}", to)
                    }
                    TransferError::InvalidAmount { amount } => {
                        format!("PAYMENT FAILED: Invalid amount ${} to {}", amount, to)
                    }
                    TransferError::Overflow { .. } => {
                        format!("PAYMENT FAILED: {} cannot accept ${}", to, amount)
                    }
                };
                warn!(%from, %to, %amount, purpose, error = %err, "Payment refused");
                self.log(from.as_str(), message, LogKind::Danger);
                TransferOutcome::Rejected(err)
            }
        }
    }

    /// Replace all market parameters with operator-supplied values
    pub fn update_market(&mut self, market: MarketParameters) {
        self.market = market;

        let pct = market
            .occupancy_pct()
            .map(|pct| pct.to_string())
            .unwrap_or_else(|| market.occupancy.to_string());
        info!(
            occupancy = %market.occupancy,
            rent_price = %market.rent_price,
            interest_rate = %market.interest_rate,
            "Market parameters updated"
        );
        self.log(
            "Admin",
            format!("MARKET SHOCK: Occupancy set to {}%", pct),
            LogKind::Alert,
        );
    }

    /// Restore market defaults, clear safe mode and refill the treasury.
    ///
    /// Covenant and data balances, the last DSCR reading and the event log
    /// are left as they are.
    pub fn reset(&mut self) {
        self.market = self.defaults.market();
        self.status.safe_mode = false;
        self.wallets
            .set_balance(WalletId::Treasury, self.defaults.treasury);

        info!("Simulation reset to defaults");
        self.log("Admin", "Simulation Reset to Default", LogKind::Info);
    }
}

impl Default for Simulation {
    fn default() -> Self {
        Self::with_defaults()
    }
}
