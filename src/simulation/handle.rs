use rust_decimal::Decimal;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::{MeshSnapshot, Simulation, TickReport};
use crate::domain::{MarketParameters, TransferOutcome, WalletId};
use crate::error::Result;

/// Shared handle to the simulation.
///
/// Every operation takes the lock for its whole duration, so a transfer's
/// balance check and its debit/credit can never interleave with another
/// caller, and a settlement tick is observed all-or-nothing.
#[derive(Clone)]
pub struct MeshState {
    inner: Arc<RwLock<Simulation>>,
}

impl MeshState {
    pub fn new(simulation: Simulation) -> Self {
        Self {
            inner: Arc::new(RwLock::new(simulation)),
        }
    }

    pub async fn snapshot(&self) -> MeshSnapshot {
        self.inner.read().await.snapshot()
    }

    pub async fn process_payment(
        &self,
        from: WalletId,
        to: WalletId,
        amount: Decimal,
        purpose: &str,
    ) -> TransferOutcome {
        self.inner
            .write()
            .await
            .process_payment(from, to, amount, purpose)
    }

    pub async fn update_market(&self, market: MarketParameters) {
        self.inner.write().await.update_market(market);
    }

    pub async fn reset(&self) {
        self.inner.write().await.reset();
    }

    /// Run one settlement tick under the write lock
    pub async fn settle(&self) -> Result<TickReport> {
        self.inner.write().await.settle()
    }

    /// Run `f` against the simulation under the read lock
    pub async fn read<R>(&self, f: impl FnOnce(&Simulation) -> R) -> R {
        f(&*self.inner.read().await)
    }
}

impl Default for MeshState {
    fn default() -> Self {
        Self::new(Simulation::with_defaults())
    }
}
