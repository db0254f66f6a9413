//! Periodic settlement task
//!
//! Drives [`MeshState::settle`] on a fixed interval until its stop signal
//! fires. A failing or panicking tick is reported and the loop carries on
//! with the next one; nothing supervises this task, so it must not die.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::error::{MeshError, Result};
use crate::simulation::{MeshState, TickReport};

/// Counters kept by the settlement loop
#[derive(Debug, Default)]
pub struct SettlementStats {
    pub ticks: AtomicU64,
    pub failures: AtomicU64,
}

pub struct SettlementTask {
    state: MeshState,
    interval: Duration,
    stats: Arc<SettlementStats>,
}

impl SettlementTask {
    pub fn new(state: MeshState, interval: Duration) -> Self {
        Self {
            state,
            interval,
            stats: Arc::new(SettlementStats::default()),
        }
    }

    pub fn stats(&self) -> Arc<SettlementStats> {
        Arc::clone(&self.stats)
    }

    /// Run a single tick, isolating panics in their own task
    pub async fn tick(&self) -> Result<TickReport> {
        let state = self.state.clone();
        let result = tokio::spawn(async move { state.settle().await })
            .await
            .map_err(|e| MeshError::TaskAborted(e.to_string()))
            .and_then(|r| r);

        self.stats.ticks.fetch_add(1, Ordering::Relaxed);
        if result.is_err() {
            self.stats.failures.fetch_add(1, Ordering::Relaxed);
        }
        result
    }

    /// Tick until `stop` flips to `true` or its sender is dropped.
    ///
    /// The first tick fires immediately; a slow tick delays the next one
    /// instead of bursting to catch up.
    pub async fn run(self, mut stop: watch::Receiver<bool>) {
        info!(
            interval_ms = self.interval.as_millis() as u64,
            "Settlement loop started"
        );

        let mut tick = tokio::time::interval(self.interval);
        tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = tick.tick() => {
                    match self.tick().await {
                        Ok(report) => debug!(
                            data_fee_paid = report.data_fee_paid,
                            health_check_paid = report.health_check_paid,
                            dscr = ?report.dscr,
                            transition = ?report.transition,
                            "Settlement tick complete"
                        ),
                        Err(e) => error!(error = %e, "Settlement tick failed"),
                    }
                }
                changed = stop.changed() => {
                    if changed.is_err() || *stop.borrow() {
                        break;
                    }
                }
            }
        }

        info!(
            ticks = self.stats.ticks.load(Ordering::Relaxed),
            failures = self.stats.failures.load(Ordering::Relaxed),
            "Settlement loop stopped"
        );
    }

    pub fn spawn(self, stop: watch::Receiver<bool>) -> JoinHandle<()> {
        tokio::spawn(self.run(stop))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::MarketParameters;
    use crate::simulation::Simulation;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn test_tick_reports_dscr() {
        let state = MeshState::default();
        let task = SettlementTask::new(state.clone(), Duration::from_secs(3));

        let report = task.tick().await.unwrap();

        assert_eq!(report.dscr, Some(dec!(1.13)));
        assert_eq!(task.stats().ticks.load(Ordering::Relaxed), 1);
        assert_eq!(task.stats().failures.load(Ordering::Relaxed), 0);
    }

    #[tokio::test]
    async fn test_failed_tick_is_counted() {
        let state = MeshState::default();
        state
            .update_market(MarketParameters::new(dec!(0.95), dec!(50), dec!(-1)))
            .await;
        let task = SettlementTask::new(state.clone(), Duration::from_secs(3));

        assert!(task.tick().await.is_err());
        assert_eq!(task.stats().failures.load(Ordering::Relaxed), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_loop_ticks_on_interval_and_stops() {
        let state = MeshState::new(Simulation::with_defaults());
        let task = SettlementTask::new(state.clone(), Duration::from_secs(3));
        let stats = task.stats();
        let (stop_tx, stop_rx) = watch::channel(false);
        let handle = task.spawn(stop_rx);

        // Immediate first tick plus one every 3s: t=0, 3, 6
        tokio::time::sleep(Duration::from_millis(7_000)).await;
        assert_eq!(stats.ticks.load(Ordering::Relaxed), 3);

        stop_tx.send(true).unwrap();
        handle.await.unwrap();

        let snapshot = state.snapshot().await;
        assert_eq!(snapshot.wallets.data, dec!(0.03));
        assert_eq!(snapshot.wallets.covenant, dec!(0.15));
    }

    #[tokio::test(start_paused = true)]
    async fn test_loop_survives_failing_ticks() {
        let state = MeshState::default();
        state
            .update_market(MarketParameters::new(dec!(0.95), dec!(50), dec!(-1)))
            .await;
        let task = SettlementTask::new(state.clone(), Duration::from_secs(3));
        let stats = task.stats();
        let (stop_tx, stop_rx) = watch::channel(false);
        let handle = task.spawn(stop_rx);

        tokio::time::sleep(Duration::from_millis(4_000)).await;
        assert_eq!(stats.failures.load(Ordering::Relaxed), 2);

        // Operator fixes the market; the same loop recovers
        state.reset().await;
        tokio::time::sleep(Duration::from_millis(3_000)).await;
        assert_eq!(stats.ticks.load(Ordering::Relaxed), 3);
        assert_eq!(stats.failures.load(Ordering::Relaxed), 2);
        assert_eq!(state.snapshot().await.status.dscr, dec!(1.13));

        drop(stop_tx);
        handle.await.unwrap();
    }
}
