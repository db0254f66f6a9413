use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{info, warn};

use super::Simulation;
use crate::domain::{compute_dscr, LogKind, SafeModeTransition, TransferOutcome, WalletId};
use crate::error::Result;

pub const DATA_FEE_PURPOSE: &str = "Market Data Feed";
pub const HEALTH_CHECK_PURPOSE: &str = "DSCR Health Check";

/// What a single settlement tick did
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TickReport {
    pub data_fee_paid: bool,
    pub health_check_paid: bool,
    /// Fresh DSCR, only when the health check was paid for
    pub dscr: Option<Decimal>,
    pub transition: Option<SafeModeTransition>,
}

impl Simulation {
    /// Run one settlement tick.
    ///
    /// Pays the data feed, pays for the health check and, only if the
    /// treasury could afford it, recomputes DSCR and moves safe mode on a
    /// threshold crossing. Fees already paid stay paid when the DSCR
    /// computation fails.
    pub fn settle(&mut self) -> Result<TickReport> {
        let market = self.market;
        let data_fee = self.settlement.data_fee;
        let risk_fee = self.settlement.risk_fee(&market);

        let data_fee_paid = self
            .process_payment(WalletId::Treasury, WalletId::Data, data_fee, DATA_FEE_PURPOSE)
            .is_settled();

        let health_check =
            self.process_payment(WalletId::Treasury, WalletId::Covenant, risk_fee, HEALTH_CHECK_PURPOSE);

        if let TransferOutcome::Rejected(err) = health_check {
            warn!(error = %err, "Treasury cannot fund the DSCR health check; skipping covenant test");
            return Ok(TickReport {
                data_fee_paid,
                health_check_paid: false,
                dscr: None,
                transition: None,
            });
        }

        let dscr = compute_dscr(&market, &self.covenant)?;
        let threshold = self.covenant.dscr_threshold;
        let at = self.now();
        let transition = self.status.record_dscr(dscr, threshold, at);

        match transition {
            Some(SafeModeTransition::Engaged) => {
                warn!(%dscr, %threshold, "Covenant breached, entering safe mode");
                self.log(
                    "Covenant",
                    format!(
                        "CRITICAL: DSCR {} < {}. TRIGGERING SAFE MODE!",
                        dscr.normalize(),
                        threshold.normalize()
                    ),
                    LogKind::Danger,
                );
                self.log(
                    "Treasury",
                    "LOCKING ON-CHAIN CONTRACT: Distributions Frozen.",
                    LogKind::Alert,
                );
            }
            Some(SafeModeTransition::Released) => {
                info!(%dscr, %threshold, "Covenant restored, leaving safe mode");
                self.log(
                    "Covenant",
                    format!(
                        "Recovery Detected: DSCR {}. Resuming operations.",
                        dscr.normalize()
                    ),
                    LogKind::Success,
                );
                self.log(
                    "Treasury",
                    "UNLOCKING CONTRACT: Distributions Resumed.",
                    LogKind::Info,
                );
            }
            None => {}
        }

        Ok(TickReport {
            data_fee_paid,
            health_check_paid: true,
            dscr: Some(dscr),
            transition,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::domain::MarketParameters;
    use crate::error::MeshError;
    use chrono::NaiveTime;
    use rust_decimal_macros::dec;

    fn fixed_clock() -> NaiveTime {
        NaiveTime::from_hms_opt(14, 15, 16).unwrap()
    }

    fn sim_with_treasury(treasury: Decimal) -> Simulation {
        let mut config = AppConfig::default_config();
        config.defaults.treasury = treasury;
        Simulation::new(&config).with_clock(fixed_clock)
    }

    #[test]
    fn test_healthy_tick() {
        let mut sim = sim_with_treasury(dec!(5000.0));
        let report = sim.settle().unwrap();

        assert_eq!(
            report,
            TickReport {
                data_fee_paid: true,
                health_check_paid: true,
                dscr: Some(dec!(1.13)),
                transition: None,
            }
        );
        assert_eq!(sim.wallets().treasury, dec!(4999.94));
        assert_eq!(sim.wallets().data, dec!(0.01));
        assert_eq!(sim.wallets().covenant, dec!(0.05));
        assert_eq!(sim.status().dscr, dec!(1.13));
        assert_eq!(sim.status().last_check, Some(fixed_clock()));
        assert!(!sim.status().safe_mode);
        // Two payments, no transition
        assert_eq!(sim.logs().len(), 2);
    }

    #[test]
    fn test_occupancy_shock_engages_safe_mode() {
        let mut sim = sim_with_treasury(dec!(5000.0));
        sim.update_market(MarketParameters::new(dec!(0.3), dec!(50), dec!(0.05)));
        let logs_before = sim.logs().len();

        let report = sim.settle().unwrap();

        assert_eq!(report.dscr, Some(dec!(0.36)));
        assert_eq!(report.transition, Some(SafeModeTransition::Engaged));
        assert!(sim.status().safe_mode);
        // Distressed occupancy pays the larger fee
        assert_eq!(sim.wallets().covenant, dec!(0.50));
        // Two payments plus two transition entries
        assert_eq!(sim.logs().len(), logs_before + 4);

        let recent: Vec<_> = sim.logs().iter().take(2).collect();
        assert_eq!(recent[0].kind, LogKind::Alert);
        assert_eq!(
            recent[0].message,
            "LOCKING ON-CHAIN CONTRACT: Distributions Frozen."
        );
        assert_eq!(recent[1].kind, LogKind::Danger);
        assert_eq!(
            recent[1].message,
            "CRITICAL: DSCR 0.36 < 1.1. TRIGGERING SAFE MODE!"
        );
    }

    #[test]
    fn test_safe_mode_persists_without_new_logs() {
        let mut sim = sim_with_treasury(dec!(5000.0));
        sim.update_market(MarketParameters::new(dec!(0.3), dec!(50), dec!(0.05)));
        sim.settle().unwrap();
        let logs_before = sim.logs().len();

        let report = sim.settle().unwrap();

        assert_eq!(report.transition, None);
        assert!(sim.status().safe_mode);
        assert_eq!(sim.logs().len(), logs_before + 2);
    }

    #[test]
    fn test_recovery_releases_safe_mode() {
        let mut sim = sim_with_treasury(dec!(5000.0));
        sim.update_market(MarketParameters::new(dec!(0.3), dec!(50), dec!(0.05)));
        sim.settle().unwrap();
        sim.update_market(MarketParameters::new(dec!(0.95), dec!(50), dec!(0.05)));

        let report = sim.settle().unwrap();

        assert_eq!(report.transition, Some(SafeModeTransition::Released));
        assert!(!sim.status().safe_mode);

        let recent: Vec<_> = sim.logs().iter().take(2).collect();
        assert_eq!(recent[0].kind, LogKind::Info);
        assert_eq!(recent[0].message, "UNLOCKING CONTRACT: Distributions Resumed.");
        assert_eq!(recent[1].kind, LogKind::Success);
        assert_eq!(
            recent[1].message,
            "Recovery Detected: DSCR 1.13. Resuming operations."
        );
    }

    #[test]
    fn test_recovery_at_threshold_prints_trimmed_ratio() {
        let mut sim = sim_with_treasury(dec!(5000.0));
        sim.update_market(MarketParameters::new(dec!(0.3), dec!(50), dec!(0.05)));
        sim.settle().unwrap();
        // NOI 46.2 over debt service 42 is exactly 1.1
        sim.update_market(MarketParameters::new(dec!(0.924), dec!(50), dec!(0.05)));

        let report = sim.settle().unwrap();

        assert_eq!(report.dscr, Some(dec!(1.1)));
        assert_eq!(report.transition, Some(SafeModeTransition::Released));
        let success = sim.logs().iter().nth(1).unwrap();
        assert_eq!(
            success.message,
            "Recovery Detected: DSCR 1.1. Resuming operations."
        );
    }

    #[test]
    fn test_unfunded_health_check_leaves_status() {
        // Enough for the data fee, not for the health check
        let mut sim = sim_with_treasury(dec!(0.03));
        let status_before = sim.status().clone();

        let report = sim.settle().unwrap();

        assert!(report.data_fee_paid);
        assert!(!report.health_check_paid);
        assert_eq!(report.dscr, None);
        assert_eq!(sim.status(), &status_before);
        assert_eq!(sim.wallets().treasury, dec!(0.02));
        assert_eq!(sim.wallets().covenant, Decimal::ZERO);

        let latest = sim.logs().latest().unwrap();
        assert_eq!(latest.kind, LogKind::Danger);
        assert_eq!(
            latest.message,
            "PAYMENT FAILED: Insufficient funds to pay covenant"
        );
    }

    #[test]
    fn test_insolvent_treasury_cannot_enter_safe_mode() {
        let mut sim = sim_with_treasury(Decimal::ZERO);
        sim.update_market(MarketParameters::new(dec!(0.1), dec!(50), dec!(0.05)));

        let report = sim.settle().unwrap();

        assert!(!report.data_fee_paid);
        assert!(!report.health_check_paid);
        assert!(!sim.status().safe_mode);
        assert_eq!(sim.status().dscr, dec!(1.5));
    }

    #[test]
    fn test_zero_debt_service_is_reported_after_fees() {
        let mut sim = sim_with_treasury(dec!(5000.0));
        sim.update_market(MarketParameters::new(dec!(0.95), dec!(50), dec!(-1)));

        let err = sim.settle().unwrap_err();

        assert!(matches!(err, MeshError::Settlement(_)));
        assert_eq!(sim.wallets().treasury, dec!(4999.94));
        assert_eq!(sim.status().dscr, dec!(1.5));
    }
}
