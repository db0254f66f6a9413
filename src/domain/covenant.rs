//! Debt service coverage calculation.

use rust_decimal::Decimal;

use crate::config::CovenantConfig;
use crate::domain::MarketParameters;
use crate::error::{MeshError, Result};

/// Net operating income: `occupancy * gross_rent_base * expense_ratio`
pub fn net_operating_income(market: &MarketParameters, terms: &CovenantConfig) -> Result<Decimal> {
    market
        .occupancy
        .checked_mul(terms.gross_rent_base)
        .and_then(|gross| gross.checked_mul(terms.expense_ratio))
        .ok_or_else(|| MeshError::Settlement("net operating income overflow".to_string()))
}

/// Debt service: `debt_base * (1 + interest_rate)`
pub fn debt_service(market: &MarketParameters, terms: &CovenantConfig) -> Result<Decimal> {
    Decimal::ONE
        .checked_add(market.interest_rate)
        .and_then(|factor| terms.debt_base.checked_mul(factor))
        .ok_or_else(|| MeshError::Settlement("debt service overflow".to_string()))
}

/// DSCR rounded to two places (half to even)
pub fn compute_dscr(market: &MarketParameters, terms: &CovenantConfig) -> Result<Decimal> {
    let noi = net_operating_income(market, terms)?;
    let debt = debt_service(market, terms)?;

    if debt.is_zero() {
        return Err(MeshError::Settlement(format!(
            "debt service is zero at interest rate {}",
            market.interest_rate
        )));
    }

    noi.checked_div(debt)
        .map(|ratio| ratio.round_dp(2))
        .ok_or_else(|| MeshError::Settlement(format!("DSCR {} / {} overflow", noi, debt)))
}
