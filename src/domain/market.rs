use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Market inputs feeding the coverage calculation.
///
/// Values are taken as supplied; nothing checks that occupancy stays in
/// `0..=1` or that rates are positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketParameters {
    /// Leased fraction of the building (0.95 = 95%)
    #[serde(with = "rust_decimal::serde::float")]
    pub occupancy: Decimal,
    /// Asking rent per unit
    #[serde(with = "rust_decimal::serde::float")]
    pub rent_price: Decimal,
    /// Annual rate on the loan (0.05 = 5%)
    #[serde(with = "rust_decimal::serde::float")]
    pub interest_rate: Decimal,
}

impl MarketParameters {
    pub fn new(occupancy: Decimal, rent_price: Decimal, interest_rate: Decimal) -> Self {
        Self {
            occupancy,
            rent_price,
            interest_rate,
        }
    }

    /// Whole-number occupancy percentage, truncated toward zero.
    ///
    /// `None` when the supplied occupancy is too large to scale.
    pub fn occupancy_pct(&self) -> Option<Decimal> {
        self.occupancy
            .checked_mul(Decimal::ONE_HUNDRED)
            .map(|pct| pct.trunc())
    }

    /// Whether occupancy is strictly above `threshold`
    pub fn is_high_occupancy(&self, threshold: Decimal) -> bool {
        self.occupancy > threshold
    }
}

impl Default for MarketParameters {
    fn default() -> Self {
        Self {
            occupancy: dec!(0.95),
            rent_price: dec!(50),
            interest_rate: dec!(0.05),
        }
    }
}
