use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use tracing::warn;

use crate::domain::MarketParameters;

pub const MESH_ONLINE: &str = "CRE Agent Mesh Online";
pub const MARKET_UPDATED: &str = "Market Updated";
pub const RESET: &str = "Reset";

/// Body of every plain acknowledgement
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatusResponse {
    pub status: String,
}

impl StatusResponse {
    pub fn new(status: &str) -> Self {
        Self {
            status: status.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// `POST /admin/update-market` body; every field is required.
///
/// Any JSON number is accepted. Values outside the decimal range are
/// clamped to its bounds.
#[derive(Debug, Clone, Deserialize)]
pub struct MarketUpdateRequest {
    #[serde(deserialize_with = "saturating_decimal")]
    pub occupancy: Decimal,
    #[serde(deserialize_with = "saturating_decimal")]
    pub rent_price: Decimal,
    #[serde(deserialize_with = "saturating_decimal")]
    pub interest_rate: Decimal,
}

fn saturating_decimal<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    let value = f64::deserialize(deserializer)?;
    Ok(clamp_to_decimal(value))
}

fn clamp_to_decimal(value: f64) -> Decimal {
    Decimal::from_str(&value.to_string()).unwrap_or_else(|_| {
        let clamped = if value.abs() < 1.0 {
            Decimal::ZERO
        } else if value.is_sign_negative() {
            Decimal::MIN
        } else {
            Decimal::MAX
        };
        warn!(value, %clamped, "Market value outside decimal range, clamped");
        clamped
    })
}

impl From<MarketUpdateRequest> for MarketParameters {
    fn from(req: MarketUpdateRequest) -> Self {
        MarketParameters::new(req.occupancy, req.rent_price, req.interest_rate)
    }
}
