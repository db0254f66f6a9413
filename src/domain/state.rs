use chrono::NaiveTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// Covenant mode of the mesh
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CovenantMode {
    /// Distributions flowing
    Normal,
    /// DSCR breached the covenant; distributions frozen
    SafeMode,
}

impl CovenantMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            CovenantMode::Normal => "NORMAL",
            CovenantMode::SafeMode => "SAFE_MODE",
        }
    }

    /// Mode a fresh DSCR reading calls for
    pub fn for_dscr(dscr: Decimal, threshold: Decimal) -> Self {
        if dscr < threshold {
            CovenantMode::SafeMode
        } else {
            CovenantMode::Normal
        }
    }
}

impl fmt::Display for CovenantMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Edge between the two covenant modes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SafeModeTransition {
    /// Normal -> SafeMode
    Engaged,
    /// SafeMode -> Normal
    Released,
}

/// Result of the last coverage check
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusBlock {
    pub safe_mode: bool,
    #[serde(with = "rust_decimal::serde::float")]
    pub dscr: Decimal,
    /// Time of the last successful health check; `"Never"` until the first one
    #[serde(serialize_with = "serialize_last_check")]
    pub last_check: Option<NaiveTime>,
}

impl StatusBlock {
    pub fn new(initial_dscr: Decimal) -> Self {
        Self {
            safe_mode: false,
            dscr: initial_dscr,
            last_check: None,
        }
    }

    pub fn mode(&self) -> CovenantMode {
        if self.safe_mode {
            CovenantMode::SafeMode
        } else {
            CovenantMode::Normal
        }
    }

    /// Store a fresh DSCR reading and move between modes on a threshold crossing.
    ///
    /// Returns the transition taken, if any. Readings that keep the current
    /// mode change nothing but `dscr` and `last_check`.
    pub fn record_dscr(
        &mut self,
        dscr: Decimal,
        threshold: Decimal,
        at: NaiveTime,
    ) -> Option<SafeModeTransition> {
        self.dscr = dscr;
        self.last_check = Some(at);

        match (self.mode(), CovenantMode::for_dscr(dscr, threshold)) {
            (CovenantMode::Normal, CovenantMode::SafeMode) => {
                self.safe_mode = true;
                Some(SafeModeTransition::Engaged)
            }
            (CovenantMode::SafeMode, CovenantMode::Normal) => {
                self.safe_mode = false;
                Some(SafeModeTransition::Released)
            }
            _ => None,
        }
    }
}

fn serialize_last_check<S>(value: &Option<NaiveTime>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match value {
        Some(t) => serializer.serialize_str(&t.format("%H:%M:%S").to_string()),
        None => serializer.serialize_str("Never"),
    }
}
