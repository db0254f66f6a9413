use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::TransferError;

/// The fixed set of wallets in the mesh
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WalletId {
    /// Main operating fund; pays every fee
    Treasury,
    /// Reserve that collects DSCR health-check fees
    Covenant,
    /// Collects market-data feed fees
    Data,
}

impl WalletId {
    pub const ALL: [WalletId; 3] = [WalletId::Treasury, WalletId::Covenant, WalletId::Data];

    pub fn as_str(&self) -> &'static str {
        match self {
            WalletId::Treasury => "treasury",
            WalletId::Covenant => "covenant",
            WalletId::Data => "data",
        }
    }
}

impl std::fmt::Display for WalletId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl TryFrom<&str> for WalletId {
    type Error = String;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        WalletId::ALL
            .into_iter()
            .find(|id| id.as_str() == s)
            .ok_or_else(|| format!("Unknown wallet: {}", s))
    }
}

/// Balances of the three mesh wallets
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletSet {
    #[serde(with = "rust_decimal::serde::float")]
    pub treasury: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub covenant: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub data: Decimal,
}

impl WalletSet {
    pub fn new(treasury: Decimal, covenant: Decimal, data: Decimal) -> Self {
        Self {
            treasury,
            covenant,
            data,
        }
    }

    pub fn balance(&self, wallet: WalletId) -> Decimal {
        match wallet {
            WalletId::Treasury => self.treasury,
            WalletId::Covenant => self.covenant,
            WalletId::Data => self.data,
        }
    }

    pub(crate) fn set_balance(&mut self, wallet: WalletId, amount: Decimal) {
        match wallet {
            WalletId::Treasury => self.treasury = amount,
            WalletId::Covenant => self.covenant = amount,
            WalletId::Data => self.data = amount,
        }
    }

    /// Sum of all balances
    pub fn total(&self) -> Decimal {
        self.treasury + self.covenant + self.data
    }

    /// Move `amount` from `from` to `to`.
    ///
    /// Both balances are computed before either is written, so a refused
    /// transfer leaves the set untouched.
    pub fn transfer(
        &mut self,
        from: WalletId,
        to: WalletId,
        amount: Decimal,
    ) -> Result<(), TransferError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(TransferError::InvalidAmount { amount });
        }

        let available = self.balance(from);
        if available < amount {
            return Err(TransferError::InsufficientFunds {
                wallet: from,
                available,
                requested: amount,
            });
        }

        if from == to {
            return Ok(());
        }

        let debited = available - amount;
        let credited = self
            .balance(to)
            .checked_add(amount)
            .ok_or(TransferError::Overflow { wallet: to })?;

        self.set_balance(from, debited);
        self.set_balance(to, credited);
        Ok(())
    }
}
