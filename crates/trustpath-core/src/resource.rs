//! Read-only snapshots of ledger resources.
//!
//! Pair and price on [`TrustlineResource`] are kept as the raw strings the
//! ledger returned: a single corrupt entry must still be representable so
//! that consumers can decide to skip it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::{Address, Amount, Asset, AssetPair, Price, Propagation, TrustlineStatus};

/// An asset issued by the acting user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetResource {
    pub id: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created: DateTime<Utc>,
    pub owner: String,
    pub name: String,
    pub code: String,
    pub scale: u8,
}

impl AssetResource {
    /// Parse the canonical asset this resource describes.
    pub fn asset(&self) -> Result<Asset, CoreError> {
        Asset::from_name(&self.name)
    }
}

/// A quantity of one asset held by one holder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceResource {
    pub id: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created: DateTime<Utc>,
    pub asset: String,
    pub holder: String,
    pub value: Amount,
}

impl BalanceResource {
    /// True when this balance is denominated in `asset`.
    pub fn is_in(&self, asset: &Asset) -> bool {
        Asset::from_name(&self.asset).is_ok_and(|a| &a == asset)
    }
}

/// A trustline (offer): the owner converts between `base` and `quote` at a
/// fixed price, up to `amount`, with `remainder` capacity left in quote
/// units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrustlineResource {
    pub id: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created: DateTime<Utc>,
    pub owner: String,
    pub pair: String,
    pub price: String,
    pub amount: Amount,
    pub remainder: Amount,
    #[serde(default)]
    pub status: TrustlineStatus,
    #[serde(default)]
    pub propagation: Propagation,
}

impl TrustlineResource {
    /// Parse the `base/quote` pair.
    pub fn asset_pair(&self) -> Result<AssetPair, CoreError> {
        AssetPair::parse(&self.pair)
    }

    /// Parse the `pB/pQ` price.
    pub fn parsed_price(&self) -> Result<Price, CoreError> {
        Price::parse(&self.price)
    }

    /// `0 <= remainder <= amount`.
    pub fn has_consistent_capacity(&self) -> bool {
        self.remainder <= self.amount
    }

    /// True when the trustline can still be crossed.
    pub fn is_open(&self) -> bool {
        self.status != TrustlineStatus::Closed
    }
}

/// A request to pay `amount` of `quote_asset` to `destination`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRequest {
    pub quote_asset: Asset,
    pub amount: Amount,
    pub destination: Address,
}

impl PaymentRequest {
    pub fn new(quote_asset: Asset, amount: Amount, destination: Address) -> Self {
        Self {
            quote_asset,
            amount,
            destination,
        }
    }

    /// Build a request from user-supplied strings.
    pub fn parse(quote_asset: &str, amount: &str, destination: &str) -> Result<Self, CoreError> {
        Ok(Self {
            quote_asset: Asset::from_name(quote_asset)?,
            amount: Amount::parse(amount)?,
            destination: Address::parse(destination)?,
        })
    }
}
