//! Trustpath core: the data model shared by the ledger and routing layers.
//!
//! Monetary quantities are arbitrary-precision integers ([`Amount`]); prices
//! are integer ratios ([`Price`]). Nothing in this crate uses floating point.

pub mod config;
pub mod error;
pub mod resource;
pub mod types;

pub use config::ResolverConfig;
pub use error::CoreError;
pub use resource::{AssetResource, BalanceResource, PaymentRequest, TrustlineResource};
pub use types::{
    max_asset_amount, Address, Amount, Asset, AssetPair, Price, Propagation, ResourceId,
    TrustlineStatus, MAX_ASSET_SCALE,
};
