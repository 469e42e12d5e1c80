use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use serde::Deserialize;
use std::time::Duration;
use trustpath_core::{
    Address, Amount, Asset, AssetResource, BalanceResource, CoreError, Price, Propagation,
    ResourceId, TrustlineResource, TrustlineStatus,
};
use uuid::Uuid;

use crate::context::Context;
use crate::error::LedgerError;
use crate::traits::LedgerSource;

/// The three resource listings a [`LedgerSource`] serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    Assets,
    Balances,
    Trustlines,
}

/// JSON document accepted by [`MemoryLedger::load_snapshot`].
#[derive(Debug, Default, Deserialize)]
struct Snapshot {
    #[serde(default)]
    assets: Vec<AssetResource>,
    #[serde(default)]
    balances: Vec<BalanceResource>,
    #[serde(default)]
    trustlines: Vec<TrustlineResource>,
}

/// In-memory ledger.
///
/// Holds assets, balances and trustlines for any number of users and serves
/// them to whichever user the request [`Context`] names. Failures and
/// latency can be injected per resource listing to exercise callers' error
/// and cancellation paths.
pub struct MemoryLedger {
    /// Assets keyed by canonical name.
    assets: DashMap<String, AssetResource>,
    /// Balances keyed by (holder, asset name).
    balances: DashMap<String, BalanceResource>,
    /// Trustlines keyed by id.
    trustlines: DashMap<String, TrustlineResource>,
    failures: DashMap<Resource, LedgerError>,
    latencies: DashMap<Resource, Duration>,
    calls: DashMap<Resource, usize>,
}

impl MemoryLedger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self {
            assets: DashMap::new(),
            balances: DashMap::new(),
            trustlines: DashMap::new(),
            failures: DashMap::new(),
            latencies: DashMap::new(),
            calls: DashMap::new(),
        }
    }

    /// Build a ledger from a JSON snapshot
    /// `{"assets": [...], "balances": [...], "trustlines": [...]}`.
    ///
    /// Asset owners, asset names and balance holders are normalized so that
    /// snapshot entries and later [`credit`](Self::credit) calls agree.
    /// Balances that normalize to the same holder and asset are merged.
    /// Trustlines are stored as written.
    pub fn load_snapshot(json: &str) -> Result<Self, LedgerError> {
        let invalid = |e: CoreError| LedgerError::Snapshot(e.to_string());
        let snapshot: Snapshot =
            serde_json::from_str(json).map_err(|e| LedgerError::Snapshot(e.to_string()))?;

        let ledger = Self::new();
        for mut asset in snapshot.assets {
            let parsed = Asset::from_name(&asset.name).map_err(invalid)?;
            asset.owner = parsed.owner().to_string();
            asset.name = parsed.name();
            ledger.assets.insert(asset.name.clone(), asset);
        }
        for mut balance in snapshot.balances {
            balance.holder = Address::parse(&balance.holder).map_err(invalid)?.to_string();
            balance.asset = Asset::from_name(&balance.asset).map_err(invalid)?.name();
            let key = Self::balance_key(&balance.holder, &balance.asset);
            ledger
                .balances
                .entry(key)
                .and_modify(|b| b.value = Amount::from(b.value.value() + balance.value.value()))
                .or_insert_with(|| balance.clone());
        }
        for trustline in snapshot.trustlines {
            ledger.trustlines.insert(trustline.id.clone(), trustline);
        }
        tracing::debug!(
            assets = ledger.assets.len(),
            balances = ledger.balances.len(),
            trustlines = ledger.trustlines.len(),
            "Loaded ledger snapshot"
        );
        Ok(ledger)
    }

    fn balance_key(holder: &str, asset: &str) -> String {
        format!("{}|{}", holder, asset)
    }

    fn token(prefix: &str) -> String {
        format!("{}_{}", prefix, Uuid::now_v7().simple())
    }

    /// Create `asset` on behalf of its owner. Minting an existing asset
    /// returns the existing record.
    pub fn mint_asset(&self, asset: &Asset) -> AssetResource {
        self.assets
            .entry(asset.name())
            .or_insert_with(|| AssetResource {
                id: ResourceId::new(asset.owner().clone(), Self::token("asset")).to_string(),
                created: Utc::now(),
                owner: asset.owner().to_string(),
                name: asset.name(),
                code: asset.code().to_string(),
                scale: asset.scale(),
            })
            .clone()
    }

    /// Credit `value` of `asset` to `holder`, creating the balance if needed.
    pub fn credit(&self, holder: &Address, asset: &Asset, value: impl Into<Amount>) -> BalanceResource {
        let value = value.into();
        let key = Self::balance_key(&holder.to_string(), &asset.name());
        self.balances
            .entry(key)
            .and_modify(|b| b.value = Amount::from(b.value.value() + value.value()))
            .or_insert_with(|| BalanceResource {
                id: ResourceId::new(asset.owner().clone(), Self::token("balance")).to_string(),
                created: Utc::now(),
                asset: asset.name(),
                holder: holder.to_string(),
                value: value.clone(),
            })
            .clone()
    }

    /// Declare a trustline: the owner of `base` converts its asset into
    /// `quote` at `price`, up to `amount` of quote units.
    pub fn trust(
        &self,
        base: &Asset,
        quote: &Asset,
        price: &Price,
        amount: impl Into<Amount>,
    ) -> TrustlineResource {
        let amount = amount.into();
        let trustline = TrustlineResource {
            id: ResourceId::new(base.owner().clone(), Self::token("offer")).to_string(),
            created: Utc::now(),
            owner: base.owner().to_string(),
            pair: format!("{}/{}", base, quote),
            price: price.to_string(),
            remainder: amount.clone(),
            amount,
            status: TrustlineStatus::Active,
            propagation: Propagation::Canonical,
        };
        tracing::info!(
            trustline = %trustline.id,
            pair = %trustline.pair,
            price = %trustline.price,
            "Trustline declared"
        );
        self.trustlines.insert(trustline.id.clone(), trustline.clone());
        trustline
    }

    /// Store a trustline as-is, without validating its pair or price.
    pub fn insert_trustline(&self, trustline: TrustlineResource) {
        self.trustlines.insert(trustline.id.clone(), trustline);
    }

    /// Look up a trustline by id.
    pub fn trustline(&self, id: &str) -> Option<TrustlineResource> {
        self.trustlines.get(id).map(|t| t.clone())
    }

    /// Close a trustline. Closing is terminal.
    pub fn close_trustline(&self, id: &str) -> Result<TrustlineResource, LedgerError> {
        let mut entry = self.trustlines.get_mut(id).ok_or_else(|| {
            LedgerError::remote("trustline_not_found", format!("unknown trustline {}", id))
        })?;
        entry.status = TrustlineStatus::Closed;
        tracing::info!(trustline = %id, "Trustline closed");
        Ok(entry.clone())
    }

    /// Consume `quote_amount` of a trustline's remainder, as a settlement
    /// crossing it would.
    pub fn consume_trustline(
        &self,
        id: &str,
        quote_amount: &Amount,
    ) -> Result<TrustlineResource, LedgerError> {
        let mut entry = self.trustlines.get_mut(id).ok_or_else(|| {
            LedgerError::remote("trustline_not_found", format!("unknown trustline {}", id))
        })?;
        if entry.status == TrustlineStatus::Closed {
            return Err(LedgerError::remote(
                "trustline_closed",
                format!("trustline {} is closed", id),
            ));
        }
        let remainder = entry.remainder.checked_sub(quote_amount).ok_or_else(|| {
            LedgerError::remote(
                "trustline_insufficient_remainder",
                format!(
                    "trustline {} has {} left, {} requested",
                    id, entry.remainder, quote_amount
                ),
            )
        })?;
        if remainder.is_zero() {
            entry.status = TrustlineStatus::Consumed;
        }
        entry.remainder = remainder;
        Ok(entry.clone())
    }

    /// Make every subsequent listing of `resource` fail with `error`.
    pub fn fail_with(&self, resource: Resource, error: LedgerError) {
        self.failures.insert(resource, error);
    }

    pub fn clear_failure(&self, resource: Resource) {
        self.failures.remove(&resource);
    }

    /// Delay every subsequent listing of `resource`.
    pub fn set_latency(&self, resource: Resource, latency: Duration) {
        self.latencies.insert(resource, latency);
    }

    /// Number of listings of `resource` requested so far.
    pub fn calls(&self, resource: Resource) -> usize {
        self.calls.get(&resource).map(|c| *c).unwrap_or(0)
    }

    async fn serve<T, F>(
        &self,
        ctx: &Context,
        resource: Resource,
        list: F,
    ) -> Result<Vec<T>, LedgerError>
    where
        T: Send,
        F: FnOnce() -> Result<Vec<T>, LedgerError> + Send,
    {
        *self.calls.entry(resource).or_insert(0) += 1;
        let latency = self.latencies.get(&resource).map(|d| *d);
        let failure = self.failures.get(&resource).map(|e| e.clone());

        ctx.until_cancelled(async move {
            if let Some(latency) = latency {
                tokio::time::sleep(latency).await;
            }
            match failure {
                Some(err) => Err(err),
                None => list(),
            }
        })
        .await
    }

    /// Match one side of a raw `base/quote` pair against `asset`.
    fn side_matches(pair: &str, asset: &Asset, propagation: Propagation) -> bool {
        let Some((base, quote)) = pair.split_once('/') else {
            return false;
        };
        let side = match propagation {
            Propagation::Canonical => quote,
            Propagation::Propagated => base,
        };
        match Asset::from_name(side) {
            Ok(parsed) => &parsed == asset,
            Err(_) => side == asset.name(),
        }
    }
}

impl Default for MemoryLedger {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LedgerSource for MemoryLedger {
    async fn list_assets(&self, ctx: &Context) -> Result<Vec<AssetResource>, LedgerError> {
        let owner = ctx.user().to_string();
        self.serve(ctx, Resource::Assets, || {
            let mut assets: Vec<AssetResource> = self
                .assets
                .iter()
                .filter(|a| a.owner == owner)
                .map(|a| a.clone())
                .collect();
            assets.sort_by(|a, b| a.created.cmp(&b.created).then_with(|| a.id.cmp(&b.id)));
            tracing::debug!(user = %owner, count = assets.len(), "Listed assets");
            Ok(assets)
        })
        .await
    }

    async fn list_balances(&self, ctx: &Context) -> Result<Vec<BalanceResource>, LedgerError> {
        let holder = ctx.user().to_string();
        self.serve(ctx, Resource::Balances, || {
            let mut balances: Vec<BalanceResource> = self
                .balances
                .iter()
                .filter(|b| b.holder == holder)
                .map(|b| b.clone())
                .collect();
            balances.sort_by(|a, b| a.created.cmp(&b.created).then_with(|| a.id.cmp(&b.id)));
            tracing::debug!(user = %holder, count = balances.len(), "Listed balances");
            Ok(balances)
        })
        .await
    }

    async fn list_trustlines(
        &self,
        ctx: &Context,
        asset: &Asset,
        propagation: Propagation,
    ) -> Result<Vec<TrustlineResource>, LedgerError> {
        self.serve(ctx, Resource::Trustlines, || {
            if !self.assets.contains_key(&asset.name()) {
                return Err(LedgerError::remote(
                    "asset_not_found",
                    format!("the asset you provided does not exist: {}", asset),
                ));
            }
            let mut trustlines: Vec<TrustlineResource> = self
                .trustlines
                .iter()
                .filter(|t| Self::side_matches(&t.pair, asset, propagation))
                .map(|t| TrustlineResource {
                    propagation,
                    ..t.clone()
                })
                .collect();
            trustlines.sort_by(|a, b| a.created.cmp(&b.created).then_with(|| a.id.cmp(&b.id)));
            tracing::debug!(
                asset = %asset,
                %propagation,
                count = trustlines.len(),
                "Listed trustlines"
            );
            Ok(trustlines)
        })
        .await
    }
}
