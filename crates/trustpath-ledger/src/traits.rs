use async_trait::async_trait;
use std::sync::Arc;
use trustpath_core::{Asset, AssetResource, BalanceResource, Propagation, TrustlineResource};

use crate::context::Context;
use crate::error::LedgerError;

/// Read access to the resources a ledger holds for the context's user.
///
/// Implementations bridge to a concrete ledger (a remote mint service, an
/// in-memory book for tests). Every call is read-only and must honour the
/// context's cancellation token.
#[async_trait]
pub trait LedgerSource: Send + Sync {
    /// Every asset issued by the acting user.
    async fn list_assets(&self, ctx: &Context) -> Result<Vec<AssetResource>, LedgerError>;

    /// Every balance held by the acting user.
    async fn list_balances(&self, ctx: &Context) -> Result<Vec<BalanceResource>, LedgerError>;

    /// Trustlines around `asset`. [`Propagation::Canonical`] lists the
    /// trustlines whose quote asset is `asset`; [`Propagation::Propagated`]
    /// lists the reciprocal view, trustlines whose base asset is `asset`.
    async fn list_trustlines(
        &self,
        ctx: &Context,
        asset: &Asset,
        propagation: Propagation,
    ) -> Result<Vec<TrustlineResource>, LedgerError>;
}

#[async_trait]
impl<T: LedgerSource + ?Sized> LedgerSource for Arc<T> {
    async fn list_assets(&self, ctx: &Context) -> Result<Vec<AssetResource>, LedgerError> {
        (**self).list_assets(ctx).await
    }

    async fn list_balances(&self, ctx: &Context) -> Result<Vec<BalanceResource>, LedgerError> {
        (**self).list_balances(ctx).await
    }

    async fn list_trustlines(
        &self,
        ctx: &Context,
        asset: &Asset,
        propagation: Propagation,
    ) -> Result<Vec<TrustlineResource>, LedgerError> {
        (**self).list_trustlines(ctx, asset, propagation).await
    }
}

#[async_trait]
impl<'a, T: LedgerSource + ?Sized> LedgerSource for &'a T {
    async fn list_assets(&self, ctx: &Context) -> Result<Vec<AssetResource>, LedgerError> {
        (**self).list_assets(ctx).await
    }

    async fn list_balances(&self, ctx: &Context) -> Result<Vec<BalanceResource>, LedgerError> {
        (**self).list_balances(ctx).await
    }

    async fn list_trustlines(
        &self,
        ctx: &Context,
        asset: &Asset,
        propagation: Propagation,
    ) -> Result<Vec<TrustlineResource>, LedgerError> {
        (**self).list_trustlines(ctx, asset, propagation).await
    }
}
