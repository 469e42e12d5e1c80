use trustpath_core::{
    AssetPair, AssetResource, BalanceResource, PaymentRequest, Price, Propagation,
    ResolverConfig, TrustlineResource,
};
use trustpath_ledger::{Context, LedgerError, LedgerSource};

use crate::candidate::{Candidate, Funding};
use crate::error::RoutingError;
use crate::price;

/// Deepest search the resolver implements.
const MAX_SUPPORTED_HOPS: u32 = 1;

/// Resolves payment requests into candidate routes.
///
/// A resolution fetches the payer's assets and balances concurrently, then
/// the quote asset's canonical trustlines. A failure in any of the three
/// fetches aborts it. With the snapshots in hand it looks for a direct
/// holding of the quote asset, and only when there is none searches for a
/// single crossing the payer can fund.
///
/// Results are not ranked. Zero-hop takes absolute precedence: if a direct
/// holding exists it is the only candidate returned.
pub struct PathResolver<S> {
    source: S,
    config: ResolverConfig,
}

impl<S: LedgerSource> PathResolver<S> {
    /// Create a resolver. Fails if the configured search depth is deeper
    /// than one hop.
    pub fn new(source: S, config: ResolverConfig) -> Result<Self, RoutingError> {
        if config.max_hops > MAX_SUPPORTED_HOPS {
            return Err(RoutingError::UnsupportedSearchDepth {
                max_hops: config.max_hops,
            });
        }
        Ok(Self { source, config })
    }

    pub fn with_defaults(source: S) -> Self {
        Self {
            source,
            config: ResolverConfig::default(),
        }
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Find every route at the shallowest depth that yields any.
    ///
    /// An empty result means no route exists under the configured depth; it
    /// is not an error. Any fetch failure aborts the resolution.
    pub async fn resolve(
        &self,
        ctx: &Context,
        request: &PaymentRequest,
    ) -> Result<Vec<Candidate>, RoutingError> {
        tracing::info!(
            user = %ctx.user(),
            quote = %request.quote_asset,
            amount = %request.amount,
            destination = %request.destination,
            "Resolving payment path"
        );

        let (assets, balances) = self.fetch_holdings(ctx).await?;

        if self.config.max_hops == 0 {
            let direct: Vec<Candidate> = zero_hop(&balances, request).into_iter().collect();
            tracing::info!(
                quote = %request.quote_asset,
                amount = %request.amount,
                candidates = direct.len(),
                hops = 0,
                "Resolved payment path, one-hop search disabled"
            );
            return Ok(direct);
        }

        let trustlines = ctx
            .until_cancelled(self.source.list_trustlines(
                ctx,
                &request.quote_asset,
                Propagation::Canonical,
            ))
            .await?;

        if let Some(direct) = zero_hop(&balances, request) {
            tracing::info!(
                quote = %request.quote_asset,
                amount = %request.amount,
                candidates = 1,
                hops = 0,
                "Resolved payment path"
            );
            return Ok(vec![direct]);
        }

        let candidates = one_hop(
            &assets,
            &balances,
            &trustlines,
            request,
            self.config.include_issuance,
        );

        tracing::info!(
            quote = %request.quote_asset,
            amount = %request.amount,
            trustlines = trustlines.len(),
            candidates = candidates.len(),
            hops = 1,
            "Resolved payment path"
        );
        Ok(candidates)
    }

    /// [`resolve`](Self::resolve), but an empty result is
    /// [`RoutingError::NoRouteFound`].
    pub async fn require_route(
        &self,
        ctx: &Context,
        request: &PaymentRequest,
    ) -> Result<Vec<Candidate>, RoutingError> {
        let candidates = self.resolve(ctx, request).await?;
        if candidates.is_empty() {
            return Err(RoutingError::NoRouteFound {
                amount: request.amount.clone(),
                asset: request.quote_asset.clone(),
            });
        }
        Ok(candidates)
    }

    /// Fetch assets and balances concurrently under a shared child context.
    /// The first failure cancels the child, which reaches the sibling fetch
    /// and anything it has in flight, and is returned as is.
    async fn fetch_holdings(
        &self,
        ctx: &Context,
    ) -> Result<(Vec<AssetResource>, Vec<BalanceResource>), LedgerError> {
        let scope = ctx.child();

        let assets = async {
            let res = scope.until_cancelled(self.source.list_assets(&scope)).await;
            if let Err(e) = &res {
                abort_scope(&scope, "assets", e);
            }
            res
        };
        let balances = async {
            let res = scope
                .until_cancelled(self.source.list_balances(&scope))
                .await;
            if let Err(e) = &res {
                abort_scope(&scope, "balances", e);
            }
            res
        };

        tokio::try_join!(assets, balances)
    }
}

fn abort_scope(scope: &Context, resource: &str, error: &LedgerError) {
    if *error != LedgerError::Cancelled {
        tracing::warn!(resource, error = %error, "Fetch failed, cancelling sibling fetch");
    }
    scope.cancel();
}

/// A direct payment out of a balance of the quote asset, if one covers the
/// requested amount.
pub fn zero_hop(balances: &[BalanceResource], request: &PaymentRequest) -> Option<Candidate> {
    balances
        .iter()
        .find(|b| b.is_in(&request.quote_asset) && b.value >= request.amount)
        .map(|_| Candidate::direct(request.quote_asset.clone(), request.amount.clone()))
}

/// Every single-crossing route over `trustlines`.
///
/// A trustline yields one candidate per balance of its base asset that
/// covers the converted amount, and, when `include_issuance` is set, one
/// per asset the payer issues that is the trustline's base asset.
/// Malformed trustlines are skipped, never fatal.
pub fn one_hop(
    assets: &[AssetResource],
    balances: &[BalanceResource],
    trustlines: &[TrustlineResource],
    request: &PaymentRequest,
    include_issuance: bool,
) -> Vec<Candidate> {
    let mut candidates = Vec::new();

    for trustline in trustlines {
        let (pair, rate) = match parse_trustline(trustline) {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!(trustline = %trustline.id, error = %e, "Skipping malformed trustline");
                continue;
            }
        };

        if pair.quote != request.quote_asset {
            tracing::debug!(
                trustline = %trustline.id,
                pair = %trustline.pair,
                "Skipping trustline quoting another asset"
            );
            continue;
        }
        if !trustline.is_open() {
            tracing::debug!(trustline = %trustline.id, "Skipping closed trustline");
            continue;
        }
        if trustline.remainder < request.amount {
            tracing::debug!(
                trustline = %trustline.id,
                remainder = %trustline.remainder,
                requested = %request.amount,
                "Skipping trustline without capacity"
            );
            continue;
        }

        let required = match price::convert(&request.amount, &rate) {
            Ok(required) => required,
            Err(e) => {
                tracing::warn!(trustline = %trustline.id, error = %e, "Skipping malformed trustline");
                continue;
            }
        };
        let surcharge = price::surcharge(&request.amount, &required, &rate);
        let crossing = |funding| {
            Candidate::crossing(
                trustline.clone(),
                pair.base.clone(),
                required.clone(),
                request.amount.clone(),
                surcharge.clone(),
                funding,
            )
        };

        for _ in balances
            .iter()
            .filter(|b| b.is_in(&pair.base) && b.value >= required)
        {
            candidates.push(crossing(Funding::Balance));
        }

        if !include_issuance {
            continue;
        }
        for _ in assets
            .iter()
            .filter(|a| a.asset().is_ok_and(|asset| asset == pair.base))
        {
            candidates.push(crossing(Funding::Issuance));
        }
    }

    candidates
}

fn parse_trustline(trustline: &TrustlineResource) -> Result<(AssetPair, Price), RoutingError> {
    let malformed = |reason: String| RoutingError::MalformedTrustline {
        id: trustline.id.clone(),
        reason,
    };

    let pair = trustline.asset_pair().map_err(|e| malformed(e.to_string()))?;
    let price = trustline
        .parsed_price()
        .map_err(|e| malformed(e.to_string()))?;
    if !trustline.has_consistent_capacity() {
        return Err(malformed(format!(
            "remainder {} exceeds amount {}",
            trustline.remainder, trustline.amount
        )));
    }
    Ok((pair, price))
}
