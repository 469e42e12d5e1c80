//! Integration test: resolution against an in-memory ledger.
//!
//! Exercises trustpath-ledger and trustpath-routing together, from ledger
//! setup through candidate selection and a simulated settlement that
//! consumes the crossed trustline.

use std::sync::Arc;

use trustpath_core::{Amount, Price, ResolverConfig};
use trustpath_integration_tests::{alice, eur, init_tracing, pay_usd, usd};
use trustpath_ledger::{Context, LedgerError, MemoryLedger, Resource};
use trustpath_routing::{Funding, PathResolver, RoutingError};

fn price(s: &str) -> Price {
    Price::parse(s).expect("fixture price")
}

// =========================================================================
// Zero-hop
// =========================================================================

#[tokio::test]
async fn test_direct_balance_wins() {
    init_tracing();
    let ledger = MemoryLedger::new();
    ledger.mint_asset(&usd());
    ledger.mint_asset(&eur());
    ledger.credit(&alice(), &usd(), 150u64);
    ledger.credit(&alice(), &eur(), 1_000u64);
    ledger.trust(&eur(), &usd(), &price("1/1"), 1_000u64);

    let resolver = PathResolver::with_defaults(&ledger);
    let candidates = resolver
        .resolve(&Context::new(alice()), &pay_usd(150))
        .await
        .expect("resolution should succeed");

    assert_eq!(candidates.len(), 1);
    assert!(candidates[0].is_direct());
    assert_eq!(candidates[0].amount, Amount::from(150u64));
    assert_eq!(ledger.calls(Resource::Trustlines), 1);
}

// =========================================================================
// One-hop
// =========================================================================

#[tokio::test]
async fn test_eur_balance_crosses_into_usd() {
    init_tracing();
    let ledger = MemoryLedger::new();
    ledger.mint_asset(&usd());
    ledger.mint_asset(&eur());
    ledger.credit(&alice(), &eur(), 130u64);
    let offer = ledger.trust(&eur(), &usd(), &price("100/125"), 200u64);

    let resolver = PathResolver::with_defaults(&ledger);
    let candidates = resolver
        .require_route(&Context::new(alice()), &pay_usd(100))
        .await
        .expect("a route should exist");

    assert_eq!(candidates.len(), 1);
    let route = &candidates[0];
    assert_eq!(route.base_asset, eur());
    assert_eq!(route.amount, Amount::from(80u64));
    assert_eq!(route.funding, Funding::Balance);
    assert_eq!(route.path_ids(), vec![offer.id.clone()]);
    assert_eq!(ledger.calls(Resource::Assets), 1);
    assert_eq!(ledger.calls(Resource::Balances), 1);
    assert_eq!(ledger.calls(Resource::Trustlines), 1);
}

#[tokio::test]
async fn test_settlement_drains_trustline_capacity() {
    init_tracing();
    let ledger = MemoryLedger::new();
    ledger.mint_asset(&usd());
    ledger.credit(&alice(), &eur(), 10_000u64);
    let offer = ledger.trust(&eur(), &usd(), &price("100/125"), 200u64);
    let resolver = PathResolver::with_defaults(&ledger);
    let ctx = Context::new(alice());

    // First payment fits.
    let route = resolver.require_route(&ctx, &pay_usd(150)).await.unwrap();
    ledger
        .consume_trustline(&route[0].path_ids()[0], &route[0].quote_amount)
        .expect("settlement should consume the trustline");
    assert_eq!(
        ledger.trustline(&offer.id).unwrap().remainder,
        Amount::from(50u64)
    );

    // The remaining 50 no longer covers a second 150.
    let err = resolver.require_route(&ctx, &pay_usd(150)).await.unwrap_err();
    assert!(err.is_no_route());

    // But 50 still goes through, and draining it marks the trustline consumed.
    let route = resolver.require_route(&ctx, &pay_usd(50)).await.unwrap();
    let drained = ledger
        .consume_trustline(&offer.id, &route[0].quote_amount)
        .unwrap();
    assert!(drained.remainder.is_zero());
    assert!(resolver.resolve(&ctx, &pay_usd(1)).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_stale_candidate_rejected_at_settlement() {
    init_tracing();
    let ledger = MemoryLedger::new();
    ledger.mint_asset(&usd());
    ledger.credit(&alice(), &eur(), 10_000u64);
    let offer = ledger.trust(&eur(), &usd(), &price("1/1"), 100u64);
    let resolver = PathResolver::with_defaults(&ledger);

    let route = resolver
        .require_route(&Context::new(alice()), &pay_usd(100))
        .await
        .unwrap();

    // Someone else crosses the trustline first.
    ledger.consume_trustline(&offer.id, &Amount::from(60u64)).unwrap();

    let err = ledger
        .consume_trustline(&offer.id, &route[0].quote_amount)
        .unwrap_err();
    assert_eq!(err.code(), Some("trustline_insufficient_remainder"));
}

#[tokio::test]
async fn test_shared_ledger_across_payers() {
    init_tracing();
    let ledger = Arc::new(MemoryLedger::new());
    ledger.mint_asset(&usd());
    ledger.credit(&alice(), &eur(), 500u64);
    ledger.trust(&eur(), &usd(), &price("1/1"), 1_000u64);
    let resolver = Arc::new(PathResolver::with_defaults(Arc::clone(&ledger)));

    let erin = trustpath_integration_tests::address("erin@mint.example");
    let for_alice = {
        let resolver = Arc::clone(&resolver);
        tokio::spawn(async move { resolver.resolve(&Context::new(alice()), &pay_usd(100)).await })
    };
    let for_erin = {
        let resolver = Arc::clone(&resolver);
        tokio::spawn(async move { resolver.resolve(&Context::new(erin), &pay_usd(100)).await })
    };

    assert_eq!(for_alice.await.unwrap().unwrap().len(), 1);
    // Erin holds nothing.
    assert!(for_erin.await.unwrap().unwrap().is_empty());
}

// =========================================================================
// Failures
// =========================================================================

#[tokio::test]
async fn test_unreachable_rejected_and_no_route_are_distinct() {
    init_tracing();
    let ledger = MemoryLedger::new();
    ledger.mint_asset(&usd());
    let resolver = PathResolver::with_defaults(&ledger);
    let ctx = Context::new(alice());

    let no_route = resolver.require_route(&ctx, &pay_usd(100)).await.unwrap_err();
    assert!(matches!(no_route, RoutingError::NoRouteFound { .. }));

    ledger.fail_with(Resource::Assets, LedgerError::transport("dns failure"));
    let unreachable = resolver.require_route(&ctx, &pay_usd(100)).await.unwrap_err();
    assert!(unreachable.is_unreachable());
    assert_eq!(unreachable.to_string(), "ledger unreachable: dns failure");

    ledger.clear_failure(Resource::Assets);
    ledger.fail_with(
        Resource::Trustlines,
        LedgerError::remote("rate_limited", "slow down"),
    );
    let rejected = resolver.require_route(&ctx, &pay_usd(100)).await.unwrap_err();
    assert!(rejected.is_rejected());
    assert_eq!(
        rejected.to_string(),
        "ledger rejected the request (rate_limited): slow down"
    );
}

#[tokio::test]
async fn test_config_from_toml_drives_resolver() {
    init_tracing();
    let ledger = MemoryLedger::new();
    ledger.mint_asset(&usd());
    ledger.credit(&alice(), &eur(), 500u64);
    ledger.trust(&eur(), &usd(), &price("1/1"), 1_000u64);

    let direct_only = ResolverConfig::from_toml_str("max_hops = 0").unwrap();
    let resolver = PathResolver::new(&ledger, direct_only).unwrap();
    assert!(resolver
        .resolve(&Context::new(alice()), &pay_usd(100))
        .await
        .unwrap()
        .is_empty());

    let too_deep = ResolverConfig::from_toml_str("max_hops = 3").unwrap();
    assert!(matches!(
        PathResolver::new(&ledger, too_deep),
        Err(RoutingError::UnsupportedSearchDepth { max_hops: 3 })
    ));
}
