//! Integration test: resolving against a ledger loaded from a JSON snapshot,
//! the same documents the mint service returns for its listings.

use trustpath_core::{Amount, Propagation, TrustlineStatus};
use trustpath_integration_tests::{alice, asset, eur, init_tracing, pay_usd, usd};
use trustpath_ledger::{Context, LedgerError, LedgerSource, MemoryLedger};
use trustpath_routing::{Candidate, Funding, PathResolver};

const SNAPSHOT: &str = r#"{
    "assets": [
        {
            "id": "bob@mint.example[asset_usd]",
            "created": 1700000000000,
            "owner": "bob@mint.example",
            "name": "bob@mint.example[USD.2]",
            "code": "USD",
            "scale": 2
        },
        {
            "id": "alice@mint.example[asset_alc]",
            "created": 1700000000500,
            "owner": "alice@mint.example",
            "name": "alice@mint.example[ALC.0]",
            "code": "ALC",
            "scale": 0
        }
    ],
    "balances": [
        {
            "id": "carol@mint.example[balance_1]",
            "created": 1700000001000,
            "asset": "carol@mint.example[EUR.2]",
            "holder": "alice@mint.example",
            "value": "130"
        }
    ],
    "trustlines": [
        {
            "id": "carol@mint.example[offer_eur]",
            "created": 1700000002000,
            "owner": "carol@mint.example",
            "pair": "carol@mint.example[EUR.2]/bob@mint.example[USD.2]",
            "price": "100/125",
            "amount": "500",
            "remainder": "200"
        },
        {
            "id": "alice@mint.example[offer_alc]",
            "created": 1700000003000,
            "owner": "alice@mint.example",
            "pair": "alice@mint.example[ALC.0]/bob@mint.example[USD.2]",
            "price": "1/3",
            "amount": "1000",
            "remainder": "1000"
        },
        {
            "id": "mallory@mint.example[offer_bad]",
            "created": 1700000004000,
            "owner": "mallory@mint.example",
            "pair": "mallory@mint.example[EVIL.2]/bob@mint.example[USD.2]",
            "price": "1/0",
            "amount": "1000",
            "remainder": "1000"
        },
        {
            "id": "carol@mint.example[offer_closed]",
            "created": 1700000005000,
            "owner": "carol@mint.example",
            "pair": "carol@mint.example[EUR.2]/bob@mint.example[USD.2]",
            "price": "1/1",
            "amount": "1000",
            "remainder": "1000",
            "status": "closed"
        }
    ]
}"#;

fn ids(candidates: &[Candidate]) -> Vec<String> {
    let mut ids: Vec<String> = candidates.iter().flat_map(|c| c.path_ids()).collect();
    ids.sort();
    ids
}

#[tokio::test]
async fn test_snapshot_resolution() {
    init_tracing();
    let ledger = MemoryLedger::load_snapshot(SNAPSHOT).expect("snapshot should load");
    let resolver = PathResolver::with_defaults(&ledger);

    let candidates = resolver
        .resolve(&Context::new(alice()), &pay_usd(100))
        .await
        .unwrap();

    // The malformed and the closed trustline are skipped.
    assert_eq!(
        ids(&candidates),
        vec![
            "alice@mint.example[offer_alc]".to_string(),
            "carol@mint.example[offer_eur]".to_string(),
        ]
    );

    let by_eur = candidates.iter().find(|c| c.base_asset == eur()).unwrap();
    assert_eq!(by_eur.amount, Amount::from(80u64));
    assert_eq!(by_eur.funding, Funding::Balance);

    let by_alc = candidates
        .iter()
        .find(|c| c.base_asset == asset("alice@mint.example[ALC.0]"))
        .unwrap();
    assert_eq!(by_alc.amount, Amount::from(34u64));
    assert_eq!(by_alc.funding, Funding::Issuance);
}

#[tokio::test]
async fn test_candidates_serialize_for_settlement() {
    init_tracing();
    let ledger = MemoryLedger::load_snapshot(SNAPSHOT).unwrap();
    let resolver = PathResolver::with_defaults(&ledger);

    let candidates = resolver
        .resolve(&Context::new(alice()), &pay_usd(100))
        .await
        .unwrap();
    let json = serde_json::to_value(&candidates).unwrap();

    let eur_route = json
        .as_array()
        .unwrap()
        .iter()
        .find(|c| c["base_asset"] == "carol@mint.example[EUR.2]")
        .unwrap();
    assert_eq!(eur_route["amount"], "80");
    assert_eq!(eur_route["quote_amount"], "100");
    assert_eq!(eur_route["surcharge"], "0");
    assert_eq!(eur_route["funding"], "balance");
    assert_eq!(eur_route["path"][0]["id"], "carol@mint.example[offer_eur]");
    assert_eq!(eur_route["path"][0]["created"], 1_700_000_002_000i64);
}

#[tokio::test]
async fn test_snapshot_listings() {
    init_tracing();
    let ledger = MemoryLedger::load_snapshot(SNAPSHOT).unwrap();
    let ctx = Context::new(alice());

    let canonical = ledger
        .list_trustlines(&ctx, &usd(), Propagation::Canonical)
        .await
        .unwrap();
    assert_eq!(canonical.len(), 4);
    let closed = canonical
        .iter()
        .find(|t| t.id == "carol@mint.example[offer_closed]")
        .unwrap();
    assert_eq!(closed.status, TrustlineStatus::Closed);

    // Nothing has USD as its base asset.
    let propagated = ledger
        .list_trustlines(&ctx, &usd(), Propagation::Propagated)
        .await
        .unwrap();
    assert!(propagated.is_empty());

    // EUR was never minted on this ledger.
    let err = ledger
        .list_trustlines(&ctx, &eur(), Propagation::Canonical)
        .await
        .unwrap_err();
    assert_eq!(err.code(), Some("asset_not_found"));
}

#[test]
fn test_corrupt_snapshot_rejected() {
    let err = MemoryLedger::load_snapshot("{\"balances\": [{\"id\": 1}]}")
        .err()
        .unwrap();
    assert!(matches!(err, LedgerError::Snapshot(_)));
}
