// ═══════════════════════════════════════════════════════════════════
// Model Tests — Holding, Asset, QuoteSnapshot, QuoteCache, serde
// field-name fidelity of the published snapshot
// ═══════════════════════════════════════════════════════════════════

use chrono::{NaiveDate, TimeZone, Utc};
use uuid::Uuid;

use portfolio_dashboard_core::models::asset::{Asset, MarketData};
use portfolio_dashboard_core::models::enriched::{round2, UNCATEGORIZED_SECTOR};
use portfolio_dashboard_core::models::holding::{Holding, HoldingType};
use portfolio_dashboard_core::models::portfolio::Portfolio;
use portfolio_dashboard_core::models::quote::{QuoteCache, QuoteSnapshot, QuoteUpdate};
use portfolio_dashboard_core::services::aggregation_service::AggregationService;
use portfolio_dashboard_core::services::enrichment_service::EnrichmentService;

// ── Holding ─────────────────────────────────────────────────────────

#[test]
fn holding_investment_is_price_times_qty() {
    let holding = Holding::new("H1", HoldingType::Stock, "Apple Inc.", 185.5, 10);
    assert_eq!(holding.investment(), 1855.0);
}

#[test]
fn holding_with_zero_qty_has_zero_investment() {
    let holding = Holding::new("H1", HoldingType::Bond, "Gilt 2030", 100.0, 0);
    assert_eq!(holding.investment(), 0.0);
}

#[test]
fn holding_serde_uses_camel_case_catalog_names() {
    let json = r#"{
        "holdingId": "H1",
        "type": "mutualFund",
        "particulars": "Index Fund",
        "purchasePrice": 52.25,
        "purchaseQty": 40,
        "purchaseDate": "2024-03-01"
    }"#;
    let holding: Holding = serde_json::from_str(json).unwrap();
    assert_eq!(holding.holding_id, "H1");
    assert_eq!(holding.holding_type, HoldingType::MutualFund);
    assert_eq!(holding.purchase_price, 52.25);
    assert_eq!(holding.purchase_qty, 40);
    assert_eq!(
        holding.purchase_date,
        Some(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap())
    );

    let out = serde_json::to_string(&holding).unwrap();
    assert!(out.contains("\"holdingId\""));
    assert!(out.contains("\"type\":\"mutualFund\""));
    assert!(out.contains("\"purchasePrice\""));
}

#[test]
fn holding_purchase_date_is_optional() {
    let json = r#"{
        "holdingId": "H2",
        "type": "fixedDeposit",
        "particulars": "Bank FD",
        "purchasePrice": 1000.0,
        "purchaseQty": 1
    }"#;
    let holding: Holding = serde_json::from_str(json).unwrap();
    assert_eq!(holding.purchase_date, None);
}

// ── Asset / MarketData ──────────────────────────────────────────────

#[test]
fn asset_market_data_defaults_to_all_absent() {
    let json = r#"{"holdingId": "H1", "particulars": "Apple Inc."}"#;
    let asset: Asset = serde_json::from_str(json).unwrap();
    assert_eq!(asset.market_data, MarketData::default());
    assert!(asset.market_data.to_update().is_empty());
    assert_eq!(asset.sector, None);
    assert_eq!(asset.ticker, None);
}

#[test]
fn market_data_to_update_carries_only_present_fields() {
    let market_data = MarketData {
        cmp: Some(120.0),
        pe: None,
        market_cap: Some(2.5e12),
        latest_earnings: None,
    };
    let update = market_data.to_update();
    assert_eq!(update.cmp, Some(120.0));
    assert_eq!(update.pe, None);
    assert_eq!(update.market_cap, Some(2.5e12));
    assert!(!update.is_empty());
}

// ── QuoteUpdate / QuoteSnapshot merge semantics ─────────────────────

#[test]
fn quote_update_apply_only_overwrites_carried_fields() {
    let mut base = QuoteUpdate {
        cmp: Some(100.0),
        pe: Some(25.0),
        ..QuoteUpdate::default()
    };
    let overlay = QuoteUpdate {
        cmp: Some(105.0),
        latest_earnings: Some(6.1),
        ..QuoteUpdate::default()
    };
    base.apply(&overlay);

    assert_eq!(base.cmp, Some(105.0)); // overwritten
    assert_eq!(base.pe, Some(25.0)); // untouched
    assert_eq!(base.latest_earnings, Some(6.1)); // filled in
    assert_eq!(base.market_cap, None);
}

#[test]
fn snapshot_merge_composes_price_and_fundamentals_sources() {
    // One source carries P/E and earnings, another carries price.
    let mut fundamentals = QuoteSnapshot::new();
    fundamentals.set(
        "H1",
        QuoteUpdate {
            pe: Some(31.2),
            latest_earnings: Some(5.9),
            ..QuoteUpdate::default()
        },
    );

    let mut prices = QuoteSnapshot::new();
    prices.set(
        "H1",
        QuoteUpdate {
            cmp: Some(187.0),
            ..QuoteUpdate::default()
        },
    );

    fundamentals.merge(prices);
    let merged = fundamentals.get("H1").unwrap();
    assert_eq!(merged.cmp, Some(187.0));
    assert_eq!(merged.pe, Some(31.2));
    assert_eq!(merged.latest_earnings, Some(5.9));
}

#[test]
fn snapshot_set_overlays_rather_than_replacing() {
    let mut snapshot = QuoteSnapshot::new();
    snapshot.set(
        "H1",
        QuoteUpdate {
            cmp: Some(50.0),
            pe: Some(10.0),
            ..QuoteUpdate::default()
        },
    );
    snapshot.set(
        "H1",
        QuoteUpdate {
            cmp: Some(55.0),
            ..QuoteUpdate::default()
        },
    );

    let merged = snapshot.get("H1").unwrap();
    assert_eq!(merged.cmp, Some(55.0));
    assert_eq!(merged.pe, Some(10.0));
}

#[test]
fn snapshot_len_counts_distinct_holdings() {
    let mut snapshot = QuoteSnapshot::new();
    assert!(snapshot.is_empty());
    snapshot.set("H1", QuoteUpdate::default());
    snapshot.set("H2", QuoteUpdate::default());
    snapshot.set("H1", QuoteUpdate::default());
    assert_eq!(snapshot.len(), 2);
}

// ── QuoteCache ──────────────────────────────────────────────────────

#[test]
fn quote_cache_freshness_respects_ttl() {
    let fetched_at = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
    let cache = QuoteCache::new(QuoteSnapshot::new(), fetched_at);
    let ttl = chrono::Duration::seconds(10);

    assert!(cache.is_fresh(fetched_at + chrono::Duration::seconds(5), ttl));
    assert!(!cache.is_fresh(fetched_at + chrono::Duration::seconds(10), ttl));
    assert!(!cache.is_fresh(fetched_at + chrono::Duration::seconds(60), ttl));
    assert_eq!(cache.fetched_at(), fetched_at);
}

// ── Rounding ────────────────────────────────────────────────────────

#[test]
fn round2_rounds_to_two_decimals() {
    assert_eq!(round2(10.006), 10.01);
    assert_eq!(round2(33.333333), 33.33);
    assert_eq!(round2(-0.125), -0.13);
    assert_eq!(round2(0.0), 0.0);
}

// ── Serde fidelity of the published snapshot ────────────────────────

#[test]
fn enriched_portfolio_serializes_with_exact_field_names() {
    let portfolio = Portfolio {
        portfolio_id: 1,
        user_id: Uuid::nil(),
        portfolio_name: "Growth".into(),
        portfolio_type: "Equity".into(),
        holdings: vec![Holding::new("H1", HoldingType::Stock, "Apple Inc.", 100.0, 10)],
    };
    let assets = vec![Asset::new("H1", "Apple Inc.").with_sector("Tech")];
    let mut quotes = QuoteSnapshot::new();
    quotes.set(
        "H1",
        QuoteUpdate {
            cmp: Some(120.0),
            ..QuoteUpdate::default()
        },
    );

    let enrichment = EnrichmentService::new();
    let aggregation = AggregationService::new();
    let holdings = enrichment.enrich_holdings(&portfolio, &assets, &quotes);
    let enriched = aggregation.aggregate(&portfolio, holdings);

    let json = serde_json::to_string(&enriched).unwrap();
    for field in [
        "\"portfolioId\"",
        "\"userId\"",
        "\"portfolioName\"",
        "\"portfolioType\"",
        "\"holdings\"",
        "\"totalInvestment\"",
        "\"totalPresentValue\"",
        "\"totalGainLoss\"",
        "\"sectors\"",
        "\"holdingId\"",
        "\"type\"",
        "\"particulars\"",
        "\"purchasePrice\"",
        "\"purchaseQty\"",
        "\"cmp\"",
        "\"pe\"",
        "\"marketCap\"",
        "\"latestEarnings\"",
        "\"investment\"",
        "\"presentValue\"",
        "\"gainLoss\"",
        "\"gainLossPercent\"",
        "\"portfolioPercent\"",
        "\"sectorPercent\"",
    ] {
        assert!(json.contains(field), "missing field {field} in {json}");
    }
}

#[test]
fn uncategorized_sector_literal_is_stable() {
    // Consumers group on this exact label; it must never drift.
    assert_eq!(UNCATEGORIZED_SECTOR, "Uncategorized");
}
