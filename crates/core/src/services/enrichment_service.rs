use std::collections::HashMap;

use crate::models::asset::Asset;
use crate::models::enriched::{EnrichedHolding, UNCATEGORIZED_SECTOR};
use crate::models::holding::Holding;
use crate::models::portfolio::Portfolio;
use crate::models::quote::{QuoteSnapshot, QuoteUpdate};

/// Joins static holdings with market asset records and the merged quote
/// snapshot, and computes per-holding derived figures.
///
/// Pure business logic — no I/O, no clock, no hidden state. Running it
/// twice on identical inputs yields identical output.
pub struct EnrichmentService;

impl EnrichmentService {
    pub fn new() -> Self {
        Self
    }

    /// Index assets by holding id for the join.
    ///
    /// Exact equality on `holdingId`; if the catalog carries duplicate
    /// records for an id, the last one wins.
    #[must_use]
    pub fn index_assets<'a>(&self, assets: &'a [Asset]) -> HashMap<&'a str, &'a Asset> {
        let mut index = HashMap::with_capacity(assets.len());
        for asset in assets {
            index.insert(asset.holding_id.as_str(), asset);
        }
        index
    }

    /// Join one holding to its matched asset (or absence) and compute
    /// all derived fields except `portfolioPercent`, which needs the
    /// portfolio total and is filled in by the aggregator's second pass.
    ///
    /// A join miss is not an error: all live fields stay absent and
    /// present value falls back to the purchase price, so the holding's
    /// gain/loss reads as exactly zero.
    #[must_use]
    pub fn enrich_holding(
        &self,
        holding: &Holding,
        asset: Option<&Asset>,
        quote: Option<&QuoteUpdate>,
    ) -> EnrichedHolding {
        let sector = asset
            .and_then(|a| a.sector.as_deref())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(UNCATEGORIZED_SECTOR)
            .to_string();

        let cmp = quote.and_then(|q| q.cmp);
        let pe = quote.and_then(|q| q.pe);
        let market_cap = quote.and_then(|q| q.market_cap);
        let latest_earnings = quote.and_then(|q| q.latest_earnings);

        let investment = holding.investment();
        let present_value = cmp.unwrap_or(holding.purchase_price) * f64::from(holding.purchase_qty);
        let gain_loss = present_value - investment;
        let gain_loss_percent = if investment != 0.0 {
            (gain_loss / investment) * 100.0
        } else {
            0.0
        };

        EnrichedHolding {
            holding_id: holding.holding_id.clone(),
            holding_type: holding.holding_type,
            particulars: holding.particulars.clone(),
            purchase_price: holding.purchase_price,
            purchase_qty: holding.purchase_qty,
            purchase_date: holding.purchase_date,
            sector,
            cmp,
            pe,
            market_cap,
            latest_earnings,
            investment,
            present_value,
            gain_loss,
            gain_loss_percent,
            portfolio_percent: 0.0, // set by the portfolio aggregator
        }
    }

    /// Enrich every holding in a portfolio against the asset catalog and
    /// the merged quote snapshot. Output order matches catalog order.
    #[must_use]
    pub fn enrich_holdings(
        &self,
        portfolio: &Portfolio,
        assets: &[Asset],
        quotes: &QuoteSnapshot,
    ) -> Vec<EnrichedHolding> {
        let index = self.index_assets(assets);
        portfolio
            .holdings
            .iter()
            .map(|holding| {
                let asset = index.get(holding.holding_id.as_str()).copied();
                let quote = quotes.get(&holding.holding_id);
                self.enrich_holding(holding, asset, quote)
            })
            .collect()
    }
}

impl Default for EnrichmentService {
    fn default() -> Self {
        Self::new()
    }
}
