use serde::{Deserialize, Serialize};

use super::quote::QuoteUpdate;

/// Live-quote sub-record attached to a catalog asset.
///
/// Every field is optional: `None` means "no figure available from any
/// source yet", which the pipeline treats as absent rather than zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketData {
    /// Current market price
    pub cmp: Option<f64>,

    /// Price/earnings ratio
    pub pe: Option<f64>,

    /// Market capitalization
    pub market_cap: Option<f64>,

    /// Latest reported earnings figure
    pub latest_earnings: Option<f64>,
}

impl MarketData {
    /// Convert the catalog baseline into a quote update so it can seed
    /// the snapshot that live sources later merge over.
    #[must_use]
    pub fn to_update(&self) -> QuoteUpdate {
        QuoteUpdate {
            cmp: self.cmp,
            pe: self.pe,
            market_cap: self.market_cap,
            latest_earnings: self.latest_earnings,
        }
    }
}

/// Market record for a holding: sector classification, exchange ticker,
/// and the most recently known quote figures.
///
/// Matched to a [`Holding`](crate::models::holding::Holding) by exact
/// equality on `holding_id`. If the catalog carries duplicate records for
/// the same id, the last one wins — a documented policy, not an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    /// Identifier matching a holding's `holding_id`
    pub holding_id: String,

    /// Exchange ticker used by live-price sources (e.g., "AAPL", "TCS.NS")
    #[serde(default)]
    pub ticker: Option<String>,

    /// Display name
    pub particulars: String,

    /// Sector classification. Empty or missing sector is grouped under
    /// the fixed "Uncategorized" label during aggregation.
    #[serde(default)]
    pub sector: Option<String>,

    /// Baseline quote figures shipped with the catalog
    #[serde(default)]
    pub market_data: MarketData,
}

impl Asset {
    pub fn new(holding_id: impl Into<String>, particulars: impl Into<String>) -> Self {
        Self {
            holding_id: holding_id.into(),
            ticker: None,
            particulars: particulars.into(),
            sector: None,
            market_data: MarketData::default(),
        }
    }

    pub fn with_sector(mut self, sector: impl Into<String>) -> Self {
        self.sector = Some(sector.into());
        self
    }

    pub fn with_ticker(mut self, ticker: impl Into<String>) -> Self {
        self.ticker = Some(ticker.into());
        self
    }

    pub fn with_market_data(mut self, market_data: MarketData) -> Self {
        self.market_data = market_data;
        self
    }
}
