use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::holding::HoldingType;

/// Sector label used for holdings whose asset carries no sector, or for
/// holdings with no matching asset at all.
pub const UNCATEGORIZED_SECTOR: &str = "Uncategorized";

/// Round a currency/percentage figure to 2 decimal places.
///
/// Presentation only — aggregation always runs on unrounded values so
/// rounding error never compounds across sums.
#[must_use]
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// A holding joined with its market record and carrying all derived
/// figures. Produced fresh on every refresh cycle; every derived field
/// is a pure function of the holding, its matched asset (or absence),
/// the merged quote snapshot, and sibling holdings' investments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedHolding {
    // ── Static fields, carried over from the catalog ────────────────
    pub holding_id: String,
    #[serde(rename = "type")]
    pub holding_type: HoldingType,
    pub particulars: String,
    pub purchase_price: f64,
    pub purchase_qty: u32,
    #[serde(default)]
    pub purchase_date: Option<NaiveDate>,

    // ── Joined market fields (absent on a join miss) ────────────────
    /// Sector label, never empty — falls back to [`UNCATEGORIZED_SECTOR`]
    pub sector: String,
    pub cmp: Option<f64>,
    pub pe: Option<f64>,
    pub market_cap: Option<f64>,
    pub latest_earnings: Option<f64>,

    // ── Derived fields ──────────────────────────────────────────────
    /// purchasePrice × purchaseQty
    pub investment: f64,
    /// (cmp ?? purchasePrice) × purchaseQty
    pub present_value: f64,
    /// presentValue − investment
    pub gain_loss: f64,
    /// (gainLoss / investment) × 100, or 0 when investment is 0
    pub gain_loss_percent: f64,
    /// (investment / portfolio totalInvestment) × 100, or 0 when the
    /// total is 0. Set by the portfolio aggregator's second pass.
    pub portfolio_percent: f64,
}

impl EnrichedHolding {
    /// Copy with all monetary/percent figures rounded to 2 decimals.
    #[must_use]
    pub fn rounded(&self) -> Self {
        Self {
            investment: round2(self.investment),
            present_value: round2(self.present_value),
            gain_loss: round2(self.gain_loss),
            gain_loss_percent: round2(self.gain_loss_percent),
            portfolio_percent: round2(self.portfolio_percent),
            ..self.clone()
        }
    }
}

/// Per-sector aggregate over a portfolio's enriched holdings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectorSummary {
    pub sector: String,
    pub total_investment: f64,
    pub total_present_value: f64,
    pub total_gain_loss: f64,
    /// This sector's investment as a percentage of the *portfolio's*
    /// total investment (not the sector's own size); 0 when the
    /// portfolio total is 0.
    pub sector_percent: f64,
}

impl SectorSummary {
    #[must_use]
    pub fn rounded(&self) -> Self {
        Self {
            sector: self.sector.clone(),
            total_investment: round2(self.total_investment),
            total_present_value: round2(self.total_present_value),
            total_gain_loss: round2(self.total_gain_loss),
            sector_percent: round2(self.sector_percent),
        }
    }
}

/// A portfolio with fully enriched holdings, portfolio totals, and
/// sector summaries — the pipeline's final output for one portfolio.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedPortfolio {
    pub portfolio_id: u64,
    pub user_id: Uuid,
    pub portfolio_name: String,
    pub portfolio_type: String,
    pub holdings: Vec<EnrichedHolding>,
    /// Σ investment over holdings
    pub total_investment: f64,
    /// Σ presentValue over holdings
    pub total_present_value: f64,
    /// totalPresentValue − totalInvestment
    pub total_gain_loss: f64,
    pub sectors: Vec<SectorSummary>,
}

impl EnrichedPortfolio {
    /// Copy with every figure rounded to 2 decimals for presentation.
    #[must_use]
    pub fn rounded(&self) -> Self {
        Self {
            portfolio_id: self.portfolio_id,
            user_id: self.user_id,
            portfolio_name: self.portfolio_name.clone(),
            portfolio_type: self.portfolio_type.clone(),
            holdings: self.holdings.iter().map(EnrichedHolding::rounded).collect(),
            total_investment: round2(self.total_investment),
            total_present_value: round2(self.total_present_value),
            total_gain_loss: round2(self.total_gain_loss),
            sectors: self.sectors.iter().map(SectorSummary::rounded).collect(),
        }
    }
}
