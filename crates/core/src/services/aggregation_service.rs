use std::collections::HashMap;

use crate::models::enriched::{EnrichedHolding, EnrichedPortfolio, SectorSummary};
use crate::models::portfolio::Portfolio;

/// Fixed-shape accumulator for one sector's running sums.
#[derive(Debug, Clone, Copy, Default)]
struct SectorAccumulator {
    total_investment: f64,
    total_present_value: f64,
    total_gain_loss: f64,
}

/// Rolls post-metrics holdings up into portfolio totals, back-derives
/// each holding's portfolio weight, and groups holdings into sector
/// summaries.
///
/// Pure business logic, like [`EnrichmentService`] — aggregation runs on
/// unrounded values so rounding error never compounds across sums.
///
/// [`EnrichmentService`]: crate::services::enrichment_service::EnrichmentService
pub struct AggregationService;

impl AggregationService {
    pub fn new() -> Self {
        Self
    }

    /// Aggregate a portfolio's enriched holdings into the final
    /// [`EnrichedPortfolio`].
    ///
    /// Two passes over the holdings:
    /// 1. Sum `investment` and `presentValue` into the portfolio totals.
    /// 2. Set each holding's `portfolioPercent` against that total —
    ///    the weight is only meaningful once the denominator is known,
    ///    so this ordering is deliberate, not incidental.
    #[must_use]
    pub fn aggregate(
        &self,
        portfolio: &Portfolio,
        mut holdings: Vec<EnrichedHolding>,
    ) -> EnrichedPortfolio {
        // Pass 1: portfolio totals
        let total_investment: f64 = holdings.iter().map(|h| h.investment).sum();
        let total_present_value: f64 = holdings.iter().map(|h| h.present_value).sum();
        let total_gain_loss = total_present_value - total_investment;

        // Pass 2: per-holding portfolio weight
        for holding in &mut holdings {
            holding.portfolio_percent = if total_investment != 0.0 {
                (holding.investment / total_investment) * 100.0
            } else {
                0.0
            };
        }

        let sectors = self.sector_summaries(&holdings, total_investment);

        EnrichedPortfolio {
            portfolio_id: portfolio.portfolio_id,
            user_id: portfolio.user_id,
            portfolio_name: portfolio.portfolio_name.clone(),
            portfolio_type: portfolio.portfolio_type.clone(),
            holdings,
            total_investment,
            total_present_value,
            total_gain_loss,
            sectors,
        }
    }

    /// Group holdings by sector label and sum their figures.
    ///
    /// `sectorPercent` is measured against the *portfolio's* total
    /// investment, not the sector's own size. Output is sorted by sector
    /// label so consumers see a deterministic order.
    #[must_use]
    fn sector_summaries(
        &self,
        holdings: &[EnrichedHolding],
        total_investment: f64,
    ) -> Vec<SectorSummary> {
        let mut accumulators: HashMap<&str, SectorAccumulator> = HashMap::new();

        for holding in holdings {
            let acc = accumulators.entry(holding.sector.as_str()).or_default();
            acc.total_investment += holding.investment;
            acc.total_present_value += holding.present_value;
            acc.total_gain_loss += holding.gain_loss;
        }

        let mut sectors: Vec<SectorSummary> = accumulators
            .into_iter()
            .map(|(sector, acc)| SectorSummary {
                sector: sector.to_string(),
                total_investment: acc.total_investment,
                total_present_value: acc.total_present_value,
                total_gain_loss: acc.total_gain_loss,
                sector_percent: if total_investment != 0.0 {
                    (acc.total_investment / total_investment) * 100.0
                } else {
                    0.0
                },
            })
            .collect();

        sectors.sort_by(|a, b| a.sector.cmp(&b.sector));
        sectors
    }
}

impl Default for AggregationService {
    fn default() -> Self {
        Self::new()
    }
}
