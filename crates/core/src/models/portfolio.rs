use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::holding::Holding;

/// A named portfolio of static holdings, as loaded from the catalog.
///
/// Carries no derived figures — those live on
/// [`EnrichedPortfolio`](crate::models::enriched::EnrichedPortfolio),
/// recomputed from scratch on every refresh cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Portfolio {
    pub portfolio_id: u64,

    /// Owning user's id
    pub user_id: Uuid,

    pub portfolio_name: String,

    /// Free-form classification, e.g. "Equity", "Debt", "Mixed"
    pub portfolio_type: String,

    pub holdings: Vec<Holding>,
}

/// Root user record from the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub user_id: Uuid,
    pub user_name: String,
}
