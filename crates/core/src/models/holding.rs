use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// The kind of instrument a holding represents.
/// Closed set — the catalog schema only knows these four.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum HoldingType {
    /// Exchange-listed equity
    Stock,
    /// Government or corporate bond
    Bond,
    /// Mutual fund unit
    MutualFund,
    /// Bank fixed deposit
    FixedDeposit,
}

impl std::fmt::Display for HoldingType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HoldingType::Stock => write!(f, "Stock"),
            HoldingType::Bond => write!(f, "Bond"),
            HoldingType::MutualFund => write!(f, "Mutual Fund"),
            HoldingType::FixedDeposit => write!(f, "Fixed Deposit"),
        }
    }
}

/// One purchased position within a portfolio, as it appears in the
/// static catalog. Immutable for the duration of a refresh cycle;
/// everything derived from it lives on [`EnrichedHolding`].
///
/// [`EnrichedHolding`]: crate::models::enriched::EnrichedHolding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Holding {
    /// Unique identifier within a portfolio. Joins this holding to its
    /// market [`Asset`](crate::models::asset::Asset) record.
    pub holding_id: String,

    /// Instrument kind (stock, bond, mutual fund, fixed deposit)
    #[serde(rename = "type")]
    pub holding_type: HoldingType,

    /// Display name (e.g., stock name, bond series)
    pub particulars: String,

    /// Price paid per unit at purchase
    pub purchase_price: f64,

    /// Number of units purchased
    pub purchase_qty: u32,

    /// Date of purchase, if recorded
    #[serde(default)]
    pub purchase_date: Option<NaiveDate>,
}

impl Holding {
    pub fn new(
        holding_id: impl Into<String>,
        holding_type: HoldingType,
        particulars: impl Into<String>,
        purchase_price: f64,
        purchase_qty: u32,
    ) -> Self {
        Self {
            holding_id: holding_id.into(),
            holding_type,
            particulars: particulars.into(),
            purchase_price,
            purchase_qty,
            purchase_date: None,
        }
    }

    /// Cost basis of this holding: purchase price × quantity.
    /// Always defined; zero price or quantity simply yields 0.
    #[must_use]
    pub fn investment(&self) -> f64 {
        self.purchase_price * f64::from(self.purchase_qty)
    }
}
