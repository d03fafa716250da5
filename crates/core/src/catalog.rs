use serde::{Deserialize, Serialize};

use crate::errors::CoreError;
use crate::models::asset::Asset;
use crate::models::portfolio::{Portfolio, User};
use crate::models::quote::QuoteSnapshot;

/// The static catalog: users, their portfolios of holdings, and the
/// market asset records holdings join against.
///
/// Loaded once from JSON and treated as immutable by the pipeline; it
/// only changes when the underlying files are edited externally. A
/// malformed catalog is a hard failure — no partial snapshot is ever
/// published from half-parsed data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub users: Vec<User>,
    pub portfolios: Vec<Portfolio>,
    pub assets: Vec<Asset>,
}

impl Catalog {
    pub fn new(portfolios: Vec<Portfolio>, assets: Vec<Asset>) -> Self {
        Self {
            users: Vec::new(),
            portfolios,
            assets,
        }
    }

    /// Parse a catalog from the three JSON documents the dashboard data
    /// directory ships (`portfolios.json`, `assets.json`, `users.json`).
    pub fn from_json(
        portfolios_json: &str,
        assets_json: &str,
        users_json: Option<&str>,
    ) -> Result<Self, CoreError> {
        let portfolios: Vec<Portfolio> = serde_json::from_str(portfolios_json)?;
        let assets: Vec<Asset> = serde_json::from_str(assets_json)?;
        let users: Vec<User> = match users_json {
            Some(json) => serde_json::from_str(json)?,
            None => Vec::new(),
        };
        let catalog = Self {
            users,
            portfolios,
            assets,
        };
        catalog.validate()?;
        Ok(catalog)
    }

    /// Check invariants JSON parsing alone can't enforce. A catalog that
    /// fails here is treated the same as one that fails to parse.
    pub fn validate(&self) -> Result<(), CoreError> {
        for portfolio in &self.portfolios {
            for holding in &portfolio.holdings {
                if holding.holding_id.trim().is_empty() {
                    return Err(CoreError::ValidationError(format!(
                        "Portfolio {} contains a holding with an empty holdingId",
                        portfolio.portfolio_id
                    )));
                }
                if !holding.purchase_price.is_finite() || holding.purchase_price < 0.0 {
                    return Err(CoreError::ValidationError(format!(
                        "Holding {} has invalid purchasePrice {}",
                        holding.holding_id, holding.purchase_price
                    )));
                }
            }
        }
        Ok(())
    }

    /// Load a catalog from JSON files on disk.
    pub fn load_from_files(
        portfolios_path: &str,
        assets_path: &str,
        users_path: Option<&str>,
    ) -> Result<Self, CoreError> {
        let portfolios_json = std::fs::read_to_string(portfolios_path)?;
        let assets_json = std::fs::read_to_string(assets_path)?;
        let users_json = match users_path {
            Some(path) => Some(std::fs::read_to_string(path)?),
            None => None,
        };
        Self::from_json(&portfolios_json, &assets_json, users_json.as_deref())
    }

    /// Build the baseline quote snapshot from the catalog assets'
    /// shipped `marketData`. Live sources merge over this, field by
    /// field, so holdings keep their last-known figures when a source
    /// has nothing newer.
    #[must_use]
    pub fn baseline_quotes(&self) -> QuoteSnapshot {
        let mut snapshot = QuoteSnapshot::new();
        for asset in &self.assets {
            let update = asset.market_data.to_update();
            if !update.is_empty() {
                snapshot.set(asset.holding_id.clone(), update);
            }
        }
        snapshot
    }

    /// Total number of holdings across all portfolios.
    #[must_use]
    pub fn holding_count(&self) -> usize {
        self.portfolios.iter().map(|p| p.holdings.len()).sum()
    }
}
