use async_trait::async_trait;
use log::warn;
use reqwest::Client;
use std::time::Duration;

use super::traits::QuoteSource;
use crate::errors::CoreError;
use crate::models::asset::Asset;
use crate::models::quote::{QuoteSnapshot, QuoteUpdate};

/// Fundamentals source backed by a published spreadsheet CSV export.
///
/// Expects rows of `holdingId,ticker,pe,eps` (header skipped) and
/// carries only `pe` and `latestEarnings` — prices come from the live
/// price source. Rows for holdings not in the catalog are ignored.
pub struct SheetFundamentalsSource {
    client: Client,
    url: String,
}

impl SheetFundamentalsSource {
    pub fn new(url: impl Into<String>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| Client::new());
        Self {
            client,
            url: url.into(),
        }
    }

    /// Parse the CSV body into per-holding fundamentals.
    /// Blank or malformed rows are skipped, not fatal.
    fn parse_csv(&self, body: &str) -> QuoteSnapshot {
        let mut snapshot = QuoteSnapshot::new();

        for line in body.trim().lines().skip(1) {
            let mut fields = line.split(',').map(str::trim);
            let (Some(holding_id), Some(_ticker)) = (fields.next(), fields.next()) else {
                continue;
            };
            if holding_id.is_empty() {
                continue;
            }

            let pe = fields.next().and_then(|s| s.parse::<f64>().ok());
            let eps = fields.next().and_then(|s| s.parse::<f64>().ok());
            if pe.is_none() && eps.is_none() {
                warn!("Skipping fundamentals row with no numeric fields: {line}");
                continue;
            }

            snapshot.set(
                holding_id.to_string(),
                QuoteUpdate {
                    pe,
                    latest_earnings: eps,
                    ..QuoteUpdate::default()
                },
            );
        }

        snapshot
    }
}

#[async_trait]
impl QuoteSource for SheetFundamentalsSource {
    fn name(&self) -> &str {
        "Fundamentals Sheet"
    }

    async fn fetch_quotes(&self, assets: &[Asset]) -> Result<QuoteSnapshot, CoreError> {
        let response = self.client.get(&self.url).send().await?;

        if !response.status().is_success() {
            return Err(CoreError::Api {
                source_name: "Fundamentals Sheet".into(),
                message: format!("Sheet fetch failed with status {}", response.status()),
            });
        }

        let body = response.text().await?;
        let parsed = self.parse_csv(&body);

        // Keep only rows that correspond to a catalog asset; the sheet
        // may carry extra instruments the dashboard doesn't track.
        let mut snapshot = QuoteSnapshot::new();
        for asset in assets {
            if let Some(update) = parsed.get(&asset.holding_id) {
                snapshot.set(asset.holding_id.clone(), update.clone());
            }
        }

        Ok(snapshot)
    }
}
