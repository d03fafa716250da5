use async_trait::async_trait;
use log::warn;

use super::traits::QuoteSource;
use crate::errors::CoreError;
use crate::models::asset::Asset;
use crate::models::quote::{QuoteSnapshot, QuoteUpdate};

/// Yahoo Finance source for current market prices.
///
/// - **Free**: No API key required (unofficial public API).
/// - **Coverage**: Global equities, ETFs, mutual funds.
/// - **Fields carried**: `cmp` only — fundamentals come from the sheet
///   source and are never overwritten by this one.
///
/// Uses the `yahoo_finance_api` crate which wraps Yahoo Finance's public
/// endpoints. A holding whose ticker fails to resolve just stays absent
/// from the snapshot for this cycle; only a wholesale failure (every
/// ticker errored) fails the source.
pub struct YahooQuoteSource {
    connector: yahoo_finance_api::YahooConnector,
}

impl YahooQuoteSource {
    pub fn new() -> Result<Self, CoreError> {
        let connector = yahoo_finance_api::YahooConnector::new().map_err(|e| CoreError::Api {
            source_name: "Yahoo Finance".into(),
            message: format!("Failed to create connector: {e}"),
        })?;
        Ok(Self { connector })
    }

    async fn latest_close(&self, ticker: &str) -> Result<f64, CoreError> {
        let resp = self
            .connector
            .get_latest_quotes(ticker, "1d")
            .await
            .map_err(|e| CoreError::Api {
                source_name: "Yahoo Finance".into(),
                message: format!("Failed to fetch latest quote for {ticker}: {e}"),
            })?;

        let quote = resp.last_quote().map_err(|e| CoreError::Api {
            source_name: "Yahoo Finance".into(),
            message: format!("No quote data for {ticker}: {e}"),
        })?;

        Ok(quote.close)
    }
}

#[async_trait]
impl QuoteSource for YahooQuoteSource {
    fn name(&self) -> &str {
        "Yahoo Finance"
    }

    async fn fetch_quotes(&self, assets: &[Asset]) -> Result<QuoteSnapshot, CoreError> {
        let mut snapshot = QuoteSnapshot::new();
        let mut attempted = 0usize;
        let mut last_error = None;

        for asset in assets {
            let Some(ticker) = asset.ticker.as_deref() else {
                continue; // bonds/FDs have no ticker — nothing to fetch
            };
            attempted += 1;

            match self.latest_close(ticker).await {
                Ok(close) => {
                    // Reject garbage quotes rather than poisoning the snapshot
                    if !close.is_finite() || close < 0.0 {
                        warn!("Yahoo returned invalid price {close} for {ticker}, skipping");
                        continue;
                    }
                    snapshot.set(
                        asset.holding_id.clone(),
                        QuoteUpdate {
                            cmp: Some(close),
                            ..QuoteUpdate::default()
                        },
                    );
                }
                Err(e) => {
                    warn!("Yahoo quote for {ticker} failed: {e}");
                    last_error = Some(e);
                }
            }
        }

        // Every single ticker failed — treat the source itself as down.
        if attempted > 0 && snapshot.is_empty() {
            return Err(last_error.unwrap_or_else(|| CoreError::Api {
                source_name: "Yahoo Finance".into(),
                message: "No quotes returned".into(),
            }));
        }

        Ok(snapshot)
    }
}
