use async_trait::async_trait;

use crate::errors::CoreError;
use crate::models::asset::Asset;
use crate::models::quote::QuoteSnapshot;

/// Trait abstraction for all live quote sources.
///
/// Each upstream feed (Yahoo Finance for prices, the fundamentals sheet
/// for P/E and earnings) implements this trait. If a feed stops working
/// or changes shape, only that one implementation is touched — the
/// orchestrator and pipeline never see the difference.
#[async_trait]
pub trait QuoteSource: Send + Sync {
    /// Human-readable name of this source (for logs/errors).
    fn name(&self) -> &str;

    /// Fetch quote data for the given catalog assets.
    ///
    /// A source only populates the fields it carries; holdings it has no
    /// data for are simply absent from the returned snapshot. Returning
    /// `Err` means the whole source failed for this cycle.
    async fn fetch_quotes(&self, assets: &[Asset]) -> Result<QuoteSnapshot, CoreError>;
}
