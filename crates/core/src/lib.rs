pub mod catalog;
pub mod errors;
pub mod models;
pub mod services;
pub mod sources;

use std::sync::Arc;

use catalog::Catalog;
use errors::CoreError;
use models::enriched::EnrichedPortfolio;
use models::settings::Settings;
use services::refresh_service::{
    spawn_polling, DashboardState, PollingHandle, RefreshOutcome, RefreshService,
};
use sources::sheets::SheetFundamentalsSource;
use sources::traits::QuoteSource;
use sources::yahoo::YahooQuoteSource;

/// Main entry point for the portfolio-dashboard core library.
///
/// Owns the static catalog and the refresh orchestrator, and exposes the
/// enriched snapshot to the presentation layer. The UI only starts/stops
/// polling and reads published state — it never re-runs pipeline logic.
#[must_use]
pub struct Dashboard {
    service: Arc<RefreshService>,
    polling: Option<PollingHandle>,
}

impl std::fmt::Debug for Dashboard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dashboard")
            .field("portfolios", &self.service.catalog().portfolios.len())
            .field("holdings", &self.service.catalog().holding_count())
            .field("polling", &self.polling.is_some())
            .finish()
    }
}

impl Dashboard {
    /// Create a dashboard with the default quote sources: Yahoo Finance
    /// for live prices, plus the fundamentals sheet when a URL is
    /// configured in `settings`.
    pub fn new(catalog: Catalog, settings: Settings) -> Self {
        let sources = Self::default_sources(&settings);
        Self::with_sources(catalog, settings, sources)
    }

    /// Create a dashboard with an explicit set of quote sources.
    /// Source order matters: later sources merge over earlier ones,
    /// field by field.
    pub fn with_sources(
        catalog: Catalog,
        settings: Settings,
        sources: Vec<Box<dyn QuoteSource>>,
    ) -> Self {
        Self {
            service: Arc::new(RefreshService::new(catalog, sources, settings)),
            polling: None,
        }
    }

    /// Load the catalog from JSON files and build a dashboard with the
    /// default sources. A malformed catalog is a hard failure — nothing
    /// is constructed from half-parsed data.
    pub fn load_from_files(
        portfolios_path: &str,
        assets_path: &str,
        users_path: Option<&str>,
        settings: Settings,
    ) -> Result<Self, CoreError> {
        let catalog = Catalog::load_from_files(portfolios_path, assets_path, users_path)?;
        Ok(Self::new(catalog, settings))
    }

    fn default_sources(settings: &Settings) -> Vec<Box<dyn QuoteSource>> {
        let mut sources: Vec<Box<dyn QuoteSource>> = Vec::new();

        // Fundamentals first, so the live-price source is the later
        // (field-by-field winning) merge for any overlap.
        if let Some(url) = &settings.fundamentals_sheet_url {
            sources.push(Box::new(SheetFundamentalsSource::new(url.clone())));
        }

        if let Ok(yahoo) = YahooQuoteSource::new() {
            sources.push(Box::new(yahoo));
        }

        sources
    }

    // ── Refresh ─────────────────────────────────────────────────────

    /// Run one refresh cycle now (the manual-retry affordance).
    /// Returns `Skipped` if a cycle is already in flight.
    pub async fn refresh(&self) -> Result<RefreshOutcome, CoreError> {
        self.service.refresh().await
    }

    /// Current published state: status, portfolios, last update time,
    /// last error.
    #[must_use]
    pub fn state(&self) -> DashboardState {
        self.service.state()
    }

    /// Subscribe to state transitions (for reactive consumers).
    #[must_use]
    pub fn subscribe(&self) -> tokio::sync::watch::Receiver<DashboardState> {
        self.service.subscribe()
    }

    // ── Polling ─────────────────────────────────────────────────────

    /// Start the recurring refresh task (first cycle fires immediately).
    /// A no-op if polling is already running.
    pub fn start_polling(&mut self) {
        if self.polling.is_none() {
            self.polling = Some(spawn_polling(Arc::clone(&self.service)));
        }
    }

    /// Stop the recurring refresh task. Any in-flight fetch's result is
    /// discarded along with the timer.
    pub fn stop_polling(&mut self) {
        if let Some(handle) = self.polling.take() {
            handle.stop();
        }
    }

    #[must_use]
    pub fn is_polling(&self) -> bool {
        self.polling.is_some()
    }

    // ── Snapshot access ─────────────────────────────────────────────

    /// The latest enriched portfolios, if any cycle has completed.
    #[must_use]
    pub fn portfolios(&self) -> Option<Arc<Vec<EnrichedPortfolio>>> {
        self.service.state().portfolios
    }

    /// Serialize the latest snapshot for the presentation layer, with
    /// all figures rounded to 2 decimals. Returns `None` before the
    /// first completed cycle.
    pub fn snapshot_json(&self) -> Result<Option<String>, CoreError> {
        let Some(portfolios) = self.portfolios() else {
            return Ok(None);
        };
        let rounded: Vec<EnrichedPortfolio> =
            portfolios.iter().map(EnrichedPortfolio::rounded).collect();
        let json = serde_json::to_string_pretty(&rounded)
            .map_err(|e| CoreError::Serialization(format!("Failed to serialize snapshot: {e}")))?;
        Ok(Some(json))
    }

    // ── Catalog access ──────────────────────────────────────────────

    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        self.service.catalog()
    }

    #[must_use]
    pub fn settings(&self) -> &Settings {
        self.service.settings()
    }
}

impl Drop for Dashboard {
    fn drop(&mut self) {
        self.stop_polling();
    }
}
