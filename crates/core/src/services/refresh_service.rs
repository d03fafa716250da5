use chrono::{DateTime, Utc};
use log::{debug, warn};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;

use crate::catalog::Catalog;
use crate::errors::CoreError;
use crate::models::enriched::EnrichedPortfolio;
use crate::models::quote::{Clock, QuoteCache, QuoteSnapshot, SystemClock};
use crate::models::settings::Settings;
use crate::services::aggregation_service::AggregationService;
use crate::services::enrichment_service::EnrichmentService;
use crate::sources::traits::QuoteSource;

/// Where the refresh cycle currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshStatus {
    /// No refresh has been attempted yet
    Idle,
    /// A cycle is in flight
    Fetching,
    /// The published portfolios come from a completed cycle
    Ready,
    /// The last cycle failed; published portfolios (if any) are stale
    Failed,
}

/// The state published to consumers after every transition.
///
/// `portfolios` is an immutable snapshot behind an `Arc`: a new refresh
/// replaces the whole reference, never mutates it in place. Consumers
/// can distinguish "still loading" (`Fetching`/`Idle` with no
/// portfolios), "failed, showing stale data" (`Failed` with portfolios
/// and `last_error`), and "no data at all" (`Failed` with none).
#[derive(Debug, Clone)]
pub struct DashboardState {
    pub status: RefreshStatus,
    pub portfolios: Option<Arc<Vec<EnrichedPortfolio>>>,
    /// Wall-clock time of the last successful refresh
    pub last_updated: Option<DateTime<Utc>>,
    /// Why the last cycle failed, if it did
    pub last_error: Option<String>,
}

impl DashboardState {
    fn initial() -> Self {
        Self {
            status: RefreshStatus::Idle,
            portfolios: None,
            last_updated: None,
            last_error: None,
        }
    }

    /// True while the first refresh hasn't produced data yet.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.portfolios.is_none() && self.status != RefreshStatus::Failed
    }

    /// True when the published data predates a failed refresh.
    #[must_use]
    pub fn is_stale(&self) -> bool {
        self.status == RefreshStatus::Failed && self.portfolios.is_some()
    }
}

/// What a refresh call actually did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The cycle ran to completion (successfully or not)
    Completed,
    /// Another cycle was already in flight; this trigger was dropped
    Skipped,
}

/// Clears the in-flight flag when a cycle ends, on every exit path.
struct FlightGuard<'a>(&'a AtomicBool);

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// The refresh orchestrator: owns the catalog, the quote sources, and
/// the quote cache, and re-runs the full enrichment pipeline on a timer
/// and on demand.
///
/// One cycle: fetch all sources → merge snapshots field-by-field in
/// registration order → join/enrich/aggregate every portfolio → publish
/// the result through a `watch` channel. Refreshes are serialized: a
/// timer tick or manual trigger that arrives while a cycle is in flight
/// is skipped rather than raced.
pub struct RefreshService {
    catalog: Catalog,
    sources: Vec<Box<dyn QuoteSource>>,
    settings: Settings,
    clock: Box<dyn Clock>,
    cache: Mutex<Option<QuoteCache>>,
    in_flight: AtomicBool,
    state_tx: watch::Sender<DashboardState>,
    enrichment: EnrichmentService,
    aggregation: AggregationService,
}

impl RefreshService {
    pub fn new(catalog: Catalog, sources: Vec<Box<dyn QuoteSource>>, settings: Settings) -> Self {
        Self::with_clock(catalog, sources, settings, Box::new(SystemClock))
    }

    /// Construct with an explicit clock, so cache staleness behavior is
    /// deterministic under test.
    pub fn with_clock(
        catalog: Catalog,
        sources: Vec<Box<dyn QuoteSource>>,
        settings: Settings,
        clock: Box<dyn Clock>,
    ) -> Self {
        let (state_tx, _) = watch::channel(DashboardState::initial());
        Self {
            catalog,
            sources,
            settings,
            clock,
            cache: Mutex::new(None),
            in_flight: AtomicBool::new(false),
            state_tx,
            enrichment: EnrichmentService::new(),
            aggregation: AggregationService::new(),
        }
    }

    /// Current published state.
    #[must_use]
    pub fn state(&self) -> DashboardState {
        self.state_tx.borrow().clone()
    }

    /// Subscribe to state transitions.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<DashboardState> {
        self.state_tx.subscribe()
    }

    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Run one full refresh cycle: fetch → merge → enrich → aggregate →
    /// publish.
    ///
    /// If a cycle is already in flight this call returns
    /// `Ok(RefreshOutcome::Skipped)` without touching anything. If every
    /// source fails, the state transitions to `Failed` — the previous
    /// `Ready` snapshot stays visible — and the error is also returned.
    /// A partially failed fetch (at least one source succeeded) still
    /// completes the cycle; the failed source's fields are simply absent.
    pub async fn refresh(&self) -> Result<RefreshOutcome, CoreError> {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!("refresh trigger dropped: cycle already in flight");
            return Ok(RefreshOutcome::Skipped);
        }
        let _guard = FlightGuard(&self.in_flight);

        self.state_tx.send_modify(|s| {
            s.status = RefreshStatus::Fetching;
        });

        let quotes = match self.obtain_quotes().await {
            Ok(quotes) => quotes,
            Err(e) => {
                let message = e.to_string();
                self.state_tx.send_modify(|s| {
                    s.status = RefreshStatus::Failed;
                    s.last_error = Some(message);
                });
                return Err(e);
            }
        };

        // The pipeline itself is pure: a brand-new snapshot every cycle.
        let portfolios: Vec<EnrichedPortfolio> = self
            .catalog
            .portfolios
            .iter()
            .map(|portfolio| {
                let holdings =
                    self.enrichment
                        .enrich_holdings(portfolio, &self.catalog.assets, &quotes);
                self.aggregation.aggregate(portfolio, holdings)
            })
            .collect();

        let now = self.clock.now();
        self.state_tx.send_modify(|s| {
            s.status = RefreshStatus::Ready;
            s.portfolios = Some(Arc::new(portfolios));
            s.last_updated = Some(now);
            s.last_error = None;
        });

        Ok(RefreshOutcome::Completed)
    }

    /// Get the merged quote snapshot for this cycle, from the cache when
    /// it is still within its TTL, otherwise from the live sources.
    async fn obtain_quotes(&self) -> Result<QuoteSnapshot, CoreError> {
        if let Some(ttl_secs) = self.settings.quote_ttl_secs {
            let ttl = chrono::Duration::seconds(ttl_secs as i64);
            let cache = self.cache.lock().expect("quote cache lock poisoned");
            if let Some(cached) = cache.as_ref() {
                if cached.is_fresh(self.clock.now(), ttl) {
                    debug!("reusing quote snapshot from cache");
                    return Ok(cached.snapshot().clone());
                }
            }
        }

        let snapshot = self.fetch_sources().await?;

        if self.settings.quote_ttl_secs.is_some() {
            let mut cache = self.cache.lock().expect("quote cache lock poisoned");
            *cache = Some(QuoteCache::new(snapshot.clone(), self.clock.now()));
        }

        Ok(snapshot)
    }

    /// Fetch every registered source and merge their snapshots over the
    /// catalog baseline, in registration order.
    ///
    /// Each fetch runs under the configured timeout. A failed source
    /// contributes nothing for this cycle; only all sources failing
    /// fails the fetch as a whole. With no sources registered the
    /// baseline alone is the snapshot (a purely static dashboard).
    async fn fetch_sources(&self) -> Result<QuoteSnapshot, CoreError> {
        let mut snapshot = self.catalog.baseline_quotes();
        let timeout = Duration::from_secs(self.settings.fetch_timeout_secs);

        let mut successes = 0usize;
        let mut failures: Vec<String> = Vec::new();

        for source in &self.sources {
            let result =
                tokio::time::timeout(timeout, source.fetch_quotes(&self.catalog.assets)).await;

            match result {
                Ok(Ok(source_snapshot)) => {
                    debug!(
                        "source {} returned {} quote records",
                        source.name(),
                        source_snapshot.len()
                    );
                    snapshot.merge(source_snapshot);
                    successes += 1;
                }
                Ok(Err(e)) => {
                    warn!("source {} failed: {e}", source.name());
                    failures.push(format!("{}: {e}", source.name()));
                }
                Err(_) => {
                    let e = CoreError::Timeout(self.settings.fetch_timeout_secs);
                    warn!("source {} timed out: {e}", source.name());
                    failures.push(format!("{}: {e}", source.name()));
                }
            }
        }

        if !self.sources.is_empty() && successes == 0 {
            return Err(CoreError::AllSourcesFailed(failures.join("; ")));
        }

        Ok(snapshot)
    }
}

// ── Polling ─────────────────────────────────────────────────────────

/// Handle to the background polling task. Stopping (or dropping) it
/// cancels the timer; an in-flight fetch's result is simply discarded.
pub struct PollingHandle {
    stop_tx: watch::Sender<bool>,
    task: tokio::task::JoinHandle<()>,
}

impl PollingHandle {
    /// Stop the polling loop.
    pub fn stop(self) {
        let _ = self.stop_tx.send(true);
        self.task.abort();
    }
}

/// Spawn the recurring refresh task: one cycle immediately, then one per
/// configured interval. Errors are already reflected in the published
/// state, so the loop just keeps ticking — a failed cycle never disables
/// future retries.
#[must_use]
pub fn spawn_polling(service: Arc<RefreshService>) -> PollingHandle {
    let (stop_tx, mut stop_rx) = watch::channel(false);
    let interval = Duration::from_secs(service.settings.refresh_interval_secs.max(1));

    let task = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if let Err(e) = service.refresh().await {
                        warn!("scheduled refresh failed: {e}");
                    }
                }
                _ = stop_rx.changed() => break,
            }
        }
    });

    PollingHandle { stop_tx, task }
}
