use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Live quote figures for a single holding, as delivered by one source.
///
/// A source only populates the fields it actually carries (a price feed
/// sets `cmp`, a fundamentals feed sets `pe`/`latest_earnings`); merging
/// is field-by-field so sources never clobber each other's data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteUpdate {
    pub cmp: Option<f64>,
    pub pe: Option<f64>,
    pub market_cap: Option<f64>,
    pub latest_earnings: Option<f64>,
}

impl QuoteUpdate {
    /// Overlay `other` onto `self`: only fields `other` actually carries
    /// overwrite the existing values.
    pub fn apply(&mut self, other: &QuoteUpdate) {
        if other.cmp.is_some() {
            self.cmp = other.cmp;
        }
        if other.pe.is_some() {
            self.pe = other.pe;
        }
        if other.market_cap.is_some() {
            self.market_cap = other.market_cap;
        }
        if other.latest_earnings.is_some() {
            self.latest_earnings = other.latest_earnings;
        }
    }

    /// True if no source has supplied any figure.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cmp.is_none()
            && self.pe.is_none()
            && self.market_cap.is_none()
            && self.latest_earnings.is_none()
    }
}

/// One snapshot of live quote data: `holdingId → quote fields`.
///
/// Snapshots from independent sources are merged in registration order;
/// later sources merge field-by-field rather than replacing whole
/// records, so a price-only source and a fundamentals-only source
/// compose into one complete record per holding.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuoteSnapshot {
    entries: HashMap<String, QuoteUpdate>,
}

impl QuoteSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the merged quote record for a holding, if any source knew it.
    #[must_use]
    pub fn get(&self, holding_id: &str) -> Option<&QuoteUpdate> {
        self.entries.get(holding_id)
    }

    /// Insert or overlay a quote update for a holding.
    pub fn set(&mut self, holding_id: impl Into<String>, update: QuoteUpdate) {
        self.entries
            .entry(holding_id.into())
            .or_default()
            .apply(&update);
    }

    /// Merge a later source's snapshot into this one, field-by-field.
    pub fn merge(&mut self, other: QuoteSnapshot) {
        for (holding_id, update) in other.entries {
            self.entries.entry(holding_id).or_default().apply(&update);
        }
    }

    /// Number of holdings with at least one quoted field.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ── Clock & cache ───────────────────────────────────────────────────

/// Injectable wall-clock, so cache staleness is deterministic in tests.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Production clock backed by `chrono::Utc`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// The most recent successfully fetched quote snapshot, with the time it
/// was taken. Owned by the refresh orchestrator — there is no
/// process-wide cache state.
#[derive(Debug, Clone)]
pub struct QuoteCache {
    snapshot: QuoteSnapshot,
    fetched_at: DateTime<Utc>,
}

impl QuoteCache {
    pub fn new(snapshot: QuoteSnapshot, fetched_at: DateTime<Utc>) -> Self {
        Self {
            snapshot,
            fetched_at,
        }
    }

    #[must_use]
    pub fn snapshot(&self) -> &QuoteSnapshot {
        &self.snapshot
    }

    #[must_use]
    pub fn fetched_at(&self) -> DateTime<Utc> {
        self.fetched_at
    }

    /// True if the snapshot is still within its time-to-live at `now`.
    /// Reusing a fresh snapshot is best-effort: it saves upstream calls
    /// between close-together refreshes, nothing more.
    #[must_use]
    pub fn is_fresh(&self, now: DateTime<Utc>, ttl: chrono::Duration) -> bool {
        now - self.fetched_at < ttl
    }
}
