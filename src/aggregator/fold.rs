//! Fold a record sequence into an `AggregateStore`.
//!
//! Records are applied strictly in arrival order. Nothing in here fails:
//! records without a user id are dropped, duplicate occurrences and
//! equal-timestamp attribute conflicts are absorbed.

use super::store::AggregateStore;
use crate::parser::{Record, RecordBody, RecordKind};
use crate::utils::cancel::CancelToken;
use chrono::{DateTime, Utc};
use log::debug;

/// How an aggregation pass ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregateOutcome {
    /// The record sequence ran to its end
    Completed,

    /// Cancellation was observed between two records
    Interrupted,
}

/// Counters gathered while folding
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AggregateStats {
    /// Every record pulled from the sequence, dropped ones included
    pub records_seen: u64,

    /// Records ignored because their user id was empty
    pub dropped_missing_user: u64,

    pub attribute_updates: u64,
    pub event_occurrences: u64,

    /// Smallest and largest timestamp among applied records
    pub earliest_timestamp: Option<i64>,
    pub latest_timestamp: Option<i64>,
}

impl AggregateStats {
    fn count_kind(&mut self, kind: RecordKind) {
        match kind {
            RecordKind::AttributeUpdate => self.attribute_updates += 1,
            RecordKind::EventOccurrence => self.event_occurrences += 1,
        }
    }

    fn observe_timestamp(&mut self, timestamp: i64) {
        self.earliest_timestamp = Some(self.earliest_timestamp.map_or(timestamp, |t| t.min(timestamp)));
        self.latest_timestamp = Some(self.latest_timestamp.map_or(timestamp, |t| t.max(timestamp)));
    }

    /// One-line human readable summary
    pub fn summary(&self) -> String {
        let span = match (self.earliest_timestamp, self.latest_timestamp) {
            (Some(first), Some(last)) => {
                format!(", timestamps {} .. {}", render_timestamp(first), render_timestamp(last))
            }
            _ => String::new(),
        };

        format!(
            "{} records ({} attribute updates, {} event occurrences, {} dropped without user id){}",
            self.records_seen,
            self.attribute_updates,
            self.event_occurrences,
            self.dropped_missing_user,
            span
        )
    }
}

/// Render a unix timestamp (seconds) as RFC 3339, or raw when out of range
fn render_timestamp(timestamp: i64) -> String {
    DateTime::<Utc>::from_timestamp(timestamp, 0)
        .map(|t| t.to_rfc3339())
        .unwrap_or_else(|| timestamp.to_string())
}

/// Result of `Aggregator::aggregate_until`
#[derive(Debug, Clone)]
pub struct Aggregation {
    pub store: AggregateStore,
    pub stats: AggregateStats,
    pub outcome: AggregateOutcome,
}

/// Stateful fold over records
///
/// **Public** - owns the store until the pass is finished
#[derive(Debug, Default)]
pub struct Aggregator {
    store: AggregateStore,
    stats: AggregateStats,
}

impl Aggregator {
    /// Start from an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Continue folding into a store produced earlier
    pub fn with_store(store: AggregateStore) -> Self {
        Self {
            store,
            stats: AggregateStats::default(),
        }
    }

    /// Apply a single record
    pub fn apply(&mut self, record: Record) {
        self.stats.records_seen += 1;

        if record.user_id.is_empty() {
            self.stats.dropped_missing_user += 1;
            return;
        }

        self.stats.count_kind(record.kind());
        self.stats.observe_timestamp(record.timestamp);
        let user = self.store.user_mut(&record.user_id);

        match record.body {
            RecordBody::AttributeUpdate { attributes } => {
                for (key, value) in &attributes {
                    user.merge_attribute(key, value, record.timestamp);
                }
            }
            RecordBody::EventOccurrence { name, id } => {
                user.record_occurrence(&name, &id);
            }
        }
    }

    /// Fold `records` until they run out or `token` is cancelled
    ///
    /// The token is checked before each record; a record already being
    /// applied always completes.
    pub fn aggregate_until<I>(mut self, records: I, token: &CancelToken) -> Aggregation
    where
        I: IntoIterator<Item = Record>,
    {
        let mut outcome = AggregateOutcome::Completed;

        for record in records {
            if token.is_cancelled() {
                debug!("Aggregation interrupted after {} records", self.stats.records_seen);
                outcome = AggregateOutcome::Interrupted;
                break;
            }
            self.apply(record);
        }

        let (store, stats) = self.finish();
        Aggregation {
            store,
            stats,
            outcome,
        }
    }

    /// Hand over the store and the counters
    pub fn finish(self) -> (AggregateStore, AggregateStats) {
        (self.store, self.stats)
    }
}

/// Fold a whole record sequence into a fresh store
///
/// **Public** - convenience entry point without cancellation
pub fn aggregate<I>(records: I) -> AggregateStore
where
    I: IntoIterator<Item = Record>,
{
    let mut aggregator = Aggregator::new();
    for record in records {
        aggregator.apply(record);
    }
    aggregator.finish().0
}
