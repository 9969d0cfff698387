//! Aggregation of user records into per-user state.
//!
//! This module folds a record sequence into:
//! - Attribute values (last write wins by strictly newer timestamp)
//! - Event occurrence sets (deduplicated by occurrence id)
//! - Counters describing the pass

pub mod fold;
pub mod store;

// Re-export main types and functions
pub use fold::{aggregate, Aggregation, AggregateOutcome, AggregateStats, Aggregator};
pub use store::{AggregateStore, AttributeValue, UserState};
