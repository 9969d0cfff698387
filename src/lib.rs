//! User Aggregate
//!
//! Folds a stream of per-user attribute updates and event occurrences
//! into one record per user and writes a deterministic, sorted export.
//!
//! This crate provides the core implementation for the
//! `user-aggregate` CLI tool.
//!
//! ## Pipeline
//!
//! ```ignore
//! use user_aggregate::aggregator::aggregate;
//! use user_aggregate::output::export;
//! use user_aggregate::parser::Record;
//!
//! let store = aggregate(vec![
//!     Record::attributes("u1", 1, [("plan", "free")]),
//!     Record::event("u1", 2, "login", "a"),
//! ]);
//! assert_eq!(export(&store), vec!["u1,plan=free,login=1"]);
//! ```

pub mod aggregator;
pub mod commands;
pub mod output;
pub mod parser;
pub mod utils;
pub mod verify;
