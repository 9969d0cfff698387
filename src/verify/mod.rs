//! Line-by-line validation of an export against a reference export.
//!
//! The comparison is strict and order-sensitive: the same lines in a
//! different order are a failure.
//!
//! # Example
//! ```ignore
//! use user_aggregate::verify::validate;
//!
//! validate("data.csv", "expected.csv")?;
//! ```

mod compare;

pub use compare::{validate, validate_readers};

use thiserror::Error;

/// First divergence between a produced and an expected export
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("expected export exhausted early: produced has extra line {line}")]
    ExpectedExhausted { line: usize },

    #[error("produced export exhausted early: expected has extra line {line}")]
    ProducedExhausted { line: usize },

    #[error("line {line} differs\n  have: {produced}\n  want: {expected}")]
    Mismatch {
        line: usize,
        produced: String,
        expected: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
