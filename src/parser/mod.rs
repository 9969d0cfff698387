//! Record source: decoding of newline-delimited JSON input.
//!
//! This module handles:
//! - Decoding individual records
//! - Rejecting malformed input up front
//! - Streaming records from a background decoder

pub mod schema;
pub mod stream;

// Re-export main types
pub use schema::{decode_record, Record, RecordBody, RecordKind};
pub use stream::{RecordStream, StreamSummary};
