//! Utility modules for configuration, cancellation and error handling.

pub mod cancel;
pub mod config;
pub mod error;

// Re-export commonly used types for convenience
pub use cancel::CancelToken;
pub use error::{OutputError, SourceError};
