//! Output writers for aggregate data.
//!
//! This module handles rendering the aggregate into its sorted,
//! comma-separated text form and writing it to disk.

pub mod export;

// Re-export main functions
pub use export::{export, render_user, write_export, write_export_file};
