//! Line-oriented export writer.
//!
//! One line per user, users in ascending id order:
//!
//! ```text
//! u1,email=a@example.com,plan=pro,login=2,purchase=1
//! ```
//!
//! Attributes come first (sorted by key), then events (sorted by name)
//! rendered with their distinct occurrence count.

use crate::aggregator::{AggregateStore, UserState};
use crate::utils::config::{FIELD_SEPARATOR, PAIR_SEPARATOR};
use crate::utils::error::OutputError;
use log::{debug, info};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Render one user's export line, without the trailing newline
///
/// **Public** - building block of `export`
pub fn render_user(user_id: &str, state: &UserState) -> String {
    let mut line = String::from(user_id);

    for (key, attribute) in state.sorted_attributes() {
        line.push(FIELD_SEPARATOR);
        line.push_str(key);
        line.push(PAIR_SEPARATOR);
        line.push_str(&attribute.value);
    }

    for (name, count) in state.sorted_event_counts() {
        line.push(FIELD_SEPARATOR);
        line.push_str(name);
        line.push(PAIR_SEPARATOR);
        line.push_str(&count.to_string());
    }

    line
}

/// Render the whole store, one line per user in ascending id order
///
/// **Public** - main entry point for in-memory export
pub fn export(store: &AggregateStore) -> Vec<String> {
    store
        .sorted_users()
        .into_iter()
        .map(|(user_id, state)| render_user(user_id, state))
        .collect()
}

/// Write the export to any sink, each line newline-terminated
///
/// # Returns
/// Number of lines written
pub fn write_export<W: Write>(store: &AggregateStore, mut writer: W) -> std::io::Result<usize> {
    let lines = export(store);
    for line in &lines {
        writer.write_all(line.as_bytes())?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;
    Ok(lines.len())
}

/// Write the export to a file
///
/// **Public** - used by the process command
///
/// # Arguments
/// * `store` - Finished aggregate
/// * `output_path` - Destination file, replaced if it exists
///
/// # Returns
/// Number of lines written
///
/// # Errors
/// * `OutputError::InvalidPath` - Path is empty, a directory, or its parent cannot be created
/// * `OutputError::WriteFailed` - I/O error during create or write
///
/// A failed write can leave a partial file behind.
pub fn write_export_file(
    store: &AggregateStore,
    output_path: impl AsRef<Path>,
) -> Result<usize, OutputError> {
    let output_path = output_path.as_ref();

    info!("Writing export to: {}", output_path.display());

    validate_output_path(output_path)?;

    // Create parent directories if needed
    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            debug!("Creating parent directories: {}", parent.display());
            std::fs::create_dir_all(parent).map_err(|e| {
                OutputError::InvalidPath(format!(
                    "Cannot create directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }
    }

    let file = File::create(output_path).map_err(OutputError::WriteFailed)?;
    let lines = write_export(store, BufWriter::new(file)).map_err(OutputError::WriteFailed)?;

    debug!("Export written: {} lines", lines);

    Ok(lines)
}

/// Validate that output path is writable
///
/// **Private** - internal validation
fn validate_output_path(path: &Path) -> Result<(), OutputError> {
    if path.as_os_str().is_empty() {
        return Err(OutputError::InvalidPath("Path is empty".to_string()));
    }

    if path.is_dir() {
        return Err(OutputError::InvalidPath(format!(
            "Path is a directory: {}",
            path.display()
        )));
    }

    Ok(())
}
