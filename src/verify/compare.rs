//! Lockstep line comparison.

use super::ValidationError;
use log::debug;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Compare two export files
///
/// **Public** - main entry point for validation
///
/// # Arguments
/// * `produced_path` - Export written by this run
/// * `expected_path` - Reference export
///
/// # Returns
/// Number of matching lines
///
/// # Errors
/// The first divergence, or any open/read error as-is
pub fn validate(
    produced_path: impl AsRef<Path>,
    expected_path: impl AsRef<Path>,
) -> Result<usize, ValidationError> {
    let produced_path = produced_path.as_ref();
    let expected_path = expected_path.as_ref();

    debug!(
        "Validating {} against {}",
        produced_path.display(),
        expected_path.display()
    );

    let produced = BufReader::new(File::open(produced_path)?);
    let expected = BufReader::new(File::open(expected_path)?);

    validate_readers(produced, expected)
}

/// Compare two line sources in lockstep
///
/// **Public** - same comparison as `validate` over any readers
pub fn validate_readers<P, E>(produced: P, expected: E) -> Result<usize, ValidationError>
where
    P: BufRead,
    E: BufRead,
{
    let mut expected_lines = expected.lines();
    let mut line = 0;

    for produced_line in produced.lines() {
        let produced_line = produced_line?;
        line += 1;

        let expected_line = match expected_lines.next() {
            Some(expected_line) => expected_line?,
            None => return Err(ValidationError::ExpectedExhausted { line }),
        };

        if produced_line != expected_line {
            return Err(ValidationError::Mismatch {
                line,
                produced: produced_line,
                expected: expected_line,
            });
        }
    }

    if let Some(extra) = expected_lines.next() {
        extra?;
        return Err(ValidationError::ProducedExhausted { line: line + 1 });
    }

    Ok(line)
}
