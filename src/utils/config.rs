//! Configuration and constants for the CLI.

/// Default path of the export written by the CLI
pub const DEFAULT_OUTPUT_PATH: &str = "data.csv";

// Environment fallbacks for the path flags
pub const ENV_INPUT: &str = "USER_AGGREGATE_IN";
pub const ENV_OUTPUT: &str = "USER_AGGREGATE_OUT";
pub const ENV_VERIFY: &str = "USER_AGGREGATE_VERIFY";

/// Records buffered between the decoder thread and the aggregator
pub const RECORD_CHANNEL_CAPACITY: usize = 1024;

/// Separator between fields of one export line
pub const FIELD_SEPARATOR: char = ',';

/// Separator between a key and its rendered value
pub const PAIR_SEPARATOR: char = '=';

// Accepted spellings of the record `type` tag
pub const ATTRIBUTE_TYPE_TAGS: &[&str] = &["attributes", "attribute-update"];
pub const EVENT_TYPE_TAGS: &[&str] = &["event", "event-occurrence"];
