//! Input record definitions.
//!
//! Each line of the input is one JSON object describing either an
//! attribute update or an event occurrence for a single user:
//!
//! ```text
//! {"id":"e1","type":"attributes","user_id":"u1","data":{"plan":"pro"},"timestamp":5}
//! {"id":"e2","type":"event","name":"login","user_id":"u1","data":{},"timestamp":6}
//! ```

use crate::utils::config::{ATTRIBUTE_TYPE_TAGS, EVENT_TYPE_TAGS};
use crate::utils::error::SourceError;
use log::debug;
use serde::{Deserialize, Deserializer};
use std::collections::HashMap;

/// Discriminates the two kinds of record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    AttributeUpdate,
    EventOccurrence,
}

/// Type-specific part of a record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordBody {
    /// New values for one or more attribute keys
    AttributeUpdate { attributes: HashMap<String, String> },

    /// One occurrence of a named event, deduplicated by `id`
    EventOccurrence { name: String, id: String },
}

/// One ingested unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// Owning user. Empty means the record is dropped by the aggregator.
    pub user_id: String,

    /// Only consulted when resolving attribute conflicts
    pub timestamp: i64,

    pub body: RecordBody,
}

impl Record {
    /// Build an attribute-update record
    pub fn attributes<K, V>(
        user_id: impl Into<String>,
        timestamp: i64,
        attributes: impl IntoIterator<Item = (K, V)>,
    ) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            user_id: user_id.into(),
            timestamp,
            body: RecordBody::AttributeUpdate {
                attributes: attributes
                    .into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            },
        }
    }

    /// Build an event-occurrence record
    pub fn event(
        user_id: impl Into<String>,
        timestamp: i64,
        name: impl Into<String>,
        id: impl Into<String>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            timestamp,
            body: RecordBody::EventOccurrence {
                name: name.into(),
                id: id.into(),
            },
        }
    }

    pub fn kind(&self) -> RecordKind {
        match self.body {
            RecordBody::AttributeUpdate { .. } => RecordKind::AttributeUpdate,
            RecordBody::EventOccurrence { .. } => RecordKind::EventOccurrence,
        }
    }
}

/// Wire shape of one input line
///
/// Every field is optional; absent or `null` values decode as empty.
#[derive(Debug, Deserialize)]
struct RawRecord {
    #[serde(default, deserialize_with = "null_as_default")]
    id: String,

    #[serde(default, rename = "type", deserialize_with = "null_as_default")]
    kind: String,

    #[serde(default, deserialize_with = "null_as_default")]
    name: String,

    #[serde(
        default,
        alias = "userId",
        alias = "UserID",
        deserialize_with = "null_as_default"
    )]
    user_id: String,

    #[serde(default, deserialize_with = "null_as_default")]
    data: HashMap<String, String>,

    #[serde(default, deserialize_with = "null_as_default")]
    timestamp: i64,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Decode a single input line
///
/// **Public** - used by the record stream and by tests
///
/// Any `type` other than an attribute tag is an event occurrence.
///
/// # Returns
/// `Ok(None)` for blank lines, `Ok(Some(record))` otherwise
///
/// # Errors
/// * `SourceError::Decode` - the line is not a valid record object
pub fn decode_record(line: &str, line_number: usize) -> Result<Option<Record>, SourceError> {
    let trimmed = line.trim_start_matches('\u{feff}').trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    let raw: RawRecord = serde_json::from_str(trimmed).map_err(|source| SourceError::Decode {
        line: line_number,
        source,
    })?;

    let body = if ATTRIBUTE_TYPE_TAGS.contains(&raw.kind.as_str()) {
        RecordBody::AttributeUpdate {
            attributes: raw.data,
        }
    } else {
        if !EVENT_TYPE_TAGS.contains(&raw.kind.as_str()) {
            debug!("Line {}: type {:?} treated as an event", line_number, raw.kind);
        }
        RecordBody::EventOccurrence {
            name: raw.name,
            id: raw.id,
        }
    };

    Ok(Some(Record {
        user_id: raw.user_id,
        timestamp: raw.timestamp,
        body,
    }))
}
