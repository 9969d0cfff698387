//! Per-user aggregate state.
//!
//! Maps here are hash maps; anything that needs a stable order asks for
//! one of the `sorted_*` views.

use std::collections::{HashMap, HashSet};

/// Last-write-wins candidate for one attribute key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeValue {
    pub value: String,
    pub timestamp: i64,
}

impl AttributeValue {
    pub fn new(value: impl Into<String>, timestamp: i64) -> Self {
        Self {
            value: value.into(),
            timestamp,
        }
    }
}

/// Everything retained about one user
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserState {
    attributes: HashMap<String, AttributeValue>,
    events: HashMap<String, HashSet<String>>,
}

impl UserState {
    /// Offer a new value for `key`
    ///
    /// The value is stored when the key is unseen, or when the stored
    /// timestamp is strictly older. On equal timestamps the stored value
    /// stays.
    ///
    /// # Returns
    /// true if the offered value is now the stored one
    pub fn merge_attribute(&mut self, key: &str, value: &str, timestamp: i64) -> bool {
        if let Some(existing) = self.attributes.get_mut(key) {
            if existing.timestamp < timestamp {
                *existing = AttributeValue::new(value, timestamp);
                return true;
            }
            return false;
        }

        self.attributes
            .insert(key.to_owned(), AttributeValue::new(value, timestamp));
        true
    }

    /// Record one occurrence of `name`
    ///
    /// # Returns
    /// true if `id` had not been seen for this event name before
    pub fn record_occurrence(&mut self, name: &str, id: &str) -> bool {
        match self.events.get_mut(name) {
            Some(ids) => ids.insert(id.to_owned()),
            None => {
                self.events
                    .insert(name.to_owned(), HashSet::from([id.to_owned()]));
                true
            }
        }
    }

    pub fn attribute(&self, key: &str) -> Option<&AttributeValue> {
        self.attributes.get(key)
    }

    /// Number of distinct occurrence ids seen for `name`
    pub fn event_count(&self, name: &str) -> usize {
        self.events.get(name).map_or(0, HashSet::len)
    }

    /// Attributes ordered by key
    pub fn sorted_attributes(&self) -> Vec<(&str, &AttributeValue)> {
        let mut attributes: Vec<_> = self
            .attributes
            .iter()
            .map(|(key, value)| (key.as_str(), value))
            .collect();
        attributes.sort_unstable_by(|a, b| a.0.cmp(b.0));
        attributes
    }

    /// Distinct occurrence counts ordered by event name
    pub fn sorted_event_counts(&self) -> Vec<(&str, usize)> {
        let mut counts: Vec<_> = self
            .events
            .iter()
            .map(|(name, ids)| (name.as_str(), ids.len()))
            .collect();
        counts.sort_unstable_by(|a, b| a.0.cmp(b.0));
        counts
    }
}

/// Complete aggregation result, keyed by user id
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AggregateStore {
    users: HashMap<String, UserState>,
}

impl AggregateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    pub fn get(&self, user_id: &str) -> Option<&UserState> {
        self.users.get(user_id)
    }

    /// State for `user_id`, created empty on first sight
    pub fn user_mut(&mut self, user_id: &str) -> &mut UserState {
        self.users.entry(user_id.to_owned()).or_default()
    }

    /// Users ordered by byte-wise ascending id
    pub fn sorted_users(&self) -> Vec<(&str, &UserState)> {
        let mut users: Vec<_> = self
            .users
            .iter()
            .map(|(id, state)| (id.as_str(), state))
            .collect();
        users.sort_unstable_by(|a, b| a.0.cmp(b.0));
        users
    }
}
