use super::value::{TableValue, TopicInfo, ValueKind};
use crate::iris_error;
use crate::utils::{OrError, validate_topic};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

#[derive(Debug, Clone)]
struct TopicEntry {
    kind: ValueKind,
    value: Option<TableValue>,
    default: Option<TableValue>,
    updated_at: Option<DateTime<Utc>>,
}

impl TopicEntry {
    fn new(kind: ValueKind) -> Self {
        Self {
            kind,
            value: None,
            default: None,
            updated_at: None,
        }
    }
}

/// Shared table state accessed by all connections.
/// One entry per topic. Each entry keeps only its latest value and its default; there is no history.
#[derive(Debug, Default)]
pub struct TableState {
    topics: BTreeMap<String, TopicEntry>,
}

impl TableState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrites the current value of `topic`.
    /// Error: invalid topic name, or topic already holds another element type.
    /// Called by: TableServer (tarpc handler) ← ArraySender sync task
    pub fn set(&mut self, topic: &str, value: TableValue) -> OrError<()> {
        let entry = self.entry_for(topic, value.kind(), "set")?;
        entry.value = Some(value);
        entry.updated_at = Some(Utc::now());
        Ok(())
    }

    /// Sets the value returned while no value has been set. Setting the same default twice is a no-op.
    /// Error: same as `set`.
    pub fn set_default(&mut self, topic: &str, value: TableValue) -> OrError<()> {
        let entry = self.entry_for(topic, value.kind(), "set_default")?;
        entry.default = Some(value);
        Ok(())
    }

    /// Returns the current value, else the default, else `None` (also for unknown topics).
    pub fn get(&self, topic: &str) -> OrError<Option<TableValue>> {
        validate_topic(topic)?;
        Ok(self
            .topics
            .get(topic)
            .and_then(|entry| entry.value.clone().or_else(|| entry.default.clone())))
    }

    pub fn topics(&self) -> Vec<TopicInfo> {
        self.topics
            .iter()
            .map(|(name, entry)| TopicInfo {
                name: name.clone(),
                kind: entry.kind,
                has_value: entry.value.is_some(),
                has_default: entry.default.is_some(),
                updated_at: entry.updated_at,
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.topics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.topics.is_empty()
    }

    // Creates the entry on first write. Invariant: a topic's kind never changes.
    fn entry_for(&mut self, topic: &str, kind: ValueKind, method: &str) -> OrError<&mut TopicEntry> {
        validate_topic(topic)?;
        let entry = self
            .topics
            .entry(topic.to_string())
            .or_insert_with(|| TopicEntry::new(kind));
        if entry.kind != kind {
            return Err(iris_error!("table::TableState", "entry_for", &format!(
                "{} rejected: topic '{}' holds {} values, got {}",
                method, topic, entry.kind, kind
            )));
        }
        Ok(entry)
    }
}
