use std::collections::VecDeque;

use chrono::{DateTime, Utc};

use crate::model::HistoryEntry;

/// Most recent crash multipliers, newest first.
#[derive(Debug, Clone)]
pub struct HistoryLog {
    entries: VecDeque<HistoryEntry>,
    capacity: usize,
}

impl HistoryLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Restore persisted entries (newest first), keeping at most `capacity`.
    pub fn from_entries(entries: impl IntoIterator<Item = HistoryEntry>, capacity: usize) -> Self {
        Self {
            entries: entries.into_iter().take(capacity).collect(),
            capacity,
        }
    }

    pub fn record(&mut self, value: f64, time: DateTime<Utc>) {
        self.entries.push_front(HistoryEntry::new(value, time));
        self.entries.truncate(self.capacity);
    }

    pub fn entries(&self) -> impl Iterator<Item = &HistoryEntry> + '_ {
        self.entries.iter()
    }

    pub fn latest(&self) -> Option<&HistoryEntry> {
        self.entries.front()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Mean recorded multiplier; `0.0` when nothing is recorded yet.
    pub fn luck_rate(&self) -> f64 {
        let sum: f64 = self.entries.iter().map(|e| e.value).sum();
        sum / self.entries.len().max(1) as f64
    }

    pub fn to_vec(&self) -> Vec<HistoryEntry> {
        self.entries.iter().cloned().collect()
    }
}
