//! Append-only log of answered queries for one session.

use serde::Serialize;

use crate::types::Timestamp;

/// One question and the model's answer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryRecord {
    /// 1-based position in the log ("Query 1", "Response 1", ...).
    pub ordinal: usize,
    pub query: String,
    pub response: String,
    /// Working-image index the query was sent against.
    pub image_index: usize,
    /// Whether the committed crop was submitted instead of the original.
    pub used_crop: bool,
    pub created_at: Timestamp,
}

/// An answer that has not yet been appended.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingRecord {
    pub query: String,
    pub response: String,
    pub image_index: usize,
    pub used_crop: bool,
}

/// Ordered accumulation of [`QueryRecord`]s.
///
/// The only mutation is [`append`](Self::append); records are never edited,
/// removed, or deduplicated.
#[derive(Debug, Default)]
pub struct HistoryLog {
    records: Vec<QueryRecord>,
}

impl HistoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record at the end and return it.
    pub fn append(&mut self, pending: PendingRecord) -> &QueryRecord {
        let ordinal = self.records.len() + 1;
        self.records.push(QueryRecord {
            ordinal,
            query: pending.query,
            response: pending.response,
            image_index: pending.image_index,
            used_crop: pending.used_crop,
            created_at: chrono::Utc::now(),
        });
        &self.records[ordinal - 1]
    }

    /// Append several records in order.
    pub fn extend(&mut self, pending: impl IntoIterator<Item = PendingRecord>) {
        for p in pending {
            self.append(p);
        }
    }

    /// All records, most recent last.
    pub fn records(&self) -> &[QueryRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
