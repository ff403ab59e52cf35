use crate::error::SplitError;
use crate::splitter::SplitOutcome;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::PathBuf;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ItemStatus {
    Split(SplitOutcome),
    Planned(SplitOutcome),
    Skipped { reason: String },
    Failed {
        kind: String,
        reason: String,
        /// Halves written before the failure, kept on disk.
        #[serde(skip_serializing_if = "Option::is_none")]
        outcome: Option<SplitOutcome>,
    },
}

#[derive(Debug, Clone, Serialize)]
pub struct ItemReport {
    pub tag: u32,
    pub input: PathBuf,
    #[serde(flatten)]
    pub status: ItemStatus,
}

impl ItemReport {
    pub fn from_result(tag: u32, input: PathBuf, result: Result<SplitOutcome, &SplitError>) -> Self {
        let status = match result {
            Ok(outcome) => ItemStatus::Split(outcome),
            Err(e) if e.is_skip() => ItemStatus::Skipped {
                reason: e.to_string(),
            },
            Err(e) => ItemStatus::Failed {
                kind: e.kind().to_string(),
                reason: e.to_string(),
                outcome: e.written_outcome().cloned(),
            },
        };

        Self { tag, input, status }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub started_at: DateTime<Utc>,
    pub dry_run: bool,
    pub cancelled: bool,
    pub duration: Duration,
    pub items: Vec<ItemReport>,
    #[serde(skip)]
    start_time: Instant,
}

impl BatchReport {
    pub fn new(dry_run: bool) -> Self {
        Self {
            started_at: Utc::now(),
            dry_run,
            cancelled: false,
            duration: Duration::ZERO,
            items: Vec::new(),
            start_time: Instant::now(),
        }
    }

    pub fn push(&mut self, item: ItemReport) {
        self.items.push(item);
    }

    pub fn finish(&mut self) {
        self.duration = self.start_time.elapsed();
    }

    pub fn split_count(&self) -> usize {
        self.count(|s| matches!(s, ItemStatus::Split(_) | ItemStatus::Planned(_)))
    }

    pub fn skipped_count(&self) -> usize {
        self.count(|s| matches!(s, ItemStatus::Skipped { .. }))
    }

    pub fn failed_count(&self) -> usize {
        self.count(|s| matches!(s, ItemStatus::Failed { .. }))
    }

    /// True when every attempted item was split (or planned) and nothing
    /// was cancelled.
    pub fn is_clean(&self) -> bool {
        !self.cancelled && self.skipped_count() == 0 && self.failed_count() == 0
    }

    pub fn total_data_rows(&self) -> usize {
        self.items
            .iter()
            .filter_map(|item| match &item.status {
                ItemStatus::Split(outcome) | ItemStatus::Planned(outcome) => {
                    Some(outcome.data_rows)
                }
                _ => None,
            })
            .sum()
    }

    fn count(&self, predicate: impl Fn(&ItemStatus) -> bool) -> usize {
        self.items.iter().filter(|item| predicate(&item.status)).count()
    }
}
