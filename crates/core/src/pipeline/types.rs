//! Types describing the result of a batch run.

use serde::{Deserialize, Serialize};

use crate::item::{Stage, WorkItem};

/// Final outcome of one recording.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ItemOutcome {
    /// Sent with its transcript.
    Delivered,
    /// Sent, but the transcription job ended with `job_status`.
    DeliveredWithoutTranscript { job_status: String },
    /// Stopped before delivery.
    Failed { failed_at: Stage, error: String },
}

/// Summary line for one recording.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemSummary {
    pub id: String,
    pub file_name: String,
    pub stage: Stage,
    #[serde(flatten)]
    pub outcome: ItemOutcome,
}

impl ItemSummary {
    pub fn from_item(item: &WorkItem) -> Self {
        let outcome = match (item.fault(), item.job_failure()) {
            (Some(fault), _) => ItemOutcome::Failed {
                failed_at: fault.stage,
                error: fault.error.clone(),
            },
            (None, _) if item.stage() != Stage::Finished => ItemOutcome::Failed {
                failed_at: item.stage(),
                error: "not finalized".to_string(),
            },
            (None, Some(failure)) => ItemOutcome::DeliveredWithoutTranscript {
                job_status: failure.status.to_string(),
            },
            (None, None) => ItemOutcome::Delivered,
        };

        Self {
            id: item.id().to_string(),
            file_name: item.file_name().to_string(),
            stage: item.stage(),
            outcome,
        }
    }
}

/// Result of [`PipelineCoordinator::run`](super::PipelineCoordinator::run).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchReport {
    /// Per-recording summaries, in discovery order.
    pub items: Vec<ItemSummary>,
    /// Duration of the concurrent phase in milliseconds.
    pub processing_duration_ms: u64,
    /// Duration of the sequential phase in milliseconds.
    pub sending_duration_ms: u64,
    /// Highest number of recordings processed at the same time.
    pub peak_concurrency: usize,
}

impl BatchReport {
    pub fn total(&self) -> usize {
        self.items.len()
    }

    /// Recordings sent, with or without a transcript.
    pub fn delivered(&self) -> usize {
        self.items
            .iter()
            .filter(|s| !matches!(s.outcome, ItemOutcome::Failed { .. }))
            .count()
    }

    /// Recordings sent without a transcript because their job failed.
    pub fn job_failures(&self) -> usize {
        self.items
            .iter()
            .filter(|s| matches!(s.outcome, ItemOutcome::DeliveredWithoutTranscript { .. }))
            .count()
    }

    pub fn failed(&self) -> usize {
        self.total() - self.delivered()
    }
}
