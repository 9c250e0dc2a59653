//! Stage-change notifications.
//!
//! Every transition of a work item produces a [`StatusEvent`]. Reporting is
//! a side channel: reporters cannot fail and never influence progression.

mod reporters;

pub use reporters::{ChannelReporter, TracingReporter};

use serde::{Deserialize, Serialize};

use crate::item::Stage;

/// How a status line should be presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Not started yet.
    Waiting,
    /// Work in progress.
    Active,
    /// Something went wrong for this item.
    Failed,
    /// Done.
    Success,
}

/// A single stage change of one item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusEvent {
    pub item_id: String,
    pub stage: Stage,
    pub message: String,
    pub severity: Severity,
}

impl StatusEvent {
    pub fn new(
        item_id: impl Into<String>,
        stage: Stage,
        message: impl Into<String>,
        severity: Severity,
    ) -> Self {
        Self {
            item_id: item_id.into(),
            stage,
            message: message.into(),
            severity,
        }
    }
}

/// Receiver of stage changes.
pub trait StatusReporter: Send + Sync {
    fn on_stage_change(&self, event: StatusEvent);
}
