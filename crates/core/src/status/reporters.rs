//! Built-in status reporters.

use tokio::sync::mpsc;
use tracing::{error, info, warn};

use super::{Severity, StatusEvent, StatusReporter};
use crate::item::Stage;

/// Writes each stage change to the log.
#[derive(Debug, Default, Clone)]
pub struct TracingReporter;

impl StatusReporter for TracingReporter {
    fn on_stage_change(&self, event: StatusEvent) {
        let progress = format!("{}/{}", event.stage.number(), Stage::COUNT);
        match event.severity {
            Severity::Failed => warn!(item = %event.item_id, stage = %progress, "{}", event.message),
            _ => info!(item = %event.item_id, stage = %progress, "{}", event.message),
        }
    }
}

/// Forwards stage changes into a channel.
///
/// Sending never waits: when the channel is full or closed the event is
/// dropped and the failure logged.
#[derive(Debug, Clone)]
pub struct ChannelReporter {
    tx: mpsc::Sender<StatusEvent>,
}

impl ChannelReporter {
    pub fn new(tx: mpsc::Sender<StatusEvent>) -> Self {
        Self { tx }
    }

    /// Creates a reporter together with the receiving end.
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<StatusEvent>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self::new(tx), rx)
    }
}

impl StatusReporter for ChannelReporter {
    fn on_stage_change(&self, event: StatusEvent) {
        if let Err(e) = self.tx.try_send(event) {
            error!("Failed to forward status event: {}", e);
        }
    }
}
