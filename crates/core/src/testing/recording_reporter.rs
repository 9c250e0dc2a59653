//! Status reporter that keeps every event for assertions.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::item::Stage;
use crate::status::{Severity, StatusEvent, StatusReporter};

/// Records all stage changes in arrival order.
#[derive(Debug, Clone, Default)]
pub struct RecordingReporter {
    events: Arc<Mutex<Vec<StatusEvent>>>,
}

impl RecordingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<StatusEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    /// Events of one item.
    pub fn events_for(&self, item_id: &str) -> Vec<StatusEvent> {
        self.events()
            .into_iter()
            .filter(|e| e.item_id == item_id)
            .collect()
    }

    /// Stages reported for one item, in order.
    pub fn stages_for(&self, item_id: &str) -> Vec<Stage> {
        self.events_for(item_id).into_iter().map(|e| e.stage).collect()
    }

    /// Last message reported for one item.
    pub fn last_message(&self, item_id: &str) -> Option<String> {
        self.events_for(item_id).pop().map(|e| e.message)
    }

    /// Highest number of items simultaneously in a processing stage,
    /// replaying the events in order. An item whose latest event is a
    /// failure no longer counts.
    pub fn peak_processing(&self) -> usize {
        let mut current: HashMap<String, Stage> = HashMap::new();
        let mut peak = 0;
        for event in self.events() {
            if event.severity == Severity::Failed {
                current.remove(&event.item_id);
                continue;
            }
            current.insert(event.item_id.clone(), event.stage);
            let processing = current.values().filter(|s| s.is_processing()).count();
            peak = peak.max(processing);
        }
        peak
    }
}

impl StatusReporter for RecordingReporter {
    fn on_stage_change(&self, event: StatusEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}
