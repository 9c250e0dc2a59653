//! Batch coordinator: concurrent processing, then ordered delivery.

use std::sync::Arc;
use tokio::time::{sleep_until, Instant};
use tracing::{debug, error, info};

use crate::item::WorkItem;
use crate::services::{JobService, Mailer, ObjectStore, ResultFetcher};
use crate::status::StatusReporter;

use super::config::PipelineConfig;
use super::error::ItemError;
use super::limiter::ConcurrencyLimiter;
use super::machine::ItemProcessor;
use super::types::{BatchReport, ItemSummary};

/// Shared service handles, constructed once and used by every item.
#[derive(Clone)]
pub struct PipelineServices {
    pub object_store: Arc<dyn ObjectStore>,
    pub jobs: Arc<dyn JobService>,
    pub fetcher: Arc<dyn ResultFetcher>,
    pub mailer: Arc<dyn Mailer>,
    pub reporter: Arc<dyn StatusReporter>,
}

/// Runs a batch of recordings through the pipeline.
///
/// Two phases, separated by a barrier:
/// 1. Upload, transcription and cleanup for all items, at most
///    `concurrency` at a time.
/// 2. Delivery, one item at a time in discovery order, each send starting
///    at least `min_send_interval` after the previous one.
pub struct PipelineCoordinator {
    config: Arc<PipelineConfig>,
    processor: Arc<ItemProcessor>,
}

impl PipelineCoordinator {
    pub fn new(config: PipelineConfig, services: PipelineServices) -> Self {
        let config = Arc::new(config);
        let processor = Arc::new(ItemProcessor::new(services, Arc::clone(&config)));
        Self { config, processor }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Processes and delivers every item. Items are returned in input order
    /// inside the report; a failure only ever affects its own item.
    pub async fn run(&self, items: Vec<WorkItem>) -> BatchReport {
        info!(
            items = items.len(),
            concurrency = self.config.concurrency,
            "Starting batch"
        );
        for item in &items {
            self.processor.announce(item);
        }

        let started = Instant::now();
        let (mut items, peak_concurrency) = self.process_all(items).await;
        let processing_duration = started.elapsed();

        let started = Instant::now();
        self.finalize_all(&mut items).await;
        let sending_duration = started.elapsed();

        let report = BatchReport {
            items: items.iter().map(ItemSummary::from_item).collect(),
            processing_duration_ms: processing_duration.as_millis() as u64,
            sending_duration_ms: sending_duration.as_millis() as u64,
            peak_concurrency,
        };
        info!(
            total = report.total(),
            delivered = report.delivered(),
            job_failures = report.job_failures(),
            failed = report.failed(),
            "Batch finished"
        );
        report
    }

    /// Concurrent phase. Returns the items in input order together with the
    /// highest number of items that were in flight at once.
    async fn process_all(&self, items: Vec<WorkItem>) -> (Vec<WorkItem>, usize) {
        let limiter = ConcurrencyLimiter::new(self.config.concurrency);

        // Kept so an item whose task panicked can still be reported. The
        // snapshot predates processing, so such an item stays at `Pending`.
        let snapshots = items.clone();

        let tasks = items.into_iter().map(|item| {
            let processor = Arc::clone(&self.processor);
            async move { processor.process(item).await }
        });
        let results = limiter.run_all(tasks).await;

        let items = results
            .into_iter()
            .zip(snapshots)
            .map(|(result, mut snapshot)| match result {
                Some(item) => item,
                None => {
                    let err = ItemError::Aborted("processing task panicked".to_string());
                    error!(item = %snapshot.id(), "{}", err);
                    snapshot.mark_faulted(&err);
                    snapshot
                }
            })
            .collect();

        (items, limiter.stats().peak_in_flight)
    }

    /// Sequential phase.
    async fn finalize_all(&self, items: &mut [WorkItem]) {
        let spacing = self.config.min_send_interval();
        let mut last_send: Option<Instant> = None;

        for item in items.iter_mut() {
            if !item.is_ready_to_finalize() {
                debug!(item = %item.id(), stage = %item.stage(), "Skipping delivery");
                continue;
            }

            if let Some(previous) = last_send {
                sleep_until(previous + spacing).await;
            }
            last_send = Some(Instant::now());

            match self.processor.finalize(item).await {
                Ok(()) => debug!(item = %item.id(), "Delivery complete"),
                Err(e) => debug!(item = %item.id(), "Delivery failed: {}", e),
            }
        }
    }
}
