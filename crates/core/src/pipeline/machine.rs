//! Per-item stage machine.
//!
//! Each recording is driven by a single loop over [`Step`], a tagged union
//! carrying whatever the next stage needs. One loop iteration performs one
//! remote operation and decides the following step.

use futures::future::join;
use std::ffi::OsString;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::item::{Stage, WorkItem};
use crate::services::{JobHandle, OutgoingMail};
use crate::status::{Severity, StatusEvent};
use crate::transcript::parse_transcript;

use super::config::PipelineConfig;
use super::coordinator::PipelineServices;
use super::error::ItemError;
use super::poll::PollingWaiter;

/// What an item does next.
#[derive(Debug)]
enum Step {
    Upload,
    Submit,
    Await(JobHandle),
    Fetch(JobHandle),
    /// Delete the remote object and job, then go on to `failure` if set or
    /// to the finalize queue otherwise.
    Cleanup { failure: Option<ItemError> },
    Ready,
    Failed(ItemError),
}

/// Drives work items through their stages using shared service handles.
pub(crate) struct ItemProcessor {
    services: PipelineServices,
    waiter: PollingWaiter,
    config: Arc<PipelineConfig>,
}

impl ItemProcessor {
    pub(crate) fn new(services: PipelineServices, config: Arc<PipelineConfig>) -> Self {
        Self {
            waiter: PollingWaiter::new(config.poll_interval()),
            services,
            config,
        }
    }

    fn job_name(&self, item: &WorkItem) -> String {
        format!("{}{}", self.config.job_name_prefix, item.remote_key())
    }

    fn report(&self, item: &WorkItem, message: impl Into<String>, severity: Severity) {
        self.services.reporter.on_stage_change(StatusEvent::new(
            item.id(),
            item.stage(),
            message,
            severity,
        ));
    }

    /// Announces an item before any work starts.
    pub(crate) fn announce(&self, item: &WorkItem) {
        self.report(item, "Waiting to transcribe...", Severity::Waiting);
    }

    /// Runs the concurrent stages, from upload up to ready-to-finalize.
    ///
    /// Never fails: a fatal error is recorded on the returned item.
    pub(crate) async fn process(&self, mut item: WorkItem) -> WorkItem {
        let job_name = self.job_name(&item);
        let mut step = Step::Upload;

        loop {
            step = match step {
                Step::Upload => self.upload(&mut item).await,
                Step::Submit => self.submit(&mut item, &job_name).await,
                Step::Await(handle) => self.await_job(&mut item, &job_name, handle).await,
                Step::Fetch(handle) => self.fetch(&mut item, handle).await,
                Step::Cleanup { failure } => self.cleanup(&mut item, &job_name, failure).await,
                Step::Ready => {
                    item.enter(Stage::ReadyToFinalize);
                    self.report(&item, "Waiting to send...", Severity::Waiting);
                    return item;
                }
                Step::Failed(err) => {
                    self.fail(&mut item, &err);
                    return item;
                }
            };
        }
    }

    async fn upload(&self, item: &mut WorkItem) -> Step {
        item.enter(Stage::Uploading);
        let message = match tokio::fs::metadata(item.source()).await {
            Ok(meta) => format!("Uploading ({})...", format_size(meta.len())),
            Err(_) => "Uploading...".to_string(),
        };
        self.report(item, message, Severity::Active);

        match self
            .services
            .object_store
            .put(item.remote_key(), item.source())
            .await
        {
            Ok(()) => Step::Submit,
            Err(e) => Step::Failed(ItemError::Upload(e)),
        }
    }

    async fn submit(&self, item: &mut WorkItem, job_name: &str) -> Step {
        item.enter(Stage::SubmittingJob);
        self.report(item, "Starting transcription...", Severity::Active);

        let media_uri = self.services.object_store.media_uri(item.remote_key());
        match self.services.jobs.submit(job_name, &media_uri).await {
            Ok(handle) => {
                debug!(item = %item.id(), job = %handle.name, status = %handle.status, "Job submitted");
                Step::Await(handle)
            }
            Err(e) => {
                // No job exists, but the staged upload does.
                if let Err(del) = self.services.object_store.delete(item.remote_key()).await {
                    warn!(item = %item.id(), "Failed to delete staged object: {}", del);
                }
                Step::Failed(ItemError::Submit(e))
            }
        }
    }

    async fn await_job(&self, item: &mut WorkItem, job_name: &str, initial: JobHandle) -> Step {
        item.enter(Stage::AwaitingJob);
        self.report(item, "Transcribing...", Severity::Active);

        let jobs = &self.services.jobs;
        let polled: &WorkItem = item;
        let waited = self
            .waiter
            .wait(
                initial,
                |h| h.status.is_terminal(),
                || {
                    self.report(polled, "Transcribing...", Severity::Active);
                    jobs.status(job_name)
                },
            )
            .await;

        match waited {
            Ok(outcome) => {
                let handle = outcome.value;
                debug!(item = %item.id(), rechecks = outcome.rechecks, status = %handle.status, "Job finished");

                if handle.status.is_success() {
                    Step::Fetch(handle)
                } else {
                    warn!(
                        item = %item.id(),
                        status = %handle.status,
                        reason = handle.failure_reason.as_deref().unwrap_or("none given"),
                        "Transcription job failed"
                    );
                    item.mark_job_failed(handle.status, handle.failure_reason);
                    self.report(item, "FAILED", Severity::Failed);
                    Step::Cleanup { failure: None }
                }
            }
            Err(e) => {
                let err = ItemError::StatusCheck(e);
                item.mark_faulted(&err);
                Step::Cleanup { failure: Some(err) }
            }
        }
    }

    async fn fetch(&self, item: &mut WorkItem, handle: JobHandle) -> Step {
        item.enter(Stage::FetchingResult);
        self.report(item, "Downloading transcript...", Severity::Active);

        let result = match handle.transcript_uri.as_deref() {
            None => Err(ItemError::MissingTranscriptUri(handle.name.clone())),
            Some(uri) => match self.services.fetcher.fetch(uri).await {
                Ok(body) => parse_transcript(&body).map_err(ItemError::from),
                Err(e) => Err(ItemError::Fetch(e)),
            },
        };

        match result {
            Ok(text) => {
                item.set_transcript(text);
                Step::Cleanup { failure: None }
            }
            Err(err) => {
                item.mark_faulted(&err);
                Step::Cleanup { failure: Some(err) }
            }
        }
    }

    async fn cleanup(
        &self,
        item: &mut WorkItem,
        job_name: &str,
        failure: Option<ItemError>,
    ) -> Step {
        item.enter(Stage::CleaningUp);
        self.report(item, "Cleaning up...", Severity::Active);

        let (object, job) = join(
            self.services.object_store.delete(item.remote_key()),
            self.services.jobs.delete(job_name),
        )
        .await;

        if let Err(e) = object {
            warn!(item = %item.id(), key = %item.remote_key(), "Failed to delete remote object: {}", e);
        }
        if let Err(e) = job {
            warn!(item = %item.id(), job = %job_name, "Failed to delete transcription job: {}", e);
        }

        match failure {
            Some(err) => Step::Failed(err),
            None => Step::Ready,
        }
    }

    fn fail(&self, item: &mut WorkItem, err: &ItemError) {
        if item.fault().is_none() {
            item.mark_faulted(err);
        }
        error!(item = %item.id(), stage = %item.stage(), "{}", err);
        self.report(item, format!("Failed: {}", err), Severity::Failed);
    }

    /// Runs the send stage for an item that is ready to finalize.
    pub(crate) async fn finalize(&self, item: &mut WorkItem) -> Result<(), ItemError> {
        item.enter(Stage::Sending);
        self.report(item, "Sending email...", Severity::Active);

        let mail = OutgoingMail {
            recipients: item.recipients().to_vec(),
            subject: item.file_name().to_string(),
            body: item.transcript().unwrap_or_default().to_string(),
            attachment: item.source().to_path_buf(),
        };

        if let Err(e) = self.services.mailer.send(&mail).await {
            let err = ItemError::Send(e);
            self.fail(item, &err);
            return Err(err);
        }

        if self.config.rename_after_send {
            let target = renamed_path(item, &self.config.rename_suffix);
            match tokio::fs::rename(item.source(), &target).await {
                Ok(()) => debug!(item = %item.id(), to = %target.display(), "Recording renamed"),
                Err(e) => warn!(item = %item.id(), "Failed to rename recording: {}", e),
            }
        }

        item.enter(Stage::Finished);
        info!(item = %item.id(), transcribed = item.transcript().is_some(), "Recording delivered");
        self.report(item, "Finished", Severity::Success);
        Ok(())
    }
}

fn renamed_path(item: &WorkItem, suffix: &str) -> PathBuf {
    let mut name: OsString = item.source().as_os_str().to_os_string();
    name.push(suffix);
    PathBuf::from(name)
}

/// Formats a byte count with binary units and one decimal.
fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KiB", "MiB", "GiB", "TiB"];

    if bytes < 1024 {
        return format!("{} B", bytes);
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{:.1} {}", value, UNITS[unit])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(0), "0 B");
        assert_eq!(format_size(1023), "1023 B");
        assert_eq!(format_size(1536), "1.5 KiB");
        assert_eq!(format_size(5 * 1024 * 1024), "5.0 MiB");
        assert_eq!(format_size(3 * 1024 * 1024 * 1024 / 2), "1.5 GiB");
    }

    #[test]
    fn test_renamed_path() {
        let item = WorkItem::new("/mnt/e/VOICE/Home/REC001.MP3", vec![]);
        assert_eq!(
            renamed_path(&item, ".BAK"),
            PathBuf::from("/mnt/e/VOICE/Home/REC001.MP3.BAK")
        );
    }
}
