//! Pipeline lifecycle integration tests.
//!
//! These tests run whole batches through the coordinator with mock services:
//! - Stage progression and status messages
//! - Concurrency cap and ordered, paced delivery
//! - Cleanup on success and on every failure path
//! - Failure isolation between items

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;
use tokio::time::Instant;

use dictaphone_core::{
    pipeline::{ItemOutcome, PipelineConfig, PipelineCoordinator, PipelineServices},
    services::JobStatus,
    testing::{
        fixtures, MockJobService, MockMailer, MockObjectStore, MockResultFetcher,
        RecordingReporter,
    },
    BatchReport, Stage, WorkItem,
};

const PREFIX: &str = "dictaphone-to-email-";

/// Test helper wiring a coordinator to mocks.
struct TestHarness {
    store: MockObjectStore,
    jobs: MockJobService,
    fetcher: MockResultFetcher,
    mailer: MockMailer,
    reporter: RecordingReporter,
    config: PipelineConfig,
    source_dir: TempDir,
}

impl TestHarness {
    fn new() -> Self {
        Self::with_config(
            PipelineConfig::default()
                .with_poll_interval(Duration::from_millis(100))
                .with_min_send_interval(Duration::from_millis(1000)),
        )
    }

    fn with_config(config: PipelineConfig) -> Self {
        Self {
            store: MockObjectStore::new(),
            jobs: MockJobService::new(),
            fetcher: MockResultFetcher::new(),
            mailer: MockMailer::new(),
            reporter: RecordingReporter::new(),
            config,
            source_dir: TempDir::new().expect("Failed to create source dir"),
        }
    }

    fn coordinator(&self) -> PipelineCoordinator {
        let services = PipelineServices {
            object_store: Arc::new(self.store.clone()),
            jobs: Arc::new(self.jobs.clone()),
            fetcher: Arc::new(self.fetcher.clone()),
            mailer: Arc::new(self.mailer.clone()),
            reporter: Arc::new(self.reporter.clone()),
        };
        PipelineCoordinator::new(self.config.clone(), services)
    }

    /// Creates `count` recordings `REC001.MP3`... with keys `k1`...
    fn items(&self, count: usize) -> Vec<WorkItem> {
        (1..=count)
            .map(|n| {
                let path = fixtures::recording(self.source_dir.path(), &format!("REC{:03}.MP3", n));
                fixtures::item(path, &format!("k{}", n))
            })
            .collect()
    }

    fn path(&self, name: &str) -> PathBuf {
        self.source_dir.path().join(name)
    }

    fn id(&self, name: &str) -> String {
        self.path(name).display().to_string()
    }

    async fn run(&self, items: Vec<WorkItem>) -> BatchReport {
        self.coordinator().run(items).await
    }
}

fn job(key: &str) -> String {
    format!("{}{}", PREFIX, key)
}

fn transcript_uri(key: &str) -> String {
    format!("mock://transcripts/{}", job(key))
}

#[tokio::test(start_paused = true)]
async fn test_happy_path_delivers_transcript() {
    let h = TestHarness::new();
    h.fetcher
        .set_body(&transcript_uri("k1"), fixtures::transcript_body("hello world"))
        .await;

    let report = h.run(h.items(1)).await;

    assert_eq!(report.total(), 1);
    assert_eq!(report.delivered(), 1);
    assert_eq!(report.items[0].outcome, ItemOutcome::Delivered);
    assert_eq!(report.items[0].stage, Stage::Finished);

    let sent = h.mailer.sent().await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].mail.subject, "REC001.MP3");
    assert_eq!(sent[0].mail.body, "hello world");
    assert_eq!(sent[0].mail.attachment, h.path("REC001.MP3"));
    assert_eq!(sent[0].mail.recipients[0].email, "home@example.com");

    assert_eq!(h.store.uploaded_keys().await, vec!["k1"]);
    assert_eq!(h.jobs.submitted_jobs().await, vec![job("k1")]);
    assert_eq!(
        h.jobs.media_uri_of(&job("k1")).await.as_deref(),
        Some("mock://bucket/k1")
    );
}

#[tokio::test(start_paused = true)]
async fn test_stages_never_decrease() {
    let h = TestHarness::new();
    h.jobs
        .set_script(
            &job("k2"),
            vec![JobStatus::Queued, JobStatus::InProgress, JobStatus::Failed],
        )
        .await;

    h.run(h.items(3)).await;

    for name in ["REC001.MP3", "REC002.MP3", "REC003.MP3"] {
        let stages = h.reporter.stages_for(&h.id(name));
        assert_eq!(stages.first(), Some(&Stage::Pending));
        assert_eq!(stages.last(), Some(&Stage::Finished));
        assert!(
            stages.windows(2).all(|w| w[0] <= w[1]),
            "{} went backwards: {:?}",
            name,
            stages
        );
    }
}

#[tokio::test(start_paused = true)]
async fn test_status_messages_follow_lifecycle() {
    let h = TestHarness::new();
    h.run(h.items(1)).await;

    let messages: Vec<String> = h
        .reporter
        .events_for(&h.id("REC001.MP3"))
        .into_iter()
        .map(|e| e.message)
        .collect();

    assert_eq!(
        messages,
        vec![
            "Waiting to transcribe...",
            "Uploading (1.5 KiB)...",
            "Starting transcription...",
            "Transcribing...",
            "Transcribing...",
            "Downloading transcript...",
            "Cleaning up...",
            "Waiting to send...",
            "Sending email...",
            "Finished",
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn test_concurrency_cap_is_respected() {
    let h = TestHarness::with_config(
        PipelineConfig::default()
            .with_concurrency(5)
            .with_poll_interval(Duration::from_millis(100))
            .with_min_send_interval(Duration::ZERO),
    );
    h.store.set_latency(Duration::from_millis(200)).await;

    let report = h.run(h.items(30)).await;

    assert_eq!(report.delivered(), 30);
    assert_eq!(report.peak_concurrency, 5);
    assert!(h.reporter.peak_processing() <= 5);
    assert_eq!(h.reporter.peak_processing(), 5);
}

#[tokio::test(start_paused = true)]
async fn test_concurrency_of_one_runs_sequentially() {
    let h = TestHarness::with_config(
        PipelineConfig::default()
            .with_concurrency(1)
            .with_poll_interval(Duration::from_millis(100))
            .with_min_send_interval(Duration::ZERO),
    );
    h.store.set_latency(Duration::from_millis(500)).await;

    let started = Instant::now();
    let report = h.run(h.items(4)).await;

    assert_eq!(report.delivered(), 4);
    assert_eq!(report.peak_concurrency, 1);
    assert_eq!(h.reporter.peak_processing(), 1);
    // Each item uploads once and deletes its object once.
    assert!(started.elapsed() >= Duration::from_millis(4 * 1000));
}

#[tokio::test(start_paused = true)]
async fn test_items_are_processed_in_parallel() {
    let h = TestHarness::new();
    h.store.set_latency(Duration::from_millis(500)).await;

    let started = Instant::now();
    let report = h.run(h.items(10)).await;
    let processing = Duration::from_millis(report.processing_duration_ms);

    assert_eq!(report.delivered(), 10);
    assert!(processing < Duration::from_millis(2000), "took {:?}", processing);
    assert!(started.elapsed() >= processing);
}

#[tokio::test(start_paused = true)]
async fn test_sends_follow_discovery_order_and_are_spaced() {
    let h = TestHarness::new();
    // The first item finishes transcription last.
    h.jobs
        .set_script(
            &job("k1"),
            vec![
                JobStatus::InProgress,
                JobStatus::InProgress,
                JobStatus::InProgress,
                JobStatus::InProgress,
                JobStatus::Completed,
            ],
        )
        .await;

    h.run(h.items(4)).await;

    let sent = h.mailer.sent().await;
    let subjects: Vec<&str> = sent.iter().map(|s| s.mail.subject.as_str()).collect();
    assert_eq!(
        subjects,
        vec!["REC001.MP3", "REC002.MP3", "REC003.MP3", "REC004.MP3"]
    );
    for pair in sent.windows(2) {
        assert!(pair[1].at - pair[0].at >= Duration::from_millis(1000));
    }
}

#[tokio::test(start_paused = true)]
async fn test_sending_starts_after_all_processing() {
    let h = TestHarness::new();
    h.jobs
        .set_script(
            &job("k3"),
            vec![
                JobStatus::InProgress,
                JobStatus::InProgress,
                JobStatus::InProgress,
                JobStatus::Completed,
            ],
        )
        .await;

    h.run(h.items(3)).await;

    let events = h.reporter.events();
    let last_processing = events
        .iter()
        .rposition(|e| e.stage.is_processing())
        .expect("processing events");
    let first_send = events
        .iter()
        .position(|e| e.stage == Stage::Sending)
        .expect("send events");
    assert!(last_processing < first_send);
}

#[tokio::test(start_paused = true)]
async fn test_polling_rechecks_until_terminal() {
    let h = TestHarness::new();
    h.jobs
        .set_script(
            &job("k1"),
            vec![JobStatus::InProgress, JobStatus::InProgress, JobStatus::Completed],
        )
        .await;

    let report = h.run(h.items(1)).await;

    assert_eq!(report.delivered(), 1);
    assert_eq!(h.jobs.status_calls(&job("k1")).await, 2);
    assert!(Duration::from_millis(report.processing_duration_ms) >= Duration::from_millis(200));
}

#[tokio::test(start_paused = true)]
async fn test_every_poll_reports_awaiting_job() {
    let h = TestHarness::new();
    // Submit answers IN_PROGRESS, then three status checks.
    h.jobs
        .set_script(
            &job("k1"),
            vec![
                JobStatus::InProgress,
                JobStatus::InProgress,
                JobStatus::InProgress,
                JobStatus::Completed,
            ],
        )
        .await;

    h.run(h.items(1)).await;

    assert_eq!(h.jobs.status_calls(&job("k1")).await, 3);
    let awaiting: Vec<_> = h
        .reporter
        .events_for(&h.id("REC001.MP3"))
        .into_iter()
        .filter(|e| e.stage == Stage::AwaitingJob)
        .collect();
    assert_eq!(awaiting.len(), 4);
    assert!(awaiting.iter().all(|e| e.message == "Transcribing..."));
}

#[tokio::test(start_paused = true)]
async fn test_cleanup_runs_once_on_success() {
    let h = TestHarness::new();
    h.run(h.items(3)).await;

    for key in ["k1", "k2", "k3"] {
        assert_eq!(h.store.delete_count(key).await, 1);
        assert_eq!(h.jobs.delete_count(&job(key)).await, 1);
    }
}

#[tokio::test(start_paused = true)]
async fn test_failed_job_is_sent_without_transcript() {
    let h = TestHarness::new();
    h.jobs
        .set_script(&job("k1"), vec![JobStatus::InProgress, JobStatus::Failed])
        .await;

    let report = h.run(h.items(2)).await;

    assert_eq!(report.delivered(), 2);
    assert_eq!(report.job_failures(), 1);
    assert_eq!(
        report.items[0].outcome,
        ItemOutcome::DeliveredWithoutTranscript {
            job_status: "FAILED".to_string()
        }
    );

    // No download for the failed job, cleanup still happens.
    assert_eq!(h.fetcher.fetched().await, vec![transcript_uri("k2")]);
    assert_eq!(h.store.delete_count("k1").await, 1);
    assert_eq!(h.jobs.delete_count(&job("k1")).await, 1);

    let stages = h.reporter.stages_for(&h.id("REC001.MP3"));
    assert!(!stages.contains(&Stage::FetchingResult));
    assert!(h
        .reporter
        .events_for(&h.id("REC001.MP3"))
        .iter()
        .any(|e| e.message == "FAILED"));

    let sent = h.mailer.sent().await;
    assert_eq!(sent[0].mail.subject, "REC001.MP3");
    assert_eq!(sent[0].mail.body, "");
}

#[tokio::test(start_paused = true)]
async fn test_upload_failure_only_affects_its_item() {
    let h = TestHarness::new();
    h.store.fail_put("k2").await;

    let report = h.run(h.items(3)).await;

    assert_eq!(report.delivered(), 2);
    assert_eq!(report.failed(), 1);
    assert!(matches!(
        report.items[1].outcome,
        ItemOutcome::Failed {
            failed_at: Stage::Uploading,
            ..
        }
    ));
    assert!(!h.jobs.submitted_jobs().await.contains(&job("k2")));
    assert_eq!(
        h.mailer.delivered_subjects().await,
        vec!["REC001.MP3", "REC003.MP3"]
    );
    assert!(h.path("REC002.MP3").exists());
}

#[tokio::test(start_paused = true)]
async fn test_submit_failure_deletes_object_but_not_job() {
    let h = TestHarness::new();
    h.jobs.fail_submit(&job("k1")).await;

    let report = h.run(h.items(2)).await;

    assert!(matches!(
        report.items[0].outcome,
        ItemOutcome::Failed {
            failed_at: Stage::SubmittingJob,
            ..
        }
    ));
    assert_eq!(h.store.delete_count("k1").await, 1);
    assert_eq!(h.jobs.delete_count(&job("k1")).await, 0);
    assert_eq!(h.mailer.delivered_subjects().await, vec!["REC002.MP3"]);
}

#[tokio::test(start_paused = true)]
async fn test_status_check_failure_cleans_up() {
    let h = TestHarness::new();
    h.jobs.fail_status(&job("k1")).await;

    let report = h.run(h.items(2)).await;

    assert!(matches!(
        report.items[0].outcome,
        ItemOutcome::Failed {
            failed_at: Stage::AwaitingJob,
            ..
        }
    ));
    assert_eq!(h.store.delete_count("k1").await, 1);
    assert_eq!(h.jobs.delete_count(&job("k1")).await, 1);
    assert_eq!(h.mailer.delivered_subjects().await, vec!["REC002.MP3"]);
}

#[tokio::test(start_paused = true)]
async fn test_fetch_failure_cleans_up_and_skips_send() {
    let h = TestHarness::new();
    h.fetcher.fail(&transcript_uri("k1")).await;

    let report = h.run(h.items(2)).await;

    assert!(matches!(
        report.items[0].outcome,
        ItemOutcome::Failed {
            failed_at: Stage::FetchingResult,
            ..
        }
    ));
    assert_eq!(h.store.delete_count("k1").await, 1);
    assert_eq!(h.jobs.delete_count(&job("k1")).await, 1);
    assert_eq!(h.mailer.delivered_subjects().await, vec!["REC002.MP3"]);
    assert!(h.path("REC001.MP3").exists());
}

#[tokio::test(start_paused = true)]
async fn test_malformed_transcript_is_fatal() {
    let h = TestHarness::new();
    h.fetcher.set_body(&transcript_uri("k1"), "not json").await;

    let report = h.run(h.items(1)).await;

    assert_eq!(report.failed(), 1);
    assert_eq!(h.store.delete_count("k1").await, 1);
    assert_eq!(h.jobs.delete_count(&job("k1")).await, 1);
    assert!(h.mailer.sent().await.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_cleanup_failure_is_not_fatal() {
    let h = TestHarness::new();
    h.store.fail_delete("k1").await;
    h.jobs.fail_delete(&job("k1")).await;

    let report = h.run(h.items(1)).await;

    assert_eq!(report.items[0].outcome, ItemOutcome::Delivered);
}

#[tokio::test(start_paused = true)]
async fn test_panicking_item_is_aborted_alone() {
    let h = TestHarness::new();
    h.store.panic_put("k2").await;

    let report = h.run(h.items(3)).await;

    assert_eq!(report.delivered(), 2);
    match &report.items[1].outcome {
        ItemOutcome::Failed { failed_at, error } => {
            assert_eq!(*failed_at, Stage::Pending);
            assert!(error.contains("panicked"), "unexpected error: {}", error);
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
    assert_eq!(report.items[1].stage, Stage::Pending);
    assert_eq!(
        h.mailer.delivered_subjects().await,
        vec!["REC001.MP3", "REC003.MP3"]
    );
    assert!(h.path("REC002.MP3").exists());
}

#[tokio::test(start_paused = true)]
async fn test_upload_failure_does_not_inflate_peak() {
    let h = TestHarness::with_config(
        PipelineConfig::default()
            .with_concurrency(2)
            .with_poll_interval(Duration::from_millis(100))
            .with_min_send_interval(Duration::ZERO),
    );
    h.store.set_latency(Duration::from_millis(200)).await;
    h.store.fail_put("k1").await;
    h.store.fail_put("k2").await;

    let report = h.run(h.items(6)).await;

    assert_eq!(report.failed(), 2);
    assert_eq!(h.reporter.peak_processing(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_send_failure_keeps_recording() {
    let h = TestHarness::new();
    h.mailer.fail_subject("REC001.MP3").await;

    let report = h.run(h.items(2)).await;

    assert!(matches!(
        report.items[0].outcome,
        ItemOutcome::Failed {
            failed_at: Stage::Sending,
            ..
        }
    ));
    assert_eq!(report.items[1].outcome, ItemOutcome::Delivered);
    assert!(h.path("REC001.MP3").exists());
    assert!(!h.path("REC001.MP3.BAK").exists());
    assert!(h.path("REC002.MP3.BAK").exists());
}

#[tokio::test(start_paused = true)]
async fn test_rename_after_send() {
    let h = TestHarness::new();
    h.run(h.items(2)).await;

    for name in ["REC001.MP3", "REC002.MP3"] {
        assert!(!h.path(name).exists());
        assert!(h.path(&format!("{}.BAK", name)).exists());
    }
}

#[tokio::test(start_paused = true)]
async fn test_rename_can_be_disabled() {
    let h = TestHarness::with_config(
        PipelineConfig::default()
            .with_poll_interval(Duration::from_millis(100))
            .with_rename_after_send(false),
    );
    h.run(h.items(1)).await;

    assert!(h.path("REC001.MP3").exists());
    assert!(!h.path("REC001.MP3.BAK").exists());
    assert_eq!(h.mailer.sent().await.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_empty_batch() {
    let h = TestHarness::new();
    let report = h.run(Vec::new()).await;

    assert_eq!(report.total(), 0);
    assert!(h.mailer.sent().await.is_empty());
    assert!(h.reporter.events().is_empty());
}
