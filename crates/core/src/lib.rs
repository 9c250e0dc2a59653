pub mod backends;
pub mod config;
pub mod item;
pub mod pipeline;
pub mod services;
pub mod status;
pub mod testing;
pub mod transcript;

pub use backends::{
    build_http_client, FsObjectStore, HttpJobService, HttpResultFetcher, OutboxEnvelope,
    OutboxMailer,
};
pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, FolderConfig,
    MailBackend, SourceConfig, StorageBackend, TranscriptionBackend,
};
pub use item::{Recipient, Stage, WorkItem};
pub use pipeline::{
    BatchReport, ConcurrencyLimiter, ItemError, ItemOutcome, ItemSummary, PipelineConfig,
    PipelineCoordinator, PipelineServices, PollingWaiter,
};
pub use services::{
    JobHandle, JobService, JobStatus, Mailer, ObjectStore, OutgoingMail, ResultFetcher,
    ServiceError,
};
pub use status::{ChannelReporter, Severity, StatusEvent, StatusReporter, TracingReporter};
pub use transcript::{parse_transcript, TranscriptError};
