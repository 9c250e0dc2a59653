//! Pipeline module: drives a batch of recordings to delivery.
//!
//! This module provides the [`PipelineCoordinator`], which composes:
//! - [`ConcurrencyLimiter`]: at most `concurrency` recordings in flight
//! - the per-item stage machine (upload, transcribe, fetch, cleanup)
//! - [`PollingWaiter`]: non-blocking wait for the transcription job
//! - ordered, paced delivery once every recording has been processed
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use dictaphone_core::pipeline::{PipelineConfig, PipelineCoordinator, PipelineServices};
//!
//! let services = PipelineServices {
//!     object_store: Arc::new(store),
//!     jobs: Arc::new(jobs),
//!     fetcher: Arc::new(fetcher),
//!     mailer: Arc::new(mailer),
//!     reporter: Arc::new(TracingReporter),
//! };
//!
//! let coordinator = PipelineCoordinator::new(PipelineConfig::default(), services);
//! let report = coordinator.run(items).await;
//! println!("{} of {} delivered", report.delivered(), report.total());
//! ```

mod config;
mod coordinator;
mod error;
mod limiter;
mod machine;
mod poll;
mod types;

pub use config::PipelineConfig;
pub use coordinator::{PipelineCoordinator, PipelineServices};
pub use error::ItemError;
pub use limiter::{ConcurrencyLimiter, LimiterStats};
pub use poll::{PollOutcome, PollingWaiter};
pub use types::{BatchReport, ItemOutcome, ItemSummary};
