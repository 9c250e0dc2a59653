//! Capability interfaces for the remote services a recording passes through.
//!
//! The pipeline never owns a concrete client. It is handed shared,
//! long-lived implementations of these traits and calls through them:
//!
//! - [`ObjectStore`]: staging area the transcription service reads from
//! - [`JobService`]: long-running transcription jobs
//! - [`ResultFetcher`]: download of the finished transcript document
//! - [`Mailer`]: final delivery of the transcript
//!
//! Reference implementations live in [`crate::backends`], mocks in
//! [`crate::testing`].

mod error;
mod traits;
mod types;

pub use error::ServiceError;
pub use traits::{JobService, Mailer, ObjectStore, ResultFetcher};
pub use types::{JobHandle, JobStatus, OutgoingMail};
