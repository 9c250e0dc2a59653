use super::{
    types::{Config, MailBackend, StorageBackend, TranscriptionBackend},
    ConfigError,
};

/// Validate configuration
/// Currently validates:
/// - At least one source folder, each with a recipient
/// - Pipeline concurrency and poll interval are not 0
/// - Job name prefix and bucket are not empty
/// - The selected backends have their sections
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.source.folders.is_empty() {
        return Err(invalid("source.folders cannot be empty"));
    }
    for folder in &config.source.folders {
        if folder.recipients.is_empty() {
            return Err(invalid(format!(
                "source folder {} has no recipients",
                folder.path.display()
            )));
        }
    }

    if config.pipeline.concurrency == 0 {
        return Err(invalid("pipeline.concurrency cannot be 0"));
    }
    if config.pipeline.poll_interval_ms == 0 {
        return Err(invalid("pipeline.poll_interval_ms cannot be 0"));
    }
    if config.pipeline.job_name_prefix.is_empty() {
        return Err(invalid("pipeline.job_name_prefix cannot be empty"));
    }

    if config.storage.bucket.is_empty() {
        return Err(invalid("storage.bucket cannot be empty"));
    }
    if config.storage.backend == StorageBackend::Filesystem && config.storage.filesystem.is_none()
    {
        return Err(invalid(
            "storage.backend is \"filesystem\" but [storage.filesystem] is missing",
        ));
    }
    if config.transcription.backend == TranscriptionBackend::Http
        && config.transcription.http.is_none()
    {
        return Err(invalid(
            "transcription.backend is \"http\" but [transcription.http] is missing",
        ));
    }
    if config.mail.backend == MailBackend::Outbox && config.mail.outbox.is_none() {
        return Err(invalid("mail.backend is \"outbox\" but [mail.outbox] is missing"));
    }

    Ok(())
}

fn invalid(message: impl Into<String>) -> ConfigError {
    ConfigError::ValidationError(message.into())
}
