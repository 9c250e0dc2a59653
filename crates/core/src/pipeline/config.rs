//! Configuration for the pipeline coordinator.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Runtime settings of the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Maximum recordings in the concurrent phase at once.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Delay between two status checks of a running job, in milliseconds.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,

    /// Minimum time between the start of two consecutive sends, in milliseconds.
    #[serde(default = "default_min_send_interval")]
    pub min_send_interval_ms: u64,

    /// Rename each recording after it has been sent.
    #[serde(default = "default_rename_after_send")]
    pub rename_after_send: bool,

    /// Suffix appended to the file name when renaming.
    #[serde(default = "default_rename_suffix")]
    pub rename_suffix: String,

    /// Prefix of every remote job name.
    #[serde(default = "default_job_name_prefix")]
    pub job_name_prefix: String,
}

fn default_concurrency() -> usize {
    25
}

fn default_poll_interval() -> u64 {
    1000 // 1 second
}

fn default_min_send_interval() -> u64 {
    1000 // 1 second
}

fn default_rename_after_send() -> bool {
    true
}

fn default_rename_suffix() -> String {
    ".BAK".to_string()
}

fn default_job_name_prefix() -> String {
    "dictaphone-to-email-".to_string()
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
            poll_interval_ms: default_poll_interval(),
            min_send_interval_ms: default_min_send_interval(),
            rename_after_send: default_rename_after_send(),
            rename_suffix: default_rename_suffix(),
            job_name_prefix: default_job_name_prefix(),
        }
    }
}

impl PipelineConfig {
    /// Sets the concurrency cap.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    /// Sets the job status polling interval.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval_ms = interval.as_millis() as u64;
        self
    }

    /// Sets the minimum spacing between sends.
    pub fn with_min_send_interval(mut self, interval: Duration) -> Self {
        self.min_send_interval_ms = interval.as_millis() as u64;
        self
    }

    /// Enables or disables renaming after send.
    pub fn with_rename_after_send(mut self, enabled: bool) -> Self {
        self.rename_after_send = enabled;
        self
    }

    /// Sets the job name prefix.
    pub fn with_job_name_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.job_name_prefix = prefix.into();
        self
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn min_send_interval(&self) -> Duration {
        Duration::from_millis(self.min_send_interval_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PipelineConfig::default();
        assert_eq!(config.concurrency, 25);
        assert_eq!(config.poll_interval(), Duration::from_secs(1));
        assert_eq!(config.min_send_interval(), Duration::from_secs(1));
        assert!(config.rename_after_send);
        assert_eq!(config.rename_suffix, ".BAK");
        assert_eq!(config.job_name_prefix, "dictaphone-to-email-");
    }

    #[test]
    fn test_deserialize_minimal() {
        let config: PipelineConfig = toml::from_str("concurrency = 4").unwrap();
        assert_eq!(config.concurrency, 4);
        assert_eq!(config.poll_interval_ms, 1000);
        assert!(config.rename_after_send);
    }

    #[test]
    fn test_config_builder() {
        let config = PipelineConfig::default()
            .with_concurrency(1)
            .with_poll_interval(Duration::from_millis(250))
            .with_min_send_interval(Duration::from_millis(10))
            .with_rename_after_send(false)
            .with_job_name_prefix("test-");

        assert_eq!(config.concurrency, 1);
        assert_eq!(config.poll_interval_ms, 250);
        assert_eq!(config.min_send_interval_ms, 10);
        assert!(!config.rename_after_send);
        assert_eq!(config.job_name_prefix, "test-");
    }
}
