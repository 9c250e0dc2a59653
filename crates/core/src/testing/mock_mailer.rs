//! Mock mailer for testing.

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;

use crate::services::{Mailer, OutgoingMail, ServiceError};

/// A recorded send attempt.
#[derive(Debug, Clone)]
pub struct SentMail {
    pub mail: OutgoingMail,
    /// When the send call started.
    pub at: Instant,
    pub success: bool,
}

/// Mock implementation of the Mailer trait.
#[derive(Debug, Clone)]
pub struct MockMailer {
    sent: Arc<RwLock<Vec<SentMail>>>,
    failing_subjects: Arc<RwLock<HashSet<String>>>,
    latency_ms: Arc<RwLock<u64>>,
}

impl Default for MockMailer {
    fn default() -> Self {
        Self::new()
    }
}

impl MockMailer {
    pub fn new() -> Self {
        Self {
            sent: Arc::new(RwLock::new(Vec::new())),
            failing_subjects: Arc::new(RwLock::new(HashSet::new())),
            latency_ms: Arc::new(RwLock::new(0)),
        }
    }

    /// All send attempts, in call order.
    pub async fn sent(&self) -> Vec<SentMail> {
        self.sent.read().await.clone()
    }

    /// Subjects of successful sends, in call order.
    pub async fn delivered_subjects(&self) -> Vec<String> {
        self.sent
            .read()
            .await
            .iter()
            .filter(|s| s.success)
            .map(|s| s.mail.subject.clone())
            .collect()
    }

    /// Make sends with this subject fail.
    pub async fn fail_subject(&self, subject: &str) {
        self.failing_subjects.write().await.insert(subject.to_string());
    }

    /// Set the simulated duration of every send.
    pub async fn set_latency(&self, latency: Duration) {
        *self.latency_ms.write().await = latency.as_millis() as u64;
    }
}

#[async_trait]
impl Mailer for MockMailer {
    fn name(&self) -> &str {
        "mock"
    }

    async fn send(&self, mail: &OutgoingMail) -> Result<(), ServiceError> {
        let at = Instant::now();
        let ms = *self.latency_ms.read().await;
        if ms > 0 {
            tokio::time::sleep(Duration::from_millis(ms)).await;
        }

        let success = !self.failing_subjects.read().await.contains(&mail.subject);
        self.sent.write().await.push(SentMail {
            mail: mail.clone(),
            at,
            success,
        });

        if success {
            Ok(())
        } else {
            Err(ServiceError::ConnectionFailed("mail relay unavailable".to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::Recipient;
    use std::path::PathBuf;
    use tokio_test::{assert_err, assert_ok};

    fn mail(subject: &str) -> OutgoingMail {
        OutgoingMail {
            recipients: vec![Recipient::new("a@example.com")],
            subject: subject.to_string(),
            body: String::new(),
            attachment: PathBuf::from("/tmp/REC001.MP3"),
        }
    }

    #[tokio::test]
    async fn test_records_failed_attempts() {
        let mailer = MockMailer::new();
        mailer.fail_subject("REC002.MP3").await;

        assert_ok!(mailer.send(&mail("REC001.MP3")).await);
        assert_err!(mailer.send(&mail("REC002.MP3")).await);

        assert_eq!(mailer.sent().await.len(), 2);
        assert_eq!(mailer.delivered_subjects().await, vec!["REC001.MP3"]);
    }
}
