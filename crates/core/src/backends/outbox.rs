//! Mail delivery through a pickup directory.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::debug;
use uuid::Uuid;

use crate::config::OutboxConfig;
use crate::item::Recipient;
use crate::services::{Mailer, OutgoingMail, ServiceError};

/// One message as written to the outbox.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutboxEnvelope {
    pub created_at: DateTime<Utc>,
    pub from: Recipient,
    pub to: Vec<Recipient>,
    pub subject: String,
    pub body: String,
    /// Copy of the recording, next to the envelope.
    pub attachment: PathBuf,
}

/// Writes each message as a JSON file for an external agent to deliver.
///
/// The attachment is copied into the outbox first, since the recording may be
/// renamed once `send` returns. The envelope is written under a temporary name
/// and renamed into place, so the agent never picks up a partial message.
#[derive(Debug, Clone)]
pub struct OutboxMailer {
    from: Recipient,
    dir: PathBuf,
}

impl OutboxMailer {
    pub fn new(from: Recipient, config: &OutboxConfig) -> Self {
        Self {
            from,
            dir: config.dir.clone(),
        }
    }
}

#[async_trait]
impl Mailer for OutboxMailer {
    fn name(&self) -> &str {
        "outbox"
    }

    async fn send(&self, mail: &OutgoingMail) -> Result<(), ServiceError> {
        let created_at = Utc::now();
        tokio::fs::create_dir_all(&self.dir).await?;

        let stem = format!(
            "{}-{}",
            created_at.format("%Y%m%dT%H%M%S%.3fZ"),
            Uuid::new_v4().simple()
        );
        let file_name = mail
            .attachment
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "attachment".to_string());
        let attachment = self.dir.join(format!("{}-{}", stem, file_name));
        tokio::fs::copy(&mail.attachment, &attachment).await?;

        let envelope = OutboxEnvelope {
            created_at,
            from: self.from.clone(),
            to: mail.recipients.clone(),
            subject: mail.subject.clone(),
            body: mail.body.clone(),
            attachment,
        };
        let json = serde_json::to_vec_pretty(&envelope).map_err(std::io::Error::other)?;

        let partial = self.dir.join(format!("{}.tmp", stem));
        let target = self.dir.join(format!("{}.json", stem));
        tokio::fs::write(&partial, json).await?;
        tokio::fs::rename(&partial, &target).await?;

        debug!(path = %target.display(), subject = %mail.subject, "Message queued in outbox");
        Ok(())
    }
}
