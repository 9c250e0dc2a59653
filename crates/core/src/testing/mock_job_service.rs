//! Mock transcription job service for testing.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::services::{JobHandle, JobService, JobStatus, ServiceError};

/// Mock implementation of the JobService trait.
///
/// Each job follows a status script: `submit` answers with the first entry
/// and every `status` call advances one entry, repeating the last one once
/// the script runs out. Jobs without a script go `IN_PROGRESS` then
/// `COMPLETED`. Completed jobs point at `mock://transcripts/<job name>`.
#[derive(Debug, Clone)]
pub struct MockJobService {
    scripts: Arc<RwLock<HashMap<String, VecDeque<JobStatus>>>>,
    submits: Arc<RwLock<Vec<(String, String)>>>,
    status_calls: Arc<RwLock<HashMap<String, usize>>>,
    deletes: Arc<RwLock<Vec<String>>>,
    failing_submits: Arc<RwLock<HashSet<String>>>,
    failing_status: Arc<RwLock<HashSet<String>>>,
    failing_deletes: Arc<RwLock<HashSet<String>>>,
    latency_ms: Arc<RwLock<u64>>,
}

impl Default for MockJobService {
    fn default() -> Self {
        Self::new()
    }
}

impl MockJobService {
    pub fn new() -> Self {
        Self {
            scripts: Arc::new(RwLock::new(HashMap::new())),
            submits: Arc::new(RwLock::new(Vec::new())),
            status_calls: Arc::new(RwLock::new(HashMap::new())),
            deletes: Arc::new(RwLock::new(Vec::new())),
            failing_submits: Arc::new(RwLock::new(HashSet::new())),
            failing_status: Arc::new(RwLock::new(HashSet::new())),
            failing_deletes: Arc::new(RwLock::new(HashSet::new())),
            latency_ms: Arc::new(RwLock::new(0)),
        }
    }

    /// Set the status sequence for a job.
    pub async fn set_script(&self, job_name: &str, statuses: Vec<JobStatus>) {
        self.scripts
            .write()
            .await
            .insert(job_name.to_string(), statuses.into());
    }

    /// Job names submitted so far, in call order.
    pub async fn submitted_jobs(&self) -> Vec<String> {
        self.submits.read().await.iter().map(|(n, _)| n.clone()).collect()
    }

    /// Media URI a job was submitted with.
    pub async fn media_uri_of(&self, job_name: &str) -> Option<String> {
        self.submits
            .read()
            .await
            .iter()
            .find(|(n, _)| n == job_name)
            .map(|(_, uri)| uri.clone())
    }

    /// Number of status calls made for a job.
    pub async fn status_calls(&self, job_name: &str) -> usize {
        self.status_calls
            .read()
            .await
            .get(job_name)
            .copied()
            .unwrap_or(0)
    }

    /// Job names deleted so far, in call order.
    pub async fn deleted_jobs(&self) -> Vec<String> {
        self.deletes.read().await.clone()
    }

    /// Number of delete calls for a job.
    pub async fn delete_count(&self, job_name: &str) -> usize {
        self.deletes.read().await.iter().filter(|n| *n == job_name).count()
    }

    pub async fn fail_submit(&self, job_name: &str) {
        self.failing_submits.write().await.insert(job_name.to_string());
    }

    pub async fn fail_status(&self, job_name: &str) {
        self.failing_status.write().await.insert(job_name.to_string());
    }

    pub async fn fail_delete(&self, job_name: &str) {
        self.failing_deletes.write().await.insert(job_name.to_string());
    }

    /// Set the simulated duration of every call.
    pub async fn set_latency(&self, latency: Duration) {
        *self.latency_ms.write().await = latency.as_millis() as u64;
    }

    async fn simulate_latency(&self) {
        let ms = *self.latency_ms.read().await;
        if ms > 0 {
            tokio::time::sleep(Duration::from_millis(ms)).await;
        }
    }

    /// Pops the next scripted status for a job.
    async fn next_status(&self, job_name: &str) -> JobStatus {
        let mut scripts = self.scripts.write().await;
        let script = scripts
            .entry(job_name.to_string())
            .or_insert_with(|| VecDeque::from([JobStatus::InProgress, JobStatus::Completed]));

        if script.len() > 1 {
            script.pop_front().unwrap_or(JobStatus::Completed)
        } else {
            script.front().cloned().unwrap_or(JobStatus::Completed)
        }
    }

    fn handle(job_name: &str, status: JobStatus) -> JobHandle {
        let handle = JobHandle::new(job_name, status.clone());
        match status {
            JobStatus::Completed => {
                handle.with_transcript_uri(format!("mock://transcripts/{}", job_name))
            }
            JobStatus::Queued | JobStatus::InProgress => handle,
            _ => handle.with_failure_reason("mock failure"),
        }
    }
}

#[async_trait]
impl JobService for MockJobService {
    fn name(&self) -> &str {
        "mock"
    }

    async fn submit(&self, job_name: &str, media_uri: &str) -> Result<JobHandle, ServiceError> {
        self.simulate_latency().await;
        if self.failing_submits.read().await.contains(job_name) {
            return Err(ServiceError::api(400, format!("job {} rejected", job_name)));
        }
        self.submits
            .write()
            .await
            .push((job_name.to_string(), media_uri.to_string()));
        let status = self.next_status(job_name).await;
        Ok(Self::handle(job_name, status))
    }

    async fn status(&self, job_name: &str) -> Result<JobHandle, ServiceError> {
        self.simulate_latency().await;
        *self
            .status_calls
            .write()
            .await
            .entry(job_name.to_string())
            .or_insert(0) += 1;
        if self.failing_status.read().await.contains(job_name) {
            return Err(ServiceError::Timeout);
        }
        let status = self.next_status(job_name).await;
        Ok(Self::handle(job_name, status))
    }

    async fn delete(&self, job_name: &str) -> Result<(), ServiceError> {
        self.simulate_latency().await;
        self.deletes.write().await.push(job_name.to_string());
        if self.failing_deletes.read().await.contains(job_name) {
            return Err(ServiceError::NotFound(format!("job {}", job_name)));
        }
        Ok(())
    }
}
