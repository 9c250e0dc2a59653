//! Parsing of the transcript document produced by a finished job.
//!
//! Only `results.transcripts[0].transcript` is used; everything else in the
//! document (per-word timings, alternatives, ...) is ignored.

use serde::Deserialize;
use thiserror::Error;

/// Errors raised while reading a transcript document.
#[derive(Debug, Error)]
pub enum TranscriptError {
    /// Not JSON, or missing required fields.
    #[error("Malformed transcript document: {0}")]
    Malformed(#[from] serde_json::Error),

    /// The document holds no transcript.
    #[error("Transcript document contains no transcripts")]
    Empty,
}

#[derive(Debug, Deserialize)]
struct TranscriptDocument {
    results: TranscriptResults,
}

#[derive(Debug, Deserialize)]
struct TranscriptResults {
    transcripts: Vec<TranscriptEntry>,
}

#[derive(Debug, Deserialize)]
struct TranscriptEntry {
    transcript: String,
}

/// Extracts the transcript text from a raw document.
pub fn parse_transcript(body: &[u8]) -> Result<String, TranscriptError> {
    let document: TranscriptDocument = serde_json::from_slice(body)?;
    document
        .results
        .transcripts
        .into_iter()
        .next()
        .map(|entry| entry.transcript)
        .ok_or(TranscriptError::Empty)
}
