// transcription/provider.rs
//
// Trait implemented by every speech-to-text backend.

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TranscriptionError {
    #[error("audio chunk is empty")]
    EmptyAudio,
    #[error("transcription request failed: {0}")]
    Request(String),
    #[error("transcription service returned {status}: {body}")]
    Api { status: u16, body: String },
    #[error("invalid transcription response: {0}")]
    InvalidResponse(String),
}

/// A speech-to-text backend. A failure affects only the chunk that was sent.
#[async_trait]
pub trait TranscriptionProvider: Send + Sync {
    fn provider_name(&self) -> &'static str;

    /// Transcribe one encoded audio chunk; `file_name` carries the container extension
    async fn transcribe(&self, audio: Bytes, file_name: &str) -> Result<String, TranscriptionError>;
}
