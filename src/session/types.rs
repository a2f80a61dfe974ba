//! Types shared by the session coordinator and its producers

use async_trait::async_trait;
use bytes::Bytes;
use serde::Serialize;
use thiserror::Error;

use crate::analysis::{Emotion, EmotionFrame, EngagementLevel, VoiceQualitySample};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("a session is already in progress")]
    AlreadyActive,
    #[error("no session is in progress")]
    NotActive,
    /// Camera or microphone unavailable or permission denied
    #[error("capture device error: {0}")]
    Device(String),
}

/// One recorded audio chunk, still encoded
#[derive(Debug, Clone)]
pub struct EncodedChunk {
    pub data: Bytes,
    /// Name sent to the transcription service; its extension names the container
    pub file_name: String,
}

impl EncodedChunk {
    pub fn wav(data: impl Into<Bytes>) -> Self {
        Self {
            data: data.into(),
            file_name: "chunk.wav".to_string(),
        }
    }
}

/// Microphone capture. `stop` must not return until the device is released.
#[async_trait]
pub trait ChunkRecorder: Send + Sync {
    async fn start(&self) -> Result<(), SessionError>;
    async fn stop(&self) -> Result<EncodedChunk, SessionError>;
}

/// Face expression detection on the current camera frame. `None` means no face found.
#[async_trait]
pub trait ExpressionDetector: Send + Sync {
    async fn detect(&self) -> Result<Option<EmotionFrame>, SessionError>;
}

/// Everything a producer can report to the session
#[derive(Debug, Clone)]
pub enum Observation {
    Emotion(EmotionFrame),
    Voice(VoiceQualitySample),
    Transcript { sequence_id: u64, text: String },
    DeviceError(String),
}

/// Live view for the presenter's screen
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveReadings {
    pub is_active: bool,
    pub is_recording: bool,
    pub engagement: Option<f32>,
    pub engagement_level: Option<EngagementLevel>,
    /// Strongest expression on the latest frame
    pub expression: Option<Emotion>,
    pub voice: Option<VoiceQualitySample>,
    pub transcript: String,
    pub student_messages: usize,
    pub device_error: Option<String>,
}
