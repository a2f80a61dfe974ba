// transcription/whisper_api.rs
//
// Hosted Whisper transcription over an OpenAI-compatible multipart endpoint.

use async_trait::async_trait;
use bytes::Bytes;
use log::info;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;

use super::provider::{TranscriptionError, TranscriptionProvider};
use crate::config::TranscriptionConfig;

#[derive(Debug, Deserialize)]
struct WhisperResponse {
    text: Option<String>,
}

pub struct WhisperApiProvider {
    config: TranscriptionConfig,
    api_key: String,
    client: Client,
}

impl WhisperApiProvider {
    pub fn new(config: TranscriptionConfig, api_key: impl Into<String>) -> Result<Self, TranscriptionError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| TranscriptionError::Request(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            config,
            api_key: api_key.into(),
            client,
        })
    }

    /// Build a provider only when the config carries an API key
    pub fn from_config(config: &TranscriptionConfig) -> Result<Option<Self>, TranscriptionError> {
        match config.api_key.clone() {
            Some(key) => Self::new(config.clone(), key).map(Some),
            None => Ok(None),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/audio/transcriptions", self.config.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl TranscriptionProvider for WhisperApiProvider {
    fn provider_name(&self) -> &'static str {
        "whisper-api"
    }

    async fn transcribe(&self, audio: Bytes, file_name: &str) -> Result<String, TranscriptionError> {
        if audio.is_empty() {
            return Err(TranscriptionError::EmptyAudio);
        }

        let size = audio.len();
        let file = Part::bytes(audio.to_vec()).file_name(file_name.to_string());
        let form = Form::new()
            .part("file", file)
            .text("model", self.config.model.clone());

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| TranscriptionError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TranscriptionError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: WhisperResponse = response
            .json()
            .await
            .map_err(|e| TranscriptionError::InvalidResponse(e.to_string()))?;

        let text = parsed
            .text
            .ok_or_else(|| TranscriptionError::InvalidResponse("missing `text` field".to_string()))?;

        info!("Transcribed {} byte chunk: {} chars", size, text.len());
        Ok(text.trim().to_string())
    }
}
