// Practice-Room - teaching practice simulator
//
// Scores a practice lesson from:
// - Voice quality of recorded audio chunks
// - Facial engagement frames
// - The transcript (pace, interaction, content quality)
// and simulates a classroom of students reacting along the way.

use log::{info, warn};
use std::sync::Arc;

// Per-tick logging macros - exported for use by other modules
#[macro_use]
pub mod macros;

// Core modules
pub mod config;
pub mod analysis;
pub mod llm_engine;
pub mod transcription;
pub mod students;
pub mod session;

use analysis::ContentQualityEvaluator;
use config::AppConfig;
use llm_engine::{providers::GeminiProvider, LlmProvider};
use session::SessionCoordinator;
use transcription::{TranscriptionProvider, WhisperApiProvider};

/// Initialize env_logger to output to stderr (reads RUST_LOG env var)
pub fn init_logging() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .try_init();
}

/// Content evaluator for this config: remote when a generative-text key is present
pub fn build_evaluator(config: &AppConfig) -> ContentQualityEvaluator {
    match GeminiProvider::from_config(&config.llm) {
        Ok(Some(provider)) => {
            info!("Content scoring via {} ({})", provider.provider_name(), config.llm.model);
            ContentQualityEvaluator::new(Some(Arc::new(provider) as Arc<dyn LlmProvider>))
        }
        Ok(None) => {
            info!("No generative-text API key configured, content scoring is local");
            ContentQualityEvaluator::local_only()
        }
        Err(e) => {
            warn!("Generative-text provider unavailable, content scoring is local: {}", e);
            ContentQualityEvaluator::local_only()
        }
    }
}

/// Transcription backend for this config, if a key is present
pub fn build_transcriber(config: &AppConfig) -> Option<Arc<dyn TranscriptionProvider>> {
    match WhisperApiProvider::from_config(&config.transcription) {
        Ok(Some(provider)) => Some(Arc::new(provider) as Arc<dyn TranscriptionProvider>),
        Ok(None) => {
            warn!("No transcription API key configured, sessions will have no transcript");
            None
        }
        Err(e) => {
            warn!("Transcription provider unavailable: {}", e);
            None
        }
    }
}

/// Wire a coordinator with the configured hosted services
pub fn build_coordinator(config: AppConfig) -> SessionCoordinator {
    let evaluator = build_evaluator(&config);
    let transcriber = build_transcriber(&config);
    SessionCoordinator::new(config, transcriber, evaluator)
}
