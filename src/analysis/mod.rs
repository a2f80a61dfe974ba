// src/analysis/mod.rs
//
// Scoring pipeline: per-chunk and per-frame readings during a session,
// combined into one evaluation report at the end.

pub mod types;
pub mod voice_quality;
pub mod engagement;
pub mod interaction;
pub mod content;
pub mod scoring;

pub use types::{
    clamp01, ContentAnalysis, Emotion, EmotionFrame, EvaluationMetrics, QualityLabel,
    SessionData, VoiceQualitySample,
};
pub use voice_quality::{analyze_audio, analyze_samples, calculate_voice_clarity};
pub use engagement::{engagement_label, frame_engagement, live_engagement, session_engagement, EngagementLevel};
pub use interaction::{calculate_interaction_score, complexity_score, wpm_score};
pub use content::{analyze_locally, ContentQualityEvaluator};
pub use scoring::{evaluate_session, overall_score};
