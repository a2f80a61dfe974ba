// Session score combination
//
// Runs every scorer over a finished session and blends the results. Any error
// in the pipeline yields the fixed fallback report; partial results are dropped.

use anyhow::Result;
use log::{error, info};

use super::content::ContentQualityEvaluator;
use super::engagement::session_engagement;
use super::interaction::calculate_interaction_score;
use super::types::{EvaluationMetrics, SessionData};
use super::voice_quality::calculate_voice_clarity;

pub const FACE_WEIGHT: f32 = 0.2;
pub const VOICE_WEIGHT: f32 = 0.25;
pub const CONTENT_WEIGHT: f32 = 0.35;
pub const INTERACTION_WEIGHT: f32 = 0.2;

const WEAK_COMPONENT: f32 = 0.4;
const SUGGEST_FACE: &str = "Look at the camera and use expressive, positive body language";
const SUGGEST_VOICE: &str = "Speak louder and more steadily, and reduce long pauses";
const SUGGEST_INTERACTION: &str =
    "Ask your students more questions and signpost each step of the explanation";

/// Weighted overall score; weights sum to 1
pub fn overall_score(face: f32, voice: f32, content: f32, interaction: f32) -> f32 {
    face * FACE_WEIGHT + voice * VOICE_WEIGHT + content * CONTENT_WEIGHT + interaction * INTERACTION_WEIGHT
}

/// Evaluate a finished session; never fails
pub async fn evaluate_session(
    data: &SessionData,
    evaluator: &ContentQualityEvaluator,
) -> EvaluationMetrics {
    match try_evaluate_session(data, evaluator).await {
        Ok(metrics) => {
            info!(
                "Session evaluated: overall {:.2} (face {:.2}, voice {:.2}, content {:.2}, interaction {:.2})",
                metrics.overall_score,
                metrics.face_engagement,
                metrics.voice_clarity,
                metrics.content_quality,
                metrics.interaction_score
            );
            metrics
        }
        Err(e) => {
            error!("Session evaluation failed, returning default metrics: {:#}", e);
            EvaluationMetrics::fallback()
        }
    }
}

async fn try_evaluate_session(
    data: &SessionData,
    evaluator: &ContentQualityEvaluator,
) -> Result<EvaluationMetrics> {
    data.validate()?;

    let face_engagement = session_engagement(&data.emotions);
    let voice_clarity = calculate_voice_clarity(&data.voice_qualities);
    let interaction_score = calculate_interaction_score(&data.transcript, data.duration);
    let content = evaluator
        .analyze(&data.transcript, &data.topic, data.duration)
        .await;

    let mut suggestions = content.suggestions;
    for (score, suggestion) in [
        (face_engagement, SUGGEST_FACE),
        (voice_clarity, SUGGEST_VOICE),
        (interaction_score, SUGGEST_INTERACTION),
    ] {
        if score < WEAK_COMPONENT && !suggestions.iter().any(|s| s == suggestion) {
            suggestions.push(suggestion.to_string());
        }
    }

    Ok(EvaluationMetrics {
        face_engagement,
        voice_clarity,
        content_quality: content.score,
        interaction_score,
        overall_score: overall_score(face_engagement, voice_clarity, content.score, interaction_score),
        feedback: content.feedback,
        suggestions,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::content::analyze_locally;
    use crate::analysis::types::{EmotionFrame, QualityLabel, VoiceQualitySample};
    use crate::llm_engine::{CompletionRequest, CompletionResponse, LlmError, LlmProvider};
    use async_trait::async_trait;
    use std::sync::Arc;

    struct OfflineProvider;

    #[async_trait]
    impl LlmProvider for OfflineProvider {
        fn provider_name(&self) -> &'static str {
            "offline"
        }

        async fn complete(&self, _request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
            Err(LlmError::RequestFailed("simulated network failure".to_string()))
        }
    }

    fn sample_session() -> SessionData {
        SessionData {
            transcript: "The cat sat. The cat ran. Because it was happy.".to_string(),
            emotions: vec![EmotionFrame {
                happy: 1.0,
                ..Default::default()
            }],
            voice_qualities: vec![VoiceQualitySample {
                clarity: 0.7,
                label: QualityLabel::Good,
                volume: 0.8,
                confidence: 0.7,
            }],
            topic: "cats".to_string(),
            duration: 30.0,
        }
    }

    #[test]
    fn test_weights_sum_to_one() {
        assert!((overall_score(1.0, 1.0, 1.0, 1.0) - 1.0).abs() < 1e-6);
        assert_eq!(overall_score(0.0, 0.0, 0.0, 0.0), 0.0);
    }

    #[tokio::test]
    async fn test_remote_failure_uses_local_content_not_default_metrics() {
        let data = sample_session();
        let evaluator = ContentQualityEvaluator::new(Some(Arc::new(OfflineProvider)));
        let metrics = evaluate_session(&data, &evaluator).await;

        let local = analyze_locally(&data.transcript, &data.topic);
        assert_ne!(metrics, EvaluationMetrics::fallback());
        assert_eq!(metrics.content_quality, local.score);
        assert_eq!(metrics.feedback, local.feedback);
    }

    #[tokio::test]
    async fn test_components_and_overall() {
        let data = sample_session();
        let metrics = evaluate_session(&data, &ContentQualityEvaluator::local_only()).await;

        assert!((metrics.face_engagement - 0.8).abs() < 1e-6);
        assert!((metrics.voice_clarity - 0.7).abs() < 1e-6);
        // 10 words in 30 seconds is 20 wpm: pace 0.4; one connective: complexity 0.1
        assert!((metrics.interaction_score - 0.28).abs() < 1e-5);
        let expected = overall_score(
            metrics.face_engagement,
            metrics.voice_clarity,
            metrics.content_quality,
            metrics.interaction_score,
        );
        assert_eq!(metrics.overall_score, expected);
        assert!(metrics
            .suggestions
            .contains(&SUGGEST_INTERACTION.to_string()));
        assert!(!metrics.suggestions.contains(&SUGGEST_FACE.to_string()));
    }

    #[tokio::test]
    async fn test_invalid_session_yields_fallback() {
        let mut data = sample_session();
        data.duration = f64::INFINITY;
        let metrics = evaluate_session(&data, &ContentQualityEvaluator::local_only()).await;
        assert_eq!(metrics, EvaluationMetrics::fallback());
    }

    #[tokio::test]
    async fn test_empty_session_scores_stay_in_range() {
        let metrics =
            evaluate_session(&SessionData::default(), &ContentQualityEvaluator::local_only()).await;
        assert_eq!(metrics.face_engagement, 0.5);
        assert_eq!(metrics.voice_clarity, 0.5);
        assert_eq!(metrics.interaction_score, 0.0);
        assert_eq!(metrics.content_quality, 0.2);
        assert!((0.0..=1.0).contains(&metrics.overall_score));
    }
}
