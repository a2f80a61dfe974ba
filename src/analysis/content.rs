//! Content quality evaluation
//!
//! With a generative-text provider configured the transcript is rated remotely;
//! any transport or parse failure drops to the local keyword heuristic. The
//! remote call is made once and never retried.

use log::{info, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use std::sync::Arc;

use super::interaction::word_count;
use super::types::{clamp01, ContentAnalysis};
use crate::llm_engine::{CompletionRequest, LlmError, LlmProvider};

static SENTENCE_SPLIT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[.!?]+").expect("Invalid regex"));

static KEYWORD_SPLIT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^a-z0-9]+").expect("Invalid regex"));

static EXAMPLE_MARKER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(for example|for instance|such as)\b").expect("Invalid regex")
});

/// Educational-language patterns, each worth a bonus at most once
static EDUCATIONAL_PATTERNS: Lazy<[Regex; 4]> = Lazy::new(|| {
    [
        EXAMPLE_MARKER_RE.clone(),
        Regex::new(r"(?i)\b(because|therefore|this means)\b").expect("Invalid regex"),
        Regex::new(r"(?i)\b(in summary|to summarize|in conclusion)\b").expect("Invalid regex"),
        Regex::new(r"(?i)(\bwhat do you think\b|\bany questions\b|\blet's\b)").expect("Invalid regex"),
    ]
});

/// First `{ ... }` object in a model reply, tolerating ```json fences and chatter
static JSON_OBJECT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)\{.*\}").expect("Invalid regex"));

const BASE_SCORE: f32 = 0.5;
const SHORT_TRANSCRIPT_WORDS: usize = 50;
const LONG_TRANSCRIPT_WORDS: usize = 500;
const ELABORATE_WORDS: usize = 100;
const RELEVANCE_WEIGHT: f32 = 0.3;
const STRUCTURE_BONUS: f32 = 0.1;
const PATTERN_BONUS: f32 = 0.05;
const EMPTY_TRANSCRIPT_SCORE: f32 = 0.2;

pub const NO_SPEECH_FEEDBACK: &str =
    "No speech detected. Make sure your microphone is working and speak clearly.";
pub const NO_SPEECH_SUGGESTIONS: [&str; 2] = [
    "Check that your microphone is connected and enabled",
    "Speak clearly and at a steady volume throughout the session",
];

const FEEDBACK_EXCELLENT: &str =
    "Excellent content! Your explanation was clear, relevant and well structured.";
const FEEDBACK_GOOD: &str =
    "Good content. Your explanation covered the topic with a reasonable structure.";
const FEEDBACK_FAIR: &str =
    "Fair content. Try to stay closer to the topic and organize your points more clearly.";
const FEEDBACK_POOR: &str =
    "The content needs improvement. Focus on the topic and build your explanation step by step.";

const SUGGEST_RELEVANCE: &str = "Connect your explanation more directly to the lesson topic";
const SUGGEST_ELABORATE: &str = "Elaborate more on key concepts to give students a fuller picture";
const SUGGEST_EXAMPLES: &str = "Use concrete examples to illustrate abstract ideas";
const SUGGEST_KEEP_GOING: &str = "Keep up the good work and keep engaging your students";

#[derive(Debug, Deserialize)]
struct RemoteVerdict {
    score: f64,
    #[serde(default)]
    feedback: String,
    #[serde(default)]
    suggestions: Vec<String>,
}

/// Scores spoken content, remotely when a provider is available
#[derive(Clone, Default)]
pub struct ContentQualityEvaluator {
    provider: Option<Arc<dyn LlmProvider>>,
}

impl ContentQualityEvaluator {
    pub fn new(provider: Option<Arc<dyn LlmProvider>>) -> Self {
        Self { provider }
    }

    pub fn local_only() -> Self {
        Self { provider: None }
    }

    pub fn is_remote(&self) -> bool {
        self.provider.is_some()
    }

    pub async fn analyze(&self, transcript: &str, topic: &str, duration_secs: f64) -> ContentAnalysis {
        if let Some(provider) = &self.provider {
            match analyze_remotely(provider.as_ref(), transcript, topic, duration_secs).await {
                Ok(analysis) => {
                    info!(
                        "Content scored by {}: {:.2}",
                        provider.provider_name(),
                        analysis.score
                    );
                    return analysis;
                }
                Err(e) => {
                    warn!("Remote content analysis failed, using local scoring: {}", e);
                }
            }
        }

        analyze_locally(transcript, topic)
    }
}

pub fn build_prompt(transcript: &str, topic: &str, duration_secs: f64) -> String {
    format!(
        "You are an experienced teacher trainer reviewing a practice lesson.\n\
         Topic: {topic}\n\
         Duration: {minutes:.1} minutes\n\
         Transcript:\n\"\"\"\n{transcript}\n\"\"\"\n\n\
         Rate the clarity, topical relevance and structure of the explanation.\n\
         Respond with only a JSON object of the form\n\
         {{\"score\": <number between 0 and 1>, \"feedback\": \"<one paragraph>\", \
         \"suggestions\": [\"<suggestion>\", ...]}}",
        topic = topic,
        minutes = duration_secs / 60.0,
        transcript = transcript,
    )
}

async fn analyze_remotely(
    provider: &dyn LlmProvider,
    transcript: &str,
    topic: &str,
    duration_secs: f64,
) -> Result<ContentAnalysis, LlmError> {
    let request =
        CompletionRequest::new(build_prompt(transcript, topic, duration_secs)).with_temperature(0.2);
    let response = provider.complete(request).await?;
    parse_remote_verdict(&response.content)
}

/// Parse the model reply into a content analysis; score is clamped to [0, 1]
pub fn parse_remote_verdict(reply: &str) -> Result<ContentAnalysis, LlmError> {
    let json = JSON_OBJECT_RE
        .find(reply)
        .ok_or_else(|| LlmError::InvalidResponse("reply contains no JSON object".to_string()))?;

    let verdict: RemoteVerdict = serde_json::from_str(json.as_str())
        .map_err(|e| LlmError::InvalidResponse(format!("malformed verdict: {}", e)))?;

    if !verdict.score.is_finite() {
        return Err(LlmError::InvalidResponse("score is not a number".to_string()));
    }

    Ok(ContentAnalysis {
        score: clamp01(verdict.score as f32),
        feedback: verdict.feedback,
        suggestions: verdict.suggestions,
    })
}

/// Topic words of three or more characters, lowercase, deduplicated in order
pub fn topic_keywords(topic: &str) -> Vec<String> {
    let lowered = topic.to_lowercase();
    let mut keywords: Vec<String> = Vec::new();
    for word in KEYWORD_SPLIT_RE.split(&lowered) {
        if word.len() >= 3 && !keywords.iter().any(|k| k == word) {
            keywords.push(word.to_string());
        }
    }
    keywords
}

/// Fraction of topic keywords present in the transcript.
///
/// A keyword matches on the whole word or its singular stem, so "cats" finds "cat".
pub fn keyword_relevance(transcript: &str, topic: &str) -> f32 {
    let keywords = topic_keywords(topic);
    if keywords.is_empty() {
        return 0.0;
    }

    let lowered = transcript.to_lowercase();
    let matches = keywords
        .iter()
        .filter(|keyword| {
            if lowered.contains(keyword.as_str()) {
                return true;
            }
            match keyword.strip_suffix('s') {
                Some(stem) if keyword.len() > 3 => lowered.contains(stem),
                _ => false,
            }
        })
        .count();

    matches as f32 / keywords.len() as f32
}

/// Segments produced by splitting on sentence terminators, trailing fragment included
pub fn sentence_count(transcript: &str) -> usize {
    SENTENCE_SPLIT_RE.split(transcript).count()
}

pub fn educational_pattern_bonus(transcript: &str) -> f32 {
    EDUCATIONAL_PATTERNS
        .iter()
        .filter(|re| re.is_match(transcript))
        .count() as f32
        * PATTERN_BONUS
}

pub fn feedback_for_score(score: f32) -> &'static str {
    if score >= 0.8 {
        FEEDBACK_EXCELLENT
    } else if score >= 0.6 {
        FEEDBACK_GOOD
    } else if score >= 0.4 {
        FEEDBACK_FAIR
    } else {
        FEEDBACK_POOR
    }
}

/// Keyword and structure heuristic used without a provider or after a remote failure
pub fn analyze_locally(transcript: &str, topic: &str) -> ContentAnalysis {
    if transcript.trim().is_empty() {
        return ContentAnalysis {
            score: EMPTY_TRANSCRIPT_SCORE,
            feedback: NO_SPEECH_FEEDBACK.to_string(),
            suggestions: NO_SPEECH_SUGGESTIONS.iter().map(|s| s.to_string()).collect(),
        };
    }

    let words = word_count(transcript);
    let mut score = BASE_SCORE;

    if words < SHORT_TRANSCRIPT_WORDS {
        score -= 0.2;
    } else if words > LONG_TRANSCRIPT_WORDS {
        score += 0.1;
    }

    let relevance = keyword_relevance(transcript, topic);
    score += relevance * RELEVANCE_WEIGHT;

    if sentence_count(transcript) > 3 {
        score += STRUCTURE_BONUS;
    }

    score += educational_pattern_bonus(transcript);
    let score = clamp01(score);

    let mut suggestions = Vec::new();
    if relevance < 0.5 {
        suggestions.push(SUGGEST_RELEVANCE.to_string());
    }
    if words < ELABORATE_WORDS {
        suggestions.push(SUGGEST_ELABORATE.to_string());
    }
    if !EXAMPLE_MARKER_RE.is_match(transcript) {
        suggestions.push(SUGGEST_EXAMPLES.to_string());
    }
    if suggestions.is_empty() {
        suggestions.push(SUGGEST_KEEP_GOING.to_string());
    }

    ContentAnalysis {
        score,
        feedback: feedback_for_score(score).to_string(),
        suggestions,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_engine::CompletionResponse;
    use async_trait::async_trait;

    struct FailingProvider;

    #[async_trait]
    impl LlmProvider for FailingProvider {
        fn provider_name(&self) -> &'static str {
            "failing"
        }

        async fn complete(&self, _request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
            Err(LlmError::RequestFailed("network unreachable".to_string()))
        }
    }

    struct CannedProvider(&'static str);

    #[async_trait]
    impl LlmProvider for CannedProvider {
        fn provider_name(&self) -> &'static str {
            "canned"
        }

        async fn complete(&self, _request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
            Ok(CompletionResponse {
                content: self.0.to_string(),
                model: "canned".to_string(),
                finish_reason: None,
            })
        }
    }

    const CAT_TRANSCRIPT: &str = "The cat sat. The cat ran. Because it was happy.";

    #[test]
    fn test_empty_transcript_short_circuits() {
        let analysis = analyze_locally("  ", "fractions");
        assert_eq!(analysis.score, 0.2);
        assert_eq!(analysis.feedback, NO_SPEECH_FEEDBACK);
        assert_eq!(
            analysis.suggestions,
            vec![
                "Check that your microphone is connected and enabled".to_string(),
                "Speak clearly and at a steady volume throughout the session".to_string(),
            ]
        );
    }

    #[test]
    fn test_plural_topic_matches_singular_transcript() {
        assert_eq!(topic_keywords("cats"), vec!["cats".to_string()]);
        assert_eq!(keyword_relevance(CAT_TRANSCRIPT, "cats"), 1.0);
        assert_eq!(keyword_relevance(CAT_TRANSCRIPT, "dogs"), 0.0);
        assert_eq!(keyword_relevance(CAT_TRANSCRIPT, "a"), 0.0);
    }

    #[test]
    fn test_three_terminated_sentences_trigger_structure_bonus() {
        assert_eq!(sentence_count(CAT_TRANSCRIPT), 4);
        assert_eq!(sentence_count("no terminator at all"), 1);
    }

    #[test]
    fn test_local_score_for_cat_transcript() {
        let analysis = analyze_locally(CAT_TRANSCRIPT, "cats");
        // 0.5 - 0.2 (short) + 0.3 (relevance) + 0.1 (structure) + 0.05 ("because")
        assert!((analysis.score - 0.75).abs() < 1e-5);
        assert_eq!(analysis.feedback, FEEDBACK_GOOD);
        assert_eq!(
            analysis.suggestions,
            vec![SUGGEST_ELABORATE.to_string(), SUGGEST_EXAMPLES.to_string()]
        );
    }

    #[test]
    fn test_patterns_count_once_each() {
        let once = educational_pattern_bonus("for example this");
        let repeated = educational_pattern_bonus("for example, for example, for instance");
        assert!((once - 0.05).abs() < 1e-6);
        assert!((repeated - 0.05).abs() < 1e-6);

        let all = educational_pattern_bonus(
            "For example this. Because of that. In summary it works. Any questions?",
        );
        assert!((all - 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_feedback_buckets() {
        assert_eq!(feedback_for_score(0.8), FEEDBACK_EXCELLENT);
        assert_eq!(feedback_for_score(0.6), FEEDBACK_GOOD);
        assert_eq!(feedback_for_score(0.4), FEEDBACK_FAIR);
        assert_eq!(feedback_for_score(0.39), FEEDBACK_POOR);
    }

    #[test]
    fn test_parse_remote_verdict_fenced_and_clamped() {
        let reply = "```json\n{\"score\": 1.4, \"feedback\": \"Great\", \"suggestions\": [\"More examples\"]}\n```";
        let analysis = parse_remote_verdict(reply).unwrap();
        assert_eq!(analysis.score, 1.0);
        assert_eq!(analysis.feedback, "Great");
        assert_eq!(analysis.suggestions, vec!["More examples".to_string()]);

        assert!(parse_remote_verdict("I cannot rate this").is_err());
        assert!(parse_remote_verdict("{\"feedback\": \"no score\"}").is_err());
    }

    #[test]
    fn test_prompt_embeds_session_details() {
        let prompt = build_prompt("Photosynthesis uses light.", "plants", 90.0);
        assert!(prompt.contains("Topic: plants"));
        assert!(prompt.contains("Duration: 1.5 minutes"));
        assert!(prompt.contains("Photosynthesis uses light."));
        assert!(prompt.contains("\"score\""));
    }

    #[tokio::test]
    async fn test_remote_failure_falls_back_to_local() {
        let evaluator = ContentQualityEvaluator::new(Some(Arc::new(FailingProvider)));
        assert!(evaluator.is_remote());
        let analysis = evaluator.analyze(CAT_TRANSCRIPT, "cats", 30.0).await;
        assert_eq!(analysis, analyze_locally(CAT_TRANSCRIPT, "cats"));
    }

    #[tokio::test]
    async fn test_malformed_remote_reply_falls_back_to_local() {
        let evaluator = ContentQualityEvaluator::new(Some(Arc::new(CannedProvider("not json"))));
        let analysis = evaluator.analyze(CAT_TRANSCRIPT, "cats", 30.0).await;
        assert_eq!(analysis, analyze_locally(CAT_TRANSCRIPT, "cats"));
    }

    #[tokio::test]
    async fn test_remote_verdict_used_when_valid() {
        let evaluator = ContentQualityEvaluator::new(Some(Arc::new(CannedProvider(
            r#"{"score": 0.66, "feedback": "Solid", "suggestions": []}"#,
        ))));
        let analysis = evaluator.analyze(CAT_TRANSCRIPT, "cats", 30.0).await;
        assert!((analysis.score - 0.66).abs() < 1e-6);
        assert_eq!(analysis.feedback, "Solid");
    }
}
