// analysis/types.rs
//
// Measurement and report types shared by the scorers.

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Clamp a score into [0, 1]. NaN collapses to 0.
pub fn clamp01(value: f32) -> f32 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, 1.0)
}

/// Facial expressions reported by the expression detector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Emotion {
    Neutral,
    Happy,
    Sad,
    Angry,
    Fearful,
    Disgusted,
    Surprised,
}

impl Emotion {
    pub const ALL: [Emotion; 7] = [
        Emotion::Neutral,
        Emotion::Happy,
        Emotion::Sad,
        Emotion::Angry,
        Emotion::Fearful,
        Emotion::Disgusted,
        Emotion::Surprised,
    ];
}

/// Expression probabilities for one detection tick.
///
/// Labels the detector did not report read as 0.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmotionFrame {
    pub neutral: f32,
    pub happy: f32,
    pub sad: f32,
    pub angry: f32,
    pub fearful: f32,
    pub disgusted: f32,
    pub surprised: f32,
}

impl EmotionFrame {
    /// Build a frame from (label, probability) pairs; later pairs overwrite earlier ones
    pub fn from_pairs(pairs: impl IntoIterator<Item = (Emotion, f32)>) -> Self {
        let mut frame = Self::default();
        for (emotion, probability) in pairs {
            *frame.slot_mut(emotion) = probability;
        }
        frame
    }

    pub fn get(&self, emotion: Emotion) -> f32 {
        match emotion {
            Emotion::Neutral => self.neutral,
            Emotion::Happy => self.happy,
            Emotion::Sad => self.sad,
            Emotion::Angry => self.angry,
            Emotion::Fearful => self.fearful,
            Emotion::Disgusted => self.disgusted,
            Emotion::Surprised => self.surprised,
        }
    }

    fn slot_mut(&mut self, emotion: Emotion) -> &mut f32 {
        match emotion {
            Emotion::Neutral => &mut self.neutral,
            Emotion::Happy => &mut self.happy,
            Emotion::Sad => &mut self.sad,
            Emotion::Angry => &mut self.angry,
            Emotion::Fearful => &mut self.fearful,
            Emotion::Disgusted => &mut self.disgusted,
            Emotion::Surprised => &mut self.surprised,
        }
    }

    /// True when at least one expression has a non-zero probability
    pub fn has_signal(&self) -> bool {
        Emotion::ALL.iter().any(|&e| self.get(e) != 0.0)
    }

    /// The most probable expression, if any has signal
    pub fn dominant(&self) -> Option<Emotion> {
        if !self.has_signal() {
            return None;
        }
        Emotion::ALL
            .iter()
            .copied()
            .max_by(|a, b| self.get(*a).total_cmp(&self.get(*b)))
    }

    fn is_well_formed(&self) -> bool {
        Emotion::ALL.iter().all(|&e| self.get(e).is_finite())
    }
}

/// Clarity bucket attached to each voice sample
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QualityLabel {
    Excellent,
    Good,
    Fair,
    Poor,
    #[serde(rename = "Very Poor")]
    VeryPoor,
    Error,
}

impl QualityLabel {
    pub fn from_clarity(clarity: f32) -> Self {
        if clarity > 0.8 {
            QualityLabel::Excellent
        } else if clarity > 0.6 {
            QualityLabel::Good
        } else if clarity > 0.4 {
            QualityLabel::Fair
        } else if clarity > 0.2 {
            QualityLabel::Poor
        } else {
            QualityLabel::VeryPoor
        }
    }
}

impl fmt::Display for QualityLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            QualityLabel::Excellent => "Excellent",
            QualityLabel::Good => "Good",
            QualityLabel::Fair => "Fair",
            QualityLabel::Poor => "Poor",
            QualityLabel::VeryPoor => "Very Poor",
            QualityLabel::Error => "Error",
        };
        write!(f, "{}", label)
    }
}

/// Voice quality reading for one audio chunk
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VoiceQualitySample {
    pub clarity: f32,
    pub label: QualityLabel,
    pub volume: f32,
    pub confidence: f32,
}

impl VoiceQualitySample {
    /// Sentinel produced when a chunk cannot be decoded
    pub fn error() -> Self {
        Self {
            clarity: 0.0,
            label: QualityLabel::Error,
            volume: 0.0,
            confidence: 0.0,
        }
    }

    pub fn is_error(&self) -> bool {
        self.label == QualityLabel::Error
    }
}

/// Everything the evaluator needs from one finished session
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SessionData {
    pub transcript: String,
    pub emotions: Vec<EmotionFrame>,
    pub voice_qualities: Vec<VoiceQualitySample>,
    pub topic: String,
    /// Elapsed session time in seconds
    pub duration: f64,
}

impl SessionData {
    /// Reject measurements no scorer can make sense of
    pub fn validate(&self) -> Result<()> {
        if !self.duration.is_finite() || self.duration < 0.0 {
            bail!("invalid session duration: {}", self.duration);
        }
        if let Some(idx) = self.emotions.iter().position(|f| !f.is_well_formed()) {
            bail!("emotion frame {} contains a non-finite probability", idx);
        }
        if let Some(idx) = self
            .voice_qualities
            .iter()
            .position(|v| !v.clarity.is_finite())
        {
            bail!("voice sample {} has a non-finite clarity", idx);
        }
        Ok(())
    }
}

/// Result of scoring the spoken content
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentAnalysis {
    pub score: f32,
    pub feedback: String,
    #[serde(default)]
    pub suggestions: Vec<String>,
}

/// Final evaluation report for one session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationMetrics {
    pub face_engagement: f32,
    pub voice_clarity: f32,
    pub content_quality: f32,
    pub interaction_score: f32,
    pub overall_score: f32,
    pub feedback: String,
    pub suggestions: Vec<String>,
}

impl EvaluationMetrics {
    /// Default report used when the evaluation pipeline fails as a whole
    pub fn fallback() -> Self {
        Self {
            face_engagement: 0.5,
            voice_clarity: 0.5,
            content_quality: 0.5,
            interaction_score: 0.5,
            overall_score: 0.5,
            feedback: "Unable to complete the full evaluation. Showing default scores.".to_string(),
            suggestions: vec![
                "Try recording a longer session".to_string(),
                "Check your camera and microphone setup".to_string(),
            ],
        }
    }
}
