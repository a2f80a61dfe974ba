// Face engagement scoring
//
// Two formulas exist on purpose: the live one drives the on-screen meter,
// the per-frame summary one feeds the session average. They weight the
// expressions differently and must not be merged.

use serde::{Deserialize, Serialize};

use super::types::{clamp01, EmotionFrame};

/// Engagement for the live meter
pub fn live_engagement(frame: &EmotionFrame) -> f32 {
    let positive = frame.happy * 0.8 + frame.neutral * 0.6 + frame.surprised * 0.4;
    let negative =
        frame.sad * 0.3 + frame.angry * 0.4 + frame.disgusted * 0.5 + frame.fearful * 0.3;
    clamp01(positive - negative)
}

/// Engagement of one historical frame, as used by the session summary
pub fn frame_engagement(frame: &EmotionFrame) -> f32 {
    let positive = (frame.happy + frame.surprised * 0.5) * 0.8 + frame.neutral * 0.4;
    let negative = (frame.sad + frame.angry + frame.disgusted + frame.fearful) * 0.3;
    clamp01(positive - negative)
}

/// Mean summary engagement over frames that carry any signal; 0.5 if none do
pub fn session_engagement(frames: &[EmotionFrame]) -> f32 {
    let scores: Vec<f32> = frames
        .iter()
        .filter(|f| f.has_signal())
        .map(frame_engagement)
        .collect();

    if scores.is_empty() {
        return 0.5;
    }

    clamp01(scores.iter().sum::<f32>() / scores.len() as f32)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EngagementLevel {
    High,
    Moderate,
    Low,
}

pub fn engagement_label(score: f32) -> EngagementLevel {
    if score > 0.7 {
        EngagementLevel::High
    } else if score > 0.4 {
        EngagementLevel::Moderate
    } else {
        EngagementLevel::Low
    }
}
