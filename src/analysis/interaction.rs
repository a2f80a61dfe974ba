// Interaction scoring: speaking pace plus how much the presenter asks,
// explains, sequences and illustrates.

use once_cell::sync::Lazy;
use regex::Regex;

use super::types::clamp01;

static EXPLANATORY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(because|therefore|thus|hence|since|so that|as a result|this means)\b")
        .expect("Invalid regex")
});

static SEQUENCE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(first|second|third|next|then|finally|lastly)\b").expect("Invalid regex")
});

static EXAMPLE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(\bfor example\b|\bfor instance\b|\bsuch as\b|\be\.g\.|\bimagine\b)")
        .expect("Invalid regex")
});

const PACE_WEIGHT: f32 = 0.6;
const COMPLEXITY_WEIGHT: f32 = 0.4;

pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

pub fn words_per_minute(transcript: &str, duration_secs: f64) -> f64 {
    if duration_secs <= 0.0 || !duration_secs.is_finite() {
        return 0.0;
    }
    word_count(transcript) as f64 / duration_secs * 60.0
}

/// Pace score; bands are inclusive and the narrowest matching band wins
pub fn wpm_score(wpm: f64) -> f32 {
    if (120.0..=180.0).contains(&wpm) {
        1.0
    } else if (100.0..=200.0).contains(&wpm) {
        0.8
    } else if (80.0..=220.0).contains(&wpm) {
        0.6
    } else {
        0.4
    }
}

pub fn complexity_score(transcript: &str) -> f32 {
    let questions = transcript.matches('?').count();
    let explanatory = EXPLANATORY_RE.find_iter(transcript).count();
    let sequence = SEQUENCE_RE.find_iter(transcript).count();
    let examples = EXAMPLE_RE.find_iter(transcript).count();

    let total = questions + explanatory + sequence + examples;
    (total as f32 / 10.0).min(1.0)
}

pub fn calculate_interaction_score(transcript: &str, duration_secs: f64) -> f32 {
    if transcript.trim().is_empty() || duration_secs <= 0.0 || !duration_secs.is_finite() {
        return 0.0;
    }

    let wpm = words_per_minute(transcript, duration_secs);
    clamp01(wpm_score(wpm) * PACE_WEIGHT + complexity_score(transcript) * COMPLEXITY_WEIGHT)
}
