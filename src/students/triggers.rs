//! Trigger evaluation for simulated student messages

use once_cell::sync::Lazy;
use rand::Rng;
use regex::Regex;
use std::time::Duration;

static INTERROGATIVE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(what|why|how|when|where|who|which|can|could|does|do|is|are)\b")
        .expect("Invalid regex")
});

/// What the simulator should do after the latest utterance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerDecision {
    /// A student asks the presenter a question
    Ask,
    /// A student answers or reacts to the presenter's question
    Respond,
    Silent,
}

/// Inputs to one trigger evaluation
#[derive(Debug, Clone, Copy)]
pub struct TriggerContext<'a> {
    pub transcript_so_far: &'a str,
    pub latest_utterance: &'a str,
    pub message_count: usize,
    pub max_messages: usize,
    pub since_last_message: Duration,
    pub interval: Duration,
}

/// Whether the presenter's utterance is a question to the class
pub fn is_question(text: &str) -> bool {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return false;
    }
    trimmed.ends_with('?') || INTERROGATIVE_RE.is_match(trimmed)
}

/// Whether enough time has passed for an unprompted question
pub fn random_interval_elapsed(since_last: Duration, interval: Duration) -> bool {
    since_last >= interval
}

/// Draw the wait before the next unprompted question, uniformly from [min, max] seconds
pub fn draw_interval<R: Rng + ?Sized>(rng: &mut R, min_secs: u64, max_secs: u64) -> Duration {
    let (lo, hi) = if min_secs <= max_secs {
        (min_secs, max_secs)
    } else {
        (max_secs, min_secs)
    };
    Duration::from_secs(rng.gen_range(lo..=hi))
}

pub fn evaluate_trigger(ctx: &TriggerContext<'_>) -> TriggerDecision {
    if ctx.message_count >= ctx.max_messages {
        return TriggerDecision::Silent;
    }
    if is_question(ctx.latest_utterance) {
        return TriggerDecision::Respond;
    }
    if !ctx.transcript_so_far.trim().is_empty()
        && random_interval_elapsed(ctx.since_last_message, ctx.interval)
    {
        return TriggerDecision::Ask;
    }
    TriggerDecision::Silent
}
