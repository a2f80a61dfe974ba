//! Student message generation

use chrono::{DateTime, Utc};
use log::info;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

use super::triggers::{draw_interval, evaluate_trigger, TriggerContext, TriggerDecision};
use crate::config::StudentConfig;

static STUDENTS: [&str; 5] = ["Alex", "Maya", "Sam", "Priya", "Jordan"];

static QUESTIONS: [&str; 8] = [
    "Could you explain that part again?",
    "Can you give us an example?",
    "How does this connect to what we covered last time?",
    "Why does that work?",
    "Is this going to be on the test?",
    "What would happen if we changed that?",
    "Could you slow down a little?",
    "Where is this used in real life?",
];

static REACTIONS: [&str; 8] = [
    "I think I know this one!",
    "Hmm, let me think about that.",
    "Is it because of what you said earlier?",
    "I'm not sure, could you give a hint?",
    "Oh, that makes sense now.",
    "Maybe it depends on the situation?",
    "I have an idea but I'm not confident.",
    "Can we work through it together?",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    Question,
    Reaction,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentMessage {
    pub id: Uuid,
    pub student: String,
    pub kind: MessageKind,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

/// Per-session student state; discarded with the session
#[derive(Debug)]
pub struct StudentSimulator {
    config: StudentConfig,
    messages: Vec<StudentMessage>,
    last_message_at: Duration,
    next_interval: Duration,
}

impl StudentSimulator {
    pub fn new<R: Rng + ?Sized>(config: StudentConfig, rng: &mut R) -> Self {
        let next_interval = draw_interval(rng, config.min_interval_secs, config.max_interval_secs);
        Self {
            config,
            messages: Vec::new(),
            last_message_at: Duration::ZERO,
            next_interval,
        }
    }

    pub fn messages(&self) -> &[StudentMessage] {
        &self.messages
    }

    pub fn message_count(&self) -> usize {
        self.messages.len()
    }

    /// Decide what happens after a new utterance at `elapsed` into the session
    pub fn decide(&self, transcript_so_far: &str, latest_utterance: &str, elapsed: Duration) -> TriggerDecision {
        evaluate_trigger(&TriggerContext {
            transcript_so_far,
            latest_utterance,
            message_count: self.messages.len(),
            max_messages: self.config.max_messages,
            since_last_message: elapsed.saturating_sub(self.last_message_at),
            interval: self.next_interval,
        })
    }

    /// Turn a decision into a message, recording it and drawing the next interval
    pub fn next_message<R: Rng + ?Sized>(
        &mut self,
        decision: TriggerDecision,
        elapsed: Duration,
        rng: &mut R,
    ) -> Option<StudentMessage> {
        let (kind, pool) = match decision {
            TriggerDecision::Ask => (MessageKind::Question, &QUESTIONS),
            TriggerDecision::Respond => (MessageKind::Reaction, &REACTIONS),
            TriggerDecision::Silent => return None,
        };

        let student = STUDENTS.choose(rng)?;
        let text = pool.choose(rng)?;

        let message = StudentMessage {
            id: Uuid::new_v4(),
            student: student.to_string(),
            kind,
            text: text.to_string(),
            timestamp: Utc::now(),
        };

        info!("Student {} ({:?}): {}", message.student, kind, message.text);

        self.messages.push(message.clone());
        self.last_message_at = elapsed;
        self.next_interval = draw_interval(rng, self.config.min_interval_secs, self.config.max_interval_secs);
        Some(message)
    }

    /// Decide and emit in one step
    pub fn observe<R: Rng + ?Sized>(
        &mut self,
        transcript_so_far: &str,
        latest_utterance: &str,
        elapsed: Duration,
        rng: &mut R,
    ) -> Option<StudentMessage> {
        let decision = self.decide(transcript_so_far, latest_utterance, elapsed);
        self.next_message(decision, elapsed, rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn simulator(max_messages: usize) -> (StudentSimulator, StdRng) {
        let mut rng = StdRng::seed_from_u64(42);
        let config = StudentConfig {
            min_interval_secs: 20,
            max_interval_secs: 20,
            max_messages,
        };
        (StudentSimulator::new(config, &mut rng), rng)
    }

    #[test]
    fn test_question_from_presenter_gets_reaction() {
        let (mut sim, mut rng) = simulator(10);
        let msg = sim
            .observe("Who knows the answer?", "Who knows the answer?", Duration::from_secs(3), &mut rng)
            .unwrap();
        assert_eq!(msg.kind, MessageKind::Reaction);
        assert!(REACTIONS.contains(&msg.text.as_str()));
        assert!(STUDENTS.contains(&msg.student.as_str()));
        assert_eq!(sim.message_count(), 1);
    }

    #[test]
    fn test_interval_measured_from_last_message() {
        let (mut sim, mut rng) = simulator(10);
        let said = "Plants need light.";
        assert!(sim.observe(said, said, Duration::from_secs(10), &mut rng).is_none());

        let first = sim.observe(said, said, Duration::from_secs(20), &mut rng).unwrap();
        assert_eq!(first.kind, MessageKind::Question);

        // next question is due 20s after the first one, not after session start
        assert!(sim.observe(said, said, Duration::from_secs(30), &mut rng).is_none());
        assert!(sim.observe(said, said, Duration::from_secs(40), &mut rng).is_some());
    }

    #[test]
    fn test_silent_decision_produces_nothing() {
        let (mut sim, mut rng) = simulator(10);
        assert!(sim
            .next_message(TriggerDecision::Silent, Duration::from_secs(1), &mut rng)
            .is_none());
        assert!(sim.messages().is_empty());
    }

    #[test]
    fn test_cap_on_messages() {
        let (mut sim, mut rng) = simulator(2);
        for second in 1..10 {
            sim.observe("Why?", "Why?", Duration::from_secs(second), &mut rng);
        }
        assert_eq!(sim.message_count(), 2);
    }
}
