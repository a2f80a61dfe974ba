//! Per-session history, written only by the collector task

use chrono::Utc;
use log::{info, warn};
use rand::Rng;
use tokio::time::Instant;

use super::types::Observation;
use crate::analysis::{live_engagement, Emotion, EmotionFrame, SessionData, VoiceQualitySample};
use crate::config::StudentConfig;
use crate::students::{StudentMessage, StudentSimulator};
use crate::transcription::{join_segments, TranscriptSegment};

#[derive(Debug)]
pub struct SessionBuffers {
    pub topic: String,
    pub started_at: Instant,
    pub emotions: Vec<EmotionFrame>,
    pub voice_qualities: Vec<VoiceQualitySample>,
    /// Ordered by sequence id; chunks may finish transcribing out of order
    pub segments: Vec<TranscriptSegment>,
    pub device_error: Option<String>,
    students: StudentSimulator,
}

impl SessionBuffers {
    pub fn new<R: Rng + ?Sized>(topic: impl Into<String>, student_config: StudentConfig, rng: &mut R) -> Self {
        Self {
            topic: topic.into(),
            started_at: Instant::now(),
            emotions: Vec::new(),
            voice_qualities: Vec::new(),
            segments: Vec::new(),
            device_error: None,
            students: StudentSimulator::new(student_config, rng),
        }
    }

    /// Append one observation; returns a student message if the transcript triggered one
    pub fn apply<R: Rng + ?Sized>(&mut self, observation: Observation, rng: &mut R) -> Option<StudentMessage> {
        match observation {
            Observation::Emotion(frame) => {
                crate::perf_debug!("Live engagement: {:.2}", live_engagement(&frame));
                self.emotions.push(frame);
                None
            }
            Observation::Voice(sample) => {
                crate::perf_debug!("Voice clarity: {:.2} ({})", sample.clarity, sample.label);
                self.voice_qualities.push(sample);
                None
            }
            Observation::Transcript { sequence_id, text } => self.push_transcript(sequence_id, text, rng),
            Observation::DeviceError(message) => {
                warn!("Capture device error: {}", message);
                self.device_error = Some(message);
                None
            }
        }
    }

    fn push_transcript<R: Rng + ?Sized>(&mut self, sequence_id: u64, text: String, rng: &mut R) -> Option<StudentMessage> {
        let elapsed = self.started_at.elapsed();
        let segment = TranscriptSegment {
            sequence_id,
            text,
            session_time: elapsed.as_secs_f64(),
            received_at: Utc::now(),
        };
        info!("Transcript segment {}", segment.display());

        let position = self
            .segments
            .partition_point(|s| s.sequence_id < sequence_id);
        let latest = segment.text.clone();
        self.segments.insert(position, segment);

        let transcript = self.transcript();
        self.students.observe(&transcript, &latest, elapsed, rng)
    }

    pub fn transcript(&self) -> String {
        join_segments(&self.segments)
    }

    pub fn student_messages(&self) -> &[StudentMessage] {
        self.students.messages()
    }

    pub fn latest_engagement(&self) -> Option<f32> {
        self.emotions.last().map(live_engagement)
    }

    pub fn latest_expression(&self) -> Option<Emotion> {
        self.emotions.last().and_then(EmotionFrame::dominant)
    }

    pub fn snapshot(&self, duration_secs: f64) -> SessionData {
        SessionData {
            transcript: self.transcript(),
            emotions: self.emotions.clone(),
            voice_qualities: self.voice_qualities.clone(),
            topic: self.topic.clone(),
            duration: duration_secs,
        }
    }
}
