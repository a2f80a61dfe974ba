//! Session lifecycle management - start/stop and evaluation

use log::{error, info};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use super::buffers::SessionBuffers;
use super::producers::{run_chunk_loop, run_face_loop};
use super::state::SessionFlags;
use super::types::{ChunkRecorder, ExpressionDetector, LiveReadings, Observation, SessionError};
use crate::analysis::{
    engagement_label, evaluate_session, ContentQualityEvaluator, EvaluationMetrics, SessionData,
    VoiceQualitySample,
};
use crate::config::AppConfig;
use crate::students::StudentMessage;
use crate::transcription::TranscriptionProvider;

struct ActiveSession {
    id: Uuid,
    buffers: Arc<RwLock<SessionBuffers>>,
    cancel: CancellationToken,
    producers: Vec<JoinHandle<()>>,
    collector: JoinHandle<()>,
}

/// Owns the current session and the tasks feeding it
pub struct SessionCoordinator {
    config: AppConfig,
    transcriber: Option<Arc<dyn TranscriptionProvider>>,
    evaluator: ContentQualityEvaluator,
    flags: Arc<SessionFlags>,
    active: Mutex<Option<ActiveSession>>,
    /// Buffers of the current (or most recently stopped) session, for live reads
    current: RwLock<Arc<RwLock<SessionBuffers>>>,
}

impl SessionCoordinator {
    pub fn new(
        config: AppConfig,
        transcriber: Option<Arc<dyn TranscriptionProvider>>,
        evaluator: ContentQualityEvaluator,
    ) -> Self {
        let mut rng = StdRng::from_entropy();
        let buffers = SessionBuffers::new(String::new(), config.students.clone(), &mut rng);
        Self {
            config,
            transcriber,
            evaluator,
            flags: Arc::new(SessionFlags::default()),
            active: Mutex::new(None),
            current: RwLock::new(Arc::new(RwLock::new(buffers))),
        }
    }

    /// Start a new session. Buffers from any previous session are discarded.
    pub async fn start(
        &self,
        topic: impl Into<String>,
        recorder: Arc<dyn ChunkRecorder>,
        detector: Arc<dyn ExpressionDetector>,
    ) -> Result<Uuid, SessionError> {
        let mut active = self.active.lock().await;
        if active.is_some() {
            return Err(SessionError::AlreadyActive);
        }

        let topic = topic.into();
        let id = Uuid::new_v4();
        info!("Starting session {} on topic '{}'", id, topic);

        let mut rng = StdRng::from_entropy();
        let buffers = Arc::new(RwLock::new(SessionBuffers::new(
            topic,
            self.config.students.clone(),
            &mut rng,
        )));
        *self.current.write().await = buffers.clone();

        let (sender, receiver) = mpsc::unbounded_channel::<Observation>();
        let cancel = CancellationToken::new();

        let collector = tokio::spawn(collect_observations(receiver, buffers.clone(), rng));

        let face = tokio::spawn(run_face_loop(
            detector,
            sender.clone(),
            self.config.session.clone(),
            cancel.clone(),
        ));
        let audio = tokio::spawn(run_chunk_loop(
            recorder,
            self.transcriber.clone(),
            sender,
            self.flags.clone(),
            self.config.session.clone(),
            cancel.clone(),
        ));

        self.flags.set_active(true);
        *active = Some(ActiveSession {
            id,
            buffers,
            cancel,
            producers: vec![face, audio],
            collector,
        });

        Ok(id)
    }

    /// Stop the producers, drain everything they sent, and snapshot the session.
    ///
    /// The lifecycle lock is held until the drain finishes, so a `start` issued
    /// meanwhile waits instead of racing the old session's late transcripts.
    pub async fn stop(&self) -> Result<SessionData, SessionError> {
        let mut active = self.active.lock().await;
        let session = active.take().ok_or(SessionError::NotActive)?;
        info!("Stopping session {}", session.id);

        // speaking time ends at the stop request, not when transcription catches up
        let duration = session.buffers.read().await.started_at.elapsed().as_secs_f64();
        session.cancel.cancel();
        for handle in session.producers {
            if let Err(e) = handle.await {
                error!("Session producer panicked: {:?}", e);
            }
        }
        // all senders are gone once the producers return
        if let Err(e) = session.collector.await {
            error!("Session collector panicked: {:?}", e);
        }

        self.flags.clear();

        let buffers = session.buffers.read().await;
        let data = buffers.snapshot(duration);
        info!(
            "Session {} stopped after {:.1}s: {} frames, {} voice samples, {} transcript segments",
            session.id,
            duration,
            data.emotions.len(),
            data.voice_qualities.len(),
            buffers.segments.len()
        );
        drop(buffers);
        drop(active);
        Ok(data)
    }

    pub async fn evaluate(&self, data: &SessionData) -> EvaluationMetrics {
        evaluate_session(data, &self.evaluator).await
    }

    /// Stop the current session and evaluate it
    pub async fn finish(&self) -> Result<EvaluationMetrics, SessionError> {
        let data = self.stop().await?;
        Ok(self.evaluate(&data).await)
    }

    pub fn is_active(&self) -> bool {
        self.flags.is_active()
    }

    pub fn is_recording(&self) -> bool {
        self.flags.is_recording()
    }

    pub async fn latest_engagement(&self) -> Option<f32> {
        let current = self.current_buffers().await;
        let value = current.read().await.latest_engagement();
        value
    }

    pub async fn latest_voice_quality(&self) -> Option<VoiceQualitySample> {
        let current = self.current_buffers().await;
        let value = current.read().await.voice_qualities.last().copied();
        value
    }

    pub async fn transcript(&self) -> String {
        let current = self.current_buffers().await;
        let value = current.read().await.transcript();
        value
    }

    pub async fn student_messages(&self) -> Vec<StudentMessage> {
        let current = self.current_buffers().await;
        let value = current.read().await.student_messages().to_vec();
        value
    }

    async fn current_buffers(&self) -> Arc<RwLock<SessionBuffers>> {
        self.current.read().await.clone()
    }

    pub async fn live_readings(&self) -> LiveReadings {
        let current = self.current_buffers().await;
        let buffers = current.read().await;
        let engagement = buffers.latest_engagement();
        LiveReadings {
            is_active: self.flags.is_active(),
            is_recording: self.flags.is_recording(),
            engagement,
            engagement_level: engagement.map(engagement_label),
            expression: buffers.latest_expression(),
            voice: buffers.voice_qualities.last().copied(),
            transcript: buffers.transcript(),
            student_messages: buffers.student_messages().len(),
            device_error: buffers.device_error.clone(),
        }
    }
}

/// Sole writer of the session buffers
async fn collect_observations(
    mut receiver: mpsc::UnboundedReceiver<Observation>,
    buffers: Arc<RwLock<SessionBuffers>>,
    mut rng: StdRng,
) {
    while let Some(observation) = receiver.recv().await {
        let mut guard = buffers.write().await;
        guard.apply(observation, &mut rng);
    }
}
