// session/producers.rs
//
// The two periodic producers of a session: face detection ticks and the audio
// chunk record/stop/restart cycle. Producers only hold a sender; they never
// touch the session buffers.

use log::{error, info, warn};
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinSet;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use super::state::SessionFlags;
use super::types::{ChunkRecorder, EncodedChunk, ExpressionDetector, Observation};
use crate::analysis::analyze_audio;
use crate::config::SessionConfig;
use crate::transcription::TranscriptionProvider;

/// Poll the expression detector at a fixed interval until cancelled
pub async fn run_face_loop(
    detector: Arc<dyn ExpressionDetector>,
    sender: UnboundedSender<Observation>,
    config: SessionConfig,
    cancel: CancellationToken,
) {
    info!("Face detection loop started ({} ms interval)", config.face_interval_ms);
    let mut ticker = tokio::time::interval(config.face_interval());
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {}
        }

        match detector.detect().await {
            Ok(Some(frame)) => {
                if sender.send(Observation::Emotion(frame)).is_err() {
                    break;
                }
            }
            Ok(None) => {}
            Err(e) => warn!("Face detection failed on this tick: {}", e),
        }
    }

    info!("Face detection loop stopped");
}

/// Record fixed-length chunks until cancelled.
///
/// Each cycle is start → wait → stop (awaited) → settle → next start, so two
/// recordings never overlap on the device. Transcription runs off the cycle
/// and is awaited before the loop returns.
pub async fn run_chunk_loop(
    recorder: Arc<dyn ChunkRecorder>,
    transcriber: Option<Arc<dyn TranscriptionProvider>>,
    sender: UnboundedSender<Observation>,
    flags: Arc<SessionFlags>,
    config: SessionConfig,
    cancel: CancellationToken,
) {
    info!(
        "Audio chunk loop started ({} s chunks, transcription {})",
        config.chunk_duration_secs,
        if transcriber.is_some() { "enabled" } else { "disabled" }
    );

    let mut in_flight = JoinSet::new();
    let mut sequence_id: u64 = 0;

    while !cancel.is_cancelled() {
        if let Err(e) = recorder.start().await {
            error!("Could not start audio capture: {}", e);
            let _ = sender.send(Observation::DeviceError(e.to_string()));
            break;
        }
        flags.set_recording(true);

        let cancelled = tokio::select! {
            _ = cancel.cancelled() => true,
            _ = tokio::time::sleep(config.chunk_duration()) => false,
        };

        let chunk = recorder.stop().await;
        flags.set_recording(false);

        let chunk = match chunk {
            Ok(chunk) => chunk,
            Err(e) => {
                error!("Could not stop audio capture: {}", e);
                let _ = sender.send(Observation::DeviceError(e.to_string()));
                break;
            }
        };

        if sender.send(Observation::Voice(analyze_audio(&chunk.data))).is_err() {
            break;
        }

        if let Some(provider) = &transcriber {
            in_flight.spawn(transcribe_chunk(
                provider.clone(),
                chunk,
                sequence_id,
                sender.clone(),
            ));
        }
        sequence_id += 1;

        if cancelled {
            break;
        }

        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = tokio::time::sleep(config.settle_delay()) => {}
        }
    }

    flags.set_recording(false);

    while let Some(result) = in_flight.join_next().await {
        if let Err(e) = result {
            error!("Transcription task panicked: {:?}", e);
        }
    }

    info!("Audio chunk loop stopped after {} chunks", sequence_id);
}

async fn transcribe_chunk(
    provider: Arc<dyn TranscriptionProvider>,
    chunk: EncodedChunk,
    sequence_id: u64,
    sender: UnboundedSender<Observation>,
) {
    match provider.transcribe(chunk.data, &chunk.file_name).await {
        Ok(text) if text.trim().is_empty() => {
            crate::perf_debug!("Chunk {} contained no speech", sequence_id);
        }
        Ok(text) => {
            let _ = sender.send(Observation::Transcript { sequence_id, text });
        }
        Err(e) => {
            warn!("Transcription failed for chunk {}, chunk dropped: {}", sequence_id, e);
        }
    }
}
