// session/mod.rs
//
// One practice session at a time: a coordinator owns the buffers, producers
// push observations through a channel, and a single collector appends them.
//
// Module structure:
// - coordinator.rs: start/stop lifecycle, live readings, evaluation
// - producers.rs: face detection tick and audio chunk loop
// - buffers.rs: per-session history
// - state.rs: active/recording flags
// - types.rs: capture traits, observations, errors

pub mod types;
pub mod state;
pub mod buffers;
pub mod producers;
pub mod coordinator;

pub use coordinator::SessionCoordinator;
pub use state::SessionFlags;
pub use types::{ChunkRecorder, EncodedChunk, ExpressionDetector, LiveReadings, Observation, SessionError};
