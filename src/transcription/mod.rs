// transcription/mod.rs
//
// Transcription module: provider abstraction and the hosted Whisper client.
//
// Module structure:
// - provider.rs: TranscriptionProvider trait, error types
// - whisper_api.rs: OpenAI-compatible Whisper HTTP implementation
// - types.rs: TranscriptSegment struct, formatting utilities

pub mod provider;
pub mod whisper_api;
pub mod types;

pub use provider::{TranscriptionError, TranscriptionProvider};
pub use whisper_api::WhisperApiProvider;
pub use types::{format_session_time, join_segments, TranscriptSegment};
