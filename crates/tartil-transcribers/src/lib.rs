//! tartil-transcribers — speech-to-text backends.
//!
//! Implements the `Transcriber` trait for Whisper-compatible HTTP APIs (a
//! self-hosted Quran-tuned server or the OpenAI cloud endpoint) and a mock
//! for tests, plus the configuration that assembles them into a fallback chain.

pub mod config;
pub mod mock;
pub mod whisper;

pub use config::{build_chain, create_transcriber, load_config, TartilConfig, TranscriberConfig};
pub use mock::MockTranscriber;
pub use whisper::WhisperApiTranscriber;
