//! Core trait definition for transcription backends.
//!
//! Implemented by the `tartil-transcribers` crate. The recitation engine is
//! handed an ordered chain of these at construction time.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Default transcription language.
pub const DEFAULT_LANGUAGE: &str = "ar";

/// Trait for backends that turn recorded audio into text.
#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Human-readable transcriber name (e.g. "openai").
    fn name(&self) -> &str;

    /// Transcribe an audio recording.
    async fn transcribe(&self, request: &TranscribeRequest) -> anyhow::Result<Transcription>;
}

/// Audio to transcribe.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscribeRequest {
    /// Raw audio bytes as uploaded.
    #[serde(skip)]
    pub audio: Vec<u8>,
    /// Original file name, used for the multipart upload.
    pub file_name: String,
    /// ISO-639-1 language hint.
    #[serde(default = "default_language")]
    pub language: String,
}

impl TranscribeRequest {
    pub fn new(audio: Vec<u8>, file_name: impl Into<String>) -> Self {
        Self {
            audio,
            file_name: file_name.into(),
            language: default_language(),
        }
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }
}

fn default_language() -> String {
    DEFAULT_LANGUAGE.to_string()
}

/// Text produced by a transcriber.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transcription {
    /// Transcribed text, trimmed.
    pub text: String,
    /// Backend confidence in `[0, 1]`.
    pub confidence: f64,
    /// Name of the transcriber that produced this text.
    pub transcriber: String,
    /// Latency in milliseconds.
    pub latency_ms: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_defaults_to_arabic() {
        let request = TranscribeRequest::new(vec![1, 2, 3], "ayah.m4a");
        assert_eq!(request.language, "ar");
        assert_eq!(request.with_language("en").language, "en");
    }

    #[test]
    fn request_json_omits_audio() {
        let request = TranscribeRequest::new(vec![0; 16], "ayah.m4a");
        let json = serde_json::to_value(&request).unwrap();
        assert!(json.get("audio").is_none());
        assert_eq!(json["file_name"], "ayah.m4a");
    }
}
