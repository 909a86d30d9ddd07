//! Mock transcriber for testing.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use tartil_core::error::TranscriptionError;
use tartil_core::traits::{TranscribeRequest, Transcriber, Transcription};

#[derive(Debug, Clone)]
enum MockBehavior {
    /// Map of file-name substring → transcription, with a default.
    Respond {
        responses: HashMap<String, String>,
        default_response: String,
    },
    /// Always fail as unavailable with this message.
    Unavailable(String),
    /// Always reject the audio with this message.
    InvalidAudio(String),
}

/// A mock transcriber for exercising the recitation engine without a backend.
pub struct MockTranscriber {
    name: String,
    behavior: MockBehavior,
    /// Number of calls made.
    call_count: AtomicU32,
    /// Last request received.
    last_request: Mutex<Option<TranscribeRequest>>,
}

impl MockTranscriber {
    /// Create a mock with file-name → transcription mappings.
    pub fn new(name: &str, responses: HashMap<String, String>) -> Self {
        Self::with_behavior(
            name,
            MockBehavior::Respond {
                responses,
                default_response: String::new(),
            },
        )
    }

    /// Create a mock that always returns the same text.
    pub fn with_fixed_response(name: &str, text: &str) -> Self {
        Self::with_behavior(
            name,
            MockBehavior::Respond {
                responses: HashMap::new(),
                default_response: text.to_string(),
            },
        )
    }

    /// Create a mock whose backend is always down.
    pub fn unavailable(name: &str, message: &str) -> Self {
        Self::with_behavior(name, MockBehavior::Unavailable(message.to_string()))
    }

    /// Create a mock that rejects every upload as non-audio.
    pub fn rejecting(name: &str, message: &str) -> Self {
        Self::with_behavior(name, MockBehavior::InvalidAudio(message.to_string()))
    }

    fn with_behavior(name: &str, behavior: MockBehavior) -> Self {
        Self {
            name: name.to_string(),
            behavior,
            call_count: AtomicU32::new(0),
            last_request: Mutex::new(None),
        }
    }

    /// Get the number of calls made to this transcriber.
    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }

    /// Get the last request made to this transcriber.
    pub fn last_request(&self) -> Option<TranscribeRequest> {
        self.last_request
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

#[async_trait]
impl Transcriber for MockTranscriber {
    fn name(&self) -> &str {
        &self.name
    }

    async fn transcribe(&self, request: &TranscribeRequest) -> anyhow::Result<Transcription> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        *self
            .last_request
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(request.clone());

        let text = match &self.behavior {
            MockBehavior::Respond {
                responses,
                default_response,
            } => responses
                .iter()
                .find(|(key, _)| request.file_name.contains(key.as_str()))
                .map(|(_, v)| v.clone())
                .unwrap_or_else(|| default_response.clone()),
            MockBehavior::Unavailable(message) => {
                return Err(TranscriptionError::Unavailable(message.clone()).into());
            }
            MockBehavior::InvalidAudio(message) => {
                return Err(TranscriptionError::InvalidAudio(message.clone()).into());
            }
        };

        Ok(Transcription {
            text: text.trim().to_string(),
            confidence: 1.0,
            transcriber: self.name.clone(),
            latency_ms: 0,
        })
    }
}
