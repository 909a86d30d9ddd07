//! Whisper-compatible HTTP transcription backend.
//!
//! Speaks the OpenAI `POST /v1/audio/transcriptions` multipart protocol, which
//! is also served by self-hosted Whisper servers running a Quran-tuned model.

use std::time::{Duration, Instant};

use anyhow::Context;
use async_trait::async_trait;
use serde::Deserialize;
use tracing::instrument;

use tartil_core::error::TranscriptionError;
use tartil_core::traits::{TranscribeRequest, Transcriber, Transcription};

pub const OPENAI_BASE_URL: &str = "https://api.openai.com";
pub const OPENAI_MODEL: &str = "whisper-1";
pub const LOCAL_MODEL: &str = "tarteel-ai/whisper-base-ar-quran";
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

const OPENAI_CONFIDENCE: f64 = 0.9;
const LOCAL_CONFIDENCE: f64 = 0.85;

/// Transcriber for any Whisper-compatible HTTP endpoint.
pub struct WhisperApiTranscriber {
    name: String,
    base_url: String,
    api_key: Option<String>,
    model: String,
    confidence: f64,
    timeout_secs: u64,
    client: reqwest::Client,
}

impl WhisperApiTranscriber {
    pub fn new(
        name: &str,
        base_url: &str,
        api_key: Option<String>,
        model: &str,
        confidence: f64,
        timeout_secs: u64,
    ) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            name: name.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.filter(|k| !k.is_empty()),
            model: model.to_string(),
            confidence,
            timeout_secs,
            client,
        })
    }

    /// The OpenAI cloud endpoint (or an OpenAI-compatible proxy).
    pub fn openai(
        name: &str,
        api_key: &str,
        base_url: Option<&str>,
        model: Option<&str>,
        timeout_secs: u64,
    ) -> anyhow::Result<Self> {
        Self::new(
            name,
            base_url.unwrap_or(OPENAI_BASE_URL),
            Some(api_key.to_string()),
            model.unwrap_or(OPENAI_MODEL),
            OPENAI_CONFIDENCE,
            timeout_secs,
        )
    }

    /// A self-hosted Whisper server; no API key.
    pub fn local(
        name: &str,
        base_url: &str,
        model: Option<&str>,
        timeout_secs: u64,
    ) -> anyhow::Result<Self> {
        Self::new(
            name,
            base_url,
            None,
            model.unwrap_or(LOCAL_MODEL),
            LOCAL_CONFIDENCE,
            timeout_secs,
        )
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[derive(Deserialize)]
struct WhisperResponse {
    text: String,
}

#[async_trait]
impl Transcriber for WhisperApiTranscriber {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(skip(self, request), fields(transcriber = %self.name, file = %request.file_name))]
    async fn transcribe(&self, request: &TranscribeRequest) -> anyhow::Result<Transcription> {
        if request.audio.is_empty() {
            return Err(TranscriptionError::InvalidAudio("empty upload".into()).into());
        }

        let start = Instant::now();

        let file = reqwest::multipart::Part::bytes(request.audio.clone())
            .file_name(request.file_name.clone());
        let form = reqwest::multipart::Form::new()
            .part("file", file)
            .text("model", self.model.clone())
            .text("language", request.language.clone())
            .text("response_format", "json");

        let mut req = self
            .client
            .post(format!("{}/v1/audio/transcriptions", self.base_url))
            .multipart(form);

        if let Some(key) = &self.api_key {
            req = req.bearer_auth(key);
        }

        let response = req.send().await.map_err(|e| {
            if e.is_timeout() {
                TranscriptionError::Timeout(self.timeout_secs)
            } else if e.is_connect() {
                TranscriptionError::Unavailable(e.to_string())
            } else {
                TranscriptionError::NetworkError(e.to_string())
            }
        })?;

        let status = response.status().as_u16();
        if status == 429 {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(5)
                * 1000;
            return Err(TranscriptionError::RateLimited {
                retry_after_ms: retry_after,
            }
            .into());
        }
        if status >= 400 {
            let body = response.text().await.unwrap_or_default();
            let err = match status {
                401 => TranscriptionError::AuthenticationFailed(body),
                400 | 415 => TranscriptionError::InvalidAudio(body),
                503 => TranscriptionError::Unavailable(body),
                _ => TranscriptionError::ApiError {
                    status,
                    message: body,
                },
            };
            return Err(err.into());
        }

        let api_response: WhisperResponse = response.json().await.map_err(|e| {
            TranscriptionError::ApiError {
                status: 0,
                message: format!("failed to parse response: {e}"),
            }
        })?;

        let latency_ms = start.elapsed().as_millis() as u64;
        tracing::debug!(latency_ms, "transcription received");

        Ok(Transcription {
            text: api_response.text.trim().to_string(),
            confidence: self.confidence,
            transcriber: self.name.clone(),
            latency_ms,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn request() -> TranscribeRequest {
        TranscribeRequest::new(vec![0x1a, 0x45, 0xdf, 0xa3], "1-1.m4a")
    }

    async fn error_for(status: u16) -> TranscriptionError {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/audio/transcriptions"))
            .respond_with(ResponseTemplate::new(status).set_body_string("nope"))
            .mount(&server)
            .await;

        let transcriber =
            WhisperApiTranscriber::openai("openai", "key", Some(&server.uri()), None, 5).unwrap();
        let err = transcriber.transcribe(&request()).await.unwrap_err();
        err.downcast::<TranscriptionError>().unwrap()
    }

    #[tokio::test]
    async fn successful_transcription() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/audio/transcriptions"))
            .and(header("Authorization", "Bearer test-key"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"text": "  بسم الله الرحمن الرحيم \n"})),
            )
            .mount(&server)
            .await;

        let transcriber =
            WhisperApiTranscriber::openai("openai", "test-key", Some(&server.uri()), None, 5)
                .unwrap();
        let t = transcriber.transcribe(&request()).await.unwrap();
        assert_eq!(t.text, "بسم الله الرحمن الرحيم");
        assert_eq!(t.transcriber, "openai");
        assert_eq!(t.confidence, 0.9);
    }

    #[tokio::test]
    async fn local_server_sends_no_credentials() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/audio/transcriptions"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"text": "الله الصمد"})),
            )
            .mount(&server)
            .await;

        let transcriber = WhisperApiTranscriber::local("local", &server.uri(), None, 5).unwrap();
        assert_eq!(transcriber.model(), LOCAL_MODEL);

        let t = transcriber.transcribe(&request()).await.unwrap();
        assert_eq!(t.text, "الله الصمد");
        assert_eq!(t.confidence, 0.85);

        let received = server.received_requests().await.unwrap();
        assert_eq!(received.len(), 1);
        assert!(received[0].headers.get("authorization").is_none());
        let body = String::from_utf8_lossy(&received[0].body);
        assert!(body.contains("name=\"language\""));
        assert!(body.contains("tarteel-ai/whisper-base-ar-quran"));
        assert!(body.contains("filename=\"1-1.m4a\""));
    }

    #[tokio::test]
    async fn status_codes_map_to_error_kinds() {
        assert!(matches!(
            error_for(401).await,
            TranscriptionError::AuthenticationFailed(_)
        ));
        assert!(matches!(
            error_for(415).await,
            TranscriptionError::InvalidAudio(_)
        ));
        assert!(matches!(
            error_for(503).await,
            TranscriptionError::Unavailable(_)
        ));
        assert!(matches!(
            error_for(500).await,
            TranscriptionError::ApiError { status: 500, .. }
        ));
    }

    #[tokio::test]
    async fn rate_limit_reads_retry_after() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "7"))
            .mount(&server)
            .await;

        let transcriber =
            WhisperApiTranscriber::openai("openai", "key", Some(&server.uri()), None, 5).unwrap();
        let err = transcriber.transcribe(&request()).await.unwrap_err();
        let err = err.downcast::<TranscriptionError>().unwrap();
        assert_eq!(err.retry_after_ms(), Some(7000));
    }

    #[tokio::test]
    async fn empty_audio_is_rejected_before_sending() {
        let server = MockServer::start().await;
        let transcriber = WhisperApiTranscriber::local("local", &server.uri(), None, 5).unwrap();

        let err = transcriber
            .transcribe(&TranscribeRequest::new(vec![], "empty.m4a"))
            .await
            .unwrap_err();
        assert!(err
            .downcast_ref::<TranscriptionError>()
            .is_some_and(TranscriptionError::is_permanent));
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn unreachable_server_is_unavailable() {
        let transcriber =
            WhisperApiTranscriber::local("local", "http://127.0.0.1:1", None, 5).unwrap();
        let err = transcriber.transcribe(&request()).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<TranscriptionError>(),
            Some(TranscriptionError::Unavailable(_))
        ));
    }

    #[test]
    fn trailing_slash_is_trimmed() {
        let transcriber =
            WhisperApiTranscriber::local("local", "http://localhost:9000/", None, 5).unwrap();
        assert_eq!(transcriber.base_url(), "http://localhost:9000");
    }
}
