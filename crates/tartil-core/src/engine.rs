//! Recitation engine orchestrator.
//!
//! Runs submitted audio through an ordered chain of transcribers, falling
//! through to the next one on failure, then scores the text and awards XP.
//! The transcriber chain is injected at construction time.

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use chrono::{DateTime, Utc};
use futures::stream::{FuturesUnordered, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::sync::Semaphore;
use uuid::Uuid;

use crate::error::{FailedAttempt, TranscriptionError};
use crate::model::ScoreResult;
use crate::reward::{calculate_xp_reward, estimate_duration_secs};
use crate::scoring::score;
use crate::traits::{TranscribeRequest, Transcriber, Transcription};

/// Configuration for the recitation engine.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Maximum concurrent submissions in a batch.
    pub parallelism: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self { parallelism: 4 }
    }
}

/// A recorded recitation to evaluate against its verse.
#[derive(Debug, Clone)]
pub struct RecitationSubmission {
    pub request: TranscribeRequest,
    /// Canonical verse text.
    pub expected_text: String,
    /// Known duration. When absent it is estimated from the upload size.
    pub duration_secs: Option<u64>,
}

impl RecitationSubmission {
    pub fn new(request: TranscribeRequest, expected_text: impl Into<String>) -> Self {
        Self {
            request,
            expected_text: expected_text.into(),
            duration_secs: None,
        }
    }

    pub fn with_duration(mut self, duration_secs: u64) -> Self {
        self.duration_secs = Some(duration_secs);
        self
    }

    /// The explicit duration, or an estimate from the audio size.
    pub fn effective_duration_secs(&self) -> u64 {
        self.duration_secs
            .unwrap_or_else(|| estimate_duration_secs(self.request.audio.len()))
    }
}

/// The scored result of one submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecitationOutcome {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    /// Raw transcription as returned by the transcriber.
    pub transcription: String,
    pub confidence: f64,
    /// Name of the transcriber that succeeded.
    pub transcriber: String,
    pub expected_text: String,
    pub score: ScoreResult,
    pub xp_earned: u32,
    pub duration_secs: u64,
}

impl RecitationOutcome {
    /// Score a finished transcription and compute its reward.
    pub fn from_transcription(
        transcription: Transcription,
        expected_text: &str,
        duration_secs: u64,
    ) -> Self {
        let score = score(&transcription.text, expected_text);
        let xp_earned = calculate_xp_reward(score.accuracy, duration_secs);

        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            transcription: transcription.text,
            confidence: transcription.confidence,
            transcriber: transcription.transcriber,
            expected_text: expected_text.to_string(),
            score,
            xp_earned,
            duration_secs,
        }
    }
}

/// A batch item that could not be evaluated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionFailure {
    pub file_name: String,
    pub error: String,
}

/// Results of [`RecitationEngine::evaluate_batch`], in submission order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchOutcome {
    pub outcomes: Vec<RecitationOutcome>,
    pub failures: Vec<SubmissionFailure>,
}

/// Progress reporting trait.
pub trait ProgressReporter: Send + Sync {
    fn on_submission_start(&self, file_name: &str);
    fn on_submission_complete(&self, file_name: &str, outcome: &RecitationOutcome);
    fn on_submission_error(&self, file_name: &str, error: &str);
    fn on_batch_complete(&self, total: usize, completed: usize, failed: usize, elapsed: Duration);
}

/// No-op progress reporter.
pub struct NoopReporter;

impl ProgressReporter for NoopReporter {
    fn on_submission_start(&self, _: &str) {}
    fn on_submission_complete(&self, _: &str, _: &RecitationOutcome) {}
    fn on_submission_error(&self, _: &str, _: &str) {}
    fn on_batch_complete(&self, _: usize, _: usize, _: usize, _: Duration) {}
}

/// The central recitation engine.
pub struct RecitationEngine {
    chain: Vec<Arc<dyn Transcriber>>,
    config: EngineConfig,
}

impl RecitationEngine {
    pub fn new(chain: Vec<Arc<dyn Transcriber>>, config: EngineConfig) -> Self {
        Self { chain, config }
    }

    /// Names of the configured transcribers, in fallback order.
    pub fn transcriber_names(&self) -> Vec<&str> {
        self.chain.iter().map(|t| t.name()).collect()
    }

    /// Transcribe with the first transcriber that succeeds.
    ///
    /// A permanent failure (the audio itself is unusable) stops the chain
    /// immediately. Otherwise every failure is recorded and the next
    /// transcriber is tried; if all fail the combined error is returned.
    pub async fn transcribe(&self, request: &TranscribeRequest) -> Result<Transcription> {
        let mut attempts = Vec::new();

        for transcriber in &self.chain {
            match transcriber.transcribe(request).await {
                Ok(transcription) => {
                    if !attempts.is_empty() {
                        tracing::info!(
                            transcriber = transcriber.name(),
                            failed = attempts.len(),
                            "transcribed with fallback"
                        );
                    }
                    return Ok(transcription);
                }
                Err(e) => {
                    let permanent = e
                        .downcast_ref::<TranscriptionError>()
                        .is_some_and(TranscriptionError::is_permanent);
                    if permanent {
                        return Err(e);
                    }
                    tracing::warn!(
                        transcriber = transcriber.name(),
                        "transcription failed, trying next: {e:#}"
                    );
                    attempts.push(FailedAttempt {
                        transcriber: transcriber.name().to_string(),
                        error: format!("{e:#}"),
                    });
                }
            }
        }

        if attempts.is_empty() {
            return Err(TranscriptionError::Unavailable("no transcribers configured".into()).into());
        }
        Err(TranscriptionError::AllFailed { attempts }.into())
    }

    /// Transcribe, score and reward a single submission.
    pub async fn evaluate(&self, submission: &RecitationSubmission) -> Result<RecitationOutcome> {
        let transcription = self.transcribe(&submission.request).await?;
        Ok(RecitationOutcome::from_transcription(
            transcription,
            &submission.expected_text,
            submission.effective_duration_secs(),
        ))
    }

    /// Evaluate many submissions with bounded concurrency.
    ///
    /// A failing submission is reported and skipped; it never aborts the batch.
    pub async fn evaluate_batch(
        &self,
        submissions: &[RecitationSubmission],
        progress: &dyn ProgressReporter,
    ) -> BatchOutcome {
        let start = Instant::now();
        let semaphore = Semaphore::new(self.config.parallelism.max(1));

        let mut futures = FuturesUnordered::new();
        for (index, submission) in submissions.iter().enumerate() {
            let semaphore = &semaphore;
            futures.push(async move {
                let result = match semaphore.acquire().await {
                    Ok(_permit) => {
                        progress.on_submission_start(&submission.request.file_name);
                        self.evaluate(submission).await
                    }
                    Err(_) => Err(anyhow::anyhow!("semaphore closed")),
                };
                (index, result)
            });
        }

        let mut completed = Vec::new();
        let mut failed = Vec::new();

        while let Some((index, result)) = futures.next().await {
            let file_name = &submissions[index].request.file_name;
            match result {
                Ok(outcome) => {
                    progress.on_submission_complete(file_name, &outcome);
                    completed.push((index, outcome));
                }
                Err(e) => {
                    tracing::error!("evaluation failed for {file_name}: {e:#}");
                    progress.on_submission_error(file_name, &format!("{e:#}"));
                    failed.push((
                        index,
                        SubmissionFailure {
                            file_name: file_name.clone(),
                            error: format!("{e:#}"),
                        },
                    ));
                }
            }
        }

        progress.on_batch_complete(
            submissions.len(),
            completed.len(),
            failed.len(),
            start.elapsed(),
        );

        completed.sort_by_key(|(index, _)| *index);
        failed.sort_by_key(|(index, _)| *index);

        BatchOutcome {
            outcomes: completed.into_iter().map(|(_, o)| o).collect(),
            failures: failed.into_iter().map(|(_, f)| f).collect(),
        }
    }
}
