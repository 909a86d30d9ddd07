//! The `tartil transcribe` command.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};

use tartil_core::engine::{
    ProgressReporter, RecitationEngine, RecitationOutcome, RecitationSubmission,
};
use tartil_core::traits::TranscribeRequest;
use tartil_transcribers::build_chain;
use tartil_transcribers::config::load_config_from;

use super::score::print_score;

/// Console progress reporter.
struct ConsoleReporter;

impl ProgressReporter for ConsoleReporter {
    fn on_submission_start(&self, file_name: &str) {
        eprintln!("  Transcribing: {file_name}");
    }

    fn on_submission_complete(&self, file_name: &str, outcome: &RecitationOutcome) {
        eprintln!(
            "  Done: {file_name} via {} accuracy {:.2}% +{} XP",
            outcome.transcriber, outcome.score.accuracy, outcome.xp_earned
        );
    }

    fn on_submission_error(&self, file_name: &str, error: &str) {
        eprintln!("  ERROR: {file_name}: {error}");
    }

    fn on_batch_complete(&self, total: usize, completed: usize, failed: usize, elapsed: Duration) {
        eprintln!(
            "\nComplete: {completed}/{total} succeeded, {failed} failed ({:.1}s)",
            elapsed.as_secs_f64()
        );
    }
}

pub async fn execute(
    audio: Vec<PathBuf>,
    expected: Option<String>,
    duration_secs: Option<u64>,
    format: String,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let chain = build_chain(&config)?;
    let engine = RecitationEngine::new(chain, config.engine_config());
    tracing::debug!(chain = ?engine.transcriber_names(), "transcriber chain ready");

    let requests = audio
        .iter()
        .map(|path| read_request(path, &config.language))
        .collect::<Result<Vec<_>>>()?;

    let Some(expected) = expected else {
        let mut transcriptions = Vec::with_capacity(requests.len());
        for request in &requests {
            transcriptions.push(engine.transcribe(request).await?);
        }
        if format == "json" {
            println!("{}", serde_json::to_string_pretty(&transcriptions)?);
        } else {
            for (request, t) in requests.iter().zip(&transcriptions) {
                println!(
                    "{}: {} ({}, confidence {:.2})",
                    request.file_name, t.text, t.transcriber, t.confidence
                );
            }
        }
        return Ok(());
    };

    let submissions: Vec<RecitationSubmission> = requests
        .into_iter()
        .map(|request| {
            let submission = RecitationSubmission::new(request, expected.as_str());
            match duration_secs {
                Some(secs) => submission.with_duration(secs),
                None => submission,
            }
        })
        .collect();

    let batch = engine.evaluate_batch(&submissions, &ConsoleReporter).await;

    if format == "json" {
        println!("{}", serde_json::to_string_pretty(&batch)?);
    } else {
        for outcome in &batch.outcomes {
            println!(
                "\n{} ({}, confidence {:.2})",
                outcome.transcription, outcome.transcriber, outcome.confidence
            );
            print_score(&outcome.score);
            println!("XP: {} ({}s)", outcome.xp_earned, outcome.duration_secs);
        }
    }

    anyhow::ensure!(
        batch.failures.is_empty(),
        "{} of {} recitation(s) could not be transcribed",
        batch.failures.len(),
        submissions.len()
    );
    Ok(())
}

fn read_request(path: &Path, language: &str) -> Result<TranscribeRequest> {
    let audio =
        std::fs::read(path).with_context(|| format!("failed to read audio: {}", path.display()))?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "recitation.m4a".to_string());
    Ok(TranscribeRequest::new(audio, file_name).with_language(language))
}
