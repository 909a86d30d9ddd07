//! Aggregate statistics over scored recitations.

use serde::{Deserialize, Serialize};

use crate::model::{VerdictStatus, WordVerdict};
use crate::normalize::normalize;
use crate::report::CaseScore;
use crate::scoring::{tokenize, word_edit_distance};

/// Number of verdicts of each kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerdictCounts {
    pub correct: usize,
    pub incorrect: usize,
    pub missing: usize,
    pub extra: usize,
}

impl VerdictCounts {
    pub fn from_feedback(feedback: &[WordVerdict]) -> Self {
        let mut counts = Self::default();
        for verdict in feedback {
            counts.add(verdict.status);
        }
        counts
    }

    pub fn add(&mut self, status: VerdictStatus) {
        match status {
            VerdictStatus::Correct => self.correct += 1,
            VerdictStatus::Incorrect => self.incorrect += 1,
            VerdictStatus::Missing => self.missing += 1,
            VerdictStatus::Extra => self.extra += 1,
        }
    }

    pub fn merge(&mut self, other: &VerdictCounts) {
        self.correct += other.correct;
        self.incorrect += other.incorrect;
        self.missing += other.missing;
        self.extra += other.extra;
    }

    pub fn total(&self) -> usize {
        self.correct + self.incorrect + self.missing + self.extra
    }
}

/// Micro-averaged WER across `(expected, transcription)` pairs.
///
/// Returns `(wer, total_edit_distance, total_reference_words)`. Both texts are
/// normalized first. Pairs with an empty reference contribute their edits but
/// no reference words; the rate is 0.0 when there are no reference words at all.
pub fn aggregate_wer<S: AsRef<str>>(pairs: &[(S, S)]) -> (f64, usize, usize) {
    let mut total_edits = 0usize;
    let mut total_ref_words = 0usize;

    for (expected, transcription) in pairs {
        let expected = normalize(expected.as_ref());
        let transcription = normalize(transcription.as_ref());
        let ref_words = tokenize(&expected);
        let hyp_words = tokenize(&transcription);

        total_edits += word_edit_distance(&ref_words, &hyp_words);
        total_ref_words += ref_words.len();
    }

    if total_ref_words == 0 {
        return (0.0, total_edits, 0);
    }

    (
        total_edits as f64 / total_ref_words as f64,
        total_edits,
        total_ref_words,
    )
}

/// Summary statistics for a batch of scored cases.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchStats {
    /// Number of cases scored.
    pub cases: usize,
    /// Mean per-case accuracy.
    pub mean_accuracy: f64,
    /// Micro-averaged WER across all cases.
    pub aggregate_wer: f64,
    /// Sum of XP awarded.
    pub total_xp: u64,
    /// Verdict totals across all cases.
    pub verdicts: VerdictCounts,
    /// Cases whose accuracy fell below their configured minimum.
    pub below_threshold: usize,
}

/// Compute summary statistics from scored cases.
pub fn compute_batch_stats(results: &[CaseScore]) -> BatchStats {
    if results.is_empty() {
        return BatchStats::default();
    }

    let mut verdicts = VerdictCounts::default();
    for r in results {
        verdicts.merge(&VerdictCounts::from_feedback(&r.score.feedback));
    }

    let pairs: Vec<(&str, &str)> = results
        .iter()
        .map(|r| (r.expected.as_str(), r.transcription.as_str()))
        .collect();
    let (aggregate_wer, _, _) = aggregate_wer(&pairs);

    let mean_accuracy =
        results.iter().map(|r| r.score.accuracy).sum::<f64>() / results.len() as f64;

    BatchStats {
        cases: results.len(),
        mean_accuracy,
        aggregate_wer,
        total_xp: results.iter().map(|r| r.xp as u64).sum(),
        verdicts,
        below_threshold: results.iter().filter(|r| !r.meets_threshold()).count(),
    }
}
