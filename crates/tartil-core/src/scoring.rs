//! Word-level alignment, WER and accuracy scoring.
//!
//! [`score`] normalizes both texts, computes the word error rate from a
//! unit-cost Levenshtein distance over word tokens, and walks both token
//! sequences to produce per-word feedback.

use crate::model::{ScoreResult, WordVerdict};
use crate::normalize::{is_separator, normalize};

/// Split normalized text into word tokens on separator runs.
///
/// Separators are Unicode whitespace plus the ASCII information separators
/// U+001C..=U+001F.
pub fn tokenize(text: &str) -> Vec<&str> {
    text.split(is_separator).filter(|t| !t.is_empty()).collect()
}

/// Word-level Levenshtein distance with unit cost for substitution,
/// insertion and deletion. Tokens compare by exact string equality.
pub fn word_edit_distance<S: AsRef<str>>(reference: &[S], hypothesis: &[S]) -> usize {
    let n = hypothesis.len();
    let mut prev: Vec<usize> = (0..=n).collect();
    let mut curr = vec![0; n + 1];

    for (i, ref_word) in reference.iter().enumerate() {
        curr[0] = i + 1;
        for (j, hyp_word) in hypothesis.iter().enumerate() {
            let cost = usize::from(ref_word.as_ref() != hyp_word.as_ref());
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[n]
}

/// Word error rate of `hypothesis` against `reference`.
///
/// An empty reference yields exactly 0.0 when the hypothesis is also empty
/// and exactly 1.0 otherwise. Values above 1.0 are possible when the
/// hypothesis is much longer than the reference.
pub fn word_error_rate<S: AsRef<str>>(reference: &[S], hypothesis: &[S]) -> f64 {
    if reference.is_empty() {
        return if hypothesis.is_empty() { 0.0 } else { 1.0 };
    }
    word_edit_distance(reference, hypothesis) as f64 / reference.len() as f64
}

/// Accuracy percentage derived from WER, clamped to `[0, 100]` and rounded
/// to 2 decimal places.
pub fn accuracy_from_wer(wer: f64) -> f64 {
    round_to(((1.0 - wer) * 100.0).clamp(0.0, 100.0), 2)
}

/// Produce per-word verdicts by walking both sequences left to right.
///
/// This is a greedy one-to-one walk: after an insertion or deletion it does
/// not re-synchronize, so the rest of the verse is reported as `incorrect`
/// rather than as one `missing`/`extra` followed by matches. The verdict
/// counts therefore need not agree with the edit distance behind the WER.
pub fn align_words<S: AsRef<str>>(expected: &[S], transcribed: &[S]) -> Vec<WordVerdict> {
    let mut feedback = Vec::with_capacity(expected.len().max(transcribed.len()));
    let (mut i, mut j) = (0, 0);

    while i < expected.len() || j < transcribed.len() {
        if i >= expected.len() {
            feedback.push(WordVerdict::extra(j, transcribed[j].as_ref()));
            j += 1;
        } else if j >= transcribed.len() {
            feedback.push(WordVerdict::missing(i, expected[i].as_ref()));
            i += 1;
        } else if expected[i].as_ref() == transcribed[j].as_ref() {
            feedback.push(WordVerdict::correct(i, expected[i].as_ref()));
            i += 1;
            j += 1;
        } else {
            feedback.push(WordVerdict::incorrect(
                i,
                transcribed[j].as_ref(),
                expected[i].as_ref(),
            ));
            i += 1;
            j += 1;
        }
    }

    feedback
}

/// Score a transcription against the expected verse text.
pub fn score(transcription: &str, expected: &str) -> ScoreResult {
    let transcription = normalize(transcription);
    let expected = normalize(expected);

    let transcribed_words = tokenize(&transcription);
    let expected_words = tokenize(&expected);

    let wer = word_error_rate(&expected_words, &transcribed_words);

    ScoreResult {
        accuracy: accuracy_from_wer(wer),
        wer: round_to(wer, 4),
        feedback: align_words(&expected_words, &transcribed_words),
    }
}

/// Round half to even, so exact ties such as 0.03125 go to 0.0312.
fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round_ties_even() / factor
}
