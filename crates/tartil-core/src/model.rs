//! Core data model types for tartil.
//!
//! These are the transient value types produced by the scoring pipeline.
//! None of them are persisted by this crate.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::reward::calculate_xp_reward;

/// Classification of one aligned word pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerdictStatus {
    Correct,
    Incorrect,
    Missing,
    Extra,
}

impl fmt::Display for VerdictStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VerdictStatus::Correct => write!(f, "correct"),
            VerdictStatus::Incorrect => write!(f, "incorrect"),
            VerdictStatus::Missing => write!(f, "missing"),
            VerdictStatus::Extra => write!(f, "extra"),
        }
    }
}

impl FromStr for VerdictStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "correct" => Ok(VerdictStatus::Correct),
            "incorrect" => Ok(VerdictStatus::Incorrect),
            "missing" => Ok(VerdictStatus::Missing),
            "extra" => Ok(VerdictStatus::Extra),
            other => Err(format!("unknown verdict status: {other}")),
        }
    }
}

/// Feedback for a single word of a recitation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordVerdict {
    /// Position in the expected sequence, or in the transcribed sequence for `extra`.
    pub word_index: usize,
    /// The word that was heard. Empty for `missing`.
    pub word: String,
    /// The word that was expected. Empty for `extra`.
    pub expected: String,
    pub status: VerdictStatus,
    /// The expected word, for `incorrect` and `missing` verdicts.
    pub suggestion: Option<String>,
}

impl WordVerdict {
    pub fn correct(word_index: usize, word: &str) -> Self {
        Self {
            word_index,
            word: word.to_string(),
            expected: word.to_string(),
            status: VerdictStatus::Correct,
            suggestion: None,
        }
    }

    pub fn incorrect(word_index: usize, heard: &str, expected: &str) -> Self {
        Self {
            word_index,
            word: heard.to_string(),
            expected: expected.to_string(),
            status: VerdictStatus::Incorrect,
            suggestion: Some(expected.to_string()),
        }
    }

    pub fn missing(word_index: usize, expected: &str) -> Self {
        Self {
            word_index,
            word: String::new(),
            expected: expected.to_string(),
            status: VerdictStatus::Missing,
            suggestion: Some(expected.to_string()),
        }
    }

    pub fn extra(word_index: usize, heard: &str) -> Self {
        Self {
            word_index,
            word: heard.to_string(),
            expected: String::new(),
            status: VerdictStatus::Extra,
            suggestion: None,
        }
    }
}

/// Result of scoring a transcription against the expected verse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
    /// Accuracy percentage in `[0, 100]`, rounded to 2 decimal places.
    pub accuracy: f64,
    /// Word error rate, rounded to 4 decimal places. May exceed 1.0.
    pub wer: f64,
    /// One verdict per alignment step.
    #[serde(default)]
    pub feedback: Vec<WordVerdict>,
}

impl ScoreResult {
    /// Whether every word was recited as expected.
    pub fn is_perfect(&self) -> bool {
        self.feedback
            .iter()
            .all(|v| v.status == VerdictStatus::Correct)
            && self.wer == 0.0
    }
}

/// Inputs to the XP reward calculation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RewardInput {
    /// Accuracy percentage (0–100).
    pub accuracy: f64,
    /// Recitation duration in whole seconds.
    pub duration_secs: u64,
}

impl RewardInput {
    pub fn xp(&self) -> u32 {
        calculate_xp_reward(self.accuracy, self.duration_secs)
    }
}

/// A single verse/transcription pair to score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecitationCase {
    /// Unique identifier within the set (e.g. "1-1" for surah 1, ayah 1).
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Canonical verse text.
    pub expected: String,
    /// Speech-to-text output to score against the verse.
    pub transcription: String,
    /// Per-case duration override in seconds.
    #[serde(default)]
    pub duration_secs: Option<u64>,
    /// Tags for filtering cases.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Minimum accuracy this case is expected to reach.
    #[serde(default)]
    pub min_accuracy: Option<f64>,
}

/// A collection of recitation cases.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecitationSet {
    /// Unique identifier for this set.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub cases: Vec<RecitationCase>,
    /// Duration used for cases that don't specify one.
    #[serde(default = "default_duration")]
    pub default_duration_secs: u64,
}

impl RecitationSet {
    /// Effective duration for a case of this set.
    pub fn duration_for(&self, case: &RecitationCase) -> u64 {
        case.duration_secs.unwrap_or(self.default_duration_secs)
    }
}

fn default_duration() -> u64 {
    30
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn case_duration_falls_back_to_set_default() {
        let case = RecitationCase {
            id: "1-1".into(),
            name: "Basmala".into(),
            expected: "بسم الله".into(),
            transcription: "بسم الله".into(),
            duration_secs: None,
            tags: vec![],
            min_accuracy: None,
        };
        let set = RecitationSet {
            id: "s".into(),
            name: "S".into(),
            description: String::new(),
            cases: vec![case.clone()],
            default_duration_secs: 45,
        };
        assert_eq!(set.duration_for(&case), 45);
        let timed = RecitationCase {
            duration_secs: Some(8),
            ..case
        };
        assert_eq!(set.duration_for(&timed), 8);
    }

    #[test]
    fn status_display_and_parse() {
        assert_eq!(VerdictStatus::Missing.to_string(), "missing");
        assert_eq!(
            "extra".parse::<VerdictStatus>().unwrap(),
            VerdictStatus::Extra
        );
        assert!("Correct".parse::<VerdictStatus>().is_err());
    }

    #[test]
    fn verdict_serializes_lowercase_status_and_null_suggestion() {
        let verdict = WordVerdict::extra(3, "امين");
        let json = serde_json::to_value(&verdict).unwrap();
        assert_eq!(json["status"], "extra");
        assert_eq!(json["expected"], "");
        assert!(json["suggestion"].is_null());
        assert_eq!(json["word_index"], 3);
    }

    #[test]
    fn missing_and_incorrect_carry_suggestion() {
        let missing = WordVerdict::missing(1, "الله");
        assert_eq!(missing.word, "");
        assert_eq!(missing.suggestion.as_deref(), Some("الله"));

        let incorrect = WordVerdict::incorrect(0, "بسن", "بسم");
        assert_eq!(incorrect.word, "بسن");
        assert_eq!(incorrect.suggestion.as_deref(), Some("بسم"));
    }

    #[test]
    fn reward_input_delegates_to_calculator() {
        let input = RewardInput {
            accuracy: 100.0,
            duration_secs: 120,
        };
        assert_eq!(input.xp(), 60);
    }
}
