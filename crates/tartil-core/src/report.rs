//! Score report types with JSON persistence and regression detection.

use std::collections::HashMap;
use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::{RecitationSet, ScoreResult};
use crate::reward::calculate_xp_reward;
use crate::scoring::score;
use crate::statistics::{compute_batch_stats, BatchStats};

/// The score of one case of a recitation set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseScore {
    pub case_id: String,
    pub name: String,
    pub expected: String,
    pub transcription: String,
    pub duration_secs: u64,
    pub score: ScoreResult,
    pub xp: u32,
    #[serde(default)]
    pub min_accuracy: Option<f64>,
}

impl CaseScore {
    /// Whether the case reached its configured minimum accuracy (if any).
    pub fn meets_threshold(&self) -> bool {
        self.min_accuracy
            .is_none_or(|min| self.score.accuracy >= min)
    }
}

/// Summary of a recitation set (without the case texts).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetSummary {
    pub id: String,
    pub name: String,
    pub case_count: usize,
}

/// A complete score report for one recitation set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreReport {
    /// Unique report identifier.
    pub id: Uuid,
    /// When the report was created.
    pub created_at: DateTime<Utc>,
    pub recitation_set: SetSummary,
    /// Individual case scores, in set order.
    pub results: Vec<CaseScore>,
    pub stats: BatchStats,
    /// Total wall-clock duration in milliseconds.
    pub duration_ms: u64,
}

impl ScoreReport {
    /// Score every case of a set.
    pub fn from_set(set: &RecitationSet) -> Self {
        let start = Instant::now();

        let results: Vec<CaseScore> = set
            .cases
            .iter()
            .map(|case| {
                let duration_secs = set.duration_for(case);
                let score = score(&case.transcription, &case.expected);
                let xp = calculate_xp_reward(score.accuracy, duration_secs);
                CaseScore {
                    case_id: case.id.clone(),
                    name: case.name.clone(),
                    expected: case.expected.clone(),
                    transcription: case.transcription.clone(),
                    duration_secs,
                    score,
                    xp,
                    min_accuracy: case.min_accuracy,
                }
            })
            .collect();

        let stats = compute_batch_stats(&results);

        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            recitation_set: SetSummary {
                id: set.id.clone(),
                name: set.name.clone(),
                case_count: set.cases.len(),
            },
            results,
            stats,
            duration_ms: start.elapsed().as_millis() as u64,
        }
    }

    /// Save the report as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize report")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        Ok(())
    }

    /// Load a report from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read report from {}", path.display()))?;
        let report: ScoreReport =
            serde_json::from_str(&content).context("failed to parse report JSON")?;
        Ok(report)
    }

    /// Compare this report against a baseline.
    ///
    /// `threshold` is in accuracy percentage points: a case whose accuracy
    /// dropped by more than `threshold` is a regression.
    pub fn compare(&self, baseline: &ScoreReport, threshold: f64) -> RegressionReport {
        let accuracy_map = |report: &ScoreReport| -> HashMap<String, f64> {
            report
                .results
                .iter()
                .map(|r| (r.case_id.clone(), r.score.accuracy))
                .collect()
        };

        let baseline_scores = accuracy_map(baseline);
        let current_scores = accuracy_map(self);

        let mut regressions = Vec::new();
        let mut improvements = Vec::new();
        let mut unchanged = 0usize;
        let mut new_cases = 0usize;

        for (case_id, &current) in &current_scores {
            if let Some(&baseline_val) = baseline_scores.get(case_id) {
                let delta = current - baseline_val;
                let change = AccuracyChange {
                    case_id: case_id.clone(),
                    baseline_accuracy: baseline_val,
                    current_accuracy: current,
                    delta,
                };
                if delta < -threshold {
                    regressions.push(change);
                } else if delta > threshold {
                    improvements.push(change);
                } else {
                    unchanged += 1;
                }
            } else {
                new_cases += 1;
            }
        }

        let removed_cases = baseline_scores
            .keys()
            .filter(|k| !current_scores.contains_key(*k))
            .count();

        regressions.sort_by(|a, b| a.delta.total_cmp(&b.delta));
        improvements.sort_by(|a, b| b.delta.total_cmp(&a.delta));

        RegressionReport {
            regressions,
            improvements,
            unchanged,
            new_cases,
            removed_cases,
        }
    }
}

/// Accuracy change of one case between two reports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccuracyChange {
    pub case_id: String,
    pub baseline_accuracy: f64,
    pub current_accuracy: f64,
    /// `current - baseline`, in percentage points.
    pub delta: f64,
}

/// Result of comparing two score reports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegressionReport {
    /// Worst regression first.
    pub regressions: Vec<AccuracyChange>,
    /// Largest improvement first.
    pub improvements: Vec<AccuracyChange>,
    pub unchanged: usize,
    pub new_cases: usize,
    pub removed_cases: usize,
}

impl RegressionReport {
    pub fn has_regressions(&self) -> bool {
        !self.regressions.is_empty()
    }

    /// Render as a markdown summary (for CI comments).
    pub fn to_markdown(&self) -> String {
        let mut md = String::from("## Recitation score comparison\n\n");
        md.push_str(&format!(
            "{} regressions, {} improvements, {} unchanged\n",
            self.regressions.len(),
            self.improvements.len(),
            self.unchanged
        ));

        let mut table = |title: &str, rows: &[AccuracyChange]| {
            if rows.is_empty() {
                return;
            }
            md.push_str(&format!("\n### {title}\n\n"));
            md.push_str("| Case | Baseline | Current | Delta |\n");
            md.push_str("|------|----------|---------|-------|\n");
            for r in rows {
                md.push_str(&format!(
                    "| {} | {:.2}% | {:.2}% | {:+.2} |\n",
                    r.case_id, r.baseline_accuracy, r.current_accuracy, r.delta
                ));
            }
        };
        table("Regressions", &self.regressions);
        table("Improvements", &self.improvements);

        if self.new_cases > 0 || self.removed_cases > 0 {
            md.push_str(&format!(
                "\n{} new case(s), {} removed case(s)\n",
                self.new_cases, self.removed_cases
            ));
        }
        md
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RecitationCase;

    fn case(id: &str, expected: &str, transcription: &str) -> RecitationCase {
        RecitationCase {
            id: id.into(),
            name: id.into(),
            expected: expected.into(),
            transcription: transcription.into(),
            duration_secs: None,
            tags: vec![],
            min_accuracy: None,
        }
    }

    fn set(cases: Vec<RecitationCase>) -> RecitationSet {
        RecitationSet {
            id: "fatiha".into(),
            name: "Al-Fatiha".into(),
            description: String::new(),
            cases,
            default_duration_secs: 60,
        }
    }

    #[test]
    fn from_set_scores_every_case() {
        let report = ScoreReport::from_set(&set(vec![
            case("1-1", "بِسْمِ اللَّهِ الرَّحْمَٰنِ الرَّحِيمِ", "بسم الله الرحمن الرحيم"),
            case("1-2", "الْحَمْدُ لِلَّهِ رَبِّ الْعَالَمِينَ", "الحمد لله"),
        ]));

        assert_eq!(report.recitation_set.case_count, 2);
        assert_eq!(report.results[0].score.accuracy, 100.0);
        // 10 * 3.0 * 1.5
        assert_eq!(report.results[0].xp, 45);
        assert_eq!(report.results[1].score.accuracy, 50.0);
        assert_eq!(report.results[1].xp, 15);
        assert_eq!(report.stats.total_xp, 60);
        assert_eq!(report.stats.verdicts.missing, 2);
        assert!((report.stats.aggregate_wer - 0.25).abs() < 1e-12);
    }

    #[test]
    fn save_and_load_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out/report.json");
        let report = ScoreReport::from_set(&set(vec![case("1-1", "بسم الله", "بسم")]));

        report.save_json(&path).unwrap();
        let loaded = ScoreReport::load_json(&path).unwrap();
        assert_eq!(loaded.id, report.id);
        assert_eq!(loaded.results[0].score, report.results[0].score);
    }

    #[test]
    fn compare_detects_regressions_and_improvements() {
        let baseline = ScoreReport::from_set(&set(vec![
            case("a", "بسم الله", "بسم الله"),
            case("b", "بسم الله", "بسم"),
            case("c", "بسم الله", "بسم الله"),
            case("gone", "بسم", "بسم"),
        ]));
        let current = ScoreReport::from_set(&set(vec![
            case("a", "بسم الله", "بسم"),
            case("b", "بسم الله", "بسم الله"),
            case("c", "بسم الله", "بسم الله"),
            case("new", "بسم", "بسم"),
        ]));

        let cmp = current.compare(&baseline, 5.0);
        assert!(cmp.has_regressions());
        assert_eq!(cmp.regressions.len(), 1);
        assert_eq!(cmp.regressions[0].case_id, "a");
        assert_eq!(cmp.regressions[0].delta, -50.0);
        assert_eq!(cmp.improvements.len(), 1);
        assert_eq!(cmp.improvements[0].case_id, "b");
        assert_eq!(cmp.unchanged, 1);
        assert_eq!(cmp.new_cases, 1);
        assert_eq!(cmp.removed_cases, 1);

        let md = cmp.to_markdown();
        assert!(md.contains("### Regressions"));
        assert!(md.contains("| a | 100.00% | 50.00% | -50.00 |"));
    }

    #[test]
    fn small_changes_within_threshold_are_unchanged() {
        let baseline = ScoreReport::from_set(&set(vec![case("a", "بسم الله", "بسم")]));
        let cmp = baseline.compare(&baseline, 0.0);
        assert!(!cmp.has_regressions());
        assert_eq!(cmp.unchanged, 1);
    }

    #[test]
    fn threshold_check() {
        let mut report = ScoreReport::from_set(&set(vec![case("a", "بسم الله", "بسم")]));
        assert!(report.results[0].meets_threshold());
        report.results[0].min_accuracy = Some(90.0);
        assert!(!report.results[0].meets_threshold());
    }
}
