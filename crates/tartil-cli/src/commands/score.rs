//! The `tartil score` command.

use anyhow::Result;
use comfy_table::{Cell, Table};
use serde::Serialize;

use tartil_core::model::{ScoreResult, WordVerdict};

#[derive(Serialize)]
struct ScoreOutput {
    #[serde(flatten)]
    score: ScoreResult,
    duration_secs: u64,
    xp: u32,
}

pub fn execute(
    expected: String,
    transcription: String,
    duration_secs: u64,
    format: String,
) -> Result<()> {
    let score = tartil_core::score(&transcription, &expected);
    let xp = tartil_core::calculate_xp_reward(score.accuracy, duration_secs);

    match format.as_str() {
        "json" => {
            let output = ScoreOutput {
                score,
                duration_secs,
                xp,
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        _ => {
            print_score(&score);
            println!("XP: {xp}");
        }
    }

    Ok(())
}

/// Print accuracy, WER and the per-word feedback table.
pub(crate) fn print_score(score: &ScoreResult) {
    println!("Accuracy: {:.2}%", score.accuracy);
    println!("WER: {:.4}", score.wer);
    if !score.feedback.is_empty() {
        println!("{}", feedback_table(&score.feedback));
    }
}

fn feedback_table(feedback: &[WordVerdict]) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["#", "Heard", "Expected", "Verdict"]);

    for v in feedback {
        table.add_row(vec![
            Cell::new(v.word_index),
            Cell::new(&v.word),
            Cell::new(&v.expected),
            Cell::new(v.status),
        ]);
    }

    table
}
