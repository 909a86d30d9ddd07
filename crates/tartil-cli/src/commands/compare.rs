//! The `tartil compare` command.

use std::path::PathBuf;

use anyhow::Result;

use tartil_core::report::{AccuracyChange, ScoreReport};

pub fn execute(
    baseline_path: PathBuf,
    current_path: PathBuf,
    threshold: f64,
    fail_on_regression: bool,
    format: String,
) -> Result<()> {
    anyhow::ensure!(threshold >= 0.0, "threshold must not be negative");

    let baseline = ScoreReport::load_json(&baseline_path)?;
    let current = ScoreReport::load_json(&current_path)?;

    if baseline.recitation_set.id != current.recitation_set.id {
        tracing::warn!(
            baseline = %baseline.recitation_set.id,
            current = %current.recitation_set.id,
            "comparing reports of different recitation sets"
        );
    }

    let report = current.compare(&baseline, threshold);

    match format.as_str() {
        "markdown" | "md" => {
            println!("{}", report.to_markdown());
        }
        "json" => {
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        _ => {
            println!(
                "Comparison: {} regressions, {} improvements, {} unchanged",
                report.regressions.len(),
                report.improvements.len(),
                report.unchanged
            );
            print_changes("Regressions", &report.regressions);
            print_changes("Improvements", &report.improvements);

            if report.new_cases > 0 {
                println!("\n{} new case(s)", report.new_cases);
            }
            if report.removed_cases > 0 {
                println!("{} removed case(s)", report.removed_cases);
            }
        }
    }

    if fail_on_regression && report.has_regressions() {
        std::process::exit(1);
    }

    Ok(())
}

fn print_changes(title: &str, changes: &[AccuracyChange]) {
    if changes.is_empty() {
        return;
    }
    println!("\n{title}:");
    for c in changes {
        println!(
            "  {} {:.2}% -> {:.2}% ({:+.2})",
            c.case_id, c.baseline_accuracy, c.current_accuracy, c.delta
        );
    }
}
