//! The `tartil batch` command.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::Result;
use comfy_table::{Cell, Table};

use tartil_core::model::RecitationSet;
use tartil_core::parser;
use tartil_core::report::ScoreReport;

pub fn execute(
    recitation_set_path: PathBuf,
    format: String,
    output: Option<PathBuf>,
    filter: Option<String>,
    fail_below_min: bool,
) -> Result<()> {
    let mut sets = parser::load_recitation_sets(&recitation_set_path)?;
    anyhow::ensure!(
        !sets.is_empty(),
        "no recitation sets found in {}",
        recitation_set_path.display()
    );

    if let Some(filter_tags) = &filter {
        let tags: Vec<&str> = filter_tags.split(',').map(|s| s.trim()).collect();
        for set in &mut sets {
            set.cases
                .retain(|c| c.tags.iter().any(|t| tags.contains(&t.as_str())));
        }
    }

    let reports: Vec<ScoreReport> = sets.iter().map(ScoreReport::from_set).collect();

    match format.as_str() {
        "json" => {
            let json = match reports.as_slice() {
                [single] => serde_json::to_string_pretty(single)?,
                all => serde_json::to_string_pretty(all)?,
            };
            println!("{json}");
        }
        _ => {
            for report in &reports {
                print_report(report);
            }
        }
    }

    if let Some(output) = &output {
        save_reports(&sets, &reports, output)?;
    }

    let below: usize = reports.iter().map(|r| r.stats.below_threshold).sum();
    if below > 0 {
        tracing::warn!(cases = below, "cases below their min_accuracy");
        if fail_below_min {
            std::process::exit(1);
        }
    }

    Ok(())
}

fn save_reports(sets: &[RecitationSet], reports: &[ScoreReport], output: &Path) -> Result<()> {
    if reports.len() == 1 && !output.is_dir() {
        reports[0].save_json(output)?;
        eprintln!("Report saved to: {}", output.display());
        return Ok(());
    }

    std::fs::create_dir_all(output)?;
    let timestamp = chrono::Utc::now().format("%Y-%m-%dT%H%M%S").to_string();
    let mut seen: HashMap<&str, usize> = HashMap::new();
    for (set, report) in sets.iter().zip(reports) {
        let path = output.join(report_file_name(&set.id, &timestamp, &mut seen));
        report.save_json(&path)?;
        eprintln!("Report saved to: {}", path.display());
    }
    Ok(())
}

/// `{id}-{timestamp}.json`, with `-2`, `-3`, ... appended for repeated set ids.
fn report_file_name<'a>(
    id: &'a str,
    timestamp: &str,
    seen: &mut HashMap<&'a str, usize>,
) -> String {
    let count = seen.entry(id).or_insert(0);
    *count += 1;
    if *count == 1 {
        format!("{id}-{timestamp}.json")
    } else {
        tracing::warn!(set = id, "duplicate recitation set id");
        format!("{id}-{timestamp}-{count}.json")
    }
}

fn print_report(report: &ScoreReport) {
    println!(
        "Recitation set: {} ({} cases)",
        report.recitation_set.name,
        report.results.len()
    );

    let mut table = Table::new();
    table.set_header(vec!["Case", "Name", "Accuracy", "WER", "XP", "Min"]);

    for r in &report.results {
        let min = match r.min_accuracy {
            Some(min) if r.meets_threshold() => format!("{min:.1}% OK"),
            Some(min) => format!("{min:.1}% BELOW"),
            None => "-".to_string(),
        };
        table.add_row(vec![
            Cell::new(&r.case_id),
            Cell::new(&r.name),
            Cell::new(format!("{:.2}%", r.score.accuracy)),
            Cell::new(format!("{:.4}", r.score.wer)),
            Cell::new(r.xp),
            Cell::new(min),
        ]);
    }
    println!("{table}");

    let stats = &report.stats;
    println!(
        "Mean accuracy: {:.2}%  Aggregate WER: {:.4}  Total XP: {}",
        stats.mean_accuracy, stats.aggregate_wer, stats.total_xp
    );
    println!(
        "Words: {} correct, {} incorrect, {} missing, {} extra",
        stats.verdicts.correct,
        stats.verdicts.incorrect,
        stats.verdicts.missing,
        stats.verdicts.extra
    );
    if stats.below_threshold > 0 {
        println!("{} case(s) below min_accuracy", stats.below_threshold);
    }
    println!();
}
