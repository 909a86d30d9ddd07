//! The `tartil validate` command.

use std::path::PathBuf;

use anyhow::Result;

use tartil_core::parser;

pub fn execute(recitation_set_path: PathBuf) -> Result<()> {
    let sets = parser::load_recitation_sets(&recitation_set_path)?;

    let mut total_warnings = 0;

    for set in &sets {
        println!("Recitation set: {} ({} cases)", set.name, set.cases.len());

        let warnings = parser::validate_recitation_set(set);
        for w in &warnings {
            let prefix = w
                .case_id
                .as_ref()
                .map(|id| format!("  [{id}]"))
                .unwrap_or_else(|| "  ".to_string());
            println!("{prefix} WARNING: {}", w.message);
        }
        total_warnings += warnings.len();
    }

    if total_warnings == 0 {
        println!("All recitation sets valid.");
    } else {
        println!("\n{total_warnings} warning(s) found.");
    }

    Ok(())
}
