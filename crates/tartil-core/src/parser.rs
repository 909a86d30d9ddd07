//! TOML recitation set parser.
//!
//! Loads recitation sets from TOML files and directories, and validates them.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::model::{RecitationCase, RecitationSet};
use crate::normalize::normalize;

/// Intermediate TOML structure for parsing recitation set files.
#[derive(Debug, Deserialize)]
struct TomlRecitationFile {
    recitation_set: TomlRecitationSetHeader,
    #[serde(default)]
    cases: Vec<TomlRecitationCase>,
}

#[derive(Debug, Deserialize)]
struct TomlRecitationSetHeader {
    id: String,
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default = "default_duration")]
    default_duration_secs: u64,
}

fn default_duration() -> u64 {
    30
}

#[derive(Debug, Deserialize)]
struct TomlRecitationCase {
    id: String,
    #[serde(default)]
    name: Option<String>,
    expected: String,
    #[serde(default)]
    transcription: String,
    #[serde(default)]
    duration_secs: Option<u64>,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    min_accuracy: Option<f64>,
}

/// Parse a single TOML file into a `RecitationSet`.
pub fn parse_recitation_set(path: &Path) -> Result<RecitationSet> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read recitation set file: {}", path.display()))?;

    parse_recitation_set_str(&content, path)
}

/// Parse a TOML string into a `RecitationSet` (useful for testing).
pub fn parse_recitation_set_str(content: &str, source_path: &Path) -> Result<RecitationSet> {
    let parsed: TomlRecitationFile = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;

    let cases = parsed
        .cases
        .into_iter()
        .map(|c| RecitationCase {
            name: c.name.unwrap_or_else(|| c.id.clone()),
            id: c.id,
            expected: c.expected,
            transcription: c.transcription,
            duration_secs: c.duration_secs,
            tags: c.tags,
            min_accuracy: c.min_accuracy,
        })
        .collect();

    Ok(RecitationSet {
        id: parsed.recitation_set.id,
        name: parsed.recitation_set.name,
        description: parsed.recitation_set.description,
        cases,
        default_duration_secs: parsed.recitation_set.default_duration_secs,
    })
}

/// Recursively load all `.toml` recitation set files from a directory.
///
/// Files that fail to parse are skipped with a warning.
pub fn load_recitation_directory(dir: &Path) -> Result<Vec<RecitationSet>> {
    let mut sets = Vec::new();

    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    let mut entries = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
        .collect::<std::io::Result<Vec<_>>>()?;
    entries.sort_by_key(|e| e.path());

    for entry in entries {
        let path = entry.path();

        if path.is_dir() {
            sets.extend(load_recitation_directory(&path)?);
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            match parse_recitation_set(&path) {
                Ok(set) => sets.push(set),
                Err(e) => {
                    tracing::warn!("skipping {}: {:#}", path.display(), e);
                }
            }
        }
    }

    Ok(sets)
}

/// Load a single file or every set under a directory.
pub fn load_recitation_sets(path: &Path) -> Result<Vec<RecitationSet>> {
    if path.is_dir() {
        load_recitation_directory(path)
    } else {
        Ok(vec![parse_recitation_set(path)?])
    }
}

/// A warning from recitation set validation.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// The case ID (if applicable).
    pub case_id: Option<String>,
    /// Warning message.
    pub message: String,
}

/// Validate a recitation set for common issues.
pub fn validate_recitation_set(set: &RecitationSet) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    if set.cases.is_empty() {
        warnings.push(ValidationWarning {
            case_id: None,
            message: "recitation set has no cases".into(),
        });
    }

    let mut seen_ids = std::collections::HashSet::new();
    for case in &set.cases {
        if !seen_ids.insert(&case.id) {
            warnings.push(ValidationWarning {
                case_id: Some(case.id.clone()),
                message: format!("duplicate case ID: {}", case.id),
            });
        }
    }

    for case in &set.cases {
        if case.expected.trim().is_empty() {
            warnings.push(ValidationWarning {
                case_id: Some(case.id.clone()),
                message: "expected text is empty".into(),
            });
        } else if normalize(&case.expected).is_empty() {
            warnings.push(ValidationWarning {
                case_id: Some(case.id.clone()),
                message: "expected text contains only diacritics".into(),
            });
        }
    }

    for case in &set.cases {
        if let Some(min) = case.min_accuracy {
            if !(0.0..=100.0).contains(&min) {
                warnings.push(ValidationWarning {
                    case_id: Some(case.id.clone()),
                    message: format!("min_accuracy {min} is outside 0..=100"),
                });
            }
        }
    }

    warnings
}
