//! The `tartil init` command.

use std::path::Path;

use anyhow::{Context, Result};

pub fn execute() -> Result<()> {
    write_unless_exists(Path::new("tartil.toml"), SAMPLE_CONFIG)?;

    std::fs::create_dir_all("recitation-sets").context("failed to create recitation-sets/")?;
    write_unless_exists(Path::new("recitation-sets/example.toml"), EXAMPLE_SET)?;

    println!("\nNext steps:");
    println!("  1. Point [transcribers.local] at your Whisper server, or export TARTIL_OPENAI_KEY");
    println!("  2. Run: tartil validate --recitation-set recitation-sets/example.toml");
    println!("  3. Run: tartil batch --recitation-set recitation-sets/example.toml");

    Ok(())
}

fn write_unless_exists(path: &Path, content: &str) -> Result<()> {
    if path.exists() {
        println!("{} already exists, skipping.", path.display());
    } else {
        std::fs::write(path, content)
            .with_context(|| format!("failed to write {}", path.display()))?;
        println!("Created {}", path.display());
    }
    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# tartil configuration

# Transcribers are tried in this order until one succeeds.
chain = ["local", "openai"]
language = "ar"
parallelism = 4
timeout_secs = 120

[transcribers.local]
type = "local"
base_url = "http://localhost:9000"
model = "tarteel-ai/whisper-base-ar-quran"

[transcribers.openai]
type = "openai"
api_key = "${OPENAI_API_KEY}"
"#;

const EXAMPLE_SET: &str = r#"[recitation_set]
id = "example"
name = "Example Recitation Set"
description = "Al-Ikhlas, recited once cleanly and once with slips"
default_duration_secs = 20

[[cases]]
id = "112-1"
name = "Al-Ikhlas 1"
expected = "قُلْ هُوَ اللَّهُ أَحَدٌ"
transcription = "قل هو الله احد"
tags = ["al-ikhlas"]
min_accuracy = 90.0

[[cases]]
id = "112-2"
name = "Al-Ikhlas 2"
expected = "اللَّهُ الصَّمَدُ"
transcription = "الله الصمد"
tags = ["al-ikhlas"]

[[cases]]
id = "112-3-slip"
name = "Al-Ikhlas 3 with a missing word"
expected = "لَمْ يَلِدْ وَلَمْ يُولَدْ"
transcription = "لم يلد يولد"
duration_secs = 6
tags = ["al-ikhlas", "mistakes"]
"#;
