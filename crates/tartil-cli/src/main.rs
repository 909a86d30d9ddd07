//! tartil CLI — the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "tartil", version, about = "Quranic recitation scoring engine")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the normalized form of Arabic text
    Normalize {
        /// Text to normalize
        text: String,
    },

    /// Score a transcription against the expected verse
    Score {
        /// Canonical verse text
        #[arg(long)]
        expected: String,

        /// What the recitation was heard as
        #[arg(long)]
        transcription: String,

        /// Recitation length in seconds, used for the XP reward
        #[arg(long, default_value = "0")]
        duration: u64,

        /// Output format: text, json
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Compute the XP reward for an accuracy and duration
    Xp {
        /// Accuracy percentage (0-100)
        #[arg(long)]
        accuracy: f64,

        /// Recitation length in seconds
        #[arg(long, default_value = "0")]
        duration: u64,
    },

    /// Score every case of a recitation set
    Batch {
        /// Path to .toml recitation set or directory
        #[arg(long)]
        recitation_set: PathBuf,

        /// Output format: text, json
        #[arg(long, default_value = "text")]
        format: String,

        /// Write the JSON report here (one file per set for directories)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Filter by tags (comma-separated)
        #[arg(long)]
        filter: Option<String>,

        /// Exit code 1 if any case is below its min_accuracy
        #[arg(long)]
        fail_below_min: bool,
    },

    /// Validate recitation set TOML files
    Validate {
        /// Path to recitation set file or directory
        #[arg(long)]
        recitation_set: PathBuf,
    },

    /// Compare two score reports
    Compare {
        /// Baseline report JSON
        #[arg(long)]
        baseline: PathBuf,

        /// Current report JSON
        #[arg(long)]
        current: PathBuf,

        /// Regression threshold in accuracy percentage points
        #[arg(long, default_value = "5.0")]
        threshold: f64,

        /// Exit code 1 if regressions found
        #[arg(long)]
        fail_on_regression: bool,

        /// Output format: text, json, markdown
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Transcribe audio through the configured transcriber chain
    Transcribe {
        /// Audio file(s) to transcribe
        #[arg(long, required = true, num_args = 1..)]
        audio: Vec<PathBuf>,

        /// Expected verse text; when given, each recitation is scored
        #[arg(long)]
        expected: Option<String>,

        /// Recitation length in seconds (estimated from file size if omitted)
        #[arg(long)]
        duration: Option<u64>,

        /// Output format: text, json
        #[arg(long, default_value = "text")]
        format: String,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Create starter config and example recitation set
    Init,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("tartil=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Normalize { text } => commands::normalize::execute(text),
        Commands::Score {
            expected,
            transcription,
            duration,
            format,
        } => commands::score::execute(expected, transcription, duration, format),
        Commands::Xp { accuracy, duration } => commands::xp::execute(accuracy, duration),
        Commands::Batch {
            recitation_set,
            format,
            output,
            filter,
            fail_below_min,
        } => commands::batch::execute(recitation_set, format, output, filter, fail_below_min),
        Commands::Validate { recitation_set } => commands::validate::execute(recitation_set),
        Commands::Compare {
            baseline,
            current,
            threshold,
            fail_on_regression,
            format,
        } => commands::compare::execute(baseline, current, threshold, fail_on_regression, format),
        Commands::Transcribe {
            audio,
            expected,
            duration,
            format,
            config,
        } => commands::transcribe::execute(audio, expected, duration, format, config).await,
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
