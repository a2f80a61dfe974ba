use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use app_lib::analysis::{analyze_audio, evaluate_session, ContentQualityEvaluator, SessionData};
use app_lib::config::AppConfig;

#[derive(Parser)]
#[command(name = "practice-room", version, about = "Score teaching practice sessions")]
struct Cli {
    /// Config file (defaults to the user config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Evaluate a recorded session JSON file and print the report
    Evaluate {
        session: PathBuf,
        /// Skip the generative-text service even if a key is configured
        #[arg(long)]
        local_only: bool,
    },
    /// Print the voice quality of a WAV file
    AnalyzeAudio { file: PathBuf },
}

#[tokio::main]
async fn main() -> Result<()> {
    app_lib::init_logging();
    let cli = Cli::parse();

    match cli.command {
        Command::Evaluate { session, local_only } => {
            let config = AppConfig::load(cli.config.as_deref())?;
            let raw = std::fs::read_to_string(&session)
                .with_context(|| format!("Failed to read session file {}", session.display()))?;
            let data: SessionData = serde_json::from_str(&raw)
                .with_context(|| format!("Failed to parse session file {}", session.display()))?;

            let evaluator = if local_only {
                ContentQualityEvaluator::local_only()
            } else {
                app_lib::build_evaluator(&config)
            };

            let metrics = evaluate_session(&data, &evaluator).await;
            println!("{}", serde_json::to_string_pretty(&metrics)?);
        }
        Command::AnalyzeAudio { file } => {
            let bytes = std::fs::read(&file)
                .with_context(|| format!("Failed to read audio file {}", file.display()))?;
            let sample = analyze_audio(&bytes);
            println!("{}", serde_json::to_string_pretty(&sample)?);
        }
    }

    Ok(())
}
