use clap::Parser;
use clap::error::ErrorKind;
use moss_tts::config::Config;
use moss_tts::{MossTts, SynthesisError, reference_from_arg, synthesize_to_file};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::fmt::time::ChronoLocal;

const USAGE: &str = "Usage: moss-tts <text> <output_path> [reference_audio]";

/// Synthesise speech with a MOSS TTS Gradio service.
#[derive(Parser)]
#[command(version)]
struct Cli {
    /// The text to speak
    text: String,
    /// Where to write the audio file
    output_path: PathBuf,
    /// Voice sample to clone: a local file or an http(s) URL
    reference_audio: Option<String>,
}

#[tokio::main]
async fn main() -> ExitCode {
    // --- 1. Parse Command-Line Arguments ---
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => e.exit(),
        Err(_) => {
            eprintln!("ERROR: {USAGE}");
            return ExitCode::FAILURE;
        }
    };

    // --- 2. Load Configuration ---
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("ERROR: {e}");
            return ExitCode::FAILURE;
        }
    };

    // --- 3. Initialize Logging ---
    // stdout is reserved for the result line.
    tracing_subscriber::fmt()
        .with_max_level(config.log_level)
        .with_timer(ChronoLocal::rfc_3339())
        .with_writer(std::io::stderr)
        .init();

    // --- 4. Synthesise ---
    match run(&config, &cli).await {
        Ok(written) => {
            tracing::debug!(written = %written.display(), "Audio saved");
            println!("OK:{}", cli.output_path.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("ERROR: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: &Config, cli: &Cli) -> Result<PathBuf, SynthesisError> {
    let synth = MossTts::connect(&config.service_url).await?;
    let reference = reference_from_arg(cli.reference_audio.as_deref());
    synthesize_to_file(&synth, &cli.text, &cli.output_path, reference).await
}
