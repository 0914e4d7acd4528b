mod display;
mod input;
mod report;

use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::{ArgAction, Parser, Subcommand};
use participa_client::{ApiClient, ApiError, ClientConfig};
use participa_core::BatchSummary;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "participa",
    version,
    about = "Classify citizen requests for personal data (LGPD) with the Participa DF detection service"
)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug). RUST_LOG takes precedence.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Print machine-readable JSON instead of formatted text.
    #[arg(long, global = true)]
    json: bool,

    /// Per-attempt request timeout in seconds.
    #[arg(long, env = "PARTICIPA_TIMEOUT_SECS", default_value_t = 15, global = true)]
    timeout_secs: u64,

    /// Automatic retries per request on transient failures.
    #[arg(long, env = "PARTICIPA_MAX_RETRIES", default_value_t = 1, global = true)]
    max_retries: u32,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Analyze a single text.
    Analyze {
        /// Text to analyze.
        #[arg(required_unless_present = "file")]
        text: Option<String>,
        /// Read the text from a file instead.
        #[arg(long, conflicts_with = "text")]
        file: Option<PathBuf>,
    },
    /// Analyze every request in a file, one at a time.
    Batch {
        /// JSON array, JSON Lines, or plain text (one request per line).
        input: PathBuf,
        /// Write a JSON report here.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Show which endpoint is in use and whether it answers.
    Status,
    /// Submit human validation of an analysis (FeedbackRequest JSON file).
    Feedback { file: PathBuf },
    /// Show the model calibration status.
    Training,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    tracing::debug!("participa v{}", env!("CARGO_PKG_VERSION"));

    let mut config = ClientConfig {
        request_timeout: Duration::from_secs(cli.timeout_secs),
        ..ClientConfig::default()
    };
    config.retry.max_retries = cli.max_retries;
    let client = ApiClient::connect(config).context("building HTTP client")?;

    match cli.command {
        Command::Analyze { text, file } => {
            let text = match (text, file) {
                (Some(text), _) => text,
                (None, Some(path)) => std::fs::read_to_string(&path)
                    .with_context(|| format!("reading {}", path.display()))?,
                (None, None) => anyhow::bail!("nothing to analyze"),
            };
            let result = client.analyze(text.trim()).await.map_err(user_error)?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                display::print_analysis_card(&result);
            }
        }
        Command::Batch { input, output } => {
            let items = input::load_requests(&input)?;
            eprintln!("  Loaded {} requests from {}", items.len(), input.display());

            let results = client
                .analyze_batch(&items, |current, total| {
                    eprint!(
                        "\r  Analyzed {current}/{total} ({:.1}%)",
                        current as f64 / total as f64 * 100.0
                    );
                    let _ = std::io::stderr().flush();
                })
                .await;
            eprintln!();

            let summary = BatchSummary::from_results(&results);
            if let Some(path) = output {
                let endpoint = client.resolve_endpoint().await;
                report::BatchReport::new(endpoint, &summary, &results).write(&path)?;
                eprintln!("  Report written to {}", path.display());
            }
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&results)?);
            } else {
                display::print_batch_table(&results);
                display::print_batch_summary(&summary);
            }
        }
        Command::Status => {
            let status = client.probe_connection().await;
            let endpoint = client.resolve_endpoint().await;
            if cli.json {
                let value = serde_json::json!({
                    "online": client_online(status),
                    "status": status.label(),
                    "endpoint": endpoint.base_url,
                    "target": endpoint.target.as_str(),
                });
                println!("{}", serde_json::to_string_pretty(&value)?);
            } else {
                display::print_connection(endpoint, status);
            }
        }
        Command::Feedback { file } => {
            let content = std::fs::read_to_string(&file)
                .with_context(|| format!("reading {}", file.display()))?;
            let request = input::parse_feedback(&content).context("parsing feedback request")?;
            request.validate()?;
            let response = client.submit_feedback(&request).await.map_err(user_error)?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&response)?);
            } else {
                println!(
                    "Feedback enviado! Acurácia atual: {}",
                    participa_core::format_confidence(response.stats.accuracy)
                );
            }
        }
        Command::Training => {
            let status = client.training_status().await.map_err(user_error)?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&status)?);
            } else {
                display::print_training_status(&status);
            }
        }
    }

    Ok(())
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Staff see only the fixed message for the failure kind; the detail goes to the log.
fn user_error(err: ApiError) -> anyhow::Error {
    tracing::warn!(kind = %err.kind, message = %err.message, "request failed");
    anyhow::anyhow!(err.user_message())
}

fn client_online(status: participa_client::ConnectionStatus) -> bool {
    status == participa_client::ConnectionStatus::Online
}
