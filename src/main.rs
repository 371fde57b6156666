use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, Level};
use tracing_subscriber::{EnvFilter, FmtSubscriber};
use uuid::Uuid;

use markwise::io::{format_outcome, format_preview};
use markwise::{
    build_client, extract_text, DocumentKind, GradingPipeline, GradingReport, LlmConfig,
    PreviewConfig, Provider, ReportMetadata,
};

#[derive(Parser)]
#[command(name = "markwise")]
#[command(author, version, about = "Assignment grading with staged LLM prompts", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract and show the text of an assignment without grading it
    Preview {
        /// Assignment file (PDF or DOCX)
        #[arg(short, long)]
        input: PathBuf,

        /// Maximum characters to show
        #[arg(long, default_value = "3000")]
        max_chars: usize,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Grade an assignment: read, score, give feedback, justify
    Grade {
        /// Assignment file (PDF or DOCX)
        #[arg(short, long)]
        input: PathBuf,

        /// Model provider
        #[arg(long, value_enum, default_value_t = Provider::Gemini)]
        provider: Provider,

        /// Model name (defaults to the provider's default model)
        #[arg(long)]
        model: Option<String>,

        /// Per-request timeout in seconds (no timeout by default)
        #[arg(long)]
        timeout_secs: Option<u64>,

        /// Print only the result, as JSON, instead of the preview and key-value view
        #[arg(long)]
        json: bool,

        /// Write a JSON report (result plus run metadata) to this file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Skip printing the extracted text before grading
        #[arg(long)]
        no_preview: bool,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Preview {
            input,
            max_chars,
            verbose,
        } => {
            setup_logging(verbose);
            preview_assignment(&input, max_chars)
        }
        Commands::Grade {
            input,
            provider,
            model,
            timeout_secs,
            json,
            output,
            no_preview,
            verbose,
        } => {
            setup_logging(verbose);
            grade_assignment(
                &input,
                provider,
                model,
                timeout_secs,
                json,
                output.as_deref(),
                no_preview,
            )
            .await
        }
    }
}

/// RUST_LOG takes precedence over `--verbose` when set
fn setup_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_log_filter(verbose)));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber).ok();
}

fn default_log_filter(verbose: bool) -> String {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    level.as_str().to_lowercase()
}

/// The preview goes to stdout, so it is skipped when stdout carries JSON
fn shows_preview(no_preview: bool, json: bool) -> bool {
    !no_preview && !json
}

fn preview_assignment(input: &Path, max_chars: usize) -> Result<ExitCode> {
    let text = extract_text(input).context("Failed to extract assignment text")?;

    let config = PreviewConfig {
        max_chars,
        ..Default::default()
    };
    print_preview(&text, &config);

    Ok(ExitCode::SUCCESS)
}

async fn grade_assignment(
    input: &Path,
    provider: Provider,
    model: Option<String>,
    timeout_secs: Option<u64>,
    json: bool,
    output: Option<&Path>,
    no_preview: bool,
) -> Result<ExitCode> {
    // Reject unsupported files before asking for credentials
    let kind = DocumentKind::from_path(input)?;
    let text = extract_text(input).context("Failed to extract assignment text")?;

    if shows_preview(no_preview, json) {
        print_preview(&text, &PreviewConfig::default());
    }

    let mut llm_config = LlmConfig::from_env(provider)?;
    if let Some(model) = model {
        llm_config = llm_config.with_model(model);
    }
    if let Some(secs) = timeout_secs {
        llm_config = llm_config.with_timeout(Duration::from_secs(secs));
    }
    let model_name = llm_config.model.clone();
    let client = build_client(llm_config)?;

    let run_id = Uuid::new_v4();
    info!("Grading {:?} with {} ({})", input, provider, model_name);
    let outcome = GradingPipeline::new(client.as_ref()).run(run_id, &text).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        println!("Grading Result");
        println!("==============");
        print!("{}", format_outcome(&outcome, 80));
    }

    if let Some(path) = output {
        let report = GradingReport {
            result: outcome.clone(),
            metadata: ReportMetadata {
                run_id: run_id.to_string(),
                source_file: input.display().to_string(),
                document_kind: kind.to_string(),
                extracted_chars: text.chars().count(),
                provider: provider.to_string(),
                model: model_name,
                graded_at: chrono::Utc::now().to_rfc3339(),
            },
        };
        report.write_json(path)?;
        info!("Report written to {:?}", path);
    }

    if outcome.is_graded() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}

fn print_preview(text: &str, config: &PreviewConfig) {
    println!("Extracted Text");
    println!("==============");
    println!("{}", format_preview(text, config));
    println!();
}
