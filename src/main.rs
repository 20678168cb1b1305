use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use insight_vault::api;
use insight_vault::config::AppConfig;
use insight_vault::digest::question_digest;
use insight_vault::document::EncodedDocument;
use insight_vault::genai::{GeminiClient, GenerativeService};
use insight_vault::models::ExtractedQuestion;
use insight_vault::staging::{PushOutcome, StagingList};
use insight_vault::store::{self, VaultStore};
use insight_vault::workflow::{extraction, synthesis, Controller, ExtractionInput};

#[derive(Parser)]
#[command(name = "ivault")]
#[command(about = "Turn exam material into insight blocks and a review vault")]
struct Cli {
    /// Config override file (defaults to config.json in the platform config dir)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API
    Serve {
        /// Port for HTTP API
        #[arg(short, long, default_value = "3000")]
        port: u16,
    },
    /// Extract correctly-answered questions from text or a PDF
    Extract {
        /// Exam text to extract from
        #[arg(short, long, conflicts_with = "file")]
        text: Option<String>,

        /// PDF document to extract from
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
    /// Synthesize insight blocks from a JSON array of extracted questions
    Synthesize {
        /// File holding the questions (as printed by `extract`)
        input: PathBuf,

        /// Skip writing vault records
        #[arg(long)]
        no_persist: bool,
    },
    /// List vault items, most recently mastered first
    Vault,
    /// Print the dedup digest of a question's text
    Digest { text: String },
    /// Print the resolved configuration (secrets omitted)
    Config,
}

/// Initialize tracing with output to stderr (for one-shot commands) or stdout
fn init_tracing(use_stderr: bool) {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG")
            .unwrap_or_else(|_| "insight_vault=debug,tower_http=debug".into()),
    );

    if use_stderr {
        // One-shot commands print JSON on stdout
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

fn build_service(config: &AppConfig) -> Option<Arc<dyn GenerativeService>> {
    match GeminiClient::from_config(&config.genai) {
        Some(client) => Some(Arc::new(client)),
        None => {
            tracing::warn!("GEMINI_API_KEY not set, extraction and synthesis disabled");
            None
        }
    }
}

fn require_service(config: &AppConfig) -> anyhow::Result<Arc<dyn GenerativeService>> {
    build_service(config).context("A generative service API key is required (GEMINI_API_KEY)")
}

fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn serve(config: AppConfig, port: u16) -> anyhow::Result<()> {
    tracing::info!("Starting insight-vault server on port {}", port);

    let service = build_service(&config);
    let store = store::connect(&config.store)?;
    let controller = Arc::new(Controller::new(service, store));

    let app = api::create_router(controller, config.cors_origins.as_deref());

    let listener = tokio::net::TcpListener::bind(format!("127.0.0.1:{}", port)).await?;
    tracing::info!("insight-vault listening on http://127.0.0.1:{}", port);

    axum::serve(listener, app).await?;
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let use_stderr = !matches!(cli.command, None | Some(Commands::Serve { .. }));
    init_tracing(use_stderr);

    let config = AppConfig::load(cli.config.as_deref())?;

    match cli.command {
        Some(Commands::Serve { port }) => serve(config, port).await?,
        None => serve(config, 3000).await?,
        Some(Commands::Extract { text, file }) => {
            let service = require_service(&config)?;
            let document = file
                .map(|path| EncodedDocument::from_path(&path))
                .transpose()?;
            let input = ExtractionInput::resolve(text, document)
                .context("Provide --text or --file")?;

            let questions = extraction::extract_questions(service.as_ref(), &input).await;
            print_json(&questions)?;
        }
        Some(Commands::Synthesize { input, no_persist }) => {
            let service = require_service(&config)?;
            let raw = std::fs::read_to_string(&input)
                .with_context(|| format!("Failed to read {}", input.display()))?;
            let questions: Vec<ExtractedQuestion> = serde_json::from_str(&raw)
                .with_context(|| format!("{} is not a question list", input.display()))?;

            let mut staging = StagingList::new();
            for question in questions {
                if staging.push(question) == PushOutcome::Full {
                    tracing::warn!("Staging list full, ignoring remaining questions");
                    break;
                }
            }

            let store = if no_persist {
                None
            } else {
                store::connect(&config.store)?
            };
            let store_ref: Option<&dyn VaultStore> = store.as_deref();

            match synthesis::synthesize(service.as_ref(), store_ref, staging.items()).await? {
                Some(outcome) => {
                    print_json(&outcome.result)?;
                    if let Some(report) = outcome.persistence {
                        tracing::info!(
                            "Persisted {} of {} vault items",
                            report.written,
                            report.attempted
                        );
                    }
                }
                None => tracing::warn!("Nothing to synthesize"),
            }
        }
        Some(Commands::Vault) => {
            let items = match store::connect(&config.store)? {
                Some(store) => store.list_recent().await?,
                None => Vec::new(),
            };
            print_json(&items)?;
        }
        Some(Commands::Digest { text }) => {
            println!("{}", question_digest(&text));
        }
        Some(Commands::Config) => print_json(&config)?,
    }

    Ok(())
}
