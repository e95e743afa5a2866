//! Campaign Analyst - Entry Point
//!
//! Runs the web server, or a single analysis from the command line.

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use campaign_analyst::export::DirectorySink;
use campaign_analyst::models::{AnalysisRequest, AnalysisType};
use campaign_analyst::preferences::PreferenceStore;
use campaign_analyst::render::{View, render_html, render_markdown};
use campaign_analyst::server::AnalystServer;
use campaign_analyst::theme::ThemeState;
use campaign_analyst::{AnalysisService, Config, ExportError, Exporter};

#[derive(Parser, Debug)]
#[command(name = "campaign-analyst")]
#[command(about = "AI marketing campaign analysis with PDF export")]
#[command(version)]
struct Cli {
    /// Gemini API key
    #[arg(long, global = true, env = "GEMINI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Gemini model identifier
    #[arg(long, global = true, env = "GEMINI_MODEL")]
    model: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "info", env = "RUST_LOG")]
    log_level: String,

    /// Output logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the web interface and JSON API
    Serve {
        /// Address to bind
        #[arg(long, default_value = "127.0.0.1", env = "HOST")]
        host: std::net::IpAddr,

        /// Port to listen on
        #[arg(long, default_value = "8000", env = "PORT")]
        port: u16,
    },
    /// Run one analysis and print it
    Analyze {
        /// Analysis type, e.g. performance-analysis or BIDDING_STRATEGIES
        #[arg(long = "type", default_value = "PERFORMANCE_ANALYSIS")]
        analysis_type: AnalysisType,

        /// Campaign context
        #[arg(long, conflicts_with = "context_file", required_unless_present = "context_file")]
        context: Option<String>,

        /// Read the campaign context from a file
        #[arg(long)]
        context_file: Option<PathBuf>,

        /// Also export a PDF into this directory (EXPORT_DIR when no value is given)
        #[arg(long, num_args = 0..=1)]
        pdf_dir: Option<Option<PathBuf>>,

        /// Output format
        #[arg(long, default_value = "markdown")]
        format: OutputFormat,
    },
}

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
enum OutputFormat {
    /// Normalized markdown
    #[default]
    Markdown,
    /// HTML fragment
    Html,
}

fn init_tracing(log_level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    let subscriber = tracing_subscriber::registry().with(filter);

    // Logs go to stderr so analysis output on stdout stays clean.
    if json {
        subscriber.with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr)).init();
    } else {
        subscriber.with(tracing_subscriber::fmt::layer().compact().with_writer(std::io::stderr)).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    init_tracing(&cli.log_level, cli.json_logs);

    let mut config = Config::from_env()?;
    if let Some(key) = cli.api_key.filter(|k| !k.trim().is_empty()) {
        config.api_key = Some(key);
    }
    if let Some(model) = cli.model {
        config.model = model;
    }

    tracing::info!(version = env!("CARGO_PKG_VERSION"), model = %config.model, "Starting campaign analyst");

    match cli.command {
        Command::Serve { host, port } => {
            let server = AnalystServer::new(config).await?;
            server.run_http(SocketAddr::new(host, port)).await?;
        }
        Command::Analyze { analysis_type, context, context_file, pdf_dir, format } => {
            let context = match (context, context_file) {
                (Some(text), _) => text,
                (None, Some(path)) => tokio::fs::read_to_string(&path)
                    .await
                    .with_context(|| format!("Failed to read context file {}", path.display()))?,
                (None, None) => anyhow::bail!("Either --context or --context-file is required"),
            };
            let pdf_dir = pdf_dir.map(|dir| dir.unwrap_or_else(|| config.export_dir.clone()));
            run_analysis(config, analysis_type, context, pdf_dir, format).await?;
        }
    }

    Ok(())
}

async fn run_analysis(
    config: Config,
    analysis_type: AnalysisType,
    context: String,
    pdf_dir: Option<PathBuf>,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let exporter = match pdf_dir {
        Some(_) => Some(Exporter::from_config(&config)?),
        None => None,
    };
    let preferences = PreferenceStore::load(&config.preferences_path).await;
    let service = AnalysisService::new(config);

    let report = match service.run(AnalysisRequest { analysis_type, context }).await {
        Ok(report) => report,
        Err(err) => {
            tracing::error!(error = %err, "Analysis failed");
            anyhow::bail!(err.to_user_message());
        }
    };

    let view = View::from_cards(&report.cards);
    match format {
        OutputFormat::Markdown => print!("{}", render_markdown(&view)),
        OutputFormat::Html => print!("{}", render_html(&view)),
    }

    if let (Some(exporter), Some(dir)) = (exporter, pdf_dir) {
        let theme = ThemeState::new(preferences.get().await.theme);
        match exporter.export(&view, &theme, &DirectorySink::new(dir)).await {
            Ok(saved) => {
                if let Some(path) = saved.path {
                    eprintln!("Saved {}", path.display());
                }
            }
            Err(ExportError::BrandMarkUnavailable { reason, fallback }) => {
                if let Some(path) = fallback {
                    eprintln!("Saved fallback {}", path.display());
                }
                anyhow::bail!("Failed to load logo for PDF: {reason}");
            }
            Err(err) => return Err(err.into()),
        }
    }

    Ok(())
}
