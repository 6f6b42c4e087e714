use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use tutor_gateway::{
    AiBackend, ApiServerBuilder, Config, ContextAssembler, GeminiClient, HistoryStore,
    RequestHandler, SubjectGuard,
};

/// Tutor - Homework tutor gateway for math, physics and chemistry
#[derive(Parser)]
#[command(name = "tutor", version, about)]
struct Cli {
    /// Port to listen on (overrides the config file)
    #[arg(long, env = "TUTOR_PORT")]
    port: Option<u16>,

    /// Path to a TOML config file
    #[arg(short, long, env = "TUTOR_CONFIG")]
    config: Option<PathBuf>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Verify the configured API key against the backend
    CheckBackend,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 => "info,tutor_gateway=info",
        1 => "info,tutor_gateway=debug",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = Config::load(cli.config.as_deref()).context("invalid configuration")?;
    if let Some(port) = cli.port {
        config.server.port = port;
    }

    let backend = Arc::new(build_backend(&config)?);

    if let Some(cmd) = cli.command {
        return match cmd {
            Command::CheckBackend => check_backend(backend.as_ref()).await,
        };
    }

    tracing::info!(
        port = config.server.port,
        model = %config.backend.model,
        history_max = config.history.max_entries,
        context_exchanges = config.history.context_exchanges,
        guard = config.guard.enabled,
        "starting tutor gateway"
    );

    let store = Arc::new(HistoryStore::new(config.history.max_entries));
    let assembler = ContextAssembler::new(config.history.context_config(), store.clone());
    let handler = RequestHandler::new(store, assembler, backend, SubjectGuard::new(config.guard));

    let server = ApiServerBuilder::new(handler)
        .port(config.server.port)
        .default_read_limit(config.history.default_read_limit)
        .rate_limit(config.server.rate_limit_per_minute)
        .build();

    tokio::select! {
        result = server.run() => result?,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("shutting down");
        }
    }

    Ok(())
}

fn build_backend(config: &Config) -> anyhow::Result<GeminiClient> {
    let api_key = config
        .backend
        .api_key
        .clone()
        .context("GEMINI_API_KEY is not set")?;

    let client = GeminiClient::new(api_key, config.backend.timeout)?
        .with_model(config.backend.model.clone())
        .with_base_url(config.backend.base_url.clone());
    Ok(client)
}

async fn check_backend(backend: &dyn AiBackend) -> anyhow::Result<()> {
    backend
        .check()
        .await
        .with_context(|| format!("{} rejected the configured API key", backend.name()))?;

    println!("{}: API key accepted", backend.name());
    Ok(())
}
