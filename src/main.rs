use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use relay_gateway::{ApiServer, ApiState, Config};

/// Relay - WhatsApp webhook relay for LLM assistants
#[derive(Parser)]
#[command(name = "relay", version, about)]
struct Cli {
    /// Port to listen on (overrides `PORT`)
    #[arg(long)]
    port: Option<u16>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Validate the environment configuration and exit
    CheckConfig,
    /// Extract text from a local document, as the webhook would
    Extract {
        /// Path to a .txt, .pdf or .docx file
        path: PathBuf,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up logging based on verbosity; RUST_LOG wins when set
    let filter = match cli.verbose {
        0 => "info,relay_gateway=info",
        1 => "info,relay_gateway=debug",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    if let Some(cmd) = cli.command {
        return match cmd {
            Command::CheckConfig => check_config(),
            Command::Extract { path } => extract(path).await,
        };
    }

    let config = Config::from_env()?;
    tracing::debug!(?config, "loaded configuration");

    let port = cli.port.unwrap_or(config.api_server.port);
    tracing::info!(port, model = %config.completion.model, "starting relay gateway");

    let state = ApiState::from_config(config)?;
    ApiServer::new(state, port).run().await?;

    Ok(())
}

/// Load configuration and print a summary without secrets
fn check_config() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    println!("Configuration OK");
    println!("  port:                   {}", config.api_server.port);
    println!("  model:                  {}", config.completion.model);
    println!("  completion API:         {}", config.completion.api_url);
    println!("  graph API:              {}", config.whatsapp.api_url);
    println!("  phone number ID:        {}", config.whatsapp.phone_number_id);
    println!(
        "  signature verification: {}",
        if config.whatsapp.app_secret.is_some() { "on" } else { "off" }
    );
    println!("  max document chars:     {}", config.max_document_chars);
    println!("  HTTP timeout:           {}s", config.http_timeout.as_secs());
    Ok(())
}

/// Print the text extracted from a local file
async fn extract(path: PathBuf) -> anyhow::Result<()> {
    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let data = tokio::fs::read(&path).await?;

    let text = relay_gateway::documents::extract_text_blocking(data, filename).await?;
    println!("{text}");
    Ok(())
}
