use clap::Parser;
use noor_core::guidance::NoorAi;
use noor_core::request::{HistoryWindow, RequestAssembler};
use noor_server::config::{AppConfig, DEFAULT_BIND_ADDR};
use noor_server::http_server::{self, AppState};
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "noor-server", about = "HTTP server for NoorAI guidance")]
struct Args {
    /// Path to config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Gemini API key
    #[arg(short = 'k', long, env = "GEMINI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Gemini model to use
    #[arg(short = 'o', long)]
    model: Option<String>,

    /// Address the HTTP server listens on
    #[arg(long, default_value = DEFAULT_BIND_ADDR)]
    bind_addr: SocketAddr,

    /// Only send the most recent N turns of history to the model
    #[arg(long)]
    max_history_turns: Option<usize>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("Starting NoorAI server");

    // Parse command line args
    let args = Args::parse();

    let mut config = match AppConfig::load(args.config.as_deref(), args.bind_addr) {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            return Err(anyhow::anyhow!("Configuration error: {}", e));
        }
    };

    // Update config from CLI args
    if let Some(api_key) = args.api_key {
        config.noor.api_key = Some(api_key);
    }
    if let Some(model) = args.model {
        config.noor.model_name = Some(model);
    }
    if let Some(max_turns) = args.max_history_turns {
        config.noor.max_history_turns = Some(max_turns);
    }

    let noor = match NoorAi::from_config(&config.noor) {
        Ok(noor) => noor,
        Err(e) => {
            error!(error = %e, "Failed to initialize NoorAI");
            return Err(anyhow::anyhow!("Failed to initialize NoorAI: {}", e));
        }
    };

    let window = HistoryWindow::from(config.noor.max_history_turns);
    info!(?window, model = config.noor.model_name(), "Configured guidance flow");

    let state = AppState::new(noor, RequestAssembler::new(window));
    http_server::run_server(state, config.bind_addr).await?;

    info!("NoorAI server shutting down");
    Ok(())
}
