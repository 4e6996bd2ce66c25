//! Relay gateway binary
//!
//! Wires the REST bridge transport, the completion client, and the
//! interactive setup into the gateway and runs it until shutdown.

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context as _;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use relay_gateway::{
    BridgeTransport, CompletionClient, Config, Gateway, InteractiveSetup, SessionStore,
};

#[derive(Parser)]
#[command(name = "relay", version, about = "AI conversational relay gateway")]
struct Cli {
    /// Base URL of the chat bridge
    #[arg(long, env = "RELAY_BRIDGE_URL", default_value = "http://localhost:8765")]
    bridge_url: String,

    /// Increase log verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env before anything reads the environment.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "fatal");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = Config::load()?;

    let session_store = SessionStore::new(config.session_path.clone());
    let session = session_store
        .load()
        .with_context(|| format!("reading session at {}", session_store.path().display()))?;
    if session.is_some() {
        tracing::info!(path = %session_store.path().display(), "resuming stored session");
    } else {
        tracing::info!("no stored session, pairing will be required");
    }

    let transport = BridgeTransport::new(cli.bridge_url);
    let events = transport.start(session);

    let completion = CompletionClient::new(config.api_key.clone(), config.model.clone())?;
    tracing::info!(model = completion.model(), "completion client ready");

    let gateway = Gateway::new(
        Arc::new(transport),
        Arc::new(completion),
        session_store,
        Arc::new(InteractiveSetup),
        &config,
    );

    gateway.run(events).await?;
    Ok(())
}

fn init_tracing(verbosity: u8) {
    let default = match verbosity {
        0 => "relay_gateway=info",
        1 => "relay_gateway=debug",
        _ => "relay_gateway=trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}
