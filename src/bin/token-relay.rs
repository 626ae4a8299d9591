use std::path::Path;

use clap::Parser;
use token_relay::app::Relay;
use token_relay::server;
use token_relay::utils::config_loader;
use token_relay::utils::logging;
use anyhow::Result;
use token_relay::utils::logging::LogLevel;
use tracing::{info, warn};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, env = "CONFIG", default_value = "token-relay.yaml")]
    config: String,
    #[arg(long, env = "LOG_LEVEL" , value_enum)]
    log_level: Option<LogLevel>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // -------------------------------
    // 1. Read args, load YAML config
    // -------------------------------

    let args = Args::parse();
    let config_found = Path::new(&args.config).exists();
    let service_config = config_loader::run(&args.config).await?;
    logging::run(&service_config, args.log_level.to_owned()).await?;
    if !config_found {
        warn!("config file '{}' not found, running with defaults", args.config);
    }

    // -------------------------------
    // 2. Build upstream client, token cache and cache registry
    // -------------------------------

    let relay = Relay::build(&service_config)?;
    info!(
        "upstream: {}, cache ttl: {}s, eviction interval: {}s",
        relay.cache.source().url(),
        service_config.cache.ttl_seconds,
        service_config.eviction.interval_seconds
    );

    // -------------------------------
    // 3. Start eviction sweep worker
    // -------------------------------

    let eviction = relay.spawn_eviction();

    // -------------------------------
    // 4. Start http server, serve until ctrl-c
    // -------------------------------

    let state = relay.app_state().await;
    info!("Service starting...");
    let served = server::server::start(&service_config.settings, state, shutdown_signal()).await;

    eviction.abort();
    info!("Service stopped");
    served
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("failed to listen for ctrl-c: {}", e);
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
