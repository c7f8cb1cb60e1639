use launchpad_profiles::api::{self, ApiState};
use launchpad_profiles::config::Config;
use launchpad_profiles::neynar::NeynarClient;
use launchpad_profiles::profile::{BulkProfileResolver, MemoryProfileCache};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

const CONFIG_FILE: &str = "launchpad.toml";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Load config. A missing API key fails here, before anything starts.
    let config = if Path::new(CONFIG_FILE).exists() {
        Config::load(Path::new(CONFIG_FILE))?
    } else {
        Config::from_env()?
    };

    // Initialize logging
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level));

    if config.logging.json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(env_filter)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .init();
    }

    info!("launchpad-profiles v{} starting", env!("CARGO_PKG_VERSION"));

    let neynar = NeynarClient::new(&config.neynar)?;

    let resolver = BulkProfileResolver::new(
        neynar.clone(),
        Arc::new(MemoryProfileCache::new()),
        &config.resolver,
    );
    info!(
        chunk_size = config.resolver.chunk_size,
        max_concurrent_chunks = config.resolver.max_concurrent_chunks,
        "profile resolver ready"
    );

    let state = ApiState {
        resolver: Arc::new(resolver),
        notifier: Arc::new(neynar),
    };

    api::serve(state, &config.server.bind_addr).await
}
