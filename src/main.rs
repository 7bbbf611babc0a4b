use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info};

use stash::{
    AppState, Config, Database, FileStorage, JobQueue, MemoryCache, ProcessingDispatcher,
    SessionStore, WebServer,
};

#[tokio::main]
async fn main() {
    // Load configuration
    let config = match Config::load_with_env("config.toml") {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config.toml: {e}");
            eprintln!("Using default configuration.");
            let mut config = Config::default();
            config.apply_env_overrides();
            config
        }
    };

    // Initialize logging
    if let Err(e) = stash::logging::init(&config.logging) {
        eprintln!("Failed to initialize logging: {e}");
        // Fall back to console-only logging
        stash::logging::init_console_only(&config.logging.level);
    }

    if let Err(e) = run(config).await {
        error!(error = %e, "stash stopped");
        std::process::exit(1);
    }
}

async fn run(config: Config) -> stash::Result<()> {
    config.validate()?;

    info!("stash - file storage service");
    info!(
        "Server configured on {}:{}",
        config.server.host, config.server.port
    );

    let db = Database::open(&config.database.path).await?;
    info!(root = %config.storage.root, "Content storage root");

    let cache = Arc::new(MemoryCache::new());
    let sessions = SessionStore::with_ttl(
        cache.clone(),
        Duration::from_secs(config.session.ttl_secs),
    );
    let storage = FileStorage::new(&config.storage.root);
    let dispatcher = ProcessingDispatcher::new(JobQueue::new(&db));

    let state = AppState::new(db, sessions, storage, dispatcher);
    let server = WebServer::new(&config.server, &config.session, state, cache)?;
    server.run().await?;

    Ok(())
}
