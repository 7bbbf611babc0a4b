//! Web server for stash.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use tokio::net::TcpListener;

use crate::cache::MemoryCache;
use crate::config::{ServerConfig, SessionConfig};
use crate::{Result, StashError};

use super::handlers::AppState;
use super::router::{create_health_router, create_router};

/// HTTP server for the file API.
pub struct WebServer {
    /// Server address.
    addr: SocketAddr,
    /// Application state.
    app_state: Arc<AppState>,
    /// Session cache to purge periodically.
    cache: Arc<MemoryCache>,
    /// Seconds between purges.
    purge_interval: Duration,
    /// Allowed CORS origins.
    cors_origins: Vec<String>,
}

impl WebServer {
    /// Create a new web server.
    pub fn new(
        server: &ServerConfig,
        session: &SessionConfig,
        app_state: AppState,
        cache: Arc<MemoryCache>,
    ) -> Result<Self> {
        let addr = format!("{}:{}", server.host, server.port)
            .parse()
            .map_err(|e| {
                StashError::Config(format!(
                    "invalid listen address {}:{}: {e}",
                    server.host, server.port
                ))
            })?;

        Ok(Self {
            addr,
            app_state: Arc::new(app_state),
            cache,
            purge_interval: Duration::from_secs(session.purge_interval_secs),
            cors_origins: server.cors_origins.clone(),
        })
    }

    /// Get the server address.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    fn router(&self) -> Router {
        create_router(self.app_state.clone(), &self.cors_origins).merge(create_health_router())
    }

    /// Start the expired-session purge task.
    fn start_session_purge_task(cache: Arc<MemoryCache>, every: Duration) {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(every);

            // Skip the first immediate tick
            interval.tick().await;

            loop {
                interval.tick().await;

                match cache.purge_expired() {
                    Ok(0) => tracing::debug!("No expired sessions to purge"),
                    Ok(count) => tracing::info!(purged = count, "Purged expired sessions"),
                    Err(e) => tracing::warn!(error = %e, "Failed to purge expired sessions"),
                }
            }
        });
    }

    async fn bind(&self) -> std::io::Result<(TcpListener, SocketAddr)> {
        let listener = TcpListener::bind(self.addr).await?;
        let local_addr = listener.local_addr()?;

        Self::start_session_purge_task(self.cache.clone(), self.purge_interval);
        tracing::info!(every_secs = self.purge_interval.as_secs(), "Session purge task started");
        tracing::info!("Web server listening on http://{}", local_addr);

        Ok((listener, local_addr))
    }

    /// Run the web server until it fails.
    pub async fn run(self) -> std::io::Result<()> {
        let (listener, _) = self.bind().await?;
        axum::serve(listener, self.router()).await
    }

    /// Run the server in the background and return the actual bound address.
    ///
    /// This is useful for testing when binding to port 0.
    pub async fn run_with_addr(self) -> std::io::Result<SocketAddr> {
        let (listener, local_addr) = self.bind().await?;
        let router = self.router();

        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, router).await {
                tracing::error!("Web server error: {}", e);
            }
        });

        Ok(local_addr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::SessionStore;
    use crate::file::FileStorage;
    use crate::queue::{JobQueue, ProcessingDispatcher};
    use crate::Database;

    async fn create_test_server(host: &str) -> Result<WebServer> {
        let db = Database::open_in_memory().await.unwrap();
        let cache = Arc::new(MemoryCache::new());
        let state = AppState::new(
            db.clone(),
            SessionStore::new(cache.clone()),
            FileStorage::new(std::env::temp_dir().join("stash-server-test")),
            ProcessingDispatcher::new(JobQueue::new(&db)),
        );
        let server = ServerConfig {
            host: host.to_string(),
            port: 0,
            cors_origins: vec![],
        };
        WebServer::new(&server, &SessionConfig::default(), state, cache)
    }

    #[tokio::test]
    async fn test_web_server_new() {
        let server = create_test_server("127.0.0.1").await.unwrap();
        assert_eq!(server.addr().ip().to_string(), "127.0.0.1");
    }

    #[tokio::test]
    async fn test_web_server_invalid_host() {
        assert!(matches!(
            create_test_server("not a host").await,
            Err(StashError::Config(_))
        ));
    }

    #[tokio::test]
    async fn test_web_server_run() {
        let server = create_test_server("127.0.0.1").await.unwrap();
        let addr = server.run_with_addr().await.unwrap();
        assert_ne!(addr.port(), 0);
    }
}
