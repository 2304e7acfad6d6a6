//! Web server for Filebox.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;

use crate::config::Config;
use crate::file::FileStorage;
use crate::{Database, FileboxError, Result};

use super::handlers::AppState;
use super::router::create_router;

/// HTTP server wrapping the application router.
pub struct WebServer {
    /// Server address.
    addr: SocketAddr,
    /// Application state.
    app_state: Arc<AppState>,
}

impl WebServer {
    /// Create a new web server from prepared state.
    pub fn new(addr: SocketAddr, app_state: AppState) -> Self {
        Self {
            addr,
            app_state: Arc::new(app_state),
        }
    }

    /// Create a web server from configuration, an open database and a storage root.
    pub fn from_config(config: &Config, db: Database, storage: FileStorage) -> Result<Self> {
        let addr = format!("{}:{}", config.server.host, config.server.port)
            .parse()
            .map_err(|e| FileboxError::Config(format!("invalid server address: {e}")))?;

        let app_state = AppState::new(
            db,
            storage,
            &config.auth.jwt_secret,
            config.auth.session_expiry_secs,
        )
        .with_max_upload_size(config.files.max_upload_bytes());

        Ok(Self::new(addr, app_state))
    }

    /// Get the server address.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Run the web server until it fails.
    pub async fn run(self) -> std::result::Result<(), std::io::Error> {
        let router = create_router(self.app_state);

        let listener = TcpListener::bind(self.addr).await?;
        let local_addr = listener.local_addr()?;

        tracing::info!("Web server listening on http://{}", local_addr);

        axum::serve(listener, router).await
    }

    /// Run the server in the background and return the actual bound address.
    ///
    /// This is useful for testing when binding to port 0.
    pub async fn run_with_addr(self) -> std::result::Result<SocketAddr, std::io::Error> {
        let router = create_router(self.app_state);

        let listener = TcpListener::bind(self.addr).await?;
        let local_addr = listener.local_addr()?;

        tracing::info!("Web server listening on http://{}", local_addr);

        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, router).await {
                tracing::error!("Web server error: {}", e);
            }
        });

        Ok(local_addr)
    }
}
