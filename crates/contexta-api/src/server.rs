//! HTTP listener lifecycle.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use thiserror::Error;
use tokio::net::TcpListener;
use tracing::info;

use crate::http::routes::create_router;
use crate::state::AppState;

#[derive(Debug, Error)]
pub enum ServeError {
    #[error("Invalid listen address '{addr}': {source}")]
    InvalidAddress {
        addr: String,
        source: std::net::AddrParseError,
    },

    #[error("Server I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Listen address.
#[derive(Debug, Clone)]
pub struct InterfaceConfig {
    pub host: String,
    pub port: u16,
}

impl InterfaceConfig {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, ServeError> {
        let addr = format!("{}:{}", self.host, self.port);
        addr.parse()
            .map_err(|source| ServeError::InvalidAddress { addr, source })
    }
}

impl Default for InterfaceConfig {
    fn default() -> Self {
        Self::new("127.0.0.1", 8002)
    }
}

pub struct InterfaceServer {
    config: InterfaceConfig,
    state: Arc<AppState>,
}

impl InterfaceServer {
    pub fn new(config: InterfaceConfig, state: Arc<AppState>) -> Self {
        Self { config, state }
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.config.host, self.config.port)
    }

    pub async fn bind(&self) -> Result<TcpListener, ServeError> {
        Ok(TcpListener::bind(self.config.socket_addr()?).await?)
    }

    /// Serve on an already bound listener until `shutdown` resolves.
    /// In-flight queries finish before this returns.
    pub async fn serve<F>(&self, listener: TcpListener, shutdown: F) -> Result<(), ServeError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        info!(addr = %listener.local_addr()?, "Query API listening");
        axum::serve(listener, create_router(self.state.clone()))
            .with_graceful_shutdown(shutdown)
            .await?;
        Ok(())
    }

    pub async fn run_until<F>(&self, shutdown: F) -> Result<(), ServeError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let listener = self.bind().await?;
        self.serve(listener, shutdown).await
    }
}

#[cfg(test)]
#[path = "server_tests.rs"]
mod tests;
