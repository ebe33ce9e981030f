//! API module for the sports classifier
//!
//! Exposes per-session taxonomies and classify actions over HTTP.

use anyhow::Result;
use std::sync::Arc;
use tracing::info;

use crate::config::ApiConfig;
use crate::controller::DynController;

pub mod handlers;
pub mod models;
pub mod server;

pub use handlers::SessionManager;

/// API Server for handling REST requests
pub struct ApiServer {
    controller: Arc<DynController>,
    sessions: Arc<SessionManager>,
    port: u16,
}

impl ApiServer {
    /// Create a new API server
    pub fn new(controller: Arc<DynController>, config: &ApiConfig, port: u16) -> Self {
        Self {
            controller,
            sessions: Arc::new(SessionManager::from_config(config)),
            port,
        }
    }

    /// Start the API server
    pub async fn start(self) -> Result<()> {
        info!("🚀 Starting API server on port {}", self.port);
        server::start_http_server(self.controller, self.sessions, self.port).await
    }
}
