//! HTTP API server for the relay gateway

pub mod health;
pub mod webhooks;

use std::sync::Arc;

use axum::Router;
use secrecy::SecretString;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::channels::WhatsAppChannel;
use crate::completion::CompletionClient;
use crate::{Config, Result};

/// Shared state for API handlers
pub struct ApiState {
    pub whatsapp: WhatsAppChannel,
    pub completion: CompletionClient,
    /// Shared secret for the subscription handshake
    pub verify_token: SecretString,
    /// Enables `X-Hub-Signature-256` checks when set
    pub app_secret: Option<SecretString>,
    pub max_document_chars: usize,
}

impl ApiState {
    /// Build state and outbound clients from configuration
    ///
    /// # Errors
    ///
    /// Returns error if an HTTP client cannot be built or a channel setting is empty
    pub fn from_config(config: Config) -> Result<Self> {
        let Config {
            whatsapp,
            completion,
            max_document_chars,
            http_timeout,
            ..
        } = config;

        Ok(Self {
            whatsapp: WhatsAppChannel::new(
                whatsapp.access_token,
                whatsapp.phone_number_id,
                whatsapp.api_url,
                http_timeout,
            )?,
            completion: CompletionClient::new(completion, http_timeout)?,
            verify_token: whatsapp.verify_token,
            app_secret: whatsapp.app_secret,
            max_document_chars,
        })
    }
}

/// API server
pub struct ApiServer {
    state: Arc<ApiState>,
    port: u16,
}

impl ApiServer {
    /// Create a server for `state` listening on `port`
    #[must_use]
    pub fn new(state: ApiState, port: u16) -> Self {
        Self {
            state: Arc::new(state),
            port,
        }
    }

    /// Build the router with all routes
    #[must_use]
    pub fn router(&self) -> Router {
        build_router(self.state.clone())
    }

    /// Run the API server until ctrl-c
    ///
    /// # Errors
    ///
    /// Returns error if server fails to bind or run
    pub async fn run(self) -> Result<()> {
        let addr = format!("0.0.0.0:{}", self.port);
        let listener = TcpListener::bind(&addr).await?;

        tracing::info!(port = self.port, model = %self.state.completion.model(), "API server listening");

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("API server stopped");
        Ok(())
    }
}

/// Build the full router around shared state
pub fn build_router(state: Arc<ApiState>) -> Router {
    Router::new()
        .merge(webhooks::router(state.clone()))
        .merge(health::router())
        .merge(health::status_router(state))
        .layer(TraceLayer::new_for_http())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
