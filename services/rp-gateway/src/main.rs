//! OIDC Relying-Party Gateway
//!
//! Single-binary service that mediates the browser Authorization Code +
//! PKCE flow against an external identity provider:
//! 1. `/auth/login` sends the browser to the provider with a PKCE challenge
//! 2. `/auth/callback` exchanges the returned code, fetches claims, and
//!    seals the session into a signed cookie
//! 3. `/auth/logout` and `/auth/logout/sso` tear the session down
//!
//! All cross-request state lives in client-held cookies; the process keeps
//! nothing, so instances scale horizontally with no session store.

mod config;
mod error;
mod metrics;
mod routes;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use oidc_client::{HttpOidcClient, ProviderEndpoints};
use rp_session::{AuthStateCodec, SessionCodec};

use crate::config::Config;
use crate::routes::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing with JSON output and LOG_LEVEL / RUST_LOG support
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_env("LOG_LEVEL")
                .or_else(|_| EnvFilter::try_from_default_env())
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    info!("starting oidc-rp-gateway");

    // Install Prometheus metrics recorder before any metrics are emitted
    let prometheus_handle = metrics::install_recorder();

    // CLI: simple --config flag parsing
    let args: Vec<String> = std::env::args().collect();
    let cli_config_path = args
        .iter()
        .position(|a| a == "--config")
        .and_then(|i| args.get(i + 1))
        .map(|s| s.as_str());

    let config_path = Config::resolve_path(cli_config_path);
    info!(path = %config_path.display(), "loading configuration");

    let config = Config::load(&config_path)
        .with_context(|| format!("failed to load config from {}", config_path.display()))?;

    info!(
        listen_addr = %config.server.listen_addr,
        public_url = %config.server.public_url,
        client_id = %config.provider.client_id,
        authorization_endpoint = %config.provider.authorization_endpoint,
        "configuration loaded"
    );

    // Provider calls get an explicit timeout so a stalled exchange or
    // userinfo fetch surfaces as a step failure rather than a hang
    let http_client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.provider.timeout_secs))
        .build()
        .context("failed to build HTTP client")?;

    let redirect_uri = config.redirect_uri();
    let secure_cookies = config.secure_cookies();

    let endpoints = ProviderEndpoints {
        client_id: config.provider.client_id.clone(),
        client_secret: config.provider.client_secret.clone(),
        authorization_endpoint: config.provider.authorization_endpoint.clone(),
        token_endpoint: config.provider.token_endpoint.clone(),
        userinfo_endpoint: config.provider.userinfo_endpoint.clone(),
        revocation_endpoint: config.provider.revocation_endpoint.clone(),
        end_session_endpoint: config.provider.end_session_endpoint.clone(),
        scopes: config.provider.scopes.clone(),
        redirect_uri,
    };

    let cookie_key = config
        .cookies
        .secret
        .as_ref()
        .context("cookie secret missing after config load")?;

    let app_state = AppState {
        oidc: Arc::new(HttpOidcClient::new(http_client, endpoints)),
        state_codec: AuthStateCodec::new(cookie_key.expose_bytes()),
        session_codec: SessionCodec::new(cookie_key.expose_bytes()),
        state_ttl_secs: config.cookies.state_ttl_secs,
        secure_cookies,
        prometheus: prometheus_handle,
    };

    let app = routes::build_router(app_state);

    let listener = TcpListener::bind(config.server.listen_addr)
        .await
        .with_context(|| format!("failed to bind to {}", config.server.listen_addr))?;

    info!(addr = %config.server.listen_addr, "accepting requests");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("shutdown complete");
    Ok(())
}

/// Wait for SIGTERM or SIGINT for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("received SIGINT, shutting down"),
        _ = terminate => info!("received SIGTERM, shutting down"),
    }
}
