//! HTTP server exposing the token bridge and agent endpoints.

mod extract;
pub mod handlers;
mod response;

use std::sync::Arc;
use std::time::Instant;

use axum::extract::Request;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use uuid::Uuid;

use crate::agents::ProvisioningSettings;
use crate::config::Config;
use crate::provider::{ProviderApi, ProviderClient};
use crate::session::RequestId;
use crate::Result;

pub use response::error_body;

/// Shared, read-only state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub provider: Arc<dyn ProviderApi>,
    pub provisioning: Arc<ProvisioningSettings>,
}

impl AppState {
    pub fn new(config: Config, provider: Arc<dyn ProviderApi>) -> Self {
        let provisioning = ProvisioningSettings::from(&config);
        Self {
            config: Arc::new(config),
            provider,
            provisioning: Arc::new(provisioning),
        }
    }
}

async fn log_request(mut request: Request, next: Next) -> Response {
    let request_id = Uuid::new_v4();
    request.extensions_mut().insert(RequestId(request_id));
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let started = Instant::now();

    let response = next.run(request).await;

    info!(
        request_id = %request_id,
        "{} {} -> {} ({} ms)",
        method,
        path,
        response.status().as_u16(),
        started.elapsed().as_millis()
    );
    response
}

/// Build the application router
pub fn router(state: AppState) -> Router {
    use handlers::*;

    Router::new()
        .route("/token", post(issue_token))
        .route("/users", post(upsert_user).get(get_user))
        .route("/agents", get(list_agents).post(create_agent))
        .route(
            "/agents/:slug",
            get(get_agent).put(update_agent).delete(delete_agent),
        )
        .route("/debug", get(debug))
        .layer(middleware::from_fn(log_request))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Bind and serve until Ctrl+C
pub async fn serve(config: Config) -> Result<()> {
    let provider = ProviderClient::from_config(&config)?;
    let addr = format!("{}:{}", config.bind, config.port);
    let state = AppState::new(config, Arc::new(provider));

    let listener = TcpListener::bind(&addr).await?;
    info!("Listening on http://{}", addr);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown requested");
}
