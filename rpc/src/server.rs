//! Axum router and server.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use kyc_service::KycService;

use crate::error::RpcError;
use crate::handlers;

/// All routes, mounted under `/v1`.
pub fn router(service: Arc<KycService>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let v1 = Router::new()
        .route(
            "/users/:address",
            get(handlers::get_user)
                .post(handlers::register_user)
                .put(handlers::request_check),
        )
        .route("/users/:address/accept", post(handlers::force_accept))
        .route("/webhooks/onfido", post(handlers::provider_webhook))
        .route("/check", get(handlers::health));

    Router::new()
        .nest("/v1", v1)
        .layer(cors)
        .with_state(service)
}

pub struct RpcServer {
    pub port: u16,
}

impl RpcServer {
    pub fn new(port: u16) -> Self {
        Self { port }
    }

    /// Serve until `shutdown` resolves.
    pub async fn start<F>(&self, service: Arc<KycService>, shutdown: F) -> Result<(), RpcError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = SocketAddr::from(([0, 0, 0, 0], self.port));
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| RpcError::Server(format!("bind {addr}: {e}")))?;
        info!(%addr, "HTTP API listening");

        axum::serve(listener, router(service))
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| RpcError::Server(e.to_string()))
    }
}
