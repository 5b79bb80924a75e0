//! Application startup and lifecycle management.

use crate::config::{ContractConfig, CredentialStore, ProviderSettings};
use crate::handlers::{
    contract::{create_contract, create_contract_with_provider, panic_response},
    health::health_check,
    metrics::metrics,
};
use crate::services::{ChatClient, ProviderRegistry};
use axum::{
    http::{header, HeaderValue},
    middleware::from_fn,
    routing::{any, get},
    Router,
};
use service_core::error::AppError;
use service_core::middleware::{
    metrics::metrics_middleware,
    security_headers::security_headers_middleware,
    tracing::{request_id_middleware, REQUEST_ID_HEADER},
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

/// Shared application state. Read-only after startup.
#[derive(Clone)]
pub struct AppState {
    pub providers: ProviderRegistry,
    pub credentials: Arc<CredentialStore>,
    pub chat: ChatClient,
}

impl AppState {
    pub fn new(settings: &ProviderSettings, credentials: CredentialStore) -> Result<Self, AppError> {
        Ok(Self {
            providers: ProviderRegistry::from_settings(settings),
            credentials: Arc::new(credentials),
            chat: ChatClient::new(settings)?,
        })
    }
}

/// Build the HTTP router with all routes and layers.
pub fn build_router(state: AppState) -> Router {
    // Every contract response is JSON and must not be cached.
    let contract_routes = Router::new()
        .route("/api/contrato", any(create_contract))
        .route("/api/contrato/:provider", any(create_contract_with_provider))
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ));

    Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(metrics))
        .merge(contract_routes)
        .layer(from_fn(metrics_middleware))
        .layer(from_fn(security_headers_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get(REQUEST_ID_HEADER)
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                    version = ?request.version(),
                )
            }),
        )
        .layer(from_fn(request_id_middleware))
        .with_state(state)
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    router: Router,
}

impl Application {
    /// Build the application with the given configuration.
    pub async fn build(config: ContractConfig) -> Result<Self, AppError> {
        let state = AppState::new(&config.provider, config.credentials.clone())?;

        tracing::info!(
            default_provider = %config.provider.default_provider,
            model_override = config.provider.model_override.as_deref().unwrap_or("-"),
            credentials = ?config.credentials.configured_names(),
            "Initialized provider registry"
        );

        if config.credentials.is_empty() {
            tracing::warn!(
                "No provider API key configured - contract requests will fail until one is set"
            );
        }

        // Port 0 = random port for testing
        let addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind HTTP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("Contract service listening on port {}", port);

        Ok(Self {
            port,
            listener,
            router: build_router(state),
        })
    }

    /// Get the port the server is listening on.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Run the application until a shutdown signal arrives.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
