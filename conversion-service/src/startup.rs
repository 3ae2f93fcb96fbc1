use crate::config::ConversionConfig;
use crate::handlers;
use crate::pipeline::ConversionPipeline;
use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use service_core::error::AppError;
use service_core::middleware::{
    metrics_middleware, request_id_middleware, security_headers_middleware,
};
use std::future::IntoFuture;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::trace::TraceLayer;
use tracing::Dispatch;

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<ConversionPipeline>,
    /// Logger each job runs under.
    pub logger: Dispatch,
}

pub fn build_router(state: AppState, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/metrics", get(handlers::metrics_endpoint))
        .route(
            "/convert",
            post(handlers::convert_document).layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
        .fallback(handlers::not_found)
        .layer(middleware::from_fn(metrics_middleware))
        .layer(middleware::from_fn(security_headers_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(request_id_middleware))
        .with_state(state)
}

pub struct Application {
    port: u16,
    server: Box<dyn std::future::Future<Output = std::io::Result<()>> + Send + Unpin>,
}

impl Application {
    /// Build the service with the pandoc/wkhtmltopdf pipeline from `config`.
    pub async fn build(config: ConversionConfig, logger: Dispatch) -> Result<Self, AppError> {
        tokio::fs::create_dir_all(&config.workspace.temp_dir)
            .await
            .map_err(|e| {
                tracing::error!(
                    "Failed to prepare temp directory {}: {}",
                    config.workspace.temp_dir.display(),
                    e
                );
                AppError::from(e)
            })?;

        let pipeline = ConversionPipeline::from_config(&config);
        Self::build_with_pipeline(config, pipeline, logger).await
    }

    pub async fn build_with_pipeline(
        config: ConversionConfig,
        pipeline: ConversionPipeline,
        logger: Dispatch,
    ) -> Result<Self, AppError> {
        let state = AppState {
            pipeline: Arc::new(pipeline),
            logger,
        };

        let app = build_router(state, config.max_upload_bytes);

        let addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind TCP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("Listening on {}", port);

        let server = axum::serve(listener, app).with_graceful_shutdown(shutdown_signal());

        Ok(Self {
            port,
            server: Box::new(server.into_future()),
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        self.server.await
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
            Ok(mut sig) => {
                sig.recv().await;
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
