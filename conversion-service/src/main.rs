use conversion_service::config::ConversionConfig;
use conversion_service::services::init_metrics;
use conversion_service::startup::Application;
use service_core::observability::init_tracing;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let config = ConversionConfig::load().map_err(|e| {
        eprintln!("Failed to load configuration: {}", e);
        std::io::Error::other(format!("Configuration error: {}", e))
    })?;

    // Initialize metrics recorder (must be before any metrics are recorded)
    init_metrics();

    let logger = init_tracing(
        "conversion-service",
        &config.common.log_level,
        config.common.otlp_endpoint.as_deref(),
    );

    tracing::info!(
        pandoc = %config.tools.pandoc_path,
        wkhtmltopdf = %config.tools.wkhtmltopdf_path,
        timeout_secs = config.tools.timeout_secs,
        temp_dir = %config.workspace.temp_dir.display(),
        "Starting conversion service"
    );

    let app = Application::build(config, logger).await.map_err(|e| {
        tracing::error!("Failed to build application: {}", e);
        std::io::Error::other(format!("Startup error: {}", e))
    })?;

    app.run_until_stopped().await
}
