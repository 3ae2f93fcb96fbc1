use opentelemetry::KeyValue;
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::{Resource, runtime, trace as sdktrace};
use tracing::Dispatch;
use tracing_subscriber::layer::SubscriberExt;

/// Build the service's structured logger.
///
/// Events are written as flattened JSON with file and line. When an OTLP
/// endpoint is given, spans are also exported through OpenTelemetry; if the
/// exporter cannot be built the service keeps logging locally.
///
/// The returned dispatcher is not installed anywhere. Callers decide whether
/// it becomes the global default (see [`init_tracing`]) or is scoped to a
/// future with `tracing::instrument::WithSubscriber`.
pub fn build_dispatch(service_name: &str, log_level: &str, otlp_endpoint: Option<&str>) -> Dispatch {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));

    let telemetry = otlp_endpoint
        .and_then(|endpoint| otlp_tracer(service_name, endpoint))
        .map(|tracer| tracing_opentelemetry::layer().with_tracer(tracer));

    let subscriber = tracing_subscriber::registry()
        .with(env_filter)
        .with(telemetry)
        .with(
            tracing_subscriber::fmt::layer()
                .with_file(true)
                .with_line_number(true)
                .json()
                .flatten_event(true),
        );

    Dispatch::new(subscriber)
}

/// Build the logger and install it as the process-wide default.
///
/// Returns the same dispatcher so it can be handed to components that scope
/// their own work to it.
pub fn init_tracing(service_name: &str, log_level: &str, otlp_endpoint: Option<&str>) -> Dispatch {
    let dispatch = build_dispatch(service_name, log_level, otlp_endpoint);

    if let Err(e) = tracing::dispatcher::set_global_default(dispatch.clone()) {
        eprintln!(
            "Global subscriber already set for service '{}': {}",
            service_name, e
        );
    }

    dispatch
}

fn otlp_tracer(service_name: &str, endpoint: &str) -> Option<sdktrace::Tracer> {
    let otlp_exporter = opentelemetry_otlp::new_exporter()
        .tonic()
        .with_endpoint(endpoint);

    match opentelemetry_otlp::new_pipeline()
        .tracing()
        .with_exporter(otlp_exporter)
        .with_trace_config(sdktrace::config().with_resource(Resource::new(vec![
            KeyValue::new("service.name", service_name.to_string()),
        ])))
        .install_batch(runtime::Tokio)
    {
        Ok(tracer) => Some(tracer),
        Err(e) => {
            eprintln!(
                "Failed to initialize OTLP tracer for service '{}' at endpoint '{}': {}",
                service_name, endpoint, e
            );
            None
        }
    }
}
