use std::sync::OnceLock;

use opentelemetry::global;
use opentelemetry::trace::TracerProvider as _;
use opentelemetry_sdk::trace::SdkTracerProvider;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Registry};

const TRACER_NAME: &str = "dashboard-server";

fn init_tracer(level: &str) {
    // Spans are exported to stdout
    let sdk_provider = SdkTracerProvider::builder()
        .with_simple_exporter(opentelemetry_stdout::SpanExporter::default())
        .build();

    let tracer = sdk_provider.tracer(TRACER_NAME);
    global::set_tracer_provider(sdk_provider);

    let telemetry = tracing_opentelemetry::layer()
        .with_tracer(tracer);

    let result = Registry::default()
        .with(EnvFilter::new(level))
        .with(tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_thread_ids(true)
        )
        .with(telemetry)
        .try_init();

    if let Err(e) = result {
        eprintln!("Failed to install tracing subscriber: {}", e);
    }
}

/// Installs the global subscriber; later calls are no-ops.
pub fn init(level: &str) {
    static INITIALIZED: OnceLock<()> = OnceLock::new();

    INITIALIZED.get_or_init(|| init_tracer(level));
}
