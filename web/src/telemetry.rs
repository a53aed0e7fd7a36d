//! Log output and optional OpenTelemetry span export.

use opentelemetry::trace::TracerProvider;
use opentelemetry::KeyValue;
use opentelemetry_otlp::{SpanExporter, WithExportConfig};
use opentelemetry_sdk::trace::{BatchSpanProcessor, SdkTracerProvider};
use opentelemetry_sdk::Resource;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;

/// Flushes pending spans when dropped; hold it until shutdown.
pub struct OtelGuard {
    provider: SdkTracerProvider,
}

impl Drop for OtelGuard {
    fn drop(&mut self) {
        if let Err(e) = self.provider.shutdown() {
            eprintln!("Failed to shut down OTel tracer provider: {e:?}");
        }
    }
}

/// `RUST_LOG` wins; otherwise this crate and tower-http log at `LOG_LEVEL`.
fn env_filter(log_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("vidgrab_web={0},tower_http={0}", log_level))
    })
}

/// Install the global subscriber. Spans are also exported over OTLP when
/// `OTEL_EXPORTER_OTLP_ENDPOINT` is configured.
pub fn init_tracing(config: &Config, service_name: &str) -> Option<OtelGuard> {
    let Some(endpoint) = config.otel_endpoint.as_deref() else {
        tracing_subscriber::registry()
            .with(env_filter(&config.log_level))
            .with(tracing_subscriber::fmt::layer())
            .init();
        return None;
    };

    match tracer_provider(endpoint, service_name, &config.environment) {
        Ok(provider) => {
            let tracer = provider.tracer(service_name.to_owned());
            tracing_subscriber::registry()
                .with(env_filter(&config.log_level))
                .with(tracing_subscriber::fmt::layer())
                .with(tracing_opentelemetry::layer().with_tracer(tracer))
                .init();
            tracing::info!(otel_endpoint = endpoint, service_name, "OpenTelemetry export enabled");
            Some(OtelGuard { provider })
        }
        Err(e) => {
            tracing_subscriber::registry()
                .with(env_filter(&config.log_level))
                .with(tracing_subscriber::fmt::layer())
                .init();
            tracing::warn!("OTLP exporter unavailable, logging to stdout only: {}", e);
            None
        }
    }
}

fn tracer_provider(
    endpoint: &str,
    service_name: &str,
    environment: &str,
) -> Result<SdkTracerProvider, String> {
    let exporter = SpanExporter::builder()
        .with_tonic()
        .with_endpoint(endpoint)
        .build()
        .map_err(|e| e.to_string())?;

    let resource = Resource::builder()
        .with_attributes([
            KeyValue::new("service.name", service_name.to_owned()),
            KeyValue::new("service.version", env!("CARGO_PKG_VERSION")),
            KeyValue::new("deployment.environment", environment.to_owned()),
        ])
        .build();

    Ok(SdkTracerProvider::builder()
        .with_resource(resource)
        .with_span_processor(BatchSpanProcessor::builder(exporter).build())
        .build())
}
