//! Process-wide trace and meter providers.
//!
//! Initialized once at startup and shut down once at exit. When a collector
//! endpoint is not configured the provider still runs, without an exporter, so
//! trace ids and counters behave the same in local runs.

use std::sync::Arc;

use anyhow::{Context as _, Result};
use opentelemetry::KeyValue;
use opentelemetry::global;
use opentelemetry::metrics::MeterProvider as _;
use opentelemetry::trace::TracerProvider as _;
use opentelemetry_otlp::WithExportConfig as _;
use opentelemetry_sdk::Resource;
use opentelemetry_sdk::metrics::SdkMeterProvider;
use opentelemetry_sdk::runtime;
use opentelemetry_sdk::trace::{self as sdktrace, Sampler, Tracer as SdkTracer};

use crate::config::ValidatedSettings;

use super::{CommandMetrics, CommandTracer, OtelCommandMetrics, OtelCommandTracer};

/// Instrumentation scope of the command tracer.
pub const TRACER_NAME: &str = "kbot_tracer";
/// Instrumentation scope of the command counters.
pub const METER_NAME: &str = "kbot_command";

const TRACE_SERVICE_NAME: &str = "kbot-trace-service";

/// Holder of the global providers for the lifetime of the process.
pub struct Telemetry {
    tracer: SdkTracer,
    meter_provider: SdkMeterProvider,
    traces_exported: bool,
    metrics_exported: bool,
}

/// Build the trace and meter providers and register them globally.
///
/// Must be called from inside a Tokio runtime: the batch span processor and the
/// periodic metric reader run on it.
pub fn init_telemetry(settings: &ValidatedSettings, service_version: &str) -> Result<Telemetry> {
    let tracer = init_traces(settings.traces_endpoint.as_deref(), service_version)?;
    let meter_provider = init_metrics(
        settings.metrics_endpoint.as_deref(),
        settings.metrics_interval,
        service_version,
    )?;
    global::set_meter_provider(meter_provider.clone());

    Ok(Telemetry {
        tracer,
        meter_provider,
        traces_exported: settings.traces_endpoint.is_some(),
        metrics_exported: settings.metrics_endpoint.is_some(),
    })
}

fn init_traces(endpoint: Option<&str>, service_version: &str) -> Result<SdkTracer> {
    let resource = Resource::new(vec![
        KeyValue::new("service.name", TRACE_SERVICE_NAME),
        KeyValue::new("service.version", service_version.to_string()),
    ]);
    let trace_config = sdktrace::Config::default()
        .with_sampler(Sampler::AlwaysOn)
        .with_resource(resource);

    let Some(endpoint) = endpoint else {
        let provider = sdktrace::TracerProvider::builder()
            .with_config(trace_config)
            .build();
        let tracer = provider.tracer(TRACER_NAME);
        global::set_tracer_provider(provider);
        return Ok(tracer);
    };

    // `install_batch` registers the provider globally and hands back its tracer.
    opentelemetry_otlp::new_pipeline()
        .tracing()
        .with_exporter(
            opentelemetry_otlp::new_exporter()
                .tonic()
                .with_endpoint(endpoint),
        )
        .with_trace_config(trace_config)
        .install_batch(runtime::Tokio)
        .with_context(|| format!("failed to create trace exporter for {endpoint}"))
}

fn init_metrics(
    endpoint: Option<&str>,
    interval: std::time::Duration,
    service_version: &str,
) -> Result<SdkMeterProvider> {
    let resource = Resource::new(vec![KeyValue::new(
        "service.name",
        format!("kbot_{service_version}"),
    )]);

    let Some(endpoint) = endpoint else {
        return Ok(SdkMeterProvider::builder().with_resource(resource).build());
    };

    opentelemetry_otlp::new_pipeline()
        .metrics(runtime::Tokio)
        .with_exporter(
            opentelemetry_otlp::new_exporter()
                .tonic()
                .with_endpoint(endpoint),
        )
        .with_resource(resource)
        .with_period(interval)
        .build()
        .with_context(|| format!("failed to create metric exporter for {endpoint}"))
}

impl Telemetry {
    pub fn tracer(&self) -> SdkTracer {
        self.tracer.clone()
    }

    pub fn command_tracer(&self) -> Arc<dyn CommandTracer> {
        Arc::new(OtelCommandTracer::new(self.tracer.clone()))
    }

    pub fn command_metrics(&self) -> Arc<dyn CommandMetrics> {
        Arc::new(OtelCommandMetrics::new(
            self.meter_provider.meter(METER_NAME),
        ))
    }

    pub fn traces_exported(&self) -> bool {
        self.traces_exported
    }

    pub fn metrics_exported(&self) -> bool {
        self.metrics_exported
    }

    /// Flush pending spans and metrics.
    pub fn shutdown(self) {
        if let Err(error) = self.meter_provider.shutdown() {
            tracing::warn!(error = %error, "metric provider shutdown failed");
        }
        global::shutdown_tracer_provider();
    }
}
