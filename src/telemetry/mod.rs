//! Telemetry module
//!
//! Structured logging and Prometheus metrics

mod logging;
mod metrics;

pub use logging::{init_logging, LogFormat};
pub use metrics::{
    incr_counter, record_latency, set_gauge, CounterMetric, GaugeMetric, LatencyMetric,
};

use crate::config::TelemetryConfig;
use metrics_exporter_prometheus::PrometheusBuilder;

/// Guard that cleans up telemetry on drop
pub struct TelemetryGuard {
    _priv: (),
}

/// Initialize all telemetry subsystems
pub fn init_telemetry(config: &TelemetryConfig) -> anyhow::Result<TelemetryGuard> {
    init_logging(&config.log_level, LogFormat::Pretty)?;

    if let Some(ref endpoint) = config.otlp_endpoint {
        tracing::info!(endpoint, "OTLP endpoint configured");
    }

    PrometheusBuilder::new()
        .with_http_listener(([0, 0, 0, 0], config.metrics_port))
        .install()
        .map_err(|e| anyhow::anyhow!("Failed to start metrics exporter: {}", e))?;

    tracing::info!(port = config.metrics_port, "Metrics exporter listening");

    Ok(TelemetryGuard { _priv: () })
}
