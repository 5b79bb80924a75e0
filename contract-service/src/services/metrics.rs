//! Metrics collection for contract-service.
//!
//! HTTP-level metrics come from the `metrics` facade (see
//! `service_core::middleware::metrics`); contract outcomes and provider
//! latency are kept in a dedicated Prometheus registry.

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use prometheus::{Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder};
use std::sync::{Once, OnceLock};

pub static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();
pub static PROMETHEUS_REGISTRY: OnceLock<Registry> = OnceLock::new();
pub static CONTRACT_REQUESTS_TOTAL: OnceLock<IntCounterVec> = OnceLock::new();
pub static UPSTREAM_LATENCY_SECONDS: OnceLock<HistogramVec> = OnceLock::new();

static INIT: Once = Once::new();

/// Initialize metrics collection. Later calls are no-ops.
pub fn init_metrics() {
    INIT.call_once(|| {
        match PrometheusBuilder::new().install_recorder() {
            Ok(handle) => {
                let _ = METRICS_HANDLE.set(handle);
            }
            Err(e) => tracing::warn!(error = %e, "Failed to install Prometheus recorder"),
        }

        let registry = Registry::new();

        // Contract outcomes by provider
        let requests = IntCounterVec::new(
            Opts::new(
                "contract_requests_total",
                "Total contract requests by provider and outcome",
            ),
            &["provider", "outcome"],
        )
        .expect("Failed to create contract_requests_total metric");

        // Provider round-trip latency
        let latency = HistogramVec::new(
            HistogramOpts::new(
                "contract_upstream_latency_seconds",
                "Chat completion provider latency in seconds",
            )
            .buckets(vec![0.25, 0.5, 1.0, 2.0, 5.0, 10.0, 20.0, 30.0, 60.0]),
            &["provider"],
        )
        .expect("Failed to create contract_upstream_latency_seconds metric");

        registry
            .register(Box::new(requests.clone()))
            .expect("Failed to register contract_requests_total");
        registry
            .register(Box::new(latency.clone()))
            .expect("Failed to register contract_upstream_latency_seconds");

        let _ = PROMETHEUS_REGISTRY.set(registry);
        let _ = CONTRACT_REQUESTS_TOTAL.set(requests);
        let _ = UPSTREAM_LATENCY_SECONDS.set(latency);

        tracing::info!("Prometheus metrics initialized");
    });
}

/// Get metrics output in Prometheus text format.
pub fn get_metrics() -> String {
    let mut output = METRICS_HANDLE
        .get()
        .map(|handle| handle.render())
        .unwrap_or_else(|| "# Metrics recorder not initialized\n".to_string());

    if let Some(registry) = PROMETHEUS_REGISTRY.get() {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        if let Err(e) = encoder.encode(&registry.gather(), &mut buffer) {
            tracing::error!(error = %e, "Failed to encode metrics");
        }
        output.push_str(&String::from_utf8_lossy(&buffer));
    }

    output
}

/// Record the outcome of one contract request.
pub fn record_contract_request(provider: &str, outcome: &str) {
    if let Some(counter) = CONTRACT_REQUESTS_TOTAL.get() {
        counter.with_label_values(&[provider, outcome]).inc();
    }
}

/// Record one provider round trip.
pub fn record_upstream_latency(provider: &str, duration_secs: f64) {
    if let Some(histogram) = UPSTREAM_LATENCY_SECONDS.get() {
        histogram.with_label_values(&[provider]).observe(duration_secs);
    }
}
