// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

static PROM_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Initialize telemetry (logs + metrics)
pub fn init_telemetry() {
    // 1. Initialize Tracing (Logs)
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "zkarcade_client=info,zkarcade_cli=info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // 2. Initialize Metrics (Prometheus)
    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            if PROM_HANDLE.set(handle).is_err() {
                tracing::warn!("Prometheus handle already set. Telemetry re-initialized?");
            }
        }
        Err(e) => {
            tracing::warn!("Metrics recorder not installed: {}", e);
            return;
        }
    }

    metrics::describe_counter!("zkarcade_phase_completed_total", "Account steps that completed, by phase");
    metrics::describe_counter!("zkarcade_phase_failed_total", "Account steps that failed, by phase");
    metrics::describe_histogram!("zkarcade_phase_duration_seconds", "Time spent in one account step, by phase");
    metrics::describe_counter!("zkarcade_batcher_queries_total", "Batcher WebSocket queries, by kind and outcome");
    metrics::describe_counter!("zkarcade_proofs_generated_total", "Proofs produced by the worker pool");
}

/// Prometheus text for everything recorded so far.
pub fn render_metrics() -> String {
    if let Some(handle) = PROM_HANDLE.get() {
        handle.render()
    } else {
        "# metrics not initialized".to_string()
    }
}
