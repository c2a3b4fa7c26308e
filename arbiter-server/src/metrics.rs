//! Metrics server: serves /metrics in OpenMetrics format on its own
//! listener, off the bid path.
use {
    crate::{
        auction::entities,
        config::RunOptions,
        server::{
            EXIT_CHECK_INTERVAL,
            SHOULD_EXIT,
        },
    },
    anyhow::Result,
    axum::{
        routing::get,
        Router,
    },
    axum_prometheus::{
        metrics,
        metrics_exporter_prometheus::{
            Matcher,
            PrometheusBuilder,
            PrometheusHandle,
        },
        PrometheusMetricLayerBuilder,
    },
    std::sync::atomic::Ordering,
};

pub const BID_COMPLETION_TIME_METRIC: &str = "bid_completion_time_seconds";
pub const BID_COMPLETION_TIME_BUCKETS: &[f64; 12] = &[
    0.001, 0.0025, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0,
];

pub fn setup_metrics_recorder() -> Result<PrometheusHandle> {
    Ok(PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full(BID_COMPLETION_TIME_METRIC.to_string()),
            BID_COMPLETION_TIME_BUCKETS,
        )?
        .install_recorder()?)
}

/// Submission-to-completion latency of one arbitrated bid, labeled by its
/// outcome tag.
pub fn observe_bid_completion(outcome: entities::BidOutcome, seconds: f64) {
    let labels = [("outcome", outcome.to_string())];
    metrics::histogram!(BID_COMPLETION_TIME_METRIC, &labels).record(seconds);
}

pub async fn start_metrics(
    run_options: RunOptions,
    metrics_recorder: PrometheusHandle,
) -> Result<()> {
    tracing::info!("Starting Metrics Server...");

    let (_, metric_handle) = PrometheusMetricLayerBuilder::new()
        .with_metrics_from_fn(move || metrics_recorder.clone())
        .build_pair();
    let app = Router::new();
    let app = app.route("/metrics", get(|| async move { metric_handle.render() }));

    let listener = tokio::net::TcpListener::bind(&run_options.server.metrics_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            while !SHOULD_EXIT.load(Ordering::Acquire) {
                tokio::time::sleep(EXIT_CHECK_INTERVAL).await;
            }
            tracing::info!("Shutting down metrics server...");
        })
        .await?;
    Ok(())
}
