use {
    crate::metrics::{render_prometheus_text, LivenessChecking},
    axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Router},
    std::{net::SocketAddr, sync::Arc},
};

async fn metrics_handler() -> impl IntoResponse {
    (
        StatusCode::OK,
        [("content-type", "text/plain; version=0.0.4")],
        render_prometheus_text(),
    )
}

async fn healthz_handler(State(liveness): State<Arc<dyn LivenessChecking>>) -> impl IntoResponse {
    if liveness.is_alive() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

/// Serves `/metrics` and `/healthz` until the process exits. Mirrors the
/// teacher's `shared::metrics::serve_metrics`; the core loop races this
/// future against the main event loop and logs if it ever exits.
pub async fn serve(liveness: Arc<dyn LivenessChecking>, addr: SocketAddr) -> anyhow::Result<()> {
    let app = Router::new()
        .route("/metrics", get(metrics_handler))
        .route("/healthz", get(healthz_handler))
        .with_state(liveness);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "serving metrics and health endpoints");
    axum::serve(listener, app).await?;
    Ok(())
}
