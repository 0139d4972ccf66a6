use anyhow::Context;
use axum::Router;
use axum::routing::{delete, get, post};
use axum_prometheus::PrometheusMetricLayer;
use tokio::net;

use crate::domain::AppState;
use crate::infrastructure::http::handlers::embeds::{create_embed, list_embeds, remove_embed};
use crate::infrastructure::http::handlers::health_check;
use crate::infrastructure::http::handlers::labs::{
    archive_lab, create_lab, get_lab, list_labs, update_lab,
};
use crate::infrastructure::http::handlers::versions::{
    create_draft, get_version, list_versions, patch_draft, publish_version,
};

mod api;
mod handlers;

/// Configuration for the HTTP server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpServerConfig<'a> {
    pub port: &'a str,
}

/// The application's HTTP server. The underlying HTTP package is opaque to module consumers.
pub struct HttpServer {
    router: axum::Router,
    listener: net::TcpListener,
}

impl HttpServer {
    /// Returns a new HTTP server bound to the port specified in `config`.
    pub async fn new(state: impl AppState, config: HttpServerConfig<'_>) -> anyhow::Result<Self> {
        let trace_layer = tower_http::trace::TraceLayer::new_for_http().make_span_with(
            |request: &axum::extract::Request<_>| {
                let uri = request.uri().to_string();
                tracing::info_span!("http_request", method = ?request.method(), uri)
            },
        );
        // see: https://github.com/metrics-rs/metrics
        // see: https://github.com/Ptrskay3/axum-prometheus
        let (prometheus_layer, metric_handle) = PrometheusMetricLayer::pair();

        let router = Router::new()
            .route("/health", get(health_check))
            .nest("/api", api_routes())
            .route("/metrics", get(|| async move { metric_handle.render() }))
            .layer(trace_layer)
            .layer(prometheus_layer)
            .with_state(state);

        let listener = net::TcpListener::bind(format!("0.0.0.0:{}", config.port))
            .await
            .with_context(|| format!("failed to listen on {}", config.port))?;

        Ok(Self { router, listener })
    }

    /// Runs the HTTP server.
    pub async fn run(self) -> anyhow::Result<()> {
        tracing::debug!(
            "listening on {}",
            self.listener
                .local_addr()
                .context("failed to read local address")?
        );
        axum::serve(self.listener, self.router)
            .await
            .context("received error from running server")?;
        Ok(())
    }
}

fn api_routes<S: AppState>() -> Router<S> {
    Router::new()
        .route("/labs", post(create_lab::<S>).get(list_labs::<S>))
        .route("/labs/{lab_id}", get(get_lab::<S>).patch(update_lab::<S>))
        .route("/labs/{lab_id}/archive", post(archive_lab::<S>))
        .route(
            "/labs/{lab_id}/versions",
            post(create_draft::<S>).get(list_versions::<S>),
        )
        .route(
            "/labs/{lab_id}/versions/{version_id}",
            get(get_version::<S>).patch(patch_draft::<S>),
        )
        .route(
            "/labs/{lab_id}/versions/{version_id}/publish",
            post(publish_version::<S>),
        )
        .route("/embeds", post(create_embed::<S>).get(list_embeds::<S>))
        .route("/embeds/{embed_id}", delete(remove_embed::<S>))
}
