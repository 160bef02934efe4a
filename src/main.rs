use axum::{
    Json, Router,
    http::{HeaderName, Request, Response, StatusCode, Uri},
    routing::get,
};
use tower::limit::ConcurrencyLimitLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use std::time::Duration;

use storefront_api::{
    config::AppConfig,
    response::{ApiResponse, Meta},
    routes::{create_api_router, doc::scalar_docs, health},
    state::AppState,
};

const REQUEST_ID_HEADER: &str = "x-request-id";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,storefront_api=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;
    let state = AppState::connect(&config).await?;

    sqlx::migrate!("./migrations").run(&state.pool).await?;

    let app = build_app(&config, state);

    let addr = config.bind_addr()?;
    tracing::info!(%addr, "storefront listening");

    axum::serve(tokio::net::TcpListener::bind(addr).await?, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server stopped");
    Ok(())
}

fn build_app(config: &AppConfig, state: AppState) -> Router {
    let request_id_header = HeaderName::from_static(REQUEST_ID_HEADER);
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|request: &Request<_>| {
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
                request_id = %request_id(request)
            )
        })
        .on_request(|request: &Request<_>, _span: &tracing::Span| {
            tracing::debug!(
                method = %request.method(),
                uri = %request.uri(),
                "request started"
            );
        })
        .on_response(|response: &Response<_>, latency: Duration, _span: &tracing::Span| {
            tracing::info!(
                status = %response.status(),
                ms = %latency.as_millis(),
                "request finished"
            );
        });

    Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness))
        .nest("/api", create_api_router())
        .merge(scalar_docs())
        .fallback(not_found)
        .layer(trace_layer)
        .layer(PropagateRequestIdLayer::new(request_id_header.clone()))
        .layer(SetRequestIdLayer::new(request_id_header, MakeRequestUuid))
        .layer(RequestBodyLimitLayer::new(config.body_limit_bytes))
        .layer(ConcurrencyLimitLayer::new(config.max_in_flight_requests))
        .with_state(state)
}

fn request_id<B>(request: &Request<B>) -> &str {
    request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("-")
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received, draining requests");
}

async fn not_found(uri: Uri) -> (StatusCode, Json<ApiResponse<serde_json::Value>>) {
    let body = ApiResponse::success(
        "Not Found",
        serde_json::json!({ "path": uri.path() }),
        Some(Meta::empty()),
    );
    (StatusCode::NOT_FOUND, Json(body))
}
