use axum::body::Body;
use axum::http::{header, Method, StatusCode};
use axum::response::Response;
use axum::{extract::FromRef, routing::get, Router};
use prometheus::{Encoder, TextEncoder};
use routes::{category_router, questions_router, quizzes_router};
use sqlx::SqlitePool;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::error::ApiError;
use super::pagination::PageSize;
use super::routes;
use crate::settings::Settings;

#[derive(FromRef, Clone)]
pub struct AppState {
    pool: SqlitePool,
    page_size: PageSize,
}

impl AppState {
    pub fn new(pool: SqlitePool, page_size: PageSize) -> Self {
        Self { pool, page_size }
    }
}

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    Router::new()
        .route("/metrics", get(metrics))
        .merge(category_router(state.clone()))
        .merge(questions_router(state.clone()))
        .merge(quizzes_router(state))
        .fallback(|| async {
            tracing::info!("Fallback");
            ApiError::NotFound
        })
        .method_not_allowed_fallback(|| async { ApiError::MethodNotAllowed })
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

pub async fn run_server(pool: SqlitePool, settings: &Settings) -> anyhow::Result<()> {
    let addr = settings.server.address();
    let state = AppState::new(
        pool,
        PageSize(settings.pagination.questions_per_page),
    );
    let app = build_router(state);
    let listener = TcpListener::bind(&addr).await?;

    tracing::info!("Serving on {addr}");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for Ctrl+C: {error}");
        std::future::pending::<()>().await;
    }
    tracing::warn!("Received Ctrl+C, shutting down");
}

async fn metrics() -> Result<Response, StatusCode> {
    let encoder = TextEncoder::new();
    let metrics = prometheus::gather();
    let mut buf = vec![];
    encoder.encode(&metrics, &mut buf).map_err(|error| {
        tracing::error!("Failed to encode metrics: {error}");
        StatusCode::INTERNAL_SERVER_ERROR
    })?;
    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, encoder.format_type())
        .body(Body::from(buf))
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
}
