//! HTTP trigger for the automation cycle.

use std::{net::SocketAddr, sync::Arc, time::Duration};

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::models::UserProfile;
use crate::pipeline::Pipeline;

pub const HEALTH_PATH: &str = "/";
pub const RUN_CYCLE_PATH: &str = "/run_cycle";
const HEALTH_STATUS: &str = "App is running! Integrate with Zapier via /run_cycle POST.";

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("invalid listen address '{address}': {source}")]
    InvalidListenAddr {
        address: String,
        source: std::net::AddrParseError,
    },
    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        source: std::io::Error,
    },
    #[error("server error: {0}")]
    Serve(#[from] std::io::Error),
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
}

#[derive(Debug, Deserialize)]
struct RunCycleRequest {
    #[serde(default)]
    user_profiles: Option<Vec<UserProfile>>,
}

/// Faults that abort a single invocation
#[derive(Debug, Error)]
enum RequestError {
    #[error("request body is not valid JSON: {0}")]
    Json(serde_json::Error),
    #[error("request body must be a JSON object")]
    NotAnObject,
    #[error("invalid user_profiles: {0}")]
    Profiles(serde_json::Error),
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for RequestError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self, "error in automation cycle");
        let body = ErrorBody {
            error: self.to_string(),
        };
        (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
    }
}

pub fn build_router(pipeline: Arc<Pipeline>) -> Router {
    Router::new()
        .route(HEALTH_PATH, get(health))
        .route(RUN_CYCLE_PATH, post(run_cycle))
        .with_state(pipeline)
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: HEALTH_STATUS,
    })
}

async fn run_cycle(
    State(pipeline): State<Arc<Pipeline>>,
    body: Bytes,
) -> Result<Response, RequestError> {
    let profiles = parse_profiles(&body)?;
    let bundle = pipeline.run_cycle(&profiles).await;
    Ok((StatusCode::OK, Json(bundle)).into_response())
}

fn parse_profiles(body: &[u8]) -> Result<Vec<UserProfile>, RequestError> {
    let value: Value = serde_json::from_slice(body).map_err(RequestError::Json)?;
    if !value.is_object() {
        return Err(RequestError::NotAnObject);
    }
    let request: RunCycleRequest =
        serde_json::from_value(value).map_err(RequestError::Profiles)?;
    Ok(request.user_profiles.unwrap_or_default())
}

pub async fn serve(listen_addr: &str, pipeline: Arc<Pipeline>) -> Result<(), ServerError> {
    let addr: SocketAddr =
        listen_addr
            .trim()
            .parse()
            .map_err(|source| ServerError::InvalidListenAddr {
                address: listen_addr.to_string(),
                source,
            })?;

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|source| ServerError::Bind {
            address: addr.to_string(),
            source,
        })?;

    let local_addr = listener.local_addr()?;
    tracing::info!(%local_addr, "cycle server listening");

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|request: &Request<_>| {
            tracing::info_span!(
                "http.request",
                method = %request.method(),
                path = %request.uri().path()
            )
        })
        .on_response(|response: &Response, latency: Duration, _span: &tracing::Span| {
            let latency_ms = latency.as_millis().min(u128::from(u64::MAX)) as u64;
            tracing::info!(status = response.status().as_u16(), latency_ms, "request completed");
        });

    let app = build_router(pipeline).layer(trace_layer);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(error) = tokio::signal::ctrl_c().await {
            tracing::warn!(%error, "failed to capture Ctrl+C signal");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                term.recv().await;
            }
            Err(error) => {
                tracing::warn!(%error, "failed to capture SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("shutdown signal received; draining connections");
}
