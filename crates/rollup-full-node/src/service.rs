//! HTTP JSON-RPC server.
//!
//! `POST /` takes a JSON-RPC 2.0 request object or a batch array and hands
//! each call to the [`RequestDispatcher`]. `GET /health` reports liveness.

use axum::{
    extract::{DefaultBodyLimit, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info};

use crate::dispatch::RequestDispatcher;
use crate::domain::config::ServerConfig;
use crate::domain::error::{ApiError, GatewayError, GatewayResult};
use crate::domain::types::JsonRpcId;

/// JSON-RPC front end of the full node
pub struct FullnodeRpcServer {
    config: ServerConfig,
    dispatcher: Arc<RequestDispatcher>,
}

impl FullnodeRpcServer {
    pub fn new(config: ServerConfig, dispatcher: Arc<RequestDispatcher>) -> Self {
        Self { config, dispatcher }
    }

    /// Bind the configured address and serve until `shutdown` resolves.
    pub async fn start<F>(self, shutdown: F) -> GatewayResult<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = self.config.bind_addr();
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| GatewayError::Bind(format!("{}: {}", addr, e)))?;
        self.serve(listener, shutdown).await
    }

    /// Serve on an already bound listener until `shutdown` resolves.
    pub async fn serve<F>(self, listener: TcpListener, shutdown: F) -> GatewayResult<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let local = listener
            .local_addr()
            .map_err(|e| GatewayError::Bind(e.to_string()))?;
        info!(addr = %local, "Listening for JSON-RPC requests");

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| {
                error!(error = %e, "HTTP server error");
                GatewayError::Bind(e.to_string())
            })?;

        info!("JSON-RPC server stopped");
        Ok(())
    }

    /// Build HTTP router for JSON-RPC
    pub fn router(&self) -> Router {
        let state = AppState {
            dispatcher: Arc::clone(&self.dispatcher),
            max_batch_size: self.config.max_batch_size,
        };

        let middleware = ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive());

        Router::new()
            .route("/", post(handle_json_rpc))
            .route("/health", get(health_check))
            .layer(DefaultBodyLimit::max(self.config.max_request_size))
            .layer(middleware)
            .with_state(state)
    }
}

/// Application state shared across handlers
#[derive(Clone)]
struct AppState {
    dispatcher: Arc<RequestDispatcher>,
    max_batch_size: usize,
}

fn error_response(id: Option<Value>, error: ApiError) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id.unwrap_or(Value::Null),
        "error": error,
    })
}

/// Handle JSON-RPC request
async fn handle_json_rpc(State(state): State<AppState>, body: String) -> impl IntoResponse {
    let request: Value = match serde_json::from_str(&body) {
        Ok(v) => v,
        Err(e) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(error_response(None, ApiError::parse_error(e.to_string()))),
            );
        }
    };

    let response = match request {
        Value::Array(requests) if requests.is_empty() => {
            error_response(None, ApiError::invalid_request("empty batch"))
        }
        Value::Array(requests) if requests.len() > state.max_batch_size => error_response(
            None,
            ApiError::limit_exceeded(format!(
                "batch of {} exceeds maximum of {}",
                requests.len(),
                state.max_batch_size
            )),
        ),
        Value::Array(requests) => {
            let mut responses = Vec::with_capacity(requests.len());
            for req in requests {
                responses.push(process_single_request(&state, req).await);
            }
            Value::Array(responses)
        }
        single => process_single_request(&state, single).await,
    };

    (StatusCode::OK, Json(response))
}

/// Process a single JSON-RPC request
async fn process_single_request(state: &AppState, mut request: Value) -> Value {
    let id = match request.get("id").cloned() {
        None | Some(Value::Null) => {
            return error_response(
                None,
                ApiError::invalid_request("null id (notifications not supported)"),
            )
        }
        Some(raw) => match serde_json::from_value::<JsonRpcId>(raw.clone()) {
            Ok(parsed) => match parsed.validate() {
                Ok(()) => raw,
                Err(reason) => return error_response(None, ApiError::invalid_request(reason)),
            },
            Err(_) => {
                return error_response(
                    None,
                    ApiError::invalid_request("id must be string or number"),
                )
            }
        },
    };

    let Some(method) = request.get("method").and_then(Value::as_str).map(str::to_owned) else {
        return error_response(Some(id), ApiError::invalid_request("missing method"));
    };

    let params = match request.get_mut("params").map(Value::take) {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(params)) => params,
        Some(other) => vec![other],
    };

    match state.dispatcher.handle_request(&method, params).await {
        Ok(result) => json!({
            "jsonrpc": "2.0",
            "id": id,
            "result": result,
        }),
        Err(e) => error_response(Some(id), e.into()),
    }
}

/// Health check endpoint
async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "service": "rollup-full-node",
        "version": env!("CARGO_PKG_VERSION")
    }))
}
