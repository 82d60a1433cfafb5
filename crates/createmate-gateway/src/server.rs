use crate::error::ApiError;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::HeaderValue;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use createmate_core::{CreateMateError, Feedback, StateResponse, UserInput};
use createmate_orchestrator::Runtime;
use serde_json::Value;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

/// Shared application state.
pub struct AppState {
    /// The agent runtime behind every route.
    pub runtime: Arc<Runtime>,
}

/// Builds the REST router.
pub struct GatewayServer;

impl GatewayServer {
    /// Build the router with permissive CORS.
    pub fn build(runtime: Arc<Runtime>) -> Router {
        Self::build_with_cors(runtime, &[])
    }

    /// Build the router allowing only `origins`. An empty list allows any origin.
    pub fn build_with_cors(runtime: Arc<Runtime>, origins: &[String]) -> Router {
        let state = Arc::new(AppState { runtime });

        Router::new()
            .route("/user-input", post(user_input_handler))
            .route("/feedback", post(feedback_handler))
            .route("/state", get(state_handler))
            .route("/agents", get(agents_handler))
            .route("/health", get(health_handler))
            .layer(cors_layer(origins))
            .layer(TraceLayer::new_for_http())
            .with_state(state)
    }
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if allowed.is_empty() {
        layer.allow_origin(Any)
    } else {
        layer.allow_origin(AllowOrigin::list(allowed))
    }
}

fn reject(rejection: JsonRejection) -> ApiError {
    ApiError(CreateMateError::Validation(rejection.body_text()))
}

async fn user_input_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<UserInput>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(input) = payload.map_err(reject)?;
    info!(
        area = %input.area_of_interest,
        frequency = input.post_frequency,
        "User input submitted"
    );
    let ack = state.runtime.submit_input(input).await?;
    Ok(Json(serde_json::json!({ "message": ack.message })))
}

async fn feedback_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<Feedback>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(feedback) = payload.map_err(reject)?;
    info!(liked = feedback.liked, "Feedback submitted");
    let ack = state.runtime.submit_feedback(feedback).await?;
    Ok(Json(serde_json::json!({ "message": ack.message })))
}

async fn state_handler(State(state): State<Arc<AppState>>) -> Result<Json<StateResponse>, ApiError> {
    Ok(Json(state.runtime.state().await?))
}

async fn agents_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let mut body = state.runtime.monitor().to_json().await;
    let addresses: serde_json::Map<String, Value> = state
        .runtime
        .addresses()
        .into_iter()
        .map(|(role, address)| (role.to_string(), Value::String(address.to_string())))
        .collect();
    body["addresses"] = Value::Object(addresses);
    Json(body)
}

async fn health_handler() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "healthy" }))
}

