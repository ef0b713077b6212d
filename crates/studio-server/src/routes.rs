use crate::state::AppState;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json};
use axum::routing::{get, post};
use axum::Router;
use serde::{Deserialize, Serialize};
use studio_core::registry::{AgentPatch, AgentProfile};
use studio_core::studio::COMPLETION_FAILED_NOTICE;
use studio_core::types::ChatTurn;
use studio_core::StudioError;

// ── Health ──────────────────────────────────────────────────────────────

pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(health))
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

// ── Agents ──────────────────────────────────────────────────────────────

pub fn agent_routes() -> Router<AppState> {
    Router::new()
        .route("/v1/agents", get(list_agents).post(create_agent))
        .route(
            "/v1/agents/{id}",
            axum::routing::patch(update_agent).delete(delete_agent),
        )
        .route("/v1/agents/{id}/activate", post(activate_agent))
        .route("/v1/agents/{id}/turns", get(agent_turns))
}

#[derive(Debug, Serialize)]
struct AgentsResponse {
    agents: Vec<AgentProfile>,
    active_id: String,
}

async fn list_agents(State(state): State<AppState>) -> impl IntoResponse {
    let agents = state.studio.agents().await;
    let active_id = state.studio.active_agent().await.id;
    Json(AgentsResponse { agents, active_id })
}

async fn create_agent(State(state): State<AppState>) -> impl IntoResponse {
    let agent = state.studio.create_agent().await;
    (StatusCode::CREATED, Json(agent))
}

async fn update_agent(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(patch): Json<AgentPatch>,
) -> Result<Json<AgentProfile>, ErrorResponse> {
    let agent = state.studio.update_agent(&id, patch).await?;
    Ok(Json(agent))
}

async fn delete_agent(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ErrorResponse> {
    state.studio.delete_agent(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn activate_agent(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ErrorResponse> {
    state.studio.set_active(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Serialize)]
struct TurnsResponse {
    turns: Vec<ChatTurn>,
}

async fn agent_turns(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<TurnsResponse>, ErrorResponse> {
    let turns = state.studio.turns(&id).await?;
    Ok(Json(TurnsResponse { turns }))
}

// ── Chat ────────────────────────────────────────────────────────────────

pub fn chat_routes() -> Router<AppState> {
    Router::new()
        .route("/v1/chat", post(chat))
        .route("/v1/status", get(status))
}

#[derive(Debug, Deserialize)]
struct ChatRequest {
    message: String,
}

#[derive(Debug, Serialize)]
struct ChatResponse {
    reply: ChatTurn,
}

/// Submit a message to the active agent. The pending user turn survives a
/// failed completion; the client may resubmit.
async fn chat(
    State(state): State<AppState>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ErrorResponse> {
    let reply = state.studio.submit(&req.message).await?;
    Ok(Json(ChatResponse { reply }))
}

async fn status(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.studio.status().await)
}

// ── Error mapping ───────────────────────────────────────────────────────

/// Single place where core errors become HTTP responses.
#[derive(Debug)]
pub struct ErrorResponse(StudioError);

impl From<StudioError> for ErrorResponse {
    fn from(err: StudioError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ErrorResponse {
    fn into_response(self) -> axum::response::Response {
        let status = match &self.0 {
            StudioError::AgentNotFound(_) => StatusCode::NOT_FOUND,
            StudioError::LastAgent | StudioError::Busy => StatusCode::CONFLICT,
            StudioError::EmptyMessage => StatusCode::BAD_REQUEST,
            StudioError::RemoteCallFailed { .. } => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        // The browser shows a generic notice for remote failures; details
        // stay in the server log.
        let message = match &self.0 {
            StudioError::RemoteCallFailed { .. } => COMPLETION_FAILED_NOTICE.to_string(),
            other => other.to_string(),
        };
        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}
