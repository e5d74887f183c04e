// src/server/mod.rs
// HTTP surface the web front end calls. Thin: DTOs in, orchestrator out,
// error taxonomy mapped to status codes with user-safe messages.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::CONFIG;
use crate::error::OrchestratorError;
use crate::history::{Attachment, ConversationTurn};
use crate::orchestrator::{
    OrchestrationRequest, ProviderUsed, ResponseOrchestrator, TransientStatus,
};
use crate::prompt::PedagogicalMode;
use crate::reasoning::{self, Segment};
use crate::structured::{StudySet, StudyToolKind};

pub struct AppState {
    pub orchestrator: Arc<ResponseOrchestrator>,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/chat", post(chat_handler))
        .route("/api/title", post(title_handler))
        .route("/api/study-tools", post(study_tools_handler))
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(CONFIG.request_timeout),
        ))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}

// ============================================================================
// Chat
// ============================================================================

fn default_subject() -> String {
    "General".to_string()
}

#[derive(Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default = "default_subject")]
    pub subject: String,
    #[serde(default)]
    pub mode: PedagogicalMode,
    #[serde(default)]
    pub history: Vec<ConversationTurn>,
    pub attachment: Option<Attachment>,
    pub language: Option<String>,
}

#[derive(Serialize)]
pub struct ChatResponse {
    pub text: String,
    pub provider_used: ProviderUsed,
    /// Labels emitted while the call was in flight, in order.
    pub statuses: Vec<String>,
    /// Prose/reasoning split of `text`, present only for reasoning mode.
    /// The orchestrator returns the raw string; splitting it is this
    /// caller's choice.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub segments: Option<Vec<Segment>>,
}

async fn chat_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    if request.message.trim().is_empty() {
        return Err(ApiError::EmptyMessage);
    }

    info!(
        subject = %request.subject,
        mode = ?request.mode,
        turns = request.history.len(),
        has_attachment = request.attachment.is_some(),
        "chat request"
    );

    let mode = request.mode;
    let (status_tx, mut status_rx) = mpsc::unbounded_channel::<TransientStatus>();

    let result = state
        .orchestrator
        .orchestrate(
            OrchestrationRequest {
                user_text: request.message,
                subject: request.subject,
                prior_turns: request.history,
                attachment: request.attachment,
                mode: request.mode,
                language_code: request.language,
            },
            Some(status_tx),
        )
        .await?;

    let mut statuses = Vec::new();
    while let Ok(status) = status_rx.try_recv() {
        statuses.push(status.label().to_string());
    }

    let segments = (mode == PedagogicalMode::Reasoning)
        .then(|| reasoning::parse_segments(&result.text));

    Ok(Json(ChatResponse {
        text: result.text,
        provider_used: result.provider_used,
        statuses,
        segments,
    }))
}

// ============================================================================
// Auto-titling
// ============================================================================

#[derive(Deserialize)]
pub struct TitleRequest {
    pub message: String,
}

#[derive(Serialize)]
pub struct TitleResponse {
    pub title: Option<String>,
}

/// Always 200: a missing title means "keep the placeholder". The front end
/// fires this after the first message of a new conversation and must never
/// see it as part of the chat flow.
async fn title_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<TitleRequest>,
) -> Json<TitleResponse> {
    let title = state.orchestrator.generate_title(&request.message).await;
    Json(TitleResponse { title })
}

// ============================================================================
// Study tools
// ============================================================================

fn default_item_count() -> usize {
    5
}

#[derive(Deserialize)]
pub struct StudyToolRequest {
    pub kind: StudyToolKind,
    pub topic: String,
    #[serde(default = "default_subject")]
    pub subject: String,
    #[serde(default = "default_item_count")]
    pub count: usize,
}

async fn study_tools_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<StudyToolRequest>,
) -> Result<Json<StudySet>, ApiError> {
    if request.topic.trim().is_empty() {
        return Err(ApiError::EmptyMessage);
    }
    let count = request.count.clamp(1, 20);
    let set = state
        .orchestrator
        .generate_study_set(request.kind, &request.topic, &request.subject, count)
        .await?;
    Ok(Json(set))
}

// ============================================================================
// Error mapping
// ============================================================================

pub enum ApiError {
    EmptyMessage,
    Orchestrator(OrchestratorError),
}

impl From<OrchestratorError> for ApiError {
    fn from(err: OrchestratorError) -> Self {
        ApiError::Orchestrator(err)
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::EmptyMessage => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "Message must not be empty.".to_string(),
            ),
            ApiError::Orchestrator(OrchestratorError::Unavailable) => (
                StatusCode::BAD_GATEWAY,
                "Sage is having trouble connecting right now. Please try again.".to_string(),
            ),
            ApiError::Orchestrator(OrchestratorError::MalformedStructuredOutput) => (
                StatusCode::BAD_GATEWAY,
                "Generation failed. Please try again.".to_string(),
            ),
            ApiError::Orchestrator(OrchestratorError::Configuration(key)) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Server misconfigured: {} is not set.", key),
            ),
        };
        (status, Json(ErrorBody { error: message })).into_response()
    }
}
