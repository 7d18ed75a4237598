use super::{AppState, ChatBody, NewSessionBody};
use crate::pipeline::TurnError;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use uuid::Uuid;

/// GET / — service info
pub(super) async fn handle_root() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "service": "Opora chat backend",
        "status": "online",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "health": "GET /health",
            "chat": "POST /chat",
            "new_session": "POST /new-session",
        },
    }))
}

/// GET /health
pub(super) async fn handle_health(State(state): State<AppState>) -> impl IntoResponse {
    let body = serde_json::json!({
        "status": "healthy",
        "backend": state.pipeline.backend_label(),
        "active_sessions": state.pipeline.store().active_sessions(),
    });
    Json(body)
}

/// POST /chat — run one conversation turn
pub(super) async fn handle_chat(
    State(state): State<AppState>,
    body: Result<Json<ChatBody>, axum::extract::rejection::JsonRejection>,
) -> impl IntoResponse {
    let Json(chat) = match body {
        Ok(b) => b,
        Err(e) => {
            let err = serde_json::json!({
                "error": format!("Invalid JSON: {e}. Expected: {{\"message\": \"...\"}}")
            });
            return (StatusCode::BAD_REQUEST, Json(err));
        }
    };

    let session_id = chat
        .session_id
        .filter(|id| !id.trim().is_empty())
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    match state.pipeline.handle_turn(&session_id, &chat.message).await {
        Ok(outcome) => {
            let body = serde_json::json!({
                "response_sequence": outcome.segments,
                "session_id": outcome.session_id,
                "crisis_detected": outcome.crisis_detected,
                "powered_by": outcome.produced_by.to_string(),
            });
            (StatusCode::OK, Json(body))
        }
        Err(TurnError::EmptyMessage) => {
            let err = serde_json::json!({"error": "Message is required"});
            (StatusCode::BAD_REQUEST, Json(err))
        }
    }
}

/// POST /new-session — drop any existing history and issue a fresh id
pub(super) async fn handle_new_session(
    State(state): State<AppState>,
    body: Option<Json<NewSessionBody>>,
) -> impl IntoResponse {
    if let Some(Json(NewSessionBody {
        session_id: Some(old_id),
    })) = body
    {
        let existed = state.pipeline.store().remove(&old_id);
        tracing::debug!(session = %old_id, existed, "cleared session on request");
    }

    let new_session_id = Uuid::new_v4().to_string();
    tracing::info!(session = %new_session_id, "new session created");
    let body = serde_json::json!({
        "message": "New session started",
        "session_id": new_session_id,
    });
    (StatusCode::OK, Json(body))
}
