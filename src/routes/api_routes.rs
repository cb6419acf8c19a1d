use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::{json, Value};

use super::AppState;
use crate::actions::list_actions;
use crate::agent::ChatProvider;
use crate::errors::AppError;
use crate::models::{ChatMessage, ChatRequest, ChatResponse};
use crate::service::welcome::QUICK_PROMPTS;
use crate::service::TurnState;

/// Catalog entry as published to clients: the same schema the model sees.
#[derive(Debug, Serialize)]
pub struct ActionView {
    pub name: &'static str,
    pub description: &'static str,
    pub parameters: Value,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusView {
    pub provider: String,
    pub state: TurnState,
    pub is_loading: bool,
}

/// POST `/api/chat`: runs one turn on the default session.
pub async fn chat_handler<P: ChatProvider>(
    State(state): State<AppState<P>>,
    Json(request): Json<ChatRequest>,
) -> Response {
    match state.session().submit(&request.message, None).await {
        Ok(outcome) => Json(ChatResponse {
            message: outcome.message,
            navigation: outcome.navigation,
        })
        .into_response(),
        Err(e) => error_response(&e),
    }
}

/// GET `/api/messages`: the default session's log.
pub async fn list_messages_handler<P: ChatProvider>(
    State(state): State<AppState<P>>,
) -> Json<Vec<ChatMessage>> {
    Json(state.session().messages())
}

/// GET `/api/status`
pub async fn status_handler<P: ChatProvider>(State(state): State<AppState<P>>) -> Json<StatusView> {
    let session = state.session();
    Json(StatusView {
        provider: session.provider_name().to_string(),
        state: session.state(),
        is_loading: session.is_loading(),
    })
}

/// GET `/api/actions`
pub async fn list_actions_handler() -> Json<Vec<ActionView>> {
    Json(
        list_actions()
            .iter()
            .map(|spec| ActionView {
                name: spec.name,
                description: spec.description,
                parameters: spec.json_schema(),
            })
            .collect(),
    )
}

/// GET `/api/quick-actions`
pub async fn quick_actions_handler() -> Json<[&'static str; 6]> {
    Json(QUICK_PROMPTS)
}

fn error_response(err: &AppError) -> Response {
    let status = if err.is_validation() {
        StatusCode::BAD_REQUEST
    } else if err.is_busy() {
        StatusCode::CONFLICT
    } else if err.is_config() {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };
    (status, Json(json!({ "error": err.to_string() }))).into_response()
}
