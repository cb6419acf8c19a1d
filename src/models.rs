use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::actions::{ActionResult, Navigation};
use crate::agent::FunctionCallIntent;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MessageRole {
    User,
    Assistant,
    System,
}

impl MessageRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageRole::User => "USER",
            MessageRole::Assistant => "ASSISTANT",
            MessageRole::System => "SYSTEM",
        }
    }
}

impl std::fmt::Display for MessageRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of a session's message log.
///
/// `content` only changes while an assistant reply is being revealed; the
/// function-call fields are kept for audit display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: String,
    pub role: MessageRole,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function_call: Option<FunctionCallIntent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function_result: Option<ActionResult>,
}

impl ChatMessage {
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            // v7 ids are time-ordered, so log order and id order agree.
            id: uuid::Uuid::now_v7().to_string(),
            role,
            content: content.into(),
            timestamp: Utc::now(),
            function_call: None,
            function_result: None,
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(MessageRole::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(MessageRole::Assistant, content)
    }

    pub fn with_action(mut self, intent: FunctionCallIntent, result: ActionResult) -> Self {
        self.function_call = Some(intent);
        self.function_result = Some(result);
        self
    }
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub message: ChatMessage,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub navigation: Option<Navigation>,
}

/// Frames accepted on `/ws/chat`.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WsClientMessage {
    Chat { message: String },
    Cancel,
}

/// Progress of a turn, pushed to WebSocket clients as it happens.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TurnEvent {
    /// The user's message, appended before the provider is called.
    UserMessage { message: ChatMessage },
    /// A complete assistant message (action result, error or cancellation notice).
    AssistantMessage { message: ChatMessage },
    StreamStart { message_id: String },
    /// Words appended to the message being revealed.
    StreamChunk { message_id: String, content: String },
    StreamEnd { message_id: String, full_content: String },
    /// Deferred route change, sent once the explanatory message has been readable.
    Navigate { navigation: Navigation },
    TurnEnd,
    Error { message: String },
}
