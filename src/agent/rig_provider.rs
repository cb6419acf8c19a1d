use std::sync::Arc;
use std::time::Duration;

use rig::client::Nothing;
use rig::completion::{CompletionError, CompletionModel, ToolDefinition};
use rig::message::{AssistantContent, Message as RigMessage};
use rig::prelude::CompletionClient;
use rig::providers::{deepseek, gemini, ollama, openai, openrouter};
use serde_json::Value;
use tracing::{debug, error, info};

use super::diagnostics::{describe_failure, timeout_notice};
use super::preamble::build_preamble;
use super::{AiResponse, ChatProvider, HistoryTurn, ProviderKind};
use crate::actions::catalog::list_actions;
use crate::config::ProviderSettings;
use crate::errors::AppError;
use crate::market::MarketData;
use crate::models::MessageRole;

const TEMPERATURE: f64 = 0.7;
const MAX_TOKENS: u64 = 500;
const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";
const EMPTY_REPLY: &str = "Sorry, I could not process your request.";

/// Builds a rig client for a keyed provider, honouring an optional base URL override.
macro_rules! keyed_client {
    ($provider:ident, $kind:expr, $key:expr, $base_url:expr) => {{
        let builder = $provider::Client::builder().api_key($key);
        let builder = match $base_url {
            Some(url) => builder.base_url(url),
            None => builder,
        };
        builder.build().map_err(|e| AppError::ProviderBuild {
            provider: $kind.display_name().to_string(),
            message: format!("{e:?}"),
        })?
    }};
}

enum Backend {
    Gemini(gemini::Client),
    OpenAi(openai::Client),
    OpenRouter(openrouter::Client),
    DeepSeek(deepseek::Client),
    Ollama(ollama::Client),
}

/// Everything one completion call needs besides the model itself.
struct PreparedRequest {
    preamble: String,
    history: Vec<RigMessage>,
    message: String,
    tools: Vec<ToolDefinition>,
}

/// Piece of a vendor reply after stripping vendor-specific wrapping.
#[derive(Debug, Clone, PartialEq)]
enum ReplyPart {
    Text(String),
    ToolCall { name: String, arguments: Value },
}

/// [`ChatProvider`] backed by one of rig's provider clients, chosen at startup.
pub struct RigProvider {
    kind: ProviderKind,
    backend: Backend,
    model: String,
    timeout: Duration,
    market: Arc<dyn MarketData>,
    tools: Vec<ToolDefinition>,
}

impl RigProvider {
    /// Fails with a configuration error, before any network I/O, when the selected
    /// provider needs a credential that is not set.
    pub fn from_settings(
        settings: &ProviderSettings,
        market: Arc<dyn MarketData>,
    ) -> Result<Self, AppError> {
        let kind = settings.kind;
        let base_url = settings.base_url.as_deref();

        let backend = match kind {
            ProviderKind::Ollama => {
                let client = ollama::Client::builder()
                    .api_key(Nothing)
                    .base_url(base_url.unwrap_or(DEFAULT_OLLAMA_URL))
                    .build()
                    .map_err(|e| AppError::ProviderBuild {
                        provider: kind.display_name().to_string(),
                        message: format!("{e:?}"),
                    })?;
                Backend::Ollama(client)
            }
            ProviderKind::Gemini => {
                let key = required_key(settings)?;
                Backend::Gemini(keyed_client!(gemini, kind, key, base_url))
            }
            ProviderKind::OpenAi => {
                let key = required_key(settings)?;
                Backend::OpenAi(keyed_client!(openai, kind, key, base_url))
            }
            ProviderKind::OpenRouter => {
                let key = required_key(settings)?;
                Backend::OpenRouter(keyed_client!(openrouter, kind, key, base_url))
            }
            ProviderKind::DeepSeek => {
                let key = required_key(settings)?;
                Backend::DeepSeek(keyed_client!(deepseek, kind, key, base_url))
            }
        };

        info!("Using {} provider with model {}", kind, settings.model);

        Ok(Self {
            kind,
            backend,
            model: settings.model.clone(),
            timeout: settings.timeout,
            market,
            tools: tool_definitions(),
        })
    }

    fn prepare(&self, message: &str, history: &[HistoryTurn]) -> PreparedRequest {
        PreparedRequest {
            preamble: build_preamble(self.market.as_ref()),
            history: to_rig_history(history),
            message: message.to_string(),
            tools: self.tools.clone(),
        }
    }

    async fn dispatch(&self, request: PreparedRequest) -> Result<AiResponse, CompletionError> {
        let model = self.model.as_str();
        match &self.backend {
            Backend::Gemini(client) => complete(client.completion_model(model), request).await,
            Backend::OpenAi(client) => complete(client.completion_model(model), request).await,
            Backend::OpenRouter(client) => complete(client.completion_model(model), request).await,
            Backend::DeepSeek(client) => complete(client.completion_model(model), request).await,
            Backend::Ollama(client) => complete(client.completion_model(model), request).await,
        }
    }
}

impl ChatProvider for RigProvider {
    fn name(&self) -> &str {
        self.kind.display_name()
    }

    async fn send(&self, message: &str, history: &[HistoryTurn]) -> Result<AiResponse, AppError> {
        let provider = self.kind.display_name();
        debug!("Sending message to {provider} with {} history turns", history.len());

        let request = self.prepare(message, history);
        match tokio::time::timeout(self.timeout, self.dispatch(request)).await {
            Ok(Ok(response)) => Ok(response),
            Ok(Err(e)) => {
                error!("{provider} completion failed: {e}");
                Ok(AiResponse::text(describe_failure(provider, &e.to_string())))
            }
            Err(_) => {
                error!("{provider} completion timed out after {:?}", self.timeout);
                Ok(AiResponse::text(timeout_notice(provider, self.timeout)))
            }
        }
    }
}

fn required_key(settings: &ProviderSettings) -> Result<&str, AppError> {
    match settings.api_key.as_deref() {
        Some(key) if !key.trim().is_empty() => Ok(key),
        _ => Err(AppError::MissingCredential {
            provider: settings.kind.display_name().to_string(),
            env_var: settings.kind.key_env().unwrap_or_default().to_string(),
        }),
    }
}

/// Catalog entries in rig's tool-declaration shape.
fn tool_definitions() -> Vec<ToolDefinition> {
    list_actions()
        .iter()
        .map(|spec| ToolDefinition {
            name: spec.name.to_string(),
            description: spec.description.to_string(),
            parameters: spec.json_schema(),
        })
        .collect()
}

fn to_rig_history(history: &[HistoryTurn]) -> Vec<RigMessage> {
    history
        .iter()
        .filter_map(|turn| match turn.role {
            MessageRole::User => Some(RigMessage::user(&turn.content)),
            MessageRole::Assistant => Some(RigMessage::assistant(&turn.content)),
            MessageRole::System => None, // the system prompt is sent as preamble
        })
        .collect()
}

async fn complete<M: CompletionModel>(
    model: M,
    request: PreparedRequest,
) -> Result<AiResponse, CompletionError> {
    let response = model
        .completion_request(RigMessage::user(request.message))
        .preamble(request.preamble)
        .messages(request.history)
        .tools(request.tools)
        .temperature(TEMPERATURE)
        .max_tokens(MAX_TOKENS)
        .send()
        .await?;

    Ok(collect_reply(response.choice.into_iter().filter_map(reply_part)))
}

fn reply_part(content: AssistantContent) -> Option<ReplyPart> {
    match content {
        AssistantContent::Text(text) => Some(ReplyPart::Text(text.text)),
        AssistantContent::ToolCall(call) => Some(ReplyPart::ToolCall {
            name: call.function.name,
            arguments: call.function.arguments,
        }),
        _ => None,
    }
}

/// The first tool call wins; otherwise the text parts are joined.
fn collect_reply(parts: impl IntoIterator<Item = ReplyPart>) -> AiResponse {
    let mut text = String::new();
    for part in parts {
        match part {
            ReplyPart::ToolCall { name, arguments } => {
                let arguments = match arguments {
                    Value::Null => "{}".to_string(),
                    other => other.to_string(),
                };
                debug!("Model requested action {name}");
                return AiResponse::function_call(name, arguments);
            }
            ReplyPart::Text(chunk) => text.push_str(&chunk),
        }
    }

    if text.trim().is_empty() {
        AiResponse::text(EMPTY_REPLY)
    } else {
        AiResponse::text(text)
    }
}
