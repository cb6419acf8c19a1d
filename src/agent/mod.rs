pub mod diagnostics;
pub mod preamble;
pub mod rig_provider;

use std::fmt;
use std::future::Future;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::MessageRole;

pub use rig_provider::RigProvider;

/// The model's request to run a catalog action instead of answering in prose.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionCallIntent {
    pub name: String,
    /// JSON-encoded argument object, passed to the dispatcher untouched.
    pub arguments: String,
}

/// Normalized provider reply: either prose or a function call, never both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AiResponse {
    Text { content: String },
    FunctionCall(FunctionCallIntent),
}

impl AiResponse {
    pub fn text(content: impl Into<String>) -> Self {
        AiResponse::Text { content: content.into() }
    }

    pub fn function_call(name: impl Into<String>, arguments: impl Into<String>) -> Self {
        AiResponse::FunctionCall(FunctionCallIntent { name: name.into(), arguments: arguments.into() })
    }
}

/// One replayed turn of prior conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryTurn {
    pub role: MessageRole,
    pub content: String,
}

/// A chat-completion backend with function calling.
///
/// Implementations absorb transport, auth and quota failures into a plain-text
/// [`AiResponse`]; an `Err` is reserved for faults the controller should treat as
/// unexpected.
pub trait ChatProvider: Send + Sync + 'static {
    fn name(&self) -> &str;

    fn send(
        &self,
        message: &str,
        history: &[HistoryTurn],
    ) -> impl Future<Output = Result<AiResponse, AppError>> + Send;
}

/// Vendors selectable through `LLM_PROVIDER`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Gemini,
    OpenAi,
    OpenRouter,
    DeepSeek,
    Ollama,
}

impl ProviderKind {
    pub const ALL: [ProviderKind; 5] = [
        ProviderKind::Gemini,
        ProviderKind::OpenAi,
        ProviderKind::OpenRouter,
        ProviderKind::DeepSeek,
        ProviderKind::Ollama,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Gemini => "gemini",
            ProviderKind::OpenAi => "openai",
            ProviderKind::OpenRouter => "openrouter",
            ProviderKind::DeepSeek => "deepseek",
            ProviderKind::Ollama => "ollama",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ProviderKind::Gemini => "Gemini",
            ProviderKind::OpenAi => "OpenAI",
            ProviderKind::OpenRouter => "OpenRouter",
            ProviderKind::DeepSeek => "DeepSeek",
            ProviderKind::Ollama => "Ollama",
        }
    }

    /// Environment variable holding the credential; `None` for keyless local runners.
    pub fn key_env(&self) -> Option<&'static str> {
        match self {
            ProviderKind::Gemini => Some("GEMINI_API_KEY"),
            ProviderKind::OpenAi => Some("OPENAI_API_KEY"),
            ProviderKind::OpenRouter => Some("OPENROUTER_API_KEY"),
            ProviderKind::DeepSeek => Some("DEEPSEEK_API_KEY"),
            ProviderKind::Ollama => None,
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            ProviderKind::Gemini => "gemini-2.0-flash-exp",
            ProviderKind::OpenAi => "gpt-4-turbo",
            ProviderKind::OpenRouter => "openai/gpt-4-turbo",
            ProviderKind::DeepSeek => "deepseek-chat",
            ProviderKind::Ollama => "llama3.2",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for ProviderKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        ProviderKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == wanted)
            .ok_or_else(|| AppError::UnknownProvider {
                name: s.to_string(),
                expected: ProviderKind::ALL.map(|k| k.as_str()).join(", "),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_names_parse_case_insensitively() {
        assert_eq!("Gemini".parse::<ProviderKind>().unwrap(), ProviderKind::Gemini);
        assert_eq!(" openrouter ".parse::<ProviderKind>().unwrap(), ProviderKind::OpenRouter);
    }

    #[test]
    fn unknown_provider_lists_choices() {
        let err = "claude".parse::<ProviderKind>().unwrap_err();
        assert!(err.is_config());
        assert!(err.to_string().contains("gemini, openai, openrouter, deepseek, ollama"));
    }
}
