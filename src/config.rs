//! Environment-driven configuration.

use std::str::FromStr;
use std::time::Duration;

use crate::agent::ProviderKind;
use crate::errors::AppError;

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_TIMEOUT_SECS: u64 = 60;
const DEFAULT_HISTORY_LIMIT: usize = 10;
const DEFAULT_REVEAL_MIN_MS: u64 = 20;
const DEFAULT_REVEAL_MAX_MS: u64 = 80;
const DEFAULT_NAVIGATION_DELAY_MS: u64 = 1500;

/// Which provider to talk to and how.
#[derive(Debug, Clone)]
pub struct ProviderSettings {
    pub kind: ProviderKind,
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: Option<String>,
    pub timeout: Duration,
}

/// Bounds of the cosmetic per-word delay; both zero disables it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RevealSettings {
    pub min_delay: Duration,
    pub max_delay: Duration,
}

impl RevealSettings {
    pub const INSTANT: RevealSettings =
        RevealSettings { min_delay: Duration::ZERO, max_delay: Duration::ZERO };

    pub fn is_instant(&self) -> bool {
        self.max_delay.is_zero()
    }
}

impl Default for RevealSettings {
    fn default() -> Self {
        Self {
            min_delay: Duration::from_millis(DEFAULT_REVEAL_MIN_MS),
            max_delay: Duration::from_millis(DEFAULT_REVEAL_MAX_MS),
        }
    }
}

/// Per-session conversation tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TurnSettings {
    pub reveal: RevealSettings,
    pub navigation_delay: Duration,
    /// Prior messages replayed to the provider; 0 sends none.
    pub history_limit: usize,
}

impl Default for TurnSettings {
    fn default() -> Self {
        Self {
            reveal: RevealSettings::default(),
            navigation_delay: Duration::from_millis(DEFAULT_NAVIGATION_DELAY_MS),
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub provider: ProviderSettings,
    pub turn: TurnSettings,
    pub port: u16,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key lookup; `from_env` passes the process
    /// environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let kind = match get("LLM_PROVIDER") {
            Some(name) => name.parse::<ProviderKind>()?,
            None => ProviderKind::Gemini,
        };
        let api_key = kind.key_env().and_then(|var| get(var));
        let model = get("LLM_MODEL").unwrap_or_else(|| kind.default_model().to_string());
        let base_url = match kind {
            ProviderKind::Ollama => get("OLLAMA_API_BASE_URL").or_else(|| get("LLM_BASE_URL")),
            _ => get("LLM_BASE_URL"),
        };
        let timeout = Duration::from_secs(parse_or(&get, "LLM_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)?);

        let reveal = RevealSettings {
            min_delay: Duration::from_millis(parse_or(&get, "REVEAL_MIN_DELAY_MS", DEFAULT_REVEAL_MIN_MS)?),
            max_delay: Duration::from_millis(parse_or(&get, "REVEAL_MAX_DELAY_MS", DEFAULT_REVEAL_MAX_MS)?),
        };
        if reveal.min_delay > reveal.max_delay {
            return Err(AppError::invalid_setting(
                "REVEAL_MIN_DELAY_MS",
                format!("{} (greater than REVEAL_MAX_DELAY_MS)", reveal.min_delay.as_millis()),
            ));
        }

        let turn = TurnSettings {
            reveal,
            navigation_delay: Duration::from_millis(parse_or(
                &get,
                "NAVIGATION_DELAY_MS",
                DEFAULT_NAVIGATION_DELAY_MS,
            )?),
            history_limit: parse_or(&get, "CHAT_HISTORY_LIMIT", DEFAULT_HISTORY_LIMIT)?,
        };

        Ok(Self {
            provider: ProviderSettings { kind, api_key, model, base_url, timeout },
            turn,
            port: parse_or(&get, "PORT", DEFAULT_PORT)?,
        })
    }
}

fn parse_or<T: FromStr>(
    get: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> Result<T, AppError> {
    match get(key) {
        Some(raw) => raw.trim().parse().map_err(|_| AppError::invalid_setting(key, raw)),
        None => Ok(default),
    }
}
