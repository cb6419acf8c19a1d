//! User-readable replacements for provider failures.

use std::time::Duration;

/// Maps a provider error message to the plain-text reply shown instead of it.
pub fn describe_failure(provider: &str, error: &str) -> String {
    let lower = error.to_lowercase();

    if error.contains("401")
        || lower.contains("api key")
        || error.contains("API_KEY_INVALID")
        || lower.contains("unauthorized")
    {
        format!("🔑 Authentication failed. Please check your {provider} API key.")
    } else if error.contains("RATE_LIMIT_EXCEEDED") || lower.contains("rate limit") {
        "⏰ Too many requests. Please wait 1 minute and try again.".to_string()
    } else if error.contains("429")
        || lower.contains("quota")
        || error.contains("QUOTA_EXCEEDED")
        || error.contains("insufficient_quota")
    {
        format!("💳 {provider} API quota exceeded. Please check your plan and try again later.")
    } else if error.contains("403") || lower.contains("forbidden") {
        "🚫 Access forbidden. Please check your API permissions.".to_string()
    } else if error.trim().is_empty() {
        "Error: Failed to get response from AI".to_string()
    } else {
        format!("Error: {error}")
    }
}

pub fn timeout_notice(provider: &str, timeout: Duration) -> String {
    format!(
        "⏱️ {provider} did not respond within {} seconds. Please try again.",
        timeout.as_secs()
    )
}
