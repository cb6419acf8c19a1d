use gloo_net::http::Request;

/// Base URL of the backend API server.
const API_BASE: &str = "http://localhost:3000";

async fn get_json<T: serde::de::DeserializeOwned>(path: &str) -> Result<T, String> {
    let resp = Request::get(&format!("{API_BASE}{path}"))
        .send()
        .await
        .map_err(|e| format!("Network error: {e}"))?;

    if !resp.ok() {
        return Err(format!("Server error: {}", resp.status()));
    }

    resp.json::<T>().await.map_err(|e| format!("Parse error: {e}"))
}

/// Suggested prompts shown as chips under the input.
pub async fn fetch_quick_prompts() -> Result<Vec<String>, String> {
    get_json("/api/quick-actions").await
}

/// Returns the WebSocket URL for the chat session endpoint.
pub fn ws_url() -> String {
    API_BASE.replacen("http", "ws", 1) + "/ws/chat"
}
