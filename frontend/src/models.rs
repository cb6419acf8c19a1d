use serde::{Deserialize, Serialize};

/// Matches the backend `ChatMessage` model.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: String,
    pub role: String,
    pub content: String,
    pub timestamp: String,
    #[serde(default)]
    pub function_result: Option<ActionResult>,
}

impl ChatMessage {
    pub fn is_user(&self) -> bool {
        self.role == "USER"
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ActionResult {
    pub success: bool,
    pub message: String,
    #[serde(default)]
    pub ui_action: Option<UiAction>,
}

/// Marketplace filters carried by a search directive.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Filters {
    pub collection: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub rarity: Option<String>,
    pub sort_by: Option<String>,
}

impl Filters {
    /// Human-readable summary, e.g. `collection: Azuki · max: 5 ETH`.
    pub fn describe(&self) -> String {
        let mut parts = Vec::new();
        if let Some(c) = &self.collection {
            parts.push(format!("collection: {c}"));
        }
        if let Some(p) = self.min_price {
            parts.push(format!("min: {p} ETH"));
        }
        if let Some(p) = self.max_price {
            parts.push(format!("max: {p} ETH"));
        }
        if let Some(r) = &self.rarity {
            parts.push(format!("rarity: {r}"));
        }
        if let Some(s) = &self.sort_by {
            parts.push(format!("sort: {s}"));
        }
        parts.join(" · ")
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PriceAlert {
    pub collection_name: String,
    pub target_price: f64,
    pub alert_type: String,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Collection {
    pub name: String,
    pub floor_price: f64,
    pub volume24h: f64,
    pub change24h: f64,
}

/// Matches the backend `UiAction` directive (adjacently tagged).
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(
    tag = "type",
    content = "payload",
    rename_all = "SCREAMING_SNAKE_CASE",
    rename_all_fields = "camelCase"
)]
pub enum UiAction {
    Navigate { page: String },
    NavigateWithFilters { page: String, filters: Filters },
    AddToCart { nft_id: String, nft_name: String },
    AddToFavorites { nft_id: String, nft_name: String },
    CreatePriceAlert(PriceAlert),
    ShowCollectionDetails(Collection),
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Navigation {
    pub path: String,
    #[serde(default)]
    pub filters: Option<Filters>,
}

/// Frame sent to `/ws/chat`.
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientFrame {
    Chat { message: String },
    Cancel,
}

/// Frame received from `/ws/chat`; matches the backend `TurnEvent` enum.
#[derive(Clone, Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerEvent {
    UserMessage { message: ChatMessage },
    AssistantMessage { message: ChatMessage },
    StreamStart { message_id: String },
    StreamChunk { message_id: String, content: String },
    StreamEnd { message_id: String, full_content: String },
    Navigate { navigation: Navigation },
    TurnEnd,
    Error { message: String },
}
