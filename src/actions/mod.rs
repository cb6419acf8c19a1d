pub mod catalog;
pub mod dispatcher;
pub mod params;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::market::MarketCollection;
use params::{NavigateParams, Page, PriceAlertParams, SearchNftsParams};

pub use catalog::list_actions;
pub use dispatcher::ActionDispatcher;

/// Why an action produced `success: false`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionErrorKind {
    MalformedArguments,
    UnknownAction,
    NotFound,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UiActionType {
    Navigate,
    NavigateWithFilters,
    AddToCart,
    AddToFavorites,
    CreatePriceAlert,
    ShowCollectionDetails,
}

/// A UI effect requested by a handler. The dispatcher never performs it; the
/// conversation controller or the web client does.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "type",
    content = "payload",
    rename_all = "SCREAMING_SNAKE_CASE",
    rename_all_fields = "camelCase"
)]
pub enum UiAction {
    Navigate { page: Page },
    NavigateWithFilters { page: Page, filters: SearchNftsParams },
    AddToCart { nft_id: String, nft_name: String },
    AddToFavorites { nft_id: String, nft_name: String },
    CreatePriceAlert(PriceAlertParams),
    ShowCollectionDetails(MarketCollection),
}

impl UiAction {
    pub fn kind(&self) -> UiActionType {
        match self {
            UiAction::Navigate { .. } => UiActionType::Navigate,
            UiAction::NavigateWithFilters { .. } => UiActionType::NavigateWithFilters,
            UiAction::AddToCart { .. } => UiActionType::AddToCart,
            UiAction::AddToFavorites { .. } => UiActionType::AddToFavorites,
            UiAction::CreatePriceAlert(_) => UiActionType::CreatePriceAlert,
            UiAction::ShowCollectionDetails(_) => UiActionType::ShowCollectionDetails,
        }
    }

    /// The navigation this directive implies, if any.
    pub fn navigation(&self) -> Option<Navigation> {
        match self {
            UiAction::Navigate { page } => Some(Navigation { path: page.path(), filters: None }),
            UiAction::NavigateWithFilters { page, filters } => Some(Navigation {
                path: page.path(),
                filters: Some(filters.clone()),
            }),
            _ => None,
        }
    }
}

impl From<NavigateParams> for UiAction {
    fn from(params: NavigateParams) -> Self {
        UiAction::Navigate { page: params.page }
    }
}

/// Deferred route change derived from a navigation directive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Navigation {
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filters: Option<SearchNftsParams>,
}

/// Outcome of one handler invocation; consumed by the conversation controller and
/// then discarded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionResult {
    pub success: bool,
    /// Markdown shown to the user verbatim.
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ui_action: Option<UiAction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ActionErrorKind>,
}

impl ActionResult {
    pub fn ok(message: impl Into<String>) -> Self {
        Self { success: true, message: message.into(), data: None, ui_action: None, error: None }
    }

    pub fn failed(kind: ActionErrorKind, message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            data: None,
            ui_action: None,
            error: Some(kind),
        }
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    pub fn with_ui_action(mut self, action: UiAction) -> Self {
        self.ui_action = Some(action);
        self
    }

    pub fn navigation(&self) -> Option<Navigation> {
        self.ui_action.as_ref().and_then(UiAction::navigation)
    }
}
