//! Static registry of the actions the assistant may invoke.
//!
//! The same table feeds the provider tool declarations and the `/api/actions`
//! documentation endpoint, so the two can never drift apart.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use serde_json::{json, Map, Value};

/// Handler key for each catalog entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    SearchNfts,
    AnalyzeCollection,
    AddToCart,
    AddToFavorites,
    GetMarketStats,
    CreatePriceAlert,
    GetInvestmentAdvice,
    NavigateToPage,
}

impl ActionKind {
    pub const ALL: [ActionKind; 8] = [
        ActionKind::SearchNfts,
        ActionKind::AnalyzeCollection,
        ActionKind::AddToCart,
        ActionKind::AddToFavorites,
        ActionKind::GetMarketStats,
        ActionKind::CreatePriceAlert,
        ActionKind::GetInvestmentAdvice,
        ActionKind::NavigateToPage,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::SearchNfts => "searchNFTs",
            ActionKind::AnalyzeCollection => "analyzeCollection",
            ActionKind::AddToCart => "addToCart",
            ActionKind::AddToFavorites => "addToFavorites",
            ActionKind::GetMarketStats => "getMarketStats",
            ActionKind::CreatePriceAlert => "createPriceAlert",
            ActionKind::GetInvestmentAdvice => "getInvestmentAdvice",
            ActionKind::NavigateToPage => "navigateToPage",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ActionKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| format!("Unknown action: {s}"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    String,
    Number,
    Boolean,
    Array,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParamSpec {
    pub name: &'static str,
    #[serde(rename = "type")]
    pub ty: ParamType,
    pub required: bool,
    pub description: &'static str,
    #[serde(skip_serializing_if = "no_values")]
    pub allowed: &'static [&'static str],
    /// Element type when `ty` is [`ParamType::Array`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<ParamType>,
}

fn no_values(allowed: &&'static [&'static str]) -> bool {
    allowed.is_empty()
}

impl ParamSpec {
    const fn new(name: &'static str, ty: ParamType, description: &'static str) -> Self {
        Self { name, ty, required: false, description, allowed: &[], items: None }
    }

    const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    const fn one_of(mut self, allowed: &'static [&'static str]) -> Self {
        self.allowed = allowed;
        self
    }

    const fn items(mut self, items: ParamType) -> Self {
        self.items = Some(items);
        self
    }

    fn json_schema(&self) -> Value {
        let mut schema = Map::new();
        schema.insert("type".into(), json!(self.ty));
        schema.insert("description".into(), json!(self.description));
        if !self.allowed.is_empty() {
            schema.insert("enum".into(), json!(self.allowed));
        }
        if let Some(items) = self.items {
            schema.insert("items".into(), json!({ "type": items }));
        }
        Value::Object(schema)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ActionSpec {
    #[serde(skip)]
    pub kind: ActionKind,
    pub name: &'static str,
    pub description: &'static str,
    pub params: &'static [ParamSpec],
}

impl ActionSpec {
    pub fn required_params(&self) -> impl Iterator<Item = &ParamSpec> {
        self.params.iter().filter(|p| p.required)
    }

    /// JSON-schema object describing the parameters, as expected by function-calling APIs.
    pub fn json_schema(&self) -> Value {
        let properties: Map<String, Value> = self
            .params
            .iter()
            .map(|p| (p.name.to_string(), p.json_schema()))
            .collect();
        let required: Vec<&str> = self.required_params().map(|p| p.name).collect();
        json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }
}

pub const RARITIES: &[&str] = &["Common", "Uncommon", "Rare", "Epic", "Legendary"];
pub const SORT_ORDERS: &[&str] = &["price_low", "price_high", "newest", "oldest"];
pub const TIMEFRAMES: &[&str] = &["24h", "7d", "30d"];
pub const ALERT_TYPES: &[&str] = &["below", "above"];
pub const RISK_LEVELS: &[&str] = &["low", "medium", "high"];
pub const PAGES: &[&str] = &["marketplace", "create", "profile", "collections", "stats"];

const NFT_PARAMS: &[ParamSpec] = &[
    ParamSpec::new("nftId", ParamType::String, "The unique identifier of the NFT").required(),
    ParamSpec::new("nftName", ParamType::String, "The name of the NFT").required(),
];

static CATALOG: [ActionSpec; 8] = [
    ActionSpec {
        kind: ActionKind::SearchNfts,
        name: "searchNFTs",
        description: "Search and filter NFTs in the marketplace based on user criteria like price range, collection, or rarity",
        params: &[
            ParamSpec::new(
                "collection",
                ParamType::String,
                "The NFT collection name (e.g., 'Bored Ape Yacht Club', 'Azuki', 'CryptoPunks')",
            ),
            ParamSpec::new("minPrice", ParamType::Number, "Minimum price in ETH"),
            ParamSpec::new("maxPrice", ParamType::Number, "Maximum price in ETH"),
            ParamSpec::new("rarity", ParamType::String, "Rarity tier of the NFT").one_of(RARITIES),
            ParamSpec::new("sortBy", ParamType::String, "Sort order for results").one_of(SORT_ORDERS),
        ],
    },
    ActionSpec {
        kind: ActionKind::AnalyzeCollection,
        name: "analyzeCollection",
        description: "Get detailed analysis and statistics for a specific NFT collection including floor price, volume, and market trends",
        params: &[ParamSpec::new(
            "collectionName",
            ParamType::String,
            "Name of the NFT collection to analyze",
        )
        .required()],
    },
    ActionSpec {
        kind: ActionKind::AddToCart,
        name: "addToCart",
        description: "Add a specific NFT to the user's shopping cart for purchase",
        params: NFT_PARAMS,
    },
    ActionSpec {
        kind: ActionKind::AddToFavorites,
        name: "addToFavorites",
        description: "Add an NFT to the user's favorites/watchlist",
        params: NFT_PARAMS,
    },
    ActionSpec {
        kind: ActionKind::GetMarketStats,
        name: "getMarketStats",
        description: "Get current NFT market statistics including top collections, trending items, and overall market health",
        params: &[ParamSpec::new("timeframe", ParamType::String, "Time period for statistics")
            .one_of(TIMEFRAMES)],
    },
    ActionSpec {
        kind: ActionKind::CreatePriceAlert,
        name: "createPriceAlert",
        description: "Create a price alert that notifies the user when an NFT or collection reaches a specific price",
        params: &[
            ParamSpec::new("collectionName", ParamType::String, "Name of the collection to track")
                .required(),
            ParamSpec::new("targetPrice", ParamType::Number, "Target price in ETH to trigger alert")
                .required(),
            ParamSpec::new(
                "alertType",
                ParamType::String,
                "Trigger when price goes below or above target",
            )
            .required()
            .one_of(ALERT_TYPES),
        ],
    },
    ActionSpec {
        kind: ActionKind::GetInvestmentAdvice,
        name: "getInvestmentAdvice",
        description: "Get personalized NFT investment advice based on user's budget and preferences",
        params: &[
            ParamSpec::new("budget", ParamType::Number, "Investment budget in ETH").required(),
            ParamSpec::new("riskTolerance", ParamType::String, "User's risk tolerance level")
                .one_of(RISK_LEVELS),
            ParamSpec::new(
                "interests",
                ParamType::Array,
                "User's interests (e.g., 'art', 'gaming', 'pfp', 'utility')",
            )
            .items(ParamType::String),
        ],
    },
    ActionSpec {
        kind: ActionKind::NavigateToPage,
        name: "navigateToPage",
        description: "Navigate user to a specific page in the ROMA marketplace",
        params: &[ParamSpec::new("page", ParamType::String, "The page to navigate to")
            .required()
            .one_of(PAGES)],
    },
];

/// Every action, in the order it is advertised to the model.
pub fn list_actions() -> &'static [ActionSpec] {
    &CATALOG
}

pub fn find_action(name: &str) -> Option<&'static ActionSpec> {
    CATALOG.iter().find(|spec| spec.name == name)
}
