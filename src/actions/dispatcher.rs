use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::{json, Map, Value};
use tracing::{info, warn};

use super::catalog::{find_action, ActionKind};
use super::params::{
    AlertType, AnalyzeCollectionParams, InvestmentAdviceParams, MarketStatsParams,
    NavigateParams, NftRefParams, Page, PriceAlertParams, RiskTolerance, SearchNftsParams,
};
use super::{ActionErrorKind, ActionResult, UiAction};
use crate::market::MarketData;

const TOP_COLLECTIONS: usize = 5;

/// Executes function-call intents against the local handlers.
///
/// `execute` never panics on bad input and never returns an error: every failure is
/// folded into an [`ActionResult`] with `success: false`.
#[derive(Clone)]
pub struct ActionDispatcher {
    market: Arc<dyn MarketData>,
}

impl ActionDispatcher {
    pub fn new(market: Arc<dyn MarketData>) -> Self {
        Self { market }
    }

    pub fn execute(&self, name: &str, raw_arguments: &str) -> ActionResult {
        info!("Executing action {name} with args {raw_arguments}");

        let args = match parse_arguments(raw_arguments) {
            Ok(args) => args,
            Err(reason) => {
                warn!("Malformed arguments for {name}: {reason}");
                return malformed(name, reason);
            }
        };

        let kind = match find_action(name) {
            Some(spec) => spec.kind,
            None => {
                warn!("Model requested unknown action {name}");
                return ActionResult::failed(
                    ActionErrorKind::UnknownAction,
                    format!("❌ Unknown action: {name}"),
                );
            }
        };

        match kind {
            ActionKind::SearchNfts => self.run(kind, args, search_nfts),
            ActionKind::AnalyzeCollection => self.run(kind, args, |p| self.analyze_collection(p)),
            ActionKind::AddToCart => self.run(kind, args, add_to_cart),
            ActionKind::AddToFavorites => self.run(kind, args, add_to_favorites),
            ActionKind::GetMarketStats => self.run(kind, args, |p| self.market_stats(p)),
            ActionKind::CreatePriceAlert => self.run(kind, args, create_price_alert),
            ActionKind::GetInvestmentAdvice => {
                self.run(kind, args, |p| self.investment_advice(p))
            }
            ActionKind::NavigateToPage => self.run(kind, args, navigate_to_page),
        }
    }

    fn run<P, F>(&self, kind: ActionKind, args: Value, handler: F) -> ActionResult
    where
        P: DeserializeOwned,
        F: FnOnce(P) -> ActionResult,
    {
        match serde_json::from_value::<P>(args) {
            Ok(params) => handler(params),
            Err(e) => {
                warn!("Arguments for {kind} do not match its schema: {e}");
                malformed(kind.as_str(), e.to_string())
            }
        }
    }

    fn analyze_collection(&self, params: AnalyzeCollectionParams) -> ActionResult {
        let query = params.collection_name.trim();
        if query.is_empty() {
            return malformed(
                ActionKind::AnalyzeCollection.as_str(),
                "collectionName must not be empty".to_string(),
            );
        }

        let Some(collection) = self.market.find_collection(query) else {
            return ActionResult::failed(
                ActionErrorKind::NotFound,
                format!(
                    "❌ Collection \"{}\" not found. Available collections: {}",
                    params.collection_name,
                    self.market.collection_names().join(", ")
                ),
            );
        };

        let rising = collection.change_24h > 0.0;
        let (arrow, trend) = if rising { ("📈", "BULLISH") } else { ("📉", "BEARISH") };
        let insight = if collection.change_24h > 5.0 {
            "🟢 Strong upward momentum - consider buying"
        } else if collection.change_24h < -5.0 {
            "🔴 Downward trend - wait for stabilization"
        } else {
            "🟡 Stable price - good for long-term hold"
        };

        let message = format!(
            "📊 **{name} - Deep Analysis**\n\n\
             💰 **Price Metrics:**\n\
             • Floor Price: **{floor} ETH**\n\
             • 24h Volume: **{volume} ETH**\n\
             • 24h Change: {arrow} **{change}%**\n\n\
             📈 **Market Sentiment:** {trend}\n\n\
             🎨 **Collection Info:**\n{description}\n\n\
             💡 **Investment Insight:**\n{insight}\n\n\
             🔗 View full details in Collections page",
            name = collection.name,
            floor = collection.floor_price,
            volume = collection.volume_24h,
            change = signed(collection.change_24h),
            description = collection.description,
        );

        ActionResult::ok(message)
            .with_data(json!(collection))
            .with_ui_action(UiAction::ShowCollectionDetails(collection.clone()))
    }

    fn market_stats(&self, params: MarketStatsParams) -> ActionResult {
        let timeframe = params.timeframe.unwrap_or_default();
        let top = self.market.top_collections(TOP_COLLECTIONS);
        let trending = self.market.trending_collections();
        let summary = self.market.market_summary();

        let top_lines: Vec<String> = top
            .iter()
            .enumerate()
            .map(|(i, c)| {
                format!("{}. **{}** - {} ETH ({}%)", i + 1, c.name, c.volume_24h, signed(c.change_24h))
            })
            .collect();
        let trending_lines: Vec<String> = trending
            .iter()
            .map(|c| format!("• {} (+{}%)", c.name, c.change_24h))
            .collect();
        let sentiment = if summary.avg_change > 0.0 { "🟢 Bullish" } else { "🔴 Bearish" };

        let message = format!(
            "📊 **NFT Market Statistics ({timeframe})**\n\n\
             💎 **Market Overview:**\n\
             • Total Volume: **{total:.1} ETH**\n\
             • Average Change: **{avg:.1}%**\n\
             • Active Collections: **{active}**\n\n\
             🔥 **Top Collections by Volume:**\n{top}\n\n\
             📈 **Trending (Positive Momentum):**\n{trending}\n\n\
             💡 **Market Sentiment:** {sentiment}",
            timeframe = timeframe.as_str(),
            total = summary.total_volume,
            avg = summary.avg_change,
            active = summary.active_collections,
            top = top_lines.join("\n"),
            trending = trending_lines.join("\n"),
        );

        ActionResult::ok(message).with_data(json!({
            "topCollections": top,
            "trendingCollections": trending,
            "marketSummary": summary,
            "timeframe": timeframe.as_str(),
        }))
    }

    fn investment_advice(&self, params: InvestmentAdviceParams) -> ActionResult {
        let budget = params.budget;
        let risk = params.risk_tolerance.unwrap_or_default();
        let interests = match params.interests.as_deref() {
            Some(list) if !list.is_empty() => list.join(", "),
            _ => "general NFTs".to_string(),
        };

        let risk_advice = match risk {
            RiskTolerance::Low => "🟢 Focus on blue-chip collections with proven track records",
            RiskTolerance::Medium => "🟡 Mix of established and emerging collections",
            RiskTolerance::High => "🔴 Consider new launches and high-growth potential projects",
        };
        let opportunities = if budget < 5.0 {
            "• Pudgy Penguins - Strong community\n• Doodles - Growing ecosystem\n• Check trending collections"
        } else if budget < 20.0 {
            "• Azuki - High quality art\n• Clone X - Metaverse utility\n• BAYC derivatives"
        } else {
            "• BAYC - Blue chip status\n• CryptoPunks - Historical value\n• Diversify across 3-5 collections"
        };

        let message = format!(
            "💰 **Investment Advice - {budget} ETH Budget**\n\n\
             📊 **Your Profile:**\n\
             • Budget: **{budget} ETH**\n\
             • Risk Tolerance: **{risk}**\n\
             • Interests: **{interests}**\n\n\
             💡 **Personalized Strategy:**\n{strategy}\n\n\
             🎯 **Risk-Based Approach:**\n{risk_advice}\n\n\
             🔥 **Current Opportunities:**\n{opportunities}\n\n\
             ⚠️ **Risk Warning:** NFT markets are volatile. Only invest what you can afford to lose.",
            risk = risk.as_str().to_uppercase(),
            strategy = self.market.investment_advice(budget),
        );

        ActionResult::ok(message).with_data(json!(params))
    }
}

/// Blank payloads count as `{}`; anything else must be a JSON object.
fn parse_arguments(raw: &str) -> Result<Value, String> {
    if raw.trim().is_empty() {
        return Ok(Value::Object(Map::new()));
    }
    match serde_json::from_str::<Value>(raw) {
        Ok(value @ Value::Object(_)) => Ok(value),
        Ok(other) => Err(format!("arguments must be a JSON object, got {other}")),
        Err(e) => Err(e.to_string()),
    }
}

fn malformed(name: &str, reason: String) -> ActionResult {
    ActionResult::failed(
        ActionErrorKind::MalformedArguments,
        format!("❌ Error executing {name}: {reason}"),
    )
}

fn signed(value: f64) -> String {
    if value > 0.0 {
        format!("+{value}")
    } else {
        value.to_string()
    }
}

fn search_nfts(filters: SearchNftsParams) -> ActionResult {
    let mut active = Vec::new();
    if let Some(collection) = &filters.collection {
        active.push(format!("Collection: {collection}"));
    }
    if let Some(min) = filters.min_price {
        active.push(format!("Min Price: {min} ETH"));
    }
    if let Some(max) = filters.max_price {
        active.push(format!("Max Price: {max} ETH"));
    }
    if let Some(rarity) = filters.rarity {
        active.push(format!("Rarity: {}", rarity.as_str()));
    }
    if let Some(sort) = filters.sort_by {
        active.push(format!("Sort: {}", sort.label()));
    }

    let filter_text = if active.is_empty() {
        String::new()
    } else {
        let bullets: Vec<String> = active.iter().map(|f| format!("• {f}")).collect();
        format!("\n\n🎯 **Active Filters:**\n{}", bullets.join("\n"))
    };

    ActionResult::ok(format!(
        "✅ **Marketplace Search Applied**{filter_text}\n\n💡 Navigating to marketplace with your filters..."
    ))
    .with_data(json!(filters))
    .with_ui_action(UiAction::NavigateWithFilters { page: Page::Marketplace, filters })
}

fn add_to_cart(nft: NftRefParams) -> ActionResult {
    ActionResult::ok(format!(
        "✅ **Added to Cart!**\n\n🎨 \"{}\" has been added to your shopping cart.\n\n\
         💡 You can view your cart and checkout anytime. Multiple items? Save on gas fees!",
        nft.nft_name
    ))
    .with_data(json!(nft))
    .with_ui_action(UiAction::AddToCart { nft_id: nft.nft_id, nft_name: nft.nft_name })
}

fn add_to_favorites(nft: NftRefParams) -> ActionResult {
    ActionResult::ok(format!(
        "❤️ **Added to Favorites!**\n\n🎨 \"{}\" is now in your watchlist.\n\n\
         💡 You'll be notified about price changes and updates!",
        nft.nft_name
    ))
    .with_data(json!(nft))
    .with_ui_action(UiAction::AddToFavorites { nft_id: nft.nft_id, nft_name: nft.nft_name })
}

fn create_price_alert(alert: PriceAlertParams) -> ActionResult {
    let (direction, arrow) = match alert.alert_type {
        AlertType::Below => ("drops below", "📉"),
        AlertType::Above => ("goes above", "📈"),
    };
    ActionResult::ok(format!(
        "🔔 **Price Alert Created!**\n\n{arrow} You'll be notified when **{}** {direction} **{} ETH**\n\n\
         💡 You can manage alerts in your Profile settings.",
        alert.collection_name, alert.target_price
    ))
    .with_data(json!(alert))
    .with_ui_action(UiAction::CreatePriceAlert(alert))
}

fn navigate_to_page(params: NavigateParams) -> ActionResult {
    let blurb = match params.page {
        Page::Marketplace => "🏪 Browse and purchase NFTs from premium collections",
        Page::Create => "✨ Mint your own NFTs and launch collections",
        Page::Profile => "👤 View your NFT portfolio and settings",
        Page::Collections => "📚 Explore all available NFT collections",
        Page::Stats => "📊 View detailed market analytics and trends",
    };
    ActionResult::ok(format!(
        "✅ **Navigating to {} page...**\n\n{blurb}",
        params.page.as_str().to_uppercase()
    ))
    .with_data(json!(params))
    .with_ui_action(params.into())
}
