use serde::{Deserialize, Serialize};

/// One marketplace collection as seen by the assistant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketCollection {
    pub id: String,
    pub name: String,
    pub floor_price: f64,
    pub volume_24h: f64,
    pub change_24h: f64,
    pub category: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketSummary {
    pub total_volume: f64,
    pub avg_change: f64,
    pub active_collections: usize,
}

/// Read-only market snapshot shared by the action handlers and the provider preamble.
///
/// Implementors only need to expose the raw collection list; the aggregate views are
/// derived from it.
pub trait MarketData: Send + Sync {
    fn collections(&self) -> &[MarketCollection];

    /// Top `n` collections by 24h volume, highest first.
    fn top_collections(&self, n: usize) -> Vec<MarketCollection> {
        let mut sorted = self.collections().to_vec();
        sorted.sort_by(|a, b| b.volume_24h.total_cmp(&a.volume_24h));
        sorted.truncate(n);
        sorted
    }

    /// Collections with positive 24h change, strongest momentum first.
    fn trending_collections(&self) -> Vec<MarketCollection> {
        let mut trending: Vec<MarketCollection> = self
            .collections()
            .iter()
            .filter(|c| c.change_24h > 0.0)
            .cloned()
            .collect();
        trending.sort_by(|a, b| b.change_24h.total_cmp(&a.change_24h));
        trending
    }

    fn market_summary(&self) -> MarketSummary {
        let collections = self.collections();
        let total_volume: f64 = collections.iter().map(|c| c.volume_24h).sum();
        let avg_change = if collections.is_empty() {
            0.0
        } else {
            collections.iter().map(|c| c.change_24h).sum::<f64>() / collections.len() as f64
        };
        MarketSummary {
            total_volume,
            avg_change,
            active_collections: collections.len(),
        }
    }

    /// Canned strategy text for a budget in ETH.
    fn investment_advice(&self, budget: f64) -> String {
        if budget < 5.0 {
            "With a budget under 5 ETH, focus on emerging collections with strong communities. \
             Buy 1-2 quality pieces rather than many cheap ones, and keep some ETH aside for gas."
                .to_string()
        } else if budget < 20.0 {
            "A mid-range budget lets you enter established collections near their floor. \
             Split it across 2-3 collections with real utility and an active roadmap."
                .to_string()
        } else {
            "With 20+ ETH you can hold blue-chip assets. Anchor the portfolio with one \
             blue-chip piece and diversify the rest across 3-5 collections."
                .to_string()
        }
    }

    /// First collection whose name contains `query`, ignoring case.
    fn find_collection(&self, query: &str) -> Option<&MarketCollection> {
        let needle = query.to_lowercase();
        self.collections()
            .iter()
            .find(|c| c.name.to_lowercase().contains(&needle))
    }

    fn collection_names(&self) -> Vec<&str> {
        self.collections().iter().map(|c| c.name.as_str()).collect()
    }
}

/// The built-in mock snapshot the marketplace ships with.
#[derive(Debug, Clone)]
pub struct StaticMarket {
    collections: Vec<MarketCollection>,
}

impl StaticMarket {
    pub fn new(collections: Vec<MarketCollection>) -> Self {
        Self { collections }
    }
}

impl Default for StaticMarket {
    fn default() -> Self {
        Self::new(default_collections())
    }
}

impl MarketData for StaticMarket {
    fn collections(&self) -> &[MarketCollection] {
        &self.collections
    }
}

fn collection(
    id: &str,
    name: &str,
    floor_price: f64,
    volume_24h: f64,
    change_24h: f64,
    category: &str,
    description: &str,
) -> MarketCollection {
    MarketCollection {
        id: id.to_string(),
        name: name.to_string(),
        floor_price,
        volume_24h,
        change_24h,
        category: category.to_string(),
        description: description.to_string(),
    }
}

fn default_collections() -> Vec<MarketCollection> {
    vec![
        collection("1", "Bored Ape Yacht Club", 28.5, 1234.5, 12.5, "pfp",
            "10,000 unique Bored Ape NFTs granting membership to the Yacht Club and its members-only perks."),
        collection("2", "Azuki", 14.2, 856.3, -5.2, "pfp",
            "Anime-inspired avatars building a decentralized brand from the Garden community."),
        collection("3", "CryptoPunks", 45.8, 2156.7, 8.3, "pfp",
            "One of the earliest NFT projects on Ethereum: 10,000 algorithmically generated punks."),
        collection("4", "Pudgy Penguins", 8.9, 542.1, 15.7, "pfp",
            "8,888 penguins spreading good vibes, backed by toys and a fast-growing IP."),
        collection("5", "Doodles", 3.2, 234.5, -2.1, "art",
            "Hand-drawn pastel characters by Burnt Toast with a community-driven ecosystem."),
        collection("6", "Clone X", 2.1, 189.3, 6.4, "pfp",
            "RTFKT and Takashi Murakami's 3D avatars built for metaverse wearables."),
        collection("7", "Moonbirds", 6.7, 445.8, -3.5, "pfp",
            "Pixel-art owls with nesting mechanics and PROOF Collective membership."),
        collection("8", "Otherdeed", 1.4, 312.6, 3.9, "gaming",
            "Land deeds for Otherside, Yuga Labs' interoperable metaverse."),
        collection("9", "Mutant Ape Yacht Club", 5.6, 678.2, 4.1, "pfp",
            "Mutated apes created by exposing Bored Apes to Mutant Serum."),
        collection("10", "DeGods", 3.9, 298.4, -7.8, "pfp",
            "A digital art collection and global community of creators and builders."),
        collection("11", "Art Blocks", 2.8, 156.9, 1.2, "art",
            "Generative art minted on demand from on-chain scripts."),
        collection("12", "VeeFriends", 1.9, 98.7, -1.4, "utility",
            "Gary Vaynerchuk's characters doubling as access passes to VeeCon."),
        collection("13", "Meebits", 1.2, 87.3, 2.6, "pfp",
            "20,000 3D voxel characters from Larva Labs."),
        collection("14", "Cool Cats", 0.9, 64.5, -4.3, "pfp",
            "Blue cats with a focus on fun, collectibles and a growing brand."),
        collection("15", "World of Women", 1.1, 72.8, 5.3, "art",
            "Celebrating representation and inclusivity through portraits by Yam Karkai."),
    ]
}
