use crate::models::ChatMessage;

pub const WELCOME_MESSAGE: &str = "👋 **Welcome to ROMA NFT Marketplace!**

I'm ROMA AI, your intelligent NFT assistant with **ACTION CAPABILITIES**! I can:

🎨 **Search & Filter NFTs** - \"Show me Azuki NFTs under 10 ETH\"
💎 **Analyze Collections** - \"Analyze Bored Ape Yacht Club\"
🛒 **Manage Cart & Favorites** - \"Add this to my cart\"
📊 **Market Intelligence** - \"Show market stats\"
🔔 **Price Alerts** - \"Alert me when BAYC drops below 15 ETH\"
💰 **Investment Advice** - \"What should I buy with 5 ETH?\"
🔗 **Navigate** - \"Take me to marketplace\"

**Try these commands:**
• \"Search for rare Azuki NFTs\"
• \"Analyze CryptoPunks\"
• \"Show me market statistics\"
• \"What's the best investment for 10 ETH?\"

I don't just talk - I take action! 🚀";

/// One-click prompts offered next to the chat input.
pub const QUICK_PROMPTS: [&str; 6] = [
    "Search for rare Azuki NFTs",
    "Analyze CryptoPunks",
    "Show me market statistics",
    "What's the best investment for 10 ETH?",
    "Alert me when BAYC drops below 15 ETH",
    "Take me to the marketplace",
];

pub fn welcome_message() -> ChatMessage {
    ChatMessage::assistant(WELCOME_MESSAGE)
}
