pub mod conversation;
pub mod message_log;
pub mod reveal;
pub mod welcome;

pub use conversation::{ConversationController, EventSink, TurnState};
