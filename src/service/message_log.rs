use crate::agent::HistoryTurn;
use crate::models::{ChatMessage, MessageRole};

/// Ordered, append-mostly message list of one session.
///
/// Only the conversation controller writes to it; the single in-place edit it
/// allows is on the last message, which is the one being revealed.
#[derive(Debug, Default, Clone)]
pub struct MessageLog {
    messages: Vec<ChatMessage>,
    greeting_id: Option<String>,
}

impl MessageLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_greeting(greeting: ChatMessage) -> Self {
        Self { greeting_id: Some(greeting.id.clone()), messages: vec![greeting] }
    }

    pub fn snapshot(&self) -> Vec<ChatMessage> {
        self.messages.clone()
    }

    pub fn append(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    /// Replaces the content of the last message if it has the given id.
    pub fn update_last(&mut self, id: &str, content: &str) -> bool {
        match self.messages.last_mut() {
            Some(last) if last.id == id => {
                last.content.clear();
                last.content.push_str(content);
                true
            }
            _ => false,
        }
    }

    /// The most recent `limit` non-empty user and assistant messages, oldest first.
    ///
    /// The greeting is left out and the result always opens on a user turn, since
    /// some providers reject a history that starts with the model.
    pub fn recent_turns(&self, limit: usize) -> Vec<HistoryTurn> {
        let mut turns: Vec<HistoryTurn> = self
            .messages
            .iter()
            .rev()
            .filter(|m| self.greeting_id.as_deref() != Some(m.id.as_str()))
            .filter(|m| matches!(m.role, MessageRole::User | MessageRole::Assistant))
            .filter(|m| !m.content.trim().is_empty())
            .take(limit)
            .map(|m| HistoryTurn { role: m.role, content: m.content.clone() })
            .collect();
        turns.reverse();

        let first_user = turns
            .iter()
            .position(|t| t.role == MessageRole::User)
            .unwrap_or(turns.len());
        turns.split_off(first_user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_last_only_touches_matching_message() {
        let mut log = MessageLog::new();
        log.append(ChatMessage::user("hi"));
        let reply = ChatMessage::assistant("");
        let reply_id = reply.id.clone();
        log.append(reply);

        assert!(log.update_last(&reply_id, "Hello"));
        assert_eq!(log.snapshot()[1].content, "Hello");

        let first_id = log.snapshot()[0].id.clone();
        assert!(!log.update_last(&first_id, "rewritten"));
        assert_eq!(log.snapshot()[0].content, "hi");
    }

    #[test]
    fn recent_turns_skip_system_and_empty_messages() {
        let mut log = MessageLog::new();
        log.append(ChatMessage::new(MessageRole::System, "setup"));
        log.append(ChatMessage::user("one"));
        log.append(ChatMessage::assistant(""));
        log.append(ChatMessage::assistant("two"));
        log.append(ChatMessage::user("three"));

        let turns = log.recent_turns(3);
        let contents: Vec<&str> = turns.iter().map(|t| t.content.as_str()).collect();
        assert_eq!(contents, vec!["one", "two", "three"]);

        assert_eq!(log.recent_turns(10).len(), 3);
        assert!(log.recent_turns(0).is_empty());
    }

    #[test]
    fn recent_turns_leave_out_the_greeting_and_open_on_a_user_turn() {
        let mut log = MessageLog::with_greeting(ChatMessage::assistant("Welcome"));
        assert!(log.recent_turns(10).is_empty());

        log.append(ChatMessage::user("one"));
        log.append(ChatMessage::assistant("reply one"));
        log.append(ChatMessage::user("two"));
        log.append(ChatMessage::assistant("reply two"));

        let all: Vec<String> = log.recent_turns(10).into_iter().map(|t| t.content).collect();
        assert_eq!(all, vec!["one", "reply one", "two", "reply two"]);

        // the window of three starts on an assistant reply, which is dropped
        let window = log.recent_turns(3);
        assert_eq!(window[0].role, MessageRole::User);
        let contents: Vec<&str> = window.iter().map(|t| t.content.as_str()).collect();
        assert_eq!(contents, vec!["two", "reply two"]);
    }
}
