use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures_util::FutureExt;
use serde::Serialize;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::message_log::MessageLog;
use super::reveal::reveal_steps;
use super::welcome::welcome_message;
use crate::actions::{ActionDispatcher, Navigation};
use crate::agent::{AiResponse, ChatProvider, FunctionCallIntent, HistoryTurn};
use crate::config::{RevealSettings, TurnSettings};
use crate::errors::AppError;
use crate::models::{ChatMessage, TurnEvent};

pub const MAX_MESSAGE_LENGTH: usize = 8000;
pub const GENERIC_ERROR_REPLY: &str = "Sorry, I encountered an unexpected error. Please try again.";
pub const CANCELLED_REPLY: &str = "Request cancelled.";

/// Where a session's current turn is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TurnState {
    Idle,
    AwaitingProvider,
    DispatchingAction,
    StreamingReply,
}

/// Receives the progress of a turn as it happens.
pub type EventSink = mpsc::Sender<TurnEvent>;

/// The assistant message a turn ended with.
#[derive(Debug, Clone, PartialEq)]
pub struct TurnOutcome {
    pub message: ChatMessage,
    /// Navigation the client should perform once the message has been read.
    pub navigation: Option<Navigation>,
}

struct TurnSlot {
    state: TurnState,
    cancel: CancellationToken,
}

/// Resets the session to idle however the turn ends.
struct TurnGuard {
    slot: Arc<Mutex<TurnSlot>>,
}

impl Drop for TurnGuard {
    fn drop(&mut self) {
        lock(&self.slot).state = TurnState::Idle;
    }
}

/// Runs turns of one chat session: user message in, provider call, then either an
/// action dispatch or a word-by-word reveal of the reply.
///
/// Only one turn is in flight at a time, and once started it runs to completion on
/// its own task even if the caller stops waiting. The controller is the only writer
/// of the session's [`MessageLog`].
pub struct ConversationController<P> {
    provider: Arc<P>,
    dispatcher: ActionDispatcher,
    settings: TurnSettings,
    log: Mutex<MessageLog>,
    slot: Arc<Mutex<TurnSlot>>,
}

impl<P: ChatProvider> ConversationController<P> {
    pub fn new(provider: Arc<P>, dispatcher: ActionDispatcher, settings: TurnSettings) -> Self {
        Self {
            provider,
            dispatcher,
            settings,
            log: Mutex::new(MessageLog::new()),
            slot: Arc::new(Mutex::new(TurnSlot {
                state: TurnState::Idle,
                cancel: CancellationToken::new(),
            })),
        }
    }

    /// Starts the log with the ROMA welcome message.
    pub fn with_welcome(self) -> Self {
        *lock(&self.log) = MessageLog::with_greeting(welcome_message());
        self
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    pub fn state(&self) -> TurnState {
        lock(&self.slot).state
    }

    pub fn is_loading(&self) -> bool {
        self.state() != TurnState::Idle
    }

    pub fn messages(&self) -> Vec<ChatMessage> {
        lock(&self.log).snapshot()
    }

    /// Cuts the current turn short. A pending provider call is abandoned; a reveal
    /// in progress jumps to the full text. Returns `false` when idle.
    pub fn cancel(&self) -> bool {
        let slot = lock(&self.slot);
        if slot.state == TurnState::Idle {
            return false;
        }
        info!("Cancelling turn in state {:?}", slot.state);
        slot.cancel.cancel();
        true
    }

    /// Runs one turn for `text`, publishing progress to `events` when given. Without
    /// a sink nobody watches the reveal, so the reply is written out at once.
    ///
    /// Fails only on invalid input or when a turn is already in flight; provider and
    /// action failures end the turn with an assistant message instead. Dropping the
    /// returned future does not stop the turn.
    pub async fn submit(
        self: &Arc<Self>,
        text: &str,
        events: Option<EventSink>,
    ) -> Result<TurnOutcome, AppError> {
        validate_message(text)?;
        let (guard, cancel) = self.begin_turn()?;
        info!("Turn started ({} chars) with {}", text.len(), self.provider.name());

        let history = lock(&self.log).recent_turns(self.settings.history_limit);
        let user = ChatMessage::user(text);
        lock(&self.log).append(user.clone());

        let turn = tokio::spawn(Arc::clone(self).complete_turn(guard, user, history, cancel, events));
        turn.await.map_err(|e| {
            error!("Turn task failed: {e}");
            AppError::Unexpected(e.to_string())
        })
    }

    fn begin_turn(&self) -> Result<(TurnGuard, CancellationToken), AppError> {
        let mut slot = lock(&self.slot);
        if slot.state != TurnState::Idle {
            warn!("Rejected message while turn is {:?}", slot.state);
            return Err(AppError::TurnInProgress);
        }
        slot.state = TurnState::AwaitingProvider;
        slot.cancel = CancellationToken::new();
        Ok((TurnGuard { slot: Arc::clone(&self.slot) }, slot.cancel.clone()))
    }

    async fn complete_turn(
        self: Arc<Self>,
        guard: TurnGuard,
        user: ChatMessage,
        history: Vec<HistoryTurn>,
        cancel: CancellationToken,
        events: Option<EventSink>,
    ) -> TurnOutcome {
        let events = events.as_ref();
        emit(events, TurnEvent::UserMessage { message: user.clone() }).await;

        let turn = AssertUnwindSafe(self.run_turn(&user.content, &history, &cancel, events))
            .catch_unwind()
            .await;
        let outcome = match turn {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(e)) => {
                error!("Turn failed: {e}");
                self.fail_turn(events).await
            }
            Err(panic) => {
                error!("Turn panicked: {}", panic_message(panic.as_ref()));
                self.fail_turn(events).await
            }
        };

        drop(guard);
        info!("Turn finished");
        emit(events, TurnEvent::TurnEnd).await;
        outcome
    }

    fn set_state(&self, state: TurnState) {
        lock(&self.slot).state = state;
    }

    async fn run_turn(
        &self,
        text: &str,
        history: &[HistoryTurn],
        cancel: &CancellationToken,
        events: Option<&EventSink>,
    ) -> Result<TurnOutcome, AppError> {
        let response = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Ok(self.finish_cancelled(events).await),
            response = self.provider.send(text, history) => response?,
        };

        match response {
            AiResponse::FunctionCall(intent) => Ok(self.dispatch_action(intent, events).await),
            AiResponse::Text { content } => Ok(self.stream_reply(content, cancel, events).await),
        }
    }

    async fn dispatch_action(
        &self,
        intent: FunctionCallIntent,
        events: Option<&EventSink>,
    ) -> TurnOutcome {
        self.set_state(TurnState::DispatchingAction);

        let result = self.dispatcher.execute(&intent.name, &intent.arguments);
        if !result.success {
            warn!("Action {} failed: {:?}", intent.name, result.error);
        } else if let Some(action) = &result.ui_action {
            debug!("Action {} requested {:?}", intent.name, action.kind());
        }
        let navigation = result.navigation();
        let message = ChatMessage::assistant(result.message.clone()).with_action(intent, result);

        lock(&self.log).append(message.clone());
        emit(events, TurnEvent::AssistantMessage { message: message.clone() }).await;

        if let Some(navigation) = &navigation {
            self.schedule_navigation(navigation.clone(), events);
        }
        TurnOutcome { message, navigation }
    }

    async fn stream_reply(
        &self,
        content: String,
        cancel: &CancellationToken,
        events: Option<&EventSink>,
    ) -> TurnOutcome {
        self.set_state(TurnState::StreamingReply);
        let reveal = if events.is_some() { self.settings.reveal } else { RevealSettings::INSTANT };

        let mut message = ChatMessage::assistant("");
        let message_id = message.id.clone();
        lock(&self.log).append(message.clone());
        emit(events, TurnEvent::StreamStart { message_id: message_id.clone() }).await;

        for step in reveal_steps(&content, &reveal) {
            lock(&self.log).update_last(&message_id, &step.prefix);
            emit(
                events,
                TurnEvent::StreamChunk { message_id: message_id.clone(), content: step.chunk },
            )
            .await;

            if step.delay.is_zero() {
                continue;
            }
            tokio::select! {
                _ = cancel.cancelled() => {
                    debug!("Reveal cut short");
                    break;
                }
                _ = tokio::time::sleep(step.delay) => {}
            }
        }

        lock(&self.log).update_last(&message_id, &content);
        emit(
            events,
            TurnEvent::StreamEnd { message_id: message_id.clone(), full_content: content.clone() },
        )
        .await;

        message.content = content;
        TurnOutcome { message, navigation: None }
    }

    async fn finish_cancelled(&self, events: Option<&EventSink>) -> TurnOutcome {
        info!("Provider call abandoned");
        self.append_reply(CANCELLED_REPLY, events).await
    }

    async fn fail_turn(&self, events: Option<&EventSink>) -> TurnOutcome {
        self.append_reply(GENERIC_ERROR_REPLY, events).await
    }

    async fn append_reply(&self, content: &str, events: Option<&EventSink>) -> TurnOutcome {
        let message = ChatMessage::assistant(content);
        lock(&self.log).append(message.clone());
        emit(events, TurnEvent::AssistantMessage { message: message.clone() }).await;
        TurnOutcome { message, navigation: None }
    }

    fn schedule_navigation(&self, navigation: Navigation, events: Option<&EventSink>) {
        let Some(tx) = events.cloned() else {
            return;
        };
        let delay = self.settings.navigation_delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            debug!("Navigating to {}", navigation.path);
            let _ = tx.send(TurnEvent::Navigate { navigation }).await;
        });
    }
}

pub fn validate_message(text: &str) -> Result<(), AppError> {
    if text.trim().is_empty() {
        warn!("Rejected empty message");
        return Err(AppError::EmptyField { field_name: "message".to_string() });
    }
    if text.len() > MAX_MESSAGE_LENGTH {
        warn!("Rejected message of {} bytes", text.len());
        return Err(AppError::FieldTooLong {
            field_name: "message".to_string(),
            max_length: MAX_MESSAGE_LENGTH,
            actual_length: text.len(),
        });
    }
    Ok(())
}

/// The receiver going away only means nobody is watching; the turn carries on.
async fn emit(events: Option<&EventSink>, event: TurnEvent) {
    if let Some(tx) = events {
        let _ = tx.send(event).await;
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s
    } else {
        "unknown panic"
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::time::Duration;

    use tokio::sync::oneshot;

    use super::*;
    use crate::actions::UiAction;
    use crate::actions::params::Page;
    use crate::market::StaticMarket;
    use crate::models::MessageRole;

    /// Replies from a fixed script and records what it was sent.
    #[derive(Default)]
    struct ScriptedProvider {
        replies: Mutex<VecDeque<Result<AiResponse, AppError>>>,
        seen: Mutex<Vec<(String, Vec<HistoryTurn>)>>,
    }

    impl ScriptedProvider {
        fn replying(replies: Vec<Result<AiResponse, AppError>>) -> Self {
            Self { replies: Mutex::new(replies.into()), seen: Mutex::default() }
        }
    }

    impl ChatProvider for ScriptedProvider {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn send(&self, message: &str, history: &[HistoryTurn]) -> Result<AiResponse, AppError> {
            self.seen.lock().unwrap().push((message.to_string(), history.to_vec()));
            let next = self.replies.lock().unwrap().pop_front();
            next.unwrap_or_else(|| Ok(AiResponse::text("ok")))
        }
    }

    /// Holds its reply until the test releases it.
    struct GatedProvider {
        gate: Mutex<Option<oneshot::Receiver<Result<AiResponse, AppError>>>>,
    }

    impl ChatProvider for GatedProvider {
        fn name(&self) -> &str {
            "gated"
        }

        async fn send(&self, _: &str, _: &[HistoryTurn]) -> Result<AiResponse, AppError> {
            let gate = self.gate.lock().unwrap().take();
            match gate {
                Some(rx) => rx.await.map_err(|e| AppError::Unexpected(e.to_string()))?,
                None => Ok(AiResponse::text("ungated")),
            }
        }
    }

    struct PanickingProvider;

    impl ChatProvider for PanickingProvider {
        fn name(&self) -> &str {
            "panicking"
        }

        async fn send(&self, _: &str, _: &[HistoryTurn]) -> Result<AiResponse, AppError> {
            panic!("provider exploded")
        }
    }

    fn instant() -> TurnSettings {
        TurnSettings { reveal: RevealSettings::INSTANT, ..TurnSettings::default() }
    }

    fn controller<P: ChatProvider>(
        provider: P,
        settings: TurnSettings,
    ) -> Arc<ConversationController<P>> {
        let dispatcher = ActionDispatcher::new(Arc::new(StaticMarket::default()));
        Arc::new(ConversationController::new(Arc::new(provider), dispatcher, settings))
    }

    fn gated() -> (oneshot::Sender<Result<AiResponse, AppError>>, GatedProvider) {
        let (release, gate) = oneshot::channel();
        (release, GatedProvider { gate: Mutex::new(Some(gate)) })
    }

    async fn wait_until_idle<P: ChatProvider>(chat: &ConversationController<P>) {
        while chat.is_loading() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }

    fn drain(rx: &mut mpsc::Receiver<TurnEvent>) -> Vec<TurnEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    #[tokio::test]
    async fn text_reply_is_revealed_through_growing_prefixes() {
        let chat = controller(
            ScriptedProvider::replying(vec![Ok(AiResponse::text("Hello world"))]),
            instant(),
        );
        let (tx, mut rx) = mpsc::channel(64);

        let outcome = chat.submit("hi", Some(tx.clone())).await.unwrap();
        assert_eq!(outcome.message.content, "Hello world");
        assert_eq!(outcome.navigation, None);

        let mut shown = String::new();
        let mut prefixes = Vec::new();
        for event in drain(&mut rx) {
            if let TurnEvent::StreamChunk { content, .. } = event {
                shown.push_str(&content);
                prefixes.push(shown.clone());
            }
        }
        assert_eq!(prefixes, vec!["Hello", "Hello world"]);

        let messages = chat.messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, MessageRole::User);
        assert_eq!(messages[1].role, MessageRole::Assistant);
        assert_eq!(messages[1].content, "Hello world");
        assert!(!chat.is_loading());
    }

    #[tokio::test]
    async fn events_follow_turn_order() {
        let chat = controller(ScriptedProvider::replying(vec![Ok(AiResponse::text("a b"))]), instant());
        let (tx, mut rx) = mpsc::channel(64);
        chat.submit("hi", Some(tx.clone())).await.unwrap();

        let events = drain(&mut rx);
        assert!(matches!(events.first(), Some(TurnEvent::UserMessage { message }) if message.content == "hi"));
        assert!(matches!(events[1], TurnEvent::StreamStart { .. }));
        assert!(matches!(
            &events[events.len() - 2],
            TurnEvent::StreamEnd { full_content, .. } if full_content == "a b"
        ));
        assert_eq!(events.last(), Some(&TurnEvent::TurnEnd));
    }

    #[tokio::test(start_paused = true)]
    async fn reveal_waits_between_words() {
        let settings = TurnSettings::default();
        let chat = controller(
            ScriptedProvider::replying(vec![Ok(AiResponse::text("one two three"))]),
            settings,
        );
        let (tx, _rx) = mpsc::channel(64);
        let started = tokio::time::Instant::now();
        let outcome = chat.submit("count", Some(tx)).await.unwrap();

        assert_eq!(outcome.message.content, "one two three");
        let elapsed = started.elapsed();
        assert!(elapsed >= settings.reveal.min_delay * 3);
        assert!(elapsed <= settings.reveal.max_delay * 3);
    }

    #[tokio::test]
    async fn function_call_appends_single_action_message() {
        let chat = controller(
            ScriptedProvider::replying(vec![Ok(AiResponse::function_call(
                "analyzeCollection",
                r#"{"collectionName":"azuki"}"#,
            ))]),
            instant(),
        );

        let outcome = chat.submit("Analyze Azuki", None).await.unwrap();
        let messages = chat.messages();
        assert_eq!(messages.len(), 2);

        let reply = &messages[1];
        assert_eq!(reply, &outcome.message);
        assert_eq!(reply.function_call.as_ref().unwrap().name, "analyzeCollection");
        let result = reply.function_result.as_ref().unwrap();
        assert!(result.success);
        assert_eq!(reply.content, result.message);
        assert!(matches!(result.ui_action, Some(UiAction::ShowCollectionDetails(_))));
        assert_eq!(outcome.navigation, None);
    }

    #[tokio::test]
    async fn failed_action_is_shown_verbatim() {
        let chat = controller(
            ScriptedProvider::replying(vec![Ok(AiResponse::function_call("unknownAction", "{}"))]),
            instant(),
        );
        let outcome = chat.submit("do a thing", None).await.unwrap();
        assert!(outcome.message.content.contains("Unknown action: unknownAction"));
        assert!(!outcome.message.function_result.unwrap().success);
        assert!(!chat.is_loading());
    }

    #[tokio::test(start_paused = true)]
    async fn navigation_is_deferred() {
        let chat = controller(
            ScriptedProvider::replying(vec![Ok(AiResponse::function_call(
                "navigateToPage",
                r#"{"page":"marketplace"}"#,
            ))]),
            instant(),
        );
        let (tx, mut rx) = mpsc::channel(64);
        let started = tokio::time::Instant::now();

        let outcome = chat.submit("Take me to the marketplace", Some(tx.clone())).await.unwrap();
        let navigation = outcome.navigation.unwrap();
        assert_eq!(navigation.path, Page::Marketplace.path());

        let immediate = drain(&mut rx);
        assert!(!immediate.iter().any(|e| matches!(e, TurnEvent::Navigate { .. })));
        assert_eq!(immediate.last(), Some(&TurnEvent::TurnEnd));

        let next = rx.recv().await.unwrap();
        assert_eq!(next, TurnEvent::Navigate { navigation });
        assert!(started.elapsed() >= Duration::from_millis(1500));
    }

    #[tokio::test]
    async fn search_navigation_carries_filters() {
        let chat = controller(
            ScriptedProvider::replying(vec![Ok(AiResponse::function_call(
                "searchNFTs",
                r#"{"maxPrice":5}"#,
            ))]),
            instant(),
        );
        let outcome = chat.submit("NFTs under 5 ETH", None).await.unwrap();
        let filters = outcome.navigation.unwrap().filters.unwrap();
        assert_eq!(filters.max_price, Some(5.0));
        assert_eq!(filters.collection, None);
    }

    #[tokio::test]
    async fn provider_error_becomes_generic_reply() {
        let chat = controller(
            ScriptedProvider::replying(vec![Err(AppError::Unexpected("boom".into()))]),
            instant(),
        );
        let outcome = chat.submit("hi", None).await.unwrap();
        assert_eq!(outcome.message.content, GENERIC_ERROR_REPLY);
        assert_eq!(chat.messages().len(), 2);
        assert_eq!(chat.state(), TurnState::Idle);
    }

    #[tokio::test]
    async fn provider_panic_becomes_generic_reply() {
        let chat = controller(PanickingProvider, instant());
        let outcome = chat.submit("hi", None).await.unwrap();
        assert_eq!(outcome.message.content, GENERIC_ERROR_REPLY);
        assert!(!chat.is_loading());

        // the session stays usable
        let again = chat.submit("still there?", None).await.unwrap();
        assert_eq!(again.message.content, GENERIC_ERROR_REPLY);
        assert_eq!(chat.messages().len(), 4);
    }

    #[tokio::test]
    async fn loading_spans_the_turn_and_second_submit_is_rejected() {
        let releases: Vec<(Result<AiResponse, AppError>, &str)> = vec![
            (Ok(AiResponse::text("done")), "done"),
            (
                Ok(AiResponse::function_call("getMarketStats", "{}")),
                "Market Statistics",
            ),
            (Err(AppError::Unexpected("boom".into())), GENERIC_ERROR_REPLY),
        ];

        for (reply, expected) in releases {
            let (release, provider) = gated();
            let chat = controller(provider, instant());
            assert!(!chat.is_loading());

            let turn = tokio::spawn({
                let chat = chat.clone();
                async move { chat.submit("first", None).await }
            });
            while !chat.is_loading() {
                tokio::task::yield_now().await;
            }

            assert_eq!(chat.state(), TurnState::AwaitingProvider);
            assert_eq!(chat.messages().len(), 1, "user message is shown before the reply");

            let rejected = chat.submit("second", None).await.unwrap_err();
            assert!(rejected.is_busy());
            assert_eq!(chat.messages().len(), 1);

            release.send(reply).unwrap();
            let outcome = turn.await.unwrap().unwrap();
            assert!(outcome.message.content.contains(expected), "{}", outcome.message.content);
            assert!(!chat.is_loading());
            assert_eq!(chat.messages().len(), 2);
        }
    }

    #[tokio::test]
    async fn cancel_abandons_pending_provider_call() {
        let (_release, provider) = gated();
        let chat = controller(provider, instant());
        assert!(!chat.cancel());

        let turn = tokio::spawn({
            let chat = chat.clone();
            async move { chat.submit("slow question", None).await }
        });
        while !chat.is_loading() {
            tokio::task::yield_now().await;
        }

        assert!(chat.cancel());
        let outcome = turn.await.unwrap().unwrap();
        assert_eq!(outcome.message.content, CANCELLED_REPLY);
        assert!(!chat.is_loading());
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_completes_reveal_immediately() {
        let settings = TurnSettings {
            reveal: RevealSettings {
                min_delay: Duration::from_secs(10),
                max_delay: Duration::from_secs(10),
            },
            ..TurnSettings::default()
        };
        let text = "a reply long enough to take a while";
        let chat = controller(ScriptedProvider::replying(vec![Ok(AiResponse::text(text))]), settings);
        let (tx, _rx) = mpsc::channel(64);

        let turn = tokio::spawn({
            let chat = chat.clone();
            async move { chat.submit("hi", Some(tx)).await }
        });
        while chat.state() != TurnState::StreamingReply {
            tokio::task::yield_now().await;
        }
        let started = tokio::time::Instant::now();
        chat.cancel();

        let outcome = turn.await.unwrap().unwrap();
        assert_eq!(outcome.message.content, text);
        assert_eq!(chat.messages()[1].content, text);
        assert!(started.elapsed() < Duration::from_secs(10));
    }

    #[tokio::test]
    async fn invalid_input_never_starts_a_turn() {
        let chat = controller(ScriptedProvider::default(), instant());

        assert!(chat.submit("   ", None).await.unwrap_err().is_validation());
        let long = "x".repeat(MAX_MESSAGE_LENGTH + 1);
        assert!(matches!(
            chat.submit(&long, None).await,
            Err(AppError::FieldTooLong { actual_length, .. }) if actual_length == MAX_MESSAGE_LENGTH + 1
        ));
        assert!(chat.messages().is_empty());
        assert!(!chat.is_loading());
    }

    #[tokio::test]
    async fn history_replays_recent_messages() {
        let provider = Arc::new(ScriptedProvider::replying(vec![
            Ok(AiResponse::text("first reply")),
            Ok(AiResponse::text("second reply")),
        ]));
        let dispatcher = ActionDispatcher::new(Arc::new(StaticMarket::default()));
        let settings = TurnSettings { history_limit: 3, ..instant() };
        let chat =
            Arc::new(ConversationController::new(provider.clone(), dispatcher, settings).with_welcome());

        chat.submit("one", None).await.unwrap();
        chat.submit("two", None).await.unwrap();

        let seen = provider.seen.lock().unwrap();
        assert!(seen[0].1.is_empty(), "the welcome message is not replayed");
        let (message, history) = &seen[1];
        assert_eq!(message, "two");
        let contents: Vec<&str> = history.iter().map(|t| t.content.as_str()).collect();
        assert_eq!(contents, vec!["one", "first reply"]);
        assert_eq!(history[0].role, MessageRole::User);
    }

    #[tokio::test]
    async fn dropped_receiver_does_not_stop_the_turn() {
        let chat = controller(ScriptedProvider::default(), instant());
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let outcome = chat.submit("hi", Some(tx.clone())).await.unwrap();
        assert_eq!(outcome.message.content, "ok");
    }

    #[tokio::test(start_paused = true)]
    async fn reveal_without_a_sink_is_instant() {
        let words = vec!["word"; 200].join(" ");
        let chat = controller(
            ScriptedProvider::replying(vec![Ok(AiResponse::text(words.clone()))]),
            TurnSettings::default(),
        );
        let started = tokio::time::Instant::now();

        let outcome = chat.submit("tell me a lot", None).await.unwrap();
        assert_eq!(outcome.message.content, words);
        assert!(started.elapsed() < TurnSettings::default().reveal.min_delay);
    }

    #[tokio::test(start_paused = true)]
    async fn dropped_caller_mid_reveal_still_completes_the_turn() {
        let text = "one two three four five six seven eight nine ten";
        let chat = controller(
            ScriptedProvider::replying(vec![Ok(AiResponse::text(text))]),
            TurnSettings::default(),
        );
        let (tx, _rx) = mpsc::channel(64);

        let cut = tokio::time::timeout(Duration::from_millis(100), chat.submit("hi", Some(tx))).await;
        assert!(cut.is_err(), "the reveal outlasts the caller");
        assert_eq!(chat.state(), TurnState::StreamingReply);

        wait_until_idle(&chat).await;
        let messages = chat.messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[1].content, text);
    }

    #[tokio::test(start_paused = true)]
    async fn dropped_caller_while_awaiting_provider_still_gets_a_reply() {
        let (release, provider) = gated();
        let chat = controller(provider, instant());

        let cut = tokio::time::timeout(Duration::from_millis(100), chat.submit("again", None)).await;
        assert!(cut.is_err());
        assert_eq!(chat.state(), TurnState::AwaitingProvider);

        release.send(Ok(AiResponse::text("late reply"))).unwrap();
        wait_until_idle(&chat).await;

        let messages = chat.messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[1].role, MessageRole::Assistant);
        assert_eq!(messages[1].content, "late reply");
    }
}
