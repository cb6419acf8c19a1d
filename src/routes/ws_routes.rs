use std::future;
use std::pin::pin;
use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use futures_util::{SinkExt, Stream, StreamExt};
use tokio::sync::mpsc;
use tracing::{info, warn};

use super::AppState;
use crate::agent::ChatProvider;
use crate::models::{TurnEvent, WsClientMessage};
use crate::service::{ConversationController, EventSink};

const EVENT_BUFFER: usize = 64;

/// GET `/ws/chat`: upgrades to a WebSocket carrying one chat session.
pub async fn ws_chat_handler<P: ChatProvider>(
    ws: WebSocketUpgrade,
    State(state): State<AppState<P>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Handles a single WebSocket connection.
///
/// Protocol:
/// - Client sends `{ "type": "chat", "message": "..." }` or `{ "type": "cancel" }`
/// - Server pushes every [`TurnEvent`] of the session's turns as JSON, e.g.
///   1. `{ "type": "user_message", "message": {...} }`
///   2. `{ "type": "stream_start", "message_id": "..." }`
///   3. `{ "type": "stream_chunk", "message_id": "...", "content": "..." }` (repeated)
///   4. `{ "type": "stream_end", "message_id": "...", "full_content": "..." }`
///   5. `{ "type": "turn_end" }`
///   or `{ "type": "error", "message": "..." }` when a frame is rejected.
async fn handle_socket<P: ChatProvider>(socket: WebSocket, state: AppState<P>) {
    info!("WebSocket client connected");

    let (mut sink, stream) = socket.split();
    let (tx, mut rx) = mpsc::channel::<TurnEvent>(EVENT_BUFFER);

    // Forward session events to the client
    let forwarder = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            let Ok(json) = serde_json::to_string(&event) else {
                continue;
            };
            if sink.send(Message::Text(json.into())).await.is_err() {
                break;
            }
        }
    });

    // Text frames until the client closes or the connection fails
    let frames = stream
        .scan((), |_, msg| {
            future::ready(match msg {
                Ok(Message::Text(t)) => Some(Some(t.to_string())),
                Ok(Message::Close(_)) => None,
                Ok(_) => Some(None),
                Err(e) => {
                    warn!("WebSocket receive error: {e}");
                    None
                }
            })
        })
        .filter_map(future::ready);

    serve_session(state.new_session(), frames, tx).await;

    forwarder.abort();
    info!("WebSocket client disconnected");
}

/// Runs one session over a stream of client text frames.
///
/// The session's log (the welcome message) is replayed first. When `frames` ends
/// any turn still in flight is cancelled.
async fn serve_session<P: ChatProvider>(
    session: Arc<ConversationController<P>>,
    frames: impl Stream<Item = String>,
    tx: EventSink,
) {
    for message in session.messages() {
        let _ = tx.send(TurnEvent::AssistantMessage { message }).await;
    }

    let mut frames = pin!(frames);
    while let Some(text) = frames.next().await {
        match serde_json::from_str::<WsClientMessage>(&text) {
            Ok(WsClientMessage::Chat { message }) => {
                spawn_turn(session.clone(), message, tx.clone());
            }
            Ok(WsClientMessage::Cancel) => {
                session.cancel();
            }
            Err(e) => {
                let _ = tx.send(TurnEvent::Error { message: format!("Invalid request: {e}") }).await;
            }
        }
    }

    session.cancel();
}

/// Turns run off the receive loop so a cancel frame can reach them.
fn spawn_turn<P: ChatProvider>(
    session: Arc<ConversationController<P>>,
    message: String,
    tx: EventSink,
) {
    tokio::spawn(async move {
        if let Err(e) = session.submit(&message, Some(tx.clone())).await {
            let _ = tx.send(TurnEvent::Error { message: e.to_string() }).await;
        }
    });
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use futures_util::stream;

    use super::*;
    use crate::actions::ActionDispatcher;
    use crate::agent::{AiResponse, HistoryTurn};
    use crate::config::{RevealSettings, TurnSettings};
    use crate::errors::AppError;
    use crate::market::StaticMarket;
    use crate::service::conversation::CANCELLED_REPLY;
    use crate::service::welcome::WELCOME_MESSAGE;

    /// Never answers; turns stay in flight until cancelled.
    struct StalledProvider;

    impl ChatProvider for StalledProvider {
        fn name(&self) -> &str {
            "stalled"
        }

        async fn send(&self, _: &str, _: &[HistoryTurn]) -> Result<AiResponse, AppError> {
            future::pending().await
        }
    }

    fn session() -> Arc<ConversationController<StalledProvider>> {
        let turn = TurnSettings { reveal: RevealSettings::INSTANT, ..TurnSettings::default() };
        let dispatcher = ActionDispatcher::new(Arc::new(StaticMarket::default()));
        Arc::new(ConversationController::new(Arc::new(StalledProvider), dispatcher, turn).with_welcome())
    }

    /// A frame source the test can feed one frame at a time and then close.
    fn client() -> (mpsc::Sender<String>, impl Stream<Item = String>) {
        let (tx, rx) = mpsc::channel::<String>(8);
        let frames = stream::unfold(rx, |mut rx| async move { rx.recv().await.map(|f| (f, rx)) });
        (tx, frames)
    }

    fn chat_frame(message: &str) -> String {
        serde_json::json!({ "type": "chat", "message": message }).to_string()
    }

    fn drain(rx: &mut mpsc::Receiver<TurnEvent>) -> Vec<TurnEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    #[tokio::test]
    async fn welcome_is_replayed_and_bad_frames_get_an_error() {
        let (tx, mut rx) = mpsc::channel(EVENT_BUFFER);
        let frames = stream::iter(vec!["not json".to_string()]);

        serve_session(session(), frames, tx).await;

        let events = drain(&mut rx);
        assert!(matches!(
            &events[0],
            TurnEvent::AssistantMessage { message } if message.content == WELCOME_MESSAGE
        ));
        assert!(matches!(
            &events[1],
            TurnEvent::Error { message } if message.starts_with("Invalid request")
        ));
        assert_eq!(events.len(), 2);
    }

    #[tokio::test]
    async fn second_chat_frame_is_rejected_while_busy() {
        let session = session();
        let (client_tx, frames) = client();
        let (tx, mut rx) = mpsc::channel(EVENT_BUFFER);
        let server = tokio::spawn(serve_session(session.clone(), frames, tx));

        client_tx.send(chat_frame("first")).await.unwrap();
        while !session.is_loading() {
            tokio::task::yield_now().await;
        }
        client_tx.send(chat_frame("second")).await.unwrap();

        let busy = loop {
            match rx.recv().await.unwrap() {
                TurnEvent::Error { message } => break message,
                _ => continue,
            }
        };
        assert_eq!(busy, AppError::TurnInProgress.to_string());
        let users = session
            .messages()
            .iter()
            .filter(|m| m.content == "first" || m.content == "second")
            .count();
        assert_eq!(users, 1);

        drop(client_tx);
        server.await.unwrap();
    }

    #[tokio::test]
    async fn closing_the_socket_cancels_the_turn() {
        let session = session();
        let (client_tx, frames) = client();
        let (tx, _rx) = mpsc::channel(EVENT_BUFFER);
        let server = tokio::spawn(serve_session(session.clone(), frames, tx));

        client_tx.send(chat_frame("are you there?")).await.unwrap();
        while !session.is_loading() {
            tokio::task::yield_now().await;
        }

        drop(client_tx);
        server.await.unwrap();
        while session.is_loading() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }

        let messages = session.messages();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[2].content, CANCELLED_REPLY);
    }

    #[tokio::test]
    async fn cancel_frame_stops_the_pending_reply() {
        let session = session();
        let (client_tx, frames) = client();
        let (tx, mut rx) = mpsc::channel(EVENT_BUFFER);
        let server = tokio::spawn(serve_session(session.clone(), frames, tx));

        client_tx.send(chat_frame("slow one")).await.unwrap();
        while !session.is_loading() {
            tokio::task::yield_now().await;
        }
        client_tx.send(r#"{"type":"cancel"}"#.to_string()).await.unwrap();

        loop {
            if rx.recv().await.unwrap() == TurnEvent::TurnEnd {
                break;
            }
        }
        assert!(!session.is_loading());
        assert_eq!(session.messages().last().map(|m| m.content.as_str()), Some(CANCELLED_REPLY));

        drop(client_tx);
        server.await.unwrap();
    }
}
