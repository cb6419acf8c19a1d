pub mod api_routes;
pub mod ws_routes;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;

use crate::actions::ActionDispatcher;
use crate::agent::ChatProvider;
use crate::config::TurnSettings;
use crate::service::ConversationController;

/// Shared by every handler. HTTP requests use one default session; each WebSocket
/// connection gets its own.
pub struct AppState<P> {
    provider: Arc<P>,
    dispatcher: ActionDispatcher,
    turn: TurnSettings,
    session: Arc<ConversationController<P>>,
}

impl<P> Clone for AppState<P> {
    fn clone(&self) -> Self {
        Self {
            provider: self.provider.clone(),
            dispatcher: self.dispatcher.clone(),
            turn: self.turn,
            session: self.session.clone(),
        }
    }
}

impl<P: ChatProvider> AppState<P> {
    pub fn new(provider: Arc<P>, dispatcher: ActionDispatcher, turn: TurnSettings) -> Self {
        let session = Arc::new(
            ConversationController::new(provider.clone(), dispatcher.clone(), turn).with_welcome(),
        );
        Self { provider, dispatcher, turn, session }
    }

    pub fn session(&self) -> &Arc<ConversationController<P>> {
        &self.session
    }

    pub fn new_session(&self) -> Arc<ConversationController<P>> {
        Arc::new(
            ConversationController::new(self.provider.clone(), self.dispatcher.clone(), self.turn)
                .with_welcome(),
        )
    }
}

pub fn router<P: ChatProvider>(state: AppState<P>) -> Router {
    Router::new()
        .route("/api/chat", post(api_routes::chat_handler::<P>))
        .route("/api/messages", get(api_routes::list_messages_handler::<P>))
        .route("/api/status", get(api_routes::status_handler::<P>))
        .route("/api/actions", get(api_routes::list_actions_handler))
        .route("/api/quick-actions", get(api_routes::quick_actions_handler))
        .route("/ws/chat", get(ws_routes::ws_chat_handler::<P>))
        .with_state(state)
}
