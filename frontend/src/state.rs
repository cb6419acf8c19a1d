use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::api;
use crate::models::{ChatMessage, ClientFrame, Collection, Filters, PriceAlert, ServerEvent, UiAction};
use crate::ws;

/// Shared application state, provided via Leptos context.
///
/// Cart, favorites and alerts live only here: they are filled from the
/// assistant's directives and vanish on reload.
#[derive(Clone, Copy)]
pub struct AppState {
    // --- Read signals (for components to subscribe to) ---
    pub messages: ReadSignal<Vec<ChatMessage>>,
    pub is_loading: ReadSignal<bool>,
    pub error: ReadSignal<Option<String>>,
    pub quick_prompts: ReadSignal<Vec<String>>,
    pub current_page: ReadSignal<String>,
    pub active_filters: ReadSignal<Option<Filters>>,
    pub cart: ReadSignal<Vec<String>>,
    pub favorites: ReadSignal<Vec<String>>,
    pub alerts: ReadSignal<Vec<PriceAlert>>,
    pub focused_collection: ReadSignal<Option<Collection>>,

    // --- Write signals (for mutating state) ---
    set_messages: WriteSignal<Vec<ChatMessage>>,
    set_is_loading: WriteSignal<bool>,
    set_error: WriteSignal<Option<String>>,
    set_quick_prompts: WriteSignal<Vec<String>>,
    set_current_page: WriteSignal<String>,
    set_active_filters: WriteSignal<Option<Filters>>,
    set_cart: WriteSignal<Vec<String>>,
    set_favorites: WriteSignal<Vec<String>>,
    set_alerts: WriteSignal<Vec<PriceAlert>>,
    set_focused_collection: WriteSignal<Option<Collection>>,
}

impl AppState {
    /// Create a new `AppState` and provide it in the current Leptos context.
    pub fn provide() -> Self {
        let (messages, set_messages) = signal(Vec::<ChatMessage>::new());
        let (is_loading, set_is_loading) = signal(false);
        let (error, set_error) = signal(None::<String>);
        let (quick_prompts, set_quick_prompts) = signal(Vec::<String>::new());
        let (current_page, set_current_page) = signal("home".to_string());
        let (active_filters, set_active_filters) = signal(None::<Filters>);
        let (cart, set_cart) = signal(Vec::<String>::new());
        let (favorites, set_favorites) = signal(Vec::<String>::new());
        let (alerts, set_alerts) = signal(Vec::<PriceAlert>::new());
        let (focused_collection, set_focused_collection) = signal(None::<Collection>);

        let state = Self {
            messages,
            is_loading,
            error,
            quick_prompts,
            current_page,
            active_filters,
            cart,
            favorites,
            alerts,
            focused_collection,
            set_messages,
            set_is_loading,
            set_error,
            set_quick_prompts,
            set_current_page,
            set_active_filters,
            set_cart,
            set_favorites,
            set_alerts,
            set_focused_collection,
        };

        provide_context(state);
        state
    }

    /// Open the session socket.
    pub fn connect(&self) {
        let state = *self;
        let on_close = move |reason: String| {
            log::warn!("{reason}");
            state.set_is_loading.set(false);
            state.set_error.set(Some(reason));
        };
        if let Err(e) = ws::connect(move |event| state.apply_event(event), on_close) {
            log::error!("{e}");
            self.set_error.set(Some(e));
        }
    }

    /// Load the quick prompts from the backend.
    pub fn load_quick_prompts(&self) {
        let state = *self;
        spawn_local(async move {
            match api::fetch_quick_prompts().await {
                Ok(prompts) => state.set_quick_prompts.set(prompts),
                Err(e) => log::error!("Failed to fetch quick prompts: {e}"),
            }
        });
    }

    /// Send a message on the session socket. Ignored while a turn is in flight.
    pub fn send_message(&self, text: String) {
        if self.is_loading.get_untracked() {
            return;
        }
        self.set_error.set(None);
        if ws::send(&ClientFrame::Chat { message: text }) {
            self.set_is_loading.set(true);
        } else {
            self.set_error.set(Some("Not connected to the assistant".to_string()));
        }
    }

    pub fn cancel(&self) {
        ws::send(&ClientFrame::Cancel);
    }

    fn apply_event(&self, event: ServerEvent) {
        match event {
            ServerEvent::UserMessage { message } => {
                self.set_messages.update(|msgs| msgs.push(message));
            }
            ServerEvent::AssistantMessage { message } => {
                if let Some(action) = message.function_result.as_ref().and_then(|r| r.ui_action.clone()) {
                    self.apply_directive(action);
                }
                self.set_messages.update(|msgs| msgs.push(message));
            }
            ServerEvent::StreamStart { message_id } => {
                self.set_messages.update(|msgs| {
                    msgs.push(ChatMessage {
                        id: message_id,
                        role: "ASSISTANT".to_string(),
                        content: String::new(),
                        timestamp: String::new(),
                        function_result: None,
                    })
                });
            }
            ServerEvent::StreamChunk { message_id, content } => {
                self.set_messages.update(|msgs| {
                    if let Some(m) = msgs.iter_mut().rev().find(|m| m.id == message_id) {
                        m.content.push_str(&content);
                    }
                });
            }
            ServerEvent::StreamEnd { message_id, full_content } => {
                self.set_messages.update(|msgs| {
                    if let Some(m) = msgs.iter_mut().rev().find(|m| m.id == message_id) {
                        m.content = full_content;
                    }
                });
            }
            ServerEvent::Navigate { navigation } => {
                log::debug!("Navigating to {}", navigation.path);
                self.set_current_page.set(navigation.path.trim_start_matches('/').to_string());
                self.set_active_filters.set(navigation.filters);
            }
            ServerEvent::TurnEnd => self.set_is_loading.set(false),
            ServerEvent::Error { message } => {
                log::error!("Assistant error: {message}");
                self.set_error.set(Some(message));
                self.set_is_loading.set(false);
            }
        }
    }

    /// Navigation directives are applied when the server's deferred `navigate`
    /// frame arrives; everything else takes effect immediately.
    fn apply_directive(&self, action: UiAction) {
        match action {
            UiAction::Navigate { .. } | UiAction::NavigateWithFilters { .. } => {}
            UiAction::AddToCart { nft_name, .. } => self.set_cart.update(|c| c.push(nft_name)),
            UiAction::AddToFavorites { nft_name, .. } => {
                self.set_favorites.update(|f| {
                    if !f.contains(&nft_name) {
                        f.push(nft_name);
                    }
                })
            }
            UiAction::CreatePriceAlert(alert) => self.set_alerts.update(|a| a.push(alert)),
            UiAction::ShowCollectionDetails(collection) => {
                self.set_focused_collection.set(Some(collection))
            }
        }
    }
}
