mod api;
mod components;
mod models;
mod state;
mod ws;

use leptos::prelude::*;
use leptos::mount::mount_to_body;

use components::chat::ChatArea;
use components::page_panel::PagePanel;
use state::AppState;

/// Root application component.
#[component]
fn App() -> impl IntoView {
    let state = AppState::provide();

    // Open the session and load the prompt chips on mount
    state.connect();
    state.load_quick_prompts();

    view! {
        <div class="app-container">
            <PagePanel />
            <ChatArea />
        </div>
    }
}

fn main() {
    if let Err(e) = console_log::init_with_level(log::Level::Debug) {
        web_sys::console::error_1(&format!("Failed to init logger: {e}").into());
    }
    mount_to_body(App);
}
