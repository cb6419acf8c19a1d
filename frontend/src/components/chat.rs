use leptos::prelude::*;
use leptos::ev;

use crate::state::AppState;

/// Main chat area with message history, quick prompts, and input.
#[component]
pub fn ChatArea() -> impl IntoView {
    let state = expect_context::<AppState>();

    view! {
        <main class="chat-area">
            // Error banner
            {move || {
                state.error.get().map(|err| {
                    view! {
                        <div class="error-banner">{err}</div>
                    }
                })
            }}

            <div class="chat-header">"ROMA • AI Agent"</div>

            // Messages
            <div class="messages-container">
                <For
                    each=move || state.messages.get()
                    key=|m| (m.id.clone(), m.content.len())
                    let:msg
                >
                    <MessageBubble is_user=msg.is_user() content=msg.content.clone() />
                </For>
                {move || {
                    state.is_loading.get().then(|| {
                        view! { <div class="typing-indicator">"ROMA is thinking…"</div> }
                    })
                }}
            </div>

            <QuickPrompts />
            <ChatInput />
        </main>
    }
}

/// A single chat message bubble.
#[component]
fn MessageBubble(is_user: bool, content: String) -> impl IntoView {
    let (css_class, label) = if is_user {
        ("message user", "you")
    } else {
        ("message assistant", "ROMA")
    };

    view! {
        <div class=css_class>
            <div class="role-label">{label}</div>
            <div class="message-content">{content}</div>
        </div>
    }
}

/// One-click prompts; disabled while a reply is in flight.
#[component]
fn QuickPrompts() -> impl IntoView {
    let state = expect_context::<AppState>();

    view! {
        <div class="quick-prompts">
            <For
                each=move || state.quick_prompts.get()
                key=|p| p.clone()
                let:prompt
            >
                {
                    let text = prompt.clone();
                    view! {
                        <button
                            class="quick-prompt"
                            disabled=move || state.is_loading.get()
                            on:click=move |_| state.send_message(text.clone())
                        >
                            {prompt}
                        </button>
                    }
                }
            </For>
        </div>
    }
}

/// Chat input with send and stop buttons.
#[component]
fn ChatInput() -> impl IntoView {
    let state = expect_context::<AppState>();
    let (input, set_input) = signal(String::new());

    let is_loading = move || state.is_loading.get();

    let send = move || {
        let text = input.get().trim().to_string();
        if text.is_empty() || is_loading() {
            return;
        }
        set_input.set(String::new());
        state.send_message(text);
    };

    let on_keydown = move |ev: ev::KeyboardEvent| {
        if ev.key() == "Enter" && !ev.shift_key() {
            ev.prevent_default();
            send();
        }
    };

    view! {
        <div class="input-area">
            <div class="input-row">
                <textarea
                    rows="1"
                    placeholder="Ask ROMA to search, analyze, or navigate… (Enter to send)"
                    prop:value=input
                    on:input=move |ev| {
                        set_input.set(event_target_value(&ev));
                    }
                    on:keydown=on_keydown
                    disabled=is_loading
                />
                {move || {
                    if is_loading() {
                        view! {
                            <button class="stop-btn" on:click=move |_| state.cancel()>
                                "Stop"
                            </button>
                        }
                        .into_any()
                    } else {
                        view! {
                            <button
                                class="send-btn"
                                on:click=move |_| send()
                                disabled=move || input.get().trim().is_empty()
                            >
                                "Send"
                            </button>
                        }
                        .into_any()
                    }
                }}
            </div>
        </div>
    }
}
