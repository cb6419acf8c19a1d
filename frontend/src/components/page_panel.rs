use leptos::prelude::*;

use crate::state::AppState;

/// Stand-in for the marketplace views: shows where the assistant has taken the
/// user and what its directives have collected.
#[component]
pub fn PagePanel() -> impl IntoView {
    let state = expect_context::<AppState>();

    view! {
        <aside class="page-panel">
            <div class="panel-header">
                <h2>"ROMA Marketplace"</h2>
                <div class="current-page">
                    {move || format!("Page: /{}", state.current_page.get())}
                </div>
                {move || {
                    state.active_filters.get().map(|filters| {
                        view! { <div class="active-filters">{filters.describe()}</div> }
                    })
                }}
            </div>

            {move || {
                state.focused_collection.get().map(|c| {
                    view! {
                        <section class="panel-section">
                            <h3>{c.name.clone()}</h3>
                            <div>{format!("Floor {} ETH · Volume {} ETH · {:+}%", c.floor_price, c.volume24h, c.change24h)}</div>
                        </section>
                    }
                })
            }}

            <NameList title="Cart" items=state.cart />
            <NameList title="Favorites" items=state.favorites />

            <section class="panel-section">
                <h3>"Price alerts"</h3>
                <For
                    each=move || state.alerts.get().into_iter().enumerate()
                    key=|(i, _)| *i
                    let:entry
                >
                    {
                        let (_, alert) = entry;
                        view! {
                            <div class="panel-item">
                                {format!("{} {} {} ETH", alert.collection_name, alert.alert_type, alert.target_price)}
                            </div>
                        }
                    }
                </For>
            </section>
        </aside>
    }
}

#[component]
fn NameList(title: &'static str, items: ReadSignal<Vec<String>>) -> impl IntoView {
    view! {
        <section class="panel-section">
            <h3>{move || format!("{title} ({})", items.get().len())}</h3>
            <For
                each=move || items.get().into_iter().enumerate()
                key=|(i, _)| *i
                let:entry
            >
                <div class="panel-item">{entry.1}</div>
            </For>
        </section>
    }
}
