mod api;
mod components;
mod state;

use leptos::prelude::*;
use leptos::mount::mount_to_body;

use components::chat::ChatArea;
use state::AppState;

/// Root application component.
#[component]
fn App() -> impl IntoView {
    AppState::provide();

    view! {
        <div class="app-container">
            <ChatArea />
        </div>
    }
}

fn main() {
    console_log::init_with_level(log::Level::Debug).expect("Failed to init logger");
    mount_to_body(App);
}
