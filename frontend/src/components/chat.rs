use chat_stream::Role;
use leptos::ev;
use leptos::prelude::*;

use crate::state::AppState;

/// Main chat area with message history and input.
#[component]
pub fn ChatArea() -> impl IntoView {
    let state = expect_context::<AppState>();

    view! {
        <main class="chat-area">
            // Error banner
            {move || {
                state.error.get().map(|err| {
                    view! {
                        <div class="error-banner" role="alert">
                            <strong>"Error"</strong>
                            <span>{err}</span>
                            <button on:click=move |_| state.set_error.set(None)>"×"</button>
                        </div>
                    }
                })
            }}

            <header class="chat-header">
                <h1>"ChatGPT"</h1>
            </header>

            // Messages
            <div class="messages-container">
                {move || {
                    let msgs = state.messages.get();
                    if msgs.is_empty() {
                        view! {
                            <div class="empty-state">
                                <h2>"How can I help you today?"</h2>
                                <p>"Start a conversation by typing a message below"</p>
                            </div>
                        }.into_any()
                    } else {
                        msgs.iter()
                            .map(|m| view! { <MessageBubble role=m.role content=m.content.clone() /> })
                            .collect_view()
                            .into_any()
                    }
                }}
            </div>

            // Input area
            <ChatInput />
        </main>
    }
}

/// A single chat message bubble.
#[component]
fn MessageBubble(role: Role, content: String) -> impl IntoView {
    let (css_class, badge) = match role {
        Role::User => ("message user", "U"),
        Role::Assistant => ("message assistant", "AI"),
    };

    view! {
        <div class=css_class>
            <div class="role-badge">{badge}</div>
            <p class="message-content">{content}</p>
        </div>
    }
}

/// Chat input form with textarea and send button.
#[component]
fn ChatInput() -> impl IntoView {
    let state = expect_context::<AppState>();
    let (input, set_input) = signal(String::new());

    let is_sending = move || state.is_loading.get();

    let send = move || {
        let text = input.get().trim().to_string();
        if text.is_empty() || is_sending() {
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

    let on_submit = move |_| {
        send();
    };

    view! {
        <div class="input-area">
            <div class="input-row">
                <textarea
                    rows="1"
                    placeholder="Message AI..."
                    prop:value=input
                    on:input=move |ev| {
                        set_input.set(event_target_value(&ev));
                    }
                    on:keydown=on_keydown
                    disabled=is_sending
                />
                <button
                    class="send-btn"
                    aria-label="Send"
                    on:click=on_submit
                    disabled=move || is_sending() || input.get().trim().is_empty()
                >
                    <svg class="send-icon" viewBox="0 0 24 24" width="16" height="16" fill="none"
                        stroke="currentColor" stroke-width="2" stroke-linecap="round" stroke-linejoin="round">
                        <path d="m22 2-7 20-4-9-9-4Z" />
                        <path d="M22 2 11 13" />
                    </svg>
                </button>
            </div>
        </div>
    }
}
