//! Delete Confirm Button Component
//!
//! Two-step delete for boards, columns and tasks.

use leptos::prelude::*;

/// Question shown while a delete waits for confirmation
fn confirm_prompt(subject: Option<&str>) -> String {
    match subject {
        Some(subject) => format!("Delete {}?", subject),
        None => "Delete?".to_string(),
    }
}

/// `×` that turns into a "Delete <subject>?" prompt. Clicks and presses
/// stay inside the button so a card underneath neither toggles nor starts
/// a drag.
#[component]
pub fn DeleteConfirmButton(
    #[prop(into)] button_class: String,
    #[prop(into)] on_confirm: Callback<()>,
    /// What is being deleted, e.g. "column"
    #[prop(optional, into)]
    subject: Option<String>,
) -> impl IntoView {
    let (asking, set_asking) = signal(false);
    let prompt = confirm_prompt(subject.as_deref());
    let title = prompt.trim_end_matches('?').to_string();

    let keep_inside = |ev: web_sys::MouseEvent| ev.stop_propagation();

    view! {
        <Show
            when=move || asking.get()
            fallback=move || view! {
                <button
                    class=button_class.clone()
                    title=title.clone()
                    on:mousedown=keep_inside
                    on:click=move |ev| {
                        ev.stop_propagation();
                        set_asking.set(true);
                    }
                >
                    "×"
                </button>
            }
        >
            <span
                class="delete-confirm"
                on:mousedown=keep_inside
                on:keydown=move |ev: web_sys::KeyboardEvent| {
                    if ev.key() == "Escape" {
                        set_asking.set(false);
                    }
                }
            >
                <span class="delete-confirm-text">{prompt.clone()}</span>
                <button
                    class="confirm-btn"
                    on:click=move |ev| {
                        ev.stop_propagation();
                        set_asking.set(false);
                        on_confirm.run(());
                    }
                >
                    "✓"
                </button>
                <button
                    class="cancel-btn"
                    on:click=move |ev| {
                        ev.stop_propagation();
                        set_asking.set(false);
                    }
                >
                    "✗"
                </button>
            </span>
        </Show>
    }
}
