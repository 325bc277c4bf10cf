//! Error Banner Component

use leptos::prelude::*;

/// Dismissible banner for the last failed save or load
#[component]
pub fn ErrorBanner(
    #[prop(into)] message: Signal<Option<String>>,
    #[prop(into)] on_dismiss: Callback<()>,
) -> impl IntoView {
    view! {
        {move || message.get().map(|text| view! {
            <div class="error-banner" role="alert">
                <span class="error-text">{text}</span>
                <button class="error-dismiss-btn" on:click=move |_| on_dismiss.run(())>
                    "Dismiss"
                </button>
            </div>
        })}
    }
}
