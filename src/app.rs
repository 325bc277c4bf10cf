//! Taskboard Frontend App
//!
//! Root component: resolves the user, connects the gateway and switches
//! between the dashboard and an open board.

use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_dragdrop::{bind_global_mouseup, create_dnd_signals};
use taskboard_core::UserId;

use crate::commands::{self, CurrentUser};
use crate::components::{BoardPage, Dashboard};
use crate::context::{AppContext, Page};
use crate::gateway;
use crate::store::{store_set_user, AppState, AppStateStoreFields, AppStore};

/// User assumed when running without a host
const OFFLINE_USER: &str = "local-user";

#[component]
pub fn App() -> impl IntoView {
    let app_store: AppStore = reactive_stores::Store::new(AppState::default());
    provide_context(app_store);

    let (page, set_page) = signal(Page::Dashboard);
    let ctx = AppContext::new((page, set_page), app_store);
    provide_context(ctx);

    // One drag layer for the app; it follows whichever board is open
    let dnd = create_dnd_signals(
        Signal::derive(move || app_store.columns().get()),
        Callback::new(move |intent| ctx.dispatch(intent)),
    );
    bind_global_mouseup(dnd);
    provide_context(dnd);

    // Identify the user, then connect
    spawn_local(async move {
        let gateway = gateway::connect();
        let user = if commands::host_available() {
            match commands::current_user().await {
                Ok(user) => user,
                Err(err) => {
                    tracing::error!(error = %err, "could not resolve the signed-in user");
                    return;
                }
            }
        } else {
            CurrentUser { id: UserId::new(OFFLINE_USER), first_name: None, email: None }
        };
        tracing::info!(user = %user.id, "signed in");
        ctx.connect(gateway, user.id.clone());
        store_set_user(&app_store, user);
    });

    view! {
        <div class="app-layout">
            {move || match page.get() {
                Page::Dashboard => view! { <Dashboard /> }.into_any(),
                Page::Board(board_id) => view! { <BoardPage board_id=board_id /> }.into_any(),
            }}
        </div>
    }
}
