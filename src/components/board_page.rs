//! Board Page Component
//!
//! Header, filters and the column row of one open board.

use leptos::prelude::*;
use leptos_dragdrop::DndSignals;
use taskboard_core::{BoardId, BoardPatch, ColumnWithTasks, TaskFilter};

use crate::components::{ColumnView, ErrorBanner, FilterBar};
use crate::context::use_app_context;
use crate::store::{use_app_store, AppStateStoreFields};

#[component]
fn BoardTitle() -> impl IntoView {
    let ctx = use_app_context();
    let store = use_app_store();
    let (editing, set_editing) = signal(false);

    let title = move || store.board().get().map(|b| b.title).unwrap_or_default();

    let save = move |value: String| {
        set_editing.set(false);
        let value = value.trim().to_string();
        if !value.is_empty() && value != title() {
            ctx.update_board(BoardPatch { title: Some(value), ..Default::default() });
        }
    };

    view! {
        <Show
            when=move || editing.get()
            fallback=move || view! {
                <h1 class="board-page-title" title="Double-click to rename" on:dblclick=move |_| set_editing.set(true)>
                    {title}
                </h1>
            }
        >
            <input
                type="text"
                class="board-title-input"
                prop:value=title
                autofocus
                on:blur=move |ev| save(event_target_value(&ev))
                on:keydown=move |ev: web_sys::KeyboardEvent| match ev.key().as_str() {
                    "Enter" => save(event_target_value(&ev)),
                    "Escape" => set_editing.set(false),
                    _ => {}
                }
            />
        </Show>
    }
}

#[component]
fn NewColumnForm() -> impl IntoView {
    let ctx = use_app_context();
    let (title, set_title) = signal(String::new());

    let submit = move || {
        let value = title.get_untracked();
        if value.trim().is_empty() {
            return;
        }
        ctx.create_column(value);
        set_title.set(String::new());
    };

    view! {
        <div class="new-column">
            <input
                type="text"
                class="new-column-input"
                placeholder="New column..."
                prop:value=move || title.get()
                on:input=move |ev| set_title.set(event_target_value(&ev))
                on:keydown=move |ev: web_sys::KeyboardEvent| {
                    if ev.key() == "Enter" {
                        submit();
                    }
                }
            />
            <button class="new-column-btn" on:click=move |_| submit()>"+ Add Column"</button>
        </div>
    }
}

#[component]
pub fn BoardPage(board_id: BoardId) -> impl IntoView {
    let ctx = use_app_context();
    let store = use_app_store();
    let dnd = expect_context::<DndSignals>();

    let (filter, set_filter) = signal(TaskFilter::default());

    // Filtering only hides cards; drag indices come from the full columns
    let shown = Memo::new(move |_| {
        let columns = store.columns().get();
        filter.with(|f| f.apply(&columns))
    });
    let column_ids = move || shown.with(|cols| cols.iter().map(ColumnWithTasks::id).collect::<Vec<_>>());
    let total_tasks = move || store.columns().with(|cols| cols.iter().map(|c| c.tasks.len()).sum::<usize>());

    tracing::debug!(board_id = %board_id, "board page mounted");

    view! {
        <main class="board-page" class:dragging=move || dnd.dragging().is_some()>
            <header class="board-header">
                <button class="back-btn" on:click=move |_| ctx.show_dashboard()>"← Boards"</button>
                <BoardTitle />
                <span class="board-task-count">{move || format!("{} tasks", total_tasks())}</span>
                <FilterBar filter=filter set_filter=set_filter />
            </header>

            <ErrorBanner
                message=Signal::derive(move || store.board_error().get())
                on_dismiss=Callback::new(move |_| ctx.clear_board_error())
            />

            <Show
                when=move || !store.board_loading().get() || store.board().with(|b| b.is_some())
                fallback=|| view! { <p class="loading">"Loading board..."</p> }
            >
                <div class="columns-row">
                    <For
                        each=column_ids
                        key=|id| *id
                        children=move |column_id| view! { <ColumnView column_id=column_id columns=shown /> }
                    />
                    <NewColumnForm />
                </div>
            </Show>
        </main>
    }
}
