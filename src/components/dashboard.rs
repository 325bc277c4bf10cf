//! Dashboard Component
//!
//! Lists the user's boards with search and creation-date filters.

use chrono::{Duration, NaiveDate, Utc};
use leptos::prelude::*;
use taskboard_core::{Board, BoardFilter, NewBoard};

use crate::components::{DeleteConfirmButton, ErrorBanner};
use crate::context::use_app_context;
use crate::store::{use_app_store, AppStateStoreFields};

/// Title given to boards made with the "New Board" button
pub const DEFAULT_BOARD_TITLE: &str = "New Board";
/// Color tag given to new boards
pub const DEFAULT_BOARD_COLOR: &str = "bg-blue-500";

/// Parse an `<input type="date">` value; empty means unset
pub(crate) fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
}

#[component]
fn BoardCard(board: Board) -> impl IntoView {
    let ctx = use_app_context();
    let id = board.id;
    let created = board.created_at.format("%Y-%m-%d").to_string();

    view! {
        <div class="board-card" on:click=move |_| ctx.show_board(id)>
            <div class="board-card-header">
                <span class=format!("board-color-dot {}", board.color)></span>
                <h3 class="board-title">{board.title}</h3>
                <DeleteConfirmButton
                    button_class="board-delete-btn"
                    subject="board"
                    on_confirm=Callback::new(move |_| ctx.delete_board(id))
                />
            </div>
            {board.description.map(|d| view! { <p class="board-description">{d}</p> })}
            <p class="board-created">"Created " {created}</p>
        </div>
    }
}

#[component]
pub fn Dashboard() -> impl IntoView {
    let ctx = use_app_context();
    let store = use_app_store();

    let (filter, set_filter) = signal(BoardFilter::default());
    let (filter_open, set_filter_open) = signal(false);

    let boards = move || store.boards().get();
    let shown = move || {
        let filter = filter.get();
        boards().into_iter().filter(|b| filter.matches(b)).collect::<Vec<_>>()
    };
    let created_this_week = move || {
        let since = Utc::now() - Duration::days(7);
        boards().iter().filter(|b| b.created_at >= since).count()
    };
    let greeting = move || {
        store
            .user()
            .get()
            .map(|u| format!("Your workspace awaits, {}!", u.display_name()))
            .unwrap_or_else(|| "Your workspace awaits!".to_string())
    };

    let create_board = move |_: web_sys::MouseEvent| {
        ctx.create_board(NewBoard {
            title: DEFAULT_BOARD_TITLE.to_string(),
            description: None,
            color: Some(DEFAULT_BOARD_COLOR.to_string()),
        });
    };

    view! {
        <main class="dashboard">
            <h1>{greeting}</h1>

            <ErrorBanner
                message=Signal::derive(move || store.boards_error().get())
                on_dismiss=Callback::new(move |_| ctx.clear_boards_error())
            />

            // Stats
            <div class="stats-row">
                <div class="stat-card">
                    <p class="stat-label">"Total Boards"</p>
                    <p class="stat-value">{move || boards().len()}</p>
                </div>
                <div class="stat-card">
                    <p class="stat-label">"Created This Week"</p>
                    <p class="stat-value">{created_this_week}</p>
                </div>
            </div>

            <div class="dashboard-toolbar">
                <input
                    type="text"
                    class="board-search"
                    placeholder="Search boards..."
                    prop:value=move || filter.get().search
                    on:input=move |ev| {
                        let value = event_target_value(&ev);
                        set_filter.update(|f| f.search = value);
                    }
                />
                <button
                    class=move || if filter.get().is_active() { "filter-btn active" } else { "filter-btn" }
                    on:click=move |_| set_filter_open.update(|open| *open = !*open)
                >
                    "Filter"
                </button>
                <button class="new-board-btn" on:click=create_board>"+ New Board"</button>
            </div>

            <Show when=move || filter_open.get()>
                <div class="filter-panel">
                    <label>
                        "Created from "
                        <input
                            type="date"
                            prop:value=move || filter.get().created_from.map(|d| d.to_string()).unwrap_or_default()
                            on:change=move |ev| {
                                let value = parse_date(&event_target_value(&ev));
                                set_filter.update(|f| f.created_from = value);
                            }
                        />
                    </label>
                    <label>
                        " to "
                        <input
                            type="date"
                            prop:value=move || filter.get().created_to.map(|d| d.to_string()).unwrap_or_default()
                            on:change=move |ev| {
                                let value = parse_date(&event_target_value(&ev));
                                set_filter.update(|f| f.created_to = value);
                            }
                        />
                    </label>
                    <button class="clear-filters-btn" on:click=move |_| set_filter.update(|f| f.clear())>
                        "Clear Filters"
                    </button>
                </div>
            </Show>

            <Show
                when=move || !store.boards_loading().get() || !boards().is_empty()
                fallback=|| view! { <p class="loading">"Loading boards..."</p> }
            >
                <Show
                    when=move || !shown().is_empty()
                    fallback=|| view! { <p class="empty-state">"No boards yet. Create one to get started."</p> }
                >
                    <div class="board-grid">
                        <For
                            each=shown
                            key=|board| (board.id, board.updated_at)
                            children=move |board| view! { <BoardCard board=board /> }
                        />
                    </div>
                </Show>
            </Show>
        </main>
    }
}
