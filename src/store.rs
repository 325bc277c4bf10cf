//! Global Application State Store
//!
//! Uses Leptos reactive_stores for fine-grained reactivity. The engine
//! stores own the data; their listeners mirror every change in here.

use leptos::prelude::*;
use reactive_stores::Store;
use taskboard_core::{Board, BoardListState, BoardState, ColumnWithTasks};

use crate::commands::CurrentUser;

/// Global application state with field-level reactivity
#[derive(Clone, Debug, Default, Store)]
pub struct AppState {
    /// Signed-in user, once known
    pub user: Option<CurrentUser>,
    /// Boards shown on the dashboard
    pub boards: Vec<Board>,
    pub boards_loading: bool,
    pub boards_error: Option<String>,
    /// The open board, if any
    pub board: Option<Board>,
    /// Columns of the open board with their tasks, in display order
    pub columns: Vec<ColumnWithTasks>,
    pub board_loading: bool,
    pub board_error: Option<String>,
}

/// Type alias for the store
pub type AppStore = Store<AppState>;

/// Get the app store from context
pub fn use_app_store() -> AppStore {
    expect_context::<AppStore>()
}

// ========================
// Store Helper Functions
// ========================

/// Mirror the board list engine state
pub fn store_sync_boards(store: &AppStore, state: &BoardListState) {
    store.boards().set(state.boards.clone());
    store.boards_loading().set(state.loading);
    store.boards_error().set(state.error.clone());
}

/// Mirror the open board's engine state
pub fn store_sync_board(store: &AppStore, state: &BoardState) {
    store.board().set(state.board.clone());
    store.columns().set(state.columns.clone());
    store.board_loading().set(state.loading);
    store.board_error().set(state.error.clone());
}

/// Forget the open board
pub fn store_clear_board(store: &AppStore) {
    store_sync_board(store, &BoardState::default());
}

pub fn store_set_user(store: &AppStore, user: CurrentUser) {
    store.user().set(Some(user));
}
