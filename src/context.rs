//! Application Context
//!
//! Shared state provided via Leptos Context API. The engine stores are not
//! `Send`, so they live in local stored values; components reach them
//! through the helpers here and read data from the reactive `AppStore`.

use std::future::Future;
use std::rc::Rc;

use leptos::prelude::*;
use leptos::task::spawn_local;
use taskboard_core::{
    BoardId, BoardListStore, BoardPatch, BoardStore, ColumnId, Gateway, Intent, NewBoard,
    SubscriptionId, TaskId, TaskInput, TaskPatch, UserId,
};

use crate::store::{store_clear_board, store_sync_board, store_sync_boards, AppStore};

pub type SharedBoardStore = Rc<BoardStore<dyn Gateway>>;
pub type SharedBoardListStore = Rc<BoardListStore<dyn Gateway>>;

/// Run a store call in a local task. Failures are already on the store's
/// error field; they are only logged here.
fn spawn_action<Fut>(action: &'static str, call: Fut)
where
    Fut: Future<Output = taskboard_core::Result<()>> + 'static,
{
    spawn_local(async move {
        if let Err(err) = call.await {
            tracing::debug!(action, error = %err, "action rejected");
        }
    });
}

/// The board being shown and its link to the app store
#[derive(Clone)]
struct OpenBoard {
    store: SharedBoardStore,
    subscription: SubscriptionId,
}

/// Which page is shown
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Page {
    Dashboard,
    Board(BoardId),
}

/// App-wide handles provided via context
#[derive(Clone, Copy)]
pub struct AppContext {
    /// Current page - read
    pub page: ReadSignal<Page>,
    /// Current page - write
    set_page: WriteSignal<Page>,
    app_store: AppStore,
    gateway: StoredValue<Option<Rc<dyn Gateway>>, LocalStorage>,
    owner: StoredValue<Option<UserId>, LocalStorage>,
    boards: StoredValue<Option<SharedBoardListStore>, LocalStorage>,
    board: StoredValue<Option<OpenBoard>, LocalStorage>,
}

pub fn use_app_context() -> AppContext {
    expect_context::<AppContext>()
}

impl AppContext {
    pub fn new(page: (ReadSignal<Page>, WriteSignal<Page>), app_store: AppStore) -> Self {
        Self {
            page: page.0,
            set_page: page.1,
            app_store,
            gateway: StoredValue::new_local(None),
            owner: StoredValue::new_local(None),
            boards: StoredValue::new_local(None),
            board: StoredValue::new_local(None),
        }
    }

    /// Wire up the gateway for `owner` and load the dashboard
    pub fn connect(&self, gateway: Rc<dyn Gateway>, owner: UserId) {
        let list = Rc::new(BoardListStore::new(gateway.clone(), owner.clone()));
        let app_store = self.app_store;
        list.subscribe(move |state| store_sync_boards(&app_store, state));

        self.gateway.set_value(Some(gateway));
        self.owner.set_value(Some(owner));
        self.boards.set_value(Some(list.clone()));

        spawn_action("load boards", async move { list.load().await });
    }

    pub fn board_list(&self) -> Option<SharedBoardListStore> {
        self.boards.get_value()
    }

    pub fn open_board(&self) -> Option<SharedBoardStore> {
        self.board.with_value(|open| open.as_ref().map(|open| open.store.clone()))
    }

    /// Detach the open board from the app store. Its pending calls may still
    /// finish, but they no longer publish.
    fn close_board(&self) {
        let Some(open) = self.board.try_update_value(|open| open.take()).flatten() else {
            return;
        };
        open.store.unsubscribe(open.subscription);
        tracing::debug!(board_id = %open.store.board_id(), "board closed");
    }

    // ========================
    // Navigation
    // ========================

    pub fn show_board(&self, board_id: BoardId) {
        let (Some(gateway), Some(owner)) = (self.gateway.get_value(), self.owner.get_value()) else {
            tracing::warn!(board_id = %board_id, "no gateway yet, cannot open board");
            return;
        };

        self.close_board();
        store_clear_board(&self.app_store);

        let store: SharedBoardStore = Rc::new(BoardStore::new(gateway, owner, board_id));
        let app_store = self.app_store;
        let subscription = store.subscribe(move |state| store_sync_board(&app_store, state));
        self.board.set_value(Some(OpenBoard { store: store.clone(), subscription }));
        self.set_page.set(Page::Board(board_id));

        spawn_action("load board", async move { store.load().await });
    }

    pub fn show_dashboard(&self) {
        self.close_board();
        store_clear_board(&self.app_store);
        self.set_page.set(Page::Dashboard);
        if let Some(list) = self.board_list() {
            spawn_action("load boards", async move { list.load().await });
        }
    }

    // ========================
    // Board List Actions
    // ========================

    pub fn create_board(&self, board: NewBoard) {
        let Some(list) = self.board_list() else { return };
        spawn_action("create board", async move { list.create_board(board).await.map(|_| ()) });
    }

    pub fn delete_board(&self, board_id: BoardId) {
        let Some(list) = self.board_list() else { return };
        spawn_action("delete board", async move { list.delete_board(board_id).await });
    }

    pub fn clear_boards_error(&self) {
        if let Some(list) = self.board_list() {
            list.clear_error();
        }
    }

    // ========================
    // Open Board Actions
    // ========================

    /// Run `op` against the open board in a local task
    fn with_board<F, Fut>(&self, op: F)
    where
        F: FnOnce(SharedBoardStore) -> Fut + 'static,
        Fut: std::future::Future<Output = taskboard_core::Result<()>> + 'static,
    {
        let Some(store) = self.open_board() else {
            tracing::debug!("no board open");
            return;
        };
        spawn_action("board action", op(store));
    }

    pub fn update_board(&self, patch: BoardPatch) {
        let list = self.board_list();
        self.with_board(move |store| async move {
            let board = store.update_board(patch).await?;
            // Keep the dashboard copy current; it is already persisted
            if let Some(list) = list {
                list.replace_local(board);
            }
            Ok(())
        });
    }

    pub fn create_column(&self, title: String) {
        self.with_board(move |store| async move { store.create_column(&title).await.map(|_| ()) });
    }

    pub fn update_column(&self, column_id: ColumnId, title: String) {
        self.with_board(move |store| async move { store.update_column(column_id, &title).await });
    }

    pub fn delete_column(&self, column_id: ColumnId) {
        self.with_board(move |store| async move { store.delete_column(column_id).await });
    }

    pub fn create_task(&self, column_id: ColumnId, input: TaskInput) {
        self.with_board(move |store| async move { store.create_task(column_id, input).await.map(|_| ()) });
    }

    pub fn update_task(&self, task_id: TaskId, patch: TaskPatch) {
        self.with_board(move |store| async move { store.update_task(task_id, patch).await.map(|_| ()) });
    }

    pub fn delete_task(&self, task_id: TaskId) {
        self.with_board(move |store| async move { store.delete_task(task_id).await });
    }

    pub fn clear_board_error(&self) {
        if let Some(store) = self.open_board() {
            store.clear_error();
        }
    }

    /// Apply an intent from the drag layer. Previews are applied right away
    /// so the next hover sees them; moves persist in the background.
    pub fn dispatch(&self, intent: Intent) {
        let Some(store) = self.open_board() else { return };
        match intent {
            Intent::Reorder(reorder) => {
                if let Err(err) = store.reorder_task(reorder.column_id, reorder.from_index, reorder.to_index) {
                    tracing::warn!(error = %err, "preview reorder rejected");
                }
            }
            Intent::Move(_) => spawn_action("move task", async move { store.dispatch(intent).await }),
        }
    }
}
