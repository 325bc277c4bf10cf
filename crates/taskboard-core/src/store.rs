//! Board State Store
//!
//! Client-side copy of one board. Mutations either apply locally first and
//! then persist (optimistic), or persist first and apply the server's
//! answer (write-through). A failed gateway call never rolls local state
//! back; it only records an error message for the UI to show.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::future::Future;
use std::rc::Rc;

use tracing::{debug, info, warn};

use crate::error::{BoardError, EntityKind, GatewayError, Result};
use crate::gateway::{Gateway, GatewayResult};
use crate::intent::{Intent, MoveIntent, ReorderIntent};
use crate::model::{
    Board, BoardId, BoardPatch, BoardWithColumns, Column, ColumnId, ColumnWithTasks, NewTask,
    Task, TaskId, TaskInput, TaskPatch, UserId,
};
use crate::reorder::{
    apply_move, apply_reorder, clamp_index, insert_by_sort_order, locate_task, next_sort_order,
};

/// Snapshot of a board as the UI renders it
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoardState {
    pub board: Option<Board>,
    /// Columns in display order, each with its tasks in display order
    pub columns: Vec<ColumnWithTasks>,
    pub loading: bool,
    /// Message of the most recent gateway failure
    pub error: Option<String>,
}

impl BoardState {
    pub fn column(&self, column_id: ColumnId) -> Option<&ColumnWithTasks> {
        self.columns.iter().find(|c| c.id() == column_id)
    }

    fn column_mut(&mut self, column_id: ColumnId) -> Option<&mut ColumnWithTasks> {
        self.columns.iter_mut().find(|c| c.id() == column_id)
    }

    pub fn task(&self, task_id: TaskId) -> Option<&Task> {
        self.columns.iter().flat_map(|c| c.tasks.iter()).find(|t| t.id == task_id)
    }

    fn task_mut(&mut self, task_id: TaskId) -> Option<&mut Task> {
        self.columns.iter_mut().flat_map(|c| c.tasks.iter_mut()).find(|t| t.id == task_id)
    }

    pub fn total_tasks(&self) -> usize {
        self.columns.iter().map(|c| c.tasks.len()).sum()
    }
}

/// Handle returned by `subscribe` on the stores
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Change listeners of one store
pub(crate) struct Subscribers<S> {
    listeners: RefCell<Vec<(SubscriptionId, Rc<dyn Fn(&S)>)>>,
    next: Cell<u64>,
}

impl<S> Default for Subscribers<S> {
    fn default() -> Self {
        Self { listeners: RefCell::new(Vec::new()), next: Cell::new(0) }
    }
}

impl<S> Subscribers<S> {
    pub(crate) fn add(&self, listener: impl Fn(&S) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next.get());
        self.next.set(id.0 + 1);
        self.listeners.borrow_mut().push((id, Rc::new(listener)));
        id
    }

    pub(crate) fn remove(&self, id: SubscriptionId) -> bool {
        let mut listeners = self.listeners.borrow_mut();
        let before = listeners.len();
        listeners.retain(|(sub, _)| *sub != id);
        listeners.len() != before
    }

    /// Call every listener with a snapshot taken by `snapshot`. Listeners
    /// may call back into the store, so nothing stays borrowed meanwhile.
    pub(crate) fn notify(&self, snapshot: impl FnOnce() -> S) {
        let listeners: Vec<Rc<dyn Fn(&S)>> =
            self.listeners.borrow().iter().map(|(_, listener)| listener.clone()).collect();
        if listeners.is_empty() {
            return;
        }
        let state = snapshot();
        for listener in listeners {
            listener(&state);
        }
    }
}

/// Trim a title and reject it if nothing is left.
pub(crate) fn validate_title(title: &str) -> Result<String> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(BoardError::Validation("title must not be empty".to_string()));
    }
    Ok(trimmed.to_string())
}

// ========================
// Position Reservations
// ========================

/// Collection a create appends to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Slot {
    Columns,
    Tasks(ColumnId),
}

#[derive(Debug, Clone, Copy)]
struct Pending {
    /// Lowest position not yet handed out
    next: i32,
    in_flight: usize,
}

/// Positions handed to creates whose gateway call has not settled. Write-through
/// creates only show up locally once persisted, so without this two creates
/// started together would both get the same position.
#[derive(Debug, Default)]
struct Reservations {
    slots: RefCell<HashMap<Slot, Pending>>,
}

impl Reservations {
    fn reserve(&self, slot: Slot, local_next: i32) -> Reservation<'_> {
        let mut slots = self.slots.borrow_mut();
        let pending = slots.entry(slot).or_insert(Pending { next: local_next, in_flight: 0 });
        let position = pending.next.max(local_next);
        pending.next = position + 1;
        pending.in_flight += 1;
        Reservation { owner: self, slot, position }
    }

    fn release(&self, slot: Slot) {
        let mut slots = self.slots.borrow_mut();
        if let Some(pending) = slots.get_mut(&slot) {
            pending.in_flight -= 1;
            if pending.in_flight == 0 {
                slots.remove(&slot);
            }
        }
    }
}

/// A reserved position; released when the create settles or is dropped.
struct Reservation<'a> {
    owner: &'a Reservations,
    slot: Slot,
    position: i32,
}

impl Drop for Reservation<'_> {
    fn drop(&mut self) {
        self.owner.release(self.slot);
    }
}

/// Local state of one board, kept in sync with a [`Gateway`].
///
/// Single-threaded: operations take `&self` and may overlap at their await
/// points, but no borrow of the state is held across an await or while
/// listeners run.
pub struct BoardStore<G: Gateway + ?Sized> {
    gateway: Rc<G>,
    owner: UserId,
    board_id: BoardId,
    state: RefCell<BoardState>,
    subscribers: Subscribers<BoardState>,
    reservations: Reservations,
}

impl<G: Gateway + ?Sized> BoardStore<G> {
    /// Empty store for `board_id`. Call [`BoardStore::load`] to fill it.
    pub fn new(gateway: Rc<G>, owner: UserId, board_id: BoardId) -> Self {
        Self {
            gateway,
            owner,
            board_id,
            state: RefCell::new(BoardState::default()),
            subscribers: Subscribers::default(),
            reservations: Reservations::default(),
        }
    }

    /// Create a store and load it. A failed load leaves an empty board with
    /// the error recorded.
    pub async fn open(gateway: Rc<G>, owner: UserId, board_id: BoardId) -> Self {
        let store = Self::new(gateway, owner, board_id);
        if let Err(err) = store.load().await {
            debug!(board_id = %board_id, error = %err, "board opened without data");
        }
        store
    }

    pub fn board_id(&self) -> BoardId {
        self.board_id
    }

    pub fn owner(&self) -> &UserId {
        &self.owner
    }

    // ========================
    // Observation
    // ========================

    /// Register a listener called with the new state after every change.
    pub fn subscribe(&self, listener: impl Fn(&BoardState) + 'static) -> SubscriptionId {
        self.subscribers.add(listener)
    }

    /// Returns false if the listener was already gone.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.subscribers.remove(id)
    }

    pub fn state(&self) -> BoardState {
        self.state.borrow().clone()
    }

    /// Read the state without cloning it.
    pub fn with_state<R>(&self, f: impl FnOnce(&BoardState) -> R) -> R {
        f(&self.state.borrow())
    }

    pub fn board(&self) -> Option<Board> {
        self.state.borrow().board.clone()
    }

    pub fn columns(&self) -> Vec<ColumnWithTasks> {
        self.state.borrow().columns.clone()
    }

    pub fn column(&self, column_id: ColumnId) -> Option<ColumnWithTasks> {
        self.state.borrow().column(column_id).cloned()
    }

    pub fn task(&self, task_id: TaskId) -> Option<Task> {
        self.state.borrow().task(task_id).cloned()
    }

    pub fn total_tasks(&self) -> usize {
        self.state.borrow().total_tasks()
    }

    pub fn error(&self) -> Option<String> {
        self.state.borrow().error.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().loading
    }

    pub fn clear_error(&self) {
        if self.state.borrow().error.is_some() {
            self.update(|state| state.error = None);
        }
    }

    // ========================
    // Loading
    // ========================

    /// Replace local state with the gateway's view of the board.
    pub async fn load(&self) -> Result<()> {
        self.update(|state| state.loading = true);

        match self.gateway.get_board_with_columns_and_tasks(self.board_id).await {
            Ok(BoardWithColumns { board, mut columns }) => {
                columns.sort_by_key(|c| c.column.sort_order);
                for column in &mut columns {
                    column.tasks.sort_by_key(|t| t.sort_order);
                }
                info!(board_id = %self.board_id, columns = columns.len(), "board loaded");
                self.update(|state| {
                    state.board = Some(board);
                    state.columns = columns;
                    state.loading = false;
                    state.error = None;
                });
                Ok(())
            }
            Err(err) => {
                self.state.borrow_mut().loading = false;
                Err(self.fail("load board", err))
            }
        }
    }

    // ========================
    // Board
    // ========================

    /// Edit the board's own fields (write-through).
    pub async fn update_board(&self, mut patch: BoardPatch) -> Result<Board> {
        if let Some(title) = &patch.title {
            patch.title = Some(validate_title(title)?);
        }
        if self.state.borrow().board.is_none() {
            return Err(BoardError::not_found(EntityKind::Board, self.board_id));
        }

        let call = self.gateway.update_board(self.board_id, &patch);
        self.write_through("update board", call, |state, board: Board| {
            state.board = Some(board.clone());
            board
        })
        .await
    }

    // ========================
    // Columns
    // ========================

    /// Append a column to the board (write-through).
    pub async fn create_column(&self, title: &str) -> Result<Column> {
        let title = validate_title(title)?;
        let local_next = {
            let state = self.state.borrow();
            if state.board.is_none() {
                return Err(BoardError::not_found(EntityKind::Board, self.board_id));
            }
            next_sort_order(state.columns.iter().map(|c| c.column.sort_order))
        };
        let slot = self.reservations.reserve(Slot::Columns, local_next);

        let call = self.gateway.create_column(self.board_id, &title, slot.position, &self.owner);
        self.write_through("create column", call, |state, column: Column| {
            insert_by_sort_order(&mut state.columns, ColumnWithTasks::new(column.clone()), |c| {
                c.column.sort_order
            });
            column
        })
        .await
    }

    /// Rename a column (optimistic).
    pub async fn update_column(&self, column_id: ColumnId, title: &str) -> Result<()> {
        let title = validate_title(title)?;
        self.require_column(column_id)?;

        let call = self.gateway.update_column_title(column_id, &title);
        let column = self
            .optimistic("update column", call, |state| {
                if let Some(col) = state.column_mut(column_id) {
                    col.column.title = title.clone();
                }
            })
            .await?;

        // Pick up anything else the server changed on the column
        let stale = self.state.borrow().column(column_id).is_some_and(|c| c.column != column);
        if stale {
            self.update(|state| {
                if let Some(col) = state.column_mut(column_id) {
                    col.column = column;
                }
            });
        }
        Ok(())
    }

    /// Remove a column and its tasks (optimistic).
    pub async fn delete_column(&self, column_id: ColumnId) -> Result<()> {
        self.require_column(column_id)?;

        let call = self.gateway.delete_column(column_id);
        self.optimistic("delete column", call, |state| {
            state.columns.retain(|c| c.id() != column_id);
        })
        .await
    }

    // ========================
    // Tasks
    // ========================

    /// Append a task to a column (write-through).
    pub async fn create_task(&self, column_id: ColumnId, input: TaskInput) -> Result<Task> {
        validate_title(&input.title)?;
        let local_next = {
            let state = self.state.borrow();
            let column = state
                .column(column_id)
                .ok_or_else(|| BoardError::not_found(EntityKind::Column, column_id))?;
            next_sort_order(column.tasks.iter().map(|t| t.sort_order))
        };
        let slot = self.reservations.reserve(Slot::Tasks(column_id), local_next);

        let fields = NewTask::from(input);
        let call = self.gateway.create_task(column_id, &fields, slot.position);
        self.write_through("create task", call, |state, task: Task| {
            match state.column_mut(column_id) {
                Some(column) => {
                    insert_by_sort_order(&mut column.tasks, task.clone(), |t| t.sort_order);
                }
                None => warn!(task_id = %task.id, column_id = %column_id, "column gone before task was created"),
            }
            task
        })
        .await
    }

    /// Edit a task's fields (write-through).
    pub async fn update_task(&self, task_id: TaskId, patch: TaskPatch) -> Result<Task> {
        if let Some(title) = &patch.title {
            validate_title(title)?;
        }
        let current = self
            .task(task_id)
            .ok_or_else(|| BoardError::not_found(EntityKind::Task, task_id))?;
        if patch.is_empty() {
            return Ok(current);
        }

        let call = self.gateway.update_task(task_id, &patch);
        self.write_through("update task", call, |state, task: Task| {
            match state.task_mut(task_id) {
                Some(local) => {
                    // Placement belongs to move and reorder; a move may still be in flight
                    let (column_id, sort_order) = (local.column_id, local.sort_order);
                    *local = task;
                    local.column_id = column_id;
                    local.sort_order = sort_order;
                    local.clone()
                }
                None => {
                    warn!(task_id = %task_id, "task gone before update landed");
                    task
                }
            }
        })
        .await
    }

    /// Remove a task (write-through).
    pub async fn delete_task(&self, task_id: TaskId) -> Result<()> {
        self.require_task(task_id)?;

        let call = self.gateway.delete_task(task_id);
        self.write_through("delete task", call, |state, ()| {
            for column in &mut state.columns {
                column.tasks.retain(|t| t.id != task_id);
            }
        })
        .await
    }

    /// Move a task to `target_index` of `target_column_id` (optimistic).
    /// `None` appends. Moving a task onto its current place does nothing.
    pub async fn move_task(
        &self,
        task_id: TaskId,
        target_column_id: ColumnId,
        target_index: Option<usize>,
    ) -> Result<()> {
        let index = {
            let state = self.state.borrow();
            let from = locate_task(&state.columns, task_id)
                .ok_or_else(|| BoardError::not_found(EntityKind::Task, task_id))?;
            let target = state
                .column(target_column_id)
                .ok_or_else(|| BoardError::not_found(EntityKind::Column, target_column_id))?;

            let same_column = from.column_id == target_column_id;
            let room = if same_column { target.tasks.len() - 1 } else { target.tasks.len() };
            let index = clamp_index(target_index, room);
            if same_column && index == from.index {
                debug!(task_id = %task_id, index, "move to current place ignored");
                return Ok(());
            }
            index
        };

        let call = self.gateway.move_task(task_id, target_column_id, index as i32);
        self.optimistic("move task", call, |state| {
            apply_move(&mut state.columns, task_id, target_column_id, Some(index));
        })
        .await
    }

    /// Reorder a column locally. Nothing is persisted; a drag finishes with
    /// a [`BoardStore::move_task`] that records the final position.
    pub fn reorder_task(&self, column_id: ColumnId, from_index: usize, to_index: usize) -> Result<()> {
        let changed = {
            let mut state = self.state.borrow_mut();
            let column = state
                .column_mut(column_id)
                .ok_or_else(|| BoardError::not_found(EntityKind::Column, column_id))?;
            apply_reorder(column, from_index, to_index)?
        };
        if changed {
            debug!(column_id = %column_id, from_index, to_index, "tasks reordered");
            self.notify();
        }
        Ok(())
    }

    /// Route an intent from the drag layer to the matching operation.
    pub async fn dispatch(&self, intent: Intent) -> Result<()> {
        match intent {
            Intent::Reorder(ReorderIntent { column_id, from_index, to_index }) => {
                self.reorder_task(column_id, from_index, to_index)
            }
            Intent::Move(MoveIntent { task_id, target_column_id, target_index }) => {
                self.move_task(task_id, target_column_id, target_index).await
            }
        }
    }

    // ========================
    // Mutation Strategies
    // ========================

    /// Apply `apply` and publish, then persist. A failure keeps the local
    /// change and records the error.
    async fn optimistic<T>(
        &self,
        op: &'static str,
        call: impl Future<Output = GatewayResult<T>>,
        apply: impl FnOnce(&mut BoardState),
    ) -> Result<T> {
        self.update(apply);
        match call.await {
            Ok(value) => {
                debug!(op, "persisted");
                self.clear_error();
                Ok(value)
            }
            Err(err) => Err(self.fail(op, err)),
        }
    }

    /// Persist, then apply the gateway's answer and publish. A failure
    /// leaves local state untouched apart from the error.
    async fn write_through<T, R>(
        &self,
        op: &'static str,
        call: impl Future<Output = GatewayResult<T>>,
        apply: impl FnOnce(&mut BoardState, T) -> R,
    ) -> Result<R> {
        match call.await {
            Ok(value) => {
                debug!(op, "persisted");
                Ok(self.update(|state| {
                    state.error = None;
                    apply(state, value)
                }))
            }
            Err(err) => Err(self.fail(op, err)),
        }
    }

    fn fail(&self, op: &'static str, err: GatewayError) -> BoardError {
        warn!(op, error = %err, "gateway call failed");
        let message = err.message.clone();
        self.update(|state| state.error = Some(message));
        BoardError::Persistence(err)
    }

    fn require_column(&self, column_id: ColumnId) -> Result<()> {
        match self.state.borrow().column(column_id) {
            Some(_) => Ok(()),
            None => Err(BoardError::not_found(EntityKind::Column, column_id)),
        }
    }

    fn require_task(&self, task_id: TaskId) -> Result<()> {
        match self.state.borrow().task(task_id) {
            Some(_) => Ok(()),
            None => Err(BoardError::not_found(EntityKind::Task, task_id)),
        }
    }

    /// Mutate the state, then notify listeners.
    fn update<R>(&self, f: impl FnOnce(&mut BoardState) -> R) -> R {
        let result = f(&mut self.state.borrow_mut());
        self.notify();
        result
    }

    fn notify(&self) {
        self.subscribers.notify(|| self.state());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drag::{DragController, DropOutcome};
    use crate::memory::{GatewayOp, MemoryGateway};
    use crate::model::{NewBoard, Priority};
    use crate::reorder::{is_strictly_ordered, DropTarget};
    use crate::testing::{settle, GatedGateway};
    use chrono::NaiveDate;

    async fn setup() -> (Rc<MemoryGateway>, BoardStore<MemoryGateway>) {
        let gw = Rc::new(MemoryGateway::new());
        let owner = UserId::new("user_1");
        let board = gw
            .create_board(&owner, &NewBoard { title: "Sprint".to_string(), ..Default::default() })
            .await
            .unwrap();
        let store = BoardStore::open(gw.clone(), owner, board.id).await;
        gw.clear_calls();
        (gw, store)
    }

    fn column_at(store: &BoardStore<MemoryGateway>, n: usize) -> ColumnId {
        store.columns()[n].id()
    }

    async fn add_tasks(store: &BoardStore<MemoryGateway>, column_id: ColumnId, titles: &[&str]) -> Vec<TaskId> {
        let mut ids = Vec::new();
        for title in titles {
            ids.push(store.create_task(column_id, TaskInput::titled(*title)).await.unwrap().id);
        }
        ids
    }

    /// Local state matches what the gateway holds
    fn assert_in_sync<G: Gateway + ?Sized>(gw: &MemoryGateway, store: &BoardStore<G>) {
        let remote = gw.snapshot(store.board_id()).unwrap();
        assert_eq!(store.columns(), remote.columns);
    }

    fn record(store: &BoardStore<MemoryGateway>) -> Rc<RefCell<Vec<BoardState>>> {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        store.subscribe(move |state| sink.borrow_mut().push(state.clone()));
        seen
    }

    #[tokio::test]
    async fn test_open_loads_board() {
        let (_gw, store) = setup().await;
        let state = store.state();
        assert_eq!(state.board.unwrap().title, "Sprint");
        assert_eq!(state.columns.len(), 4);
        assert!(!state.loading);
        assert_eq!(state.error, None);
        assert_eq!(store.total_tasks(), 0);
    }

    #[tokio::test]
    async fn test_open_failure_records_error() {
        let gw = Rc::new(MemoryGateway::new());
        gw.fail_next(GatewayOp::GetBoard, "board unavailable");
        let store = BoardStore::open(gw, UserId::new("user_1"), BoardId(uuid::Uuid::nil())).await;

        assert_eq!(store.error().as_deref(), Some("board unavailable"));
        assert!(!store.is_loading());
        assert!(store.board().is_none());
    }

    #[tokio::test]
    async fn test_create_column_appends_after_persist() {
        let (gw, store) = setup().await;
        let column = store.create_column("  Blocked  ").await.unwrap();

        assert_eq!(column.title, "Blocked");
        assert_eq!(column.sort_order, 4);
        assert_eq!(store.columns().last().unwrap().id(), column.id);
        assert_eq!(gw.calls(), vec![GatewayOp::CreateColumn]);
        assert_in_sync(&gw, &store);
    }

    #[tokio::test]
    async fn test_blank_titles_are_rejected_without_gateway_calls() {
        let (gw, store) = setup().await;
        let seen = record(&store);
        let before = store.state();
        let todo = column_at(&store, 0);

        assert!(matches!(store.create_column("   ").await, Err(BoardError::Validation(_))));
        assert!(matches!(store.update_column(todo, "").await, Err(BoardError::Validation(_))));
        assert!(matches!(
            store.create_task(todo, TaskInput::titled(" \t ")).await,
            Err(BoardError::Validation(_))
        ));

        assert!(gw.calls().is_empty());
        assert_eq!(store.state(), before);
        assert!(seen.borrow().is_empty());
    }

    #[tokio::test]
    async fn test_update_unknown_column_is_not_found() {
        let (gw, store) = setup().await;
        let before = store.columns();

        let err = store.update_column(ColumnId(uuid::Uuid::nil()), "X").await.unwrap_err();
        assert!(matches!(err, BoardError::NotFound { entity: EntityKind::Column, .. }));
        assert_eq!(store.columns(), before);
        assert!(gw.calls().is_empty());
    }

    #[tokio::test]
    async fn test_create_column_failure_leaves_columns() {
        let (gw, store) = setup().await;
        gw.fail_next(GatewayOp::CreateColumn, "quota exceeded");

        let err = store.create_column("Blocked").await.unwrap_err();
        assert!(err.is_persistence());
        assert_eq!(store.columns().len(), 4);
        assert_eq!(store.error().as_deref(), Some("quota exceeded"));

        // The next successful call clears the error
        store.create_column("Blocked").await.unwrap();
        assert_eq!(store.error(), None);
    }

    #[tokio::test]
    async fn test_update_column_keeps_new_title_on_failure() {
        let (gw, store) = setup().await;
        let todo = column_at(&store, 0);
        gw.fail_next(GatewayOp::UpdateColumnTitle, "offline");

        assert!(store.update_column(todo, "Backlog").await.is_err());
        assert_eq!(store.column(todo).unwrap().column.title, "Backlog");
        assert_eq!(store.error().as_deref(), Some("offline"));
        assert_eq!(gw.snapshot(store.board_id()).unwrap().columns[0].column.title, "To Do");
    }

    #[tokio::test]
    async fn test_delete_column_drops_its_tasks() {
        let (gw, store) = setup().await;
        let todo = column_at(&store, 0);
        add_tasks(&store, todo, &["a", "b"]).await;

        store.delete_column(todo).await.unwrap();
        assert_eq!(store.columns().len(), 3);
        assert_eq!(store.total_tasks(), 0);
        assert_in_sync(&gw, &store);
    }

    #[tokio::test]
    async fn test_delete_column_failure_keeps_local_removal() {
        let (gw, store) = setup().await;
        let todo = column_at(&store, 0);
        gw.fail_next(GatewayOp::DeleteColumn, "offline");

        assert!(store.delete_column(todo).await.is_err());
        assert!(store.column(todo).is_none());
        assert_eq!(store.error().as_deref(), Some("offline"));
    }

    #[tokio::test]
    async fn test_create_task_defaults() {
        let (gw, store) = setup().await;
        let todo = column_at(&store, 0);

        let task = store.create_task(todo, TaskInput::titled("Buy milk")).await.unwrap();
        assert_eq!(task.priority, Priority::Medium);
        assert_eq!(task.description, None);
        assert_eq!(task.due_date, None);
        assert_eq!(task.sort_order, 0);

        let column = store.column(todo).unwrap();
        assert_eq!(column.tasks.last().unwrap().id, task.id);
        assert_in_sync(&gw, &store);
    }

    #[tokio::test]
    async fn test_create_task_keeps_fields() {
        let (_gw, store) = setup().await;
        let todo = column_at(&store, 0);
        let due = NaiveDate::from_ymd_opt(2024, 6, 30);

        let input = TaskInput {
            title: "Ship release".to_string(),
            description: Some("tag and publish".to_string()),
            due_date: due,
            priority: Some(Priority::High),
        };
        let task = store.create_task(todo, input).await.unwrap();
        let local = store.task(task.id).unwrap();
        assert_eq!(local.title, "Ship release");
        assert_eq!(local.description.as_deref(), Some("tag and publish"));
        assert_eq!(local.priority, Priority::High);
        assert_eq!(local.due_date, due);
    }

    #[tokio::test]
    async fn test_create_task_positions_skip_gaps() {
        let (_gw, store) = setup().await;
        let todo = column_at(&store, 0);
        let ids = add_tasks(&store, todo, &["a", "b", "c"]).await;

        store.delete_task(ids[0]).await.unwrap();
        let task = store.create_task(todo, TaskInput::titled("d")).await.unwrap();
        assert_eq!(task.sort_order, 3);
        assert!(is_strictly_ordered(&store.column(todo).unwrap().tasks));
    }

    #[tokio::test]
    async fn test_update_task_write_through() {
        let (gw, store) = setup().await;
        let todo = column_at(&store, 0);
        let ids = add_tasks(&store, todo, &["Draft"]).await;

        gw.fail_next(GatewayOp::UpdateTask, "offline");
        let patch = TaskPatch { priority: Some(Priority::High), ..Default::default() };
        assert!(store.update_task(ids[0], patch.clone()).await.is_err());
        assert_eq!(store.task(ids[0]).unwrap().priority, Priority::Medium);

        let updated = store.update_task(ids[0], patch).await.unwrap();
        assert_eq!(updated.priority, Priority::High);
        assert_eq!(store.task(ids[0]).unwrap(), updated);
        assert_eq!(store.error(), None);
        assert_in_sync(&gw, &store);
    }

    #[tokio::test]
    async fn test_delete_task_failure_keeps_task() {
        let (gw, store) = setup().await;
        let todo = column_at(&store, 0);
        let ids = add_tasks(&store, todo, &["a"]).await;

        gw.fail_next(GatewayOp::DeleteTask, "offline");
        assert!(store.delete_task(ids[0]).await.is_err());
        assert!(store.task(ids[0]).is_some());

        store.delete_task(ids[0]).await.unwrap();
        assert!(store.task(ids[0]).is_none());
        assert!(matches!(store.delete_task(ids[0]).await, Err(BoardError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_move_task_across_columns() {
        let (gw, store) = setup().await;
        let (a, b) = (column_at(&store, 0), column_at(&store, 1));
        let ids = add_tasks(&store, a, &["T1", "T2", "T3"]).await;
        gw.clear_calls();

        store.move_task(ids[0], b, Some(0)).await.unwrap();

        assert_eq!(store.column(a).unwrap().task_ids(), vec![ids[1], ids[2]]);
        assert_eq!(store.column(b).unwrap().task_ids(), vec![ids[0]]);
        assert_eq!(store.task(ids[0]).unwrap().column_id, b);
        assert_eq!(gw.calls(), vec![GatewayOp::MoveTask]);
        assert_in_sync(&gw, &store);
    }

    #[tokio::test]
    async fn test_move_task_failure_keeps_optimistic_state() {
        let (gw, store) = setup().await;
        let (a, b) = (column_at(&store, 0), column_at(&store, 1));
        let ids = add_tasks(&store, a, &["T1", "T2"]).await;

        gw.fail_next(GatewayOp::MoveTask, "connection reset");
        let err = store.move_task(ids[1], b, None).await.unwrap_err();

        assert!(err.is_persistence());
        assert_eq!(store.column(b).unwrap().task_ids(), vec![ids[1]]);
        assert_eq!(store.error().as_deref(), Some("connection reset"));
    }

    #[tokio::test]
    async fn test_move_to_current_place_is_noop() {
        let (gw, store) = setup().await;
        let a = column_at(&store, 0);
        let ids = add_tasks(&store, a, &["T1", "T2", "T3"]).await;
        gw.clear_calls();
        let seen = record(&store);
        let before = store.state();

        store.move_task(ids[1], a, Some(1)).await.unwrap();
        // Past the end of its own column clamps to where the last task already is
        store.move_task(ids[2], a, None).await.unwrap();

        assert_eq!(store.state(), before);
        assert!(gw.calls().is_empty());
        assert!(seen.borrow().is_empty());
    }

    #[tokio::test]
    async fn test_move_unknown_targets() {
        let (gw, store) = setup().await;
        let a = column_at(&store, 0);
        let ids = add_tasks(&store, a, &["T1"]).await;
        gw.clear_calls();

        let missing_column = ColumnId(uuid::Uuid::nil());
        assert!(matches!(
            store.move_task(ids[0], missing_column, None).await,
            Err(BoardError::NotFound { entity: EntityKind::Column, .. })
        ));
        assert!(matches!(
            store.move_task(TaskId(uuid::Uuid::nil()), a, None).await,
            Err(BoardError::NotFound { entity: EntityKind::Task, .. })
        ));
        assert!(gw.calls().is_empty());
    }

    #[tokio::test]
    async fn test_reorder_is_local_only() {
        let (gw, store) = setup().await;
        let a = column_at(&store, 0);
        let ids = add_tasks(&store, a, &["T1", "T2", "T3"]).await;
        gw.clear_calls();

        store.reorder_task(a, 0, 2).unwrap();
        assert_eq!(store.column(a).unwrap().task_ids(), vec![ids[1], ids[2], ids[0]]);
        assert!(is_strictly_ordered(&store.column(a).unwrap().tasks));
        assert!(gw.calls().is_empty());

        assert!(matches!(store.reorder_task(a, 0, 3), Err(BoardError::Validation(_))));
        assert_eq!(store.column(a).unwrap().task_ids(), vec![ids[1], ids[2], ids[0]]);
    }

    #[tokio::test]
    async fn test_optimistic_change_is_published_before_the_call() {
        let (gw, store) = setup().await;
        let (a, b) = (column_at(&store, 0), column_at(&store, 1));
        let task = add_tasks(&store, a, &["T1"]).await[0];
        gw.clear_calls();

        let observed = Rc::new(RefCell::new(Vec::new()));
        let (sink, probe) = (observed.clone(), gw.clone());
        store.subscribe(move |state| {
            let in_b = state.column(b).is_some_and(|c| c.position_of(task).is_some());
            sink.borrow_mut().push((probe.calls().len(), in_b));
        });

        store.move_task(task, b, None).await.unwrap();
        assert_eq!(observed.borrow().first(), Some(&(0, true)));
    }

    #[tokio::test]
    async fn test_write_through_is_published_after_the_call() {
        let (gw, store) = setup().await;
        let a = column_at(&store, 0);

        let observed = Rc::new(RefCell::new(Vec::new()));
        let (sink, probe) = (observed.clone(), gw.clone());
        store.subscribe(move |state| sink.borrow_mut().push((probe.calls().len(), state.total_tasks())));

        store.create_task(a, TaskInput::titled("T1")).await.unwrap();
        assert_eq!(observed.borrow().as_slice(), &[(1, 1)]);
    }

    #[tokio::test]
    async fn test_unsubscribe_and_clear_error() {
        let (gw, store) = setup().await;
        let seen = Rc::new(Cell::new(0));
        let counter = seen.clone();
        let sub = store.subscribe(move |_| counter.set(counter.get() + 1));

        gw.fail_next(GatewayOp::CreateColumn, "nope");
        let _ = store.create_column("X").await;
        assert_eq!(seen.get(), 1);

        store.clear_error();
        assert_eq!(store.error(), None);
        assert_eq!(seen.get(), 2);

        assert!(store.unsubscribe(sub));
        assert!(!store.unsubscribe(sub));
        store.create_column("Y").await.unwrap();
        assert_eq!(seen.get(), 2);
    }

    // ========================
    // Overlapping Operations
    // ========================

    async fn setup_gated() -> (Rc<GatedGateway>, BoardStore<GatedGateway>) {
        let gw = Rc::new(GatedGateway::new());
        let owner = UserId::new("user_1");
        let board = gw
            .create_board(&owner, &NewBoard { title: "Sprint".to_string(), ..Default::default() })
            .await
            .unwrap();
        let store = BoardStore::open(gw.clone(), owner, board.id).await;
        gw.memory().clear_calls();
        (gw, store)
    }

    #[tokio::test]
    async fn test_unsubscribed_listener_misses_late_load() {
        let (gw, store) = setup_gated().await;
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        let subscription = store.subscribe(move |state: &BoardState| sink.borrow_mut().push(state.loading));
        gw.hold(GatewayOp::GetBoard);

        let driver = async {
            settle().await;
            // Navigated away while the reload is in flight
            assert!(store.unsubscribe(subscription));
            assert!(gw.release(GatewayOp::GetBoard));
        };
        let (loaded, ()) = tokio::join!(store.load(), driver);

        loaded.unwrap();
        assert_eq!(*seen.borrow(), vec![true]);
        assert!(!store.unsubscribe(subscription));
    }

    #[tokio::test]
    async fn test_concurrent_task_creates_get_distinct_positions() {
        let (gw, store) = setup_gated().await;
        let todo = store.columns()[0].id();
        gw.hold(GatewayOp::CreateTask);

        let first = store.create_task(todo, TaskInput::titled("first"));
        let second = store.create_task(todo, TaskInput::titled("second"));
        let driver = async {
            settle().await;
            assert_eq!(gw.waiting(GatewayOp::CreateTask), 2);
            // The later call lands first
            assert!(gw.release_latest(GatewayOp::CreateTask));
            settle().await;
            assert!(gw.release(GatewayOp::CreateTask));
        };
        let (first, second, ()) = tokio::join!(first, second, driver);
        let (first, second) = (first.unwrap(), second.unwrap());

        let mut positions = vec![first.sort_order, second.sort_order];
        positions.sort_unstable();
        assert_eq!(positions, vec![0, 1]);

        let column = store.column(todo).unwrap();
        assert_eq!(column.tasks.len(), 2);
        assert!(is_strictly_ordered(&column.tasks));
        assert_in_sync(gw.memory(), &store);

        // Reservations are gone once both settled
        let third = store.create_task(todo, TaskInput::titled("third")).await.unwrap();
        assert_eq!(third.sort_order, 2);
    }

    #[tokio::test]
    async fn test_concurrent_column_creates_get_distinct_positions() {
        let (gw, store) = setup_gated().await;
        gw.hold(GatewayOp::CreateColumn);

        let blocked = store.create_column("Blocked");
        let archive = store.create_column("Archive");
        let driver = async {
            settle().await;
            assert!(gw.release_latest(GatewayOp::CreateColumn));
            settle().await;
            assert!(gw.release(GatewayOp::CreateColumn));
        };
        let (blocked, archive, ()) = tokio::join!(blocked, archive, driver);
        let (blocked, archive) = (blocked.unwrap(), archive.unwrap());

        assert_ne!(blocked.sort_order, archive.sort_order);
        let orders: Vec<i32> = store.columns().iter().map(|c| c.column.sort_order).collect();
        assert_eq!(orders, vec![0, 1, 2, 3, 4, 5]);
        assert_in_sync(gw.memory(), &store);
    }

    #[tokio::test]
    async fn test_failed_create_releases_its_position() {
        let (gw, store) = setup_gated().await;
        let todo = store.columns()[0].id();
        gw.hold(GatewayOp::CreateTask);
        gw.memory().fail_next(GatewayOp::CreateTask, "rejected");

        let failing = store.create_task(todo, TaskInput::titled("failing"));
        let kept = store.create_task(todo, TaskInput::titled("kept"));
        let driver = async {
            settle().await;
            assert!(gw.release(GatewayOp::CreateTask));
            settle().await;
            assert!(gw.release(GatewayOp::CreateTask));
        };
        let (failing, kept, ()) = tokio::join!(failing, kept, driver);

        assert!(failing.unwrap_err().is_persistence());
        let kept = kept.unwrap();
        let column = store.column(todo).unwrap();
        assert_eq!(column.task_ids(), vec![kept.id]);
        assert_in_sync(gw.memory(), &store);

        let next = store.create_task(todo, TaskInput::titled("next")).await.unwrap();
        assert!(next.sort_order > kept.sort_order);
    }

    #[tokio::test]
    async fn test_update_landing_during_move_keeps_new_column() {
        let (gw, store) = setup_gated().await;
        let (todo, doing) = (store.columns()[0].id(), store.columns()[1].id());
        let task = store.create_task(todo, TaskInput::titled("Write docs")).await.unwrap();
        gw.hold(GatewayOp::MoveTask);
        gw.hold(GatewayOp::UpdateTask);

        let moving = store.move_task(task.id, doing, None);
        let patch = TaskPatch { priority: Some(Priority::High), ..Default::default() };
        let editing = store.update_task(task.id, patch);
        let driver = async {
            settle().await;
            assert_eq!(store.task(task.id).unwrap().column_id, doing);

            assert!(gw.release(GatewayOp::UpdateTask));
            settle().await;
            let local = store.task(task.id).unwrap();
            assert_eq!(local.priority, Priority::High);
            assert_eq!(local.column_id, doing);
            assert_eq!(store.column(doing).unwrap().task_ids(), vec![task.id]);

            assert!(gw.release(GatewayOp::MoveTask));
        };
        let (moved, edited, ()) = tokio::join!(moving, editing, driver);

        moved.unwrap();
        assert_eq!(edited.unwrap().column_id, doing);
        assert!(store.column(todo).unwrap().tasks.is_empty());
        assert_in_sync(gw.memory(), &store);
    }

    #[tokio::test]
    async fn test_moves_resolving_out_of_order() {
        let (gw, store) = setup_gated().await;
        let (todo, doing) = (store.columns()[0].id(), store.columns()[1].id());
        let first = store.create_task(todo, TaskInput::titled("T1")).await.unwrap();
        let second = store.create_task(todo, TaskInput::titled("T2")).await.unwrap();
        gw.hold(GatewayOp::MoveTask);

        let driver = async {
            settle().await;
            assert_eq!(gw.waiting(GatewayOp::MoveTask), 2);
            // Both moves already show locally
            assert_eq!(store.column(doing).unwrap().tasks.len(), 2);
            assert!(gw.release_latest(GatewayOp::MoveTask));
            settle().await;
            assert!(gw.release(GatewayOp::MoveTask));
        };
        let (a, b, ()) = tokio::join!(
            store.move_task(first.id, doing, None),
            store.move_task(second.id, doing, None),
            driver
        );
        a.unwrap();
        b.unwrap();

        let column = store.column(doing).unwrap();
        assert_eq!(column.tasks.len(), 2);
        assert!(is_strictly_ordered(&column.tasks));
        assert!(store.column(todo).unwrap().tasks.is_empty());
        assert_in_sync(gw.memory(), &store);
    }

    #[tokio::test]
    async fn test_error_field_keeps_latest_failure() {
        let (gw, store) = setup_gated().await;
        let todo = store.columns()[0].id();
        let task = store.create_task(todo, TaskInput::titled("Keep me")).await.unwrap();
        gw.hold(GatewayOp::UpdateColumnTitle);
        gw.hold(GatewayOp::DeleteTask);
        gw.memory().fail_next(GatewayOp::UpdateColumnTitle, "rename rejected");
        gw.memory().fail_next(GatewayOp::DeleteTask, "delete rejected");

        let renaming = store.update_column(todo, "Backlog");
        let deleting = store.delete_task(task.id);
        let driver = async {
            settle().await;
            assert!(gw.release(GatewayOp::DeleteTask));
            settle().await;
            assert_eq!(store.error().as_deref(), Some("delete rejected"));
            assert!(gw.release(GatewayOp::UpdateColumnTitle));
        };
        let (renamed, deleted, ()) = tokio::join!(renaming, deleting, driver);

        assert!(renamed.unwrap_err().is_persistence());
        assert!(deleted.unwrap_err().is_persistence());
        assert_eq!(store.error().as_deref(), Some("rename rejected"));
        // Optimistic rename stays, failed write-through delete changed nothing
        assert_eq!(store.column(todo).unwrap().column.title, "Backlog");
        assert!(store.task(task.id).is_some());

        store.create_task(todo, TaskInput::titled("Next")).await.unwrap();
        assert_eq!(store.error(), None);
    }

    #[tokio::test]
    async fn test_update_board() {
        let (gw, store) = setup().await;
        let patch = BoardPatch { title: Some(" Q3 Sprint ".to_string()), ..Default::default() };
        let board = store.update_board(patch).await.unwrap();

        assert_eq!(board.title, "Q3 Sprint");
        assert_eq!(store.board().unwrap().title, "Q3 Sprint");
        assert_eq!(gw.snapshot(store.board_id()).unwrap().board.title, "Q3 Sprint");
    }

    #[tokio::test]
    async fn test_drag_gesture_end_to_end() {
        let (gw, store) = setup().await;
        let (a, b) = (column_at(&store, 0), column_at(&store, 1));
        let ids = add_tasks(&store, a, &["T1", "T2", "T3"]).await;
        add_tasks(&store, b, &["U1"]).await;
        gw.clear_calls();

        let mut dnd = DragController::default();

        // Preview inside the column, then finish on the last slot
        dnd.begin(ids[0], &store.columns()).unwrap();
        let preview = dnd.hover(Some(DropTarget::Task(ids[2])), &store.columns()).unwrap();
        store.dispatch(preview.into()).await.unwrap();
        assert!(gw.calls().is_empty());

        let outcome = dnd.release(&store.columns());
        for intent in outcome.intents() {
            store.dispatch(intent).await.unwrap();
        }
        assert_eq!(store.column(a).unwrap().task_ids(), vec![ids[1], ids[2], ids[0]]);
        assert_eq!(gw.calls(), vec![GatewayOp::MoveTask]);
        assert_in_sync(&gw, &store);

        // Then drag it over to the other column's body
        dnd.begin(ids[0], &store.columns()).unwrap();
        assert!(dnd.hover(Some(DropTarget::Column(b)), &store.columns()).is_none());
        let outcome = dnd.release(&store.columns());
        assert!(matches!(outcome, DropOutcome::Moved { .. }));
        for intent in outcome.intents() {
            store.dispatch(intent).await.unwrap();
        }
        assert_eq!(store.column(b).unwrap().tasks.last().unwrap().id, ids[0]);
        assert_in_sync(&gw, &store);
    }
}
