//! In-Memory Gateway
//!
//! Complete [`Gateway`] backed by process memory. Used by tests and by
//! hosts that want an offline board. Supports one-shot failure injection
//! and keeps a log of every attempted call.

use std::cell::RefCell;
use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::error::GatewayError;
use crate::gateway::{Gateway, GatewayResult};
use crate::model::{
    Board, BoardId, BoardPatch, BoardWithColumns, Column, ColumnId, ColumnWithTasks, NewBoard,
    NewTask, Task, TaskId, TaskPatch, UserId,
};

/// Columns every new board starts with
pub const DEFAULT_COLUMNS: [&str; 4] = ["To Do", "In Progress", "Review", "Done"];

/// Color tag for boards created without one
pub const DEFAULT_BOARD_COLOR: &str = "bg-blue-500";

/// Gateway operations, for failure injection and the call log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GatewayOp {
    ListBoards,
    CreateBoard,
    UpdateBoard,
    DeleteBoard,
    GetBoard,
    CreateColumn,
    UpdateColumnTitle,
    DeleteColumn,
    CreateTask,
    UpdateTask,
    MoveTask,
    DeleteTask,
}

#[derive(Debug, Default)]
struct MemoryDb {
    boards: Vec<Board>,
    columns: Vec<Column>,
    tasks: Vec<Task>,
    next_id: u128,
}

impl MemoryDb {
    fn next_uuid(&mut self) -> Uuid {
        self.next_id += 1;
        Uuid::from_u128(self.next_id)
    }

    /// Task ids of a column ordered by position
    fn ordered_task_ids(&self, column_id: ColumnId) -> Vec<TaskId> {
        let mut tasks: Vec<&Task> = self.tasks.iter().filter(|t| t.column_id == column_id).collect();
        tasks.sort_by_key(|t| t.sort_order);
        tasks.iter().map(|t| t.id).collect()
    }

    fn renumber(&mut self, column_id: ColumnId, ordered: &[TaskId]) {
        for (pos, id) in ordered.iter().enumerate() {
            if let Some(task) = self.tasks.iter_mut().find(|t| t.id == *id) {
                task.column_id = column_id;
                task.sort_order = pos as i32;
            }
        }
    }

    fn board_data(&self, board_id: BoardId) -> Option<BoardWithColumns> {
        let board = self.boards.iter().find(|b| b.id == board_id)?.clone();

        let mut columns: Vec<&Column> = self.columns.iter().filter(|c| c.board_id == board_id).collect();
        columns.sort_by_key(|c| c.sort_order);

        let columns = columns
            .into_iter()
            .map(|column| {
                let mut tasks: Vec<Task> =
                    self.tasks.iter().filter(|t| t.column_id == column.id).cloned().collect();
                tasks.sort_by_key(|t| t.sort_order);
                ColumnWithTasks { column: column.clone(), tasks }
            })
            .collect();

        Some(BoardWithColumns { board, columns })
    }
}

/// Gateway that keeps everything in memory
#[derive(Debug, Default)]
pub struct MemoryGateway {
    db: RefCell<MemoryDb>,
    failures: RefCell<HashMap<GatewayOp, String>>,
    calls: RefCell<Vec<GatewayOp>>,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next call of `op` fail with `message`
    pub fn fail_next(&self, op: GatewayOp, message: impl Into<String>) {
        self.failures.borrow_mut().insert(op, message.into());
    }

    /// Every attempted call so far, failed ones included
    pub fn calls(&self) -> Vec<GatewayOp> {
        self.calls.borrow().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.borrow_mut().clear();
    }

    /// What `get_board_with_columns_and_tasks` would return, without
    /// logging a call
    pub fn snapshot(&self, board_id: BoardId) -> Option<BoardWithColumns> {
        self.db.borrow().board_data(board_id)
    }

    fn enter(&self, op: GatewayOp) -> GatewayResult<()> {
        self.calls.borrow_mut().push(op);
        match self.failures.borrow_mut().remove(&op) {
            Some(message) => Err(GatewayError::new(message)),
            None => Ok(()),
        }
    }
}

fn not_found(what: &str, id: impl std::fmt::Display) -> GatewayError {
    GatewayError::new(format!("{} {} not found", what, id))
}

#[async_trait(?Send)]
impl Gateway for MemoryGateway {
    async fn list_boards(&self, owner: &UserId) -> GatewayResult<Vec<Board>> {
        self.enter(GatewayOp::ListBoards)?;
        let db = self.db.borrow();
        Ok(db.boards.iter().filter(|b| &b.user_id == owner).cloned().collect())
    }

    async fn create_board(&self, owner: &UserId, board: &NewBoard) -> GatewayResult<Board> {
        self.enter(GatewayOp::CreateBoard)?;
        let mut db = self.db.borrow_mut();
        let now = Utc::now();
        let created = Board {
            id: BoardId(db.next_uuid()),
            title: board.title.clone(),
            description: board.description.clone(),
            color: board.color.clone().unwrap_or_else(|| DEFAULT_BOARD_COLOR.to_string()),
            user_id: owner.clone(),
            created_at: now,
            updated_at: now,
        };

        for (pos, title) in DEFAULT_COLUMNS.iter().enumerate() {
            let column = Column {
                id: ColumnId(db.next_uuid()),
                board_id: created.id,
                title: title.to_string(),
                sort_order: pos as i32,
                user_id: owner.clone(),
                created_at: now,
            };
            db.columns.push(column);
        }
        db.boards.push(created.clone());
        Ok(created)
    }

    async fn update_board(&self, board_id: BoardId, patch: &BoardPatch) -> GatewayResult<Board> {
        self.enter(GatewayOp::UpdateBoard)?;
        let mut db = self.db.borrow_mut();
        let board = db
            .boards
            .iter_mut()
            .find(|b| b.id == board_id)
            .ok_or_else(|| not_found("board", board_id))?;

        if let Some(title) = &patch.title {
            board.title = title.clone();
        }
        if let Some(description) = &patch.description {
            board.description = description.clone();
        }
        if let Some(color) = &patch.color {
            board.color = color.clone();
        }
        board.updated_at = Utc::now();
        Ok(board.clone())
    }

    async fn delete_board(&self, board_id: BoardId) -> GatewayResult<()> {
        self.enter(GatewayOp::DeleteBoard)?;
        let mut db = self.db.borrow_mut();
        if !db.boards.iter().any(|b| b.id == board_id) {
            return Err(not_found("board", board_id));
        }
        let column_ids: Vec<ColumnId> =
            db.columns.iter().filter(|c| c.board_id == board_id).map(|c| c.id).collect();
        db.tasks.retain(|t| !column_ids.contains(&t.column_id));
        db.columns.retain(|c| c.board_id != board_id);
        db.boards.retain(|b| b.id != board_id);
        Ok(())
    }

    async fn get_board_with_columns_and_tasks(
        &self,
        board_id: BoardId,
    ) -> GatewayResult<BoardWithColumns> {
        self.enter(GatewayOp::GetBoard)?;
        self.db.borrow().board_data(board_id).ok_or_else(|| not_found("board", board_id))
    }

    async fn create_column(
        &self,
        board_id: BoardId,
        title: &str,
        sort_order: i32,
        owner: &UserId,
    ) -> GatewayResult<Column> {
        self.enter(GatewayOp::CreateColumn)?;
        let mut db = self.db.borrow_mut();
        if !db.boards.iter().any(|b| b.id == board_id) {
            return Err(not_found("board", board_id));
        }
        let column = Column {
            id: ColumnId(db.next_uuid()),
            board_id,
            title: title.to_string(),
            sort_order,
            user_id: owner.clone(),
            created_at: Utc::now(),
        };
        db.columns.push(column.clone());
        Ok(column)
    }

    async fn update_column_title(&self, column_id: ColumnId, title: &str) -> GatewayResult<Column> {
        self.enter(GatewayOp::UpdateColumnTitle)?;
        let mut db = self.db.borrow_mut();
        let column = db
            .columns
            .iter_mut()
            .find(|c| c.id == column_id)
            .ok_or_else(|| not_found("column", column_id))?;
        column.title = title.to_string();
        Ok(column.clone())
    }

    async fn delete_column(&self, column_id: ColumnId) -> GatewayResult<()> {
        self.enter(GatewayOp::DeleteColumn)?;
        let mut db = self.db.borrow_mut();
        if !db.columns.iter().any(|c| c.id == column_id) {
            return Err(not_found("column", column_id));
        }
        db.tasks.retain(|t| t.column_id != column_id);
        db.columns.retain(|c| c.id != column_id);
        Ok(())
    }

    async fn create_task(
        &self,
        column_id: ColumnId,
        task: &NewTask,
        sort_order: i32,
    ) -> GatewayResult<Task> {
        self.enter(GatewayOp::CreateTask)?;
        let mut db = self.db.borrow_mut();
        if !db.columns.iter().any(|c| c.id == column_id) {
            return Err(not_found("column", column_id));
        }
        let now = Utc::now();
        let created = Task {
            id: TaskId(db.next_uuid()),
            column_id,
            title: task.title.clone(),
            description: task.description.clone(),
            priority: task.priority,
            due_date: task.due_date,
            sort_order,
            created_at: now,
            updated_at: now,
        };
        db.tasks.push(created.clone());
        Ok(created)
    }

    async fn update_task(&self, task_id: TaskId, patch: &TaskPatch) -> GatewayResult<Task> {
        self.enter(GatewayOp::UpdateTask)?;
        let mut db = self.db.borrow_mut();
        let task = db
            .tasks
            .iter_mut()
            .find(|t| t.id == task_id)
            .ok_or_else(|| not_found("task", task_id))?;
        patch.apply_to(task);
        task.updated_at = Utc::now();
        Ok(task.clone())
    }

    async fn move_task(
        &self,
        task_id: TaskId,
        new_column_id: ColumnId,
        new_sort_order: i32,
    ) -> GatewayResult<()> {
        self.enter(GatewayOp::MoveTask)?;
        let mut db = self.db.borrow_mut();
        let source = db
            .tasks
            .iter()
            .find(|t| t.id == task_id)
            .map(|t| t.column_id)
            .ok_or_else(|| not_found("task", task_id))?;
        if !db.columns.iter().any(|c| c.id == new_column_id) {
            return Err(not_found("column", new_column_id));
        }

        let mut target: Vec<TaskId> =
            db.ordered_task_ids(new_column_id).into_iter().filter(|id| *id != task_id).collect();
        let index = (new_sort_order.max(0) as usize).min(target.len());
        target.insert(index, task_id);
        db.renumber(new_column_id, &target);

        if source != new_column_id {
            let remaining = db.ordered_task_ids(source);
            db.renumber(source, &remaining);
        }
        Ok(())
    }

    async fn delete_task(&self, task_id: TaskId) -> GatewayResult<()> {
        self.enter(GatewayOp::DeleteTask)?;
        let mut db = self.db.borrow_mut();
        let before = db.tasks.len();
        db.tasks.retain(|t| t.id != task_id);
        if db.tasks.len() == before {
            return Err(not_found("task", task_id));
        }
        Ok(())
    }
}
