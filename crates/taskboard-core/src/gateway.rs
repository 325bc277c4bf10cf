//! Persistence Gateway
//!
//! Abstract interface to the remote service that owns durable board state.
//! Implementations can talk to a host process, an HTTP API, in-memory, etc.

use async_trait::async_trait;

use crate::error::GatewayError;
use crate::model::{
    Board, BoardId, BoardPatch, BoardWithColumns, Column, ColumnId, NewBoard, NewTask, Task,
    TaskId, TaskPatch, UserId,
};

/// Result type for gateway calls
pub type GatewayResult<T> = Result<T, GatewayError>;

/// Remote CRUD + reorder operations over boards, columns and tasks.
///
/// The gateway assigns identifiers and timestamps and is the single source
/// of truth. Futures are not `Send`: browser implementations hold JS values.
#[async_trait(?Send)]
pub trait Gateway {
    /// Boards owned by `owner`, in no particular order
    async fn list_boards(&self, owner: &UserId) -> GatewayResult<Vec<Board>>;

    /// Create a board together with its default columns
    async fn create_board(&self, owner: &UserId, board: &NewBoard) -> GatewayResult<Board>;

    async fn update_board(&self, board_id: BoardId, patch: &BoardPatch) -> GatewayResult<Board>;

    /// Delete a board, cascading to its columns and tasks
    async fn delete_board(&self, board_id: BoardId) -> GatewayResult<()>;

    /// The board with its columns and their tasks, each ordered by sort position
    async fn get_board_with_columns_and_tasks(
        &self,
        board_id: BoardId,
    ) -> GatewayResult<BoardWithColumns>;

    async fn create_column(
        &self,
        board_id: BoardId,
        title: &str,
        sort_order: i32,
        owner: &UserId,
    ) -> GatewayResult<Column>;

    async fn update_column_title(&self, column_id: ColumnId, title: &str) -> GatewayResult<Column>;

    /// Delete a column, cascading to its tasks
    async fn delete_column(&self, column_id: ColumnId) -> GatewayResult<()>;

    async fn create_task(
        &self,
        column_id: ColumnId,
        task: &NewTask,
        sort_order: i32,
    ) -> GatewayResult<Task>;

    async fn update_task(&self, task_id: TaskId, patch: &TaskPatch) -> GatewayResult<Task>;

    /// Place a task at `new_sort_order` (an index) within `new_column_id`
    async fn move_task(
        &self,
        task_id: TaskId,
        new_column_id: ColumnId,
        new_sort_order: i32,
    ) -> GatewayResult<()>;

    async fn delete_task(&self, task_id: TaskId) -> GatewayResult<()>;
}
