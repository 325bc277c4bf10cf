//! Host Gateway
//!
//! `Gateway` implementation that forwards every operation to the host
//! through `invoke`, plus the choice between it and the offline in-memory
//! gateway.

use std::rc::Rc;

use async_trait::async_trait;
use taskboard_core::{
    Board, BoardId, BoardPatch, BoardWithColumns, Column, ColumnId, Gateway, GatewayError,
    GatewayResult, MemoryGateway, NewBoard, NewTask, Task, TaskId, TaskPatch, UserId,
};

use crate::commands;

/// Gateway backed by host commands
#[derive(Debug, Default, Clone, Copy)]
pub struct TauriGateway;

#[async_trait(?Send)]
impl Gateway for TauriGateway {
    async fn list_boards(&self, owner: &UserId) -> GatewayResult<Vec<Board>> {
        commands::list_boards(owner).await.map_err(GatewayError::from)
    }

    async fn create_board(&self, owner: &UserId, board: &NewBoard) -> GatewayResult<Board> {
        commands::create_board(owner, board).await.map_err(GatewayError::from)
    }

    async fn update_board(&self, board_id: BoardId, patch: &BoardPatch) -> GatewayResult<Board> {
        commands::update_board(board_id, patch).await.map_err(GatewayError::from)
    }

    async fn delete_board(&self, board_id: BoardId) -> GatewayResult<()> {
        commands::delete_board(board_id).await.map_err(GatewayError::from)
    }

    async fn get_board_with_columns_and_tasks(
        &self,
        board_id: BoardId,
    ) -> GatewayResult<BoardWithColumns> {
        commands::get_board_with_columns_and_tasks(board_id).await.map_err(GatewayError::from)
    }

    async fn create_column(
        &self,
        board_id: BoardId,
        title: &str,
        sort_order: i32,
        owner: &UserId,
    ) -> GatewayResult<Column> {
        commands::create_column(board_id, title, sort_order, owner).await.map_err(GatewayError::from)
    }

    async fn update_column_title(&self, column_id: ColumnId, title: &str) -> GatewayResult<Column> {
        commands::update_column_title(column_id, title).await.map_err(GatewayError::from)
    }

    async fn delete_column(&self, column_id: ColumnId) -> GatewayResult<()> {
        commands::delete_column(column_id).await.map_err(GatewayError::from)
    }

    async fn create_task(
        &self,
        column_id: ColumnId,
        task: &NewTask,
        sort_order: i32,
    ) -> GatewayResult<Task> {
        commands::create_task(column_id, task, sort_order).await.map_err(GatewayError::from)
    }

    async fn update_task(&self, task_id: TaskId, patch: &TaskPatch) -> GatewayResult<Task> {
        commands::update_task(task_id, patch).await.map_err(GatewayError::from)
    }

    async fn move_task(
        &self,
        task_id: TaskId,
        new_column_id: ColumnId,
        new_sort_order: i32,
    ) -> GatewayResult<()> {
        commands::move_task(task_id, new_column_id, new_sort_order).await.map_err(GatewayError::from)
    }

    async fn delete_task(&self, task_id: TaskId) -> GatewayResult<()> {
        commands::delete_task(task_id).await.map_err(GatewayError::from)
    }
}

/// Pick the host gateway when a host is present, else keep everything in
/// memory for this page load.
pub fn connect() -> Rc<dyn Gateway> {
    if commands::host_available() {
        tracing::info!("using host gateway");
        Rc::new(TauriGateway)
    } else {
        tracing::warn!("no host found, boards are kept in memory only");
        Rc::new(MemoryGateway::new())
    }
}
