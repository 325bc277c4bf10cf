//! Test Gateways
//!
//! `MemoryGateway` never suspends, so operations joined together run one
//! after another. `GatedGateway` can hold calls of chosen operations open
//! until a test releases them, in any order.

use std::cell::RefCell;
use std::collections::HashSet;

use async_trait::async_trait;
use tokio::sync::oneshot;

use crate::gateway::{Gateway, GatewayResult};
use crate::memory::{GatewayOp, MemoryGateway};
use crate::model::{
    Board, BoardId, BoardPatch, BoardWithColumns, Column, ColumnId, NewBoard, NewTask, Task,
    TaskId, TaskPatch, UserId,
};

/// Gives every future joined alongside a chance to run up to its next await
pub(crate) async fn settle() {
    for _ in 0..8 {
        tokio::task::yield_now().await;
    }
}

#[derive(Debug, Default)]
pub(crate) struct GatedGateway {
    memory: MemoryGateway,
    held: RefCell<HashSet<GatewayOp>>,
    waiting: RefCell<Vec<(GatewayOp, oneshot::Sender<()>)>>,
}

impl GatedGateway {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn memory(&self) -> &MemoryGateway {
        &self.memory
    }

    /// Calls of `op` made from now on wait for a release
    pub(crate) fn hold(&self, op: GatewayOp) {
        self.held.borrow_mut().insert(op);
    }

    pub(crate) fn waiting(&self, op: GatewayOp) -> usize {
        self.waiting.borrow().iter().filter(|(held, _)| *held == op).count()
    }

    /// Let the oldest waiting call of `op` through
    pub(crate) fn release(&self, op: GatewayOp) -> bool {
        let position = self.waiting.borrow().iter().position(|(held, _)| *held == op);
        self.open(position)
    }

    /// Let the newest waiting call of `op` through
    pub(crate) fn release_latest(&self, op: GatewayOp) -> bool {
        let position = self.waiting.borrow().iter().rposition(|(held, _)| *held == op);
        self.open(position)
    }

    fn open(&self, position: Option<usize>) -> bool {
        let Some(position) = position else { return false };
        let (_, gate) = self.waiting.borrow_mut().remove(position);
        gate.send(()).is_ok()
    }

    async fn gate(&self, op: GatewayOp) {
        if !self.held.borrow().contains(&op) {
            return;
        }
        let (tx, rx) = oneshot::channel();
        self.waiting.borrow_mut().push((op, tx));
        let _ = rx.await;
    }
}

#[async_trait(?Send)]
impl Gateway for GatedGateway {
    async fn list_boards(&self, owner: &UserId) -> GatewayResult<Vec<Board>> {
        self.gate(GatewayOp::ListBoards).await;
        self.memory.list_boards(owner).await
    }

    async fn create_board(&self, owner: &UserId, board: &NewBoard) -> GatewayResult<Board> {
        self.gate(GatewayOp::CreateBoard).await;
        self.memory.create_board(owner, board).await
    }

    async fn update_board(&self, board_id: BoardId, patch: &BoardPatch) -> GatewayResult<Board> {
        self.gate(GatewayOp::UpdateBoard).await;
        self.memory.update_board(board_id, patch).await
    }

    async fn delete_board(&self, board_id: BoardId) -> GatewayResult<()> {
        self.gate(GatewayOp::DeleteBoard).await;
        self.memory.delete_board(board_id).await
    }

    async fn get_board_with_columns_and_tasks(
        &self,
        board_id: BoardId,
    ) -> GatewayResult<BoardWithColumns> {
        self.gate(GatewayOp::GetBoard).await;
        self.memory.get_board_with_columns_and_tasks(board_id).await
    }

    async fn create_column(
        &self,
        board_id: BoardId,
        title: &str,
        sort_order: i32,
        owner: &UserId,
    ) -> GatewayResult<Column> {
        self.gate(GatewayOp::CreateColumn).await;
        self.memory.create_column(board_id, title, sort_order, owner).await
    }

    async fn update_column_title(&self, column_id: ColumnId, title: &str) -> GatewayResult<Column> {
        self.gate(GatewayOp::UpdateColumnTitle).await;
        self.memory.update_column_title(column_id, title).await
    }

    async fn delete_column(&self, column_id: ColumnId) -> GatewayResult<()> {
        self.gate(GatewayOp::DeleteColumn).await;
        self.memory.delete_column(column_id).await
    }

    async fn create_task(
        &self,
        column_id: ColumnId,
        task: &NewTask,
        sort_order: i32,
    ) -> GatewayResult<Task> {
        self.gate(GatewayOp::CreateTask).await;
        self.memory.create_task(column_id, task, sort_order).await
    }

    async fn update_task(&self, task_id: TaskId, patch: &TaskPatch) -> GatewayResult<Task> {
        self.gate(GatewayOp::UpdateTask).await;
        self.memory.update_task(task_id, patch).await
    }

    async fn move_task(
        &self,
        task_id: TaskId,
        new_column_id: ColumnId,
        new_sort_order: i32,
    ) -> GatewayResult<()> {
        self.gate(GatewayOp::MoveTask).await;
        self.memory.move_task(task_id, new_column_id, new_sort_order).await
    }

    async fn delete_task(&self, task_id: TaskId) -> GatewayResult<()> {
        self.gate(GatewayOp::DeleteTask).await;
        self.memory.delete_task(task_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_held_call_waits_for_release() {
        let gw = GatedGateway::new();
        gw.hold(GatewayOp::ListBoards);
        let owner = UserId::new("user_1");

        let listing = gw.list_boards(&owner);
        let driver = async {
            settle().await;
            assert_eq!(gw.waiting(GatewayOp::ListBoards), 1);
            assert!(gw.memory().calls().is_empty());
            assert!(gw.release(GatewayOp::ListBoards));
        };
        let (boards, ()) = tokio::join!(listing, driver);

        assert!(boards.unwrap().is_empty());
        assert_eq!(gw.memory().calls(), vec![GatewayOp::ListBoards]);
        assert!(!gw.release(GatewayOp::ListBoards));
    }
}
