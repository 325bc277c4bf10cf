//! Board Commands
//!
//! Frontend bindings for board-related host commands.

use serde::Serialize;
use taskboard_core::{Board, BoardId, BoardPatch, BoardWithColumns, NewBoard, UserId};

use super::call;

// ========================
// Argument Structs
// ========================

#[derive(Serialize)]
struct UserIdArgs<'a> {
    #[serde(rename = "userId")]
    user_id: &'a UserId,
}

#[derive(Serialize)]
struct CreateBoardArgs<'a> {
    #[serde(rename = "userId")]
    user_id: &'a UserId,
    board: &'a NewBoard,
}

#[derive(Serialize)]
struct BoardIdArgs {
    #[serde(rename = "boardId")]
    board_id: BoardId,
}

#[derive(Serialize)]
struct UpdateBoardArgs<'a> {
    #[serde(rename = "boardId")]
    board_id: BoardId,
    patch: &'a BoardPatch,
}

// ========================
// Commands
// ========================

pub async fn list_boards(user_id: &UserId) -> Result<Vec<Board>, String> {
    call("list_boards", &UserIdArgs { user_id }).await
}

pub async fn create_board(user_id: &UserId, board: &NewBoard) -> Result<Board, String> {
    call("create_board", &CreateBoardArgs { user_id, board }).await
}

pub async fn update_board(board_id: BoardId, patch: &BoardPatch) -> Result<Board, String> {
    call("update_board", &UpdateBoardArgs { board_id, patch }).await
}

pub async fn delete_board(board_id: BoardId) -> Result<(), String> {
    call("delete_board", &BoardIdArgs { board_id }).await
}

pub async fn get_board_with_columns_and_tasks(board_id: BoardId) -> Result<BoardWithColumns, String> {
    call("get_board_with_columns_and_tasks", &BoardIdArgs { board_id }).await
}
