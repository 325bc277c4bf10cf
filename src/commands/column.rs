//! Column Commands

use serde::Serialize;
use taskboard_core::{BoardId, Column, ColumnId, UserId};

use super::call;

#[derive(Serialize)]
struct CreateColumnArgs<'a> {
    #[serde(rename = "boardId")]
    board_id: BoardId,
    title: &'a str,
    #[serde(rename = "sortOrder")]
    sort_order: i32,
    #[serde(rename = "userId")]
    user_id: &'a UserId,
}

#[derive(Serialize)]
struct UpdateColumnTitleArgs<'a> {
    #[serde(rename = "columnId")]
    column_id: ColumnId,
    title: &'a str,
}

#[derive(Serialize)]
struct ColumnIdArgs {
    #[serde(rename = "columnId")]
    column_id: ColumnId,
}

pub async fn create_column(
    board_id: BoardId,
    title: &str,
    sort_order: i32,
    user_id: &UserId,
) -> Result<Column, String> {
    call("create_column", &CreateColumnArgs { board_id, title, sort_order, user_id }).await
}

pub async fn update_column_title(column_id: ColumnId, title: &str) -> Result<Column, String> {
    call("update_column_title", &UpdateColumnTitleArgs { column_id, title }).await
}

pub async fn delete_column(column_id: ColumnId) -> Result<(), String> {
    call("delete_column", &ColumnIdArgs { column_id }).await
}
