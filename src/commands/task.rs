//! Task Commands
//!
//! Frontend bindings for task-related host commands.

use serde::Serialize;
use taskboard_core::{ColumnId, NewTask, Task, TaskId, TaskPatch};

use super::call;

// ========================
// Argument Structs
// ========================

#[derive(Serialize)]
struct CreateTaskArgs<'a> {
    #[serde(rename = "columnId")]
    column_id: ColumnId,
    task: &'a NewTask,
    #[serde(rename = "sortOrder")]
    sort_order: i32,
}

#[derive(Serialize)]
struct UpdateTaskArgs<'a> {
    #[serde(rename = "taskId")]
    task_id: TaskId,
    patch: &'a TaskPatch,
}

#[derive(Serialize)]
struct MoveTaskArgs {
    #[serde(rename = "taskId")]
    task_id: TaskId,
    #[serde(rename = "newColumnId")]
    new_column_id: ColumnId,
    #[serde(rename = "newSortOrder")]
    new_sort_order: i32,
}

#[derive(Serialize)]
struct TaskIdArgs {
    #[serde(rename = "taskId")]
    task_id: TaskId,
}

// ========================
// Commands
// ========================

pub async fn create_task(column_id: ColumnId, task: &NewTask, sort_order: i32) -> Result<Task, String> {
    call("create_task", &CreateTaskArgs { column_id, task, sort_order }).await
}

pub async fn update_task(task_id: TaskId, patch: &TaskPatch) -> Result<Task, String> {
    call("update_task", &UpdateTaskArgs { task_id, patch }).await
}

pub async fn move_task(task_id: TaskId, new_column_id: ColumnId, new_sort_order: i32) -> Result<(), String> {
    call("move_task", &MoveTaskArgs { task_id, new_column_id, new_sort_order }).await
}

pub async fn delete_task(task_id: TaskId) -> Result<(), String> {
    call("delete_task", &TaskIdArgs { task_id }).await
}
