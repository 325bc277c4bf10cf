//! Intents
//!
//! Structured requests handed from the drag layer to the board store.

use crate::model::{ColumnId, TaskId};

/// Local, synchronous reorder inside one column. Never persisted by itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReorderIntent {
    pub column_id: ColumnId,
    pub from_index: usize,
    pub to_index: usize,
}

/// Terminal move of a task, persisted through the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveIntent {
    pub task_id: TaskId,
    pub target_column_id: ColumnId,
    /// `None` appends to the target column
    pub target_index: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Reorder(ReorderIntent),
    Move(MoveIntent),
}

impl From<ReorderIntent> for Intent {
    fn from(intent: ReorderIntent) -> Self {
        Intent::Reorder(intent)
    }
}

impl From<MoveIntent> for Intent {
    fn from(intent: MoveIntent) -> Self {
        Intent::Move(intent)
    }
}
