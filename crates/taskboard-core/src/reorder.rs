//! Reorder / Move Engine
//!
//! Pure list algorithms behind drag-and-drop: within-column reorder,
//! cross-column move, drop-target resolution and sort-position bookkeeping.
//! Nothing in here performs I/O.

use serde::{Deserialize, Serialize};

use crate::error::ReorderError;
use crate::model::{ColumnId, ColumnWithTasks, Entity, Task, TaskId};

// ========================
// List Algorithms
// ========================

/// Relocate the element at `from` to `to` (remove, then insert into the
/// shortened list). Both indices must be in range.
pub fn reorder<T: Clone>(items: &[T], from: usize, to: usize) -> Result<Vec<T>, ReorderError> {
    let len = items.len();
    for index in [from, to] {
        if index >= len {
            return Err(ReorderError::IndexOutOfRange { index, len });
        }
    }

    let mut out = items.to_vec();
    if from != to {
        let moved = out.remove(from);
        out.insert(to, moved);
    }
    Ok(out)
}

/// Clamp an insertion index to `[0, len]`; `None` means append.
pub fn clamp_index(index: Option<usize>, len: usize) -> usize {
    index.map_or(len, |i| i.min(len))
}

/// Result of moving one element between two lists
#[derive(Debug, Clone, PartialEq)]
pub struct CrossMove<T> {
    pub source: Vec<T>,
    pub target: Vec<T>,
    /// Where the element landed in `target`
    pub index: usize,
}

/// Remove `id` from `source` and insert it into `target` at `target_index`
/// (clamped, `None` appends). Returns `None` if `source` does not hold `id`.
pub fn move_across<T: Entity>(
    source: &[T],
    target: &[T],
    id: T::Id,
    target_index: Option<usize>,
) -> Option<CrossMove<T>> {
    let from = source.iter().position(|item| item.id() == id)?;
    let mut source = source.to_vec();
    let moved = source.remove(from);

    let mut target = target.to_vec();
    let index = clamp_index(target_index, target.len());
    target.insert(index, moved);

    Some(CrossMove { source, target, index })
}

// ========================
// Sort Positions
// ========================

/// Position for an item appended to a collection holding `positions`.
///
/// This is the item count, bumped past the last position when earlier
/// deletions left gaps, so it never ties with a position already present.
pub fn next_sort_order(positions: impl IntoIterator<Item = i32>) -> i32 {
    let (count, max) = positions
        .into_iter()
        .fold((0i32, None::<i32>), |(count, max), p| (count + 1, Some(max.map_or(p, |m| m.max(p)))));
    match max {
        Some(max) => count.max(max + 1),
        None => 0,
    }
}

/// Insert `item` after every element whose position is not greater than its
/// own, keeping `items` sorted when creates settle out of order.
pub fn insert_by_sort_order<T>(items: &mut Vec<T>, item: T, position: impl Fn(&T) -> i32) -> usize {
    let key = position(&item);
    let index = items.partition_point(|existing| position(existing) <= key);
    items.insert(index, item);
    index
}

/// Number tasks sequentially (0, 1, 2, ...)
pub fn renumber_sort_orders(tasks: &mut [Task]) {
    for (pos, task) in tasks.iter_mut().enumerate() {
        task.sort_order = pos as i32;
    }
}

/// Hand the given positions out in ascending order to `tasks` as they are
/// now ordered. The set of positions in the column stays the same.
pub fn reassign_sort_orders(tasks: &mut [Task], mut positions: Vec<i32>) {
    positions.sort_unstable();
    for (task, pos) in tasks.iter_mut().zip(positions) {
        task.sort_order = pos;
    }
}

/// Whether positions are strictly increasing
pub fn is_strictly_ordered(tasks: &[Task]) -> bool {
    tasks.windows(2).all(|w| w[0].sort_order < w[1].sort_order)
}

// ========================
// Board-Level Operations
// ========================

/// Where a task currently sits on the board
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskLocation {
    /// Position of the column in the board's column list
    pub column_index: usize,
    pub column_id: ColumnId,
    /// Position of the task within its column
    pub index: usize,
}

pub fn locate_task(columns: &[ColumnWithTasks], task_id: TaskId) -> Option<TaskLocation> {
    columns.iter().enumerate().find_map(|(column_index, col)| {
        col.position_of(task_id).map(|index| TaskLocation {
            column_index,
            column_id: col.id(),
            index,
        })
    })
}

/// Reorder one column in place. Returns `Ok(false)` for a no-op.
pub fn apply_reorder(column: &mut ColumnWithTasks, from: usize, to: usize) -> Result<bool, ReorderError> {
    let reordered = reorder(&column.tasks, from, to)?;
    if from == to {
        return Ok(false);
    }
    let positions = column.tasks.iter().map(|t| t.sort_order).collect();
    column.tasks = reordered;
    reassign_sort_orders(&mut column.tasks, positions);
    Ok(true)
}

/// Outcome of [`apply_move`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppliedMove {
    pub from: TaskLocation,
    /// Final index in the target column
    pub index: usize,
    /// False when the task was already at the requested place
    pub changed: bool,
}

/// Move a task to `target_index` of `target_column` (clamped, `None`
/// appends), updating `column_id` and renumbering the touched columns
/// `0..n`. Works for same-column moves too. Returns `None` if either the
/// task or the target column is missing.
pub fn apply_move(
    columns: &mut [ColumnWithTasks],
    task_id: TaskId,
    target_column: ColumnId,
    target_index: Option<usize>,
) -> Option<AppliedMove> {
    let from = locate_task(columns, task_id)?;
    let target_pos = columns.iter().position(|c| c.id() == target_column)?;

    if from.column_index == target_pos {
        let column = &mut columns[target_pos];
        let index = clamp_index(target_index, column.tasks.len() - 1);
        if index == from.index {
            return Some(AppliedMove { from, index, changed: false });
        }
        let moved = column.tasks.remove(from.index);
        column.tasks.insert(index, moved);
        renumber_sort_orders(&mut column.tasks);
        return Some(AppliedMove { from, index, changed: true });
    }

    let source = &columns[from.column_index];
    let target = &columns[target_pos];
    let mut cross = move_across(&source.tasks, &target.tasks, task_id, target_index)?;
    cross.target[cross.index].column_id = target_column;
    renumber_sort_orders(&mut cross.source);
    renumber_sort_orders(&mut cross.target);

    let index = cross.index;
    columns[from.column_index].tasks = cross.source;
    columns[target_pos].tasks = cross.target;
    Some(AppliedMove { from, index, changed: true })
}

// ========================
// Drop Resolution
// ========================

/// What the pointer was over when a dragged task was released
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DropTarget {
    /// The column body (empty area below its tasks)
    Column(ColumnId),
    /// Another task card
    Task(TaskId),
}

/// Where a drop lands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DropPlacement {
    pub column_id: ColumnId,
    pub index: usize,
    /// The task stays in the column it is currently in
    pub same_column: bool,
}

/// Resolve a drop of `task_id` onto `target`.
///
/// - Another column's body appends to that column.
/// - A task takes that task's index, pushing it and its followers down.
/// - The task's own column body, or the task itself, keep the task at its
///   current index.
///
/// Returns `None` when the dragged task or the target is not on the board.
pub fn resolve_drop(
    columns: &[ColumnWithTasks],
    task_id: TaskId,
    target: DropTarget,
) -> Option<DropPlacement> {
    let current = locate_task(columns, task_id)?;
    let (column_id, index) = match target {
        DropTarget::Column(column_id) if column_id == current.column_id => (column_id, current.index),
        DropTarget::Column(column_id) => {
            let column = columns.iter().find(|c| c.id() == column_id)?;
            (column_id, column.tasks.len())
        }
        DropTarget::Task(over) if over == task_id => (current.column_id, current.index),
        DropTarget::Task(over) => {
            let at = locate_task(columns, over)?;
            (at.column_id, at.index)
        }
    };
    Some(DropPlacement {
        column_id,
        index,
        same_column: column_id == current.column_id,
    })
}
