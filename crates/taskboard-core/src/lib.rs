//! Taskboard Core
//!
//! Client-side state engine for a task board: the board model, the
//! reorder/move algorithms behind drag-and-drop, the drag state machine and
//! the stores that keep local state in step with a remote [`Gateway`].
//!
//! Nothing here depends on a UI toolkit; the browser app drives it through
//! [`BoardStore`] and [`DragController`].

pub mod boards;
pub mod drag;
pub mod error;
pub mod filter;
pub mod gateway;
pub mod intent;
pub mod memory;
pub mod model;
pub mod reorder;
pub mod store;

#[cfg(test)]
pub(crate) mod testing;

pub use boards::{BoardListState, BoardListStore};
pub use drag::{
    ActiveDrag, DragConfig, DragController, DragError, DragState, DropOutcome, Point,
    DRAG_ACTIVATION_DISTANCE_PX,
};
pub use error::{BoardError, EntityKind, GatewayError, ReorderError, Result};
pub use filter::{BoardFilter, TaskFilter};
pub use gateway::{Gateway, GatewayResult};
pub use intent::{Intent, MoveIntent, ReorderIntent};
pub use memory::{GatewayOp, MemoryGateway};
pub use model::{
    Board, BoardId, BoardPatch, BoardWithColumns, Column, ColumnId, ColumnWithTasks, Entity,
    NewBoard, NewTask, Priority, Task, TaskId, TaskInput, TaskPatch, UserId,
};
pub use reorder::{DropTarget, TaskLocation};
pub use store::{BoardState, BoardStore, SubscriptionId};
