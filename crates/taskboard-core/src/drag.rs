//! Drag Interaction Controller
//!
//! Toolkit-independent gesture state machine. Pointer events go in,
//! reorder/move intents come out; the board itself is only ever read.
//!
//! ```text
//! Idle --press--> Pressed --moved past threshold--> Dragging --release--> Idle
//!                    \--release (a click)--> Idle
//! ```

use std::mem;

use thiserror::Error;
use tracing::debug;

use crate::intent::{Intent, MoveIntent, ReorderIntent};
use crate::model::{ColumnId, ColumnWithTasks, TaskId};
use crate::reorder::{locate_task, resolve_drop, DropTarget};

/// Pointer travel in pixels before a press becomes a drag
pub const DRAG_ACTIVATION_DISTANCE_PX: f64 = 12.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragConfig {
    pub activation_distance: f64,
}

impl Default for DragConfig {
    fn default() -> Self {
        Self {
            activation_distance: DRAG_ACTIVATION_DISTANCE_PX,
        }
    }
}

/// Pointer position in client pixels
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// The task currently being dragged
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActiveDrag {
    pub task_id: TaskId,
    pub source_column_id: ColumnId,
    /// Index at the moment the drag started
    pub source_index: usize,
    /// Index after the preview reorders emitted so far
    pub current_index: usize,
    /// What the pointer is over right now
    pub over: Option<DropTarget>,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum DragState {
    #[default]
    Idle,
    /// Pointer is down on a task but has not travelled far enough yet
    Pressed { task_id: TaskId, origin: Point },
    Dragging(ActiveDrag),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DragError {
    #[error("a drag gesture is already in progress")]
    GestureInProgress,
    #[error("task {0} is not on the board")]
    UnknownTask(TaskId),
}

/// How a gesture ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropOutcome {
    /// No drag was active (a plain click)
    Ignored,
    /// Persist the move. `restore` first puts the task back where the
    /// gesture started, so the move is applied from the persisted order.
    Moved { intent: MoveIntent, restore: Option<ReorderIntent> },
    /// Dropped back where it started
    Unchanged { restore: Option<ReorderIntent> },
    /// Dropped outside any valid target
    Cancelled { restore: Option<ReorderIntent> },
}

impl DropOutcome {
    /// Intents the store should apply, in order. `restore` reorders are
    /// local only.
    pub fn intents(&self) -> Vec<Intent> {
        match *self {
            DropOutcome::Ignored => Vec::new(),
            DropOutcome::Moved { intent, restore } => {
                restore.map(Intent::Reorder).into_iter().chain([Intent::Move(intent)]).collect()
            }
            DropOutcome::Unchanged { restore } | DropOutcome::Cancelled { restore } => {
                restore.map(Intent::Reorder).into_iter().collect()
            }
        }
    }
}

/// Single-gesture drag state machine
#[derive(Debug, Clone, Default)]
pub struct DragController {
    state: DragState,
    config: DragConfig,
}

impl DragController {
    pub fn new(config: DragConfig) -> Self {
        Self {
            state: DragState::Idle,
            config,
        }
    }

    pub fn state(&self) -> &DragState {
        &self.state
    }

    pub fn active(&self) -> Option<&ActiveDrag> {
        match &self.state {
            DragState::Dragging(active) => Some(active),
            _ => None,
        }
    }

    /// Task being dragged, once past the activation threshold
    pub fn active_task(&self) -> Option<TaskId> {
        self.active().map(|a| a.task_id)
    }

    pub fn is_dragging(&self) -> bool {
        self.active().is_some()
    }

    /// Current drop target, if dragging
    pub fn over(&self) -> Option<DropTarget> {
        self.active().and_then(|a| a.over)
    }

    /// Pointer went down on a task
    pub fn press(&mut self, task_id: TaskId, at: Point) -> Result<(), DragError> {
        match self.state {
            DragState::Idle => {
                self.state = DragState::Pressed { task_id, origin: at };
                Ok(())
            }
            _ => Err(DragError::GestureInProgress),
        }
    }

    /// Pointer moved. Starts the drag once the press has travelled past the
    /// activation distance; returns `Ok(true)` on that transition.
    pub fn pointer_move(&mut self, at: Point, columns: &[ColumnWithTasks]) -> Result<bool, DragError> {
        let DragState::Pressed { task_id, origin } = self.state else {
            return Ok(false);
        };
        if origin.distance_to(at) <= self.config.activation_distance {
            return Ok(false);
        }
        self.state = DragState::Idle;
        self.start(task_id, columns).map(|_| true)
    }

    /// Start dragging `task_id` straight away, skipping the threshold.
    pub fn begin(&mut self, task_id: TaskId, columns: &[ColumnWithTasks]) -> Result<ActiveDrag, DragError> {
        match self.state {
            DragState::Idle => {}
            DragState::Pressed { task_id: pressed, .. } if pressed == task_id => {
                self.state = DragState::Idle;
            }
            _ => return Err(DragError::GestureInProgress),
        }
        self.start(task_id, columns)
    }

    fn start(&mut self, task_id: TaskId, columns: &[ColumnWithTasks]) -> Result<ActiveDrag, DragError> {
        let location = locate_task(columns, task_id).ok_or(DragError::UnknownTask(task_id))?;
        let active = ActiveDrag {
            task_id,
            source_column_id: location.column_id,
            source_index: location.index,
            current_index: location.index,
            over: None,
        };
        debug!(task_id = %task_id, column_id = %location.column_id, index = location.index, "drag started");
        self.state = DragState::Dragging(active);
        Ok(active)
    }

    /// Pointer entered `target` (or left every target with `None`).
    ///
    /// Hovering another task in the dragged task's own column yields a
    /// preview reorder that the caller should apply locally.
    pub fn hover(&mut self, target: Option<DropTarget>, columns: &[ColumnWithTasks]) -> Option<ReorderIntent> {
        let DragState::Dragging(active) = &mut self.state else {
            return None;
        };
        active.over = target;

        let Some(DropTarget::Task(over)) = target else {
            return None;
        };
        if over == active.task_id {
            return None;
        }
        let current = locate_task(columns, active.task_id)?;
        let at = locate_task(columns, over)?;
        if at.column_id != active.source_column_id || at.column_id != current.column_id || at.index == current.index {
            return None;
        }

        active.current_index = at.index;
        Some(ReorderIntent {
            column_id: current.column_id,
            from_index: current.index,
            to_index: at.index,
        })
    }

    /// Pointer released. Always returns the controller to `Idle`.
    pub fn release(&mut self, columns: &[ColumnWithTasks]) -> DropOutcome {
        let DragState::Dragging(active) = mem::take(&mut self.state) else {
            return DropOutcome::Ignored;
        };
        let restore = restore_intent(&active, columns);

        let placement = active.over.and_then(|target| resolve_drop(columns, active.task_id, target));
        let Some(placement) = placement else {
            debug!(task_id = %active.task_id, "drag cancelled: no drop target");
            return DropOutcome::Cancelled { restore };
        };

        let index = if placement.same_column {
            // Previews already put the task where the pointer is
            active.current_index
        } else {
            placement.index
        };

        if placement.column_id == active.source_column_id && index == active.source_index {
            return DropOutcome::Unchanged { restore };
        }

        DropOutcome::Moved {
            intent: MoveIntent {
                task_id: active.task_id,
                target_column_id: placement.column_id,
                target_index: Some(index),
            },
            restore,
        }
    }

    /// Abandon the gesture. Returns the reorder that undoes any previews.
    pub fn cancel(&mut self, columns: &[ColumnWithTasks]) -> Option<ReorderIntent> {
        match mem::take(&mut self.state) {
            DragState::Dragging(active) => restore_intent(&active, columns),
            _ => None,
        }
    }
}

/// Reorder that puts the dragged task back at its source index
fn restore_intent(active: &ActiveDrag, columns: &[ColumnWithTasks]) -> Option<ReorderIntent> {
    let location = locate_task(columns, active.task_id)?;
    if location.column_id != active.source_column_id || location.index == active.source_index {
        return None;
    }
    let len = columns[location.column_index].tasks.len();
    (active.source_index < len).then_some(ReorderIntent {
        column_id: location.column_id,
        from_index: location.index,
        to_index: active.source_index,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reorder::apply_reorder;
    use crate::reorder::test_support::*;

    fn board() -> Vec<ColumnWithTasks> {
        vec![make_column(1, &[1, 2, 3]), make_column(2, &[])]
    }

    fn apply(columns: &mut [ColumnWithTasks], intent: ReorderIntent) {
        let col = columns.iter_mut().find(|c| c.id() == intent.column_id).unwrap();
        apply_reorder(col, intent.from_index, intent.to_index).unwrap();
    }

    #[test]
    fn test_threshold_distinguishes_click_from_drag() {
        let columns = board();
        let mut dnd = DragController::default();

        dnd.press(task_id(1), Point::new(100.0, 100.0)).unwrap();
        assert!(!dnd.pointer_move(Point::new(105.0, 105.0), &columns).unwrap());
        assert!(!dnd.is_dragging());

        // Release before the threshold is a click
        assert_eq!(dnd.release(&columns), DropOutcome::Ignored);
        assert_eq!(*dnd.state(), DragState::Idle);

        dnd.press(task_id(1), Point::new(100.0, 100.0)).unwrap();
        assert!(dnd.pointer_move(Point::new(100.0, 113.0), &columns).unwrap());
        let active = dnd.active().unwrap();
        assert_eq!(active.source_column_id, column_id(1));
        assert_eq!(active.source_index, 0);
    }

    #[test]
    fn test_single_active_gesture() {
        let columns = board();
        let mut dnd = DragController::default();
        dnd.begin(task_id(1), &columns).unwrap();

        assert_eq!(dnd.press(task_id(2), Point::default()), Err(DragError::GestureInProgress));
        assert_eq!(dnd.begin(task_id(2), &columns), Err(DragError::GestureInProgress));
        assert_eq!(dnd.active_task(), Some(task_id(1)));

        dnd.release(&columns);
        assert!(dnd.begin(task_id(2), &columns).is_ok());
    }

    #[test]
    fn test_unknown_task_returns_to_idle() {
        let columns = board();
        let mut dnd = DragController::default();
        dnd.press(task_id(42), Point::default()).unwrap();
        assert_eq!(
            dnd.pointer_move(Point::new(50.0, 0.0), &columns),
            Err(DragError::UnknownTask(task_id(42)))
        );
        assert_eq!(*dnd.state(), DragState::Idle);
    }

    #[test]
    fn test_same_column_preview_then_drop() {
        let mut columns = board();
        let mut dnd = DragController::default();
        dnd.begin(task_id(1), &columns).unwrap();

        let preview = dnd.hover(Some(DropTarget::Task(task_id(3))), &columns).unwrap();
        assert_eq!(
            preview,
            ReorderIntent { column_id: column_id(1), from_index: 0, to_index: 2 }
        );
        apply(&mut columns, preview);
        assert_eq!(ids(&columns[0]), vec![2, 3, 1]);

        // The re-rendered card is now under the pointer
        assert!(dnd.hover(Some(DropTarget::Task(task_id(1))), &columns).is_none());

        let outcome = dnd.release(&columns);
        let restore = ReorderIntent { column_id: column_id(1), from_index: 2, to_index: 0 };
        let intent = MoveIntent {
            task_id: task_id(1),
            target_column_id: column_id(1),
            target_index: Some(2),
        };
        assert_eq!(outcome, DropOutcome::Moved { intent, restore: Some(restore) });
        assert_eq!(outcome.intents(), vec![Intent::Reorder(restore), Intent::Move(intent)]);
        assert!(!dnd.is_dragging());
    }

    #[test]
    fn test_cross_column_drop_on_column_appends() {
        let columns = vec![make_column(1, &[1, 2]), make_column(2, &[3, 4])];
        let mut dnd = DragController::default();
        dnd.begin(task_id(1), &columns).unwrap();

        // No preview across columns
        assert!(dnd.hover(Some(DropTarget::Task(task_id(3))), &columns).is_none());
        assert!(dnd.hover(Some(DropTarget::Column(column_id(2))), &columns).is_none());

        assert_eq!(
            dnd.release(&columns),
            DropOutcome::Moved {
                intent: MoveIntent {
                    task_id: task_id(1),
                    target_column_id: column_id(2),
                    target_index: Some(2),
                },
                restore: None,
            }
        );
    }

    #[test]
    fn test_cross_column_drop_on_task_takes_its_index() {
        let columns = vec![make_column(1, &[1, 2]), make_column(2, &[3, 4])];
        let mut dnd = DragController::default();
        dnd.begin(task_id(2), &columns).unwrap();
        dnd.hover(Some(DropTarget::Task(task_id(4))), &columns);

        match dnd.release(&columns) {
            DropOutcome::Moved { intent, .. } => {
                assert_eq!(intent.target_column_id, column_id(2));
                assert_eq!(intent.target_index, Some(1));
            }
            other => panic!("unexpected outcome {:?}", other),
        }
    }

    #[test]
    fn test_drop_on_self_is_unchanged() {
        let columns = board();
        let mut dnd = DragController::default();
        dnd.begin(task_id(2), &columns).unwrap();
        dnd.hover(Some(DropTarget::Task(task_id(2))), &columns);
        assert_eq!(dnd.release(&columns), DropOutcome::Unchanged { restore: None });
    }

    #[test]
    fn test_drop_outside_reverts_previews() {
        let mut columns = board();
        let mut dnd = DragController::default();
        dnd.begin(task_id(1), &columns).unwrap();

        let preview = dnd.hover(Some(DropTarget::Task(task_id(2))), &columns).unwrap();
        apply(&mut columns, preview);
        dnd.hover(None, &columns);

        let outcome = dnd.release(&columns);
        let DropOutcome::Cancelled { restore: Some(restore) } = outcome else {
            panic!("unexpected outcome {:?}", outcome);
        };
        assert_eq!(outcome.intents(), vec![Intent::Reorder(restore)]);
        apply(&mut columns, restore);
        assert_eq!(ids(&columns[0]), vec![1, 2, 3]);
        assert_eq!(*dnd.state(), DragState::Idle);
    }

    #[test]
    fn test_drop_without_movement_emits_nothing() {
        let columns = board();
        let mut dnd = DragController::default();
        dnd.begin(task_id(3), &columns).unwrap();
        let outcome = dnd.release(&columns);
        assert_eq!(outcome, DropOutcome::Cancelled { restore: None });
        assert!(outcome.intents().is_empty());
    }

    #[test]
    fn test_vanished_target_cancels() {
        let mut columns = board();
        let mut dnd = DragController::default();
        dnd.begin(task_id(1), &columns).unwrap();
        dnd.hover(Some(DropTarget::Column(column_id(2))), &columns);

        columns.pop();
        assert_eq!(dnd.release(&columns), DropOutcome::Cancelled { restore: None });
    }

    #[test]
    fn test_cancel_restores_source_index() {
        let mut columns = board();
        let mut dnd = DragController::default();
        dnd.begin(task_id(3), &columns).unwrap();
        let preview = dnd.hover(Some(DropTarget::Task(task_id(1))), &columns).unwrap();
        apply(&mut columns, preview);

        let restore = dnd.cancel(&columns).unwrap();
        assert_eq!(restore, ReorderIntent { column_id: column_id(1), from_index: 0, to_index: 2 });
        assert!(dnd.cancel(&columns).is_none());
    }
}
