//! Leptos DragDrop Utilities
//!
//! Mouse-event bindings for dragging task cards between columns.
//! Gesture rules live in `taskboard_core::DragController`; this crate feeds
//! it DOM events and hands the resulting intents to the app.

use leptos::prelude::*;
use taskboard_core::{
    ColumnId, ColumnWithTasks, DragController, DragState, DropTarget, Intent, Point, TaskId,
};
use wasm_bindgen::JsCast;

/// How long clicks are swallowed after a drop, in ms
const CLICK_SUPPRESS_MS: i32 = 100;

/// DnD state signals
#[derive(Clone, Copy)]
pub struct DndSignals {
    pub controller_read: ReadSignal<DragController>,
    pub controller_write: WriteSignal<DragController>,
    pub drag_just_ended_read: ReadSignal<bool>,
    pub drag_just_ended_write: WriteSignal<bool>,
    /// Board columns as currently rendered
    pub columns: Signal<Vec<ColumnWithTasks>>,
    /// Receives preview, restore and move intents
    pub on_intent: Callback<Intent>,
}

impl DndSignals {
    /// Task being dragged (tracked)
    pub fn dragging(&self) -> Option<TaskId> {
        self.controller_read.with(|c| c.active_task())
    }

    /// Hovered drop target (tracked)
    pub fn over(&self) -> Option<DropTarget> {
        self.controller_read.with(|c| c.over())
    }

    fn is_dragging_untracked(&self) -> bool {
        self.controller_read.with_untracked(|c| c.is_dragging())
    }

    /// Run `f` against the controller and the rendered columns.
    fn drive<U>(&self, f: impl FnOnce(&mut DragController, &[ColumnWithTasks]) -> U) -> Option<U> {
        let columns = self.columns.get_untracked();
        let mut out = None;
        self.controller_write.update(|controller| out = Some(f(controller, &columns)));
        out
    }

    fn hover(&self, target: Option<DropTarget>) {
        if !self.is_dragging_untracked() || self.controller_read.with_untracked(|c| c.over()) == target {
            return;
        }
        if let Some(Some(preview)) = self.drive(|controller, columns| controller.hover(target, columns)) {
            self.on_intent.run(preview.into());
        }
    }
}

pub fn create_dnd_signals(columns: Signal<Vec<ColumnWithTasks>>, on_intent: Callback<Intent>) -> DndSignals {
    let (controller_read, controller_write) = signal(DragController::default());
    let (drag_just_ended_read, drag_just_ended_write) = signal(false);
    DndSignals {
        controller_read,
        controller_write,
        drag_just_ended_read,
        drag_just_ended_write,
        columns,
        on_intent,
    }
}

/// Flag the end of a gesture so the click that follows mouseup is ignored
pub fn end_drag(dnd: &DndSignals) {
    dnd.drag_just_ended_write.set(true);

    if let Some(win) = web_sys::window() {
        let clear = dnd.drag_just_ended_write;
        let cb = wasm_bindgen::closure::Closure::<dyn FnMut()>::new(move || {
            clear.set(false);
        });
        let _ = win.set_timeout_with_callback_and_timeout_and_arguments_0(
            cb.as_ref().unchecked_ref(),
            CLICK_SUPPRESS_MS,
        );
        cb.forget();
    }
}

/// Create mousedown handler for task cards.
/// Records a press; the drag starts once the pointer travels far enough.
pub fn make_on_mousedown(dnd: DndSignals, task_id: TaskId) -> impl Fn(web_sys::MouseEvent) + Copy + 'static {
    move |ev: web_sys::MouseEvent| {
        if ev.button() != 0 {
            return;
        }
        // Ignore if target is input or button
        if let Some(target) = ev.target() {
            if target.dyn_ref::<web_sys::HtmlInputElement>().is_some() { return; }
            if target.dyn_ref::<web_sys::HtmlButtonElement>().is_some() { return; }
        }
        let at = Point::new(ev.client_x() as f64, ev.client_y() as f64);
        if let Some(Err(err)) = dnd.drive(|controller, _| controller.press(task_id, at)) {
            tracing::debug!(task_id = %task_id, error = %err, "press ignored");
        }
    }
}

/// Document mousemove: starts the drag once the press moved past the threshold
pub fn bind_global_mousemove(dnd: DndSignals) {
    use wasm_bindgen::closure::Closure;

    let on_mousemove = Closure::<dyn FnMut(web_sys::MouseEvent)>::new(move |ev: web_sys::MouseEvent| {
        let pressed = dnd
            .controller_read
            .with_untracked(|c| matches!(c.state(), DragState::Pressed { .. }));
        if !pressed {
            return;
        }
        let at = Point::new(ev.client_x() as f64, ev.client_y() as f64);
        if let Some(Err(err)) = dnd.drive(|controller, columns| controller.pointer_move(at, columns)) {
            tracing::warn!(error = %err, "drag could not start");
        }
    });

    if let Some(win) = web_sys::window() {
        if let Some(doc) = win.document() {
            let _ = doc.add_event_listener_with_callback("mousemove", on_mousemove.as_ref().unchecked_ref());
        }
    }
    on_mousemove.forget();
}

/// Create mouseenter handler for task cards
pub fn make_on_task_mouseenter(dnd: DndSignals, task_id: TaskId) -> impl Fn(web_sys::MouseEvent) + Copy + 'static {
    move |_ev: web_sys::MouseEvent| dnd.hover(Some(DropTarget::Task(task_id)))
}

/// Create mouseleave handler for task cards. The pointer is back over the
/// card's column.
pub fn make_on_task_mouseleave(dnd: DndSignals, column_id: ColumnId) -> impl Fn(web_sys::MouseEvent) + Copy + 'static {
    move |_ev: web_sys::MouseEvent| dnd.hover(Some(DropTarget::Column(column_id)))
}

/// Create mouseenter handler for column bodies
pub fn make_on_column_mouseenter(dnd: DndSignals, column_id: ColumnId) -> impl Fn(web_sys::MouseEvent) + Copy + 'static {
    move |_ev: web_sys::MouseEvent| dnd.hover(Some(DropTarget::Column(column_id)))
}

/// Create mouseleave handler for column bodies
pub fn make_on_mouseleave(dnd: DndSignals) -> impl Fn(web_sys::MouseEvent) + Copy + 'static {
    move |_ev: web_sys::MouseEvent| dnd.hover(None)
}

/// Bind global mouseup (drop) and Escape (cancel) handlers
pub fn bind_global_mouseup(dnd: DndSignals) {
    use wasm_bindgen::closure::Closure;

    let on_mouseup = Closure::<dyn FnMut(web_sys::MouseEvent)>::new(move |_ev: web_sys::MouseEvent| {
        let was_dragging = dnd.is_dragging_untracked();
        let Some(outcome) = dnd.drive(|controller, columns| controller.release(columns)) else {
            return;
        };
        if was_dragging {
            // Only a real drag suppresses the click
            end_drag(&dnd);
        }
        tracing::debug!(?outcome, "drop");
        for intent in outcome.intents() {
            dnd.on_intent.run(intent);
        }
    });

    let on_keydown = Closure::<dyn FnMut(web_sys::KeyboardEvent)>::new(move |ev: web_sys::KeyboardEvent| {
        if ev.key() != "Escape" || !dnd.is_dragging_untracked() {
            return;
        }
        end_drag(&dnd);
        if let Some(Some(restore)) = dnd.drive(|controller, columns| controller.cancel(columns)) {
            dnd.on_intent.run(restore.into());
        }
    });

    if let Some(win) = web_sys::window() {
        if let Some(doc) = win.document() {
            let _ = doc.add_event_listener_with_callback("mouseup", on_mouseup.as_ref().unchecked_ref());
            let _ = doc.add_event_listener_with_callback("keydown", on_keydown.as_ref().unchecked_ref());
        }
    }
    on_mouseup.forget();
    on_keydown.forget();

    // Also bind global mousemove
    bind_global_mousemove(dnd);
}
