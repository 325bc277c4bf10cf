//! Task Card Component
//!
//! A draggable task with inline priority and due-date editing.

use chrono::Local;
use leptos::prelude::*;
use leptos_dragdrop::{make_on_mousedown, make_on_task_mouseenter, make_on_task_mouseleave, DndSignals};
use taskboard_core::{DropTarget, Priority, Task, TaskPatch};

use super::dashboard::parse_date;
use crate::components::DeleteConfirmButton;
use crate::context::use_app_context;

#[component]
pub fn TaskCard(task: Task) -> impl IntoView {
    let ctx = use_app_context();
    let dnd = expect_context::<DndSignals>();
    let (expanded, set_expanded) = signal(false);

    let task_id = task.id;
    let column_id = task.column_id;
    let overdue = task.is_overdue(Local::now().date_naive());
    let priority = task.priority;
    let task = StoredValue::new(task);
    let title = move || task.with_value(|t| t.title.clone());
    let description = move || task.with_value(|t| t.description.clone());
    let due = move || task.with_value(|t| t.due_date.map(|d| d.to_string()));

    let is_dragging = move || dnd.dragging() == Some(task_id);
    let is_drop_target = move || dnd.over() == Some(DropTarget::Task(task_id));

    let on_click = move |_| {
        // The click that ends a drag is not a toggle
        if dnd.drag_just_ended_read.get_untracked() {
            return;
        }
        set_expanded.update(|v| *v = !*v);
    };

    let save_title = move |value: String| {
        if !value.trim().is_empty() && value != title() {
            ctx.update_task(task_id, TaskPatch { title: Some(value), ..Default::default() });
        }
    };

    view! {
        <div
            class="task-card"
            class:dragging=is_dragging
            class:drop-target=is_drop_target
            class:overdue=overdue
            on:mousedown=make_on_mousedown(dnd, task_id)
            on:mouseenter=make_on_task_mouseenter(dnd, task_id)
            on:mouseleave=make_on_task_mouseleave(dnd, column_id)
            on:click=on_click
        >
            <div class="task-card-header">
                <span class=format!("priority-badge priority-{}", priority)>{priority.label()}</span>
                <span class="task-title">{title()}</span>
                <DeleteConfirmButton
                    button_class="task-delete-btn"
                    subject="task"
                    on_confirm=Callback::new(move |_| ctx.delete_task(task_id))
                />
            </div>

            {due().map(|d| view! {
                <p class="task-due" class:overdue=overdue>
                    {if overdue { "Overdue: " } else { "Due " }}{d}
                </p>
            })}

            <Show when=move || expanded.get()>
                <div
                    class="task-details"
                    on:click=|ev: web_sys::MouseEvent| ev.stop_propagation()
                    on:mousedown=|ev: web_sys::MouseEvent| ev.stop_propagation()
                >
                    <input
                        type="text"
                        class="task-title-input"
                        prop:value=title()
                        on:change=move |ev| save_title(event_target_value(&ev))
                    />
                    <textarea
                        class="task-description-input"
                        placeholder="Description"
                        prop:value=description().unwrap_or_default()
                        on:change=move |ev| {
                            let value = event_target_value(&ev);
                            let description = if value.trim().is_empty() { None } else { Some(value) };
                            ctx.update_task(task_id, TaskPatch { description: Some(description), ..Default::default() });
                        }
                    ></textarea>
                    <select
                        class="task-priority-select"
                        on:change=move |ev| {
                            if let Ok(priority) = event_target_value(&ev).parse::<Priority>() {
                                ctx.update_task(task_id, TaskPatch { priority: Some(priority), ..Default::default() });
                            }
                        }
                    >
                        {Priority::ALL.into_iter().map(|p| view! {
                            <option value=p.as_str() selected={p == priority}>{p.label()}</option>
                        }).collect_view()}
                    </select>
                    <input
                        type="date"
                        class="task-due-input"
                        prop:value=due().unwrap_or_default()
                        on:change=move |ev| {
                            let due_date = parse_date(&event_target_value(&ev));
                            ctx.update_task(task_id, TaskPatch { due_date: Some(due_date), ..Default::default() });
                        }
                    />
                </div>
            </Show>

            <Show when=move || !expanded.get()>
                {description().map(|d| view! { <p class="task-description">{d}</p> })}
            </Show>
        </div>
    }
}
