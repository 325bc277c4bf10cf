//! Column View Component
//!
//! One board column: editable title, its task cards and the new-task form.

use leptos::prelude::*;
use leptos_dragdrop::{make_on_column_mouseenter, make_on_mouseleave, DndSignals};
use taskboard_core::{ColumnId, ColumnWithTasks, DropTarget, Task};

use crate::components::{DeleteConfirmButton, NewTaskForm, TaskCard};
use crate::context::use_app_context;

#[component]
pub fn ColumnView(column_id: ColumnId, columns: Memo<Vec<ColumnWithTasks>>) -> impl IntoView {
    let ctx = use_app_context();
    let dnd = expect_context::<DndSignals>();
    let (editing, set_editing) = signal(false);

    let title = move || {
        columns.with(|cols| {
            cols.iter()
                .find(|c| c.id() == column_id)
                .map(|c| c.column.title.clone())
                .unwrap_or_default()
        })
    };
    let tasks = move || {
        columns.with(|cols| {
            cols.iter()
                .find(|c| c.id() == column_id)
                .map(|c| c.tasks.clone())
                .unwrap_or_default()
        })
    };
    let task_count = move || tasks().len();

    let save_title = move |value: String| {
        set_editing.set(false);
        if !value.trim().is_empty() && value.trim() != title() {
            ctx.update_column(column_id, value);
        }
    };

    let is_drop_target = move || dnd.over() == Some(DropTarget::Column(column_id));

    view! {
        <section class="column" class:drop-over=is_drop_target>
            <div class="column-header">
                <Show
                    when=move || editing.get()
                    fallback=move || view! {
                        <h2 class="column-title" on:dblclick=move |_| set_editing.set(true)>
                            {title}
                        </h2>
                    }
                >
                    <input
                        type="text"
                        class="column-title-input"
                        prop:value=title
                        autofocus
                        on:blur=move |ev| save_title(event_target_value(&ev))
                        on:keydown=move |ev: web_sys::KeyboardEvent| match ev.key().as_str() {
                            "Enter" => save_title(event_target_value(&ev)),
                            "Escape" => set_editing.set(false),
                            _ => {}
                        }
                    />
                </Show>
                <span class="column-count">{task_count}</span>
                <DeleteConfirmButton
                    button_class="column-delete-btn"
                    subject="column"
                    on_confirm=Callback::new(move |_| ctx.delete_column(column_id))
                />
            </div>

            <div
                class="column-body"
                on:mouseenter=make_on_column_mouseenter(dnd, column_id)
                on:mouseleave=make_on_mouseleave(dnd)
            >
                <For
                    each=tasks
                    key=|task: &Task| (task.id, task.updated_at)
                    children=move |task| view! { <TaskCard task=task /> }
                />
                <Show when=move || task_count() == 0>
                    <p class="column-empty">"Drop tasks here"</p>
                </Show>
            </div>

            <NewTaskForm column_id=column_id />
        </section>
    }
}
