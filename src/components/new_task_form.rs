//! New Task Form Component
//!
//! Collapsible form at the foot of a column.

use leptos::prelude::*;
use taskboard_core::{ColumnId, Priority, TaskInput};

use super::dashboard::parse_date;
use crate::context::use_app_context;

#[component]
pub fn NewTaskForm(column_id: ColumnId) -> impl IntoView {
    let ctx = use_app_context();

    let (open, set_open) = signal(false);
    let (title, set_title) = signal(String::new());
    let (description, set_description) = signal(String::new());
    let (priority, set_priority) = signal(Priority::default());
    let (due, set_due) = signal(String::new());

    let reset = move || {
        set_title.set(String::new());
        set_description.set(String::new());
        set_priority.set(Priority::default());
        set_due.set(String::new());
        set_open.set(false);
    };

    let submit = move || {
        let value = title.get_untracked();
        if value.trim().is_empty() {
            return;
        }
        let input = TaskInput {
            title: value,
            description: Some(description.get_untracked()),
            due_date: parse_date(&due.get_untracked()),
            priority: Some(priority.get_untracked()),
        };
        ctx.create_task(column_id, input);
        reset();
    };

    view! {
        <Show
            when=move || open.get()
            fallback=move || view! {
                <button class="add-task-btn" on:click=move |_| set_open.set(true)>"+ Add task"</button>
            }
        >
            <form
                class="new-task-form"
                on:submit=move |ev: web_sys::SubmitEvent| {
                    ev.prevent_default();
                    submit();
                }
            >
                <input
                    type="text"
                    class="new-task-title"
                    placeholder="Task title"
                    autofocus
                    prop:value=move || title.get()
                    on:input=move |ev| set_title.set(event_target_value(&ev))
                    on:keydown=move |ev: web_sys::KeyboardEvent| {
                        if ev.key() == "Escape" {
                            reset();
                        }
                    }
                />
                <textarea
                    class="new-task-description"
                    placeholder="Description (optional)"
                    prop:value=move || description.get()
                    on:input=move |ev| set_description.set(event_target_value(&ev))
                ></textarea>
                <div class="new-task-row">
                    <select
                        class="new-task-priority"
                        on:change=move |ev| {
                            if let Ok(value) = event_target_value(&ev).parse::<Priority>() {
                                set_priority.set(value);
                            }
                        }
                    >
                        {Priority::ALL.into_iter().map(|p| view! {
                            <option value=p.as_str() selected=move || priority.get() == p>{p.label()}</option>
                        }).collect_view()}
                    </select>
                    <input
                        type="date"
                        class="new-task-due"
                        prop:value=move || due.get()
                        on:input=move |ev| set_due.set(event_target_value(&ev))
                    />
                </div>
                <div class="new-task-actions">
                    <button type="submit" class="confirm-btn">"Add"</button>
                    <button type="button" class="cancel-btn" on:click=move |_| reset()>"Cancel"</button>
                </div>
            </form>
        </Show>
    }
}
