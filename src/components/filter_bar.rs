//! Filter Bar Component
//!
//! Priority and due-date filters for the open board.

use leptos::prelude::*;
use taskboard_core::{Priority, TaskFilter};

use super::dashboard::parse_date;

#[component]
pub fn FilterBar(filter: ReadSignal<TaskFilter>, set_filter: WriteSignal<TaskFilter>) -> impl IntoView {
    let (open, set_open) = signal(false);

    let label = move || match filter.with(|f| f.active_count()) {
        0 => "Filter".to_string(),
        n => format!("Filter ({})", n),
    };

    view! {
        <div class="filter-bar">
            <button
                class=move || if filter.with(|f| f.is_active()) { "filter-btn active" } else { "filter-btn" }
                on:click=move |_| set_open.update(|v| *v = !*v)
            >
                {label}
            </button>

            <Show when=move || open.get()>
                <div class="filter-panel">
                    <div class="filter-group">
                        <span class="filter-label">"Priority"</span>
                        {Priority::ALL.into_iter().map(|priority| {
                            let is_selected = move || filter.with(|f| f.priorities.contains(&priority));
                            view! {
                                <button
                                    type="button"
                                    class=move || if is_selected() {
                                        format!("priority-btn priority-{} active", priority)
                                    } else {
                                        format!("priority-btn priority-{}", priority)
                                    }
                                    on:click=move |_| set_filter.update(|f| f.toggle_priority(priority))
                                >
                                    {priority.label()}
                                </button>
                            }
                        }).collect_view()}
                    </div>

                    <label class="filter-group">
                        <span class="filter-label">"Due date"</span>
                        <input
                            type="date"
                            prop:value=move || filter.with(|f| f.due_date.map(|d| d.to_string()).unwrap_or_default())
                            on:change=move |ev| {
                                let value = parse_date(&event_target_value(&ev));
                                set_filter.update(|f| f.due_date = value);
                            }
                        />
                    </label>

                    <button class="clear-filters-btn" on:click=move |_| set_filter.update(|f| f.clear())>
                        "Clear Filters"
                    </button>
                </div>
            </Show>
        </div>
    }
}
