//! UI Components
//!
//! Reusable Leptos components.

mod board_page;
mod column_view;
mod dashboard;
mod delete_confirm_button;
mod error_banner;
mod filter_bar;
mod new_task_form;
mod task_card;

pub use board_page::BoardPage;
pub use column_view::ColumnView;
pub use dashboard::Dashboard;
pub use delete_confirm_button::DeleteConfirmButton;
pub use error_banner::ErrorBanner;
pub use filter_bar::FilterBar;
pub use new_task_form::NewTaskForm;
pub use task_card::TaskCard;
