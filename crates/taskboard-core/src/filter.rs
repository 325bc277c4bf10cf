//! View Filters
//!
//! Display-only narrowing of tasks and boards. Filters produce copies;
//! store state is never filtered.

use std::collections::BTreeSet;

use chrono::NaiveDate;

use crate::model::{Board, ColumnWithTasks, Priority, Task};

// ========================
// Task Filter
// ========================

/// Narrow the tasks shown on a board page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskFilter {
    /// Shown priorities; empty shows all
    pub priorities: BTreeSet<Priority>,
    /// Only tasks due on this day. Tasks without a due date always pass.
    pub due_date: Option<NaiveDate>,
}

impl TaskFilter {
    pub fn toggle_priority(&mut self, priority: Priority) {
        if !self.priorities.remove(&priority) {
            self.priorities.insert(priority);
        }
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn is_active(&self) -> bool {
        self.active_count() > 0
    }

    /// Selected priorities plus one for a due date
    pub fn active_count(&self) -> usize {
        self.priorities.len() + usize::from(self.due_date.is_some())
    }

    pub fn matches(&self, task: &Task) -> bool {
        if !self.priorities.is_empty() && !self.priorities.contains(&task.priority) {
            return false;
        }
        match (self.due_date, task.due_date) {
            (Some(wanted), Some(due)) => wanted == due,
            _ => true,
        }
    }

    /// Copies of `columns` holding only matching tasks, in the same order
    pub fn apply(&self, columns: &[ColumnWithTasks]) -> Vec<ColumnWithTasks> {
        columns
            .iter()
            .map(|col| ColumnWithTasks {
                column: col.column.clone(),
                tasks: col.tasks.iter().filter(|t| self.matches(t)).cloned().collect(),
            })
            .collect()
    }
}

// ========================
// Board Filter
// ========================

/// Narrow the boards listed on the dashboard
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoardFilter {
    /// Case-insensitive substring of the title
    pub search: String,
    pub created_from: Option<NaiveDate>,
    pub created_to: Option<NaiveDate>,
}

impl BoardFilter {
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn is_active(&self) -> bool {
        !self.search.trim().is_empty() || self.created_from.is_some() || self.created_to.is_some()
    }

    pub fn matches(&self, board: &Board) -> bool {
        let needle = self.search.trim().to_lowercase();
        if !needle.is_empty() && !board.title.to_lowercase().contains(&needle) {
            return false;
        }
        let created = board.created_at.date_naive();
        self.created_from.map_or(true, |from| created >= from)
            && self.created_to.map_or(true, |to| created <= to)
    }

    pub fn apply<'a>(&self, boards: &'a [Board]) -> Vec<&'a Board> {
        boards.iter().filter(|b| self.matches(b)).collect()
    }
}
