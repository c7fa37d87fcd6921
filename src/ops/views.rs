use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::Serialize;

use crate::model::task::{Priority, Task, TaskId, TaskStatus};

/// Group label for tasks without a project
pub const UNASSIGNED: &str = "Unassigned";

/// One entry on the calendar
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    pub task_id: TaskId,
    pub title: String,
    pub date: NaiveDate,
    pub priority: Priority,
    pub status: TaskStatus,
}

/// Calendar events for the visible tasks that have a due date, in view order
pub fn calendar_events(visible: &[&Task]) -> Vec<CalendarEvent> {
    visible
        .iter()
        .filter_map(|t| {
            t.due_date.map(|date| CalendarEvent {
                task_id: t.id,
                title: t.title.clone(),
                date,
                priority: t.priority,
                status: t.status,
            })
        })
        .collect()
}

/// Visible tasks sorted by due date and grouped by project.
///
/// Undated tasks sort after dated ones; ties keep view order. Groups appear
/// in the order their first task does.
pub fn timeline<'a>(visible: &[&'a Task]) -> IndexMap<String, Vec<&'a Task>> {
    let mut sorted: Vec<&Task> = visible.to_vec();
    sorted.sort_by_key(|t| (t.due_date.is_none(), t.due_date));

    let mut groups: IndexMap<String, Vec<&Task>> = IndexMap::new();
    for task in sorted {
        let key = if task.project.trim().is_empty() {
            UNASSIGNED
        } else {
            task.project.as_str()
        };
        groups.entry(key.to_string()).or_default().push(task);
    }
    groups
}
