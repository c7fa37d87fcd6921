use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::Serialize;

use crate::model::project::Project;
use crate::model::task::{Task, TaskStatus};

/// Label used when a task has no category
pub const OTHER_CATEGORY: &str = "Other";
/// Label used when a project has no status
pub const UNKNOWN_STATUS: &str = "unknown";

/// Per-month counts for a set of statuses, aligned to `categories`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlySeries {
    /// Month labels (`YYYY-MM`), ascending
    pub categories: Vec<String>,
    pub series: Vec<Series>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Series {
    pub name: String,
    pub data: Vec<usize>,
}

/// Headline numbers for the dashboard
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub total_projects: usize,
    pub total_tasks: usize,
    pub pending: usize,
    /// Completed tasks as a rounded percentage of all tasks
    pub completion_rate: u32,
}

// ---------------------------------------------------------------------------
// Grouping
// ---------------------------------------------------------------------------

/// Count `items` by `key`, keeping keys in first-seen order.
///
/// A key of `None` or an empty string is counted under `fallback`.
pub fn group_count<'a, T, F>(items: &'a [T], key: F, fallback: &str) -> IndexMap<String, usize>
where
    F: Fn(&'a T) -> Option<&'a str>,
{
    let mut counts: IndexMap<String, usize> = IndexMap::new();
    for item in items {
        let label = match key(item) {
            Some(k) if !k.is_empty() => k,
            _ => fallback,
        };
        *counts.entry(label.to_string()).or_default() += 1;
    }
    counts
}

/// Count items by a key every item has, in first-seen order
fn count_by<'a, T>(items: &'a [T], key: impl Fn(&'a T) -> &'a str) -> IndexMap<String, usize> {
    let mut counts: IndexMap<String, usize> = IndexMap::new();
    for item in items {
        *counts.entry(key(item).to_string()).or_default() += 1;
    }
    counts
}

pub fn status_distribution(tasks: &[Task]) -> IndexMap<String, usize> {
    count_by(tasks, |t| t.status.as_str())
}

pub fn priority_distribution(tasks: &[Task]) -> IndexMap<String, usize> {
    count_by(tasks, |t| t.priority.as_str())
}

pub fn category_distribution(tasks: &[Task]) -> IndexMap<String, usize> {
    group_count(tasks, |t| Some(t.category.as_str()), OTHER_CATEGORY)
}

pub fn project_status_distribution(projects: &[Project]) -> IndexMap<String, usize> {
    group_count(projects, |p| p.status.map(|s| s.as_str()), UNKNOWN_STATUS)
}

// ---------------------------------------------------------------------------
// Series
// ---------------------------------------------------------------------------

/// Bucket tasks by creation month and count each status per month.
///
/// Tasks without `created_at` are bucketed under `now`'s month.
pub fn monthly_series(tasks: &[Task], statuses: &[TaskStatus], now: DateTime<Utc>) -> MonthlySeries {
    let month_of = |t: &Task| t.created_at.unwrap_or(now).format("%Y-%m").to_string();

    let categories: Vec<String> = tasks
        .iter()
        .map(month_of)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let series = statuses
        .iter()
        .map(|status| {
            let mut data = vec![0; categories.len()];
            for task in tasks.iter().filter(|t| t.status == *status) {
                let month = month_of(task);
                if let Ok(idx) = categories.binary_search(&month) {
                    data[idx] += 1;
                }
            }
            Series {
                name: status.label().to_string(),
                data,
            }
        })
        .collect();

    MonthlySeries { categories, series }
}

pub fn summary(projects: &[Project], tasks: &[Task]) -> Summary {
    let completed = tasks
        .iter()
        .filter(|t| t.status == TaskStatus::Completed)
        .count();
    let pending = tasks
        .iter()
        .filter(|t| t.status == TaskStatus::Pending)
        .count();
    let completion_rate = if tasks.is_empty() {
        0
    } else {
        (completed as f64 * 100.0 / tasks.len() as f64).round() as u32
    };
    Summary {
        total_projects: projects.len(),
        total_tasks: tasks.len(),
        pending,
        completion_rate,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::project::ProjectStatus;
    use crate::model::task::Priority;
    use chrono::TimeZone;

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
    }

    fn task(id: u64, status: TaskStatus, category: &str, created: Option<DateTime<Utc>>) -> Task {
        let mut t = Task::new(id, format!("T{}", id), id as usize).with_status(status);
        t.category = category.to_string();
        t.created_at = created;
        t
    }

    #[test]
    fn test_group_count_keeps_first_seen_order() {
        let tasks = vec![
            task(1, TaskStatus::Completed, "Design", None),
            task(2, TaskStatus::Pending, "", None),
            task(3, TaskStatus::Completed, "Design", None),
            task(4, TaskStatus::InProgress, "Dev", None),
        ];
        let by_category = category_distribution(&tasks);
        let keys: Vec<&str> = by_category.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["Design", "Other", "Dev"]);
        assert_eq!(by_category["Design"], 2);
        assert_eq!(by_category["Other"], 1);

        let by_status = status_distribution(&tasks);
        assert_eq!(by_status["completed"], 2);
        assert_eq!(by_status["pending"], 1);
        assert_eq!(by_status["in-progress"], 1);
    }

    #[test]
    fn test_group_count_empty() {
        assert!(priority_distribution(&[]).is_empty());
    }

    #[test]
    fn test_priority_distribution() {
        let mut high = task(1, TaskStatus::Pending, "", None);
        high.priority = Priority::High;
        let tasks = vec![high, task(2, TaskStatus::Pending, "", None)];
        let counts = priority_distribution(&tasks);
        let pairs: Vec<(&str, usize)> = counts.iter().map(|(k, v)| (k.as_str(), *v)).collect();
        assert_eq!(pairs, vec![("high", 1), ("medium", 1)]);
    }

    #[test]
    fn test_project_status_fallback() {
        let mut active = Project::new(1, "Site");
        active.status = Some(ProjectStatus::Active);
        let mut unset = Project::new(2, "App");
        unset.status = None;
        let counts = project_status_distribution(&[active, unset]);
        assert_eq!(counts["active"], 1);
        assert_eq!(counts["unknown"], 1);
    }

    #[test]
    fn test_monthly_series_aligned_and_sorted() {
        let now = at(2025, 6, 10);
        let tasks = vec![
            task(1, TaskStatus::Completed, "", Some(at(2025, 5, 2))),
            task(2, TaskStatus::Pending, "", Some(at(2024, 12, 30))),
            task(3, TaskStatus::Completed, "", Some(at(2025, 5, 20))),
            task(4, TaskStatus::InProgress, "", None),
        ];
        let statuses = [
            TaskStatus::Completed,
            TaskStatus::InProgress,
            TaskStatus::Pending,
        ];
        let result = monthly_series(&tasks, &statuses, now);

        assert_eq!(result.categories, vec!["2024-12", "2025-05", "2025-06"]);
        let names: Vec<&str> = result.series.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Completed", "In Progress", "Pending"]);
        assert_eq!(result.series[0].data, vec![0, 2, 0]);
        assert_eq!(result.series[1].data, vec![0, 0, 1]);
        assert_eq!(result.series[2].data, vec![1, 0, 0]);
    }

    #[test]
    fn test_monthly_series_no_tasks() {
        let result = monthly_series(&[], &[TaskStatus::Pending], at(2025, 1, 1));
        assert!(result.categories.is_empty());
        assert_eq!(result.series.len(), 1);
        assert!(result.series[0].data.is_empty());
    }

    #[test]
    fn test_summary() {
        let tasks = vec![
            task(1, TaskStatus::Completed, "", None),
            task(2, TaskStatus::Pending, "", None),
            task(3, TaskStatus::InProgress, "", None),
        ];
        let s = summary(&[Project::new(1, "P")], &tasks);
        assert_eq!(
            s,
            Summary {
                total_projects: 1,
                total_tasks: 3,
                pending: 1,
                completion_rate: 33,
            }
        );
        assert_eq!(summary(&[], &[]).completion_rate, 0);
    }
}
