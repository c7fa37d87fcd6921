use chrono::{DateTime, NaiveDate, Utc};
use indexmap::IndexMap;
use serde::Serialize;

use crate::model::project::Project;
use crate::model::task::{Priority, Task, TaskId, TaskStatus};
use crate::ops::stats::{MonthlySeries, Summary};
use crate::ops::task_ops::PositionUpdate;
use crate::ops::views::CalendarEvent;
use crate::util::format::{format_file_size, time_ago};
use crate::util::unicode::{fit_to_width, truncate_to_width};

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskLineJson {
    pub index: usize,
    pub id: TaskId,
    pub title: String,
    pub status: TaskStatus,
    pub priority: Priority,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub category: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub project: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    pub position: usize,
    pub comments: usize,
    pub attachments: usize,
}

#[derive(Serialize)]
pub struct TimelineGroupJson {
    pub project: String,
    pub tasks: Vec<TaskLineJson>,
}

#[derive(Serialize)]
pub struct MoveJson {
    pub moved: TaskId,
    pub updates: Vec<PositionUpdate>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentAddedJson {
    pub task_id: TaskId,
    pub comment_id: String,
    pub total_comments: usize,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsJson {
    pub summary: Summary,
    pub status: IndexMap<String, usize>,
    pub priority: IndexMap<String, usize>,
    pub category: IndexMap<String, usize>,
    pub project_status: IndexMap<String, usize>,
    pub monthly: MonthlySeries,
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

pub fn task_line_json(index: usize, task: &Task) -> TaskLineJson {
    TaskLineJson {
        index,
        id: task.id,
        title: task.title.clone(),
        status: task.status,
        priority: task.priority,
        category: task.category.clone(),
        project: task.project.clone(),
        due_date: task.due_date,
        position: task.position,
        comments: task.comments.count(),
        attachments: task.attachments.len(),
    }
}

// ---------------------------------------------------------------------------
// Human-readable formatting
// ---------------------------------------------------------------------------

/// One listing row: index in the view, status marker, id, title, then extras
pub fn format_task_line(index: usize, task: &Task, title_width: usize) -> String {
    let mut extras = vec![task.priority.as_str().to_string()];
    if let Some(due) = task.due_date {
        extras.push(format!("due {}", due));
    }
    let comments = task.comments.count();
    if comments > 0 {
        extras.push(format!("{} comment{}", comments, plural(comments)));
    }
    format!(
        "{:>3}  [{}] #{:<4} {}  {}",
        index,
        task.status.marker(),
        task.id,
        fit_to_width(&task.title, title_width),
        extras.join("  ")
    )
    .trim_end()
    .to_string()
}

/// Full task view: fields, description, attachments and the comment thread
pub fn format_task_detail(task: &Task, now: DateTime<Utc>) -> Vec<String> {
    let mut lines = Vec::new();
    lines.push(format!("[{}] #{} {}", task.status.marker(), task.id, task.title));
    lines.push(format!("status: {}", task.status.label()));
    lines.push(format!("priority: {}", task.priority));
    if !task.category.is_empty() {
        lines.push(format!("category: {}", task.category));
    }
    if !task.project.is_empty() {
        lines.push(format!("project: {}", task.project));
    }
    if let Some(due) = task.due_date {
        lines.push(format!("due: {}", due));
    }
    lines.push(format!("estimate: {}h", task.estimated_hours));
    if let Some(created) = task.created_at {
        lines.push(format!("created: {}", time_ago(created, now)));
    }

    if !task.description.is_empty() {
        lines.push(String::new());
        for line in task.description.lines() {
            lines.push(format!("  {}", line));
        }
    }

    if !task.attachments.is_empty() {
        lines.push(String::new());
        lines.push("attachments:".to_string());
        for att in &task.attachments {
            lines.push(format!(
                "  {}  {} ({}, {})",
                att.id,
                att.name,
                format_file_size(att.size),
                att.mime_type
            ));
        }
    }

    let count = task.comments.count();
    if count > 0 {
        lines.push(String::new());
        lines.push(format!("comments ({}):", count));
        for (depth, comment) in task.comments.walk() {
            let indent = "  ".repeat(depth + 1);
            lines.push(format!(
                "{}{} · {} · {}",
                indent,
                short_id(&comment.id),
                comment.author,
                time_ago(comment.created_at, now)
            ));
            for line in comment.text.lines() {
                lines.push(format!("{}  {}", indent, line));
            }
        }
    }

    lines
}

pub fn format_calendar_event(event: &CalendarEvent, title_width: usize) -> String {
    format!(
        "{}  [{}] #{:<4} {}  {}",
        event.date,
        event.status.marker(),
        event.task_id,
        fit_to_width(&event.title, title_width),
        event.priority
    )
}

pub fn format_timeline(groups: &IndexMap<String, Vec<&Task>>, title_width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    for (i, (project, tasks)) in groups.iter().enumerate() {
        if i > 0 {
            lines.push(String::new());
        }
        lines.push(format!("== {} ==", project));
        for task in tasks {
            let due = task
                .due_date
                .map(|d| d.to_string())
                .unwrap_or_else(|| "no date".to_string());
            lines.push(format!(
                "  {:<10}  [{}] #{:<4} {}",
                due,
                task.status.marker(),
                task.id,
                truncate_to_width(&task.title, title_width)
            ));
        }
    }
    lines
}

pub fn format_stats(stats: &StatsJson) -> Vec<String> {
    let s = &stats.summary;
    let mut lines = vec![
        format!("projects: {}", s.total_projects),
        format!("tasks: {}", s.total_tasks),
        format!("pending: {}", s.pending),
        format!("completion: {}%", s.completion_rate),
    ];

    let sections = [
        ("by status", &stats.status),
        ("by priority", &stats.priority),
        ("by category", &stats.category),
        ("projects by status", &stats.project_status),
    ];
    for (title, counts) in sections {
        if counts.is_empty() {
            continue;
        }
        lines.push(String::new());
        lines.push(format!("{}:", title));
        let key_w = counts.keys().map(|k| k.len()).max().unwrap_or(0);
        for (key, count) in counts {
            lines.push(format!("  {:<key_w$}  {:>4}", key, count));
        }
    }

    if !stats.monthly.categories.is_empty() {
        lines.push(String::new());
        lines.push("by month:".to_string());
        let name_w = stats
            .monthly
            .series
            .iter()
            .map(|s| s.name.len())
            .max()
            .unwrap_or(0);
        let mut header = format!("  {:<name_w$}", "");
        for month in &stats.monthly.categories {
            header.push_str(&format!("  {:>7}", month));
        }
        lines.push(header);
        for series in &stats.monthly.series {
            let mut row = format!("  {:<name_w$}", series.name);
            for n in &series.data {
                row.push_str(&format!("  {:>7}", n));
            }
            lines.push(row);
        }
    }
    lines
}

pub fn format_project_line(project: &Project, name_width: usize) -> String {
    let status = project.status.map(|s| s.as_str()).unwrap_or("unknown");
    format!(
        "#{:<3} {}  {:<9}  {:<6}  {:>3}%  {:>10.2} / {:.2}",
        project.id,
        fit_to_width(&project.name, name_width),
        status,
        project.priority.as_str(),
        project.progress,
        project.spent,
        project.budget
    )
}

/// First 8 characters of a comment id, enough to refer to it on the command line
pub fn short_id(id: &str) -> &str {
    match id.char_indices().nth(8) {
        Some((idx, _)) => &id[..idx],
        None => id,
    }
}

fn plural(n: usize) -> &'static str {
    if n == 1 { "" } else { "s" }
}

/// Parse a status string into TaskStatus
pub fn parse_task_status(s: &str) -> Result<TaskStatus, String> {
    TaskStatus::parse(s).ok_or_else(|| {
        format!(
            "unknown status '{}' (expected: pending, in-progress, completed)",
            s
        )
    })
}

pub fn parse_priority(s: &str) -> Result<Priority, String> {
    Priority::parse(s)
        .ok_or_else(|| format!("unknown priority '{}' (expected: low, medium, high)", s))
}
