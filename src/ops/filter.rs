use std::cmp::Ordering;

use chrono::{DateTime, Local, NaiveDate};
use regex::{Regex, RegexBuilder};

use crate::model::project::{Project, ProjectStatus};
use crate::model::task::{Priority, Task, TaskStatus};

/// Which tasks a view shows before search is applied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Pending,
    InProgress,
    Completed,
    /// Due on the caller's current local date
    Today,
    /// Due after the caller's current local date
    Upcoming,
}

impl StatusFilter {
    pub fn parse(s: &str) -> Option<StatusFilter> {
        match s {
            "all" => Some(StatusFilter::All),
            "pending" => Some(StatusFilter::Pending),
            "in-progress" => Some(StatusFilter::InProgress),
            "completed" => Some(StatusFilter::Completed),
            "today" => Some(StatusFilter::Today),
            "upcoming" => Some(StatusFilter::Upcoming),
            _ => None,
        }
    }

    fn matches(self, task: &Task, today: NaiveDate) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Pending => task.status == TaskStatus::Pending,
            StatusFilter::InProgress => task.status == TaskStatus::InProgress,
            StatusFilter::Completed => task.status == TaskStatus::Completed,
            StatusFilter::Today => task.due_date == Some(today),
            StatusFilter::Upcoming => task.due_date.is_some_and(|d| d > today),
        }
    }
}

/// A case-insensitive literal search term
#[derive(Debug, Clone)]
pub struct SearchTerm {
    re: Option<Regex>,
}

impl SearchTerm {
    /// Only the empty term matches everything. Whitespace is searched for
    /// like any other character.
    pub fn new(term: &str) -> Self {
        if term.is_empty() {
            return SearchTerm { re: None };
        }
        let re = RegexBuilder::new(&regex::escape(term))
            .case_insensitive(true)
            .build()
            .ok();
        SearchTerm { re }
    }

    pub fn is_empty(&self) -> bool {
        self.re.is_none()
    }

    /// True if any of `fields` contains the term
    pub fn matches_any(&self, fields: &[&str]) -> bool {
        match &self.re {
            None => true,
            Some(re) => fields.iter().any(|f| re.is_match(f)),
        }
    }
}

// ---------------------------------------------------------------------------
// Task projection
// ---------------------------------------------------------------------------

/// The visible subset of `tasks` for a view, ordered by `position`.
///
/// The status filter is applied first, then the search term against title,
/// description and category. Date filters are evaluated against `now`.
pub fn project<'a>(
    tasks: &'a [Task],
    filter: StatusFilter,
    search: &str,
    now: DateTime<Local>,
) -> Vec<&'a Task> {
    let today = now.date_naive();
    let term = SearchTerm::new(search);

    let mut visible: Vec<&Task> = tasks
        .iter()
        .filter(|t| filter.matches(t, today))
        .filter(|t| {
            term.matches_any(&[t.title.as_str(), t.description.as_str(), t.category.as_str()])
        })
        .collect();
    visible.sort_by_key(|t| t.position);
    visible
}

// ---------------------------------------------------------------------------
// Project listing
// ---------------------------------------------------------------------------

/// Sort key for project listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProjectSort {
    #[default]
    Name,
    Progress,
    Budget,
    Spent,
    StartDate,
}

impl ProjectSort {
    pub fn parse(s: &str) -> Option<ProjectSort> {
        match s {
            "name" => Some(ProjectSort::Name),
            "progress" => Some(ProjectSort::Progress),
            "budget" => Some(ProjectSort::Budget),
            "spent" => Some(ProjectSort::Spent),
            "start" | "start-date" => Some(ProjectSort::StartDate),
            _ => None,
        }
    }
}

/// Filters and ordering for the project listing
#[derive(Debug, Clone, Default)]
pub struct ProjectQuery {
    pub search: String,
    pub status: Option<ProjectStatus>,
    pub priority: Option<Priority>,
    pub sort: ProjectSort,
    pub descending: bool,
}

/// Projects matching `query`, sorted as requested. Search covers name and description.
pub fn project_projects<'a>(projects: &'a [Project], query: &ProjectQuery) -> Vec<&'a Project> {
    let term = SearchTerm::new(&query.search);
    let mut result: Vec<&Project> = projects
        .iter()
        .filter(|p| term.matches_any(&[p.name.as_str(), p.description.as_str()]))
        .filter(|p| query.status.is_none_or(|s| p.status == Some(s)))
        .filter(|p| query.priority.is_none_or(|pr| p.priority == pr))
        .collect();

    result.sort_by(|a, b| {
        let ord = compare_projects(a, b, query.sort);
        if query.descending { ord.reverse() } else { ord }
    });
    result
}

fn compare_projects(a: &Project, b: &Project, sort: ProjectSort) -> Ordering {
    match sort {
        ProjectSort::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
        ProjectSort::Progress => a.progress.cmp(&b.progress),
        ProjectSort::Budget => a.budget.total_cmp(&b.budget),
        ProjectSort::Spent => a.spent.total_cmp(&b.spent),
        ProjectSort::StartDate => a.start_date.cmp(&b.start_date),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
