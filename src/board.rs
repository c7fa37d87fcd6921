//! A board session: the cached task collection plus the store it mirrors.
//!
//! Every mutation of an existing task is applied to the cache first and then
//! persisted. If the store rejects it, the cache is put back exactly as it
//! was and the error is returned. Creating a task waits for the store, since
//! the store assigns the id, and then refreshes the cache.
//!
//! The board also remembers the positions the store holds. Whenever the
//! cache is renumbered (on load, after a delete or a move) every task whose
//! stored position differs is written back, so the store stays dense too.

use std::collections::HashMap;

use chrono::{DateTime, Local, Utc};

use crate::model::collection::TaskCollection;
use crate::model::comment::{CommentError, CommentId, Identity};
use crate::model::config::AttachmentConfig;
use crate::model::project::{NewProject, Project, ProjectId, ProjectPatch};
use crate::model::task::{Attachment, NewTask, Task, TaskId, TaskPatch, TaskStatus};
use crate::ops::comment_ops;
use crate::ops::filter::{self, StatusFilter};
use crate::ops::task_ops::{self, PositionUpdate, TaskError};
use crate::ops::validate::{self, ValidationError};
use crate::store::{StoreError, TaskStore};

/// Error type for board operations
#[derive(Debug, thiserror::Error)]
pub enum BoardError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("task not found: {0}")]
    NotFound(TaskId),
    #[error("project not found: {0}")]
    ProjectNotFound(ProjectId),
    #[error("comment not found: {0}")]
    CommentNotFound(String),
    #[error("attachment not found: {0}")]
    AttachmentNotFound(String),
    #[error("could not save change: {0}")]
    Store(#[from] StoreError),
    #[error("{} position update(s) could not be saved; order restored", .failed.len())]
    PersistenceFailure { failed: Vec<TaskId> },
    #[error("malformed input: {0}")]
    MalformedInput(String),
}

impl From<TaskError> for BoardError {
    fn from(e: TaskError) -> Self {
        match e {
            TaskError::NotFound(id) => BoardError::NotFound(id),
            TaskError::InvalidPosition(msg) | TaskError::MalformedInput(msg) => {
                BoardError::MalformedInput(msg)
            }
        }
    }
}

impl From<CommentError> for BoardError {
    fn from(e: CommentError) -> Self {
        match e {
            CommentError::NotFound(id) => BoardError::CommentNotFound(id),
            other => BoardError::MalformedInput(other.to_string()),
        }
    }
}

/// A load that failed and was replaced by an empty list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadWarning {
    /// `"tasks"` or `"projects"`
    pub what: &'static str,
    pub message: String,
}

impl std::fmt::Display for LoadWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} unavailable: {}", self.what, self.message)
    }
}

pub struct Board<S: TaskStore> {
    store: S,
    tasks: TaskCollection,
    projects: Vec<Project>,
    identity: Identity,
    attachment_limits: AttachmentConfig,
    warnings: Vec<LoadWarning>,
    /// Task positions as last read from or written to the store
    stored: HashMap<TaskId, usize>,
}

impl<S: TaskStore> Board<S> {
    /// Load everything from `store`. Load failures leave empty lists and are
    /// reported through [`Board::warnings`].
    pub fn open(store: S, identity: Identity) -> Self {
        let mut board = Board {
            store,
            tasks: TaskCollection::default(),
            projects: Vec::new(),
            identity,
            attachment_limits: AttachmentConfig::default(),
            warnings: Vec::new(),
            stored: HashMap::new(),
        };
        board.reload();
        board
    }

    pub fn with_attachment_limits(mut self, limits: AttachmentConfig) -> Self {
        self.attachment_limits = limits;
        self
    }

    /// Replace the cache with a full load from the store
    pub fn reload(&mut self) -> &[LoadWarning] {
        self.warnings.clear();

        let tasks = match self.store.load_tasks() {
            Ok(tasks) => tasks,
            Err(e) => {
                tracing::warn!(error = %e, "could not load tasks");
                self.warnings.push(LoadWarning {
                    what: "tasks",
                    message: e.to_string(),
                });
                Vec::new()
            }
        };
        self.projects = match self.store.load_projects() {
            Ok(projects) => projects,
            Err(e) => {
                tracing::warn!(error = %e, "could not load projects");
                self.warnings.push(LoadWarning {
                    what: "projects",
                    message: e.to_string(),
                });
                Vec::new()
            }
        };

        let renumbered = self.replace_tasks(tasks);
        tracing::debug!(
            tasks = self.tasks.len(),
            projects = self.projects.len(),
            renumbered,
            "reloaded board"
        );
        &self.warnings
    }

    /// Warnings from the most recent load
    pub fn warnings(&self) -> &[LoadWarning] {
        &self.warnings
    }

    pub fn tasks(&self) -> &[Task] {
        self.tasks.tasks()
    }

    pub fn task(&self, id: TaskId) -> Option<&Task> {
        self.tasks.get(id)
    }

    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    pub fn project(&self, id: ProjectId) -> Option<&Project> {
        self.projects.iter().find(|p| p.id == id)
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// The tasks a view shows, in display order
    pub fn visible(&self, status: StatusFilter, search: &str, now: DateTime<Local>) -> Vec<&Task> {
        filter::project(self.tasks.tasks(), status, search, now)
    }

    // -----------------------------------------------------------------------
    // Task lifecycle
    // -----------------------------------------------------------------------

    /// Create a task at the end of the board and return its store-assigned id
    pub fn create_task(&mut self, mut fields: NewTask) -> Result<TaskId, BoardError> {
        fields.title = validate::task_title(&fields.title)?;
        self.sync_positions();
        // Past anything the store still holds, in case a sync write failed
        let stored_end = self.stored.values().map(|p| p + 1).max().unwrap_or(0);
        fields.position = task_ops::next_position(&self.tasks).max(stored_end);
        if fields.created_at.is_none() {
            fields.created_at = Some(Utc::now());
        }

        let task = self.store.create_task(fields).inspect_err(|e| {
            tracing::warn!(error = %e, "could not create task");
        })?;
        let id = task.id;
        self.refresh(task);
        Ok(id)
    }

    /// Apply `patch` to a task
    pub fn update_task(&mut self, id: TaskId, mut patch: TaskPatch) -> Result<(), BoardError> {
        if let Some(title) = patch.title.take() {
            patch.title = Some(validate::task_title(&title)?);
        }
        if patch.is_empty() {
            return if self.tasks.get(id).is_some() {
                Ok(())
            } else {
                Err(BoardError::NotFound(id))
            };
        }
        self.commit(id, |task| {
            patch.apply_to(task);
            Ok((patch, ()))
        })
    }

    pub fn set_status(&mut self, id: TaskId, status: TaskStatus) -> Result<(), BoardError> {
        self.update_task(id, TaskPatch::status(status))
    }

    pub fn delete_task(&mut self, id: TaskId) -> Result<Task, BoardError> {
        let removed = self.tasks.remove(id).ok_or(BoardError::NotFound(id))?;
        if let Err(e) = self.store.delete_task(id) {
            tracing::warn!(id, error = %e, "could not delete task; restoring it");
            self.tasks.insert(removed);
            return Err(e.into());
        }
        self.stored.remove(&id);
        task_ops::normalize_positions(&mut self.tasks);
        self.sync_positions();
        Ok(removed)
    }

    // -----------------------------------------------------------------------
    // Projects
    // -----------------------------------------------------------------------

    /// Validate and create a project. Like tasks, the store assigns the id.
    pub fn create_project(&mut self, mut fields: NewProject) -> Result<ProjectId, BoardError> {
        fields.name = fields.name.trim().to_string();
        fields.description = fields.description.trim().to_string();
        validate::project(&fields.clone().into_project(0))?;

        let project = self.store.create_project(fields).inspect_err(|e| {
            tracing::warn!(error = %e, "could not create project");
        })?;
        let id = project.id;
        match self.store.load_projects() {
            Ok(projects) => self.projects = projects,
            Err(e) => {
                tracing::warn!(error = %e, "could not reload projects after write");
                self.projects.push(project);
            }
        }
        Ok(id)
    }

    /// Apply `patch` to a project. The result must still validate.
    pub fn update_project(&mut self, id: ProjectId, mut patch: ProjectPatch) -> Result<(), BoardError> {
        let idx = self
            .projects
            .iter()
            .position(|p| p.id == id)
            .ok_or(BoardError::ProjectNotFound(id))?;
        if patch.is_empty() {
            return Ok(());
        }
        if let Some(name) = patch.name.take() {
            patch.name = Some(name.trim().to_string());
        }
        if let Some(description) = patch.description.take() {
            patch.description = Some(description.trim().to_string());
        }

        let mut edited = self.projects[idx].clone();
        patch.apply_to(&mut edited);
        validate::project(&edited)?;

        let snapshot = std::mem::replace(&mut self.projects[idx], edited);
        if let Err(e) = self.store.persist_project_mutation(id, &patch) {
            tracing::warn!(id, error = %e, "could not save project; reverting");
            self.projects[idx] = snapshot;
            return Err(e.into());
        }
        Ok(())
    }

    pub fn delete_project(&mut self, id: ProjectId) -> Result<Project, BoardError> {
        let idx = self
            .projects
            .iter()
            .position(|p| p.id == id)
            .ok_or(BoardError::ProjectNotFound(id))?;
        let removed = self.projects.remove(idx);
        if let Err(e) = self.store.delete_project(id) {
            tracing::warn!(id, error = %e, "could not delete project; restoring it");
            self.projects.insert(idx, removed);
            return Err(e.into());
        }
        Ok(removed)
    }

    // -----------------------------------------------------------------------
    // Ordering
    // -----------------------------------------------------------------------

    /// Move the task at visible index `from` to `to`.
    ///
    /// Every task whose new position differs from the stored one is written
    /// independently. If any write fails, the ones that succeeded are put
    /// back to their old positions, the cache is restored and the failed ids
    /// are returned.
    pub fn reorder(
        &mut self,
        visible: &[TaskId],
        moved: TaskId,
        from: usize,
        to: usize,
    ) -> Result<Vec<PositionUpdate>, BoardError> {
        let snapshot = self.tasks.clone();
        let updates = task_ops::reorder(&mut self.tasks, visible, moved, from, to)?;
        if updates.is_empty() {
            return Ok(updates);
        }

        let stored_before = self.stored.clone();
        let failed = self.sync_positions();
        if failed.is_empty() {
            return Ok(updates);
        }

        for (&id, &old) in &stored_before {
            if self.stored.get(&id) == Some(&old) {
                continue;
            }
            match self
                .store
                .persist_task_mutation(id, &TaskPatch::position(old))
            {
                Ok(()) => {
                    self.stored.insert(id, old);
                }
                Err(e) => tracing::warn!(id, error = %e, "could not restore task position"),
            }
        }
        self.tasks = snapshot;
        Err(BoardError::PersistenceFailure { failed })
    }

    // -----------------------------------------------------------------------
    // Comments
    // -----------------------------------------------------------------------

    /// Add a comment by the board's identity, as a reply to `parent` or as a
    /// new top-level comment. Returns the new comment's id.
    pub fn add_comment(
        &mut self,
        task_id: TaskId,
        text: &str,
        parent: Option<&str>,
    ) -> Result<CommentId, BoardError> {
        let comment = comment_ops::new_comment(text, &self.identity, parent, Utc::now())?;
        let comment_id = comment.id.clone();
        self.commit(task_id, |task| {
            task.comments.insert_reply(parent, comment)?;
            Ok((
                TaskPatch {
                    comments: Some(task.comments.clone()),
                    ..Default::default()
                },
                (),
            ))
        })?;
        Ok(comment_id)
    }

    /// Delete a comment and all of its replies. Returns how many were removed.
    pub fn delete_comment(&mut self, task_id: TaskId, comment_id: &str) -> Result<usize, BoardError> {
        self.commit(task_id, |task| {
            let removed = task.comments.delete(comment_id)?;
            Ok((
                TaskPatch {
                    comments: Some(task.comments.clone()),
                    ..Default::default()
                },
                removed,
            ))
        })
    }

    /// Total comments on a task, replies at every depth included
    pub fn comment_count(&self, task_id: TaskId) -> Result<usize, BoardError> {
        self.tasks
            .get(task_id)
            .map(|t| t.comments.count())
            .ok_or(BoardError::NotFound(task_id))
    }

    // -----------------------------------------------------------------------
    // Attachments
    // -----------------------------------------------------------------------

    pub fn attach(&mut self, task_id: TaskId, attachment: Attachment) -> Result<(), BoardError> {
        validate::attachment(&attachment, &self.attachment_limits)?;
        self.commit(task_id, |task| {
            task.attachments.push(attachment);
            Ok((
                TaskPatch {
                    attachments: Some(task.attachments.clone()),
                    ..Default::default()
                },
                (),
            ))
        })
    }

    pub fn detach(&mut self, task_id: TaskId, attachment_id: &str) -> Result<Attachment, BoardError> {
        self.commit(task_id, |task| {
            let idx = task
                .attachments
                .iter()
                .position(|a| a.id == attachment_id)
                .ok_or_else(|| BoardError::AttachmentNotFound(attachment_id.to_string()))?;
            let removed = task.attachments.remove(idx);
            Ok((
                TaskPatch {
                    attachments: Some(task.attachments.clone()),
                    ..Default::default()
                },
                removed,
            ))
        })
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    /// Edit one cached task, then persist the patch the edit produced.
    ///
    /// `edit` must leave the task untouched when it returns an error. On a
    /// store failure the task is restored from a snapshot.
    fn commit<R>(
        &mut self,
        id: TaskId,
        edit: impl FnOnce(&mut Task) -> Result<(TaskPatch, R), BoardError>,
    ) -> Result<R, BoardError> {
        let task = self.tasks.get_mut(id).ok_or(BoardError::NotFound(id))?;
        let snapshot = task.clone();
        let (mut patch, result) = edit(task)?;
        let now = Utc::now();
        task.updated_at = Some(now);
        patch.updated_at = Some(now);
        let reposition = patch.position.is_some();
        if reposition {
            self.tasks.sort();
        }

        if let Err(e) = self.store.persist_task_mutation(id, &patch) {
            tracing::warn!(id, error = %e, "could not save task; reverting");
            if let Some(task) = self.tasks.get_mut(id) {
                *task = snapshot;
            }
            if reposition {
                self.tasks.sort();
            }
            return Err(e.into());
        }
        if let Some(position) = patch.position {
            self.stored.insert(id, position);
        }
        Ok(result)
    }

    /// Reload after a confirmed write. Unlike [`Board::reload`], a failed load
    /// keeps the current cache (plus `created`) instead of emptying it.
    fn refresh(&mut self, created: Task) {
        match self.store.load_tasks() {
            Ok(tasks) => {
                self.replace_tasks(tasks);
            }
            Err(e) => {
                tracing::warn!(error = %e, "could not reload tasks after write");
                if self.tasks.get(created.id).is_none() {
                    self.stored.insert(created.id, created.position);
                    self.tasks.insert(created);
                }
            }
        }
    }

    /// Install freshly loaded tasks, renumber them densely and write the new
    /// positions back. Returns how many tasks were renumbered.
    fn replace_tasks(&mut self, tasks: Vec<Task>) -> usize {
        self.stored = tasks.iter().map(|t| (t.id, t.position)).collect();
        self.tasks = TaskCollection::from_tasks(tasks);
        let renumbered = task_ops::normalize_positions(&mut self.tasks).len();
        self.sync_positions();
        renumbered
    }

    /// Persist every cached position that differs from the stored one.
    /// Returns the ids whose write failed; their stored position is unchanged.
    fn sync_positions(&mut self) -> Vec<TaskId> {
        let mut failed = Vec::new();
        for task in self.tasks.tasks() {
            if self.stored.get(&task.id) == Some(&task.position) {
                continue;
            }
            match self
                .store
                .persist_task_mutation(task.id, &TaskPatch::position(task.position))
            {
                Ok(()) => {
                    self.stored.insert(task.id, task.position);
                }
                Err(e) => {
                    tracing::warn!(id = task.id, error = %e, "could not save task position");
                    failed.push(task.id);
                }
            }
        }
        failed
    }
}
