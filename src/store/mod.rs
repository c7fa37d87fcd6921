//! The boundary to wherever tasks and projects are persisted.
//!
//! The board only ever talks to a [`TaskStore`]. [`MemoryStore`] keeps
//! everything in memory and can be told to fail; the file-backed store lives
//! in `io::store_io`.

pub mod memory;

use std::path::PathBuf;

use crate::io::lock::LockError;
use crate::model::project::{NewProject, Project, ProjectId, ProjectPatch};
use crate::model::task::{NewTask, Task, TaskId, TaskPatch};

pub use memory::MemoryStore;

/// Error type for store operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("task not found in store: {0}")]
    NotFound(TaskId),
    #[error("project not found in store: {0}")]
    ProjectNotFound(ProjectId),
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("not a task board: no .taskboard/ directory found")]
    NotABoard,
    #[error("could not access {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("could not serialize store data: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error(transparent)]
    Lock(#[from] LockError),
}

/// Fetch and persist tasks and projects.
///
/// Every call is a full round trip; implementations keep no state the board
/// relies on between calls.
pub trait TaskStore {
    /// Every task the store holds, in no particular order
    fn load_tasks(&mut self) -> Result<Vec<Task>, StoreError>;

    fn load_projects(&mut self) -> Result<Vec<Project>, StoreError>;

    /// Create a task; the store assigns the id
    fn create_task(&mut self, fields: NewTask) -> Result<Task, StoreError>;

    /// Apply a partial update to one task
    fn persist_task_mutation(&mut self, id: TaskId, patch: &TaskPatch) -> Result<(), StoreError>;

    fn delete_task(&mut self, id: TaskId) -> Result<(), StoreError>;

    /// Create a project; the store assigns the id
    fn create_project(&mut self, fields: NewProject) -> Result<Project, StoreError>;

    fn persist_project_mutation(
        &mut self,
        id: ProjectId,
        patch: &ProjectPatch,
    ) -> Result<(), StoreError>;

    fn delete_project(&mut self, id: ProjectId) -> Result<(), StoreError>;
}
