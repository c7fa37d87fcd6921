use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use tempfile::NamedTempFile;

use crate::io::lock::FileLock;
use crate::model::project::{NewProject, Project, ProjectId, ProjectPatch};
use crate::model::task::{NewTask, Task, TaskId, TaskPatch};
use crate::store::{StoreError, TaskStore};

/// Directory holding a board's files, relative to the board root
pub const BOARD_DIR: &str = ".taskboard";
pub const CONFIG_FILE: &str = "config.toml";
pub const TASKS_FILE: &str = "tasks.json";
pub const PROJECTS_FILE: &str = "projects.json";

/// Find the board root by walking up from `start`, looking for
/// `.taskboard/config.toml`.
pub fn discover_board(start: &Path) -> Result<PathBuf, StoreError> {
    let mut current = start.to_path_buf();
    loop {
        if current.join(BOARD_DIR).join(CONFIG_FILE).is_file() {
            return Ok(current);
        }
        if !current.pop() {
            return Err(StoreError::NotABoard);
        }
    }
}

/// Write `content` to `path` via a temp file in the same directory, so
/// readers see either the old or the new file, never a partial one.
pub fn atomic_write(path: &Path, content: &[u8]) -> io::Result<()> {
    let dir = path.parent().unwrap_or(Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// A [`TaskStore`] backed by JSON files under `.taskboard/`.
///
/// Each mutation reads the file, applies the change and writes it back
/// atomically while holding the board lock.
#[derive(Debug, Clone)]
pub struct JsonStore {
    dir: PathBuf,
}

impl JsonStore {
    /// Open the store of the board rooted at `root`
    pub fn open(root: &Path) -> Result<Self, StoreError> {
        let dir = root.join(BOARD_DIR);
        if !dir.is_dir() {
            return Err(StoreError::NotABoard);
        }
        Ok(JsonStore { dir })
    }

    /// The `.taskboard/` directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn read_list<T: DeserializeOwned>(&self, file: &str) -> Result<Vec<T>, StoreError> {
        let path = self.dir.join(file);
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => return Err(StoreError::Io { path, source }),
        };
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str(&text).map_err(|source| StoreError::Parse { path, source })
    }

    fn write_list<T: Serialize>(&self, file: &str, items: &[T]) -> Result<(), StoreError> {
        let path = self.dir.join(file);
        let mut content = serde_json::to_string_pretty(items)?;
        content.push('\n');
        atomic_write(&path, content.as_bytes()).map_err(|source| StoreError::Io { path, source })
    }

    /// Read-modify-write of one store file under the board lock
    fn update_list<T, R>(
        &self,
        file: &str,
        f: impl FnOnce(&mut Vec<T>) -> Result<R, StoreError>,
    ) -> Result<R, StoreError>
    where
        T: Serialize + DeserializeOwned,
    {
        let _lock = FileLock::acquire_default(&self.dir)?;
        let mut items = self.read_list::<T>(file)?;
        let result = f(&mut items)?;
        self.write_list(file, &items)?;
        Ok(result)
    }

    fn update_tasks<R>(
        &self,
        f: impl FnOnce(&mut Vec<Task>) -> Result<R, StoreError>,
    ) -> Result<R, StoreError> {
        self.update_list(TASKS_FILE, f)
    }

    fn update_projects<R>(
        &self,
        f: impl FnOnce(&mut Vec<Project>) -> Result<R, StoreError>,
    ) -> Result<R, StoreError> {
        self.update_list(PROJECTS_FILE, f)
    }
}

impl TaskStore for JsonStore {
    fn load_tasks(&mut self) -> Result<Vec<Task>, StoreError> {
        self.read_list(TASKS_FILE)
    }

    fn load_projects(&mut self) -> Result<Vec<Project>, StoreError> {
        self.read_list(PROJECTS_FILE)
    }

    fn create_task(&mut self, fields: NewTask) -> Result<Task, StoreError> {
        let task = self.update_tasks(|tasks| {
            let id = tasks.iter().map(|t| t.id).max().unwrap_or(0) + 1;
            let task = fields.into_task(id);
            tasks.push(task.clone());
            Ok(task)
        })?;
        tracing::info!(id = task.id, "created task");
        Ok(task)
    }

    fn persist_task_mutation(&mut self, id: TaskId, patch: &TaskPatch) -> Result<(), StoreError> {
        self.update_tasks(|tasks| {
            let task = tasks
                .iter_mut()
                .find(|t| t.id == id)
                .ok_or(StoreError::NotFound(id))?;
            patch.apply_to(task);
            Ok(())
        })?;
        tracing::info!(id, "updated task");
        Ok(())
    }

    fn delete_task(&mut self, id: TaskId) -> Result<(), StoreError> {
        self.update_tasks(|tasks| {
            let idx = tasks
                .iter()
                .position(|t| t.id == id)
                .ok_or(StoreError::NotFound(id))?;
            tasks.remove(idx);
            Ok(())
        })?;
        tracing::info!(id, "deleted task");
        Ok(())
    }

    fn create_project(&mut self, fields: NewProject) -> Result<Project, StoreError> {
        let project = self.update_projects(|projects| {
            let id = projects.iter().map(|p| p.id).max().unwrap_or(0) + 1;
            let project = fields.into_project(id);
            projects.push(project.clone());
            Ok(project)
        })?;
        tracing::info!(id = project.id, "created project");
        Ok(project)
    }

    fn persist_project_mutation(
        &mut self,
        id: ProjectId,
        patch: &ProjectPatch,
    ) -> Result<(), StoreError> {
        self.update_projects(|projects| {
            let project = projects
                .iter_mut()
                .find(|p| p.id == id)
                .ok_or(StoreError::ProjectNotFound(id))?;
            patch.apply_to(project);
            Ok(())
        })?;
        tracing::info!(id, "updated project");
        Ok(())
    }

    fn delete_project(&mut self, id: ProjectId) -> Result<(), StoreError> {
        self.update_projects(|projects| {
            let idx = projects
                .iter()
                .position(|p| p.id == id)
                .ok_or(StoreError::ProjectNotFound(id))?;
            projects.remove(idx);
            Ok(())
        })?;
        tracing::info!(id, "deleted project");
        Ok(())
    }
}
