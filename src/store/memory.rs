use std::collections::HashSet;

use crate::model::project::{NewProject, Project, ProjectId, ProjectPatch};
use crate::model::task::{NewTask, Task, TaskId, TaskPatch};

use super::{StoreError, TaskStore};

/// A store that lives in memory, with switches for simulating failures
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tasks: Vec<Task>,
    projects: Vec<Project>,
    /// Mutations of these tasks are rejected
    failing: HashSet<TaskId>,
    /// Mutations of these projects are rejected
    failing_projects: HashSet<ProjectId>,
    /// Every call is rejected
    unavailable: bool,
    /// Number of mutation calls received, successful or not
    mutation_calls: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }

    pub fn with_tasks(tasks: Vec<Task>) -> Self {
        MemoryStore {
            tasks,
            ..Default::default()
        }
    }

    pub fn with_projects(mut self, projects: Vec<Project>) -> Self {
        self.projects = projects;
        self
    }

    /// Reject every later mutation of task `id`
    pub fn fail_task(&mut self, id: TaskId) {
        self.failing.insert(id);
    }

    /// Stop rejecting mutations of task `id`
    pub fn heal_task(&mut self, id: TaskId) {
        self.failing.remove(&id);
    }

    /// Reject every later mutation of project `id`
    pub fn fail_project(&mut self, id: ProjectId) {
        self.failing_projects.insert(id);
    }

    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    pub fn set_unavailable(&mut self, unavailable: bool) {
        self.unavailable = unavailable;
    }

    /// What the store currently holds
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn task(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn mutation_calls(&self) -> usize {
        self.mutation_calls
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.unavailable {
            return Err(StoreError::Unavailable("memory store is offline".into()));
        }
        Ok(())
    }

    fn check_writable(&mut self, id: TaskId) -> Result<(), StoreError> {
        self.mutation_calls += 1;
        self.check_available()?;
        if self.failing.contains(&id) {
            return Err(StoreError::Unavailable(format!(
                "write rejected for task {}",
                id
            )));
        }
        Ok(())
    }

    fn check_project_writable(&mut self, id: ProjectId) -> Result<(), StoreError> {
        self.mutation_calls += 1;
        self.check_available()?;
        if self.failing_projects.contains(&id) {
            return Err(StoreError::Unavailable(format!(
                "write rejected for project {}",
                id
            )));
        }
        Ok(())
    }
}

impl TaskStore for MemoryStore {
    fn load_tasks(&mut self) -> Result<Vec<Task>, StoreError> {
        self.check_available()?;
        Ok(self.tasks.clone())
    }

    fn load_projects(&mut self) -> Result<Vec<Project>, StoreError> {
        self.check_available()?;
        Ok(self.projects.clone())
    }

    fn create_task(&mut self, fields: NewTask) -> Result<Task, StoreError> {
        self.mutation_calls += 1;
        self.check_available()?;
        let id = self.tasks.iter().map(|t| t.id).max().unwrap_or(0) + 1;
        let task = fields.into_task(id);
        self.tasks.push(task.clone());
        Ok(task)
    }

    fn persist_task_mutation(&mut self, id: TaskId, patch: &TaskPatch) -> Result<(), StoreError> {
        self.check_writable(id)?;
        let task = self
            .tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or(StoreError::NotFound(id))?;
        patch.apply_to(task);
        Ok(())
    }

    fn delete_task(&mut self, id: TaskId) -> Result<(), StoreError> {
        self.check_writable(id)?;
        let idx = self
            .tasks
            .iter()
            .position(|t| t.id == id)
            .ok_or(StoreError::NotFound(id))?;
        self.tasks.remove(idx);
        Ok(())
    }

    fn create_project(&mut self, fields: NewProject) -> Result<Project, StoreError> {
        self.mutation_calls += 1;
        self.check_available()?;
        let id = self.projects.iter().map(|p| p.id).max().unwrap_or(0) + 1;
        let project = fields.into_project(id);
        self.projects.push(project.clone());
        Ok(project)
    }

    fn persist_project_mutation(
        &mut self,
        id: ProjectId,
        patch: &ProjectPatch,
    ) -> Result<(), StoreError> {
        self.check_project_writable(id)?;
        let project = self
            .projects
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(StoreError::ProjectNotFound(id))?;
        patch.apply_to(project);
        Ok(())
    }

    fn delete_project(&mut self, id: ProjectId) -> Result<(), StoreError> {
        self.check_project_writable(id)?;
        let idx = self
            .projects
            .iter()
            .position(|p| p.id == id)
            .ok_or(StoreError::ProjectNotFound(id))?;
        self.projects.remove(idx);
        Ok(())
    }
}
