use super::task::{Task, TaskId};

/// The in-memory task cache, kept ordered by `position` (ties broken by id).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskCollection {
    tasks: Vec<Task>,
}

impl TaskCollection {
    pub fn from_tasks(tasks: Vec<Task>) -> Self {
        let mut collection = TaskCollection { tasks };
        collection.sort();
        collection
    }

    /// All tasks in position order
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn get_mut(&mut self, id: TaskId) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|t| t.id == id)
    }

    /// Task ids in position order
    pub fn ids(&self) -> Vec<TaskId> {
        self.tasks.iter().map(|t| t.id).collect()
    }

    /// Current `position` values in collection order
    pub fn positions(&self) -> Vec<usize> {
        self.tasks.iter().map(|t| t.position).collect()
    }

    /// Insert a task and restore position order
    pub fn insert(&mut self, task: Task) {
        self.tasks.push(task);
        self.sort();
    }

    /// Remove a task, returning it. Positions of the rest are left as-is.
    pub fn remove(&mut self, id: TaskId) -> Option<Task> {
        let idx = self.tasks.iter().position(|t| t.id == id)?;
        Some(self.tasks.remove(idx))
    }

    /// Restore position order after positions were rewritten in place
    pub fn sort(&mut self) {
        self.tasks.sort_by_key(|t| (t.position, t.id));
    }

    pub(crate) fn tasks_mut(&mut self) -> &mut [Task] {
        &mut self.tasks
    }
}
