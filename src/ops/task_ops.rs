use std::collections::HashSet;

use serde::Serialize;

use crate::model::collection::TaskCollection;
use crate::model::task::TaskId;

/// Error type for task collection operations
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TaskError {
    #[error("task not found: {0}")]
    NotFound(TaskId),
    #[error("invalid position: {0}")]
    InvalidPosition(String),
    #[error("malformed input: {0}")]
    MalformedInput(String),
}

/// A position change that has to be sent to the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionUpdate {
    pub task_id: TaskId,
    pub position: usize,
}

// ---------------------------------------------------------------------------
// Reorder
// ---------------------------------------------------------------------------

/// Move the task at `from` to `to` within the visible order and renumber the
/// whole collection.
///
/// `visible` is the displayed (filtered, sorted) id sequence. Slots in the
/// full ordering that hold visible tasks are refilled with the new visible
/// order; tasks outside the view keep their slots. Afterwards positions are
/// `0..n-1`. Returns the changes that must be persisted; the collection is
/// already updated when this returns.
pub fn reorder(
    collection: &mut TaskCollection,
    visible: &[TaskId],
    moved: TaskId,
    from: usize,
    to: usize,
) -> Result<Vec<PositionUpdate>, TaskError> {
    check_index("from", from, visible.len())?;
    check_index("to", to, visible.len())?;
    if visible[from] != moved {
        return Err(TaskError::MalformedInput(format!(
            "task {} is not at visible index {}",
            moved, from
        )));
    }

    let mut visible_set = HashSet::with_capacity(visible.len());
    for id in visible {
        if !visible_set.insert(*id) {
            return Err(TaskError::MalformedInput(format!(
                "task {} appears twice in the visible order",
                id
            )));
        }
        if collection.get(*id).is_none() {
            return Err(TaskError::NotFound(*id));
        }
    }

    if from == to {
        return Ok(Vec::new());
    }

    let mut new_visible = visible.to_vec();
    let item = new_visible.remove(from);
    new_visible.insert(to, item);

    let mut refill = new_visible.into_iter();
    let new_order: Vec<TaskId> = collection
        .ids()
        .into_iter()
        .map(|id| {
            if visible_set.contains(&id) {
                refill.next().unwrap_or(id)
            } else {
                id
            }
        })
        .collect();

    let updates = assign_positions(collection, &new_order);
    Ok(updates)
}

/// Renumber positions densely, keeping the current order.
/// Returns the tasks whose position changed.
pub fn normalize_positions(collection: &mut TaskCollection) -> Vec<PositionUpdate> {
    collection.sort();
    let order = collection.ids();
    assign_positions(collection, &order)
}

/// Check that positions are exactly `0..n-1` in collection order
pub fn positions_are_dense(collection: &TaskCollection) -> bool {
    collection
        .tasks()
        .iter()
        .enumerate()
        .all(|(i, t)| t.position == i)
}

/// Next free position at the end of the collection
pub fn next_position(collection: &TaskCollection) -> usize {
    collection
        .tasks()
        .iter()
        .map(|t| t.position + 1)
        .max()
        .unwrap_or(0)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn check_index(name: &str, index: usize, len: usize) -> Result<(), TaskError> {
    if index >= len {
        return Err(TaskError::InvalidPosition(format!(
            "{} index {} is outside the visible range 0..{}",
            name, index, len
        )));
    }
    Ok(())
}

fn assign_positions(collection: &mut TaskCollection, order: &[TaskId]) -> Vec<PositionUpdate> {
    let mut updates = Vec::new();
    for (position, id) in order.iter().enumerate() {
        if let Some(task) = collection.tasks_mut().iter_mut().find(|t| t.id == *id)
            && task.position != position
        {
            task.position = position;
            updates.push(PositionUpdate {
                task_id: *id,
                position,
            });
        }
    }
    collection.sort();
    updates
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
