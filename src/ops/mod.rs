pub mod comment_ops;
pub mod filter;
pub mod stats;
pub mod task_ops;
pub mod validate;
pub mod views;

pub use filter::{ProjectQuery, ProjectSort, StatusFilter, project, project_projects};
pub use task_ops::{PositionUpdate, TaskError, reorder};
pub use validate::ValidationError;
