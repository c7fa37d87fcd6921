pub mod collection;
pub mod comment;
pub mod config;
pub mod project;
pub mod task;

pub use collection::*;
pub use comment::*;
pub use config::*;
pub use project::*;
pub use task::*;
