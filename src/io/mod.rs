pub mod config_io;
pub mod lock;
pub mod store_io;

pub use store_io::{JsonStore, discover_board};
