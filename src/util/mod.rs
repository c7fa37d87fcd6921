pub mod format;
pub mod unicode;
