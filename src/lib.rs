//! taskboard - ordered tasks, threaded comments and board analytics
//!
//! The library behind the `tb` CLI. Tasks live in a store behind the
//! [`store::TaskStore`] trait; a [`board::Board`] caches them, keeps their
//! display order dense and applies edits optimistically, restoring its cache
//! when the store rejects a change.
//!
//! # Module Organization
//!
//! - `model`: tasks, projects, the comment arena and board config
//! - `ops`: pure operations (reorder, filtering, aggregation, validation)
//! - `store`: the persistence boundary and an in-memory store
//! - `io`: the JSON file store, config editing and file locking
//! - `board`: the session that ties the cache to a store
//! - `cli`: command-line interface using clap
//! - `util`: terminal text helpers

pub mod board;
pub mod cli;
pub mod io;
pub mod model;
pub mod ops;
pub mod store;
pub mod util;
