//! todolist - a command-line todo list backed by a single JSON file.
//!
//! The interesting logic lives in [`store::Collection`], which loads the list
//! from disk, answers read-only queries, and rewrites the whole file after
//! every mutation. Where that file lives is decided by [`config::Config`] and
//! handed to the store explicitly.
//!
//! # Modules
//!
//! - [`config`]: Backing file location from environment variables
//! - [`error`]: Error types for store operations
//! - [`store`]: Load, query, mutate and save the collection
//! - [`types`]: The todo entity and its status

pub mod config;
pub mod error;
pub mod store;
pub mod types;

pub use config::{Config, ConfigError};
pub use error::{Result, TodoError};
pub use store::{create_store_file_if_needed, Collection};
pub use types::{Status, Todo};
