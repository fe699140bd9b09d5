//! Error types for the todo list store.
//!
//! Every fallible operation in this crate returns [`TodoError`]. The store
//! never recovers from I/O or decode failures locally; errors are returned to
//! the caller unchanged or wrapped with a short user-facing message.

use std::path::PathBuf;

use thiserror::Error;

use crate::config::ConfigError;

/// Errors that can occur while loading, mutating or saving todos.
///
/// # Examples
///
/// ```ignore
/// use todolist::error::TodoError;
///
/// fn first(collection: &Collection) -> Result<&Todo, TodoError> {
///     collection.find(1)
/// }
/// ```
#[derive(Error, Debug)]
pub enum TodoError {
    /// Configuration-related error.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Open, create, stat or rename failure on the backing file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The backing file does not contain a valid todo array.
    #[error("failed to decode todos: {0}")]
    Decode(#[source] serde_json::Error),

    /// The in-memory collection could not be serialized.
    #[error("failed to encode todos: {0}")]
    Encode(#[source] serde_json::Error),

    /// No todo carries the requested id.
    #[error("the todo with the id {0} was not found")]
    NotFound(i64),

    /// An argument was outside its accepted range.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Search text could not be compiled into a matcher.
    #[error("invalid search text: {0}")]
    Pattern(#[from] regex::Error),

    /// The backing file already exists and holds data.
    ///
    /// This is informational: callers that only want the store to exist
    /// can treat it as success.
    #[error("store already exists at {}", .0.display())]
    StoreAlreadyExists(PathBuf),

    /// A mutation succeeded in memory but could not be persisted.
    #[error("todos couldn't be saved")]
    Save {
        #[source]
        source: Box<TodoError>,
    },
}

impl TodoError {
    /// Wraps a persistence failure so callers see "todos couldn't be saved".
    pub(crate) fn save(source: TodoError) -> Self {
        Self::Save {
            source: Box::new(source),
        }
    }
}

/// A specialized `Result` type for todo store operations.
pub type Result<T> = std::result::Result<T, TodoError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_display() {
        let err = TodoError::NotFound(7);
        assert_eq!(err.to_string(), "the todo with the id 7 was not found");
    }

    #[test]
    fn invalid_argument_display() {
        let err = TodoError::InvalidArgument("id can not be less than 1".to_string());
        assert_eq!(err.to_string(), "invalid argument: id can not be less than 1");
    }

    #[test]
    fn store_already_exists_display() {
        let err = TodoError::StoreAlreadyExists(PathBuf::from("/tmp/todos.json"));
        assert_eq!(err.to_string(), "store already exists at /tmp/todos.json");
    }

    #[test]
    fn io_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: TodoError = io_err.into();
        assert!(matches!(err, TodoError::Io(_)));
        assert!(err.to_string().contains("I/O error"));
    }

    #[test]
    fn decode_display() {
        let json_err = serde_json::from_str::<serde_json::Value>("{ invalid json }").unwrap_err();
        let err = TodoError::Decode(json_err);
        assert!(err.to_string().starts_with("failed to decode todos"));
    }

    #[test]
    fn config_error_conversion() {
        let err: TodoError = ConfigError::NoHomeDirectory.into();
        assert!(matches!(err, TodoError::Config(_)));
        assert_eq!(
            err.to_string(),
            "configuration error: failed to determine home directory"
        );
    }

    #[test]
    fn save_keeps_source_chain() {
        use std::error::Error;

        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err = TodoError::save(io_err.into());
        assert_eq!(err.to_string(), "todos couldn't be saved");

        let source = err.source().expect("save error should carry its cause");
        assert!(source.to_string().contains("access denied"));
    }

    #[test]
    fn result_type_alias_works() {
        fn ok() -> Result<i64> {
            Ok(1)
        }

        fn missing() -> Result<i64> {
            Err(TodoError::NotFound(3))
        }

        assert!(ok().is_ok());
        assert!(missing().is_err());
    }
}
