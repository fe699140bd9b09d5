//! Configuration for the todo list.
//!
//! This module resolves where the backing JSON file lives. The store itself
//! never looks at the environment; it receives the path from [`Config`].
//!
//! # Environment Variables
//!
//! | Variable | Required | Default | Description |
//! |----------|----------|---------|-------------|
//! | `TODOLIST_DB_PATH` | No | `~/.todos.json` | Path to the backing JSON file |
//!
//! # Example
//!
//! ```no_run
//! use todolist::config::Config;
//!
//! let config = Config::from_env().expect("Failed to load configuration");
//! println!("Todos stored in: {}", config.db_path().display());
//! ```

use std::env;
use std::path::{Path, PathBuf};

use directories::BaseDirs;
use thiserror::Error;

/// Environment variable overriding the backing file location.
pub const DB_PATH_ENV: &str = "TODOLIST_DB_PATH";

/// Default backing file name relative to home.
const DEFAULT_DB_FILE: &str = ".todos.json";

/// Errors that can occur during configuration parsing.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Environment variable has an invalid value.
    #[error("invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    /// Failed to determine home directory.
    #[error("failed to determine home directory")]
    NoHomeDirectory,
}

/// Configuration for the todo list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Absolute path to the backing JSON file.
    db_path: PathBuf,
}

impl Config {
    /// Creates a configuration that points at an explicit file.
    ///
    /// Relative paths are resolved against the current directory.
    pub fn with_db_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Ok(Self {
            db_path: absolutize(path.as_ref(), DB_PATH_ENV)?,
        })
    }

    /// Creates a new `Config` by reading environment variables.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if:
    /// - `TODOLIST_DB_PATH` is set but empty
    /// - `TODOLIST_DB_PATH` is unset and the home directory cannot be determined
    pub fn from_env() -> Result<Self, ConfigError> {
        match env::var(DB_PATH_ENV) {
            Ok(val) if val.trim().is_empty() => Err(ConfigError::InvalidValue {
                key: DB_PATH_ENV.to_string(),
                message: "path cannot be empty".to_string(),
            }),
            Ok(val) => Self::with_db_path(val),
            Err(_) => {
                let base_dirs = BaseDirs::new().ok_or(ConfigError::NoHomeDirectory)?;
                Ok(Self {
                    db_path: base_dirs.home_dir().join(DEFAULT_DB_FILE),
                })
            }
        }
    }

    /// Returns the absolute path of the backing JSON file.
    pub fn db_path(&self) -> &Path {
        &self.db_path
    }
}

fn absolutize(path: &Path, key: &str) -> Result<PathBuf, ConfigError> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    let cwd = env::current_dir().map_err(|e| ConfigError::InvalidValue {
        key: key.to_string(),
        message: format!("cannot resolve relative path: {e}"),
    })?;
    Ok(cwd.join(path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    /// Runs `f` with `TODOLIST_DB_PATH` removed, restoring it afterwards.
    fn with_clean_env<F, R>(f: F) -> R
    where
        F: FnOnce() -> R,
    {
        let saved = env::var(DB_PATH_ENV).ok();
        env::remove_var(DB_PATH_ENV);

        let result = f();

        match saved {
            Some(value) => env::set_var(DB_PATH_ENV, value),
            None => env::remove_var(DB_PATH_ENV),
        }

        result
    }

    #[test]
    #[serial]
    fn test_default_path_is_in_home() {
        with_clean_env(|| {
            let config = Config::from_env().unwrap();
            let home = BaseDirs::new().unwrap().home_dir().to_path_buf();
            assert_eq!(config.db_path(), home.join(".todos.json"));
        });
    }

    #[test]
    #[serial]
    fn test_env_override() {
        with_clean_env(|| {
            env::set_var(DB_PATH_ENV, "/var/tmp/my-todos.json");
            let config = Config::from_env().unwrap();
            assert_eq!(config.db_path(), Path::new("/var/tmp/my-todos.json"));
        });
    }

    #[test]
    #[serial]
    fn test_empty_env_value_is_rejected() {
        with_clean_env(|| {
            env::set_var(DB_PATH_ENV, "  ");
            let err = Config::from_env().unwrap_err();
            assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == DB_PATH_ENV));
        });
    }

    #[test]
    #[serial]
    fn test_relative_env_path_is_absolutized() {
        with_clean_env(|| {
            env::set_var(DB_PATH_ENV, "todos.json");
            let config = Config::from_env().unwrap();
            assert!(config.db_path().is_absolute());
            assert!(config.db_path().ends_with("todos.json"));
        });
    }

    #[test]
    fn test_with_db_path_keeps_absolute_path() {
        let config = Config::with_db_path("/srv/todos.json").unwrap();
        assert_eq!(config.db_path(), Path::new("/srv/todos.json"));
    }

    #[test]
    fn test_invalid_value_display() {
        let err = ConfigError::InvalidValue {
            key: DB_PATH_ENV.to_string(),
            message: "path cannot be empty".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "invalid value for TODOLIST_DB_PATH: path cannot be empty"
        );
    }
}
