//! Todo entity as stored in the backing file.
//!
//! Each todo serializes to a flat JSON object:
//!
//! ```json
//! {
//!   "id": 1,
//!   "desc": "buy milk",
//!   "status": "pending",
//!   "modified": "2026-10-16 09:12:44.120391000 +0200"
//! }
//! ```

use chrono::{DateTime, FixedOffset, Local};
use serde::{Deserialize, Serialize};

/// Format used for the `modified` field.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.9f %z";

/// Completion state of a todo.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    #[default]
    Pending,
    Done,
}

impl Status {
    /// Returns the opposite status.
    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            Status::Pending => Status::Done,
            Status::Done => Status::Pending,
        }
    }
}

/// A single todo item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    /// 1-based identifier, unique within a stable collection.
    pub id: i64,

    /// Free-form description.
    #[serde(rename = "desc", alias = "description")]
    pub description: String,

    pub status: Status,

    /// Local-time timestamp of the last change.
    ///
    /// Kept as a string so values written by other tools survive a load/save
    /// cycle unchanged.
    pub modified: String,
}

impl Todo {
    /// Creates a pending todo stamped with the current time.
    pub fn new(id: i64, description: impl Into<String>) -> Self {
        Self {
            id,
            description: description.into(),
            status: Status::Pending,
            modified: timestamp_now(),
        }
    }

    /// Returns `true` if the todo has been completed.
    pub fn is_done(&self) -> bool {
        self.status == Status::Done
    }

    /// Updates `modified` to the current time.
    pub fn touch(&mut self) {
        self.modified = timestamp_now();
    }

    /// Parses `modified`, if it was written in [`TIMESTAMP_FORMAT`].
    pub fn modified_at(&self) -> Option<DateTime<FixedOffset>> {
        DateTime::parse_from_str(&self.modified, TIMESTAMP_FORMAT).ok()
    }
}

/// Current local time formatted with [`TIMESTAMP_FORMAT`].
pub fn timestamp_now() -> String {
    Local::now().format(TIMESTAMP_FORMAT).to_string()
}
