//! Collection store: loads, queries, mutates and persists the todo list.
//!
//! The whole list lives in one JSON file. Every mutating operation works on
//! the in-memory collection and then rewrites the entire file. Writes go to a
//! temporary file next to the target which is then renamed over it, so a
//! crash mid-save never leaves a truncated file behind.
//!
//! # Example
//!
//! ```no_run
//! use todolist::store::{create_store_file_if_needed, Collection};
//! use todolist::TodoError;
//!
//! # fn main() -> todolist::Result<()> {
//! let path = std::path::Path::new("/tmp/todos.json");
//! match create_store_file_if_needed(path) {
//!     Ok(()) | Err(TodoError::StoreAlreadyExists(_)) => {}
//!     Err(e) => return Err(e),
//! }
//!
//! let mut collection = Collection::open(path)?;
//! let id = collection.create_todo("buy milk")?;
//! collection.toggle(id)?;
//! # Ok(())
//! # }
//! ```

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufReader, Write};
use std::path::{Path, PathBuf};

use regex::RegexBuilder;
use tracing::{debug, warn};

use crate::error::{Result, TodoError};
use crate::types::{Status, Todo};

/// Content of a freshly initialized store.
const EMPTY_STORE: &str = "[]";

/// Ensures a backing file exists at `path`.
///
/// A missing or zero-length file is (re)written as an empty JSON array, after
/// creating any missing parent directories.
///
/// # Errors
///
/// - [`TodoError::StoreAlreadyExists`] if the file exists and is non-empty
/// - [`TodoError::Io`] if the file cannot be inspected or written
pub fn create_store_file_if_needed(path: &Path) -> Result<()> {
    match fs::metadata(path) {
        Ok(meta) if meta.len() > 0 => Err(TodoError::StoreAlreadyExists(path.to_path_buf())),
        Ok(_) => write_empty_store(path),
        Err(e) if e.kind() == io::ErrorKind::NotFound => write_empty_store(path),
        Err(e) => Err(e.into()),
    }
}

fn write_empty_store(path: &Path) -> Result<()> {
    if let Some(parent) = non_empty_parent(path) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, EMPTY_STORE)?;
    debug!(path = %path.display(), "Initialized empty store");
    Ok(())
}

/// The in-memory todo list bound to its backing file.
#[derive(Debug, Clone)]
pub struct Collection {
    path: PathBuf,
    todos: Vec<Todo>,
}

impl Collection {
    /// Creates an empty collection backed by `path`. Nothing is read yet.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            todos: Vec::new(),
        }
    }

    /// Creates a collection and loads it from `path`.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let mut collection = Self::new(path);
        collection.retrieve_todos()?;
        Ok(collection)
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All todos in display order.
    pub fn todos(&self) -> &[Todo] {
        &self.todos
    }

    pub fn len(&self) -> usize {
        self.todos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.todos.is_empty()
    }

    /// Replaces the in-memory list with the content of the backing file.
    ///
    /// Decoding is all-or-nothing: on failure the current list is kept.
    ///
    /// # Errors
    ///
    /// - [`TodoError::Io`] if the file cannot be opened
    /// - [`TodoError::Decode`] if it is not a valid todo array
    pub fn retrieve_todos(&mut self) -> Result<()> {
        let file = File::open(&self.path)?;
        let todos: Vec<Todo> =
            serde_json::from_reader(BufReader::new(file)).map_err(TodoError::Decode)?;

        debug!(path = %self.path.display(), count = todos.len(), "Loaded todos");
        self.todos = todos;
        Ok(())
    }

    /// Rewrites the backing file with the whole in-memory list.
    ///
    /// The JSON is indented with two spaces and replaces the previous file
    /// atomically.
    ///
    /// # Errors
    ///
    /// - [`TodoError::Encode`] if serialization fails
    /// - [`TodoError::Io`] if the temporary file cannot be written or renamed
    pub fn write_todos(&self) -> Result<()> {
        let data = serde_json::to_vec_pretty(&self.todos).map_err(TodoError::Encode)?;
        write_atomic(&self.path, &data)?;

        debug!(path = %self.path.display(), count = self.todos.len(), "Saved todos");
        Ok(())
    }

    /// Todos that are still pending.
    pub fn list_pending_todos(&self) -> impl Iterator<Item = &Todo> + '_ {
        self.with_status(Status::Pending)
    }

    /// Todos that are done.
    pub fn list_done_todos(&self) -> impl Iterator<Item = &Todo> + '_ {
        self.with_status(Status::Done)
    }

    fn with_status(&self, status: Status) -> impl Iterator<Item = &Todo> + '_ {
        self.todos.iter().filter(move |todo| todo.status == status)
    }

    /// Todos whose description contains `text`, ignoring case.
    ///
    /// `text` is matched literally; characters such as `.` or `*` have no
    /// special meaning. Case folding follows Unicode simple folding, so `Σ`,
    /// `σ` and `ς` all match each other.
    ///
    /// # Errors
    ///
    /// Returns [`TodoError::Pattern`] if `text` is too large to compile into
    /// a matcher.
    pub fn search<'a>(&'a self, text: &str) -> Result<impl Iterator<Item = &'a Todo> + 'a> {
        let matcher = RegexBuilder::new(&regex::escape(text))
            .case_insensitive(true)
            .build()?;

        Ok(self
            .todos
            .iter()
            .filter(move |todo| matcher.is_match(&todo.description)))
    }

    /// Appends a new pending todo and persists the list.
    ///
    /// The id is one more than the highest existing id, or 1 for an empty
    /// list. Returns the assigned id.
    ///
    /// # Errors
    ///
    /// - [`TodoError::InvalidArgument`] if the highest id is already
    ///   `i64::MAX`; nothing is added
    /// - persistence errors from [`write_todos`](Self::write_todos)
    pub fn create_todo(&mut self, description: impl Into<String>) -> Result<i64> {
        let highest = self.todos.iter().map(|todo| todo.id).max().unwrap_or(0);
        let id = highest.checked_add(1).ok_or_else(|| {
            TodoError::InvalidArgument(format!("no id left after {highest}"))
        })?;
        self.todos.push(Todo::new(id, description));

        self.write_todos()?;
        debug!(id, "Created todo");
        Ok(id)
    }

    /// Looks up a todo by id. If several share the id, the last one wins.
    ///
    /// # Errors
    ///
    /// Returns [`TodoError::NotFound`] if no todo has that id.
    pub fn find(&self, id: i64) -> Result<&Todo> {
        self.position(id).map(|index| &self.todos[index])
    }

    fn position(&self, id: i64) -> Result<usize> {
        self.todos
            .iter()
            .rposition(|todo| todo.id == id)
            .ok_or(TodoError::NotFound(id))
    }

    /// Flips a todo between pending and done and persists the list.
    ///
    /// # Errors
    ///
    /// - [`TodoError::NotFound`] if no todo has that id
    /// - [`TodoError::Save`] if the list could not be written
    pub fn toggle(&mut self, id: i64) -> Result<&Todo> {
        let index = self.position(id)?;
        {
            let todo = &mut self.todos[index];
            todo.status = todo.status.toggled();
            todo.touch();
        }

        self.write_todos().map_err(TodoError::save)?;
        debug!(id, status = ?self.todos[index].status, "Toggled todo");
        Ok(&self.todos[index])
    }

    /// Replaces a todo's description and persists the list.
    ///
    /// # Errors
    ///
    /// Same as [`toggle`](Self::toggle).
    pub fn modify(&mut self, id: i64, description: impl Into<String>) -> Result<&Todo> {
        let index = self.position(id)?;
        {
            let todo = &mut self.todos[index];
            todo.description = description.into();
            todo.touch();
        }

        self.write_todos().map_err(TodoError::save)?;
        debug!(id, "Modified todo");
        Ok(&self.todos[index])
    }

    /// Drops every done todo and persists the list.
    ///
    /// Returns the number of todos removed.
    pub fn remove_finished_todos(&mut self) -> Result<usize> {
        let before = self.todos.len();
        self.todos.retain(|todo| !todo.is_done());
        let removed = before - self.todos.len();

        self.write_todos()?;
        debug!(removed, "Removed finished todos");
        Ok(removed)
    }

    /// Deletes the todo whose id matches and persists the list.
    ///
    /// Returns the deleted todo.
    ///
    /// # Errors
    ///
    /// - [`TodoError::InvalidArgument`] if `id < 1`; the file is not touched
    /// - [`TodoError::NotFound`] if no todo has that id
    pub fn delete_todo(&mut self, id: i64) -> Result<Todo> {
        if id < 1 {
            return Err(TodoError::InvalidArgument(
                "id can not be less than 1".to_string(),
            ));
        }

        let index = self.position(id)?;
        let removed = self.todos.remove(index);

        self.write_todos()?;
        debug!(id, "Deleted todo");
        Ok(removed)
    }

    /// Renumbers every todo to its 1-based position and persists the list.
    pub fn reorder(&mut self) -> Result<()> {
        for (index, todo) in self.todos.iter_mut().enumerate() {
            todo.id = index as i64 + 1;
        }

        self.write_todos()?;
        debug!(count = self.todos.len(), "Reordered todos");
        Ok(())
    }

    /// Exchanges two todos' ids and their positions, then persists the list.
    ///
    /// Both ids are resolved before anything changes.
    ///
    /// # Errors
    ///
    /// Returns [`TodoError::NotFound`] if either id is missing; the list and
    /// the file are left untouched.
    pub fn swap(&mut self, id_a: i64, id_b: i64) -> Result<()> {
        let position_a = self.position(id_a)?;
        let position_b = self.position(id_b)?;

        self.todos[position_a].id = id_b;
        self.todos[position_b].id = id_a;
        self.todos.swap(position_a, position_b);

        self.write_todos()?;
        debug!(id_a, id_b, "Swapped todos");
        Ok(())
    }
}

fn non_empty_parent(path: &Path) -> Option<&Path> {
    path.parent().filter(|parent| !parent.as_os_str().is_empty())
}

/// Writes `data` to a sibling temp file, fsyncs it, and renames it over `path`.
///
/// If `path` is a symlink the rename targets the file it points to, so the
/// link itself survives.
fn write_atomic(path: &Path, data: &[u8]) -> io::Result<()> {
    let resolved = match fs::canonicalize(path) {
        Ok(resolved) => resolved,
        Err(e) if e.kind() == io::ErrorKind::NotFound => path.to_path_buf(),
        Err(e) => return Err(e),
    };
    let path = resolved.as_path();

    let dir = non_empty_parent(path).unwrap_or_else(|| Path::new("."));
    let file_name = path.file_name().ok_or_else(|| {
        io::Error::new(io::ErrorKind::InvalidInput, "store path has no file name")
    })?;
    let temp_path = dir.join(format!(
        ".{}.tmp.{}",
        file_name.to_string_lossy(),
        std::process::id()
    ));

    let result = write_synced(&temp_path, data).and_then(|()| fs::rename(&temp_path, path));

    if result.is_err() {
        if let Err(e) = fs::remove_file(&temp_path) {
            if e.kind() != io::ErrorKind::NotFound {
                warn!(path = %temp_path.display(), error = %e, "Failed to remove temp file");
            }
        }
    }

    result
}

fn write_synced(path: &Path, data: &[u8]) -> io::Result<()> {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);

    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options.open(path)?;
    file.write_all(data)?;
    file.sync_all()
}
