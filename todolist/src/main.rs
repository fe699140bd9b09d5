//! todolist - manage a todo list stored in a JSON file.
//!
//! # Commands
//!
//! - `todolist init`: Create the backing file if needed
//! - `todolist add <DESC>...`: Add a pending todo
//! - `todolist list [--done | --all]`: Show todos (pending by default)
//! - `todolist search <TEXT>`: Show todos whose description contains TEXT
//! - `todolist toggle <ID>`: Mark a todo done, or pending again
//! - `todolist edit <ID> <DESC>...`: Replace a todo's description
//! - `todolist delete <ID>`: Delete a todo
//! - `todolist clean`: Delete every done todo
//! - `todolist reorder`: Renumber todos by position
//! - `todolist swap <A> <B>`: Exchange two todos
//!
//! # Environment Variables
//!
//! See the [`config`] module for available configuration options.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use todolist::config::Config;
use todolist::store::{create_store_file_if_needed, Collection};
use todolist::types::Todo;
use todolist::TodoError;

/// todolist - a todo list in a single JSON file.
#[derive(Parser, Debug)]
#[command(name = "todolist")]
#[command(author, version, about, long_about = None)]
#[command(after_help = "\
ENVIRONMENT VARIABLES:
    TODOLIST_DB_PATH   Backing JSON file (default: ~/.todos.json)
    RUST_LOG           Log filter (default: warn)

EXAMPLES:
    todolist add buy milk
    todolist list --all
    todolist toggle 1
    todolist clean
")]
struct Cli {
    /// Backing JSON file, overrides TODOLIST_DB_PATH.
    #[arg(long, global = true, value_name = "PATH")]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

/// CLI subcommands.
#[derive(Subcommand, Debug)]
enum Command {
    /// Create the backing file if it does not exist yet.
    Init,

    #[command(flatten)]
    Store(StoreCommand),
}

/// Subcommands that work on a loaded store.
#[derive(Subcommand, Debug)]
enum StoreCommand {
    /// Add a pending todo.
    Add {
        /// Description words, joined with spaces.
        #[arg(required = true, num_args = 1..)]
        description: Vec<String>,
    },

    /// List todos. Shows pending todos unless a flag says otherwise.
    #[command(alias = "ls")]
    List {
        /// Show only done todos.
        #[arg(long, conflicts_with = "all")]
        done: bool,

        /// Show every todo.
        #[arg(short, long)]
        all: bool,
    },

    /// Show todos whose description contains TEXT, ignoring case.
    Search {
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },

    /// Flip a todo between pending and done.
    #[command(alias = "done")]
    Toggle {
        #[arg(allow_negative_numbers = true)]
        id: i64,
    },

    /// Replace a todo's description.
    Edit {
        #[arg(allow_negative_numbers = true)]
        id: i64,

        #[arg(required = true, num_args = 1..)]
        description: Vec<String>,
    },

    /// Delete a todo.
    #[command(alias = "rm")]
    Delete {
        #[arg(allow_negative_numbers = true)]
        id: i64,
    },

    /// Delete every done todo.
    Clean,

    /// Renumber todos 1..n in their current order.
    Reorder,

    /// Exchange two todos' ids and positions.
    Swap {
        #[arg(allow_negative_numbers = true)]
        a: i64,

        #[arg(allow_negative_numbers = true)]
        b: i64,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging();

    let config = match cli.db {
        Some(path) => Config::with_db_path(path),
        None => Config::from_env(),
    }
    .context("Failed to load configuration")?;

    debug!(path = %config.db_path().display(), "Using store");

    match cli.command {
        Command::Init => run_init(config.db_path()),
        Command::Store(command) => {
            let mut collection = open_collection(config.db_path())?;
            run_command(command, &mut collection)
        }
    }
}

/// Runs the init command.
fn run_init(path: &Path) -> Result<()> {
    match create_store_file_if_needed(path) {
        Ok(()) => println!("Created todo store at {}", path.display()),
        Err(TodoError::StoreAlreadyExists(_)) => {
            println!("Todo store already exists at {}", path.display());
        }
        Err(e) => return Err(e).context("Failed to create todo store"),
    }
    Ok(())
}

/// Makes sure the store exists, then loads it.
fn open_collection(path: &Path) -> Result<Collection> {
    match create_store_file_if_needed(path) {
        Ok(()) => info!(path = %path.display(), "Created todo store"),
        Err(TodoError::StoreAlreadyExists(_)) => {}
        Err(e) => return Err(e).context("Failed to create todo store"),
    }

    Collection::open(path).with_context(|| format!("Failed to load todos from {}", path.display()))
}

fn run_command(command: StoreCommand, collection: &mut Collection) -> Result<()> {
    match command {
        StoreCommand::Add { description } => {
            let id = collection.create_todo(description.join(" "))?;
            println!("Added todo {id}");
        }

        StoreCommand::List { done, all } => {
            let todos: Vec<&Todo> = if all {
                collection.todos().iter().collect()
            } else if done {
                collection.list_done_todos().collect()
            } else {
                collection.list_pending_todos().collect()
            };
            print_todos(&todos);
        }

        StoreCommand::Search { text } => {
            let todos: Vec<&Todo> = collection.search(&text.join(" "))?.collect();
            print_todos(&todos);
        }

        StoreCommand::Toggle { id } => {
            let todo = collection.toggle(id)?;
            println!("{}", format_todo(todo));
        }

        StoreCommand::Edit { id, description } => {
            let todo = collection.modify(id, description.join(" "))?;
            println!("{}", format_todo(todo));
        }

        StoreCommand::Delete { id } => {
            let todo = collection.delete_todo(id)?;
            println!("Deleted todo {}: {}", todo.id, todo.description);
        }

        StoreCommand::Clean => {
            let removed = collection.remove_finished_todos()?;
            println!("Removed {removed} finished todo(s)");
        }

        StoreCommand::Reorder => {
            collection.reorder()?;
            println!("Reordered {} todo(s)", collection.len());
        }

        StoreCommand::Swap { a, b } => {
            collection.swap(a, b)?;
            println!("Swapped todos {a} and {b}");
        }
    }
    Ok(())
}

fn print_todos(todos: &[&Todo]) {
    if todos.is_empty() {
        println!("No todos.");
        return;
    }
    for todo in todos {
        println!("{}", format_todo(todo));
    }
}

/// Formats one todo as `  1 [x] description`.
fn format_todo(todo: &Todo) -> String {
    let mark = if todo.is_done() { 'x' } else { ' ' };
    format!("{:>3} [{}] {}", todo.id, mark, todo.description)
}

/// Initializes the logging subsystem on stderr.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .init();
}
