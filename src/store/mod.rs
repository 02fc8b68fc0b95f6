//! Todo storage module with pluggable backends.
//!
//! Supports:
//! - `memory`: In-memory storage (non-persistent, for testing)
//! - `sqlite`: SQLite database

mod memory;
mod sqlite;

pub use memory::InMemoryTodoStore;
pub use sqlite::SqliteTodoStore;

use async_trait::async_trait;
use std::path::PathBuf;
use thiserror::Error;

use crate::todo::{Todo, ValidatedTodo};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Background task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Todo store trait - implemented by all storage backends.
#[async_trait]
pub trait TodoStore: Send + Sync {
    /// Whether this store persists data across restarts.
    fn is_persistent(&self) -> bool;

    /// List all todos, ordered by id ascending.
    async fn list_todos(&self) -> Result<Vec<Todo>, StoreError>;

    /// Get a single todo by ID.
    async fn get_todo(&self, id: i64) -> Result<Option<Todo>, StoreError>;

    /// Create a new todo and return it with its assigned ID.
    async fn create_todo(&self, input: ValidatedTodo) -> Result<Todo, StoreError>;

    /// Replace all writable fields of a todo. Returns `None` if it does not exist.
    async fn update_todo(&self, id: i64, input: ValidatedTodo)
        -> Result<Option<Todo>, StoreError>;

    /// Delete a todo. Returns whether a row was removed.
    async fn delete_todo(&self, id: i64) -> Result<bool, StoreError>;

    /// Snapshot of todos with a due time and at least one reminder offset.
    async fn reminder_candidates(&self) -> Result<Vec<Todo>, StoreError>;
}

/// Todo store type selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TodoStoreType {
    Memory,
    #[default]
    Sqlite,
}

impl TodoStoreType {
    /// Parse from environment variable value.
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "memory" | "inmemory" => Self::Memory,
            "sqlite" | "db" => Self::Sqlite,
            _ => Self::default(),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Memory => "memory",
            Self::Sqlite => "sqlite",
        }
    }
}

/// Create a todo store based on type and configuration.
pub async fn create_todo_store(
    store_type: TodoStoreType,
    data_dir: PathBuf,
) -> Result<Box<dyn TodoStore>, StoreError> {
    match store_type {
        TodoStoreType::Memory => Ok(Box::new(InMemoryTodoStore::new())),
        TodoStoreType::Sqlite => {
            let store = SqliteTodoStore::new(data_dir).await?;
            Ok(Box::new(store))
        }
    }
}
