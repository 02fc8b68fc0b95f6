//! SQLite-based todo store.

use super::{StoreError, TodoStore};
use crate::todo::{Todo, ValidatedTodo};
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;

const SCHEMA: &str = r#"
PRAGMA journal_mode = WAL;

CREATE TABLE IF NOT EXISTS todos (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL,
    is_done INTEGER NOT NULL DEFAULT 0,
    due_at TEXT,
    minutes INTEGER,
    notify_plan_minutes TEXT NOT NULL DEFAULT '[]',
    notify_email TEXT
);

CREATE INDEX IF NOT EXISTS idx_todos_due_at ON todos(due_at) WHERE due_at IS NOT NULL;
"#;

const SELECT_COLUMNS: &str =
    "SELECT id, title, is_done, due_at, minutes, notify_plan_minutes, notify_email FROM todos";

pub struct SqliteTodoStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteTodoStore {
    pub async fn new(data_dir: PathBuf) -> Result<Self, StoreError> {
        tokio::fs::create_dir_all(&data_dir).await?;
        let db_path = data_dir.join("todos.db");

        // Open database in blocking task
        let conn = tokio::task::spawn_blocking(move || {
            let conn = Connection::open(&db_path)?;
            conn.execute_batch(SCHEMA)?;
            tracing::debug!("Opened todo database at {}", db_path.display());
            Ok::<_, StoreError>(conn)
        })
        .await??;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run a closure against the connection on the blocking pool.
    async fn with_conn<T, F>(&self, f: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T, StoreError> + Send + 'static,
    {
        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || {
            let conn = conn.blocking_lock();
            f(&conn)
        })
        .await?
    }
}

fn row_to_todo(row: &Row<'_>) -> rusqlite::Result<Todo> {
    let id: i64 = row.get(0)?;
    let due_at: Option<String> = row.get(3)?;
    let offsets_json: String = row.get(5)?;

    Ok(Todo {
        id,
        title: row.get(1)?,
        is_done: row.get::<_, i32>(2)? != 0,
        due_at: due_at.and_then(|s| match DateTime::parse_from_rfc3339(&s) {
            Ok(dt) => Some(dt.with_timezone(&Utc)),
            Err(e) => {
                tracing::warn!("Ignoring unparseable due_at {:?} on todo {}: {}", s, id, e);
                None
            }
        }),
        minutes: row.get(4)?,
        notify_plan_minutes: match serde_json::from_str(&offsets_json) {
            Ok(offsets) => offsets,
            Err(e) => {
                tracing::warn!(
                    "Ignoring unparseable notify_plan_minutes {:?} on todo {}: {}",
                    offsets_json,
                    id,
                    e
                );
                Vec::new()
            }
        },
        notify_email: row.get(6)?,
    })
}

fn due_at_to_string(due_at: Option<DateTime<Utc>>) -> Option<String> {
    due_at.map(|dt| dt.to_rfc3339_opts(SecondsFormat::AutoSi, true))
}

fn load_todo(conn: &Connection, id: i64) -> Result<Option<Todo>, StoreError> {
    let todo = conn
        .query_row(
            &format!("{} WHERE id = ?1", SELECT_COLUMNS),
            params![id],
            row_to_todo,
        )
        .optional()?;
    Ok(todo)
}

#[async_trait]
impl TodoStore for SqliteTodoStore {
    fn is_persistent(&self) -> bool {
        true
    }

    async fn list_todos(&self) -> Result<Vec<Todo>, StoreError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!("{} ORDER BY id ASC", SELECT_COLUMNS))?;
            let todos = stmt
                .query_map([], row_to_todo)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(todos)
        })
        .await
    }

    async fn get_todo(&self, id: i64) -> Result<Option<Todo>, StoreError> {
        self.with_conn(move |conn| load_todo(conn, id)).await
    }

    async fn create_todo(&self, input: ValidatedTodo) -> Result<Todo, StoreError> {
        let offsets_json = serde_json::to_string(&input.notify_plan_minutes)?;
        self.with_conn(move |conn| {
            conn.execute(
                "INSERT INTO todos (title, is_done, due_at, minutes, notify_plan_minutes, notify_email)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    input.title,
                    input.is_done as i32,
                    due_at_to_string(input.due_at),
                    input.minutes,
                    offsets_json,
                    input.notify_email,
                ],
            )?;
            let id = conn.last_insert_rowid();
            Ok(Todo::from_validated(id, input))
        })
        .await
    }

    async fn update_todo(
        &self,
        id: i64,
        input: ValidatedTodo,
    ) -> Result<Option<Todo>, StoreError> {
        let offsets_json = serde_json::to_string(&input.notify_plan_minutes)?;
        self.with_conn(move |conn| {
            let changed = conn.execute(
                "UPDATE todos
                 SET title = ?2, is_done = ?3, due_at = ?4, minutes = ?5,
                     notify_plan_minutes = ?6, notify_email = ?7
                 WHERE id = ?1",
                params![
                    id,
                    input.title,
                    input.is_done as i32,
                    due_at_to_string(input.due_at),
                    input.minutes,
                    offsets_json,
                    input.notify_email,
                ],
            )?;
            if changed == 0 {
                return Ok(None);
            }
            Ok(Some(Todo::from_validated(id, input)))
        })
        .await
    }

    async fn delete_todo(&self, id: i64) -> Result<bool, StoreError> {
        self.with_conn(move |conn| {
            let removed = conn.execute("DELETE FROM todos WHERE id = ?1", params![id])?;
            Ok(removed > 0)
        })
        .await
    }

    async fn reminder_candidates(&self) -> Result<Vec<Todo>, StoreError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "{} WHERE due_at IS NOT NULL AND notify_plan_minutes <> '[]' ORDER BY id ASC",
                SELECT_COLUMNS
            ))?;
            let todos = stmt
                .query_map([], row_to_todo)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(todos)
        })
        .await
    }
}
