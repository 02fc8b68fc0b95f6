//! In-memory todo store (non-persistent).

use super::{StoreError, TodoStore};
use crate::todo::{Todo, ValidatedTodo};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Default)]
struct Inner {
    next_id: i64,
    todos: BTreeMap<i64, Todo>,
}

#[derive(Clone, Default)]
pub struct InMemoryTodoStore {
    inner: Arc<RwLock<Inner>>,
}

impl InMemoryTodoStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TodoStore for InMemoryTodoStore {
    fn is_persistent(&self) -> bool {
        false
    }

    async fn list_todos(&self) -> Result<Vec<Todo>, StoreError> {
        Ok(self.inner.read().await.todos.values().cloned().collect())
    }

    async fn get_todo(&self, id: i64) -> Result<Option<Todo>, StoreError> {
        Ok(self.inner.read().await.todos.get(&id).cloned())
    }

    async fn create_todo(&self, input: ValidatedTodo) -> Result<Todo, StoreError> {
        let mut inner = self.inner.write().await;
        inner.next_id += 1;
        let todo = Todo::from_validated(inner.next_id, input);
        inner.todos.insert(todo.id, todo.clone());
        Ok(todo)
    }

    async fn update_todo(
        &self,
        id: i64,
        input: ValidatedTodo,
    ) -> Result<Option<Todo>, StoreError> {
        let mut inner = self.inner.write().await;
        let Some(slot) = inner.todos.get_mut(&id) else {
            return Ok(None);
        };
        *slot = Todo::from_validated(id, input);
        Ok(Some(slot.clone()))
    }

    async fn delete_todo(&self, id: i64) -> Result<bool, StoreError> {
        Ok(self.inner.write().await.todos.remove(&id).is_some())
    }

    async fn reminder_candidates(&self) -> Result<Vec<Todo>, StoreError> {
        Ok(self
            .inner
            .read()
            .await
            .todos
            .values()
            .filter(|t| t.has_reminders())
            .cloned()
            .collect())
    }
}
