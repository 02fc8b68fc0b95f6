//! HTTP API for clean-todos.
//!
//! ## Endpoints
//!
//! - `GET /api/health` - Health check
//! - `GET /api/todos` - List todos
//! - `POST /api/todos` - Create a todo
//! - `GET /api/todos/{id}` - Get a todo
//! - `PUT /api/todos/{id}` - Replace a todo
//! - `DELETE /api/todos/{id}` - Delete a todo

mod routes;
mod todos;
pub mod types;

pub use routes::{router, serve, AppState};
pub use types::*;
