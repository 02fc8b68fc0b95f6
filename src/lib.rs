//! # clean-todos
//!
//! To-do list service with due-date reminders.
//!
//! This library provides:
//! - An HTTP API for creating, editing, completing, and deleting todos
//! - Pluggable todo storage (in-memory or SQLite)
//! - A background scheduler that fires each reminder at most once
//!
//! ## Reminder Flow
//! 1. A todo is saved with `dueAt` and `notifyPlanMinutes`
//! 2. Every minute the scheduler scans todos that have both
//! 3. Each offset whose fire time just passed is claimed in the ledger
//! 4. The notifier delivers the reminder (or it is only logged)
//!
//! ## Modules
//! - `api`: HTTP routes and server lifecycle
//! - `store`: Todo storage backends
//! - `reminder`: Reminder window, ledger, and scheduler loop
//! - `notify`: Reminder transports

pub mod api;
pub mod config;
pub mod notify;
pub mod reminder;
pub mod store;
pub mod todo;

pub use config::Config;
pub use reminder::ReminderScheduler;
pub use store::TodoStore;
pub use todo::Todo;
