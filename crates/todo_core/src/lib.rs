//! Core domain logic for the todo service.
//! This crate is the single source of truth for todo business invariants.

pub mod clock;
pub mod config;
pub mod db;
pub mod logging;
pub mod mapper;
pub mod model;
pub mod repo;
pub mod service;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{ConfigError, CoreConfig};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use mapper::todo_mapper::{
    validate_description, validate_request, DefaultTodoMapper, RequestValidationError,
    TodoItemRequest, TodoItemResponse, TodoMapper,
};
pub use model::todo_item::{TodoId, TodoItem, TodoStatus, TodoValidationError};
pub use repo::page::{Page, PageRequest, Sort, SortDirection, SortField};
pub use repo::todo_repo::{
    RepoError, RepoResult, SqliteTodoRepository, TodoRepository, TransactionMode,
};
pub use service::todo_service::{ServiceResult, TodoService, TodoServiceError};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
