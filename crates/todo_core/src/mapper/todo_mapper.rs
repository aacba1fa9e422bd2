//! Todo DTOs, mapper contract and request validation.
//!
//! # Responsibility
//! - Define `TodoItemRequest` / `TodoItemResponse` wire shapes.
//! - Provide the default entity <-> DTO mapping.
//! - Validate description and due datetime input.
//!
//! # Invariants
//! - `to_entity` always yields a `NotDone` item stamped with `now`.
//! - Validation never touches storage.

use crate::model::todo_item::{TodoId, TodoItem, TodoStatus, DESCRIPTION_MAX_CHARS};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Input for creating one todo item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoItemRequest {
    pub description: String,
    /// Unix epoch milliseconds. Must be strictly in the future.
    pub due_datetime: i64,
}

impl TodoItemRequest {
    pub fn new(description: impl Into<String>, due_datetime: i64) -> Self {
        Self {
            description: description.into(),
            due_datetime,
        }
    }
}

/// Caller-facing view of one todo item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoItemResponse {
    pub id: Option<TodoId>,
    pub description: String,
    pub status: TodoStatus,
    pub creation_datetime: i64,
    pub due_datetime: i64,
    pub done_datetime: Option<i64>,
}

/// Input validation failures. Client-attributable, never retryable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestValidationError {
    BlankDescription,
    DescriptionTooLong { chars: usize },
    /// SQLite text functions stop at NUL, so such text cannot be stored reliably.
    NulCharacter { position: usize },
    DueNotInFuture { due: i64, now: i64 },
}

impl Display for RequestValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankDescription => write!(f, "Description is required"),
            Self::DescriptionTooLong { chars } => write!(
                f,
                "Description must be between 1 and {DESCRIPTION_MAX_CHARS} characters, got {chars}"
            ),
            Self::NulCharacter { position } => write!(
                f,
                "Description must not contain NUL characters (found at character {position})"
            ),
            Self::DueNotInFuture { due, now } => write!(
                f,
                "Due datetime must be in the future (due={due}, now={now})"
            ),
        }
    }
}

impl Error for RequestValidationError {}

/// Pure transforms between DTOs and the entity.
pub trait TodoMapper {
    fn to_entity(&self, request: &TodoItemRequest, now_ms: i64) -> TodoItem;
    fn to_response(&self, item: &TodoItem) -> TodoItemResponse;
}

/// Field-for-field mapper.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultTodoMapper;

impl TodoMapper for DefaultTodoMapper {
    fn to_entity(&self, request: &TodoItemRequest, now_ms: i64) -> TodoItem {
        TodoItem::new(request.description.clone(), now_ms, request.due_datetime)
    }

    fn to_response(&self, item: &TodoItem) -> TodoItemResponse {
        TodoItemResponse {
            id: item.id,
            description: item.description.clone(),
            status: item.status,
            creation_datetime: item.creation_datetime,
            due_datetime: item.due_datetime,
            done_datetime: item.done_datetime,
        }
    }
}

/// Validates a description: non-blank, NUL-free and at most 5000 characters.
pub fn validate_description(description: &str) -> Result<(), RequestValidationError> {
    if description.trim().is_empty() {
        return Err(RequestValidationError::BlankDescription);
    }
    if let Some(position) = description.chars().position(|ch| ch == '\0') {
        return Err(RequestValidationError::NulCharacter { position });
    }
    let chars = description.chars().count();
    if chars > DESCRIPTION_MAX_CHARS {
        return Err(RequestValidationError::DescriptionTooLong { chars });
    }
    Ok(())
}

/// Validates a create request against the current instant.
pub fn validate_request(
    request: &TodoItemRequest,
    now_ms: i64,
) -> Result<(), RequestValidationError> {
    validate_description(&request.description)?;
    if request.due_datetime <= now_ms {
        return Err(RequestValidationError::DueNotInFuture {
            due: request.due_datetime,
            now: now_ms,
        });
    }
    Ok(())
}
