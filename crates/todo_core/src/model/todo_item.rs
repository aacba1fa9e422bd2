//! Todo item domain model.
//!
//! # Responsibility
//! - Define the todo record shape and the three-state status enum.
//! - Provide fresh (create path) and restore (load path) constructors.
//!
//! # Invariants
//! - `status == Done` implies `done_datetime` is set.
//! - `status == NotDone` implies `done_datetime` is unset.
//! - `description` holds 1..=5000 characters, is not blank and has no NUL.
//! - `creation_datetime <= due_datetime`.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Store-assigned identifier of a todo item.
pub type TodoId = i64;

/// Maximum description length in characters.
pub const DESCRIPTION_MAX_CHARS: usize = 5000;

/// Status of a todo item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TodoStatus {
    /// Open and not yet past its due datetime.
    NotDone,
    /// Completed.
    Done,
    /// Due datetime elapsed before completion. Terminal and immutable.
    PastDue,
}

impl TodoStatus {
    /// Canonical text form used on the wire and in storage.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NotDone => "NOT_DONE",
            Self::Done => "DONE",
            Self::PastDue => "PAST_DUE",
        }
    }

    /// Parses the canonical text form.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "NOT_DONE" => Some(Self::NotDone),
            "DONE" => Some(Self::Done),
            "PAST_DUE" => Some(Self::PastDue),
            _ => None,
        }
    }
}

impl Display for TodoStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Invariant violations detected on a todo item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TodoValidationError {
    BlankDescription,
    DescriptionTooLong { chars: usize },
    NulCharacter,
    MissingDoneDatetime,
    UnexpectedDoneDatetime { status: TodoStatus },
    DueBeforeCreation { creation: i64, due: i64 },
}

impl Display for TodoValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankDescription => write!(f, "description must not be blank"),
            Self::DescriptionTooLong { chars } => write!(
                f,
                "description has {chars} characters, max is {DESCRIPTION_MAX_CHARS}"
            ),
            Self::NulCharacter => write!(f, "description must not contain NUL characters"),
            Self::MissingDoneDatetime => write!(f, "DONE item must have done_datetime"),
            Self::UnexpectedDoneDatetime { status } => {
                write!(f, "{status} item must not have done_datetime")
            }
            Self::DueBeforeCreation { creation, due } => write!(
                f,
                "due_datetime ({due}) must be >= creation_datetime ({creation})"
            ),
        }
    }
}

impl Error for TodoValidationError {}

/// Canonical todo record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoItem {
    /// `None` until the first save assigns an id.
    pub id: Option<TodoId>,
    pub description: String,
    pub status: TodoStatus,
    /// Unix epoch milliseconds. Set once at creation.
    pub creation_datetime: i64,
    /// Unix epoch milliseconds.
    pub due_datetime: i64,
    /// Unix epoch milliseconds. Meaningful only for `Done` (frozen for `PastDue`).
    pub done_datetime: Option<i64>,
}

impl TodoItem {
    /// Creates a fresh, unsaved item in `NotDone` state.
    pub fn new(description: impl Into<String>, creation_datetime: i64, due_datetime: i64) -> Self {
        Self {
            id: None,
            description: description.into(),
            status: TodoStatus::NotDone,
            creation_datetime,
            due_datetime,
            done_datetime: None,
        }
    }

    /// Rebuilds a persisted item and checks its invariants.
    pub fn restore(
        id: TodoId,
        description: String,
        status: TodoStatus,
        creation_datetime: i64,
        due_datetime: i64,
        done_datetime: Option<i64>,
    ) -> Result<Self, TodoValidationError> {
        let item = Self {
            id: Some(id),
            description,
            status,
            creation_datetime,
            due_datetime,
            done_datetime,
        };
        item.validate()?;
        Ok(item)
    }

    /// Checks storage-level invariants.
    pub fn validate(&self) -> Result<(), TodoValidationError> {
        if self.description.trim().is_empty() {
            return Err(TodoValidationError::BlankDescription);
        }
        if self.description.contains('\0') {
            return Err(TodoValidationError::NulCharacter);
        }
        let chars = self.description.chars().count();
        if chars > DESCRIPTION_MAX_CHARS {
            return Err(TodoValidationError::DescriptionTooLong { chars });
        }

        match (self.status, self.done_datetime) {
            (TodoStatus::Done, None) => return Err(TodoValidationError::MissingDoneDatetime),
            (TodoStatus::NotDone, Some(_)) => {
                return Err(TodoValidationError::UnexpectedDoneDatetime {
                    status: self.status,
                })
            }
            _ => {}
        }

        if self.due_datetime < self.creation_datetime {
            return Err(TodoValidationError::DueBeforeCreation {
                creation: self.creation_datetime,
                due: self.due_datetime,
            });
        }

        Ok(())
    }
}
