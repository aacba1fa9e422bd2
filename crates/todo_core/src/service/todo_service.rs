//! Todo use-case service.
//!
//! # Responsibility
//! - Provide create/update/mark/find/list entry points over a repository.
//! - Own the status rules: PAST_DUE items reject every mutation.
//! - Drive the PAST_DUE sweep for overdue open items.
//!
//! # Invariants
//! - Every mutation runs `load -> guard -> apply -> save -> map` inside one
//!   read-write transaction.
//! - The guard runs before any new snapshot is built, so a rejected call
//!   never writes.
//! - Transitions build a new `TodoItem` value; loaded items are never
//!   mutated in place.

use crate::clock::{Clock, SystemClock};
use crate::mapper::todo_mapper::{
    validate_description, validate_request, DefaultTodoMapper, RequestValidationError,
    TodoItemRequest, TodoItemResponse, TodoMapper,
};
use crate::model::todo_item::{TodoId, TodoItem, TodoStatus};
use crate::repo::page::{Page, PageRequest};
use crate::repo::todo_repo::{RepoError, TodoRepository, TransactionMode};
use log::{debug, error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Errors from todo service operations.
#[derive(Debug)]
pub enum TodoServiceError {
    /// No item exists with the requested id.
    NotFound(TodoId),
    /// Target item is PAST_DUE and cannot change.
    Immutable { id: TodoId, message: &'static str },
    /// Caller input failed validation.
    Validation(RequestValidationError),
    /// Persistence-layer failure. Fatal for the call.
    Repo(RepoError),
}

impl TodoServiceError {
    /// Whether the failure is attributable to the caller rather than the store.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, Self::Repo(_))
    }

    /// Stable short code for logs and front ends.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "not_found",
            Self::Immutable { .. } => "immutable",
            Self::Validation(_) => "validation",
            Self::Repo(_) => "repo",
        }
    }
}

impl Display for TodoServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(id) => write!(f, "Todo item not found with id: {id}"),
            Self::Immutable { id, message } => write!(f, "{message} (id: {id})"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for TodoServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for TodoServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(id) => Self::NotFound(id),
            other => Self::Repo(other),
        }
    }
}

impl From<RequestValidationError> for TodoServiceError {
    fn from(value: RequestValidationError) -> Self {
        Self::Validation(value)
    }
}

pub type ServiceResult<T> = Result<T, TodoServiceError>;

/// State change requested by a mutating operation.
enum Transition {
    Describe(String),
    MarkDone,
    MarkNotDone,
}

impl Transition {
    fn event(&self) -> &'static str {
        match self {
            Self::Describe(_) => "todo_update_description",
            Self::MarkDone => "todo_mark_done",
            Self::MarkNotDone => "todo_mark_not_done",
        }
    }

    fn rejection(&self) -> &'static str {
        match self {
            Self::Describe(_) => "Cannot update description of past due item",
            Self::MarkDone => "Cannot mark past due item as done",
            Self::MarkNotDone => "Cannot mark past due item as not done",
        }
    }

    /// Builds the next snapshot from `current`.
    fn apply(self, current: &TodoItem, now_ms: i64) -> TodoItem {
        match self {
            Self::Describe(description) => TodoItem {
                description,
                ..current.clone()
            },
            Self::MarkDone => TodoItem {
                status: TodoStatus::Done,
                done_datetime: Some(now_ms),
                ..current.clone()
            },
            Self::MarkNotDone => TodoItem {
                status: TodoStatus::NotDone,
                done_datetime: None,
                ..current.clone()
            },
        }
    }
}

/// Todo service facade over repository, clock and mapper collaborators.
pub struct TodoService<R, C = SystemClock, M = DefaultTodoMapper> {
    repo: R,
    clock: C,
    mapper: M,
}

impl<R: TodoRepository> TodoService<R> {
    /// Creates a service with wall-clock time and the default mapper.
    pub fn new(repo: R) -> Self {
        Self::with_parts(repo, SystemClock, DefaultTodoMapper)
    }
}

impl<R: TodoRepository, C: Clock> TodoService<R, C> {
    pub fn with_clock(repo: R, clock: C) -> Self {
        Self::with_parts(repo, clock, DefaultTodoMapper)
    }
}

impl<R: TodoRepository, C: Clock, M: TodoMapper> TodoService<R, C, M> {
    pub fn with_parts(repo: R, clock: C, mapper: M) -> Self {
        Self {
            repo,
            clock,
            mapper,
        }
    }

    /// Creates one item in `NOT_DONE` state.
    ///
    /// # Errors
    /// - `Validation` when the description is blank/too long or the due
    ///   datetime is not strictly in the future.
    pub fn create_todo(&self, request: &TodoItemRequest) -> ServiceResult<TodoItemResponse> {
        const EVENT: &str = "todo_create";
        info!(
            "event={EVENT} module=service status=start description_chars={}",
            request.description.chars().count()
        );

        let now = self.clock.now_ms();
        let result: ServiceResult<TodoItemResponse> = validate_request(request, now)
            .map_err(TodoServiceError::from)
            .and_then(|()| {
                let item = self.mapper.to_entity(request, now);
                self.repo
                    .in_transaction(TransactionMode::ReadWrite, |repo| {
                        let saved = repo.save(&item)?;
                        Ok(self.mapper.to_response(&saved))
                    })
            });

        let todo_id = result.as_ref().ok().and_then(|response| response.id);
        log_outcome(EVENT, todo_id, &result);
        result
    }

    /// Replaces the description of a mutable item.
    pub fn update_description(
        &self,
        id: TodoId,
        description: impl Into<String>,
    ) -> ServiceResult<TodoItemResponse> {
        let description = description.into();
        if let Err(err) = validate_description(&description) {
            let result: ServiceResult<TodoItemResponse> = Err(err.into());
            log_outcome("todo_update_description", Some(id), &result);
            return result;
        }
        self.apply_transition(id, Transition::Describe(description))
    }

    /// Sets `DONE` and stamps `done_datetime` with now. Re-marking refreshes the stamp.
    pub fn mark_as_done(&self, id: TodoId) -> ServiceResult<TodoItemResponse> {
        self.apply_transition(id, Transition::MarkDone)
    }

    /// Sets `NOT_DONE` and clears `done_datetime`.
    pub fn mark_as_not_done(&self, id: TodoId) -> ServiceResult<TodoItemResponse> {
        self.apply_transition(id, Transition::MarkNotDone)
    }

    /// Loads one item. Reading a PAST_DUE item is always allowed.
    pub fn find_by_id(&self, id: TodoId) -> ServiceResult<TodoItemResponse> {
        debug!("event=todo_find module=service status=start todo_id={id}");
        let result: ServiceResult<TodoItemResponse> = self
            .repo
            .in_transaction(TransactionMode::ReadOnly, |repo| {
                let item = load_existing(repo, id)?;
                Ok(self.mapper.to_response(&item))
            });
        if let Err(err) = &result {
            warn!(
                "event=todo_find module=service status=error todo_id={id} error_code={}",
                err.code()
            );
        }
        result
    }

    /// Lists one page: every status when `include_all`, else `NOT_DONE` only.
    ///
    /// Paging and sort are passed to the repository unchanged.
    pub fn find_all(
        &self,
        include_all: bool,
        request: &PageRequest,
    ) -> ServiceResult<Page<TodoItemResponse>> {
        debug!(
            "event=todo_list module=service status=start include_all={include_all} page={} size={}",
            request.page, request.size
        );
        let result: ServiceResult<Page<TodoItemResponse>> = self
            .repo
            .in_transaction(TransactionMode::ReadOnly, |repo| {
                let page = if include_all {
                    repo.find_all(request)?
                } else {
                    repo.find_by_status(TodoStatus::NotDone, request)?
                };
                Ok(page.map(|item| self.mapper.to_response(&item)))
            });
        match &result {
            Ok(page) => debug!(
                "event=todo_list module=service status=ok include_all={include_all} returned={} total={}",
                page.len(),
                page.total_elements
            ),
            Err(err) => error!(
                "event=todo_list module=service status=error include_all={include_all} error_code={} error={err}",
                err.code()
            ),
        }
        result
    }

    /// Moves every overdue `NOT_DONE` item to `PAST_DUE` as of now.
    ///
    /// Idempotent; `DONE` items are never touched. Returns the number of
    /// items transitioned.
    pub fn sweep_past_due(&self) -> ServiceResult<u64> {
        const EVENT: &str = "todo_sweep_past_due";
        let now = self.clock.now_ms();
        info!("event={EVENT} module=service status=start now_ms={now}");
        let result = self
            .repo
            .in_transaction(TransactionMode::ReadWrite, |repo| {
                repo.mark_past_due(now).map_err(TodoServiceError::from)
            });
        match &result {
            Ok(count) => info!("event={EVENT} module=service status=ok transitioned={count}"),
            Err(err) => error!("event={EVENT} module=service status=error error={err}"),
        }
        result
    }

    fn apply_transition(
        &self,
        id: TodoId,
        transition: Transition,
    ) -> ServiceResult<TodoItemResponse> {
        let event = transition.event();
        info!("event={event} module=service status=start todo_id={id}");

        let result: ServiceResult<TodoItemResponse> = self
            .repo
            .in_transaction(TransactionMode::ReadWrite, |repo| {
                let current = load_existing(repo, id)?;
                ensure_mutable(&current, id, transition.rejection())?;
                let next = transition.apply(&current, self.clock.now_ms());
                let saved = repo.save(&next)?;
                Ok(self.mapper.to_response(&saved))
            });

        log_outcome(event, Some(id), &result);
        result
    }
}

fn load_existing<R: TodoRepository>(repo: &R, id: TodoId) -> ServiceResult<TodoItem> {
    repo.find_by_id(id)?.ok_or(TodoServiceError::NotFound(id))
}

fn ensure_mutable(item: &TodoItem, id: TodoId, message: &'static str) -> ServiceResult<()> {
    if item.status == TodoStatus::PastDue {
        return Err(TodoServiceError::Immutable { id, message });
    }
    Ok(())
}

fn log_outcome<T>(event: &str, todo_id: Option<TodoId>, result: &ServiceResult<T>) {
    let todo_id = todo_id.map_or_else(|| "-".to_string(), |id| id.to_string());
    match result {
        Ok(_) => info!("event={event} module=service status=ok todo_id={todo_id}"),
        Err(err) if err.is_client_error() => warn!(
            "event={event} module=service status=rejected todo_id={todo_id} error_code={}",
            err.code()
        ),
        Err(err) => error!(
            "event={event} module=service status=error todo_id={todo_id} error_code={} error={err}",
            err.code()
        ),
    }
}
