//! Todo repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide save/find/page APIs over the `todo_items` table.
//! - Provide transaction scoping for multi-step service operations.
//! - Apply the bulk PAST_DUE transition for overdue open items.
//!
//! # Invariants
//! - Write paths call `TodoItem::validate()` before SQL mutations.
//! - Read paths reject invalid persisted state instead of masking it.
//! - `creation_datetime` is never rewritten after insert.

use crate::db::migrations::latest_version;
use crate::db::DbError;
use crate::model::todo_item::{TodoId, TodoItem, TodoStatus, TodoValidationError};
use crate::repo::page::{Page, PageRequest, Sort, SortDirection, SortField};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row, Transaction, TransactionBehavior};
use std::error::Error;
use std::fmt::{Display, Formatter};

const TODO_SELECT_SQL: &str = "SELECT
    id,
    description,
    status,
    creation_datetime,
    due_datetime,
    done_datetime
FROM todo_items";

const REQUIRED_COLUMNS: [&str; 6] = [
    "id",
    "description",
    "status",
    "creation_datetime",
    "due_datetime",
    "done_datetime",
];

pub type RepoResult<T> = Result<T, RepoError>;

/// Errors from todo persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    /// Item violates storage invariants.
    Validation(TodoValidationError),
    /// Underlying SQLite/bootstrap error.
    Db(DbError),
    /// Update targeted an id with no row.
    NotFound(TodoId),
    /// Persisted row cannot be converted into a valid item.
    InvalidData(String),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "todo item not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted todo data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "todo repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "todo repository requires table `{table}`")
            }
            Self::MissingRequiredColumn { table, column } => write!(
                f,
                "todo repository requires column `{column}` in table `{table}`"
            ),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<TodoValidationError> for RepoError {
    fn from(value: TodoValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Transaction flavour requested by a unit of work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionMode {
    /// Read-only work; no write lock is taken up front.
    ReadOnly,
    /// Load-guard-mutate-persist work; write lock taken at begin.
    ReadWrite,
}

/// Repository interface for todo items.
pub trait TodoRepository {
    /// Inserts when `item.id` is `None`, updates otherwise. Returns the stored item.
    fn save(&self, item: &TodoItem) -> RepoResult<TodoItem>;
    fn find_by_id(&self, id: TodoId) -> RepoResult<Option<TodoItem>>;
    fn find_all(&self, request: &PageRequest) -> RepoResult<Page<TodoItem>>;
    fn find_by_status(
        &self,
        status: TodoStatus,
        request: &PageRequest,
    ) -> RepoResult<Page<TodoItem>>;
    /// Moves every `NotDone` item due strictly before `now_ms` to `PastDue`.
    fn mark_past_due(&self, now_ms: i64) -> RepoResult<u64>;
    /// Runs `work` in one transaction: commit on `Ok`, roll back on `Err`.
    fn in_transaction<T, E, F>(&self, mode: TransactionMode, work: F) -> Result<T, E>
    where
        E: From<RepoError>,
        F: FnOnce(&Self) -> Result<T, E>;
}

impl<R: TodoRepository> TodoRepository for &R {
    fn save(&self, item: &TodoItem) -> RepoResult<TodoItem> {
        (**self).save(item)
    }

    fn find_by_id(&self, id: TodoId) -> RepoResult<Option<TodoItem>> {
        (**self).find_by_id(id)
    }

    fn find_all(&self, request: &PageRequest) -> RepoResult<Page<TodoItem>> {
        (**self).find_all(request)
    }

    fn find_by_status(
        &self,
        status: TodoStatus,
        request: &PageRequest,
    ) -> RepoResult<Page<TodoItem>> {
        (**self).find_by_status(status, request)
    }

    fn mark_past_due(&self, now_ms: i64) -> RepoResult<u64> {
        (**self).mark_past_due(now_ms)
    }

    fn in_transaction<T, E, F>(&self, mode: TransactionMode, work: F) -> Result<T, E>
    where
        E: From<RepoError>,
        F: FnOnce(&Self) -> Result<T, E>,
    {
        (**self).in_transaction(mode, |_| work(self))
    }
}

/// SQLite-backed todo repository.
pub struct SqliteTodoRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTodoRepository<'conn> {
    /// Creates repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_todo_connection_ready(conn)?;
        Ok(Self { conn })
    }

    fn fetch_page(
        &self,
        status: Option<TodoStatus>,
        request: &PageRequest,
    ) -> RepoResult<Page<TodoItem>> {
        let mut filter = String::new();
        let mut bind_values: Vec<Value> = Vec::new();
        if let Some(status) = status {
            filter.push_str(" WHERE status = ?");
            bind_values.push(Value::Text(status.as_str().to_string()));
        }

        let total: i64 = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM todo_items{filter};"),
            params_from_iter(bind_values.iter()),
            |row| row.get(0),
        )?;

        let sql = format!(
            "{TODO_SELECT_SQL}{filter} ORDER BY {} LIMIT ? OFFSET ?;",
            order_by_clause(request.sort)
        );
        bind_values.push(Value::Integer(i64::from(request.size)));
        bind_values.push(Value::Integer(
            i64::try_from(request.offset()).unwrap_or(i64::MAX),
        ));

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(parse_todo_row(row)?);
        }

        Ok(Page::new(items, request, u64::try_from(total).unwrap_or(0)))
    }
}

impl TodoRepository for SqliteTodoRepository<'_> {
    fn save(&self, item: &TodoItem) -> RepoResult<TodoItem> {
        item.validate()?;

        let Some(id) = item.id else {
            self.conn.execute(
                "INSERT INTO todo_items (
                    description,
                    status,
                    creation_datetime,
                    due_datetime,
                    done_datetime
                ) VALUES (?1, ?2, ?3, ?4, ?5);",
                params![
                    item.description.as_str(),
                    item.status.as_str(),
                    item.creation_datetime,
                    item.due_datetime,
                    item.done_datetime,
                ],
            )?;
            return Ok(TodoItem {
                id: Some(self.conn.last_insert_rowid()),
                ..item.clone()
            });
        };

        let changed = self.conn.execute(
            "UPDATE todo_items
             SET
                description = ?2,
                status = ?3,
                due_datetime = ?4,
                done_datetime = ?5
             WHERE id = ?1;",
            params![
                id,
                item.description.as_str(),
                item.status.as_str(),
                item.due_datetime,
                item.done_datetime,
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        self.find_by_id(id)?.ok_or(RepoError::NotFound(id))
    }

    fn find_by_id(&self, id: TodoId) -> RepoResult<Option<TodoItem>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{TODO_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_todo_row(row)?));
        }
        Ok(None)
    }

    fn find_all(&self, request: &PageRequest) -> RepoResult<Page<TodoItem>> {
        self.fetch_page(None, request)
    }

    fn find_by_status(
        &self,
        status: TodoStatus,
        request: &PageRequest,
    ) -> RepoResult<Page<TodoItem>> {
        self.fetch_page(Some(status), request)
    }

    fn mark_past_due(&self, now_ms: i64) -> RepoResult<u64> {
        let changed = self.conn.execute(
            "UPDATE todo_items
             SET status = ?1
             WHERE status = ?2
               AND due_datetime < ?3;",
            params![
                TodoStatus::PastDue.as_str(),
                TodoStatus::NotDone.as_str(),
                now_ms
            ],
        )?;
        Ok(changed as u64)
    }

    fn in_transaction<T, E, F>(&self, mode: TransactionMode, work: F) -> Result<T, E>
    where
        E: From<RepoError>,
        F: FnOnce(&Self) -> Result<T, E>,
    {
        let behavior = match mode {
            TransactionMode::ReadOnly => TransactionBehavior::Deferred,
            TransactionMode::ReadWrite => TransactionBehavior::Immediate,
        };
        let tx = Transaction::new_unchecked(self.conn, behavior).map_err(RepoError::from)?;
        // Dropping `tx` on the error path rolls back.
        let value = work(self)?;
        tx.commit().map_err(RepoError::from)?;
        Ok(value)
    }
}

fn order_by_clause(sort: Sort) -> String {
    let column = match sort.field {
        SortField::Id => "id",
        SortField::Description => "description",
        SortField::Status => "status",
        SortField::CreationDatetime => "creation_datetime",
        SortField::DueDatetime => "due_datetime",
        SortField::DoneDatetime => "done_datetime",
    };
    let direction = match sort.direction {
        SortDirection::Asc => "ASC",
        SortDirection::Desc => "DESC",
    };
    if sort.field == SortField::Id {
        format!("id {direction}")
    } else {
        format!("{column} {direction}, id ASC")
    }
}

fn parse_todo_row(row: &Row<'_>) -> RepoResult<TodoItem> {
    let status_text: String = row.get("status")?;
    let status = TodoStatus::parse(&status_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid status `{status_text}` in todo_items.status"
        ))
    })?;

    let item = TodoItem::restore(
        row.get("id")?,
        row.get("description")?,
        status,
        row.get("creation_datetime")?,
        row.get("due_datetime")?,
        row.get("done_datetime")?,
    )?;
    Ok(item)
}

fn ensure_todo_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    if !table_exists(conn, "todo_items")? {
        return Err(RepoError::MissingRequiredTable("todo_items"));
    }

    for column in REQUIRED_COLUMNS {
        if !table_has_column(conn, "todo_items", column)? {
            return Err(RepoError::MissingRequiredColumn {
                table: "todo_items",
                column,
            });
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}
