//! Command-line front end for the todo service.
//!
//! # Responsibility
//! - Map subcommands onto `TodoService` operations.
//! - Print results as JSON on stdout and failures on stderr.
//!
//! # Exit codes
//! - `0` on success.
//! - `2` when the caller is at fault: bad input, unknown id, PAST_DUE item.
//! - `1` for configuration, storage and output failures.

use clap::{ArgGroup, Parser, Subcommand};
use log::info;
use serde::Serialize;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::process;
use todo_core::db::{open_db, DbError};
use todo_core::{
    init_logging, Clock, ConfigError, CoreConfig, LoggingError, PageRequest, RepoError, Sort,
    SortField, SqliteTodoRepository, SystemClock, TodoId, TodoItemRequest, TodoService,
    TodoServiceError,
};

#[derive(Parser, Debug)]
#[command(name = "todo")]
#[command(about = "Todo list backed by a local SQLite file", long_about = None)]
#[command(version = todo_core::core_version())]
struct Cli {
    /// Database file (overrides TODO_DB_PATH)
    #[arg(long, value_name = "PATH", global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create a new item
    #[command(group(ArgGroup::new("due").required(true).args(["due_in", "due_at"])))]
    Add {
        #[arg(value_name = "DESCRIPTION")]
        description: String,

        /// Seconds from now until the item is due
        #[arg(long, value_name = "SECS")]
        due_in: Option<i64>,

        /// Due instant in Unix epoch milliseconds
        #[arg(long, value_name = "EPOCH_MS")]
        due_at: Option<i64>,
    },

    /// Replace the description of an item
    Describe {
        #[arg(value_name = "ID")]
        id: TodoId,

        #[arg(value_name = "TEXT")]
        text: String,
    },

    /// Mark an item as done
    Done {
        #[arg(value_name = "ID")]
        id: TodoId,
    },

    /// Mark an item as not done
    Undo {
        #[arg(value_name = "ID")]
        id: TodoId,
    },

    /// Show one item
    Show {
        #[arg(value_name = "ID")]
        id: TodoId,
    },

    /// List items, open ones only unless --all is given
    List {
        /// Include DONE and PAST_DUE items
        #[arg(long)]
        all: bool,

        /// Zero-based page index
        #[arg(long, default_value_t = 0)]
        page: u32,

        /// Page size (defaults to TODO_PAGE_SIZE, capped at 100)
        #[arg(long)]
        size: Option<u32>,

        /// Sort field: id, description, status, creationDatetime, dueDatetime, doneDatetime
        #[arg(long, value_name = "FIELD", default_value = "id")]
        sort: String,

        /// Sort descending
        #[arg(long)]
        desc: bool,
    },

    /// Move overdue open items to PAST_DUE
    Sweep,
}

#[derive(Debug)]
enum CliError {
    Usage(String),
    Config(ConfigError),
    Logging(LoggingError),
    Db(DbError),
    Repo(RepoError),
    Service(TodoServiceError),
    Output(serde_json::Error),
}

impl CliError {
    fn exit_code(&self) -> i32 {
        match self {
            Self::Usage(_) => 2,
            Self::Service(err) if err.is_client_error() => 2,
            _ => 1,
        }
    }
}

impl Display for CliError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Usage(message) => write!(f, "{message}"),
            Self::Config(err) => write!(f, "invalid configuration: {err}"),
            Self::Logging(err) => write!(f, "logging init failed: {err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::Service(err) => write!(f, "{err}"),
            Self::Output(err) => write!(f, "failed to encode output: {err}"),
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<LoggingError> for CliError {
    fn from(value: LoggingError) -> Self {
        Self::Logging(value)
    }
}

impl From<DbError> for CliError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<RepoError> for CliError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<TodoServiceError> for CliError {
    fn from(value: TodoServiceError) -> Self {
        Self::Service(value)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(value: serde_json::Error) -> Self {
        Self::Output(value)
    }
}

fn main() {
    let cli = Cli::parse();

    if let Err(err) = run(cli) {
        eprintln!("Error: {err}");
        process::exit(err.exit_code());
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let mut config = CoreConfig::from_env()?;
    if let Some(path) = cli.db {
        config.db_path = path;
    }
    if let Some(log_dir) = &config.log_dir {
        init_logging(&config.log_level, log_dir)?;
    }
    info!(
        "event=cli_start module=cli status=ok version={}",
        todo_core::core_version()
    );

    let conn = open_db(&config.db_path)?;
    let repo = SqliteTodoRepository::try_new(&conn)?;
    let service = TodoService::new(repo);

    match cli.command {
        Commands::Add {
            description,
            due_in,
            due_at,
        } => {
            let due = resolve_due(due_in, due_at, SystemClock.now_ms())?;
            print_json(&service.create_todo(&TodoItemRequest::new(description, due))?)
        }
        Commands::Describe { id, text } => print_json(&service.update_description(id, text)?),
        Commands::Done { id } => print_json(&service.mark_as_done(id)?),
        Commands::Undo { id } => print_json(&service.mark_as_not_done(id)?),
        Commands::Show { id } => print_json(&service.find_by_id(id)?),
        Commands::List {
            all,
            page,
            size,
            sort,
            desc,
        } => {
            let request = PageRequest::of(page, size.unwrap_or(config.default_page_size))
                .with_sort(parse_sort(&sort, desc)?);
            print_json(&service.find_all(all, &request)?)
        }
        Commands::Sweep => {
            let transitioned = service.sweep_past_due()?;
            print_json(&serde_json::json!({ "transitioned": transitioned }))
        }
    }
}

/// `--due-at` wins when both are present; clap already requires one of them.
fn resolve_due(due_in: Option<i64>, due_at: Option<i64>, now_ms: i64) -> Result<i64, CliError> {
    match (due_at, due_in) {
        (Some(at), _) => Ok(at),
        (None, Some(secs)) => Ok(now_ms.saturating_add(secs.saturating_mul(1_000))),
        (None, None) => Err(CliError::Usage(
            "one of --due-in or --due-at is required".to_string(),
        )),
    }
}

fn parse_sort(field: &str, desc: bool) -> Result<Sort, CliError> {
    let field = SortField::parse(field)
        .ok_or_else(|| CliError::Usage(format!("unknown sort field `{field}`")))?;
    Ok(if desc {
        Sort::desc(field)
    } else {
        Sort::asc(field)
    })
}

fn print_json<T: Serialize>(value: &T) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{parse_sort, resolve_due, Cli, CliError, Commands};
    use clap::{CommandFactory, Parser};
    use todo_core::{Sort, SortField, TodoServiceError};

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn add_requires_a_due_flag() {
        assert!(Cli::try_parse_from(["todo", "add", "Buy milk"]).is_err());

        let cli = Cli::try_parse_from(["todo", "add", "Buy milk", "--due-in", "3600"]).unwrap();
        match cli.command {
            Commands::Add {
                description,
                due_in,
                due_at,
            } => {
                assert_eq!(description, "Buy milk");
                assert_eq!(due_in, Some(3600));
                assert_eq!(due_at, None);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn list_defaults_to_first_page_sorted_by_id() {
        let cli = Cli::try_parse_from(["todo", "list"]).unwrap();
        match cli.command {
            Commands::List {
                all,
                page,
                size,
                sort,
                desc,
            } => {
                assert!(!all);
                assert_eq!(page, 0);
                assert_eq!(size, None);
                assert_eq!(parse_sort(&sort, desc).unwrap(), Sort::asc(SortField::Id));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn due_in_is_relative_to_now() {
        assert_eq!(resolve_due(Some(60), None, 1_000).unwrap(), 61_000);
        assert_eq!(resolve_due(Some(60), Some(5), 1_000).unwrap(), 5);
    }

    #[test]
    fn unknown_sort_field_is_a_usage_error() {
        let err = parse_sort("priority", false).unwrap_err();
        assert!(matches!(err, CliError::Usage(_)));
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn exit_codes_split_client_and_fatal_errors() {
        assert_eq!(CliError::Service(TodoServiceError::NotFound(999)).exit_code(), 2);
        assert_eq!(
            CliError::Repo(todo_core::RepoError::InvalidData("bad".to_string())).exit_code(),
            1
        );
    }
}
