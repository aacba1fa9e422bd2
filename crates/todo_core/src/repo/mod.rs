//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the todo data access contract consumed by the service.
//! - Isolate SQLite query details from business orchestration.
//!
//! # Invariants
//! - Repository writes enforce `TodoItem::validate()` before persistence.
//! - Status filtering and paging run in the store, never in memory.

pub mod page;
pub mod todo_repo;
