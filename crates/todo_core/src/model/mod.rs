//! Domain model for todo items.
//!
//! # Responsibility
//! - Define the canonical todo record and its status states.
//! - Validate storage-level invariants shared by every write/read path.
//!
//! # Invariants
//! - Items are identified by a store-assigned `TodoId`.
//! - Business transitions live in the service layer, not on the entity.

pub mod todo_item;
