//! Wire-facing request/response shapes and input validation.
//!
//! # Responsibility
//! - Convert between caller-facing DTOs and the `TodoItem` entity.
//! - Validate caller input explicitly before any entity is built.
//!
//! # Invariants
//! - Mapping is pure: no storage access and no status rules.

pub mod todo_mapper;
