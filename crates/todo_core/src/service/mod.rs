//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into todo use-cases.
//! - Keep CLI and other front ends decoupled from storage details.

pub mod todo_service;
