//! Planning domain model.
//!
//! # Responsibility
//! - Define the task, dependency and project records shared by every layer.
//! - Keep derived fields (`status`) separate from user intent (`is_done_by_user`).
//!
//! # Invariants
//! - A project exclusively owns its tasks and dependencies.
//! - Task ids are caller-assigned and never reassigned.

pub mod project;
pub mod task;
