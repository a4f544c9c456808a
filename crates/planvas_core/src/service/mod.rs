//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate graph, scheduler and storage into presentation-level APIs.
//! - Keep UI/FFI layers decoupled from storage details.

pub mod session;
pub mod store;
