//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the key-value storage contract used by the session store.
//! - Keep SQL details out of the service layer.
//!
//! # Invariants
//! - Repositories store opaque text values; they never interpret them.

pub mod state_repo;
