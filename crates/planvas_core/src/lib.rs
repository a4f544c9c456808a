//! Core planning logic for Planvas.
//! This crate is the single source of truth for graph and schedule invariants.

pub mod config;
pub mod db;
pub mod graph;
pub mod layout;
pub mod logging;
pub mod model;
pub mod repo;
pub mod schedule;
pub mod service;

pub use graph::{
    calculate_ranks, recompute_statuses, uncheck_dependents, would_create_cycle, GraphError,
    GraphResult, RankMap,
};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::project::{Camera, Dependency, Project, ProjectId};
pub use model::task::{Task, TaskId, TaskStatus, TaskValidationError};
pub use repo::state_repo::{RepoError, RepoResult, SqliteStateRepository, StateRepository};
pub use schedule::export::{export_file_name, schedule_to_csv, ExportError};
pub use schedule::{calculate_schedule, ScheduleRow};
pub use service::session::{CsvExport, PlannerSession, SessionError, SessionResult, TaskUpdate};
pub use service::store::SessionStore;

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
