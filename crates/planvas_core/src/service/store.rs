//! Session persistence over a key-value state repository.
//!
//! # Responsibility
//! - Serialize the whole planner session to JSON under one fixed key.
//! - Rebuild a trustworthy session on load.
//!
//! # Invariants
//! - Derived task status is never written; every load recomputes it.
//! - Unreadable or structurally invalid stored state is recovered (default
//!   project), not surfaced as an error. Transport failures still propagate.

use crate::config::STATE_STORAGE_KEY;
use crate::repo::state_repo::{RepoError, RepoResult, StateRepository};
use crate::service::session::PlannerSession;
use chrono::Local;
use log::{info, warn};

/// Loads and saves planner sessions through a [`StateRepository`].
pub struct SessionStore<R: StateRepository> {
    repo: R,
    key: String,
}

impl<R: StateRepository> SessionStore<R> {
    /// Creates a store using the default state key.
    pub fn new(repo: R) -> Self {
        Self::with_key(repo, STATE_STORAGE_KEY)
    }

    /// Creates a store using a custom key (isolated workspaces, tests).
    pub fn with_key(repo: R, key: impl Into<String>) -> Self {
        Self {
            repo,
            key: key.into(),
        }
    }

    /// Loads the stored session.
    ///
    /// - Nothing stored: a fresh session with the sample project.
    /// - Corrupt JSON: same fallback, logged at `warn`.
    /// - Invalid projects are dropped individually; statuses are recomputed.
    pub fn load(&self) -> RepoResult<PlannerSession> {
        let Some(raw) = self.repo.load_value(&self.key)? else {
            info!("event=state_load module=store status=empty key={}", self.key);
            return Ok(default_session());
        };

        match decode_session(&raw) {
            Ok(session) => {
                info!(
                    "event=state_load module=store status=ok key={} projects={}",
                    self.key,
                    session.projects().len()
                );
                Ok(session)
            }
            Err(err) => {
                warn!(
                    "event=state_load module=store status=recovered key={} error={err}",
                    self.key
                );
                Ok(default_session())
            }
        }
    }

    /// Persists the whole session, replacing the previous value.
    pub fn save(&self, session: &PlannerSession) -> RepoResult<()> {
        let raw = encode_session(session)?;
        self.repo.save_value(&self.key, &raw)?;
        info!(
            "event=state_save module=store status=ok key={} projects={}",
            self.key,
            session.projects().len()
        );
        Ok(())
    }

    /// Removes the stored session.
    pub fn clear(&self) -> RepoResult<()> {
        self.repo.delete_value(&self.key)
    }
}

/// Serializes a session to its JSON wire form.
pub fn encode_session(session: &PlannerSession) -> RepoResult<String> {
    serde_json::to_string(session).map_err(|err| RepoError::InvalidData(err.to_string()))
}

/// Parses and repairs a session from its JSON wire form.
pub fn decode_session(raw: &str) -> RepoResult<PlannerSession> {
    let mut session: PlannerSession =
        serde_json::from_str(raw).map_err(|err| RepoError::InvalidData(err.to_string()))?;
    let dropped = session.repair();
    if dropped > 0 {
        warn!("event=state_decode module=store status=partial dropped_projects={dropped}");
    }
    Ok(session)
}

fn default_session() -> PlannerSession {
    PlannerSession::with_default_project(Local::now().date_naive())
}

#[cfg(test)]
mod tests {
    use super::{decode_session, encode_session};
    use crate::model::task::TaskStatus;
    use crate::service::session::PlannerSession;
    use chrono::NaiveDate;

    #[test]
    fn status_is_not_written() {
        let session =
            PlannerSession::with_default_project(NaiveDate::from_ymd_opt(2025, 10, 17).unwrap());
        let raw = encode_session(&session).unwrap();
        assert!(!raw.contains("\"status\""));
        assert!(raw.contains("\"is_done_by_user\":true"));
    }

    #[test]
    fn stored_status_is_ignored_and_recomputed() {
        let raw = r#"{
            "projects": [{
                "id": "proj_a",
                "name": "A",
                "start_date": "2025-10-17",
                "tasks": [
                    {"id": 1, "name": "One", "duration_days": 1, "is_done_by_user": false, "status": "done"},
                    {"id": 2, "name": "Two", "duration_days": 1, "is_done_by_user": true, "status": "done"}
                ],
                "dependencies": [[1, 2]]
            }],
            "current_project_id": "proj_a"
        }"#;
        let session = decode_session(raw).unwrap();
        let tasks = session.tasks();
        assert_eq!(tasks[0].status, TaskStatus::Pending);
        assert_eq!(tasks[1].status, TaskStatus::Blocked);
        assert!(!tasks[1].is_done_by_user);
    }

    #[test]
    fn unknown_selection_falls_back_to_first_project() {
        let raw = r#"{
            "projects": [{"id": "proj_a", "name": "A", "start_date": "2025-10-17"}],
            "current_project_id": "proj_missing"
        }"#;
        let session = decode_session(raw).unwrap();
        assert_eq!(session.current_project_id(), Some("proj_a"));
    }

    #[test]
    fn cyclic_project_is_dropped_and_replaced_by_sample() {
        let raw = r#"{
            "projects": [{
                "id": "proj_bad",
                "name": "Bad",
                "start_date": "2025-10-17",
                "tasks": [
                    {"id": 1, "name": "One", "duration_days": 1, "is_done_by_user": false},
                    {"id": 2, "name": "Two", "duration_days": 1, "is_done_by_user": false}
                ],
                "dependencies": [[1, 2], [2, 1]]
            }],
            "current_project_id": "proj_bad"
        }"#;
        let session = decode_session(raw).unwrap();
        assert_eq!(session.projects().len(), 1);
        assert_eq!(session.current_project().unwrap().name, "My First Project");
    }

    #[test]
    fn malformed_json_is_invalid_data() {
        assert!(decode_session("this is not json").is_err());
    }

    #[test]
    fn unusable_stored_zoom_is_reset() {
        let raw = r#"{
            "projects": [
                {"id": "proj_zero", "name": "Zero", "start_date": "2025-10-17", "zoom": 0},
                {"id": "proj_negative", "name": "Negative", "start_date": "2025-10-17", "zoom": -2.5},
                {"id": "proj_huge", "name": "Huge", "start_date": "2025-10-17", "zoom": 10},
                {"id": "proj_ok", "name": "Ok", "start_date": "2025-10-17", "zoom": 0.5}
            ],
            "current_project_id": "proj_zero"
        }"#;
        let session = decode_session(raw).unwrap();
        let zooms: Vec<_> = session.projects().iter().map(|project| project.zoom).collect();
        assert_eq!(zooms, vec![1.0, 1.0, 3.0, 0.5]);
    }
}
