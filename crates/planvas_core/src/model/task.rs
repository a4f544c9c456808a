//! Task domain model.
//!
//! # Responsibility
//! - Define the task node used by the graph engine, scheduler and storage.
//! - Validate user-editable task fields before they enter a project.
//!
//! # Invariants
//! - `name` is trimmed and never blank.
//! - `duration_days` is finite, strictly positive and at most
//!   `MAX_DURATION_DAYS`.
//! - `status` is derived and only written by status recomputation.
//! - `status == Done` implies `is_done_by_user`.

use crate::config::MAX_DURATION_DAYS;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Stable, caller-assigned task identifier.
///
/// Newly created tasks get timestamp-derived ids; imported tasks keep theirs.
pub type TaskId = i64;

/// Derived completion state of a task.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Every predecessor is done, but the task itself is not.
    #[default]
    Pending,
    /// Marked done by the user and not blocked.
    Done,
    /// At least one direct predecessor is not done.
    Blocked,
}

impl TaskStatus {
    /// Returns the stable lowercase label used by exports and the UI.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Done => "done",
            Self::Blocked => "blocked",
        }
    }
}

impl Display for TaskStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validation failures for task fields.
#[derive(Debug, Clone, PartialEq)]
pub enum TaskValidationError {
    /// Name is empty after trim.
    BlankName,
    /// Duration is zero, negative, NaN, infinite or above the maximum.
    InvalidDuration(f64),
}

impl Display for TaskValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankName => write!(f, "task name must not be blank"),
            Self::InvalidDuration(value) => {
                write!(
                    f,
                    "task duration must be a positive number of days up to {MAX_DURATION_DAYS}, got {value}"
                )
            }
        }
    }
}

impl Error for TaskValidationError {}

/// One unit of work in a project graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Fractional days are allowed; calendar placement rounds up.
    pub duration_days: f64,
    /// User intent. May be forced back to `false` when the task is blocked.
    pub is_done_by_user: bool,
    /// Never persisted; recomputed after every load and mutation.
    #[serde(skip)]
    pub status: TaskStatus,
    /// Canvas position. View state only.
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
}

impl Task {
    /// Creates a validated task with `Pending` status at the canvas origin.
    ///
    /// The name is trimmed. A task created with `is_done_by_user = true` still
    /// reports `Pending` until the next status recomputation confirms it.
    pub fn new(
        id: TaskId,
        name: impl Into<String>,
        description: impl Into<String>,
        duration_days: f64,
        is_done_by_user: bool,
    ) -> Result<Self, TaskValidationError> {
        let task = Self {
            id,
            name: normalize_task_name(name.into())?,
            description: description.into().trim().to_string(),
            duration_days,
            is_done_by_user,
            status: TaskStatus::Pending,
            x: 0.0,
            y: 0.0,
        };
        task.validate()?;
        Ok(task)
    }

    /// Validates user-editable fields.
    pub fn validate(&self) -> Result<(), TaskValidationError> {
        if self.name.trim().is_empty() {
            return Err(TaskValidationError::BlankName);
        }
        validate_duration(self.duration_days)
    }

    /// Case-insensitive name comparison used for uniqueness checks.
    pub fn has_name(&self, name: &str) -> bool {
        self.name.to_lowercase() == name.trim().to_lowercase()
    }
}

/// Trims a task name and rejects blank input.
pub fn normalize_task_name(value: String) -> Result<String, TaskValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(TaskValidationError::BlankName);
    }
    Ok(trimmed.to_string())
}

/// Rejects non-finite, non-positive and oversized durations.
pub fn validate_duration(duration_days: f64) -> Result<(), TaskValidationError> {
    if !duration_days.is_finite() || duration_days <= 0.0 || duration_days > MAX_DURATION_DAYS {
        return Err(TaskValidationError::InvalidDuration(duration_days));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{Task, TaskStatus, TaskValidationError};
    use crate::config::MAX_DURATION_DAYS;

    #[test]
    fn new_trims_name_and_starts_pending() {
        let task = Task::new(7, "  Write docs ", " later ", 1.5, true).unwrap();
        assert_eq!(task.name, "Write docs");
        assert_eq!(task.description, "later");
        assert_eq!(task.status, TaskStatus::Pending);
        assert!(task.is_done_by_user);
    }

    #[test]
    fn new_rejects_blank_name_and_bad_duration() {
        assert_eq!(
            Task::new(1, "   ", "", 1.0, false).unwrap_err(),
            TaskValidationError::BlankName
        );
        assert!(matches!(
            Task::new(1, "A", "", 0.0, false).unwrap_err(),
            TaskValidationError::InvalidDuration(_)
        ));
        assert!(matches!(
            Task::new(1, "A", "", f64::NAN, false).unwrap_err(),
            TaskValidationError::InvalidDuration(_)
        ));
        assert!(matches!(
            Task::new(1, "A", "", 1e9, false).unwrap_err(),
            TaskValidationError::InvalidDuration(_)
        ));
        assert!(Task::new(1, "A", "", MAX_DURATION_DAYS, false).is_ok());
    }

    #[test]
    fn has_name_ignores_case() {
        let task = Task::new(1, "Plan Project", "", 1.0, false).unwrap();
        assert!(task.has_name("plan project"));
        assert!(task.has_name(" PLAN PROJECT "));
        assert!(!task.has_name("Plan"));
    }
}
