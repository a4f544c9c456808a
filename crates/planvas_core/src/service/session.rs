//! Planner session: the explicit editing context over a project collection.
//!
//! # Responsibility
//! - Hold every project plus the id of the active one.
//! - Expose presentation-level use cases that mutate the active project.
//! - Recompute derived task statuses after every mutation.
//!
//! # Invariants
//! - At most one project is active; its id always resolves when set.
//! - Refused operations leave the session untouched.
//! - Without an active project, reads are empty and idempotent mutations are
//!   no-ops; creating operations fail with `NoActiveProject`.

use crate::config::{DEFAULT_ZOOM, MAX_ZOOM, MIN_ZOOM};
use crate::graph::{self, GraphError, RankMap};
use crate::layout;
use crate::model::project::{Camera, Dependency, Project, ProjectId};
use crate::model::task::{normalize_task_name, validate_duration, Task, TaskId, TaskStatus};
use crate::schedule::export::{export_file_name, schedule_to_csv, ExportError};
use crate::schedule::{calculate_schedule, ScheduleRow};
use chrono::{Local, NaiveDate, Utc};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type SessionResult<T> = Result<T, SessionError>;

/// Errors from session use cases.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionError {
    /// No project is selected.
    NoActiveProject,
    /// Requested project id does not exist.
    ProjectNotFound(ProjectId),
    /// Project name is blank after trim.
    InvalidProjectName,
    /// Completion of a blocked task cannot be toggled.
    TaskBlocked(TaskId),
    /// No task id above the largest existing one is left.
    TaskIdsExhausted,
    /// Graph guard refused the change.
    Graph(GraphError),
}

impl Display for SessionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoActiveProject => write!(f, "no active project"),
            Self::ProjectNotFound(id) => write!(f, "project not found: {id}"),
            Self::InvalidProjectName => write!(f, "project name must not be blank"),
            Self::TaskBlocked(id) => write!(f, "task {id} is blocked by unfinished dependencies"),
            Self::TaskIdsExhausted => write!(f, "no free task id left in this project"),
            Self::Graph(err) => write!(f, "{err}"),
        }
    }
}

impl Error for SessionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Graph(err) => Some(err),
            _ => None,
        }
    }
}

impl From<GraphError> for SessionError {
    fn from(value: GraphError) -> Self {
        Self::Graph(value)
    }
}

/// Partial edit of a task; `None` fields stay unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub duration_days: Option<f64>,
    pub is_done_by_user: Option<bool>,
}

/// CSV rendering of the active project's schedule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvExport {
    pub file_name: String,
    pub content: String,
}

/// Editing context holding all projects and the active selection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlannerSession {
    #[serde(default)]
    projects: Vec<Project>,
    #[serde(default)]
    current_project_id: Option<ProjectId>,
}

impl PlannerSession {
    /// Creates a session with no projects and no active selection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a session holding only the sample project, already recomputed.
    pub fn with_default_project(start_date: NaiveDate) -> Self {
        let mut session = Self::new();
        session.push_and_activate(Project::sample(start_date));
        session
    }

    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    pub fn current_project_id(&self) -> Option<&str> {
        self.current_project_id.as_deref()
    }

    pub fn current_project(&self) -> Option<&Project> {
        let id = self.current_project_id.as_deref()?;
        self.projects.iter().find(|project| project.id == id)
    }

    fn current_project_mut(&mut self) -> Option<&mut Project> {
        let id = self.current_project_id.as_deref()?;
        self.projects.iter_mut().find(|project| project.id == id)
    }

    fn active_mut(&mut self) -> SessionResult<&mut Project> {
        self.current_project_mut().ok_or(SessionError::NoActiveProject)
    }

    fn push_and_activate(&mut self, mut project: Project) -> ProjectId {
        graph::recompute_statuses(&mut project);
        let id = project.id.clone();
        self.projects.push(project);
        self.current_project_id = Some(id.clone());
        id
    }

    // ---- project lifecycle ----

    /// Creates an empty project starting today and makes it active.
    pub fn create_project(&mut self, name: &str) -> SessionResult<ProjectId> {
        let name = normalize_project_name(name)?;
        let id = self.push_and_activate(Project::new(name, today()));
        debug!("event=project_create module=session status=ok project_id={id}");
        Ok(id)
    }

    /// Renames the active project. No-op without an active project.
    pub fn rename_project(&mut self, name: &str) -> SessionResult<()> {
        let name = normalize_project_name(name)?;
        if let Some(project) = self.current_project_mut() {
            project.name = name;
        }
        Ok(())
    }

    /// Deletes the active project and selects the first remaining one.
    ///
    /// When no project remains, the sample project is created and selected.
    /// Returns the deleted id, or `None` without an active project.
    pub fn delete_current_project(&mut self) -> Option<ProjectId> {
        let id = self.current_project_id.take()?;
        self.projects.retain(|project| project.id != id);
        if let Some(first) = self.projects.first().map(|project| project.id.clone()) {
            self.current_project_id = Some(first);
        } else {
            self.push_and_activate(Project::sample(today()));
        }
        debug!("event=project_delete module=session status=ok project_id={id}");
        Some(id)
    }

    /// Selects another project by id.
    pub fn switch_project(&mut self, project_id: &str) -> SessionResult<()> {
        if !self.projects.iter().any(|project| project.id == project_id) {
            warn!("event=project_switch module=session status=rejected project_id={project_id}");
            return Err(SessionError::ProjectNotFound(project_id.to_string()));
        }
        self.current_project_id = Some(project_id.to_string());
        Ok(())
    }

    /// Moves the schedule anchor of the active project.
    pub fn set_project_start_date(&mut self, start_date: NaiveDate) {
        if let Some(project) = self.current_project_mut() {
            project.start_date = start_date;
        }
    }

    // ---- task and dependency use cases ----

    /// Adds a task with a fresh timestamp-derived id.
    ///
    /// # Errors
    /// - `NoActiveProject` without a selection.
    /// - `Graph(InvalidTask)` for a blank name or bad duration.
    /// - `Graph(DuplicateTaskName)` when the name is taken (case-insensitive).
    pub fn add_task(
        &mut self,
        name: &str,
        description: &str,
        duration_days: f64,
        is_done: bool,
    ) -> SessionResult<TaskId> {
        let project = self.active_mut()?;
        let id = next_task_id(project, Utc::now().timestamp_millis())
            .ok_or(SessionError::TaskIdsExhausted)?;
        let task = Task::new(id, name, description, duration_days, is_done)
            .map_err(GraphError::from)?;
        if let Err(err) = graph::add_task(project, task) {
            warn!("event=task_add module=session status=rejected project_id={} error={err}", project.id);
            return Err(err.into());
        }
        graph::recompute_statuses(project);
        debug!("event=task_add module=session status=ok project_id={} task_id={id}", project.id);
        Ok(id)
    }

    /// Edits an existing task in place.
    ///
    /// Clearing completion also clears it on every done downstream task.
    pub fn update_task(&mut self, task_id: TaskId, update: TaskUpdate) -> SessionResult<()> {
        let project = self.active_mut()?;
        let current = project
            .task(task_id)
            .ok_or(GraphError::TaskNotFound(task_id))?;

        let name = match update.name {
            Some(name) => {
                let name = normalize_task_name(name).map_err(GraphError::from)?;
                graph::ensure_unique_name(project, &name, Some(task_id))?;
                name
            }
            None => current.name.clone(),
        };
        let duration_days = update.duration_days.unwrap_or(current.duration_days);
        validate_duration(duration_days).map_err(GraphError::from)?;
        let was_done = current.is_done_by_user;

        if let Some(task) = project.task_mut(task_id) {
            task.name = name;
            task.duration_days = duration_days;
            if let Some(description) = update.description {
                task.description = description.trim().to_string();
            }
            if let Some(done) = update.is_done_by_user {
                task.is_done_by_user = done;
            }
        }
        if was_done && update.is_done_by_user == Some(false) {
            graph::uncheck_dependents(project, task_id);
        }
        graph::recompute_statuses(project);
        Ok(())
    }

    /// Removes a task and its incident dependencies. Idempotent.
    pub fn remove_task(&mut self, task_id: TaskId) -> bool {
        let Some(project) = self.current_project_mut() else {
            return false;
        };
        let removed = graph::remove_task(project, task_id);
        graph::recompute_statuses(project);
        removed
    }

    /// Adds the dependency `from -> to` after the graph guards pass.
    pub fn add_dependency(&mut self, from: TaskId, to: TaskId) -> SessionResult<()> {
        let project = self.active_mut()?;
        if let Err(err) = graph::add_dependency(project, from, to) {
            warn!(
                "event=dependency_add module=session status=rejected project_id={} from={from} to={to} error={err}",
                project.id
            );
            return Err(err.into());
        }
        graph::recompute_statuses(project);
        debug!(
            "event=dependency_add module=session status=ok project_id={} from={from} to={to}",
            project.id
        );
        Ok(())
    }

    /// Removes the dependency `from -> to`. Idempotent.
    pub fn remove_dependency(&mut self, from: TaskId, to: TaskId) -> bool {
        let Some(project) = self.current_project_mut() else {
            return false;
        };
        let removed = graph::remove_dependency(project, from, to);
        graph::recompute_statuses(project);
        removed
    }

    /// Whether `from -> to` would currently be accepted. Pure.
    pub fn can_connect(&self, from: TaskId, to: TaskId) -> bool {
        let Some(project) = self.current_project() else {
            return false;
        };
        from != to
            && project.contains_task(from)
            && project.contains_task(to)
            && !project.has_dependency(from, to)
            && !graph::would_create_cycle(project, from, to)
    }

    /// Sets the user completion flag of a task.
    ///
    /// Clearing the flag clears it on every done downstream task as well.
    /// No-op without an active project.
    pub fn set_completion(&mut self, task_id: TaskId, done: bool) -> SessionResult<()> {
        let Some(project) = self.current_project_mut() else {
            return Ok(());
        };
        let task = project
            .task_mut(task_id)
            .ok_or(GraphError::TaskNotFound(task_id))?;
        task.is_done_by_user = done;
        if !done {
            graph::uncheck_dependents(project, task_id);
        }
        graph::recompute_statuses(project);
        Ok(())
    }

    /// Flips the completion flag; refused while the task is blocked.
    ///
    /// Returns the new flag value.
    pub fn toggle_completion(&mut self, task_id: TaskId) -> SessionResult<bool> {
        let project = self.active_mut()?;
        let task = project
            .task(task_id)
            .ok_or(GraphError::TaskNotFound(task_id))?;
        if task.status == TaskStatus::Blocked {
            return Err(SessionError::TaskBlocked(task_id));
        }
        let done = !task.is_done_by_user;
        self.set_completion(task_id, done)?;
        Ok(done)
    }

    /// Moves a task on the canvas. No-op for unknown ids.
    pub fn move_task(&mut self, task_id: TaskId, x: f64, y: f64) {
        if let Some(task) = self
            .current_project_mut()
            .and_then(|project| project.task_mut(task_id))
        {
            task.x = x;
            task.y = y;
        }
    }

    /// Stores camera offset and zoom (clamped to the supported range).
    pub fn set_view(&mut self, camera: Camera, zoom: f64) {
        if let Some(project) = self.current_project_mut() {
            project.camera = camera;
            if zoom.is_finite() {
                project.zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
            }
        }
    }

    /// Lays tasks out in rank columns and focuses the camera on them.
    pub fn arrange_tasks(&mut self) {
        if let Some(project) = self.current_project_mut() {
            layout::arrange_tasks(project);
        }
    }

    /// Re-derives statuses of the active project.
    pub fn recompute_statuses(&mut self) {
        if let Some(project) = self.current_project_mut() {
            graph::recompute_statuses(project);
        }
    }

    // ---- reads ----

    pub fn tasks(&self) -> &[Task] {
        match self.current_project() {
            Some(project) => &project.tasks,
            None => &[],
        }
    }

    pub fn dependencies(&self) -> &[Dependency] {
        match self.current_project() {
            Some(project) => &project.dependencies,
            None => &[],
        }
    }

    pub fn ranks(&self) -> RankMap {
        self.current_project()
            .map(graph::calculate_ranks)
            .unwrap_or_default()
    }

    pub fn schedule(&self, exclude_weekends: bool) -> Vec<ScheduleRow> {
        self.current_project()
            .map(|project| calculate_schedule(project, exclude_weekends))
            .unwrap_or_default()
    }

    /// Renders the active schedule as CSV with its download file name.
    pub fn export_csv(&self, exclude_weekends: bool) -> Result<CsvExport, ExportError> {
        let project = self.current_project().ok_or(ExportError::EmptySchedule)?;
        let rows = calculate_schedule(project, exclude_weekends);
        Ok(CsvExport {
            file_name: export_file_name(&project.name),
            content: schedule_to_csv(project, &rows)?,
        })
    }

    // ---- load-time repair ----

    /// Drops structurally invalid projects, fixes the selection and
    /// recomputes every status. Adds the sample project when none remain.
    ///
    /// Returns how many stored projects were discarded.
    pub(crate) fn repair(&mut self) -> usize {
        let before = self.projects.len();
        let mut seen = HashSet::new();
        self.projects.retain(|project| {
            if !seen.insert(project.id.clone()) {
                warn!("event=state_repair module=session status=dropped project_id={} reason=duplicate_id", project.id);
                return false;
            }
            match graph::validate_project(project) {
                Ok(()) => true,
                Err(err) => {
                    warn!("event=state_repair module=session status=dropped project_id={} reason={err}", project.id);
                    false
                }
            }
        });
        let dropped = before - self.projects.len();

        for project in &mut self.projects {
            project.zoom = stored_zoom(project.zoom);
            graph::recompute_statuses(project);
        }

        let selection_valid = self
            .current_project_id
            .as_deref()
            .is_some_and(|id| self.projects.iter().any(|project| project.id == id));
        if !selection_valid {
            self.current_project_id = self.projects.first().map(|project| project.id.clone());
        }
        if self.projects.is_empty() {
            self.push_and_activate(Project::sample(today()));
        }
        dropped
    }
}

fn normalize_project_name(value: &str) -> SessionResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(SessionError::InvalidProjectName);
    }
    Ok(trimmed.to_string())
}

/// Zero, negative or non-finite stored zoom falls back to the default.
fn stored_zoom(zoom: f64) -> f64 {
    if zoom.is_finite() && zoom > 0.0 {
        zoom.clamp(MIN_ZOOM, MAX_ZOOM)
    } else {
        DEFAULT_ZOOM
    }
}

/// Timestamp-derived id, bumped past every id already in the project.
///
/// `None` when the largest existing id is `TaskId::MAX`.
fn next_task_id(project: &Project, now_millis: i64) -> Option<TaskId> {
    let max_existing = project.tasks.iter().map(|task| task.id).max().unwrap_or(0);
    Some(now_millis.max(max_existing.checked_add(1)?))
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

#[cfg(test)]
mod tests {
    use super::{next_task_id, PlannerSession, SessionError, TaskUpdate};
    use crate::graph::GraphError;
    use crate::model::project::Project;
    use chrono::NaiveDate;

    fn session() -> PlannerSession {
        PlannerSession::with_default_project(NaiveDate::from_ymd_opt(2025, 10, 17).unwrap())
    }

    #[test]
    fn next_task_id_never_reuses_existing_ids() {
        let project = Project::sample(NaiveDate::from_ymd_opt(2025, 10, 17).unwrap());
        assert_eq!(next_task_id(&project, 1_000), Some(1_000));
        assert_eq!(next_task_id(&project, 2), Some(5));
    }

    #[test]
    fn next_task_id_is_none_past_the_largest_id() {
        let mut project = Project::sample(NaiveDate::from_ymd_opt(2025, 10, 17).unwrap());
        project.tasks[3].id = i64::MAX;
        assert_eq!(next_task_id(&project, 1_000), None);
    }

    #[test]
    fn update_task_rejects_name_of_another_task() {
        let mut session = session();
        let err = session
            .update_task(
                2,
                TaskUpdate {
                    name: Some("setup database".to_string()),
                    ..TaskUpdate::default()
                },
            )
            .unwrap_err();
        assert!(matches!(
            err,
            SessionError::Graph(GraphError::DuplicateTaskName(_))
        ));
        assert_eq!(session.tasks()[1].name, "Design UI/UX");
    }

    #[test]
    fn update_task_may_keep_its_own_name_in_other_case() {
        let mut session = session();
        session
            .update_task(
                2,
                TaskUpdate {
                    name: Some("design ui/ux".to_string()),
                    duration_days: Some(10.0),
                    ..TaskUpdate::default()
                },
            )
            .unwrap();
        let task = &session.tasks()[1];
        assert_eq!(task.name, "design ui/ux");
        assert_eq!(task.duration_days, 10.0);
    }

    #[test]
    fn empty_session_is_neutral() {
        let mut session = PlannerSession::new();
        assert!(session.tasks().is_empty());
        assert!(session.ranks().is_empty());
        assert!(session.schedule(true).is_empty());
        assert!(!session.remove_task(1));
        assert!(!session.remove_dependency(1, 2));
        assert!(session.set_completion(1, true).is_ok());
        assert_eq!(
            session.add_task("A", "", 1.0, false).unwrap_err(),
            SessionError::NoActiveProject
        );
        assert_eq!(session.delete_current_project(), None);
    }
}
