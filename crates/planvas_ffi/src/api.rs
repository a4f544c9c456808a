//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose stable, use-case-level planner functions to Dart via FRB.
//! - Load the persisted session, apply one use case and save it back.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - Failed use cases leave the stored session untouched.
//! - Dates cross the boundary as ISO `YYYY-MM-DD` strings.

use chrono::NaiveDate;
use log::warn;
use planvas_core::db::open_db;
use planvas_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    Camera, PlannerSession, ScheduleRow, SessionStore, SqliteStateRepository, Task, TaskUpdate,
};
use std::path::PathBuf;
use std::sync::OnceLock;

const ENTRY_DB_FILE_NAME: &str = "planvas_entry.sqlite3";
const DATE_FORMAT: &str = "%Y-%m-%d";
static ENTRY_DB_PATH: OnceLock<PathBuf> = OnceLock::new();

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir` (idempotent).
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// Task projection for the canvas.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskItem {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub duration_days: f64,
    pub is_done_by_user: bool,
    /// Derived status (`pending|done|blocked`).
    pub status: String,
    pub x: f64,
    pub y: f64,
}

/// Directed edge `from -> to`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DependencyItem {
    pub from: i64,
    pub to: i64,
}

/// Project list entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectItem {
    pub id: String,
    pub name: String,
    pub is_current: bool,
}

/// Full view of the active project plus the project list.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannerSnapshot {
    pub ok: bool,
    pub message: String,
    pub projects: Vec<ProjectItem>,
    pub project_id: Option<String>,
    pub project_name: String,
    pub start_date: String,
    pub tasks: Vec<TaskItem>,
    pub dependencies: Vec<DependencyItem>,
    pub camera_x: f64,
    pub camera_y: f64,
    pub zoom: f64,
}

impl PlannerSnapshot {
    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            message: message.into(),
            projects: Vec::new(),
            project_id: None,
            project_name: String::new(),
            start_date: String::new(),
            tasks: Vec::new(),
            dependencies: Vec::new(),
            camera_x: 0.0,
            camera_y: 0.0,
            zoom: 1.0,
        }
    }
}

/// Generic action response envelope for planner commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannerActionResponse {
    /// Whether operation succeeded.
    pub ok: bool,
    /// Created task id, when the action created one.
    pub task_id: Option<i64>,
    /// Created or affected project id, when relevant.
    pub project_id: Option<String>,
    /// Human-readable response message for diagnostics/UI.
    pub message: String,
}

impl PlannerActionResponse {
    fn success(message: impl Into<String>) -> Self {
        Self {
            ok: true,
            task_id: None,
            project_id: None,
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            task_id: None,
            project_id: None,
            message: message.into(),
        }
    }

    fn with_task(mut self, task_id: i64) -> Self {
        self.task_id = Some(task_id);
        self
    }

    fn with_project(mut self, project_id: Option<String>) -> Self {
        self.project_id = project_id;
        self
    }
}

/// One scheduled task with ISO dates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleItem {
    pub task_id: i64,
    pub name: String,
    pub start_date: String,
    pub end_date: String,
    pub percent_complete: u8,
    /// Direct predecessor ids joined by `,`.
    pub predecessor_ids: String,
}

/// Schedule response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleResponse {
    pub ok: bool,
    pub message: String,
    pub items: Vec<ScheduleItem>,
}

/// CSV export response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvExportResponse {
    pub ok: bool,
    pub message: String,
    pub file_name: String,
    pub content: String,
}

/// Returns the active project, its tasks and the project list.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn planner_snapshot() -> PlannerSnapshot {
    match read_session(to_snapshot) {
        Ok(snapshot) => snapshot,
        Err(err) => PlannerSnapshot::failure(format!("planner_snapshot failed: {err}")),
    }
}

/// Adds a task to the active project.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics.
/// - Returns the created task id on success.
#[flutter_rust_bridge::frb(sync)]
pub fn planner_add_task(
    name: String,
    description: String,
    duration_days: f64,
    is_done: bool,
) -> PlannerActionResponse {
    match mutate_session(|session| {
        session
            .add_task(&name, &description, duration_days, is_done)
            .map_err(|err| err.to_string())
    }) {
        Ok(task_id) => PlannerActionResponse::success("Task added.").with_task(task_id),
        Err(err) => PlannerActionResponse::failure(format!("planner_add_task failed: {err}")),
    }
}

/// Edits a task; `None` fields stay unchanged.
#[flutter_rust_bridge::frb(sync)]
pub fn planner_update_task(
    task_id: i64,
    name: Option<String>,
    description: Option<String>,
    duration_days: Option<f64>,
    is_done: Option<bool>,
) -> PlannerActionResponse {
    let update = TaskUpdate {
        name,
        description,
        duration_days,
        is_done_by_user: is_done,
    };
    action("planner_update_task", "Task updated.", |session| {
        session
            .update_task(task_id, update)
            .map_err(|err| err.to_string())
    })
}

/// Removes a task and its dependencies. Removing a missing task succeeds.
#[flutter_rust_bridge::frb(sync)]
pub fn planner_remove_task(task_id: i64) -> PlannerActionResponse {
    action("planner_remove_task", "Task removed.", |session| {
        session.remove_task(task_id);
        Ok(())
    })
}

/// Adds the dependency `from -> to`; refused on self-loops, duplicates and cycles.
#[flutter_rust_bridge::frb(sync)]
pub fn planner_add_dependency(from: i64, to: i64) -> PlannerActionResponse {
    action("planner_add_dependency", "Dependency added.", |session| {
        session
            .add_dependency(from, to)
            .map_err(|err| err.to_string())
    })
}

/// Removes the dependency `from -> to`. Removing a missing edge succeeds.
#[flutter_rust_bridge::frb(sync)]
pub fn planner_remove_dependency(from: i64, to: i64) -> PlannerActionResponse {
    action("planner_remove_dependency", "Dependency removed.", |session| {
        session.remove_dependency(from, to);
        Ok(())
    })
}

/// Whether `from -> to` would be accepted right now. Pure; `false` on errors.
#[flutter_rust_bridge::frb(sync)]
pub fn planner_can_connect(from: i64, to: i64) -> bool {
    read_session(|session| session.can_connect(from, to)).unwrap_or(false)
}

/// Flips a task's completion; refused while the task is blocked.
#[flutter_rust_bridge::frb(sync)]
pub fn planner_toggle_completion(task_id: i64) -> PlannerActionResponse {
    match mutate_session(|session| {
        session
            .toggle_completion(task_id)
            .map_err(|err| err.to_string())
    }) {
        Ok(true) => PlannerActionResponse::success("Task marked done.").with_task(task_id),
        Ok(false) => PlannerActionResponse::success("Task marked pending.").with_task(task_id),
        Err(err) => {
            PlannerActionResponse::failure(format!("planner_toggle_completion failed: {err}"))
        }
    }
}

/// Moves the schedule anchor; `start_date` is `YYYY-MM-DD`.
#[flutter_rust_bridge::frb(sync)]
pub fn planner_set_start_date(start_date: String) -> PlannerActionResponse {
    let parsed = match NaiveDate::parse_from_str(start_date.trim(), DATE_FORMAT) {
        Ok(date) => date,
        Err(err) => {
            return PlannerActionResponse::failure(format!(
                "planner_set_start_date failed: invalid date `{}`: {err}",
                start_date.trim()
            ));
        }
    };
    action("planner_set_start_date", "Start date updated.", |session| {
        session.set_project_start_date(parsed);
        Ok(())
    })
}

/// Stores a task's canvas position.
#[flutter_rust_bridge::frb(sync)]
pub fn planner_move_task(task_id: i64, x: f64, y: f64) -> PlannerActionResponse {
    action("planner_move_task", "Task moved.", |session| {
        session.move_task(task_id, x, y);
        Ok(())
    })
}

/// Stores camera offset and zoom.
#[flutter_rust_bridge::frb(sync)]
pub fn planner_set_view(camera_x: f64, camera_y: f64, zoom: f64) -> PlannerActionResponse {
    action("planner_set_view", "View saved.", |session| {
        session.set_view(
            Camera {
                x: camera_x,
                y: camera_y,
            },
            zoom,
        );
        Ok(())
    })
}

/// Lays tasks out in rank columns and recenters the camera.
#[flutter_rust_bridge::frb(sync)]
pub fn planner_arrange_tasks() -> PlannerActionResponse {
    action("planner_arrange_tasks", "Tasks arranged.", |session| {
        session.arrange_tasks();
        Ok(())
    })
}

/// Computes the active project's schedule.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics; empty projects return an empty item list.
#[flutter_rust_bridge::frb(sync)]
pub fn planner_schedule(exclude_weekends: bool) -> ScheduleResponse {
    match read_session(|session| session.schedule(exclude_weekends)) {
        Ok(rows) => ScheduleResponse {
            ok: true,
            message: format!("Scheduled {} task(s).", rows.len()),
            items: rows.iter().map(to_schedule_item).collect(),
        },
        Err(err) => ScheduleResponse {
            ok: false,
            message: format!("planner_schedule failed: {err}"),
            items: Vec::new(),
        },
    }
}

/// Renders the active schedule as CSV plus a download file name.
#[flutter_rust_bridge::frb(sync)]
pub fn planner_export_csv(exclude_weekends: bool) -> CsvExportResponse {
    let exported = read_session(|session| session.export_csv(exclude_weekends))
        .and_then(|result| result.map_err(|err| err.to_string()));
    match exported {
        Ok(export) => CsvExportResponse {
            ok: true,
            message: "Schedule exported.".to_string(),
            file_name: export.file_name,
            content: export.content,
        },
        Err(err) => CsvExportResponse {
            ok: false,
            message: format!("planner_export_csv failed: {err}"),
            file_name: String::new(),
            content: String::new(),
        },
    }
}

/// Creates an empty project starting today and makes it active.
#[flutter_rust_bridge::frb(sync)]
pub fn project_create(name: String) -> PlannerActionResponse {
    match mutate_session(|session| session.create_project(&name).map_err(|err| err.to_string())) {
        Ok(project_id) => {
            PlannerActionResponse::success("Project created.").with_project(Some(project_id))
        }
        Err(err) => PlannerActionResponse::failure(format!("project_create failed: {err}")),
    }
}

/// Renames the active project.
#[flutter_rust_bridge::frb(sync)]
pub fn project_rename(name: String) -> PlannerActionResponse {
    action("project_rename", "Project renamed.", |session| {
        session.rename_project(&name).map_err(|err| err.to_string())
    })
}

/// Deletes the active project; the sample project returns when none remain.
///
/// The response carries the newly active project id.
#[flutter_rust_bridge::frb(sync)]
pub fn project_delete_current() -> PlannerActionResponse {
    match mutate_session(|session| {
        session.delete_current_project();
        Ok(session.current_project_id().map(str::to_string))
    }) {
        Ok(active) => PlannerActionResponse::success("Project deleted.").with_project(active),
        Err(err) => {
            PlannerActionResponse::failure(format!("project_delete_current failed: {err}"))
        }
    }
}

/// Makes another project active.
#[flutter_rust_bridge::frb(sync)]
pub fn project_switch(project_id: String) -> PlannerActionResponse {
    match mutate_session(|session| {
        session
            .switch_project(project_id.trim())
            .map_err(|err| err.to_string())
    }) {
        Ok(()) => PlannerActionResponse::success("Project switched.")
            .with_project(Some(project_id.trim().to_string())),
        Err(err) => PlannerActionResponse::failure(format!("project_switch failed: {err}")),
    }
}

fn action(
    op: &str,
    success_message: &str,
    f: impl FnOnce(&mut PlannerSession) -> Result<(), String>,
) -> PlannerActionResponse {
    match mutate_session(f) {
        Ok(()) => PlannerActionResponse::success(success_message),
        Err(err) => PlannerActionResponse::failure(format!("{op} failed: {err}")),
    }
}

fn resolve_entry_db_path() -> PathBuf {
    ENTRY_DB_PATH
        .get_or_init(|| {
            if let Ok(raw) = std::env::var("PLANVAS_DB_PATH") {
                let trimmed = raw.trim();
                if !trimmed.is_empty() {
                    return PathBuf::from(trimmed);
                }
            }
            std::env::temp_dir().join(ENTRY_DB_FILE_NAME)
        })
        .clone()
}

fn read_session<T>(f: impl FnOnce(&PlannerSession) -> T) -> Result<T, String> {
    let db_path = resolve_entry_db_path();
    let conn = open_db(&db_path).map_err(|err| format!("planner DB open failed: {err}"))?;
    let store = SessionStore::new(SqliteStateRepository::new(&conn));
    let session = store
        .load()
        .map_err(|err| format!("planner state load failed: {err}"))?;
    Ok(f(&session))
}

/// Loads, mutates and saves the session; nothing is saved when `f` fails.
fn mutate_session<T>(
    f: impl FnOnce(&mut PlannerSession) -> Result<T, String>,
) -> Result<T, String> {
    let db_path = resolve_entry_db_path();
    let conn = open_db(&db_path).map_err(|err| format!("planner DB open failed: {err}"))?;
    let store = SessionStore::new(SqliteStateRepository::new(&conn));
    let mut session = store
        .load()
        .map_err(|err| format!("planner state load failed: {err}"))?;
    let value = f(&mut session).inspect_err(|err| {
        warn!("event=ffi_call module=ffi status=rejected error={err}");
    })?;
    store
        .save(&session)
        .map_err(|err| format!("planner state save failed: {err}"))?;
    Ok(value)
}

fn to_snapshot(session: &PlannerSession) -> PlannerSnapshot {
    let projects = session
        .projects()
        .iter()
        .map(|project| ProjectItem {
            id: project.id.clone(),
            name: project.name.clone(),
            is_current: session.current_project_id() == Some(project.id.as_str()),
        })
        .collect();

    let Some(project) = session.current_project() else {
        let mut snapshot = PlannerSnapshot::failure("No active project.");
        snapshot.ok = true;
        snapshot.projects = projects;
        return snapshot;
    };

    PlannerSnapshot {
        ok: true,
        message: format!("Loaded {} task(s).", project.tasks.len()),
        projects,
        project_id: Some(project.id.clone()),
        project_name: project.name.clone(),
        start_date: project.start_date.format(DATE_FORMAT).to_string(),
        tasks: project.tasks.iter().map(to_task_item).collect(),
        dependencies: project
            .dependencies
            .iter()
            .map(|dependency| DependencyItem {
                from: dependency.from,
                to: dependency.to,
            })
            .collect(),
        camera_x: project.camera.x,
        camera_y: project.camera.y,
        zoom: project.zoom,
    }
}

fn to_task_item(task: &Task) -> TaskItem {
    TaskItem {
        id: task.id,
        name: task.name.clone(),
        description: task.description.clone(),
        duration_days: task.duration_days,
        is_done_by_user: task.is_done_by_user,
        status: task.status.as_str().to_string(),
        x: task.x,
        y: task.y,
    }
}

fn to_schedule_item(row: &ScheduleRow) -> ScheduleItem {
    ScheduleItem {
        task_id: row.task_id,
        name: row.name.clone(),
        start_date: row.start_date().format(DATE_FORMAT).to_string(),
        end_date: row.end_date().format(DATE_FORMAT).to_string(),
        percent_complete: row.percent_complete,
        predecessor_ids: row.predecessor_ids.clone(),
    }
}
