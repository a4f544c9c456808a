//! Project aggregate.
//!
//! # Responsibility
//! - Own the task set, the dependency set and the schedule anchor date.
//! - Carry canvas view state alongside the graph without letting it affect
//!   scheduling.
//!
//! # Invariants
//! - Task ids are unique within a project.
//! - Dependencies are unique `(from, to)` pairs forming an acyclic graph.
//!   Graph mutations go through `crate::graph` which enforces this.

use crate::config::{DEFAULT_CAMERA_X, DEFAULT_CAMERA_Y, DEFAULT_PROJECT_NAME, DEFAULT_ZOOM};
use crate::model::task::{Task, TaskId};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable project identifier (`proj_<uuid>` for projects created here).
pub type ProjectId = String;

/// Directed precedence constraint: `from` must be done before `to` starts.
///
/// Serialized as a two-element array `[from, to]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "(TaskId, TaskId)", into = "(TaskId, TaskId)")]
pub struct Dependency {
    pub from: TaskId,
    pub to: TaskId,
}

impl Dependency {
    pub fn new(from: TaskId, to: TaskId) -> Self {
        Self { from, to }
    }

    /// Returns whether this edge touches `task_id` in either direction.
    pub fn touches(&self, task_id: TaskId) -> bool {
        self.from == task_id || self.to == task_id
    }
}

impl From<(TaskId, TaskId)> for Dependency {
    fn from((from, to): (TaskId, TaskId)) -> Self {
        Self { from, to }
    }
}

impl From<Dependency> for (TaskId, TaskId) {
    fn from(value: Dependency) -> Self {
        (value.from, value.to)
    }
}

/// Canvas pan offset in screen units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    pub x: f64,
    pub y: f64,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            x: DEFAULT_CAMERA_X,
            y: DEFAULT_CAMERA_Y,
        }
    }
}

fn default_zoom() -> f64 {
    DEFAULT_ZOOM
}

/// One planning project: tasks, dependencies, start date and view state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub dependencies: Vec<Dependency>,
    /// Calendar date the schedule is anchored to (midnight, no timezone).
    pub start_date: NaiveDate,
    #[serde(default)]
    pub camera: Camera,
    #[serde(default = "default_zoom")]
    pub zoom: f64,
}

impl Project {
    /// Creates an empty project with a generated id.
    pub fn new(name: impl Into<String>, start_date: NaiveDate) -> Self {
        Self::with_id(generate_project_id(), name, start_date)
    }

    /// Creates an empty project with a caller-provided id.
    pub fn with_id(id: impl Into<ProjectId>, name: impl Into<String>, start_date: NaiveDate) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            tasks: Vec::new(),
            dependencies: Vec::new(),
            start_date,
            camera: Camera::default(),
            zoom: DEFAULT_ZOOM,
        }
    }

    /// Builds the first-run sample project.
    ///
    /// Contains the four-task diamond `1 -> 2, 1 -> 3, 2 -> 4, 3 -> 4` with
    /// task 1 marked done. Statuses are left `Pending`; callers recompute.
    pub fn sample(start_date: NaiveDate) -> Self {
        let mut project = Self::new(DEFAULT_PROJECT_NAME, start_date);
        let seeds = [
            (1, "Plan Project", "Define scope.", 5.0, true, 100.0, 250.0),
            (2, "Design UI/UX", "Create mockups.", 8.0, false, 350.0, 150.0),
            (3, "Setup Database", "Configure schema.", 4.0, false, 350.0, 350.0),
            (4, "Develop Frontend", "Build UI.", 12.0, false, 600.0, 250.0),
        ];
        for (id, name, description, days, done, x, y) in seeds {
            project.tasks.push(Task {
                id,
                name: name.to_string(),
                description: description.to_string(),
                duration_days: days,
                is_done_by_user: done,
                status: Default::default(),
                x,
                y,
            });
        }
        project.dependencies = vec![
            Dependency::new(1, 2),
            Dependency::new(1, 3),
            Dependency::new(2, 4),
            Dependency::new(3, 4),
        ];
        project
    }

    /// Midnight of `start_date`, the earliest instant any task may start.
    pub fn start_instant(&self) -> NaiveDateTime {
        self.start_date.and_time(NaiveTime::MIN)
    }

    pub fn task(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    pub fn task_mut(&mut self, id: TaskId) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|task| task.id == id)
    }

    pub fn contains_task(&self, id: TaskId) -> bool {
        self.task(id).is_some()
    }

    pub fn has_dependency(&self, from: TaskId, to: TaskId) -> bool {
        self.dependencies
            .iter()
            .any(|dependency| dependency.from == from && dependency.to == to)
    }

    /// Direct predecessors of `id`, in dependency insertion order.
    pub fn predecessors(&self, id: TaskId) -> impl Iterator<Item = TaskId> + '_ {
        self.dependencies
            .iter()
            .filter(move |dependency| dependency.to == id)
            .map(|dependency| dependency.from)
    }

    /// Direct successors of `id`, in dependency insertion order.
    pub fn successors(&self, id: TaskId) -> impl Iterator<Item = TaskId> + '_ {
        self.dependencies
            .iter()
            .filter(move |dependency| dependency.from == id)
            .map(|dependency| dependency.to)
    }
}

fn generate_project_id() -> ProjectId {
    format!("proj_{}", Uuid::new_v4().simple())
}
