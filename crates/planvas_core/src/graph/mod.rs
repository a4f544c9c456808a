//! Dependency graph engine for one project.
//!
//! # Responsibility
//! - Guard graph mutations (task insert/remove, edge insert/remove).
//! - Derive task statuses and layout ranks from the dependency set.
//!
//! # Invariants
//! - Rejected mutations leave the project untouched.
//! - The dependency set stays acyclic; cycles are refused at insertion time,
//!   never repaired afterwards.
//! - Mutations never recompute statuses on their own. Callers must run
//!   [`recompute_statuses`] before reading derived state.

use crate::model::project::{Dependency, Project};
use crate::model::task::{Task, TaskId, TaskValidationError};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

mod cycle;
mod rank;
mod status;

pub use cycle::{is_acyclic, would_create_cycle};
pub use rank::{calculate_ranks, RankMap};
pub use status::{recompute_statuses, uncheck_dependents};

pub type GraphResult<T> = Result<T, GraphError>;

/// Refusal reasons for graph mutations and graph validation.
#[derive(Debug, Clone, PartialEq)]
pub enum GraphError {
    /// Task id does not resolve inside the project.
    TaskNotFound(TaskId),
    /// Edge from a task to itself.
    SelfDependency(TaskId),
    /// Edge already present.
    DuplicateDependency { from: TaskId, to: TaskId },
    /// Edge would close a cycle.
    CycleDetected { from: TaskId, to: TaskId },
    /// Stored graph already contains a cycle.
    CyclicGraph,
    /// Task id already used in the project.
    DuplicateTaskId(TaskId),
    /// Task name already used in the project (case-insensitive).
    DuplicateTaskName(String),
    /// Task fields failed validation.
    InvalidTask(TaskValidationError),
}

impl Display for GraphError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TaskNotFound(id) => write!(f, "task not found: {id}"),
            Self::SelfDependency(id) => write!(f, "task {id} cannot depend on itself"),
            Self::DuplicateDependency { from, to } => {
                write!(f, "dependency {from} -> {to} already exists")
            }
            Self::CycleDetected { from, to } => {
                write!(f, "dependency {from} -> {to} would create a cycle")
            }
            Self::CyclicGraph => write!(f, "dependency graph contains a cycle"),
            Self::DuplicateTaskId(id) => write!(f, "task id already exists: {id}"),
            Self::DuplicateTaskName(name) => {
                write!(f, "a task named `{name}` already exists in this project")
            }
            Self::InvalidTask(err) => write!(f, "{err}"),
        }
    }
}

impl Error for GraphError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidTask(err) => Some(err),
            _ => None,
        }
    }
}

impl From<TaskValidationError> for GraphError {
    fn from(value: TaskValidationError) -> Self {
        Self::InvalidTask(value)
    }
}

/// Inserts a task after validating its fields, id and name.
pub fn add_task(project: &mut Project, task: Task) -> GraphResult<()> {
    task.validate()?;
    if project.contains_task(task.id) {
        return Err(GraphError::DuplicateTaskId(task.id));
    }
    ensure_unique_name(project, &task.name, None)?;
    project.tasks.push(task);
    Ok(())
}

/// Rejects `name` when another task (other than `except`) already uses it.
pub fn ensure_unique_name(
    project: &Project,
    name: &str,
    except: Option<TaskId>,
) -> GraphResult<()> {
    let clash = project
        .tasks
        .iter()
        .any(|task| Some(task.id) != except && task.has_name(name));
    if clash {
        return Err(GraphError::DuplicateTaskName(name.trim().to_string()));
    }
    Ok(())
}

/// Removes a task and every dependency incident to it.
///
/// Returns `false` when the task did not exist (no-op).
pub fn remove_task(project: &mut Project, task_id: TaskId) -> bool {
    let before = project.tasks.len();
    project.tasks.retain(|task| task.id != task_id);
    project
        .dependencies
        .retain(|dependency| !dependency.touches(task_id));
    project.tasks.len() != before
}

/// Appends the edge `from -> to` after every guard passes.
///
/// # Errors
/// - `SelfDependency` when `from == to`.
/// - `TaskNotFound` when either endpoint is unknown.
/// - `DuplicateDependency` when the edge exists.
/// - `CycleDetected` when `from` is reachable from `to`.
pub fn add_dependency(project: &mut Project, from: TaskId, to: TaskId) -> GraphResult<()> {
    if from == to {
        return Err(GraphError::SelfDependency(from));
    }
    for id in [from, to] {
        if !project.contains_task(id) {
            return Err(GraphError::TaskNotFound(id));
        }
    }
    if project.has_dependency(from, to) {
        return Err(GraphError::DuplicateDependency { from, to });
    }
    if would_create_cycle(project, from, to) {
        return Err(GraphError::CycleDetected { from, to });
    }

    project.dependencies.push(Dependency::new(from, to));
    Ok(())
}

/// Removes the edge `from -> to`. Returns `false` when it did not exist.
pub fn remove_dependency(project: &mut Project, from: TaskId, to: TaskId) -> bool {
    let before = project.dependencies.len();
    project
        .dependencies
        .retain(|dependency| !(dependency.from == from && dependency.to == to));
    project.dependencies.len() != before
}

/// Checks every structural invariant of a project loaded from outside.
///
/// Used by persistence to decide whether stored data can be trusted.
pub fn validate_project(project: &Project) -> GraphResult<()> {
    let mut ids = HashSet::new();
    for task in &project.tasks {
        task.validate()?;
        if !ids.insert(task.id) {
            return Err(GraphError::DuplicateTaskId(task.id));
        }
        ensure_unique_name(project, &task.name, Some(task.id))?;
    }

    let mut edges = HashSet::new();
    for dependency in &project.dependencies {
        if dependency.from == dependency.to {
            return Err(GraphError::SelfDependency(dependency.from));
        }
        for id in [dependency.from, dependency.to] {
            if !ids.contains(&id) {
                return Err(GraphError::TaskNotFound(id));
            }
        }
        if !edges.insert(*dependency) {
            return Err(GraphError::DuplicateDependency {
                from: dependency.from,
                to: dependency.to,
            });
        }
    }

    if !is_acyclic(project) {
        return Err(GraphError::CyclicGraph);
    }
    Ok(())
}
