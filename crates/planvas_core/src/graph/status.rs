use super::rank::calculate_ranks;
use crate::model::project::Project;
use crate::model::task::{TaskId, TaskStatus};
use log::error;
use std::collections::{HashMap, HashSet};

/// Re-derives every task status by fixpoint iteration.
///
/// Per pass, a task is `Blocked` when any direct predecessor is not `Done`
/// (blocked tasks lose `is_done_by_user`), otherwise `Done` or `Pending`
/// from the user flag. Stops after a pass with no change, bounded by
/// `task_count + 1` passes. Tasks are visited in rank order so a pass never
/// reads a predecessor status that the same pass has yet to refresh.
///
/// Returns the number of passes performed.
pub fn recompute_statuses(project: &mut Project) -> usize {
    let index: HashMap<TaskId, usize> = project
        .tasks
        .iter()
        .enumerate()
        .map(|(position, task)| (task.id, position))
        .collect();

    let mut predecessors: HashMap<usize, Vec<usize>> = HashMap::new();
    for dependency in &project.dependencies {
        if let (Some(&from), Some(&to)) = (index.get(&dependency.from), index.get(&dependency.to)) {
            predecessors.entry(to).or_default().push(from);
        }
    }

    let ranks = calculate_ranks(project);
    let mut order: Vec<usize> = (0..project.tasks.len()).collect();
    order.sort_by_key(|&position| {
        let id = project.tasks[position].id;
        (ranks.get(&id).copied().unwrap_or(0), id)
    });

    let max_passes = project.tasks.len() + 1;
    for pass in 1..=max_passes {
        let mut changed = false;
        for &position in &order {
            let blocked = predecessors.get(&position).is_some_and(|preds| {
                preds
                    .iter()
                    .any(|&pred| project.tasks[pred].status != TaskStatus::Done)
            });

            let task = &mut project.tasks[position];
            let next = if blocked {
                if task.is_done_by_user {
                    task.is_done_by_user = false;
                    changed = true;
                }
                TaskStatus::Blocked
            } else if task.is_done_by_user {
                TaskStatus::Done
            } else {
                TaskStatus::Pending
            };

            if task.status != next {
                task.status = next;
                changed = true;
            }
        }
        if !changed {
            return pass;
        }
    }

    error!(
        "event=status_recompute module=graph status=error error_code=no_fixpoint project_id={} passes={}",
        project.id, max_passes
    );
    max_passes
}

/// Clears `is_done_by_user` on every done task downstream of `task_id`.
///
/// Walks successor edges with an explicit worklist; each task is visited at
/// most once and only tasks that were marked done are followed further.
/// Returns the ids that were unmarked, in visit order.
pub fn uncheck_dependents(project: &mut Project, task_id: TaskId) -> Vec<TaskId> {
    let mut unchecked = Vec::new();
    let mut visited = HashSet::from([task_id]);
    let mut worklist = vec![task_id];
    while let Some(current) = worklist.pop() {
        let next_ids: Vec<TaskId> = project.successors(current).collect();
        for next in next_ids {
            if !visited.insert(next) {
                continue;
            }
            let Some(task) = project.task_mut(next) else {
                continue;
            };
            if task.is_done_by_user {
                task.is_done_by_user = false;
                unchecked.push(next);
                worklist.push(next);
            }
        }
    }
    unchecked
}
