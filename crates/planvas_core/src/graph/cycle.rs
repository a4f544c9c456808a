use crate::model::project::Project;
use crate::model::task::TaskId;
use std::collections::{HashMap, HashSet};

/// Returns whether adding `from -> to` would close a cycle.
///
/// Searches the graph as it exists now, starting at `to`; the edge is illegal
/// when `from` is reachable. Each node is visited at most once. Pure.
pub fn would_create_cycle(project: &Project, from: TaskId, to: TaskId) -> bool {
    let successors = successor_index(project);
    let mut stack = vec![to];
    let mut visited = HashSet::from([to]);

    while let Some(current) = stack.pop() {
        if current == from {
            return true;
        }
        let Some(next) = successors.get(&current) else {
            continue;
        };
        for &neighbor in next {
            if visited.insert(neighbor) {
                stack.push(neighbor);
            }
        }
    }
    false
}

/// Full-graph acyclicity check (Kahn's algorithm).
///
/// Only edges whose endpoints both resolve are considered.
pub fn is_acyclic(project: &Project) -> bool {
    let ids: HashSet<TaskId> = project.tasks.iter().map(|task| task.id).collect();
    let mut in_degree: HashMap<TaskId, usize> = ids.iter().map(|&id| (id, 0)).collect();
    let mut successors: HashMap<TaskId, Vec<TaskId>> = HashMap::new();
    for dependency in &project.dependencies {
        if !ids.contains(&dependency.from) || !ids.contains(&dependency.to) {
            continue;
        }
        successors.entry(dependency.from).or_default().push(dependency.to);
        *in_degree.entry(dependency.to).or_default() += 1;
    }

    let mut ready: Vec<TaskId> = in_degree
        .iter()
        .filter(|(_, degree)| **degree == 0)
        .map(|(id, _)| *id)
        .collect();
    let mut processed = 0;
    while let Some(id) = ready.pop() {
        processed += 1;
        for next in successors.get(&id).into_iter().flatten() {
            if let Some(degree) = in_degree.get_mut(next) {
                *degree -= 1;
                if *degree == 0 {
                    ready.push(*next);
                }
            }
        }
    }
    processed == ids.len()
}

fn successor_index(project: &Project) -> HashMap<TaskId, Vec<TaskId>> {
    let mut index: HashMap<TaskId, Vec<TaskId>> = HashMap::new();
    for dependency in &project.dependencies {
        index.entry(dependency.from).or_default().push(dependency.to);
    }
    index
}
