use crate::model::project::Project;
use crate::model::task::TaskId;
use std::collections::BTreeMap;

/// Task id -> longest-path distance (in edges) from a task with no predecessors.
pub type RankMap = BTreeMap<TaskId, u32>;

/// Computes layout ranks: 0 without predecessors, else `1 + max(pred rank)`.
///
/// Iterates at most `task_count` passes; ranks only grow, so an acyclic graph
/// settles within that bound. Edges to unknown tasks are ignored.
pub fn calculate_ranks(project: &Project) -> RankMap {
    let mut ranks: RankMap = project.tasks.iter().map(|task| (task.id, 0)).collect();
    let edges: Vec<_> = project
        .dependencies
        .iter()
        .filter(|dependency| {
            ranks.contains_key(&dependency.from) && ranks.contains_key(&dependency.to)
        })
        .copied()
        .collect();

    for _ in 0..project.tasks.len() {
        let mut changed = false;
        for task in &project.tasks {
            let best = edges
                .iter()
                .filter(|dependency| dependency.to == task.id)
                .filter_map(|dependency| ranks.get(&dependency.from))
                .max()
                .map(|rank| rank + 1);
            if let Some(rank) = best {
                if ranks.get(&task.id) != Some(&rank) {
                    ranks.insert(task.id, rank);
                    changed = true;
                }
            }
        }
        if !changed {
            break;
        }
    }
    ranks
}

#[cfg(test)]
mod tests {
    use super::calculate_ranks;
    use crate::model::project::{Dependency, Project};
    use crate::model::task::Task;
    use chrono::NaiveDate;

    #[test]
    fn diamond_ranks_follow_longest_path() {
        let project = Project::sample(NaiveDate::from_ymd_opt(2025, 10, 17).unwrap());
        let ranks = calculate_ranks(&project);
        assert_eq!(ranks[&1], 0);
        assert_eq!(ranks[&2], 1);
        assert_eq!(ranks[&3], 1);
        assert_eq!(ranks[&4], 2);
    }

    #[test]
    fn reverse_ordered_chain_still_converges() {
        let mut project = Project::new("Chain", NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
        for id in (1..=5).rev() {
            project
                .tasks
                .push(Task::new(id, format!("T{id}"), "", 1.0, false).unwrap());
        }
        for id in 1..5 {
            project.dependencies.push(Dependency::new(id, id + 1));
        }
        let ranks = calculate_ranks(&project);
        assert_eq!(ranks.values().copied().collect::<Vec<_>>(), vec![0, 1, 2, 3, 4]);
    }
}
