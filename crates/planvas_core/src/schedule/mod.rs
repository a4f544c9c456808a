//! Earliest-start scheduler.
//!
//! # Responsibility
//! - Turn ranks, durations and statuses into start/end instants per task.
//! - Optionally honor a Monday-to-Friday work week.
//!
//! # Invariants
//! - Every predecessor is placed before its dependents.
//! - Output is a read-only view; tasks are never mutated.
//! - Equal-rank tasks are placed in ascending id order.

pub mod calendar;
pub mod export;

use crate::graph::calculate_ranks;
use crate::model::project::Project;
use crate::model::task::{Task, TaskId, TaskStatus};
use calendar::{business_end, calendar_end, skip_weekend};
use chrono::{Duration, NaiveDate, NaiveDateTime};
use log::warn;
use std::collections::HashMap;

/// Placement of one task on the project calendar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleRow {
    pub task_id: TaskId,
    pub name: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    /// 100 when the task is done, else 0.
    pub percent_complete: u8,
    /// Direct predecessor ids joined by `,` in dependency order.
    pub predecessor_ids: String,
}

impl ScheduleRow {
    pub fn start_date(&self) -> NaiveDate {
        self.start.date()
    }

    pub fn end_date(&self) -> NaiveDate {
        self.end.date()
    }

    pub fn predecessor_id_list(&self) -> Vec<TaskId> {
        self.predecessor_ids
            .split(',')
            .filter_map(|id| id.trim().parse().ok())
            .collect()
    }
}

/// Computes the schedule of every task in `project`.
///
/// Tasks are placed in ascending `(rank, id)` order: a task starts at the
/// latest predecessor end (or the project start). With `exclude_weekends`
/// a dependent starts one day after that instant and weekend starts slide to
/// Monday. Rows come back in the project's task order.
///
/// Statuses must be current; run `recompute_statuses` first. A task whose
/// dates leave the representable calendar range (or that depends on such a
/// task) is left out of the result.
pub fn calculate_schedule(project: &Project, exclude_weekends: bool) -> Vec<ScheduleRow> {
    if project.tasks.is_empty() {
        return Vec::new();
    }

    let ranks = calculate_ranks(project);
    let mut order: Vec<_> = project.tasks.iter().collect();
    order.sort_by_key(|task| (ranks.get(&task.id).copied().unwrap_or(0), task.id));

    let project_start = project.start_instant();
    let mut placed: HashMap<TaskId, (NaiveDateTime, NaiveDateTime)> = HashMap::new();

    for task in order {
        match place_task(project, task, &placed, project_start, exclude_weekends) {
            Some(span) => {
                placed.insert(task.id, span);
            }
            None => warn!(
                "event=schedule_place module=schedule status=skipped project_id={} task_id={} reason=out_of_range",
                project.id, task.id
            ),
        }
    }

    project
        .tasks
        .iter()
        .filter_map(|task| {
            let (start, end) = placed.get(&task.id).copied()?;
            Some(ScheduleRow {
                task_id: task.id,
                name: task.name.clone(),
                start,
                end,
                percent_complete: if task.status == TaskStatus::Done { 100 } else { 0 },
                predecessor_ids: project
                    .predecessors(task.id)
                    .map(|id| id.to_string())
                    .collect::<Vec<_>>()
                    .join(","),
            })
        })
        .collect()
}

/// Start and end of one task, or `None` when a predecessor is unplaced or the
/// dates overflow.
fn place_task(
    project: &Project,
    task: &Task,
    placed: &HashMap<TaskId, (NaiveDateTime, NaiveDateTime)>,
    project_start: NaiveDateTime,
    exclude_weekends: bool,
) -> Option<(NaiveDateTime, NaiveDateTime)> {
    let mut has_predecessor = false;
    let mut latest_end = project_start;
    for pred in project.predecessors(task.id) {
        if !project.contains_task(pred) {
            continue;
        }
        has_predecessor = true;
        let (_, end) = placed.get(&pred)?;
        latest_end = latest_end.max(*end);
    }

    if exclude_weekends {
        let mut start = latest_end;
        if has_predecessor {
            start = start.checked_add_signed(Duration::days(1))?;
        }
        let start = skip_weekend(start)?;
        Some((start, business_end(start, task.duration_days)?))
    } else {
        Some((latest_end, calendar_end(latest_end, task.duration_days)?))
    }
}

#[cfg(test)]
mod tests {
    use super::calculate_schedule;
    use crate::graph::recompute_statuses;
    use crate::model::project::Project;
    use crate::model::task::Task;
    use chrono::NaiveDate;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn single_task_project(days: f64) -> Project {
        let mut project = Project::new("One", date(2025, 10, 17));
        project.tasks.push(Task::new(1, "A", "", days, false).unwrap());
        project
    }

    #[test]
    fn friday_start_excluding_weekends_ends_tuesday() {
        let rows = calculate_schedule(&single_task_project(3.0), true);
        assert_eq!(rows[0].start_date(), date(2025, 10, 17));
        assert_eq!(rows[0].end_date(), date(2025, 10, 21));
    }

    #[test]
    fn friday_start_including_weekends_ends_sunday() {
        let rows = calculate_schedule(&single_task_project(3.0), false);
        assert_eq!(rows[0].start_date(), date(2025, 10, 17));
        assert_eq!(rows[0].end_date(), date(2025, 10, 19));
    }

    #[test]
    fn weekend_project_start_moves_to_monday() {
        let mut project = single_task_project(1.0);
        project.start_date = date(2025, 10, 18);
        let rows = calculate_schedule(&project, true);
        assert_eq!(rows[0].start_date(), date(2025, 10, 20));
        assert_eq!(rows[0].end_date(), date(2025, 10, 20));
    }

    #[test]
    fn diamond_successors_start_after_latest_predecessor() {
        let mut project = Project::sample(date(2025, 10, 13));
        recompute_statuses(&mut project);
        let rows = calculate_schedule(&project, true);
        let row = |id: i64| rows.iter().find(|row| row.task_id == id).unwrap();

        // Plan Project: Mon 13 .. Fri 17 (5 days).
        assert_eq!(row(1).end_date(), date(2025, 10, 17));
        assert_eq!(row(1).percent_complete, 100);
        // Design: starts Mon 20, 8 business days -> Wed 29.
        assert_eq!(row(2).start_date(), date(2025, 10, 20));
        assert_eq!(row(2).end_date(), date(2025, 10, 29));
        // Database: starts Mon 20, 4 business days -> Thu 23.
        assert_eq!(row(3).end_date(), date(2025, 10, 23));
        // Frontend waits for the later of the two.
        assert_eq!(row(4).start_date(), date(2025, 10, 30));
        assert_eq!(row(4).predecessor_ids, "2,3");
        assert_eq!(row(4).predecessor_id_list(), vec![2, 3]);
        assert_eq!(row(4).percent_complete, 0);
    }

    #[test]
    fn rows_keep_project_task_order() {
        let mut project = Project::sample(date(2025, 10, 13));
        project.tasks.reverse();
        let rows = calculate_schedule(&project, false);
        let ids: Vec<_> = rows.iter().map(|row| row.task_id).collect();
        assert_eq!(ids, vec![4, 3, 2, 1]);
    }

    #[test]
    fn empty_project_has_empty_schedule() {
        let project = Project::new("Empty", date(2025, 10, 13));
        assert!(calculate_schedule(&project, true).is_empty());
    }
}
