use chrono::NaiveDate;
use planvas_core::{
    ExportError, GraphError, PlannerSession, ScheduleRow, SessionError, TaskUpdate,
};

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

fn row(rows: &[ScheduleRow], id: i64) -> &ScheduleRow {
    rows.iter().find(|row| row.task_id == id).unwrap()
}

#[test]
fn calendar_days_chain_without_gaps() {
    let session = PlannerSession::with_default_project(date(2025, 10, 13));
    let rows = session.schedule(false);

    assert_eq!(row(&rows, 1).start_date(), date(2025, 10, 13));
    assert_eq!(row(&rows, 1).end_date(), date(2025, 10, 17));
    // Successors start at the exact predecessor end instant.
    assert_eq!(row(&rows, 2).start, row(&rows, 1).end);
    assert_eq!(row(&rows, 2).end_date(), date(2025, 10, 25));
    assert_eq!(row(&rows, 3).end_date(), date(2025, 10, 21));
    assert_eq!(row(&rows, 4).start, row(&rows, 2).end);
    assert_eq!(row(&rows, 4).end_date(), date(2025, 11, 6));
}

#[test]
fn every_task_starts_after_its_predecessors() {
    let mut session = PlannerSession::with_default_project(date(2025, 10, 17));
    let extra = session.add_task("QA", "", 2.5, false).unwrap();
    session.add_dependency(4, extra).unwrap();
    session.add_dependency(3, extra).unwrap();

    for exclude_weekends in [false, true] {
        let rows = session.schedule(exclude_weekends);
        assert_eq!(rows.len(), 5);
        for dependency in session.dependencies() {
            let from = row(&rows, dependency.from);
            let to = row(&rows, dependency.to);
            assert!(
                to.start >= from.end,
                "{} starts before {} ends",
                to.name,
                from.name
            );
        }
    }
}

#[test]
fn business_schedule_never_starts_on_a_weekend() {
    let mut session = PlannerSession::with_default_project(date(2025, 10, 18));
    session.set_project_start_date(date(2025, 10, 19));
    let rows = session.schedule(true);
    for row in &rows {
        assert!(!planvas_core::schedule::calendar::is_weekend(row.start));
    }
    assert_eq!(row(&rows, 1).start_date(), date(2025, 10, 20));
}

#[test]
fn completion_is_reflected_in_percent_complete() {
    let mut session = PlannerSession::with_default_project(date(2025, 10, 13));
    session.set_completion(3, true).unwrap();
    let rows = session.schedule(true);
    assert_eq!(row(&rows, 1).percent_complete, 100);
    assert_eq!(row(&rows, 2).percent_complete, 0);
    assert_eq!(row(&rows, 3).percent_complete, 100);
}

#[test]
fn export_uses_project_name_and_schedule() {
    let mut session = PlannerSession::with_default_project(date(2025, 10, 13));
    session.rename_project("Q4 Launch, v2").unwrap();
    session.set_completion(2, true).unwrap();

    let export = session.export_csv(true).unwrap();
    assert_eq!(export.file_name, "q4_launch__v2_gantt_export.csv");

    let lines: Vec<_> = export.content.lines().collect();
    assert_eq!(lines.len(), 5);
    assert_eq!(lines[2], "Design UI/UX,2025-10-20,2025-10-29,8,Done,Plan Project");
    assert_eq!(lines[3], "Setup Database,2025-10-20,2025-10-23,4,Pending/Blocked,Plan Project");
}

#[test]
fn export_quotes_names_with_commas() {
    let mut session = PlannerSession::with_default_project(date(2025, 10, 13));
    let id = session.add_task("Review, sign off", "", 1.0, false).unwrap();
    session.add_dependency(4, id).unwrap();

    let export = session.export_csv(false).unwrap();
    let last = export.content.lines().last().unwrap();
    assert!(last.starts_with("\"Review, sign off\","));
    assert!(last.ends_with(",Develop Frontend"));
}

#[test]
fn export_of_empty_project_is_refused() {
    let mut session = PlannerSession::new();
    assert_eq!(session.export_csv(true).unwrap_err(), ExportError::EmptySchedule);

    session.create_project("Empty").unwrap();
    assert_eq!(session.export_csv(true).unwrap_err(), ExportError::EmptySchedule);
}

#[test]
fn oversized_durations_never_reach_the_scheduler() {
    let mut session = PlannerSession::with_default_project(date(2025, 10, 13));
    assert!(matches!(
        session.add_task("Huge", "", 1e9, false).unwrap_err(),
        SessionError::Graph(GraphError::InvalidTask(_))
    ));
    assert!(session
        .update_task(
            2,
            TaskUpdate {
                duration_days: Some(1e9),
                ..TaskUpdate::default()
            },
        )
        .is_err());

    assert_eq!(session.schedule(false).len(), 4);
    assert_eq!(session.schedule(true).len(), 4);
}

#[test]
fn tasks_past_the_calendar_range_are_left_out() {
    let mut session = PlannerSession::with_default_project(date(2025, 10, 13));
    session.set_project_start_date(NaiveDate::MAX - chrono::Duration::days(10));

    let ids: Vec<_> = session
        .schedule(false)
        .iter()
        .map(|row| row.task_id)
        .collect();
    // Design (8 days) would end past the last date; Frontend depends on it.
    assert_eq!(ids, vec![1, 3]);

    let business = session.schedule(true);
    assert!(business.iter().any(|row| row.task_id == 1));
    assert!(business.iter().all(|row| row.task_id != 4));
    assert!(session.export_csv(false).is_ok());
}
