use chrono::NaiveDate;
use planvas_core::graph::{add_dependency, is_acyclic, remove_task};
use planvas_core::{
    calculate_ranks, recompute_statuses, would_create_cycle, Dependency, GraphError,
    PlannerSession, Project, SessionError, Task, TaskStatus,
};

fn start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 10, 17).unwrap()
}

fn diamond_session() -> PlannerSession {
    PlannerSession::with_default_project(start())
}

fn grid_project(size: i64) -> Project {
    let mut project = Project::new("Grid", start());
    for id in 1..=size {
        project
            .tasks
            .push(Task::new(id, format!("Task {id}"), "", 1.0, false).unwrap());
    }
    project
}

#[test]
fn accepted_edges_never_form_a_cycle() {
    let mut project = grid_project(8);
    let mut accepted = 0;
    for from in 1..=8 {
        for to in 1..=8 {
            // Try both directions in an interleaved order.
            let (a, b) = if (from + to) % 2 == 0 { (from, to) } else { (to, from) };
            if add_dependency(&mut project, a, b).is_ok() {
                accepted += 1;
                assert!(is_acyclic(&project), "edge {a} -> {b} closed a cycle");
            }
        }
    }
    assert!(accepted > 0);
    // The reverse of an accepted edge is always refused.
    for dependency in &project.dependencies {
        assert!(would_create_cycle(&project, dependency.to, dependency.from));
    }
}

#[test]
fn recompute_is_idempotent() {
    let mut session = diamond_session();
    session.set_completion(2, true).unwrap();
    let first: Vec<_> = session
        .tasks()
        .iter()
        .map(|task| (task.id, task.status, task.is_done_by_user))
        .collect();
    session.recompute_statuses();
    let second: Vec<_> = session
        .tasks()
        .iter()
        .map(|task| (task.id, task.status, task.is_done_by_user))
        .collect();
    assert_eq!(first, second);
}

#[test]
fn blocked_tasks_are_never_marked_done() {
    let mut project = Project::sample(start());
    for task in &mut project.tasks {
        task.is_done_by_user = true;
    }
    project.task_mut(1).unwrap().is_done_by_user = false;
    recompute_statuses(&mut project);

    for task in &project.tasks {
        if task.status == TaskStatus::Blocked {
            assert!(!task.is_done_by_user, "task {} kept its done flag", task.id);
        }
        if task.status == TaskStatus::Done {
            assert!(task.is_done_by_user);
        }
    }
}

#[test]
fn unchecking_the_root_unchecks_the_whole_diamond() {
    let mut session = diamond_session();
    session.set_completion(1, true).unwrap();
    session.set_completion(2, true).unwrap();
    session.set_completion(4, false).unwrap();
    session.set_completion(3, true).unwrap();
    session.set_completion(4, true).unwrap();

    let status = |session: &PlannerSession, id: i64| {
        session.tasks().iter().find(|task| task.id == id).unwrap().status
    };
    assert_eq!(status(&session, 4), TaskStatus::Done);

    session.set_completion(1, false).unwrap();
    session.recompute_statuses();

    let done_flag = |id: i64| {
        session
            .tasks()
            .iter()
            .find(|task| task.id == id)
            .unwrap()
            .is_done_by_user
    };
    assert!(!done_flag(1));
    assert!(!done_flag(2));
    assert!(!done_flag(4));
}

#[test]
fn unchecking_only_touches_downstream_tasks() {
    let mut session = diamond_session();
    session.set_completion(2, true).unwrap();
    session.set_completion(3, true).unwrap();
    session.set_completion(2, false).unwrap();

    let task = |id: i64| session.tasks().iter().find(|task| task.id == id).unwrap();
    assert!(task(1).is_done_by_user);
    assert!(task(3).is_done_by_user);
    assert_eq!(task(3).status, TaskStatus::Done);
    assert_eq!(task(4).status, TaskStatus::Blocked);
}

#[test]
fn toggle_is_refused_while_blocked() {
    let mut session = diamond_session();
    assert_eq!(
        session.toggle_completion(4).unwrap_err(),
        SessionError::TaskBlocked(4)
    );
    assert!(!session.toggle_completion(1).unwrap());
    assert_eq!(session.tasks()[1].status, TaskStatus::Blocked);
}

#[test]
fn diamond_ranks() {
    let ranks = calculate_ranks(&Project::sample(start()));
    assert_eq!(ranks[&1], 0);
    assert_eq!(ranks[&2], 1);
    assert_eq!(ranks[&3], 1);
    assert_eq!(ranks[&4], 2);
}

#[test]
fn cycle_check_on_default_fixture() {
    let session = diamond_session();
    let project = session.current_project().unwrap();
    assert!(would_create_cycle(project, 4, 1));
    assert!(!would_create_cycle(project, 1, 4));
    assert!(!session.can_connect(4, 1));
    assert!(session.can_connect(2, 3));
    assert!(!session.can_connect(1, 2));
    assert!(!session.can_connect(3, 3));
}

#[test]
fn session_refuses_cycle_and_keeps_graph() {
    let mut session = diamond_session();
    let before = session.dependencies().to_vec();
    assert_eq!(
        session.add_dependency(4, 1).unwrap_err(),
        SessionError::Graph(GraphError::CycleDetected { from: 4, to: 1 })
    );
    assert_eq!(session.dependencies(), before.as_slice());

    session.add_dependency(2, 3).unwrap();
    assert!(session.dependencies().contains(&Dependency::new(2, 3)));
}

#[test]
fn removing_any_task_removes_its_edges() {
    for victim in 1..=4 {
        let mut project = Project::sample(start());
        remove_task(&mut project, victim);
        assert!(project.task(victim).is_none());
        assert!(project
            .dependencies
            .iter()
            .all(|dependency| dependency.from != victim && dependency.to != victim));
    }
}

#[test]
fn removing_a_blocker_unblocks_its_successor() {
    let mut session = diamond_session();
    session.set_completion(3, true).unwrap();
    assert!(session.remove_task(2));
    let frontend = session.tasks().iter().find(|task| task.id == 4).unwrap();
    assert_eq!(frontend.status, TaskStatus::Pending);
    assert!(!session.remove_task(2));
}
