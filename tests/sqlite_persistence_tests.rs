#![cfg(feature = "sqlite")]

use chrono::NaiveDate;
use project_timeline::{
    PlanStore, PlanningInput, ProjectPlan, SqlitePlanStore, StepSchedule, VacationZone,
    WorkflowStep,
};
use tempfile::NamedTempFile;

fn d(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn sample_plan() -> ProjectPlan {
    let mut planning = PlanningInput::new(d(2025, 9, 1), d(2026, 1, 30), [4.0, 6.0, 2.0, 8.0, 3.0]);
    planning.vacation_zone = VacationZone::C;
    let mut plan = ProjectPlan::from_parts(planning, StepSchedule::default()).unwrap();
    plan.set_submission_date(WorkflowStep::TestSheet, Some(d(2025, 11, 14)))
        .unwrap();
    plan
}

#[test]
fn sqlite_round_trip() {
    let store = SqlitePlanStore::in_memory().unwrap();
    let plan = sample_plan();
    store.save_plan(1, &plan).unwrap();

    let loaded = store.load_plan(1).unwrap().expect("plan stored");
    assert_eq!(loaded, plan);
    assert_eq!(
        loaded.steps().config(WorkflowStep::TestSheet).unwrap().submission_date,
        Some(d(2025, 11, 14))
    );
}

#[test]
fn saving_twice_overwrites_the_plan() {
    let store = SqlitePlanStore::in_memory().unwrap();
    let mut plan = sample_plan();
    store.save_plan(3, &plan).unwrap();

    plan.set_project_name("Renamed");
    plan.set_step_enabled(WorkflowStep::NeedsExpression, false)
        .unwrap();
    store.save_plan(3, &plan).unwrap();

    let loaded = store.load_plan(3).unwrap().unwrap();
    assert_eq!(loaded.planning().project_name, "Renamed");
    assert!(
        !loaded
            .steps()
            .config(WorkflowStep::NeedsExpression)
            .unwrap()
            .enabled
    );
}

#[test]
fn plans_are_isolated_by_id() {
    let store = SqlitePlanStore::in_memory().unwrap();
    store.save_plan(1, &sample_plan()).unwrap();
    assert_eq!(store.load_plan(2).unwrap(), None);
    assert!(!store.delete_plan(2).unwrap());
    assert!(store.delete_plan(1).unwrap());
    assert_eq!(store.load_plan(1).unwrap(), None);
}

#[test]
fn sqlite_file_survives_reopen() {
    let file = NamedTempFile::new().unwrap();
    {
        let store = SqlitePlanStore::new(file.path()).unwrap();
        store.save_plan(5, &sample_plan()).unwrap();
    }
    let store = SqlitePlanStore::new(file.path()).unwrap();
    assert_eq!(store.load_plan(5).unwrap(), Some(sample_plan()));
}
