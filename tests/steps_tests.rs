use chrono::NaiveDate;
use project_timeline::{
    DateSource, PlanningInput, ProjectPlan, StepConfig, StepSchedule, WorkflowStep,
    compute_milestones,
};

fn d(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn planned() -> ProjectPlan {
    let planning = PlanningInput::new(d(2025, 9, 1), d(2025, 12, 19), [2.0, 3.0, 1.0, 2.0, 2.0]);
    ProjectPlan::from_parts(planning, StepSchedule::default()).unwrap()
}

#[test]
fn step_numbers_round_trip() {
    for step in WorkflowStep::ALL {
        assert_eq!(WorkflowStep::from_number(step.number()), Some(step));
    }
    assert_eq!(WorkflowStep::from_number(0), None);
    assert_eq!(WorkflowStep::from_number(9), None);
    assert_eq!("7".parse::<WorkflowStep>(), Ok(WorkflowStep::NeedsExpression));
    assert!(WorkflowStep::Logbook.is_optional());
    assert!(!WorkflowStep::Report.is_optional());
}

#[test]
fn projected_dates_prefill_unset_steps() {
    let plan = planned();
    let resolved = plan.resolved_steps().unwrap();
    let steps: Vec<u8> = resolved.iter().map(|r| r.step.number()).collect();
    assert_eq!(steps, vec![4, 5, 6, 7, 8]);
    assert!(resolved.iter().all(|r| r.source == DateSource::Projected));
    assert_eq!(resolved[0].submission_date, Some(d(2025, 10, 25)));
    assert_eq!(resolved[2].submission_date, Some(d(2025, 12, 19)));
}

#[test]
fn explicit_submission_date_wins_over_projection() {
    let mut plan = planned();
    plan.set_submission_date(WorkflowStep::Specifications, Some(d(2025, 10, 1)))
        .unwrap();

    let resolved = plan.resolved_steps().unwrap();
    assert_eq!(resolved[0].submission_date, Some(d(2025, 10, 1)));
    assert_eq!(resolved[0].source, DateSource::Explicit);

    // A later change to the planning moves projections but not the explicit date.
    plan.set_all_task_hours([1.0, 8.0, 1.0, 1.0, 1.0]);
    let resolved = plan.resolved_steps().unwrap();
    assert_eq!(resolved[0].submission_date, Some(d(2025, 10, 1)));
    assert_eq!(resolved[0].source, DateSource::Explicit);
    assert_ne!(resolved[1].submission_date, Some(d(2025, 11, 5)));
}

#[test]
fn clearing_the_explicit_date_restores_the_projection() {
    let mut plan = planned();
    plan.set_submission_date(WorkflowStep::TestSheet, Some(d(2025, 11, 20)))
        .unwrap();
    plan.set_submission_date(WorkflowStep::TestSheet, None).unwrap();
    let resolved = plan.resolved_steps().unwrap();
    assert_eq!(resolved[1].submission_date, Some(d(2025, 11, 5)));
    assert_eq!(resolved[1].source, DateSource::Projected);
}

#[test]
fn disabled_steps_resolve_without_dates() {
    let mut plan = planned();
    plan.set_step_enabled(WorkflowStep::Logbook, false).unwrap();
    plan.set_deadline_date(WorkflowStep::Logbook, Some(d(2025, 12, 1)))
        .unwrap();
    let resolved = plan.resolved_steps().unwrap();
    let logbook = resolved.last().unwrap();
    assert!(!logbook.enabled);
    assert_eq!(logbook.source, DateSource::Disabled);
    assert_eq!(logbook.submission_date, None);
    assert_eq!(logbook.deadline_date, None);
    assert_eq!(plan.steps().enabled_step_count(), 7);
}

#[test]
fn steps_without_projection_are_unset() {
    let plan = ProjectPlan::new();
    let resolved = plan.resolved_steps().unwrap();
    assert!(resolved.iter().all(|r| r.source == DateSource::Unset));
    assert!(resolved.iter().all(|r| r.submission_date.is_none()));
}

#[test]
fn deadline_before_submission_is_rejected() {
    let mut schedule = StepSchedule::default();
    let config = StepConfig {
        enabled: true,
        submission_date: Some(d(2025, 11, 10)),
        deadline_date: Some(d(2025, 11, 1)),
    };
    assert!(schedule.set_config(WorkflowStep::Report, config).is_err());
    assert_eq!(
        schedule.config(WorkflowStep::Report),
        Some(&StepConfig::default())
    );
}

#[test]
fn steps_one_to_three_take_no_dates() {
    let mut schedule = StepSchedule::default();
    assert!(
        schedule
            .set_submission_date(WorkflowStep::Planning, Some(d(2025, 9, 1)))
            .is_err()
    );
    assert!(schedule.config(WorkflowStep::Planning).is_none());
}

#[test]
fn step_schedule_json_uses_step_numbers() {
    let mut schedule = StepSchedule::default();
    schedule
        .set_submission_date(WorkflowStep::NeedsExpression, Some(d(2025, 9, 15)))
        .unwrap();
    let json = serde_json::to_value(&schedule).unwrap();
    assert_eq!(json["steps"]["7"]["submission_date"], "2025-09-15");

    let back: StepSchedule = serde_json::from_value(json).unwrap();
    assert_eq!(back, schedule);
}

#[test]
fn resolve_accepts_external_milestones() {
    let planning = PlanningInput::new(d(2025, 9, 1), d(2025, 12, 19), [1.0; 5]);
    let milestones = compute_milestones(&planning).unwrap();
    let resolved = StepSchedule::default().resolve(milestones.as_ref());
    assert_eq!(resolved.len(), 5);
    assert!(resolved.iter().all(|r| r.submission_date.is_some()));
}
