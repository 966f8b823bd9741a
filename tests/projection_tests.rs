use chrono::NaiveDate;
use project_timeline::{
    HOURS_PER_WEEK, MAX_TASK_HOURS, MissingDate, PlanningInput, PlanningTask, ProjectionError,
    VacationPeriod, compute_projection,
};

fn d(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn autumn_term(hours: [f64; 5]) -> PlanningInput {
    PlanningInput::new(d(2025, 9, 1), d(2025, 12, 19), hours)
}

#[test]
fn weeks_needed_rounds_up_at_one_and_a_half_hours_per_week() {
    assert_eq!(HOURS_PER_WEEK, 1.5);
    let projection = compute_projection(&autumn_term([2.0, 3.0, 1.0, 2.0, 2.0]), &[]).unwrap();
    assert_eq!(projection.total_hours, 10.0);
    assert_eq!(projection.total_weeks_needed, 7);
}

#[test]
fn autumn_term_has_room_for_seven_weeks() {
    let projection = compute_projection(&autumn_term([2.0, 3.0, 1.0, 2.0, 2.0]), &[]).unwrap();
    let available = projection.weeks_available.expect("both dates set");
    assert!((available - 109.0 / 7.0).abs() < 1e-9);
    assert!(!projection.capacity_exceeded);
}

#[test]
fn fifty_hours_exceed_the_autumn_term() {
    let projection = compute_projection(&autumn_term([10.0; 5]), &[]).unwrap();
    assert_eq!(projection.total_weeks_needed, 34);
    assert!(projection.capacity_exceeded);
}

#[test]
fn shares_sum_to_one_and_follow_task_order() {
    let projection = compute_projection(&autumn_term([2.0, 3.0, 1.0, 2.0, 2.0]), &[]).unwrap();
    let shares = projection.shares();
    let total: f64 = shares.iter().sum();
    assert!((total - 1.0).abs() < 1e-9);
    assert!((shares[1] - 0.3).abs() < 1e-9);

    let tasks: Vec<PlanningTask> = projection.allocations.iter().map(|a| a.task).collect();
    assert_eq!(tasks, PlanningTask::ALL.to_vec());
    assert!((projection.allocations[0].weeks - 2.0 / 1.5).abs() < 1e-9);
}

#[test]
fn zero_hours_give_zero_shares_and_no_warning() {
    let projection = compute_projection(&autumn_term([0.0; 5]), &[]).unwrap();
    assert_eq!(projection.total_hours, 0.0);
    assert_eq!(projection.total_weeks_needed, 0);
    assert!(projection.shares().iter().all(|share| *share == 0.0));
    assert!(!projection.capacity_exceeded);
}

#[test]
fn negative_and_non_finite_hours_count_as_zero() {
    let input = autumn_term([-4.0, f64::NAN, 3.0, f64::INFINITY, 0.0]);
    let projection = compute_projection(&input, &[]).unwrap();
    assert_eq!(projection.total_hours, 3.0);
    assert_eq!(projection.shares()[2], 1.0);
}

#[test]
fn inverted_range_is_rejected() {
    let mut input = autumn_term([2.0, 3.0, 1.0, 2.0, 2.0]);
    input.project_end = Some(d(2025, 9, 1));
    let err = compute_projection(&input, &[]).unwrap_err();
    assert_eq!(
        err,
        ProjectionError::InvalidRange {
            start: d(2025, 9, 1),
            end: d(2025, 9, 1)
        }
    );
}

#[test]
fn missing_date_withholds_capacity_check_only() {
    let mut input = autumn_term([10.0; 5]);
    input.project_end = None;
    let projection = compute_projection(&input, &[]).unwrap();
    assert_eq!(projection.total_weeks_needed, 34);
    assert_eq!(projection.weeks_available, None);
    assert!(!projection.capacity_exceeded);
    assert!(!projection.is_computable());
    assert_eq!(
        input.date_window().unwrap_err(),
        ProjectionError::MissingDate(MissingDate::End)
    );
}

#[test]
fn only_overlapping_vacations_are_overlaid() {
    let vacations = vec![
        VacationPeriod::new("Summer", d(2025, 7, 5), d(2025, 9, 1)),
        VacationPeriod::new("Toussaint", d(2025, 10, 18), d(2025, 11, 3)),
        VacationPeriod::new("Winter", d(2026, 2, 7), d(2026, 2, 23)),
    ];
    let projection = compute_projection(&autumn_term([2.0; 5]), &vacations).unwrap();
    let names: Vec<&str> = projection
        .overlapping_vacations()
        .map(|period| period.name.as_str())
        .collect();
    assert_eq!(names, vec!["Summer", "Toussaint"]);

    let summer = &projection.vacations[0];
    assert_eq!(summer.offset, 0.0);
    assert_eq!(summer.width, 0.0);

    let toussaint = &projection.vacations[1];
    assert!((toussaint.offset - 47.0 / 109.0).abs() < 1e-9);
    assert!((toussaint.width - 16.0 / 109.0).abs() < 1e-9);
}

#[test]
fn projection_is_idempotent() {
    let input = autumn_term([2.0, 3.0, 1.0, 2.0, 2.0]);
    let vacations = vec![VacationPeriod::new("Toussaint", d(2025, 10, 18), d(2025, 11, 3))];
    let first = compute_projection(&input, &vacations).unwrap();
    let second = compute_projection(&input, &vacations).unwrap();
    assert_eq!(first, second);
}

#[test]
fn huge_hours_are_capped_so_totals_stay_finite() {
    let projection = compute_projection(&autumn_term([1e308; 5]), &[]).unwrap();
    assert_eq!(projection.total_hours, 5.0 * MAX_TASK_HOURS);
    assert!(projection.total_hours.is_finite());
    assert!(projection.shares().iter().all(|share| (*share - 0.2).abs() < 1e-12));
    assert_eq!(
        projection.total_weeks_needed,
        (5.0 * MAX_TASK_HOURS / HOURS_PER_WEEK).ceil() as u32
    );
    assert!(projection.capacity_exceeded);
}
