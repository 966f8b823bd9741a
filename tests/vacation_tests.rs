use chrono::NaiveDate;
use project_timeline::{
    VacationCalendar, VacationPeriod, VacationSource, VacationZone, load_vacations_from_csv,
    read_vacations_csv,
};
use std::io::Write;
use tempfile::NamedTempFile;

fn d(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

const DATASET_EXPORT: &str = "\
Description;Population;Date de début;Date de fin;Académies;Zones;annee_scolaire
Vacances de la Toussaint;-;2025-10-17T22:00:00+00:00;2025-11-02T23:00:00+00:00;Paris;Zone C;2025-2026
Vacances de la Toussaint;-;2025-10-17T22:00:00+00:00;2025-11-02T23:00:00+00:00;Créteil;Zone C;2025-2026
Vacances de la Toussaint;-;2025-10-17T22:00:00+00:00;2025-11-02T23:00:00+00:00;Lyon;Zone A;2025-2026
Pont de l'Ascension;Élèves;2026-05-13T22:00:00+00:00;2026-05-17T22:00:00+00:00;Lyon;Zone A;2025-2026
Vacances de Noël;-;2025-12-19;2026-01-05;Lyon;Zone A;2025-2026
Prérentrée des enseignants;Enseignants;2025-08-28T22:00:00+00:00;2025-08-29T22:00:00+00:00;Lyon;Zone A;2025-2026
Vacances de Noël;-;2025-12-19T23:00:00+00:00;2026-01-04T23:00:00+00:00;Corse;Corse;2025-2026
Vacances d'Hiver;-;2026-02-20T23:00:00+00:00;2026-02-06T23:00:00+00:00;Rennes;Zone B;2025-2026
";

#[test]
fn dataset_export_is_parsed_per_zone() {
    let calendar = read_vacations_csv(DATASET_EXPORT.as_bytes()).unwrap();
    assert_eq!(calendar.len(), 4);
    assert_eq!(calendar.zone_periods(VacationZone::C).len(), 1);
    assert_eq!(calendar.zone_periods(VacationZone::A).len(), 3);
    assert!(calendar.zone_periods(VacationZone::B).is_empty());
}

#[test]
fn utc_timestamps_map_to_paris_days() {
    let calendar = read_vacations_csv(DATASET_EXPORT.as_bytes()).unwrap();
    let zone_a = calendar.zone_periods(VacationZone::A);

    let toussaint = &zone_a[0];
    assert_eq!(toussaint.name, "Vacances de la Toussaint");
    assert_eq!(toussaint.start, d(2025, 10, 18));
    assert_eq!(toussaint.end, d(2025, 11, 3));

    let ascension = zone_a
        .iter()
        .find(|period| period.name == "Pont de l'Ascension")
        .unwrap();
    assert_eq!(ascension.start, d(2026, 5, 14));
    assert_eq!(ascension.end, d(2026, 5, 18));
}

#[test]
fn periods_are_filtered_to_the_project_window() {
    let calendar = read_vacations_csv(DATASET_EXPORT.as_bytes()).unwrap();
    let periods = calendar
        .periods(VacationZone::A, d(2025, 9, 1), d(2025, 12, 19))
        .unwrap();
    let names: Vec<&str> = periods.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["Vacances de la Toussaint", "Vacances de Noël"]);

    let none = calendar
        .periods(VacationZone::None, d(2025, 9, 1), d(2025, 12, 19))
        .unwrap();
    assert!(none.is_empty());
}

#[test]
fn comma_delimited_api_export_is_accepted() {
    let csv = "description,population,start_date,end_date,zones\n\
               Vacances d'Hiver,-,2026-02-06,2026-02-22,Zone B\n";
    let calendar = read_vacations_csv(csv.as_bytes()).unwrap();
    assert_eq!(
        calendar.zone_periods(VacationZone::B),
        &[VacationPeriod::new("Vacances d'Hiver", d(2026, 2, 6), d(2026, 2, 22))]
    );
}

#[test]
fn missing_required_column_is_an_error() {
    let csv = "Description;Date de début;Zones\nNoël;2025-12-19;Zone A\n";
    let err = read_vacations_csv(csv.as_bytes()).unwrap_err();
    assert!(err.to_string().contains("end_date"));
}

#[test]
fn load_from_file() {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(DATASET_EXPORT.as_bytes()).unwrap();
    let calendar = load_vacations_from_csv(file.path()).unwrap();
    assert_eq!(calendar.len(), 4);
}

#[test]
fn calendar_keeps_periods_sorted_and_unique() {
    let mut calendar = VacationCalendar::new();
    calendar.add_period(
        VacationZone::B,
        VacationPeriod::new("Noël", d(2025, 12, 20), d(2026, 1, 5)),
    );
    calendar.add_period(
        VacationZone::B,
        VacationPeriod::new("Toussaint", d(2025, 10, 18), d(2025, 11, 3)),
    );
    calendar.add_period(
        VacationZone::B,
        VacationPeriod::new("Noël", d(2025, 12, 20), d(2026, 1, 5)),
    );
    calendar.add_period(
        VacationZone::B,
        VacationPeriod::new("Inverted", d(2025, 11, 3), d(2025, 10, 18)),
    );
    calendar.add_period(
        VacationZone::None,
        VacationPeriod::new("Ignored", d(2025, 10, 18), d(2025, 11, 3)),
    );

    let names: Vec<&str> = calendar
        .zone_periods(VacationZone::B)
        .iter()
        .map(|p| p.name.as_str())
        .collect();
    assert_eq!(names, vec!["Toussaint", "Noël"]);
    assert_eq!(calendar.len(), 2);
}

#[test]
fn overlap_is_inclusive_on_both_ends() {
    let period = VacationPeriod::new("Toussaint", d(2025, 10, 18), d(2025, 11, 3));
    assert!(period.overlaps(d(2025, 11, 3), d(2025, 12, 1)));
    assert!(period.overlaps(d(2025, 9, 1), d(2025, 10, 18)));
    assert!(!period.overlaps(d(2025, 11, 4), d(2025, 12, 1)));
}

#[test]
fn zone_labels_parse() {
    assert_eq!("Zone A".parse::<VacationZone>(), Ok(VacationZone::A));
    assert_eq!("c".parse::<VacationZone>(), Ok(VacationZone::C));
    assert_eq!("".parse::<VacationZone>(), Ok(VacationZone::None));
    assert_eq!("none".parse::<VacationZone>(), Ok(VacationZone::None));
    assert!("Corse".parse::<VacationZone>().is_err());
    assert_eq!(VacationZone::B.dataset_label(), Some("Zone B"));
    assert_eq!(VacationZone::None.dataset_label(), None);
}
