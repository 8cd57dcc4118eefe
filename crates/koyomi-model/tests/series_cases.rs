//! Table-driven series expansion cases: each case pins the exact
//! occurrence dates the weekday walk must produce.

use chrono::Weekday;
use koyomi_core::time::{parse_date, parse_datetime, resolve_zone};
use koyomi_model::event::{EventSpec, EventWindow, Visibility};
use koyomi_model::series::{SeriesSpec, Termination, expand};

struct SeriesCase {
    name: &'static str,
    zone: &'static str,
    start: &'static str,
    end: &'static str,
    weekdays: &'static [Weekday],
    termination: Termination,
    expected: &'static [&'static str],
}

fn series_cases() -> Vec<SeriesCase> {
    use Weekday::{Fri, Mon, Sat, Sun, Thu, Tue, Wed};
    vec![
        SeriesCase {
            // 2025-01-06 is a Monday
            name: "single_weekday_count",
            zone: "America/New_York",
            start: "2025-01-06T09:00",
            end: "2025-01-06T09:15",
            weekdays: &[Mon],
            termination: Termination::Count(3),
            expected: &["2025-01-06", "2025-01-13", "2025-01-20"],
        },
        SeriesCase {
            // Anchor mid-set: Wednesday start walks W, F, then next M
            name: "multi_weekday_count_anchor_mid_set",
            zone: "America/New_York",
            start: "2025-01-01T09:00",
            end: "2025-01-01T10:00",
            weekdays: &[Mon, Wed, Fri],
            termination: Termination::Count(5),
            expected: &[
                "2025-01-01",
                "2025-01-03",
                "2025-01-06",
                "2025-01-08",
                "2025-01-10",
            ],
        },
        SeriesCase {
            name: "until_inclusive_of_matching_end_date",
            zone: "America/New_York",
            start: "2025-01-07T09:00",
            end: "2025-01-07T10:00",
            weekdays: &[Tue],
            termination: Termination::Until(until("2025-01-21")),
            expected: &["2025-01-07", "2025-01-14", "2025-01-21"],
        },
        SeriesCase {
            name: "until_between_occurrences_stops_before",
            zone: "America/New_York",
            start: "2025-01-07T09:00",
            end: "2025-01-07T10:00",
            weekdays: &[Tue],
            termination: Termination::Until(until("2025-01-20")),
            expected: &["2025-01-07", "2025-01-14"],
        },
        SeriesCase {
            // 22:30 local is the next day in UTC; dates must stay local
            name: "late_evening_keeps_local_weekday",
            zone: "America/New_York",
            start: "2025-01-02T22:30",
            end: "2025-01-02T23:30",
            weekdays: &[Thu],
            termination: Termination::Count(3),
            expected: &["2025-01-02", "2025-01-09", "2025-01-16"],
        },
        SeriesCase {
            // Expansion walks across the US spring-forward on 2025-03-09
            name: "dst_transition_preserves_wall_clock",
            zone: "America/New_York",
            start: "2025-03-05T09:00",
            end: "2025-03-05T09:30",
            weekdays: &[Wed],
            termination: Termination::Count(3),
            expected: &["2025-03-05", "2025-03-12", "2025-03-19"],
        },
        SeriesCase {
            name: "weekend_pair_in_another_zone",
            zone: "Asia/Tokyo",
            start: "2025-01-04T08:00",
            end: "2025-01-04T09:00",
            weekdays: &[Sat, Sun],
            termination: Termination::Count(4),
            expected: &["2025-01-04", "2025-01-05", "2025-01-11", "2025-01-12"],
        },
        SeriesCase {
            name: "duplicate_weekday_letters_collapse",
            zone: "America/New_York",
            start: "2025-01-06T09:00",
            end: "2025-01-06T09:15",
            weekdays: &[Mon, Mon],
            termination: Termination::Count(2),
            expected: &["2025-01-06", "2025-01-13"],
        },
    ]
}

fn until(text: &str) -> chrono::NaiveDate {
    parse_date(text).expect("valid until date")
}

fn assert_case(case: &SeriesCase) {
    let zone = resolve_zone(case.zone).expect("known zone");
    let spec = SeriesSpec {
        template: EventSpec {
            subject: case.name.to_string(),
            window: EventWindow::Timed {
                start: parse_datetime(case.start).expect("valid start"),
                end: parse_datetime(case.end).expect("valid end"),
            },
            location: None,
            description: None,
            visibility: Visibility::default(),
        },
        weekdays: case.weekdays.to_vec(),
        termination: case.termination,
    };

    let events = expand(&spec, zone).unwrap_or_else(|err| panic!("{}: {err}", case.name));
    let dates: Vec<String> = events
        .iter()
        .map(|e| e.start.date_naive().to_string())
        .collect();
    assert_eq!(dates, case.expected, "{}", case.name);

    let start_time = parse_datetime(case.start).expect("valid start").time();
    let end_time = parse_datetime(case.end).expect("valid end").time();
    for event in &events {
        assert_eq!(event.start.time(), start_time, "{}", case.name);
        assert_eq!(event.end.time(), end_time, "{}", case.name);
        assert!(event.series_id.is_some(), "{}", case.name);
    }
}

#[test_log::test]
fn series_expansion_cases() {
    for case in series_cases() {
        assert_case(&case);
    }
}
