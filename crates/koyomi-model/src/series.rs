//! Recurring series: weekday recurrence specs and their eager expansion
//! into concrete events.
//!
//! Expansion goes through the `rrule` crate: the spec is rendered as a
//! weekly `BYDAY` rule anchored at the template start, evaluated in the
//! owning calendar's zone so weekday selection follows local wall time.

use chrono::{NaiveDate, NaiveTime, Utc, Weekday};
use chrono_tz::Tz;
use koyomi_core::time;
use rrule::{RRule, Unvalidated};
use uuid::Uuid;

use crate::error::{ModelError, ModelResult};
use crate::event::{Event, EventSpec, EventWindow};

/// Termination rule for a series: an occurrence count or an inclusive
/// end date, mutually exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    Count(u32),
    Until(NaiveDate),
}

/// Construction input for a recurring series: the template event fields
/// plus the recurrence pattern.
#[derive(Debug, Clone)]
pub struct SeriesSpec {
    pub template: EventSpec,
    pub weekdays: Vec<Weekday>,
    pub termination: Termination,
}

/// ## Summary
/// Expands a series spec into its concrete occurrences.
///
/// Every occurrence carries the template fields, keeps the template's
/// local wall-clock times on its own date, and shares one fresh series id.
/// Occurrences are returned in chronological order; nothing is committed
/// here — the caller inserts the batch atomically.
///
/// ## Errors
/// Returns `InvalidRecurrence` for an empty weekday set, a zero count, an
/// `until` date before the series start, a timed template crossing a day
/// boundary, or a pattern producing no occurrences. Event-level invariant
/// violations surface as they do for single events.
pub fn expand(spec: &SeriesSpec, zone: Tz) -> ModelResult<Vec<Event>> {
    let (anchor_date, times) = match spec.template.window {
        EventWindow::Timed { start, end } => {
            if start.date() != end.date() {
                return Err(ModelError::InvalidRecurrence(format!(
                    "a recurring event must start and end on the same day, got {start} to {end}"
                )));
            }
            (start.date(), Some((start.time(), end.time())))
        }
        EventWindow::AllDay { date } => (date, None),
    };

    validate_pattern(spec, anchor_date)?;

    let anchor_time = times.map_or(NaiveTime::MIN, |(start, _)| start);
    let dtstart = time::zone_local(anchor_date.and_time(anchor_time), zone)?
        .with_timezone(&rrule::Tz::Tz(zone));

    let rrule_text = render_rrule(spec, zone)?;
    tracing::debug!(rrule = %rrule_text, "expanding series");

    let rrule = rrule_text
        .parse::<RRule<Unvalidated>>()
        .map_err(|err| ModelError::InvalidRecurrence(err.to_string()))?;
    let rrule_set = rrule
        .build(dtstart)
        .map_err(|err| ModelError::InvalidRecurrence(err.to_string()))?;

    let result = rrule_set.all(u16::MAX);
    if result.limited {
        return Err(ModelError::InvalidRecurrence(
            "recurrence produces too many occurrences".to_string(),
        ));
    }
    if result.dates.is_empty() {
        return Err(ModelError::InvalidRecurrence(
            "recurrence produces no occurrences".to_string(),
        ));
    }

    let series_id = Uuid::new_v4();
    let mut occurrences = Vec::with_capacity(result.dates.len());
    for instant in result.dates {
        let date = instant.with_timezone(&zone).date_naive();
        let window = match times {
            Some((start, end)) => EventWindow::Timed {
                start: date.and_time(start),
                end: date.and_time(end),
            },
            None => EventWindow::AllDay { date },
        };
        let occurrence_spec = EventSpec {
            window,
            ..spec.template.clone()
        };
        let mut event = Event::from_spec(&occurrence_spec, zone)?;
        event.series_id = Some(series_id);
        occurrences.push(event);
    }

    tracing::info!(
        subject = %spec.template.subject,
        count = occurrences.len(),
        "expanded series"
    );

    Ok(occurrences)
}

fn validate_pattern(spec: &SeriesSpec, anchor_date: NaiveDate) -> ModelResult<()> {
    if spec.weekdays.is_empty() {
        return Err(ModelError::InvalidRecurrence(
            "at least one weekday is required".to_string(),
        ));
    }
    match spec.termination {
        Termination::Count(0) => Err(ModelError::InvalidRecurrence(
            "occurrence count must be at least 1".to_string(),
        )),
        Termination::Until(until) if until < anchor_date => {
            Err(ModelError::InvalidRecurrence(format!(
                "until date {until} precedes the series start {anchor_date}"
            )))
        }
        Termination::Count(_) | Termination::Until(_) => Ok(()),
    }
}

fn render_rrule(spec: &SeriesSpec, zone: Tz) -> ModelResult<String> {
    let mut seen: Vec<Weekday> = Vec::new();
    for day in &spec.weekdays {
        if !seen.contains(day) {
            seen.push(*day);
        }
    }
    let byday: Vec<&str> = seen.iter().map(|day| byday_code(*day)).collect();

    let terminator = match spec.termination {
        Termination::Count(count) => format!("COUNT={count}"),
        Termination::Until(date) => {
            // UNTIL is inclusive of the end date: run to the last minute of
            // that local day, rendered in UTC as RFC 5545 requires.
            let end_of_day = date
                .and_time(NaiveTime::from_hms_opt(23, 59, 59).unwrap_or(NaiveTime::MIN));
            let instant = time::zone_local(end_of_day, zone)?.with_timezone(&Utc);
            format!("UNTIL={}", instant.format("%Y%m%dT%H%M%SZ"))
        }
    };

    Ok(format!(
        "FREQ=WEEKLY;BYDAY={};{terminator}",
        byday.join(",")
    ))
}

const fn byday_code(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "MO",
        Weekday::Tue => "TU",
        Weekday::Wed => "WE",
        Weekday::Thu => "TH",
        Weekday::Fri => "FR",
        Weekday::Sat => "SA",
        Weekday::Sun => "SU",
    }
}
