//! Event value types: the concrete occurrence, its construction spec, and
//! single-field patches.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use chrono_tz::Tz;
use koyomi_core::time;
use uuid::Uuid;

use crate::error::{ModelError, ModelResult};

/// Event visibility flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visibility {
    #[default]
    Public,
    Private,
}

impl Visibility {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Private => "private",
        }
    }
}

impl std::fmt::Display for Visibility {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The requested time window of an event, before zone interpretation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventWindow {
    Timed {
        start: NaiveDateTime,
        end: NaiveDateTime,
    },
    /// Full local day: 00:00 up to 00:00 of the following day.
    AllDay { date: NaiveDate },
}

/// Construction input for an event: named, defaulted optional fields,
/// validated once at [`Event::from_spec`].
#[derive(Debug, Clone)]
pub struct EventSpec {
    pub subject: String,
    pub window: EventWindow,
    pub location: Option<String>,
    pub description: Option<String>,
    pub visibility: Visibility,
}

/// A single-field edit applied to one or more events.
#[derive(Debug, Clone)]
pub enum EventPatch {
    Subject(String),
    Start(NaiveDateTime),
    End(NaiveDateTime),
    Location(String),
    Description(String),
    Visibility(Visibility),
}

impl EventPatch {
    #[must_use]
    pub const fn field_name(&self) -> &'static str {
        match self {
            Self::Subject(_) => "subject",
            Self::Start(_) => "start",
            Self::End(_) => "end",
            Self::Location(_) => "location",
            Self::Description(_) => "description",
            Self::Visibility(_) => "visibility",
        }
    }
}

/// One concrete scheduled occurrence, exclusively owned by its calendar.
#[derive(Debug, Clone)]
pub struct Event {
    pub subject: String,
    pub start: DateTime<Tz>,
    pub end: DateTime<Tz>,
    pub location: Option<String>,
    pub description: Option<String>,
    pub visibility: Visibility,
    pub all_day: bool,
    /// Set when the event was materialized from a recurring series.
    pub series_id: Option<Uuid>,
}

impl Event {
    /// ## Summary
    /// Validates a spec and materializes it in the owning calendar's zone.
    ///
    /// All-day windows synthesize start = 00:00 and end = 00:00 of the
    /// following local day.
    ///
    /// ## Errors
    /// Returns `InvalidEvent` for an empty subject or a non-positive
    /// interval, and `MalformedDateTime` for a wall-clock value that does
    /// not exist in the zone.
    pub fn from_spec(spec: &EventSpec, zone: Tz) -> ModelResult<Self> {
        if spec.subject.trim().is_empty() {
            return Err(ModelError::InvalidEvent(
                "subject must not be empty".to_string(),
            ));
        }

        let (start, end, all_day) = match spec.window {
            EventWindow::Timed { start, end } => {
                if start >= end {
                    return Err(ModelError::InvalidEvent(format!(
                        "start {start} is not before end {end}"
                    )));
                }
                (
                    time::zone_local(start, zone)?,
                    time::zone_local(end, zone)?,
                    false,
                )
            }
            EventWindow::AllDay { date } => {
                let (start, end) = all_day_window(date, zone)?;
                (start, end, true)
            }
        };

        Ok(Self {
            subject: spec.subject.clone(),
            start,
            end,
            location: spec.location.clone(),
            description: spec.description.clone(),
            visibility: spec.visibility,
            all_day,
            series_id: None,
        })
    }

    /// Duplicate-detection identity: `(subject, start, end)` with instants
    /// compared as absolute points in time.
    #[must_use]
    pub fn same_identity(&self, other: &Self) -> bool {
        self.subject == other.subject && self.start == other.start && self.end == other.end
    }

    /// Half-open containment: start inclusive, end exclusive.
    #[must_use]
    pub fn covers(&self, instant: &DateTime<Tz>) -> bool {
        self.start <= *instant && *instant < self.end
    }

    /// Whether the event's interval intersects the half-open window.
    #[must_use]
    pub fn intersects(&self, window_start: &DateTime<Tz>, window_end: &DateTime<Tz>) -> bool {
        self.start < *window_end && *window_start < self.end
    }

    #[must_use]
    pub fn duration(&self) -> TimeDelta {
        self.end.signed_duration_since(self.start)
    }
}

/// ## Summary
/// Computes the full-local-day window for a date in a zone.
///
/// ## Errors
/// Returns `MalformedDateTime` if local midnight does not exist in the
/// zone on either boundary day.
pub fn all_day_window(date: NaiveDate, zone: Tz) -> ModelResult<(DateTime<Tz>, DateTime<Tz>)> {
    let midnight = NaiveTime::MIN;
    let next = date
        .succ_opt()
        .ok_or_else(|| ModelError::InvalidEvent(format!("day after {date} is out of range")))?;
    let start = time::zone_local(date.and_time(midnight), zone)?;
    let end = time::zone_local(next.and_time(midnight), zone)?;
    Ok((start, end))
}

#[cfg(test)]
mod tests {
    use super::*;
    use koyomi_core::time::{parse_datetime, resolve_zone};

    fn spec(subject: &str, start: &str, end: &str) -> EventSpec {
        EventSpec {
            subject: subject.to_string(),
            window: EventWindow::Timed {
                start: parse_datetime(start).expect("valid start"),
                end: parse_datetime(end).expect("valid end"),
            },
            location: None,
            description: None,
            visibility: Visibility::default(),
        }
    }

    #[test]
    fn start_must_precede_end() {
        let zone = resolve_zone("America/New_York").expect("known zone");

        let ok = Event::from_spec(&spec("Standup", "2025-01-01T09:00", "2025-01-01T09:15"), zone)
            .expect("valid event");
        assert!(ok.start < ok.end);
        assert_eq!(ok.visibility, Visibility::Public);

        let inverted = spec("Standup", "2025-01-01T09:15", "2025-01-01T09:00");
        let err = Event::from_spec(&inverted, zone).expect_err("inverted interval");
        assert_eq!(err.kind(), "MalformedDateTime");

        let zero = spec("Standup", "2025-01-01T09:00", "2025-01-01T09:00");
        assert!(Event::from_spec(&zero, zone).is_err());
    }

    #[test]
    fn empty_subject_is_rejected() {
        let zone = resolve_zone("America/New_York").expect("known zone");
        let err = Event::from_spec(&spec("  ", "2025-01-01T09:00", "2025-01-01T09:15"), zone)
            .expect_err("blank subject");
        assert_eq!(err.kind(), "MalformedDateTime");
    }

    #[test]
    fn all_day_event_spans_the_full_local_day() {
        let zone = resolve_zone("America/New_York").expect("known zone");
        let spec = EventSpec {
            subject: "Offsite".to_string(),
            window: EventWindow::AllDay {
                date: koyomi_core::time::parse_date("2025-06-10").expect("valid date"),
            },
            location: None,
            description: None,
            visibility: Visibility::Private,
        };

        let event = Event::from_spec(&spec, zone).expect("valid all-day event");
        assert!(event.all_day);
        assert_eq!(event.duration(), TimeDelta::hours(24));
        assert_eq!(
            koyomi_core::time::format_instant(&event.start),
            "2025-06-10T00:00-04:00[America/New_York]"
        );
    }

    #[test]
    fn containment_is_half_open() {
        let zone = resolve_zone("America/New_York").expect("known zone");
        let event = Event::from_spec(&spec("Standup", "2025-01-01T09:00", "2025-01-01T09:15"), zone)
            .expect("valid event");

        assert!(event.covers(&event.start));
        assert!(!event.covers(&event.end));
    }
}
