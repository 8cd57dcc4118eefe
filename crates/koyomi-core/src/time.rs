//! Time utilities: fixed-grammar literal date-time parsing, IANA zone
//! resolution, and zone-aware instant conversion.
//!
//! Pure functions over `chrono`/`chrono-tz`; no shared state, safe to call
//! concurrently.

use std::str::FromStr;

use chrono::{DateTime, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};
use chrono_tz::Tz;

use crate::error::{CoreError, CoreResult};

/// ## Summary
/// Resolves an IANA timezone identifier to a `chrono_tz::Tz`.
///
/// ## Errors
/// Returns `CoreError::InvalidZone` if the identifier is not a known IANA
/// timezone name.
pub fn resolve_zone(id: &str) -> CoreResult<Tz> {
    Tz::from_str(id).map_err(|_e| CoreError::InvalidZone(id.to_string()))
}

/// Parses a literal calendar date in the fixed `YYYY-MM-DD` grammar.
///
/// ## Errors
/// Returns `CoreError::MalformedDateTime` if the text does not match the
/// grammar or names an impossible date.
pub fn parse_date(text: &str) -> CoreResult<NaiveDate> {
    let bytes = text.as_bytes();
    let shape_ok = bytes.len() == 10
        && bytes[4] == b'-'
        && bytes[7] == b'-'
        && bytes
            .iter()
            .enumerate()
            .all(|(i, b)| matches!(i, 4 | 7) || b.is_ascii_digit());
    if !shape_ok {
        return Err(malformed_date(text));
    }

    let year = text[0..4].parse::<i32>().map_err(|_e| malformed_date(text))?;
    let month = text[5..7].parse::<u32>().map_err(|_e| malformed_date(text))?;
    let day = text[8..10].parse::<u32>().map_err(|_e| malformed_date(text))?;

    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| malformed_date(text))
}

/// Parses a literal date-time in the fixed `YYYY-MM-DDThh:mm` grammar.
///
/// The result is a wall-clock value; interpret it in a calendar's zone with
/// [`zone_local`].
///
/// ## Errors
/// Returns `CoreError::MalformedDateTime` if the text does not match the
/// grammar or names an impossible date or time.
pub fn parse_datetime(text: &str) -> CoreResult<NaiveDateTime> {
    let bytes = text.as_bytes();
    let shape_ok = bytes.len() == 16 && bytes[10] == b'T' && bytes[13] == b':';
    if !shape_ok {
        return Err(malformed_datetime(text));
    }

    let date = parse_date(&text[0..10]).map_err(|_e| malformed_datetime(text))?;

    let time_bytes = &bytes[11..16];
    if !time_bytes
        .iter()
        .enumerate()
        .all(|(i, b)| i == 2 || b.is_ascii_digit())
    {
        return Err(malformed_datetime(text));
    }
    let hour = text[11..13]
        .parse::<u32>()
        .map_err(|_e| malformed_datetime(text))?;
    let minute = text[14..16]
        .parse::<u32>()
        .map_err(|_e| malformed_datetime(text))?;

    let time = NaiveTime::from_hms_opt(hour, minute, 0).ok_or_else(|| malformed_datetime(text))?;

    Ok(NaiveDateTime::new(date, time))
}

/// ## Summary
/// Interprets a wall-clock value in a zone, producing an absolute instant.
///
/// A time falling in a DST fold resolves to the earlier of the two
/// candidate instants.
///
/// ## Errors
/// Returns `CoreError::MalformedDateTime` for a time that does not exist in
/// the zone (DST gap).
pub fn zone_local(local: NaiveDateTime, zone: Tz) -> CoreResult<DateTime<Tz>> {
    match zone.from_local_datetime(&local) {
        LocalResult::Single(instant) => Ok(instant),
        LocalResult::Ambiguous(earliest, _latest) => {
            tracing::debug!(%local, %zone, "ambiguous local time, taking earlier instant");
            Ok(earliest)
        }
        LocalResult::None => Err(CoreError::MalformedDateTime(format!(
            "nonexistent local time {local} in {zone}"
        ))),
    }
}

/// Re-bases an absolute instant into another zone, preserving the point in
/// time.
#[must_use]
pub fn rebase(instant: &DateTime<Tz>, zone: Tz) -> DateTime<Tz> {
    instant.with_timezone(&zone)
}

/// Renders an instant as `YYYY-MM-DDThh:mm±hh:mm[Zone/Name]`.
#[must_use]
pub fn format_instant(instant: &DateTime<Tz>) -> String {
    format!(
        "{}[{}]",
        instant.format("%Y-%m-%dT%H:%M%:z"),
        instant.timezone().name()
    )
}

fn malformed_date(text: &str) -> CoreError {
    CoreError::MalformedDateTime(format!("expected YYYY-MM-DD, got {text:?}"))
}

fn malformed_datetime(text: &str) -> CoreError {
    CoreError::MalformedDateTime(format!("expected YYYY-MM-DDThh:mm, got {text:?}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn parse_date_accepts_fixed_grammar_only() {
        assert_eq!(
            parse_date("2025-01-31").expect("valid date"),
            NaiveDate::from_ymd_opt(2025, 1, 31).expect("valid ymd")
        );

        for bad in ["2025-1-31", "2025/01/31", "20250131", "2025-02-30", ""] {
            assert!(parse_date(bad).is_err(), "should reject {bad:?}");
        }
    }

    #[test]
    fn parse_datetime_accepts_fixed_grammar_only() {
        let parsed = parse_datetime("2025-01-01T09:05").expect("valid datetime");
        assert_eq!(parsed.hour(), 9);
        assert_eq!(parsed.minute(), 5);

        for bad in [
            "2025-01-01 09:05",
            "2025-01-01T9:05",
            "2025-01-01T09:05:00",
            "2025-01-01T24:00",
            "2025-01-01T09-05",
            "frobnicate",
        ] {
            assert!(parse_datetime(bad).is_err(), "should reject {bad:?}");
        }
    }

    #[test]
    fn format_then_parse_round_trips_in_same_zone() {
        let zone = resolve_zone("America/New_York").expect("known zone");
        let local = parse_datetime("2025-01-01T09:00").expect("valid datetime");
        let instant = zone_local(local, zone).expect("unambiguous time");

        let rendered = format_instant(&instant);
        assert_eq!(rendered, "2025-01-01T09:00-05:00[America/New_York]");

        let reparsed = zone_local(
            parse_datetime(&rendered[0..16]).expect("valid prefix"),
            zone,
        )
        .expect("unambiguous time");
        assert_eq!(reparsed, instant);
    }

    #[test]
    fn dst_gap_is_rejected_and_fold_takes_earlier_offset() {
        let zone = resolve_zone("America/New_York").expect("known zone");

        // 2025-03-09 02:30 does not exist (spring forward)
        let gap = parse_datetime("2025-03-09T02:30").expect("valid datetime");
        assert!(zone_local(gap, zone).is_err());

        // 2025-11-02 01:30 occurs twice (fall back); earlier instant is EDT
        let fold = parse_datetime("2025-11-02T01:30").expect("valid datetime");
        let instant = zone_local(fold, zone).expect("fold resolves");
        assert_eq!(format_instant(&instant), "2025-11-02T01:30-04:00[America/New_York]");
    }

    #[test]
    fn rebase_preserves_the_absolute_instant() {
        let from = resolve_zone("America/New_York").expect("known zone");
        let to = resolve_zone("Europe/Paris").expect("known zone");
        let local = parse_datetime("2025-01-01T09:00").expect("valid datetime");
        let instant = zone_local(local, from).expect("unambiguous time");

        let rebased = rebase(&instant, to);
        assert_eq!(rebased, instant);
        assert_eq!(format_instant(&rebased), "2025-01-01T15:00+01:00[Europe/Paris]");
    }

    #[test]
    fn unknown_zone_is_invalid() {
        let err = resolve_zone("Mars/Olympus_Mons").expect_err("unknown zone");
        assert_eq!(err.kind(), "InvalidZone");
    }
}
