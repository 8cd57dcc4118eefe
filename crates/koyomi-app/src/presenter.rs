//! Output sink for command results.
//!
//! The interpreter never writes to stdout directly; everything a user
//! sees goes through a [`Presenter`]. A GUI front end would implement the
//! same seam over the same model.

use std::io::Write;

use koyomi_core::time;
use koyomi_model::event::Event;

/// Where confirmations, query results, and error reports go.
pub trait Presenter {
    /// Emits one complete output line.
    fn line(&mut self, text: &str);
}

/// Writes each line to an `io::Write` sink, newline-terminated.
pub struct WritePresenter<W: Write> {
    out: W,
}

impl<W: Write> WritePresenter<W> {
    pub const fn new(out: W) -> Self {
        Self { out }
    }
}

impl<W: Write> Presenter for WritePresenter<W> {
    fn line(&mut self, text: &str) {
        if let Err(err) = writeln!(self.out, "{text}") {
            tracing::warn!(error = %err, "failed to write output line");
        }
    }
}

/// Collects lines in memory; used by tests to assert whole transcripts.
#[derive(Debug, Default)]
pub struct VecPresenter {
    pub lines: Vec<String>,
}

impl Presenter for VecPresenter {
    fn line(&mut self, text: &str) {
        self.lines.push(text.to_string());
    }
}

/// Fixed single-line event rendering. Location is appended only when
/// present, never shown empty.
#[must_use]
pub fn format_event(event: &Event) -> String {
    let mut line = format!(
        "* subject: {}, startDateTime: {}, endDateTime: {}",
        event.subject,
        time::format_instant(&event.start),
        time::format_instant(&event.end),
    );
    if let Some(location) = &event.location {
        line.push_str(", location: ");
        line.push_str(location);
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use koyomi_core::time::{parse_datetime, resolve_zone, zone_local};
    use koyomi_model::event::Visibility;

    fn event(location: Option<&str>) -> Event {
        let zone = resolve_zone("America/New_York").expect("known zone");
        Event {
            subject: "Standup".to_string(),
            start: zone_local(parse_datetime("2025-01-01T09:00").expect("start"), zone)
                .expect("instant"),
            end: zone_local(parse_datetime("2025-01-01T09:15").expect("end"), zone)
                .expect("instant"),
            location: location.map(str::to_string),
            description: None,
            visibility: Visibility::default(),
            all_day: false,
            series_id: None,
        }
    }

    #[test]
    fn location_is_omitted_when_absent() {
        assert_eq!(
            format_event(&event(None)),
            "* subject: Standup, \
             startDateTime: 2025-01-01T09:00-05:00[America/New_York], \
             endDateTime: 2025-01-01T09:15-05:00[America/New_York]"
        );
    }

    #[test]
    fn location_is_appended_when_present() {
        let line = format_event(&event(Some("Room 4")));
        assert!(line.ends_with(", location: Room 4"));
    }
}
