//! A named, timezone-scoped container of events.
//!
//! The calendar enforces the duplicate rule: no two owned events may share
//! the `(subject, start, end)` identity. Overlapping-but-distinct events
//! are permitted. Batch mutations validate completely before committing,
//! so a rejected batch leaves the calendar untouched.

use chrono::DateTime;
use chrono_tz::Tz;
use koyomi_core::time;

use crate::error::{ModelError, ModelResult};
use crate::event::Event;

#[derive(Debug, Clone)]
pub struct Calendar {
    name: String,
    zone: Tz,
    events: Vec<Event>,
}

impl Calendar {
    #[must_use]
    pub fn new(name: impl Into<String>, zone: Tz) -> Self {
        Self {
            name: name.into(),
            zone,
            events: Vec::new(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn zone(&self) -> Tz {
        self.zone
    }

    #[must_use]
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// ## Summary
    /// Inserts one event, rejecting identity duplicates.
    ///
    /// ## Errors
    /// Returns `DuplicateEvent` if an event with the same
    /// `(subject, start, end)` already exists; the calendar is unchanged.
    pub fn insert(&mut self, event: Event) -> ModelResult<()> {
        if let Some(existing) = self.events.iter().find(|e| e.same_identity(&event)) {
            return Err(duplicate(existing));
        }
        tracing::debug!(calendar = %self.name, subject = %event.subject, "inserting event");
        self.events.push(event);
        Ok(())
    }

    /// ## Summary
    /// Inserts a batch of events atomically.
    ///
    /// The whole batch is validated (against existing events and within
    /// itself) before any member is committed.
    ///
    /// ## Errors
    /// Returns `DuplicateEvent` on the first collision; no event from the
    /// batch is committed.
    pub fn insert_batch(&mut self, batch: Vec<Event>) -> ModelResult<()> {
        for (i, candidate) in batch.iter().enumerate() {
            if let Some(existing) = self.events.iter().find(|e| e.same_identity(candidate)) {
                return Err(duplicate(existing));
            }
            if let Some(twin) = batch[..i].iter().find(|e| e.same_identity(candidate)) {
                return Err(duplicate(twin));
            }
        }
        tracing::debug!(calendar = %self.name, count = batch.len(), "inserting event batch");
        self.events.extend(batch);
        Ok(())
    }

    /// Finds the event matching a selector. `end` is optional so series
    /// scopes can select on `(subject, start)` alone.
    #[must_use]
    pub fn position(
        &self,
        subject: &str,
        start: &DateTime<Tz>,
        end: Option<&DateTime<Tz>>,
    ) -> Option<usize> {
        self.events.iter().position(|e| {
            e.subject == subject && e.start == *start && end.is_none_or(|end| e.end == *end)
        })
    }

    /// ## Summary
    /// Replaces events at the given indices atomically.
    ///
    /// The resulting set is checked for identity duplicates before the
    /// replacement is committed.
    ///
    /// ## Errors
    /// Returns `DuplicateEvent` if the replacement would violate the
    /// duplicate rule; the calendar is unchanged.
    pub fn commit_replacements(&mut self, replacements: Vec<(usize, Event)>) -> ModelResult<()> {
        let mut updated = self.events.clone();
        for (index, event) in replacements {
            updated[index] = event;
        }
        Self::ensure_no_duplicates(&updated)?;
        self.events = updated;
        Ok(())
    }

    /// Events whose interval intersects the half-open window, ordered by
    /// start instant then subject.
    #[must_use]
    pub fn events_intersecting(
        &self,
        window_start: &DateTime<Tz>,
        window_end: &DateTime<Tz>,
    ) -> Vec<Event> {
        let mut hits: Vec<Event> = self
            .events
            .iter()
            .filter(|e| e.intersects(window_start, window_end))
            .cloned()
            .collect();
        hits.sort_by(|a, b| a.start.cmp(&b.start).then_with(|| a.subject.cmp(&b.subject)));
        hits
    }

    /// Whether any event's interval contains the instant (start inclusive,
    /// end exclusive).
    #[must_use]
    pub fn is_busy(&self, instant: &DateTime<Tz>) -> bool {
        self.events.iter().any(|e| e.covers(instant))
    }

    fn ensure_no_duplicates(events: &[Event]) -> ModelResult<()> {
        for (i, event) in events.iter().enumerate() {
            if events[..i].iter().any(|e| e.same_identity(event)) {
                return Err(duplicate(event));
            }
        }
        Ok(())
    }
}

fn duplicate(event: &Event) -> ModelError {
    ModelError::DuplicateEvent(format!(
        "an event {:?} from {} to {} already exists",
        event.subject,
        time::format_instant(&event.start),
        time::format_instant(&event.end),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{EventSpec, EventWindow, Visibility};
    use koyomi_core::time::{parse_datetime, resolve_zone};

    fn calendar() -> Calendar {
        Calendar::new("Work", resolve_zone("America/New_York").expect("known zone"))
    }

    fn event(cal: &Calendar, subject: &str, start: &str, end: &str) -> Event {
        Event::from_spec(
            &EventSpec {
                subject: subject.to_string(),
                window: EventWindow::Timed {
                    start: parse_datetime(start).expect("valid start"),
                    end: parse_datetime(end).expect("valid end"),
                },
                location: None,
                description: None,
                visibility: Visibility::default(),
            },
            cal.zone(),
        )
        .expect("valid event")
    }

    #[test]
    fn duplicate_identity_is_rejected_and_calendar_unchanged() {
        let mut cal = calendar();
        let first = event(&cal, "Standup", "2025-01-01T09:00", "2025-01-01T09:15");
        cal.insert(first.clone()).expect("first insert");

        let err = cal.insert(first).expect_err("duplicate insert");
        assert_eq!(err.kind(), "DuplicateEvent");
        assert_eq!(cal.len(), 1);

        // Same subject with a different interval is not a duplicate
        let moved = event(&cal, "Standup", "2025-01-01T10:00", "2025-01-01T10:15");
        cal.insert(moved).expect("distinct interval");
        assert_eq!(cal.len(), 2);
    }

    #[test]
    fn overlapping_distinct_events_are_permitted() {
        let mut cal = calendar();
        cal.insert(event(&cal, "A", "2025-01-01T09:00", "2025-01-01T10:00"))
            .expect("insert A");
        cal.insert(event(&cal, "B", "2025-01-01T09:30", "2025-01-01T10:30"))
            .expect("overlap allowed");
        assert_eq!(cal.len(), 2);
    }

    #[test]
    fn batch_insert_is_atomic() {
        let mut cal = calendar();
        cal.insert(event(&cal, "A", "2025-01-01T09:00", "2025-01-01T10:00"))
            .expect("insert A");

        let batch = vec![
            event(&cal, "B", "2025-01-02T09:00", "2025-01-02T10:00"),
            event(&cal, "A", "2025-01-01T09:00", "2025-01-01T10:00"),
        ];
        assert!(cal.insert_batch(batch).is_err());
        assert_eq!(cal.len(), 1, "no batch member committed");
    }

    #[test]
    fn intersection_query_is_sorted_and_deterministic() {
        let mut cal = calendar();
        cal.insert(event(&cal, "B", "2025-01-01T09:00", "2025-01-01T10:00"))
            .expect("insert B");
        cal.insert(event(&cal, "A", "2025-01-01T09:00", "2025-01-01T09:30"))
            .expect("insert A");
        cal.insert(event(&cal, "C", "2025-01-02T09:00", "2025-01-02T10:00"))
            .expect("insert C");

        let start = event(&cal, "w", "2025-01-01T00:00", "2025-01-01T00:01").start;
        let end = event(&cal, "w", "2025-01-02T00:00", "2025-01-02T00:01").start;

        let first = cal.events_intersecting(&start, &end);
        let subjects: Vec<&str> = first.iter().map(|e| e.subject.as_str()).collect();
        assert_eq!(subjects, ["A", "B"]);

        let again = cal.events_intersecting(&start, &end);
        assert_eq!(again.len(), first.len());
        for (a, b) in first.iter().zip(again.iter()) {
            assert!(a.same_identity(b));
        }
    }
}
