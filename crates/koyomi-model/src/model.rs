//! The scheduling model façade: the capability surface consumed by the
//! command interpreter (and any other presentation adapter).
//!
//! Every operation validates its inputs before touching the store; batch
//! operations (series expansion, bulk copy) validate the whole batch
//! before any member is committed.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use chrono_tz::Tz;
use koyomi_core::time;

use crate::error::{ModelError, ModelResult};
use crate::event::{Event, EventPatch, EventSpec, EventWindow, all_day_window};
use crate::series::{self, SeriesSpec};
use crate::store::CalendarStore;

/// Which occurrences an edit applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EditScope {
    /// The selected occurrence only.
    #[default]
    This,
    /// The selected occurrence and all later occurrences of its series.
    Following,
    /// Every occurrence of the selected event's series.
    All,
}

/// Selects one event in the current calendar by its identity tuple.
#[derive(Debug, Clone)]
pub struct EventSelector {
    pub subject: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

#[derive(Debug, Default)]
pub struct SchedulingModel {
    store: CalendarStore,
}

impl SchedulingModel {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// ## Summary
    /// Creates a calendar. The first calendar created becomes the current
    /// calendar, so a script can start scheduling without an explicit
    /// `use calendar`.
    ///
    /// ## Errors
    /// `DuplicateCalendar` for an existing name, `InvalidZone` for an
    /// unrecognized zone identifier.
    pub fn create_calendar(&mut self, name: &str, zone_id: &str) -> ModelResult<()> {
        let zone = time::resolve_zone(zone_id)?;
        self.store.create(name, zone)?;
        if self.store.current_name().is_none() {
            self.store.set_current(name)?;
        }
        Ok(())
    }

    /// ## Errors
    /// `UnknownCalendar` if no calendar has this name.
    pub fn use_calendar(&mut self, name: &str) -> ModelResult<()> {
        self.store.set_current(name)
    }

    #[must_use]
    pub fn current_calendar(&self) -> Option<&str> {
        self.store.current_name()
    }

    /// ## Summary
    /// Validates and inserts one event into the current calendar.
    ///
    /// ## Errors
    /// `UnknownCalendar` without a current calendar, `DuplicateEvent` for
    /// an identity collision, `MalformedDateTime` for invariant
    /// violations.
    pub fn create_event(&mut self, spec: &EventSpec) -> ModelResult<Event> {
        let calendar = self.store.current_mut()?;
        let event = Event::from_spec(spec, calendar.zone())?;
        calendar.insert(event.clone())?;
        Ok(event)
    }

    /// ## Summary
    /// Expands a series and inserts all occurrences atomically into the
    /// current calendar. Returns the occurrence count.
    ///
    /// ## Errors
    /// `InvalidRecurrence` for a bad pattern; `DuplicateEvent` if any
    /// occurrence collides, in which case zero occurrences are committed.
    pub fn create_series(&mut self, spec: &SeriesSpec) -> ModelResult<usize> {
        let calendar = self.store.current_mut()?;
        let occurrences = series::expand(spec, calendar.zone())?;
        let count = occurrences.len();
        calendar.insert_batch(occurrences)?;
        Ok(count)
    }

    /// ## Summary
    /// Applies a single-field patch to the selected event, or to its
    /// series occurrences under `Following`/`All` scope. Returns how many
    /// events changed.
    ///
    /// For `Following`/`All`, a `start`/`end` patch re-times each
    /// occurrence on its own date (occurrences keep their dates and stay
    /// within one local day).
    ///
    /// ## Errors
    /// `EventNotFound` if the selector matches nothing; `DuplicateEvent`
    /// or `MalformedDateTime` if the patched set would violate an
    /// invariant — nothing is committed in that case.
    pub fn edit_event(
        &mut self,
        selector: &EventSelector,
        patch: &EventPatch,
        scope: EditScope,
    ) -> ModelResult<usize> {
        let calendar = self.store.current_mut()?;
        let zone = calendar.zone();
        let start = time::zone_local(selector.start, zone)?;
        let end = time::zone_local(selector.end, zone)?;

        let index = calendar
            .position(&selector.subject, &start, Some(&end))
            .ok_or_else(|| {
                ModelError::EventNotFound(format!(
                    "no event {:?} from {} to {}",
                    selector.subject,
                    time::format_instant(&start),
                    time::format_instant(&end),
                ))
            })?;
        let anchor = calendar.events()[index].clone();

        let targets: Vec<usize> = match (scope, anchor.series_id) {
            (EditScope::This, _) | (_, None) => vec![index],
            (EditScope::Following | EditScope::All, Some(series_id)) => calendar
                .events()
                .iter()
                .enumerate()
                .filter(|(_, e)| e.series_id == Some(series_id))
                .filter(|(_, e)| scope == EditScope::All || e.start >= anchor.start)
                .map(|(i, _)| i)
                .collect(),
        };

        let mut replacements = Vec::with_capacity(targets.len());
        for target in targets {
            let patched = apply_patch(&calendar.events()[target], patch, scope, zone)?;
            replacements.push((target, patched));
        }
        let count = replacements.len();
        calendar.commit_replacements(replacements)?;
        tracing::info!(field = patch.field_name(), count, "edited events");
        Ok(count)
    }

    /// ## Summary
    /// Copies one event from the current calendar into a target calendar
    /// at a new start, preserving the event's duration. The copy is an
    /// independent event: it drops series membership and is re-based
    /// through the target calendar's zone.
    ///
    /// ## Errors
    /// `EventNotFound`, `UnknownCalendar`, or `DuplicateEvent` as
    /// applicable.
    pub fn copy_event(
        &mut self,
        subject: &str,
        start: NaiveDateTime,
        target: &str,
        new_start: NaiveDateTime,
    ) -> ModelResult<Event> {
        let source = self.store.current()?;
        let start_instant = time::zone_local(start, source.zone())?;
        let index = source.position(subject, &start_instant, None).ok_or_else(|| {
            ModelError::EventNotFound(format!(
                "no event {subject:?} starting at {}",
                time::format_instant(&start_instant)
            ))
        })?;
        let original = source.events()[index].clone();
        let duration = original.duration();

        let destination = self.store.get_mut(target)?;
        let new_start_instant = time::zone_local(new_start, destination.zone())?;

        let mut copy = original;
        copy.start = new_start_instant;
        copy.end = new_start_instant + duration;
        copy.all_day = copy.all_day && new_start.time() == NaiveTime::MIN;
        copy.series_id = None;

        destination.insert(copy.clone())?;
        Ok(copy)
    }

    /// ## Summary
    /// Copies every event scheduled on a date into a target calendar,
    /// shifted to the target date. Atomic: either all copies commit or
    /// none do. Returns the number of events copied (zero is not an
    /// error).
    ///
    /// ## Errors
    /// `UnknownCalendar` or `DuplicateEvent` as applicable.
    pub fn copy_events_on(
        &mut self,
        date: NaiveDate,
        target: &str,
        to: NaiveDate,
    ) -> ModelResult<usize> {
        self.copy_window(date, date, target, to)
    }

    /// ## Summary
    /// Copies every event in an inclusive date range into a target
    /// calendar, with the range start mapped onto the target date.
    /// Atomic like [`Self::copy_events_on`].
    ///
    /// ## Errors
    /// `MalformedDateTime` if the range is inverted, otherwise as
    /// [`Self::copy_events_on`].
    pub fn copy_events_between(
        &mut self,
        from: NaiveDate,
        until: NaiveDate,
        target: &str,
        to: NaiveDate,
    ) -> ModelResult<usize> {
        if from > until {
            return Err(ModelError::InvalidEvent(format!(
                "range start {from} is after range end {until}"
            )));
        }
        self.copy_window(from, until, target, to)
    }

    /// ## Summary
    /// Events whose interval intersects the given local date, ordered by
    /// start instant then subject. An empty result is not an error.
    ///
    /// ## Errors
    /// `UnknownCalendar` without a current calendar.
    pub fn events_on(&self, date: NaiveDate) -> ModelResult<Vec<Event>> {
        let calendar = self.store.current()?;
        let (start, end) = all_day_window(date, calendar.zone())?;
        Ok(calendar.events_intersecting(&start, &end))
    }

    /// ## Summary
    /// Events whose interval intersects the half-open window, ordered by
    /// start instant then subject.
    ///
    /// ## Errors
    /// `MalformedDateTime` if the window is inverted, `UnknownCalendar`
    /// without a current calendar.
    pub fn events_in_range(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> ModelResult<Vec<Event>> {
        let calendar = self.store.current()?;
        let zone = calendar.zone();
        if start >= end {
            return Err(ModelError::InvalidEvent(format!(
                "range start {start} is not before range end {end}"
            )));
        }
        let window_start = time::zone_local(start, zone)?;
        let window_end = time::zone_local(end, zone)?;
        Ok(calendar.events_intersecting(&window_start, &window_end))
    }

    /// ## Summary
    /// Whether any event's interval contains the instant (start
    /// inclusive, end exclusive).
    ///
    /// ## Errors
    /// `UnknownCalendar` without a current calendar.
    pub fn is_busy(&self, at: NaiveDateTime) -> ModelResult<bool> {
        let calendar = self.store.current()?;
        let instant = time::zone_local(at, calendar.zone())?;
        Ok(calendar.is_busy(&instant))
    }

    fn copy_window(
        &mut self,
        from: NaiveDate,
        until: NaiveDate,
        target: &str,
        to: NaiveDate,
    ) -> ModelResult<usize> {
        let source = self.store.current()?;
        let zone = source.zone();
        let (window_start, _) = all_day_window(from, zone)?;
        let (_, window_end) = all_day_window(until, zone)?;
        let originals = source.events_intersecting(&window_start, &window_end);

        let offset = TimeDelta::days(to.signed_duration_since(from).num_days());
        let destination = self.store.get_mut(target)?;
        let dest_zone = destination.zone();

        let mut copies = Vec::with_capacity(originals.len());
        for event in originals {
            copies.push(shift_copy(&event, offset, dest_zone)?);
        }
        let count = copies.len();
        destination.insert_batch(copies)?;
        tracing::info!(target, count, "copied events");
        Ok(count)
    }
}

/// Rebuilds an event on a date shifted by `offset`, keeping its local
/// wall-clock times, interpreted in the destination zone.
fn shift_copy(event: &Event, offset: TimeDelta, dest_zone: Tz) -> ModelResult<Event> {
    let start_date = event
        .start
        .date_naive()
        .checked_add_signed(offset)
        .ok_or_else(|| ModelError::InvalidEvent("shifted date is out of range".to_string()))?;

    let window = if event.all_day {
        EventWindow::AllDay { date: start_date }
    } else {
        let end_date = event
            .end
            .date_naive()
            .checked_add_signed(offset)
            .ok_or_else(|| ModelError::InvalidEvent("shifted date is out of range".to_string()))?;
        EventWindow::Timed {
            start: start_date.and_time(event.start.time()),
            end: end_date.and_time(event.end.time()),
        }
    };

    let spec = EventSpec {
        subject: event.subject.clone(),
        window,
        location: event.location.clone(),
        description: event.description.clone(),
        visibility: event.visibility,
    };
    Event::from_spec(&spec, dest_zone)
}

fn apply_patch(
    event: &Event,
    patch: &EventPatch,
    scope: EditScope,
    zone: Tz,
) -> ModelResult<Event> {
    let mut updated = event.clone();
    match patch {
        EventPatch::Subject(subject) => {
            if subject.trim().is_empty() {
                return Err(ModelError::InvalidEvent(
                    "subject must not be empty".to_string(),
                ));
            }
            updated.subject = subject.clone();
        }
        EventPatch::Start(value) => {
            let local = match scope {
                EditScope::This => *value,
                EditScope::Following | EditScope::All => {
                    updated.start.date_naive().and_time(value.time())
                }
            };
            updated.start = time::zone_local(local, zone)?;
            updated.all_day = false;
        }
        EventPatch::End(value) => {
            let local = match scope {
                EditScope::This => *value,
                EditScope::Following | EditScope::All => {
                    updated.end.date_naive().and_time(value.time())
                }
            };
            updated.end = time::zone_local(local, zone)?;
            updated.all_day = false;
        }
        EventPatch::Location(text) => {
            updated.location = non_empty(text);
        }
        EventPatch::Description(text) => {
            updated.description = non_empty(text);
        }
        EventPatch::Visibility(visibility) => {
            updated.visibility = *visibility;
        }
    }

    if updated.start >= updated.end {
        return Err(ModelError::InvalidEvent(format!(
            "start {} is not before end {}",
            time::format_instant(&updated.start),
            time::format_instant(&updated.end),
        )));
    }
    Ok(updated)
}

/// An empty value clears an optional text field; the presenter omits
/// absent fields rather than showing them empty.
fn non_empty(text: &str) -> Option<String> {
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
