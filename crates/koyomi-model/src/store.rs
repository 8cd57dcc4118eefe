//! The registry of calendars plus the current-calendar pointer.
//!
//! The pointer is explicit owned state, threaded through every model call
//! that needs an implicit target. Calendars are never deleted, so a set
//! pointer always refers to an existing calendar.

use std::collections::BTreeMap;

use chrono_tz::Tz;

use crate::calendar::Calendar;
use crate::error::{ModelError, ModelResult};

#[derive(Debug, Default)]
pub struct CalendarStore {
    calendars: BTreeMap<String, Calendar>,
    current: Option<String>,
}

impl CalendarStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// ## Errors
    /// Returns `DuplicateCalendar` if a calendar with this name exists.
    pub fn create(&mut self, name: &str, zone: Tz) -> ModelResult<()> {
        if self.calendars.contains_key(name) {
            return Err(ModelError::DuplicateCalendar(name.to_string()));
        }
        tracing::info!(calendar = %name, zone = %zone, "creating calendar");
        self.calendars
            .insert(name.to_string(), Calendar::new(name, zone));
        Ok(())
    }

    /// ## Errors
    /// Returns `UnknownCalendar` if no calendar has this name.
    pub fn get(&self, name: &str) -> ModelResult<&Calendar> {
        self.calendars
            .get(name)
            .ok_or_else(|| ModelError::UnknownCalendar(name.to_string()))
    }

    /// ## Errors
    /// Returns `UnknownCalendar` if no calendar has this name.
    pub fn get_mut(&mut self, name: &str) -> ModelResult<&mut Calendar> {
        self.calendars
            .get_mut(name)
            .ok_or_else(|| ModelError::UnknownCalendar(name.to_string()))
    }

    /// ## Errors
    /// Returns `UnknownCalendar` if no calendar has this name; the pointer
    /// is left unchanged.
    pub fn set_current(&mut self, name: &str) -> ModelResult<()> {
        let calendar = self.get(name)?;
        self.current = Some(calendar.name().to_string());
        Ok(())
    }

    #[must_use]
    pub fn current_name(&self) -> Option<&str> {
        self.current.as_deref()
    }

    /// ## Errors
    /// Returns `NoCurrentCalendar` (reported as `UnknownCalendar`) if no
    /// calendar is in use.
    pub fn current(&self) -> ModelResult<&Calendar> {
        let name = self.current.as_deref().ok_or(ModelError::NoCurrentCalendar)?;
        self.get(name)
    }

    /// ## Errors
    /// Returns `NoCurrentCalendar` (reported as `UnknownCalendar`) if no
    /// calendar is in use.
    pub fn current_mut(&mut self) -> ModelResult<&mut Calendar> {
        let name = self
            .current
            .clone()
            .ok_or(ModelError::NoCurrentCalendar)?;
        self.get_mut(&name)
    }
}
