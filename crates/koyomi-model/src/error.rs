use koyomi_core::error::CoreError;
use thiserror::Error;

/// Scheduling model errors - every rejected operation maps to one of these
#[derive(Error, Debug)]
pub enum ModelError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("calendar {0:?} already exists")]
    DuplicateCalendar(String),

    #[error("no calendar named {0:?}")]
    UnknownCalendar(String),

    #[error("no calendar selected; run `use calendar` first")]
    NoCurrentCalendar,

    #[error("{0}")]
    DuplicateEvent(String),

    #[error("{0}")]
    InvalidRecurrence(String),

    #[error("{0}")]
    EventNotFound(String),

    #[error("{0}")]
    InvalidEvent(String),
}

impl ModelError {
    /// Stable kind name used in `Error: <kind>: <detail>` report lines.
    ///
    /// Interval and subject violations report as `MalformedDateTime`, the
    /// kind the command contract assigns to invariant violations at event
    /// construction.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Core(err) => err.kind(),
            Self::DuplicateCalendar(_) => "DuplicateCalendar",
            Self::UnknownCalendar(_) | Self::NoCurrentCalendar => "UnknownCalendar",
            Self::DuplicateEvent(_) => "DuplicateEvent",
            Self::InvalidRecurrence(_) => "InvalidRecurrence",
            Self::EventNotFound(_) => "EventNotFound",
            Self::InvalidEvent(_) => "MalformedDateTime",
        }
    }
}

pub type ModelResult<T> = std::result::Result<T, ModelError>;
