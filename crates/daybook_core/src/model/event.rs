//! Calendar event model.
//!
//! # Responsibility
//! - Define the canonical `Event` value and its creation inputs.
//! - Derive event ids and own the ISO-8601 wire format for timestamps.
//!
//! # Invariants
//! - `title` is never blank; stored titles are trimmed.
//! - `id` is never empty and is fixed at creation.
//! - `end` is never earlier than `start` when set.
//! - `start`/`end` carry at most millisecond precision, the precision of the
//!   wire format, so a stored event reloads equal to itself.
//! - `all_day` is fixed at creation.

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Stable identifier of one event within the store.
pub type EventId = String;

/// UTC instant used for event boundaries.
pub type Timestamp = DateTime<Utc>;

/// Validation errors for event values and creation inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventValidationError {
    EmptyId,
    EmptyTitle,
    EndBeforeStart { start: Timestamp, end: Timestamp },
    InvalidTimestamp(String),
}

impl Display for EventValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyId => write!(f, "event id must not be empty"),
            Self::EmptyTitle => write!(f, "event title must not be blank"),
            Self::EndBeforeStart { start, end } => write!(
                f,
                "event end ({}) must be >= event start ({})",
                format_timestamp(end),
                format_timestamp(start)
            ),
            Self::InvalidTimestamp(value) => write!(f, "invalid timestamp `{value}`"),
        }
    }
}

impl Error for EventValidationError {}

/// One scheduled calendar entry.
///
/// Serialized as `{id, title, start, end?, allDay}` to match the persisted
/// snapshot layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "EventWire", into = "EventWire")]
pub struct Event {
    id: EventId,
    title: String,
    start: Timestamp,
    end: Option<Timestamp>,
    all_day: bool,
}

impl Event {
    /// Rebuilds an event from already-assigned parts.
    ///
    /// Used by snapshot decoding, where identity already exists. Sub-millisecond
    /// parts of `start`/`end` are truncated.
    ///
    /// # Errors
    /// - `EmptyId` when `id` is blank.
    /// - `EmptyTitle` when `title` is blank after trim.
    /// - `EndBeforeStart` when the range is reversed.
    pub fn restore(
        id: impl Into<EventId>,
        title: &str,
        start: Timestamp,
        end: Option<Timestamp>,
        all_day: bool,
    ) -> Result<Self, EventValidationError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(EventValidationError::EmptyId);
        }
        let title = normalize_title(title)?;
        let start = start.trunc_subsecs(3);
        let end = end.map(|end| end.trunc_subsecs(3));
        validate_range(start, end)?;
        Ok(Self {
            id,
            title,
            start,
            end,
            all_day,
        })
    }

    /// Builds a new event for `id` from a validated draft.
    pub(crate) fn from_draft(id: EventId, draft: &EventDraft) -> Result<Self, EventValidationError> {
        Self::restore(id, &draft.title, draft.start, draft.end, draft.all_day)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn start(&self) -> Timestamp {
        self.start
    }

    pub fn end(&self) -> Option<Timestamp> {
        self.end
    }

    pub fn all_day(&self) -> bool {
        self.all_day
    }

    /// Returns a copy of this event carrying `title`.
    ///
    /// Identity and time fields are preserved.
    pub fn with_title(&self, title: &str) -> Result<Self, EventValidationError> {
        Ok(Self {
            title: normalize_title(title)?,
            ..self.clone()
        })
    }

    /// Returns a copy of this event under another id.
    pub(crate) fn with_id(&self, id: EventId) -> Self {
        Self {
            id,
            ..self.clone()
        }
    }
}

/// Candidate event collected by the add dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventDraft {
    pub title: String,
    pub start: Timestamp,
    pub end: Option<Timestamp>,
    pub all_day: bool,
}

impl EventDraft {
    /// Checks title and range before the draft reaches the store.
    pub fn validate(&self) -> Result<(), EventValidationError> {
        normalize_title(&self.title)?;
        validate_range(self.start, self.end)
    }

    /// Id the store derives for this draft before collision handling.
    pub fn derived_id(&self) -> EventId {
        derive_event_id(self.start, self.title.trim())
    }
}

/// Range reported by the calendar surface when the user drags a selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectedRange {
    pub start: Timestamp,
    pub end: Option<Timestamp>,
    pub all_day: bool,
}

impl SelectedRange {
    pub fn new(start: Timestamp, end: Option<Timestamp>, all_day: bool) -> Self {
        Self {
            start,
            end,
            all_day,
        }
    }

    /// Combines this range with a user-entered title.
    pub fn to_draft(&self, title: impl Into<String>) -> EventDraft {
        EventDraft {
            title: title.into(),
            start: self.start,
            end: self.end,
            all_day: self.all_day,
        }
    }
}

/// Derives the creation-time id `"<start ISO>-<title>"`.
pub fn derive_event_id(start: Timestamp, title: &str) -> EventId {
    format!("{}-{}", format_timestamp(&start), title)
}

/// Formats an instant as ISO-8601 UTC with millisecond precision.
///
/// Example: `2024-05-01T09:00:00.000Z`.
pub fn format_timestamp(value: &Timestamp) -> String {
    value.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parses a persisted timestamp.
///
/// Accepts RFC 3339 with any offset, offset-less date-times (read as UTC),
/// and date-only values (midnight UTC) as written for all-day entries.
pub fn parse_timestamp(value: &str) -> Result<Timestamp, EventValidationError> {
    let trimmed = value.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(parsed.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(naive.and_utc());
    }
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
            return Ok(midnight.and_utc());
        }
    }
    Err(EventValidationError::InvalidTimestamp(trimmed.to_string()))
}

/// Trims a title and rejects blank input.
pub fn normalize_title(raw: &str) -> Result<String, EventValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(EventValidationError::EmptyTitle);
    }
    Ok(trimmed.to_string())
}

fn validate_range(start: Timestamp, end: Option<Timestamp>) -> Result<(), EventValidationError> {
    match end {
        Some(end) if end < start => Err(EventValidationError::EndBeforeStart { start, end }),
        _ => Ok(()),
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EventWire {
    id: String,
    title: String,
    start: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    end: Option<String>,
    #[serde(default)]
    all_day: bool,
}

impl TryFrom<EventWire> for Event {
    type Error = EventValidationError;

    fn try_from(wire: EventWire) -> Result<Self, Self::Error> {
        let start = parse_timestamp(&wire.start)?;
        let end = wire.end.as_deref().map(parse_timestamp).transpose()?;
        Event::restore(wire.id, &wire.title, start, end, wire.all_day)
    }
}

impl From<Event> for EventWire {
    fn from(event: Event) -> Self {
        Self {
            start: format_timestamp(&event.start),
            end: event.end.as_ref().map(format_timestamp),
            id: event.id,
            title: event.title,
            all_day: event.all_day,
        }
    }
}
