//! Store commands and the pure reducer that applies them.

use crate::model::event::{Event, EventDraft, EventId, EventValidationError};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Errors from applying commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    Validation(EventValidationError),
    /// Internal mismatch between a command and the change it produced.
    InconsistentState(&'static str),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::InconsistentState(details) => write!(f, "inconsistent store state: {details}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::InconsistentState(_) => None,
        }
    }
}

impl From<EventValidationError> for StoreError {
    fn from(value: EventValidationError) -> Self {
        Self::Validation(value)
    }
}

/// One requested mutation of the event collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Add(EventDraft),
    Update { id: EventId, title: String },
    Remove { id: EventId },
}

/// Effective change produced by a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Change {
    Added(Event),
    Updated { previous: Event, current: Event },
    Removed(Event),
}

impl Change {
    pub fn event_id(&self) -> &str {
        match self {
            Self::Added(event) | Self::Removed(event) => event.id(),
            Self::Updated { current, .. } => current.id(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Added(_) => "add",
            Self::Updated { .. } => "update",
            Self::Removed(_) => "remove",
        }
    }
}

/// Next collection plus the change that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reduced {
    pub events: Vec<Event>,
    pub change: Change,
}

/// Applies `command` to `events` without touching the input.
///
/// Returns `Ok(None)` when the command targets an id that is not present.
///
/// # Errors
/// - `Validation` when an add draft or a new title is invalid.
pub fn reduce(events: &[Event], command: Command) -> Result<Option<Reduced>, StoreError> {
    match command {
        Command::Add(draft) => {
            draft.validate()?;
            let id = unique_id(events, draft.derived_id());
            let event = Event::from_draft(id, &draft)?;
            let mut next = events.to_vec();
            next.push(event.clone());
            Ok(Some(Reduced {
                events: next,
                change: Change::Added(event),
            }))
        }
        Command::Update { id, title } => {
            let Some(index) = position(events, &id) else {
                return Ok(None);
            };
            let previous = events[index].clone();
            let current = previous.with_title(&title)?;
            let mut next = events.to_vec();
            next[index] = current.clone();
            Ok(Some(Reduced {
                events: next,
                change: Change::Updated { previous, current },
            }))
        }
        Command::Remove { id } => {
            let Some(index) = position(events, &id) else {
                return Ok(None);
            };
            let mut next = events.to_vec();
            let removed = next.remove(index);
            Ok(Some(Reduced {
                events: next,
                change: Change::Removed(removed),
            }))
        }
    }
}

fn position(events: &[Event], id: &str) -> Option<usize> {
    events.iter().position(|event| event.id() == id)
}

/// Returns `base`, or `base-2`, `base-3`, ... when `base` is already taken
/// in `events`.
pub(crate) fn unique_id(events: &[Event], base: EventId) -> EventId {
    if position(events, &base).is_none() {
        return base;
    }
    let mut suffix = 2_u64;
    loop {
        let candidate = format!("{base}-{suffix}");
        if position(events, &candidate).is_none() {
            return candidate;
        }
        suffix += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::{reduce, Change, Command, StoreError};
    use crate::model::event::{EventDraft, EventValidationError};
    use chrono::{TimeZone, Utc};

    fn draft(title: &str) -> EventDraft {
        EventDraft {
            title: title.to_string(),
            start: Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap(),
            end: Some(Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap()),
            all_day: false,
        }
    }

    #[test]
    fn add_appends_and_leaves_input_untouched() {
        let empty = Vec::new();
        let reduced = reduce(&empty, Command::Add(draft("Standup")))
            .unwrap()
            .unwrap();
        assert!(empty.is_empty());
        assert_eq!(reduced.events.len(), 1);
        assert!(matches!(reduced.change, Change::Added(_)));
    }

    #[test]
    fn colliding_ids_get_numeric_suffix() {
        let first = reduce(&[], Command::Add(draft("Standup"))).unwrap().unwrap();
        let second = reduce(&first.events, Command::Add(draft("Standup")))
            .unwrap()
            .unwrap();
        let third = reduce(&second.events, Command::Add(draft("Standup")))
            .unwrap()
            .unwrap();

        let ids = third
            .events
            .iter()
            .map(|event| event.id().to_string())
            .collect::<Vec<_>>();
        assert_eq!(
            ids,
            vec![
                "2024-05-01T09:00:00.000Z-Standup",
                "2024-05-01T09:00:00.000Z-Standup-2",
                "2024-05-01T09:00:00.000Z-Standup-3",
            ]
        );
    }

    #[test]
    fn missing_targets_are_no_ops() {
        let added = reduce(&[], Command::Add(draft("Standup"))).unwrap().unwrap();
        let update = Command::Update {
            id: "missing".to_string(),
            title: "x".to_string(),
        };
        assert_eq!(reduce(&added.events, update).unwrap(), None);
        let remove = Command::Remove {
            id: "missing".to_string(),
        };
        assert_eq!(reduce(&added.events, remove).unwrap(), None);
    }

    #[test]
    fn blank_titles_are_rejected() {
        let err = reduce(&[], Command::Add(draft("   "))).unwrap_err();
        assert_eq!(err, StoreError::Validation(EventValidationError::EmptyTitle));

        let added = reduce(&[], Command::Add(draft("Standup"))).unwrap().unwrap();
        let id = added.events[0].id().to_string();
        let err = reduce(
            &added.events,
            Command::Update {
                id,
                title: "\t".to_string(),
            },
        )
        .unwrap_err();
        assert_eq!(err, StoreError::Validation(EventValidationError::EmptyTitle));
    }
}
