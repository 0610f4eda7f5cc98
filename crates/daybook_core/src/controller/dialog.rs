//! Modal dialog state.
//!
//! # Invariants
//! - `ModalState::Adding` always carries the pending range.
//! - `ModalState::Editing` always carries the selected event id.

use crate::model::event::{normalize_title, EventDraft, EventId, EventValidationError, SelectedRange};
use crate::store::StoreError;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Errors from dialog interactions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogError {
    /// The requested action needs a dialog that is not open.
    NoActiveDialog { expected: &'static str },
    /// Title input is blank; the dialog stays open.
    EmptyTitle,
    Validation(EventValidationError),
    Store(StoreError),
}

impl Display for DialogError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoActiveDialog { expected } => write!(f, "no {expected} dialog is open"),
            Self::EmptyTitle => write!(f, "event title is required"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for DialogError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Store(err) => Some(err),
            _ => None,
        }
    }
}

impl From<EventValidationError> for DialogError {
    fn from(value: EventValidationError) -> Self {
        match value {
            EventValidationError::EmptyTitle => Self::EmptyTitle,
            other => Self::Validation(other),
        }
    }
}

impl From<StoreError> for DialogError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::Validation(err) => err.into(),
            other => Self::Store(other),
        }
    }
}

/// Add dialog: pending range plus title input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddDialog {
    range: SelectedRange,
    title: String,
}

impl AddDialog {
    pub fn new(range: SelectedRange) -> Self {
        Self {
            range,
            title: String::new(),
        }
    }

    pub fn range(&self) -> &SelectedRange {
        &self.range
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    /// Builds the candidate event, rejecting a blank title.
    pub fn draft(&self) -> Result<EventDraft, DialogError> {
        let title = normalize_title(&self.title)?;
        let draft = self.range.to_draft(title);
        draft.validate()?;
        Ok(draft)
    }
}

/// Edit dialog: selected event id plus an editable copy of its title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditDialog {
    event_id: EventId,
    original_title: String,
    draft_title: String,
}

impl EditDialog {
    pub fn new(event_id: impl Into<EventId>, current_title: impl Into<String>) -> Self {
        let current_title = current_title.into();
        Self {
            event_id: event_id.into(),
            draft_title: current_title.clone(),
            original_title: current_title,
        }
    }

    pub fn event_id(&self) -> &str {
        &self.event_id
    }

    pub fn original_title(&self) -> &str {
        &self.original_title
    }

    pub fn title(&self) -> &str {
        &self.draft_title
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.draft_title = title.into();
    }

    pub fn is_dirty(&self) -> bool {
        self.draft_title != self.original_title
    }

    /// Normalized title to save, rejecting blank input.
    pub fn submitted_title(&self) -> Result<String, DialogError> {
        Ok(normalize_title(&self.draft_title)?)
    }
}

/// Which dialog, if any, is open.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ModalState {
    #[default]
    Closed,
    Adding(AddDialog),
    Editing(EditDialog),
}

impl ModalState {
    pub fn is_closed(&self) -> bool {
        matches!(self, Self::Closed)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Closed => "closed",
            Self::Adding(_) => "adding",
            Self::Editing(_) => "editing",
        }
    }
}
