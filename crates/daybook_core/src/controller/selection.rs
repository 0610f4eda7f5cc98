//! Selection controller: surface signals in, store commands out.
//!
//! # Invariants
//! - Opening a dialog replaces whichever dialog was open.
//! - Failed submissions (blank title) leave the dialog open and the store
//!   untouched.
//! - A persistence failure never rolls back the in-memory change; it is
//!   surfaced as a `Notice`.

use crate::controller::collaborators::{CalendarSurface, ConfirmPrompt, DELETE_CONFIRMATION};
use crate::controller::dialog::{AddDialog, DialogError, EditDialog, ModalState};
use crate::model::event::{Event, SelectedRange};
use crate::persist::SnapshotPersistence;
use crate::repo::slot_repo::SlotStore;
use crate::store::{ChangeReport, EventStore, PersistStatus, SnapshotListener};
use crate::view::sidebar::SidebarView;
use log::{debug, info, warn};
use std::mem;

/// Non-fatal messages the UI should show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// Writes are failing; changes are kept only for this session.
    PersistenceDegraded { message: String },
    /// A write succeeded after earlier failures.
    PersistenceRestored,
}

/// Result of a delete request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted(ChangeReport),
    /// User declined the prompt; the edit dialog stays open.
    Declined,
}

/// Owns the event store and the modal state.
pub struct SelectionController<S: SlotStore> {
    store: EventStore<S>,
    modal: ModalState,
    notices: Vec<Notice>,
}

impl<S: SlotStore> SelectionController<S> {
    /// Loads the initial snapshot and starts with no dialog open.
    pub fn bootstrap(persistence: SnapshotPersistence<S>) -> Self {
        Self::with_store(EventStore::open(persistence))
    }

    /// Wraps an opened store. A store that could not read its snapshot
    /// raises a degraded notice right away.
    pub fn with_store(store: EventStore<S>) -> Self {
        let notices = store
            .read_failure()
            .map(|reason| Notice::PersistenceDegraded {
                message: format!("saved events could not be read: {reason}"),
            })
            .into_iter()
            .collect();
        Self {
            store,
            modal: ModalState::Closed,
            notices,
        }
    }

    /// Registers a snapshot listener (calendar surface, sidebar, ...).
    ///
    /// The listener receives the loaded snapshot right away, which is how a
    /// surface gets its initial events at mount.
    pub fn subscribe(&mut self, listener: Box<dyn SnapshotListener + Send>) {
        self.store.subscribe(listener);
    }

    pub fn store(&self) -> &EventStore<S> {
        &self.store
    }

    pub fn modal(&self) -> &ModalState {
        &self.modal
    }

    pub fn snapshot(&self) -> &[Event] {
        self.store.snapshot()
    }

    pub fn sidebar(&self) -> SidebarView {
        SidebarView::project(self.store.snapshot())
    }

    /// Drains pending notices in the order they were raised.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        mem::take(&mut self.notices)
    }

    /// Range selected on the surface: open the add dialog for it.
    pub fn on_range_select(&mut self, range: SelectedRange) {
        self.replace_modal(ModalState::Adding(AddDialog::new(range)));
    }

    /// Event clicked on the surface: open the edit dialog prefilled with its
    /// current title.
    ///
    /// Returns `false` (and changes nothing) when `event_id` is not in the
    /// store.
    pub fn on_event_click(&mut self, event_id: &str) -> bool {
        let Some(event) = self.store.get(event_id) else {
            debug!("event=event_click module=controller status=ignored reason=unknown_id");
            return false;
        };
        let dialog = EditDialog::new(event.id(), event.title());
        self.replace_modal(ModalState::Editing(dialog));
        true
    }

    /// Updates the title input of whichever dialog is open.
    pub fn set_title(&mut self, title: impl Into<String>) -> Result<(), DialogError> {
        match &mut self.modal {
            ModalState::Adding(dialog) => dialog.set_title(title),
            ModalState::Editing(dialog) => dialog.set_title(title),
            ModalState::Closed => {
                return Err(DialogError::NoActiveDialog {
                    expected: "add or edit",
                })
            }
        }
        Ok(())
    }

    /// Submits the add dialog.
    ///
    /// On success the dialog closes, the pending range is discarded and the
    /// surface is told to clear its selection.
    pub fn submit_add(&mut self, surface: &mut dyn CalendarSurface) -> Result<Event, DialogError> {
        let ModalState::Adding(dialog) = &self.modal else {
            return Err(DialogError::NoActiveDialog { expected: "add" });
        };
        let draft = dialog.draft()?;

        let was_degraded = self.store.is_degraded();
        let (event, report) = self.store.add(draft)?;
        surface.unselect();
        self.modal = ModalState::Closed;
        self.record(&report, was_degraded);
        info!("event=dialog_submit module=controller status=ok dialog=add");
        Ok(event)
    }

    /// Closes the add dialog without touching the store.
    pub fn cancel_add(&mut self) -> bool {
        if !matches!(self.modal, ModalState::Adding(_)) {
            return false;
        }
        self.modal = ModalState::Closed;
        debug!("event=dialog_cancel module=controller status=ok dialog=add");
        true
    }

    /// Saves the edit dialog's title.
    pub fn save_edit(&mut self) -> Result<ChangeReport, DialogError> {
        let ModalState::Editing(dialog) = &self.modal else {
            return Err(DialogError::NoActiveDialog { expected: "edit" });
        };
        let title = dialog.submitted_title()?;
        let event_id = dialog.event_id().to_string();

        let was_degraded = self.store.is_degraded();
        let report = self.store.update(&event_id, &title)?;
        self.modal = ModalState::Closed;
        self.record(&report, was_degraded);
        info!(
            "event=dialog_submit module=controller status=ok dialog=edit changed={}",
            report.is_changed()
        );
        Ok(report)
    }

    /// Deletes the selected event after the prompt confirms.
    pub fn delete_selected(
        &mut self,
        prompt: &mut dyn ConfirmPrompt,
    ) -> Result<DeleteOutcome, DialogError> {
        let ModalState::Editing(dialog) = &self.modal else {
            return Err(DialogError::NoActiveDialog { expected: "edit" });
        };
        let event_id = dialog.event_id().to_string();

        if !prompt.confirm(DELETE_CONFIRMATION) {
            debug!("event=delete_prompt module=controller status=declined");
            return Ok(DeleteOutcome::Declined);
        }

        let was_degraded = self.store.is_degraded();
        let report = self.store.remove(&event_id);
        self.modal = ModalState::Closed;
        self.record(&report, was_degraded);
        info!(
            "event=dialog_delete module=controller status=ok changed={}",
            report.is_changed()
        );
        Ok(DeleteOutcome::Deleted(report))
    }

    /// Closes the edit dialog without touching the store.
    pub fn cancel_edit(&mut self) -> bool {
        if !matches!(self.modal, ModalState::Editing(_)) {
            return false;
        }
        self.modal = ModalState::Closed;
        debug!("event=dialog_cancel module=controller status=ok dialog=edit");
        true
    }

    /// Closes whichever dialog is open.
    pub fn close(&mut self) {
        self.replace_modal(ModalState::Closed);
    }

    fn replace_modal(&mut self, next: ModalState) {
        let previous = mem::replace(&mut self.modal, next);
        debug!(
            "event=modal_transition module=controller from={} to={}",
            previous.label(),
            self.modal.label()
        );
    }

    fn record(&mut self, report: &ChangeReport, was_degraded: bool) {
        match &report.persist {
            PersistStatus::Failed(message) => {
                warn!("event=persistence_degraded module=controller status=warn");
                self.notices.push(Notice::PersistenceDegraded {
                    message: message.clone(),
                });
            }
            PersistStatus::Saved if was_degraded => {
                self.notices.push(Notice::PersistenceRestored);
            }
            PersistStatus::Saved | PersistStatus::Skipped => {}
        }
    }
}
