//! Event store: single writable owner of the event collection.
//!
//! # Invariants
//! - Every effective change is persisted before listeners are notified.
//! - A failed write keeps the in-memory change and marks the store degraded.
//! - If the persisted snapshot could not be read at open, the store never
//!   writes it for the rest of the session, so unread data is not overwritten.
//! - No-op commands neither write nor notify.

use crate::model::event::{Event, EventDraft};
use crate::persist::{LoadStatus, SnapshotPersistence};
use crate::repo::slot_repo::SlotStore;
use crate::store::command::{reduce, Change, Command, StoreError};
use log::{debug, info, warn};

/// Receives the full snapshot after every change.
pub trait SnapshotListener {
    fn snapshot_changed(&mut self, snapshot: &[Event]);
}

impl<F> SnapshotListener for F
where
    F: FnMut(&[Event]),
{
    fn snapshot_changed(&mut self, snapshot: &[Event]) {
        self(snapshot)
    }
}

/// Outcome of writing the snapshot after a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistStatus {
    /// Command was a no-op; nothing was written.
    Skipped,
    Saved,
    /// Write failed; the change lives in memory only.
    Failed(String),
}

/// Result of one applied command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeReport {
    pub change: Option<Change>,
    pub persist: PersistStatus,
}

impl ChangeReport {
    fn unchanged() -> Self {
        Self {
            change: None,
            persist: PersistStatus::Skipped,
        }
    }

    pub fn is_changed(&self) -> bool {
        self.change.is_some()
    }

    /// Event created by an add command.
    pub fn added(&self) -> Option<&Event> {
        match &self.change {
            Some(Change::Added(event)) => Some(event),
            _ => None,
        }
    }

    pub fn persist_failed(&self) -> bool {
        matches!(self.persist, PersistStatus::Failed(_))
    }
}

/// Authoritative event collection bound to snapshot persistence.
pub struct EventStore<S: SlotStore> {
    events: Vec<Event>,
    persistence: SnapshotPersistence<S>,
    listeners: Vec<Box<dyn SnapshotListener + Send>>,
    degraded: bool,
    read_failure: Option<String>,
}

impl<S: SlotStore> EventStore<S> {
    /// Loads the persisted snapshot once and takes ownership of persistence.
    ///
    /// When the slot cannot be read the store starts empty, degraded and with
    /// writes suspended.
    pub fn open(persistence: SnapshotPersistence<S>) -> Self {
        let loaded = persistence.load_snapshot();
        let read_failure = match loaded.status {
            LoadStatus::ReadFailed(message) => {
                warn!(
                    "event=store_open module=store status=degraded key={} error_code=snapshot_read_failed",
                    persistence.key()
                );
                Some(message)
            }
            LoadStatus::Absent | LoadStatus::Loaded | LoadStatus::Malformed => {
                info!(
                    "event=store_open module=store status=ok key={} count={}",
                    persistence.key(),
                    loaded.events.len()
                );
                None
            }
        };
        Self {
            events: loaded.events,
            persistence,
            listeners: Vec::new(),
            degraded: read_failure.is_some(),
            read_failure,
        }
    }

    /// Registers a listener and immediately delivers the current snapshot.
    pub fn subscribe(&mut self, mut listener: Box<dyn SnapshotListener + Send>) {
        listener.snapshot_changed(&self.events);
        self.listeners.push(listener);
    }

    /// Current collection in display order.
    pub fn snapshot(&self) -> &[Event] {
        &self.events
    }

    pub fn get(&self, id: &str) -> Option<&Event> {
        self.events.iter().find(|event| event.id() == id)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Whether the last write attempt failed, or the initial read did.
    pub fn is_degraded(&self) -> bool {
        self.degraded
    }

    /// Read error from open; set means writes are suspended.
    pub fn read_failure(&self) -> Option<&str> {
        self.read_failure.as_deref()
    }

    pub fn persistence(&self) -> &SnapshotPersistence<S> {
        &self.persistence
    }

    /// Creates an event from `draft` and returns it.
    pub fn add(&mut self, draft: EventDraft) -> Result<(Event, ChangeReport), StoreError> {
        let report = self.apply(Command::Add(draft))?;
        let event = report
            .added()
            .cloned()
            .ok_or(StoreError::InconsistentState("add produced no event"))?;
        Ok((event, report))
    }

    /// Replaces the title of `id`; no-op when absent.
    pub fn update(&mut self, id: &str, title: &str) -> Result<ChangeReport, StoreError> {
        self.apply(Command::Update {
            id: id.to_string(),
            title: title.to_string(),
        })
    }

    /// Removes `id`; no-op when absent.
    pub fn remove(&mut self, id: &str) -> ChangeReport {
        match self.apply(Command::Remove { id: id.to_string() }) {
            Ok(report) => report,
            // Removal carries no input to validate.
            Err(_) => ChangeReport::unchanged(),
        }
    }

    /// Applies one command, then persists and notifies when it changed
    /// anything.
    pub fn apply(&mut self, command: Command) -> Result<ChangeReport, StoreError> {
        let Some(reduced) = reduce(&self.events, command)? else {
            debug!("event=store_apply module=store status=noop");
            return Ok(ChangeReport::unchanged());
        };

        self.events = reduced.events;
        let persist = self.persist();
        info!(
            "event=store_apply module=store status=ok change={} count={} persisted={}",
            reduced.change.kind(),
            self.events.len(),
            persist == PersistStatus::Saved
        );
        self.notify();

        Ok(ChangeReport {
            change: Some(reduced.change),
            persist,
        })
    }

    fn persist(&mut self) -> PersistStatus {
        if let Some(reason) = &self.read_failure {
            warn!("event=store_persist module=store status=skipped reason=read_failed_at_open");
            return PersistStatus::Failed(format!(
                "saved events could not be read ({reason}); saving is suspended to protect them"
            ));
        }
        match self.persistence.save(&self.events) {
            Ok(()) => {
                if self.degraded {
                    info!("event=store_persist module=store status=restored");
                }
                self.degraded = false;
                PersistStatus::Saved
            }
            Err(err) => {
                warn!(
                    "event=store_persist module=store status=error error_code=snapshot_write_failed error={err}"
                );
                self.degraded = true;
                PersistStatus::Failed(err.to_string())
            }
        }
    }

    fn notify(&mut self) {
        for listener in &mut self.listeners {
            listener.snapshot_changed(&self.events);
        }
    }
}
