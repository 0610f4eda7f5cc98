//! JSON snapshot codec and slot-backed persistence adapter.

use crate::config::StoreConfig;
use crate::model::event::Event;
use crate::repo::slot_repo::{SlotError, SlotStore};
use crate::store::command::unique_id;
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Errors from writing a snapshot.
#[derive(Debug)]
pub enum PersistError {
    Encode(serde_json::Error),
    Slot(SlotError),
}

impl Display for PersistError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Encode(err) => write!(f, "failed to encode event snapshot: {err}"),
            Self::Slot(err) => write!(f, "failed to write event snapshot: {err}"),
        }
    }
}

impl Error for PersistError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Encode(err) => Some(err),
            Self::Slot(err) => Some(err),
        }
    }
}

impl From<SlotError> for PersistError {
    fn from(value: SlotError) -> Self {
        Self::Slot(value)
    }
}

/// How the last `load` obtained its events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadStatus {
    /// Nothing was persisted yet.
    Absent,
    Loaded,
    /// The persisted value could not be decoded and is ignored.
    Malformed,
    /// The slot could not be read at all; its contents are unknown.
    ReadFailed(String),
}

/// Events produced by `load` plus how they were obtained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedSnapshot {
    pub events: Vec<Event>,
    pub status: LoadStatus,
}

impl LoadedSnapshot {
    fn empty(status: LoadStatus) -> Self {
        Self {
            events: Vec::new(),
            status,
        }
    }
}

/// Encodes events as the persisted JSON array.
pub fn encode_snapshot(events: &[Event]) -> Result<String, serde_json::Error> {
    serde_json::to_string(events)
}

/// Decodes a persisted JSON array.
///
/// Any invalid element (bad timestamp, blank title, reversed range) rejects
/// the whole value. Repeated ids are kept and renamed with a `-2`, `-3`, ...
/// suffix in array order.
pub fn decode_snapshot(raw: &str) -> Result<Vec<Event>, serde_json::Error> {
    let decoded: Vec<Event> = serde_json::from_str(raw)?;
    let mut events = Vec::with_capacity(decoded.len());
    let mut renamed = 0_usize;
    for event in decoded {
        let id = unique_id(&events, event.id().to_string());
        if id == event.id() {
            events.push(event);
        } else {
            renamed += 1;
            events.push(event.with_id(id));
        }
    }
    if renamed > 0 {
        warn!(
            "event=snapshot_decode module=persist status=warn reason=duplicate_id renamed={renamed}"
        );
    }
    Ok(events)
}

/// Reads and writes the event snapshot through one slot.
pub struct SnapshotPersistence<S: SlotStore> {
    slots: S,
    key: String,
}

impl<S: SlotStore> SnapshotPersistence<S> {
    pub fn new(slots: S, config: &StoreConfig) -> Self {
        Self {
            slots,
            key: config.storage_key().to_string(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn slots(&self) -> &S {
        &self.slots
    }

    /// Loads the persisted events.
    pub fn load(&self) -> Vec<Event> {
        self.load_snapshot().events
    }

    /// Loads the persisted snapshot and reports how it was obtained.
    ///
    /// Never fails: read errors and malformed values are logged and yield an
    /// empty collection. `status` tells them apart from an absent slot.
    pub fn load_snapshot(&self) -> LoadedSnapshot {
        let raw = match self.slots.read_slot(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                info!("event=snapshot_load module=persist status=absent");
                return LoadedSnapshot::empty(LoadStatus::Absent);
            }
            Err(err) => {
                warn!(
                    "event=snapshot_load module=persist status=error error_code=slot_read_failed error={err}"
                );
                return LoadedSnapshot::empty(LoadStatus::ReadFailed(err.to_string()));
            }
        };

        match decode_snapshot(&raw) {
            Ok(events) => {
                info!(
                    "event=snapshot_load module=persist status=ok count={}",
                    events.len()
                );
                LoadedSnapshot {
                    events,
                    status: LoadStatus::Loaded,
                }
            }
            Err(err) => {
                warn!(
                    "event=snapshot_load module=persist status=error error_code=snapshot_malformed bytes={} error={err}",
                    raw.len()
                );
                LoadedSnapshot::empty(LoadStatus::Malformed)
            }
        }
    }

    /// Overwrites the slot with the full `events` collection.
    pub fn save(&mut self, events: &[Event]) -> Result<(), PersistError> {
        let encoded = encode_snapshot(events).map_err(PersistError::Encode)?;
        self.slots.write_slot(&self.key, &encoded)?;
        info!(
            "event=snapshot_save module=persist status=ok count={} bytes={}",
            events.len(),
            encoded.len()
        );
        Ok(())
    }
}
