//! Core calendar logic for Daybook.
//! This crate is the single source of truth for event state and its
//! persistence; UI shells only consume snapshots and forward signals.

pub mod config;
pub mod controller;
pub mod db;
pub mod logging;
pub mod model;
pub mod persist;
pub mod repo;
pub mod store;
pub mod view;

pub use config::{StoreConfig, DEFAULT_STORAGE_KEY};
pub use controller::{
    AddDialog, CalendarSurface, ConfirmPrompt, DeleteOutcome, DialogError, EditDialog,
    ModalState, Notice, SelectionController, DELETE_CONFIRMATION,
};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::event::{
    derive_event_id, format_timestamp, parse_timestamp, Event, EventDraft, EventId,
    EventValidationError, SelectedRange, Timestamp,
};
pub use persist::{LoadStatus, LoadedSnapshot, PersistError, SnapshotPersistence};
pub use repo::slot_repo::{MemorySlotStore, SlotError, SlotResult, SlotStore, SqliteSlotStore};
pub use store::{ChangeReport, Command, EventStore, PersistStatus, SnapshotListener, StoreError};
pub use view::sidebar::{format_start, SidebarItem, SidebarView, EMPTY_PLACEHOLDER};

/// Minimal health-check API for shell integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
