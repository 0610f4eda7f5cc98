//! Authoritative in-memory event collection.
//!
//! # Responsibility
//! - Apply add/update/remove commands through a pure reducer.
//! - Persist the full snapshot and notify listeners after every change.
//!
//! # Invariants
//! - The store is the only writer of the event collection.
//! - Listeners only ever see the snapshot that was just persisted (or whose
//!   write failure was reported).
//! - Event ids are unique within the store.

pub mod command;
pub mod event_store;

pub use command::{reduce, Change, Command, Reduced, StoreError};
pub use event_store::{ChangeReport, EventStore, PersistStatus, SnapshotListener};
