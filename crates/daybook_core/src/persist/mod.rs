//! Snapshot persistence over a durable slot.
//!
//! # Responsibility
//! - Encode the full event collection as one JSON array and write it wholesale.
//! - Decode the persisted array once at startup.
//!
//! # Invariants
//! - Absent, malformed or unreadable data loads as an empty collection; the
//!   load status tells the cases apart.
//! - Repeated ids in a persisted value are renamed, never dropped.
//! - Writes are full rewrites; there is no incremental diff.

mod snapshot;

pub use snapshot::{
    decode_snapshot, encode_snapshot, LoadStatus, LoadedSnapshot, PersistError,
    SnapshotPersistence,
};
