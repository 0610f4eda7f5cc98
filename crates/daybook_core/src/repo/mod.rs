//! Durable key-value slot contracts and implementations.
//!
//! # Responsibility
//! - Define the slot read/write contract used by snapshot persistence.
//! - Keep SQLite query details out of the store and controller layers.
//!
//! # Invariants
//! - A slot write replaces the whole previous value.
//! - Reading a never-written slot yields `None`, not an error.

pub mod slot_repo;
