//! Calendar domain model.
//!
//! # Responsibility
//! - Define the event record shared by the store, persistence and views.
//! - Keep timestamp wire formatting in one place.
//!
//! # Invariants
//! - Every event is identified by an id that never changes after creation.
//! - Event values are immutable; changes produce new values.

pub mod event;
