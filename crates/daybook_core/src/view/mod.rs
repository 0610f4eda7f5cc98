//! Read-only projections of store snapshots.

pub mod sidebar;
