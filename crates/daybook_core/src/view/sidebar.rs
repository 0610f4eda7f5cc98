//! Sidebar event list projection.
//!
//! # Responsibility
//! - Derive the title + start label list shown beside the calendar.
//!
//! # Invariants
//! - The projection holds no state; it is recomputed from each snapshot.
//! - Item order matches snapshot order.

use crate::model::event::{Event, Timestamp};

/// Placeholder shown when the snapshot is empty.
pub const EMPTY_PLACEHOLDER: &str = "No Events Present";

/// One sidebar row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SidebarItem {
    pub event_id: String,
    pub title: String,
    /// See [`format_start`]; always UTC.
    pub start_label: String,
}

impl SidebarItem {
    /// Single-line rendering, e.g. `Standup — May 1, 2024, 9:00 AM`.
    pub fn line(&self) -> String {
        format!("{} — {}", self.title, self.start_label)
    }
}

/// Sidebar content for one snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SidebarView {
    Empty { placeholder: &'static str },
    Items(Vec<SidebarItem>),
}

impl SidebarView {
    pub fn project(snapshot: &[Event]) -> Self {
        if snapshot.is_empty() {
            return Self::Empty {
                placeholder: EMPTY_PLACEHOLDER,
            };
        }
        Self::Items(
            snapshot
                .iter()
                .map(|event| SidebarItem {
                    event_id: event.id().to_string(),
                    title: event.title().to_string(),
                    start_label: format_start(&event.start()),
                })
                .collect(),
        )
    }

    pub fn items(&self) -> &[SidebarItem] {
        match self {
            Self::Empty { .. } => &[],
            Self::Items(items) => items,
        }
    }

    pub fn lines(&self) -> Vec<String> {
        match self {
            Self::Empty { placeholder } => vec![(*placeholder).to_string()],
            Self::Items(items) => items.iter().map(SidebarItem::line).collect(),
        }
    }
}

/// Formats a start instant as `May 1, 2024, 9:00 AM` (12-hour clock).
///
/// The label is rendered in UTC with English month names; no timezone or
/// locale conversion is applied.
pub fn format_start(start: &Timestamp) -> String {
    start.format("%b %-d, %Y, %-I:%M %p").to_string()
}
