//! Contracts for the calendar surface and the confirmation prompt.

/// Prompt text used before deleting an event.
pub const DELETE_CONFIRMATION: &str = "Are you sure you want to delete this event?";

/// Calendar widget hooks the controller drives.
///
/// Rendering itself happens through `SnapshotListener`; this trait only
/// covers instructions the controller issues.
pub trait CalendarSurface {
    /// Clears the highlighted range selection.
    fn unselect(&mut self);
}

/// Blocking yes/no prompt.
pub trait ConfirmPrompt {
    fn confirm(&mut self, message: &str) -> bool;
}

impl<F> ConfirmPrompt for F
where
    F: FnMut(&str) -> bool,
{
    fn confirm(&mut self, message: &str) -> bool {
        self(message)
    }
}
