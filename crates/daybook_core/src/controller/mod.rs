//! Selection handling and dialog lifecycle.
//!
//! # Responsibility
//! - Turn calendar surface signals into dialog state.
//! - Translate dialog submissions into store commands.
//!
//! # Invariants
//! - At most one dialog is open; the modal state is a single variant.
//! - Dialogs never mutate the store directly; submissions go through the
//!   controller.

pub mod collaborators;
pub mod dialog;
pub mod selection;

pub use collaborators::{CalendarSurface, ConfirmPrompt, DELETE_CONFIRMATION};
pub use dialog::{AddDialog, DialogError, EditDialog, ModalState};
pub use selection::{DeleteOutcome, Notice, SelectionController};
