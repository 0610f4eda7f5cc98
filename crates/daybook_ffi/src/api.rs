//! FFI calendar API for the Flutter shell.
//!
//! # Responsibility
//! - Hold the one calendar session the shell drives.
//! - Forward surface signals (range select, event click) and dialog actions
//!   into `daybook_core`, and hand back plain response envelopes.
//!
//! # Invariants
//! - Exported functions must not panic across the FFI boundary.
//! - Every action response carries the post-action event list, so the shell
//!   re-renders from exactly the snapshot that was persisted.
//! - Storage failures degrade the session to in-memory mode with a warning.

use daybook_core::{
    core_version as core_version_inner, format_timestamp, init_logging as init_logging_inner,
    parse_timestamp, ping as ping_inner, CalendarSurface, DeleteOutcome, Event, MemorySlotStore,
    ModalState, Notice, SelectedRange, SelectionController, SidebarView, SlotResult, SlotStore,
    SnapshotPersistence, SqliteSlotStore, StoreConfig,
};
use log::{info, warn};
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard, PoisonError};

const CALENDAR_DB_FILE_NAME: &str = "daybook.sqlite3";
const CALENDAR_DB_PATH_ENV: &str = "DAYBOOK_DB_PATH";

static SESSION: Mutex<Option<SelectionController<SessionSlots>>> = Mutex::new(None);

/// Slot backend for the active session.
enum SessionSlots {
    Sqlite(SqliteSlotStore),
    /// Used when the database cannot be opened; nothing survives the process.
    Memory(MemorySlotStore),
}

impl SlotStore for SessionSlots {
    fn read_slot(&self, key: &str) -> SlotResult<Option<String>> {
        match self {
            Self::Sqlite(store) => store.read_slot(key),
            Self::Memory(store) => store.read_slot(key),
        }
    }

    fn write_slot(&mut self, key: &str, value: &str) -> SlotResult<()> {
        match self {
            Self::Sqlite(store) => store.write_slot(key, value),
            Self::Memory(store) => store.write_slot(key, value),
        }
    }
}

/// Records the controller's unselect instruction for the shell.
#[derive(Default)]
struct SelectionClearFlag {
    requested: bool,
}

impl CalendarSurface for SelectionClearFlag {
    fn unselect(&mut self) {
        self.requested = true;
    }
}

/// Minimal health-check API for FRB smoke integration.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Returns an empty string on success and the error message otherwise.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// One event as the calendar widget consumes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarEventItem {
    pub id: String,
    pub title: String,
    /// ISO-8601 UTC with milliseconds.
    pub start: String,
    pub end: Option<String>,
    pub all_day: bool,
}

/// One sidebar row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SidebarEntry {
    pub event_id: String,
    pub title: String,
    /// Start rendered in UTC as `May 1, 2024, 9:00 AM`. Not converted to the
    /// device timezone or locale; shells wanting local time should format
    /// `CalendarEventItem::start` themselves.
    pub start_label: String,
}

/// Sidebar content; `placeholder` is set only when there are no events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SidebarResponse {
    pub entries: Vec<SidebarEntry>,
    pub placeholder: Option<String>,
}

/// Current dialog state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModalResponse {
    /// `closed|adding|editing`.
    pub mode: String,
    /// Title input contents of the open dialog.
    pub title: String,
    /// Selected event for `editing`.
    pub event_id: Option<String>,
}

/// Envelope returned by every calendar action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarActionResponse {
    pub ok: bool,
    /// Event created, edited, removed or selected by the action.
    pub event_id: Option<String>,
    pub message: String,
    /// Shell must clear the highlighted range selection.
    pub unselect: bool,
    /// Non-fatal warnings, e.g. storage degraded to memory.
    pub warnings: Vec<String>,
    /// Event list after the action.
    pub events: Vec<CalendarEventItem>,
}

impl CalendarActionResponse {
    fn success(message: impl Into<String>, events: Vec<CalendarEventItem>) -> Self {
        Self {
            ok: true,
            event_id: None,
            message: message.into(),
            unselect: false,
            warnings: Vec::new(),
            events,
        }
    }

    fn failure(message: impl Into<String>, events: Vec<CalendarEventItem>) -> Self {
        Self {
            ok: false,
            message: message.into(),
            ..Self::success(String::new(), events)
        }
    }

    fn with_event_id(mut self, event_id: impl Into<String>) -> Self {
        self.event_id = Some(event_id.into());
        self
    }
}

/// Opens (or reopens) the calendar session and loads persisted events.
///
/// `db_path` overrides `DAYBOOK_DB_PATH`; both fall back to a file in the
/// temp directory.
#[flutter_rust_bridge::frb(sync)]
pub fn calendar_open(db_path: Option<String>) -> CalendarActionResponse {
    let path = resolve_db_path(db_path);
    let mut warnings = Vec::new();
    let slots = match SqliteSlotStore::open(&path) {
        Ok(store) => SessionSlots::Sqlite(store),
        Err(err) => {
            warn!(
                "event=calendar_open module=ffi status=degraded error_code=db_open_failed error={err}"
            );
            warnings.push(format!(
                "Storage unavailable ({err}); events will not be saved this session."
            ));
            SessionSlots::Memory(MemorySlotStore::new())
        }
    };

    let persistence = SnapshotPersistence::new(slots, &StoreConfig::default());
    let mut controller = SelectionController::bootstrap(persistence);
    warnings.extend(controller.take_notices().into_iter().map(notice_message));
    let events = event_items(controller.snapshot());
    *lock_session() = Some(controller);
    info!(
        "event=calendar_open module=ffi status=ok count={}",
        events.len()
    );

    let mut response = CalendarActionResponse::success("Calendar opened.", events);
    response.warnings = warnings;
    response
}

/// Current event list.
#[flutter_rust_bridge::frb(sync)]
pub fn calendar_events() -> Vec<CalendarEventItem> {
    lock_session()
        .as_ref()
        .map(|controller| event_items(controller.snapshot()))
        .unwrap_or_default()
}

/// Sidebar projection of the current event list.
#[flutter_rust_bridge::frb(sync)]
pub fn calendar_sidebar() -> SidebarResponse {
    let guard = lock_session();
    let view = guard
        .as_ref()
        .map_or_else(|| SidebarView::project(&[]), |controller| controller.sidebar());
    to_sidebar_response(&view)
}

/// Current dialog state.
#[flutter_rust_bridge::frb(sync)]
pub fn calendar_modal() -> ModalResponse {
    let guard = lock_session();
    match guard.as_ref().map(|controller| controller.modal()) {
        Some(ModalState::Adding(dialog)) => ModalResponse {
            mode: "adding".to_string(),
            title: dialog.title().to_string(),
            event_id: None,
        },
        Some(ModalState::Editing(dialog)) => ModalResponse {
            mode: "editing".to_string(),
            title: dialog.title().to_string(),
            event_id: Some(dialog.event_id().to_string()),
        },
        Some(ModalState::Closed) | None => ModalResponse {
            mode: "closed".to_string(),
            title: String::new(),
            event_id: None,
        },
    }
}

/// Range selected on the calendar: opens the add dialog.
#[flutter_rust_bridge::frb(sync)]
pub fn calendar_select_range(
    start: String,
    end: Option<String>,
    all_day: bool,
) -> CalendarActionResponse {
    with_session(|controller| {
        let events = event_items(controller.snapshot());
        let start = match parse_timestamp(&start) {
            Ok(value) => value,
            Err(err) => return CalendarActionResponse::failure(err.to_string(), events),
        };
        let end = match end.as_deref().map(parse_timestamp).transpose() {
            Ok(value) => value,
            Err(err) => return CalendarActionResponse::failure(err.to_string(), events),
        };
        controller.on_range_select(SelectedRange::new(start, end, all_day));
        CalendarActionResponse::success("Add dialog opened.", events)
    })
}

/// Event clicked on the calendar: opens the edit dialog.
#[flutter_rust_bridge::frb(sync)]
pub fn calendar_click_event(event_id: String) -> CalendarActionResponse {
    with_session(|controller| {
        let opened = controller.on_event_click(&event_id);
        let events = event_items(controller.snapshot());
        if opened {
            CalendarActionResponse::success("Edit dialog opened.", events).with_event_id(event_id)
        } else {
            CalendarActionResponse::failure("Event not found.", events)
        }
    })
}

/// Updates the title input of the open dialog.
#[flutter_rust_bridge::frb(sync)]
pub fn calendar_set_title(title: String) -> CalendarActionResponse {
    with_session(|controller| {
        let result = controller.set_title(title);
        let events = event_items(controller.snapshot());
        match result {
            Ok(()) => CalendarActionResponse::success("Title updated.", events),
            Err(err) => CalendarActionResponse::failure(err.to_string(), events),
        }
    })
}

/// Submits the add dialog.
#[flutter_rust_bridge::frb(sync)]
pub fn calendar_submit_add() -> CalendarActionResponse {
    with_session(|controller| {
        let mut surface = SelectionClearFlag::default();
        let result = controller.submit_add(&mut surface);
        let events = event_items(controller.snapshot());
        let mut response = match result {
            Ok(event) => {
                CalendarActionResponse::success("Event added.", events).with_event_id(event.id())
            }
            Err(err) => CalendarActionResponse::failure(err.to_string(), events),
        };
        response.unselect = surface.requested;
        response
    })
}

/// Saves the edit dialog.
#[flutter_rust_bridge::frb(sync)]
pub fn calendar_save_edit() -> CalendarActionResponse {
    with_session(|controller| {
        let result = controller.save_edit();
        let events = event_items(controller.snapshot());
        match result {
            Ok(report) => {
                let response = CalendarActionResponse::success("Event updated.", events);
                match report.change {
                    Some(change) => response.with_event_id(change.event_id()),
                    None => response,
                }
            }
            Err(err) => CalendarActionResponse::failure(err.to_string(), events),
        }
    })
}

/// Deletes the selected event.
///
/// The shell shows the yes/no prompt itself and passes the answer as
/// `confirmed`.
#[flutter_rust_bridge::frb(sync)]
pub fn calendar_delete_event(confirmed: bool) -> CalendarActionResponse {
    with_session(|controller| {
        let result = controller.delete_selected(&mut |_: &str| confirmed);
        let events = event_items(controller.snapshot());
        match result {
            Ok(DeleteOutcome::Deleted(report)) => {
                let response = CalendarActionResponse::success("Event deleted.", events);
                match report.change {
                    Some(change) => response.with_event_id(change.event_id()),
                    None => response,
                }
            }
            Ok(DeleteOutcome::Declined) => {
                CalendarActionResponse::success("Delete cancelled.", events)
            }
            Err(err) => CalendarActionResponse::failure(err.to_string(), events),
        }
    })
}

/// Closes whichever dialog is open without saving.
#[flutter_rust_bridge::frb(sync)]
pub fn calendar_cancel_dialog() -> CalendarActionResponse {
    with_session(|controller| {
        controller.close();
        CalendarActionResponse::success("Dialog closed.", event_items(controller.snapshot()))
    })
}

fn with_session(
    f: impl FnOnce(&mut SelectionController<SessionSlots>) -> CalendarActionResponse,
) -> CalendarActionResponse {
    let mut guard = lock_session();
    let Some(controller) = guard.as_mut() else {
        return CalendarActionResponse::failure("Calendar session is not open.", Vec::new());
    };
    let mut response = f(controller);
    response
        .warnings
        .extend(controller.take_notices().into_iter().map(notice_message));
    response
}

// A panic inside a previous call must not wedge the shell.
fn lock_session() -> MutexGuard<'static, Option<SelectionController<SessionSlots>>> {
    SESSION.lock().unwrap_or_else(PoisonError::into_inner)
}

fn resolve_db_path(explicit: Option<String>) -> PathBuf {
    explicit
        .or_else(|| std::env::var(CALENDAR_DB_PATH_ENV).ok())
        .map(|raw| raw.trim().to_string())
        .filter(|raw| !raw.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| std::env::temp_dir().join(CALENDAR_DB_FILE_NAME))
}

fn notice_message(notice: Notice) -> String {
    match notice {
        Notice::PersistenceDegraded { message } => {
            format!("Changes could not be saved and are kept for this session only: {message}")
        }
        Notice::PersistenceRestored => "Saving works again.".to_string(),
    }
}

fn event_items(snapshot: &[Event]) -> Vec<CalendarEventItem> {
    snapshot
        .iter()
        .map(|event| CalendarEventItem {
            id: event.id().to_string(),
            title: event.title().to_string(),
            start: format_timestamp(&event.start()),
            end: event.end().as_ref().map(format_timestamp),
            all_day: event.all_day(),
        })
        .collect()
}

fn to_sidebar_response(view: &SidebarView) -> SidebarResponse {
    match view {
        SidebarView::Empty { placeholder } => SidebarResponse {
            entries: Vec::new(),
            placeholder: Some((*placeholder).to_string()),
        },
        SidebarView::Items(items) => SidebarResponse {
            entries: items
                .iter()
                .map(|item| SidebarEntry {
                    event_id: item.event_id.clone(),
                    title: item.title.clone(),
                    start_label: item.start_label.clone(),
                })
                .collect(),
            placeholder: None,
        },
    }
}
