//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `daybook_core` linkage.
//! - Print the sidebar for a calendar database, so persisted state can be
//!   inspected without the Flutter shell.
//!
//! Usage: `daybook_cli [DB_PATH]`. Without a path only the probe lines are
//! printed.

use daybook_core::{SnapshotPersistence, SqliteSlotStore, StoreConfig};
use std::process::ExitCode;

fn main() -> ExitCode {
    println!("daybook_core ping={}", daybook_core::ping());
    println!("daybook_core version={}", daybook_core::core_version());

    let Some(db_path) = std::env::args().nth(1) else {
        return ExitCode::SUCCESS;
    };

    let slots = match SqliteSlotStore::open(&db_path) {
        Ok(slots) => slots,
        Err(err) => {
            eprintln!("failed to open {db_path}: {err}");
            return ExitCode::FAILURE;
        }
    };
    let persistence = SnapshotPersistence::new(slots, &StoreConfig::default());
    let events = persistence.load();
    println!("events={}", events.len());
    for line in daybook_core::SidebarView::project(&events).lines() {
        println!("{line}");
    }
    ExitCode::SUCCESS
}
