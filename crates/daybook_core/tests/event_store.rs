use chrono::{TimeZone, Utc};
use daybook_core::persist::decode_snapshot;
use daybook_core::{
    ChangeReport, Event, EventDraft, EventStore, MemorySlotStore, PersistStatus, SlotError,
    SlotResult, SlotStore, SnapshotPersistence, SidebarView, StoreConfig, StoreError,
};
use std::sync::{Arc, Mutex};

/// Slot store whose writes can be switched off to simulate storage failure.
#[derive(Default)]
struct FlakySlotStore {
    inner: MemorySlotStore,
    reject_writes: Arc<Mutex<bool>>,
}

impl SlotStore for FlakySlotStore {
    fn read_slot(&self, key: &str) -> SlotResult<Option<String>> {
        self.inner.read_slot(key)
    }

    fn write_slot(&mut self, key: &str, value: &str) -> SlotResult<()> {
        if *self.reject_writes.lock().unwrap() {
            return Err(SlotError::Unavailable("quota exceeded".to_string()));
        }
        self.inner.write_slot(key, value)
    }
}

/// Slot store that already holds data but fails every read, recording writes.
struct UnreadableSlots {
    stored: Arc<Mutex<String>>,
}

impl SlotStore for UnreadableSlots {
    fn read_slot(&self, _key: &str) -> SlotResult<Option<String>> {
        Err(SlotError::Unavailable("database is locked".to_string()))
    }

    fn write_slot(&mut self, _key: &str, value: &str) -> SlotResult<()> {
        *self.stored.lock().unwrap() = value.to_string();
        Ok(())
    }
}

fn open_store() -> EventStore<MemorySlotStore> {
    EventStore::open(SnapshotPersistence::new(
        MemorySlotStore::new(),
        &StoreConfig::default(),
    ))
}

fn persisted(store: &EventStore<MemorySlotStore>) -> Vec<Event> {
    let raw = store
        .persistence()
        .slots()
        .read_slot("events")
        .unwrap()
        .unwrap();
    decode_snapshot(&raw).unwrap()
}

fn standup_draft() -> EventDraft {
    EventDraft {
        title: "Standup".to_string(),
        start: Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap(),
        end: Some(Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap()),
        all_day: false,
    }
}

#[test]
fn add_assigns_derived_id_and_persists() {
    let mut store = open_store();
    let (event, report) = store.add(standup_draft()).unwrap();

    assert_eq!(event.id(), "2024-05-01T09:00:00.000Z-Standup");
    assert_eq!(report.persist, PersistStatus::Saved);
    assert_eq!(store.snapshot(), &[event.clone()]);
    assert_eq!(persisted(&store), vec![event]);
}

#[test]
fn add_shows_exactly_one_sidebar_entry() {
    let mut store = open_store();
    let (event, _) = store.add(standup_draft()).unwrap();

    let view = SidebarView::project(store.snapshot());
    let matching = view
        .items()
        .iter()
        .filter(|item| item.title == event.title() && item.start_label == "May 1, 2024, 9:00 AM")
        .count();
    assert_eq!(matching, 1);
}

#[test]
fn update_replaces_only_the_title() {
    let mut store = open_store();
    let (event, _) = store.add(standup_draft()).unwrap();

    let report = store.update(event.id(), "New Title").unwrap();
    assert!(report.is_changed());

    let updated = store.get(event.id()).unwrap();
    assert_eq!(updated.title(), "New Title");
    assert_eq!(updated.start(), event.start());
    assert_eq!(updated.end(), event.end());
    assert_eq!(updated.all_day(), event.all_day());
    assert_eq!(persisted(&store)[0].title(), "New Title");
}

#[test]
fn remove_clears_live_and_persisted_collections() {
    let mut store = open_store();
    let (event, _) = store.add(standup_draft()).unwrap();

    let report = store.remove(event.id());
    assert!(report.is_changed());
    assert!(store.get(event.id()).is_none());
    assert!(persisted(&store).iter().all(|e| e.id() != event.id()));
    let raw = store.persistence().slots().read_slot("events").unwrap();
    assert_eq!(raw.as_deref(), Some("[]"));
}

#[test]
fn stale_ids_are_silent_no_ops() {
    let mut store = open_store();
    store.add(standup_draft()).unwrap();

    let update = store.update("missing", "X").unwrap();
    let remove = store.remove("missing");
    let noop = ChangeReport {
        change: None,
        persist: PersistStatus::Skipped,
    };
    assert_eq!(update, noop);
    assert_eq!(remove, noop);
    assert_eq!(store.len(), 1);
}

#[test]
fn blank_title_is_rejected_without_mutation() {
    let mut store = open_store();
    let mut draft = standup_draft();
    draft.title = "   ".to_string();

    assert!(matches!(store.add(draft), Err(StoreError::Validation(_))));
    assert!(store.is_empty());
    assert_eq!(store.persistence().slots().read_slot("events").unwrap(), None);
}

#[test]
fn ordering_is_insertion_order_and_survives_edits() {
    let mut store = open_store();
    let mut ids = Vec::new();
    for (hour, title) in [(9, "A"), (8, "B"), (10, "C")] {
        let draft = EventDraft {
            title: title.to_string(),
            start: Utc.with_ymd_and_hms(2024, 5, 1, hour, 0, 0).unwrap(),
            end: None,
            all_day: false,
        };
        ids.push(store.add(draft).unwrap().0.id().to_string());
    }

    store.update(&ids[1], "B2").unwrap();
    store.remove(&ids[0]);

    let titles = store
        .snapshot()
        .iter()
        .map(|event| event.title().to_string())
        .collect::<Vec<_>>();
    assert_eq!(titles, vec!["B2", "C"]);
}

#[test]
fn listeners_receive_initial_and_post_persist_snapshots() {
    let mut store = open_store();
    let seen: Arc<Mutex<Vec<usize>>> = Arc::default();
    let sink = Arc::clone(&seen);
    store.subscribe(Box::new(move |snapshot: &[Event]| {
        sink.lock().unwrap().push(snapshot.len());
    }));

    let (event, _) = store.add(standup_draft()).unwrap();
    store.update("missing", "ignored").unwrap();
    store.update(event.id(), "Renamed").unwrap();
    store.remove(event.id());

    assert_eq!(*seen.lock().unwrap(), vec![0, 1, 1, 0]);
}

#[test]
fn reopening_restores_previous_session() {
    let mut first = open_store();
    first.add(standup_draft()).unwrap();
    let slots = first.persistence().slots().clone();

    let reopened = EventStore::open(SnapshotPersistence::new(slots, &StoreConfig::default()));
    assert_eq!(reopened.snapshot(), first.snapshot());
}

#[test]
fn write_failure_keeps_change_in_memory_and_marks_degraded() {
    let reject_writes = Arc::new(Mutex::new(true));
    let slots = FlakySlotStore {
        inner: MemorySlotStore::new(),
        reject_writes: Arc::clone(&reject_writes),
    };
    let mut store = EventStore::open(SnapshotPersistence::new(slots, &StoreConfig::default()));

    let (event, report) = store.add(standup_draft()).unwrap();
    assert!(report.persist_failed());
    assert!(store.is_degraded());
    assert_eq!(store.len(), 1);

    *reject_writes.lock().unwrap() = false;
    let report = store.update(event.id(), "Recovered").unwrap();
    assert_eq!(report.persist, PersistStatus::Saved);
    assert!(!store.is_degraded());
    let raw = store.persistence().slots().read_slot("events").unwrap().unwrap();
    assert_eq!(decode_snapshot(&raw).unwrap()[0].title(), "Recovered");
}

#[test]
fn repeated_persisted_ids_survive_reload_and_next_write() {
    let seeded = r#"[
        {"id":"2024-05-01T09:00:00.000Z-Standup","title":"Standup","start":"2024-05-01T09:00:00.000Z","allDay":false},
        {"id":"2024-05-01T09:00:00.000Z-Standup","title":"Standup","start":"2024-05-01T09:00:00.000Z","allDay":false},
        {"id":"2024-05-02T14:00:00.000Z-Dentist","title":"Dentist","start":"2024-05-02T14:00:00.000Z","allDay":false}
    ]"#;
    let slots = MemorySlotStore::new().with_slot("events", seeded);
    let mut store = EventStore::open(SnapshotPersistence::new(slots, &StoreConfig::default()));

    let ids = store
        .snapshot()
        .iter()
        .map(|event| event.id().to_string())
        .collect::<Vec<_>>();
    assert_eq!(
        ids,
        vec![
            "2024-05-01T09:00:00.000Z-Standup",
            "2024-05-01T09:00:00.000Z-Standup-2",
            "2024-05-02T14:00:00.000Z-Dentist",
        ]
    );

    let mut draft = standup_draft();
    draft.title = "New".to_string();
    store.add(draft).unwrap();

    let titles = persisted(&store)
        .iter()
        .map(|event| event.title().to_string())
        .collect::<Vec<_>>();
    assert_eq!(titles, vec!["Standup", "Standup", "Dentist", "New"]);
}

#[test]
fn unreadable_slot_is_never_overwritten() {
    let original = r#"[{"id":"a","title":"Keep me","start":"2024-05-01T09:00:00.000Z","allDay":false}]"#;
    let stored = Arc::new(Mutex::new(original.to_string()));
    let slots = UnreadableSlots {
        stored: Arc::clone(&stored),
    };
    let mut store = EventStore::open(SnapshotPersistence::new(slots, &StoreConfig::default()));

    assert!(store.is_empty());
    assert!(store.is_degraded());
    assert!(store.read_failure().unwrap().contains("database is locked"));

    let (event, report) = store.add(standup_draft()).unwrap();
    assert!(report.persist_failed());
    store.update(event.id(), "Renamed").unwrap();
    store.remove(event.id());

    assert!(store.is_degraded());
    assert_eq!(*stored.lock().unwrap(), original);
}

#[test]
fn blank_configured_key_still_persists_under_default_slot() {
    let config = StoreConfig::with_storage_key("");
    let mut store = EventStore::open(SnapshotPersistence::new(MemorySlotStore::new(), &config));

    let (_, report) = store.add(standup_draft()).unwrap();
    assert_eq!(report.persist, PersistStatus::Saved);
    assert_eq!(persisted(&store).len(), 1);
}
