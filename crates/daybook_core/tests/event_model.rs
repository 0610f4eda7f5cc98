use chrono::{TimeZone, Utc};
use daybook_core::{Event, EventValidationError};

#[test]
fn event_serialization_uses_snapshot_wire_fields() {
    let start = Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap();
    let end = Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap();
    let event = Event::restore("2024-05-01T09:00:00.000Z-Standup", "Standup", start, Some(end), false)
        .unwrap();

    let json = serde_json::to_value(&event).unwrap();
    assert_eq!(json["id"], "2024-05-01T09:00:00.000Z-Standup");
    assert_eq!(json["title"], "Standup");
    assert_eq!(json["start"], "2024-05-01T09:00:00.000Z");
    assert_eq!(json["end"], "2024-05-01T10:00:00.000Z");
    assert_eq!(json["allDay"], false);

    let decoded: Event = serde_json::from_value(json).unwrap();
    assert_eq!(decoded, event);
}

#[test]
fn open_ended_events_omit_end() {
    let start = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
    let event = Event::restore("holiday", "Holiday", start, None, true).unwrap();

    let json = serde_json::to_value(&event).unwrap();
    assert!(json.get("end").is_none());
    assert_eq!(json["allDay"], true);
}

#[test]
fn restore_trims_title_and_rejects_invalid_parts() {
    let start = Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap();
    let earlier = Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap();

    let event = Event::restore("a", "  Standup  ", start, None, false).unwrap();
    assert_eq!(event.title(), "Standup");

    assert_eq!(
        Event::restore("", "Standup", start, None, false).unwrap_err(),
        EventValidationError::EmptyId
    );
    assert_eq!(
        Event::restore("a", " ", start, None, false).unwrap_err(),
        EventValidationError::EmptyTitle
    );
    assert_eq!(
        Event::restore("a", "Standup", start, Some(earlier), false).unwrap_err(),
        EventValidationError::EndBeforeStart {
            start,
            end: earlier
        }
    );
}

#[test]
fn with_title_preserves_identity_and_times() {
    let start = Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap();
    let end = Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap();
    let event = Event::restore("a", "Standup", start, Some(end), false).unwrap();

    let renamed = event.with_title("Daily Standup").unwrap();
    assert_eq!(renamed.id(), "a");
    assert_eq!(renamed.title(), "Daily Standup");
    assert_eq!(renamed.start(), start);
    assert_eq!(renamed.end(), Some(end));
    assert!(!renamed.all_day());
    assert_eq!(event.title(), "Standup");
}

#[test]
fn deserialize_rejects_reversed_range() {
    let value = serde_json::json!({
        "id": "bad",
        "title": "Bad",
        "start": "2024-05-01T10:00:00.000Z",
        "end": "2024-05-01T09:00:00.000Z",
        "allDay": false
    });

    let err = serde_json::from_value::<Event>(value).unwrap_err();
    assert!(
        err.to_string().contains("must be >= event start"),
        "unexpected error: {err}"
    );
}
