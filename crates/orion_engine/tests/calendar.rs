mod common;

use std::sync::Arc;

use chrono::{Duration, NaiveDate, TimeZone, Utc};
use common::{init_logging, RecordingHost};
use orion_core::ics::CALENDAR_MIME_TYPE;
use orion_core::{unescape_text, EventWindowError};
use orion_engine::{
    BlobDownloader, CalendarExportAction, CalendarSettings, Clock, CALENDAR_FILENAME,
    DEFAULT_REVOKE_GRACE,
};
use pretty_assertions::assert_eq;

fn fixed_clock() -> Clock {
    Arc::new(|| Utc.with_ymd_and_hms(2025, 11, 11, 8, 30, 0).unwrap())
}

fn property(doc: &str, name: &str) -> String {
    let prefix = format!("{name}:");
    doc.split("\r\n")
        .find_map(|line| line.strip_prefix(prefix.as_str()))
        .unwrap_or_default()
        .to_string()
}

#[tokio::test]
async fn trigger_saves_calendar_file() {
    init_logging();
    let host = Arc::new(RecordingHost::new());
    let saver = BlobDownloader::new(host.clone(), DEFAULT_REVOKE_GRACE);
    let settings = CalendarSettings::default();
    let action = CalendarExportAction::new(settings.clone(), saver).with_clock(fixed_clock());

    action.trigger().expect("default schedule is valid");

    let activations = host.activations();
    assert_eq!(activations.len(), 1);
    let (_, anchor, blob) = &activations[0];
    assert_eq!(anchor.download.as_deref(), Some(CALENDAR_FILENAME));
    let blob = blob.as_ref().expect("saved from memory");
    assert_eq!(blob.mime_type, CALENDAR_MIME_TYPE);

    let doc = std::str::from_utf8(&blob.bytes).unwrap();
    assert!(doc.starts_with("BEGIN:VCALENDAR\r\n"));
    assert!(doc.ends_with("END:VCALENDAR"));
    assert_eq!(property(doc, "DTSTAMP"), "20251111T083000Z");
    assert_eq!(unescape_text(&property(doc, "SUMMARY")), settings.title);
    assert_eq!(unescape_text(&property(doc, "DESCRIPTION")), settings.description);
    assert_eq!(unescape_text(&property(doc, "LOCATION")), settings.location);
    assert!(host.opened().is_empty());
}

#[tokio::test]
async fn event_spans_three_hours_from_configured_time() {
    init_logging();
    let host = Arc::new(RecordingHost::new());
    let saver = BlobDownloader::new(host, DEFAULT_REVOKE_GRACE);
    let action = CalendarExportAction::new(CalendarSettings::default(), saver);

    let day = NaiveDate::from_ymd_opt(2025, 11, 11).unwrap();
    let event = action.event_on(day, &Utc).unwrap();

    assert_eq!(event.start(), Utc.with_ymd_and_hms(2025, 11, 11, 19, 0, 0).unwrap());
    assert_eq!(event.duration(), Duration::hours(3));
    assert_eq!(event.title(), action.settings().title);
}

#[tokio::test]
async fn zero_length_schedule_is_rejected_without_saving() {
    init_logging();
    let host = Arc::new(RecordingHost::new());
    let saver = BlobDownloader::new(host.clone(), DEFAULT_REVOKE_GRACE);
    let mut settings = CalendarSettings::default();
    settings.schedule.duration = Duration::zero();
    let action = CalendarExportAction::new(settings, saver).with_clock(fixed_clock());

    assert!(action.trigger().is_err());
    assert!(host.activations().is_empty());
}

#[tokio::test]
async fn overflowing_schedule_is_rejected_without_saving() {
    init_logging();
    let host = Arc::new(RecordingHost::new());
    let saver = BlobDownloader::new(host.clone(), DEFAULT_REVOKE_GRACE);
    let mut settings = CalendarSettings::default();
    settings.schedule.duration = Duration::days(100_000_000);
    let action = CalendarExportAction::new(settings, saver).with_clock(fixed_clock());

    assert!(matches!(
        action.trigger(),
        Err(EventWindowError::DurationOutOfRange { .. })
    ));
    assert!(host.activations().is_empty());
}
