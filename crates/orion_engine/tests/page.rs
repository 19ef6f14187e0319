mod common;

use std::sync::Arc;
use std::time::Duration;

use chrono::{TimeZone, Utc};
use common::{init_logging, RecordingHost, StubFetcher};
use orion_core::{AssetDescriptor, ImageElement};
use orion_engine::{
    initialize_with, Clock, DownloadReport, DownloadSettings, FailureKind, FetchOutcome,
    PageConfig, PageDocument, PageHandle, TriggerRole, UiEvent, CALENDAR_FILENAME,
};
use url::Url;

fn page(host: &Arc<RecordingHost>, fetcher: StubFetcher) -> PageHandle {
    let document = PageDocument::default()
        .with_trigger(TriggerRole::Download, "nav-download")
        .with_trigger(TriggerRole::Calendar, "hero-calendar")
        .with_images(vec![
            ImageElement::new("img/orion.jpg", "Orion Constellation"),
            ImageElement::new("https://cdn.example.com/belt.png", ""),
        ]);
    let config = PageConfig {
        bundle: vec![
            AssetDescriptor::new("index.html", "index.html"),
            AssetDescriptor::new("style.css", "style.css"),
        ],
        page_base: Some(Url::parse("https://orion.example.co/").unwrap()),
        downloads: DownloadSettings::default(),
        ..PageConfig::default()
    };
    let clock: Clock = Arc::new(|| Utc.with_ymd_and_hms(2025, 11, 11, 8, 0, 0).unwrap());
    initialize_with(document, host.clone(), Arc::new(fetcher), config, Some(clock))
}

fn click(id: &str) -> UiEvent {
    UiEvent::ElementClicked(id.to_string())
}

#[tokio::test]
async fn initialize_lists_bundle_then_images() {
    init_logging();
    let host = Arc::new(RecordingHost::new());
    let page = page(&host, StubFetcher::new());

    let names: Vec<String> = page.view().rows.into_iter().map(|row| row.name).collect();
    assert_eq!(
        names,
        vec!["index.html", "style.css", "OrionConstellation.jpg", "belt.png"]
    );
    assert!(!page.view().picker_open);
    assert!(host.events().is_empty());
}

#[tokio::test]
async fn trigger_toggles_picker_and_outside_click_closes() {
    init_logging();
    let host = Arc::new(RecordingHost::new());
    let page = page(&host, StubFetcher::new());

    let view = page.dispatch(click("nav-download")).expect("view changed");
    assert!(view.picker_open);
    let view = page.dispatch(click("some-paragraph")).expect("view changed");
    assert!(!view.picker_open);
    assert!(page.dispatch(click("some-paragraph")).is_none());
}

#[tokio::test]
async fn row_download_saves_local_immediately_and_fetches_remote() {
    init_logging();
    let host = Arc::new(RecordingHost::new());
    let fetcher = StubFetcher::new().fail("https://cdn.example.com/belt.png", FailureKind::Network);
    let page = page(&host, fetcher);

    page.dispatch(UiEvent::RowDownloadClicked(1));
    assert_eq!(host.saved_names(), vec!["style.css"]);

    page.dispatch(UiEvent::RowDownloadClicked(3));
    let reports = page.settle().await;

    assert_eq!(
        reports,
        vec![
            DownloadReport::Direct,
            DownloadReport::Fetched(FetchOutcome::FellBack(FailureKind::Network))
        ]
    );
    assert_eq!(host.opened(), vec!["https://cdn.example.com/belt.png"]);
}

#[tokio::test(start_paused = true)]
async fn download_all_covers_every_row() {
    init_logging();
    let host = Arc::new(RecordingHost::new());
    let fetcher = StubFetcher::new().ok("https://cdn.example.com/belt.png", b"png", Some("image/png"));
    let page = page(&host, fetcher);

    page.dispatch(UiEvent::DownloadAllClicked);
    let reports = page.settle().await;

    assert_eq!(reports.len(), 4);
    assert_eq!(
        host.saved_names(),
        vec!["index.html", "style.css", "OrionConstellation.jpg", "belt.png"]
    );
}

#[tokio::test]
async fn calendar_trigger_exports_ics() {
    init_logging();
    let host = Arc::new(RecordingHost::new());
    let page = page(&host, StubFetcher::new());

    page.dispatch(click("nav-download"));
    let view = page.dispatch(click("hero-calendar")).expect("picker closed");

    assert!(!view.picker_open);
    assert_eq!(host.saved_names(), vec![CALENDAR_FILENAME]);
}

#[tokio::test]
async fn calendar_click_with_overflowing_schedule_is_contained() {
    init_logging();
    let host = Arc::new(RecordingHost::new());
    let mut config = PageConfig::default();
    config.calendar.schedule.duration = chrono::Duration::days(100_000_000);
    let document = PageDocument::default().with_trigger(TriggerRole::Calendar, "hero-calendar");
    let page = initialize_with(
        document,
        host.clone(),
        Arc::new(StubFetcher::new()),
        config,
        None,
    );

    page.dispatch(click("hero-calendar"));

    assert!(host.saved_names().is_empty());
    assert!(!page.is_disposed());
}

#[tokio::test]
async fn row_open_and_lightbox_events() {
    init_logging();
    let host = Arc::new(RecordingHost::new());
    let page = page(&host, StubFetcher::new());

    page.dispatch(UiEvent::RowOpenClicked(0));
    assert_eq!(host.opened(), vec!["index.html"]);

    let view = page.dispatch(UiEvent::ImageClicked(0)).expect("lightbox opened");
    assert_eq!(view.lightbox.as_deref(), Some("img/orion.jpg"));
    assert!(page.dispatch(UiEvent::KeyPressed("Enter".to_string())).is_none());
    let view = page
        .dispatch(UiEvent::KeyPressed("Escape".to_string()))
        .expect("lightbox closed");
    assert_eq!(view.lightbox, None);
}

#[tokio::test(start_paused = true)]
async fn dispose_ignores_events_and_cancels_pending_batch_items() {
    init_logging();
    let host = Arc::new(RecordingHost::new());
    let page = page(&host, StubFetcher::new());

    page.dispatch(UiEvent::DownloadAllClicked);
    tokio::time::sleep(Duration::from_millis(100)).await;
    page.dispose();

    assert!(page.is_disposed());
    assert!(page.dispatch(click("nav-download")).is_none());
    assert!(!page.view().picker_open);

    let reports = page.settle().await;
    assert_eq!(reports[0], DownloadReport::Direct);
    assert!(reports[1..].iter().all(|r| *r == DownloadReport::Cancelled));
    assert_eq!(host.saved_names(), vec!["index.html"]);
}
