//! Explicit page entry point: wires the export layer to a document and
//! returns a handle that owns every listener and in-flight job.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use orion_core::{update, AssetDescriptor, Effect, ImageElement, Msg, PageState, PageViewModel};
use orion_logging::{orion_debug, orion_error, orion_info, orion_warn};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::blob::BlobDownloader;
use crate::calendar::{CalendarExportAction, CalendarSettings, Clock};
use crate::fetch::{FetchSettings, Fetcher, ReqwestFetcher};
use crate::host::DownloadHost;
use crate::orchestrator::{BatchHandle, DownloadOrchestrator, DownloadSettings};
use crate::remote::RemoteAssetFetcher;
use crate::DownloadReport;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TriggerRole {
    Download,
    Calendar,
}

/// What the hosting page exposes to the export layer.
#[derive(Debug, Clone, Default)]
pub struct PageDocument {
    /// Element id for each control role.
    pub triggers: HashMap<TriggerRole, String>,
    pub images: Vec<ImageElement>,
}

impl PageDocument {
    pub fn with_trigger(mut self, role: TriggerRole, element_id: impl Into<String>) -> Self {
        self.triggers.insert(role, element_id.into());
        self
    }

    pub fn with_images(mut self, images: Vec<ImageElement>) -> Self {
        self.images = images;
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct PageConfig {
    /// Files offered in the picker ahead of the page images.
    pub bundle: Vec<AssetDescriptor>,
    /// Origin the page is served from; same-origin URLs count as local.
    pub page_base: Option<Url>,
    pub downloads: DownloadSettings,
    pub fetch: FetchSettings,
    pub calendar: CalendarSettings,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    /// A click anywhere in the document, identified by the element id.
    ElementClicked(String),
    RowDownloadClicked(usize),
    RowOpenClicked(usize),
    DownloadAllClicked,
    ImageClicked(usize),
    LightboxClicked,
    KeyPressed(String),
}

/// Initializes the page with the default HTTP fetcher.
pub fn initialize(document: PageDocument, host: Arc<dyn DownloadHost>, config: PageConfig) -> PageHandle {
    let mut fetch = config.fetch.clone();
    if fetch.base_url.is_none() {
        fetch.base_url = config.page_base.clone();
    }
    let fetcher: Arc<dyn Fetcher> = Arc::new(ReqwestFetcher::new(fetch));
    initialize_with(document, host, fetcher, config, None)
}

/// Initializes the page with an explicit fetcher and, optionally, a clock.
pub fn initialize_with(
    document: PageDocument,
    host: Arc<dyn DownloadHost>,
    fetcher: Arc<dyn Fetcher>,
    config: PageConfig,
    clock: Option<Clock>,
) -> PageHandle {
    let saver = BlobDownloader::new(host, config.downloads.revoke_grace);
    let remote = RemoteAssetFetcher::new(fetcher, saver.clone());
    let orchestrator = DownloadOrchestrator::new(
        saver.clone(),
        remote,
        config.page_base.clone(),
        config.downloads.stagger,
    );
    let mut calendar = CalendarExportAction::new(config.calendar, saver);
    if let Some(clock) = clock {
        calendar = calendar.with_clock(clock);
    }

    let mut roles = HashMap::new();
    for (role, element_id) in &document.triggers {
        roles.insert(element_id.clone(), *role);
    }
    for role in [TriggerRole::Download, TriggerRole::Calendar] {
        if !document.triggers.contains_key(&role) {
            orion_warn!("No element carries the {:?} role", role);
        }
    }

    let (state, _) = update(
        PageState::new(),
        Msg::PageScanned {
            bundle: config.bundle,
            images: document.images,
        },
    );
    orion_info!(
        "Orion page initialized with {} downloadable assets",
        state.assets().len()
    );

    PageHandle {
        state: Mutex::new(state),
        roles,
        runner: EffectRunner {
            orchestrator,
            calendar,
            cancel: CancellationToken::new(),
            jobs: Mutex::new(Vec::new()),
        },
        disposed: AtomicBool::new(false),
    }
}

/// Owns the page's listeners. Dispatch must happen inside a Tokio runtime.
pub struct PageHandle {
    state: Mutex<PageState>,
    roles: HashMap<String, TriggerRole>,
    runner: EffectRunner,
    disposed: AtomicBool,
}

impl PageHandle {
    /// Handles one UI event. Returns the new view when it changed.
    pub fn dispatch(&self, event: UiEvent) -> Option<PageViewModel> {
        if self.disposed.load(Ordering::Acquire) {
            orion_debug!("Ignoring {:?} after dispose", event);
            return None;
        }
        let msg = self.translate(event);
        let (view, effects) = {
            let mut guard = lock(&self.state);
            let state = std::mem::take(&mut *guard);
            let (mut state, effects) = update(state, msg);
            let view = state.consume_dirty().then(|| state.view());
            *guard = state;
            (view, effects)
        };
        self.runner.run(effects);
        view
    }

    pub fn view(&self) -> PageViewModel {
        lock(&self.state).view()
    }

    pub fn assets(&self) -> Vec<AssetDescriptor> {
        lock(&self.state).assets().to_vec()
    }

    /// Waits for every download started so far and returns their reports.
    pub async fn settle(&self) -> Vec<DownloadReport> {
        let jobs = std::mem::take(&mut *lock(&self.runner.jobs));
        let mut reports = Vec::new();
        for job in jobs {
            match job {
                Job::Single(handle) => match handle.await {
                    Ok(report) => reports.push(report),
                    Err(err) => orion_error!("Download task failed: {}", err),
                },
                Job::Batch(batch) => reports.extend(batch.join().await),
                Job::Done(report) => reports.push(report),
            }
        }
        reports
    }

    /// Removes all listeners and cancels batch items that have not started.
    pub fn dispose(&self) {
        if !self.disposed.swap(true, Ordering::AcqRel) {
            self.runner.cancel.cancel();
            orion_info!("Orion page disposed");
        }
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::Acquire)
    }

    fn translate(&self, event: UiEvent) -> Msg {
        match event {
            UiEvent::ElementClicked(element_id) => match self.roles.get(&element_id) {
                Some(TriggerRole::Download) => Msg::DownloadTriggerClicked,
                Some(TriggerRole::Calendar) => Msg::CalendarClicked,
                None => Msg::ClickedOutside,
            },
            UiEvent::RowDownloadClicked(index) => Msg::AssetDownloadClicked(index),
            UiEvent::RowOpenClicked(index) => Msg::AssetOpenClicked(index),
            UiEvent::DownloadAllClicked => Msg::DownloadAllClicked,
            UiEvent::ImageClicked(index) => Msg::ImageClicked(index),
            UiEvent::LightboxClicked => Msg::LightboxClicked,
            UiEvent::KeyPressed(key) if key == "Escape" => Msg::EscapePressed,
            UiEvent::KeyPressed(_) => Msg::NoOp,
        }
    }
}

impl Drop for PageHandle {
    fn drop(&mut self) {
        self.dispose();
    }
}

enum Job {
    Done(DownloadReport),
    Single(JoinHandle<DownloadReport>),
    Batch(BatchHandle),
}

struct EffectRunner {
    orchestrator: DownloadOrchestrator,
    calendar: CalendarExportAction,
    cancel: CancellationToken,
    jobs: Mutex<Vec<Job>>,
}

impl EffectRunner {
    fn run(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::Download(asset) => {
                    if self.orchestrator.try_direct(&asset) {
                        self.track(Job::Done(DownloadReport::Direct));
                    } else {
                        let orchestrator = self.orchestrator.clone();
                        let handle =
                            tokio::spawn(async move { orchestrator.download_one(&asset).await });
                        self.track(Job::Single(handle));
                    }
                }
                Effect::DownloadAll(assets) => {
                    let batch = self.orchestrator.download_all_with(assets, &self.cancel);
                    self.track(Job::Batch(batch));
                }
                Effect::Open(asset) => self.orchestrator.open(&asset),
                Effect::ExportCalendar => {
                    if let Err(err) = self.calendar.trigger() {
                        orion_error!("Calendar export skipped: {}", err);
                    }
                }
            }
        }
    }

    fn track(&self, job: Job) {
        lock(&self.jobs).push(job);
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
