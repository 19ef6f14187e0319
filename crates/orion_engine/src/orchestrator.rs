use std::time::Duration;

use orion_core::{AssetDescriptor, AssetLocation};
use orion_logging::{orion_debug, orion_error, orion_info};
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::blob::{BlobDownloader, DEFAULT_REVOKE_GRACE};
use crate::remote::RemoteAssetFetcher;
use crate::DownloadReport;

#[derive(Debug, Clone)]
pub struct DownloadSettings {
    /// Gap between successive starts in a batch; browsers throttle rapid saves.
    pub stagger: Duration,
    pub revoke_grace: Duration,
}

impl Default for DownloadSettings {
    fn default() -> Self {
        Self {
            stagger: Duration::from_millis(500),
            revoke_grace: DEFAULT_REVOKE_GRACE,
        }
    }
}

#[derive(Clone)]
pub struct DownloadOrchestrator {
    saver: BlobDownloader,
    remote: RemoteAssetFetcher,
    page_base: Option<Url>,
    stagger: Duration,
}

impl DownloadOrchestrator {
    pub fn new(
        saver: BlobDownloader,
        remote: RemoteAssetFetcher,
        page_base: Option<Url>,
        stagger: Duration,
    ) -> Self {
        Self {
            saver,
            remote,
            page_base,
            stagger,
        }
    }

    pub fn stagger(&self) -> Duration {
        self.stagger
    }

    /// Local assets are saved before this returns; remote ones are fetched first.
    pub async fn download_one(&self, asset: &AssetDescriptor) -> DownloadReport {
        if self.try_direct(asset) {
            return DownloadReport::Direct;
        }
        let outcome = self
            .remote
            .fetch_and_save(asset.url(), asset.suggested_filename())
            .await;
        DownloadReport::Fetched(outcome)
    }

    /// Saves a local asset from its href. Returns false for remote assets.
    pub fn try_direct(&self, asset: &AssetDescriptor) -> bool {
        if asset.location(self.page_base.as_ref()) != AssetLocation::Local {
            return false;
        }
        orion_debug!("Saving {} from href {}", asset.suggested_filename(), asset.url());
        self.saver
            .save_from_element_href(asset.url(), asset.suggested_filename());
        true
    }

    pub fn open(&self, asset: &AssetDescriptor) {
        self.saver.host().open_in_new_context(asset.url());
    }

    /// Starts a staggered batch on the current Tokio runtime.
    pub fn download_all(&self, assets: Vec<AssetDescriptor>) -> BatchHandle {
        self.download_all_with(assets, &CancellationToken::new())
    }

    /// Like [`download_all`](Self::download_all); cancelling `parent` cancels the batch.
    pub fn download_all_with(
        &self,
        assets: Vec<AssetDescriptor>,
        parent: &CancellationToken,
    ) -> BatchHandle {
        let token = parent.child_token();
        let driver_token = token.clone();
        let this = self.clone();
        orion_info!(
            "Starting batch of {} downloads, {:?} apart",
            assets.len(),
            self.stagger
        );

        let join = tokio::spawn(async move {
            let started = Instant::now();
            let mut slots = Vec::with_capacity(assets.len());
            for (index, asset) in assets.into_iter().enumerate() {
                let due = started + this.stagger * index as u32;
                let cancelled = tokio::select! {
                    biased;
                    _ = driver_token.cancelled() => true,
                    _ = sleep_until(due) => false,
                };
                if cancelled {
                    slots.push(Slot::Done(DownloadReport::Cancelled));
                    continue;
                }
                if this.try_direct(&asset) {
                    slots.push(Slot::Done(DownloadReport::Direct));
                } else {
                    let worker = this.clone();
                    slots.push(Slot::Running(tokio::spawn(async move {
                        worker.download_one(&asset).await
                    })));
                }
            }

            let mut reports = Vec::with_capacity(slots.len());
            for slot in slots {
                reports.push(match slot {
                    Slot::Done(report) => report,
                    Slot::Running(handle) => match handle.await {
                        Ok(report) => report,
                        Err(err) => {
                            orion_error!("Batch download task failed: {}", err);
                            DownloadReport::Cancelled
                        }
                    },
                });
            }
            reports
        });

        BatchHandle { token, join }
    }
}

enum Slot {
    Done(DownloadReport),
    Running(JoinHandle<DownloadReport>),
}

/// A running batch. Dropping it leaves the batch running.
pub struct BatchHandle {
    token: CancellationToken,
    join: JoinHandle<Vec<DownloadReport>>,
}

impl BatchHandle {
    /// Items not yet started are skipped; fetches already in flight finish.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }

    /// Reports in the batch's original order.
    pub async fn join(self) -> Vec<DownloadReport> {
        match self.join.await {
            Ok(reports) => reports,
            Err(err) => {
                orion_error!("Batch driver failed: {}", err);
                Vec::new()
            }
        }
    }
}
