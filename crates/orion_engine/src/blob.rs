use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use orion_logging::orion_debug;

use crate::host::{Anchor, Blob, DownloadHost, ObjectUrl};

/// How long an object URL stays alive after its anchor was clicked.
pub const DEFAULT_REVOKE_GRACE: Duration = Duration::from_secs(4);

/// Triggers the host's native "save as" flow for in-memory content or local hrefs.
#[derive(Clone)]
pub struct BlobDownloader {
    host: Arc<dyn DownloadHost>,
    revoke_grace: Duration,
}

impl BlobDownloader {
    pub fn new(host: Arc<dyn DownloadHost>, revoke_grace: Duration) -> Self {
        Self { host, revoke_grace }
    }

    pub fn host(&self) -> &Arc<dyn DownloadHost> {
        &self.host
    }

    /// Saves `content` under `filename` through a transient object URL.
    ///
    /// The URL is revoked after the grace delay on the current Tokio runtime,
    /// or right away when called outside one.
    pub fn save(&self, content: impl Into<Bytes>, filename: &str, mime_type: &str) {
        let url = self.host.create_object_url(Blob::new(content, mime_type));
        self.activate(url.as_str(), filename);
        self.schedule_revoke(url);
    }

    /// Saves a same-origin relative link directly from its href.
    pub fn save_from_element_href(&self, href: &str, filename: &str) {
        self.activate(href, filename);
    }

    fn activate(&self, href: &str, filename: &str) {
        let download = if self.host.supports_download_attribute() {
            Some(filename.to_string())
        } else {
            orion_debug!(
                "download attribute unsupported; {} will open instead of saving as {}",
                href,
                filename
            );
            None
        };
        self.host.activate_anchor(&Anchor {
            href: href.to_string(),
            download,
        });
    }

    fn schedule_revoke(&self, url: ObjectUrl) {
        match tokio::runtime::Handle::try_current() {
            Ok(runtime) => {
                let host = Arc::clone(&self.host);
                let grace = self.revoke_grace;
                runtime.spawn(async move {
                    tokio::time::sleep(grace).await;
                    host.revoke_object_url(&url);
                });
            }
            Err(_) => {
                orion_debug!("No runtime to defer revocation of {}", url);
                self.host.revoke_object_url(&url);
            }
        }
    }
}
