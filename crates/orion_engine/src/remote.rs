use std::sync::Arc;

use orion_logging::{orion_info, orion_warn};

use crate::blob::BlobDownloader;
use crate::fetch::Fetcher;
use crate::FetchOutcome;

pub const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

/// Fetches a URL into memory and saves it; opens the URL directly when that fails.
#[derive(Clone)]
pub struct RemoteAssetFetcher {
    fetcher: Arc<dyn Fetcher>,
    saver: BlobDownloader,
}

impl RemoteAssetFetcher {
    pub fn new(fetcher: Arc<dyn Fetcher>, saver: BlobDownloader) -> Self {
        Self { fetcher, saver }
    }

    /// Exactly one of save or open happens per call.
    pub async fn fetch_and_save(&self, url: &str, filename: &str) -> FetchOutcome {
        match self.fetcher.fetch(url).await {
            Ok(output) => {
                let mime_type = output
                    .metadata
                    .content_type
                    .as_deref()
                    .unwrap_or(DEFAULT_MIME_TYPE)
                    .to_string();
                let bytes = output.metadata.byte_len;
                orion_info!(
                    "Fetched {} ({} bytes, {} redirects)",
                    output.metadata.final_url,
                    bytes,
                    output.metadata.redirect_count
                );
                self.saver.save(output.bytes, filename, &mime_type);
                FetchOutcome::Saved { bytes }
            }
            Err(err) => {
                orion_warn!("Fetching {} failed ({}); opening it directly", url, err);
                self.saver.host().open_in_new_context(url);
                FetchOutcome::FellBack(err.kind)
            }
        }
    }
}
