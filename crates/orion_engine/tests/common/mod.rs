#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Mutex, Once};
use std::time::Duration;

use bytes::Bytes;
use orion_engine::{
    Anchor, Blob, DownloadHost, FailureKind, FetchError, FetchMetadata, FetchOutput, Fetcher,
    ObjectUrl, ObjectUrlStore,
};
use tokio::time::Instant;

pub fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(orion_logging::initialize_for_tests);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
    Activated {
        at: Instant,
        anchor: Anchor,
        blob: Option<Blob>,
    },
    Opened {
        at: Instant,
        url: String,
    },
    Revoked(ObjectUrl),
}

/// Records every host interaction instead of touching a real document.
pub struct RecordingHost {
    download_attribute: bool,
    objects: ObjectUrlStore,
    events: Mutex<Vec<HostEvent>>,
}

impl RecordingHost {
    pub fn new() -> Self {
        Self {
            download_attribute: true,
            objects: ObjectUrlStore::new(),
            events: Mutex::new(Vec::new()),
        }
    }

    pub fn without_download_attribute() -> Self {
        Self {
            download_attribute: false,
            ..Self::new()
        }
    }

    pub fn events(&self) -> Vec<HostEvent> {
        self.events.lock().unwrap().clone()
    }

    /// `(when, href, download name, blob)` for every activated anchor.
    pub fn activations(&self) -> Vec<(Instant, Anchor, Option<Blob>)> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                HostEvent::Activated { at, anchor, blob } => Some((at, anchor, blob)),
                _ => None,
            })
            .collect()
    }

    pub fn saved_names(&self) -> Vec<String> {
        self.activations()
            .into_iter()
            .filter_map(|(_, anchor, _)| anchor.download)
            .collect()
    }

    pub fn opened(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                HostEvent::Opened { url, .. } => Some(url),
                _ => None,
            })
            .collect()
    }

    pub fn live_object_urls(&self) -> usize {
        self.objects.live_count()
    }

    fn push(&self, event: HostEvent) {
        self.events.lock().unwrap().push(event);
    }
}

impl DownloadHost for RecordingHost {
    fn supports_download_attribute(&self) -> bool {
        self.download_attribute
    }

    fn create_object_url(&self, blob: Blob) -> ObjectUrl {
        self.objects.insert(blob)
    }

    fn revoke_object_url(&self, url: &ObjectUrl) {
        self.objects.revoke(url);
        self.push(HostEvent::Revoked(url.clone()));
    }

    fn activate_anchor(&self, anchor: &Anchor) {
        let blob = self.objects.resolve(&anchor.href);
        self.push(HostEvent::Activated {
            at: Instant::now(),
            anchor: anchor.clone(),
            blob,
        });
    }

    fn open_in_new_context(&self, url: &str) {
        self.push(HostEvent::Opened {
            at: Instant::now(),
            url: url.to_string(),
        });
    }
}

/// Canned responses keyed by URL; unknown URLs fail with a network error.
pub struct StubFetcher {
    responses: HashMap<String, Result<FetchOutput, FetchError>>,
    delay: Duration,
    calls: Mutex<Vec<String>>,
}

impl StubFetcher {
    pub fn new() -> Self {
        Self {
            responses: HashMap::new(),
            delay: Duration::ZERO,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn ok(mut self, url: &str, body: &'static [u8], content_type: Option<&str>) -> Self {
        let output = FetchOutput {
            bytes: Bytes::from_static(body),
            metadata: FetchMetadata {
                original_url: url.to_string(),
                final_url: url.to_string(),
                redirect_count: 0,
                content_type: content_type.map(ToOwned::to_owned),
                byte_len: body.len() as u64,
            },
        };
        self.responses.insert(url.to_string(), Ok(output));
        self
    }

    pub fn fail(mut self, url: &str, kind: FailureKind) -> Self {
        let error = FetchError {
            kind,
            message: "stubbed failure".to_string(),
        };
        self.responses.insert(url.to_string(), Err(error));
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Fetcher for StubFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchOutput, FetchError> {
        self.calls.lock().unwrap().push(url.to_string());
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.responses.get(url).cloned().unwrap_or_else(|| {
            Err(FetchError {
                kind: FailureKind::Network,
                message: "no stubbed response".to_string(),
            })
        })
    }
}
