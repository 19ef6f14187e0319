use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use bytes::Bytes;

/// In-memory content waiting to be saved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blob {
    pub bytes: Bytes,
    pub mime_type: String,
}

impl Blob {
    pub fn new(bytes: impl Into<Bytes>, mime_type: impl Into<String>) -> Self {
        Self {
            bytes: bytes.into(),
            mime_type: mime_type.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectUrl(String);

impl ObjectUrl {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ObjectUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A transient link element. `download` set means "save as", unset means navigate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Anchor {
    pub href: String,
    pub download: Option<String>,
}

/// The document the export layer runs in.
///
/// Implementations must not panic; failures are logged and swallowed so
/// nothing escapes a user gesture.
pub trait DownloadHost: Send + Sync {
    /// Whether anchors honour the `download` attribute. Without it a save
    /// degrades to plain navigation.
    fn supports_download_attribute(&self) -> bool {
        true
    }

    fn create_object_url(&self, blob: Blob) -> ObjectUrl;

    fn revoke_object_url(&self, url: &ObjectUrl);

    /// Append the anchor to the document, click it, and remove it again.
    fn activate_anchor(&self, anchor: &Anchor);

    fn open_in_new_context(&self, url: &str);
}

/// Object URL bookkeeping shared by host implementations.
#[derive(Debug, Default)]
pub struct ObjectUrlStore {
    next_id: AtomicU64,
    blobs: Mutex<HashMap<ObjectUrl, Blob>>,
}

impl ObjectUrlStore {
    pub const SCHEME_PREFIX: &'static str = "blob:orion/";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, blob: Blob) -> ObjectUrl {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        let url = ObjectUrl(format!("{}{id}", Self::SCHEME_PREFIX));
        self.lock().insert(url.clone(), blob);
        url
    }

    pub fn resolve(&self, href: &str) -> Option<Blob> {
        self.lock().get(&ObjectUrl(href.to_string())).cloned()
    }

    /// Returns false when the URL was unknown or already revoked.
    pub fn revoke(&self, url: &ObjectUrl) -> bool {
        self.lock().remove(url).is_some()
    }

    pub fn live_count(&self) -> usize {
        self.lock().len()
    }

    pub fn is_object_url(href: &str) -> bool {
        href.starts_with(Self::SCHEME_PREFIX)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<ObjectUrl, Blob>> {
        // A poisoned map is still consistent: every mutation is a single insert/remove.
        self.blobs.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
