//! A [`DownloadHost`] backed by the local filesystem.
//!
//! Saves land in a downloads directory. Relative hrefs, and absolute ones on
//! the page's own origin, resolve against the site root. "Open in a new
//! context" hands the target to an external opener command, or just logs it
//! when none is configured.

use std::fs;
use std::path::{Component, Path, PathBuf};
use std::process::{Child, Command};
use std::thread;

use orion_core::FALLBACK_FILENAME;
use orion_logging::{orion_error, orion_info, orion_warn};
use url::Url;

use crate::host::{Anchor, Blob, DownloadHost, ObjectUrl, ObjectUrlStore};
use crate::persist::AtomicFileWriter;

#[derive(Debug)]
pub struct FsDownloadHost {
    writer: AtomicFileWriter,
    site_root: PathBuf,
    page_base: Option<Url>,
    opener: Option<String>,
    objects: ObjectUrlStore,
}

impl FsDownloadHost {
    pub fn new(downloads_dir: PathBuf, site_root: PathBuf) -> Self {
        Self {
            writer: AtomicFileWriter::new(downloads_dir),
            site_root,
            page_base: None,
            opener: None,
            objects: ObjectUrlStore::new(),
        }
    }

    /// Origin the site root is served from; absolute hrefs on it map onto the site root.
    pub fn with_page_base(mut self, page_base: Url) -> Self {
        self.page_base = Some(page_base);
        self
    }

    /// Command used to open URLs, e.g. `xdg-open`.
    pub fn with_opener(mut self, opener: impl Into<String>) -> Self {
        self.opener = Some(opener.into());
        self
    }

    pub fn downloads_dir(&self) -> &Path {
        self.writer.dir()
    }

    pub fn live_object_urls(&self) -> usize {
        self.objects.live_count()
    }

    /// Maps an href onto the site root, refusing to leave it.
    ///
    /// Relative hrefs are taken as they are. Absolute and protocol-relative
    /// hrefs must share the page base's origin and sit under its path.
    pub fn resolve_local(&self, href: &str) -> Option<PathBuf> {
        let href = href.trim();
        let site_path = if href.starts_with("//") || Url::parse(href).is_ok() {
            let base = self.page_base.as_ref()?;
            let url = base.join(href).ok()?;
            if url.origin() != base.origin() {
                return None;
            }
            url.path().strip_prefix(base.path())?.to_string()
        } else {
            href.split(['?', '#']).next().unwrap_or(href).to_string()
        };
        let relative = Path::new(site_path.trim_start_matches("./"));
        if relative.as_os_str().is_empty()
            || !relative
                .components()
                .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
        {
            return None;
        }
        Some(self.site_root.join(relative))
    }

    fn save_blob(&self, blob: &Blob, filename: &str) {
        match self.writer.write(filename, &blob.bytes) {
            Ok(path) => orion_info!(
                "Saved {} bytes ({}) to {:?}",
                blob.bytes.len(),
                blob.mime_type,
                path
            ),
            Err(err) => orion_error!("Failed to save {}: {}", filename, err),
        }
    }

    /// Copies a site file into the downloads dir; opens the href when the
    /// file is not reachable so the asset is never silently dropped.
    fn save_local(&self, href: &str, filename: &str) {
        let Some(source) = self.resolve_local(href) else {
            orion_warn!("{:?} is not under the site root; opening it instead", href);
            self.open_in_new_context(href);
            return;
        };
        match fs::read(&source) {
            Ok(content) => match self.writer.write(filename, &content) {
                Ok(path) => orion_info!("Copied {:?} to {:?}", source, path),
                Err(err) => orion_error!("Failed to save {}: {}", filename, err),
            },
            Err(err) => {
                orion_warn!("Failed to read {:?} ({}); opening {} instead", source, err, href);
                self.open_in_new_context(href);
            }
        }
    }

    fn navigate(&self, href: &str) {
        if ObjectUrlStore::is_object_url(href) {
            // Nothing outside this process can follow an in-memory URL.
            if let Some(blob) = self.objects.resolve(href) {
                self.save_blob(&blob, FALLBACK_FILENAME);
            }
            return;
        }
        self.open_in_new_context(href);
    }

    fn open_target(&self, url: &str) -> String {
        match self.resolve_local(url) {
            Some(path) if path.exists() => path.to_string_lossy().into_owned(),
            _ => url.to_string(),
        }
    }
}

fn reap(opener: String, mut child: Child) {
    thread::spawn(move || match child.wait() {
        Ok(status) if !status.success() => orion_warn!("{} exited with {}", opener, status),
        Ok(_) => {}
        Err(err) => orion_error!("Failed to wait for {}: {}", opener, err),
    });
}

impl DownloadHost for FsDownloadHost {
    fn create_object_url(&self, blob: Blob) -> ObjectUrl {
        self.objects.insert(blob)
    }

    fn revoke_object_url(&self, url: &ObjectUrl) {
        if !self.objects.revoke(url) {
            orion_warn!("Object URL {} was already revoked", url);
        }
    }

    fn activate_anchor(&self, anchor: &Anchor) {
        match (&anchor.download, ObjectUrlStore::is_object_url(&anchor.href)) {
            (Some(filename), true) => match self.objects.resolve(&anchor.href) {
                Some(blob) => self.save_blob(&blob, filename),
                None => orion_error!("Object URL {} is no longer alive", anchor.href),
            },
            (Some(filename), false) => self.save_local(&anchor.href, filename),
            (None, _) => self.navigate(&anchor.href),
        }
    }

    fn open_in_new_context(&self, url: &str) {
        let target = self.open_target(url);
        match &self.opener {
            Some(opener) => {
                match Command::new(opener).arg(&target).spawn() {
                    Ok(child) => reap(opener.clone(), child),
                    Err(err) => orion_error!("Failed to open {} with {}: {}", target, opener, err),
                }
            }
            None => orion_info!("Open {} manually to save it", target),
        }
    }
}
