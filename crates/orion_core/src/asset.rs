use url::Url;

/// Filename used when neither the source nor the URL offers one.
pub const FALLBACK_FILENAME: &str = "file";

/// A downloadable asset: where it lives and what to call it on disk.
///
/// `suggested_filename` is never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetDescriptor {
    url: String,
    suggested_filename: String,
}

impl AssetDescriptor {
    /// Builds a descriptor, deriving a filename from the URL when `filename` is blank.
    pub fn new(url: impl Into<String>, filename: impl Into<String>) -> Self {
        let url = url.into();
        let filename = filename.into();
        let suggested_filename = if filename.trim().is_empty() {
            last_path_segment(&url)
                .map(ToOwned::to_owned)
                .unwrap_or_else(|| FALLBACK_FILENAME.to_string())
        } else {
            filename
        };
        Self {
            url,
            suggested_filename,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn suggested_filename(&self) -> &str {
        &self.suggested_filename
    }

    pub fn location(&self, page_base: Option<&Url>) -> AssetLocation {
        AssetLocation::classify(&self.url, page_base)
    }
}

/// Whether an asset can be saved straight from its href or has to be fetched first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetLocation {
    /// Relative, same-origin, or already in-document (`blob:`/`data:`).
    Local,
    Remote,
}

impl AssetLocation {
    pub fn classify(url: &str, page_base: Option<&Url>) -> Self {
        let trimmed = url.trim();
        // Protocol-relative URLs parse as relative but point at another host.
        if trimmed.starts_with("//") {
            return match (page_base, page_base.and_then(|b| b.join(trimmed).ok())) {
                (Some(base), Some(joined)) if joined.origin() == base.origin() => Self::Local,
                _ => Self::Remote,
            };
        }
        match Url::parse(trimmed) {
            Err(url::ParseError::RelativeUrlWithoutBase) => Self::Local,
            Err(_) => Self::Remote,
            Ok(parsed) => {
                if matches!(parsed.scheme(), "blob" | "data") {
                    return Self::Local;
                }
                match page_base {
                    Some(base) if parsed.origin() == base.origin() => Self::Local,
                    _ => Self::Remote,
                }
            }
        }
    }
}

/// Last non-empty path segment of an absolute or relative URL, ignoring query and fragment.
pub fn last_path_segment(url: &str) -> Option<&str> {
    let trimmed = url.trim();
    let path = match Url::parse(trimmed) {
        Ok(parsed) if parsed.has_host() => {
            // Borrow from the input rather than the parsed URL.
            let after_scheme = trimmed.split_once("//").map(|(_, rest)| rest)?;
            match after_scheme.find('/') {
                Some(idx) => &after_scheme[idx..],
                None => return None,
            }
        }
        _ => trimmed,
    };
    let path = path.split(['?', '#']).next().unwrap_or(path);
    path.rsplit('/').next().filter(|segment| !segment.is_empty())
}

/// Extension of the URL's last path segment, when it looks like one.
pub fn url_extension(url: &str) -> Option<&str> {
    let segment = last_path_segment(url)?;
    let (stem, ext) = segment.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() || ext.len() > 5 {
        return None;
    }
    ext.chars()
        .all(|c| c.is_ascii_alphanumeric())
        .then_some(ext)
}
