use std::collections::HashSet;

use crate::asset::{last_path_segment, url_extension, AssetDescriptor};

const MAX_NAME_CHARS: usize = 80;

/// An `img` element as seen by the page scan.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ImageElement {
    pub src: Option<String>,
    /// Lazy-load source; preferred over `src` when present.
    pub data_src: Option<String>,
    pub alt: Option<String>,
}

impl ImageElement {
    pub fn new(src: impl Into<String>, alt: impl Into<String>) -> Self {
        Self {
            src: Some(src.into()),
            data_src: None,
            alt: Some(alt.into()),
        }
    }

    /// The URL the image really loads from, if any.
    pub fn source(&self) -> Option<&str> {
        [self.data_src.as_deref(), self.src.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|s| !s.is_empty())
    }
}

/// Builds the picker's asset list: bundled files first, then one entry per page image.
///
/// Every filename in the result is unique; later duplicates get a `-N` suffix.
pub fn build_asset_list(bundle: Vec<AssetDescriptor>, images: &[ImageElement]) -> Vec<AssetDescriptor> {
    let mut names = FilenameRegistry::default();
    let mut assets = Vec::with_capacity(bundle.len() + images.len());

    for asset in bundle {
        let name = names.claim(&sanitize_filename(asset.suggested_filename()));
        assets.push(AssetDescriptor::new(asset.url(), name));
    }

    let mut unnamed = 0usize;
    for image in images {
        let Some(src) = image.source() else {
            continue;
        };
        let name = image_filename(src, image.alt.as_deref(), &mut unnamed);
        let name = names.claim(&name);
        assets.push(AssetDescriptor::new(src, name));
    }

    assets
}

/// Filename for an image: alt text without whitespace, then the URL segment, then `image-N`.
pub fn image_filename(src: &str, alt: Option<&str>, unnamed: &mut usize) -> String {
    let alt_name: String = alt
        .unwrap_or_default()
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();
    let alt_name = sanitize_filename(&alt_name);
    if !alt_name.is_empty() {
        return match url_extension(src) {
            Some(ext) if !has_extension(&alt_name) => format!("{alt_name}.{ext}"),
            _ => alt_name,
        };
    }

    if let Some(segment) = last_path_segment(src) {
        let from_url = sanitize_filename(segment);
        if !from_url.is_empty() {
            return from_url;
        }
    }

    *unnamed += 1;
    format!("image-{unnamed}")
}

/// Filesystem-safe filename; empty when nothing usable is left.
pub fn sanitize_filename(input: &str) -> String {
    let replaced: String = input
        .chars()
        .map(|c| if is_forbidden(c) { '_' } else { c })
        .collect();
    let trimmed = replaced.trim_matches(&['_', ' ', '.'][..]);

    let mut compacted = String::with_capacity(trimmed.len());
    let mut prev_underscore = false;
    for c in trimmed.chars().take(MAX_NAME_CHARS) {
        if c == '_' && prev_underscore {
            continue;
        }
        prev_underscore = c == '_';
        compacted.push(c);
    }

    let stem_len = stem(&compacted).len();
    if is_reserved_windows_name(&compacted[..stem_len]) {
        compacted.insert(stem_len, '_');
    }
    compacted
}

#[derive(Debug, Default)]
struct FilenameRegistry {
    used: HashSet<String>,
}

impl FilenameRegistry {
    fn claim(&mut self, name: &str) -> String {
        let name = if name.is_empty() {
            crate::asset::FALLBACK_FILENAME
        } else {
            name
        };
        if self.used.insert(name.to_string()) {
            return name.to_string();
        }
        let (base, ext) = split_extension(name);
        let mut n = 2usize;
        loop {
            let candidate = match ext {
                Some(ext) => format!("{base}-{n}.{ext}"),
                None => format!("{base}-{n}"),
            };
            if self.used.insert(candidate.clone()) {
                return candidate;
            }
            n += 1;
        }
    }
}

fn split_extension(name: &str) -> (&str, Option<&str>) {
    match name.rsplit_once('.') {
        Some((base, ext)) if !base.is_empty() && !ext.is_empty() => (base, Some(ext)),
        _ => (name, None),
    }
}

fn has_extension(name: &str) -> bool {
    split_extension(name).1.is_some()
}

fn stem(name: &str) -> &str {
    split_extension(name).0
}

fn is_forbidden(c: char) -> bool {
    matches!(c,
        '\\' | '/' | ':' | '*' | '?' | '"' | '<' | '>' | '|' | '\0'..='\u{1F}'
    )
}

fn is_reserved_windows_name(name: &str) -> bool {
    const RESERVED: &[&str] = &[
        "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
        "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
    ];
    RESERVED.iter().any(|r| r.eq_ignore_ascii_case(name))
}
