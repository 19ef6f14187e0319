//! RON configuration for the binary.
//!
//! Every section and field is optional; anything left out keeps the
//! built-in default. A missing file means "all defaults".

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use orion_core::{AssetDescriptor, DailySchedule, ImageElement};
use orion_engine::{
    CalendarSettings, DownloadSettings, FetchSettings, FsDownloadHost, PageConfig, PageDocument,
    TriggerRole, DEFAULT_REVOKE_GRACE,
};
use orion_logging::orion_info;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

/// Element ids the binary gives to the two page controls.
pub(crate) const DOWNLOAD_TRIGGER_ID: &str = "download-trigger";
pub(crate) const CALENDAR_TRIGGER_ID: &str = "calendar-trigger";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: ron::error::SpannedError,
    },
    #[error("invalid base URL {0:?}: {1}")]
    BaseUrl(String, #[source] url::ParseError),
    #[error("calendar duration of {0} minutes is out of range")]
    DurationOutOfRange(i64),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub page: PageSection,
    pub downloads: DownloadsSection,
    pub calendar: CalendarSection,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PageSection {
    pub base_url: Option<String>,
    /// Directory relative hrefs resolve against.
    pub site_root: PathBuf,
    pub downloads_dir: PathBuf,
    /// Command that opens URLs, e.g. `xdg-open`.
    pub opener: Option<String>,
    pub bundle: Vec<BundleEntry>,
    pub images: Vec<ImageEntry>,
}

impl Default for PageSection {
    fn default() -> Self {
        Self {
            base_url: None,
            site_root: PathBuf::from("."),
            downloads_dir: PathBuf::from("downloads"),
            opener: None,
            bundle: ["index.html", "style.css", "images.zip"]
                .into_iter()
                .map(|url| BundleEntry {
                    url: url.to_string(),
                    filename: None,
                })
                .collect(),
            images: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BundleEntry {
    pub url: String,
    #[serde(default)]
    pub filename: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ImageEntry {
    pub src: Option<String>,
    pub data_src: Option<String>,
    pub alt: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DownloadsSection {
    pub stagger_ms: u64,
    pub revoke_grace_ms: u64,
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
    pub redirect_limit: usize,
    pub max_bytes: u64,
}

impl Default for DownloadsSection {
    fn default() -> Self {
        let downloads = DownloadSettings::default();
        let fetch = FetchSettings::default();
        Self {
            stagger_ms: downloads.stagger.as_millis() as u64,
            revoke_grace_ms: DEFAULT_REVOKE_GRACE.as_millis() as u64,
            connect_timeout_secs: fetch.connect_timeout.as_secs(),
            request_timeout_secs: fetch.request_timeout.as_secs(),
            redirect_limit: fetch.redirect_limit,
            max_bytes: fetch.max_bytes,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CalendarSection {
    pub title: String,
    pub description: String,
    pub location: String,
    /// Local start time of the event.
    pub hour: u32,
    pub minute: u32,
    pub duration_minutes: i64,
    pub filename: String,
}

impl Default for CalendarSection {
    fn default() -> Self {
        let settings = CalendarSettings::default();
        Self {
            title: settings.title,
            description: settings.description,
            location: settings.location,
            hour: settings.schedule.hour,
            minute: settings.schedule.minute,
            duration_minutes: settings.schedule.duration.num_minutes(),
            filename: settings.filename,
        }
    }
}

impl AppConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                orion_info!("No config at {:?}; using defaults", path);
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        let config: Self = ron::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        orion_info!("Loaded config from {:?}", path);
        Ok(config)
    }

    pub fn page_config(&self) -> Result<PageConfig, ConfigError> {
        let page_base = self
            .page
            .base_url
            .as_deref()
            .map(|raw| Url::parse(raw).map_err(|err| ConfigError::BaseUrl(raw.to_string(), err)))
            .transpose()?;

        let downloads = &self.downloads;
        let calendar = &self.calendar;
        let duration = chrono::Duration::try_minutes(calendar.duration_minutes)
            .ok_or(ConfigError::DurationOutOfRange(calendar.duration_minutes))?;
        Ok(PageConfig {
            bundle: self
                .page
                .bundle
                .iter()
                .map(|entry| {
                    AssetDescriptor::new(
                        entry.url.as_str(),
                        entry.filename.clone().unwrap_or_default(),
                    )
                })
                .collect(),
            page_base: page_base.clone(),
            downloads: DownloadSettings {
                stagger: Duration::from_millis(downloads.stagger_ms),
                revoke_grace: Duration::from_millis(downloads.revoke_grace_ms),
            },
            fetch: FetchSettings {
                connect_timeout: Duration::from_secs(downloads.connect_timeout_secs),
                request_timeout: Duration::from_secs(downloads.request_timeout_secs),
                redirect_limit: downloads.redirect_limit,
                max_bytes: downloads.max_bytes,
                base_url: page_base,
            },
            calendar: CalendarSettings {
                title: calendar.title.clone(),
                description: calendar.description.clone(),
                location: calendar.location.clone(),
                schedule: DailySchedule {
                    hour: calendar.hour,
                    minute: calendar.minute,
                    duration,
                },
                filename: calendar.filename.clone(),
            },
        })
    }

    pub fn document(&self) -> PageDocument {
        PageDocument::default()
            .with_trigger(TriggerRole::Download, DOWNLOAD_TRIGGER_ID)
            .with_trigger(TriggerRole::Calendar, CALENDAR_TRIGGER_ID)
            .with_images(
                self.page
                    .images
                    .iter()
                    .map(|image| ImageElement {
                        src: image.src.clone(),
                        data_src: image.data_src.clone(),
                        alt: image.alt.clone(),
                    })
                    .collect(),
            )
    }

    /// The filesystem host, serving the site root from `page_base` when given.
    pub fn host(&self, page_base: Option<Url>) -> FsDownloadHost {
        let mut host = FsDownloadHost::new(
            self.page.downloads_dir.clone(),
            self.page.site_root.clone(),
        );
        if let Some(base) = page_base {
            host = host.with_page_base(base);
        }
        match &self.page.opener {
            Some(opener) => host.with_opener(opener.as_str()),
            None => host,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn write_config(dir: &TempDir, content: &str) -> PathBuf {
        let path = dir.path().join("orion.ron");
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn missing_file_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let config = AppConfig::load(&dir.path().join("absent.ron")).unwrap();
        assert_eq!(config, AppConfig::default());

        let page = config.page_config().unwrap();
        let names: Vec<_> = page.bundle.iter().map(|a| a.suggested_filename()).collect();
        assert_eq!(names, ["index.html", "style.css", "images.zip"]);
        assert_eq!(page.downloads.stagger, Duration::from_millis(500));
        assert_eq!(page.calendar.schedule, DailySchedule::default());
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let dir = TempDir::new().unwrap();
        let path = write_config(
            &dir,
            r#"(
                page: (
                    base_url: Some("https://orion.example.co/"),
                    images: [(src: Some("img/m42.jpg"), alt: Some("Nebula Orion"))],
                ),
                downloads: (stagger_ms: 250),
                calendar: (hour: 20, duration_minutes: 90),
            )"#,
        );

        let config = AppConfig::load(&path).unwrap();
        assert_eq!(config.downloads.stagger_ms, 250);
        assert_eq!(
            config.downloads.request_timeout_secs,
            DownloadsSection::default().request_timeout_secs
        );
        assert_eq!(config.calendar.title, CalendarSection::default().title);

        let page = config.page_config().unwrap();
        assert_eq!(page.page_base.as_ref().map(Url::as_str), Some("https://orion.example.co/"));
        assert_eq!(page.fetch.base_url, page.page_base);
        assert_eq!(page.calendar.schedule.hour, 20);
        assert_eq!(page.calendar.schedule.duration, chrono::Duration::minutes(90));

        let document = config.document();
        assert_eq!(document.images.len(), 1);
        assert_eq!(document.images[0].source(), Some("img/m42.jpg"));
        assert_eq!(
            document.triggers.get(&TriggerRole::Calendar).map(String::as_str),
            Some(CALENDAR_TRIGGER_ID)
        );
    }

    #[test]
    fn bundle_entry_without_filename_uses_url_segment() {
        let dir = TempDir::new().unwrap();
        let path = write_config(
            &dir,
            r#"(page: (bundle: [(url: "dist/orion-pack.zip"), (url: "style.css", filename: Some("orion.css"))]))"#,
        );

        let page = AppConfig::load(&path).unwrap().page_config().unwrap();
        let names: Vec<_> = page.bundle.iter().map(|a| a.suggested_filename()).collect();
        assert_eq!(names, ["orion-pack.zip", "orion.css"]);
    }

    #[test]
    fn malformed_ron_is_a_parse_error() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "(page: (base_url: ");
        assert!(matches!(
            AppConfig::load(&path),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn oversized_calendar_duration_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, &format!("(calendar: (duration_minutes: {}))", i64::MAX));

        let config = AppConfig::load(&path).unwrap();
        assert!(matches!(
            config.page_config(),
            Err(ConfigError::DurationOutOfRange(i64::MAX))
        ));
    }

    #[test]
    fn host_maps_the_page_base_onto_the_site_root() {
        let mut config = AppConfig::default();
        config.page.site_root = PathBuf::from("site");
        let base = Url::parse("https://orion.example.co/").unwrap();

        let host = config.host(Some(base));
        assert_eq!(
            host.resolve_local("https://orion.example.co/style.css"),
            Some(PathBuf::from("site/style.css"))
        );
        assert_eq!(config.host(None).resolve_local("https://orion.example.co/style.css"), None);
    }

    #[test]
    fn bad_base_url_is_rejected() {
        let mut config = AppConfig::default();
        config.page.base_url = Some("not a url".to_string());
        assert!(matches!(
            config.page_config(),
            Err(ConfigError::BaseUrl(..))
        ));
    }
}
