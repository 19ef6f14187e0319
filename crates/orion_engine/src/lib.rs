//! Orion engine: host-facing side effects for asset and calendar export.
mod blob;
mod calendar;
mod fetch;
mod fs_host;
mod host;
mod orchestrator;
mod page;
mod persist;
mod remote;
mod types;

pub use blob::{BlobDownloader, DEFAULT_REVOKE_GRACE};
pub use calendar::{CalendarExportAction, CalendarSettings, Clock, CALENDAR_FILENAME};
pub use fetch::{FetchSettings, Fetcher, ReqwestFetcher};
pub use fs_host::FsDownloadHost;
pub use host::{Anchor, Blob, DownloadHost, ObjectUrl, ObjectUrlStore};
pub use orchestrator::{BatchHandle, DownloadOrchestrator, DownloadSettings};
pub use page::{initialize, initialize_with, PageConfig, PageDocument, PageHandle, TriggerRole, UiEvent};
pub use persist::{ensure_output_dir, AtomicFileWriter, PersistError};
pub use remote::{RemoteAssetFetcher, DEFAULT_MIME_TYPE};
pub use types::{DownloadReport, FailureKind, FetchError, FetchMetadata, FetchOutcome, FetchOutput};
