use crate::AssetDescriptor;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Save one asset (direct href or fetch-to-blob).
    Download(AssetDescriptor),
    /// Save every listed asset, staggered, in order.
    DownloadAll(Vec<AssetDescriptor>),
    /// Open the asset in a new browsing context.
    Open(AssetDescriptor),
    ExportCalendar,
}
