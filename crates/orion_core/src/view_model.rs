#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowAction {
    Download,
    Open,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PageViewModel {
    pub picker_open: bool,
    pub rows: Vec<AssetRowView>,
    /// Image shown in the lightbox, if open.
    pub lightbox: Option<String>,
    pub dirty: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetRowView {
    pub name: String,
    pub url: String,
    pub actions: [RowAction; 2],
}
