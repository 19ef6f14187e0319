use crate::discovery::build_asset_list;
use crate::view_model::{AssetRowView, PageViewModel, RowAction};
use crate::{AssetDescriptor, ImageElement};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PageState {
    scanned: bool,
    assets: Vec<AssetDescriptor>,
    /// Preview source per scanned image, indexed like the page's `img` list.
    previews: Vec<Option<String>>,
    picker_open: bool,
    lightbox: Option<String>,
    dirty: bool,
}

impl PageState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> PageViewModel {
        PageViewModel {
            picker_open: self.picker_open,
            rows: self
                .assets
                .iter()
                .map(|asset| AssetRowView {
                    name: asset.suggested_filename().to_string(),
                    url: asset.url().to_string(),
                    actions: [RowAction::Download, RowAction::Open],
                })
                .collect(),
            lightbox: self.lightbox.clone(),
            dirty: self.dirty,
        }
    }

    pub fn assets(&self) -> &[AssetDescriptor] {
        &self.assets
    }

    pub fn asset(&self, index: usize) -> Option<&AssetDescriptor> {
        self.assets.get(index)
    }

    pub fn is_scanned(&self) -> bool {
        self.scanned
    }

    pub fn picker_open(&self) -> bool {
        self.picker_open
    }

    pub fn lightbox(&self) -> Option<&str> {
        self.lightbox.as_deref()
    }

    /// Returns whether the view changed since the last call, and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    /// Builds the asset list. Only the first scan counts.
    pub(crate) fn apply_scan(&mut self, bundle: Vec<AssetDescriptor>, images: &[ImageElement]) -> bool {
        if self.scanned {
            return false;
        }
        self.assets = build_asset_list(bundle, images);
        self.previews = images
            .iter()
            .map(|image| image.source().map(ToOwned::to_owned))
            .collect();
        self.scanned = true;
        self.dirty = true;
        true
    }

    pub(crate) fn set_picker_open(&mut self, open: bool) {
        if self.picker_open != open {
            self.picker_open = open;
            self.dirty = true;
        }
    }

    pub(crate) fn show_preview(&mut self, image_index: usize) -> bool {
        let Some(Some(src)) = self.previews.get(image_index) else {
            return false;
        };
        if self.lightbox.as_deref() != Some(src.as_str()) {
            self.lightbox = Some(src.clone());
            self.dirty = true;
        }
        true
    }

    pub(crate) fn close_preview(&mut self) {
        if self.lightbox.take().is_some() {
            self.dirty = true;
        }
    }
}
