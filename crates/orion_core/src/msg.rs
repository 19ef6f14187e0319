use crate::{AssetDescriptor, ImageElement};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// Page scan finished: bundled files plus the page's `img` elements.
    PageScanned {
        bundle: Vec<AssetDescriptor>,
        images: Vec<ImageElement>,
    },
    /// The element with the download role was clicked.
    DownloadTriggerClicked,
    /// A click landed outside the asset picker.
    ClickedOutside,
    /// Download action on a picker row.
    AssetDownloadClicked(usize),
    /// Open action on a picker row.
    AssetOpenClicked(usize),
    /// "Download all" button inside the picker.
    DownloadAllClicked,
    /// The element with the calendar role was clicked.
    CalendarClicked,
    /// A page image (by scan index) was clicked.
    ImageClicked(usize),
    LightboxClicked,
    EscapePressed,
    NoOp,
}
