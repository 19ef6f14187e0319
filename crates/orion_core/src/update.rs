use orion_logging::orion_debug;

use crate::{Effect, Msg, PageState};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: PageState, msg: Msg) -> (PageState, Vec<Effect>) {
    let effects = match msg {
        Msg::PageScanned { bundle, images } => {
            if !state.apply_scan(bundle, &images) {
                orion_debug!("Ignoring repeated page scan");
            }
            Vec::new()
        }
        Msg::DownloadTriggerClicked => {
            let open = !state.picker_open();
            state.set_picker_open(open);
            Vec::new()
        }
        Msg::ClickedOutside => {
            state.set_picker_open(false);
            Vec::new()
        }
        Msg::AssetDownloadClicked(index) => match state.asset(index) {
            Some(asset) => vec![Effect::Download(asset.clone())],
            None => {
                orion_debug!("Download clicked on missing row {}", index);
                Vec::new()
            }
        },
        Msg::AssetOpenClicked(index) => match state.asset(index) {
            Some(asset) => vec![Effect::Open(asset.clone())],
            None => {
                orion_debug!("Open clicked on missing row {}", index);
                Vec::new()
            }
        },
        Msg::DownloadAllClicked => {
            if state.assets().is_empty() {
                Vec::new()
            } else {
                vec![Effect::DownloadAll(state.assets().to_vec())]
            }
        }
        Msg::CalendarClicked => {
            // The calendar control sits outside the picker.
            state.set_picker_open(false);
            vec![Effect::ExportCalendar]
        }
        Msg::ImageClicked(index) => {
            if !state.show_preview(index) {
                orion_debug!("Image {} has no preview source", index);
            }
            Vec::new()
        }
        Msg::LightboxClicked | Msg::EscapePressed => {
            state.close_preview();
            Vec::new()
        }
        Msg::NoOp => Vec::new(),
    };

    (state, effects)
}
