//! Orion core: pure page state, asset naming, and calendar rendering.
mod asset;
mod calendar;
mod discovery;
mod effect;
pub mod ics;
mod msg;
mod state;
mod update;
mod view_model;

pub use asset::{last_path_segment, url_extension, AssetDescriptor, AssetLocation, FALLBACK_FILENAME};
pub use calendar::{CalendarEvent, DailySchedule, EventWindowError};
pub use discovery::{build_asset_list, image_filename, sanitize_filename, ImageElement};
pub use effect::Effect;
pub use ics::{build_ics, build_ics_now, escape_text, to_ics_date, unescape_text};
pub use msg::Msg;
pub use state::PageState;
pub use update::update;
pub use view_model::{AssetRowView, PageViewModel, RowAction};
