use std::path::Path;
use std::sync::Arc;

use anyhow::{anyhow, Result};
use orion_engine::{initialize, PageHandle, UiEvent};
use orion_logging::{orion_info, orion_warn};

use super::config::{AppConfig, CALENDAR_TRIGGER_ID, DOWNLOAD_TRIGGER_ID};
use super::render;

pub(crate) enum Action {
    List,
    Download(String),
    DownloadAll,
    Open(String),
    Calendar,
}

/// Loads the config, initializes the page, replays the user's gesture, and
/// waits for every download it started.
pub(crate) async fn run(config_path: &Path, action: Action) -> Result<()> {
    let config = AppConfig::load(config_path)?;
    let page_config = config.page_config()?;
    let host = config.host(page_config.page_base.clone());
    let page = initialize(config.document(), Arc::new(host), page_config);

    let outcome = perform(&page, action);
    for (index, report) in page.settle().await.iter().enumerate() {
        orion_info!("#{}: {}", index, render::report(report));
    }
    page.dispose();
    outcome
}

fn perform(page: &PageHandle, action: Action) -> Result<()> {
    match action {
        Action::List => {
            for line in render::rows(&page.view()) {
                println!("{}", line);
            }
        }
        Action::Download(name) => {
            let index = find_row(page, &name)?;
            open_picker(page);
            page.dispatch(UiEvent::RowDownloadClicked(index));
        }
        Action::DownloadAll => {
            open_picker(page);
            page.dispatch(UiEvent::DownloadAllClicked);
        }
        Action::Open(name) => {
            let index = find_row(page, &name)?;
            open_picker(page);
            page.dispatch(UiEvent::RowOpenClicked(index));
        }
        Action::Calendar => {
            page.dispatch(UiEvent::ElementClicked(CALENDAR_TRIGGER_ID.to_string()));
        }
    }
    Ok(())
}

fn open_picker(page: &PageHandle) {
    if !page.view().picker_open {
        page.dispatch(UiEvent::ElementClicked(DOWNLOAD_TRIGGER_ID.to_string()));
    }
}

fn find_row(page: &PageHandle, name: &str) -> Result<usize> {
    let view = page.view();
    match view.rows.iter().position(|row| row.name == name) {
        Some(index) => Ok(index),
        None => {
            orion_warn!("No picker row named {:?}", name);
            Err(anyhow!(
                "no picker row named {:?}; `orion_app list` shows the available names",
                name
            ))
        }
    }
}
