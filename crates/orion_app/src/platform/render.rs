use orion_core::PageViewModel;
use orion_engine::{DownloadReport, FetchOutcome};

/// One line per picker row: index, filename, source URL.
pub(crate) fn rows(view: &PageViewModel) -> Vec<String> {
    let width = view
        .rows
        .iter()
        .map(|row| row.name.chars().count())
        .max()
        .unwrap_or(0);
    view.rows
        .iter()
        .enumerate()
        .map(|(index, row)| format!("{:>3}  {:<width$}  {}", index, row.name, row.url))
        .collect()
}

pub(crate) fn report(report: &DownloadReport) -> String {
    match report {
        DownloadReport::Direct => "saved from the page".to_string(),
        DownloadReport::Fetched(FetchOutcome::Saved { bytes }) => {
            format!("fetched and saved {} bytes", bytes)
        }
        DownloadReport::Fetched(FetchOutcome::FellBack(kind)) => {
            format!("fetch failed ({}); opened instead", kind)
        }
        DownloadReport::Cancelled => "cancelled".to_string(),
    }
}
