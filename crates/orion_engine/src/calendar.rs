use std::sync::Arc;

use chrono::{DateTime, Local, NaiveDate, TimeZone, Utc};
use orion_core::ics::{build_ics, CALENDAR_MIME_TYPE};
use orion_core::{CalendarEvent, DailySchedule, EventWindowError};
use orion_logging::orion_info;

use crate::blob::BlobDownloader;

pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

pub const CALENDAR_FILENAME: &str = "orion-observasi.ics";

#[derive(Debug, Clone)]
pub struct CalendarSettings {
    pub title: String,
    pub description: String,
    pub location: String,
    /// Placeholder policy: the event is "today" at this local time.
    pub schedule: DailySchedule,
    pub filename: String,
}

impl Default for CalendarSettings {
    fn default() -> Self {
        Self {
            title: "Observasi Rasi Bintang Orion".to_string(),
            description: "Malam observasi bersama Orion.co.\nBawa jaket, tikar, dan senter merah."
                .to_string(),
            location: "Lapangan Observasi Orion.co".to_string(),
            schedule: DailySchedule::default(),
            filename: CALENDAR_FILENAME.to_string(),
        }
    }
}

/// Builds the observation event and hands the `.ics` to the saver.
#[derive(Clone)]
pub struct CalendarExportAction {
    settings: CalendarSettings,
    saver: BlobDownloader,
    clock: Clock,
}

impl CalendarExportAction {
    pub fn new(settings: CalendarSettings, saver: BlobDownloader) -> Self {
        Self {
            settings,
            saver,
            clock: Arc::new(Utc::now),
        }
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn settings(&self) -> &CalendarSettings {
        &self.settings
    }

    /// The configured event on `day`, scheduled in `tz`.
    pub fn event_on<Tz: TimeZone>(
        &self,
        day: NaiveDate,
        tz: &Tz,
    ) -> Result<CalendarEvent, EventWindowError> {
        let (start, end) = self.settings.schedule.window_on(day, tz)?;
        CalendarEvent::new(
            self.settings.title.as_str(),
            self.settings.description.as_str(),
            self.settings.location.as_str(),
            start,
            end,
        )
    }

    pub fn trigger(&self) -> Result<(), EventWindowError> {
        let now = (self.clock)();
        let today = now.with_timezone(&Local).date_naive();
        let event = self.event_on(today, &Local)?;
        let document = build_ics(&event, now);
        orion_info!(
            "Exporting {} ({} to {})",
            self.settings.filename,
            event.start(),
            event.end()
        );
        self.saver
            .save(document, &self.settings.filename, CALENDAR_MIME_TYPE);
        Ok(())
    }
}
