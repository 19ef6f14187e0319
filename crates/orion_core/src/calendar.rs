use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EventWindowError {
    #[error("event end {end} is not after start {start}")]
    EndNotAfterStart {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
    #[error("invalid time of day {hour:02}:{minute:02}")]
    InvalidTimeOfDay { hour: u32, minute: u32 },
    #[error("{date} {time} does not exist in the local time zone")]
    NonexistentLocalTime { date: NaiveDate, time: NaiveTime },
    #[error("event duration {duration} runs past the representable calendar")]
    DurationOutOfRange {
        start: DateTime<Utc>,
        duration: Duration,
    },
}

/// A single calendar event, stored in UTC.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarEvent {
    title: String,
    description: String,
    location: String,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl CalendarEvent {
    /// Normalizes both instants to UTC and rejects windows where `end <= start`.
    pub fn new<Tz: TimeZone>(
        title: impl Into<String>,
        description: impl Into<String>,
        location: impl Into<String>,
        start: DateTime<Tz>,
        end: DateTime<Tz>,
    ) -> Result<Self, EventWindowError> {
        let start = start.with_timezone(&Utc);
        let end = end.with_timezone(&Utc);
        if end <= start {
            return Err(EventWindowError::EndNotAfterStart { start, end });
        }
        Ok(Self {
            title: title.into(),
            description: description.into(),
            location: location.into(),
            start,
            end,
        })
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }
}

/// "Some day at HH:MM local time, for a fixed duration."
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DailySchedule {
    pub hour: u32,
    pub minute: u32,
    pub duration: Duration,
}

impl Default for DailySchedule {
    fn default() -> Self {
        Self {
            hour: 19,
            minute: 0,
            duration: Duration::hours(3),
        }
    }
}

impl DailySchedule {
    /// Resolves the schedule on `day` in `tz` and returns the UTC window.
    ///
    /// Ambiguous local times (DST fold) resolve to the earlier instant.
    pub fn window_on<Tz: TimeZone>(
        &self,
        day: NaiveDate,
        tz: &Tz,
    ) -> Result<(DateTime<Utc>, DateTime<Utc>), EventWindowError> {
        let time = NaiveTime::from_hms_opt(self.hour, self.minute, 0).ok_or(
            EventWindowError::InvalidTimeOfDay {
                hour: self.hour,
                minute: self.minute,
            },
        )?;
        let start = tz
            .from_local_datetime(&day.and_time(time))
            .earliest()
            .ok_or(EventWindowError::NonexistentLocalTime { date: day, time })?
            .with_timezone(&Utc);
        let end = start.checked_add_signed(self.duration).ok_or(
            EventWindowError::DurationOutOfRange {
                start,
                duration: self.duration,
            },
        )?;
        Ok((start, end))
    }
}
