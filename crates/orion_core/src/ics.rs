//! iCalendar (RFC 5545) rendering for a single event.

use chrono::{DateTime, Utc};

use crate::calendar::CalendarEvent;

pub const PRODUCT_ID: &str = "-//Orion.co//Orion Observasi//ID";
pub const CALENDAR_MIME_TYPE: &str = "text/calendar;charset=utf-8";

const CRLF: &str = "\r\n";

/// `YYYYMMDDTHHMMSSZ` in UTC.
pub fn to_ics_date(instant: DateTime<Utc>) -> String {
    instant.format("%Y%m%dT%H%M%SZ").to_string()
}

/// Renders a VCALENDAR holding exactly one VEVENT, stamped at `dtstamp`.
pub fn build_ics(event: &CalendarEvent, dtstamp: DateTime<Utc>) -> String {
    let lines = [
        "BEGIN:VCALENDAR".to_string(),
        "VERSION:2.0".to_string(),
        format!("PRODID:{PRODUCT_ID}"),
        "CALSCALE:GREGORIAN".to_string(),
        "BEGIN:VEVENT".to_string(),
        format!("DTSTAMP:{}", to_ics_date(dtstamp)),
        format!("DTSTART:{}", to_ics_date(event.start())),
        format!("DTEND:{}", to_ics_date(event.end())),
        format!("SUMMARY:{}", escape_text(event.title())),
        format!("DESCRIPTION:{}", escape_text(event.description())),
        format!("LOCATION:{}", escape_text(event.location())),
        "END:VEVENT".to_string(),
        "END:VCALENDAR".to_string(),
    ];
    lines.join(CRLF)
}

/// [`build_ics`] stamped with the current time.
pub fn build_ics_now(event: &CalendarEvent) -> String {
    build_ics(event, Utc::now())
}

/// TEXT value escaping: backslash, semicolon, comma and line breaks.
pub fn escape_text(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' => out.push_str("\\\\"),
            ';' => out.push_str("\\;"),
            ',' => out.push_str("\\,"),
            '\n' => out.push_str("\\n"),
            '\r' => {
                // CRLF and lone CR both collapse to one escaped newline.
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
                out.push_str("\\n");
            }
            other => out.push(other),
        }
    }
    out
}

/// Inverse of [`escape_text`]. Unknown escapes are kept verbatim.
pub fn unescape_text(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') | Some('N') => out.push('\n'),
            Some(escaped @ ('\\' | ';' | ',')) => out.push(escaped),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}
