/*
 * @file calendar.rs
 * @brief Calendar collaborator interface, backends and event formatting
 * @author Kevin Thomas
 * @date 2025
 *
 * MIT License
 *
 * Copyright (c) 2025 Kevin Thomas
 *
 * Permission is hereby granted, free of charge, to any person obtaining a copy
 * of this software and associated documentation files (the "Software"), to deal
 * in the Software without restriction, including without limitation the rights
 * to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
 * copies of the Software, and to permit persons to whom the Software is
 * furnished to do so, subject to the following conditions:
 *
 * The above copyright notice and this permission notice shall be included in all
 * copies or substantial portions of the Software.
 *
 * THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
 * IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
 * FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
 * AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
 * LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
 * OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
 * SOFTWARE.
 */

//! Calendar collaborator.
//!
//! The router only sees the [`Calendar`] trait. Backends:
//! - [`GoogleCalendar`] talks to the Google Calendar v3 REST API with a
//!   pre-issued bearer token (OAuth flows live outside this crate).
//! - [`FileCalendar`] serves events from a local JSON file.
//! - [`UnavailableCalendar`] stands in when nothing is configured.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{AssistantError, Result};

/// Base URL of the Google Calendar events API.
const GOOGLE_CALENDAR_API: &str = "https://www.googleapis.com/calendar/v3/calendars";

/// Longest description excerpt shown under an event.
const DESCRIPTION_PREVIEW_CHARS: usize = 50;

/// Sentence used when there is nothing to list.
pub const NO_EVENTS_TEXT: &str = "No events for today.";

/// A calendar entry as seen by the router.
///
/// # Details
/// `start` keeps the backend's raw value: an RFC 3339 date-time for timed
/// events or a `YYYY-MM-DD` date for all-day events.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    pub summary: String,
    pub start: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Parsed form of [`Event::start`].
#[derive(Clone, Copy, Debug, PartialEq)]
enum EventStart {
    At(NaiveDateTime),
    AllDay(NaiveDate),
}

impl EventStart {
    fn sort_key(self) -> NaiveDateTime {
        match self {
            EventStart::At(at) => at,
            EventStart::AllDay(day) => day.and_time(chrono::NaiveTime::MIN),
        }
    }
}

impl Event {
    /// Creates an event without a description.
    pub fn new(id: impl Into<String>, summary: impl Into<String>, start: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            summary: summary.into(),
            start: start.into(),
            description: None,
        }
    }

    /// Attaches a description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Start rendered as `HH:MM`, or the raw value when it carries no time.
    ///
    /// # Returns
    /// * `String` - Wall-clock time in the event's own offset, or `start` unchanged.
    pub fn start_label(&self) -> String {
        if let Ok(at) = DateTime::parse_from_rfc3339(&self.start) {
            return at.format("%H:%M").to_string();
        }
        if let Ok(at) = NaiveDateTime::parse_from_str(&self.start, "%Y-%m-%dT%H:%M:%S") {
            return at.format("%H:%M").to_string();
        }
        self.start.clone()
    }

    /// Start in local time, used for ordering and day filtering.
    fn parsed_start(&self) -> Option<EventStart> {
        if let Ok(at) = DateTime::parse_from_rfc3339(&self.start) {
            return Some(EventStart::At(at.with_timezone(&Local).naive_local()));
        }
        if let Ok(at) = NaiveDateTime::parse_from_str(&self.start, "%Y-%m-%dT%H:%M:%S") {
            return Some(EventStart::At(at));
        }
        NaiveDate::parse_from_str(&self.start, "%Y-%m-%d")
            .ok()
            .map(EventStart::AllDay)
    }
}

/// Read-only calendar access used by the router.
#[async_trait]
pub trait Calendar: Send + Sync {
    /// Returns up to `max_results` future events, soonest first.
    async fn upcoming_events(&self, max_results: usize) -> Result<Vec<Event>>;

    /// Returns the events remaining in the current local day.
    async fn today_events(&self) -> Result<Vec<Event>>;
}

/// Renders events as a numbered list.
///
/// # Details
/// Each entry reads `"<index>. <HH:MM or raw date> - <summary>"`; a present
/// description follows on an indented line, cut to 50 characters.
///
/// # Arguments
/// * `events` - Events to render, in display order.
///
/// # Returns
/// * `String` - The formatted block, or [`NO_EVENTS_TEXT`] for an empty slice.
pub fn format_events_text(events: &[Event]) -> String {
    if events.is_empty() {
        return NO_EVENTS_TEXT.to_string();
    }
    let mut text = String::from("Your events:\n\n");
    for (index, event) in events.iter().enumerate() {
        text.push_str(&format!(
            "{}. {} - {}\n",
            index + 1,
            event.start_label(),
            event.summary
        ));
        if let Some(description) = event.description.as_deref().filter(|d| !d.is_empty()) {
            let preview: String = description.chars().take(DESCRIPTION_PREVIEW_CHARS).collect();
            text.push_str(&format!("   Note: {}\n", preview));
        }
        text.push('\n');
    }
    text
}

/// Google Calendar v3 client authenticated with a bearer token.
pub struct GoogleCalendar {
    client: reqwest::Client,
    token: String,
    calendar_id: String,
}

/// One page of the events list response.
#[derive(Deserialize)]
struct EventsPage {
    #[serde(default)]
    items: Vec<GoogleEvent>,
}

/// Event shape returned by the Google API.
#[derive(Deserialize)]
struct GoogleEvent {
    id: String,
    #[serde(default)]
    summary: Option<String>,
    start: GoogleEventTime,
    #[serde(default)]
    description: Option<String>,
}

/// Either a timed or an all-day start.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GoogleEventTime {
    #[serde(default)]
    date_time: Option<String>,
    #[serde(default)]
    date: Option<String>,
}

impl From<GoogleEvent> for Event {
    fn from(raw: GoogleEvent) -> Self {
        Self {
            id: raw.id,
            summary: raw.summary.unwrap_or_else(|| "(no title)".to_string()),
            start: raw.start.date_time.or(raw.start.date).unwrap_or_default(),
            description: raw.description.filter(|d| !d.is_empty()),
        }
    }
}

impl GoogleCalendar {
    /// Creates a client for `calendar_id` using an access token.
    pub fn new(token: impl Into<String>, calendar_id: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            token: token.into(),
            calendar_id: calendar_id.into(),
        }
    }

    fn events_url(&self) -> String {
        format!("{}/{}/events", GOOGLE_CALENDAR_API, self.calendar_id)
    }

    /// Runs an events list query and flattens the result.
    ///
    /// # Errors
    /// Returns [`AssistantError::Request`] on transport or HTTP status failure.
    async fn list_events(&self, query: &[(&str, String)]) -> Result<Vec<Event>> {
        let response = self
            .client
            .get(self.events_url())
            .bearer_auth(&self.token)
            .query(&[("singleEvents", "true"), ("orderBy", "startTime")])
            .query(query)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|err| AssistantError::request("Google Calendar", err))?;
        let page: EventsPage = response
            .json()
            .await
            .map_err(|err| AssistantError::request("Google Calendar", err))?;
        Ok(page.items.into_iter().map(Event::from).collect())
    }
}

#[async_trait]
impl Calendar for GoogleCalendar {
    async fn upcoming_events(&self, max_results: usize) -> Result<Vec<Event>> {
        self.list_events(&[
            ("timeMin", Utc::now().to_rfc3339()),
            ("maxResults", max_results.to_string()),
        ])
        .await
    }

    async fn today_events(&self) -> Result<Vec<Event>> {
        let now = Local::now();
        let mut query = vec![("timeMin", now.to_rfc3339())];
        if let Some(end_of_day) = now
            .date_naive()
            .and_hms_opt(23, 59, 59)
            .and_then(|end| end.and_local_timezone(Local).latest())
        {
            query.push(("timeMax", end_of_day.to_rfc3339()));
        }
        self.list_events(&query).await
    }
}

/// Calendar backed by a JSON array of [`Event`]s on disk.
pub struct FileCalendar {
    path: PathBuf,
}

impl FileCalendar {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads every event from the file.
    ///
    /// # Errors
    /// [`AssistantError::Unavailable`] when the file is missing, otherwise I/O
    /// or JSON errors.
    async fn load(&self) -> Result<Vec<Event>> {
        if !self.path.exists() {
            return Err(AssistantError::Unavailable("calendar file"));
        }
        let contents = tokio::fs::read_to_string(&self.path).await?;
        if contents.trim().is_empty() {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_str(&contents)?)
    }
}

/// Future events relative to `now`, soonest first, at most `max_results`.
fn upcoming_at(events: Vec<Event>, now: NaiveDateTime, max_results: usize) -> Vec<Event> {
    let mut dated: Vec<(NaiveDateTime, Event)> = events
        .into_iter()
        .filter_map(|event| {
            let start = event.parsed_start()?;
            let pending = match start {
                EventStart::At(at) => at >= now,
                EventStart::AllDay(day) => day >= now.date(),
            };
            pending.then(|| (start.sort_key(), event))
        })
        .collect();
    dated.sort_by_key(|(key, _)| *key);
    dated
        .into_iter()
        .take(max_results)
        .map(|(_, event)| event)
        .collect()
}

/// Events on the same local date as `now` that have not started yet.
fn today_at(events: Vec<Event>, now: NaiveDateTime) -> Vec<Event> {
    let mut today: Vec<Event> = upcoming_at(events, now, usize::MAX);
    today.retain(|event| match event.parsed_start() {
        Some(EventStart::At(at)) => at.date() == now.date(),
        Some(EventStart::AllDay(day)) => day == now.date(),
        None => false,
    });
    today
}

#[async_trait]
impl Calendar for FileCalendar {
    async fn upcoming_events(&self, max_results: usize) -> Result<Vec<Event>> {
        let events = self.load().await?;
        Ok(upcoming_at(events, Local::now().naive_local(), max_results))
    }

    async fn today_events(&self) -> Result<Vec<Event>> {
        let events = self.load().await?;
        Ok(today_at(events, Local::now().naive_local()))
    }
}

/// Placeholder used when no calendar backend is configured.
pub struct UnavailableCalendar;

#[async_trait]
impl Calendar for UnavailableCalendar {
    async fn upcoming_events(&self, _max_results: usize) -> Result<Vec<Event>> {
        Err(AssistantError::Unavailable("calendar"))
    }

    async fn today_events(&self) -> Result<Vec<Event>> {
        Err(AssistantError::Unavailable("calendar"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn at(text: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S").unwrap()
    }

    #[test]
    fn start_label_uses_event_offset_time() {
        let event = Event::new("1", "Standup", "2026-10-19T09:30:00+03:00");
        assert_eq!(event.start_label(), "09:30");
    }

    #[test]
    fn start_label_keeps_all_day_dates_raw() {
        let event = Event::new("1", "Holiday", "2026-10-19");
        assert_eq!(event.start_label(), "2026-10-19");
    }

    #[test]
    fn empty_list_formats_as_no_events_sentence() {
        assert_eq!(format_events_text(&[]), NO_EVENTS_TEXT);
    }

    #[test]
    fn formatting_numbers_events_and_truncates_descriptions() {
        let long = "x".repeat(80);
        let events = vec![
            Event::new("1", "Standup", "2026-10-19T09:30:00Z").with_description(long),
            Event::new("2", "Holiday", "2026-10-20"),
        ];
        let text = format_events_text(&events);
        assert!(text.starts_with("Your events:\n\n"));
        assert!(text.contains("1. 09:30 - Standup\n"));
        assert!(text.contains(&format!("   Note: {}\n", "x".repeat(50))));
        assert!(!text.contains(&"x".repeat(51)));
        assert!(text.contains("2. 2026-10-20 - Holiday\n"));
    }

    #[test]
    fn google_events_are_flattened() {
        let raw = r#"{
            "items": [
                {"id": "a", "summary": "Demo", "start": {"dateTime": "2026-10-19T15:00:00+02:00"}},
                {"id": "b", "start": {"date": "2026-10-20"}, "description": ""}
            ]
        }"#;
        let page: EventsPage = serde_json::from_str(raw).unwrap();
        let events: Vec<Event> = page.items.into_iter().map(Event::from).collect();
        assert_eq!(events[0].start, "2026-10-19T15:00:00+02:00");
        assert_eq!(events[0].summary, "Demo");
        assert_eq!(events[1].summary, "(no title)");
        assert_eq!(events[1].start, "2026-10-20");
        assert!(events[1].description.is_none());
    }

    #[test]
    fn upcoming_skips_past_events_and_orders_by_start() {
        let events = vec![
            Event::new("late", "Late", "2026-10-21T10:00:00"),
            Event::new("past", "Past", "2026-10-18T10:00:00"),
            Event::new("soon", "Soon", "2026-10-19T12:00:00"),
            Event::new("allday", "All day", "2026-10-19"),
            Event::new("junk", "Junk", "someday"),
        ];
        let upcoming = upcoming_at(events, at("2026-10-19T11:00:00"), 2);
        let ids: Vec<&str> = upcoming.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["allday", "soon"]);
    }

    #[test]
    fn today_keeps_only_current_date() {
        let events = vec![
            Event::new("morning", "Done", "2026-10-19T08:00:00"),
            Event::new("evening", "Dinner", "2026-10-19T19:00:00"),
            Event::new("tomorrow", "Tomorrow", "2026-10-20T09:00:00"),
        ];
        let today = today_at(events, at("2026-10-19T11:00:00"));
        assert_eq!(today.len(), 1);
        assert_eq!(today[0].id, "evening");
    }

    #[tokio::test]
    async fn missing_file_reports_unavailable() {
        let calendar = FileCalendar::new("/definitely/not/here/events.json");
        let err = calendar.upcoming_events(5).await.unwrap_err();
        assert!(matches!(err, AssistantError::Unavailable(_)));
    }

    #[tokio::test]
    async fn file_calendar_reads_events() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"id": "1", "summary": "Far future", "start": "2999-01-01T10:00:00Z"}}]"#
        )
        .unwrap();
        let calendar = FileCalendar::new(file.path());
        let events = calendar.upcoming_events(5).await.unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].summary, "Far future");
    }

    #[tokio::test]
    async fn unavailable_calendar_always_errors() {
        assert!(UnavailableCalendar.today_events().await.is_err());
    }
}
