/*
 * @file router.rs
 * @brief Command router dispatching classified input to handlers
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

//! Command router.
//!
//! [`Router::handle`] classifies one utterance, runs the matching handler and
//! always returns exactly one [`CommandResult`]. Collaborator failures are
//! absorbed here and turned into degraded results; nothing propagates to the
//! caller.

use chrono::{Datelike, Local, NaiveDateTime};

use crate::ai::{AiCollaborator, AiContext, MAX_CONTEXT_EVENTS};
use crate::browser::BrowserLauncher;
use crate::calendar::{format_events_text, Calendar, Event};
use crate::commands::{
    self, classify, contains_any, find_site, Action, CommandResult, Intent, EXIT_RESPONSE,
    TODAY_KEYWORD,
};

/// Number of events listed for a general calendar query.
const UPCOMING_EVENT_COUNT: usize = 5;

/// Reply used if the AI collaborator hands back blank text.
const EMPTY_AI_RESPONSE: &str = "Sorry, I don't have an answer to that.";

/// Source of the current local wall-clock time.
pub type Clock = fn() -> NaiveDateTime;

/// Default [`Clock`] reading the system time.
pub fn local_now() -> NaiveDateTime {
    Local::now().naive_local()
}

/// Routes free text to the calendar, time, date, browser, help, exit or AI handler.
///
/// # Details
/// Collaborators are injected at construction so each can be replaced by a
/// test double. The router holds no locks; it is driven by one task at a time.
pub struct Router {
    assistant_name: String,
    ai: Box<dyn AiCollaborator>,
    calendar: Box<dyn Calendar>,
    browser: Box<dyn BrowserLauncher>,
    clock: Clock,
}

impl Router {
    /// Creates a router over the given collaborators using the system clock.
    pub fn new(
        assistant_name: impl Into<String>,
        ai: Box<dyn AiCollaborator>,
        calendar: Box<dyn Calendar>,
        browser: Box<dyn BrowserLauncher>,
    ) -> Self {
        Self {
            assistant_name: assistant_name.into(),
            ai,
            calendar,
            browser,
            clock: local_now,
        }
    }

    /// Replaces the clock used by the time, date and AI-context handlers.
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn assistant_name(&self) -> &str {
        &self.assistant_name
    }

    /// Classifies `text` and produces the matching result.
    ///
    /// # Arguments
    /// * `text` - Transcribed or typed natural language, any case.
    ///
    /// # Returns
    /// * `CommandResult` - Exactly one result with a non-empty response.
    pub async fn handle(&mut self, text: &str) -> CommandResult {
        let normalized = text.to_lowercase();
        let intent = classify(&normalized);
        tracing::debug!(?intent, "Routing input");
        match intent {
            Intent::Calendar => self.handle_calendar(&normalized).await,
            Intent::Time => self.handle_time(),
            Intent::Date => self.handle_date(),
            Intent::Browser => self.handle_browser(&normalized),
            Intent::Help => self.handle_help(),
            Intent::Exit => CommandResult::spoken(Action::Exit, EXIT_RESPONSE),
            Intent::Conversation => self.handle_conversation(normalized.trim()).await,
        }
    }

    /// Lists today's events when "today" is mentioned, otherwise the next five.
    async fn handle_calendar(&self, text: &str) -> CommandResult {
        let today = contains_any(text, &[TODAY_KEYWORD]);
        let fetched = if today {
            self.calendar.today_events().await
        } else {
            self.calendar.upcoming_events(UPCOMING_EVENT_COUNT).await
        };
        let events = fetched.unwrap_or_else(|err| {
            tracing::warn!("Calendar unavailable: {}", err);
            Vec::new()
        });
        calendar_result(today, events)
    }

    fn handle_time(&self) -> CommandResult {
        let now = (self.clock)();
        CommandResult::spoken(Action::Time, format!("It's {} now.", now.format("%H:%M")))
    }

    fn handle_date(&self) -> CommandResult {
        let now = (self.clock)();
        let weekday = commands::weekday_name(now.weekday().num_days_from_monday() as usize);
        CommandResult::spoken(
            Action::Date,
            format!("Today is {}, {}.", weekday, now.format("%d.%m.%Y")),
        )
    }

    /// Opens the first site named in the text.
    fn handle_browser(&self, text: &str) -> CommandResult {
        let Some(site) = find_site(text) else {
            return CommandResult::spoken(Action::Unknown, "I don't know that site.");
        };
        match self.browser.open(site.url) {
            Ok(()) => CommandResult::spoken(Action::Browser, format!("Opening {}.", site.name)),
            Err(err) => {
                tracing::warn!("Browser launch failed: {}", err);
                CommandResult::spoken(Action::Error, format!("I couldn't open {}.", site.name))
            }
        }
    }

    fn handle_help(&self) -> CommandResult {
        CommandResult::silent(Action::Help, commands::help_text(&self.assistant_name))
    }

    /// Hands unmatched input to the AI collaborator with time and event context.
    async fn handle_conversation(&mut self, text: &str) -> CommandResult {
        let context = self.build_context().await;
        let reply = self.ai.get_response(text, &context).await;
        if reply.trim().is_empty() {
            return CommandResult::spoken(Action::AiResponse, EMPTY_AI_RESPONSE);
        }
        CommandResult::spoken(Action::AiResponse, reply)
    }

    /// Collects the current time and up to three upcoming event summaries.
    async fn build_context(&self) -> AiContext {
        let upcoming_events = match self.calendar.upcoming_events(MAX_CONTEXT_EVENTS).await {
            Ok(events) => events
                .iter()
                .take(MAX_CONTEXT_EVENTS)
                .map(|event| format!("{} at {}", event.summary, event.start))
                .collect(),
            Err(err) => {
                tracing::debug!("No calendar context: {}", err);
                Vec::new()
            }
        };
        AiContext {
            current_time: (self.clock)().format("%H:%M").to_string(),
            upcoming_events,
        }
    }
}

/// Builds the calendar reply for an empty or populated event list.
fn calendar_result(today: bool, events: Vec<Event>) -> CommandResult {
    match (today, events.is_empty()) {
        (true, true) => {
            CommandResult::spoken(Action::Calendar, "You have no events scheduled for today.")
        }
        (false, true) => CommandResult::spoken(Action::Calendar, "You have no upcoming events."),
        (true, false) => CommandResult::spoken(
            Action::Calendar,
            format!("Here are your events for today:\n{}", format_events_text(&events)),
        )
        .with_events(events),
        (false, false) => CommandResult::spoken(
            Action::Calendar,
            format!("Upcoming events:\n{}", format_events_text(&events)),
        )
        .with_events(events),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AssistantError, Result};
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use std::sync::{Arc, Mutex};

    type Log<T> = Arc<Mutex<Vec<T>>>;

    struct FakeAi {
        reply: String,
        calls: Log<(String, AiContext)>,
    }

    #[async_trait]
    impl AiCollaborator for FakeAi {
        async fn get_response(&mut self, input: &str, context: &AiContext) -> String {
            self.calls
                .lock()
                .unwrap()
                .push((input.to_string(), context.clone()));
            self.reply.clone()
        }
    }

    /// Calendar double; `None` simulates an unreachable backend.
    struct FakeCalendar {
        today: Option<Vec<Event>>,
        upcoming: Option<Vec<Event>>,
        calls: Log<String>,
    }

    #[async_trait]
    impl Calendar for FakeCalendar {
        async fn upcoming_events(&self, max_results: usize) -> Result<Vec<Event>> {
            self.calls
                .lock()
                .unwrap()
                .push(format!("upcoming({})", max_results));
            self.upcoming
                .clone()
                .ok_or(AssistantError::Unavailable("calendar"))
        }

        async fn today_events(&self) -> Result<Vec<Event>> {
            self.calls.lock().unwrap().push("today".to_string());
            self.today
                .clone()
                .ok_or(AssistantError::Unavailable("calendar"))
        }
    }

    struct FakeBrowser {
        fail: bool,
        opened: Log<String>,
    }

    impl BrowserLauncher for FakeBrowser {
        fn open(&self, url: &str) -> Result<()> {
            if self.fail {
                return Err(AssistantError::Launch {
                    url: url.to_string(),
                    source: std::io::Error::new(std::io::ErrorKind::NotFound, "no browser"),
                });
            }
            self.opened.lock().unwrap().push(url.to_string());
            Ok(())
        }
    }

    fn fixed_clock() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, 19)
            .and_then(|day| day.and_hms_opt(14, 5, 0))
            .unwrap()
    }

    struct Harness {
        router: Router,
        ai_calls: Log<(String, AiContext)>,
        calendar_calls: Log<String>,
        opened: Log<String>,
    }

    fn harness(
        today: Option<Vec<Event>>,
        upcoming: Option<Vec<Event>>,
        browser_fails: bool,
    ) -> Harness {
        let ai_calls: Log<(String, AiContext)> = Arc::default();
        let calendar_calls: Log<String> = Arc::default();
        let opened: Log<String> = Arc::default();
        let router = Router::new(
            "Alice",
            Box::new(FakeAi {
                reply: "Here's a joke.".to_string(),
                calls: ai_calls.clone(),
            }),
            Box::new(FakeCalendar {
                today,
                upcoming,
                calls: calendar_calls.clone(),
            }),
            Box::new(FakeBrowser {
                fail: browser_fails,
                opened: opened.clone(),
            }),
        )
        .with_clock(fixed_clock);
        Harness {
            router,
            ai_calls,
            calendar_calls,
            opened,
        }
    }

    fn standup() -> Event {
        Event::new("1", "Standup", "2026-10-19T15:30:00+02:00")
    }

    #[tokio::test]
    async fn every_input_yields_a_non_empty_response() {
        let mut h = harness(Some(vec![]), Some(vec![]), false);
        for input in [
            "",
            "show my calendar",
            "what time is it",
            "what day is it",
            "open youtube",
            "open marslink",
            "help",
            "bye",
            "why is the sky blue",
        ] {
            let result = h.router.handle(input).await;
            assert!(!result.response.is_empty(), "empty response for {:?}", input);
        }
    }

    #[tokio::test]
    async fn schedule_today_is_a_calendar_query() {
        let mut h = harness(Some(vec![standup()]), Some(vec![]), false);
        let result = h.router.handle("What is on today's schedule").await;
        assert_eq!(result.action, Action::Calendar);
        assert_eq!(h.calendar_calls.lock().unwrap().as_slice(), ["today"]);
    }

    #[tokio::test]
    async fn stop_exits_with_spoken_goodbye() {
        let mut h = harness(None, None, false);
        let result = h.router.handle("stop").await;
        assert_eq!(result.action, Action::Exit);
        assert!(result.speak);
        assert!(h.ai_calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn empty_today_uses_fixed_sentence() {
        let mut h = harness(Some(vec![]), None, false);
        let result = h.router.handle("calendar for today").await;
        assert_eq!(result.response, "You have no events scheduled for today.");
        assert!(result.data.is_none());
    }

    #[tokio::test]
    async fn populated_today_lists_summary_and_time() {
        let mut h = harness(Some(vec![standup()]), None, false);
        let result = h.router.handle("calendar for today").await;
        assert_eq!(result.action, Action::Calendar);
        assert!(result.response.contains("Standup"));
        assert!(result.response.contains("15:30"));
        assert_eq!(result.data.map(|events| events.len()), Some(1));
    }

    #[tokio::test]
    async fn general_calendar_query_asks_for_five_upcoming() {
        let mut h = harness(None, Some(vec![standup()]), false);
        let result = h.router.handle("show my events").await;
        assert!(result.response.starts_with("Upcoming events:\n"));
        assert_eq!(h.calendar_calls.lock().unwrap().as_slice(), ["upcoming(5)"]);
    }

    #[tokio::test]
    async fn calendar_failure_degrades_to_empty_result() {
        let mut h = harness(None, None, false);
        let result = h.router.handle("show my events").await;
        assert_eq!(result.action, Action::Calendar);
        assert_eq!(result.response, "You have no upcoming events.");
    }

    #[tokio::test]
    async fn time_and_date_follow_the_clock() {
        let mut h = harness(None, None, false);
        assert_eq!(h.router.handle("What time is it?").await.response, "It's 14:05 now.");
        assert_eq!(
            h.router.handle("what's the date").await.response,
            "Today is Monday, 19.10.2026."
        );
    }

    #[tokio::test]
    async fn open_youtube_launches_browser() {
        let mut h = harness(None, None, false);
        let result = h.router.handle("Open YouTube please").await;
        assert_eq!(result.action, Action::Browser);
        assert_eq!(h.opened.lock().unwrap().as_slice(), ["https://youtube.com"]);
    }

    #[tokio::test]
    async fn unknown_site_is_reported() {
        let mut h = harness(None, None, false);
        let result = h.router.handle("open marslink").await;
        assert_eq!(result.action, Action::Unknown);
        assert!(h.opened.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn launch_failure_is_an_error_result() {
        let mut h = harness(None, None, true);
        let result = h.router.handle("open github").await;
        assert_eq!(result.action, Action::Error);
        assert!(result.response.contains("github"));
    }

    #[tokio::test]
    async fn help_is_never_spoken() {
        let mut h = harness(None, None, false);
        let result = h.router.handle("HELP").await;
        assert_eq!(result.action, Action::Help);
        assert!(!result.speak);
        assert!(result.response.contains("Alice"));
    }

    #[tokio::test]
    async fn unmatched_input_goes_to_ai_with_bounded_context() {
        let many: Vec<Event> = (0..6)
            .map(|i| Event::new(i.to_string(), format!("Meeting {}", i), "2026-10-20"))
            .collect();
        let mut h = harness(None, Some(many), false);
        let result = h.router.handle("  Why is the sky blue? ").await;
        assert_eq!(result.action, Action::AiResponse);
        assert_eq!(result.response, "Here's a joke.");

        let calls = h.ai_calls.lock().unwrap();
        let (input, context) = &calls[0];
        assert_eq!(input, "why is the sky blue?");
        assert_eq!(context.current_time, "14:05");
        assert_eq!(context.upcoming_events.len(), 3);
        assert_eq!(context.upcoming_events[0], "Meeting 0 at 2026-10-20");
    }

    #[tokio::test]
    async fn ai_context_survives_calendar_failure() {
        let mut h = harness(None, None, false);
        h.router.handle("tell me a story").await;
        let calls = h.ai_calls.lock().unwrap();
        assert!(calls[0].1.upcoming_events.is_empty());
    }
}
