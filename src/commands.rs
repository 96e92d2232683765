/*
 * @file commands.rs
 * @brief Intent keyword tables, site table and the command result contract
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

//! Keyword-based intent classification and the uniform command result.
//!
//! Classification is first-match-wins over an ordered rule list. The keyword
//! sets overlap ("today's schedule" hits both calendar and date), so the rule
//! order is the tie-break and must not be rearranged.

use serde::Serialize;

use crate::calendar::Event;

/// Keyword that narrows a calendar query to the current day.
pub const TODAY_KEYWORD: &str = "today";

/// Trigger word for the browser intent.
pub const OPEN_TRIGGER: &str = "open";

/// Reply sent with [`Action::Exit`].
pub const EXIT_RESPONSE: &str = "Goodbye! I'll be waiting for your instructions.";

const CALENDAR_KEYWORDS: &[&str] = &["events", "calendar", "plan", "schedule"];
const TIME_KEYWORDS: &[&str] = &["time", "o'clock", "what time"];
const DATE_KEYWORDS: &[&str] = &["date", "what day", TODAY_KEYWORD];
const BROWSER_KEYWORDS: &[&str] = &[OPEN_TRIGGER];
const HELP_KEYWORDS: &[&str] = &["help", "what can you do", "commands"];
const EXIT_KEYWORDS: &[&str] = &["bye", "goodbye", "exit", "stop"];

/// Ordered classification rules; the first rule with a matching keyword wins.
const RULES: &[KeywordRule] = &[
    KeywordRule::new(Intent::Calendar, CALENDAR_KEYWORDS),
    KeywordRule::new(Intent::Time, TIME_KEYWORDS),
    KeywordRule::new(Intent::Date, DATE_KEYWORDS),
    KeywordRule::new(Intent::Browser, BROWSER_KEYWORDS),
    KeywordRule::new(Intent::Help, HELP_KEYWORDS),
    KeywordRule::new(Intent::Exit, EXIT_KEYWORDS),
];

/// Weekday names indexed Monday = 0.
const WEEKDAYS: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

/// Sites the browser intent can open, matched in definition order.
pub const SITES: &[Site] = &[
    Site::new("youtube", "https://youtube.com"),
    Site::new("google", "https://google.com"),
    Site::new("github", "https://github.com"),
    Site::new("gmail", "https://mail.google.com"),
    Site::new("mail", "https://mail.google.com"),
    Site::new("duckduckgo", "https://duckduckgo.com"),
    Site::new("bing", "https://bing.com"),
];

/// Tag describing what a handled command did.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Calendar,
    Time,
    Date,
    Browser,
    Help,
    AiResponse,
    Exit,
    Error,
    Unknown,
}

/// Uniform record returned for every routed input.
///
/// # Details
/// Callers branch on `speak` (vocalize vs. display) and on
/// [`Action::Exit`] (leave the run loop after delivering `response`).
#[derive(Clone, Debug, Serialize)]
pub struct CommandResult {
    pub action: Action,
    pub response: String,
    pub speak: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Vec<Event>>,
}

impl CommandResult {
    /// A reply meant to be vocalized.
    pub fn spoken(action: Action, response: impl Into<String>) -> Self {
        Self {
            action,
            response: response.into(),
            speak: true,
            data: None,
        }
    }

    /// A reply meant for textual display only.
    pub fn silent(action: Action, response: impl Into<String>) -> Self {
        Self {
            speak: false,
            ..Self::spoken(action, response)
        }
    }

    /// Attaches calendar events to the result.
    pub fn with_events(mut self, events: Vec<Event>) -> Self {
        self.data = Some(events);
        self
    }

    /// Whether the caller should terminate its run loop.
    pub fn is_exit(&self) -> bool {
        self.action == Action::Exit
    }
}

/// Classification bucket chosen for one input.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Intent {
    Calendar,
    Time,
    Date,
    Browser,
    Help,
    Exit,
    /// No rule matched; the AI fallback answers.
    Conversation,
}

/// Maps a set of trigger keywords to an intent.
#[derive(Clone, Copy, Debug)]
struct KeywordRule {
    intent: Intent,
    keywords: &'static [&'static str],
}

impl KeywordRule {
    const fn new(intent: Intent, keywords: &'static [&'static str]) -> Self {
        Self { intent, keywords }
    }

    fn matches(&self, text: &str) -> bool {
        contains_any(text, self.keywords)
    }
}

/// A named site the browser intent can open.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Site {
    pub name: &'static str,
    pub url: &'static str,
}

impl Site {
    const fn new(name: &'static str, url: &'static str) -> Self {
        Self { name, url }
    }
}

/// Classifies free text into an intent.
///
/// # Details
/// Lower-cases the input and walks [`RULES`] in order, returning the intent of
/// the first rule whose keywords appear as substrings. Inputs matching no rule
/// fall through to [`Intent::Conversation`], so every text has an intent.
///
/// # Arguments
/// * `text` - The transcribed or typed utterance.
///
/// # Returns
/// * `Intent` - The selected category.
pub fn classify(text: &str) -> Intent {
    let normalized = text.to_lowercase();
    RULES
        .iter()
        .find(|rule| rule.matches(&normalized))
        .map(|rule| rule.intent)
        .unwrap_or(Intent::Conversation)
}

/// Finds the first site whose name appears in the text.
///
/// # Arguments
/// * `text` - The user's utterance in lowercase.
///
/// # Returns
/// * `Some(&Site)` - The first matching table entry.
/// * `None` - No site name appears in the text.
pub fn find_site(text: &str) -> Option<&'static Site> {
    SITES.iter().find(|site| text.contains(site.name))
}

/// Returns `true` when any keyword is a substring of `text`.
pub fn contains_any(text: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|keyword| text.contains(keyword))
}

/// Name of the weekday at `index` (Monday = 0), wrapping past Sunday.
pub fn weekday_name(index: usize) -> &'static str {
    WEEKDAYS[index % WEEKDAYS.len()]
}

/// Builds the help text listing everything the assistant understands.
///
/// # Arguments
/// * `assistant_name` - Name the assistant introduces itself with.
///
/// # Returns
/// * `String` - Multi-line help block, too long to be spoken.
pub fn help_text(assistant_name: &str) -> String {
    format!(
        "I'm {name}, your AI assistant. Here is what I can do:

Calendar:
  \"Show my events\" - upcoming events
  \"What's on my schedule today?\" - today's events

Time and date:
  \"What time is it?\" - current time
  \"What's the date?\" - today's date

Browser:
  \"Open YouTube\" - open a site
  \"Open Google\" - open a search engine

Conversation:
  Ask me anything and I'll answer with AI
  \"Bye\" - finish the session

Voice:
  Speak clearly into the microphone, or type when muted
",
        name = assistant_name
    )
}
