/*
 * @file ai.rs
 * @brief Language-model collaborator and conversation engine
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

//! AI small-talk collaborator.
//!
//! [`AiEngine`] owns the conversation history, picks the configured
//! [`LanguageModel`] backend and falls back to canned offline replies when the
//! backend is missing or fails. The router talks to it through
//! [`AiCollaborator`] so tests can substitute a fake.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{AssistantError, Result};
use crate::history::{ConversationHistory, Role};

/// Chat completions endpoint for OpenAI.
const OPENAI_API_URL: &str = "https://api.openai.com/v1/chat/completions";

/// Number of history turns replayed to the model.
pub const CONTEXT_WINDOW: usize = 6;

/// Upper bound on upcoming events mentioned in the context message.
pub const MAX_CONTEXT_EVENTS: usize = 3;

/// Sampling temperature used for OpenAI requests.
const OPENAI_TEMPERATURE: f32 = 0.7;

/// Token cap for OpenAI replies.
const OPENAI_MAX_TOKENS: u32 = 500;

/// Reply used when no backend can answer.
const OFFLINE_RESPONSE: &str = "Sorry, I'm working in offline mode right now. \
Please configure API keys for full functionality.";

/// Chat message exchanged with language-model backends.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new("system", content)
    }
}

/// Situational context handed to the AI with every question.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct AiContext {
    /// Local time as `HH:MM`.
    pub current_time: String,
    /// `"<summary> at <start>"` strings, at most three.
    pub upcoming_events: Vec<String>,
}

impl AiContext {
    /// Renders the context as the trailing system message.
    pub fn to_prompt(&self) -> String {
        let mut text = format!("\nCurrent time: {}", self.current_time);
        if !self.upcoming_events.is_empty() {
            text.push_str("\nUpcoming events:\n");
            for event in self.upcoming_events.iter().take(MAX_CONTEXT_EVENTS) {
                text.push_str(&format!("- {}\n", event));
            }
        }
        text
    }
}

/// A chat-completion backend.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Short backend name used in logs.
    fn name(&self) -> &'static str;

    /// Produces the assistant reply for a full message list.
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String>;
}

/// The router-facing AI interface.
#[async_trait]
pub trait AiCollaborator: Send + Sync {
    /// Answers `input` using `context`. Never fails; degraded answers are text too.
    async fn get_response(&mut self, input: &str, context: &AiContext) -> String;
}

/// Request structure for the Ollama chat API.
#[derive(Serialize)]
struct OllamaRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    stream: bool,
}

/// Response structure for the Ollama chat API.
#[derive(Deserialize)]
struct OllamaResponse {
    message: ChatMessage,
}

/// Local Ollama backend.
pub struct OllamaModel {
    client: reqwest::Client,
    base_url: String,
    model: String,
}

impl OllamaModel {
    /// Creates a backend for `model` served at `base_url` (e.g. `http://localhost:11434`).
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            model: model.into(),
        }
    }

    fn chat_url(&self) -> String {
        format!("{}/api/chat", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl LanguageModel for OllamaModel {
    fn name(&self) -> &'static str {
        "Ollama"
    }

    async fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
        let request = OllamaRequest {
            model: &self.model,
            messages,
            stream: false,
        };
        let response: OllamaResponse = self
            .client
            .post(self.chat_url())
            .json(&request)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|err| AssistantError::request("Ollama", err))?
            .json()
            .await
            .map_err(|err| AssistantError::request("Ollama", err))?;
        non_empty("Ollama", response.message.content)
    }
}

/// Request structure for OpenAI chat completions.
#[derive(Serialize)]
struct OpenAiRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
    max_tokens: u32,
}

/// Response structure for OpenAI chat completions.
#[derive(Deserialize)]
struct OpenAiResponse {
    #[serde(default)]
    choices: Vec<OpenAiChoice>,
}

#[derive(Deserialize)]
struct OpenAiChoice {
    message: ChatMessage,
}

impl OpenAiResponse {
    fn into_text(self) -> Result<String> {
        let choice = self
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| AssistantError::unexpected("OpenAI", "no choices returned"))?;
        non_empty("OpenAI", choice.message.content)
    }
}

/// Hosted OpenAI backend.
pub struct OpenAiModel {
    client: reqwest::Client,
    api_key: String,
    model: String,
}

impl OpenAiModel {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            model: model.into(),
        }
    }
}

#[async_trait]
impl LanguageModel for OpenAiModel {
    fn name(&self) -> &'static str {
        "OpenAI"
    }

    async fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
        let request = OpenAiRequest {
            model: &self.model,
            messages,
            temperature: OPENAI_TEMPERATURE,
            max_tokens: OPENAI_MAX_TOKENS,
        };
        let response: OpenAiResponse = self
            .client
            .post(OPENAI_API_URL)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|err| AssistantError::request("OpenAI", err))?
            .json()
            .await
            .map_err(|err| AssistantError::request("OpenAI", err))?;
        response.into_text()
    }
}

fn non_empty(service: &'static str, content: String) -> Result<String> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Err(AssistantError::unexpected(service, "empty reply"));
    }
    Ok(trimmed.to_string())
}

/// Builds the system prompt for the named assistant.
pub fn system_prompt(assistant_name: &str) -> String {
    format!(
        "You are {}, a friendly AI assistant.\n\
        Your abilities:\n\
        - Answer the user's questions\n\
        - Help with tasks\n\
        - Check the calendar and upcoming plans\n\
        - Remind the user about important things\n\n\
        Answer briefly and to the point, but stay friendly.",
        assistant_name
    )
}

/// Conversation engine: history owner, backend selector and offline fallback.
pub struct AiEngine {
    model: Option<Box<dyn LanguageModel>>,
    history: ConversationHistory,
    system_prompt: String,
    assistant_name: String,
}

impl AiEngine {
    /// Creates an engine.
    ///
    /// # Arguments
    /// * `assistant_name` - Name used in the system prompt and canned replies.
    /// * `max_history` - Exchanges kept in the history buffer.
    /// * `model` - Backend to query; `None` runs fully offline.
    pub fn new(
        assistant_name: impl Into<String>,
        max_history: usize,
        model: Option<Box<dyn LanguageModel>>,
    ) -> Self {
        let assistant_name = assistant_name.into();
        Self {
            model,
            history: ConversationHistory::new(max_history),
            system_prompt: system_prompt(&assistant_name),
            assistant_name,
        }
    }

    pub fn history(&self) -> &ConversationHistory {
        &self.history
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    /// Assembles system prompt, recent history and context for the backend.
    ///
    /// # Details
    /// The current user turn is already the last history entry, so it is not
    /// appended a second time.
    fn build_messages(&self, context: &AiContext) -> Vec<ChatMessage> {
        let mut messages = vec![ChatMessage::system(self.system_prompt.clone())];
        messages.extend(
            self.history
                .recent_window(CONTEXT_WINDOW)
                .into_iter()
                .map(|turn| ChatMessage::new(turn.role.as_str(), turn.content.clone())),
        );
        messages.push(ChatMessage::system(context.to_prompt()));
        messages
    }

    /// Canned reply used without a working backend.
    ///
    /// # Arguments
    /// * `input` - The user's utterance.
    ///
    /// # Returns
    /// * `String` - A keyword-matched short answer or the offline notice.
    pub fn fallback_response(&self, input: &str) -> String {
        let normalized = input.to_lowercase();
        if normalized.contains("hello") {
            "Hello! How can I help you?".to_string()
        } else if normalized.contains("how are you") {
            "I'm doing great, thank you!".to_string()
        } else if normalized.contains("thank") {
            "You're welcome! Happy to help.".to_string()
        } else if normalized.contains("bye") {
            "Goodbye!".to_string()
        } else if normalized.contains("your name") {
            format!("My name is {}, I'm your voice assistant.", self.assistant_name)
        } else if normalized.contains("what can you do") {
            "I can show your calendar events, tell the time and date, \
            open websites and answer questions."
                .to_string()
        } else {
            OFFLINE_RESPONSE.to_string()
        }
    }
}

#[async_trait]
impl AiCollaborator for AiEngine {
    async fn get_response(&mut self, input: &str, context: &AiContext) -> String {
        self.history.append(Role::User, input);
        let Some(model) = self.model.as_ref() else {
            return self.fallback_response(input);
        };
        let messages = self.build_messages(context);
        match model.complete(&messages).await {
            Ok(reply) => {
                self.history.append(Role::Assistant, reply.clone());
                reply
            }
            Err(err) => {
                tracing::warn!("{} backend error: {}", model.name(), err);
                self.fallback_response(input)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Backend double that records requests and replays a canned outcome.
    struct ScriptedModel {
        reply: Option<String>,
        requests: Arc<Mutex<Vec<Vec<ChatMessage>>>>,
    }

    #[async_trait]
    impl LanguageModel for ScriptedModel {
        fn name(&self) -> &'static str {
            "scripted"
        }

        async fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
            self.requests.lock().unwrap().push(messages.to_vec());
            self.reply
                .clone()
                .ok_or(AssistantError::Unavailable("scripted"))
        }
    }

    fn engine_with(reply: Option<&str>) -> (AiEngine, Arc<Mutex<Vec<Vec<ChatMessage>>>>) {
        let requests = Arc::new(Mutex::new(Vec::new()));
        let model = ScriptedModel {
            reply: reply.map(str::to_string),
            requests: requests.clone(),
        };
        (AiEngine::new("Alice", 10, Some(Box::new(model))), requests)
    }

    fn context() -> AiContext {
        AiContext {
            current_time: "10:00".to_string(),
            upcoming_events: vec!["Standup at 2026-10-19T11:00:00Z".to_string()],
        }
    }

    #[tokio::test]
    async fn offline_engine_answers_with_canned_text() {
        let mut engine = AiEngine::new("Alice", 10, None);
        let reply = engine.get_response("tell me a joke", &context()).await;
        assert_eq!(reply, OFFLINE_RESPONSE);
        assert_eq!(engine.history().len(), 1);
    }

    #[tokio::test]
    async fn successful_reply_is_recorded_in_history() {
        let (mut engine, requests) = engine_with(Some("  Sure thing. "));
        let reply = engine.get_response("tell me a joke", &context()).await;
        assert_eq!(reply, "  Sure thing. ");
        let roles: Vec<Role> = engine.history().turns().map(|t| t.role).collect();
        assert_eq!(roles, vec![Role::User, Role::Assistant]);

        let sent = requests.lock().unwrap();
        let messages = &sent[0];
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[0].role, "system");
        assert_eq!(messages[1], ChatMessage::new("user", "tell me a joke"));
        assert!(messages[2].content.contains("Current time: 10:00"));
        assert!(messages[2].content.contains("- Standup at"));
    }

    #[tokio::test]
    async fn backend_failure_falls_back_without_recording_reply() {
        let (mut engine, _) = engine_with(None);
        let reply = engine.get_response("Hello there", &context()).await;
        assert_eq!(reply, "Hello! How can I help you?");
        assert_eq!(engine.history().len(), 1);
    }

    #[tokio::test]
    async fn only_recent_window_is_replayed() {
        let (mut engine, requests) = engine_with(Some("ok"));
        for i in 0..5 {
            engine.get_response(&format!("question {}", i), &context()).await;
        }
        let sent = requests.lock().unwrap();
        let last = sent.last().unwrap();
        assert_eq!(last.len(), 1 + CONTEXT_WINDOW + 1);
        assert_eq!(last[CONTEXT_WINDOW].content, "question 4");
    }

    #[tokio::test]
    async fn clear_history_resets_the_buffer() {
        let (mut engine, _) = engine_with(Some("ok"));
        engine.get_response("hi", &context()).await;
        engine.clear_history();
        assert!(engine.history().is_empty());
    }

    #[test]
    fn context_prompt_lists_at_most_three_events() {
        let context = AiContext {
            current_time: "08:15".to_string(),
            upcoming_events: (0..5).map(|i| format!("Event {}", i)).collect(),
        };
        let prompt = context.to_prompt();
        assert!(prompt.starts_with("\nCurrent time: 08:15"));
        assert!(prompt.contains("- Event 2\n"));
        assert!(!prompt.contains("Event 3"));
    }

    #[test]
    fn context_prompt_omits_empty_event_section() {
        let context = AiContext {
            current_time: "08:15".to_string(),
            upcoming_events: vec![],
        };
        assert!(!context.to_prompt().contains("Upcoming events"));
    }

    #[test]
    fn openai_response_takes_first_choice() {
        let raw = r#"{"choices": [{"message": {"role": "assistant", "content": " Hi! "}}]}"#;
        let response: OpenAiResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(response.into_text().unwrap(), "Hi!");
    }

    #[test]
    fn openai_response_without_choices_is_an_error() {
        let response: OpenAiResponse = serde_json::from_str(r#"{"choices": []}"#).unwrap();
        assert!(response.into_text().is_err());
    }

    #[test]
    fn fallback_uses_assistant_name() {
        let engine = AiEngine::new("Alice", 10, None);
        assert!(engine.fallback_response("What is your name?").contains("Alice"));
    }

    #[test]
    fn ollama_chat_url_normalizes_trailing_slash() {
        let model = OllamaModel::new("http://localhost:11434/", "llama3.2:3b");
        assert_eq!(model.chat_url(), "http://localhost:11434/api/chat");
    }
}
