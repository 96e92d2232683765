/*
 * @file config.rs
 * @brief Runtime configuration from config.json, .env and environment
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

//! Runtime configuration.
//!
//! Values come from `config.json` (every field optional), then environment
//! variables (a `.env` file is loaded by the binary first). Secrets are only
//! ever read from the environment.

use std::env;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::history::DEFAULT_MAX_HISTORY;

/// Default path of the JSON configuration file.
pub const CONFIG_PATH: &str = "config.json";

/// How the assistant waits for input.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ListenMode {
    /// Listen, answer, repeat; all on the foreground task.
    #[default]
    Once,
    /// A background listener answers until stopped.
    Continuous,
}

impl ListenMode {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "once" => Some(Self::Once),
            "continuous" => Some(Self::Continuous),
            _ => None,
        }
    }
}

/// Which language-model backend answers small talk.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AiProvider {
    #[default]
    OpenAi,
    Ollama,
    /// Canned replies only.
    Offline,
}

impl AiProvider {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "openai" => Some(Self::OpenAi),
            "ollama" => Some(Self::Ollama),
            "offline" | "none" => Some(Self::Offline),
            _ => None,
        }
    }
}

/// Strongly typed representation of `config.json` plus environment secrets.
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub assistant_name: String,
    pub ai_provider: AiProvider,
    pub openai_model: String,
    pub ollama_model: String,
    pub ollama_url: String,
    pub max_history: usize,
    pub listen_mode: ListenMode,
    pub voice_rate: u32,
    pub tts_program: String,
    pub calendar_id: String,
    pub events_file: String,
    #[serde(skip)]
    pub openai_api_key: Option<String>,
    #[serde(skip)]
    pub google_calendar_token: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            assistant_name: "Alice".to_string(),
            ai_provider: AiProvider::default(),
            openai_model: "gpt-3.5-turbo".to_string(),
            ollama_model: "llama3.2:3b".to_string(),
            ollama_url: "http://localhost:11434".to_string(),
            max_history: DEFAULT_MAX_HISTORY,
            listen_mode: ListenMode::default(),
            voice_rate: 150,
            tts_program: fallback_tts_program(),
            calendar_id: "primary".to_string(),
            events_file: "events.json".to_string(),
            openai_api_key: None,
            google_calendar_token: None,
        }
    }
}

impl AppConfig {
    /// Loads `path` and applies process environment overrides.
    pub fn from_env_and_file(path: &Path) -> Self {
        Self::load(path).apply_overrides(|key| env::var(key).ok())
    }

    /// Loads configuration from `path`, falling back to defaults when missing.
    ///
    /// # Details
    /// A missing or malformed file is logged and replaced by
    /// [`AppConfig::default`]; start-up never fails on configuration.
    pub fn load(path: &Path) -> Self {
        if !path.exists() {
            tracing::info!("No {} found, using defaults", path.display());
            return Self::default();
        }
        Self::from_file(path).unwrap_or_else(|err| {
            tracing::warn!("{:#}. Using default configuration.", err);
            Self::default()
        })
    }

    fn from_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        serde_json::from_str(&raw).with_context(|| format!("Failed to parse {}", path.display()))
    }

    /// Applies environment overrides using `lookup` to read variables.
    ///
    /// # Details
    /// Unparseable values (e.g. a non-numeric `VOICE_RATE`) are ignored with a
    /// warning. Blank secrets count as unset.
    pub fn apply_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(name) = lookup("ASSISTANT_NAME").filter(|v| !v.trim().is_empty()) {
            self.assistant_name = name;
        }
        if let Some(raw) = lookup("AI_PROVIDER") {
            match AiProvider::parse(&raw) {
                Some(provider) => self.ai_provider = provider,
                None => tracing::warn!("Ignoring unknown AI_PROVIDER {:?}", raw),
            }
        }
        if let Some(model) = lookup("OPENAI_MODEL") {
            self.openai_model = model;
        }
        if let Some(model) = lookup("OLLAMA_MODEL") {
            self.ollama_model = model;
        }
        if let Some(url) = lookup("OLLAMA_URL") {
            self.ollama_url = url;
        }
        if let Some(raw) = lookup("VOICE_RATE") {
            match raw.trim().parse() {
                Ok(rate) => self.voice_rate = rate,
                Err(_) => tracing::warn!("Ignoring invalid VOICE_RATE {:?}", raw),
            }
        }
        if let Some(raw) = lookup("LISTEN_MODE") {
            match ListenMode::parse(&raw) {
                Some(mode) => self.listen_mode = mode,
                None => tracing::warn!("Ignoring unknown LISTEN_MODE {:?}", raw),
            }
        }
        self.openai_api_key = lookup("OPENAI_API_KEY").filter(|v| !v.trim().is_empty());
        self.google_calendar_token =
            lookup("GOOGLE_CALENDAR_TOKEN").filter(|v| !v.trim().is_empty());
        self
    }
}

/// TTS program shipped with the platform.
fn fallback_tts_program() -> String {
    if cfg!(target_os = "macos") {
        "say".to_string()
    } else {
        "espeak".to_string()
    }
}
