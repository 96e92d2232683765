/*
 * @file error.rs
 * @brief Collaborator error taxonomy
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

//! Error types shared by the assistant's collaborators.
//!
//! Every backend (language model, calendar, browser, speech) reports failures
//! through [`AssistantError`]. The router never forwards these to its caller;
//! it converts them into a degraded [`crate::commands::CommandResult`].

use thiserror::Error;

/// Result alias used by every collaborator interface.
pub type Result<T> = std::result::Result<T, AssistantError>;

/// Failures a collaborator can report back to the router or run loop.
#[derive(Debug, Error)]
pub enum AssistantError {
    /// The backend is not configured (missing key, token or file).
    #[error("{0} is not configured")]
    Unavailable(&'static str),

    /// The HTTP request to a backend could not be completed.
    #[error("{service} request failed: {source}")]
    Request {
        service: &'static str,
        #[source]
        source: reqwest::Error,
    },

    /// The backend answered, but not with anything usable.
    #[error("{service} returned an unexpected response: {detail}")]
    UnexpectedResponse {
        service: &'static str,
        detail: String,
    },

    /// The operating system refused to open a browser.
    #[error("failed to launch a browser for {url}: {source}")]
    Launch {
        url: String,
        #[source]
        source: std::io::Error,
    },

    /// The text-to-speech program failed or produced no output.
    #[error("speech synthesis failed: {0}")]
    Speech(String),

    /// The input stream reached end-of-file.
    #[error("input stream closed")]
    InputClosed,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl AssistantError {
    /// Wraps a transport error for the named backend.
    pub fn request(service: &'static str, source: reqwest::Error) -> Self {
        Self::Request { service, source }
    }

    /// Builds an [`AssistantError::UnexpectedResponse`] for the named backend.
    pub fn unexpected(service: &'static str, detail: impl Into<String>) -> Self {
        Self::UnexpectedResponse {
            service,
            detail: detail.into(),
        }
    }
}
