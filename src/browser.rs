/*
 * @file browser.rs
 * @brief Browser launching collaborator
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

//! Opens URLs in the user's default browser.

use std::io;

use crate::error::{AssistantError, Result};

/// Function that hands a URL to the platform's opener.
pub type Opener = fn(&str) -> io::Result<()>;

/// Something that can show a URL to the user.
pub trait BrowserLauncher: Send + Sync {
    /// Opens `url`.
    ///
    /// # Errors
    /// Returns [`AssistantError::Launch`] when the browser cannot be started.
    fn open(&self, url: &str) -> Result<()>;
}

/// Launches the operating system's URL handler.
///
/// # Details
/// The default opener is [`open::that_detached`], which lets the browser
/// outlive the request without leaving a child process to reap.
#[derive(Clone, Copy)]
pub struct SystemBrowser {
    opener: Opener,
}

impl Default for SystemBrowser {
    fn default() -> Self {
        Self::with_opener(|url| open::that_detached(url))
    }
}

impl SystemBrowser {
    /// Uses `opener` instead of the platform default.
    pub fn with_opener(opener: Opener) -> Self {
        Self { opener }
    }
}

impl BrowserLauncher for SystemBrowser {
    fn open(&self, url: &str) -> Result<()> {
        tracing::debug!("Opening {}", url);
        (self.opener)(url).map_err(|source| AssistantError::Launch {
            url: url.to_string(),
            source,
        })
    }
}
