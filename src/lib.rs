/*
 * @file lib.rs
 * @brief Alice library root
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

//! Alice - a keyword-routed voice assistant.
//!
//! Recognized utterances are routed to local handlers:
//! - calendar lookups (Google Calendar or a local events file)
//! - current time and date
//! - opening well-known sites in the default browser
//! - help and exit
//!
//! Everything else goes to a conversational AI backend (OpenAI or Ollama)
//! that keeps a bounded conversation history and degrades to canned replies
//! when offline.
//!
//! # Example
//! ```no_run
//! use alice::ai::AiEngine;
//! use alice::browser::SystemBrowser;
//! use alice::calendar::UnavailableCalendar;
//! use alice::router::Router;
//!
//! #[tokio::main]
//! async fn main() {
//!     let mut router = Router::new(
//!         "Alice",
//!         Box::new(AiEngine::new("Alice", 10, None)),
//!         Box::new(UnavailableCalendar),
//!         Box::new(SystemBrowser::default()),
//!     );
//!     let result = router.handle("what time is it").await;
//!     println!("{}", result.response);
//! }
//! ```

pub mod ai;
pub mod assistant;
pub mod browser;
pub mod calendar;
pub mod commands;
pub mod config;
pub mod error;
pub mod history;
pub mod router;
pub mod speech;
