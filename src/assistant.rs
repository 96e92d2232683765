/*
 * @file assistant.rs
 * @brief Voice assistant run loop and continuous listener
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

//! Voice assistant orchestration module.
//!
//! Two mutually exclusive modes drive the [`Router`]:
//! - single-shot: the foreground task listens, routes and answers in turn;
//! - continuous: a [`ContinuousListener`] task owns the router and voice until
//!   it is stopped, then hands both back.

use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{Local, Timelike};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::commands::CommandResult;
use crate::config::ListenMode;
use crate::error::AssistantError;
use crate::router::Router;
use crate::speech::Voice;

/// Pause after a failed listen in single-shot mode.
const LISTEN_RETRY_DELAY: Duration = Duration::from_secs(1);

/// Pause after a failed listen in continuous mode.
const CONTINUOUS_RETRY_DELAY: Duration = Duration::from_millis(500);

/// Hint shown after the greeting.
const USAGE_HINT: &str = "Say 'help' to hear what I can do, or 'bye' to finish.";

/// What the loop should do after one listen/respond step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Flow {
    Continue,
    Backoff,
    Stop,
}

/// Greeting appropriate for the hour of day.
///
/// # Arguments
/// * `hour` - Local hour in `0..24`.
pub fn greeting_for_hour(hour: u32) -> &'static str {
    match hour {
        0..=5 => "Good night",
        6..=11 => "Good morning",
        12..=17 => "Good afternoon",
        _ => "Good evening",
    }
}

/// Full spoken welcome line.
pub fn welcome_message(assistant_name: &str, hour: u32) -> String {
    format!(
        "{}! I'm {}, your voice assistant. How can I help?",
        greeting_for_hour(hour),
        assistant_name
    )
}

/// Delivers a result: spoken when `speak` is set, displayed otherwise.
///
/// # Details
/// Speech failures are logged and never end the session.
pub async fn deliver<V: Voice + ?Sized>(voice: &mut V, result: &CommandResult) {
    if !result.speak {
        voice.display(&result.response);
        return;
    }
    if let Err(err) = voice.speak(&result.response).await {
        tracing::warn!("TTS error: {}", err);
    }
}

/// Routes whatever was heard and delivers the reply.
async fn respond<V: Voice>(
    router: &mut Router,
    voice: &mut V,
    heard: crate::error::Result<Option<String>>,
) -> Flow {
    match heard {
        Ok(Some(text)) => {
            tracing::info!("Heard: {}", text);
            let result = router.handle(&text).await;
            tracing::debug!(action = ?result.action, "Handled input");
            deliver(voice, &result).await;
            if result.is_exit() {
                Flow::Stop
            } else {
                Flow::Continue
            }
        }
        Ok(None) => Flow::Continue,
        Err(AssistantError::InputClosed) => {
            tracing::info!("Input closed, stopping");
            Flow::Stop
        }
        Err(err) => {
            tracing::warn!("Listening failed: {}", err);
            Flow::Backoff
        }
    }
}

/// Runtime container that owns the router, the voice and the chosen mode.
pub struct VoiceAssistant<V: Voice> {
    router: Router,
    voice: V,
    mode: ListenMode,
}

impl<V: Voice + 'static> VoiceAssistant<V> {
    pub fn new(router: Router, voice: V, mode: ListenMode) -> Self {
        Self {
            router,
            voice,
            mode,
        }
    }

    /// Greets the user and runs the selected mode until exit.
    ///
    /// # Returns
    /// `Ok(())` after an exit command, closed input or Ctrl-C.
    ///
    /// # Errors
    /// Fails only if the continuous listener task panics.
    pub async fn run(mut self) -> Result<()> {
        self.greet().await;
        match self.mode {
            ListenMode::Once => self.run_once_mode().await,
            ListenMode::Continuous => self.run_continuous_mode().await?,
        }
        tracing::info!("Assistant stopped");
        Ok(())
    }

    async fn greet(&mut self) {
        let welcome = welcome_message(self.router.assistant_name(), Local::now().hour());
        if let Err(err) = self.voice.speak(&welcome).await {
            tracing::warn!("TTS error: {}", err);
        }
        self.voice.display(USAGE_HINT);
    }

    /// Listens and answers on the current task until told to stop.
    async fn run_once_mode(&mut self) {
        loop {
            let flow = tokio::select! {
                flow = self.process_iteration() => flow,
                _ = tokio::signal::ctrl_c() => Flow::Stop,
            };
            match flow {
                Flow::Continue => {}
                Flow::Backoff => tokio::time::sleep(LISTEN_RETRY_DELAY).await,
                Flow::Stop => break,
            }
        }
    }

    /// Executes one listen-route-respond step.
    async fn process_iteration(&mut self) -> Flow {
        let heard = self.voice.listen().await;
        respond(&mut self.router, &mut self.voice, heard).await
    }

    /// Hands the router to a background listener and waits for exit or Ctrl-C.
    async fn run_continuous_mode(self) -> Result<()> {
        let listener = ContinuousListener::start(self.router, self.voice);
        tokio::select! {
            _ = listener.finished() => {}
            signal = tokio::signal::ctrl_c() => {
                if let Err(err) = signal {
                    tracing::warn!("Ctrl-C handler failed: {}", err);
                }
            }
        }
        listener.stop().await?;
        Ok(())
    }
}

/// Background listener driving the router from its own task.
///
/// # Details
/// The task owns the router and the voice, so nothing else can mutate them
/// while it runs. [`ContinuousListener::stop`] cancels and joins the task;
/// once it returns no further input is handled.
pub struct ContinuousListener<V: Voice> {
    cancel: CancellationToken,
    handle: JoinHandle<(Router, V)>,
}

impl<V: Voice + 'static> ContinuousListener<V> {
    /// Spawns the listener task.
    pub fn start(router: Router, voice: V) -> Self {
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(listen_loop(router, voice, cancel.clone()));
        tracing::info!("Continuous listening started");
        Self { cancel, handle }
    }

    /// Resolves once the listener has been asked to stop or has stopped itself.
    pub async fn finished(&self) {
        self.cancel.cancelled().await;
    }

    /// Cancels the listener and waits for it to finish.
    ///
    /// # Returns
    /// The router and voice, ready for another mode.
    ///
    /// # Errors
    /// Returns an error if the listener task panicked.
    pub async fn stop(self) -> Result<(Router, V)> {
        self.cancel.cancel();
        let parts = self
            .handle
            .await
            .context("Continuous listener task failed")?;
        tracing::info!("Continuous listening stopped");
        Ok(parts)
    }
}

/// Body of the continuous listener task.
///
/// # Details
/// Only the wait for input races the cancellation token; a routed command
/// always runs to completion before the next check.
async fn listen_loop<V: Voice>(
    mut router: Router,
    mut voice: V,
    cancel: CancellationToken,
) -> (Router, V) {
    loop {
        let heard = tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            heard = voice.listen() => heard,
        };
        match respond(&mut router, &mut voice, heard).await {
            Flow::Continue => {}
            Flow::Backoff => {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = tokio::time::sleep(CONTINUOUS_RETRY_DELAY) => {}
                }
            }
            Flow::Stop => {
                cancel.cancel();
                break;
            }
        }
    }
    (router, voice)
}
