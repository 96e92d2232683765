/*
 * @file speech.rs
 * @brief Speech output and terminal voice front end
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

//! Text-to-speech and the voice collaborator used by the run loop.

use std::io::Write;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::process::Command;

use crate::error::{AssistantError, Result};

/// Speaks text by running an external TTS program such as `say` or `espeak`.
#[derive(Clone, Debug)]
pub struct SpeechSynthesizer {
    program: String,
    rate: u32,
}

impl SpeechSynthesizer {
    /// Creates a synthesizer for `program` speaking at `rate` words per minute.
    pub fn new(program: impl Into<String>, rate: u32) -> Self {
        Self {
            program: program.into(),
            rate,
        }
    }

    /// Rate flag understood by the configured program, if any.
    fn rate_args(&self) -> Vec<String> {
        match self.program.as_str() {
            "say" => vec!["-r".to_string(), self.rate.to_string()],
            "espeak" | "espeak-ng" => vec!["-s".to_string(), self.rate.to_string()],
            _ => Vec::new(),
        }
    }

    /// Speaks the given text and waits for playback to finish.
    ///
    /// # Parameters
    /// * `text` - The utterance to synthesize.
    ///
    /// # Errors
    /// Returns an error for blank text, when the program cannot be spawned, or
    /// when it exits unsuccessfully.
    pub async fn speak(&self, text: &str) -> Result<()> {
        if text.trim().is_empty() {
            return Err(AssistantError::Speech("cannot speak empty text".to_string()));
        }
        let output = Command::new(&self.program)
            .args(self.rate_args())
            .arg(text)
            .output()
            .await?;
        if !output.status.success() {
            return Err(AssistantError::Speech(format!(
                "{} exited with {}",
                self.program, output.status
            )));
        }
        Ok(())
    }
}

/// Input and output channel between the user and the assistant.
#[async_trait]
pub trait Voice: Send {
    /// Waits for one utterance.
    ///
    /// # Returns
    /// * `Ok(Some(text))` - Something was heard.
    /// * `Ok(None)` - Nothing usable was heard; the caller should listen again.
    ///
    /// # Errors
    /// [`AssistantError::InputClosed`] once no more input can arrive.
    async fn listen(&mut self) -> Result<Option<String>>;

    /// Delivers a reply out loud.
    async fn speak(&mut self, text: &str) -> Result<()>;

    /// Shows a reply that should not be vocalized.
    fn display(&self, text: &str);
}

/// Voice front end over the terminal: typed input, printed and optionally spoken output.
pub struct TerminalVoice {
    assistant_name: String,
    lines: Lines<BufReader<Stdin>>,
    synthesizer: Option<SpeechSynthesizer>,
}

impl TerminalVoice {
    /// Creates a terminal voice; `synthesizer = None` prints replies only.
    pub fn new(assistant_name: impl Into<String>, synthesizer: Option<SpeechSynthesizer>) -> Self {
        Self {
            assistant_name: assistant_name.into(),
            lines: BufReader::new(tokio::io::stdin()).lines(),
            synthesizer,
        }
    }
}

#[async_trait]
impl Voice for TerminalVoice {
    async fn listen(&mut self) -> Result<Option<String>> {
        print!("You: ");
        std::io::stdout().flush()?;
        match self.lines.next_line().await? {
            Some(line) if line.trim().is_empty() => Ok(None),
            Some(line) => Ok(Some(line.trim().to_string())),
            None => Err(AssistantError::InputClosed),
        }
    }

    async fn speak(&mut self, text: &str) -> Result<()> {
        println!("{}: {}", self.assistant_name, text);
        match &self.synthesizer {
            Some(synthesizer) => synthesizer.speak(text).await,
            None => Ok(()),
        }
    }

    fn display(&self, text: &str) {
        println!("\n{}: {}\n", self.assistant_name, text);
    }
}
