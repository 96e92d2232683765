/*
 * @file history.rs
 * @brief Bounded conversation history buffer
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

//! Sliding-window conversation history used as short-term AI context.

use std::collections::VecDeque;

use chrono::{DateTime, Local};
use serde::Serialize;

/// Default number of exchanges kept; the buffer holds twice as many turns.
pub const DEFAULT_MAX_HISTORY: usize = 10;

/// Speaker of a single turn.
///
/// # Details
/// Serialized in lowercase so the role can be handed straight to chat APIs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    /// Returns the chat-API name of the role.
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// One recorded utterance from either side of the conversation.
#[derive(Clone, Debug, Serialize)]
pub struct ConversationTurn {
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Local>,
}

impl ConversationTurn {
    /// Creates a turn stamped with the current local time.
    ///
    /// # Arguments
    /// * `role` - The speaker role (User or Assistant).
    /// * `content` - The utterance content; accepts any type convertible to String.
    ///
    /// # Returns
    /// * `Self` - A new ConversationTurn instance.
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: Local::now(),
        }
    }
}

/// Append-only turn log trimmed from the front on overflow.
///
/// # Details
/// Holds at most `2 * max_history` turns. Appending past the limit discards
/// the oldest turns; new turns are never rejected.
#[derive(Clone, Debug)]
pub struct ConversationHistory {
    turns: VecDeque<ConversationTurn>,
    max_history: usize,
}

impl Default for ConversationHistory {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_HISTORY)
    }
}

impl ConversationHistory {
    /// Creates an empty history keeping `max_history` exchanges.
    pub fn new(max_history: usize) -> Self {
        Self {
            turns: VecDeque::with_capacity(max_history * 2 + 1),
            max_history,
        }
    }

    /// Maximum number of turns retained.
    pub fn capacity(&self) -> usize {
        self.max_history * 2
    }

    /// Records a turn and trims the oldest entries beyond the capacity.
    ///
    /// # Arguments
    /// * `role` - Who produced the utterance.
    /// * `content` - The utterance text.
    pub fn append(&mut self, role: Role, content: impl Into<String>) {
        self.turns.push_back(ConversationTurn::new(role, content));
        while self.turns.len() > self.capacity() {
            self.turns.pop_front();
        }
    }

    /// Removes every recorded turn.
    pub fn clear(&mut self) {
        self.turns.clear();
    }

    /// Returns the last `n` turns, oldest first.
    ///
    /// # Arguments
    /// * `n` - Window size; larger values return the whole history.
    ///
    /// # Returns
    /// * `Vec<&ConversationTurn>` - The most recent turns in insertion order.
    pub fn recent_window(&self, n: usize) -> Vec<&ConversationTurn> {
        let skip = self.turns.len().saturating_sub(n);
        self.turns.iter().skip(skip).collect()
    }

    /// Iterates over every retained turn, oldest first.
    pub fn turns(&self) -> impl Iterator<Item = &ConversationTurn> {
        self.turns.iter()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contents(history: &ConversationHistory) -> Vec<String> {
        history.turns().map(|turn| turn.content.clone()).collect()
    }

    #[test]
    fn overflow_keeps_most_recent_turns_in_order() {
        let mut history = ConversationHistory::new(3);
        for i in 0..(2 * 3 + 4) {
            history.append(Role::User, format!("turn {}", i));
        }
        assert_eq!(history.len(), 6);
        let expected: Vec<String> = (4..10).map(|i| format!("turn {}", i)).collect();
        assert_eq!(contents(&history), expected);
    }

    #[test]
    fn default_capacity_is_twenty_turns() {
        let mut history = ConversationHistory::default();
        for i in 0..25 {
            let role = if i % 2 == 0 { Role::User } else { Role::Assistant };
            history.append(role, i.to_string());
        }
        assert_eq!(history.capacity(), 20);
        assert_eq!(history.len(), 20);
        assert_eq!(history.turns().next().map(|t| t.content.as_str()), Some("5"));
    }

    #[test]
    fn recent_window_returns_tail_oldest_first() {
        let mut history = ConversationHistory::default();
        for word in ["a", "b", "c", "d", "e", "f", "g", "h"] {
            history.append(Role::User, word);
        }
        let window: Vec<&str> = history
            .recent_window(6)
            .into_iter()
            .map(|turn| turn.content.as_str())
            .collect();
        assert_eq!(window, vec!["c", "d", "e", "f", "g", "h"]);
    }

    #[test]
    fn recent_window_larger_than_history_returns_everything() {
        let mut history = ConversationHistory::default();
        history.append(Role::User, "hello");
        history.append(Role::Assistant, "hi there");
        assert_eq!(history.recent_window(6).len(), 2);
    }

    #[test]
    fn clear_empties_the_buffer() {
        let mut history = ConversationHistory::default();
        history.append(Role::User, "hello");
        history.clear();
        assert!(history.is_empty());
        assert!(history.recent_window(6).is_empty());
    }

    #[test]
    fn role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Assistant).unwrap(), "\"assistant\"");
        assert_eq!(Role::User.as_str(), "user");
    }
}
