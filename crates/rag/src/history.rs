//! Bounded chat history for multi-turn sessions.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::Serialize;

use docqa_llm::ChatRole;

/// Turns kept before the oldest is dropped.
const MAX_TURNS: usize = 30;

#[derive(Debug, Clone, Serialize)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

/// Append-only conversation log, capped at [`MAX_TURNS`].
#[derive(Debug, Default)]
pub struct ChatHistory {
    turns: VecDeque<ChatTurn>,
}

impl ChatHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, role: ChatRole, content: String) {
        self.turns.push_back(ChatTurn {
            role,
            content,
            timestamp: Utc::now(),
        });
        while self.turns.len() > MAX_TURNS {
            self.turns.pop_front();
        }
    }

    /// The last `n` turns, oldest first.
    pub fn recent(&self, n: usize) -> Vec<&ChatTurn> {
        let skip = self.turns.len().saturating_sub(n);
        self.turns.iter().skip(skip).collect()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}
