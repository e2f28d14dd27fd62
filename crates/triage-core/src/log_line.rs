//! A single emitted line of build output.

use serde::{Deserialize, Serialize};

/// One line of a step's log.
///
/// `index` is the 0-based position within the step's log and is what
/// lookahead rules use to reach the following line.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LogLine {
    pub index: usize,
    pub message: String,
}

impl LogLine {
    pub fn new(index: usize, message: impl Into<String>) -> Self {
        Self {
            index,
            message: message.into(),
        }
    }

    /// Split raw text into indexed lines, preserving emission order.
    pub fn from_text(text: &str) -> Vec<LogLine> {
        text.lines()
            .enumerate()
            .map(|(index, message)| LogLine::new(index, message))
            .collect()
    }

    /// Build indexed lines from any ordered sequence of messages.
    pub fn from_messages<I, S>(messages: I) -> Vec<LogLine>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        messages
            .into_iter()
            .enumerate()
            .map(|(index, message)| LogLine::new(index, message))
            .collect()
    }
}
