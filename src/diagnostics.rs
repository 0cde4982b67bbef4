//! Diagnostics collector
//!
//! Anomalies found while building a report (missing curated remarks,
//! missing add/remove annotations) are not fatal on their own. They are
//! collected here in the order they are found, and a non-empty list
//! fails the report as a whole.

use serde::Serialize;
use std::fmt;
use tracing::warn;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Diagnostics {
    messages: Vec<String>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a message. The same message found again (e.g. once per
    /// version sharing a table) is kept only once.
    pub fn push(&mut self, message: impl Into<String>) {
        let message = message.into();
        if self.messages.contains(&message) {
            return;
        }
        warn!(diagnostic = %message, "schema annotation incomplete");
        self.messages.push(message);
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.messages.iter().map(String::as_str)
    }

    pub fn into_vec(self) -> Vec<String> {
        self.messages
    }

    pub fn joined(&self, separator: &str) -> String {
        self.messages.join(separator)
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.joined("\n"))
    }
}
