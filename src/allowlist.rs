//! Conversation allow-list
//!
//! Only conversations the operator selected during setup get automated
//! replies. The set is built once after the transport is ready and is
//! immutable for the rest of the run.

use crate::{Error, Result};

/// A conversation eligible for automated replies
#[derive(Debug, Clone)]
pub struct AllowListEntry {
    /// Stable conversation identifier
    pub conversation_id: String,

    /// Display name shown in logs and prompt attribution
    pub display_name: String,
}

/// Immutable set of AI-enabled conversations
#[derive(Debug, Clone)]
pub struct AllowList {
    entries: Vec<AllowListEntry>,
}

impl AllowList {
    /// Build the allow-list from the operator's selection
    ///
    /// # Errors
    ///
    /// Returns `Config` if the selection is empty; at least one conversation
    /// must be enabled.
    pub fn configure(entries: Vec<AllowListEntry>) -> Result<Self> {
        if entries.is_empty() {
            return Err(Error::Config(
                "at least one conversation must be selected".to_string(),
            ));
        }

        Ok(Self { entries })
    }

    /// Whether automated replies are enabled for a conversation
    #[must_use]
    pub fn is_enabled(&self, conversation_id: &str) -> bool {
        self.entries
            .iter()
            .any(|e| e.conversation_id == conversation_id)
    }

    /// Display name for an enabled conversation
    #[must_use]
    pub fn display_name(&self, conversation_id: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.conversation_id == conversation_id)
            .map(|e| e.display_name.as_str())
    }

    /// Number of enabled conversations
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the list is empty (never true after `configure`)
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
