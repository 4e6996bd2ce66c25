//! Operator setup
//!
//! Once the transport is ready, the operator picks the persona text and the
//! conversations that get automated replies. The interactive flow runs in
//! the terminal; the [`ConfigProducer`] trait keeps the gateway testable
//! without one.

use dialoguer::{Input, MultiSelect};

use crate::allowlist::AllowListEntry;
use crate::transport::ConversationInfo;
use crate::{Error, Result};

/// At most this many conversations are offered for selection
pub const MAX_CHOICES: usize = 6;

/// The operator's setup answers
#[derive(Debug, Clone)]
pub struct SetupSelection {
    /// Persona text to prepend to every prompt
    pub persona: String,

    /// Conversations enabled for automated replies
    pub entries: Vec<AllowListEntry>,
}

/// One-time producer of persona and allow-list configuration
pub trait ConfigProducer: Send + Sync {
    /// Collect the operator's selection
    ///
    /// # Errors
    ///
    /// Returns error if the selection cannot be collected.
    fn collect(
        &self,
        default_persona: &str,
        conversations: &[ConversationInfo],
    ) -> Result<SetupSelection>;
}

/// Terminal-based setup using dialoguer prompts
pub struct InteractiveSetup;

impl ConfigProducer for InteractiveSetup {
    fn collect(
        &self,
        default_persona: &str,
        conversations: &[ConversationInfo],
    ) -> Result<SetupSelection> {
        let persona: String = Input::new()
            .with_prompt("Define your AI personality (press enter for default)")
            .default(default_persona.to_string())
            .allow_empty(true)
            .interact_text()
            .map_err(|e| Error::Config(format!("persona prompt failed: {e}")))?;

        let labels: Vec<&str> = conversations.iter().map(|c| c.name.as_str()).collect();

        let selected = loop {
            let picked = MultiSelect::new()
                .with_prompt("Select contacts")
                .items(&labels)
                .interact()
                .map_err(|e| Error::Config(format!("contact prompt failed: {e}")))?;

            if picked.is_empty() {
                println!("You must choose at least one contact.");
                continue;
            }
            break picked;
        };

        let entries = selected
            .into_iter()
            .map(|i| AllowListEntry {
                conversation_id: conversations[i].id.clone(),
                display_name: conversations[i].name.clone(),
            })
            .collect();

        Ok(SetupSelection { persona, entries })
    }
}
