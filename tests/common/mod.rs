//! Shared test doubles for gateway integration tests

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;

use relay_gateway::{
    AllowListEntry, CompletionBackend, ConfigProducer, ConversationInfo, Direction, Error,
    Message, Result, SetupSelection, Transport,
};

/// Build an inbound message for tests
pub fn inbound(id: &str, conversation: &str, sender: &str, body: &str) -> Message {
    Message {
        id: id.to_string(),
        conversation_id: conversation.to_string(),
        sender_id: sender.to_string(),
        body: body.to_string(),
        direction: Direction::Inbound,
        timestamp: Utc::now(),
    }
}

/// Build an outbound (own) message for tests
pub fn outbound(id: &str, conversation: &str, body: &str) -> Message {
    Message {
        id: id.to_string(),
        conversation_id: conversation.to_string(),
        sender_id: "me".to_string(),
        body: body.to_string(),
        direction: Direction::Outbound,
        timestamp: Utc::now(),
    }
}

/// In-memory transport that records every operation
#[derive(Default)]
pub struct MockTransport {
    pub self_name: String,
    pub contacts: HashMap<String, String>,
    pub conversations: Vec<ConversationInfo>,
    pub history: HashMap<String, Vec<Message>>,
    pub sent: Mutex<Vec<(String, String)>>,
    pub typing: Mutex<Vec<String>>,
    pub fetches: Mutex<Vec<String>>,
}

impl MockTransport {
    pub fn sent_messages(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap().clone()
    }

    pub fn typing_signals(&self) -> Vec<String> {
        self.typing.lock().unwrap().clone()
    }

    pub fn fetch_calls(&self) -> Vec<String> {
        self.fetches.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn fetch_recent(&self, conversation_id: &str, _limit: usize) -> Result<Vec<Message>> {
        self.fetches
            .lock()
            .unwrap()
            .push(conversation_id.to_string());
        Ok(self
            .history
            .get(conversation_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn send_composing(&self, conversation_id: &str) -> Result<()> {
        self.typing
            .lock()
            .unwrap()
            .push(conversation_id.to_string());
        Ok(())
    }

    async fn send_message(&self, conversation_id: &str, text: &str) -> Result<()> {
        self.sent
            .lock()
            .unwrap()
            .push((conversation_id.to_string(), text.to_string()));
        Ok(())
    }

    async fn self_display_name(&self) -> Result<String> {
        Ok(self.self_name.clone())
    }

    async fn contact_display_name(&self, sender_id: &str) -> Result<String> {
        self.contacts
            .get(sender_id)
            .cloned()
            .ok_or_else(|| Error::Transport(format!("unknown contact {sender_id}")))
    }

    async fn list_conversations(&self) -> Result<Vec<ConversationInfo>> {
        Ok(self.conversations.clone())
    }
}

/// Completion backend that returns a fixed reply and records prompts
///
/// Fails when the prompt contains `fail_if_contains`, to exercise
/// per-conversation failure containment.
#[derive(Default)]
pub struct ScriptedCompletion {
    pub reply: String,
    pub fail_if_contains: Option<String>,
    pub prompts: Mutex<Vec<String>>,
}

impl ScriptedCompletion {
    pub fn new(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            ..Self::default()
        }
    }

    pub fn seen_prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionBackend for ScriptedCompletion {
    async fn complete(&self, prompt: &str) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());

        if let Some(marker) = &self.fail_if_contains {
            if prompt.contains(marker.as_str()) {
                return Err(Error::Completion("scripted failure".to_string()));
            }
        }

        Ok(self.reply.clone())
    }
}

/// Non-interactive setup producer with canned answers
pub struct ScriptedSetup {
    pub persona: String,
    pub entries: Vec<AllowListEntry>,
}

impl ConfigProducer for ScriptedSetup {
    fn collect(
        &self,
        _default_persona: &str,
        _conversations: &[ConversationInfo],
    ) -> Result<SetupSelection> {
        Ok(SetupSelection {
            persona: self.persona.clone(),
            entries: self.entries.clone(),
        })
    }
}
