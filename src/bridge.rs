//! REST bridge transport adapter
//!
//! Talks to a locally running web-client bridge that owns the actual chat
//! connection (handshake, pairing, delivery) and exposes it over HTTP.
//! Lifecycle events are polled from the bridge and translated into
//! [`TransportEvent`]s; operations are plain JSON endpoints.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use tokio::sync::mpsc;

use crate::session::Session;
use crate::transport::{ConversationInfo, Direction, Message, Transport, TransportEvent};
use crate::{Error, Result};

/// Default event poll interval
const POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Transport adapter over a chat-bridge REST API
#[derive(Clone)]
pub struct BridgeTransport {
    base_url: String,
    client: Client,
}

impl BridgeTransport {
    /// Create an adapter for a bridge at `base_url`
    #[must_use]
    pub fn new(base_url: String) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: Client::new(),
        }
    }

    /// Restore a stored session on the bridge, then start polling events
    ///
    /// Returns the receiver the gateway consumes. The polling task runs for
    /// the life of the process; poll errors are logged and retried.
    pub fn start(&self, session: Option<Session>) -> mpsc::Receiver<TransportEvent> {
        let (tx, rx) = mpsc::channel(100);
        let poller = self.clone();

        tokio::spawn(async move {
            if let Some(session) = session {
                if let Err(e) = poller.restore_session(&session).await {
                    tracing::warn!(error = %e, "session restore failed, bridge will re-pair");
                }
            }

            loop {
                match poller.poll_events().await {
                    Ok(events) => {
                        for event in events {
                            if tx.send(event.into_event()).await.is_err() {
                                return;
                            }
                        }
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "bridge poll error");
                    }
                }

                tokio::time::sleep(POLL_INTERVAL).await;
            }
        });

        rx
    }

    /// Hand a stored session blob to the bridge for resumption
    async fn restore_session(&self, session: &Session) -> Result<()> {
        let url = format!("{}/v1/session/restore", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(session)
            .send()
            .await
            .map_err(|e| Error::Transport(format!("session restore: {e}")))?;

        check_status(response).await.map(|_| ())
    }

    /// Drain pending lifecycle and message events from the bridge
    async fn poll_events(&self) -> Result<Vec<BridgeEvent>> {
        let url = format!("{}/v1/events", self.base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::Transport(format!("event poll: {e}")))?;

        let response = check_status(response).await?;
        response
            .json()
            .await
            .map_err(|e| Error::Transport(format!("event parse: {e}")))
    }
}

/// Fail on non-success statuses, including the response body in the error
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
    if response.status().is_success() {
        return Ok(response);
    }

    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    Err(Error::Transport(format!("bridge error: {status} - {body}")))
}

#[async_trait]
impl Transport for BridgeTransport {
    async fn fetch_recent(&self, conversation_id: &str, limit: usize) -> Result<Vec<Message>> {
        let url = format!(
            "{}/v1/chats/{conversation_id}/messages?limit={limit}",
            self.base_url
        );
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::Transport(format!("history fetch: {e}")))?;

        let response = check_status(response).await?;
        let messages: Vec<BridgeMessage> = response
            .json()
            .await
            .map_err(|e| Error::Transport(format!("history parse: {e}")))?;

        // Bridge returns oldest first, matching window order.
        Ok(messages.into_iter().map(BridgeMessage::into_message).collect())
    }

    async fn send_composing(&self, conversation_id: &str) -> Result<()> {
        let url = format!("{}/v1/chats/{conversation_id}/typing", self.base_url);
        let response = self
            .client
            .post(&url)
            .send()
            .await
            .map_err(|e| Error::Transport(format!("typing indicator: {e}")))?;

        check_status(response).await.map(|_| ())
    }

    async fn send_message(&self, conversation_id: &str, text: &str) -> Result<()> {
        let url = format!("{}/v1/chats/{conversation_id}/messages", self.base_url);
        let body = serde_json::json!({ "body": text });

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::Transport(format!("send: {e}")))?;

        check_status(response).await.map(|_| ())
    }

    async fn self_display_name(&self) -> Result<String> {
        let url = format!("{}/v1/self", self.base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::Transport(format!("self lookup: {e}")))?;

        let response = check_status(response).await?;
        let profile: BridgeProfile = response
            .json()
            .await
            .map_err(|e| Error::Transport(format!("self parse: {e}")))?;

        Ok(profile.display_name)
    }

    async fn contact_display_name(&self, sender_id: &str) -> Result<String> {
        let url = format!("{}/v1/contacts/{sender_id}", self.base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::Transport(format!("contact lookup: {e}")))?;

        let response = check_status(response).await?;
        let contact: BridgeContact = response
            .json()
            .await
            .map_err(|e| Error::Transport(format!("contact parse: {e}")))?;

        Ok(contact.short_name.unwrap_or(contact.id))
    }

    async fn list_conversations(&self) -> Result<Vec<ConversationInfo>> {
        let url = format!("{}/v1/chats", self.base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::Transport(format!("chat list: {e}")))?;

        let response = check_status(response).await?;
        let chats: Vec<BridgeChat> = response
            .json()
            .await
            .map_err(|e| Error::Transport(format!("chat list parse: {e}")))?;

        Ok(chats
            .into_iter()
            .map(|c| ConversationInfo {
                id: c.id,
                name: c.name,
            })
            .collect())
    }
}

/// Lifecycle or message event from the bridge event queue
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum BridgeEvent {
    PairingChallenge {
        challenge: String,
    },
    Authenticated {
        session: serde_json::Value,
    },
    AuthFailure {
        reason: String,
    },
    Ready,
    Message {
        #[serde(flatten)]
        message: BridgeMessage,
    },
}

impl BridgeEvent {
    fn into_event(self) -> TransportEvent {
        match self {
            Self::PairingChallenge { challenge } => TransportEvent::PairingChallenge(challenge),
            Self::Authenticated { session } => TransportEvent::HandshakeAccepted(session),
            Self::AuthFailure { reason } => TransportEvent::HandshakeRejected(reason),
            Self::Ready => TransportEvent::Ready,
            Self::Message { message } => TransportEvent::Message(message.into_message()),
        }
    }
}

/// A chat message as the bridge reports it
#[derive(Debug, Deserialize)]
struct BridgeMessage {
    id: String,
    chat_id: String,
    sender_id: String,
    body: String,
    #[serde(default)]
    from_me: bool,
    /// Unix timestamp in seconds
    timestamp: i64,
}

impl BridgeMessage {
    fn into_message(self) -> Message {
        Message {
            id: self.id,
            conversation_id: self.chat_id,
            sender_id: self.sender_id,
            body: self.body,
            direction: if self.from_me {
                Direction::Outbound
            } else {
                Direction::Inbound
            },
            timestamp: DateTime::from_timestamp(self.timestamp, 0).unwrap_or_else(Utc::now),
        }
    }
}

/// Account profile from `/v1/self`
#[derive(Debug, Deserialize)]
struct BridgeProfile {
    display_name: String,
}

/// Contact record from `/v1/contacts/{id}`
#[derive(Debug, Deserialize)]
struct BridgeContact {
    id: String,
    short_name: Option<String>,
}

/// Chat record from `/v1/chats`
#[derive(Debug, Deserialize)]
struct BridgeChat {
    id: String,
    name: String,
}
