//! Narrow interface over the chat transport
//!
//! The gateway consumes the transport through this trait plus the
//! [`TransportEvent`] lifecycle stream; everything else about the underlying
//! protocol (handshake mechanics, delivery, encryption) stays behind it.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::Result;
use crate::session::Session;

/// Whether a message was received or sent by this account
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Received from a contact
    Inbound,
    /// Sent by this account
    Outbound,
}

/// A chat message, immutable once received
#[derive(Debug, Clone)]
pub struct Message {
    /// Message identifier (transport-specific)
    pub id: String,

    /// Conversation the message belongs to
    pub conversation_id: String,

    /// Sender identifier
    pub sender_id: String,

    /// Message text
    pub body: String,

    /// Inbound or outbound relative to this account
    pub direction: Direction,

    /// When the message was sent
    pub timestamp: DateTime<Utc>,
}

/// A known conversation, as presented during operator setup
#[derive(Debug, Clone)]
pub struct ConversationInfo {
    /// Stable conversation identifier
    pub id: String,

    /// Human-readable name
    pub name: String,
}

/// Lifecycle and message events emitted by the transport
#[derive(Debug)]
pub enum TransportEvent {
    /// Pairing challenge to display to the operator (opaque payload)
    PairingChallenge(String),

    /// Handshake accepted; carries the opaque session blob to persist
    HandshakeAccepted(Session),

    /// Handshake rejected with a reason
    HandshakeRejected(String),

    /// Transport is usable; conversations can be listed
    Ready,

    /// An inbound message arrived
    Message(Message),
}

/// Operations the gateway needs from a chat transport
#[async_trait]
pub trait Transport: Send + Sync {
    /// Fetch the most recent messages of a conversation, oldest first
    async fn fetch_recent(&self, conversation_id: &str, limit: usize) -> Result<Vec<Message>>;

    /// Signal that a reply is being composed (typing indicator)
    async fn send_composing(&self, conversation_id: &str) -> Result<()>;

    /// Send a text message into a conversation
    async fn send_message(&self, conversation_id: &str, text: &str) -> Result<()>;

    /// Display name of this account
    async fn self_display_name(&self) -> Result<String>;

    /// Display name for a sender
    async fn contact_display_name(&self, sender_id: &str) -> Result<String>;

    /// List known conversations, most recent first
    async fn list_conversations(&self) -> Result<Vec<ConversationInfo>>;
}
