//! # Relay Gateway
//!
//! A conversational relay: watches inbound messages on a chat transport,
//! gates them by an operator-selected allow list, assembles a bounded
//! conversation context, obtains an AI completion, and dispatches the reply
//! back into the originating conversation.
//!
//! ## Architecture
//!
//! ```text
//! transport events ──▶ Gateway (lifecycle state machine)
//!                          │  Active
//!                          ▼
//!                      AllowList gate
//!                          ▼
//!                      ContextAssembler ──▶ CompletionClient
//!                          ▼                      │
//!                      ReplyDispatcher ◀──────────┘
//! ```
//!
//! The [`Transport`] trait abstracts the chat service; [`BridgeTransport`]
//! implements it over a local REST bridge. [`CompletionBackend`] abstracts
//! the text-generation service so the pipeline is testable offline.

pub mod allowlist;
pub mod bridge;
pub mod completion;
pub mod config;
pub mod context;
pub mod dispatch;
pub mod error;
pub mod gateway;
pub mod session;
pub mod setup;
pub mod transport;

pub use allowlist::{AllowList, AllowListEntry};
pub use bridge::BridgeTransport;
pub use completion::{CompletionBackend, CompletionClient};
pub use config::Config;
pub use context::ContextAssembler;
pub use dispatch::ReplyDispatcher;
pub use error::{Error, Result};
pub use gateway::{ConnectionState, Gateway, RunConfig};
pub use session::{Session, SessionStore};
pub use setup::{ConfigProducer, InteractiveSetup, SetupSelection};
pub use transport::{ConversationInfo, Direction, Message, Transport, TransportEvent};
