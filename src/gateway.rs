//! Gateway - the event-driven orchestrator
//!
//! Sequences the transport connection lifecycle and, once active, drives the
//! response pipeline for every inbound message: allow-list gate, context
//! assembly, completion, dispatch.

use std::sync::Arc;

use tokio::sync::{Semaphore, mpsc};

use crate::allowlist::AllowList;
use crate::completion::CompletionBackend;
use crate::config::Config;
use crate::context::ContextAssembler;
use crate::dispatch::ReplyDispatcher;
use crate::session::SessionStore;
use crate::setup::{ConfigProducer, MAX_CHOICES};
use crate::transport::{Message, Transport, TransportEvent};
use crate::{Error, Result};

/// Connection lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Not yet connected to the transport
    Disconnected,
    /// A pairing challenge has been displayed to the operator
    PairingRequired,
    /// Handshake accepted, session being persisted
    Authenticating,
    /// Waiting for the operator's persona and contact selection
    ConfigPending,
    /// Processing inbound messages
    Active,
    /// Handshake rejected; a fresh process start retries
    AuthFailed,
    /// Termination signal received
    ShuttingDown,
}

/// Immutable per-run configuration, captured at the `Active` transition
///
/// Shared read-only across concurrent message cycles; never mutated once the
/// gateway is active.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Persona text prepended to every prompt
    pub persona: String,

    /// Conversations enabled for automated replies
    pub allow_list: AllowList,

    /// Prompt assembler with the configured window bound
    pub assembler: ContextAssembler,
}

/// The relay gateway - orchestrates lifecycle events and message cycles
pub struct Gateway {
    transport: Arc<dyn Transport>,
    completion: Arc<dyn CompletionBackend>,
    session_store: SessionStore,
    producer: Arc<dyn ConfigProducer>,
    default_persona: String,
    window: usize,
    gate: Arc<Semaphore>,
    state: ConnectionState,
    run: Option<Arc<RunConfig>>,
}

impl Gateway {
    /// Create a new gateway
    #[must_use]
    pub fn new(
        transport: Arc<dyn Transport>,
        completion: Arc<dyn CompletionBackend>,
        session_store: SessionStore,
        producer: Arc<dyn ConfigProducer>,
        config: &Config,
    ) -> Self {
        Self {
            transport,
            completion,
            session_store,
            producer,
            default_persona: config.persona.clone(),
            window: config.window,
            gate: Arc::new(Semaphore::new(config.max_inflight)),
            state: ConnectionState::Disconnected,
            run: None,
        }
    }

    /// Current lifecycle state
    #[must_use]
    pub const fn state(&self) -> ConnectionState {
        self.state
    }

    /// The configuration captured at the `Active` transition, if reached
    #[must_use]
    pub fn run_config(&self) -> Option<&RunConfig> {
        self.run.as_deref()
    }

    /// Run until the event stream closes or a termination signal arrives
    ///
    /// # Errors
    ///
    /// Currently infallible at this level; per-cycle errors are contained
    /// and logged.
    pub async fn run(mut self, mut events: mpsc::Receiver<TransportEvent>) -> Result<()> {
        tracing::info!(window = self.window, "gateway running");

        loop {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {
                    self.state = ConnectionState::ShuttingDown;
                    tracing::info!("shutdown requested");
                    break;
                }
                event = events.recv() => match event {
                    Some(event) => self.handle_event(event).await,
                    None => {
                        self.state = ConnectionState::ShuttingDown;
                        tracing::info!("transport event stream closed");
                        break;
                    }
                }
            }
        }

        Ok(())
    }

    /// Apply one transport event to the state machine
    pub async fn handle_event(&mut self, event: TransportEvent) {
        match event {
            TransportEvent::PairingChallenge(challenge) => self.on_pairing_challenge(&challenge),
            TransportEvent::HandshakeAccepted(session) => self.on_handshake_accepted(&session),
            TransportEvent::HandshakeRejected(reason) => self.on_handshake_rejected(&reason),
            TransportEvent::Ready => self.on_ready().await,
            TransportEvent::Message(msg) => self.on_message(msg),
        }
    }

    fn on_pairing_challenge(&mut self, challenge: &str) {
        match self.state {
            ConnectionState::Disconnected | ConnectionState::PairingRequired => {
                println!("\n1. Open the messaging app on your phone");
                println!("2. Open the linked-devices screen");
                println!("3. Enter or scan the code below\n");
                println!("{challenge}\n");
                self.state = ConnectionState::PairingRequired;
            }
            _ => {
                tracing::debug!(state = ?self.state, "ignoring pairing challenge");
            }
        }
    }

    fn on_handshake_accepted(&mut self, session: &crate::session::Session) {
        match self.state {
            ConnectionState::Disconnected | ConnectionState::PairingRequired => {
                self.state = ConnectionState::Authenticating;
                tracing::info!("transport authentication successful");

                // A failed save degrades the session to this run only.
                if let Err(e) = self.session_store.save(session) {
                    tracing::warn!(
                        error = %e,
                        "session persist failed; pairing will be required on next start"
                    );
                }

                self.state = ConnectionState::ConfigPending;
            }
            _ => {
                tracing::debug!(state = ?self.state, "ignoring handshake acceptance");
            }
        }
    }

    fn on_handshake_rejected(&mut self, reason: &str) {
        match self.state {
            ConnectionState::Disconnected
            | ConnectionState::PairingRequired
            | ConnectionState::Authenticating => {
                tracing::error!(reason, "transport authentication failed");
                self.state = ConnectionState::AuthFailed;
            }
            _ => {
                tracing::debug!(state = ?self.state, "ignoring handshake rejection");
            }
        }
    }

    async fn on_ready(&mut self) {
        if self.state != ConnectionState::ConfigPending {
            tracing::debug!(state = ?self.state, "ignoring ready event");
            return;
        }

        let conversations = match self.transport.list_conversations().await {
            Ok(c) => c,
            Err(e) => {
                tracing::error!(error = %e, "failed to list conversations");
                return;
            }
        };

        let choices: Vec<_> = conversations.into_iter().take(MAX_CHOICES).collect();

        let selection = match self.producer.collect(&self.default_persona, &choices) {
            Ok(s) => s,
            Err(e) => {
                tracing::error!(error = %e, "setup failed");
                return;
            }
        };

        let allow_list = match AllowList::configure(selection.entries) {
            Ok(list) => list,
            Err(e) => {
                tracing::warn!(error = %e, "selection rejected, still awaiting configuration");
                return;
            }
        };

        tracing::info!(conversations = allow_list.len(), "AI activated, listening for messages");

        self.run = Some(Arc::new(RunConfig {
            persona: selection.persona,
            allow_list,
            assembler: ContextAssembler::new(self.window),
        }));
        self.state = ConnectionState::Active;
    }

    /// Gate and spawn a message cycle; cycles for different conversations
    /// interleave at their await points
    fn on_message(&self, msg: Message) {
        if self.state != ConnectionState::Active {
            tracing::debug!(state = ?self.state, "ignoring message outside active state");
            return;
        }

        let Some(run) = &self.run else { return };

        // Gate before any work: no history fetch or API call for
        // non-enabled conversations.
        if !run.allow_list.is_enabled(&msg.conversation_id) {
            tracing::trace!(conversation = %msg.conversation_id, "conversation not enabled");
            return;
        }

        let transport = Arc::clone(&self.transport);
        let completion = Arc::clone(&self.completion);
        let run = Arc::clone(run);
        let gate = Arc::clone(&self.gate);

        tokio::spawn(async move {
            let Ok(_permit) = gate.acquire_owned().await else {
                return;
            };

            if let Err(e) = run_cycle(transport, completion, &run, &msg).await {
                tracing::error!(
                    conversation = %msg.conversation_id,
                    error = %e,
                    "message cycle abandoned"
                );
            }
        });
    }

    /// Run one message cycle inline
    ///
    /// Same gating as the event path, but awaitable; messages outside the
    /// `Active` state or for non-enabled conversations are silently ignored.
    ///
    /// # Errors
    ///
    /// Returns the cycle's `HistoryFetch`, `Completion`, or `Dispatch`
    /// error; none of these affect the gateway state.
    pub async fn process_message(&self, msg: &Message) -> Result<()> {
        if self.state != ConnectionState::Active {
            return Ok(());
        }

        let Some(run) = &self.run else {
            return Ok(());
        };

        if !run.allow_list.is_enabled(&msg.conversation_id) {
            return Ok(());
        }

        let Ok(_permit) = self.gate.acquire().await else {
            return Ok(());
        };

        run_cycle(
            Arc::clone(&self.transport),
            Arc::clone(&self.completion),
            run,
            msg,
        )
        .await
    }
}

/// One full response cycle: names, history, prompt, completion, dispatch
async fn run_cycle(
    transport: Arc<dyn Transport>,
    completion: Arc<dyn CompletionBackend>,
    run: &RunConfig,
    msg: &Message,
) -> Result<()> {
    let self_name_full = transport
        .self_display_name()
        .await
        .map_err(|e| Error::Transport(e.to_string()))?;
    let self_name = first_word(&self_name_full);

    let contact_name = match transport.contact_display_name(&msg.sender_id).await {
        Ok(name) => name,
        Err(e) => {
            tracing::debug!(error = %e, "contact name lookup failed, using allow-list entry");
            run.allow_list
                .display_name(&msg.conversation_id)
                .unwrap_or(&msg.sender_id)
                .to_string()
        }
    };

    tracing::info!(conversation = %msg.conversation_id, "{contact_name}: {}", msg.body);

    let history = transport
        .fetch_recent(&msg.conversation_id, run.assembler.window())
        .await
        .map_err(|e| Error::HistoryFetch(e.to_string()))?;

    let prompt = run
        .assembler
        .build_prompt(&run.persona, self_name, &contact_name, msg, &history);

    let dispatcher = ReplyDispatcher::new(transport);
    dispatcher.signal_composing(&msg.conversation_id).await;

    let reply = completion.complete(&prompt).await?;

    dispatcher
        .dispatch(&msg.conversation_id, self_name, &reply)
        .await
}

/// First whitespace-separated word of a display name
fn first_word(name: &str) -> &str {
    name.split_whitespace().next().unwrap_or(name)
}
