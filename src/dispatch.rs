//! Reply dispatch
//!
//! Signals the composing indicator, sends generated text back into the
//! originating conversation, and logs the exchange. Failures here never
//! affect other conversations.

use std::sync::Arc;

use crate::transport::Transport;
use crate::{Error, Result};

/// Sends replies and composing indicators through the transport
#[derive(Clone)]
pub struct ReplyDispatcher {
    transport: Arc<dyn Transport>,
}

impl ReplyDispatcher {
    /// Create a dispatcher over a transport
    #[must_use]
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Emit the composing indicator, best-effort
    ///
    /// Indicator failures are cosmetic and are logged at debug only.
    pub async fn signal_composing(&self, conversation_id: &str) {
        if let Err(e) = self.transport.send_composing(conversation_id).await {
            tracing::debug!(conversation = conversation_id, error = %e, "composing indicator failed");
        }
    }

    /// Send the generated reply verbatim and log it
    ///
    /// # Errors
    ///
    /// Returns `Dispatch` if the send fails; no retry is attempted.
    pub async fn dispatch(&self, conversation_id: &str, self_name: &str, text: &str) -> Result<()> {
        self.transport
            .send_message(conversation_id, text)
            .await
            .map_err(|e| Error::Dispatch(e.to_string()))?;

        tracing::info!(conversation = conversation_id, "{self_name}: {text}");
        Ok(())
    }
}
