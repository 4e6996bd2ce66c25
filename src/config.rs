//! Configuration for the relay gateway
//!
//! Everything comes from the environment (a `.env` file is loaded by the
//! binary before this runs). The completion API key is the only required
//! value; the process refuses to start without it.

use std::path::PathBuf;

use crate::completion::DEFAULT_MODEL;
use crate::context::DEFAULT_WINDOW;
use crate::session::SessionStore;
use crate::{Error, Result};

/// Default bound on concurrently in-flight completion cycles
const DEFAULT_MAX_INFLIGHT: usize = 4;

/// Relay gateway configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Completion service API key (required)
    pub api_key: String,

    /// Default persona text; the operator can override it during setup
    pub persona: String,

    /// Completion model identifier
    pub model: String,

    /// Conversation window size
    pub window: usize,

    /// Path to the session blob
    pub session_path: PathBuf,

    /// Bound on concurrently in-flight completion cycles
    pub max_inflight: usize,
}

impl Config {
    /// Load configuration from the environment
    ///
    /// # Errors
    ///
    /// Returns `Config` if `OPENAI_API_KEY` is missing or empty.
    pub fn load() -> Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .ok()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| {
                Error::Config(
                    "OPENAI_API_KEY is required; set it in the environment or an .env file"
                        .to_string(),
                )
            })?;

        // DEFAULT_PROMPT is the legacy name, kept for existing deployments.
        let persona = std::env::var("RELAY_PERSONA")
            .or_else(|_| std::env::var("DEFAULT_PROMPT"))
            .unwrap_or_default();

        let model = std::env::var("RELAY_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());

        let window = std::env::var("RELAY_WINDOW")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_WINDOW);

        let session_path = std::env::var("RELAY_SESSION_FILE")
            .map_or_else(|_| SessionStore::default_path(), PathBuf::from);

        let max_inflight = std::env::var("RELAY_MAX_INFLIGHT")
            .ok()
            .and_then(|s| s.parse().ok())
            .filter(|&n: &usize| n > 0)
            .unwrap_or(DEFAULT_MAX_INFLIGHT);

        Ok(Self {
            api_key,
            persona,
            model,
            window,
            session_path,
            max_inflight,
        })
    }
}
