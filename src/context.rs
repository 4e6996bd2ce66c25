//! Context assembly
//!
//! Turns a triggering message plus recent conversation history into the
//! single prompt string sent to the completion service: persona preamble,
//! a bounded attributed transcript, and a terminal cue for the model to
//! continue as this account.

use crate::transport::Message;

/// Default conversation window size
pub const DEFAULT_WINDOW: usize = 6;

/// Assembles prompts from conversation windows
#[derive(Debug, Clone)]
pub struct ContextAssembler {
    window: usize,
}

impl ContextAssembler {
    /// Create an assembler with the given window bound
    #[must_use]
    pub const fn new(window: usize) -> Self {
        Self { window }
    }

    /// Window bound (maximum historical lines per prompt)
    #[must_use]
    pub const fn window(&self) -> usize {
        self.window
    }

    /// Build the prompt for one response cycle
    ///
    /// `history` is chronological, oldest first; only the most recent
    /// `window` messages contribute. Each retained message is rendered as
    /// `"<label>: <body>\n"` where the label is the contact's display name
    /// when the sender matches the triggering message's sender, and
    /// `"Me (<self_name>)"` otherwise. A message whose body already appears
    /// anywhere in the accumulated prompt is skipped, so the triggering
    /// message folded into history is not rendered twice. The substring
    /// check is intentionally coarse and can drop a short message contained
    /// in an earlier line; kept for compatibility with existing transcripts.
    ///
    /// The result always ends with `"Me (<self_name>):"` and no trailing
    /// newline.
    #[must_use]
    pub fn build_prompt(
        &self,
        persona: &str,
        self_name: &str,
        contact_name: &str,
        triggering: &Message,
        history: &[Message],
    ) -> String {
        let window_start = history.len().saturating_sub(self.window);
        let window = &history[window_start..];

        let mut prompt = format!("{persona} {contact_name}:\n");

        for item in window {
            if prompt.contains(&item.body) {
                continue;
            }

            let label = if item.sender_id == triggering.sender_id {
                contact_name.to_string()
            } else {
                format!("Me ({self_name})")
            };

            prompt.push_str(&format!("{label}: {}\n", item.body));
        }

        prompt.push_str(&format!("Me ({self_name}):"));
        prompt
    }
}

impl Default for ContextAssembler {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW)
    }
}
