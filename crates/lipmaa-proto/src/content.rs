//! Author-supplied entry payload.

use serde::{Deserialize, Serialize};

/// Payload of an entry: text plus optional mention annotations.
///
/// `alt` holds alternative text for each mention, paired by position. When it
/// is present it must have exactly one string per mention.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Content {
    /// Message body.
    pub text: String,
    /// Alternative text for each mention, in mention order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub alt: Vec<String>,
    /// Mentioned resources (authors, blobs, other entries).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub mentions: Vec<String>,
}

/// Content that cannot be committed to a log.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ContentError {
    /// `alt` is present but does not pair up with `mentions`.
    #[error("{alt} alt texts for {mentions} mentions")]
    AltMismatch {
        /// Number of alt strings.
        alt: usize,
        /// Number of mentions.
        mentions: usize,
    },
}

impl Content {
    /// Plain text content without annotations.
    pub fn text(text: impl Into<String>) -> Self {
        Self { text: text.into(), ..Self::default() }
    }

    /// Add a mention with its alternative text.
    #[must_use]
    pub fn with_mention(mut self, mention: impl Into<String>, alt: impl Into<String>) -> Self {
        self.mentions.push(mention.into());
        self.alt.push(alt.into());
        self
    }

    /// Check that annotations are well formed.
    pub fn validate(&self) -> Result<(), ContentError> {
        if !self.alt.is_empty() && self.alt.len() != self.mentions.len() {
            return Err(ContentError::AltMismatch {
                alt: self.alt.len(),
                mentions: self.mentions.len(),
            });
        }
        Ok(())
    }
}
