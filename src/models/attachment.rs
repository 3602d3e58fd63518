//! Attachment reference encoding.

/// Prefix distinguishing literal text payloads from platform file ids.
const TEXT_PREFIX: &str = "text:";

/// An opaque attachment reference stored against a task.
///
/// Either a Telegram file id or a literal text payload; the stored string
/// form carries a `text:` prefix for the latter so replay code can branch
/// on how to re-send it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttachmentRef {
    /// Telegram file identifier, re-sent as a document.
    File(String),
    /// Literal text captured from a plain message, re-sent as a message.
    Text(String),
}

impl AttachmentRef {
    /// Decode a stored reference string.
    #[must_use]
    pub fn decode(raw: &str) -> Self {
        raw.strip_prefix(TEXT_PREFIX).map_or_else(
            || Self::File(raw.to_owned()),
            |text| Self::Text(text.to_owned()),
        )
    }

    /// Encode into the stored string form.
    #[must_use]
    pub fn encode(&self) -> String {
        match self {
            Self::File(id) => id.clone(),
            Self::Text(text) => format!("{TEXT_PREFIX}{text}"),
        }
    }

    /// Short human-readable label for notifications.
    #[must_use]
    pub fn label(&self) -> String {
        match self {
            Self::File(_) => "a file".to_owned(),
            Self::Text(text) => {
                let mut snippet: String = text.chars().take(40).collect();
                if text.chars().count() > 40 {
                    snippet.push('\u{2026}');
                }
                format!("\u{201c}{snippet}\u{201d}")
            }
        }
    }
}
