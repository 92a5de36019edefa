//! Tag events consumed by the parse engine.

use crate::attrs::Attrs;

/// One opening or closing tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Open { tag: String, attrs: Attrs },
    Close { tag: String },
}

impl Event {
    /// Opening event with the given attributes.
    #[must_use]
    pub fn open<K, V>(tag: &str, attrs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self::Open {
            tag: tag.to_string(),
            attrs: Attrs::from_pairs(tag, attrs),
        }
    }

    /// Opening event without attributes.
    #[must_use]
    pub fn open_empty(tag: &str) -> Self {
        Self::Open {
            tag: tag.to_string(),
            attrs: Attrs::new(tag),
        }
    }

    #[must_use]
    pub fn close(tag: &str) -> Self {
        Self::Close {
            tag: tag.to_string(),
        }
    }

    /// Tag name of the event.
    #[must_use]
    pub fn tag(&self) -> &str {
        match self {
            Self::Open { tag, .. } | Self::Close { tag } => tag,
        }
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        matches!(self, Self::Open { .. })
    }
}
