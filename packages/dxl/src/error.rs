//! Error types for the DXL parser.
//!
//! A single error enum covers the whole parsing subsystem. The first error
//! raised by any handler aborts the parse; no partial tree is ever returned.

use thiserror::Error;

/// Main error type for the DXL parser library.
#[derive(Debug, Error)]
pub enum DxlError {
    /// An opening or closing tag does not match what the active handler expects.
    #[error("Unexpected tag <{tag}>: expected {expected}")]
    UnexpectedTag { tag: String, expected: String },

    /// No handler is registered for an encountered tag.
    #[error("No handler for tag <{tag}>{}", .context.as_ref().map(|c| format!(" in <{c}>")).unwrap_or_default())]
    UnrecognizedTag {
        tag: String,
        context: Option<String>,
    },

    /// A required attribute is absent.
    #[error("Missing required attribute '{attribute}' on <{element}>")]
    MissingRequiredAttribute { element: String, attribute: String },

    /// An attribute is present but its value cannot be converted.
    #[error("Malformed value '{value}' for attribute '{attribute}' on <{element}>: expected {expected}")]
    MalformedAttributeValue {
        element: String,
        attribute: String,
        value: String,
        expected: &'static str,
    },

    /// One item of a list-valued attribute cannot be converted.
    #[error("Malformed item {index} '{item}' in list attribute '{attribute}' on <{element}>: expected {expected}")]
    MalformedListItem {
        element: String,
        attribute: String,
        index: usize,
        item: String,
        expected: &'static str,
    },

    /// The children harvested by a handler do not satisfy its grammar.
    #[error("Arity violation in <{element}>: {detail}")]
    ArityViolation { element: String, detail: String },

    /// The event stream ended while handlers were still active.
    #[error("Incomplete document: unclosed {}", .open.iter().map(|t| format!("<{t}>")).collect::<Vec<_>>().join(" "))]
    IncompleteDocument { open: Vec<String> },

    /// Nesting exceeded the configured depth limit.
    #[error("Document nesting exceeds the configured limit of {limit}")]
    DepthLimitExceeded { limit: usize },

    /// A cost parameter name is not part of the cost model.
    #[error("Unknown cost model parameter: {0}")]
    UnknownCostParam(String),

    /// A cost parameter was installed twice.
    #[error("Duplicate cost model parameter: {0}")]
    DuplicateCostParam(String),

    /// A cost parameter value lies outside its declared bounds.
    #[error("Cost parameter '{name}' value {value} outside bounds [{lower}, {upper}]")]
    CostParamOutOfBounds {
        name: String,
        value: f64,
        lower: f64,
        upper: f64,
    },

    /// XML parsing failed.
    #[error("XML parsing failed: {0}")]
    Xml(#[from] roxmltree::Error),

    /// Streaming XML parsing failed.
    #[error("XML parsing failed: {0}")]
    XmlStream(#[from] quick_xml::Error),

    /// A tag or attribute name is not valid UTF-8.
    #[error("Invalid UTF-8 in XML name: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML serialization error.
    #[error("YAML serialization failed: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

impl DxlError {
    /// Build an `UnexpectedTag` error.
    pub fn unexpected(tag: impl Into<String>, expected: impl Into<String>) -> Self {
        Self::UnexpectedTag {
            tag: tag.into(),
            expected: expected.into(),
        }
    }

    /// Build an `ArityViolation` error.
    pub fn arity(element: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::ArityViolation {
            element: element.into(),
            detail: detail.into(),
        }
    }

    /// Whether this error reports a broken internal invariant rather than bad input.
    #[must_use]
    pub fn is_invariant_violation(&self) -> bool {
        matches!(self, Self::ArityViolation { .. })
    }
}

/// Result type alias for parser operations.
pub type Result<T> = std::result::Result<T, DxlError>;
