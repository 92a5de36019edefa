//! Handler registry mapping tags to node kinds and kinds to their table entries.

use std::collections::HashMap;
use std::sync::LazyLock;

use super::config::create_dxl_registry;
use super::grammar::Part;
use super::handler::{KindHandler, NodeHandler};
use super::kind::Kind;
use super::types::OpenFn;
use crate::error::{DxlError, Result};
use crate::token::Token;

/// Process-wide registry, built on first use and never mutated.
pub static REGISTRY: LazyLock<HandlerRegistry> = LazyLock::new(create_dxl_registry);

/// Table entry of one node kind.
pub struct KindSpec {
    pub kind: Kind,
    pub grammar: Vec<Part>,
    pub open: OpenFn,
}

/// Registry of node kinds.
///
/// Context-free kinds are reachable by tag; contextual kinds only through
/// the grammar of a parent that names them.
pub struct HandlerRegistry {
    specs: HashMap<Kind, KindSpec>,
    by_tag: HashMap<Token, Kind>,
}

impl HandlerRegistry {
    /// Create a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            specs: HashMap::new(),
            by_tag: HashMap::new(),
        }
    }

    /// Register the grammar and opener of a kind.
    pub fn register(&mut self, kind: Kind, grammar: Vec<Part>, open: OpenFn) {
        if !kind.is_contextual() {
            self.by_tag.insert(kind.tag(), kind);
        }
        self.specs.insert(
            kind,
            KindSpec {
                kind,
                grammar,
                open,
            },
        );
    }

    /// Table entry of a kind.
    #[must_use]
    pub fn spec(&self, kind: Kind) -> Option<&KindSpec> {
        self.specs.get(&kind)
    }

    /// Context-free kind opened by a tag.
    #[must_use]
    pub fn kind_for(&self, token: Token) -> Option<Kind> {
        self.by_tag.get(&token).copied()
    }

    /// Check if a tag resolves without context.
    #[must_use]
    pub fn has_handler(&self, token: Token) -> bool {
        self.by_tag.contains_key(&token)
    }

    /// Tags resolvable without context, sorted by spelling.
    #[must_use]
    pub fn registered_tags(&self) -> Vec<Token> {
        let mut tags: Vec<Token> = self.by_tag.keys().copied().collect();
        tags.sort_by_key(|token| token.as_str());
        tags
    }

    /// Number of registered kinds.
    #[must_use]
    pub fn len(&self) -> usize {
        self.specs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}

impl Default for HandlerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Construct the handler for the next tag.
///
/// With an `expected` kind the tag must open exactly that kind; otherwise it
/// is resolved context-free.
///
/// # Errors
/// `UnrecognizedTag` when no kind is registered for the tag,
/// `UnexpectedTag` when it opens a different kind than expected.
pub fn get_handler(token: Token, expected: Option<Kind>) -> Result<Box<dyn NodeHandler>> {
    let kind = match expected {
        Some(kind) if kind.tag() == token => kind,
        Some(kind) => return Err(DxlError::unexpected(token.as_str(), format!("<{kind}>"))),
        None => REGISTRY.kind_for(token).ok_or_else(|| DxlError::UnrecognizedTag {
            tag: token.as_str().to_string(),
            context: None,
        })?,
    };
    Ok(Box::new(KindHandler::new(kind)?))
}
