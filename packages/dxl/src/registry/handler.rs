//! Node handler trait and the table-driven handler used for every kind.

use super::core::{HandlerRegistry, KindSpec, REGISTRY};
use super::grammar::{describe_count, Expect};
use super::kind::Kind;
use super::types::{Build, Harvest, ParseContext, Slots, Step};
use crate::attrs::Attrs;
use crate::error::{DxlError, Result};
use crate::token::Token;

/// A stateful builder bound to one subtree.
///
/// Handlers move through `Created -> Open -> Closed`: the first event they
/// see is their own opening tag, then any number of child openings (each
/// answered with a delegate), then their own closing tag.
pub trait NodeHandler {
    /// Tag this handler opens on.
    fn token(&self) -> Token;

    /// Handle an opening tag: the handler's own, or one of its children's.
    ///
    /// # Errors
    /// `UnexpectedTag` / `UnrecognizedTag` when the tag is not acceptable
    /// here; attribute errors from the kind's opener.
    fn accept_open(&mut self, token: Token, attrs: &Attrs, ctx: &mut ParseContext) -> Result<Step>;

    /// Handle a closing tag.
    ///
    /// # Errors
    /// `UnexpectedTag` for a foreign closing tag, `ArityViolation` when the
    /// harvested children do not satisfy the grammar.
    fn accept_close(&mut self, token: Token, ctx: &mut ParseContext) -> Result<Step>;

    /// Receive the result of a finished child.
    ///
    /// # Errors
    /// `ArityViolation` when no child was delegated.
    fn harvest(&mut self, result: Harvest) -> Result<()>;

    /// Take the finished result; `None` before a successful close.
    fn take_result(&mut self) -> Option<Harvest>;
}

enum State {
    Created,
    Open(Build),
    Closed(Option<Harvest>),
}

/// Handler driven by a kind's table entry.
pub struct KindHandler {
    kind: Kind,
    spec: &'static KindSpec,
    registry: &'static HandlerRegistry,
    state: State,
    /// Index of the grammar part the latest child was placed in.
    cursor: usize,
    /// Harvested children, one bucket per grammar part.
    slots: Vec<Vec<Harvest>>,
}

impl KindHandler {
    /// Create a handler for `kind` from the process-wide registry.
    ///
    /// # Errors
    /// `UnrecognizedTag` when the kind has no table entry.
    pub fn new(kind: Kind) -> Result<Self> {
        Self::with_registry(kind, &REGISTRY)
    }

    /// Create a handler for `kind` from a specific registry.
    ///
    /// # Errors
    /// `UnrecognizedTag` when the kind has no table entry.
    pub fn with_registry(kind: Kind, registry: &'static HandlerRegistry) -> Result<Self> {
        let spec = registry.spec(kind).ok_or_else(|| DxlError::UnrecognizedTag {
            tag: kind.tag_name().to_string(),
            context: None,
        })?;
        Ok(Self {
            kind,
            spec,
            registry,
            state: State::Created,
            cursor: 0,
            slots: spec.grammar.iter().map(|_| Vec::new()).collect(),
        })
    }

    #[must_use]
    pub fn kind(&self) -> Kind {
        self.kind
    }

    fn count(&self, pos: usize) -> usize {
        self.slots.get(pos).map_or(0, Vec::len)
    }

    /// Find the grammar part that accepts `token`, starting at the cursor.
    fn resolve_child(&self, token: Token) -> Result<(usize, Kind)> {
        for (pos, part) in self.spec.grammar.iter().enumerate().skip(self.cursor) {
            let count = self.count(pos);
            if !part.is_full(count) {
                let matched = match part.expect {
                    Expect::Kind(kind) => (kind.tag() == token).then_some(kind),
                    Expect::Any(family) => self
                        .registry
                        .kind_for(token)
                        .filter(|kind| kind.family() == family),
                };
                if let Some(kind) = matched {
                    return Ok((pos, kind));
                }
            }
            if !part.is_satisfied(count) {
                break;
            }
        }

        if self.registry.kind_for(token).is_none() && !self.names_directly(token) {
            return Err(DxlError::UnrecognizedTag {
                tag: token.as_str().to_string(),
                context: Some(self.kind.tag_name().to_string()),
            });
        }
        Err(DxlError::unexpected(token.as_str(), self.expected_here()))
    }

    fn names_directly(&self, token: Token) -> bool {
        self.spec
            .grammar
            .iter()
            .any(|part| matches!(part.expect, Expect::Kind(kind) if kind.tag() == token))
    }

    /// Describe what may come next, for error messages.
    fn expected_here(&self) -> String {
        let mut options = Vec::new();
        for (pos, part) in self.spec.grammar.iter().enumerate().skip(self.cursor) {
            let count = self.count(pos);
            if !part.is_full(count) {
                options.push(describe_count(part));
            }
            if !part.is_satisfied(count) {
                return format!("{} in <{}>", options.join(" or "), self.kind);
            }
        }
        options.push(format!("</{}>", self.kind));
        format!("{} in <{}>", options.join(" or "), self.kind)
    }

    fn check_complete(&self) -> Result<()> {
        for (pos, part) in self.spec.grammar.iter().enumerate() {
            let count = self.count(pos);
            if !part.is_satisfied(count) {
                return Err(DxlError::arity(
                    self.kind.tag_name(),
                    format!("expected {}, found {count}", describe_count(part)),
                ));
            }
        }
        Ok(())
    }
}

impl NodeHandler for KindHandler {
    fn token(&self) -> Token {
        self.kind.tag()
    }

    fn accept_open(&mut self, token: Token, attrs: &Attrs, ctx: &mut ParseContext) -> Result<Step> {
        match self.state {
            State::Created => {
                if token != self.kind.tag() {
                    return Err(DxlError::unexpected(token.as_str(), format!("<{}>", self.kind)));
                }
                let build = (self.spec.open)(attrs, ctx)?;
                self.state = State::Open(build);
                Ok(Step::Continue)
            }
            State::Open(_) => {
                let (pos, kind) = self.resolve_child(token)?;
                self.cursor = pos;
                let child = KindHandler::with_registry(kind, self.registry)?;
                ctx.stats.handlers_created += 1;
                Ok(Step::Delegate(Box::new(child)))
            }
            State::Closed(_) => Err(DxlError::unexpected(token.as_str(), "no further tags")),
        }
    }

    fn accept_close(&mut self, token: Token, ctx: &mut ParseContext) -> Result<Step> {
        if token != self.kind.tag() || !matches!(self.state, State::Open(_)) {
            return Err(DxlError::unexpected(
                format!("/{token}"),
                format!("</{}>", self.kind),
            ));
        }
        self.check_complete()?;

        let State::Open(build) = std::mem::replace(&mut self.state, State::Closed(None)) else {
            return Err(DxlError::arity(self.kind.tag_name(), "handler closed twice"));
        };
        let slots = Slots::new(self.kind.tag_name(), std::mem::take(&mut self.slots));
        let result = build(slots)?;
        if matches!(result, Harvest::Node(_)) {
            ctx.stats.nodes_built += 1;
        }
        self.state = State::Closed(Some(result));
        Ok(Step::Finished)
    }

    fn harvest(&mut self, result: Harvest) -> Result<()> {
        if !matches!(self.state, State::Open(_)) {
            return Err(DxlError::arity(
                self.kind.tag_name(),
                format!("harvested {} outside the open state", result.name()),
            ));
        }
        let cursor = self.cursor;
        let slot = self.slots.get_mut(cursor).ok_or_else(|| {
            DxlError::arity(self.kind.tag_name(), "harvested a child with no grammar part")
        })?;
        slot.push(result);
        Ok(())
    }

    fn take_result(&mut self) -> Option<Harvest> {
        match &mut self.state {
            State::Closed(result) => result.take(),
            _ => None,
        }
    }
}
