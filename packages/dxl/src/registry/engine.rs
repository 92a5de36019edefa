//! Handler stack and the parse engine that feeds it.

use super::handler::{KindHandler, NodeHandler};
use super::kind::Kind;
use super::types::{Harvest, ParseContext, ParseStats, Step};
use crate::ast::{Document, Node};
use crate::config::ParseOptions;
use crate::error::{DxlError, Result};
use crate::event::Event;
use crate::token::Token;

/// Push/pop stack of active handlers; the top handler receives events.
#[derive(Default)]
pub struct HandlerStack {
    handlers: Vec<Box<dyn NodeHandler>>,
}

impl HandlerStack {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a handler; it becomes the event target.
    pub fn activate(&mut self, handler: Box<dyn NodeHandler>) {
        tracing::trace!(tag = %handler.token(), depth = self.handlers.len() + 1, "activate");
        self.handlers.push(handler);
    }

    /// Pop the active handler.
    ///
    /// # Panics
    /// When the stack is empty; the engine never deactivates more handlers
    /// than it activated.
    #[allow(clippy::panic)] // Stack misuse is a programming error
    pub fn deactivate(&mut self) -> Box<dyn NodeHandler> {
        let Some(handler) = self.handlers.pop() else {
            panic!("deactivate called on an empty handler stack");
        };
        tracing::trace!(tag = %handler.token(), depth = self.handlers.len(), "deactivate");
        handler
    }

    /// Forward an event to the active handler.
    ///
    /// # Panics
    /// When the stack is empty.
    ///
    /// # Errors
    /// Whatever the active handler reports.
    #[allow(clippy::panic)] // Stack misuse is a programming error
    pub fn dispatch(&mut self, token: Token, event: &Event, ctx: &mut ParseContext) -> Result<Step> {
        let Some(handler) = self.handlers.last_mut() else {
            panic!("dispatch of <{token}> on an empty handler stack");
        };
        match event {
            Event::Open { attrs, .. } => handler.accept_open(token, attrs, ctx),
            Event::Close { .. } => handler.accept_close(token, ctx),
        }
    }

    /// The active handler, if any.
    pub fn top_mut(&mut self) -> Option<&mut Box<dyn NodeHandler>> {
        self.handlers.last_mut()
    }

    /// Tag of the active handler, if any.
    #[must_use]
    pub fn top_token(&self) -> Option<Token> {
        self.handlers.last().map(|handler| handler.token())
    }

    #[must_use]
    pub fn depth(&self) -> usize {
        self.handlers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Tags of all active handlers, bottom first.
    #[must_use]
    pub fn open_tags(&self) -> Vec<String> {
        self.handlers
            .iter()
            .map(|handler| handler.token().as_str().to_string())
            .collect()
    }
}

/// Engine that drives a handler stack with tag events.
///
/// The engine pre-activates the handler of the expected root kind, feeds it
/// every event, and pops handlers as they finish, handing each result to the
/// handler below. When the root handler finishes, its result is the result of
/// the parse.
pub struct ParseEngine {
    stack: HandlerStack,
    ctx: ParseContext,
    root: Kind,
    result: Option<Harvest>,
}

impl ParseEngine {
    /// Create an engine expecting a `DXLMessage` document.
    ///
    /// # Errors
    /// Only when the registry has no entry for the root kind.
    pub fn new(options: ParseOptions) -> Result<Self> {
        Self::with_root(Kind::DxlMessage, options)
    }

    /// Create an engine expecting a document rooted at `root`, e.g. a bare
    /// `Plan` or a bare scalar expression.
    ///
    /// # Errors
    /// Only when the registry has no entry for the root kind.
    pub fn with_root(root: Kind, options: ParseOptions) -> Result<Self> {
        let mut ctx = ParseContext::new(options);
        let mut stack = HandlerStack::new();
        stack.activate(Box::new(KindHandler::new(root)?));
        ctx.stats.handlers_created += 1;
        Ok(Self {
            stack,
            ctx,
            root,
            result: None,
        })
    }

    /// Statistics of the parse so far.
    #[must_use]
    pub fn stats(&self) -> ParseStats {
        self.ctx.stats
    }

    /// Whether the root handler has finished.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.result.is_some()
    }

    /// Feed one event.
    ///
    /// # Errors
    /// The first error raised by any handler, `UnrecognizedTag` for names
    /// outside the vocabulary, `UnexpectedTag` for events after the root
    /// closed, and `DepthLimitExceeded`.
    pub fn feed(&mut self, event: &Event) -> Result<()> {
        self.ctx.stats.events += 1;

        if self.result.is_some() {
            return Err(DxlError::unexpected(event.tag(), "end of document"));
        }

        let token = Token::lookup(event.tag()).ok_or_else(|| DxlError::UnrecognizedTag {
            tag: event.tag().to_string(),
            context: self.stack.top_token().map(|t| t.as_str().to_string()),
        })?;

        match event {
            Event::Open { .. } => {
                self.ctx.enter()?;
                let mut step = self.stack.dispatch(token, event, &mut self.ctx)?;
                loop {
                    match step {
                        Step::Delegate(child) => {
                            self.stack.activate(child);
                            step = self.stack.dispatch(token, event, &mut self.ctx)?;
                        }
                        Step::Finished => {
                            self.complete()?;
                            break;
                        }
                        Step::Continue => break,
                    }
                }
            }
            Event::Close { .. } => {
                let step = self.stack.dispatch(token, event, &mut self.ctx)?;
                self.ctx.leave();
                if let Step::Finished = step {
                    self.complete()?;
                }
            }
        }
        Ok(())
    }

    /// Pop the finished handler and pass its result down the stack.
    fn complete(&mut self) -> Result<()> {
        let mut handler = self.stack.deactivate();
        let tag = handler.token();
        let result = handler
            .take_result()
            .ok_or_else(|| DxlError::arity(tag.as_str(), "handler finished without a result"))?;

        match self.stack.top_mut() {
            Some(parent) => parent.harvest(result),
            None => {
                tracing::debug!(
                    root = %tag,
                    events = self.ctx.stats.events,
                    nodes = self.ctx.stats.nodes_built,
                    "Document complete"
                );
                self.result = Some(result);
                Ok(())
            }
        }
    }

    /// Feed every event of an iterator.
    ///
    /// # Errors
    /// The first error of [`feed`](Self::feed).
    pub fn feed_all<I>(&mut self, events: I) -> Result<()>
    where
        I: IntoIterator<Item = Result<Event>>,
    {
        for event in events {
            self.feed(&event?)?;
        }
        Ok(())
    }

    /// Return the root result of a complete document.
    ///
    /// # Errors
    /// `IncompleteDocument` when handlers are still active.
    pub fn finish_result(self) -> Result<Harvest> {
        self.result.ok_or_else(|| DxlError::IncompleteDocument {
            open: self.stack.open_tags(),
        })
    }

    /// Return the document produced by a `DXLMessage` or section root.
    ///
    /// # Errors
    /// `IncompleteDocument`, or `ArityViolation` when the root kind does not
    /// produce a document.
    pub fn finish(self) -> Result<Document> {
        let root = self.root;
        match self.finish_result()? {
            Harvest::Document(document) => Ok(document),
            other => Err(DxlError::arity(
                root.tag_name(),
                format!("root produced {}, not a document", other.name()),
            )),
        }
    }

    /// Return the operator tree produced by an operator root.
    ///
    /// # Errors
    /// `IncompleteDocument`, or `ArityViolation` when the root kind does not
    /// produce a node.
    pub fn finish_node(self) -> Result<Node> {
        let root = self.root;
        match self.finish_result()? {
            Harvest::Node(node) => Ok(node),
            other => Err(DxlError::arity(
                root.tag_name(),
                format!("root produced {}, not a node", other.name()),
            )),
        }
    }
}
