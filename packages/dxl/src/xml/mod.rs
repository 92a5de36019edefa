//! XML event sources.
//!
//! Two adapters produce the flat stream of [`Event`]s the engine consumes:
//!
//! - [`XmlEvents`] walks an already parsed roxmltree document. Convenient
//!   for text held in memory.
//! - [`ReaderEvents`] pulls events from any `BufRead` with quick-xml and never
//!   holds more than the current tag.
//!
//! Both walks are iterative, so document depth never grows the native stack.
//!
//! [`Event`]: crate::event::Event

mod stream;
mod utils;

use roxmltree::{Document, Node};

use crate::error::{DxlError, Result};
use crate::event::Event;

pub use stream::ReaderEvents;
pub use utils::{element_attrs, get_tag_name, is_dxl_element, parent_tag};

/// Pending step of the document walk.
enum Step<'a, 'input> {
    Open(Node<'a, 'input>),
    Close(Node<'a, 'input>),
}

/// Iterator of tag events over a parsed XML document.
pub struct XmlEvents<'a, 'input> {
    pending: Vec<Step<'a, 'input>>,
    strict_namespace: bool,
}

impl<'a, 'input> XmlEvents<'a, 'input> {
    /// Walk every element of `doc` in document order.
    #[must_use]
    pub fn new(doc: &'a Document<'input>, strict_namespace: bool) -> Self {
        Self {
            pending: vec![Step::Open(doc.root_element())],
            strict_namespace,
        }
    }
}

/// Convert an element's opening edge into an event.
fn open_event(node: Node<'_, '_>, strict_namespace: bool) -> Result<Event> {
    if strict_namespace && !is_dxl_element(node) {
        let tag = match node.tag_name().namespace() {
            Some(ns) => format!("{{{ns}}}{}", get_tag_name(node)),
            None => get_tag_name(node).to_string(),
        };
        return Err(DxlError::UnrecognizedTag {
            tag,
            context: parent_tag(node).map(str::to_string),
        });
    }
    Ok(Event::Open {
        tag: get_tag_name(node).to_string(),
        attrs: element_attrs(node),
    })
}

impl Iterator for XmlEvents<'_, '_> {
    type Item = Result<Event>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.pending.pop()? {
            Step::Open(node) => {
                let event = open_event(node, self.strict_namespace);
                if event.is_err() {
                    self.pending.clear();
                    return Some(event);
                }
                // Children are popped first-to-last, then the element closes.
                self.pending.push(Step::Close(node));
                self.pending.extend(
                    node.children()
                        .rev()
                        .filter(Node::is_element)
                        .map(Step::Open),
                );
                Some(event)
            }
            Step::Close(node) => Some(Ok(Event::close(get_tag_name(node)))),
        }
    }
}
