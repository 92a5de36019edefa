//! Streaming event source over quick-xml.

use std::io::BufRead;

use quick_xml::events::{BytesStart, Event as XmlEvent};
use quick_xml::name::{Namespace, ResolveResult};
use quick_xml::NsReader;

use crate::attrs::Attrs;
use crate::config::DXL_NAMESPACE;
use crate::error::{DxlError, Result};
use crate::event::Event;

/// Iterator of tag events pulled from a byte stream.
///
/// Only the tag being read and the names of the currently open elements are
/// held in memory.
pub struct ReaderEvents<R> {
    reader: NsReader<R>,
    buf: Vec<u8>,
    open: Vec<String>,
    strict_namespace: bool,
    done: bool,
}

impl<R: BufRead> ReaderEvents<R> {
    #[must_use]
    pub fn new(source: R, strict_namespace: bool) -> Self {
        let mut reader = NsReader::from_reader(source);
        reader.config_mut().expand_empty_elements = true;
        Self {
            reader,
            buf: Vec::new(),
            open: Vec::new(),
            strict_namespace,
            done: false,
        }
    }

    /// Byte offset of the reader in the input.
    #[must_use]
    pub fn position(&self) -> u64 {
        self.reader.buffer_position()
    }

    fn next_event(&mut self) -> Result<Option<Event>> {
        loop {
            self.buf.clear();
            let (ns, event) = self.reader.read_resolved_event_into(&mut self.buf)?;
            match event {
                XmlEvent::Start(start) => {
                    let tag = std::str::from_utf8(start.local_name().as_ref())?.to_string();
                    if self.strict_namespace {
                        check_namespace(&ns, &tag, self.open.last())?;
                    }
                    let attrs = start_attrs(&tag, &start)?;
                    self.open.push(tag.clone());
                    return Ok(Some(Event::Open { tag, attrs }));
                }
                XmlEvent::End(end) => {
                    let tag = std::str::from_utf8(end.local_name().as_ref())?.to_string();
                    self.open.pop();
                    return Ok(Some(Event::Close { tag }));
                }
                XmlEvent::Eof => return Ok(None),
                _ => {}
            }
        }
    }
}

fn check_namespace(ns: &ResolveResult<'_>, tag: &str, parent: Option<&String>) -> Result<()> {
    let qualified = match ns {
        ResolveResult::Bound(Namespace(uri)) if *uri == DXL_NAMESPACE.as_bytes() => return Ok(()),
        ResolveResult::Bound(Namespace(uri)) => {
            format!("{{{}}}{tag}", String::from_utf8_lossy(uri))
        }
        _ => tag.to_string(),
    };
    Err(DxlError::UnrecognizedTag {
        tag: qualified,
        context: parent.cloned(),
    })
}

/// Collect attributes by local name, skipping namespace declarations.
fn start_attrs(tag: &str, start: &BytesStart<'_>) -> Result<Attrs> {
    let mut pairs = Vec::new();
    for attr in start.attributes() {
        let attr = attr.map_err(quick_xml::Error::from)?;
        if attr.key.as_namespace_binding().is_some() {
            continue;
        }
        let name = std::str::from_utf8(attr.key.local_name().as_ref())?.to_string();
        pairs.push((name, attr.unescape_value()?.into_owned()));
    }
    Ok(Attrs::from_pairs(tag, pairs))
}

impl<R: BufRead> Iterator for ReaderEvents<R> {
    type Item = Result<Event>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.next_event() {
            Ok(Some(event)) => Some(Ok(event)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}
