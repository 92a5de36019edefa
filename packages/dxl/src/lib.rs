//! DXL parser - Build query optimizer trees from DXL documents.
//!
//! DXL is the XML exchange format of a cost-based query optimizer: physical
//! plans, logical queries, catalog metadata, statistics and optimizer
//! configuration all travel as DXL. This crate turns a stream of DXL tag
//! events into an owned, typed tree with a stack of table-driven handlers,
//! one per open element.
//!
//! # Example
//!
//! ```
//! use dxl_parser::{parse_str, CostModelParams, Document};
//!
//! let xml = r#"<dxl:DXLMessage xmlns:dxl="http://greenplum.com/dxl/2010/12/">
//!   <dxl:CostParams>
//!     <dxl:CostParam Name="X" Value="2.0" LowerBound="0.0" UpperBound="10.0"/>
//!   </dxl:CostParams>
//! </dxl:DXLMessage>"#;
//!
//! let Document::CostParams(params) = parse_str(xml).unwrap() else {
//!     unreachable!();
//! };
//! let table = CostModelParams::install(&params).unwrap();
//! assert_eq!(table.value("X"), Some(2.0));
//! ```
//!
//! # Architecture
//!
//! - [`event`]: Open/close tag events
//! - [`xml`]: Event sources over quick-xml streams and roxmltree documents
//! - [`token`]: The closed tag vocabulary
//! - [`attrs`]: Typed attribute conversion
//! - [`mdid`]: Metadata identifiers
//! - [`factory`]: Leaf values built from attributes
//! - [`registry`]: Handler table, handler stack and parse engine
//! - [`ast`]: The produced tree and document sections
//! - [`cost`]: Cost model parameter registry
//! - [`config`]: Constants and parse options
//! - [`error`]: Error types and Result alias
//! - [`cli`]: Command-line interface

pub mod ast;
pub mod attrs;
pub mod cli;
pub mod config;
pub mod cost;
pub mod error;
pub mod event;
pub mod factory;
pub mod mdid;
pub mod parser;
pub mod registry;
pub mod token;
pub mod xml;

// Re-export main functions
pub use parser::{
    parse_events, parse_file, parse_reader, parse_reader_with_stats, parse_str, parse_str_with,
    parse_str_with_stats,
};

// Re-export commonly used items
pub use ast::{Document, Node, Operator, Plan, Query};
pub use attrs::Attrs;
pub use config::ParseOptions;
pub use cost::CostModelParams;
pub use error::{DxlError, Result};
pub use event::Event;
pub use mdid::{MdId, ObjectRef};
pub use registry::{Kind, ParseEngine, ParseStats};
pub use token::Token;
