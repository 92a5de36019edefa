//! Handler registry and parse engine.
//!
//! Every DXL node kind has one table entry: the tag that opens it, the
//! ordered grammar of its children, and an opener that turns the opening
//! tag's attributes into a deferred builder. A single table-driven handler
//! implements the open / accumulate / close protocol for all of them, and the
//! engine drives a stack of such handlers with tag events.

mod config;
pub mod core;
pub mod engine;
pub mod grammar;
pub mod handler;
pub mod handlers;
pub mod kind;
pub mod types;

pub use config::create_dxl_registry;
pub use self::core::{get_handler, HandlerRegistry, KindSpec, REGISTRY};
pub use engine::{HandlerStack, ParseEngine};
pub use grammar::{Expect, Part};
pub use handler::{KindHandler, NodeHandler};
pub use kind::{Family, Kind};
pub use types::{Harvest, ParseContext, ParseStats, Slots, Step};
