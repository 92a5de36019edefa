//! Table entries for every node kind, grouped by family.
//!
//! Each module registers its kinds with a grammar and an opener. Openers
//! read the attributes of the opening tag and return the deferred builder
//! that runs when the node closes.

pub mod clause;
pub mod descriptors;
pub mod logical;
pub mod metadata;
pub mod physical;
pub mod scalar;
pub mod sections;

use crate::ast::{LogicalOp, Node, PhysicalOp, ScalarOp};
use crate::error::Result;

use super::types::{Build, Harvest, Slots};

/// Wrap a builder closure.
pub(crate) fn build<F>(f: F) -> Result<Build>
where
    F: FnOnce(Slots) -> Result<Harvest> + 'static,
{
    Ok(Box::new(f))
}

/// Builder for a value with no children.
pub(crate) fn leaf<T>(value: T) -> Result<Build>
where
    T: Into<Harvest> + 'static,
{
    build(move |slots| {
        slots.finish()?;
        Ok(value.into())
    })
}

/// Builder for a scalar node whose children are all harvested nodes.
pub(crate) fn scalar(op: ScalarOp) -> Result<Build> {
    build(move |mut slots| Ok(Node::scalar(op, slots.rest()?).into()))
}

/// Builder for a logical node whose children are all harvested nodes.
pub(crate) fn logical(op: LogicalOp) -> Result<Build> {
    build(move |mut slots| Ok(Node::logical(op, slots.rest()?).into()))
}

/// Builder for a physical node: properties first, then child nodes.
pub(crate) fn physical(op: PhysicalOp) -> Result<Build> {
    build(move |mut slots| {
        let properties = slots.one()?;
        Ok(Node::physical(op, properties, slots.rest()?).into())
    })
}
