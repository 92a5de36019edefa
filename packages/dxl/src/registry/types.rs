//! Types shared by the handler registry, the handlers and the engine.

use std::fmt;

use strum::IntoStaticStr;

use super::handler::NodeHandler;
use crate::ast::logical::WindowSpec;
use crate::ast::metadata::{IndexInfo, MdColumn, MdObject};
use crate::ast::optimizer::{
    CostModelConfig, CostParam, CteConfig, EnumeratorConfig, Hint, SearchStage, StatisticsConfig,
    WindowOids,
};
use crate::ast::physical::WindowKey;
use crate::ast::scalar::SubPlanParam;
use crate::ast::statistics::{BucketBound, DerivedColumnStats, DerivedRelationStats, StatsBucket};
use crate::ast::{
    ColumnDescriptor, Datum, Document, IndexDescriptor, Node, OperatorCost, PlanProperties,
    TableDescriptor,
};
use crate::config::ParseOptions;
use crate::error::{DxlError, Result};
use crate::mdid::MdId;

/// Column ids of a `GroupingColumns` list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupingColumns(pub Vec<u32>);

/// Trace flags of an optimizer configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceFlags(pub Vec<u32>);

/// Default expression of a catalog column; empty when the element has no child.
#[derive(Debug, Clone, PartialEq)]
pub struct DefaultValue(pub Option<Node>);

/// Output row types of a set-returning function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputTypes(pub Vec<MdId>);

/// Ordered rows of a `ConstTuple`.
#[derive(Debug, Clone, PartialEq)]
pub struct Tuple(pub Vec<Datum>);

/// Ordered nodes of a list element such as `OutputColumns` or `CTEList`.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeList(pub Vec<Node>);

/// A value a handler can read back out of a harvested child.
pub trait FromHarvest: Sized {
    /// Harvest variant name, used in error messages.
    const NAME: &'static str;

    /// Unwrap the matching variant, handing back any other one.
    fn from_harvest(harvest: Harvest) -> std::result::Result<Self, Harvest>;
}

macro_rules! harvest {
    ($($variant:ident($ty:ty)),* $(,)?) => {
        /// The result of a finished handler, handed to its parent.
        #[derive(Debug, IntoStaticStr)]
        pub enum Harvest {
            $($variant($ty),)*
        }

        $(
            impl FromHarvest for $ty {
                const NAME: &'static str = stringify!($variant);

                fn from_harvest(harvest: Harvest) -> std::result::Result<Self, Harvest> {
                    match harvest {
                        Harvest::$variant(value) => Ok(value),
                        other => Err(other),
                    }
                }
            }

            impl From<$ty> for Harvest {
                fn from(value: $ty) -> Self {
                    Self::$variant(value)
                }
            }
        )*
    };
}

harvest! {
    Node(Node),
    NodeList(NodeList),
    Properties(PlanProperties),
    Cost(OperatorCost),
    Table(TableDescriptor),
    Index(IndexDescriptor),
    Columns(Vec<ColumnDescriptor>),
    Column(ColumnDescriptor),
    GroupingColumns(GroupingColumns),
    GroupingColumn(u32),
    Datum(Datum),
    Tuple(Tuple),
    WindowSpecs(Vec<WindowSpec>),
    WindowSpec(WindowSpec),
    WindowKeys(Vec<WindowKey>),
    WindowKey(WindowKey),
    Params(Vec<SubPlanParam>),
    Param(SubPlanParam),
    MdRef(MdId),
    MdRefs(Vec<MdId>),
    MdColumns(Vec<MdColumn>),
    MdColumn(MdColumn),
    DefaultValue(DefaultValue),
    OutputTypes(OutputTypes),
    IndexInfo(IndexInfo),
    IndexInfos(Vec<IndexInfo>),
    MdObject(MdObject),
    CostParam(CostParam),
    CostParams(Vec<CostParam>),
    CostModel(CostModelConfig),
    Xform(String),
    SearchStage(SearchStage),
    Enumerator(EnumeratorConfig),
    StatisticsConfig(StatisticsConfig),
    CteConfig(CteConfig),
    WindowOids(WindowOids),
    Hint(Hint),
    TraceFlags(TraceFlags),
    DerivedRelation(DerivedRelationStats),
    DerivedColumn(DerivedColumnStats),
    Bucket(StatsBucket),
    Bound(BucketBound),
    Document(Document),
}

impl Harvest {
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.into()
    }
}

/// Deferred constructor produced by a kind's opener.
///
/// It captures the typed attributes when the node opens and assembles the
/// result from the harvested children when the node closes.
pub type Build = Box<dyn FnOnce(Slots) -> Result<Harvest>>;

/// Opener of a node kind: converts the attributes of the opening tag.
pub type OpenFn = fn(&crate::attrs::Attrs, &mut ParseContext) -> Result<Build>;

/// Harvested children grouped per grammar part, in document order.
///
/// Builders read the parts front to back with the typed accessors.
pub struct Slots {
    element: &'static str,
    parts: std::vec::IntoIter<Vec<Harvest>>,
}

impl Slots {
    pub(crate) fn new(element: &'static str, parts: Vec<Vec<Harvest>>) -> Self {
        Self {
            element,
            parts: parts.into_iter(),
        }
    }

    fn next_part(&mut self) -> Result<Vec<Harvest>> {
        self.parts
            .next()
            .ok_or_else(|| DxlError::arity(self.element, "builder read past the last grammar part"))
    }

    fn convert<T: FromHarvest>(&self, harvest: Harvest) -> Result<T> {
        T::from_harvest(harvest).map_err(|other| {
            DxlError::arity(
                self.element,
                format!("expected {}, harvested {}", T::NAME, other.name()),
            )
        })
    }

    /// Read a part that holds exactly one child.
    ///
    /// # Errors
    /// `ArityViolation` when the part is empty, holds several children, or
    /// holds a child of another type.
    pub fn one<T: FromHarvest>(&mut self) -> Result<T> {
        let mut part = self.next_part()?;
        if part.len() != 1 {
            return Err(DxlError::arity(
                self.element,
                format!("expected exactly one {}, found {}", T::NAME, part.len()),
            ));
        }
        let harvest = part
            .pop()
            .ok_or_else(|| DxlError::arity(self.element, "empty grammar part"))?;
        self.convert(harvest)
    }

    /// Read a part that holds at most one child.
    ///
    /// # Errors
    /// `ArityViolation` when the part holds several children or a child of
    /// another type.
    pub fn opt<T: FromHarvest>(&mut self) -> Result<Option<T>> {
        let mut part = self.next_part()?;
        if part.len() > 1 {
            return Err(DxlError::arity(
                self.element,
                format!("expected at most one {}, found {}", T::NAME, part.len()),
            ));
        }
        part.pop().map(|harvest| self.convert(harvest)).transpose()
    }

    /// Read every child of the next part.
    ///
    /// # Errors
    /// `ArityViolation` when a child has another type.
    pub fn many<T: FromHarvest>(&mut self) -> Result<Vec<T>> {
        let part = self.next_part()?;
        part.into_iter().map(|harvest| self.convert(harvest)).collect()
    }

    /// Read every child of every remaining part, in document order.
    ///
    /// # Errors
    /// `ArityViolation` when a child has another type.
    pub fn rest<T: FromHarvest>(&mut self) -> Result<Vec<T>> {
        let parts: Vec<Vec<Harvest>> = self.parts.by_ref().collect();
        parts
            .into_iter()
            .flatten()
            .map(|harvest| self.convert(harvest))
            .collect()
    }

    /// Check that the builder consumed every part.
    ///
    /// # Errors
    /// `ArityViolation` when parts are left unread.
    pub fn finish(self) -> Result<()> {
        match self.parts.len() {
            0 => Ok(()),
            left => Err(DxlError::arity(
                self.element,
                format!("{left} grammar part(s) left unread"),
            )),
        }
    }
}

/// Outcome of dispatching one event to a handler.
pub enum Step {
    /// The handler stays active.
    Continue,
    /// A child opened: activate this handler and re-dispatch the event to it.
    Delegate(Box<dyn NodeHandler>),
    /// The handler closed; its result is ready.
    Finished,
}

impl fmt::Debug for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Continue => f.write_str("Continue"),
            Self::Delegate(handler) => write!(f, "Delegate(<{}>)", handler.token()),
            Self::Finished => f.write_str("Finished"),
        }
    }
}

/// Counters collected over one parse.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseStats {
    pub events: usize,
    pub handlers_created: usize,
    pub nodes_built: usize,
    pub max_depth: usize,
}

/// Context threaded through every handler of one parse.
#[derive(Debug, Clone, Default)]
pub struct ParseContext {
    pub options: ParseOptions,
    pub stats: ParseStats,
    depth: usize,
}

impl ParseContext {
    #[must_use]
    pub fn new(options: ParseOptions) -> Self {
        Self {
            options,
            stats: ParseStats::default(),
            depth: 0,
        }
    }

    /// Current element nesting depth.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Record entering an element.
    ///
    /// # Errors
    /// `DepthLimitExceeded` when the configured limit is passed.
    pub fn enter(&mut self) -> Result<()> {
        self.depth += 1;
        if let Some(limit) = self.options.max_depth {
            if self.depth > limit {
                return Err(DxlError::DepthLimitExceeded { limit });
            }
        }
        self.stats.max_depth = self.stats.max_depth.max(self.depth);
        Ok(())
    }

    /// Record leaving an element.
    pub fn leave(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::scalar::ScalarOp;

    fn node(op: ScalarOp) -> Harvest {
        Node::scalar(op, vec![]).into()
    }

    #[test]
    fn test_slots_read_parts_in_order() {
        let mut slots = Slots::new(
            "Test",
            vec![vec![node(ScalarOp::ProjList)], vec![], vec![node(ScalarOp::And), node(ScalarOp::Or)]],
        );
        let first: Node = slots.one().unwrap();
        assert_eq!(first.name(), "ProjList");
        let second: Option<Node> = slots.opt().unwrap();
        assert!(second.is_none());
        let rest: Vec<Node> = slots.many().unwrap();
        assert_eq!(rest.len(), 2);
        slots.finish().unwrap();
    }

    #[test]
    fn test_slots_wrong_variant_is_arity_violation() {
        let mut slots = Slots::new("Test", vec![vec![Harvest::GroupingColumn(3)]]);
        let err = slots.one::<Node>().unwrap_err();
        assert!(err.is_invariant_violation());
        assert!(err.to_string().contains("GroupingColumn"));
    }

    #[test]
    fn test_slots_unread_parts() {
        let slots = Slots::new("Test", vec![vec![]]);
        assert!(slots.finish().is_err());
    }

    #[test]
    fn test_depth_limit() {
        let mut ctx = ParseContext::new(ParseOptions::new().with_max_depth(2));
        ctx.enter().unwrap();
        ctx.enter().unwrap();
        assert!(matches!(ctx.enter(), Err(DxlError::DepthLimitExceeded { limit: 2 })));
    }

    #[test]
    fn test_stats_track_max_depth() {
        let mut ctx = ParseContext::new(ParseOptions::new());
        ctx.enter().unwrap();
        ctx.enter().unwrap();
        ctx.leave();
        assert_eq!(ctx.depth(), 1);
        assert_eq!(ctx.stats.max_depth, 2);
    }
}
