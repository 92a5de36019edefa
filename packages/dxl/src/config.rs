//! Configuration constants and parse options for the DXL parser.

/// Namespace URI of DXL documents.
pub const DXL_NAMESPACE: &str = "http://greenplum.com/dxl/2010/12/";

/// Conventional namespace prefix of DXL elements.
pub const DXL_PREFIX: &str = "dxl";

/// Separator between items of a list-valued attribute (e.g. `Columns="1,2,3"`).
pub const LIST_SEPARATOR: char = ',';

/// Separator between the inner lists of a list-of-lists attribute
/// (e.g. `InputColumns="1,2;3,4"`).
pub const LIST_OF_LISTS_SEPARATOR: char = ';';

/// Separator between the components of a metadata identifier (`0.23.1.0`).
pub const MDID_SEPARATOR: char = '.';

/// Options controlling a single parse.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseOptions {
    /// Maximum element nesting depth; `None` leaves depth bounded only by memory.
    pub max_depth: Option<usize>,

    /// Reject elements outside the DXL namespace when reading XML text.
    pub strict_namespace: bool,
}

impl ParseOptions {
    /// Create default options (unbounded depth, lenient namespaces).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum nesting depth.
    #[must_use]
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    /// Require every element to live in the DXL namespace.
    #[must_use]
    pub fn with_strict_namespace(mut self, strict: bool) -> Self {
        self.strict_namespace = strict;
        self
    }
}
