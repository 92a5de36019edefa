//! Helpers for reading DXL elements out of a roxmltree DOM.

use roxmltree::Node;

use crate::attrs::Attrs;
use crate::config::DXL_NAMESPACE;

/// Get the tag name without namespace prefix.
///
/// # Examples
/// ```
/// use roxmltree::Document;
/// use dxl_parser::xml::get_tag_name;
///
/// let xml = r#"<dxl:Plan xmlns:dxl="http://greenplum.com/dxl/2010/12/"/>"#;
/// let doc = Document::parse(xml).unwrap();
/// assert_eq!(get_tag_name(doc.root_element()), "Plan");
/// ```
pub fn get_tag_name<'a>(node: Node<'a, '_>) -> &'a str {
    node.tag_name().name()
}

/// Check whether an element lives in the DXL namespace.
pub fn is_dxl_element(node: Node<'_, '_>) -> bool {
    node.is_element() && node.tag_name().namespace() == Some(DXL_NAMESPACE)
}

/// Tag name of the nearest element ancestor, if any.
pub fn parent_tag<'a>(node: Node<'a, '_>) -> Option<&'a str> {
    node.parent_element().map(get_tag_name)
}

/// Collect an element's attributes, keyed by local name, in document order.
pub fn element_attrs(node: Node<'_, '_>) -> Attrs {
    Attrs::from_pairs(
        get_tag_name(node),
        node.attributes().map(|attr| (attr.name(), attr.value())),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use roxmltree::Document;

    #[test]
    fn test_get_tag_name_with_namespace() {
        let xml = r#"<dxl:DXLMessage xmlns:dxl="http://greenplum.com/dxl/2010/12/"><dxl:Plan/></dxl:DXLMessage>"#;
        let doc = Document::parse(xml).unwrap();
        assert_eq!(get_tag_name(doc.root_element()), "DXLMessage");
    }

    #[test]
    fn test_is_dxl_element() {
        let xml = r#"<dxl:Plan xmlns:dxl="http://greenplum.com/dxl/2010/12/"><Other/></dxl:Plan>"#;
        let doc = Document::parse(xml).unwrap();
        let root = doc.root_element();
        assert!(is_dxl_element(root));
        let other = root.first_element_child().unwrap();
        assert!(!is_dxl_element(other));
        assert_eq!(parent_tag(other), Some("Plan"));
    }

    #[test]
    fn test_element_attrs_keep_order() {
        let xml = r#"<Ident ColId="1" ColName="a" TypeMdid="0.23.1.0"/>"#;
        let doc = Document::parse(xml).unwrap();
        let attrs = element_attrs(doc.root_element());
        assert_eq!(attrs.element(), "Ident");
        let names: Vec<&str> = attrs.iter().map(|(k, _)| k).collect();
        assert_eq!(names, vec!["ColId", "ColName", "TypeMdid"]);
    }
}
