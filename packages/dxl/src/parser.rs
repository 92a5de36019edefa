//! Parse entry points that tie the event source to the engine.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use roxmltree::Document as XmlDocument;

use crate::ast::Document;
use crate::config::ParseOptions;
use crate::error::Result;
use crate::event::Event;
use crate::registry::{ParseEngine, ParseStats};
use crate::xml::{ReaderEvents, XmlEvents};

/// Parse a `DXLMessage` from a stream of tag events.
///
/// # Errors
/// The first error raised while feeding the events, or `IncompleteDocument`
/// when the stream ends before the root element closes.
pub fn parse_events<I>(events: I, options: ParseOptions) -> Result<Document>
where
    I: IntoIterator<Item = Result<Event>>,
{
    let mut engine = ParseEngine::new(options)?;
    engine.feed_all(events)?;
    engine.finish()
}

/// Parse a DXL document from XML text with default options.
///
/// # Example
///
/// ```
/// let xml = r#"<dxl:DXLMessage xmlns:dxl="http://greenplum.com/dxl/2010/12/">
///   <dxl:CostParams>
///     <dxl:CostParam Name="NLJFactor" Value="1.0" LowerBound="0.0" UpperBound="10.0"/>
///   </dxl:CostParams>
/// </dxl:DXLMessage>"#;
///
/// let document = dxl_parser::parse_str(xml).unwrap();
/// assert_eq!(document.section_name(), "CostParams");
/// ```
///
/// # Errors
/// XML syntax errors and every parse error of [`parse_events`].
pub fn parse_str(xml: &str) -> Result<Document> {
    parse_str_with(xml, &ParseOptions::default())
}

/// Parse a DXL document from XML text.
///
/// # Errors
/// XML syntax errors and every parse error of [`parse_events`].
pub fn parse_str_with(xml: &str, options: &ParseOptions) -> Result<Document> {
    parse_str_with_stats(xml, options).map(|(document, _)| document)
}

/// Parse a DXL document from XML text, also returning parse statistics.
///
/// # Errors
/// XML syntax errors and every parse error of [`parse_events`].
pub fn parse_str_with_stats(xml: &str, options: &ParseOptions) -> Result<(Document, ParseStats)> {
    let doc = XmlDocument::parse(xml)?;
    let mut engine = ParseEngine::new(options.clone())?;
    engine.feed_all(XmlEvents::new(&doc, options.strict_namespace))?;
    let stats = engine.stats();
    Ok((engine.finish()?, stats))
}

/// Parse a DXL document pulled incrementally from a reader.
///
/// The document is never held in memory as a whole; only the open handlers
/// and the partially built tree are.
///
/// # Errors
/// XML syntax and IO errors of the reader, then every error of [`parse_events`].
pub fn parse_reader<R: BufRead>(source: R, options: &ParseOptions) -> Result<Document> {
    parse_reader_with_stats(source, options).map(|(document, _)| document)
}

/// Parse a DXL document from a reader, also returning parse statistics.
///
/// # Errors
/// See [`parse_reader`].
pub fn parse_reader_with_stats<R: BufRead>(
    source: R,
    options: &ParseOptions,
) -> Result<(Document, ParseStats)> {
    let mut engine = ParseEngine::new(options.clone())?;
    engine.feed_all(ReaderEvents::new(source, options.strict_namespace))?;
    let stats = engine.stats();
    Ok((engine.finish()?, stats))
}

/// Stream and parse a DXL file.
///
/// # Errors
/// IO errors opening the file, then every error of [`parse_reader`].
pub fn parse_file(path: &Path, options: &ParseOptions) -> Result<Document> {
    let file = File::open(path)?;
    tracing::debug!(path = %path.display(), "Parsing DXL file");
    parse_reader(BufReader::new(file), options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DxlError;

    const NS: &str = r#"xmlns:dxl="http://greenplum.com/dxl/2010/12/""#;

    fn message(body: &str) -> String {
        format!("<dxl:DXLMessage {NS}>{body}</dxl:DXLMessage>")
    }

    #[test]
    fn test_parse_str_scalar_expr() {
        let xml = message(
            r#"<dxl:ScalarExpr>
                 <dxl:Comparison ComparisonOperator="=" OperatorMdid="0.96.1.0">
                   <dxl:Ident ColId="1" ColName="a" TypeMdid="0.23.1.0"/>
                   <dxl:ConstValue TypeMdid="0.23.1.0" Value="5"/>
                 </dxl:Comparison>
               </dxl:ScalarExpr>"#,
        );
        let document = parse_str(&xml).unwrap();
        let Document::ScalarExpr(expr) = document else {
            panic!("expected a scalar expression");
        };
        assert_eq!(expr.name(), "Comparison");
        assert_eq!(expr.arity(), 2);
    }

    #[test]
    fn test_parse_str_rejects_bad_xml() {
        let err = parse_str("<dxl:DXLMessage").unwrap_err();
        assert!(matches!(err, DxlError::Xml(_)));
    }

    #[test]
    fn test_parse_str_incomplete_root() {
        let err = parse_str(&message("")).unwrap_err();
        assert!(matches!(err, DxlError::ArityViolation { .. }));
    }

    #[test]
    fn test_depth_limit() {
        let xml = message(
            r#"<dxl:ScalarExpr>
                 <dxl:Not><dxl:Not><dxl:Not>
                   <dxl:ConstValue TypeMdid="0.16.1.0" Value="true"/>
                 </dxl:Not></dxl:Not></dxl:Not>
               </dxl:ScalarExpr>"#,
        );
        let options = ParseOptions::new().with_max_depth(4);
        let err = parse_str_with(&xml, &options).unwrap_err();
        assert!(matches!(err, DxlError::DepthLimitExceeded { limit: 4 }));
        assert!(parse_str(&xml).is_ok());
    }

    #[test]
    fn test_stats_are_reported() {
        let xml = message(
            r#"<dxl:CostParams>
                 <dxl:CostParam Name="A" Value="1" LowerBound="0" UpperBound="2"/>
               </dxl:CostParams>"#,
        );
        let (_, stats) = parse_str_with_stats(&xml, &ParseOptions::new()).unwrap();
        assert_eq!(stats.events, 6);
        assert_eq!(stats.max_depth, 3);
    }

    #[test]
    fn test_parse_reader_matches_parse_str() {
        let xml = message(
            r#"<dxl:ScalarExpr>
                 <dxl:And>
                   <dxl:ConstValue TypeMdid="0.16.1.0" Value="true"/>
                   <dxl:ConstValue TypeMdid="0.16.1.0" IsNull="true"/>
                 </dxl:And>
               </dxl:ScalarExpr>"#,
        );
        let streamed = parse_reader(xml.as_bytes(), &ParseOptions::new()).unwrap();
        assert_eq!(streamed, parse_str(&xml).unwrap());
    }

    #[test]
    fn test_parse_reader_stats_match_parse_str() {
        let xml = message(
            r#"<dxl:CostParams>
                 <dxl:CostParam Name="A" Value="1" LowerBound="0" UpperBound="2"/>
               </dxl:CostParams>"#,
        );
        let (_, stats) = parse_reader_with_stats(xml.as_bytes(), &ParseOptions::new()).unwrap();
        assert_eq!(stats.events, 6);
        assert_eq!(stats.max_depth, 3);
    }

    #[test]
    fn test_parse_reader_truncated_input() {
        let xml = message("<dxl:CostParams>");
        let truncated = &xml[..xml.len() - "</dxl:DXLMessage>".len()];
        let err = parse_reader(truncated.as_bytes(), &ParseOptions::new()).unwrap_err();
        assert!(matches!(
            err,
            DxlError::IncompleteDocument { .. } | DxlError::XmlStream(_)
        ));
    }

    #[test]
    fn test_parse_reader_rejects_bad_xml() {
        let err = parse_reader("<dxl:DXLMessage></dxl:Other>".as_bytes(), &ParseOptions::new())
            .unwrap_err();
        assert!(matches!(err, DxlError::XmlStream(_)));
    }

    #[test]
    fn test_parse_events_incomplete() {
        let events = vec![Ok(Event::open_empty("DXLMessage"))];
        let err = parse_events(events, ParseOptions::new()).unwrap_err();
        assert!(matches!(err, DxlError::IncompleteDocument { ref open } if open == &["DXLMessage"]));
    }
}
