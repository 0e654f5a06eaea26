//! XML check definition parser
//!
//! Document shape (root element name is not significant):
//!
//! ```xml
//! <analyser>
//!   <class>
//!     <id>1</id><item>9000</item><level>3</level><title>School far from road</title>
//!   </class>
//!   <requests>
//!     <request>
//!       <name>schools</name><obj>node</obj><geom>point</geom><from>nodes</from>
//!       <filter><key_value>amenity=school</key_value></filter>
//!     </request>
//!     <request>
//!       <name>around</name><obj>node</obj><geom>polygon</geom><from>schools</from>
//!       <buffer>100</buffer>
//!     </request>
//!   </requests>
//! </analyser>
//! ```

use roxmltree::{Document, Node};

use crate::predicate::Predicate;

use super::definition::{CheckDefinition, ClassMetadata};
use super::errors::{CompileError, CompileResult};
use super::stage::StageDescriptor;
use super::types::{FeatureKind, GeometryKind};

/// Parses one check definition document
pub fn parse_check(text: &str) -> CompileResult<CheckDefinition> {
    let doc = Document::parse(text)
        .map_err(|e| CompileError::malformed_document(format!("Invalid XML: {}", e)))?;
    let root = doc.root_element();

    let class = parse_class(required_child(root, "class")?)?;

    let requests = required_child(root, "requests")?;
    let mut stages = Vec::new();
    for node in elements(requests) {
        if node.tag_name().name() != "request" {
            return Err(CompileError::malformed_document(format!(
                "Unexpected <{}> in <requests>",
                node.tag_name().name()
            )));
        }
        stages.push(parse_request(node)?);
    }

    CheckDefinition::new(class, stages)
}

fn parse_class(node: Node<'_, '_>) -> CompileResult<ClassMetadata> {
    Ok(ClassMetadata {
        id: required_text(node, "id")?,
        item: required_text(node, "item")?,
        level: required_text(node, "level")?,
        title: required_text(node, "title")?,
    })
}

fn parse_request(node: Node<'_, '_>) -> CompileResult<StageDescriptor> {
    let name = required_text(node, "name")?;
    parse_request_body(node, &name).map_err(|e| match e.stage() {
        Some(_) => e,
        None => e.at_stage(&name),
    })
}

fn parse_request_body(node: Node<'_, '_>, name: &str) -> CompileResult<StageDescriptor> {
    let obj = FeatureKind::parse(&required_text(node, "obj")?)?;
    let geom = GeometryKind::parse(&required_text(node, "geom")?)?;
    let from = required_text(node, "from")?;

    let predicate = match single_child(node, "filter", name)? {
        Some(filter) => {
            let mut exprs = elements(filter);
            let expr = exprs.next().ok_or_else(|| {
                CompileError::malformed_document("<filter> holds no predicate")
            })?;
            if exprs.next().is_some() {
                return Err(CompileError::malformed_document(
                    "<filter> holds more than one predicate",
                ));
            }
            Some(parse_predicate(expr)?)
        }
        None => None,
    };
    let buffer = match single_child(node, "buffer", name)? {
        Some(b) => Some(node_text(b, "buffer")?),
        None => None,
    };

    StageDescriptor::new(name, obj, geom, from, predicate, buffer)
}

/// Parses one predicate element and its subtree
fn parse_predicate(node: Node<'_, '_>) -> CompileResult<Predicate> {
    match node.tag_name().name() {
        "and" => Predicate::and(parse_children(node)?),
        "or" => Predicate::or(parse_children(node)?),
        "has_tag" => Predicate::has_tag(node_text(node, "has_tag")?),
        "has_not_tag" => Predicate::has_not_tag(node_text(node, "has_not_tag")?),
        "key_value" => Predicate::parse_key_value(&node_text(node, "key_value")?),
        "intersects" => Predicate::intersects(node_text(node, "intersects")?),
        other => Err(CompileError::unknown_predicate_kind(other)),
    }
}

fn parse_children(node: Node<'_, '_>) -> CompileResult<Vec<Predicate>> {
    elements(node).map(parse_predicate).collect()
}

fn elements<'a, 'input>(node: Node<'a, 'input>) -> impl Iterator<Item = Node<'a, 'input>> {
    node.children().filter(|n| n.is_element())
}

fn child<'a, 'input>(node: Node<'a, 'input>, tag: &str) -> Option<Node<'a, 'input>> {
    elements(node).find(|n| n.tag_name().name() == tag)
}

/// At most one `tag` child is allowed in a request
fn single_child<'a, 'input>(
    node: Node<'a, 'input>,
    tag: &str,
    stage: &str,
) -> CompileResult<Option<Node<'a, 'input>>> {
    let mut matches = elements(node).filter(|n| n.tag_name().name() == tag);
    let first = matches.next();
    if matches.next().is_some() {
        return Err(CompileError::malformed_stage(
            stage,
            format!("Request has more than one <{}>", tag),
        ));
    }
    Ok(first)
}

fn required_child<'a, 'input>(node: Node<'a, 'input>, tag: &str) -> CompileResult<Node<'a, 'input>> {
    child(node, tag).ok_or_else(|| {
        CompileError::malformed_document(format!(
            "<{}> is missing <{}>",
            node.tag_name().name(),
            tag
        ))
    })
}

fn required_text(node: Node<'_, '_>, tag: &str) -> CompileResult<String> {
    node_text(required_child(node, tag)?, tag)
}

fn node_text(node: Node<'_, '_>, tag: &str) -> CompileResult<String> {
    match node.text().map(str::trim) {
        Some(text) if !text.is_empty() => Ok(text.to_string()),
        _ => Err(CompileError::malformed_document(format!("<{}> is empty", tag))),
    }
}
