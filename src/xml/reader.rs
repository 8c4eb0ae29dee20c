//! UANodeSet XML parsing.

use std::str::FromStr;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::nodeset::{
    Model, NodeChild, NodeClass, NodeId, NodeSet, QualifiedName, Reference, RequiredModel, UaNode,
    ValueContent,
};
use crate::Result;

/// Parses one UANodeSet document from its XML text.
///
/// The engine interprets only what it has to: namespace and model
/// declarations, aliases, the identity attributes of each node, References
/// elements and `ListOfString` values. Every other attribute and child
/// element is captured verbatim, in order, and travels through untouched to
/// serialization. Element matching goes by local name, so documents using a
/// namespace prefix on the UANodeSet vocabulary parse the same as unprefixed
/// ones.
///
/// # Errors
///
/// Returns [`crate::Error::Xml`] for malformed XML and
/// [`crate::Error::Malformed`] for documents that are well-formed XML but
/// not a UANodeSet (missing root, node without NodeId, unparseable NodeId
/// text, Reference without target).
pub fn read_nodeset(xml: &str) -> Result<NodeSet> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    // Find the document root.
    loop {
        match reader.read_event().map_err(quick_xml::Error::from)? {
            Event::Start(e) if e.local_name().as_ref() == b"UANodeSet" => break,
            Event::Eof => return Err(malformed_error!("Document has no UANodeSet root element")),
            Event::Start(e) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                return Err(malformed_error!(
                    "Unexpected root element '{}', expected UANodeSet",
                    name
                ));
            }
            _ => {}
        }
    }

    let mut document = NodeSet::default();
    loop {
        match reader.read_event().map_err(quick_xml::Error::from)? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"NamespaceUris" => read_namespace_uris(&mut reader, &mut document)?,
                b"Models" => read_models(&mut reader, &mut document)?,
                b"Aliases" => read_aliases(&mut reader, &mut document)?,
                other => {
                    if let Ok(class) = NodeClass::from_str(&String::from_utf8_lossy(other)) {
                        let node = read_node(&mut reader, xml, &e, class)?;
                        document.nodes.push(node);
                    } else {
                        reader
                            .read_to_end(e.name())
                            .map_err(quick_xml::Error::from)?;
                    }
                }
            },
            Event::Empty(e) => {
                if let Ok(class) =
                    NodeClass::from_str(&String::from_utf8_lossy(e.local_name().as_ref()))
                {
                    document.nodes.push(node_from_attributes(&e, class)?);
                }
            }
            Event::End(e) if e.local_name().as_ref() == b"UANodeSet" => break,
            Event::Eof => {
                return Err(malformed_error!("Unterminated UANodeSet root element"));
            }
            _ => {}
        }
    }
    Ok(document)
}

fn read_namespace_uris(reader: &mut Reader<&[u8]>, document: &mut NodeSet) -> Result<()> {
    loop {
        match reader.read_event().map_err(quick_xml::Error::from)? {
            Event::Start(e) if e.local_name().as_ref() == b"Uri" => {
                let uri = reader
                    .read_text(e.name())
                    .map_err(quick_xml::Error::from)?;
                document.namespace_uris.push(uri.trim().to_string());
            }
            Event::End(e) if e.local_name().as_ref() == b"NamespaceUris" => return Ok(()),
            Event::Eof => return Err(malformed_error!("Unterminated NamespaceUris element")),
            _ => {}
        }
    }
}

fn read_models(reader: &mut Reader<&[u8]>, document: &mut NodeSet) -> Result<()> {
    loop {
        match reader.read_event().map_err(quick_xml::Error::from)? {
            Event::Start(e) if e.local_name().as_ref() == b"Model" => {
                let mut model = model_from_attributes(&e)?;
                loop {
                    match reader.read_event().map_err(quick_xml::Error::from)? {
                        Event::Start(r) | Event::Empty(r)
                            if r.local_name().as_ref() == b"RequiredModel" =>
                        {
                            model.required.push(required_model_from_attributes(&r)?);
                        }
                        Event::End(end) if end.local_name().as_ref() == b"Model" => break,
                        Event::Eof => {
                            return Err(malformed_error!("Unterminated Model element"));
                        }
                        _ => {}
                    }
                }
                document.models.push(model);
            }
            Event::Empty(e) if e.local_name().as_ref() == b"Model" => {
                document.models.push(model_from_attributes(&e)?);
            }
            Event::End(e) if e.local_name().as_ref() == b"Models" => return Ok(()),
            Event::Eof => return Err(malformed_error!("Unterminated Models element")),
            _ => {}
        }
    }
}

fn model_from_attributes(element: &BytesStart<'_>) -> Result<Model> {
    let mut model_uri = None;
    let mut version = None;
    let mut publication_date = None;
    for attr in element.attributes() {
        let attr = attr?;
        let value = attr
            .unescape_value()
            .map_err(quick_xml::Error::from)?
            .into_owned();
        match attr.key.local_name().as_ref() {
            b"ModelUri" => model_uri = Some(value),
            b"Version" => version = Some(value),
            b"PublicationDate" => publication_date = Some(value),
            _ => {}
        }
    }
    let model_uri = model_uri.ok_or_else(|| malformed_error!("Model without ModelUri"))?;
    Ok(Model {
        model_uri,
        version,
        publication_date,
        required: Vec::new(),
    })
}

fn required_model_from_attributes(element: &BytesStart<'_>) -> Result<RequiredModel> {
    let mut model_uri = None;
    let mut version = None;
    for attr in element.attributes() {
        let attr = attr?;
        let value = attr
            .unescape_value()
            .map_err(quick_xml::Error::from)?
            .into_owned();
        match attr.key.local_name().as_ref() {
            b"ModelUri" => model_uri = Some(value),
            b"Version" => version = Some(value),
            _ => {}
        }
    }
    let model_uri = model_uri.ok_or_else(|| malformed_error!("RequiredModel without ModelUri"))?;
    Ok(RequiredModel { model_uri, version })
}

fn read_aliases(reader: &mut Reader<&[u8]>, document: &mut NodeSet) -> Result<()> {
    loop {
        match reader.read_event().map_err(quick_xml::Error::from)? {
            Event::Start(e) if e.local_name().as_ref() == b"Alias" => {
                let mut alias = None;
                for attr in e.attributes() {
                    let attr = attr?;
                    if attr.key.local_name().as_ref() == b"Alias" {
                        alias = Some(
                            attr.unescape_value()
                                .map_err(quick_xml::Error::from)?
                                .into_owned(),
                        );
                    }
                }
                let alias = alias.ok_or_else(|| malformed_error!("Alias without Alias name"))?;
                let target = reader
                    .read_text(e.name())
                    .map_err(quick_xml::Error::from)?;
                document.aliases.push((alias, target.trim().to_string()));
            }
            Event::End(e) if e.local_name().as_ref() == b"Aliases" => return Ok(()),
            Event::Eof => return Err(malformed_error!("Unterminated Aliases element")),
            _ => {}
        }
    }
}

/// Builds a node from its element attributes alone (no children yet).
fn node_from_attributes(element: &BytesStart<'_>, class: NodeClass) -> Result<UaNode> {
    let mut node_id = None;
    let mut browse_name = None;
    let mut parent = None;
    let mut data_type = None;
    let mut method_declaration = None;
    let mut extra_attrs = Vec::new();

    for attr in element.attributes() {
        let attr = attr?;
        let value = attr
            .unescape_value()
            .map_err(quick_xml::Error::from)?
            .into_owned();
        match attr.key.local_name().as_ref() {
            b"NodeId" => node_id = Some(NodeId::from_str(&value)?),
            b"BrowseName" => browse_name = Some(QualifiedName::from_str(&value)?),
            b"ParentNodeId" => parent = Some(NodeId::from_str(&value)?),
            b"DataType" => data_type = Some(value),
            b"MethodDeclarationId" => method_declaration = Some(NodeId::from_str(&value)?),
            _ => {
                let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
                extra_attrs.push((key, value));
            }
        }
    }

    let node_id = node_id.ok_or_else(|| malformed_error!("{} without NodeId", class))?;
    let browse_name = browse_name
        .ok_or_else(|| malformed_error!("Node {} without BrowseName", node_id))?;
    let mut node = UaNode::new(class, node_id, browse_name);
    node.parent = parent;
    node.data_type = data_type;
    node.method_declaration = method_declaration;
    node.extra_attrs = extra_attrs;
    Ok(node)
}

/// Parses a full node element: attributes, then children in document order.
///
/// References and `ListOfString` values become structured data; every other
/// child is sliced out of the source text verbatim by byte position.
fn read_node(
    reader: &mut Reader<&[u8]>,
    xml: &str,
    element: &BytesStart<'_>,
    class: NodeClass,
) -> Result<UaNode> {
    let mut node = node_from_attributes(element, class)?;
    let end_name = element.name().as_ref().to_vec();

    loop {
        let child_start = reader.buffer_position() as usize;
        match reader.read_event().map_err(quick_xml::Error::from)? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"References" => {
                    let refs = read_references(reader)?;
                    node.children.push(NodeChild::References(refs));
                }
                b"Value" => {
                    reader
                        .read_to_end(e.name())
                        .map_err(quick_xml::Error::from)?;
                    let child_end = reader.buffer_position() as usize;
                    // Trimmed-empty whitespace events are skipped, so the
                    // recorded start may sit before indentation.
                    let raw = xml[child_start..child_end].trim();
                    match parse_list_of_string(raw) {
                        Some(values) => {
                            node.children.push(NodeChild::Value(ValueContent::Strings(values)));
                        }
                        None => {
                            node.children
                                .push(NodeChild::Value(ValueContent::Raw(raw.to_string())));
                        }
                    }
                }
                _ => {
                    reader
                        .read_to_end(e.name())
                        .map_err(quick_xml::Error::from)?;
                    let child_end = reader.buffer_position() as usize;
                    node.children
                        .push(NodeChild::Raw(xml[child_start..child_end].trim().to_string()));
                }
            },
            Event::Empty(e) => {
                if e.local_name().as_ref() == b"References" {
                    node.children.push(NodeChild::References(Vec::new()));
                } else {
                    let child_end = reader.buffer_position() as usize;
                    node.children
                        .push(NodeChild::Raw(xml[child_start..child_end].trim().to_string()));
                }
            }
            Event::End(e) if e.name().as_ref() == end_name.as_slice() => break,
            Event::Eof => {
                return Err(malformed_error!(
                    "Unterminated {} element for node {}",
                    class,
                    node.node_id
                ));
            }
            _ => {}
        }
    }
    Ok(node)
}

fn read_references(reader: &mut Reader<&[u8]>) -> Result<Vec<Reference>> {
    let mut references = Vec::new();
    loop {
        match reader.read_event().map_err(quick_xml::Error::from)? {
            Event::Start(e) if e.local_name().as_ref() == b"Reference" => {
                let (ref_type, is_forward) = reference_attributes(&e)?;
                let target = reader
                    .read_text(e.name())
                    .map_err(quick_xml::Error::from)?;
                let target = NodeId::from_str(target.trim())?;
                references.push(Reference {
                    ref_type,
                    target,
                    is_forward,
                });
            }
            Event::Empty(e) if e.local_name().as_ref() == b"Reference" => {
                return Err(malformed_error!("Reference element without target NodeId"));
            }
            Event::End(e) if e.local_name().as_ref() == b"References" => return Ok(references),
            Event::Eof => return Err(malformed_error!("Unterminated References element")),
            _ => {}
        }
    }
}

fn reference_attributes(element: &BytesStart<'_>) -> Result<(String, bool)> {
    let mut ref_type = None;
    let mut is_forward = true;
    for attr in element.attributes() {
        let attr = attr?;
        let value = attr
            .unescape_value()
            .map_err(quick_xml::Error::from)?
            .into_owned();
        match attr.key.local_name().as_ref() {
            b"ReferenceType" => ref_type = Some(value),
            b"IsForward" => is_forward = value.trim() != "false",
            _ => {}
        }
    }
    let ref_type = ref_type.ok_or_else(|| malformed_error!("Reference without ReferenceType"))?;
    Ok((ref_type, is_forward))
}

/// Re-parses a raw `<Value>` slice, extracting a `ListOfString` payload.
///
/// Returns `None` when the value carries anything other than exactly one
/// `ListOfString` with `String` children; the caller then keeps the raw
/// text.
fn parse_list_of_string(raw: &str) -> Option<Vec<String>> {
    let mut reader = Reader::from_str(raw);
    reader.config_mut().trim_text(true);

    // <Value>
    match reader.read_event().ok()? {
        Event::Start(e) if e.local_name().as_ref() == b"Value" => {}
        _ => return None,
    }
    // <ListOfString>
    match reader.read_event().ok()? {
        Event::Start(e) if e.local_name().as_ref() == b"ListOfString" => {}
        Event::Empty(e) if e.local_name().as_ref() == b"ListOfString" => {
            return match reader.read_event().ok()? {
                Event::End(e) if e.local_name().as_ref() == b"Value" => Some(Vec::new()),
                _ => None,
            };
        }
        _ => return None,
    }
    let mut values = Vec::new();
    loop {
        match reader.read_event().ok()? {
            Event::Start(e) if e.local_name().as_ref() == b"String" => {
                values.push(reader.read_text(e.name()).ok()?.into_owned());
            }
            Event::Empty(e) if e.local_name().as_ref() == b"String" => {
                values.push(String::new());
            }
            Event::End(e) if e.local_name().as_ref() == b"ListOfString" => break,
            _ => return None,
        }
    }
    // </Value>, nothing else.
    match reader.read_event().ok()? {
        Event::End(e) if e.local_name().as_ref() == b"Value" => Some(values),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<UANodeSet xmlns="http://opcfoundation.org/UA/2011/03/UANodeSet.xsd"
           xmlns:uax="http://opcfoundation.org/UA/2008/02/Types.xsd">
  <NamespaceUris>
    <Uri>urn:demo:vendor</Uri>
  </NamespaceUris>
  <Models>
    <Model ModelUri="urn:demo:vendor" Version="1.0" PublicationDate="2024-01-01T00:00:00Z">
      <RequiredModel ModelUri="http://opcfoundation.org/UA/" Version="1.03"/>
    </Model>
  </Models>
  <Aliases>
    <Alias Alias="HasComponent">i=47</Alias>
    <Alias Alias="Organizes">i=35</Alias>
  </Aliases>
  <UAObject NodeId="ns=1;i=5001" BrowseName="1:Widget" ParentNodeId="i=85">
    <DisplayName>Widget</DisplayName>
    <References>
      <Reference ReferenceType="Organizes" IsForward="false">i=85</Reference>
      <Reference ReferenceType="HasComponent">ns=1;i=5002</Reference>
    </References>
  </UAObject>
  <UAVariable NodeId="ns=1;i=5002" BrowseName="1:Setting" DataType="String" AccessLevel="3">
    <References>
      <Reference ReferenceType="HasComponent" IsForward="false">ns=1;i=5001</Reference>
    </References>
    <Value>
      <uax:ListOfString>
        <uax:String>alpha</uax:String>
        <uax:String>beta</uax:String>
      </uax:ListOfString>
    </Value>
  </UAVariable>
  <UAMethod NodeId="ns=1;i=5003" BrowseName="1:Reset" MethodDeclarationId="ns=1;i=7001"/>
</UANodeSet>
"#;

    #[test]
    fn test_full_document_parses() {
        let doc = read_nodeset(DOC).unwrap();
        assert_eq!(doc.namespace_uris, vec!["urn:demo:vendor".to_string()]);
        assert_eq!(doc.models.len(), 1);
        assert_eq!(doc.models[0].model_uri, "urn:demo:vendor");
        assert_eq!(doc.models[0].required[0].version.as_deref(), Some("1.03"));
        assert_eq!(doc.aliases.len(), 2);
        assert_eq!(doc.nodes.len(), 3);
    }

    #[test]
    fn test_node_attributes_and_references() {
        let doc = read_nodeset(DOC).unwrap();
        let object = &doc.nodes[0];
        assert_eq!(object.class, NodeClass::Object);
        assert_eq!(object.node_id, NodeId::numeric(1, 5001));
        assert_eq!(object.browse_name, QualifiedName::new(1, "Widget"));
        assert_eq!(object.parent, Some(NodeId::numeric(0, 85)));
        let refs = object.references();
        assert_eq!(refs.len(), 2);
        assert!(!refs[0].is_forward);
        assert_eq!(refs[0].target, NodeId::numeric(0, 85));
        assert!(refs[1].is_forward);

        // Child order: DisplayName raw first, then References.
        assert!(matches!(&object.children[0], NodeChild::Raw(raw)
            if raw.contains("<DisplayName>Widget</DisplayName>")));
        assert!(matches!(&object.children[1], NodeChild::References(_)));
    }

    #[test]
    fn test_variable_value_and_extra_attributes() {
        let doc = read_nodeset(DOC).unwrap();
        let variable = &doc.nodes[1];
        assert_eq!(variable.data_type.as_deref(), Some("String"));
        assert_eq!(
            variable.extra_attrs,
            vec![("AccessLevel".to_string(), "3".to_string())]
        );
        assert_eq!(
            variable.value(),
            Some(&ValueContent::Strings(vec![
                "alpha".to_string(),
                "beta".to_string()
            ]))
        );
    }

    #[test]
    fn test_method_declaration_and_empty_element() {
        let doc = read_nodeset(DOC).unwrap();
        let method = &doc.nodes[2];
        assert_eq!(method.class, NodeClass::Method);
        assert_eq!(method.method_declaration, Some(NodeId::numeric(1, 7001)));
        assert!(method.children.is_empty());
    }

    #[test]
    fn test_non_list_value_kept_raw() {
        let xml = r#"<UANodeSet>
  <UAVariable NodeId="i=1" BrowseName="V">
    <Value><uax:Int32>5</uax:Int32></Value>
  </UAVariable>
</UANodeSet>"#;
        let doc = read_nodeset(xml).unwrap();
        match doc.nodes[0].value() {
            Some(ValueContent::Raw(raw)) => {
                assert!(raw.contains("<uax:Int32>5</uax:Int32>"));
                assert!(raw.starts_with("<Value>"));
            }
            other => panic!("expected raw value, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_root_and_missing_node_id() {
        assert!(read_nodeset("<NotANodeSet/>").is_err());
        let xml = r#"<UANodeSet><UAObject BrowseName="X"/></UANodeSet>"#;
        assert!(read_nodeset(xml).is_err());
    }

    #[test]
    fn test_unknown_elements_are_skipped() {
        let xml = r#"<UANodeSet>
  <Extensions><Extension><Anything/></Extension></Extensions>
  <UAObject NodeId="i=1" BrowseName="A"/>
</UANodeSet>"#;
        let doc = read_nodeset(xml).unwrap();
        assert_eq!(doc.nodes.len(), 1);
    }
}
