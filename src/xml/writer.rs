//! UANodeSet XML serialization.

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

use crate::nodeset::consts::{UA_NODESET_URI, UA_TYPES_URI};
use crate::nodeset::{AddressSpace, NodeChild, Reference, UaNode, ValueContent};
use crate::Result;

const XSI_URI: &str = "http://www.w3.org/2001/XMLSchema-instance";
const XSD_URI: &str = "http://www.w3.org/2001/XMLSchema";

/// Serializes the merged graph back into one UANodeSet document.
///
/// Emits the declarations in schema order (NamespaceUris, Models, Aliases)
/// and then the nodes in graph insertion order, which is the order the
/// surviving nodes appeared across the merged inputs. Preserved raw
/// fragments are re-streamed through the writer so the whole document comes
/// out uniformly indented.
///
/// # Errors
///
/// Returns [`crate::Error::FileError`] if the underlying writer fails and
/// [`crate::Error::Xml`] if a preserved raw fragment no longer parses.
pub fn write_address_space(space: &AddressSpace) -> Result<String> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    let mut root = BytesStart::new("UANodeSet");
    root.push_attribute(("xmlns", UA_NODESET_URI));
    root.push_attribute(("xmlns:uax", UA_TYPES_URI));
    root.push_attribute(("xmlns:xsi", XSI_URI));
    root.push_attribute(("xmlns:xsd", XSD_URI));
    writer.write_event(Event::Start(root))?;

    if !space.namespace_uris.is_empty() {
        writer.write_event(Event::Start(BytesStart::new("NamespaceUris")))?;
        for uri in &space.namespace_uris {
            write_text_element(&mut writer, "Uri", uri)?;
        }
        writer.write_event(Event::End(BytesEnd::new("NamespaceUris")))?;
    }

    if !space.models.is_empty() {
        writer.write_event(Event::Start(BytesStart::new("Models")))?;
        for model in &space.models {
            let mut element = BytesStart::new("Model");
            element.push_attribute(("ModelUri", model.model_uri.as_str()));
            if let Some(version) = &model.version {
                element.push_attribute(("Version", version.as_str()));
            }
            if let Some(date) = &model.publication_date {
                element.push_attribute(("PublicationDate", date.as_str()));
            }
            if model.required.is_empty() {
                writer.write_event(Event::Empty(element))?;
            } else {
                writer.write_event(Event::Start(element))?;
                for required in &model.required {
                    let mut entry = BytesStart::new("RequiredModel");
                    entry.push_attribute(("ModelUri", required.model_uri.as_str()));
                    if let Some(version) = &required.version {
                        entry.push_attribute(("Version", version.as_str()));
                    }
                    writer.write_event(Event::Empty(entry))?;
                }
                writer.write_event(Event::End(BytesEnd::new("Model")))?;
            }
        }
        writer.write_event(Event::End(BytesEnd::new("Models")))?;
    }

    if !space.aliases.is_empty() {
        writer.write_event(Event::Start(BytesStart::new("Aliases")))?;
        for (alias, target) in space.aliases.entries() {
            let mut element = BytesStart::new("Alias");
            element.push_attribute(("Alias", alias.as_str()));
            writer.write_event(Event::Start(element))?;
            writer.write_event(Event::Text(BytesText::new(target)))?;
            writer.write_event(Event::End(BytesEnd::new("Alias")))?;
        }
        writer.write_event(Event::End(BytesEnd::new("Aliases")))?;
    }

    for node in space.iter() {
        write_node(&mut writer, node)?;
    }

    writer.write_event(Event::End(BytesEnd::new("UANodeSet")))?;
    let bytes = writer.into_inner();
    String::from_utf8(bytes).map_err(|_| malformed_error!("Serialized document is not UTF-8"))
}

fn write_node(writer: &mut Writer<Vec<u8>>, node: &UaNode) -> Result<()> {
    let name = node.class.to_string();
    let mut element = BytesStart::new(name.as_str());
    element.push_attribute(("NodeId", node.node_id.to_string().as_str()));
    element.push_attribute(("BrowseName", node.browse_name.to_string().as_str()));
    if let Some(parent) = &node.parent {
        element.push_attribute(("ParentNodeId", parent.to_string().as_str()));
    }
    if let Some(data_type) = &node.data_type {
        element.push_attribute(("DataType", data_type.as_str()));
    }
    if let Some(declaration) = &node.method_declaration {
        element.push_attribute(("MethodDeclarationId", declaration.to_string().as_str()));
    }
    for (key, value) in &node.extra_attrs {
        element.push_attribute((key.as_str(), value.as_str()));
    }

    if node.children.is_empty() {
        writer.write_event(Event::Empty(element))?;
        return Ok(());
    }
    writer.write_event(Event::Start(element))?;
    for child in &node.children {
        match child {
            NodeChild::References(references) => write_references(writer, references)?,
            NodeChild::Value(ValueContent::Strings(values)) => {
                writer.write_event(Event::Start(BytesStart::new("Value")))?;
                writer.write_event(Event::Start(BytesStart::new("uax:ListOfString")))?;
                for value in values {
                    write_text_element(writer, "uax:String", value)?;
                }
                writer.write_event(Event::End(BytesEnd::new("uax:ListOfString")))?;
                writer.write_event(Event::End(BytesEnd::new("Value")))?;
            }
            NodeChild::Value(ValueContent::Raw(raw)) | NodeChild::Raw(raw) => {
                write_raw(writer, raw)?;
            }
        }
    }
    writer.write_event(Event::End(BytesEnd::new(name.as_str())))?;
    Ok(())
}

fn write_references(writer: &mut Writer<Vec<u8>>, references: &[Reference]) -> Result<()> {
    if references.is_empty() {
        writer.write_event(Event::Empty(BytesStart::new("References")))?;
        return Ok(());
    }
    writer.write_event(Event::Start(BytesStart::new("References")))?;
    for reference in references {
        let mut element = BytesStart::new("Reference");
        element.push_attribute(("ReferenceType", reference.ref_type.as_str()));
        if !reference.is_forward {
            element.push_attribute(("IsForward", "false"));
        }
        writer.write_event(Event::Start(element))?;
        writer.write_event(Event::Text(BytesText::new(
            reference.target.to_string().as_str(),
        )))?;
        writer.write_event(Event::End(BytesEnd::new("Reference")))?;
    }
    writer.write_event(Event::End(BytesEnd::new("References")))?;
    Ok(())
}

fn write_text_element(writer: &mut Writer<Vec<u8>>, name: &str, text: &str) -> Result<()> {
    writer.write_event(Event::Start(BytesStart::new(name)))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

/// Re-streams a preserved raw fragment through the writer, so it picks up
/// the output document's indentation and stays well-formed by construction.
fn write_raw(writer: &mut Writer<Vec<u8>>, raw: &str) -> Result<()> {
    let mut reader = Reader::from_str(raw);
    loop {
        match reader.read_event().map_err(quick_xml::Error::from)? {
            Event::Eof => return Ok(()),
            Event::Decl(_) => {}
            event => writer.write_event(event)?,
        }
    }
}
