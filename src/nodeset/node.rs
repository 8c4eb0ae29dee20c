use strum::{Display, EnumString};

use crate::nodeset::{NodeId, QualifiedName};

/// The closed set of OPC UA node classes.
///
/// Each variant maps to its UANodeSet element name (`UAObject`, `UAVariable`,
/// ...) for parsing and serialization. The engine treats class-specific
/// attributes as opaque payload; the class tag itself only drives the checks
/// that are explicitly class-driven (type pruning, orphan scanning, method
/// instance detection).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
pub enum NodeClass {
    /// `UAObject`
    #[strum(serialize = "UAObject")]
    Object,
    /// `UAVariable`
    #[strum(serialize = "UAVariable")]
    Variable,
    /// `UAMethod`
    #[strum(serialize = "UAMethod")]
    Method,
    /// `UAObjectType`
    #[strum(serialize = "UAObjectType")]
    ObjectType,
    /// `UAVariableType`
    #[strum(serialize = "UAVariableType")]
    VariableType,
    /// `UAReferenceType`
    #[strum(serialize = "UAReferenceType")]
    ReferenceType,
    /// `UADataType`
    #[strum(serialize = "UADataType")]
    DataType,
    /// `UAView`
    #[strum(serialize = "UAView")]
    View,
}

impl NodeClass {
    /// True for the four type-definition classes handled by the unused-type pruner.
    #[must_use]
    pub fn is_type(self) -> bool {
        matches!(
            self,
            NodeClass::ObjectType
                | NodeClass::VariableType
                | NodeClass::ReferenceType
                | NodeClass::DataType
        )
    }

    /// True for the instance classes scanned by the orphan collector.
    #[must_use]
    pub fn is_instance(self) -> bool {
        matches!(self, NodeClass::Object | NodeClass::Variable)
    }
}

/// A directed, typed edge stored inside a node's `<References>` element.
///
/// `ref_type` is kept as raw text: it may be an alias (`HasComponent`), a
/// numeric form (`i=47`) or a full NodeId. The target is always a NodeId.
/// `is_forward` records which node stores the element, not an independent
/// property: `(a, type, b, forward)` stored in `a` and `(b, type, a,
/// backward)` stored in `b` denote the same logical reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Reference {
    /// Reference type as written in the document (alias or NodeId text)
    pub ref_type: String,
    /// The other end of the edge
    pub target: NodeId,
    /// Direction of the stored element (`IsForward` attribute, default true)
    pub is_forward: bool,
}

impl Reference {
    /// Creates a forward reference.
    #[must_use]
    pub fn forward(ref_type: impl Into<String>, target: NodeId) -> Self {
        Reference {
            ref_type: ref_type.into(),
            target,
            is_forward: true,
        }
    }

    /// Creates a backward (inverse) reference.
    #[must_use]
    pub fn backward(ref_type: impl Into<String>, target: NodeId) -> Self {
        Reference {
            ref_type: ref_type.into(),
            target,
            is_forward: false,
        }
    }
}

/// Parsed or preserved content of a `<Value>` element.
///
/// Only `ListOfString` payloads are modeled, because the NamespaceArray and
/// ServerArray merges rewrite them. Every other payload is carried through
/// verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueContent {
    /// A `<ListOfString>` payload, one entry per `<String>` child
    Strings(Vec<String>),
    /// Any other payload, kept as the raw XML of the whole `<Value>` element
    Raw(String),
}

/// An ordered child of a node element.
///
/// The child order of the source document is preserved so that serialization
/// keeps DisplayName/Description/References/Value in their original places.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeChild {
    /// The `<References>` element
    References(Vec<Reference>),
    /// The `<Value>` element
    Value(ValueContent),
    /// Any other child element, kept as raw XML
    Raw(String),
}

/// A single address-space node.
///
/// Carries the attributes the engine interprets (NodeId, BrowseName,
/// ParentNodeId, DataType, MethodDeclarationId) as typed fields, every other
/// attribute verbatim and in order, and the ordered child elements. The
/// References child is the only one the engine mutates structurally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UaNode {
    /// Node class tag (element name)
    pub class: NodeClass,
    /// Unique node identifier
    pub node_id: NodeId,
    /// Browse name
    pub browse_name: QualifiedName,
    /// Optional advisory parent attribute; dropped by sanitization when stale
    pub parent: Option<NodeId>,
    /// Raw `DataType` attribute (alias or NodeId text), Variables and VariableTypes
    pub data_type: Option<String>,
    /// `MethodDeclarationId` attribute, marks instantiated Methods
    pub method_declaration: Option<NodeId>,
    /// All remaining attributes, in document order
    pub extra_attrs: Vec<(String, String)>,
    /// Ordered child elements
    pub children: Vec<NodeChild>,
}

impl UaNode {
    /// Creates a node with no attributes beyond identity and no children.
    #[must_use]
    pub fn new(class: NodeClass, node_id: NodeId, browse_name: QualifiedName) -> Self {
        UaNode {
            class,
            node_id,
            browse_name,
            parent: None,
            data_type: None,
            method_declaration: None,
            extra_attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Returns the stored references, or an empty slice when the node has no
    /// `<References>` element.
    #[must_use]
    pub fn references(&self) -> &[Reference] {
        for child in &self.children {
            if let NodeChild::References(refs) = child {
                return refs;
            }
        }
        &[]
    }

    /// Returns the mutable reference list, creating an empty `<References>`
    /// element if the node had none.
    pub fn references_mut(&mut self) -> &mut Vec<Reference> {
        let pos = self
            .children
            .iter()
            .position(|c| matches!(c, NodeChild::References(_)));
        let pos = match pos {
            Some(pos) => pos,
            None => {
                self.children.push(NodeChild::References(Vec::new()));
                self.children.len() - 1
            }
        };
        match &mut self.children[pos] {
            NodeChild::References(refs) => refs,
            _ => unreachable!("position points at a References child"),
        }
    }

    /// True if the node already stores a reference with the same type, target
    /// and direction.
    #[must_use]
    pub fn has_reference(&self, reference: &Reference) -> bool {
        self.references().iter().any(|r| r == reference)
    }

    /// Appends a reference unless an identical `(type, target, direction)`
    /// element is already stored. Returns whether the reference was added.
    pub fn add_reference(&mut self, reference: Reference) -> bool {
        if self.has_reference(&reference) {
            return false;
        }
        self.references_mut().push(reference);
        true
    }

    /// Returns the `<Value>` payload when present.
    #[must_use]
    pub fn value(&self) -> Option<&ValueContent> {
        self.children.iter().find_map(|c| match c {
            NodeChild::Value(v) => Some(v),
            _ => None,
        })
    }

    /// Replaces the `<Value>` payload, appending a new child if the node had none.
    pub fn set_value(&mut self, value: ValueContent) {
        for child in &mut self.children {
            if let NodeChild::Value(v) = child {
                *v = value;
                return;
            }
        }
        self.children.push(NodeChild::Value(value));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nodeset::NodeId;

    fn node() -> UaNode {
        UaNode::new(
            NodeClass::Object,
            NodeId::numeric(0, 85),
            QualifiedName::new(0, "Objects"),
        )
    }

    #[test]
    fn test_node_class_element_names() {
        assert_eq!(NodeClass::Object.to_string(), "UAObject");
        assert_eq!(
            "UAReferenceType".parse::<NodeClass>().unwrap(),
            NodeClass::ReferenceType
        );
        assert!("UAWidget".parse::<NodeClass>().is_err());
        assert!(NodeClass::DataType.is_type());
        assert!(!NodeClass::Method.is_type());
        assert!(NodeClass::Variable.is_instance());
    }

    #[test]
    fn test_add_reference_dedups() {
        let mut n = node();
        let r = Reference::forward("Organizes", NodeId::numeric(0, 2253));
        assert!(n.add_reference(r.clone()));
        assert!(!n.add_reference(r.clone()));
        // Same edge, other direction, is a distinct stored element.
        let inv = Reference::backward("Organizes", NodeId::numeric(0, 2253));
        assert!(n.add_reference(inv));
        assert_eq!(n.references().len(), 2);
    }

    #[test]
    fn test_references_mut_creates_element() {
        let mut n = node();
        assert!(n.references().is_empty());
        n.references_mut()
            .push(Reference::forward("HasComponent", NodeId::numeric(0, 1)));
        assert_eq!(n.references().len(), 1);
        assert_eq!(n.children.len(), 1);
    }

    #[test]
    fn test_set_value_replaces_in_place() {
        let mut n = node();
        n.children.push(NodeChild::Raw("<DisplayName>Objects</DisplayName>".into()));
        n.set_value(ValueContent::Strings(vec!["a".into()]));
        n.set_value(ValueContent::Strings(vec!["a".into(), "b".into()]));
        assert_eq!(
            n.value(),
            Some(&ValueContent::Strings(vec!["a".into(), "b".into()]))
        );
        assert_eq!(n.children.len(), 2);
    }
}
