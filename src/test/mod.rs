use std::str::FromStr;

use crate::nodeset::consts::UA_URI;
use crate::nodeset::{
    Model, NodeClass, NodeId, NodeSet, QualifiedName, Reference, UaNode,
};

/// Creates an NS0 node with a numeric id and a generated browse name.
pub fn node(class: NodeClass, id: u32) -> UaNode {
    UaNode::new(
        class,
        NodeId::numeric(0, id),
        QualifiedName::new(0, format!("Node{id}")),
    )
}

/// Creates a node from NodeId and BrowseName text forms.
pub fn named_node(class: NodeClass, id: &str, browse_name: &str) -> UaNode {
    UaNode::new(
        class,
        NodeId::from_str(id).expect("test NodeId"),
        QualifiedName::from_str(browse_name).expect("test BrowseName"),
    )
}

/// A minimal but complete NS0 base document: versioned UA model, Root and
/// Objects wired by a forward Organizes reference, the Server object with
/// its array variables, and the standard hierarchical aliases.
pub fn base_nodeset() -> NodeSet {
    let mut root = node(NodeClass::Object, 84);
    root.browse_name = QualifiedName::new(0, "Root");
    root.add_reference(Reference::forward("Organizes", NodeId::numeric(0, 85)));

    let mut objects = node(NodeClass::Object, 85);
    objects.browse_name = QualifiedName::new(0, "Objects");
    objects.add_reference(Reference::backward("Organizes", NodeId::numeric(0, 84)));
    objects.add_reference(Reference::forward("Organizes", NodeId::numeric(0, 2253)));

    let mut server = node(NodeClass::Object, 2253);
    server.browse_name = QualifiedName::new(0, "Server");
    server.add_reference(Reference::backward("Organizes", NodeId::numeric(0, 85)));
    server.add_reference(Reference::forward("HasComponent", NodeId::numeric(0, 2254)));
    server.add_reference(Reference::forward("HasComponent", NodeId::numeric(0, 2255)));

    let mut server_array = node(NodeClass::Variable, 2254);
    server_array.browse_name = QualifiedName::new(0, "ServerArray");
    server_array.add_reference(Reference::backward("HasComponent", NodeId::numeric(0, 2253)));

    let mut namespace_array = node(NodeClass::Variable, 2255);
    namespace_array.browse_name = QualifiedName::new(0, "NamespaceArray");
    namespace_array.add_reference(Reference::backward("HasComponent", NodeId::numeric(0, 2253)));

    NodeSet {
        namespace_uris: Vec::new(),
        models: vec![Model::new(UA_URI, Some("1.03".to_string()))],
        aliases: vec![
            ("Organizes".to_string(), "i=35".to_string()),
            ("HasComponent".to_string(), "i=47".to_string()),
            ("HasProperty".to_string(), "i=46".to_string()),
            ("HasSubtype".to_string(), "i=45".to_string()),
            ("HasTypeDefinition".to_string(), "i=40".to_string()),
        ],
        nodes: vec![root, objects, server, server_array, namespace_array],
    }
}
