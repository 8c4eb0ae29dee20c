//! Well-known namespace-0 identifiers and reference-type tables.
//!
//! The engine never interprets the OPC UA type hierarchy at large; it relies
//! on a handful of fixed NS0 identities. Reference-type matching here is
//! deliberately literal: a type written as `HasComponent` or `i=47` matches,
//! but an exotic alias bound to `i=47` does not. Retention lists are the one
//! place where aliases are resolved (see [`crate::prune`]), and that
//! asymmetry is intentional.

/// URI of the OPC UA namespace (namespace index 0).
pub const UA_URI: &str = "http://opcfoundation.org/UA/";

/// URI of the UANodeSet XML schema.
pub const UA_NODESET_URI: &str = "http://opcfoundation.org/UA/2011/03/UANodeSet.xsd";

/// URI of the OPC UA XML types schema (the `uax` prefix).
pub const UA_TYPES_URI: &str = "http://opcfoundation.org/UA/2008/02/Types.xsd";

/// The hierarchical reference types, as `(browse name, numeric form)` pairs.
///
/// HasEncoding is not hierarchical in Part 3, but an encoding node's
/// existence is parasitic on its DataType, so subtree removal treats the
/// edge as hierarchical.
pub const HIERARCHICAL_REFS: &[(&str, &str)] = &[
    ("HasChild", "i=34"),
    ("HasComponent", "i=47"),
    ("HasOrderedComponent", "i=49"),
    ("HasProperty", "i=46"),
    ("HasSubtype", "i=45"),
    ("Organizes", "i=35"),
    ("HasEventSource", "i=36"),
    ("HasNotifier", "i=48"),
    ("Aggregates", "i=44"),
    ("HasEncoding", "i=38"),
];

/// HasSubtype in both text forms.
pub const HAS_SUBTYPE: (&str, &str) = ("HasSubtype", "i=45");

/// HasTypeDefinition in both text forms.
pub const HAS_TYPE_DEFINITION: (&str, &str) = ("HasTypeDefinition", "i=40");

/// HasModellingRule in both text forms.
pub const HAS_MODELLING_RULE: (&str, &str) = ("HasModellingRule", "i=37");

/// HasProperty in both text forms.
pub const HAS_PROPERTY: (&str, &str) = ("HasProperty", "i=46");

/// NS0 nodes that may legitimately reappear across merged documents.
///
/// Vendors redeclare the Server object and its array variables to extend
/// their references; collisions on these ids union the reference lists
/// instead of failing the merge.
pub const SINGLETON_ALLOW_LIST: &[&str] = &["i=2253", "i=2254", "i=2255"];

/// The ServerArray variable, `(NodeId, BrowseName)`.
pub const SERVER_ARRAY: (&str, &str) = ("i=2254", "ServerArray");

/// The NamespaceArray variable, `(NodeId, BrowseName)`.
pub const NAMESPACE_ARRAY: (&str, &str) = ("i=2255", "NamespaceArray");

/// Nodes the orphan collector never removes: Root, the modelling-rule
/// objects and their NamingRule property variables.
pub const ORPHAN_EXCEPTIONS: &[&str] = &[
    "i=84",    // Root
    "i=78",    // ModellingRule_Mandatory
    "i=80",    // ModellingRule_Optional
    "i=83",    // ModellingRule_ExposesItsArray
    "i=11508", // ModellingRule_OptionalPlaceholder
    "i=11510", // ModellingRule_MandatoryPlaceholder
    "i=112",   // Mandatory/NamingRule
    "i=113",   // Optional/NamingRule
    "i=114",   // ExposesItsArray/NamingRule
    "i=11509", // OptionalPlaceholder/NamingRule
    "i=11511", // MandatoryPlaceholder/NamingRule
];

/// MaxMonitoredItemsPerCall.
pub const MAX_MONITORED_ITEMS_PER_CALL: &str = "i=11714";

/// MaxNodesPerNodeManagement.
pub const MAX_NODES_PER_NODE_MANAGEMENT: &str = "i=11713";

/// MaxNodesPerMethodCall.
pub const MAX_NODES_PER_METHOD_CALL: &str = "i=11709";

/// Literal match of a reference-type text against a `(name, numeric)` pair.
#[must_use]
pub fn matches_ref_type(text: &str, pair: (&str, &str)) -> bool {
    text == pair.0 || text == pair.1
}

/// Literal match of a reference-type text against the hierarchical table.
#[must_use]
pub fn is_hierarchical_ref_type(text: &str) -> bool {
    HIERARCHICAL_REFS.iter().any(|p| matches_ref_type(text, *p))
}
