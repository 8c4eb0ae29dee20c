use crate::nodeset::UaNode;

/// A `RequiredModel` entry of a `<Model>` declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequiredModel {
    /// URI of the required model
    pub model_uri: String,
    /// Version the requirement was compiled against
    pub version: Option<String>,
}

/// A `<Model>` declaration of a UANodeSet document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Model {
    /// URI identifying the model
    pub model_uri: String,
    /// Version string, required for the NS0 model
    pub version: Option<String>,
    /// Publication date, carried through verbatim
    pub publication_date: Option<String>,
    /// Models this model was built against
    pub required: Vec<RequiredModel>,
}

impl Model {
    /// Creates a model declaration with no requirements.
    #[must_use]
    pub fn new(model_uri: impl Into<String>, version: Option<String>) -> Self {
        Model {
            model_uri: model_uri.into(),
            version,
            publication_date: None,
            required: Vec::new(),
        }
    }
}

/// A parsed UANodeSet document, the unit of merging.
///
/// This is the engine-facing shape of one input XML file: namespace and model
/// declarations, aliases in declaration order, and nodes in document order.
/// Duplicate NodeIds may still be present here; the merger is responsible for
/// rejecting them. Namespace indices are local to the document until the
/// merger reassigns them.
#[derive(Debug, Clone, Default)]
pub struct NodeSet {
    /// Declared namespace URIs; index `i+1` in NodeIds denotes `namespace_uris[i]`
    pub namespace_uris: Vec<String>,
    /// `<Models>` declarations
    pub models: Vec<Model>,
    /// `<Aliases>` entries as `(alias, NodeId text)`, in declaration order
    pub aliases: Vec<(String, String)>,
    /// Node elements in document order
    pub nodes: Vec<UaNode>,
}

impl NodeSet {
    /// Number of declared namespace URIs.
    #[must_use]
    pub fn declared_namespaces(&self) -> u16 {
        u16::try_from(self.namespace_uris.len()).unwrap_or(u16::MAX)
    }
}
