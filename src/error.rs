use thiserror::Error;

use crate::nodeset::NodeId;

macro_rules! malformed_error {
    // Single string version
    ($msg:expr) => {
        crate::Error::Malformed {
            message: $msg.to_string(),
            file: file!(),
            line: line!(),
        }
    };

    // Format string with arguments version
    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::Malformed {
            message: format!($fmt, $($arg)*),
            file: file!(),
            line: line!(),
        }
    };
}

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// This enum covers every fatal condition that can occur while reading UANodeSet documents,
/// merging them into an [`crate::nodeset::AddressSpace`], and running the pruning pipeline.
/// Non-fatal sanitization findings are deliberately *not* part of this enum; they are collected
/// as [`crate::sanitize::SanitizeIssue`] values and reported without stopping the run.
///
/// # Error Categories
///
/// ## Document Parsing Errors
/// - [`Error::Malformed`] - Structurally invalid UANodeSet content
/// - [`Error::Xml`] / [`Error::XmlAttr`] - Low-level XML errors from quick-xml
/// - [`Error::FileError`] - Filesystem I/O errors
///
/// ## Merge Conflict Errors
/// - [`Error::DuplicateNodeId`] - NodeId collision outside the NS0 singleton allow-list
/// - [`Error::MissingNs0Model`] - Base graph has no versioned NS0 `<Model>` entry
/// - [`Error::ModelVersionConflict`] - A model URI reappears with a different version
/// - [`Error::Ns0VersionConflict`] - A RequiredModel entry disagrees on the NS0 version
/// - [`Error::AliasConflict`] - An alias is reused for a different NodeId
/// - [`Error::UndeclaredNamespace`] - A namespace index is used without a URI declaration
/// - [`Error::MissingSingletonNode`] - NamespaceArray/ServerArray variable absent from NS0
/// - [`Error::InvalidServerUri`] - ServerArray value contradicts the local server URI
///
/// ## Configuration Errors
/// - [`Error::Config`] - Invalid option combination, rejected before any mutation
#[derive(Error, Debug)]
pub enum Error {
    /// The document is damaged and could not be interpreted as a UANodeSet.
    ///
    /// The error includes the source location where the malformation was
    /// detected for debugging purposes.
    ///
    /// # Fields
    ///
    /// * `message` - Detailed description of what was malformed
    /// * `file` - Source file where the error was detected
    /// * `line` - Source line where the error was detected
    #[error("Malformed - {file}:{line}: {message}")]
    Malformed {
        /// The message to be printed for the Malformed error
        message: String,
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },

    /// File I/O error.
    ///
    /// Wraps standard I/O errors that can occur while reading input documents
    /// or writing the merged output.
    #[error("{0}")]
    FileError(#[from] std::io::Error),

    /// Error from the quick-xml crate while reading or writing a document.
    #[error("{0}")]
    Xml(#[from] quick_xml::Error),

    /// Error from the quick-xml crate while decoding an element attribute.
    #[error("{0}")]
    XmlAttr(#[from] quick_xml::events::attributes::AttrError),

    /// Invalid option combination.
    ///
    /// Raised before any document is touched, e.g. when `--no-sanitize` is
    /// combined with an operation that requires a sanitized graph.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// A namespace index is used without a corresponding URI declaration.
    ///
    /// Every index appearing in a NodeId, BrowseName, DataType or Reference
    /// must be covered by the document's `<NamespaceUris>` section. The list
    /// enumerates each undeclared index together with the NodeId or alias it
    /// was first seen on.
    #[error("Undeclared namespace index(es): {}", format_undeclared(.0))]
    UndeclaredNamespace(Vec<(u16, String)>),

    /// The accumulated graph has no NS0 `<Model>` entry with a version.
    ///
    /// Subsequent documents can only be merged once the base document has
    /// established which version of the OPC UA namespace it implements.
    #[error("Missing a versioned NS0 model in the base address space")]
    MissingNs0Model,

    /// A model URI reappears across documents with a different version.
    #[error("Model {model_uri} declared with conflicting versions ({existing} and {incoming})")]
    ModelVersionConflict {
        /// URI of the conflicting model
        model_uri: String,
        /// Version already present in the graph
        existing: String,
        /// Version carried by the incoming document
        incoming: String,
    },

    /// An incoming document requires a different NS0 version than the base graph provides.
    #[error("Incompatible NS0 version: provided {provided} but require {required}")]
    Ns0VersionConflict {
        /// NS0 version established by the base document
        provided: String,
        /// NS0 version required by the incoming document
        required: String,
    },

    /// An alias is reused for a different NodeId across documents.
    ///
    /// Each entry is `(alias, existing NodeId text, incoming NodeId text)`;
    /// every conflicting alias of the incoming document is enumerated.
    #[error("Alias(es) used for different NodeIds: {}", format_alias_conflicts(.0))]
    AliasConflict(Vec<(String, String, String)>),

    /// NodeId collision outside the NS0 singleton allow-list.
    ///
    /// Raised when an incoming document redeclares nodes already present in
    /// the graph (or declares the same NodeId twice itself). The list carries
    /// every offending NodeId for diagnostics.
    #[error("Duplicate NodeId(s): {}", format_node_ids(.0))]
    DuplicateNodeId(Vec<NodeId>),

    /// A required NS0 singleton variable is absent.
    ///
    /// The NamespaceArray (`i=2255`) and ServerArray (`i=2254`) variables must
    /// be present in the base address space for their values to be maintained.
    #[error("Missing UAVariable {browse_name} ({node_id}) in NS0")]
    MissingSingletonNode {
        /// NodeId text of the missing variable
        node_id: &'static str,
        /// BrowseName of the missing variable
        browse_name: &'static str,
    },

    /// The first ServerArray entry does not match the local server URI.
    #[error("Invalid local server URI in ServerArray: {found}, expecting {expected} instead")]
    InvalidServerUri {
        /// URI found in the first ServerArray slot
        found: String,
        /// The ns=1 URI the first slot must carry
        expected: String,
    },
}

fn format_node_ids(ids: &[NodeId]) -> String {
    ids.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

fn format_alias_conflicts(entries: &[(String, String, String)]) -> String {
    entries
        .iter()
        .map(|(alias, existing, incoming)| format!("{alias} is {existing} or {incoming}"))
        .collect::<Vec<_>>()
        .join(", ")
}

fn format_undeclared(entries: &[(u16, String)]) -> String {
    entries
        .iter()
        .map(|(idx, seen)| format!("ns={idx} (seen on {seen})"))
        .collect::<Vec<_>>()
        .join(", ")
}
