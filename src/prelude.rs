//! # addrspace Prelude
//!
//! This module provides a convenient prelude for the most commonly used types
//! and functions of the addrspace library. Import this module to get quick
//! access to the essentials for merging and reducing UANodeSet documents.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all addrspace operations
pub use crate::Error;

/// The result type used throughout addrspace
pub use crate::Result;

// ================================================================================================
// Main Entry Points
// ================================================================================================

/// The fixed-order transformation pipeline
pub use crate::pipeline;

/// Options controlling which pipeline passes run
pub use crate::pipeline::{PipelineOptions, PipelineOutcome, PipelineReport};

/// Parsing of UANodeSet XML into the data model
pub use crate::xml::read_nodeset;

/// Serialization of the merged graph back to UANodeSet XML
pub use crate::xml::write_address_space;

// ================================================================================================
// Data Model
// ================================================================================================

/// The merged address-space graph
pub use crate::nodeset::AddressSpace;

/// Node identity and naming
pub use crate::nodeset::{NodeId, QualifiedName};

/// Nodes, classes and stored references
pub use crate::nodeset::{NodeClass, Reference, UaNode};

/// One parsed input document
pub use crate::nodeset::NodeSet;

// ================================================================================================
// Individual Passes
// ================================================================================================

/// Document merging into the graph
pub use crate::merge::{merge, MergeStats};

/// Reciprocal reference repair
pub use crate::sanitize::{sanitize, SanitizeReport};

/// Graph reduction passes
pub use crate::prune::{
    remove_backward_refs, remove_orphans, remove_subtree, remove_unused, UnusedOptions,
};
