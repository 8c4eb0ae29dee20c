//! The address-space data model.
//!
//! This module defines everything the engine operates on: typed node
//! identities ([`NodeId`], [`QualifiedName`]), the closed [`NodeClass`] tag
//! set, stored [`Reference`] elements, parsed documents ([`NodeSet`]) and the
//! accumulating [`AddressSpace`] graph with its [`AliasTable`] side table.
//!
//! The model is deliberately partial: class-specific attributes the engine
//! does not interpret (DisplayName, Value payloads other than `ListOfString`,
//! AccessLevel, ...) are preserved verbatim so that a merged document loses
//! nothing on round-trip.
//!
//! # Key Types
//!
//! - [`NodeId`] - canonical node identity, the key of the graph
//! - [`UaNode`] - one node with its ordered attributes and children
//! - [`NodeSet`] - a parsed input document, the unit of merging
//! - [`AddressSpace`] - the merged graph the pipeline mutates in place
//! - [`consts`] - the fixed NS0 identities the algorithms depend on

pub mod consts;

mod aliases;
mod document;
mod graph;
mod node;
mod nodeid;

pub use aliases::AliasTable;
pub use document::{Model, NodeSet, RequiredModel};
pub use graph::AddressSpace;
pub use node::{NodeChild, NodeClass, Reference, UaNode, ValueContent};
pub use nodeid::{Identifier, NodeId, QualifiedName};
