// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]

//! # addrspace
//!
//! A library and command-line tool for merging, repairing and reducing OPC UA
//! address-space documents (UANodeSet XML). `addrspace` folds any number of
//! nodeset files into one consistent in-memory graph, fixes up reference
//! reciprocity, and strips the parts of the standard namespace a target
//! server does not need, producing a single nodeset file fit for embedding.
//!
//! ## Features
//!
//! - **Multi-document merging** - namespace index reassignment, model and
//!   alias conflict detection, singleton reference union
//! - **Reciprocal reference repair** - every reference pair becomes
//!   bidirectionally represented, stale `ParentNodeId` attributes are dropped
//! - **Cycle-safe pruning** - subtree removal, orphan collection, fixed-point
//!   unused-type pruning and backward-reference stripping over a general
//!   directed multigraph
//! - **Faithful serialization** - attributes, values and child elements the
//!   engine does not interpret survive the round trip verbatim
//!
//! ## Quick Start
//!
//! Add `addrspace` to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! addrspace = "0.1"
//! ```
//!
//! ### Using the Prelude
//!
//! For convenient access to the most commonly used types, import the prelude:
//!
//! ```rust
//! use addrspace::prelude::*;
//!
//! let base = read_nodeset(r#"<UANodeSet>
//!   <Models><Model ModelUri="http://opcfoundation.org/UA/" Version="1.03"/></Models>
//!   <UAObject NodeId="i=85" BrowseName="Objects"/>
//! </UANodeSet>"#)?;
//!
//! let outcome = pipeline::run(vec![base], &PipelineOptions::default())?;
//! let xml = write_address_space(&outcome.space)?;
//! assert!(xml.contains("UANodeSet"));
//! # Ok::<(), addrspace::Error>(())
//! ```
//!
//! ## Architecture
//!
//! The crate is organized around one batch transformation:
//!
//! - [`xml`] - parsing and serialization of UANodeSet documents
//! - [`nodeset`] - the data model: [`nodeset::NodeId`], [`nodeset::UaNode`],
//!   the [`nodeset::AddressSpace`] graph and its alias table
//! - [`merge`] - document merging with namespace reassignment and conflict
//!   detection
//! - [`sanitize`] - reciprocal reference repair
//! - [`prune`] - subtree, orphan, unused-type and backward-reference removal
//! - [`pipeline`] - the fixed-order composition of all passes, as used by the
//!   `nodeset-merge` binary
//!
//! ## Testing
//!
//! The test suite builds documents from XML text and checks the pipeline
//! end to end:
//!
//! ```bash
//! cargo test
//! ```
#[macro_use]
pub(crate) mod error;

/// Shared functionality which is used in unit- and integration-tests
#[cfg(test)]
pub(crate) mod test;

/// Convenient re-exports of the most commonly used types and functions.
///
/// # Example
///
/// ```rust
/// use addrspace::prelude::*;
///
/// let doc = read_nodeset(r#"<UANodeSet><UAObject NodeId="i=85" BrowseName="Objects"/></UANodeSet>"#)?;
/// assert_eq!(doc.nodes.len(), 1);
/// # Ok::<(), addrspace::Error>(())
/// ```
pub mod prelude;

pub mod merge;
pub mod nodeset;
pub mod pipeline;
pub mod prune;
pub mod sanitize;
pub mod xml;

/// Result type used consistently for all fallible operations in this crate.
///
/// A type alias for [`std::result::Result<T, Error>`] where the error type is
/// always [`Error`].
///
/// # Examples
///
/// ```rust
/// use addrspace::{nodeset::NodeSet, Result};
///
/// fn parse(xml: &str) -> Result<NodeSet> {
///     addrspace::xml::read_nodeset(xml)
/// }
/// ```
pub type Result<T> = std::result::Result<T, Error>;

/// `addrspace` Error type
///
/// The main error type for all operations in this crate. Provides detailed
/// error information for document parsing, merge conflicts and pipeline
/// configuration.
///
/// # Examples
///
/// ```rust
/// use addrspace::{xml::read_nodeset, Error};
///
/// match read_nodeset("<NotANodeSet/>") {
///     Ok(_) => unreachable!(),
///     Err(Error::Malformed { message, .. }) => println!("Malformed: {}", message),
///     Err(e) => println!("Error: {}", e),
/// }
/// ```
pub use error::Error;
