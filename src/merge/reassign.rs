//! Namespace index reassignment between a document and the merged graph.
//!
//! Each UANodeSet document numbers its namespaces locally: index `i` denotes
//! the `i`-th `<Uri>` it declares. When documents are merged, a URI may
//! already be present in the graph under a different index, or may be new
//! and get the next free one. The [`NamespaceRemapper`] computes that partial
//! `old index -> new index` mapping once per document and rewrites every
//! index-carrying field of a node in place. Unmapped indices pass through
//! unchanged, including namespace 0, which is the same OPC UA namespace in
//! every document.

use std::collections::HashMap;
use std::str::FromStr;

use crate::nodeset::{NodeId, UaNode};

/// Computed index remapping for one incoming document.
///
/// Construction walks the incoming URI declarations against the graph's:
/// known URIs map onto their established index, new URIs are assigned the
/// next free one and reported through [`NamespaceRemapper::appended`] so the
/// merger can extend the graph's declaration list.
#[derive(Debug)]
pub struct NamespaceRemapper {
    mapping: HashMap<u16, u16>,
    appended: Vec<String>,
}

impl NamespaceRemapper {
    /// Computes the remapping of `incoming` document indices into a graph
    /// that already declares `existing`.
    #[must_use]
    pub fn new(existing: &[String], incoming: &[String]) -> Self {
        let mut known: HashMap<&str, u16> = existing
            .iter()
            .enumerate()
            .map(|(i, uri)| (uri.as_str(), (i + 1) as u16))
            .collect();

        let mut mapping = HashMap::new();
        let mut appended = Vec::new();
        for (i, uri) in incoming.iter().enumerate() {
            let local = (i + 1) as u16;
            match known.get(uri.as_str()) {
                Some(&global) => {
                    if global != local {
                        mapping.insert(local, global);
                    }
                }
                None => {
                    let global = (known.len() + 1) as u16;
                    known.insert(uri.as_str(), global);
                    if global != local {
                        mapping.insert(local, global);
                    }
                    appended.push(uri.clone());
                }
            }
        }
        NamespaceRemapper { mapping, appended }
    }

    /// The partial index mapping.
    #[must_use]
    pub fn mapping(&self) -> &HashMap<u16, u16> {
        &self.mapping
    }

    /// URIs new to the graph, in incoming declaration order.
    #[must_use]
    pub fn appended(&self) -> &[String] {
        &self.appended
    }

    /// Maps one index; unmapped indices pass through.
    #[must_use]
    pub fn remap_index(&self, index: u16) -> u16 {
        self.mapping.get(&index).copied().unwrap_or(index)
    }

    /// Rewrites a raw NodeId text (`ns=N;...` form). Text that does not
    /// parse as a NodeId, or whose index is unmapped, is returned untouched,
    /// so aliases and `DataType` names survive verbatim.
    #[must_use]
    pub fn remap_nodeid_text(&self, text: &str) -> String {
        if let Ok(nid) = NodeId::from_str(text) {
            if let Some(&global) = self.mapping.get(&nid.namespace) {
                let mut remapped = nid;
                remapped.namespace = global;
                return remapped.to_string();
            }
        }
        text.to_string()
    }

    /// Rewrites every index-carrying field of a node in place: NodeId,
    /// ParentNodeId, BrowseName, the `DataType` attribute, and each stored
    /// Reference's type and target.
    pub fn remap_node(&self, node: &mut UaNode) {
        node.node_id.namespace = self.remap_index(node.node_id.namespace);
        if let Some(parent) = &mut node.parent {
            parent.namespace = self.remap_index(parent.namespace);
        }
        node.browse_name.namespace = self.remap_index(node.browse_name.namespace);
        if let Some(data_type) = &node.data_type {
            let remapped = self.remap_nodeid_text(data_type);
            node.data_type = Some(remapped);
        }
        for reference in node.references_mut() {
            reference.ref_type = self.remap_nodeid_text(&reference.ref_type);
            reference.target.namespace = self.remap_index(reference.target.namespace);
        }
    }
}
